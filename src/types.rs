//! Value types shared by the generator and the renderers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tolerance used when checking that outgoing probabilities sum to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// A cell on the board, `x` grows east and `y` grows north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Coord { x, y }
    }

    /// Euclidean distance between two cells.
    pub fn distance(&self, other: &Coord) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx.hypot(dy)
    }

    /// Check the cell against board bounds.
    pub fn within(&self, width: usize, height: usize) -> bool {
        self.x < width && self.y < height
    }
}

impl From<(usize, usize)> for Coord {
    fn from((x, y): (usize, usize)) -> Self {
        Coord::new(x, y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Grid-aligned movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Enumeration order used by the generator.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Apply the direction to a cell, `None` when the step leaves the board.
    pub fn step(self, from: Coord, width: usize, height: usize) -> Option<Coord> {
        let target = match self {
            Direction::North => Coord::new(from.x, from.y.checked_add(1)?),
            Direction::East => Coord::new(from.x.checked_add(1)?, from.y),
            Direction::South => Coord::new(from.x, from.y.checked_sub(1)?),
            Direction::West => Coord::new(from.x.checked_sub(1)?, from.y),
        };
        target.within(width, height).then_some(target)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource the agent can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Item {
    Log,
    Stone,
}

impl Item {
    pub fn as_str(self) -> &'static str {
        match self {
            Item::Log => "log",
            Item::Stone => "stone",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of the delivery-zone log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Delivery {
    Log,
    Stone,
    Fuel,
}

impl Delivery {
    pub fn as_str(self) -> &'static str {
        match self {
            Delivery::Log => "log",
            Delivery::Stone => "stone",
            Delivery::Fuel => "fuel",
        }
    }
}

impl From<Item> for Delivery {
    fn from(item: Item) -> Self {
        match item {
            Item::Log => Delivery::Log,
            Item::Stone => Delivery::Stone,
        }
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of action labelling a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    Load,
    Unload,
    Refuel,
    Ignite,
    Move,
    FastMove,
    Noop,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Load => "load",
            ActionKind::Unload => "unload",
            ActionKind::Refuel => "refuel",
            ActionKind::Ignite => "ignite",
            ActionKind::Move => "move",
            ActionKind::FastMove => "fast-move",
            ActionKind::Noop => "noop",
        }
    }

    pub fn is_movement(self) -> bool {
        matches!(self, ActionKind::Move | ActionKind::FastMove)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Movement pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pace {
    #[default]
    Normal,
    Fast,
}
