//! Movement enumeration and direction ranking on the board

use crate::types::{Coord, Direction};

/// Directions leading to an on-board cell other than `previous`.
///
/// The result follows [`Direction::ALL`] order. Excluding the previous cell
/// forbids immediate backtracking; longer cycles are left to deduplication.
pub fn legal_directions(
    position: Coord,
    previous: Coord,
    width: usize,
    height: usize,
) -> Vec<(Direction, Coord)> {
    Direction::ALL
        .iter()
        .filter_map(|&dir| dir.step(position, width, height).map(|cell| (dir, cell)))
        .filter(|(_, cell)| *cell != previous)
        .collect()
}

/// Rank candidate moves by ascending Euclidean distance to `target`.
///
/// The sort is stable, so equally distant candidates keep enumeration order.
pub fn rank_directions(candidates: &[(Direction, Coord)], target: Coord) -> Vec<(Direction, Coord)> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|(_, a), (_, b)| a.distance(&target).total_cmp(&b.distance(&target)));
    ranked
}

/// Best-ranked direction towards `target`, if any move is available.
pub fn best_direction(candidates: &[(Direction, Coord)], target: Coord) -> Option<Direction> {
    rank_directions(candidates, target)
        .first()
        .map(|(dir, _)| *dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_two_exits() {
        let moves = legal_directions(Coord::new(0, 0), Coord::new(0, 0), 3, 3);
        let dirs: Vec<Direction> = moves.iter().map(|(d, _)| *d).collect();
        assert_eq!(dirs, vec![Direction::North, Direction::East]);
    }

    #[test]
    fn previous_cell_is_excluded() {
        let moves = legal_directions(Coord::new(1, 1), Coord::new(1, 2), 3, 3);
        let dirs: Vec<Direction> = moves.iter().map(|(d, _)| *d).collect();
        assert_eq!(
            dirs,
            vec![Direction::East, Direction::South, Direction::West]
        );
    }

    #[test]
    fn ranking_prefers_closest_cell() {
        let moves = legal_directions(Coord::new(1, 1), Coord::new(1, 1), 3, 3);
        assert_eq!(
            best_direction(&moves, Coord::new(0, 0)),
            Some(Direction::South)
        );
        assert_eq!(
            best_direction(&moves, Coord::new(2, 2)),
            Some(Direction::North)
        );
    }

    #[test]
    fn ranking_ties_keep_enumeration_order() {
        // From (1, 1) towards (2, 2): north (1, 2) and east (2, 1) are equally close.
        let moves = legal_directions(Coord::new(1, 1), Coord::new(1, 1), 3, 3);
        let ranked = rank_directions(&moves, Coord::new(2, 2));
        assert_eq!(ranked[0].0, Direction::North);
        assert_eq!(ranked[1].0, Direction::East);
    }

    #[test]
    fn no_moves_on_single_cell_board() {
        let moves = legal_directions(Coord::new(0, 0), Coord::new(0, 0), 1, 1);
        assert!(moves.is_empty());
        assert_eq!(best_direction(&moves, Coord::new(0, 0)), None);
    }
}
