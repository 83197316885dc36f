//! Identifier types for generated states and decision-graph nodes.
//!
//! The generator refers to interned states by a dense [`StateId`]; the solver
//! works on named states and actions ([`StateName`], [`ActionName`]) so that it
//! can consume hand-built graphs as well as projected ones.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Dense index of an interned state inside a [`crate::world::StateGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(u32);

impl StateId {
    /// Number of distinct identifiers, indices `0..CAPACITY`.
    pub const CAPACITY: usize = u32::MAX as usize;

    /// Identifier for a table index, or `None` past [`Self::CAPACITY`].
    pub fn try_from_index(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .filter(|&index| index < u32::MAX)
            .map(Self)
    }

    /// Build an identifier from an index handed out by a table.
    ///
    /// # Panics
    ///
    /// Panics if the index is not below [`Self::CAPACITY`].
    pub fn from_index(index: usize) -> Self {
        match Self::try_from_index(index) {
            Some(id) => id,
            None => panic!("state index {index} exceeds identifier capacity"),
        }
    }

    /// Position of the state in the intern table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Name of a state in a decision graph.
///
/// # Examples
///
/// ```
/// use campfire::identifiers::StateName;
///
/// let state = StateName::new("ReadingDay1");
/// assert_eq!(state.as_str(), "ReadingDay1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateName(String);

impl StateName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for StateName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Borrow<str> for StateName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for StateName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for StateName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<StateId> for StateName {
    fn from(id: StateId) -> Self {
        Self::new(id.to_string())
    }
}

/// Name of an action available in a decision-graph state.
///
/// Actions are ordered lexicographically; the solver relies on this ordering
/// for reproducible tie-breaking.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionName(String);

impl ActionName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for ActionName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Borrow<str> for ActionName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for ActionName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ActionName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
