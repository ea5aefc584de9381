//! Annotation side channel carried by every [`Value`](super::Value) node.
//!
//! Marks are metadata, not data: they never take part in a value's type and
//! stripping them never fails.

use std::{collections::BTreeSet, fmt};

/// A tracking annotation attached to a value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mark {
    /// The payload must never appear in an external representation.
    Sensitive,
    /// The value must not be persisted.
    Ephemeral,
    /// The value comes from a deprecated source.
    Deprecated(String),
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Sensitive => f.write_str("sensitive"),
            Mark::Ephemeral => f.write_str("ephemeral"),
            Mark::Deprecated(message) => write!(f, "deprecated: {message}"),
        }
    }
}

/// An ordered set of [`Mark`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Marks(BTreeSet<Mark>);

impl Marks {
    /// Returns an empty mark set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mark: Mark) -> bool {
        self.0.insert(mark)
    }

    /// Adds every mark from `other`.
    pub fn extend_from(&mut self, other: Marks) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, mark: &Mark) -> bool {
        self.0.contains(mark)
    }

    pub fn is_sensitive(&self) -> bool {
        self.0.contains(&Mark::Sensitive)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.0.iter()
    }
}

impl FromIterator<Mark> for Marks {
    fn from_iter<T: IntoIterator<Item = Mark>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Marks {
    type Item = Mark;
    type IntoIter = std::collections::btree_set::IntoIter<Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
