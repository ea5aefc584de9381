//! Locations inside a nested value, used to point encode and decode errors at
//! the offending node.

use std::fmt;

/// One step from a container into one of its children.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// An object attribute.
    Attr(String),
    /// A list, set, or tuple position.
    Index(usize),
    /// A map key.
    Key(String),
}

/// A sequence of steps from the root value. The empty path is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathStep>);

impl Path {
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
    /// Returns a new path extended by `step`.
    #[must_use]
    pub fn child(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Self {
        self.child(PathStep::Attr(name.to_string()))
    }

    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.child(PathStep::Index(index))
    }

    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        self.child(PathStep::Key(key.to_string()))
    }

    /// Renders the path followed by `": "`, or nothing for the root.
    pub(crate) fn prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{self}: ")
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            match step {
                PathStep::Attr(name) => write!(f, ".{name}")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
                PathStep::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}
