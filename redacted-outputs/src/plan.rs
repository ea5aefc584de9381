//! Planned changes to outputs, as recorded by a plan.
//!
//! A planned change knows what will happen to an output but not the value it
//! will end up with.

use std::fmt;

/// The effect a plan intends to have on an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    NoOp,
    Create,
    Read,
    Update,
    DeleteThenCreate,
    CreateThenDelete,
    Delete,
    /// Drop the object from state without destroying it.
    Forget,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::NoOp,
        Action::Create,
        Action::Read,
        Action::Update,
        Action::DeleteThenCreate,
        Action::CreateThenDelete,
        Action::Delete,
        Action::Forget,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::NoOp => "NoOp",
            Action::Create => "Create",
            Action::Read => "Read",
            Action::Update => "Update",
            Action::DeleteThenCreate => "DeleteThenCreate",
            Action::CreateThenDelete => "CreateThenDelete",
            Action::Delete => "Delete",
            Action::Forget => "Forget",
        };
        f.write_str(label)
    }
}

/// Absolute address of an output: the module instance path plus its name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutputAddr {
    module: Vec<String>,
    name: String,
}

impl OutputAddr {
    /// An output of the root module.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            module: Vec::new(),
            name: name.into(),
        }
    }

    /// An output of a nested module. `module` lists call names from the root.
    pub fn in_module<I, S>(module: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            module: module.into_iter().map(Into::into).collect(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for OutputAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for call in &self.module {
            write!(f, "module.{call}.")?;
        }
        write!(f, "output.{}", self.name)
    }
}

/// A planned change to a single output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedOutputChange {
    pub addr: OutputAddr,
    pub sensitive: bool,
    pub action: Action,
}

impl PlannedOutputChange {
    pub fn new(addr: OutputAddr, action: Action) -> Self {
        Self {
            addr,
            sensitive: false,
            action,
        }
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, OutputAddr};

    #[test]
    fn addresses_render_module_path() {
        assert_eq!(OutputAddr::root("endpoint").to_string(), "output.endpoint");
        assert_eq!(
            OutputAddr::in_module(["net", "vpc"], "id").to_string(),
            "module.net.module.vpc.output.id"
        );
        assert_eq!(OutputAddr::in_module(["net"], "id").name(), "id");
    }

    #[test]
    fn action_table_lists_every_variant_once() {
        let mut labels: Vec<String> = Action::ALL.iter().map(ToString::to_string).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Action::ALL.len());
    }
}
