//! External names for planned actions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::Action;

/// The action reported for an output in the external representation.
///
/// Each variant has exactly one external string, see [`ChangeAction::as_str`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeAction {
    #[serde(rename = "no-op")]
    NoOp,
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "replace")]
    Replace,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "forget")]
    Forget,
}

impl ChangeAction {
    pub const ALL: [ChangeAction; 7] = [
        ChangeAction::NoOp,
        ChangeAction::Create,
        ChangeAction::Read,
        ChangeAction::Update,
        ChangeAction::Replace,
        ChangeAction::Delete,
        ChangeAction::Forget,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeAction::NoOp => "no-op",
            ChangeAction::Create => "create",
            ChangeAction::Read => "read",
            ChangeAction::Update => "update",
            ChangeAction::Replace => "replace",
            ChangeAction::Delete => "delete",
            ChangeAction::Forget => "forget",
        }
    }
}

impl From<Action> for ChangeAction {
    fn from(action: Action) -> Self {
        match action {
            Action::NoOp => ChangeAction::NoOp,
            Action::Create => ChangeAction::Create,
            Action::Read => ChangeAction::Read,
            Action::Update => ChangeAction::Update,
            Action::DeleteThenCreate | Action::CreateThenDelete => ChangeAction::Replace,
            Action::Delete => ChangeAction::Delete,
            Action::Forget => ChangeAction::Forget,
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that is not an external action name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized change action {0:?}")]
pub struct ParseChangeActionError(String);

impl FromStr for ChangeAction {
    type Err = ParseChangeActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangeAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseChangeActionError(s.to_string()))
    }
}
