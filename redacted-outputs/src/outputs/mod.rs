//! Builds the external output view from either a resolved state or a plan.
//!
//! - **`record`**: the shared result types (`ExternalOutput`, `Outputs`)
//! - **`action`**: external action names (`ChangeAction`)
//!
//! The two constructors never mix: records from [`Outputs::from_resolved`]
//! carry `type` and (unless sensitive) `value`, records from
//! [`Outputs::from_changes`] carry only `action`.

mod action;
mod record;

use std::collections::BTreeMap;

pub use action::{ChangeAction, ParseChangeActionError};
pub use record::{ExternalOutput, Outputs};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    plan::PlannedOutputChange,
    state::ResolvedOutput,
    value::json,
};

impl Outputs {
    /// Serializes resolved output values.
    ///
    /// Each value is deep-unmarked, then its payload and type signature are
    /// encoded separately. Sensitive outputs keep their type but lose their
    /// payload.
    ///
    /// The first output that cannot be encoded aborts the whole call: the
    /// returned [`Diagnostics`] name that output and nothing else is returned.
    pub fn from_resolved<'a, I>(values: I) -> Result<Self, Diagnostics>
    where
        I: IntoIterator<Item = (&'a String, &'a ResolvedOutput)>,
    {
        let mut records = BTreeMap::new();

        for (name, output) in values {
            let (unmarked, _) = output.value.unmark_deep();
            let ty = unmarked.ty();

            let value = json::encode_value(&unmarked, &ty).map_err(|err| {
                Diagnostic::error(
                    format!("Error serializing output {name:?}"),
                    format!("Error: {err}"),
                )
                .with_subject(name.as_str())
            })?;
            let type_json = json::encode_type(&ty).map_err(|err| {
                Diagnostic::error(
                    format!("Error serializing type of output {name:?}"),
                    format!("Error: {err}"),
                )
                .with_subject(name.as_str())
            })?;

            records.insert(
                name.clone(),
                ExternalOutput::resolved(output.sensitive, &output.deprecated, type_json, value),
            );
        }

        Ok(Self::from_records(records))
    }

    /// Builds records from planned output changes.
    ///
    /// Only the sensitivity flag and the action are used. If a name appears
    /// more than once the last change wins.
    pub fn from_changes<'a, I>(changes: I) -> Self
    where
        I: IntoIterator<Item = &'a PlannedOutputChange>,
    {
        let records = changes
            .into_iter()
            .map(|change| {
                (
                    change.addr.name().to_string(),
                    ExternalOutput::planned(change.sensitive, change.action.into()),
                )
            })
            .collect();

        Self::from_records(records)
    }
}
