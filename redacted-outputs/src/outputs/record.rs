//! The external per-output record and the name-keyed set of records.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use serde_json::value::RawValue;

use super::ChangeAction;
use crate::{
    error::DecodeError,
    value::{json, Type, Value},
};

/// One output in the external representation.
///
/// Records are only built by [`Outputs::from_resolved`] and
/// [`Outputs::from_changes`]:
///
/// - a sensitive record never carries `value`;
/// - a record carries either `type`/`value` or `action`, never both.
#[derive(Clone, Debug, Serialize)]
pub struct ExternalOutput {
    sensitive: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    deprecated: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    ty: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<ChangeAction>,
}

impl ExternalOutput {
    /// Record for a resolved value. The payload is dropped when `sensitive`.
    pub(crate) fn resolved(
        sensitive: bool,
        deprecated: &str,
        ty: Box<RawValue>,
        value: Box<RawValue>,
    ) -> Self {
        Self {
            sensitive,
            deprecated: deprecated.to_string(),
            ty: Some(ty),
            value: (!sensitive).then_some(value),
            action: None,
        }
    }

    /// Record for a planned change.
    pub(crate) fn planned(sensitive: bool, action: ChangeAction) -> Self {
        Self {
            sensitive,
            deprecated: String::new(),
            ty: None,
            value: None,
            action: Some(action),
        }
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// The deprecation notice, if there is one.
    pub fn deprecated(&self) -> Option<&str> {
        (!self.deprecated.is_empty()).then_some(self.deprecated.as_str())
    }

    /// Encoded type signature.
    pub fn type_json(&self) -> Option<&RawValue> {
        self.ty.as_deref()
    }

    /// Encoded payload. Absent for sensitive outputs and planned changes.
    pub fn value_json(&self) -> Option<&RawValue> {
        self.value.as_deref()
    }

    pub fn action(&self) -> Option<ChangeAction> {
        self.action
    }

    /// Decodes the type signature.
    pub fn decoded_type(&self) -> Result<Option<Type>, DecodeError> {
        self.ty
            .as_deref()
            .map(|raw| json::decode_type(raw.get()))
            .transpose()
    }

    /// Decodes the payload against the record's own type signature.
    pub fn decoded_value(&self) -> Result<Option<Value>, DecodeError> {
        let (Some(ty), Some(value)) = (self.decoded_type()?, self.value.as_deref()) else {
            return Ok(None);
        };
        json::decode_value(value.get(), &ty).map(Some)
    }
}

/// External records keyed by output name.
///
/// Built once per call and read-only afterwards. Serializes as a JSON object.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Outputs(BTreeMap<String, ExternalOutput>);

impl Outputs {
    pub(crate) fn from_records(records: BTreeMap<String, ExternalOutput>) -> Self {
        Self(records)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ExternalOutput> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExternalOutput)> {
        self.0.iter().map(|(name, record)| (name.as_str(), record))
    }
}

impl IntoIterator for Outputs {
    type Item = (String, ExternalOutput);
    type IntoIter = std::collections::btree_map::IntoIter<String, ExternalOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Outputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Outputs: {}", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, value::RawValue};

    use super::{ExternalOutput, Outputs};
    use crate::outputs::ChangeAction;

    fn raw(text: &str) -> Box<RawValue> {
        RawValue::from_string(text.to_string()).unwrap()
    }

    #[test]
    fn sensitive_records_drop_the_payload() {
        let record = ExternalOutput::resolved(true, "", raw(r#""string""#), raw(r#""hunter2""#));
        assert!(record.value_json().is_none());
        assert_eq!(record.type_json().unwrap().get(), r#""string""#);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"sensitive": true, "type": "string"})
        );
    }

    #[test]
    fn planned_records_only_carry_action() {
        let record = ExternalOutput::planned(false, ChangeAction::Create);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"sensitive": false, "action": "create"})
        );
        assert!(record.decoded_type().unwrap().is_none());
        assert!(record.decoded_value().unwrap().is_none());
    }

    #[test]
    fn empty_deprecation_is_absent() {
        let record = ExternalOutput::resolved(false, "", raw(r#""number""#), raw("1"));
        assert_eq!(record.deprecated(), None);
        let record = ExternalOutput::resolved(false, "old", raw(r#""number""#), raw("1"));
        assert_eq!(record.deprecated(), Some("old"));
    }

    #[test]
    fn display_counts_records() {
        assert_eq!(Outputs::default().to_string(), "Outputs: 0");
    }
}
