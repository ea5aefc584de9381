//! Adapters for emitting outputs, actions, diagnostics, and values through `slog`.
//!
//! This module provides `slog::Value` implementations that serialize as
//! structured JSON via `slog`'s nested-value support.
//!
//! It is responsible for:
//! - Ensuring nothing logged here exposes a sensitive payload. Records in
//!   [`Outputs`] are already redacted; a [`Value`] with any sensitive node is
//!   logged as [`REDACTED_PLACEHOLDER`].
//! - Avoiding fallible logging APIs: serialization failures are represented as
//!   placeholder strings rather than propagated as errors.
//!
//! It does not configure `slog` or decide what gets logged.

use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    diagnostics::Diagnostics,
    outputs::{ChangeAction, ExternalOutput, Outputs},
    value::{json, Value, REDACTED_PLACEHOLDER},
};

/// Placeholder logged when a value cannot be turned into JSON.
pub const SERIALIZE_FAILURE_PLACEHOLDER: &str = "Failed to serialize value";

/// A `slog::Value` that emits an owned payload as structured JSON.
pub struct RedactedJson {
    value: JsonValue,
}

impl RedactedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    fn from_serialize<T: Serialize>(value: &T) -> Self {
        Self::new(serde_json::to_value(value).unwrap_or_else(|_| {
            JsonValue::String(SERIALIZE_FAILURE_PLACEHOLDER.to_string())
        }))
    }

    /// The JSON that will be logged.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for RedactedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts a value into its loggable JSON form.
///
/// Any sensitive node anywhere in the tree redacts the whole value. Otherwise
/// the marks are stripped and the canonical payload is logged.
pub fn redacted_json(value: &Value) -> RedactedJson {
    if value.contains_sensitive() {
        return RedactedJson::new(JsonValue::String(REDACTED_PLACEHOLDER.to_string()));
    }
    let (plain, _) = value.unmark_deep();
    let encoded = json::encode_value(&plain, &plain.ty())
        .ok()
        .and_then(|raw| serde_json::from_str::<JsonValue>(raw.get()).ok());
    RedactedJson::new(encoded.unwrap_or_else(|| {
        JsonValue::String(SERIALIZE_FAILURE_PLACEHOLDER.to_string())
    }))
}

impl SlogValue for Value {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        redacted_json(self).serialize(record, key, serializer)
    }
}

impl SlogValue for Outputs {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        RedactedJson::from_serialize(self).serialize(record, key, serializer)
    }
}

impl SlogValue for ExternalOutput {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        RedactedJson::from_serialize(self).serialize(record, key, serializer)
    }
}

impl SlogValue for Diagnostics {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        RedactedJson::from_serialize(self).serialize(record, key, serializer)
    }
}

impl SlogValue for ChangeAction {
    fn serialize(
        &self,
        _record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        serializer.emit_str(key, self.as_str())
    }
}
