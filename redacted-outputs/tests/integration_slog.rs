//! Integration tests for the slog module.
//!
//! These tests verify that:
//! - `Outputs` and `ExternalOutput` log as structured JSON with no payload for
//!   sensitive outputs
//! - `Value` logs as `[REDACTED]` whenever any node is sensitive
//! - `ChangeAction` and `Diagnostics` log in their external forms

#![cfg(feature = "slog")]

use std::{cell::RefCell, collections::HashMap, fmt::Arguments};

use redacted_outputs::{
    slog::{redacted_json, SERIALIZE_FAILURE_PLACEHOLDER},
    Action, ChangeAction, OutputAddr, Outputs, PlannedOutputChange, ResolvedOutput, Type, Value,
};
use serde_json::{json, Value as JsonValue};

// A test serializer that captures serialized key-value pairs
struct CapturingSerializer {
    captured: RefCell<HashMap<String, CapturedValue>>,
}

#[derive(Debug, Clone, PartialEq)]
enum CapturedValue {
    Str(String),
    Other,
    // For nested serde values, we capture the JSON representation
    Serde(JsonValue),
}

impl CapturingSerializer {
    fn new() -> Self {
        Self {
            captured: RefCell::new(HashMap::new()),
        }
    }

    fn get(&self, key: &str) -> Option<CapturedValue> {
        self.captured.borrow().get(key).cloned()
    }

    fn insert(&self, key: slog::Key, value: CapturedValue) {
        self.captured.borrow_mut().insert(key.into(), value);
    }
}

impl slog::Serializer for CapturingSerializer {
    fn emit_arguments(&mut self, key: slog::Key, val: &Arguments<'_>) -> slog::Result {
        self.insert(key, CapturedValue::Str(val.to_string()));
        Ok(())
    }

    fn emit_str(&mut self, key: slog::Key, val: &str) -> slog::Result {
        self.insert(key, CapturedValue::Str(val.into()));
        Ok(())
    }

    fn emit_bool(&mut self, key: slog::Key, _val: bool) -> slog::Result {
        self.insert(key, CapturedValue::Other);
        Ok(())
    }

    fn emit_serde(&mut self, key: slog::Key, val: &dyn slog::SerdeValue) -> slog::Result {
        let json = serde_json::to_value(val.as_serde()).unwrap_or(JsonValue::Null);
        self.insert(key, CapturedValue::Serde(json));
        Ok(())
    }
}

/// Helper function to serialize a slog::Value into any Serializer.
fn serialize_to_capture<V: slog::Value, S: slog::Serializer>(
    value: &V,
    key: &'static str,
    serializer: &mut S,
) {
    static RS: slog::RecordStatic<'static> = slog::record_static!(slog::Level::Info, "");
    let args = format_args!("");
    let record = slog::Record::new(&RS, &args, slog::b!());
    value.serialize(&record, key, serializer).unwrap();
}

fn capture<V: slog::Value>(value: &V) -> CapturedValue {
    let mut serializer = CapturingSerializer::new();
    serialize_to_capture(value, "field", &mut serializer);
    serializer.get("field").expect("value was not emitted")
}

// ============================================================================
// Outputs
// ============================================================================

#[test]
fn outputs_log_as_redacted_json() {
    let values = HashMap::from([
        (
            "password".to_string(),
            ResolvedOutput::new(Value::string("hunter2")).sensitive(),
        ),
        ("port".to_string(), ResolvedOutput::new(Value::number(8080))),
    ]);
    let outputs = Outputs::from_resolved(&values).unwrap();

    let CapturedValue::Serde(json) = capture(&outputs) else {
        panic!("Expected Serde value for outputs");
    };

    assert_eq!(json["password"], json!({"sensitive": true, "type": "string"}));
    assert_eq!(json["port"]["value"], json!(8080));
    assert!(!json.to_string().contains("hunter2"));
}

#[test]
fn single_record_logs_as_json() {
    let changes = [PlannedOutputChange::new(OutputAddr::root("url"), Action::Read)];
    let outputs = Outputs::from_changes(&changes);

    let captured = capture(outputs.get("url").unwrap());

    assert_eq!(
        captured,
        CapturedValue::Serde(json!({"sensitive": false, "action": "read"}))
    );
}

#[test]
fn change_action_logs_external_name() {
    assert_eq!(
        capture(&ChangeAction::NoOp),
        CapturedValue::Str("no-op".to_string())
    );
}

#[test]
fn diagnostics_log_as_json() {
    let values = HashMap::from([(
        "later".to_string(),
        ResolvedOutput::new(Value::unknown(Type::Number)),
    )]);
    let diags = Outputs::from_resolved(&values).unwrap_err();

    let CapturedValue::Serde(json) = capture(&diags) else {
        panic!("Expected Serde value for diagnostics");
    };

    assert_eq!(json[0]["severity"], "error");
    assert_eq!(json[0]["subject"], "later");
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn plain_value_logs_its_payload() {
    let value = Value::object([("zone", Value::string("eu-west-1"))]);
    assert_eq!(
        capture(&value),
        CapturedValue::Serde(json!({"zone": "eu-west-1"}))
    );
}

#[test]
fn nested_sensitive_value_is_redacted_whole() {
    let value = Value::object([
        ("zone", Value::string("eu-west-1")),
        ("key", Value::string("hunter2").sensitive()),
    ]);
    assert_eq!(
        capture(&value),
        CapturedValue::Serde(json!("[REDACTED]"))
    );
}

#[test]
fn non_sensitive_marks_are_stripped_for_logging() {
    let value = Value::string("soon gone").mark(redacted_outputs::Mark::Ephemeral);
    assert_eq!(redacted_json(&value).as_json(), &json!("soon gone"));
}

#[test]
fn unencodable_value_logs_placeholder() {
    let value = Value::unknown(Type::String);
    assert_eq!(
        redacted_json(&value).as_json(),
        &JsonValue::String(SERIALIZE_FAILURE_PLACEHOLDER.to_string())
    );
}

#[test]
fn out_of_range_number_logs_placeholder() {
    let huge: bigdecimal::BigDecimal = "1e100000000000".parse().unwrap();
    let value = Value::number(huge);
    assert_eq!(
        redacted_json(&value).as_json(),
        &JsonValue::String(SERIALIZE_FAILURE_PLACEHOLDER.to_string())
    );
}
