//! Canonical typed-JSON encoding for values and type signatures.
//!
//! Payload and type are encoded separately. JSON alone cannot tell a set from a
//! list or an object from a map, so a consumer needs both halves to rebuild
//! the original value:
//!
//! | Type        | Signature              | Payload                  |
//! |-------------|------------------------|--------------------------|
//! | `bool`      | `"bool"`               | `true`                   |
//! | `number`    | `"number"`             | `3.25` (no exponent)     |
//! | `string`    | `"string"`             | `"x"`                    |
//! | `dynamic`   | `"dynamic"`            | `{"value":…,"type":…}`   |
//! | list/set    | `["list",T]`/`["set",T]` | `[…]`                  |
//! | map         | `["map",T]`            | `{…}`                    |
//! | object      | `["object",{"a":T}]`   | `{"a":…}`                |
//! | tuple       | `["tuple",[T,…]]`      | `[…]`                    |
//!
//! Object and map keys are written in sorted order. Capsules, unknown values,
//! and marked values have no encoding.

use std::{collections::BTreeMap, str::FromStr};

use bigdecimal::BigDecimal;
use serde::Serialize;
use serde_json::{
    value::{to_raw_value, RawValue},
    Map, Number, Value as JsonValue,
};

use super::{Path, Type, Value, ValueKind};
use crate::error::{DecodeError, EncodeError};

/// Largest decimal exponent, either way, that is still written out in full.
const MAX_PLAIN_EXPONENT: u64 = 4096;

// =============================================================================
// Encoding
// =============================================================================

/// Encodes a type signature.
pub fn encode_type(ty: &Type) -> Result<Box<RawValue>, EncodeError> {
    Ok(to_raw_value(&type_signature(ty)?)?)
}

/// Encodes `value` using `ty` as the schema.
///
/// The value must be unmarked all the way down. Passing [`Type::Dynamic`] as
/// the schema wraps the payload together with its own type signature.
pub fn encode_value(value: &Value, ty: &Type) -> Result<Box<RawValue>, EncodeError> {
    Ok(to_raw_value(&Payload::build(value, ty, &Path::root())?)?)
}

fn type_signature(ty: &Type) -> Result<JsonValue, EncodeError> {
    let constructor = |name: &str, inner: JsonValue| JsonValue::Array(vec![name.into(), inner]);
    Ok(match ty {
        Type::Bool => "bool".into(),
        Type::Number => "number".into(),
        Type::String => "string".into(),
        Type::Dynamic => "dynamic".into(),
        Type::List(element) => constructor("list", type_signature(element)?),
        Type::Set(element) => constructor("set", type_signature(element)?),
        Type::Map(element) => constructor("map", type_signature(element)?),
        Type::Object(attributes) => {
            let attributes = attributes
                .iter()
                .map(|(name, attribute)| Ok((name.clone(), type_signature(attribute)?)))
                .collect::<Result<Map<_, _>, EncodeError>>()?;
            constructor("object", JsonValue::Object(attributes))
        }
        Type::Tuple(elements) => {
            let elements = elements
                .iter()
                .map(type_signature)
                .collect::<Result<Vec<_>, _>>()?;
            constructor("tuple", JsonValue::Array(elements))
        }
        Type::Capsule(name) => {
            return Err(EncodeError::CapsuleType {
                type_name: name.clone(),
            })
        }
    })
}

/// A payload checked against its schema and ready to serialize.
///
/// Keys come out sorted. The dynamic wrapper writes `value` before `type`.
#[derive(Serialize)]
#[serde(untagged)]
enum Payload {
    Scalar(JsonValue),
    Array(Vec<Payload>),
    Entries(BTreeMap<String, Payload>),
    Dynamic {
        value: Box<Payload>,
        #[serde(rename = "type")]
        ty: JsonValue,
    },
}

impl Payload {
    fn build(value: &Value, ty: &Type, path: &Path) -> Result<Self, EncodeError> {
        if value.is_marked() {
            return Err(EncodeError::Marked { path: path.clone() });
        }

        let own_type = value.ty();
        if *ty == Type::Dynamic && own_type != Type::Dynamic {
            return Ok(Self::Dynamic {
                value: Box::new(Self::build(value, &own_type, path)?),
                ty: type_signature(&own_type)?,
            });
        }

        let mismatch = || EncodeError::TypeMismatch {
            path: path.clone(),
            expected: ty.clone(),
            found: own_type.clone(),
        };

        let payload = match (value.kind(), ty) {
            (ValueKind::Unknown(_), _) => return Err(EncodeError::Unknown { path: path.clone() }),
            (ValueKind::Capsule { type_name, .. }, _) => {
                return Err(EncodeError::Capsule {
                    path: path.clone(),
                    type_name: type_name.clone(),
                })
            }
            (ValueKind::Null(null_type), _) if null_type == ty => Self::Scalar(JsonValue::Null),
            (ValueKind::Bool(value), Type::Bool) => Self::Scalar(JsonValue::Bool(*value)),
            (ValueKind::Number(value), Type::Number) => {
                Self::Scalar(JsonValue::Number(plain_number(value, path)?))
            }
            (ValueKind::String(value), Type::String) => Self::Scalar(JsonValue::String(value.clone())),
            (ValueKind::List { elements, .. }, Type::List(element_type))
            | (ValueKind::Set { elements, .. }, Type::Set(element_type)) => Self::Array(
                elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| Self::build(element, element_type, &path.index(i)))
                    .collect::<Result<_, _>>()?,
            ),
            (ValueKind::Map { entries, .. }, Type::Map(element_type)) => Self::Entries(
                entries
                    .iter()
                    .map(|(key, entry)| Ok((key.clone(), Self::build(entry, element_type, &path.key(key))?)))
                    .collect::<Result<_, EncodeError>>()?,
            ),
            (ValueKind::Object(attributes), Type::Object(attribute_types)) => {
                if attributes.len() != attribute_types.len() {
                    return Err(mismatch());
                }
                Self::Entries(
                    attribute_types
                        .iter()
                        .map(|(name, attribute_type)| {
                            let attribute = attributes.get(name).ok_or_else(mismatch)?;
                            Ok((name.clone(), Self::build(attribute, attribute_type, &path.attr(name))?))
                        })
                        .collect::<Result<_, EncodeError>>()?,
                )
            }
            (ValueKind::Tuple(elements), Type::Tuple(element_types)) => {
                if elements.len() != element_types.len() {
                    return Err(mismatch());
                }
                Self::Array(
                    elements
                        .iter()
                        .zip(element_types)
                        .enumerate()
                        .map(|(i, (element, element_type))| Self::build(element, element_type, &path.index(i)))
                        .collect::<Result<_, _>>()?,
                )
            }
            _ => return Err(mismatch()),
        };
        Ok(payload)
    }
}

fn plain_number(number: &BigDecimal, path: &Path) -> Result<Number, EncodeError> {
    let text = plain_decimal(number).ok_or_else(|| EncodeError::NumberOutOfRange { path: path.clone() })?;
    Ok(Number::from_str(&text)?)
}

/// Renders a number with the minimal digits and no exponent.
///
/// Returns `None` when the exponent is beyond [`MAX_PLAIN_EXPONENT`].
fn plain_decimal(number: &BigDecimal) -> Option<String> {
    let (digits, scale) = number.normalized().as_bigint_and_exponent();
    let digits = digits.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };
    if digits == "0" {
        return Some("0".to_string());
    }
    if scale.unsigned_abs() > MAX_PLAIN_EXPONENT {
        return None;
    }
    let shift = usize::try_from(scale.unsigned_abs()).ok()?;
    let text = if scale <= 0 {
        format!("{sign}{digits}{}", "0".repeat(shift))
    } else if digits.len() > shift {
        let (int, frac) = digits.split_at(digits.len() - shift);
        format!("{sign}{int}.{frac}")
    } else {
        format!("{sign}0.{}{digits}", "0".repeat(shift - digits.len()))
    };
    Some(text)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes a type signature produced by [`encode_type`].
pub fn decode_type(json: &str) -> Result<Type, DecodeError> {
    let raw: JsonValue = serde_json::from_str(json)?;
    type_from_json(&raw)
}

/// Decodes a payload produced by [`encode_value`] against `ty`.
pub fn decode_value(json: &str, ty: &Type) -> Result<Value, DecodeError> {
    let raw: JsonValue = serde_json::from_str(json)?;
    value_from_json(&raw, ty, &Path::root())
}

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError::MalformedType {
        reason: reason.into(),
    }
}

fn type_from_json(raw: &JsonValue) -> Result<Type, DecodeError> {
    match raw {
        JsonValue::String(name) => match name.as_str() {
            "bool" => Ok(Type::Bool),
            "number" => Ok(Type::Number),
            "string" => Ok(Type::String),
            "dynamic" => Ok(Type::Dynamic),
            other => Err(malformed(format!("unsupported primitive type {other:?}"))),
        },
        JsonValue::Array(items) => {
            let Some((JsonValue::String(kind), rest)) = items.split_first() else {
                return Err(malformed("type constructor must start with its name"));
            };
            match (kind.as_str(), rest) {
                ("list", [element]) => Ok(Type::list(type_from_json(element)?)),
                ("set", [element]) => Ok(Type::set(type_from_json(element)?)),
                ("map", [element]) => Ok(Type::map(type_from_json(element)?)),
                ("object", [JsonValue::Object(attributes)]) => attributes
                    .iter()
                    .map(|(name, attribute)| Ok((name.clone(), type_from_json(attribute)?)))
                    .collect::<Result<BTreeMap<_, _>, DecodeError>>()
                    .map(Type::Object),
                ("tuple", [JsonValue::Array(elements)]) => elements
                    .iter()
                    .map(type_from_json)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Type::Tuple),
                (other, _) => Err(malformed(format!("unsupported type constructor {other:?}"))),
            }
        }
        _ => Err(malformed("expected a type name or a type constructor")),
    }
}

fn expected(path: &Path, what: &str) -> DecodeError {
    DecodeError::Expected {
        path: path.clone(),
        expected: what.to_string(),
    }
}

fn value_from_json(raw: &JsonValue, ty: &Type, path: &Path) -> Result<Value, DecodeError> {
    match ty {
        Type::Dynamic => dynamic_from_json(raw, path),
        _ if raw.is_null() => Ok(Value::null(ty.clone())),
        Type::Bool => match raw {
            JsonValue::Bool(value) => Ok(Value::bool(*value)),
            JsonValue::String(text) if text == "true" => Ok(Value::bool(true)),
            JsonValue::String(text) if text == "false" => Ok(Value::bool(false)),
            _ => Err(expected(path, "bool")),
        },
        Type::Number => match raw {
            JsonValue::Number(number) => number_from_text(&number.to_string(), path),
            JsonValue::String(text) => number_from_text(text, path),
            _ => Err(expected(path, "number")),
        },
        Type::String => match raw {
            JsonValue::String(text) => Ok(Value::string(text.clone())),
            JsonValue::Number(number) => Ok(Value::string(number.to_string())),
            JsonValue::Bool(value) => Ok(Value::string(value.to_string())),
            _ => Err(expected(path, "string")),
        },
        Type::List(element_type) | Type::Set(element_type) => {
            let JsonValue::Array(items) = raw else {
                return Err(expected(path, "array"));
            };
            let elements = items
                .iter()
                .enumerate()
                .map(|(i, item)| value_from_json(item, element_type, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()?;
            let built = if matches!(ty, Type::Set(_)) {
                Value::set((**element_type).clone(), elements)
            } else {
                Value::list((**element_type).clone(), elements)
            };
            built.map_err(|source| DecodeError::Construct {
                path: path.clone(),
                source,
            })
        }
        Type::Map(element_type) => {
            let JsonValue::Object(items) = raw else {
                return Err(expected(path, "object"));
            };
            let entries = items
                .iter()
                .map(|(key, item)| Ok((key.clone(), value_from_json(item, element_type, &path.key(key))?)))
                .collect::<Result<Vec<_>, DecodeError>>()?;
            Value::map((**element_type).clone(), entries).map_err(|source| {
                DecodeError::Construct {
                    path: path.clone(),
                    source,
                }
            })
        }
        Type::Object(attribute_types) => {
            let JsonValue::Object(items) = raw else {
                return Err(expected(path, "object"));
            };
            if let Some(name) = items.keys().find(|name| !attribute_types.contains_key(*name)) {
                return Err(DecodeError::UnsupportedAttribute {
                    path: path.clone(),
                    name: name.clone(),
                });
            }
            let attributes = attribute_types
                .iter()
                .map(|(name, attribute_type)| {
                    let item = items.get(name).ok_or_else(|| DecodeError::MissingAttribute {
                        path: path.clone(),
                        name: name.clone(),
                    })?;
                    Ok((name.clone(), value_from_json(item, attribute_type, &path.attr(name))?))
                })
                .collect::<Result<Vec<_>, DecodeError>>()?;
            Ok(Value::object(attributes))
        }
        Type::Tuple(element_types) => {
            let JsonValue::Array(items) = raw else {
                return Err(expected(path, "array"));
            };
            if items.len() != element_types.len() {
                return Err(DecodeError::TupleLength {
                    path: path.clone(),
                    expected: element_types.len(),
                    found: items.len(),
                });
            }
            items
                .iter()
                .zip(element_types)
                .enumerate()
                .map(|(i, (item, element_type))| value_from_json(item, element_type, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::tuple)
        }
        Type::Capsule(type_name) => Err(DecodeError::Capsule {
            path: path.clone(),
            type_name: type_name.clone(),
        }),
    }
}

fn dynamic_from_json(raw: &JsonValue, path: &Path) -> Result<Value, DecodeError> {
    let JsonValue::Object(items) = raw else {
        if raw.is_null() {
            return Ok(Value::null(Type::Dynamic));
        }
        return Err(expected(path, "object with \"value\" and \"type\""));
    };
    if let Some(name) = items.keys().find(|name| *name != "value" && *name != "type") {
        return Err(DecodeError::UnsupportedAttribute {
            path: path.clone(),
            name: name.clone(),
        });
    }
    let missing = |name: &str| DecodeError::MissingAttribute {
        path: path.clone(),
        name: name.to_string(),
    };
    let ty = type_from_json(items.get("type").ok_or_else(|| missing("type"))?)?;
    let value = items.get("value").ok_or_else(|| missing("value"))?;
    value_from_json(value, &ty, path)
}

fn number_from_text(text: &str, path: &Path) -> Result<Value, DecodeError> {
    text.trim()
        .parse::<BigDecimal>()
        .map(Value::number)
        .map_err(|_| DecodeError::InvalidNumber {
            path: path.clone(),
            text: text.to_string(),
        })
}
