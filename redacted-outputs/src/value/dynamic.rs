//! The dynamic value tree and its mark side channel.
//!
//! Every node is a [`ValueKind`] plus a [`Marks`] set. Marks never change a
//! node's type, and [`Value::unmark_deep`] rebuilds the same tree with every
//! mark set cleared.

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use bigdecimal::BigDecimal;

use super::{Mark, Marks, Type};
use crate::error::ValueError;

/// Placeholder printed in place of a sensitive payload.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// =============================================================================
// Value - tagged tree with marks
// =============================================================================

/// A dynamically typed value.
///
/// Collections validate their element types on construction, so a value is
/// always consistent with its own [`Value::ty`].
///
/// `Debug` prints [`REDACTED_PLACEHOLDER`] for any node marked
/// [`Mark::Sensitive`], except under `cfg(test)` or the `testing` feature.
#[derive(Clone, PartialEq)]
pub struct Value {
    kind: ValueKind,
    marks: Marks,
}

/// The payload of a single [`Value`] node.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    /// A null of the given type.
    Null(Type),
    /// A value of the given type that is not known yet.
    Unknown(Type),
    Bool(bool),
    Number(BigDecimal),
    String(String),
    List {
        element_type: Type,
        elements: Vec<Value>,
    },
    /// Elements are unique and kept in canonical order.
    Set {
        element_type: Type,
        elements: Vec<Value>,
    },
    Map {
        element_type: Type,
        entries: BTreeMap<String, Value>,
    },
    Object(BTreeMap<String, Value>),
    Tuple(Vec<Value>),
    /// An opaque handle. Only the type name and an identity are visible.
    Capsule { type_name: String, id: u64 },
}

impl Value {
    fn from_kind(kind: ValueKind) -> Self {
        Self {
            kind,
            marks: Marks::new(),
        }
    }

    #[must_use]
    pub fn null(ty: Type) -> Self {
        Self::from_kind(ValueKind::Null(ty))
    }

    #[must_use]
    pub fn unknown(ty: Type) -> Self {
        Self::from_kind(ValueKind::Unknown(ty))
    }

    #[must_use]
    pub fn bool(value: bool) -> Self {
        Self::from_kind(ValueKind::Bool(value))
    }

    pub fn number<N: Into<BigDecimal>>(value: N) -> Self {
        Self::from_kind(ValueKind::Number(value.into()))
    }

    /// Builds a number from a float. Returns `None` for NaN and infinities.
    pub fn number_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        value.to_string().parse::<BigDecimal>().ok().map(Self::number)
    }

    pub fn string<S: Into<String>>(value: S) -> Self {
        Self::from_kind(ValueKind::String(value.into()))
    }

    /// Builds a list. Every element must have exactly `element_type`.
    pub fn list(element_type: Type, elements: Vec<Value>) -> Result<Self, ValueError> {
        check_elements(&element_type, &elements)?;
        Ok(Self::from_kind(ValueKind::List {
            element_type,
            elements,
        }))
    }

    /// Builds a set.
    ///
    /// Element marks are moved onto the set itself, then duplicates are
    /// removed and the elements are put in canonical order.
    pub fn set(element_type: Type, elements: Vec<Value>) -> Result<Self, ValueError> {
        let mut marks = Marks::new();
        let mut elements: Vec<Value> = elements
            .into_iter()
            .map(|element| {
                let (plain, element_marks) = element.into_unmarked_deep();
                marks.extend_from(element_marks);
                plain
            })
            .collect();
        check_elements(&element_type, &elements)?;
        elements.sort_by(canonical_cmp);
        elements.dedup();
        Ok(Self::from_kind(ValueKind::Set {
            element_type,
            elements,
        })
        .with_marks(marks))
    }

    /// Builds a map. Every entry must have exactly `element_type`.
    pub fn map<I, K>(element_type: Type, entries: I) -> Result<Self, ValueError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entries: BTreeMap<String, Value> = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        for (key, value) in &entries {
            let found = value.ty();
            if found != element_type {
                return Err(ValueError::MapElementType {
                    key: key.clone(),
                    expected: element_type,
                    found,
                });
            }
        }
        Ok(Self::from_kind(ValueKind::Map {
            element_type,
            entries,
        }))
    }

    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::from_kind(ValueKind::Object(
            attributes
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        ))
    }

    #[must_use]
    pub fn tuple(elements: Vec<Value>) -> Self {
        Self::from_kind(ValueKind::Tuple(elements))
    }

    pub fn capsule<S: Into<String>>(type_name: S, id: u64) -> Self {
        Self::from_kind(ValueKind::Capsule {
            type_name: type_name.into(),
            id,
        })
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Returns the structural type of this value.
    pub fn ty(&self) -> Type {
        match &self.kind {
            ValueKind::Null(ty) | ValueKind::Unknown(ty) => ty.clone(),
            ValueKind::Bool(_) => Type::Bool,
            ValueKind::Number(_) => Type::Number,
            ValueKind::String(_) => Type::String,
            ValueKind::List { element_type, .. } => Type::list(element_type.clone()),
            ValueKind::Set { element_type, .. } => Type::set(element_type.clone()),
            ValueKind::Map { element_type, .. } => Type::map(element_type.clone()),
            ValueKind::Object(attributes) => Type::Object(
                attributes
                    .iter()
                    .map(|(name, value)| (name.clone(), value.ty()))
                    .collect(),
            ),
            ValueKind::Tuple(elements) => Type::Tuple(elements.iter().map(Value::ty).collect()),
            ValueKind::Capsule { type_name, .. } => Type::Capsule(type_name.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null(_))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self.kind, ValueKind::Unknown(_))
    }

    fn children(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match &self.kind {
            ValueKind::List { elements, .. }
            | ValueKind::Set { elements, .. }
            | ValueKind::Tuple(elements) => Box::new(elements.iter()),
            ValueKind::Map { entries, .. } | ValueKind::Object(entries) => {
                Box::new(entries.values())
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    // =========================================================================
    // Marks
    // =========================================================================

    #[must_use]
    pub fn mark(mut self, mark: Mark) -> Self {
        self.marks.insert(mark);
        self
    }

    #[must_use]
    pub fn with_marks(mut self, marks: Marks) -> Self {
        self.marks.extend_from(marks);
        self
    }

    /// Shorthand for `mark(Mark::Sensitive)`.
    #[must_use]
    pub fn sensitive(self) -> Self {
        self.mark(Mark::Sensitive)
    }

    /// Marks on this node only.
    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    pub fn is_marked(&self) -> bool {
        !self.marks.is_empty()
    }

    pub fn has_mark(&self, mark: &Mark) -> bool {
        self.marks.contains(mark)
    }

    /// Returns `true` if this node or any descendant carries a mark.
    pub fn contains_marks(&self) -> bool {
        self.is_marked() || self.children().any(Value::contains_marks)
    }

    /// Returns `true` if this node or any descendant is marked sensitive.
    pub fn contains_sensitive(&self) -> bool {
        self.marks.is_sensitive() || self.children().any(Value::contains_sensitive)
    }

    /// Removes the marks on this node only.
    #[must_use]
    pub fn unmark(self) -> (Value, Marks) {
        let Value { kind, marks } = self;
        (Value::from_kind(kind), marks)
    }

    /// Returns a copy with every mark removed, plus the union of the removed
    /// marks.
    pub fn unmark_deep(&self) -> (Value, Marks) {
        self.clone().into_unmarked_deep()
    }

    /// Consuming form of [`Value::unmark_deep`].
    #[must_use]
    pub fn into_unmarked_deep(self) -> (Value, Marks) {
        let mut removed = Marks::new();
        let plain = self.strip_marks(&mut removed);
        (plain, removed)
    }

    fn strip_marks(self, removed: &mut Marks) -> Value {
        let Value { kind, marks } = self;
        removed.extend_from(marks);
        let kind = match kind {
            ValueKind::List {
                element_type,
                elements,
            } => ValueKind::List {
                element_type,
                elements: strip_all(elements, removed),
            },
            ValueKind::Set {
                element_type,
                elements,
            } => ValueKind::Set {
                element_type,
                elements: strip_all(elements, removed),
            },
            ValueKind::Map {
                element_type,
                entries,
            } => ValueKind::Map {
                element_type,
                entries: entries
                    .into_iter()
                    .map(|(key, value)| (key, value.strip_marks(removed)))
                    .collect(),
            },
            ValueKind::Object(attributes) => ValueKind::Object(
                attributes
                    .into_iter()
                    .map(|(name, value)| (name, value.strip_marks(removed)))
                    .collect(),
            ),
            ValueKind::Tuple(elements) => ValueKind::Tuple(strip_all(elements, removed)),
            other => other,
        };
        Value::from_kind(kind)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&BigDecimal> {
        match &self.kind {
            ValueKind::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(value) => Some(value),
            _ => None,
        }
    }

    /// Elements of a list, set, or tuple.
    pub fn elements(&self) -> Option<&[Value]> {
        match &self.kind {
            ValueKind::List { elements, .. }
            | ValueKind::Set { elements, .. }
            | ValueKind::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    /// Entries of a map or attributes of an object.
    pub fn entries(&self) -> Option<&BTreeMap<String, Value>> {
        match &self.kind {
            ValueKind::Map { entries, .. } | ValueKind::Object(entries) => Some(entries),
            _ => None,
        }
    }
}

fn strip_all(elements: Vec<Value>, removed: &mut Marks) -> Vec<Value> {
    elements
        .into_iter()
        .map(|element| element.strip_marks(removed))
        .collect()
}

fn check_elements(element_type: &Type, elements: &[Value]) -> Result<(), ValueError> {
    for (index, element) in elements.iter().enumerate() {
        let found = element.ty();
        if found != *element_type {
            return Err(ValueError::ElementType {
                index,
                expected: element_type.clone(),
                found,
            });
        }
    }
    Ok(())
}

/// Total order used to keep set elements canonical. Marks are ignored.
fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    fn rank(kind: &ValueKind) -> u8 {
        match kind {
            ValueKind::Bool(_) => 0,
            ValueKind::Number(_) => 1,
            ValueKind::String(_) => 2,
            ValueKind::List { .. } => 3,
            ValueKind::Set { .. } => 4,
            ValueKind::Map { .. } => 5,
            ValueKind::Object(_) => 6,
            ValueKind::Tuple(_) => 7,
            ValueKind::Capsule { .. } => 8,
            ValueKind::Null(_) => 9,
            ValueKind::Unknown(_) => 10,
        }
    }

    fn cmp_seq(left: &[Value], right: &[Value]) -> Ordering {
        left.iter()
            .zip(right)
            .map(|(l, r)| canonical_cmp(l, r))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| left.len().cmp(&right.len()))
    }

    fn cmp_entries(left: &BTreeMap<String, Value>, right: &BTreeMap<String, Value>) -> Ordering {
        left.iter()
            .zip(right)
            .map(|((lk, lv), (rk, rv))| lk.cmp(rk).then_with(|| canonical_cmp(lv, rv)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| left.len().cmp(&right.len()))
    }

    match (&left.kind, &right.kind) {
        (ValueKind::Null(l), ValueKind::Null(r)) | (ValueKind::Unknown(l), ValueKind::Unknown(r)) => {
            l.cmp(r)
        }
        (ValueKind::Bool(l), ValueKind::Bool(r)) => l.cmp(r),
        (ValueKind::Number(l), ValueKind::Number(r)) => l.cmp(r),
        (ValueKind::String(l), ValueKind::String(r)) => l.cmp(r),
        (
            ValueKind::List {
                element_type: lt,
                elements: l,
            },
            ValueKind::List {
                element_type: rt,
                elements: r,
            },
        )
        | (
            ValueKind::Set {
                element_type: lt,
                elements: l,
            },
            ValueKind::Set {
                element_type: rt,
                elements: r,
            },
        ) => lt.cmp(rt).then_with(|| cmp_seq(l, r)),
        (ValueKind::Tuple(l), ValueKind::Tuple(r)) => cmp_seq(l, r),
        (
            ValueKind::Map {
                element_type: lt,
                entries: l,
            },
            ValueKind::Map {
                element_type: rt,
                entries: r,
            },
        ) => lt.cmp(rt).then_with(|| cmp_entries(l, r)),
        (ValueKind::Object(l), ValueKind::Object(r)) => cmp_entries(l, r),
        (
            ValueKind::Capsule {
                type_name: ln,
                id: li,
            },
            ValueKind::Capsule {
                type_name: rn,
                id: ri,
            },
        ) => ln.cmp(rn).then_with(|| li.cmp(ri)),
        (l, r) => rank(l).cmp(&rank(r)),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.marks.is_sensitive() && !cfg!(any(test, feature = "testing")) {
            return f.write_str(REDACTED_PLACEHOLDER);
        }
        if self.marks.is_empty() {
            fmt::Debug::fmt(&self.kind, f)
        } else {
            f.debug_struct("Marked")
                .field("value", &self.kind)
                .field("marks", &self.marks)
                .finish()
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::number(value)
    }
}

impl From<BigDecimal> for Value {
    fn from(value: BigDecimal) -> Self {
        Value::number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::string(value)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::{Value, ValueKind};
    use crate::{
        error::ValueError,
        value::{Mark, Type},
    };

    fn nested_marked() -> Value {
        Value::object([
            ("name", Value::string("web").mark(Mark::Ephemeral)),
            (
                "ports",
                Value::list(Type::Number, vec![Value::number(80), Value::number(443).sensitive()])
                    .unwrap(),
            ),
        ])
        .mark(Mark::Deprecated("use hosts".to_string()))
    }

    #[test]
    fn unmark_deep_clears_every_node_and_reports_marks() {
        let value = nested_marked();
        let (plain, removed) = value.unmark_deep();

        assert!(!plain.contains_marks());
        assert!(removed.is_sensitive());
        assert!(removed.contains(&Mark::Ephemeral));
        assert!(removed.contains(&Mark::Deprecated("use hosts".to_string())));
        assert_eq!(removed.len(), 3);
    }

    #[test]
    fn unmark_deep_keeps_data_and_type() {
        let value = nested_marked();
        let (plain, _) = value.unmark_deep();
        assert_eq!(plain.ty(), value.ty());
        assert_eq!(
            plain.entries().unwrap()["ports"].elements().unwrap()[1],
            Value::number(443)
        );
    }

    #[test]
    fn unmark_is_shallow() {
        let (top, marks) = nested_marked().unmark();
        assert!(!top.is_marked());
        assert_eq!(marks.len(), 1);
        assert!(top.contains_marks());
    }

    #[test]
    fn list_rejects_mismatched_elements() {
        let err = Value::list(Type::String, vec![Value::string("a"), Value::number(1)])
            .unwrap_err();
        assert_eq!(
            err,
            ValueError::ElementType {
                index: 1,
                expected: Type::String,
                found: Type::Number,
            }
        );
    }

    #[test]
    fn map_rejects_mismatched_entries() {
        let err = Value::map(Type::Bool, [("a", Value::bool(true)), ("b", Value::string("no"))])
            .unwrap_err();
        assert!(matches!(err, ValueError::MapElementType { key, .. } if key == "b"));
    }

    #[test]
    fn set_deduplicates_and_orders_elements() {
        let set = Value::set(
            Type::Number,
            vec![Value::number(3), Value::number(1), Value::number(3), Value::number(2)],
        )
        .unwrap();
        assert_eq!(
            set.elements().unwrap(),
            &[Value::number(1), Value::number(2), Value::number(3)]
        );
    }

    #[test]
    fn set_hoists_element_marks() {
        let set = Value::set(
            Type::String,
            vec![Value::string("a").sensitive(), Value::string("a")],
        )
        .unwrap();
        assert!(set.marks().is_sensitive());
        assert_eq!(set.elements().unwrap(), &[Value::string("a")]);
    }

    #[test]
    fn numbers_compare_by_value() {
        let one = Value::number(BigDecimal::from_str("1.0").unwrap());
        assert_eq!(one, Value::number(1));
        assert_ne!(Value::number(1), Value::number(2));
    }

    #[test]
    fn number_f64_rejects_non_finite() {
        assert!(Value::number_f64(f64::NAN).is_none());
        assert!(Value::number_f64(f64::INFINITY).is_none());
        assert_eq!(
            Value::number_f64(0.5).unwrap(),
            Value::number(BigDecimal::from_str("0.5").unwrap())
        );
    }

    #[test]
    fn ty_of_null_and_unknown_is_their_declared_type() {
        assert_eq!(Value::null(Type::list(Type::Bool)).ty(), Type::list(Type::Bool));
        assert_eq!(Value::unknown(Type::String).ty(), Type::String);
        assert!(!Value::unknown(Type::String).is_known());
    }

    #[test]
    fn capsule_type_carries_its_name() {
        let handle = Value::capsule("handle", 7);
        assert_eq!(handle.ty(), Type::Capsule("handle".to_string()));
        assert!(matches!(handle.kind(), ValueKind::Capsule { id: 7, .. }));
    }

    #[test]
    fn debug_shows_payload_under_test() {
        let rendered = format!("{:?}", Value::string("hunter2").sensitive());
        assert!(rendered.contains("hunter2"));
    }
}
