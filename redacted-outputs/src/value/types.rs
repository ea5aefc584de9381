//! Structural types of dynamic values.

use std::{collections::BTreeMap, fmt};

/// The structural type of a [`Value`](super::Value).
///
/// Types are compared structurally: two object types are equal when they have
/// the same attribute names with equal attribute types.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Bool,
    Number,
    String,
    /// Placeholder for a type that is not known yet.
    Dynamic,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>),
    Object(BTreeMap<String, Type>),
    Tuple(Vec<Type>),
    /// An opaque in-process handle. Capsules have no JSON encoding.
    Capsule(String),
}

impl Type {
    #[must_use]
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    #[must_use]
    pub fn set(element: Type) -> Self {
        Type::Set(Box::new(element))
    }

    #[must_use]
    pub fn map(element: Type) -> Self {
        Type::Map(Box::new(element))
    }

    /// Builds an object type from `(name, type)` pairs.
    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Type::Object(
            attributes
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::Number => f.write_str("number"),
            Type::String => f.write_str("string"),
            Type::Dynamic => f.write_str("dynamic"),
            Type::List(element) => write!(f, "list of {element}"),
            Type::Set(element) => write!(f, "set of {element}"),
            Type::Map(element) => write!(f, "map of {element}"),
            Type::Object(_) => f.write_str("object"),
            Type::Tuple(_) => f.write_str("tuple"),
            Type::Capsule(name) => write!(f, "capsule {name:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Type;

    #[test]
    fn friendly_names() {
        assert_eq!(Type::list(Type::Number).to_string(), "list of number");
        assert_eq!(
            Type::map(Type::set(Type::String)).to_string(),
            "map of set of string"
        );
        assert_eq!(Type::object([("a", Type::Bool)]).to_string(), "object");
        assert_eq!(
            Type::Capsule("handle".to_string()).to_string(),
            r#"capsule "handle""#
        );
    }

    #[test]
    fn object_types_compare_structurally() {
        let left = Type::object([("a", Type::Bool), ("b", Type::Number)]);
        let right = Type::object([("b", Type::Number), ("a", Type::Bool)]);
        assert_eq!(left, right);
        assert_ne!(left, Type::object([("a", Type::Bool)]));
    }
}
