//! Uniform presence/read access over heterogeneous source values
//!
//! A transformation reads its input through a [`Source`] adapter, which hides
//! whether the value is a plain key-value map (a JSON object) or an
//! attribute-bearing object exposing named readers. Presence and reads are
//! the only operations the engine ever needs.

use serde_json::Value;

use crate::{Error, Result};

/// An object that exposes named attribute readers
///
/// Implement this to feed domain objects directly into a transformation
/// without first serializing them to JSON. `has_attribute` reports whether
/// the object exposes a reader for `name`; `read_attribute` invokes it.
pub trait AttributeSource {
    /// Whether this object exposes an attribute called `name`
    fn has_attribute(&self, name: &str) -> bool;

    /// Read the attribute called `name`, or `None` if it is not exposed
    fn read_attribute(&self, name: &str) -> Option<Value>;
}

/// Adapter over one source value
///
/// Construction decides the backing kind once; every subsequent presence
/// test and read goes through the same uniform interface.
#[derive(Clone, Copy)]
pub enum Source<'a> {
    /// Key-value structure: presence is key existence, reads never invoke code
    Map(&'a serde_json::Map<String, Value>),
    /// Attribute-bearing object: presence asks the object, reads invoke it
    Object(&'a dyn AttributeSource),
}

impl std::fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Source::Object(_) => f.debug_tuple("Object").field(&"<dyn AttributeSource>").finish(),
        }
    }
}

impl<'a> Source<'a> {
    /// Adapt a JSON value
    ///
    /// Only objects can back a source. Sequences are dispatched element-wise
    /// by the transformer before a `Source` is ever built, so an array here
    /// is as much a type error as a bare scalar.
    pub fn from_value(value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Source::Map(map)),
            other => Err(Error::SourceType {
                found: json_shape(other).to_string(),
            }),
        }
    }

    /// Adapt an attribute-bearing object
    pub fn from_object(object: &'a dyn AttributeSource) -> Self {
        Source::Object(object)
    }

    /// Whether the source has a value for `key`
    pub fn has(&self, key: &str) -> bool {
        match self {
            Source::Map(map) => map.contains_key(key),
            Source::Object(object) => object.has_attribute(key),
        }
    }

    /// Read the value for `key`, or `None` if the source does not have it
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Source::Map(map) => map.get(key).cloned(),
            Source::Object(object) => object.read_attribute(key),
        }
    }
}

/// Human-readable shape of a JSON value, for error reporting
fn json_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Account {
        id: u64,
        username: String,
    }

    impl AttributeSource for Account {
        fn has_attribute(&self, name: &str) -> bool {
            matches!(name, "id" | "username")
        }

        fn read_attribute(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(json!(self.id)),
                "username" => Some(json!(self.username)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_map_backed_source() {
        let value = json!({"id": 1, "name": null});
        let source = Source::from_value(&value).unwrap();

        assert!(source.has("id"));
        assert!(source.has("name"));
        assert!(!source.has("email"));
        assert_eq!(source.get("id"), Some(json!(1)));
        assert_eq!(source.get("name"), Some(Value::Null));
        assert_eq!(source.get("email"), None);
    }

    #[test]
    fn test_object_backed_source() {
        let account = Account {
            id: 7,
            username: "John".to_string(),
        };
        let source = Source::from_object(&account);

        assert!(source.has("username"));
        assert!(!source.has("email"));
        assert_eq!(source.get("id"), Some(json!(7)));
        assert_eq!(source.get("email"), None);
    }

    #[test]
    fn test_rejects_non_object_values() {
        for value in [json!(42), json!("x"), json!(true), json!(null), json!([1])] {
            let err = Source::from_value(&value).unwrap_err();
            assert!(matches!(err, Error::SourceType { .. }), "{value}");
        }
    }

    #[test]
    fn test_source_type_error_names_the_shape() {
        let err = Source::from_value(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }
}
