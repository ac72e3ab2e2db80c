//! Transformation output: immutable records and their plain-data form
//!
//! A [`Record`] is the shaped result of applying a schema to one source
//! value: an ordered mapping from attribute name to resolved value. Records
//! have no mutation API; they are built once by the transformer and read
//! thereafter. [`Record::to_plain`] unwraps a record (and anything nested
//! inside it) back into a plain `serde_json::Value` tree.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A resolved attribute value
///
/// Function mappers produce plain JSON values; nested-schema mappers produce
/// records, or sequences of them when the source value was a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A plain JSON value, stored as read or as computed by a mapper
    Plain(Value),
    /// A record produced by a nested schema
    Record(Record),
    /// A sequence produced by mapping a nested schema over source elements
    Seq(Vec<FieldValue>),
}

impl FieldValue {
    /// Convert to a plain JSON value, recursively unwrapping records
    ///
    /// Sequences map element-wise preserving order. The result never
    /// contains a record at any depth.
    pub fn to_plain(&self) -> Value {
        match self {
            FieldValue::Plain(value) => value.clone(),
            FieldValue::Record(record) => record.to_plain(),
            FieldValue::Seq(items) => Value::Array(items.iter().map(FieldValue::to_plain).collect()),
        }
    }

    /// The plain value, if this is not a nested record or sequence
    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            FieldValue::Plain(value) => Some(value),
            _ => None,
        }
    }

    /// The nested record, if any
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The sequence of resolved values, if any
    pub fn as_seq(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Seq(items) => Some(items),
            _ => None,
        }
    }
}

/// Immutable, ordered result of applying a schema to one source value
///
/// Field order is the schema's resolved declaration order (inherited rules
/// before own rules), restricted to the attributes whose inclusion predicate
/// passed. Attributes that were omitted have no entry at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub(crate) fn new(fields: Vec<(String, FieldValue)>) -> Self {
        Record { fields }
    }

    /// Number of attributes in this record
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no attributes
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the record has an attribute called `name`
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    /// The resolved value of the attribute called `name`
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Attribute names in resolved declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// `(name, value)` pairs in resolved declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert to a plain JSON object, recursively unwrapping nested records
    ///
    /// Keys are exactly the attribute names that passed inclusion, in
    /// resolved declaration order.
    pub fn to_plain(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_plain());
        }
        Value::Object(map)
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Plain(value) => value.serialize(serializer),
            FieldValue::Record(record) => record.serialize(serializer),
            FieldValue::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
