//! Transformation engine: applying a sealed schema to source values
//!
//! This module implements the orchestration half of the engine: walking a
//! schema's resolved rules in declaration order over one adapted source,
//! and dispatching transparently over sequences. Per-rule decisions live in
//! the resolver submodule.
//!
//! Copyright (c) 2026 Recast Team
//! Licensed under the MIT OR Apache-2.0 license

mod resolve;


use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::record::Record;
use crate::schema::Schema;
use crate::source::{AttributeSource, Source};
use crate::Result;

/// Output of a transformation call
///
/// Mirrors the input's shape: one record for a single source value, a
/// sequence of outputs for a source sequence (element-wise, so nested
/// sequences keep their nesting).
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
    /// The record produced from a single source value
    Record(Record),
    /// Outputs produced from a source sequence, in source order
    Seq(Vec<Transformed>),
}

impl Transformed {
    /// Convert to a plain JSON tree, recursively unwrapping records
    pub fn to_plain(&self) -> Value {
        match self {
            Transformed::Record(record) => record.to_plain(),
            Transformed::Seq(items) => {
                Value::Array(items.iter().map(Transformed::to_plain).collect())
            }
        }
    }

    /// The single record, if the source was not a sequence
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Transformed::Record(record) => Some(record),
            Transformed::Seq(_) => None,
        }
    }

    /// The element outputs, if the source was a sequence
    pub fn as_seq(&self) -> Option<&[Transformed]> {
        match self {
            Transformed::Record(_) => None,
            Transformed::Seq(items) => Some(items),
        }
    }

    /// Consume into the single record, if the source was not a sequence
    pub fn into_record(self) -> Option<Record> {
        match self {
            Transformed::Record(record) => Some(record),
            Transformed::Seq(_) => None,
        }
    }

    /// Consume into a flat record sequence
    ///
    /// `None` if this is a single record or if any element is itself a
    /// sequence.
    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            Transformed::Record(_) => None,
            Transformed::Seq(items) => items.into_iter().map(Transformed::into_record).collect(),
        }
    }
}

impl Serialize for Transformed {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Transformed::Record(record) => record.serialize(serializer),
            Transformed::Seq(items) => items.serialize(serializer),
        }
    }
}

/// Transform a source value with a schema
///
/// A JSON array maps the transformation over each element, preserving order
/// and length; any other value is adapted as a single source and produces
/// one record. Any attribute-level failure aborts the whole call; no
/// partial record is returned.
pub fn transform(schema: &Schema, source: &Value) -> Result<Transformed> {
    match source {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(transform(schema, item)?);
            }
            Ok(Transformed::Seq(out))
        }
        value => transform_value(schema, value).map(Transformed::Record),
    }
}

/// Transform an attribute-bearing object into a single record
pub fn transform_object(schema: &Schema, object: &dyn AttributeSource) -> Result<Record> {
    let source = Source::from_object(object);
    transform_source(schema, &source)
}

/// Transform one non-sequence JSON value
pub(crate) fn transform_value(schema: &Schema, value: &Value) -> Result<Record> {
    let source = Source::from_value(value).map_err(|e| e.for_schema(schema.name()))?;
    transform_source(schema, &source)
}

fn transform_source(schema: &Schema, source: &Source<'_>) -> Result<Record> {
    let rules = schema.rules();
    let mut fields = Vec::with_capacity(rules.len());
    for rule in rules {
        if let Some(value) = resolve::resolve(rule, source).map_err(|e| e.for_schema(schema.name()))?
        {
            fields.push((rule.name().to_string(), value));
        }
    }
    log::trace!(
        "schema '{}' resolved {} of {} attributes",
        schema.name(),
        fields.len(),
        rules.len()
    );
    Ok(Record::new(fields))
}
