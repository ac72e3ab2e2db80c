//! Schema declaration and composition
//!
//! A schema is an ordered set of attribute rules describing how to build a
//! [`Record`](crate::Record) from a source value, optionally extending a
//! parent schema. Declaration goes through [`SchemaBuilder`] (the open
//! phase); [`build`](SchemaBuilder::build) seals the schema, after which it
//! is immutable and safe to share across threads.
//!
//! # Module Organization
//!
//! - [`builder`] - The open-phase builder and group frames
//! - [`rule`] - Attribute declaration parameters and sealed rules
//!
//! Copyright (c) 2026 Recast Team
//! Licensed under the MIT OR Apache-2.0 license

pub mod builder;
pub mod rule;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::record::Record;
use crate::source::AttributeSource;
use crate::transform::Transformed;
use crate::Result;

pub use builder::SchemaBuilder;
pub use rule::{Attr, AttrDefault, AttrRule, Mapping, PredicateFn, RuleParams, SourceFn};

/// A sealed schema: the immutable, composed rule set used by the transformer
///
/// The resolved rule list (parent's rules before own rules, in declaration
/// order) is computed once when the builder seals the schema; transformation
/// never walks the parent chain.
pub struct Schema {
    name: String,
    parent: Option<Arc<Schema>>,
    resolved: Vec<AttrRule>,
    own_start: usize,
}

impl Schema {
    /// Start declaring a schema called `name`
    ///
    /// The name identifies the schema in transformation errors.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub(crate) fn seal(
        name: String,
        parent: Option<Arc<Schema>>,
        resolved: Vec<AttrRule>,
        own_start: usize,
    ) -> Arc<Schema> {
        Arc::new(Schema {
            name,
            parent,
            resolved,
            own_start,
        })
    }

    /// Schema name, as used in transformation errors
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent schema, if this one extends another
    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }

    /// The full resolved rule list: inherited rules first, then own rules
    pub fn rules(&self) -> &[AttrRule] {
        &self.resolved
    }

    /// Only the rules declared on this schema itself
    pub fn own_rules(&self) -> &[AttrRule] {
        &self.resolved[self.own_start..]
    }

    /// Transform a source value, dispatching transparently over sequences
    ///
    /// Equivalent to [`transform`](crate::transform::transform).
    pub fn apply(&self, source: &Value) -> Result<Transformed> {
        crate::transform::transform(self, source)
    }

    /// Transform an attribute-bearing object into a single record
    ///
    /// Equivalent to [`transform_object`](crate::transform::transform_object).
    pub fn apply_object(&self, source: &dyn AttributeSource) -> Result<Record> {
        crate::transform::transform_object(self, source)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("rules", &self.resolved)
            .finish()
    }
}
