//! Open-phase schema declaration
//!
//! A [`SchemaBuilder`] is the only way to declare attributes, so a sealed
//! [`Schema`] can never change after `build()`. Group frames are builder
//! state: the builder is threaded by value through nested `group` closures,
//! which makes concurrent declaration of one schema unrepresentable.

use std::sync::Arc;

use crate::{Error, Result};

use super::rule::{Attr, AttrRule};
use super::Schema;

/// Builder collecting attribute declarations for one schema
///
/// Declaration-time errors (duplicate names, conflicting options) surface
/// immediately from [`attribute`](Self::attribute) and
/// [`extends`](Self::extends); `build()` itself cannot fail.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    parent: Option<Arc<Schema>>,
    rules: Vec<AttrRule>,
    group_stack: Vec<Attr>,
}

impl SchemaBuilder {
    pub(super) fn new(name: impl Into<String>) -> Self {
        SchemaBuilder {
            name: name.into(),
            parent: None,
            rules: Vec::new(),
            group_stack: Vec::new(),
        }
    }

    /// Inherit the resolved rules of `parent`
    ///
    /// The parent's rules come first in the built schema, in the parent's
    /// own order. Attributes already declared on this builder must not
    /// clash with the parent's resolved set.
    pub fn extends(mut self, parent: &Arc<Schema>) -> Result<Self> {
        if self.parent.is_some() {
            return Err(self.definition_error("parent schema is already set"));
        }
        if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| parent.rules().iter().any(|p| p.name() == rule.name()))
        {
            let message = format!(
                "attribute '{}' is already declared by parent schema '{}'",
                rule.name(),
                parent.name()
            );
            return Err(self.definition_error(&message));
        }
        self.parent = Some(Arc::clone(parent));
        Ok(self)
    }

    /// Declare one attribute
    ///
    /// `params` are merged with the active group frames (innermost frame
    /// first) and then with the built-in defaults: `from` = the attribute
    /// name, direct read mapping. Explicit parameters win over group
    /// parameters, which win over the built-ins.
    pub fn attribute(mut self, name: &str, params: Attr) -> Result<Self> {
        if self.is_declared(name) {
            let message = format!("attribute '{name}' is already declared");
            return Err(self.definition_error(&message));
        }

        let mut merged = params;
        for frame in self.group_stack.iter().rev() {
            merged = merged.merged_over(frame);
        }

        if merged.include_if.is_some() && merged.optional.is_some() {
            let message =
                format!("'when' and 'optional' cannot be used together for attribute '{name}'");
            return Err(self.definition_error(&message));
        }

        self.rules.push(AttrRule::seal(name, merged));
        Ok(self)
    }

    /// Declare a group of attributes sharing common parameters
    ///
    /// `params` become lower-precedence defaults for every attribute
    /// declared inside `body`. Groups nest; the innermost frame wins among
    /// frames. The frame is dropped when `body` returns.
    pub fn group<F>(mut self, params: Attr, body: F) -> Result<Self>
    where
        F: FnOnce(Self) -> Result<Self>,
    {
        self.group_stack.push(params);
        let mut builder = body(self)?;
        builder.group_stack.pop();
        Ok(builder)
    }

    /// Seal the schema
    ///
    /// Computes the resolved rule list (parent's resolved rules, then own
    /// rules, in declaration order) once; the schema is immutable from here
    /// on and safe to share across threads.
    pub fn build(self) -> Arc<Schema> {
        let mut resolved: Vec<AttrRule> = match &self.parent {
            Some(parent) => parent.rules().to_vec(),
            None => Vec::new(),
        };
        let own_start = resolved.len();
        resolved.extend(self.rules);
        log::debug!(
            "sealed schema '{}' with {} rules ({} inherited)",
            self.name,
            resolved.len(),
            own_start
        );
        Schema::seal(self.name, self.parent, resolved, own_start)
    }

    fn is_declared(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name() == name)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.rules().iter().any(|rule| rule.name() == name))
    }

    fn definition_error(&self, message: &str) -> Error {
        Error::SchemaDefinition {
            schema: self.name.clone(),
            message: message.to_string(),
        }
    }
}
