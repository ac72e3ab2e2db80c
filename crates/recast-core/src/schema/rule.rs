//! Attribute rules: declaration parameters and their sealed form
//!
//! An attribute is declared with an [`Attr`] parameter set (`from`, a mapper,
//! an inclusion predicate, a default, the optional flag). The builder merges
//! declared parameters with active group frames and built-in defaults, then
//! seals the result into an [`AttrRule`], the immutable form the resolver
//! works with.
//!
//! Caller-supplied callbacks come in two arities. The one-argument helpers
//! (`using`, `when`) receive only the source; the two-argument helpers
//! (`using_with`, `when_with`, `default_fn`) also receive the rule's
//! [`RuleParams`]. Internally everything is stored with the canonical
//! `(source, params)` signature.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::source::Source;
use crate::Result;

use super::Schema;

/// Canonical signature for value mappers and default producers
pub type SourceFn = Arc<dyn Fn(&Source<'_>, &RuleParams) -> Result<Value> + Send + Sync>;

/// Canonical signature for inclusion predicates
pub type PredicateFn = Arc<dyn Fn(&Source<'_>, &RuleParams) -> Result<bool> + Send + Sync>;

/// How an attribute's value is computed
///
/// The variant is fixed at declaration time; the resolver never inspects
/// callback types at runtime.
#[derive(Clone)]
pub enum Mapping {
    /// Built-in identity read of the source key, honoring a declared default
    Read,
    /// Caller-supplied function over `(source, params)`
    Function(SourceFn),
    /// Dispatch through a nested schema, element-wise over sequences
    Nested(Arc<Schema>),
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::Read => write!(f, "Read"),
            Mapping::Function(_) => write!(f, "Function"),
            Mapping::Nested(schema) => write!(f, "Nested({})", schema.name()),
        }
    }
}

/// A declared default: a literal value or a producer function
#[derive(Clone)]
pub enum AttrDefault {
    /// Cloned verbatim when the source key is absent
    Literal(Value),
    /// Invoked when the source key is absent
    Producer(SourceFn),
}

impl fmt::Debug for AttrDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrDefault::Literal(value) => write!(f, "Literal({value})"),
            AttrDefault::Producer(_) => write!(f, "Producer"),
        }
    }
}

/// The rule parameters visible to callbacks
///
/// Passed as the second argument to two-arity mappers, predicates, and
/// default producers.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleParams {
    /// Target attribute name
    pub name: String,
    /// Source key the rule reads from
    pub from: String,
    /// Whether the attribute was declared optional
    pub optional: bool,
}

/// Declaration parameters for one attribute
///
/// Every parameter is optional; unset parameters fall back to the active
/// group frames and then to the built-ins (`from` = attribute name, direct
/// read mapping). An empty `Attr::new()` declares a plain one-to-one copy.
#[derive(Clone, Default)]
pub struct Attr {
    pub(crate) from: Option<String>,
    pub(crate) mapping: Option<Mapping>,
    pub(crate) include_if: Option<PredicateFn>,
    pub(crate) default: Option<AttrDefault>,
    pub(crate) optional: Option<bool>,
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attr")
            .field("from", &self.from)
            .field("mapping", &self.mapping)
            .field("include_if", &self.include_if.as_ref().map(|_| "<fn>"))
            .field("default", &self.default)
            .field("optional", &self.optional)
            .finish()
    }
}

impl Attr {
    /// Parameters declaring a plain one-to-one attribute copy
    pub fn new() -> Self {
        Attr::default()
    }

    /// Read from `key` instead of the attribute's own name
    pub fn from(mut self, key: impl Into<String>) -> Self {
        self.from = Some(key.into());
        self
    }

    /// Compute the value with a function of the source
    pub fn using<F>(mut self, f: F) -> Self
    where
        F: Fn(&Source<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.mapping = Some(Mapping::Function(Arc::new(move |source, _| f(source))));
        self
    }

    /// Compute the value with a function of the source and rule parameters
    pub fn using_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Source<'_>, &RuleParams) -> Result<Value> + Send + Sync + 'static,
    {
        self.mapping = Some(Mapping::Function(Arc::new(f)));
        self
    }

    /// Map the source value through a nested schema
    pub fn using_schema(mut self, schema: &Arc<Schema>) -> Self {
        self.mapping = Some(Mapping::Nested(Arc::clone(schema)));
        self
    }

    /// Include the attribute only when the predicate holds
    pub fn when<F>(mut self, f: F) -> Self
    where
        F: Fn(&Source<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        self.include_if = Some(Arc::new(move |source, _| f(source)));
        self
    }

    /// Include the attribute only when the predicate of source and rule
    /// parameters holds
    pub fn when_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Source<'_>, &RuleParams) -> Result<bool> + Send + Sync + 'static,
    {
        self.include_if = Some(Arc::new(f));
        self
    }

    /// Use a literal default when the source key is absent
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(AttrDefault::Literal(value.into()));
        self
    }

    /// Produce the default with a no-argument function
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(AttrDefault::Producer(Arc::new(move |_, _| Ok(f()))));
        self
    }

    /// Produce the default with a function of the source and rule parameters
    pub fn default_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Source<'_>, &RuleParams) -> Result<Value> + Send + Sync + 'static,
    {
        self.default = Some(AttrDefault::Producer(Arc::new(f)));
        self
    }

    /// Include the attribute only when the source has its key
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    /// Merge, with `self` winning over `defaults` parameter by parameter
    pub(crate) fn merged_over(self, defaults: &Attr) -> Attr {
        Attr {
            from: self.from.or_else(|| defaults.from.clone()),
            mapping: self.mapping.or_else(|| defaults.mapping.clone()),
            include_if: self.include_if.or_else(|| defaults.include_if.clone()),
            default: self.default.or_else(|| defaults.default.clone()),
            optional: self.optional.or(defaults.optional),
        }
    }
}

/// One sealed attribute rule
///
/// Built by the schema builder after parameter merging and validation;
/// immutable afterwards.
#[derive(Clone)]
pub struct AttrRule {
    name: String,
    mapping: Mapping,
    include_if: Option<PredicateFn>,
    default: Option<AttrDefault>,
    optional: bool,
    params: RuleParams,
}

impl AttrRule {
    /// Seal merged declaration parameters, applying the built-in defaults
    pub(crate) fn seal(name: &str, merged: Attr) -> AttrRule {
        let from = merged.from.unwrap_or_else(|| name.to_string());
        let optional = merged.optional.unwrap_or(false);
        AttrRule {
            name: name.to_string(),
            mapping: merged.mapping.unwrap_or(Mapping::Read),
            include_if: merged.include_if,
            default: merged.default,
            optional,
            params: RuleParams {
                name: name.to_string(),
                from,
                optional,
            },
        }
    }

    /// Target attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source key the rule reads from
    pub fn source_key(&self) -> &str {
        &self.params.from
    }

    /// How the value is computed
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Explicit inclusion predicate, if one was declared
    pub fn include_if(&self) -> Option<&PredicateFn> {
        self.include_if.as_ref()
    }

    /// Declared default, if any
    pub fn default(&self) -> Option<&AttrDefault> {
        self.default.as_ref()
    }

    /// Whether inclusion is presence-based
    pub fn optional(&self) -> bool {
        self.optional
    }

    /// The parameter view passed to callbacks
    pub fn params(&self) -> &RuleParams {
        &self.params
    }
}

impl fmt::Debug for AttrRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrRule")
            .field("name", &self.name)
            .field("from", &self.params.from)
            .field("mapping", &self.mapping)
            .field("optional", &self.optional)
            .field("has_default", &self.default.is_some())
            .field("has_predicate", &self.include_if.is_some())
            .finish()
    }
}
