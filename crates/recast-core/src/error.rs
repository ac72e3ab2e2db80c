//! Error types for the Recast core library
//!
//! This module defines the error handling system for Recast, using thiserror
//! for ergonomic error definitions and anyhow as the escape hatch for errors
//! raised inside caller-supplied callbacks.

use thiserror::Error;

/// Main error type for Recast operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema declaration rejected (duplicate attribute, conflicting options)
    #[error("invalid schema definition for '{schema}': {message}")]
    SchemaDefinition {
        schema: String,
        message: String,
    },

    /// Source value is neither a key-value map nor an attribute-bearing object
    #[error("source is not a key-value map or attribute-bearing object (found {found})")]
    SourceType {
        found: String,
    },

    /// A required source attribute has no corresponding value
    #[error("attribute '{key}' is not present in the source")]
    AttributeNotPresent {
        key: String,
    },

    /// Failure while resolving one attribute, naming the offending attribute
    #[error("failed to transform attribute '{attribute}'")]
    AttributeTransform {
        attribute: String,
        #[source]
        source: Box<Error>,
    },

    /// Failure of a whole transformation call, naming the schema
    #[error("failed to transform with schema '{schema}'")]
    Transform {
        schema: String,
        #[source]
        source: Box<Error>,
    },

    /// Error raised inside a caller-supplied mapper, predicate, or default
    #[error("callback error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an error with the attribute it occurred on
    pub(crate) fn for_attribute(self, attribute: &str) -> Error {
        Error::AttributeTransform {
            attribute: attribute.to_string(),
            source: Box::new(self),
        }
    }

    /// Wrap an error with the schema whose transformation failed
    pub(crate) fn for_schema(self, schema: &str) -> Error {
        Error::Transform {
            schema: schema.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
