//! Recast Core - declarative object-to-object mapping engine
//!
//! This crate maps heterogeneous input (JSON objects or attribute-bearing
//! objects) into well-defined, immutable records. A schema declares named
//! target attributes and the rule for deriving each one: a direct read, a
//! rename, a default, a conditional inclusion, a computed value, or a
//! recursive reshape through a nested schema.
//!
//! # Main Components
//!
//! - **Schema declaration**: [`Schema::builder`] with attribute rules,
//!   parameter groups, and parent-schema composition
//! - **Transformation**: [`transform`] over single values or sequences,
//!   [`transform_object`] over attribute-bearing objects
//! - **Records**: immutable, ordered [`Record`]s that unwrap back to plain
//!   JSON with [`Record::to_plain`]
//! - **Error Handling**: structured error types using `thiserror`, with
//!   `anyhow` as the escape hatch for caller-supplied callbacks
//!
//! # Example
//!
//! ```
//! use recast_core::{transform, Attr, Schema};
//! use serde_json::json;
//!
//! # fn main() -> recast_core::Result<()> {
//! let user = Schema::builder("User")
//!     .attribute("id", Attr::new())?
//!     .attribute("name", Attr::new().from("username"))?
//!     .attribute("locale", Attr::new().default_value("en"))?
//!     .build();
//!
//! let out = transform(&user, &json!({"id": 1, "username": "John", "email": "j@x.com"}))?;
//! assert_eq!(out.to_plain(), json!({"id": 1, "name": "John", "locale": "en"}));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod record;
pub mod schema;
pub mod source;
pub mod transform;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use record::{FieldValue, Record};
pub use schema::{
    Attr, AttrDefault, AttrRule, Mapping, PredicateFn, RuleParams, Schema, SchemaBuilder, SourceFn,
};
pub use source::{AttributeSource, Source};
pub use transform::{transform, transform_object, Transformed};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
