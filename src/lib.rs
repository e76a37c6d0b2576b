//! # presenting
//!
//! Declarative presentation specs and allow-listed query fragments.
//!
//! A host application declares, once at startup, which fields it shows and
//! which fields a request may search or sort on. This crate normalizes those
//! declarations into canonical structures and, per request, compiles untrusted
//! parameters into safe SQL fragments that only reference declared columns.
//!
//! ## Features
//!
//! - **Value Resolution**: fixed, accessor or computed values read from any [`Record`]
//! - **Declarative Forms**: fields and groups normalized from JSON shapes, in declared order
//! - **Field Search**: per-field operators fixed by configuration, terms always bound as parameters
//! - **Sorting**: allow-listed ORDER BY with a deterministic default
//! - **SQL Injection Prevention**: declared columns quoted, LIKE wildcards escaped
//!
//! ## Quick Start
//!
//! ```rust
//! use presenting::{ConditionBuilder, OrderBuilder};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let search = ConditionBuilder::from_declaration(&json!({
//!     "first_name": "equals",
//!     "last_name": "begins_with",
//!     "email": "not_null"
//! }))?;
//! let sorting =
//!     OrderBuilder::from_declaration(&json!(["prefix", "first_name", "last_name", "email"]))?;
//!
//! // Untrusted request parameters
//! let (condition, params) = search
//!     .compile(&json!({ "first_name": "Bob", "last_name": "", "ssn": "123" }))
//!     .to_sql();
//! let order = sorting.compile(Some("ssn"));
//!
//! assert_eq!(condition, "\"first_name\"::text = $1::text");
//! assert_eq!(params, vec![json!("Bob")]);
//! assert_eq!(order.to_sql(), "\"prefix\" ASC");
//! # Ok(())
//! # }
//! ```
//!
//! ## Forms
//!
//! ```rust
//! use presenting::{FieldType, Form, FormMethod};
//! use serde_json::{json, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut form: Form<Value> = Form::new().with_presentable(json!({ "name": "bob smith" }));
//! form.set_groups(&json!([
//!     ["name", { "bio": "text" }],
//!     { "flags": [{ "registered": "boolean" }] }
//! ]))?;
//!
//! assert_eq!(form.method(), FormMethod::Post);
//! assert_eq!(form.fields()[1].field_type(), FieldType::Text);
//! assert_eq!(form.groups()[1].name(), Some("flags"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use presenting::PresentingConfig;
//!
//! let config = PresentingConfig::builder()
//!     .sanitize_fields(true)  // Escape attribute values by default
//!     .like_escape('\\')      // Escape character for LIKE patterns
//!     .cast_to_text(true)     // Compare as text, e.g. for dynamic columns
//!     .build();
//! presenting::config::init(config).ok();
//! ```

pub mod attribute;
pub mod config;
pub mod error;
pub mod field;
pub mod form;
pub mod group;
pub mod record;
pub mod sql;

// Re-export main types for convenience
pub use attribute::{Attribute, ValueSpec, derive_id, titleize};
pub use config::{PresentingConfig, PresentingConfigBuilder};
pub use error::{AttributeError, ConditionError, PresentingError, Result, SpecError};
pub use field::{Field, FieldType, TypeOption};
pub use form::{FieldValue, Form, FormMethod};
pub use group::Group;
pub use record::{Presentable, Record};

// Re-export the query compilers
pub use sql::condition::{ConditionBuilder, SearchField, SearchOperator};
pub use sql::order::{OrderBuilder, OrderClause, SortDirection, SortField};
pub use sql::predicate::Predicate;
