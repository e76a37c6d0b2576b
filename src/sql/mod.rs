//! SQL fragment compilers for presentation layers
//!
//! Provides allow-listed WHERE and ORDER BY compilation plus the identifier
//! and pattern sanitization they share.

pub mod condition;
pub mod order;
pub mod predicate;
pub mod sanitize;

pub use condition::{ConditionBuilder, SearchField, SearchOperator};
pub use order::{OrderBuilder, OrderClause, SortDirection, SortField};
pub use predicate::{Clause, Comparison, Conjunction, Predicate};
pub use sanitize::{escape_like, like_matches, quote_column, quote_identifier, validate_column};
