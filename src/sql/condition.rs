//! Condition building for SQL WHERE clauses
//!
//! [`ConditionBuilder`] turns untrusted search parameters into a [`Predicate`]
//! over an allow-list of declared fields. The request chooses terms only:
//! which fields can appear and which operator each one uses are fixed when
//! the builder is declared.
//!
//! # Supported Operators
//! - Comparison: `equals`, `not_equals`
//! - Pattern: `begins_with`, `ends_with`, `contains`
//! - Presence: `null`, `not_null`

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::config::{self, PresentingConfig};
use crate::error::ConditionError;
use crate::sql::predicate::{Clause, Comparison, Conjunction, Predicate};
use crate::sql::sanitize::{escape_like, validate_column};

/// Operator a declared field is searched with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchOperator {
    Equals,
    NotEquals,
    BeginsWith,
    EndsWith,
    Contains,
    Null,
    NotNull,
}

impl SearchOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::Equals => "equals",
            SearchOperator::NotEquals => "not_equals",
            SearchOperator::BeginsWith => "begins_with",
            SearchOperator::EndsWith => "ends_with",
            SearchOperator::Contains => "contains",
            SearchOperator::Null => "null",
            SearchOperator::NotNull => "not_null",
        }
    }

    /// Presence operators contribute whenever their key is sent and ignore the term
    pub fn is_presence(&self) -> bool {
        matches!(self, SearchOperator::Null | SearchOperator::NotNull)
    }

    fn clause(&self, field: &SearchField, term: &str, escape: char) -> Clause {
        let (comparison, operand) = match self {
            SearchOperator::Equals => (Comparison::Equals, Some(term.to_string())),
            SearchOperator::NotEquals => (Comparison::NotEquals, Some(term.to_string())),
            SearchOperator::BeginsWith => {
                (Comparison::Like, Some(format!("{}%", escape_like(term, escape))))
            }
            SearchOperator::EndsWith => {
                (Comparison::Like, Some(format!("%{}", escape_like(term, escape))))
            }
            SearchOperator::Contains => {
                (Comparison::Like, Some(format!("%{}%", escape_like(term, escape))))
            }
            SearchOperator::Null => (Comparison::IsNull, None),
            SearchOperator::NotNull => (Comparison::IsNotNull, None),
        };

        Clause {
            field: field.name.clone(),
            column: field.column.clone(),
            comparison,
            operand,
        }
    }
}

impl FromStr for SearchOperator {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equals" => Ok(SearchOperator::Equals),
            "not_equals" => Ok(SearchOperator::NotEquals),
            "begins_with" => Ok(SearchOperator::BeginsWith),
            "ends_with" => Ok(SearchOperator::EndsWith),
            "contains" => Ok(SearchOperator::Contains),
            "null" => Ok(SearchOperator::Null),
            "not_null" => Ok(SearchOperator::NotNull),
            other => Err(ConditionError::invalid(format!(
                "unknown search operator '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared searchable field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchField {
    name: String,
    column: String,
    operator: SearchOperator,
}

impl SearchField {
    /// Declare a field searched on the column of the same name
    pub fn new(name: impl Into<String>, operator: SearchOperator) -> Result<Self, ConditionError> {
        let name = name.into();
        validate_column(&name).map_err(ConditionError::InvalidDeclaration)?;
        Ok(Self {
            column: name.clone(),
            name,
            operator,
        })
    }

    /// Declare a request key that searches a different column
    pub fn with_column(
        name: impl Into<String>,
        column: impl Into<String>,
        operator: SearchOperator,
    ) -> Result<Self, ConditionError> {
        let name = name.into();
        let column = column.into();
        if name.is_empty() {
            return Err(ConditionError::invalid("search field name cannot be empty"));
        }
        validate_column(&column).map_err(ConditionError::InvalidDeclaration)?;
        Ok(Self {
            name,
            column,
            operator,
        })
    }

    /// Parse `"operator"` or `{"operator": .., "sql": ..}`
    fn from_declaration(name: &str, spec: &Value) -> Result<Self, ConditionError> {
        match spec {
            Value::String(tag) => Self::new(name, tag.parse()?),
            Value::Object(options) => {
                if let Some(key) = options
                    .keys()
                    .find(|k| !matches!(k.as_str(), "operator" | "sql"))
                {
                    return Err(ConditionError::invalid(format!(
                        "unknown option '{}' for search field '{}'",
                        key, name
                    )));
                }
                let operator = match options.get("operator") {
                    Some(Value::String(tag)) => tag.parse()?,
                    _ => {
                        return Err(ConditionError::invalid(format!(
                            "search field '{}' needs an operator",
                            name
                        )));
                    }
                };
                match options.get("sql") {
                    Some(Value::String(column)) => {
                        Self::with_column(name, column.as_str(), operator)
                    }
                    None => Self::new(name, operator),
                    Some(other) => Err(ConditionError::invalid(format!(
                        "sql for search field '{}' must be a string, got {}",
                        name, other
                    ))),
                }
            }
            other => Err(ConditionError::invalid(format!(
                "search field '{}' must map to an operator, got {}",
                name, other
            ))),
        }
    }

    /// Request key
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> SearchOperator {
        self.operator
    }
}

/// Coerce an untrusted term to text; `None` when blank
fn term_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    };
    if text.trim().is_empty() { None } else { Some(text) }
}

/// Compiles untrusted search parameters against declared fields
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionBuilder {
    fields: Vec<SearchField>,
    config: PresentingConfig,
}

impl ConditionBuilder {
    /// Freeze a list of declared fields; names must be unique
    pub fn new(fields: Vec<SearchField>) -> Result<Self, ConditionError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ConditionError::invalid(format!(
                    "search field '{}' declared twice",
                    field.name
                )));
            }
        }

        Ok(Self {
            fields,
            config: config::defaults().clone(),
        })
    }

    /// Build from a `{"field": "operator", ..}` declaration, keeping its order
    pub fn from_declaration(spec: &Value) -> Result<Self, ConditionError> {
        let Value::Object(map) = spec else {
            return Err(ConditionError::invalid(format!(
                "search declaration must be an object, got {}",
                spec
            )));
        };

        let fields = map
            .iter()
            .map(|(name, field)| SearchField::from_declaration(name, field))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(fields)
    }

    /// Use an explicit configuration instead of the process-wide defaults
    pub fn with_config(mut self, config: &PresentingConfig) -> Result<Self, ConditionError> {
        config.validate()?;
        self.config = config.clone();
        Ok(self)
    }

    pub fn fields(&self) -> &[SearchField] {
        &self.fields
    }

    /// Field-mode search: one clause per declared field with a usable term, ANDed
    ///
    /// Keys that are not declared are ignored. Anything other than an object
    /// counts as no parameters.
    pub fn compile(&self, params: &Value) -> Predicate {
        let empty = Map::new();
        let params = params.as_object().unwrap_or(&empty);

        let mut clauses = Vec::new();
        for field in &self.fields {
            let Some(entry) = params.get(&field.name) else {
                continue;
            };
            if field.operator.is_presence() {
                clauses.push(field.operator.clause(field, "", self.config.like_escape));
            } else if let Some(term) = term_text(entry) {
                clauses.push(field.operator.clause(field, &term, self.config.like_escape));
            }
        }

        let ignored = params
            .keys()
            .filter(|key| !self.fields.iter().any(|field| &field.name == *key))
            .count();
        if ignored > 0 {
            tracing::debug!(ignored, "ignored undeclared search parameters");
        }
        tracing::trace!(clauses = clauses.len(), "compiled field search");

        Predicate::new(Conjunction::And, clauses, &self.config)
    }

    /// Simple-mode search: one term against every term-bearing field, ORed
    pub fn compile_simple(&self, term: &Value) -> Predicate {
        let clauses: Vec<Clause> = match term_text(term) {
            Some(term) => self
                .fields
                .iter()
                .filter(|field| !field.operator.is_presence())
                .map(|field| field.operator.clause(field, &term, self.config.like_escape))
                .collect(),
            None => Vec::new(),
        };
        tracing::trace!(clauses = clauses.len(), "compiled simple search");

        Predicate::new(Conjunction::Or, clauses, &self.config)
    }
}
