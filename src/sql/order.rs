//! ORDER BY compilation over an allow-list of sortable fields
//!
//! [`OrderBuilder`] never emits a column that was not declared. Unknown,
//! empty or malformed sort requests fall back to the first declared field.

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use crate::error::ConditionError;
use crate::sql::sanitize::{quote_column, validate_column};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Match a direction case-insensitively against the closed set
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A declared sortable field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    name: String,
    column: String,
    direction: SortDirection,
}

impl SortField {
    /// Declare a field sorted by the column of the same name, ascending by default
    pub fn new(name: impl Into<String>) -> Result<Self, ConditionError> {
        let name = name.into();
        validate_column(&name).map_err(ConditionError::InvalidDeclaration)?;
        Ok(Self {
            column: name.clone(),
            name,
            direction: SortDirection::Asc,
        })
    }

    /// Sort a request key by a different column
    pub fn with_column(mut self, column: impl Into<String>) -> Result<Self, ConditionError> {
        let column = column.into();
        validate_column(&column).map_err(ConditionError::InvalidDeclaration)?;
        self.column = column;
        Ok(self)
    }

    /// Direction used when the request names this field without one
    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Parse `"name"` or `{"name": {"sql": .., "direction": ..}}`
    fn from_declaration(spec: &Value) -> Result<Self, ConditionError> {
        match spec {
            Value::String(name) => Self::new(name.as_str()),
            Value::Object(map) if map.len() == 1 => {
                let Some((name, options)) = map.iter().next() else {
                    return Err(ConditionError::invalid("empty sort field declaration"));
                };
                let Value::Object(options) = options else {
                    return Err(ConditionError::invalid(format!(
                        "options for sort field '{}' must be an object",
                        name
                    )));
                };

                let mut field = Self::new(name.as_str())?;
                for (key, option) in options {
                    field = match (key.as_str(), option) {
                        ("sql", Value::String(column)) => field.with_column(column.as_str())?,
                        ("direction", Value::String(tag)) => {
                            let direction = SortDirection::parse(tag).ok_or_else(|| {
                                ConditionError::invalid(format!(
                                    "unknown sort direction '{}' for '{}'",
                                    tag, name
                                ))
                            })?;
                            field.with_direction(direction)
                        }
                        _ => {
                            return Err(ConditionError::invalid(format!(
                                "unknown option '{}' for sort field '{}'",
                                key, name
                            )));
                        }
                    };
                }
                Ok(field)
            }
            other => Err(ConditionError::invalid(format!(
                "unrecognized sort field declaration {}",
                other
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    fn order(&self, direction: SortDirection) -> OrderClause {
        OrderClause {
            field: self.name.clone(),
            column: self.column.clone(),
            direction,
        }
    }
}

/// A compiled sort order on one declared column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub field: String,
    pub column: String,
    pub direction: SortDirection,
}

impl OrderClause {
    /// SQL ORDER BY clause (without the "ORDER BY" prefix)
    pub fn to_sql(&self) -> String {
        format!("{} {}", quote_column(&self.column), self.direction.as_sql())
    }

    /// Append this order to a query
    #[cfg(feature = "postgres")]
    pub fn push_to(&self, builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>) {
        builder.push(self.to_sql());
    }
}

impl fmt::Display for OrderClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Compiles untrusted sort requests against an allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBuilder {
    fields: Vec<SortField>,
}

impl OrderBuilder {
    /// Freeze an allow-list; it must be non-empty and free of duplicates
    pub fn new(fields: Vec<SortField>) -> Result<Self, ConditionError> {
        if fields.is_empty() {
            return Err(ConditionError::invalid(
                "sort declaration needs at least one field",
            ));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ConditionError::invalid(format!(
                    "sort field '{}' declared twice",
                    field.name
                )));
            }
        }

        Ok(Self { fields })
    }

    /// Build from a `["field", ..]` declaration, keeping its order
    pub fn from_declaration(spec: &Value) -> Result<Self, ConditionError> {
        let Value::Array(items) = spec else {
            return Err(ConditionError::invalid(format!(
                "sort declaration must be a list, got {}",
                spec
            )));
        };

        let fields = items
            .iter()
            .map(SortField::from_declaration)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(fields)
    }

    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    /// Ascending on the first declared field
    pub fn default_order(&self) -> OrderClause {
        let first = &self.fields[0];
        first.order(SortDirection::Asc)
    }

    /// Compile a sort key of the form `field` or `field asc|desc`
    pub fn compile(&self, sort_key: Option<&str>) -> OrderClause {
        let mut parts = sort_key.unwrap_or_default().split_whitespace();
        let (name, direction, rest) = (parts.next(), parts.next(), parts.next());

        let order = match (name, rest) {
            (Some(name), None) => self
                .fields
                .iter()
                .find(|field| field.name == name)
                .map(|field| {
                    let direction = direction
                        .and_then(SortDirection::parse)
                        .unwrap_or(field.direction);
                    field.order(direction)
                }),
            _ => None,
        };

        match order {
            Some(order) => {
                tracing::trace!(
                    field = %order.field,
                    direction = %order.direction,
                    "compiled sort"
                );
                order
            }
            None => {
                tracing::debug!("sort request not allow-listed, using default order");
                self.default_order()
            }
        }
    }

    /// Compile a request parameter: a sort key string or `{"field": "desc"}`
    pub fn compile_param(&self, param: &Value) -> OrderClause {
        match param {
            Value::String(key) => self.compile(Some(key.as_str())),
            Value::Object(map) if map.len() == 1 => match map.iter().next() {
                Some((name, Value::String(direction))) if !name.contains(char::is_whitespace) => {
                    let key = format!("{} {}", name, direction);
                    self.compile(Some(key.as_str()))
                }
                _ => self.default_order(),
            },
            _ => self.default_order(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users_sorting() -> OrderBuilder {
        OrderBuilder::from_declaration(&json!(["prefix", "first_name", "last_name", "email"]))
            .unwrap()
    }

    // ==================== Declaration ====================

    #[test]
    fn test_declaration_keeps_order() {
        let sorting = users_sorting();
        let names: Vec<_> = sorting.fields().iter().map(SortField::name).collect();
        assert_eq!(names, vec!["prefix", "first_name", "last_name", "email"]);
    }

    #[test]
    fn test_empty_declaration_rejected() {
        let err = OrderBuilder::from_declaration(&json!([])).unwrap_err();
        assert!(err.to_string().contains("at least one field"));
    }

    #[test]
    fn test_bad_declarations_rejected() {
        for spec in [
            json!("email"),
            json!(["email", "email"]),
            json!(["email; DROP TABLE x"]),
            json!([{ "email": "desc" }]),
            json!([{ "email": { "direction": "sideways" } }]),
            json!([{ "email": { "nulls": "last" } }]),
            json!([{ "email": { "sql": "users.email desc" } }]),
            json!([7]),
        ] {
            assert!(
                OrderBuilder::from_declaration(&spec).is_err(),
                "{} should be rejected",
                spec
            );
        }
    }

    // ==================== Compilation ====================

    #[test]
    fn test_allow_listed_key() {
        let order = users_sorting().compile(Some("email"));
        assert_eq!(order.to_sql(), "\"email\" ASC");
    }

    #[test]
    fn test_unknown_key_falls_back() {
        let order = users_sorting().compile(Some("ssn"));
        assert_eq!(order.field, "prefix");
        assert_eq!(order.to_sql(), "\"prefix\" ASC");
    }

    #[test]
    fn test_absent_or_empty_key_falls_back() {
        let sorting = users_sorting();
        assert_eq!(sorting.compile(None), sorting.default_order());
        assert_eq!(sorting.compile(Some("")), sorting.default_order());
        assert_eq!(sorting.compile(Some("   ")), sorting.default_order());
    }

    #[test]
    fn test_direction_negotiation() {
        let sorting = users_sorting();
        assert_eq!(sorting.compile(Some("email desc")).to_sql(), "\"email\" DESC");
        assert_eq!(sorting.compile(Some("email DESC")).to_sql(), "\"email\" DESC");
        assert_eq!(sorting.compile(Some("email asc")).to_sql(), "\"email\" ASC");
    }

    #[test]
    fn test_invalid_direction_never_interpolated() {
        let order = users_sorting().compile(Some("email ;DROP"));
        assert_eq!(order.to_sql(), "\"email\" ASC");

        let order = users_sorting().compile(Some("email desc, ssn"));
        assert_eq!(order, users_sorting().default_order());
    }

    #[test]
    fn test_injection_attempt_falls_back() {
        let order = users_sorting().compile(Some("email; DROP TABLE users"));
        assert_eq!(order.to_sql(), "\"prefix\" ASC");
    }

    #[test]
    fn test_declared_column_and_direction() {
        let sorting = OrderBuilder::from_declaration(&json!([
            "name",
            { "newest": { "sql": "users.created_at", "direction": "desc" } }
        ]))
        .unwrap();

        assert_eq!(
            sorting.compile(Some("newest")).to_sql(),
            "\"users\".\"created_at\" DESC"
        );
        assert_eq!(
            sorting.compile(Some("newest asc")).to_sql(),
            "\"users\".\"created_at\" ASC"
        );
    }

    #[test]
    fn test_default_order_ignores_declared_direction() {
        let sorting = OrderBuilder::new(vec![
            SortField::new("rank").unwrap().with_direction(SortDirection::Desc),
        ])
        .unwrap();
        assert_eq!(sorting.default_order().direction, SortDirection::Asc);
    }

    // ==================== Request Parameters ====================

    #[test]
    fn test_param_string() {
        assert_eq!(
            users_sorting().compile_param(&json!("last_name")).to_sql(),
            "\"last_name\" ASC"
        );
    }

    #[test]
    fn test_param_object() {
        assert_eq!(
            users_sorting().compile_param(&json!({ "last_name": "desc" })).to_sql(),
            "\"last_name\" DESC"
        );
    }

    #[test]
    fn test_param_fallbacks() {
        let sorting = users_sorting();
        for param in [
            json!(null),
            json!(3),
            json!(["email"]),
            json!({ "email": 1 }),
            json!({ "email desc": "asc" }),
            json!({ "email": "desc", "prefix": "asc" }),
        ] {
            assert_eq!(sorting.compile_param(&param), sorting.default_order(), "{}", param);
        }
    }
}
