//! Compiled filter predicates
//!
//! A [`Predicate`] only ever holds declared columns and bound operands. It can
//! be rendered to parameterized SQL or evaluated in memory against a record.

use serde_json::Value;

use crate::config::PresentingConfig;
use crate::record::Record;
use crate::sql::sanitize::{escape_literal, like_matches, quote_column};

/// How a clause compares its column with its operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    NotEquals,
    /// LIKE against an already escaped pattern
    Like,
    IsNull,
    IsNotNull,
}

/// How clauses combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    fn as_sql(&self) -> &'static str {
        match self {
            Conjunction::And => " AND ",
            Conjunction::Or => " OR ",
        }
    }
}

/// One comparison on a declared column
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Declared request key, also the record accessor used by [`Predicate::matches`]
    pub field: String,
    /// Validated column reference
    pub column: String,
    pub comparison: Comparison,
    /// Bound parameter; `None` for null checks
    pub operand: Option<String>,
}

/// SQL around a clause's single placeholder
struct ClauseSql {
    before: String,
    after: String,
}

impl Clause {
    fn render(&self, like_escape: char, cast_to_text: bool) -> ClauseSql {
        let column = quote_column(&self.column);
        let (lhs, cast) = if cast_to_text {
            (format!("{}::text", column), "::text")
        } else {
            (column.clone(), "")
        };

        let (before, after) = match self.comparison {
            Comparison::Equals => (format!("{} = ", lhs), cast.to_string()),
            Comparison::NotEquals => (format!("{} != ", lhs), cast.to_string()),
            Comparison::Like => (
                format!("{} LIKE ", lhs),
                format!("{} ESCAPE {}", cast, escape_literal(like_escape)),
            ),
            Comparison::IsNull => (format!("{} IS NULL", column), String::new()),
            Comparison::IsNotNull => (format!("{} IS NOT NULL", column), String::new()),
        };

        ClauseSql { before, after }
    }

    fn matches(&self, record: &dyn Record, like_escape: char) -> bool {
        let text = match record.read(&self.field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        match (self.comparison, text, self.operand.as_deref()) {
            (Comparison::IsNull, text, _) => text.is_none(),
            (Comparison::IsNotNull, text, _) => text.is_some(),
            (Comparison::Equals, Some(text), Some(operand)) => text == operand,
            (Comparison::NotEquals, Some(text), Some(operand)) => text != operand,
            (Comparison::Like, Some(text), Some(pattern)) => {
                like_matches(pattern, like_escape, &text)
            }
            // NULL never compares
            _ => false,
        }
    }
}

/// A safe filter condition over declared columns
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    conjunction: Conjunction,
    clauses: Vec<Clause>,
    like_escape: char,
    cast_to_text: bool,
}

impl Predicate {
    pub(crate) fn new(
        conjunction: Conjunction,
        clauses: Vec<Clause>,
        config: &PresentingConfig,
    ) -> Self {
        Self {
            conjunction,
            clauses,
            like_escape: config.like_escape,
            cast_to_text: config.cast_to_text,
        }
    }

    /// Whether the predicate matches every row
    pub fn is_universal(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    /// Render as a WHERE condition numbered from `$1`
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut offset = 1;
        self.to_sql_with_offset(&mut offset)
    }

    /// Render as a WHERE condition
    ///
    /// Returns (clause, params) tuple where:
    /// - `clause` is the SQL condition with placeholders starting at `param_offset`
    /// - `params` is a vector of parameter values to bind
    ///
    /// `param_offset` is advanced past the placeholders used. A predicate with
    /// no clauses renders as `TRUE`.
    pub fn to_sql_with_offset(&self, param_offset: &mut i32) -> (String, Vec<Value>) {
        if self.clauses.is_empty() {
            return ("TRUE".to_string(), Vec::new());
        }

        let mut params = Vec::new();
        let mut parts = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let sql = clause.render(self.like_escape, self.cast_to_text);
            match &clause.operand {
                Some(operand) => {
                    parts.push(format!("{}${}{}", sql.before, param_offset, sql.after));
                    params.push(Value::String(operand.clone()));
                    *param_offset += 1;
                }
                None => parts.push(sql.before),
            }
        }

        if parts.len() == 1 {
            return (parts.remove(0), params);
        }
        let joined = parts
            .iter()
            .map(|part| format!("({})", part))
            .collect::<Vec<_>>()
            .join(self.conjunction.as_sql());
        (joined, params)
    }

    /// Evaluate against a record with SQL semantics
    pub fn matches(&self, record: &dyn Record) -> bool {
        let mut results = self
            .clauses
            .iter()
            .map(|clause| clause.matches(record, self.like_escape));
        match self.conjunction {
            _ if self.clauses.is_empty() => true,
            Conjunction::And => results.all(|matched| matched),
            Conjunction::Or => results.any(|matched| matched),
        }
    }

    /// Append this predicate to a query, binding every operand
    #[cfg(feature = "postgres")]
    pub fn push_to(&self, builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>) {
        if self.clauses.is_empty() {
            builder.push("TRUE");
            return;
        }

        let wrap = self.clauses.len() > 1;
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                builder.push(self.conjunction.as_sql());
            }
            if wrap {
                builder.push("(");
            }
            let sql = clause.render(self.like_escape, self.cast_to_text);
            builder.push(sql.before);
            if let Some(operand) = &clause.operand {
                builder.push_bind(operand.clone());
                builder.push(sql.after);
            }
            if wrap {
                builder.push(")");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clause(field: &str, comparison: Comparison, operand: Option<&str>) -> Clause {
        Clause {
            field: field.to_string(),
            column: field.to_string(),
            comparison,
            operand: operand.map(str::to_string),
        }
    }

    fn and(clauses: Vec<Clause>) -> Predicate {
        Predicate::new(Conjunction::And, clauses, &PresentingConfig::default())
    }

    // ==================== Rendering ====================

    #[test]
    fn test_universal_predicate() {
        let predicate = and(vec![]);
        assert!(predicate.is_universal());
        assert_eq!(predicate.to_sql(), ("TRUE".to_string(), vec![]));
    }

    #[test]
    fn test_eq_clause() {
        let predicate = and(vec![clause("name", Comparison::Equals, Some("test"))]);
        let (sql, params) = predicate.to_sql();

        assert_eq!(sql, "\"name\"::text = $1::text");
        assert_eq!(params, vec![json!("test")]);
    }

    #[test]
    fn test_like_clause() {
        let predicate = and(vec![clause("name", Comparison::Like, Some("bo%"))]);
        let (sql, params) = predicate.to_sql();

        assert_eq!(sql, "\"name\"::text LIKE $1::text ESCAPE '\\'");
        assert_eq!(params, vec![json!("bo%")]);
    }

    #[test]
    fn test_null_clauses_bind_nothing() {
        let predicate = and(vec![
            clause("email", Comparison::IsNotNull, None),
            clause("deleted_at", Comparison::IsNull, None),
        ]);
        let (sql, params) = predicate.to_sql();

        assert_eq!(sql, "(\"email\" IS NOT NULL) AND (\"deleted_at\" IS NULL)");
        assert!(params.is_empty());
    }

    #[test]
    fn test_or_conjunction() {
        let predicate = Predicate::new(
            Conjunction::Or,
            vec![
                clause("a", Comparison::Equals, Some("1")),
                clause("b", Comparison::NotEquals, Some("2")),
            ],
            &PresentingConfig::default(),
        );
        let (sql, _) = predicate.to_sql();

        assert_eq!(sql, "(\"a\"::text = $1::text) OR (\"b\"::text != $2::text)");
    }

    #[test]
    fn test_param_offset_tracking() {
        let predicate = and(vec![
            clause("a", Comparison::Equals, Some("1")),
            clause("b", Comparison::IsNotNull, None),
            clause("c", Comparison::Equals, Some("3")),
        ]);

        let mut offset = 5;
        let (sql, params) = predicate.to_sql_with_offset(&mut offset);

        assert!(sql.contains("$5"));
        assert!(sql.contains("$6"));
        assert!(!sql.contains("$7"));
        assert_eq!(params.len(), 2);
        assert_eq!(offset, 7);
    }

    #[test]
    fn test_without_text_casts() {
        let config = PresentingConfig::builder()
            .cast_to_text(false)
            .like_escape('!')
            .build();
        let predicate = Predicate::new(
            Conjunction::And,
            vec![
                clause("a", Comparison::Equals, Some("1")),
                clause("b", Comparison::Like, Some("x%")),
            ],
            &config,
        );
        let (sql, _) = predicate.to_sql();

        assert_eq!(sql, "(\"a\" = $1) AND (\"b\" LIKE $2 ESCAPE '!')");
    }

    #[test]
    fn test_qualified_column() {
        let mut qualified = clause("name", Comparison::Equals, Some("x"));
        qualified.column = "users.name".to_string();
        let (sql, _) = and(vec![qualified]).to_sql();

        assert_eq!(sql, "\"users\".\"name\"::text = $1::text");
    }

    // ==================== In-memory Evaluation ====================

    #[test]
    fn test_matches_and() {
        let predicate = and(vec![
            clause("first_name", Comparison::Equals, Some("Bob")),
            clause("email", Comparison::IsNotNull, None),
        ]);

        assert!(predicate.matches(&json!({ "first_name": "Bob", "email": "b@x.io" })));
        assert!(!predicate.matches(&json!({ "first_name": "Bob", "email": null })));
        assert!(!predicate.matches(&json!({ "first_name": "Rob", "email": "b@x.io" })));
    }

    #[test]
    fn test_matches_null_semantics() {
        let predicate = and(vec![clause("age", Comparison::NotEquals, Some("3"))]);
        assert!(!predicate.matches(&json!({ "age": null })));
        assert!(predicate.matches(&json!({ "age": 4 })));
        assert!(!predicate.matches(&json!({ "age": 3 })));
    }

    #[test]
    fn test_matches_like() {
        let predicate = and(vec![clause("last_name", Comparison::Like, Some("Sm%"))]);
        assert!(predicate.matches(&json!({ "last_name": "Smith" })));
        assert!(!predicate.matches(&json!({ "last_name": "Jones" })));
    }

    #[test]
    fn test_matches_universal() {
        assert!(and(vec![]).matches(&json!({})));
        assert!(and(vec![]).matches(&json!(null)));
    }

    #[test]
    fn test_matches_missing_reader() {
        let predicate = and(vec![clause("a", Comparison::IsNull, None)]);
        assert!(predicate.matches(&json!("scalar")));
    }
}
