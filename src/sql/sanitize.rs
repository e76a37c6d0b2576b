//! SQL Identifier and Pattern Sanitization Utilities
//!
//! Declared column names are validated and quoted; untrusted terms are only
//! ever bound as parameters, with LIKE wildcards escaped first.

use regex::Regex;
use std::sync::LazyLock;

static COLUMN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("column pattern")
});

/// Quote a SQL identifier to make it safe for use in queries
///
/// # Example
/// ```
/// use presenting::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("my_table"), "\"my_table\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    // Escape any double quotes in the identifier by doubling them
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Quote a possibly table-qualified column, one segment at a time
///
/// ```
/// use presenting::sql::quote_column;
///
/// assert_eq!(quote_column("users.name"), "\"users\".\"name\"");
/// ```
pub fn quote_column(column: &str) -> String {
    column
        .split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// Validate a declared column reference
///
/// Rules:
/// - `column` or `table.column`
/// - each part starts with a letter or underscore
/// - each part contains only ASCII letters, digits and underscores
///
/// ```
/// use presenting::sql::validate_column;
///
/// assert!(validate_column("users.first_name").is_ok());
/// assert!(validate_column("name; DROP TABLE x").is_err());
/// ```
pub fn validate_column(column: &str) -> Result<(), String> {
    if column.is_empty() {
        return Err("Column cannot be empty".to_string());
    }

    if !COLUMN_PATTERN.is_match(column) {
        return Err(format!(
            "Column '{}' is invalid. Use `column` or `table.column` made of letters, digits and underscores.",
            column
        ));
    }

    Ok(())
}

/// Escape LIKE wildcards (`%`, `_`) and the escape character itself
///
/// ```
/// use presenting::sql::escape_like;
///
/// assert_eq!(escape_like("100%", '\\'), "100\\%");
/// assert_eq!(escape_like("a_b", '\\'), "a\\_b");
/// ```
pub fn escape_like(value: &str, escape: char) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == escape || c == '%' || c == '_' {
            escaped.push(escape);
        }
        escaped.push(c);
    }
    escaped
}

/// Render the escape character as a SQL string literal
pub fn escape_literal(escape: char) -> String {
    format!("'{}'", escape)
}

enum PatternToken {
    Literal(char),
    AnyOne,
    AnyMany,
}

fn tokenize(pattern: &str, escape: char) -> Vec<PatternToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == escape {
            // A dangling escape matches itself
            tokens.push(PatternToken::Literal(chars.next().unwrap_or(escape)));
        } else if c == '%' {
            tokens.push(PatternToken::AnyMany);
        } else if c == '_' {
            tokens.push(PatternToken::AnyOne);
        } else {
            tokens.push(PatternToken::Literal(c));
        }
    }
    tokens
}

/// Evaluate `text LIKE pattern ESCAPE escape` in memory
pub fn like_matches(pattern: &str, escape: char, text: &str) -> bool {
    let tokens = tokenize(pattern, escape);
    let text: Vec<char> = text.chars().collect();

    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(PatternToken::AnyMany) => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(PatternToken::AnyOne) => {
                p += 1;
                t += 1;
            }
            Some(PatternToken::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    tokens[p..]
        .iter()
        .all(|token| matches!(token, PatternToken::AnyMany))
}
