//! Attributes: values read from a record for display
//!
//! An [`Attribute`] pairs a human label and a programmatic id with a
//! [`ValueSpec`] describing where its value comes from.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::config;
use crate::error::AttributeError;
use crate::record::Record;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("acronym boundary pattern"));
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("camel boundary pattern"));
static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("non-alphanumeric pattern"));

/// Token used when a name has no alphanumeric characters at all
const FALLBACK_ID: &str = "field";

fn underscore(name: &str) -> String {
    let split = ACRONYM_BOUNDARY.replace_all(name, "${1}_${2}");
    CAMEL_BOUNDARY.replace_all(&split, "${1}_${2}").to_lowercase()
}

/// Derive an identifier-safe token from a name.
///
/// The result matches `[a-z0-9_]+`, never starts or ends with an underscore
/// and never contains two underscores in a row.
///
/// ```
/// use presenting::derive_id;
///
/// assert_eq!(derive_id("First Name"), "first_name");
/// assert_eq!(derive_id("FirstName"), "first_name");
/// assert_eq!(derive_id("e-mail (work)"), "e_mail_work");
/// assert_eq!(derive_id(&derive_id("e-mail (work)")), "e_mail_work");
/// ```
pub fn derive_id(name: &str) -> String {
    let lowered = underscore(name);
    let collapsed = NON_ALPHANUMERIC.replace_all(&lowered, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_ID.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Turn a short identifier into a human label (`first_name` -> `First Name`).
///
/// A trailing `_id` is dropped, so `author_id` reads as `Author`.
pub fn titleize(token: &str) -> String {
    let lowered = underscore(token);
    let stem = match lowered.strip_suffix("_id") {
        Some(stem) if !stem.is_empty() => stem,
        _ => lowered.as_str(),
    };

    stem.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

type Computation = dyn Fn(&dyn Record) -> Value + Send + Sync;

/// Where an attribute's value comes from
#[derive(Clone)]
pub enum ValueSpec {
    /// A fixed value, returned regardless of the record
    Fixed(Value),
    /// A named reader on the record
    Accessor(String),
    /// A function of the record, evaluated on every read
    Computed(Arc<Computation>),
}

impl ValueSpec {
    pub fn fixed(value: impl Into<Value>) -> Self {
        Self::Fixed(value.into())
    }

    pub fn accessor(key: impl Into<String>) -> Self {
        Self::Accessor(key.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&dyn Record) -> Value + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Resolve this spec against a record
    pub fn resolve(&self, record: &dyn Record) -> Result<Value, AttributeError> {
        match self {
            ValueSpec::Fixed(value) => Ok(value.clone()),
            ValueSpec::Accessor(key) => record
                .read(key)
                .ok_or_else(|| AttributeError::MissingAccessor(key.clone())),
            ValueSpec::Computed(f) => Ok((**f)(record)),
        }
    }
}

impl fmt::Debug for ValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSpec::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            ValueSpec::Accessor(key) => f.debug_tuple("Accessor").field(key).finish(),
            ValueSpec::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl PartialEq for ValueSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueSpec::Fixed(a), ValueSpec::Fixed(b)) => a == b,
            (ValueSpec::Accessor(a), ValueSpec::Accessor(b)) => a == b,
            (ValueSpec::Computed(a), ValueSpec::Computed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A value meant to be read from a record and displayed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attribute {
    name: String,
    label: String,
    id: Option<String>,
    value: Option<ValueSpec>,
    sanitize: Option<bool>,
}

impl Attribute {
    /// Create an attribute from a short identifier; the label is title-cased from it
    pub fn new(token: impl Into<String>) -> Self {
        let mut attribute = Self::default();
        attribute.set_name(token);
        attribute
    }

    /// Create an attribute whose name is already a human label
    pub fn titled(text: impl Into<String>) -> Self {
        let mut attribute = Self::new(text);
        attribute.label = attribute.name.clone();
        attribute
    }

    /// Override the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Override the derived id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    /// Set where the value comes from
    pub fn with_value(mut self, value: ValueSpec) -> Self {
        self.value = Some(value);
        self
    }

    /// Override the configured sanitize default
    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = Some(sanitize);
        self
    }

    /// Assign the name, defaulting the value spec to an accessor of the same
    /// name unless one is already set
    pub fn set_name(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.value.get_or_insert_with(|| ValueSpec::Accessor(token.clone()));
        self.label = titleize(&token);
        self.name = token;
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Explicit ids are normalized the same way derived ones are
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(derive_id(&id.into()));
    }

    pub fn set_value(&mut self, value: ValueSpec) {
        self.value = Some(value);
    }

    pub fn set_sanitize(&mut self, sanitize: bool) {
        self.sanitize = Some(sanitize);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The short programmatic name, usable as a CSS class or sort key
    pub fn id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => derive_id(&self.name),
        }
    }

    pub fn value_spec(&self) -> Option<&ValueSpec> {
        self.value.as_ref()
    }

    /// Whether the renderer should escape this attribute's value
    pub fn sanitize(&self) -> bool {
        self.sanitize.unwrap_or_else(|| config::defaults().sanitize_fields)
    }

    /// Read this attribute's value from `record`
    pub fn resolve(&self, record: &dyn Record) -> Result<Value, AttributeError> {
        match &self.value {
            Some(spec) => spec.resolve(record),
            None => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Person;

    impl Record for Person {
        fn read(&self, accessor: &str) -> Option<Value> {
            match accessor {
                "foo" => Some(json!("bar")),
                _ => None,
            }
        }
    }

    // =========================================================================
    // derive_id Tests
    // =========================================================================

    #[test]
    fn test_derive_id_simple() {
        assert_eq!(derive_id("name"), "name");
        assert_eq!(derive_id("First Name"), "first_name");
        assert_eq!(derive_id("first_name"), "first_name");
    }

    #[test]
    fn test_derive_id_collapses_punctuation() {
        assert_eq!(derive_id("Price ($)"), "price");
        assert_eq!(derive_id("a -- b"), "a_b");
        assert_eq!(derive_id("__a__b__"), "a_b");
    }

    #[test]
    fn test_derive_id_camel_case() {
        assert_eq!(derive_id("FirstName"), "first_name");
        assert_eq!(derive_id("HTTPStatus"), "http_status");
    }

    #[test]
    fn test_derive_id_leading_digits_and_unicode() {
        assert_eq!(derive_id("2nd Place"), "2nd_place");
        assert_eq!(derive_id("café au lait"), "caf_au_lait");
    }

    #[test]
    fn test_derive_id_only_punctuation() {
        assert_eq!(derive_id("!!!"), "field");
        assert_eq!(derive_id(""), "field");
        assert_eq!(derive_id("日本語"), "field");
    }

    #[test]
    fn test_derive_id_idempotent() {
        for name in ["First Name", "a__b", "X-Y-Z", "!!", "HTTPStatus", "  spaced  "] {
            let once = derive_id(name);
            assert_eq!(derive_id(&once), once);
        }
    }

    // =========================================================================
    // titleize Tests
    // =========================================================================

    #[test]
    fn test_titleize() {
        assert_eq!(titleize("foo"), "Foo");
        assert_eq!(titleize("first_name"), "First Name");
        assert_eq!(titleize("author_id"), "Author");
        assert_eq!(titleize("role_ids"), "Role Ids");
        assert_eq!(titleize("createdAt"), "Created At");
    }

    #[test]
    fn test_titleize_bare_id() {
        assert_eq!(titleize("id"), "Id");
    }

    // =========================================================================
    // Naming Tests
    // =========================================================================

    #[test]
    fn test_token_name() {
        let attribute = Attribute::new("first_name");
        assert_eq!(attribute.name(), "first_name");
        assert_eq!(attribute.label(), "First Name");
        assert_eq!(attribute.id(), "first_name");
    }

    #[test]
    fn test_titled_name_used_verbatim() {
        let attribute = Attribute::titled("Full name (legal)");
        assert_eq!(attribute.label(), "Full name (legal)");
        assert_eq!(attribute.id(), "full_name_legal");
    }

    #[test]
    fn test_explicit_id_is_normalized() {
        let attribute = Attribute::new("name").with_id("Display Name");
        assert_eq!(attribute.id(), "display_name");
    }

    // =========================================================================
    // Value Resolution Tests
    // =========================================================================

    #[test]
    fn test_default_value_is_accessor() {
        let attribute = Attribute::new("foo");
        assert_eq!(attribute.value_spec(), Some(&ValueSpec::accessor("foo")));
        assert_eq!(attribute.resolve(&Person).unwrap(), json!("bar"));
    }

    #[test]
    fn test_fixed_value() {
        let attribute = Attribute::new("foo").with_value(ValueSpec::fixed("foo"));
        assert_eq!(attribute.resolve(&Person).unwrap(), json!("foo"));
    }

    #[test]
    fn test_computed_value() {
        let attribute = Attribute::new("shout").with_value(ValueSpec::computed(|record| {
            match record.read("foo") {
                Some(Value::String(s)) => Value::String(s.to_uppercase()),
                _ => Value::Null,
            }
        }));
        assert_eq!(attribute.resolve(&Person).unwrap(), json!("BAR"));
    }

    #[test]
    fn test_missing_accessor() {
        let attribute = Attribute::new("email");
        let err = attribute.resolve(&Person).unwrap_err();
        assert_eq!(err, AttributeError::MissingAccessor("email".to_string()));
    }

    #[test]
    fn test_map_lookup_never_fails() {
        let attribute = Attribute::new("email");
        assert_eq!(attribute.resolve(&json!({})).unwrap(), Value::Null);
    }

    #[test]
    fn test_set_name_keeps_explicit_value() {
        let mut attribute = Attribute::default();
        attribute.set_value(ValueSpec::fixed(42));
        attribute.set_name("answer");
        assert_eq!(attribute.value_spec(), Some(&ValueSpec::fixed(42)));
    }

    #[test]
    fn test_renaming_keeps_first_accessor() {
        let mut attribute = Attribute::new("foo");
        attribute.set_name("bar");
        assert_eq!(attribute.name(), "bar");
        assert_eq!(attribute.value_spec(), Some(&ValueSpec::accessor("foo")));
    }

    #[test]
    fn test_unset_value_resolves_null() {
        assert_eq!(Attribute::default().resolve(&Person).unwrap(), Value::Null);
    }

    // =========================================================================
    // Sanitize Tests
    // =========================================================================

    #[test]
    fn test_sanitize_defaults_to_config() {
        assert_eq!(
            Attribute::new("foo").sanitize(),
            config::defaults().sanitize_fields
        );
    }

    #[test]
    fn test_sanitize_override() {
        assert!(!Attribute::new("foo").with_sanitize(false).sanitize());
        assert!(Attribute::new("foo").with_sanitize(true).sanitize());
    }
}
