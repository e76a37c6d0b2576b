//! Ordered groups of fields
//!
//! Group shapes accepted by [`Group::from_spec`]:
//!
//! - `[field, ..]`: an unnamed group
//! - `{"name": [field, ..]}`: a named group

use serde_json::Value;

use crate::error::SpecError;
use crate::field::Field;

/// An ordered, optionally named collection of fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    name: Option<String>,
    fields: Vec<Field>,
}

impl Group {
    /// Create an unnamed group
    pub fn unnamed(fields: Vec<Field>) -> Result<Self, SpecError> {
        Self::build(None, fields)
    }

    /// Create a named group
    pub fn named(name: impl Into<String>, fields: Vec<Field>) -> Result<Self, SpecError> {
        Self::build(Some(name.into()), fields)
    }

    fn build(name: Option<String>, fields: Vec<Field>) -> Result<Self, SpecError> {
        for field in &fields {
            field.validate()?;
        }
        Ok(Self { name, fields })
    }

    /// Normalize a declarative group shape
    pub fn from_spec(spec: &Value) -> Result<Self, SpecError> {
        match spec {
            Value::Array(_) => Self::unnamed(Field::list_from_spec(spec)?),
            Value::Object(map) if map.len() == 1 => {
                let Some((name, fields)) = map.iter().next() else {
                    return Err(SpecError::UnrecognizedGroupShape(spec.to_string()));
                };
                match fields {
                    Value::Array(_) => Self::named(name.as_str(), Field::list_from_spec(fields)?),
                    _ => Err(SpecError::UnrecognizedGroupShape(spec.to_string())),
                }
            }
            _ => Err(SpecError::UnrecognizedGroupShape(spec.to_string())),
        }
    }

    /// Normalize a list of group shapes, keeping their order
    pub fn list_from_spec(spec: &Value) -> Result<Vec<Self>, SpecError> {
        match spec {
            Value::Array(items) => items.iter().map(Group::from_spec).collect(),
            _ => Err(SpecError::UnrecognizedGroupShape(format!(
                "expected a list of groups, got {}",
                spec
            ))),
        }
    }

    /// Legend of the group, `None` for the default group
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn push(&mut self, field: Field) {
        self.fields.push(field);
    }
}
