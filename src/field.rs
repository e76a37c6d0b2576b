//! Form fields and their declarative shapes
//!
//! A [`Field`] is an [`Attribute`] plus a render type. Fields are normally
//! built from host configuration with [`Field::from_spec`], which accepts:
//!
//! - `"name"`: a text field
//! - `{"name": "type"}`: a field with an explicit type
//! - `{"name": {"label": .., "type": .., "value": .., "type_options": ..}}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::attribute::{Attribute, ValueSpec};
use crate::error::{AttributeError, SpecError};
use crate::record::Record;

/// Render behaviour of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text input
    #[default]
    String,
    /// Multi-line text
    Text,
    /// Checkbox
    Boolean,
    /// Password input; the renderer never echoes the value
    Password,
    /// Hidden input without a label
    Hidden,
    /// Disabled text input
    Readonly,
    /// Select box
    Select,
    /// Select box
    Dropdown,
    /// One radio button per option
    Radios,
    /// Select box allowing several options
    MultiSelect,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::Password => "password",
            FieldType::Hidden => "hidden",
            FieldType::Readonly => "readonly",
            FieldType::Select => "select",
            FieldType::Dropdown => "dropdown",
            FieldType::Radios => "radios",
            FieldType::MultiSelect => "multi_select",
        }
    }

    /// Whether the type needs a list of options to render
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Dropdown | FieldType::Radios | FieldType::MultiSelect
        )
    }
}

impl FromStr for FieldType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "text" => Ok(FieldType::Text),
            "boolean" => Ok(FieldType::Boolean),
            "password" => Ok(FieldType::Password),
            "hidden" => Ok(FieldType::Hidden),
            "readonly" => Ok(FieldType::Readonly),
            "select" => Ok(FieldType::Select),
            "dropdown" => Ok(FieldType::Dropdown),
            "radios" => Ok(FieldType::Radios),
            "multi_select" => Ok(FieldType::MultiSelect),
            other => Err(SpecError::UnknownFieldType(other.to_string())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One choice of a select, radio or multi-select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeOption {
    pub label: String,
    pub value: Value,
}

impl TypeOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Parse `[label, value]` or a bare value (labelled by its text)
    fn from_spec(field: &str, spec: &Value) -> Result<Self, SpecError> {
        match spec {
            Value::Array(pair) if pair.len() == 2 => match &pair[0] {
                Value::String(label) => Ok(Self::new(label.as_str(), pair[1].clone())),
                _ => Err(SpecError::UnrecognizedFieldShape(format!(
                    "type_options entry {} for '{}' needs a string label",
                    spec, field
                ))),
            },
            Value::String(s) => Ok(Self::new(s.as_str(), spec.clone())),
            Value::Number(n) => Ok(Self::new(n.to_string(), spec.clone())),
            Value::Bool(b) => Ok(Self::new(b.to_string(), spec.clone())),
            _ => Err(SpecError::UnrecognizedFieldShape(format!(
                "type_options entry {} for '{}'",
                spec, field
            ))),
        }
    }
}

/// An attribute with a render type, carried to the rendering layer
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    attribute: Attribute,
    field_type: FieldType,
    type_options: Vec<TypeOption>,
}

impl Field {
    /// Create a text field named by a short identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            attribute: Attribute::new(name),
            field_type: FieldType::default(),
            type_options: Vec::new(),
        }
    }

    /// Normalize a declarative field shape
    pub fn from_spec(spec: &Value) -> Result<Self, SpecError> {
        let field = match spec {
            Value::String(name) => Field::new(name.as_str()),
            Value::Object(map) if map.len() == 1 => {
                let Some((name, body)) = map.iter().next() else {
                    return Err(SpecError::UnrecognizedFieldShape(spec.to_string()));
                };
                match body {
                    Value::String(tag) => Field::new(name.as_str()).with_type(tag.parse()?),
                    Value::Object(options) => Field::new(name.as_str()).apply_options(options)?,
                    _ => return Err(SpecError::UnrecognizedFieldShape(spec.to_string())),
                }
            }
            _ => return Err(SpecError::UnrecognizedFieldShape(spec.to_string())),
        };

        field.validate()?;
        Ok(field)
    }

    /// Normalize a list of declarative field shapes, keeping their order
    pub fn list_from_spec(spec: &Value) -> Result<Vec<Self>, SpecError> {
        match spec {
            Value::Array(items) => items.iter().map(Field::from_spec).collect(),
            _ => Err(SpecError::UnrecognizedFieldShape(format!(
                "expected a list of fields, got {}",
                spec
            ))),
        }
    }

    fn apply_options(mut self, options: &Map<String, Value>) -> Result<Self, SpecError> {
        for (key, option) in options {
            match (key.as_str(), option) {
                ("label", Value::String(label)) => self.attribute.set_label(label.as_str()),
                ("type", Value::String(tag)) => self.field_type = tag.parse()?,
                ("value", value) => {
                    let spec = value_from_spec(self.name(), value)?;
                    self.attribute.set_value(spec);
                }
                ("type_options", Value::Array(items)) => {
                    self.type_options = items
                        .iter()
                        .map(|item| TypeOption::from_spec(self.attribute.name(), item))
                        .collect::<Result<_, _>>()?;
                }
                ("id", Value::String(id)) => self.attribute.set_id(id.as_str()),
                ("sanitize", Value::Bool(sanitize)) => self.attribute.set_sanitize(*sanitize),
                ("label" | "type" | "type_options" | "id" | "sanitize", _) => {
                    return Err(SpecError::UnrecognizedFieldShape(format!(
                        "option '{}' of field '{}' has the wrong shape: {}",
                        key,
                        self.name(),
                        option
                    )));
                }
                _ => {
                    return Err(SpecError::UnknownFieldOption {
                        field: self.name().to_string(),
                        option: key.clone(),
                    });
                }
            }
        }
        Ok(self)
    }

    /// Check that choice types carry their options
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.field_type.is_choice() && self.type_options.is_empty() {
            return Err(SpecError::MissingTypeOptions(self.name().to_string()));
        }
        Ok(())
    }

    /// Set the render type
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Override the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.attribute.set_label(label);
        self
    }

    /// Set where the value comes from
    pub fn with_value(mut self, value: ValueSpec) -> Self {
        self.attribute.set_value(value);
        self
    }

    /// Set the choices of a choice-type field
    pub fn with_type_options(mut self, options: Vec<TypeOption>) -> Self {
        self.type_options = options;
        self
    }

    /// Override the configured sanitize default
    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.attribute.set_sanitize(sanitize);
        self
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn name(&self) -> &str {
        self.attribute.name()
    }

    pub fn label(&self) -> &str {
        self.attribute.label()
    }

    pub fn id(&self) -> String {
        self.attribute.id()
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn type_options(&self) -> &[TypeOption] {
        &self.type_options
    }

    pub fn resolve(&self, record: &dyn Record) -> Result<Value, AttributeError> {
        self.attribute.resolve(record)
    }
}

/// Scalars and lists are fixed values; `{"accessor": "key"}` names a reader
fn value_from_spec(field: &str, spec: &Value) -> Result<ValueSpec, SpecError> {
    match spec {
        Value::Object(map) => match map.get("accessor") {
            Some(Value::String(key)) if map.len() == 1 => Ok(ValueSpec::accessor(key.as_str())),
            _ => Err(SpecError::UnrecognizedFieldShape(format!(
                "value of field '{}' must be a literal or {{\"accessor\": \"..\"}}, got {}",
                field, spec
            ))),
        },
        _ => Ok(ValueSpec::Fixed(spec.clone())),
    }
}
