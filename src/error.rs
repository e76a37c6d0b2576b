//! Error types for presentation specs and query compilation
//!
//! Configuration errors ([`SpecError`], [`ConditionError`]) are raised while a
//! declaration is being built. Resolution errors ([`AttributeError`]) are raised
//! while reading a value from a record. Untrusted request input never produces
//! an error.

use thiserror::Error;

/// Errors raised while normalizing declarative field and group shapes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("Unrecognized field shape: {0}")]
    UnrecognizedFieldShape(String),

    #[error("Unrecognized group shape: {0}")]
    UnrecognizedGroupShape(String),

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("Unknown option '{option}' for field '{field}'")]
    UnknownFieldOption { field: String, option: String },

    #[error("Field '{0}' has a choice type but no type_options")]
    MissingTypeOptions(String),
}

/// Errors raised while declaring searchable or sortable fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),
}

impl ConditionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDeclaration(msg.into())
    }
}

/// Errors raised while resolving an attribute value from a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("Record has no accessor '{0}'")]
    MissingAccessor(String),
}

/// Any error produced by this crate
#[derive(Debug, Error)]
pub enum PresentingError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PresentingError {
    /// Whether this is a host configuration mistake rather than a per-record failure
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Attribute(_))
    }
}

pub type Result<T> = std::result::Result<T, PresentingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_error_display() {
        let err = SpecError::UnrecognizedFieldShape("42".to_string());
        assert_eq!(err.to_string(), "Unrecognized field shape: 42");

        let err = SpecError::UnknownFieldOption {
            field: "name".to_string(),
            option: "colour".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown option 'colour' for field 'name'");
    }

    #[test]
    fn test_condition_error_helper() {
        let err = ConditionError::invalid("unknown operator 'like'");
        assert_eq!(
            err,
            ConditionError::InvalidDeclaration("unknown operator 'like'".to_string())
        );
    }

    #[test]
    fn test_error_classes() {
        let config: PresentingError = SpecError::UnknownFieldType("slider".to_string()).into();
        assert!(config.is_configuration());

        let config: PresentingError = ConditionError::invalid("bad").into();
        assert!(config.is_configuration());

        let resolution: PresentingError =
            AttributeError::MissingAccessor("email".to_string()).into();
        assert!(!resolution.is_configuration());
        assert_eq!(resolution.to_string(), "Record has no accessor 'email'");
    }
}
