//! Configuration for presentation and query compilation
//!
//! Provides a builder pattern for [`PresentingConfig`] and a process-wide
//! default that is set once during startup.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::ConditionError;

static DEFAULTS: OnceLock<PresentingConfig> = OnceLock::new();

/// Characters that cannot double as the LIKE escape
const RESERVED_ESCAPES: [char; 3] = ['%', '_', '\''];

fn default_sanitize_fields() -> bool {
    true
}

fn default_like_escape() -> char {
    '\\'
}

fn default_cast_to_text() -> bool {
    true
}

/// Configuration shared by attributes and the query compilers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentingConfig {
    /// Whether attribute values are escaped for presentation unless a field
    /// says otherwise (default: true)
    #[serde(default = "default_sanitize_fields")]
    pub sanitize_fields: bool,
    /// Escape character for LIKE patterns (default: `\`)
    #[serde(default = "default_like_escape")]
    pub like_escape: char,
    /// Whether comparisons cast both sides to `text` (default: true)
    #[serde(default = "default_cast_to_text")]
    pub cast_to_text: bool,
}

impl Default for PresentingConfig {
    fn default() -> Self {
        Self {
            sanitize_fields: default_sanitize_fields(),
            like_escape: default_like_escape(),
            cast_to_text: default_cast_to_text(),
        }
    }
}

impl PresentingConfig {
    /// Create a new configuration builder
    pub fn builder() -> PresentingConfigBuilder {
        PresentingConfigBuilder::new()
    }

    /// Parse a JSON document; missing keys take their defaults
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would corrupt compiled LIKE patterns
    pub fn validate(&self) -> Result<(), ConditionError> {
        if RESERVED_ESCAPES.contains(&self.like_escape) {
            return Err(ConditionError::invalid(format!(
                "'{}' cannot be used as the LIKE escape character",
                self.like_escape
            )));
        }
        Ok(())
    }
}

/// Builder for PresentingConfig
#[derive(Debug, Default)]
pub struct PresentingConfigBuilder {
    config: PresentingConfig,
}

impl PresentingConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default sanitize flag for attributes (default: true)
    pub fn sanitize_fields(mut self, enabled: bool) -> Self {
        self.config.sanitize_fields = enabled;
        self
    }

    /// Set the LIKE escape character (default: `\`)
    pub fn like_escape(mut self, escape: char) -> Self {
        self.config.like_escape = escape;
        self
    }

    /// Enable or disable `::text` casts in comparison clauses (default: true)
    pub fn cast_to_text(mut self, enabled: bool) -> Self {
        self.config.cast_to_text = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> PresentingConfig {
        self.config
    }
}

/// Install the process-wide defaults.
///
/// May only succeed once; later calls and invalid configs are handed back.
pub fn init(config: PresentingConfig) -> Result<(), PresentingConfig> {
    if config.validate().is_err() {
        return Err(config);
    }
    DEFAULTS.set(config)?;
    tracing::debug!("presenting defaults initialized");
    Ok(())
}

/// Process-wide defaults, or [`PresentingConfig::default`] if [`init`] was never called.
pub fn defaults() -> &'static PresentingConfig {
    DEFAULTS.get_or_init(PresentingConfig::default)
}
