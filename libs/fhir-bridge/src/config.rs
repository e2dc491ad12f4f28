use crate::error::ConfigError;
use crate::temporal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Converter settings. Every section is optional in serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default)]
    pub choice: ChoiceConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub temporal: TemporalConfig,
}

impl ConverterConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            Some("json") => Self::from_json(&text),
            _ => Err(ConfigError::InvalidConfig(format!(
                "{}: expected a .yaml, .yml or .json file",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_depth == 0 {
            return Err(ConfigError::InvalidConfig(
                "limits.max_depth must be at least 1".to_string(),
            ));
        }
        if temporal::parse_zone(&self.temporal.default_timezone).is_none() {
            return Err(ConfigError::InvalidConfig(format!(
                "temporal.default_timezone '{}' is not Z, UTC or +hh:mm",
                self.temporal.default_timezone
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Choice fields
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceConfig {
    #[serde(default)]
    pub on_multiple_branches: MultipleBranchPolicy,
}

/// What decoding does with a union that has more than one declared branch set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultipleBranchPolicy {
    /// Take the first set branch in declaration order and log a warning.
    #[default]
    FirstDeclared,
    /// Fail with `AmbiguousChoice`.
    Reject,
}

// ============================================================================
// Limits
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Deepest field nesting a conversion will follow.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    64
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

// ============================================================================
// Temporal values
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalConfig {
    /// Zone recorded for dates written without a time (`Z`, `UTC` or `±hh:mm`).
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
        }
    }
}
