use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Failure of a single conversion call. Every variant names the element path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("{path}: union has no recognizable set branch (set: {set_branches:?})")]
    UnresolvedChoice {
        path: String,
        set_branches: Vec<String>,
    },

    #[error("{path}: runtime type '{found}' is not a candidate of this choice")]
    UnrecognizedVariant { path: String, found: String },

    #[error("{path}: '{code}' is not a member of value set {value_set}")]
    UnknownCode {
        path: String,
        value_set: String,
        code: String,
    },

    #[error("{path}: {value} does not fit {target}")]
    ValueOutOfRange {
        path: String,
        value: String,
        target: &'static str,
    },

    #[error("{path}: branches {branches:?} are set at the same time")]
    AmbiguousChoice { path: String, branches: Vec<String> },

    #[error("{path}: invalid {type_name} '{value}': {reason}")]
    MalformedValue {
        path: String,
        type_name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{path}: {message}")]
    SchemaMismatch { path: String, message: String },

    #[error("no schema for type '{0}'")]
    UnknownType(String),

    #[error("{path}: nesting deeper than {limit} levels")]
    DepthExceeded { path: String, limit: usize },
}

impl ConversionError {
    pub(crate) fn mismatch(path: impl ToString, message: impl Into<String>) -> Self {
        ConversionError::SchemaMismatch {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn out_of_range(
        path: impl ToString,
        value: impl ToString,
        target: &'static str,
    ) -> Self {
        ConversionError::ValueOutOfRange {
            path: path.to_string(),
            value: value.to_string(),
            target,
        }
    }

    pub(crate) fn malformed(
        path: impl ToString,
        type_name: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConversionError::MalformedValue {
            path: path.to_string(),
            type_name,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Attach a path to a code-table failure.
    pub(crate) fn from_codes(path: impl ToString, error: ferrum_codes::Error) -> Self {
        match error {
            ferrum_codes::Error::UnknownCode { value_set, code } => ConversionError::UnknownCode {
                path: path.to_string(),
                value_set,
                code,
            },
            other => ConversionError::mismatch(path, other.to_string()),
        }
    }

    /// Element path of the failure, if it has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConversionError::UnresolvedChoice { path, .. }
            | ConversionError::UnrecognizedVariant { path, .. }
            | ConversionError::UnknownCode { path, .. }
            | ConversionError::ValueOutOfRange { path, .. }
            | ConversionError::AmbiguousChoice { path, .. }
            | ConversionError::MalformedValue { path, .. }
            | ConversionError::SchemaMismatch { path, .. }
            | ConversionError::DepthExceeded { path, .. } => Some(path.as_str()),
            ConversionError::UnknownType(_) => None,
        }
    }
}

/// Problems found while setting up a converter.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{path} is bound to value set {value_set}, which has no code table")]
    MissingCodeTable { path: String, value_set: String },

    #[error("invalid schema: {0}")]
    Schema(#[from] ferrum_schema::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}
