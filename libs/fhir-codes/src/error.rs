use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("'{code}' is not a member of value set {value_set}")]
    UnknownCode { value_set: String, code: String },

    #[error("unknown value set '{0}'")]
    UnknownValueSet(String),

    #[error("value set '{0}' is registered twice")]
    DuplicateValueSet(String),

    #[error("value set {value_set}: duplicate code '{code}'")]
    DuplicateCode { value_set: String, code: String },

    #[error(
        "value set {value_set}: code '{code}' needs an explicit entry, \
         the generic rule only covers lower-case hyphenated codes"
    )]
    MissingException { value_set: String, code: String },

    #[error(
        "value set {value_set}: {kind} identifier '{identifier}' is shared by codes '{first}' and '{second}'"
    )]
    Collision {
        value_set: String,
        kind: &'static str,
        identifier: String,
        first: String,
        second: String,
    },

    #[error("value set {value_set}: '{identifier}' is not a valid {kind} identifier")]
    InvalidIdentifier {
        value_set: String,
        kind: &'static str,
        identifier: String,
    },

    #[error("invalid {resource} resource: {message}")]
    InvalidResource {
        resource: &'static str,
        message: String,
    },
}
