use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("type '{0}' is defined twice")]
    DuplicateType(String),

    #[error("{path}: unknown type '{type_name}'")]
    UnknownType { path: String, type_name: String },

    #[error("{path}: invalid choice field: {message}")]
    InvalidChoice { path: String, message: String },

    #[error("StructureDefinition is missing '{0}'")]
    MissingField(&'static str),

    #[error("StructureDefinition kind '{0}' cannot be converted")]
    UnsupportedKind(String),

    #[error("{path}: {message}")]
    InvalidElement { path: String, message: String },
}
