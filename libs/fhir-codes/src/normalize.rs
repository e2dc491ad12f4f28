//! Generic lexical rules
//!
//! These only seed table rows. Conversion always goes through a
//! [`ValueSetTable`](crate::ValueSetTable), never through these functions.

use heck::ToUpperCamelCase;
use once_cell::sync::Lazy;
use regex::Regex;

static GENERIC_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").expect("valid regex"));

static WIRE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").expect("valid regex"));

static HOST_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Whether `code` may rely on the generic rule (lower-case, hyphen separated).
pub fn is_generic_code(code: &str) -> bool {
    GENERIC_CODE.is_match(code)
}

/// `entered-in-error` -> `ENTERED_IN_ERROR`
pub fn generic_wire_identifier(code: &str) -> String {
    code.replace('-', "_").to_ascii_uppercase()
}

/// `entered-in-error` -> `EnteredInError`
pub fn generic_host_identifier(code: &str) -> String {
    code.to_upper_camel_case()
}

pub fn is_wire_identifier(identifier: &str) -> bool {
    WIRE_IDENTIFIER.is_match(identifier)
}

pub fn is_host_identifier(identifier: &str) -> bool {
    HOST_IDENTIFIER.is_match(identifier)
}
