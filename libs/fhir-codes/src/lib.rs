//! FHIR code normalization
//!
//! Converts enumerated codes between the three lexical forms they take:
//!
//! | Form | Example |
//! |------|---------|
//! | wire code | `entered-in-error` |
//! | wire enum identifier | `ENTERED_IN_ERROR` |
//! | host enum identifier | `EnteredInError` |
//!
//! Every conversion is a lookup in the value set's [`ValueSetTable`]. The
//! generic case-folding rule only seeds rows for lower-case hyphenated codes;
//! everything else (`<=`, `4.0.1`, `MORN.early`) needs an explicit entry, and
//! the table rejects any row whose identifiers collide with another.
//!
//! # Example
//!
//! ```rust
//! use ferrum_codes::r4;
//!
//! let codes = ferrum_codes::r4_registry();
//! let wire = codes
//!     .to_wire_enum_identifier(r4::QUANTITY_COMPARATOR, "<=")
//!     .unwrap();
//! assert_eq!(wire, "LESS_THAN_OR_EQUAL_TO");
//! assert_eq!(codes.to_wire_code(r4::QUANTITY_COMPARATOR, wire).unwrap(), "<=");
//! ```

mod error;
mod loader;
pub mod normalize;
pub mod r4;
mod registry;
mod table;

use once_cell::sync::Lazy;
use std::sync::Arc;

pub use error::{Error, Result};
pub use registry::{canonical_key, CodeRegistry};
pub use table::{CodeEntry, ValueSetTable, ValueSetTableBuilder};

static R4_CODES: Lazy<Arc<CodeRegistry>> = Lazy::new(|| {
    Arc::new(r4::build_registry().expect("built-in R4 code tables are consistent"))
});

/// Shared registry of the built-in R4 tables, built on first use.
pub fn r4_registry() -> Arc<CodeRegistry> {
    Arc::clone(&R4_CODES)
}
