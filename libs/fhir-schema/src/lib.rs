//! FHIR conversion schemas
//!
//! Declarative description of every convertible type: its fields in
//! conversion order, their cardinality, and how each one converts
//! (primitive, coded, composite or choice). Schemas are data; the converter
//! in `ferrum-bridge` is the only logic that walks them.
//!
//! Schemas come from the built-in R4 tables ([`r4_registry`]) or from
//! StructureDefinition snapshots ([`parser::parse_into`]).
//!
//! # Example
//!
//! ```rust
//! use ferrum_schema::PropertyKind;
//!
//! let schemas = ferrum_schema::r4_registry();
//! let onset = schemas
//!     .get("Condition")
//!     .and_then(|c| c.get_property("onset"))
//!     .unwrap();
//! assert!(matches!(onset.kind, PropertyKind::Choice(_)));
//! ```

mod error;
pub mod ir;
pub mod naming;
pub mod parser;
pub mod r4;

use once_cell::sync::Lazy;
use std::sync::Arc;

pub use error::{Error, Result};
pub use ir::{
    CandidateKind, Cardinality, ChoiceCandidate, ChoiceType, Property, PropertyKind,
    TypeDefinition, TypeKind, TypeRegistry,
};

static R4_SCHEMAS: Lazy<Arc<TypeRegistry>> = Lazy::new(|| {
    Arc::new(r4::build_registry().expect("built-in R4 schema tables are consistent"))
});

/// Shared registry of the built-in R4 schemas, built on first use.
pub fn r4_registry() -> Arc<TypeRegistry> {
    Arc::clone(&R4_SCHEMAS)
}
