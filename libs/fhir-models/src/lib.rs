//! FHIR data representations
//!
//! Two independent in-memory shapes of the same FHIR data:
//!
//! - [`host`]: an object graph. One node per element, fields by FHIR name,
//!   values typed at runtime (`dateTime`, `Age`, ...).
//! - [`wire`]: builder-assembled messages. Choice fields are `oneof`-style
//!   unions and every primitive is a wrapper message with explicit presence.
//!
//! Neither side knows the schema; `ferrum-schema` describes fields and
//! `ferrum-bridge` converts between the two.
//!
//! # Example
//!
//! ```rust
//! use ferrum_models::{HostComposite, HostPrimitive, WireMessage, WireScalar};
//!
//! let patient = HostComposite::new("Patient").with("active", HostPrimitive::boolean(false));
//! assert!(patient.has("active"));
//!
//! let wire = WireMessage::builder("Boolean")
//!     .scalar("value", WireScalar::Bool(false))
//!     .build();
//! assert!(wire.has("value"));
//! ```

pub mod host;
pub mod primitive;
pub mod wire;

pub use host::{HostCode, HostComposite, HostPrimitive, HostScalar, HostSlot, HostValue};
pub use primitive::PrimitiveType;
pub use wire::{
    WireField, WireMessage, WireMessageBuilder, WireScalar, WireUnion, WireUnionBuilder,
};
