//! Conversion between host object graphs and wire messages
//!
//! [`Converter`] turns a [`HostComposite`](ferrum_models::HostComposite)
//! resource into a [`WireMessage`](ferrum_models::WireMessage) and back,
//! driven entirely by the schema tables of `ferrum-schema` and the code
//! tables of `ferrum-codes`:
//!
//! - primitives become wrapper messages ([`ElementCodec`]),
//! - `[x]` fields become unions ([`ChoiceResolver`]),
//! - coded fields go through their value set's table,
//! - composites and lists recurse ([`StructureMapper`]).
//!
//! Presence is explicit on both sides. A field that was never set stays
//! unset; a boolean set to `false` stays set.
//!
//! # Example
//!
//! ```rust
//! use ferrum_bridge::Converter;
//! use ferrum_codes::r4::ADMINISTRATIVE_GENDER;
//! use ferrum_models::{HostCode, HostComposite, HostPrimitive, WireScalar};
//!
//! let converter = Converter::r4();
//! let patient = HostComposite::new("Patient")
//!     .with("active", HostPrimitive::boolean(false))
//!     .with("gender", HostCode::new(ADMINISTRATIVE_GENDER, "Female"));
//!
//! let wire = converter.to_target(&patient).unwrap();
//! let gender = wire.message("gender").unwrap();
//! assert_eq!(gender.scalar("value"), Some(&WireScalar::Enum("FEMALE".to_string())));
//!
//! assert_eq!(converter.to_source(&wire).unwrap(), patient);
//! ```

pub mod choice;
pub mod config;
mod converter;
pub mod element;
mod error;
pub mod mapper;
pub mod path;
pub mod temporal;

pub use choice::ChoiceResolver;
pub use config::{ChoiceConfig, ConverterConfig, LimitsConfig, MultipleBranchPolicy, TemporalConfig};
pub use converter::{Converter, ResourceConverter};
pub use element::{ElementCodec, ElementHeader};
pub use error::{ConfigError, ConversionError, Result};
pub use mapper::StructureMapper;
pub use path::ElementPath;
