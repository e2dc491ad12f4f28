//! FHIR primitive datatypes
//!
//! The set of primitive types is closed for a FHIR release, so it is an enum
//! rather than a string. Lookup from the FHIR type code goes through a
//! compile-time map.

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A FHIR R4 primitive datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveType {
    Boolean,
    Integer,
    UnsignedInt,
    PositiveInt,
    Decimal,
    String,
    Code,
    Id,
    Markdown,
    Uri,
    Url,
    Canonical,
    Oid,
    Uuid,
    Base64Binary,
    Date,
    DateTime,
    Instant,
    Time,
}

static PRIMITIVES_BY_CODE: phf::Map<&'static str, PrimitiveType> = phf_map! {
    "boolean" => PrimitiveType::Boolean,
    "integer" => PrimitiveType::Integer,
    "unsignedInt" => PrimitiveType::UnsignedInt,
    "positiveInt" => PrimitiveType::PositiveInt,
    "decimal" => PrimitiveType::Decimal,
    "string" => PrimitiveType::String,
    "code" => PrimitiveType::Code,
    "id" => PrimitiveType::Id,
    "markdown" => PrimitiveType::Markdown,
    "uri" => PrimitiveType::Uri,
    "url" => PrimitiveType::Url,
    "canonical" => PrimitiveType::Canonical,
    "oid" => PrimitiveType::Oid,
    "uuid" => PrimitiveType::Uuid,
    "base64Binary" => PrimitiveType::Base64Binary,
    "date" => PrimitiveType::Date,
    "dateTime" => PrimitiveType::DateTime,
    "instant" => PrimitiveType::Instant,
    "time" => PrimitiveType::Time,
};

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 19] = [
        PrimitiveType::Boolean,
        PrimitiveType::Integer,
        PrimitiveType::UnsignedInt,
        PrimitiveType::PositiveInt,
        PrimitiveType::Decimal,
        PrimitiveType::String,
        PrimitiveType::Code,
        PrimitiveType::Id,
        PrimitiveType::Markdown,
        PrimitiveType::Uri,
        PrimitiveType::Url,
        PrimitiveType::Canonical,
        PrimitiveType::Oid,
        PrimitiveType::Uuid,
        PrimitiveType::Base64Binary,
        PrimitiveType::Date,
        PrimitiveType::DateTime,
        PrimitiveType::Instant,
        PrimitiveType::Time,
    ];

    /// Resolve a FHIR type code (`"dateTime"`, `"base64Binary"`, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        PRIMITIVES_BY_CODE.get(code).copied()
    }

    /// FHIR type code, also the runtime type name on the host side.
    pub fn code(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::UnsignedInt => "unsignedInt",
            PrimitiveType::PositiveInt => "positiveInt",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::String => "string",
            PrimitiveType::Code => "code",
            PrimitiveType::Id => "id",
            PrimitiveType::Markdown => "markdown",
            PrimitiveType::Uri => "uri",
            PrimitiveType::Url => "url",
            PrimitiveType::Canonical => "canonical",
            PrimitiveType::Oid => "oid",
            PrimitiveType::Uuid => "uuid",
            PrimitiveType::Base64Binary => "base64Binary",
            PrimitiveType::Date => "date",
            PrimitiveType::DateTime => "dateTime",
            PrimitiveType::Instant => "instant",
            PrimitiveType::Time => "time",
        }
    }

    /// Name of the wrapper message carrying this primitive on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Integer => "Integer",
            PrimitiveType::UnsignedInt => "UnsignedInt",
            PrimitiveType::PositiveInt => "PositiveInt",
            PrimitiveType::Decimal => "Decimal",
            PrimitiveType::String => "String",
            PrimitiveType::Code => "Code",
            PrimitiveType::Id => "Id",
            PrimitiveType::Markdown => "Markdown",
            PrimitiveType::Uri => "Uri",
            PrimitiveType::Url => "Url",
            PrimitiveType::Canonical => "Canonical",
            PrimitiveType::Oid => "Oid",
            PrimitiveType::Uuid => "Uuid",
            PrimitiveType::Base64Binary => "Base64Binary",
            PrimitiveType::Date => "Date",
            PrimitiveType::DateTime => "DateTime",
            PrimitiveType::Instant => "Instant",
            PrimitiveType::Time => "Time",
        }
    }

    /// Types whose host value is lexical text carried unchanged as a wire string.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            PrimitiveType::String
                | PrimitiveType::Code
                | PrimitiveType::Id
                | PrimitiveType::Markdown
                | PrimitiveType::Uri
                | PrimitiveType::Url
                | PrimitiveType::Canonical
                | PrimitiveType::Oid
                | PrimitiveType::Uuid
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            PrimitiveType::Date | PrimitiveType::DateTime | PrimitiveType::Instant
        )
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Integer | PrimitiveType::UnsignedInt | PrimitiveType::PositiveInt
        )
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
