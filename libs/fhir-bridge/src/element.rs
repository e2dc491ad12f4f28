//! Primitive elements and the element header
//!
//! A primitive element is converted as a wrapper message holding at most a
//! value, an `id` and an `extension` list. Nothing is emitted for what the
//! source did not hold: a host primitive without a value produces a wrapper
//! without a `value` field, and vice versa. Extension lists are converted by
//! the mapper and handed to the codec already converted.

use crate::config::TemporalConfig;
use crate::error::{ConversionError, Result};
use crate::path::ElementPath;
use crate::temporal::{self, Precision, TemporalError, Timestamp};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ferrum_models::{
    HostPrimitive, HostScalar, PrimitiveType, WireField, WireMessage, WireMessageBuilder,
    WireScalar,
};
use rust_decimal::Decimal;

pub(crate) const ID: &str = "id";
pub(crate) const EXTENSION: &str = "extension";
const VALUE: &str = "value";
const VALUE_US: &str = "value_us";
const TIMEZONE: &str = "timezone";
const PRECISION: &str = "precision";

/// `id` and `extension` of a wire element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementHeader<'m> {
    pub id: Option<String>,
    pub extension: &'m [WireMessage],
}

/// Converts primitive values and element headers.
#[derive(Debug, Clone, Copy)]
pub struct ElementCodec<'a> {
    temporal: &'a TemporalConfig,
}

impl<'a> ElementCodec<'a> {
    pub fn new(temporal: &'a TemporalConfig) -> Self {
        Self { temporal }
    }

    // ========================================================================
    // Element header
    // ========================================================================

    pub fn encode_element(
        &self,
        builder: &mut WireMessageBuilder,
        id: Option<&str>,
        extension: Vec<WireMessage>,
    ) {
        if let Some(id) = id {
            builder.set_scalar(ID, WireScalar::String(id.to_string()));
        }
        for ext in extension {
            builder.add_repeated(EXTENSION, ext);
        }
    }

    pub fn decode_element<'m>(
        &self,
        path: &ElementPath,
        message: &'m WireMessage,
    ) -> Result<ElementHeader<'m>> {
        let id = match message.field(ID) {
            None => None,
            Some(WireField::Scalar(WireScalar::String(id))) => Some(id.clone()),
            Some(_) => {
                return Err(ConversionError::mismatch(
                    path,
                    format!("'{ID}' of {} is not a string", message.type_name),
                ))
            }
        };
        let extension = match message.field(EXTENSION) {
            None | Some(WireField::Repeated(_)) => message.repeated(EXTENSION),
            Some(_) => {
                return Err(ConversionError::mismatch(
                    path,
                    format!("'{EXTENSION}' of {} is not a list", message.type_name),
                ))
            }
        };
        Ok(ElementHeader { id, extension })
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    pub fn encode_primitive(
        &self,
        path: &ElementPath,
        primitive: &HostPrimitive,
        extension: Vec<WireMessage>,
    ) -> Result<WireMessage> {
        let mut builder = WireMessage::builder(primitive.ty.wire_name());
        self.encode_element(&mut builder, primitive.id.as_deref(), extension);
        if let Some(value) = &primitive.value {
            self.encode_value(path, primitive.ty, value, &mut builder)?;
        }
        Ok(builder.build())
    }

    /// Decode a wrapper into a primitive. Extensions are left empty for the
    /// caller to fill from [`ElementCodec::decode_element`].
    pub fn decode_primitive(
        &self,
        path: &ElementPath,
        ty: PrimitiveType,
        message: &WireMessage,
    ) -> Result<HostPrimitive> {
        if message.type_name != ty.wire_name() {
            return Err(ConversionError::mismatch(
                path,
                format!("expected {} wrapper, found {}", ty.wire_name(), message.type_name),
            ));
        }
        let value_fields = value_fields(ty);
        if let Some((name, _)) = message
            .fields()
            .find(|(name, _)| *name != ID && *name != EXTENSION && !value_fields.contains(name))
        {
            return Err(ConversionError::mismatch(
                path,
                format!("unknown field '{name}' in {}", message.type_name),
            ));
        }

        let header = self.decode_element(path, message)?;
        let mut primitive = HostPrimitive::empty(ty);
        primitive.id = header.id;
        primitive.value = self.decode_value(path, ty, message)?;
        Ok(primitive)
    }

    fn encode_value(
        &self,
        path: &ElementPath,
        ty: PrimitiveType,
        value: &HostScalar,
        builder: &mut WireMessageBuilder,
    ) -> Result<()> {
        let scalar = match (ty, value) {
            (PrimitiveType::Boolean, HostScalar::Boolean(b)) => WireScalar::Bool(*b),
            (PrimitiveType::Integer, HostScalar::Integer(i)) => WireScalar::Int32(
                i32::try_from(*i)
                    .map_err(|_| ConversionError::out_of_range(path, i, "32-bit integer"))?,
            ),
            (PrimitiveType::UnsignedInt, HostScalar::Integer(i)) => {
                WireScalar::UInt32(to_unsigned(path, *i, 0, "unsignedInt")?)
            }
            (PrimitiveType::PositiveInt, HostScalar::Integer(i)) => {
                WireScalar::UInt32(to_unsigned(path, *i, 1, "positiveInt")?)
            }
            (PrimitiveType::Decimal, HostScalar::Decimal(d)) => WireScalar::String(d.to_string()),
            (PrimitiveType::Base64Binary, HostScalar::String(text)) => {
                let bytes = STANDARD.decode(text).map_err(|e| {
                    ConversionError::malformed(path, ty.code(), text.as_str(), e.to_string())
                })?;
                WireScalar::Bytes(bytes)
            }
            (PrimitiveType::Time, HostScalar::String(text)) => {
                let (micros, precision) = temporal::parse_time(text)
                    .map_err(|e| temporal_error(path, ty, text, e))?;
                builder
                    .set_scalar(VALUE_US, WireScalar::Int64(micros))
                    .set_scalar(PRECISION, WireScalar::Enum(precision.wire_name().to_string()));
                return Ok(());
            }
            (ty, HostScalar::String(text)) if ty.is_temporal() => {
                let ts = temporal::parse_date_time(ty, text, &self.temporal.default_timezone)
                    .map_err(|e| temporal_error(path, ty, text, e))?;
                builder
                    .set_scalar(VALUE_US, WireScalar::Int64(ts.value_us))
                    .set_scalar(TIMEZONE, WireScalar::String(ts.timezone))
                    .set_scalar(
                        PRECISION,
                        WireScalar::Enum(ts.precision.wire_name().to_string()),
                    );
                return Ok(());
            }
            (ty, HostScalar::String(text)) if ty.is_string_like() => {
                WireScalar::String(text.clone())
            }
            (ty, other) => {
                return Err(ConversionError::mismatch(
                    path,
                    format!("{ty} cannot hold a {} value", scalar_kind(other)),
                ))
            }
        };
        builder.set_scalar(VALUE, scalar);
        Ok(())
    }

    fn decode_value(
        &self,
        path: &ElementPath,
        ty: PrimitiveType,
        message: &WireMessage,
    ) -> Result<Option<HostScalar>> {
        if ty.is_temporal() || ty == PrimitiveType::Time {
            return self.decode_temporal(path, ty, message);
        }

        let Some(scalar) = scalar(path, message, VALUE)? else {
            return Ok(None);
        };
        let value = match (ty, scalar) {
            (PrimitiveType::Boolean, WireScalar::Bool(b)) => HostScalar::Boolean(*b),
            (PrimitiveType::Integer, WireScalar::Int32(i)) => HostScalar::Integer(i64::from(*i)),
            (PrimitiveType::UnsignedInt, WireScalar::UInt32(u)) => {
                HostScalar::Integer(from_unsigned(path, *u, 0, "unsignedInt")?)
            }
            (PrimitiveType::PositiveInt, WireScalar::UInt32(u)) => {
                HostScalar::Integer(from_unsigned(path, *u, 1, "positiveInt")?)
            }
            (PrimitiveType::Decimal, WireScalar::String(text)) => {
                HostScalar::Decimal(parse_decimal(path, text)?)
            }
            (PrimitiveType::Base64Binary, WireScalar::Bytes(bytes)) => {
                HostScalar::String(STANDARD.encode(bytes))
            }
            (ty, WireScalar::String(text)) if ty.is_string_like() => {
                HostScalar::String(text.clone())
            }
            (ty, _) => {
                return Err(ConversionError::mismatch(
                    path,
                    format!("'{VALUE}' of {} has the wrong scalar type", ty.wire_name()),
                ))
            }
        };
        Ok(Some(value))
    }

    fn decode_temporal(
        &self,
        path: &ElementPath,
        ty: PrimitiveType,
        message: &WireMessage,
    ) -> Result<Option<HostScalar>> {
        let micros = match scalar(path, message, VALUE_US)? {
            None => {
                if message.has(TIMEZONE) || message.has(PRECISION) {
                    return Err(ConversionError::mismatch(
                        path,
                        format!("{} has a zone or precision but no '{VALUE_US}'", ty.wire_name()),
                    ));
                }
                return Ok(None);
            }
            Some(WireScalar::Int64(micros)) => *micros,
            Some(_) => {
                return Err(ConversionError::mismatch(
                    path,
                    format!("'{VALUE_US}' of {} is not a 64-bit integer", ty.wire_name()),
                ))
            }
        };
        let precision = match scalar(path, message, PRECISION)? {
            Some(WireScalar::Enum(name)) => Precision::from_wire_name(name).ok_or_else(|| {
                ConversionError::malformed(path, ty.code(), name.as_str(), "unknown precision")
            })?,
            _ => {
                return Err(ConversionError::mismatch(
                    path,
                    format!("{} needs a '{PRECISION}' enum", ty.wire_name()),
                ))
            }
        };

        let formatted = if ty == PrimitiveType::Time {
            temporal::format_time(micros, precision)
        } else {
            let timezone = match scalar(path, message, TIMEZONE)? {
                Some(WireScalar::String(zone)) => zone.clone(),
                _ => {
                    return Err(ConversionError::mismatch(
                        path,
                        format!("{} needs a '{TIMEZONE}' string", ty.wire_name()),
                    ))
                }
            };
            let ts = Timestamp {
                value_us: micros,
                timezone,
                precision,
            };
            temporal::format_date_time(ty, &ts)
        };
        let text = formatted.map_err(|e| temporal_error(path, ty, &micros.to_string(), e))?;
        Ok(Some(HostScalar::String(text)))
    }

    // ========================================================================
    // Coded elements
    // ========================================================================

    /// Wrapper for a coded field; `identifier` is the wire enum identifier.
    pub fn encode_coded(
        &self,
        wire_type: &str,
        id: Option<&str>,
        identifier: Option<&str>,
        extension: Vec<WireMessage>,
    ) -> WireMessage {
        let mut builder = WireMessage::builder(wire_type);
        self.encode_element(&mut builder, id, extension);
        if let Some(identifier) = identifier {
            builder.set_scalar(VALUE, WireScalar::Enum(identifier.to_string()));
        }
        builder.build()
    }

    /// Header and wire enum identifier of a coded wrapper.
    pub fn decode_coded<'m>(
        &self,
        path: &ElementPath,
        wire_type: &str,
        message: &'m WireMessage,
    ) -> Result<(ElementHeader<'m>, Option<&'m str>)> {
        if message.type_name != wire_type {
            return Err(ConversionError::mismatch(
                path,
                format!("expected {wire_type}, found {}", message.type_name),
            ));
        }
        if let Some((name, _)) = message
            .fields()
            .find(|(name, _)| ![ID, EXTENSION, VALUE].contains(name))
        {
            return Err(ConversionError::mismatch(
                path,
                format!("unknown field '{name}' in {wire_type}"),
            ));
        }
        let identifier = match scalar(path, message, VALUE)? {
            None => None,
            Some(WireScalar::Enum(identifier)) => Some(identifier.as_str()),
            Some(_) => {
                return Err(ConversionError::mismatch(
                    path,
                    format!("'{VALUE}' of {wire_type} is not an enum"),
                ))
            }
        };
        Ok((self.decode_element(path, message)?, identifier))
    }
}

fn value_fields(ty: PrimitiveType) -> &'static [&'static str] {
    match ty {
        PrimitiveType::Time => &[VALUE_US, PRECISION],
        ty if ty.is_temporal() => &[VALUE_US, TIMEZONE, PRECISION],
        _ => &[VALUE],
    }
}

fn scalar<'m>(
    path: &ElementPath,
    message: &'m WireMessage,
    name: &str,
) -> Result<Option<&'m WireScalar>> {
    match message.field(name) {
        None => Ok(None),
        Some(WireField::Scalar(scalar)) => Ok(Some(scalar)),
        Some(_) => Err(ConversionError::mismatch(
            path,
            format!("'{name}' of {} is not a scalar", message.type_name),
        )),
    }
}

fn to_unsigned(path: &ElementPath, value: i64, min: i64, target: &'static str) -> Result<u32> {
    if (min..=i64::from(i32::MAX)).contains(&value) {
        Ok(value as u32)
    } else {
        Err(ConversionError::out_of_range(path, value, target))
    }
}

fn from_unsigned(path: &ElementPath, value: u32, min: u32, target: &'static str) -> Result<i64> {
    if value >= min && value <= i32::MAX as u32 {
        Ok(i64::from(value))
    } else {
        Err(ConversionError::out_of_range(path, value, target))
    }
}

/// Exact parse: a value that needs rounding to fit `Decimal` is out of range.
fn parse_decimal(path: &ElementPath, text: &str) -> Result<Decimal> {
    let decimal_error = |error: rust_decimal::Error| match error {
        rust_decimal::Error::ErrorString(reason) | rust_decimal::Error::ConversionTo(reason) => {
            ConversionError::malformed(path, "decimal", text, reason)
        }
        _ => ConversionError::out_of_range(path, text, "decimal"),
    };

    let Some((mantissa, exponent)) = text.split_once(['e', 'E']) else {
        return Decimal::from_str_exact(text).map_err(decimal_error);
    };
    let mut value = Decimal::from_str_exact(mantissa).map_err(decimal_error)?;
    let exponent: i64 = exponent
        .parse()
        .map_err(|_| ConversionError::malformed(path, "decimal", text, "invalid exponent"))?;
    if value.is_zero() {
        return Ok(value);
    }

    if exponent < 0 {
        let scale = i64::from(value.scale())
            .checked_sub(exponent)
            .filter(|scale| *scale <= i64::from(Decimal::MAX_SCALE))
            .ok_or_else(|| ConversionError::out_of_range(path, text, "decimal"))?;
        value.set_scale(scale as u32).map_err(decimal_error)?;
    } else {
        for _ in 0..exponent {
            value = value
                .checked_mul(Decimal::TEN)
                .ok_or_else(|| ConversionError::out_of_range(path, text, "decimal"))?;
        }
    }
    Ok(value)
}

fn temporal_error(
    path: &ElementPath,
    ty: PrimitiveType,
    value: &str,
    error: TemporalError,
) -> ConversionError {
    match error {
        TemporalError::Malformed(reason) => ConversionError::malformed(path, ty.code(), value, reason),
        TemporalError::OutOfRange => ConversionError::out_of_range(path, value, ty.code()),
    }
}

fn scalar_kind(value: &HostScalar) -> &'static str {
    match value {
        HostScalar::Boolean(_) => "boolean",
        HostScalar::Integer(_) => "integer",
        HostScalar::Decimal(_) => "decimal",
        HostScalar::String(_) => "string",
    }
}
