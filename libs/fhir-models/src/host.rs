//! Host (object-graph) representation
//!
//! One mutable node per element, fields addressed by their FHIR name, and a
//! presence test per field. Values carry their runtime type, which is what
//! choice fields dispatch on.

use crate::primitive::PrimitiveType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Any value a host field can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HostValue {
    Primitive(HostPrimitive),
    Code(HostCode),
    Composite(HostComposite),
}

impl HostValue {
    /// Runtime type name: the FHIR type code of the value.
    pub fn type_name(&self) -> &str {
        match self {
            HostValue::Primitive(p) => p.ty.code(),
            HostValue::Code(_) => PrimitiveType::Code.code(),
            HostValue::Composite(c) => &c.type_name,
        }
    }

    pub fn as_primitive(&self) -> Option<&HostPrimitive> {
        match self {
            HostValue::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&HostCode> {
        match self {
            HostValue::Code(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&HostComposite> {
        match self {
            HostValue::Composite(c) => Some(c),
            _ => None,
        }
    }
}

impl From<HostPrimitive> for HostValue {
    fn from(value: HostPrimitive) -> Self {
        HostValue::Primitive(value)
    }
}

impl From<HostCode> for HostValue {
    fn from(value: HostCode) -> Self {
        HostValue::Code(value)
    }
}

impl From<HostComposite> for HostValue {
    fn from(value: HostComposite) -> Self {
        HostValue::Composite(value)
    }
}

/// Scalar payload of a primitive.
///
/// Temporal types, base64 and every string-like type keep their lexical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostScalar {
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    String(String),
}

/// A primitive element: optional value plus id and extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostPrimitive {
    #[serde(rename = "type")]
    pub ty: PrimitiveType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<HostComposite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<HostScalar>,
}

impl HostPrimitive {
    /// A primitive of the given type with no value, id or extensions.
    pub fn empty(ty: PrimitiveType) -> Self {
        Self {
            ty,
            id: None,
            extension: Vec::new(),
            value: None,
        }
    }

    pub fn new(ty: PrimitiveType, value: HostScalar) -> Self {
        Self {
            value: Some(value),
            ..Self::empty(ty)
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(PrimitiveType::Boolean, HostScalar::Boolean(value))
    }

    pub fn integer(value: i64) -> Self {
        Self::new(PrimitiveType::Integer, HostScalar::Integer(value))
    }

    pub fn positive_int(value: i64) -> Self {
        Self::new(PrimitiveType::PositiveInt, HostScalar::Integer(value))
    }

    pub fn unsigned_int(value: i64) -> Self {
        Self::new(PrimitiveType::UnsignedInt, HostScalar::Integer(value))
    }

    pub fn decimal(value: Decimal) -> Self {
        Self::new(PrimitiveType::Decimal, HostScalar::Decimal(value))
    }

    /// Any primitive whose host value is lexical text.
    pub fn text(ty: PrimitiveType, value: impl Into<String>) -> Self {
        Self::new(ty, HostScalar::String(value.into()))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::text(PrimitiveType::String, value)
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self::text(PrimitiveType::Uri, value)
    }

    pub fn code(value: impl Into<String>) -> Self {
        Self::text(PrimitiveType::Code, value)
    }

    pub fn date(value: impl Into<String>) -> Self {
        Self::text(PrimitiveType::Date, value)
    }

    pub fn date_time(value: impl Into<String>) -> Self {
        Self::text(PrimitiveType::DateTime, value)
    }

    pub fn instant(value: impl Into<String>) -> Self {
        Self::text(PrimitiveType::Instant, value)
    }

    pub fn time(value: impl Into<String>) -> Self {
        Self::text(PrimitiveType::Time, value)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_extension(mut self, extension: HostComposite) -> Self {
        self.extension.push(extension);
        self
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// An enumeration-typed primitive bound to a value set.
///
/// `value` holds the host enum identifier (`EnteredInError`), not the code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCode {
    pub value_set: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<HostComposite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl HostCode {
    pub fn new(value_set: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            value_set: value_set.into(),
            id: None,
            extension: Vec::new(),
            value: Some(identifier.into()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_extension(mut self, extension: HostComposite) -> Self {
        self.extension.push(extension);
        self
    }
}

/// Content of one field of a composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostSlot {
    Many(Vec<HostValue>),
    One(HostValue),
}

/// A resource, datatype or backbone element.
///
/// For resources `id` is the logical id; for datatypes and backbone elements
/// it is the element id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostComposite {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<HostComposite>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, HostSlot>,
}

impl HostComposite {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
            extension: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a singular field, replacing any previous content.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<HostValue>) -> &mut Self {
        self.fields
            .insert(name.into(), HostSlot::One(value.into()));
        self
    }

    /// Append to a repeated field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<HostValue>) -> &mut Self {
        let slot = self
            .fields
            .entry(name.into())
            .or_insert_with(|| HostSlot::Many(Vec::new()));
        if let HostSlot::One(existing) = slot {
            let first = existing.clone();
            *slot = HostSlot::Many(vec![first]);
        }
        if let HostSlot::Many(values) = slot {
            values.push(value.into());
        }
        self
    }

    /// Replace a repeated field. An empty list removes the field.
    pub fn set_list(&mut self, name: impl Into<String>, values: Vec<HostValue>) -> &mut Self {
        let name = name.into();
        if values.is_empty() {
            self.fields.remove(&name);
        } else {
            self.fields.insert(name, HostSlot::Many(values));
        }
        self
    }

    /// Builder-style [`HostComposite::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Builder-style [`HostComposite::add`].
    pub fn with_item(mut self, name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        self.add(name, value);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_extension(mut self, extension: HostComposite) -> Self {
        self.extension.push(extension);
        self
    }

    /// Presence test. A repeated field with no items is absent.
    pub fn has(&self, name: &str) -> bool {
        match self.fields.get(name) {
            Some(HostSlot::One(_)) => true,
            Some(HostSlot::Many(values)) => !values.is_empty(),
            None => false,
        }
    }

    pub fn slot(&self, name: &str) -> Option<&HostSlot> {
        self.fields.get(name)
    }

    /// Value of a singular field.
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        match self.fields.get(name) {
            Some(HostSlot::One(value)) => Some(value),
            _ => None,
        }
    }

    /// Items of a repeated field; empty when absent.
    pub fn list(&self, name: &str) -> &[HostValue] {
        match self.fields.get(name) {
            Some(HostSlot::Many(values)) => values,
            Some(HostSlot::One(value)) => std::slice::from_ref(value),
            None => &[],
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<HostSlot> {
        self.fields.remove(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// True when nothing at all is set on this node.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.extension.is_empty() && self.fields.is_empty()
    }
}
