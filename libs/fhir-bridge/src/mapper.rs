//! Schema-driven walk over a resource graph
//!
//! The mapper visits the properties of a [`TypeDefinition`] in declaration
//! order, after the element header, and dispatches each one on its
//! [`PropertyKind`]. Repeated fields keep their length and order. The first
//! failure aborts the whole conversion.

use crate::choice::ChoiceResolver;
use crate::config::ConverterConfig;
use crate::element::{ElementCodec, EXTENSION, ID};
use crate::error::{ConversionError, Result};
use crate::path::ElementPath;
use ferrum_codes::{canonical_key, CodeRegistry};
use ferrum_models::{
    HostCode, HostComposite, HostSlot, HostValue, PrimitiveType, WireField, WireMessage,
    WireMessageBuilder, WireUnion,
};
use ferrum_schema::{CandidateKind, ChoiceType, Property, PropertyKind, TypeDefinition, TypeRegistry};

const EXTENSION_TYPE: &str = "Extension";

/// One conversion pass over borrowed, read-only tables.
pub struct StructureMapper<'a> {
    schemas: &'a TypeRegistry,
    codes: &'a CodeRegistry,
    elements: ElementCodec<'a>,
    choices: ChoiceResolver,
    max_depth: usize,
}

impl<'a> StructureMapper<'a> {
    pub fn new(
        schemas: &'a TypeRegistry,
        codes: &'a CodeRegistry,
        config: &'a ConverterConfig,
    ) -> Self {
        Self {
            schemas,
            codes,
            elements: ElementCodec::new(&config.temporal),
            choices: ChoiceResolver::new(config.choice.on_multiple_branches),
            max_depth: config.limits.max_depth,
        }
    }

    // ========================================================================
    // Host -> wire
    // ========================================================================

    pub fn composite_to_wire(
        &self,
        path: &ElementPath,
        type_def: &TypeDefinition,
        value: &HostComposite,
    ) -> Result<WireMessage> {
        self.check_depth(path)?;
        if value.type_name != type_def.name {
            return Err(ConversionError::mismatch(
                path,
                format!("expected {}, found {}", type_def.name, value.type_name),
            ));
        }
        if let Some(name) = value
            .field_names()
            .find(|name| type_def.get_property(name).is_none())
        {
            return Err(ConversionError::mismatch(
                path,
                format!("{} has no field '{name}'", type_def.name),
            ));
        }

        let mut builder = WireMessage::builder(&type_def.wire_name);
        let extension = self.extensions_to_wire(path, &value.extension)?;
        self.elements
            .encode_element(&mut builder, value.id.as_deref(), extension);

        for property in &type_def.properties {
            let Some(slot) = value.slot(&property.name) else {
                continue;
            };
            let field_path = field_path(path, property);
            match (slot, property.cardinality.is_array()) {
                (HostSlot::One(item), false) => {
                    self.field_to_wire(&field_path, property, item, &mut builder)?;
                }
                (HostSlot::Many(items), true) => {
                    for (i, item) in items.iter().enumerate() {
                        let message =
                            self.element_to_wire(&field_path.index(i), &property.kind, item)?;
                        builder.add_repeated(&property.wire_name, message);
                    }
                }
                (HostSlot::One(_), true) => {
                    return Err(ConversionError::mismatch(
                        &field_path,
                        format!("{} field holds a single value", property.cardinality),
                    ))
                }
                (HostSlot::Many(_), false) => {
                    return Err(ConversionError::mismatch(
                        &field_path,
                        format!("{} field holds a list", property.cardinality),
                    ))
                }
            }
        }
        Ok(builder.build())
    }

    fn field_to_wire(
        &self,
        path: &ElementPath,
        property: &Property,
        value: &HostValue,
        builder: &mut WireMessageBuilder,
    ) -> Result<()> {
        if let PropertyKind::Choice(choice) = &property.kind {
            let union = self.choice_to_wire(path, choice, value)?;
            builder.set_union(&property.wire_name, union);
        } else {
            let message = self.element_to_wire(path, &property.kind, value)?;
            builder.set_message(&property.wire_name, message);
        }
        Ok(())
    }

    fn element_to_wire(
        &self,
        path: &ElementPath,
        kind: &PropertyKind,
        value: &HostValue,
    ) -> Result<WireMessage> {
        match kind {
            PropertyKind::Primitive(ty) => self.primitive_to_wire(path, *ty, value),
            PropertyKind::Coded {
                value_set,
                wire_type,
            } => self.code_to_wire(path, value_set, wire_type, value),
            PropertyKind::Composite { type_name } => self.nested_to_wire(path, type_name, value),
            PropertyKind::Choice(_) => Err(ConversionError::mismatch(
                path,
                "choice fields cannot repeat",
            )),
        }
    }

    pub fn choice_to_wire(
        &self,
        path: &ElementPath,
        choice: &ChoiceType,
        value: &HostValue,
    ) -> Result<WireUnion> {
        let candidate = self.choices.select_candidate(path, choice, value)?;
        let message = match &candidate.kind {
            CandidateKind::Primitive(ty) => self.primitive_to_wire(path, *ty, value)?,
            CandidateKind::Composite(type_name) => self.nested_to_wire(path, type_name, value)?,
        };
        Ok(WireUnion::builder(&choice.union_type)
            .branch(&candidate.branch, message)
            .build())
    }

    fn primitive_to_wire(
        &self,
        path: &ElementPath,
        ty: PrimitiveType,
        value: &HostValue,
    ) -> Result<WireMessage> {
        let primitive = match value {
            HostValue::Primitive(p) if p.ty == ty => p,
            other => return Err(wrong_kind(path, ty.code(), other)),
        };
        let extension = self.extensions_to_wire(path, &primitive.extension)?;
        self.elements.encode_primitive(path, primitive, extension)
    }

    fn code_to_wire(
        &self,
        path: &ElementPath,
        value_set: &str,
        wire_type: &str,
        value: &HostValue,
    ) -> Result<WireMessage> {
        let code = self.host_code(path, value_set, value)?;
        let identifier = match &code.value {
            Some(host_identifier) => {
                let code = self
                    .codes
                    .from_host_identifier(value_set, host_identifier)
                    .map_err(|e| ConversionError::from_codes(path, e))?;
                let identifier = self
                    .codes
                    .to_wire_enum_identifier(value_set, code)
                    .map_err(|e| ConversionError::from_codes(path, e))?;
                Some(identifier)
            }
            None => None,
        };
        let extension = self.extensions_to_wire(path, &code.extension)?;
        Ok(self
            .elements
            .encode_coded(wire_type, code.id.as_deref(), identifier, extension))
    }

    fn nested_to_wire(
        &self,
        path: &ElementPath,
        type_name: &str,
        value: &HostValue,
    ) -> Result<WireMessage> {
        let composite = value
            .as_composite()
            .ok_or_else(|| wrong_kind(path, type_name, value))?;
        self.composite_to_wire(path, self.definition(type_name)?, composite)
    }

    fn extensions_to_wire(
        &self,
        path: &ElementPath,
        extension: &[HostComposite],
    ) -> Result<Vec<WireMessage>> {
        if extension.is_empty() {
            return Ok(Vec::new());
        }
        let type_def = self.definition(EXTENSION_TYPE)?;
        let ext_path = path.field(EXTENSION);
        extension
            .iter()
            .enumerate()
            .map(|(i, ext)| self.composite_to_wire(&ext_path.index(i), type_def, ext))
            .collect()
    }

    // ========================================================================
    // Wire -> host
    // ========================================================================

    pub fn composite_to_host(
        &self,
        path: &ElementPath,
        type_def: &TypeDefinition,
        message: &WireMessage,
    ) -> Result<HostComposite> {
        self.check_depth(path)?;
        if message.type_name != type_def.wire_name {
            return Err(ConversionError::mismatch(
                path,
                format!("expected {}, found {}", type_def.wire_name, message.type_name),
            ));
        }
        if let Some((name, _)) = message.fields().find(|(name, _)| {
            *name != ID && *name != EXTENSION && type_def.get_property_by_wire_name(name).is_none()
        }) {
            return Err(ConversionError::mismatch(
                path,
                format!("{} has no field '{name}'", type_def.wire_name),
            ));
        }

        let header = self.elements.decode_element(path, message)?;
        let mut composite = HostComposite::new(&type_def.name);
        composite.id = header.id;
        composite.extension = self.extensions_to_host(path, header.extension)?;

        for property in &type_def.properties {
            let Some(field) = message.field(&property.wire_name) else {
                continue;
            };
            let field_path = field_path(path, property);
            match (&property.kind, field, property.cardinality.is_array()) {
                (PropertyKind::Choice(choice), WireField::Union(union), false) => {
                    let value = self.choice_to_host(&field_path, choice, union)?;
                    composite.set(&property.name, value);
                }
                (kind, WireField::Message(item), false) if !property.is_choice() => {
                    let value = self.element_to_host(&field_path, kind, item)?;
                    composite.set(&property.name, value);
                }
                (kind, WireField::Repeated(items), true) => {
                    let values = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| self.element_to_host(&field_path.index(i), kind, item))
                        .collect::<Result<Vec<_>>>()?;
                    composite.set_list(&property.name, values);
                }
                (_, field, _) => {
                    return Err(ConversionError::mismatch(
                        &field_path,
                        format!(
                            "{} field cannot be read from a {} wire field",
                            property.cardinality,
                            field_shape(field)
                        ),
                    ))
                }
            }
        }
        Ok(composite)
    }

    fn element_to_host(
        &self,
        path: &ElementPath,
        kind: &PropertyKind,
        message: &WireMessage,
    ) -> Result<HostValue> {
        match kind {
            PropertyKind::Primitive(ty) => self.primitive_to_host(path, *ty, message),
            PropertyKind::Coded {
                value_set,
                wire_type,
            } => self.code_to_host(path, value_set, wire_type, message),
            PropertyKind::Composite { type_name } => {
                let composite = self.composite_to_host(path, self.definition(type_name)?, message)?;
                Ok(composite.into())
            }
            PropertyKind::Choice(_) => Err(ConversionError::mismatch(
                path,
                "choice fields cannot repeat",
            )),
        }
    }

    pub fn choice_to_host(
        &self,
        path: &ElementPath,
        choice: &ChoiceType,
        union: &WireUnion,
    ) -> Result<HostValue> {
        let (candidate, message) = self.choices.resolve_branch(path, choice, union)?;
        match &candidate.kind {
            CandidateKind::Primitive(ty) => self.primitive_to_host(path, *ty, message),
            CandidateKind::Composite(type_name) => {
                let composite = self.composite_to_host(path, self.definition(type_name)?, message)?;
                Ok(composite.into())
            }
        }
    }

    fn primitive_to_host(
        &self,
        path: &ElementPath,
        ty: PrimitiveType,
        message: &WireMessage,
    ) -> Result<HostValue> {
        let mut primitive = self.elements.decode_primitive(path, ty, message)?;
        let header = self.elements.decode_element(path, message)?;
        primitive.extension = self.extensions_to_host(path, header.extension)?;
        Ok(primitive.into())
    }

    fn code_to_host(
        &self,
        path: &ElementPath,
        value_set: &str,
        wire_type: &str,
        message: &WireMessage,
    ) -> Result<HostValue> {
        let (header, identifier) = self.elements.decode_coded(path, wire_type, message)?;
        let value = match identifier {
            Some(identifier) => {
                let code = self
                    .codes
                    .to_wire_code(value_set, identifier)
                    .map_err(|e| ConversionError::from_codes(path, e))?;
                let host_identifier = self
                    .codes
                    .to_host_identifier(value_set, code)
                    .map_err(|e| ConversionError::from_codes(path, e))?;
                Some(host_identifier.to_string())
            }
            None => None,
        };
        Ok(HostCode {
            value_set: value_set.to_string(),
            id: header.id,
            extension: self.extensions_to_host(path, header.extension)?,
            value,
        }
        .into())
    }

    fn extensions_to_host(
        &self,
        path: &ElementPath,
        extension: &[WireMessage],
    ) -> Result<Vec<HostComposite>> {
        if extension.is_empty() {
            return Ok(Vec::new());
        }
        let type_def = self.definition(EXTENSION_TYPE)?;
        let ext_path = path.field(EXTENSION);
        extension
            .iter()
            .enumerate()
            .map(|(i, ext)| self.composite_to_host(&ext_path.index(i), type_def, ext))
            .collect()
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn definition(&self, type_name: &str) -> Result<&'a TypeDefinition> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| ConversionError::UnknownType(type_name.to_string()))
    }

    fn host_code<'v>(
        &self,
        path: &ElementPath,
        value_set: &str,
        value: &'v HostValue,
    ) -> Result<&'v HostCode> {
        let code = value.as_code().ok_or_else(|| wrong_kind(path, "code", value))?;
        if canonical_key(&code.value_set) != canonical_key(value_set) {
            return Err(ConversionError::mismatch(
                path,
                format!(
                    "code from value set {} in a field bound to {value_set}",
                    code.value_set
                ),
            ));
        }
        Ok(code)
    }

    fn check_depth(&self, path: &ElementPath) -> Result<()> {
        if path.depth() > self.max_depth {
            return Err(ConversionError::DepthExceeded {
                path: path.to_string(),
                limit: self.max_depth,
            });
        }
        Ok(())
    }
}

fn field_path(parent: &ElementPath, property: &Property) -> ElementPath {
    if property.is_choice() {
        parent.choice(&property.name)
    } else {
        parent.field(&property.name)
    }
}

fn wrong_kind(path: &ElementPath, expected: &str, found: &HostValue) -> ConversionError {
    ConversionError::mismatch(
        path,
        format!("expected {expected}, found {}", found.type_name()),
    )
}

fn field_shape(field: &WireField) -> &'static str {
    match field {
        WireField::Scalar(_) => "scalar",
        WireField::Message(_) => "message",
        WireField::Union(_) => "union",
        WireField::Repeated(_) => "repeated",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrum_models::HostPrimitive;

    struct Fixture {
        schemas: std::sync::Arc<TypeRegistry>,
        codes: std::sync::Arc<CodeRegistry>,
        config: ConverterConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                schemas: ferrum_schema::r4_registry(),
                codes: ferrum_codes::r4_registry(),
                config: ConverterConfig::default(),
            }
        }

        fn mapper(&self) -> StructureMapper<'_> {
            StructureMapper::new(&self.schemas, &self.codes, &self.config)
        }

        fn to_wire(&self, value: &HostComposite) -> Result<WireMessage> {
            let type_def = self.schemas.get(&value.type_name).unwrap();
            self.mapper()
                .composite_to_wire(&ElementPath::root(&type_def.name), type_def, value)
        }
    }

    #[test]
    fn test_element_header_is_carried() {
        let fixture = Fixture::new();
        let period = HostComposite::new("Period")
            .with_id("p1")
            .with("start", HostPrimitive::date_time("2020"));
        let wire = fixture.to_wire(&period).unwrap();
        let names: Vec<&str> = wire.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["id", "start"]);
    }

    #[test]
    fn test_unknown_host_field() {
        let fixture = Fixture::new();
        let period = HostComposite::new("Period").with("begin", HostPrimitive::date_time("2020"));
        let err = fixture.to_wire(&period).unwrap_err();
        assert_eq!(err.path(), Some("Period"));
        assert!(matches!(err, ConversionError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_list_in_singular_field() {
        let fixture = Fixture::new();
        let mut period = HostComposite::new("Period");
        period.set_list(
            "start",
            vec![
                HostPrimitive::date_time("2020").into(),
                HostPrimitive::date_time("2021").into(),
            ],
        );
        let err = fixture.to_wire(&period).unwrap_err();
        assert_eq!(err.path(), Some("Period.start"));
    }

    #[test]
    fn test_depth_limit() {
        let mut fixture = Fixture::new();
        fixture.config.limits.max_depth = 1;
        let name = HostComposite::new("HumanName")
            .with("period", HostComposite::new("Period"));
        let patient = HostComposite::new("Patient").with_item("name", name);
        let err = fixture.to_wire(&patient).unwrap_err();
        assert_eq!(
            err,
            ConversionError::DepthExceeded {
                path: "Patient.name[0].period".to_string(),
                limit: 1,
            }
        );
    }
}
