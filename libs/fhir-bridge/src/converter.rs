use crate::config::ConverterConfig;
use crate::error::{ConfigError, ConversionError, Result};
use crate::mapper::StructureMapper;
use crate::path::ElementPath;
use ferrum_codes::CodeRegistry;
use ferrum_models::{HostComposite, WireMessage};
use ferrum_schema::{TypeDefinition, TypeKind, TypeRegistry};
use std::sync::Arc;
use tracing::debug;

/// Reusable converter - owns the schema and code tables and the configuration.
///
/// Tables sit behind `Arc` and are never mutated, so one converter can be
/// shared across threads and every call is independent of the others.
#[derive(Debug, Clone)]
pub struct Converter {
    schemas: Arc<TypeRegistry>,
    codes: Arc<CodeRegistry>,
    config: ConverterConfig,
}

impl Converter {
    /// Built-in R4 tables with the default configuration.
    pub fn r4() -> Self {
        Self {
            schemas: ferrum_schema::r4_registry(),
            codes: ferrum_codes::r4_registry(),
            config: ConverterConfig::default(),
        }
    }

    pub fn r4_with_config(config: ConverterConfig) -> std::result::Result<Self, ConfigError> {
        Self::new(
            ferrum_schema::r4_registry(),
            ferrum_codes::r4_registry(),
            config,
        )
    }

    /// Check the configuration, the schemas, and that every coded field has a
    /// code table.
    pub fn new(
        schemas: Arc<TypeRegistry>,
        codes: Arc<CodeRegistry>,
        config: ConverterConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        schemas.validate()?;
        if let Some((path, value_set)) = schemas
            .bindings()
            .find(|(_, value_set)| !codes.contains(value_set))
        {
            return Err(ConfigError::MissingCodeTable {
                path: path.to_string(),
                value_set: value_set.to_string(),
            });
        }

        debug!(
            types = schemas.len(),
            value_sets = codes.len(),
            "converter ready"
        );
        Ok(Self {
            schemas,
            codes,
            config,
        })
    }

    /// Convert a resource; its type comes from the value.
    pub fn to_target(&self, resource: &HostComposite) -> Result<WireMessage> {
        self.resource(&resource.type_name)?.to_target(resource)
    }

    /// Convert a wire resource; its type comes from the message.
    pub fn to_source(&self, message: &WireMessage) -> Result<HostComposite> {
        let type_def = self
            .schemas
            .get_by_wire_name(&message.type_name)
            .ok_or_else(|| ConversionError::UnknownType(message.type_name.clone()))?;
        self.resource(&type_def.name)?.to_source(message)
    }

    pub fn to_target_batch(&self, resources: &[HostComposite]) -> Vec<Result<WireMessage>> {
        resources.iter().map(|r| self.to_target(r)).collect()
    }

    pub fn to_source_batch(&self, messages: &[WireMessage]) -> Vec<Result<HostComposite>> {
        messages.iter().map(|m| self.to_source(m)).collect()
    }

    /// The conversion pair for one resource type.
    pub fn resource(&self, type_name: &str) -> Result<ResourceConverter<'_>> {
        let definition = self
            .schemas
            .get(type_name)
            .ok_or_else(|| ConversionError::UnknownType(type_name.to_string()))?;
        if definition.kind != TypeKind::Resource {
            return Err(ConversionError::mismatch(
                type_name,
                format!("{type_name} is not a resource type"),
            ));
        }
        Ok(ResourceConverter {
            converter: self,
            definition,
        })
    }

    pub fn schemas(&self) -> &Arc<TypeRegistry> {
        &self.schemas
    }

    pub fn codes(&self) -> &Arc<CodeRegistry> {
        &self.codes
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn mapper(&self) -> StructureMapper<'_> {
        StructureMapper::new(&self.schemas, &self.codes, &self.config)
    }
}

/// `to_target` / `to_source` for a single resource type.
#[derive(Debug, Clone, Copy)]
pub struct ResourceConverter<'c> {
    converter: &'c Converter,
    definition: &'c TypeDefinition,
}

impl<'c> ResourceConverter<'c> {
    pub fn type_name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &TypeDefinition {
        self.definition
    }

    pub fn to_target(&self, resource: &HostComposite) -> Result<WireMessage> {
        debug!(resource_type = %self.definition.name, direction = "to_target", "converting");
        self.converter.mapper().composite_to_wire(
            &ElementPath::root(&self.definition.name),
            self.definition,
            resource,
        )
    }

    pub fn to_source(&self, message: &WireMessage) -> Result<HostComposite> {
        debug!(resource_type = %self.definition.name, direction = "to_source", "converting");
        self.converter.mapper().composite_to_host(
            &ElementPath::root(&self.definition.name),
            self.definition,
            message,
        )
    }
}
