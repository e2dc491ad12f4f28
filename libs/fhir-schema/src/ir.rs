//! Schema representation
//!
//! Language-agnostic description of FHIR types as the converter sees them:
//! ordered fields, each with a cardinality and a conversion kind.

use crate::error::{Error, Result};
use crate::naming::{coded_wire_type, union_type_name, wire_branch_name, wire_field_name};
use ferrum_models::PrimitiveType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Registry of all convertible types
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    /// Types indexed by host name
    types: BTreeMap<String, TypeDefinition>,
    /// Wire name -> host name
    wire_index: HashMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type to the registry
    pub fn add_type(&mut self, type_def: TypeDefinition) -> Result<()> {
        if self.types.contains_key(&type_def.name) || self.wire_index.contains_key(&type_def.wire_name)
        {
            return Err(Error::DuplicateType(type_def.name));
        }
        self.wire_index
            .insert(type_def.wire_name.clone(), type_def.name.clone());
        self.types.insert(type_def.name.clone(), type_def);
        Ok(())
    }

    /// Get a type by its host name
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// Get a type by its wire message name
    pub fn get_by_wire_name(&self, wire_name: &str) -> Option<&TypeDefinition> {
        self.wire_index
            .get(wire_name)
            .and_then(|name| self.types.get(name))
    }

    /// All types ordered by name
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values().filter(|t| t.kind == TypeKind::Resource)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Coded fields of every type, as (path, value set) pairs
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types.values().flat_map(|t| {
            t.properties.iter().filter_map(|p| match &p.kind {
                PropertyKind::Coded { value_set, .. } => Some((p.path.as_str(), value_set.as_str())),
                _ => None,
            })
        })
    }

    /// Types referenced by `type_def` that are not primitives
    pub fn dependencies<'a>(&self, type_def: &'a TypeDefinition) -> Vec<&'a str> {
        let mut deps: Vec<&str> = Vec::new();
        for property in &type_def.properties {
            let names: Vec<&str> = match &property.kind {
                PropertyKind::Composite { type_name } => vec![type_name.as_str()],
                PropertyKind::Choice(choice) => choice
                    .candidates
                    .iter()
                    .filter_map(|c| match &c.kind {
                        CandidateKind::Composite(name) => Some(name.as_str()),
                        CandidateKind::Primitive(_) => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            for name in names {
                if !deps.contains(&name) {
                    deps.push(name);
                }
            }
        }
        deps
    }

    /// Check that every referenced type exists and every choice is well formed
    pub fn validate(&self) -> Result<()> {
        for type_def in self.types.values() {
            for property in &type_def.properties {
                match &property.kind {
                    PropertyKind::Composite { type_name } => {
                        self.require(&property.path, type_name)?;
                    }
                    PropertyKind::Choice(choice) => {
                        self.validate_choice(property, choice)?;
                    }
                    PropertyKind::Coded { value_set, .. } if value_set.is_empty() => {
                        return Err(Error::InvalidElement {
                            path: property.path.clone(),
                            message: "coded field without a value set".to_string(),
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn validate_choice(&self, property: &Property, choice: &ChoiceType) -> Result<()> {
        let invalid = |message: &str| Error::InvalidChoice {
            path: property.path.clone(),
            message: message.to_string(),
        };
        if property.cardinality.is_array() {
            return Err(invalid("choice fields cannot repeat"));
        }
        if choice.candidates.is_empty() {
            return Err(invalid("no candidates"));
        }
        for (i, candidate) in choice.candidates.iter().enumerate() {
            if choice.candidates[..i]
                .iter()
                .any(|c| c.branch == candidate.branch || c.type_code == candidate.type_code)
            {
                return Err(invalid(&format!(
                    "candidate '{}' is declared twice",
                    candidate.type_code
                )));
            }
            if let CandidateKind::Composite(name) = &candidate.kind {
                self.require(&property.path, name)?;
            }
        }
        Ok(())
    }

    fn require(&self, path: &str, type_name: &str) -> Result<()> {
        if self.types.contains_key(type_name) {
            Ok(())
        } else {
            Err(Error::UnknownType {
                path: path.to_string(),
                type_name: type_name.to_string(),
            })
        }
    }
}

/// A single convertible type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Host type name (e.g., "Patient", "Patient.ContactComponent")
    pub name: String,
    /// Wire message name (e.g., "Patient", "Patient.Contact")
    pub wire_name: String,
    /// Element path of the type root (e.g., "Patient.contact")
    pub path: String,
    /// Canonical URL if available
    pub url: Option<String>,
    pub description: Option<String>,
    pub kind: TypeKind,
    /// Fields in conversion order
    pub properties: Vec<Property>,
}

impl TypeDefinition {
    /// A resource or datatype whose host and wire names agree.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        Self {
            url: Some(format!("http://hl7.org/fhir/StructureDefinition/{name}")),
            wire_name: name.clone(),
            path: name.clone(),
            name,
            description: None,
            kind,
            properties: Vec::new(),
        }
    }

    pub fn resource(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Resource)
    }

    pub fn complex(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::ComplexType)
    }

    /// A backbone element at `path`, named by the backbone naming convention.
    pub fn backbone(path: impl Into<String>) -> Self {
        let path = path.into();
        let (name, wire_name) = crate::naming::backbone_names(&path);
        Self {
            name,
            wire_name,
            path,
            url: None,
            description: None,
            kind: TypeKind::BackboneElement,
            properties: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field. Its path and derived wire type names are filled in here.
    pub fn property(mut self, property: Property) -> Self {
        self.push_property(property);
        self
    }

    pub fn push_property(&mut self, mut property: Property) {
        property.path = format!("{}.{}", self.path, property.name);
        match &mut property.kind {
            PropertyKind::Choice(choice) => {
                choice.union_type = union_type_name(&self.wire_name, &property.name);
            }
            PropertyKind::Coded { wire_type, .. } => {
                *wire_type = coded_wire_type(&self.wire_name, &property.name);
            }
            _ => {}
        }
        self.properties.push(property);
    }

    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn get_property_by_wire_name(&self, wire_name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.wire_name == wire_name)
    }
}

/// Kind of FHIR type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    /// FHIR Resource (e.g., Patient, Observation)
    Resource,
    /// Complex datatype (e.g., HumanName, Quantity)
    ComplexType,
    /// Nested complex element within a resource
    BackboneElement,
}

/// A field within a type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Host field name, the FHIR name without `[x]` (e.g., "birthDate", "onset")
    pub name: String,
    /// Wire field name (e.g., "birth_date")
    pub wire_name: String,
    /// Path in the FHIR element tree (e.g., "Patient.birthDate")
    pub path: String,
    pub description: Option<String>,
    pub cardinality: Cardinality,
    pub kind: PropertyKind,
}

impl Property {
    pub fn new(name: impl Into<String>, kind: PropertyKind, cardinality: Cardinality) -> Self {
        let name = name.into();
        Self {
            wire_name: wire_field_name(&name),
            path: name.clone(),
            name,
            description: None,
            cardinality,
            kind,
        }
    }

    pub fn primitive(name: impl Into<String>, ty: PrimitiveType, cardinality: Cardinality) -> Self {
        Self::new(name, PropertyKind::Primitive(ty), cardinality)
    }

    pub fn coded(
        name: impl Into<String>,
        value_set: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self::new(
            name,
            PropertyKind::Coded {
                value_set: value_set.into(),
                wire_type: String::new(),
            },
            cardinality,
        )
    }

    pub fn composite(
        name: impl Into<String>,
        type_name: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self::new(
            name,
            PropertyKind::Composite {
                type_name: type_name.into(),
            },
            cardinality,
        )
    }

    /// A `[x]` field; `name` is given without the suffix.
    pub fn choice(name: impl Into<String>, candidates: Vec<ChoiceCandidate>) -> Self {
        Self::new(
            name,
            PropertyKind::Choice(ChoiceType {
                union_type: String::new(),
                candidates,
            }),
            Cardinality::OPTIONAL,
        )
    }

    /// Raise the minimum cardinality to one.
    pub fn required(mut self) -> Self {
        self.cardinality.min = self.cardinality.min.max(1);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, PropertyKind::Choice(_))
    }
}

/// How a field is converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Primitive(PrimitiveType),
    /// A `code` bound to a value set with required strength
    Coded { value_set: String, wire_type: String },
    Composite { type_name: String },
    Choice(ChoiceType),
}

/// Candidates of a `[x]` field, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceType {
    /// Wire union message name (e.g., "Condition.OnsetX")
    pub union_type: String,
    pub candidates: Vec<ChoiceCandidate>,
}

impl ChoiceType {
    /// Candidate whose FHIR type code is `type_code`
    pub fn candidate_for(&self, type_code: &str) -> Option<&ChoiceCandidate> {
        self.candidates.iter().find(|c| c.type_code == type_code)
    }

    /// Candidate whose union branch is `branch`
    pub fn candidate_for_branch(&self, branch: &str) -> Option<&ChoiceCandidate> {
        self.candidates.iter().find(|c| c.branch == branch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceCandidate {
    /// FHIR type code (e.g., "dateTime", "Age")
    pub type_code: String,
    /// Union branch name on the wire (e.g., "date_time")
    pub branch: String,
    pub kind: CandidateKind,
}

impl ChoiceCandidate {
    pub fn primitive(ty: PrimitiveType) -> Self {
        Self {
            type_code: ty.code().to_string(),
            branch: wire_branch_name(ty.code()),
            kind: CandidateKind::Primitive(ty),
        }
    }

    pub fn composite(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            branch: wire_branch_name(&type_name),
            type_code: type_name.clone(),
            kind: CandidateKind::Composite(type_name),
        }
    }

    /// Candidate for a FHIR type code, primitive or not.
    pub fn from_code(code: &str) -> Self {
        match PrimitiveType::from_code(code) {
            Some(ty) => Self::primitive(ty),
            None => Self::composite(code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateKind {
    Primitive(PrimitiveType),
    Composite(String),
}

/// Cardinality of a property (min..max)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality {
    /// Minimum occurrences
    pub min: u32,
    /// Maximum occurrences (None means unbounded/*)
    pub max: Option<u32>,
}

impl Cardinality {
    pub const OPTIONAL: Cardinality = Cardinality::new(0, Some(1));
    pub const REQUIRED: Cardinality = Cardinality::new(1, Some(1));
    pub const MANY: Cardinality = Cardinality::new(0, None);
    pub const AT_LEAST_ONE: Cardinality = Cardinality::new(1, None);

    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Check if this property is a list/array
    pub fn is_array(&self) -> bool {
        self.max.map(|m| m > 1).unwrap_or(true)
    }

    /// Check if this property is optional
    pub fn is_optional(&self) -> bool {
        self.min == 0
    }

    /// Check if this property is required
    pub fn is_required(&self) -> bool {
        self.min > 0
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}
