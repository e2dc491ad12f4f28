//! Built-in FHIR R4 schema tables
//!
//! Field lists follow the R4 StructureDefinitions in declaration order. Types
//! outside this set (Narrative, Timing, SampledData, contained resources) are
//! omitted together with the fields that use them.

use crate::error::Result;
use crate::ir::{Cardinality, ChoiceCandidate, Property, TypeDefinition, TypeRegistry};
use ferrum_models::PrimitiveType as P;

const OPT: Cardinality = Cardinality::OPTIONAL;
const REQ: Cardinality = Cardinality::REQUIRED;
const MANY: Cardinality = Cardinality::MANY;

pub const ADMINISTRATIVE_GENDER: &str = "http://hl7.org/fhir/ValueSet/administrative-gender";
pub const NAME_USE: &str = "http://hl7.org/fhir/ValueSet/name-use";
pub const IDENTIFIER_USE: &str = "http://hl7.org/fhir/ValueSet/identifier-use";
pub const CONTACT_POINT_SYSTEM: &str = "http://hl7.org/fhir/ValueSet/contact-point-system";
pub const CONTACT_POINT_USE: &str = "http://hl7.org/fhir/ValueSet/contact-point-use";
pub const ADDRESS_USE: &str = "http://hl7.org/fhir/ValueSet/address-use";
pub const ADDRESS_TYPE: &str = "http://hl7.org/fhir/ValueSet/address-type";
pub const OBSERVATION_STATUS: &str = "http://hl7.org/fhir/ValueSet/observation-status";
pub const QUANTITY_COMPARATOR: &str = "http://hl7.org/fhir/ValueSet/quantity-comparator";
pub const LINK_TYPE: &str = "http://hl7.org/fhir/ValueSet/link-type";

fn prim(name: &str, ty: P) -> Property {
    Property::primitive(name, ty, OPT)
}

fn prims(name: &str, ty: P) -> Property {
    Property::primitive(name, ty, MANY)
}

fn one(name: &str, type_name: &str) -> Property {
    Property::composite(name, type_name, OPT)
}

fn many(name: &str, type_name: &str) -> Property {
    Property::composite(name, type_name, MANY)
}

fn choice(name: &str, codes: &[&str]) -> Property {
    Property::choice(name, codes.iter().map(|c| ChoiceCandidate::from_code(c)).collect())
}

/// Fields every DomainResource in this set starts with.
fn domain_resource(name: &str) -> TypeDefinition {
    TypeDefinition::resource(name)
        .property(one("meta", "Meta"))
        .property(prim("implicitRules", P::Uri))
        .property(prim("language", P::Code))
        .property(many("modifierExtension", "Extension"))
}

fn backbone(path: &str) -> TypeDefinition {
    TypeDefinition::backbone(path).property(many("modifierExtension", "Extension"))
}

const EXTENSION_VALUE: &[&str] = &[
    "base64Binary",
    "boolean",
    "canonical",
    "code",
    "date",
    "dateTime",
    "decimal",
    "id",
    "instant",
    "integer",
    "markdown",
    "oid",
    "positiveInt",
    "string",
    "time",
    "unsignedInt",
    "uri",
    "url",
    "uuid",
    "Address",
    "Age",
    "Annotation",
    "Attachment",
    "CodeableConcept",
    "Coding",
    "ContactPoint",
    "Duration",
    "HumanName",
    "Identifier",
    "Period",
    "Quantity",
    "Range",
    "Ratio",
    "Reference",
    "Meta",
];

const OBSERVATION_VALUE: &[&str] = &[
    "Quantity",
    "CodeableConcept",
    "string",
    "boolean",
    "integer",
    "Range",
    "Ratio",
    "time",
    "dateTime",
    "Period",
];

const CONDITION_ONSET: &[&str] = &["dateTime", "Age", "Period", "Range", "string"];

fn datatypes() -> Vec<TypeDefinition> {
    let quantity_like = |name: &str| {
        TypeDefinition::complex(name)
            .property(prim("value", P::Decimal))
            .property(Property::coded("comparator", QUANTITY_COMPARATOR, OPT))
            .property(prim("unit", P::String))
            .property(prim("system", P::Uri))
            .property(prim("code", P::Code))
    };

    vec![
        TypeDefinition::complex("Extension")
            .property(Property::primitive("url", P::Uri, REQ))
            .property(choice("value", EXTENSION_VALUE)),
        TypeDefinition::complex("Meta")
            .property(prim("versionId", P::Id))
            .property(prim("lastUpdated", P::Instant))
            .property(prim("source", P::Uri))
            .property(prims("profile", P::Canonical))
            .property(many("security", "Coding"))
            .property(many("tag", "Coding")),
        TypeDefinition::complex("Coding")
            .property(prim("system", P::Uri))
            .property(prim("version", P::String))
            .property(prim("code", P::Code))
            .property(prim("display", P::String))
            .property(prim("userSelected", P::Boolean)),
        TypeDefinition::complex("CodeableConcept")
            .property(many("coding", "Coding"))
            .property(prim("text", P::String)),
        quantity_like("Quantity"),
        quantity_like("Age"),
        quantity_like("Duration"),
        TypeDefinition::complex("Range")
            .property(one("low", "Quantity"))
            .property(one("high", "Quantity")),
        TypeDefinition::complex("Ratio")
            .property(one("numerator", "Quantity"))
            .property(one("denominator", "Quantity")),
        TypeDefinition::complex("Period")
            .property(prim("start", P::DateTime))
            .property(prim("end", P::DateTime)),
        TypeDefinition::complex("Reference")
            .property(prim("reference", P::String))
            .property(prim("type", P::Uri))
            .property(one("identifier", "Identifier"))
            .property(prim("display", P::String)),
        TypeDefinition::complex("Identifier")
            .property(Property::coded("use", IDENTIFIER_USE, OPT))
            .property(one("type", "CodeableConcept"))
            .property(prim("system", P::Uri))
            .property(prim("value", P::String))
            .property(one("period", "Period"))
            .property(one("assigner", "Reference")),
        TypeDefinition::complex("HumanName")
            .property(Property::coded("use", NAME_USE, OPT))
            .property(prim("text", P::String))
            .property(prim("family", P::String))
            .property(prims("given", P::String))
            .property(prims("prefix", P::String))
            .property(prims("suffix", P::String))
            .property(one("period", "Period")),
        TypeDefinition::complex("ContactPoint")
            .property(Property::coded("system", CONTACT_POINT_SYSTEM, OPT))
            .property(prim("value", P::String))
            .property(Property::coded("use", CONTACT_POINT_USE, OPT))
            .property(prim("rank", P::PositiveInt))
            .property(one("period", "Period")),
        TypeDefinition::complex("Address")
            .property(Property::coded("use", ADDRESS_USE, OPT))
            .property(Property::coded("type", ADDRESS_TYPE, OPT))
            .property(prim("text", P::String))
            .property(prims("line", P::String))
            .property(prim("city", P::String))
            .property(prim("district", P::String))
            .property(prim("state", P::String))
            .property(prim("postalCode", P::String))
            .property(prim("country", P::String))
            .property(one("period", "Period")),
        TypeDefinition::complex("Annotation")
            .property(choice("author", &["Reference", "string"]))
            .property(prim("time", P::DateTime))
            .property(Property::primitive("text", P::Markdown, REQ)),
        TypeDefinition::complex("Attachment")
            .property(prim("contentType", P::Code))
            .property(prim("language", P::Code))
            .property(prim("data", P::Base64Binary))
            .property(prim("url", P::Url))
            .property(prim("size", P::UnsignedInt))
            .property(prim("hash", P::Base64Binary))
            .property(prim("title", P::String))
            .property(prim("creation", P::DateTime)),
    ]
}

fn patient() -> Vec<TypeDefinition> {
    vec![
        domain_resource("Patient")
            .property(many("identifier", "Identifier"))
            .property(prim("active", P::Boolean))
            .property(many("name", "HumanName"))
            .property(many("telecom", "ContactPoint"))
            .property(Property::coded("gender", ADMINISTRATIVE_GENDER, OPT))
            .property(prim("birthDate", P::Date))
            .property(choice("deceased", &["boolean", "dateTime"]))
            .property(many("address", "Address"))
            .property(one("maritalStatus", "CodeableConcept"))
            .property(choice("multipleBirth", &["boolean", "integer"]))
            .property(many("photo", "Attachment"))
            .property(many("contact", "Patient.ContactComponent"))
            .property(many("generalPractitioner", "Reference"))
            .property(one("managingOrganization", "Reference"))
            .property(many("link", "Patient.LinkComponent")),
        backbone("Patient.contact")
            .property(many("relationship", "CodeableConcept"))
            .property(one("name", "HumanName"))
            .property(many("telecom", "ContactPoint"))
            .property(one("address", "Address"))
            .property(Property::coded("gender", ADMINISTRATIVE_GENDER, OPT))
            .property(one("organization", "Reference"))
            .property(one("period", "Period")),
        backbone("Patient.link")
            .property(Property::composite("other", "Reference", REQ))
            .property(Property::coded("type", LINK_TYPE, REQ)),
    ]
}

fn condition() -> Vec<TypeDefinition> {
    vec![domain_resource("Condition")
        .property(many("identifier", "Identifier"))
        .property(one("clinicalStatus", "CodeableConcept"))
        .property(one("verificationStatus", "CodeableConcept"))
        .property(many("category", "CodeableConcept"))
        .property(one("severity", "CodeableConcept"))
        .property(one("code", "CodeableConcept"))
        .property(many("bodySite", "CodeableConcept"))
        .property(Property::composite("subject", "Reference", REQ))
        .property(one("encounter", "Reference"))
        .property(choice("onset", CONDITION_ONSET))
        .property(choice("abatement", CONDITION_ONSET))
        .property(prim("recordedDate", P::DateTime))
        .property(one("recorder", "Reference"))
        .property(one("asserter", "Reference"))
        .property(many("note", "Annotation"))]
}

fn observation() -> Vec<TypeDefinition> {
    vec![
        domain_resource("Observation")
            .property(many("identifier", "Identifier"))
            .property(many("basedOn", "Reference"))
            .property(many("partOf", "Reference"))
            .property(Property::coded("status", OBSERVATION_STATUS, REQ))
            .property(many("category", "CodeableConcept"))
            .property(Property::composite("code", "CodeableConcept", REQ))
            .property(one("subject", "Reference"))
            .property(many("focus", "Reference"))
            .property(one("encounter", "Reference"))
            .property(choice("effective", &["dateTime", "Period", "instant"]))
            .property(prim("issued", P::Instant))
            .property(many("performer", "Reference"))
            .property(choice("value", OBSERVATION_VALUE))
            .property(one("dataAbsentReason", "CodeableConcept"))
            .property(many("interpretation", "CodeableConcept"))
            .property(many("note", "Annotation"))
            .property(one("bodySite", "CodeableConcept"))
            .property(one("method", "CodeableConcept"))
            .property(one("specimen", "Reference"))
            .property(one("device", "Reference"))
            .property(many("referenceRange", "Observation.ReferenceRangeComponent"))
            .property(many("hasMember", "Reference"))
            .property(many("derivedFrom", "Reference"))
            .property(many("component", "Observation.ComponentComponent")),
        backbone("Observation.referenceRange")
            .property(one("low", "Quantity"))
            .property(one("high", "Quantity"))
            .property(one("type", "CodeableConcept"))
            .property(many("appliesTo", "CodeableConcept"))
            .property(one("age", "Range"))
            .property(prim("text", P::String)),
        backbone("Observation.component")
            .property(Property::composite("code", "CodeableConcept", REQ))
            .property(choice("value", OBSERVATION_VALUE))
            .property(one("dataAbsentReason", "CodeableConcept"))
            .property(many("interpretation", "CodeableConcept"))
            .property(many("referenceRange", "Observation.ReferenceRangeComponent")),
    ]
}

/// Build and validate the built-in registry.
pub fn build_registry() -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    for type_def in datatypes()
        .into_iter()
        .chain(patient())
        .chain(condition())
        .chain(observation())
    {
        registry.add_type(type_def)?;
    }
    registry.validate()?;
    Ok(registry)
}
