#![allow(dead_code)]

use ferrum_codes::r4::{
    ADDRESS_TYPE, ADDRESS_USE, ADMINISTRATIVE_GENDER, CONTACT_POINT_SYSTEM, CONTACT_POINT_USE,
    IDENTIFIER_USE, LINK_TYPE, NAME_USE, OBSERVATION_STATUS, QUANTITY_COMPARATOR,
};
use ferrum_models::{HostCode, HostComposite, HostPrimitive, PrimitiveType};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn decimal(text: &str) -> Decimal {
    Decimal::from_str(text).unwrap()
}

pub fn reference(target: &str) -> HostComposite {
    HostComposite::new("Reference").with("reference", HostPrimitive::string(target))
}

pub fn coding(system: &str, code: &str, display: &str) -> HostComposite {
    HostComposite::new("Coding")
        .with("system", HostPrimitive::uri(system))
        .with("code", HostPrimitive::code(code))
        .with("display", HostPrimitive::string(display))
}

pub fn concept(system: &str, code: &str, display: &str) -> HostComposite {
    HostComposite::new("CodeableConcept")
        .with_item("coding", coding(system, code, display))
        .with("text", HostPrimitive::string(display))
}

pub fn quantity(type_name: &str, value: &str, unit: &str) -> HostComposite {
    HostComposite::new(type_name)
        .with("value", HostPrimitive::decimal(decimal(value)))
        .with("unit", HostPrimitive::string(unit))
        .with("system", HostPrimitive::uri("http://unitsofmeasure.org"))
        .with("code", HostPrimitive::code(unit))
}

pub fn extension(url: &str, value: HostPrimitive) -> HostComposite {
    HostComposite::new("Extension")
        .with("url", HostPrimitive::uri(url))
        .with("value", value)
}

pub fn patient() -> HostComposite {
    let birth_time = extension(
        "http://hl7.org/fhir/StructureDefinition/patient-birthTime",
        HostPrimitive::date_time("1974-12-25T14:35:45-05:00"),
    );

    HostComposite::new("Patient")
        .with_id("example")
        .with(
            "meta",
            HostComposite::new("Meta")
                .with("versionId", HostPrimitive::text(PrimitiveType::Id, "3"))
                .with("lastUpdated", HostPrimitive::instant("2024-03-01T09:30:00.000Z"))
                .with_item(
                    "profile",
                    HostPrimitive::text(
                        PrimitiveType::Canonical,
                        "http://example.org/StructureDefinition/patient",
                    ),
                ),
        )
        .with_item(
            "identifier",
            HostComposite::new("Identifier")
                .with("use", HostCode::new(IDENTIFIER_USE, "Usual"))
                .with("type", concept("http://terminology.hl7.org/CodeSystem/v2-0203", "MR", "Medical record number"))
                .with("system", HostPrimitive::uri("urn:oid:1.2.36.146.595.217.0.1"))
                .with("value", HostPrimitive::string("12345"))
                .with(
                    "period",
                    HostComposite::new("Period").with("start", HostPrimitive::date_time("2001-05-06")),
                )
                .with("assigner", HostComposite::new("Reference").with("display", HostPrimitive::string("Acme Healthcare"))),
        )
        .with("active", HostPrimitive::boolean(true))
        .with_item(
            "name",
            HostComposite::new("HumanName")
                .with("use", HostCode::new(NAME_USE, "Official"))
                .with("family", HostPrimitive::string("Chalmers"))
                .with_item("given", HostPrimitive::string("Peter"))
                .with_item("given", HostPrimitive::string("James")),
        )
        .with_item(
            "name",
            HostComposite::new("HumanName")
                .with("use", HostCode::new(NAME_USE, "Maiden"))
                .with("family", HostPrimitive::string("Windsor"))
                .with(
                    "period",
                    HostComposite::new("Period").with("end", HostPrimitive::date_time("2002")),
                ),
        )
        .with_item(
            "telecom",
            HostComposite::new("ContactPoint")
                .with("system", HostCode::new(CONTACT_POINT_SYSTEM, "Phone"))
                .with("value", HostPrimitive::string("(03) 5555 6473"))
                .with("use", HostCode::new(CONTACT_POINT_USE, "Work"))
                .with("rank", HostPrimitive::positive_int(1)),
        )
        .with("gender", HostCode::new(ADMINISTRATIVE_GENDER, "Male"))
        .with(
            "birthDate",
            HostPrimitive::date("1974-12-25").with_extension(birth_time),
        )
        .with("deceased", HostPrimitive::boolean(false))
        .with_item(
            "address",
            HostComposite::new("Address")
                .with("use", HostCode::new(ADDRESS_USE, "Home"))
                .with("type", HostCode::new(ADDRESS_TYPE, "Both"))
                .with_item("line", HostPrimitive::string("534 Erewhon St"))
                .with("city", HostPrimitive::string("PleasantVille"))
                .with("postalCode", HostPrimitive::string("3999")),
        )
        .with_item(
            "contact",
            HostComposite::new("Patient.ContactComponent")
                .with_item(
                    "relationship",
                    concept("http://terminology.hl7.org/CodeSystem/v2-0131", "N", "Next-of-Kin"),
                )
                .with("name", HostComposite::new("HumanName").with("family", HostPrimitive::string("du Marché")))
                .with("gender", HostCode::new(ADMINISTRATIVE_GENDER, "Female")),
        )
        .with("managingOrganization", reference("Organization/1"))
        .with_item(
            "link",
            HostComposite::new("Patient.LinkComponent")
                .with("other", reference("Patient/pat2"))
                .with("type", HostCode::new(LINK_TYPE, "Seealso")),
        )
}

pub fn condition() -> HostComposite {
    HostComposite::new("Condition")
        .with_id("f201")
        .with(
            "clinicalStatus",
            concept(
                "http://terminology.hl7.org/CodeSystem/condition-clinical",
                "resolved",
                "Resolved",
            ),
        )
        .with_item(
            "category",
            concept("http://snomed.info/sct", "55607006", "Problem"),
        )
        .with("code", concept("http://snomed.info/sct", "386661006", "Fever"))
        .with("subject", reference("Patient/f201"))
        .with("onset", HostPrimitive::date_time("2013-04-02"))
        .with(
            "abatement",
            quantity("Age", "12", "a").with("comparator", HostCode::new(QUANTITY_COMPARATOR, "LessThan")),
        )
        .with("recordedDate", HostPrimitive::date_time("2013-04-04T10:00:00+01:00"))
        .with_item(
            "note",
            HostComposite::new("Annotation")
                .with("author", HostPrimitive::string("Dr. Roel"))
                .with("text", HostPrimitive::text(PrimitiveType::Markdown, "Fever *resolved*")),
        )
}

pub fn observation() -> HostComposite {
    let range = |low: &str, high: &str| {
        HostComposite::new("Observation.ReferenceRangeComponent")
            .with("low", quantity("Quantity", low, "mm[Hg]"))
            .with("high", quantity("Quantity", high, "mm[Hg]"))
    };

    HostComposite::new("Observation")
        .with_id("blood-pressure")
        .with("status", HostCode::new(OBSERVATION_STATUS, "EnteredInError"))
        .with_item(
            "category",
            concept(
                "http://terminology.hl7.org/CodeSystem/observation-category",
                "vital-signs",
                "Vital Signs",
            ),
        )
        .with("code", concept("http://loinc.org", "85354-9", "Blood pressure panel"))
        .with("subject", reference("Patient/example"))
        .with(
            "effective",
            HostComposite::new("Period")
                .with("start", HostPrimitive::date_time("2012-09-17T09:00:00.000Z"))
                .with("end", HostPrimitive::date_time("2012-09-17T09:05:00.000Z")),
        )
        .with("issued", HostPrimitive::instant("2013-04-03T15:30:10.010+01:00"))
        .with_item("performer", reference("Practitioner/example"))
        .with_item(
            "component",
            HostComposite::new("Observation.ComponentComponent")
                .with("code", concept("http://loinc.org", "8480-6", "Systolic blood pressure"))
                .with("value", quantity("Quantity", "107", "mm[Hg]"))
                .with_item("referenceRange", range("90", "120")),
        )
        .with_item(
            "component",
            HostComposite::new("Observation.ComponentComponent")
                .with("code", concept("http://loinc.org", "8462-4", "Diastolic blood pressure"))
                .with("value", quantity("Quantity", "60.50", "mm[Hg]"))
                .with_item("referenceRange", range("60", "80")),
        )
        .with_item(
            "component",
            HostComposite::new("Observation.ComponentComponent")
                .with("code", concept("http://loinc.org", "8478-0", "Mean blood pressure"))
                .with("value", HostPrimitive::boolean(false)),
        )
}
