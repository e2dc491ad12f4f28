//! Built-in FHIR R4 code tables
//!
//! Only value sets bound with `required` strength to plain `code` elements are
//! listed; those are the ones carried as enums on the wire.

use crate::error::Result;
use crate::registry::CodeRegistry;
use crate::table::ValueSetTable;

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
pub const PUBLICATION_STATUS: &str = "http://hl7.org/fhir/ValueSet/publication-status";
pub const NARRATIVE_STATUS: &str = "http://hl7.org/fhir/ValueSet/narrative-status";
pub const DAYS_OF_WEEK: &str = "http://hl7.org/fhir/ValueSet/days-of-week";
pub const FHIR_VERSION: &str = "http://hl7.org/fhir/ValueSet/FHIR-version";
pub const EVENT_TIMING: &str = "http://hl7.org/fhir/ValueSet/event-timing";

/// (code, wire identifier, host identifier)
const FHIR_VERSION_ENTRIES: &[(&str, &str, &str)] = &[
    ("1.0.2", "V_1_0_2", "_1_0_2"),
    ("3.0.1", "V_3_0_1", "_3_0_1"),
    ("3.0.2", "V_3_0_2", "_3_0_2"),
    ("4.0.0", "V_4_0_0", "_4_0_0"),
    ("4.0.1", "V_4_0_1", "_4_0_1"),
];

const EVENT_TIMING_ENTRIES: &[(&str, &str, &str)] = &[
    ("MORN", "MORN", "Morn"),
    ("MORN.early", "MORN_EARLY", "MornEarly"),
    ("MORN.late", "MORN_LATE", "MornLate"),
    ("NOON", "NOON", "Noon"),
    ("AFT", "AFT", "Aft"),
    ("AFT.early", "AFT_EARLY", "AftEarly"),
    ("AFT.late", "AFT_LATE", "AftLate"),
    ("EVE", "EVE", "Eve"),
    ("EVE.early", "EVE_EARLY", "EveEarly"),
    ("EVE.late", "EVE_LATE", "EveLate"),
    ("NIGHT", "NIGHT", "Night"),
    ("PHS", "PHS", "Phs"),
    ("HS", "HS", "Hs"),
    ("WAKE", "WAKE", "Wake"),
    ("C", "C", "C"),
    ("CM", "CM", "Cm"),
    ("CD", "CD", "Cd"),
    ("CV", "CV", "Cv"),
    ("AC", "AC", "Ac"),
    ("ACM", "ACM", "Acm"),
    ("ACD", "ACD", "Acd"),
    ("ACV", "ACV", "Acv"),
    ("PC", "PC", "Pc"),
    ("PCM", "PCM", "Pcm"),
    ("PCD", "PCD", "Pcd"),
    ("PCV", "PCV", "Pcv"),
];

fn with_entries(
    builder: crate::table::ValueSetTableBuilder,
    entries: &[(&str, &str, &str)],
) -> crate::table::ValueSetTableBuilder {
    entries
        .iter()
        .fold(builder, |b, (code, wire, host)| b.entry(*code, *wire, *host))
}

/// All built-in tables.
pub fn tables() -> Result<Vec<ValueSetTable>> {
    Ok(vec![
        ValueSetTable::builder(ADMINISTRATIVE_GENDER)
            .name("AdministrativeGender")
            .codes(["male", "female", "other", "unknown"])
            .build()?,
        ValueSetTable::builder(NAME_USE)
            .name("NameUse")
            .codes(["usual", "official", "temp", "nickname", "anonymous", "old", "maiden"])
            .build()?,
        ValueSetTable::builder(IDENTIFIER_USE)
            .name("IdentifierUse")
            .codes(["usual", "official", "temp", "secondary", "old"])
            .build()?,
        ValueSetTable::builder(CONTACT_POINT_SYSTEM)
            .name("ContactPointSystem")
            .codes(["phone", "fax", "email", "pager", "url", "sms", "other"])
            .build()?,
        ValueSetTable::builder(CONTACT_POINT_USE)
            .name("ContactPointUse")
            .codes(["home", "work", "temp", "old", "mobile"])
            .build()?,
        ValueSetTable::builder(ADDRESS_USE)
            .name("AddressUse")
            .codes(["home", "work", "temp", "old", "billing"])
            .build()?,
        ValueSetTable::builder(ADDRESS_TYPE)
            .name("AddressType")
            .codes(["postal", "physical", "both"])
            .build()?,
        ValueSetTable::builder(OBSERVATION_STATUS)
            .name("ObservationStatus")
            .codes([
                "registered",
                "preliminary",
                "final",
                "amended",
                "corrected",
                "cancelled",
                "entered-in-error",
                "unknown",
            ])
            .build()?,
        ValueSetTable::builder(QUANTITY_COMPARATOR)
            .name("QuantityComparator")
            .entry("<", "LESS_THAN", "LessThan")
            .entry("<=", "LESS_THAN_OR_EQUAL_TO", "LessOrEqual")
            .entry(">=", "GREATER_THAN_OR_EQUAL_TO", "GreaterOrEqual")
            .entry(">", "GREATER_THAN", "GreaterThan")
            .build()?,
        ValueSetTable::builder(LINK_TYPE)
            .name("LinkType")
            .codes(["replaced-by", "replaces", "refer", "seealso"])
            .build()?,
        ValueSetTable::builder(PUBLICATION_STATUS)
            .name("PublicationStatus")
            .codes(["draft", "active", "retired", "unknown"])
            .build()?,
        ValueSetTable::builder(NARRATIVE_STATUS)
            .name("NarrativeStatus")
            .codes(["generated", "extensions", "additional", "empty"])
            .build()?,
        ValueSetTable::builder(DAYS_OF_WEEK)
            .name("DaysOfWeek")
            .codes(["mon", "tue", "wed", "thu", "fri", "sat", "sun"])
            .build()?,
        with_entries(
            ValueSetTable::builder(FHIR_VERSION).name("FHIRVersion"),
            FHIR_VERSION_ENTRIES,
        )
        .build()?,
        with_entries(
            ValueSetTable::builder(EVENT_TIMING).name("EventTiming"),
            EVENT_TIMING_ENTRIES,
        )
        .build()?,
    ])
}

pub(crate) fn build_registry() -> Result<CodeRegistry> {
    let mut registry = CodeRegistry::new();
    for table in tables()? {
        registry.register(table)?;
    }
    Ok(registry)
}
