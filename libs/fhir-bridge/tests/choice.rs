mod common;

use common::{condition, quantity};
use ferrum_bridge::{ConversionError, Converter, ConverterConfig, MultipleBranchPolicy};
use ferrum_models::{
    HostComposite, HostPrimitive, HostScalar, HostValue, PrimitiveType, WireMessage, WireScalar,
    WireUnion,
};

fn onset_wire(onset: impl Into<HostValue>) -> WireMessage {
    let condition = HostComposite::new("Condition").with("onset", onset);
    Converter::r4().to_target(&condition).unwrap()
}

fn with_onset_union(union: WireUnion) -> WireMessage {
    WireMessage::builder("Condition").union("onset", union).build()
}

fn branch(wire: &WireMessage, name: &str) -> WireMessage {
    wire.union("onset").unwrap().branch(name).unwrap().clone()
}

#[test]
fn test_each_onset_candidate_round_trips() {
    let converter = Converter::r4();
    let period = HostComposite::new("Period").with("start", HostPrimitive::date_time("2020-01"));
    let range = HostComposite::new("Range").with("low", quantity("Quantity", "3", "a"));
    let cases: Vec<(HostValue, &str)> = vec![
        (HostPrimitive::date_time("2020-01-01").into(), "date_time"),
        (quantity("Age", "42", "a").into(), "age"),
        (period.into(), "period"),
        (range.into(), "range"),
        (HostPrimitive::string("childhood").into(), "string_value"),
    ];

    for (onset, expected_branch) in cases {
        let condition = HostComposite::new("Condition").with("onset", onset);
        let wire = converter.to_target(&condition).unwrap();
        let union = wire.union("onset").unwrap();
        assert_eq!(union.type_name, "Condition.OnsetX");
        assert_eq!(union.set_branches().collect::<Vec<_>>(), vec![expected_branch]);
        assert_eq!(converter.to_source(&wire).unwrap(), condition);
    }
}

#[test]
fn test_range_low_quantity_type_is_checked() {
    // Range.low is a Quantity; an Age in that slot is the wrong composite
    let range = HostComposite::new("Range").with("low", quantity("Age", "3", "a"));
    let condition = HostComposite::new("Condition").with("onset", range);
    let err = Converter::r4().to_target(&condition).unwrap_err();
    assert_eq!(err.path(), Some("Condition.onset[x].low"));
}

#[test]
fn test_first_declared_branch_wins() {
    let date_time = branch(&onset_wire(HostPrimitive::date_time("2020-01-01")), "date_time");
    let period = branch(
        &onset_wire(HostComposite::new("Period").with("start", HostPrimitive::date_time("2019"))),
        "period",
    );
    let wire = with_onset_union(
        WireUnion::builder("Condition.OnsetX")
            .branch("period", period)
            .branch("date_time", date_time)
            .build(),
    );

    let decoded = Converter::r4().to_source(&wire).unwrap();
    assert_eq!(
        decoded.get("onset"),
        Some(&HostValue::from(HostPrimitive::date_time("2020-01-01")))
    );
}

#[test]
fn test_reject_policy_reports_all_set_branches() {
    let mut config = ConverterConfig::default();
    config.choice.on_multiple_branches = MultipleBranchPolicy::Reject;
    let converter = Converter::r4_with_config(config).unwrap();

    let wire = with_onset_union(
        WireUnion::builder("Condition.OnsetX")
            .branch("string_value", WireMessage::default_instance("String"))
            .branch("age", WireMessage::default_instance("Age"))
            .build(),
    );
    assert_eq!(
        converter.to_source(&wire).unwrap_err(),
        ConversionError::AmbiguousChoice {
            path: "Condition.onset[x]".to_string(),
            branches: vec!["age".to_string(), "string_value".to_string()],
        }
    );
}

#[test]
fn test_default_valued_branch_is_present() {
    let converter = Converter::r4();

    let flag = WireMessage::builder("Boolean")
        .scalar("value", WireScalar::Bool(false))
        .build();
    let wire = WireMessage::builder("Observation")
        .union(
            "value",
            WireUnion::builder("Observation.ValueX").branch("boolean", flag).build(),
        )
        .build();
    let decoded = converter.to_source(&wire).unwrap();
    assert_eq!(
        decoded.get("value"),
        Some(&HostValue::from(HostPrimitive::boolean(false)))
    );

    // an explicitly set branch with nothing in it is still the chosen branch
    let empty = WireMessage::builder("Observation")
        .union(
            "value",
            WireUnion::builder("Observation.ValueX")
                .branch("boolean", WireMessage::default_instance("Boolean"))
                .build(),
        )
        .build();
    let decoded = converter.to_source(&empty).unwrap();
    let value = decoded.get("value").and_then(HostValue::as_primitive).unwrap();
    assert_eq!(value.ty, PrimitiveType::Boolean);
    assert_eq!(value.value, None);
}

#[test]
fn test_false_observation_value_round_trips() {
    let observation =
        HostComposite::new("Observation").with("value", HostPrimitive::boolean(false));
    let converter = Converter::r4();
    let wire = converter.to_target(&observation).unwrap();
    let union = wire.union("value").unwrap();
    assert_eq!(
        union.branch("boolean").and_then(|b| b.scalar("value")),
        Some(&WireScalar::Bool(false))
    );
    assert_eq!(converter.to_source(&wire).unwrap(), observation);
}

#[test]
fn test_unset_union_is_unresolved() {
    let wire = with_onset_union(WireUnion::builder("Condition.OnsetX").build());
    assert_eq!(
        Converter::r4().to_source(&wire).unwrap_err(),
        ConversionError::UnresolvedChoice {
            path: "Condition.onset[x]".to_string(),
            set_branches: Vec::new(),
        }
    );
}

#[test]
fn test_undeclared_branch_is_unresolved() {
    let wire = with_onset_union(
        WireUnion::builder("Condition.OnsetX")
            .branch("boolean", WireMessage::default_instance("Boolean"))
            .build(),
    );
    assert!(matches!(
        Converter::r4().to_source(&wire),
        Err(ConversionError::UnresolvedChoice { set_branches, .. }) if set_branches == vec!["boolean".to_string()]
    ));
}

#[test]
fn test_undeclared_branch_is_never_dropped() {
    let string_value = branch(&onset_wire(HostPrimitive::string("x")), "string_value");
    let wire = with_onset_union(
        WireUnion::builder("Condition.OnsetX")
            .branch("string_value", string_value)
            .branch(
                "boolean",
                WireMessage::builder("Boolean")
                    .scalar("value", WireScalar::Bool(true))
                    .build(),
            )
            .build(),
    );

    let mut config = ConverterConfig::default();
    config.choice.on_multiple_branches = MultipleBranchPolicy::Reject;
    for converter in [Converter::r4(), Converter::r4_with_config(config).unwrap()] {
        let err = converter.to_source(&wire).unwrap_err();
        assert_eq!(err.path(), Some("Condition.onset[x]"));
        assert!(matches!(err, ConversionError::SchemaMismatch { .. }));
    }
}

#[test]
fn test_unrecognized_variant() {
    let condition = HostComposite::new("Condition").with("onset", HostPrimitive::boolean(true));
    assert_eq!(
        Converter::r4().to_target(&condition).unwrap_err(),
        ConversionError::UnrecognizedVariant {
            path: "Condition.onset[x]".to_string(),
            found: "boolean".to_string(),
        }
    );
}

#[test]
fn test_extension_value_choice() {
    let converter = Converter::r4();
    let ext = common::extension(
        "http://example.org/fhir/StructureDefinition/score",
        HostPrimitive::new(PrimitiveType::Integer, HostScalar::Integer(7)),
    );
    let condition = condition().with_extension(ext);
    let wire = converter.to_target(&condition).unwrap();
    let value = wire.repeated("extension")[0].union("value").unwrap();
    assert_eq!(value.type_name, "Extension.ValueX");
    assert_eq!(
        value.branch("integer").and_then(|m| m.scalar("value")),
        Some(&WireScalar::Int32(7))
    );
    assert_eq!(converter.to_source(&wire).unwrap(), condition);
}
