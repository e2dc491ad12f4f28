//! Property-based tests using QuickCheck

use ferrum_bridge::{ConversionError, Converter};
use ferrum_codes::r4::ADMINISTRATIVE_GENDER;
use ferrum_models::{HostCode, HostComposite, HostPrimitive, HostValue, PrimitiveType, WireScalar};
use quickcheck::{QuickCheck, TestResult};
use rust_decimal::Decimal;

fn round_trips(resource: &HostComposite) -> bool {
    let converter = Converter::r4();
    match converter.to_target(resource) {
        Ok(wire) => converter.to_source(&wire).as_ref() == Ok(resource),
        Err(_) => false,
    }
}

/// Property: set, set-to-false and unset booleans all survive a round trip
#[test]
fn prop_boolean_presence() {
    fn prop(active: Option<bool>) -> TestResult {
        let mut patient = HostComposite::new("Patient");
        if let Some(active) = active {
            patient.set("active", HostPrimitive::boolean(active));
        }
        TestResult::from_bool(round_trips(&patient))
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Option<bool>) -> TestResult);
}

/// Property: integers convert exactly when they fit in 32 bits
#[test]
fn prop_integer_range() {
    fn prop(value: i64) -> TestResult {
        let observation =
            HostComposite::new("Observation").with("value", HostPrimitive::integer(value));
        let result = Converter::r4().to_target(&observation);
        let fits = i32::try_from(value).is_ok();
        match result {
            Ok(_) => TestResult::from_bool(fits && round_trips(&observation)),
            Err(ConversionError::ValueOutOfRange { .. }) => TestResult::from_bool(!fits),
            Err(_) => TestResult::failed(),
        }
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(i64) -> TestResult);
}

/// Property: decimals keep value and scale
#[test]
fn prop_decimal_scale() {
    fn prop(mantissa: i64, scale: u8) -> TestResult {
        let value = Decimal::new(mantissa, u32::from(scale % 10));
        let quantity = HostComposite::new("Quantity").with("value", HostPrimitive::decimal(value));
        let observation = HostComposite::new("Observation").with("value", quantity);

        let converter = Converter::r4();
        let wire = converter.to_target(&observation).unwrap();
        let back = converter.to_source(&wire).unwrap();
        let decoded = back
            .get("value")
            .and_then(HostValue::as_composite)
            .and_then(|q| q.get("value"))
            .and_then(HostValue::as_primitive)
            .and_then(|p| p.value.clone());
        match decoded {
            Some(ferrum_models::HostScalar::Decimal(d)) => {
                TestResult::from_bool(d.to_string() == value.to_string())
            }
            _ => TestResult::failed(),
        }
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(i64, u8) -> TestResult);
}

/// Property: repeated primitives keep length and order
#[test]
fn prop_given_names_round_trip() {
    fn prop(given: Vec<String>) -> TestResult {
        let mut name = HostComposite::new("HumanName");
        name.set_list(
            "given",
            given.iter().map(|g| HostPrimitive::string(g.as_str()).into()).collect(),
        );
        let patient = HostComposite::new("Patient").with_item("name", name);

        let wire = match Converter::r4().to_target(&patient) {
            Ok(wire) => wire,
            Err(_) => return TestResult::failed(),
        };
        let count = wire.repeated("name")[0].repeated("given").len();
        TestResult::from_bool(count == given.len() && round_trips(&patient))
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Vec<String>) -> TestResult);
}

/// Property: every gender code maps to its table identifiers and back
#[test]
fn prop_gender_codes() {
    fn prop(index: u8) -> TestResult {
        let codes = ferrum_codes::r4_registry();
        let table = codes.table(ADMINISTRATIVE_GENDER).unwrap();
        let entry = &table.entries()[usize::from(index) % table.len()];

        let patient = HostComposite::new("Patient")
            .with("gender", HostCode::new(ADMINISTRATIVE_GENDER, entry.host.as_str()));
        let wire = Converter::r4().to_target(&patient).unwrap();
        let identifier = wire.message("gender").and_then(|g| g.scalar("value"));

        TestResult::from_bool(
            identifier == Some(&WireScalar::Enum(entry.wire.clone())) && round_trips(&patient),
        )
    }

    QuickCheck::new()
        .tests(50)
        .quickcheck(prop as fn(u8) -> TestResult);
}

/// Property: date-times keep their lexical form, zone and precision included
#[test]
fn prop_date_time_lexical_form() {
    fn prop(year: u16, month: u8, day: u8, seconds: u32, fraction: u32, offset: i8) -> TestResult {
        let seconds = seconds % 86_400;
        let fraction = match fraction % 3 {
            0 => String::new(),
            1 => format!(".{:03}", fraction % 1_000),
            _ => format!(".{:06}", fraction % 1_000_000),
        };
        let hours = offset % 15;
        let zone = if hours == 0 {
            "Z".to_string()
        } else {
            format!("{hours:+03}:00")
        };
        let text = format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{fraction}{zone}",
            1 + year % 9999,
            1 + month % 12,
            1 + day % 28,
            seconds / 3600,
            seconds / 60 % 60,
            seconds % 60,
        );

        let condition = HostComposite::new("Condition")
            .with("recordedDate", HostPrimitive::text(PrimitiveType::DateTime, text));
        TestResult::from_bool(round_trips(&condition))
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(u16, u8, u8, u32, u32, i8) -> TestResult);
}
