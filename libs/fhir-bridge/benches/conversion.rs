//! Criterion benchmarks for resource conversion

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ferrum_bridge::Converter;
use ferrum_codes::r4::{ADMINISTRATIVE_GENDER, OBSERVATION_STATUS};
use ferrum_models::{HostCode, HostComposite, HostPrimitive};
use rust_decimal::Decimal;
use std::time::Duration;

fn custom_criterion() -> Criterion {
    Criterion::default()
        .sample_size(20)
        .warm_up_time(Duration::from_millis(100))
        .measurement_time(Duration::from_secs(1))
}

fn patient() -> HostComposite {
    let mut patient = HostComposite::new("Patient")
        .with_id("bench")
        .with("active", HostPrimitive::boolean(true))
        .with("gender", HostCode::new(ADMINISTRATIVE_GENDER, "Female"))
        .with("birthDate", HostPrimitive::date("1984-06-01"))
        .with("deceased", HostPrimitive::date_time("2020-02-01T10:00:00Z"));
    for i in 0..5 {
        patient.add(
            "name",
            HostComposite::new("HumanName")
                .with("family", HostPrimitive::string(format!("Family{i}")))
                .with_item("given", HostPrimitive::string("Ada")),
        );
    }
    patient
}

fn observation_with_components(count: usize) -> HostComposite {
    let mut observation = HostComposite::new("Observation")
        .with("status", HostCode::new(OBSERVATION_STATUS, "Final"))
        .with("effective", HostPrimitive::date_time("2024-01-01T08:00:00.000+01:00"));
    for i in 0..count {
        let quantity = HostComposite::new("Quantity")
            .with("value", HostPrimitive::decimal(Decimal::new(i as i64 * 15, 1)))
            .with("unit", HostPrimitive::string("mmol/L"));
        observation.add(
            "component",
            HostComposite::new("Observation.ComponentComponent")
                .with("code", HostComposite::new("CodeableConcept").with("text", HostPrimitive::string("glucose")))
                .with("value", quantity),
        );
    }
    observation
}

fn bench_patient(c: &mut Criterion) {
    let converter = Converter::r4();
    let patient = patient();
    let wire = converter.to_target(&patient).unwrap();

    c.bench_function("patient_to_target", |b| {
        b.iter(|| converter.to_target(black_box(&patient)).unwrap())
    });
    c.bench_function("patient_to_source", |b| {
        b.iter(|| converter.to_source(black_box(&wire)).unwrap())
    });
}

fn bench_observation_components(c: &mut Criterion) {
    let converter = Converter::r4();
    for count in [1, 10, 100] {
        let observation = observation_with_components(count);
        c.bench_function(&format!("observation_round_trip_{count}"), |b| {
            b.iter(|| {
                let wire = converter.to_target(black_box(&observation)).unwrap();
                converter.to_source(&wire).unwrap()
            })
        });
    }
}

criterion_group! {
    name = benches;
    config = custom_criterion();
    targets = bench_patient, bench_observation_components
}
criterion_main!(benches);
