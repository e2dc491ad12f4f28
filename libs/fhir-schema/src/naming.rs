//! Wire-side naming conventions

use heck::{ToSnakeCase, ToUpperCamelCase};

/// Field names that collide with reserved words in generated wire bindings.
const RESERVED: &[&str] = &["string", "class", "assert", "for"];

/// `birthDate` -> `birth_date`, `class` -> `class_value`
pub fn wire_field_name(name: &str) -> String {
    let snake = name.to_snake_case();
    if RESERVED.contains(&snake.as_str()) {
        format!("{snake}_value")
    } else {
        snake
    }
}

/// Union branch for a candidate type: `dateTime` -> `date_time`, `string` -> `string_value`
pub fn wire_branch_name(type_code: &str) -> String {
    wire_field_name(type_code)
}

/// `("Condition", "onset")` -> `Condition.OnsetX`
pub fn union_type_name(owner_wire_name: &str, field: &str) -> String {
    format!("{owner_wire_name}.{}X", field.to_upper_camel_case())
}

/// `("Patient", "gender")` -> `Patient.GenderCode`
pub fn coded_wire_type(owner_wire_name: &str, field: &str) -> String {
    format!("{owner_wire_name}.{}Code", field.to_upper_camel_case())
}

/// Host and wire names of the backbone element at `path`.
///
/// `Observation.referenceRange` -> (`Observation.ReferenceRangeComponent`,
/// `Observation.ReferenceRange`). Deeper paths nest on the wire side only.
pub fn backbone_names(path: &str) -> (String, String) {
    let mut segments = path.split('.');
    let root = segments.next().unwrap_or(path);
    let rest: Vec<String> = segments.map(|s| s.to_upper_camel_case()).collect();

    let last = rest.last().cloned().unwrap_or_default();
    let host = format!("{root}.{last}Component");
    let wire = std::iter::once(root.to_string())
        .chain(rest)
        .collect::<Vec<_>>()
        .join(".");
    (host, wire)
}
