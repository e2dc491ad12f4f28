//! Parser for FHIR StructureDefinitions
//!
//! Reads the snapshot of a resource or complex-type StructureDefinition into
//! schema definitions: the type itself plus one definition per backbone
//! element, in document order.

use crate::error::{Error, Result};
use crate::ir::{Cardinality, ChoiceCandidate, Property, TypeDefinition, TypeKind, TypeRegistry};
use ferrum_models::PrimitiveType;
use serde_json::Value;
use std::collections::HashMap;

const FHIR_TYPE_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/structuredefinition-fhir-type";

/// Parse a StructureDefinition and add its definitions to `registry`
pub fn parse_into(registry: &mut TypeRegistry, sd: &Value) -> Result<()> {
    for type_def in parse_structure_definition(sd)? {
        registry.add_type(type_def)?;
    }
    Ok(())
}

/// Parse a single StructureDefinition into its type and backbone definitions
pub fn parse_structure_definition(sd: &Value) -> Result<Vec<TypeDefinition>> {
    let type_name = sd
        .get("type")
        .or_else(|| sd.get("name"))
        .and_then(Value::as_str)
        .ok_or(Error::MissingField("type"))?;

    let kind = match sd.get("kind").and_then(Value::as_str) {
        Some("resource") => TypeKind::Resource,
        Some("complex-type") => TypeKind::ComplexType,
        Some(other) => return Err(Error::UnsupportedKind(other.to_string())),
        None => return Err(Error::MissingField("kind")),
    };

    let elements = sd
        .get("snapshot")
        .and_then(|s| s.get("element"))
        .and_then(Value::as_array)
        .ok_or(Error::MissingField("snapshot.element"))?;

    let mut root = TypeDefinition::new(type_name, kind);
    root.url = sd.get("url").and_then(Value::as_str).map(String::from);
    root.description = sd
        .get("description")
        .and_then(Value::as_str)
        .map(String::from);

    let mut definitions = vec![root];
    // element path -> index into `definitions`
    let mut owners: HashMap<String, usize> = HashMap::from([(type_name.to_string(), 0)]);

    for element in elements.iter().skip(1) {
        let path = element
            .get("path")
            .and_then(Value::as_str)
            .ok_or(Error::MissingField("element.path"))?;
        let (parent, raw_name) = path.rsplit_once('.').ok_or_else(|| Error::InvalidElement {
            path: path.to_string(),
            message: "path has no parent".to_string(),
        })?;
        let owner = *owners.get(parent).ok_or_else(|| Error::InvalidElement {
            path: path.to_string(),
            message: format!("parent '{parent}' is not a type or backbone element"),
        })?;

        if skip_element(element, raw_name) {
            tracing::trace!(path, "skipping element");
            continue;
        }

        let cardinality = parse_cardinality(element, path)?;
        let description = element
            .get("short")
            .and_then(Value::as_str)
            .map(String::from);

        let property = if let Some(name) = raw_name.strip_suffix("[x]") {
            let candidates = type_codes(element)
                .iter()
                .map(|code| ChoiceCandidate::from_code(code))
                .collect();
            let mut property = Property::choice(name, candidates);
            property.cardinality = cardinality;
            property
        } else if let Some(reference) = element.get("contentReference").and_then(Value::as_str) {
            let target = reference.rsplit('#').next().unwrap_or(reference);
            let index = *owners.get(target).ok_or_else(|| Error::InvalidElement {
                path: path.to_string(),
                message: format!("contentReference to unknown element '{target}'"),
            })?;
            Property::composite(raw_name, definitions[index].name.clone(), cardinality)
        } else {
            let codes = type_codes(element);
            let code = match codes.as_slice() {
                [code] => code.as_str(),
                _ => {
                    return Err(Error::InvalidElement {
                        path: path.to_string(),
                        message: format!("expected exactly one type, found {}", codes.len()),
                    })
                }
            };

            if code == "BackboneElement" || code == "Element" {
                let backbone = TypeDefinition::backbone(path);
                let property = Property::composite(raw_name, backbone.name.clone(), cardinality);
                owners.insert(path.to_string(), definitions.len());
                definitions.push(backbone);
                property
            } else if let Some(ty) = PrimitiveType::from_code(code) {
                match required_binding(element) {
                    Some(value_set) if ty == PrimitiveType::Code => {
                        Property::coded(raw_name, value_set, cardinality)
                    }
                    _ => Property::primitive(raw_name, ty, cardinality),
                }
            } else {
                Property::composite(raw_name, code, cardinality)
            }
        };

        let property = match description {
            Some(d) => property.with_description(d),
            None => property,
        };
        definitions[owner].push_property(property);
    }

    Ok(definitions)
}

/// Elements carried by the element shape itself, or not convertible
fn skip_element(element: &Value, name: &str) -> bool {
    if name == "id" || name == "extension" {
        return true;
    }
    if element.get("max").and_then(Value::as_str) == Some("0") {
        return true;
    }
    type_codes(element)
        .iter()
        .any(|code| code == "Resource" || code == "xhtml")
}

fn parse_cardinality(element: &Value, path: &str) -> Result<Cardinality> {
    let min = element.get("min").and_then(Value::as_u64).unwrap_or(0);
    let min = u32::try_from(min).map_err(|_| Error::InvalidElement {
        path: path.to_string(),
        message: format!("min {min} out of range"),
    })?;
    let max = match element.get("max").and_then(Value::as_str) {
        None | Some("*") => None,
        Some(max) => Some(max.parse::<u32>().map_err(|_| Error::InvalidElement {
            path: path.to_string(),
            message: format!("invalid max '{max}'"),
        })?),
    };
    Ok(Cardinality::new(min, max))
}

/// Type codes of an element, with FHIRPath system types mapped back to FHIR types
fn type_codes(element: &Value) -> Vec<String> {
    element
        .get("type")
        .and_then(Value::as_array)
        .map(|types| types.iter().filter_map(type_code).collect())
        .unwrap_or_default()
}

fn type_code(ty: &Value) -> Option<String> {
    let code = ty.get("code").and_then(Value::as_str)?;
    if !code.starts_with("http://hl7.org/fhirpath/") {
        return Some(code.to_string());
    }
    let declared = ty
        .get("extension")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|ext| ext.get("url").and_then(Value::as_str) == Some(FHIR_TYPE_EXTENSION))
        .and_then(|ext| ext.get("valueUrl").or_else(|| ext.get("valueUri")))
        .and_then(Value::as_str);
    Some(match declared {
        Some(declared) => declared.to_string(),
        None => "string".to_string(),
    })
}

/// Value set of a `required` binding, version suffix removed
fn required_binding(element: &Value) -> Option<&str> {
    let binding = element.get("binding")?;
    if binding.get("strength").and_then(Value::as_str) != Some("required") {
        return None;
    }
    binding
        .get("valueSet")
        .and_then(Value::as_str)
        .map(strip_version)
}

fn strip_version(url: &str) -> &str {
    url.split('|').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CandidateKind, PropertyKind};
    use serde_json::json;

    fn element(path: &str, min: u64, max: &str, types: &[&str]) -> Value {
        json!({
            "path": path,
            "min": min,
            "max": max,
            "type": types.iter().map(|t| json!({"code": t})).collect::<Vec<_>>()
        })
    }

    #[test]
    fn test_choice_and_binding() {
        let mut gender = element("Patient.gender", 0, "1", &["code"]);
        gender["binding"] = json!({
            "strength": "required",
            "valueSet": "http://hl7.org/fhir/ValueSet/administrative-gender|4.0.1"
        });
        let mut language = element("Patient.language", 0, "1", &["code"]);
        language["binding"] = json!({
            "strength": "preferred",
            "valueSet": "http://hl7.org/fhir/ValueSet/languages"
        });
        let sd = json!({
            "resourceType": "StructureDefinition",
            "type": "Patient",
            "kind": "resource",
            "url": "http://hl7.org/fhir/StructureDefinition/Patient",
            "snapshot": {"element": [
                {"path": "Patient"},
                element("Patient.id", 0, "1", &["id"]),
                language,
                element("Patient.extension", 0, "*", &["Extension"]),
                element("Patient.active", 0, "1", &["boolean"]),
                gender,
                element("Patient.deceased[x]", 0, "1", &["boolean", "dateTime"]),
            ]}
        });

        let defs = parse_structure_definition(&sd).unwrap();
        assert_eq!(defs.len(), 1);
        let patient = &defs[0];
        let names: Vec<_> = patient.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["language", "active", "gender", "deceased"]);

        assert_eq!(
            patient.get_property("language").unwrap().kind,
            PropertyKind::Primitive(PrimitiveType::Code)
        );
        match &patient.get_property("gender").unwrap().kind {
            PropertyKind::Coded { value_set, wire_type } => {
                assert_eq!(value_set, "http://hl7.org/fhir/ValueSet/administrative-gender");
                assert_eq!(wire_type, "Patient.GenderCode");
            }
            other => panic!("unexpected kind {other:?}"),
        }
        match &patient.get_property("deceased").unwrap().kind {
            PropertyKind::Choice(choice) => {
                assert_eq!(choice.union_type, "Patient.DeceasedX");
                let branches: Vec<_> = choice.candidates.iter().map(|c| c.branch.as_str()).collect();
                assert_eq!(branches, vec!["boolean", "date_time"]);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_backbone_and_content_reference() {
        let sd = json!({
            "type": "Observation",
            "kind": "resource",
            "snapshot": {"element": [
                {"path": "Observation"},
                element("Observation.referenceRange", 0, "*", &["BackboneElement"]),
                element("Observation.referenceRange.id", 0, "1", &["string"]),
                element("Observation.referenceRange.low", 0, "1", &["Quantity"]),
                element("Observation.component", 0, "*", &["BackboneElement"]),
                element("Observation.component.code", 1, "1", &["CodeableConcept"]),
                {"path": "Observation.component.referenceRange", "min": 0, "max": "*",
                 "contentReference": "#Observation.referenceRange"},
            ]}
        });

        let defs = parse_structure_definition(&sd).unwrap();
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Observation",
                "Observation.ReferenceRangeComponent",
                "Observation.ComponentComponent"
            ]
        );
        assert_eq!(defs[1].wire_name, "Observation.ReferenceRange");
        assert_eq!(defs[1].properties.len(), 1);

        let reference_range = defs[2].get_property("referenceRange").unwrap();
        assert_eq!(
            reference_range.kind,
            PropertyKind::Composite {
                type_name: "Observation.ReferenceRangeComponent".to_string()
            }
        );
        assert!(reference_range.cardinality.is_array());
        assert!(defs[2].get_property("code").unwrap().cardinality.is_required());
    }

    #[test]
    fn test_fhirpath_system_type() {
        let sd = json!({
            "type": "Coding",
            "kind": "complex-type",
            "snapshot": {"element": [
                {"path": "Coding"},
                {"path": "Coding.display", "min": 0, "max": "1", "type": [{
                    "code": "http://hl7.org/fhirpath/System.String",
                    "extension": [{"url": FHIR_TYPE_EXTENSION, "valueUrl": "string"}]
                }]},
                element("Coding.userSelected", 0, "1", &["boolean"]),
            ]}
        });
        let defs = parse_structure_definition(&sd).unwrap();
        assert_eq!(
            defs[0].get_property("display").unwrap().kind,
            PropertyKind::Primitive(PrimitiveType::String)
        );
    }

    #[test]
    fn test_choice_with_composite_candidates() {
        let sd = json!({
            "type": "Condition",
            "kind": "resource",
            "snapshot": {"element": [
                {"path": "Condition"},
                element("Condition.onset[x]", 0, "1", &["dateTime", "Age", "Period", "Range", "string"]),
            ]}
        });
        let defs = parse_structure_definition(&sd).unwrap();
        match &defs[0].get_property("onset").unwrap().kind {
            PropertyKind::Choice(choice) => {
                assert_eq!(choice.candidates.len(), 5);
                assert_eq!(choice.candidates[1].kind, CandidateKind::Composite("Age".into()));
                assert_eq!(choice.candidates[4].branch, "string_value");
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_rejects_primitive_type_definition() {
        let sd = json!({"type": "boolean", "kind": "primitive-type", "snapshot": {"element": []}});
        assert_eq!(
            parse_structure_definition(&sd).unwrap_err(),
            Error::UnsupportedKind("primitive-type".to_string())
        );
    }

    #[test]
    fn test_orphan_element() {
        let sd = json!({
            "type": "Patient",
            "kind": "resource",
            "snapshot": {"element": [
                {"path": "Patient"},
                element("Patient.contact.name", 0, "1", &["HumanName"]),
            ]}
        });
        assert!(matches!(
            parse_structure_definition(&sd),
            Err(Error::InvalidElement { .. })
        ));
    }
}
