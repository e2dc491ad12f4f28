//! Build code tables from FHIR terminology resources
//!
//! Codes come from a CodeSystem (`concept`, nested) or a ValueSet
//! (`compose.include[].concept`, falling back to `expansion.contains`).
//! Codes the generic rule cannot handle must be covered by `exceptions`.

use crate::error::{Error, Result};
use crate::table::{CodeEntry, ValueSetTable};
use serde_json::Value;

impl ValueSetTable {
    /// Table for the implicit value set of a CodeSystem (`valueSet`, else `url`).
    pub fn from_code_system(resource: &Value, exceptions: &[CodeEntry]) -> Result<Self> {
        expect_resource_type(resource, "CodeSystem")?;
        let url = resource
            .get("valueSet")
            .or_else(|| resource.get("url"))
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("CodeSystem", "missing 'valueSet' and 'url'"))?;

        let mut codes = Vec::new();
        if let Some(concepts) = resource.get("concept").and_then(Value::as_array) {
            collect_concepts(concepts, &mut codes);
        }
        build_table(url, name_of(resource), codes, exceptions)
    }

    /// Table for a ValueSet with an enumerated compose or an expansion.
    pub fn from_value_set(resource: &Value, exceptions: &[CodeEntry]) -> Result<Self> {
        expect_resource_type(resource, "ValueSet")?;
        let url = resource
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("ValueSet", "missing 'url'"))?;

        let mut codes = Vec::new();
        let includes = resource
            .get("compose")
            .and_then(|c| c.get("include"))
            .and_then(Value::as_array);
        for include in includes.into_iter().flatten() {
            if let Some(concepts) = include.get("concept").and_then(Value::as_array) {
                collect_concepts(concepts, &mut codes);
            } else if include.get("system").is_some() {
                // A whole-system include cannot be enumerated from the ValueSet alone.
                if resource.get("expansion").is_none() {
                    return Err(invalid(
                        "ValueSet",
                        "include without 'concept' requires an expansion",
                    ));
                }
            }
        }
        if codes.is_empty() {
            if let Some(contains) = resource
                .get("expansion")
                .and_then(|e| e.get("contains"))
                .and_then(Value::as_array)
            {
                collect_contains(contains, &mut codes);
            }
        }
        build_table(url, name_of(resource), codes, exceptions)
    }
}

fn build_table(
    url: &str,
    name: Option<&str>,
    codes: Vec<String>,
    exceptions: &[CodeEntry],
) -> Result<ValueSetTable> {
    let mut builder = ValueSetTable::builder(url);
    if let Some(name) = name {
        builder = builder.name(name);
    }
    for code in codes {
        match exceptions.iter().find(|e| e.code == code) {
            Some(entry) => builder = builder.entries([entry.clone()]),
            None => builder = builder.code(code),
        }
    }
    if let Some(unused) = exceptions.iter().find(|e| !builder.has_code(&e.code)) {
        return Err(Error::UnknownCode {
            value_set: url.to_string(),
            code: unused.code.clone(),
        });
    }
    builder.build()
}

fn collect_concepts(concepts: &[Value], codes: &mut Vec<String>) {
    for concept in concepts {
        if let Some(code) = concept.get("code").and_then(Value::as_str) {
            codes.push(code.to_string());
        }
        if let Some(children) = concept.get("concept").and_then(Value::as_array) {
            collect_concepts(children, codes);
        }
    }
}

fn collect_contains(contains: &[Value], codes: &mut Vec<String>) {
    for item in contains {
        let is_abstract = item.get("abstract").and_then(Value::as_bool).unwrap_or(false);
        if let (false, Some(code)) = (is_abstract, item.get("code").and_then(Value::as_str)) {
            codes.push(code.to_string());
        }
        if let Some(children) = item.get("contains").and_then(Value::as_array) {
            collect_contains(children, codes);
        }
    }
}

fn name_of(resource: &Value) -> Option<&str> {
    resource.get("name").and_then(Value::as_str)
}

fn expect_resource_type(resource: &Value, expected: &'static str) -> Result<()> {
    match resource.get("resourceType").and_then(Value::as_str) {
        Some(found) if found == expected => Ok(()),
        Some(found) => Err(invalid(expected, &format!("resourceType is '{found}'"))),
        None => Err(invalid(expected, "missing 'resourceType'")),
    }
}

fn invalid(resource: &'static str, message: &str) -> Error {
    Error::InvalidResource {
        resource,
        message: message.to_string(),
    }
}
