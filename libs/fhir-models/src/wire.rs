//! Wire (union/builder) representation
//!
//! Messages are assembled through builders and frozen on `build()`. A field is
//! present exactly when the producer set it: the field map doubles as the
//! presence bit, so a branch holding `false` or an empty wrapper is still set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar wire value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireScalar {
    Bool(bool),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    String(String),
    Bytes(Vec<u8>),
    /// Upper-snake enum identifier (`ENTERED_IN_ERROR`).
    Enum(String),
}

/// One set field of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireField {
    Scalar(WireScalar),
    Message(WireMessage),
    Union(WireUnion),
    Repeated(Vec<WireMessage>),
}

/// An immutable wire message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, WireField>,
}

impl WireMessage {
    pub fn builder(type_name: impl Into<String>) -> WireMessageBuilder {
        WireMessageBuilder {
            message: WireMessage {
                type_name: type_name.into(),
                fields: BTreeMap::new(),
            },
        }
    }

    /// The message with no field set.
    pub fn default_instance(type_name: impl Into<String>) -> Self {
        Self::builder(type_name).build()
    }

    /// Structural probe: no field set. Not a presence test for the message
    /// itself; an explicitly set empty message is still set.
    pub fn is_default_instance(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<&WireField> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &WireField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn scalar(&self, name: &str) -> Option<&WireScalar> {
        match self.fields.get(name) {
            Some(WireField::Scalar(s)) => Some(s),
            _ => None,
        }
    }

    pub fn message(&self, name: &str) -> Option<&WireMessage> {
        match self.fields.get(name) {
            Some(WireField::Message(m)) => Some(m),
            _ => None,
        }
    }

    pub fn union(&self, name: &str) -> Option<&WireUnion> {
        match self.fields.get(name) {
            Some(WireField::Union(u)) => Some(u),
            _ => None,
        }
    }

    /// Items of a repeated field; empty when unset.
    pub fn repeated(&self, name: &str) -> &[WireMessage] {
        match self.fields.get(name) {
            Some(WireField::Repeated(items)) => items,
            _ => &[],
        }
    }

    /// Start a builder pre-populated with this message's fields.
    pub fn to_builder(&self) -> WireMessageBuilder {
        WireMessageBuilder {
            message: self.clone(),
        }
    }
}

/// Incremental builder for [`WireMessage`].
#[derive(Debug, Clone)]
pub struct WireMessageBuilder {
    message: WireMessage,
}

impl WireMessageBuilder {
    pub fn type_name(&self) -> &str {
        &self.message.type_name
    }

    pub fn set_scalar(&mut self, name: impl Into<String>, value: WireScalar) -> &mut Self {
        self.message
            .fields
            .insert(name.into(), WireField::Scalar(value));
        self
    }

    pub fn set_message(&mut self, name: impl Into<String>, value: WireMessage) -> &mut Self {
        self.message
            .fields
            .insert(name.into(), WireField::Message(value));
        self
    }

    pub fn set_union(&mut self, name: impl Into<String>, value: WireUnion) -> &mut Self {
        self.message
            .fields
            .insert(name.into(), WireField::Union(value));
        self
    }

    /// Append to a repeated field.
    pub fn add_repeated(&mut self, name: impl Into<String>, value: WireMessage) -> &mut Self {
        let slot = self
            .message
            .fields
            .entry(name.into())
            .or_insert_with(|| WireField::Repeated(Vec::new()));
        match slot {
            WireField::Repeated(items) => items.push(value),
            other => *other = WireField::Repeated(vec![value]),
        }
        self
    }

    pub fn clear(&mut self, name: &str) -> &mut Self {
        self.message.fields.remove(name);
        self
    }

    /// Builder-style [`WireMessageBuilder::set_scalar`].
    pub fn scalar(mut self, name: impl Into<String>, value: WireScalar) -> Self {
        self.set_scalar(name, value);
        self
    }

    /// Builder-style [`WireMessageBuilder::set_message`].
    pub fn message(mut self, name: impl Into<String>, value: WireMessage) -> Self {
        self.set_message(name, value);
        self
    }

    /// Builder-style [`WireMessageBuilder::set_union`].
    pub fn union(mut self, name: impl Into<String>, value: WireUnion) -> Self {
        self.set_union(name, value);
        self
    }

    /// Builder-style [`WireMessageBuilder::add_repeated`].
    pub fn repeated(mut self, name: impl Into<String>, value: WireMessage) -> Self {
        self.add_repeated(name, value);
        self
    }

    pub fn build(self) -> WireMessage {
        self.message
    }
}

/// A `oneof`-style union with an explicit presence entry per set branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUnion {
    pub type_name: String,
    branches: BTreeMap<String, WireMessage>,
}

impl WireUnion {
    pub fn builder(type_name: impl Into<String>) -> WireUnionBuilder {
        WireUnionBuilder {
            union: WireUnion {
                type_name: type_name.into(),
                branches: BTreeMap::new(),
            },
        }
    }

    /// Presence bit of a branch.
    pub fn is_set(&self, branch: &str) -> bool {
        self.branches.contains_key(branch)
    }

    pub fn branch(&self, branch: &str) -> Option<&WireMessage> {
        self.branches.get(branch)
    }

    pub fn set_branches(&self) -> impl Iterator<Item = &str> {
        self.branches.keys().map(String::as_str)
    }

    pub fn set_count(&self) -> usize {
        self.branches.len()
    }
}

/// Builder for [`WireUnion`].
///
/// Setting a second branch keeps the first; a well-behaved producer sets one.
#[derive(Debug, Clone)]
pub struct WireUnionBuilder {
    union: WireUnion,
}

impl WireUnionBuilder {
    pub fn set_branch(&mut self, branch: impl Into<String>, value: WireMessage) -> &mut Self {
        self.union.branches.insert(branch.into(), value);
        self
    }

    /// Builder-style [`WireUnionBuilder::set_branch`].
    pub fn branch(mut self, branch: impl Into<String>, value: WireMessage) -> Self {
        self.set_branch(branch, value);
        self
    }

    pub fn build(self) -> WireUnion {
        self.union
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_valued_branch_is_set() {
        let flag = WireMessage::builder("Boolean")
            .scalar("value", WireScalar::Bool(false))
            .build();
        let empty_period = WireMessage::default_instance("Period");

        let union = WireUnion::builder("Patient.DeceasedX")
            .branch("boolean", flag)
            .build();
        assert!(union.is_set("boolean"));
        assert!(!union.is_set("date_time"));

        let union = WireUnion::builder("Condition.OnsetX")
            .branch("period", empty_period)
            .build();
        assert!(union.is_set("period"));
        assert!(union.branch("period").map(WireMessage::is_default_instance).unwrap_or(false));
    }

    #[test]
    fn test_repeated_preserves_order() {
        let item = |v: &str| {
            WireMessage::builder("String")
                .scalar("value", WireScalar::String(v.into()))
                .build()
        };
        let name = WireMessage::builder("HumanName")
            .repeated("given", item("a"))
            .repeated("given", item("b"))
            .repeated("given", item("a"))
            .build();

        let values: Vec<_> = name
            .repeated("given")
            .iter()
            .filter_map(|m| m.scalar("value").cloned())
            .collect();
        assert_eq!(
            values,
            vec![
                WireScalar::String("a".into()),
                WireScalar::String("b".into()),
                WireScalar::String("a".into()),
            ]
        );
        assert!(name.repeated("family").is_empty());
    }

    #[test]
    fn test_to_builder_extends_copy() {
        let original = WireMessage::builder("Coding")
            .scalar("code", WireScalar::String("x".into()))
            .build();
        let extended = original
            .to_builder()
            .scalar("display", WireScalar::String("X".into()))
            .build();
        assert!(!original.has("display"));
        assert!(extended.has("display"));
        assert!(extended.has("code"));
    }
}
