use std::fmt;

/// FHIR-style location of the node being converted (`Observation.component[1].value[x]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    text: String,
    depth: usize,
}

impl ElementPath {
    pub fn root(name: &str) -> Self {
        Self {
            text: name.to_string(),
            depth: 0,
        }
    }

    /// Child field; each field step counts as one nesting level.
    pub fn field(&self, name: &str) -> Self {
        Self {
            text: format!("{}.{}", self.text, name),
            depth: self.depth + 1,
        }
    }

    /// A `[x]` field.
    pub fn choice(&self, name: &str) -> Self {
        self.field(&format!("{name}[x]"))
    }

    pub fn index(&self, index: usize) -> Self {
        Self {
            text: format!("{}[{}]", self.text, index),
            depth: self.depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
