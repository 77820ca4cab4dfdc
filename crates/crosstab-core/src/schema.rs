use serde::{Deserialize, Serialize};

/// A validation rule for one field of a topic payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    /// The key must be present in the payload.
    pub required: bool,
    /// JSON `null` is accepted in place of a value.
    pub nullable: bool,
    /// Minimum length in characters, for `String` fields.
    pub min_len: Option<usize>,
}

impl FieldRule {
    /// New rule for `kind`. Fields are required and non-nullable unless
    /// relaxed through the builder methods.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            nullable: false,
            min_len: None,
        }
    }

    /// Shorthand for a string-valued field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    /// Allow the key to be absent.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Allow `null` in place of a value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Require at least `len` characters when a string value is present.
    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }
}

/// Value shapes a field rule can certify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
    Array,
    Object,
}

/// Validation rule set for one topic, certifying the payload shape that
/// travels under the topic's store key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSchema {
    pub topic: String,
    pub version: String,
    pub fields: Vec<FieldRule>,
}

impl TopicSchema {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            version: "1.0.0".to_string(),
            fields: Vec::new(),
        }
    }

    /// Append a field rule.
    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }
}
