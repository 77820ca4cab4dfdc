use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::schema::{FieldKind, FieldRule, TopicSchema};

/// Error from the schema registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Topic already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Duplicate field name '{field}' in topic '{topic}'")]
    DuplicateField { topic: String, field: String },
}

/// Validation issue for one field of a candidate payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field '{}': {}", self.field, self.message)
    }
}

/// Registry of topic schemas. Used to validate candidate payloads before they
/// cross the shared-store boundary in either direction.
///
/// Validation is pure and synchronous; it never mutates the registry and
/// always reports failure as a list of field-level issues rather than
/// panicking.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, TopicSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Register a new topic. Returns an error if the topic already exists or
    /// the schema declares the same field twice.
    pub fn register(&mut self, schema: TopicSchema) -> Result<(), RegistryError> {
        if self.schemas.contains_key(&schema.topic) {
            return Err(RegistryError::AlreadyRegistered(schema.topic.clone()));
        }
        let mut seen = HashSet::new();
        for field in &schema.fields {
            if !seen.insert(&field.name) {
                return Err(RegistryError::DuplicateField {
                    topic: schema.topic.clone(),
                    field: field.name.clone(),
                });
            }
        }
        self.schemas.insert(schema.topic.clone(), schema);
        Ok(())
    }

    /// Get a schema by topic name.
    pub fn get(&self, topic: &str) -> Option<&TopicSchema> {
        self.schemas.get(topic)
    }

    /// Whether a topic is registered.
    pub fn contains(&self, topic: &str) -> bool {
        self.schemas.contains_key(topic)
    }

    /// List all registered schemas.
    pub fn list(&self) -> Vec<&TopicSchema> {
        self.schemas.values().collect()
    }

    /// Validate a candidate payload against its topic's schema.
    /// Returns `Ok(())` if valid, or the list of field-level issues.
    ///
    /// Fields not covered by a rule are ignored; an unknown topic is itself
    /// an issue.
    pub fn validate(&self, topic: &str, candidate: &Value) -> Result<(), Vec<ValidationIssue>> {
        let schema = match self.schemas.get(topic) {
            Some(s) => s,
            None => {
                return Err(vec![ValidationIssue {
                    field: "topic".into(),
                    message: format!("unknown topic: '{}'", topic),
                }]);
            }
        };

        let object = match candidate.as_object() {
            Some(o) => o,
            None => {
                return Err(vec![ValidationIssue {
                    field: "payload".into(),
                    message: format!("expected object, got {}", value_kind_name(candidate)),
                }]);
            }
        };

        let mut issues = Vec::new();
        for rule in &schema.fields {
            match object.get(&rule.name) {
                None => {
                    if rule.required {
                        issues.push(ValidationIssue {
                            field: rule.name.clone(),
                            message: "required field missing".into(),
                        });
                    }
                }
                Some(value) => {
                    if let Some(issue) = check_field(rule, value) {
                        issues.push(issue);
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

fn check_field(rule: &FieldRule, value: &Value) -> Option<ValidationIssue> {
    if value.is_null() {
        if rule.nullable {
            return None;
        }
        return Some(ValidationIssue {
            field: rule.name.clone(),
            message: "null is not permitted".into(),
        });
    }

    if !kind_matches(rule.kind, value) {
        return Some(ValidationIssue {
            field: rule.name.clone(),
            message: format!(
                "expected {:?}, got {}",
                rule.kind,
                value_kind_name(value)
            ),
        });
    }

    if let (Some(min), Value::String(s)) = (rule.min_len, value) {
        if s.chars().count() < min {
            return Some(ValidationIssue {
                field: rule.name.clone(),
                message: format!("must be at least {} characters", min),
            });
        }
    }

    None
}

/// Check if a Value matches the expected FieldKind.
fn kind_matches(expected: FieldKind, value: &Value) -> bool {
    match (expected, value) {
        (FieldKind::String, Value::String(_)) => true,
        (FieldKind::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (FieldKind::Float, Value::Number(_)) => true,
        (FieldKind::Bool, Value::Bool(_)) => true,
        (FieldKind::Array, Value::Array(_)) => true,
        (FieldKind::Object, Value::Object(_)) => true,
        _ => false,
    }
}

/// Human-readable name for a Value variant.
fn value_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
