//! Payload schema declarations

use crate::ValidationError;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// ISO 4217 codes accepted by the built-in payment schemas
pub const CURRENCY_CODES: &[&str] = &["BRL", "USD", "EUR", "GBP", "ARS", "MXN", "CLP", "COP"];

/// Lifecycle statuses accepted by the built-in payment schemas
pub const PAYMENT_STATUSES: &[&str] = &["pending", "confirmed", "failed", "canceled", "refunded"];

/// Type declaration for a single payload field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Any JSON string
    String,

    /// Whole number in minor currency units
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
    },

    /// JSON boolean
    Boolean,

    /// RFC 3339 timestamp string
    Timestamp,

    /// String restricted to a fixed set of values
    Enum { values: Vec<String> },

    /// Nested JSON object (contents not checked)
    Object,
}

impl FieldKind {
    /// Integer field with a lower bound
    pub fn integer_min(min: i64) -> Self {
        FieldKind::Integer { min: Some(min) }
    }

    /// Enumerated string field
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldKind::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Human-readable description used in mismatch reports
    pub fn expected(&self) -> String {
        match self {
            FieldKind::String => "string".to_string(),
            FieldKind::Integer { min: None } => "integer in minor units".to_string(),
            FieldKind::Integer { min: Some(min) } => {
                format!("integer in minor units >= {}", min)
            }
            FieldKind::Boolean => "boolean".to_string(),
            FieldKind::Timestamp => "RFC 3339 timestamp".to_string(),
            FieldKind::Enum { values } => format!("one of [{}]", values.join(", ")),
            FieldKind::Object => "object".to_string(),
        }
    }

    /// Check a present value, returning a description of it on mismatch
    fn check(&self, value: &Value) -> Result<(), String> {
        let ok = match (self, value) {
            (FieldKind::String, Value::String(_)) => true,
            (FieldKind::Integer { min }, Value::Number(n)) => match n.as_i64() {
                Some(amount) => min.is_none_or(|min| amount >= min),
                None => false,
            },
            (FieldKind::Boolean, Value::Bool(_)) => true,
            (FieldKind::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(s).is_ok(),
            (FieldKind::Enum { values }, Value::String(s)) => values.iter().any(|v| v == s),
            (FieldKind::Object, Value::Object(_)) => true,
            _ => false,
        };

        if ok { Ok(()) } else { Err(describe(value)) }
    }
}

/// Declaration of one payload field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// JSON key
    pub name: String,

    /// Expected type and domain
    #[serde(flatten)]
    pub kind: FieldKind,

    /// Whether the field must be present
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// Ordered set of field declarations for one event type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required field
    pub fn required(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            required: true,
        });
        self
    }

    /// Declare an optional field
    pub fn optional(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            required: false,
        });
        self
    }

    /// Look up a field declaration
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check whether a field is declared
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Schema for incoming Pix transfers
    pub fn cash_in() -> Self {
        Self::payment("cashin").optional("payer", FieldKind::Object)
    }

    /// Schema for outgoing Pix transfers
    pub fn cash_out() -> Self {
        Self::payment("cashout").optional("payee", FieldKind::Object)
    }

    fn payment(type_tag: &str) -> Self {
        Self::new()
            .required("id", FieldKind::String)
            .required("type", FieldKind::one_of([type_tag]))
            .required("amount", FieldKind::integer_min(1))
            .required("currency", FieldKind::one_of(CURRENCY_CODES.iter().copied()))
            .required("status", FieldKind::one_of(PAYMENT_STATUSES.iter().copied()))
            .required("createdAt", FieldKind::Timestamp)
            .optional("endToEndId", FieldKind::String)
            .optional("description", FieldKind::String)
    }

    /// Check an object against every declaration, in declaration order
    pub(crate) fn check(&self, object: &Map<String, Value>) -> Result<(), ValidationError> {
        for spec in &self.fields {
            match object.get(&spec.name) {
                None | Some(Value::Null) if !spec.required => continue,
                None => {
                    return Err(ValidationError::mismatch(
                        &spec.name,
                        spec.kind.expected(),
                        "missing",
                    ));
                }
                Some(value) => {
                    if let Err(actual) = spec.kind.check(value) {
                        return Err(ValidationError::mismatch(
                            &spec.name,
                            spec.kind.expected(),
                            actual,
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Describe a JSON value for mismatch reports
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) if n.is_i64() => format!("integer {}", n),
        Value::Number(n) if n.is_u64() => format!("integer {} (out of range)", n),
        Value::Number(n) => format!("fractional number {}", n),
        Value::String(s) => format!("string {:?}", truncate(s, 64)),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    }
}
