//! Leaf-level schema for usage records.
//!
//! Every numeric field has one declared default and one coercion rule.
//! Coercion never fails: a value that cannot be used becomes the default
//! and, where the field asks for it, produces a [`Problem`] for the caller
//! to record as a data-quality note.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Key holding the rate-tier label on a flat record.
pub const SMS_COST_KEY: &str = "sms_cost";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafField {
    TotalCost,
    Delivered,
    Failed,
    Other,
}

impl LeafField {
    pub const ALL: [LeafField; 4] = [
        LeafField::TotalCost,
        LeafField::Delivered,
        LeafField::Failed,
        LeafField::Other,
    ];

    /// Key as it appears in the source payload.
    pub fn key(self) -> &'static str {
        match self {
            LeafField::TotalCost => "totalcost",
            LeafField::Delivered => "delivered",
            LeafField::Failed => "failed",
            LeafField::Other => "other",
        }
    }

    /// Whether an absent or null value is worth a note.
    /// Only `delivered` is validated that strictly.
    fn notes_missing(self) -> bool {
        matches!(self, LeafField::Delivered)
    }
}

impl fmt::Display for LeafField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// True if `key` names a leaf field (or the tier label) of a flat record.
pub fn is_leaf_key(key: &str) -> bool {
    key == SMS_COST_KEY || LeafField::ALL.iter().any(|f| f.key() == key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    Missing,
    NotNumeric,
    Negative,
    Fractional,
    TooLarge,
    NotAMapping,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Problem::Missing => "missing",
            Problem::NotNumeric => "not numeric",
            Problem::Negative => "negative",
            Problem::Fractional => "fractional",
            Problem::TooLarge => "too large",
            Problem::NotAMapping => "not an object",
        };
        f.write_str(s)
    }
}

/// A coerced value plus the problem found on the way, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coerced<T> {
    pub value: T,
    pub problem: Option<Problem>,
}

impl<T> Coerced<T> {
    fn ok(value: T) -> Self {
        Self {
            value,
            problem: None,
        }
    }

    fn defaulted(value: T, problem: Option<Problem>) -> Self {
        Self { value, problem }
    }
}

/// Numeric reading of a JSON value: numbers as-is, strings parsed after
/// trimming. Everything else is not numeric.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Coerce a real-valued field (`totalcost`). Default 0.0.
pub fn coerce_real(field: LeafField, raw: Option<&Value>) -> Coerced<f64> {
    let raw = match raw {
        None | Some(Value::Null) => {
            let problem = field.notes_missing().then_some(Problem::Missing);
            return Coerced::defaulted(0.0, problem);
        }
        Some(v) => v,
    };
    match numeric(raw) {
        Some(v) if !v.is_finite() => Coerced::defaulted(0.0, Some(Problem::NotNumeric)),
        Some(v) if v < 0.0 => Coerced::defaulted(0.0, Some(Problem::Negative)),
        Some(v) => Coerced::ok(v),
        None => Coerced::defaulted(0.0, Some(Problem::NotNumeric)),
    }
}

/// Smallest float that no longer fits in a `u64` (2^64).
const COUNT_LIMIT: f64 = u64::MAX as f64;

/// Coerce a count field (`delivered`, `failed`, `other`). Default 0.
/// Fractional counts are truncated toward zero; counts past `u64::MAX`
/// default to 0.
pub fn coerce_count(field: LeafField, raw: Option<&Value>) -> Coerced<u64> {
    let raw = match raw {
        None | Some(Value::Null) => {
            let problem = field.notes_missing().then_some(Problem::Missing);
            return Coerced::defaulted(0, problem);
        }
        Some(v) => v,
    };
    if let Some(n) = raw.as_u64() {
        return Coerced::ok(n);
    }
    match numeric(raw) {
        Some(v) if !v.is_finite() => Coerced::defaulted(0, Some(Problem::NotNumeric)),
        Some(v) if v < 0.0 => Coerced::defaulted(0, Some(Problem::Negative)),
        Some(v) if v >= COUNT_LIMIT => Coerced::defaulted(0, Some(Problem::TooLarge)),
        Some(v) if v.fract() != 0.0 => {
            Coerced::defaulted(v.trunc() as u64, Some(Problem::Fractional))
        }
        Some(v) => Coerced::ok(v as u64),
        None => Coerced::defaulted(0, Some(Problem::NotNumeric)),
    }
}

/// Rate-tier label carried by a flat record, if any.
pub fn tier_label(record: &Map<String, Value>) -> Option<String> {
    match record.get(SMS_COST_KEY)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Name of a JSON value's kind, for messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Non-fatal record that a leaf value failed validation and was defaulted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityNote {
    pub company: Option<String>,
    pub country: Option<String>,
    pub rate_tier: Option<String>,
    pub field: Option<LeafField>,
    pub value: Option<Value>,
    pub problem: Problem,
}

impl fmt::Display for DataQualityNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<&str> = [&self.company, &self.country, &self.rate_tier]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        f.write_str(&path.join("/"))?;
        if let Some(field) = self.field {
            write!(f, ".{field}")?;
        }
        write!(f, ": {}", self.problem)?;
        if let Some(value) = &self.value {
            write!(f, " ({value})")?;
        }
        Ok(())
    }
}
