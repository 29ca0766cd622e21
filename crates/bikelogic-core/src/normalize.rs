//! Interface normalizer.
//!
//! Turns raw catalog records from any ingestion batch into canonical
//! [`Component`]s. Payloads may be missing, double-encoded as JSON strings, or
//! spelled with batch-specific key names; every such variant resolves to the
//! same canonical maps. A malformed payload degrades to an empty map so one
//! bad record never blocks the rest of a page.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::value::format_number;
use crate::domain::{Category, Component, FieldKey, FieldMap, FieldValue, ValueKind};

/// Deepest level of JSON-in-a-string nesting that gets unwrapped.
const MAX_ENCODING_DEPTH: usize = 3;

/// A catalog record as delivered by ingestion, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawComponent {
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub interfaces: Option<Value>,
    #[serde(default)]
    pub attributes: Option<Value>,
}

impl From<&Component> for RawComponent {
    fn from(c: &Component) -> Self {
        let interfaces: BTreeMap<String, FieldValue> = c.interfaces.clone().into();
        let attributes: BTreeMap<String, FieldValue> = c.attributes.clone().into();
        Self {
            id: c.id.clone(),
            category: c.category.to_string(),
            name: c.name.clone(),
            interfaces: serde_json::to_value(interfaces).ok(),
            attributes: serde_json::to_value(attributes).ok(),
        }
    }
}

/// Normalize one raw record. Never fails.
pub fn normalize(raw: &RawComponent) -> Component {
    Component {
        id: raw.id.trim().to_string(),
        category: Category::parse(&raw.category),
        name: raw.name.trim().to_string(),
        interfaces: normalize_map(raw.interfaces.as_ref(), &raw.id, "interfaces"),
        attributes: normalize_map(raw.attributes.as_ref(), &raw.id, "attributes"),
    }
}

/// Canonical spelling of a standard token: trimmed, inner whitespace as `_`.
pub fn canonical_token(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Comparison key for a standard token. Two tokens name the same standard
/// iff their comparison keys are equal.
pub fn standard_key(s: &str) -> String {
    canonical_token(s).to_ascii_lowercase()
}

fn canonical_key_name(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

fn normalize_map<K: FieldKey>(payload: Option<&Value>, id: &str, field: &str) -> FieldMap<K> {
    let object = decode_payload(payload, id, field);
    let mut map = FieldMap::new();
    let mut consumed: HashSet<&str> = HashSet::new();

    for &key in K::ALL {
        let mut resolved = false;
        for &alias in key.aliases() {
            consumed.insert(alias);
            if resolved {
                continue;
            }
            let Some(value) = object.get(alias) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            match coerce(value, key.kind()) {
                Some(v) => {
                    map.insert(key, v);
                    resolved = true;
                }
                None => debug!(
                    id = %id,
                    field = %field,
                    key = %alias,
                    "value does not fit declared kind; trying next alias"
                ),
            }
        }
    }

    for (name, value) in &object {
        if consumed.contains(name.as_str()) {
            continue;
        }
        match infer(value) {
            Some(v) => map.insert_unknown(name.clone(), v),
            None => debug!(id = %id, field = %field, key = %name, "dropping unrepresentable value"),
        }
    }

    map
}

/// Decode a payload into an object with canonical key names.
fn decode_payload(payload: Option<&Value>, id: &str, field: &str) -> BTreeMap<String, Value> {
    let mut current = match payload {
        None | Some(Value::Null) => return BTreeMap::new(),
        Some(v) => v.clone(),
    };

    for _ in 0..MAX_ENCODING_DEPTH {
        let Value::String(encoded) = &current else {
            break;
        };
        current = match serde_json::from_str::<Value>(encoded) {
            Ok(inner) => inner,
            Err(e) => {
                warn!(id = %id, field = %field, error = %e, "malformed encoded payload; using empty map");
                return BTreeMap::new();
            }
        };
    }

    match current {
        Value::Object(obj) => {
            let mut out = BTreeMap::new();
            for (k, v) in obj {
                let name = canonical_key_name(&k);
                // An already canonical spelling beats drifted ones.
                if name == k {
                    out.insert(name, v);
                } else {
                    out.entry(name).or_insert(v);
                }
            }
            out
        }
        Value::Null => BTreeMap::new(),
        other => {
            warn!(
                id = %id,
                field = %field,
                found = %json_kind(&other),
                "payload is not a map; using empty map"
            );
            BTreeMap::new()
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce(value: &Value, kind: ValueKind) -> Option<FieldValue> {
    match kind {
        ValueKind::Standard => scalar_token(value).map(FieldValue::Str),
        ValueKind::Number => number(value).map(FieldValue::Num),
        ValueKind::Flag => flag(value).map(FieldValue::Bool),
        ValueKind::StandardSet => {
            let set = token_set(value);
            (!set.is_empty()).then_some(FieldValue::StrSet(set))
        }
        ValueKind::TeethList => {
            let teeth = teeth_list(value);
            (!teeth.is_empty()).then_some(FieldValue::NumList(teeth))
        }
    }
}

fn scalar_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(canonical_token(s)).filter(|t| !t.is_empty()),
        Value::Number(n) => n.as_f64().map(format_number),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Parse numbers the way ingestion batches write them: `"250"`, `"250 g"`,
/// `"$1,299.00"`.
fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace())
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok()
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 0.0 => Some(false),
            Some(x) if x == 1.0 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn token_set(value: &Value) -> BTreeSet<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_token).collect(),
        Value::String(s) if s.trim_start().starts_with('[') => serde_json::from_str::<Value>(s)
            .ok()
            .filter(Value::is_array)
            .map(|inner| token_set(&inner))
            .unwrap_or_default(),
        Value::String(s) => s
            .split(',')
            .map(canonical_token)
            .filter(|t| !t.is_empty())
            .collect(),
        Value::Number(_) => scalar_token(value).into_iter().collect(),
        _ => BTreeSet::new(),
    }
}

fn teeth_list(value: &Value) -> Vec<f64> {
    let raw: Vec<f64> = match value {
        Value::Array(items) => items.iter().filter_map(number).collect(),
        Value::String(s) if s.trim_start().starts_with('[') => serde_json::from_str::<Value>(s)
            .ok()
            .filter(Value::is_array)
            .map(|inner| teeth_list(&inner))
            .unwrap_or_default(),
        Value::String(s) => s
            .split(|c: char| c == ',' || c == '-' || c == '/' || c.is_whitespace())
            .filter_map(parse_number)
            .collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(f64::round)
        .filter(|t| *t > 0.0)
        .collect()
}

fn infer(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Bool(b) => Some(FieldValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(FieldValue::Num),
        Value::String(s) => Some(FieldValue::Str(s.clone())),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) if items.iter().all(Value::is_string) => Some(FieldValue::StrSet(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        )),
        Value::Array(items) if items.iter().all(Value::is_number) => Some(FieldValue::NumList(
            items.iter().filter_map(Value::as_f64).collect(),
        )),
        _ => None,
    }
}
