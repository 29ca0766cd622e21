//! Tagged values stored in component interface and attribute maps.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single interface or attribute value after normalization.
///
/// Serialized untagged so a canonical component reads like the catalog JSON
/// it came from: strings, numbers, booleans and arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Num(f64),
    Str(String),
    NumList(Vec<f64>),
    StrSet(BTreeSet<String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_num_list(&self) -> Option<&[f64]> {
        match self {
            Self::NumList(v) => Some(v),
            _ => None,
        }
    }

    /// Members of a set value. A scalar string is treated as a one-member set.
    pub fn members(&self) -> Vec<&str> {
        match self {
            Self::StrSet(set) => set.iter().map(String::as_str).collect(),
            Self::Str(s) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Num(n) => write!(f, "{}", format_number(*n)),
            Self::Str(s) => f.write_str(s),
            Self::NumList(v) => {
                let parts: Vec<String> = v.iter().map(|n| format_number(*n)).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::StrSet(set) => {
                let parts: Vec<&str> = set.iter().map(String::as_str).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

/// Render a number without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Kind a known key's value must have once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Categorical standard token, e.g. `BSA_Threaded_68mm`.
    Standard,
    Number,
    Flag,
    /// Set of standard tokens.
    StandardSet,
    /// Ordered list of positive integers (tooth counts).
    TeethList,
}

/// Map split into a closed set of known keys and a bucket for everything else.
///
/// Rules only ever read the known half. The unknown half is carried so a
/// component survives a round trip without losing ingestion data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, FieldValue>",
    into = "BTreeMap<String, FieldValue>",
    bound = "K: FieldKey"
)]
pub struct FieldMap<K: FieldKey> {
    known: BTreeMap<K, FieldValue>,
    unknown: BTreeMap<String, FieldValue>,
}

/// A closed vocabulary of map keys.
pub trait FieldKey: Copy + Ord + fmt::Debug + 'static {
    const ALL: &'static [Self];

    /// Canonical key name as written in catalog records.
    fn as_str(self) -> &'static str;

    /// Value kind the normalizer coerces to.
    fn kind(self) -> ValueKind;

    /// Accepted spellings in priority order. The canonical name comes first.
    fn aliases(self) -> &'static [&'static str];

    fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl<K: FieldKey> Default for FieldMap<K> {
    fn default() -> Self {
        Self {
            known: BTreeMap::new(),
            unknown: BTreeMap::new(),
        }
    }
}

impl<K: FieldKey> FieldMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: K) -> Option<&FieldValue> {
        self.known.get(&key)
    }

    pub fn insert(&mut self, key: K, value: FieldValue) {
        self.known.insert(key, value);
    }

    /// Builder form of [`FieldMap::insert`].
    pub fn with(mut self, key: K, value: FieldValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert_unknown(&mut self, key: String, value: FieldValue) {
        self.unknown.insert(key, value);
    }

    pub fn unknown(&self) -> &BTreeMap<String, FieldValue> {
        &self.unknown
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.unknown.is_empty()
    }

    pub fn len(&self) -> usize {
        self.known.len() + self.unknown.len()
    }

    pub fn str(&self, key: K) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn num(&self, key: K) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_f64)
    }

    pub fn flag(&self, key: K) -> Option<bool> {
        self.get(key).and_then(FieldValue::as_bool)
    }

    pub fn num_list(&self, key: K) -> Option<&[f64]> {
        self.get(key).and_then(FieldValue::as_num_list)
    }

    pub fn known(&self) -> impl Iterator<Item = (K, &FieldValue)> {
        self.known.iter().map(|(k, v)| (*k, v))
    }
}

impl<K: FieldKey> From<BTreeMap<String, FieldValue>> for FieldMap<K> {
    fn from(raw: BTreeMap<String, FieldValue>) -> Self {
        let mut map = Self::default();
        for (name, value) in raw {
            match K::from_canonical(&name) {
                Some(key) => map.insert(key, value),
                None => map.insert_unknown(name, value),
            }
        }
        map
    }
}

impl<K: FieldKey> From<FieldMap<K>> for BTreeMap<String, FieldValue> {
    fn from(map: FieldMap<K>) -> Self {
        let mut out = map.unknown;
        for (key, value) in map.known {
            out.insert(key.as_str().to_string(), value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(29.0), "29");
        assert_eq!(format_number(27.5), "27.5");
    }

    #[test]
    fn members_treats_scalar_as_singleton() {
        let v = FieldValue::Str("XDR".to_string());
        assert_eq!(v.members(), vec!["XDR"]);
        assert!(FieldValue::Num(1.0).members().is_empty());
    }

    #[test]
    fn display_renders_lists() {
        let v = FieldValue::NumList(vec![10.0, 12.0, 14.0]);
        assert_eq!(v.to_string(), "[10, 12, 14]");
    }
}
