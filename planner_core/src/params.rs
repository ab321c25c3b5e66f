//! Typed exercise parameters.
//!
//! Exercise types declare their parameters as name → type tag pairs
//! (`"int"`, `"float"`, `"string"`). Units carry concrete values that
//! must match those declarations.

use crate::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Key reserved inside `specific_parameters` for the completion marker
pub const STATUS_KEY: &str = "status";

/// Value stored under [`STATUS_KEY`] once a unit is done
pub const COMPLETED_MARKER: &str = "Completed";

// ============================================================================
// Kinds and values
// ============================================================================

/// Declared type of an exercise parameter
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Int,
    Float,
    #[serde(alias = "str")]
    String,
}

impl ParamKind {
    /// Wire tag used in `parameters_metadata`
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::String => "string",
        }
    }

    /// Parse a type tag as typed by a user (`int`, `float`, `string`/`str`)
    pub fn parse(tag: &str) -> Result<Self> {
        match tag.trim().to_lowercase().as_str() {
            "int" => Ok(ParamKind::Int),
            "float" => Ok(ParamKind::Float),
            "string" | "str" => Ok(ParamKind::String),
            other => Err(Error::InvalidParameter {
                name: other.to_string(),
                expected: "one of int, float, string".into(),
                reason: "unknown type tag".into(),
            }),
        }
    }

    /// Convert raw text into a value of this kind
    pub fn coerce(&self, name: &str, raw: &str) -> Result<ParamValue> {
        let raw = raw.trim();
        let invalid = |reason: String| Error::InvalidParameter {
            name: name.to_string(),
            expected: self.as_str().to_string(),
            reason,
        };

        match self {
            ParamKind::Int => raw
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|e| invalid(format!("'{}': {}", raw, e))),
            ParamKind::Float => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(ParamValue::Float(v)),
                Ok(_) => Err(invalid(format!("'{}' is not a finite number", raw))),
                Err(e) => Err(invalid(format!("'{}': {}", raw, e))),
            },
            ParamKind::String => Ok(ParamValue::Text(raw.to_string())),
        }
    }

    /// Check a supplied value against this kind
    ///
    /// Integers are widened when a float is declared; anything else must match exactly.
    pub fn check(&self, name: &str, value: &ParamValue) -> Result<ParamValue> {
        match (self, value) {
            (ParamKind::Int, ParamValue::Int(_))
            | (ParamKind::String, ParamValue::Text(_)) => Ok(value.clone()),
            (ParamKind::Float, ParamValue::Float(v)) if v.is_finite() => Ok(value.clone()),
            (ParamKind::Float, ParamValue::Int(v)) => Ok(ParamValue::Float(*v as f64)),
            _ => Err(Error::InvalidParameter {
                name: name.to_string(),
                expected: self.as_str().to_string(),
                reason: format!("got {} value {}", value.type_name(), value),
            }),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete parameter value, stored as a bare JSON scalar
///
/// `Bool` and `Null` never satisfy a declared kind; they only appear as
/// undeclared extras carried over from the data file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl ParamValue {
    /// Declared kind this value satisfies as-is, if any
    pub fn kind(&self) -> Option<ParamKind> {
        match self {
            ParamValue::Int(_) => Some(ParamKind::Int),
            ParamValue::Float(_) => Some(ParamKind::Float),
            ParamValue::Text(_) => Some(ParamKind::String),
            ParamValue::Bool(_) | ParamValue::Null => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Bool(_) => "bool",
            ParamValue::Text(_) => "string",
            ParamValue::Null => "null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Best-effort typing for undeclared values: integer, then finite float, then text
    pub fn infer(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(v) = raw.parse::<i64>() {
            return ParamValue::Int(v);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => ParamValue::Float(v),
            _ => ParamValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{:?}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

// ============================================================================
// Ordered map
// ============================================================================

/// String-keyed map that keeps insertion order, serialized as a JSON object
#[derive(Clone, Debug, PartialEq)]
pub struct ParamMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for ParamMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> ParamMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing in place if the key is already present
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for ParamMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParamMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for ParamMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct ParamMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for ParamMapVisitor<V> {
    type Value = ParamMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of parameters")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut map = ParamMap::new();
        while let Some((k, v)) = access.next_entry::<String, V>()? {
            map.insert(k, v);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for ParamMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ParamMapVisitor(PhantomData))
    }
}

// ============================================================================
// Parameter declarations
// ============================================================================

/// Parse a declaration such as `"reps:int, distance_m:float"`
///
/// Blank input yields no parameters. Order of declaration is kept.
pub fn parse_parameter_spec(input: &str) -> Result<ParamMap<ParamKind>> {
    let mut spec = ParamMap::new();

    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, tag) = match entry.split_once(':') {
            Some((name, tag)) if !tag.contains(':') => (name.trim(), tag.trim()),
            _ => {
                return Err(Error::Validation(format!(
                    "Invalid parameter format '{}'. Use 'key:type, key2:type2'.",
                    entry
                )))
            }
        };

        if name.is_empty() {
            return Err(Error::Validation(format!(
                "Parameter name missing in '{}'",
                entry
            )));
        }
        if name == STATUS_KEY {
            return Err(Error::Validation(format!(
                "'{}' is reserved and cannot be declared as a parameter",
                STATUS_KEY
            )));
        }
        let kind = ParamKind::parse(tag)?;
        if spec.insert(name, kind).is_some() {
            return Err(Error::Validation(format!(
                "Parameter '{}' declared more than once",
                name
            )));
        }
    }

    Ok(spec)
}

/// Human-readable list of declared parameters, e.g. `distance_m (float), repetitions (int)`
pub fn describe_parameters(spec: &ParamMap<ParamKind>) -> String {
    spec.iter()
        .map(|(name, kind)| format!("{} ({})", name, kind))
        .collect::<Vec<_>>()
        .join(", ")
}
