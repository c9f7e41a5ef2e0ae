//! Structured evidence payloads.
//!
//! `EvidenceValue` is the recursive value type carried in an entry's `data`
//! and `metadata` fields. Maps are `BTreeMap`s, so a value always serializes
//! with its keys in sorted order and two logically equal payloads produce
//! identical bytes no matter how they were built.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;

/// A JSON-shaped value with a canonical, key-sorted serialization.
///
/// Serialized untagged, so the wire form is plain JSON:
/// `{"deficiencies": 2, "passed": false}`. Integers that fit in `i64` read
/// back as `Integer`, every other number as `Float`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum EvidenceValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<EvidenceValue>),
    Map(BTreeMap<String, EvidenceValue>),
}

impl EvidenceValue {
    /// An empty map, the payload used when a caller has nothing to attach.
    pub fn empty_map() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Look up `key` when this value is a map.
    pub fn get(&self, key: &str) -> Option<&EvidenceValue> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Borrow the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

struct EvidenceValueVisitor;

impl<'de> Visitor<'de> for EvidenceValueVisitor {
    type Value = EvidenceValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(EvidenceValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(EvidenceValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        EvidenceValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(EvidenceValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(EvidenceValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => EvidenceValue::Integer(i),
            Err(_) => EvidenceValue::from(v as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(EvidenceValue::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(EvidenceValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(EvidenceValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(EvidenceValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut fields = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, EvidenceValue>()? {
            fields.insert(key, value);
        }
        Ok(EvidenceValue::Map(fields))
    }
}

impl<'de> Deserialize<'de> for EvidenceValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EvidenceValueVisitor)
    }
}

impl From<bool> for EvidenceValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for EvidenceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for EvidenceValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for EvidenceValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for EvidenceValue {
    /// NaN and the infinities have no JSON form; they become `Null` so the
    /// stored value and its exported form always hash the same.
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self::Float(value)
        } else {
            Self::Null
        }
    }
}

impl From<&str> for EvidenceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EvidenceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<EvidenceValue>> From<Vec<T>> for EvidenceValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, EvidenceValue>> for EvidenceValue {
    fn from(map: BTreeMap<String, EvidenceValue>) -> Self {
        Self::Map(map)
    }
}

impl From<serde_json::Value> for EvidenceValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                // u64 beyond i64::MAX and every non-integer land here.
                None => n.as_f64().map(Self::from).unwrap_or(Self::Null),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(fields) => Self::Map(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<EvidenceValue> for serde_json::Value {
    fn from(value: EvidenceValue) -> Self {
        use serde_json::Value;

        match value {
            EvidenceValue::Null => Value::Null,
            EvidenceValue::Bool(b) => Value::Bool(b),
            EvidenceValue::Integer(i) => Value::from(i),
            EvidenceValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            EvidenceValue::String(s) => Value::String(s),
            EvidenceValue::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            EvidenceValue::Map(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
