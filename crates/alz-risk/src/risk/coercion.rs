use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::{PipelineError, SchemaMismatchError, TypeCoercionError};
use super::schema::{FeatureKind, FieldSpec};

/// Untyped field values exactly as the caller submitted them.
///
/// Deserializes from a JSON object or an urlencoded form. JSON numbers and
/// booleans are kept in their textual form so every value goes through the
/// same coercion path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputRecord {
    values: BTreeMap<String, String>,
}

impl RawInputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for RawInputRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for RawInputRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RawInputVisitor)
    }
}

struct RawInputVisitor;

impl<'de> Visitor<'de> for RawInputVisitor {
    type Value = RawInputRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to values")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut values = BTreeMap::new();
        while let Some((name, RawValue(value))) = map.next_entry::<String, RawValue>()? {
            if values.insert(name.clone(), value).is_some() {
                return Err(de::Error::custom(format!("duplicate field {name}")));
            }
        }
        Ok(RawInputRecord { values })
    }
}

struct RawValue(String);

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawValueVisitor;

        impl<'de> Visitor<'de> for RawValueVisitor {
            type Value = RawValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or number")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<RawValue, E> {
                Ok(RawValue(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<RawValue, E> {
                Ok(RawValue(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<RawValue, E> {
                Ok(RawValue(value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<RawValue, E> {
                Ok(RawValue(value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<RawValue, E> {
                Ok(RawValue(value.to_string()))
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<RawValue, E> {
                Ok(RawValue(value.to_string()))
            }
        }

        deserializer.deserialize_any(RawValueVisitor)
    }
}

/// A single coerced measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FeatureValue::Integer(value) => value as f64,
            FeatureValue::Float(value) => value,
        }
    }

    pub fn kind(self) -> FeatureKind {
        match self {
            FeatureValue::Integer(_) => FeatureKind::Integer,
            FeatureValue::Float(_) => FeatureKind::Float,
        }
    }
}

/// Field values after coercion, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypedFeatureRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl TypedFeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FeatureValue) -> Option<FeatureValue> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FeatureValue)> for TypedFeatureRecord {
    fn from_iter<I: IntoIterator<Item = (K, FeatureValue)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// Coerces every schema field by name.
///
/// The supplied names must match the schema exactly; order is irrelevant.
pub fn coerce(
    raw: &RawInputRecord,
    schema: &[FieldSpec],
) -> Result<TypedFeatureRecord, PipelineError> {
    let missing: Vec<String> = schema
        .iter()
        .filter(|field| raw.get(field.name).is_none())
        .map(|field| field.name.to_string())
        .collect();
    let unexpected: Vec<String> = raw
        .names()
        .filter(|name| !schema.iter().any(|field| field.name == *name))
        .map(str::to_string)
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(SchemaMismatchError {
            missing,
            unexpected,
        }
        .into());
    }

    let mut record = TypedFeatureRecord::new();
    for field in schema {
        let raw_value = raw.get(field.name).unwrap_or_default();
        record.insert(field.name, coerce_value(field, raw_value)?);
    }
    Ok(record)
}

fn coerce_value(field: &FieldSpec, raw: &str) -> Result<FeatureValue, TypeCoercionError> {
    let trimmed = raw.trim();
    let parsed = match field.kind {
        FeatureKind::Integer => trimmed.parse::<i64>().ok().map(FeatureValue::Integer),
        FeatureKind::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(FeatureValue::Float),
    };

    parsed.ok_or_else(|| TypeCoercionError {
        field: field.name.to_string(),
        value: raw.to_string(),
        expected: field.kind,
    })
}
