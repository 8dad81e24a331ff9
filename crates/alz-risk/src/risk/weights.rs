use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::error::{read_json_artifact, ConfigLoadError};

/// Column → weight pairs kept in file order.
///
/// Composite scores are summed in this order, so two files with the same
/// entries in a different order can differ in the last ulp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightMapping {
    entries: Vec<(String, f64)>,
}

impl WeightMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated column keeps its first position and takes the newer weight.
    pub fn insert(&mut self, column: impl Into<String>, weight: f64) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((column, weight)),
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, weight)| *weight)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(name, weight)| (name.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys that do not name a column in `layout`, in file order.
    pub fn unknown_columns(&self, layout: &[&str]) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(name, _)| !layout.contains(&name.as_str()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn validate(&self, artifact: &'static str) -> Result<(), ConfigLoadError> {
        match self.entries.iter().find(|(_, weight)| !weight.is_finite()) {
            Some((name, weight)) => Err(ConfigLoadError::invalid(
                artifact,
                format!("weight for {name} is not finite ({weight})"),
            )),
            None => Ok(()),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for WeightMapping {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (column, weight) in iter {
            mapping.insert(column, weight);
        }
        mapping
    }
}

impl<'de> Deserialize<'de> for WeightMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WeightMappingVisitor;

        impl<'de> Visitor<'de> for WeightMappingVisitor {
            type Value = WeightMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping column names to numeric weights")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut mapping = WeightMapping::new();
                while let Some((column, weight)) = map.next_entry::<String, f64>()? {
                    mapping.insert(column, weight);
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(WeightMappingVisitor)
    }
}

/// The two weight mappings used for composite scoring.
///
/// Loaded once before the first request and shared read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightStore {
    pub health: WeightMapping,
    pub cardiometabolic: WeightMapping,
}

impl WeightStore {
    pub fn new(health: WeightMapping, cardiometabolic: WeightMapping) -> Self {
        Self {
            health,
            cardiometabolic,
        }
    }

    pub fn load(
        health_path: impl AsRef<Path>,
        cardiometabolic_path: impl AsRef<Path>,
    ) -> Result<Self, ConfigLoadError> {
        let health = load_mapping(health_path.as_ref(), "health weights")?;
        let cardiometabolic =
            load_mapping(cardiometabolic_path.as_ref(), "cardiometabolic weights")?;
        Ok(Self::new(health, cardiometabolic))
    }

    /// Unknown keys across both mappings, deduplicated, health first.
    pub fn unknown_columns(&self, layout: &[&str]) -> Vec<String> {
        let mut unknown = self.health.unknown_columns(layout);
        for column in self.cardiometabolic.unknown_columns(layout) {
            if !unknown.contains(&column) {
                unknown.push(column);
            }
        }
        unknown
    }
}

fn load_mapping(path: &Path, artifact: &'static str) -> Result<WeightMapping, ConfigLoadError> {
    let mapping: WeightMapping = read_json_artifact(path)?;
    mapping.validate(artifact)?;
    debug!(path = %path.display(), entries = mapping.len(), "loaded {artifact}");
    Ok(mapping)
}
