use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{read_json_artifact, ConfigLoadError, SchemaMismatchError};
use super::features::FeatureVector;

const ARTIFACT: &str = "preprocessor";

/// Standardization fitted at training time: `(x - mean) / scale` per column.
///
/// Only the listed columns are transformed; every other column passes through
/// untouched. A vector already marked normalized is left as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let scaler: StandardScaler = read_json_artifact(path)?;
        scaler.validate()?;
        debug!(path = %path.display(), columns = scaler.columns.len(), "loaded preprocessor");
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.columns.len() != self.mean.len() || self.columns.len() != self.scale.len() {
            return Err(ConfigLoadError::invalid(
                ARTIFACT,
                format!(
                    "{} columns but {} means and {} scales",
                    self.columns.len(),
                    self.mean.len(),
                    self.scale.len()
                ),
            ));
        }

        for (index, column) in self.columns.iter().enumerate() {
            if self.columns[..index].contains(column) {
                return Err(ConfigLoadError::invalid(
                    ARTIFACT,
                    format!("column {column} listed twice"),
                ));
            }
            if !self.mean[index].is_finite() {
                return Err(ConfigLoadError::invalid(
                    ARTIFACT,
                    format!("mean for {column} is not finite"),
                ));
            }
            let scale = self.scale[index];
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ConfigLoadError::invalid(
                    ARTIFACT,
                    format!("scale for {column} must be positive, found {scale}"),
                ));
            }
        }

        Ok(())
    }

    /// Scaler columns absent from `layout`.
    pub fn unknown_columns(&self, layout: &[&str]) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| !layout.contains(&column.as_str()))
            .cloned()
            .collect()
    }

    pub fn transform(&self, vector: &mut FeatureVector) -> Result<(), SchemaMismatchError> {
        if vector.is_normalized() {
            return Ok(());
        }

        let missing = self.unknown_columns(vector.columns());
        if !missing.is_empty() {
            return Err(SchemaMismatchError {
                missing,
                unexpected: Vec::new(),
            });
        }

        for ((column, mean), scale) in self.columns.iter().zip(&self.mean).zip(&self.scale) {
            if let Some(value) = vector.value_mut(column) {
                *value = (*value - mean) / scale;
            }
        }
        vector.mark_normalized();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::features::{CompositeScores, FeatureVector};

    fn vector() -> FeatureVector {
        FeatureVector::from_parts(
            vec!["Age", "Gender", "HealthScore"],
            vec![80.0, 1.0, 40.0],
            CompositeScores::default(),
        )
    }

    fn scaler() -> StandardScaler {
        StandardScaler {
            columns: vec!["Age".to_string(), "HealthScore".to_string()],
            mean: vec![75.0, 30.0],
            scale: vec![10.0, 5.0],
        }
    }

    #[test]
    fn transforms_listed_columns_only() {
        let mut vector = vector();
        scaler().transform(&mut vector).expect("transform applies");
        assert_eq!(vector.values(), &[0.5, 1.0, 2.0]);
        assert!(vector.is_normalized());
    }

    #[test]
    fn same_input_gives_same_output() {
        let scaler = scaler();
        let mut first = vector();
        let mut second = vector();
        scaler.transform(&mut first).expect("first");
        scaler.transform(&mut second).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn second_transform_leaves_vector_unchanged() {
        let scaler = StandardScaler {
            columns: vec!["Age".to_string()],
            mean: vec![10.0],
            scale: vec![2.0],
        };
        let mut vector =
            FeatureVector::from_parts(vec!["Age"], vec![20.0], CompositeScores::default());

        scaler.transform(&mut vector).expect("first pass");
        let once = vector.clone();
        scaler.transform(&mut vector).expect("second pass");

        assert_eq!(vector.values(), &[5.0]);
        assert_eq!(vector, once);
    }

    #[test]
    fn rejects_zero_scale() {
        let mut scaler = scaler();
        scaler.scale[1] = 0.0;
        assert!(matches!(
            scaler.validate(),
            Err(ConfigLoadError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut scaler = scaler();
        scaler.mean.pop();
        assert!(scaler.validate().is_err());
    }

    #[test]
    fn transform_fails_when_vector_lacks_column() {
        let mut scaler = scaler();
        scaler.columns[1] = "MMSE".to_string();
        let err = scaler.transform(&mut vector()).expect_err("missing column");
        assert_eq!(err.missing, vec!["MMSE".to_string()]);
    }
}
