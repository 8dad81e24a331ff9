use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classifier::{ClassifierError, RiskClassifier};
use super::error::{read_json_artifact, ConfigLoadError};
use super::features::FeatureVector;

const ARTIFACT: &str = "model";

/// Binary logistic regression exported as plain coefficients.
///
/// `p = 1 / (1 + e^-(intercept + Σ coefficient_i * x_i))`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegressionModel {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let model: LogisticRegressionModel = read_json_artifact(path)?;
        model.validate()?;
        debug!(path = %path.display(), features = model.feature_names.len(), "loaded model");
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.feature_names.is_empty() {
            return Err(ConfigLoadError::invalid(ARTIFACT, "no features declared"));
        }
        if self.feature_names.len() != self.coefficients.len() {
            return Err(ConfigLoadError::invalid(
                ARTIFACT,
                format!(
                    "{} feature names but {} coefficients",
                    self.feature_names.len(),
                    self.coefficients.len()
                ),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ConfigLoadError::invalid(
                ARTIFACT,
                "coefficients and intercept must be finite",
            ));
        }
        Ok(())
    }

    fn decision_function(&self, vector: &FeatureVector) -> Result<f64, ClassifierError> {
        let mut z = self.intercept;
        for (name, coefficient) in self.feature_names.iter().zip(&self.coefficients) {
            let value = vector
                .get(name)
                .ok_or_else(|| ClassifierError::MissingFeature(name.clone()))?;
            z += coefficient * value;
        }
        if z.is_finite() {
            Ok(z)
        } else {
            Err(ClassifierError::NonFinite)
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl RiskClassifier for LogisticRegressionModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, vector: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        let positive = sigmoid(self.decision_function(vector)?);
        Ok(vec![1.0 - positive, positive])
    }
}
