use super::features::FeatureVector;

/// Trained model capability consumed by the adapter.
///
/// Implementations pick their inputs out of the vector by column name, in the
/// order they were trained on, and return one probability per class with the
/// positive class at index 1.
pub trait RiskClassifier: Send + Sync {
    /// Columns the model reads, in training order.
    fn feature_names(&self) -> &[String];

    fn predict_proba(&self, vector: &FeatureVector) -> Result<Vec<f64>, ClassifierError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("feature vector is missing column {0}")]
    MissingFeature(String),
    #[error("model produced a non-finite score")]
    NonFinite,
    #[error("model backend failure: {0}")]
    Backend(String),
}
