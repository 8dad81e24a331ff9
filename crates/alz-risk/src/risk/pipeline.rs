use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::adapter::{RiskClassifierAdapter, RiskTier, RoundingPolicy, RoundingWidthError};
use super::classifier::RiskClassifier;
use super::coercion::{coerce, RawInputRecord};
use super::error::{ConfigLoadError, PipelineError};
use super::features::{CompositeScores, FeatureVectorBuilder, WeightColumnPolicy};
use super::model::LogisticRegressionModel;
use super::normalize::StandardScaler;
use super::schema::INPUT_SCHEMA;
use super::weights::WeightStore;
use crate::config::PipelineConfig;

/// Behavioral switches applied to every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub weight_policy: WeightColumnPolicy,
    pub rounding: RoundingPolicy,
}

impl TryFrom<&PipelineConfig> for PipelineOptions {
    type Error = RoundingWidthError;

    fn try_from(config: &PipelineConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            weight_policy: if config.strict_weights {
                WeightColumnPolicy::Reject
            } else {
                WeightColumnPolicy::Skip
            },
            rounding: RoundingPolicy::new(config.probability_decimals)?,
        })
    }
}

/// Result returned to the caller for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub probability: f64,
    pub tier: RiskTier,
    pub message: String,
    pub composite_scores: CompositeScores,
    pub evaluated_at: DateTime<Utc>,
}

/// Coercion → feature build → classification → thresholding.
///
/// Holds only read-only state; one instance is shared by every request.
pub struct RiskPipeline<C> {
    builder: FeatureVectorBuilder,
    weights: Arc<WeightStore>,
    adapter: RiskClassifierAdapter<C>,
}

impl<C: RiskClassifier> RiskPipeline<C> {
    /// Checks that the classifier, scaler and (in strict mode) weights only
    /// reference columns the builder produces.
    pub fn new(
        classifier: C,
        weights: Arc<WeightStore>,
        scaler: Option<Arc<StandardScaler>>,
        options: PipelineOptions,
    ) -> Result<Self, ConfigLoadError> {
        let builder = FeatureVectorBuilder::new(options.weight_policy, scaler);
        let layout: Vec<&str> = builder.columns();

        let unknown_model_columns: Vec<String> = classifier
            .feature_names()
            .iter()
            .filter(|name| !layout.contains(&name.as_str()))
            .cloned()
            .collect();
        if !unknown_model_columns.is_empty() {
            return Err(ConfigLoadError::IncompatibleArtifact {
                artifact: "model",
                columns: unknown_model_columns,
            });
        }

        if let Some(scaler) = builder.scaler() {
            let unknown = scaler.unknown_columns(&layout);
            if !unknown.is_empty() {
                return Err(ConfigLoadError::IncompatibleArtifact {
                    artifact: "preprocessor",
                    columns: unknown,
                });
            }
        }

        let unknown_weights = weights.unknown_columns(&layout);
        if !unknown_weights.is_empty() {
            if options.weight_policy == WeightColumnPolicy::Reject {
                return Err(ConfigLoadError::IncompatibleArtifact {
                    artifact: "weights",
                    columns: unknown_weights,
                });
            }
            warn!(
                columns = ?unknown_weights,
                "weight entries without a matching column will be skipped"
            );
        }

        Ok(Self {
            builder,
            weights,
            adapter: RiskClassifierAdapter::new(classifier, options.rounding),
        })
    }

    pub fn builder(&self) -> &FeatureVectorBuilder {
        &self.builder
    }

    pub fn weights(&self) -> &WeightStore {
        &self.weights
    }

    pub fn adapter(&self) -> &RiskClassifierAdapter<C> {
        &self.adapter
    }

    pub fn assess(&self, raw: &RawInputRecord) -> Result<RiskAssessment, PipelineError> {
        let record = coerce(raw, &INPUT_SCHEMA)?;
        let vector = self.builder.build(&record, &self.weights)?;
        debug!(
            health_score = vector.composites().health_score,
            cardiometabolic_index = vector.composites().cardiometabolic_index,
            normalized = vector.is_normalized(),
            "feature vector built"
        );

        let prediction = self.adapter.classify(&vector)?;
        debug!(probability = prediction.probability, tier = %prediction.tier, "risk classified");

        Ok(RiskAssessment {
            probability: prediction.probability,
            tier: prediction.tier,
            message: prediction.message(),
            composite_scores: vector.composites(),
            evaluated_at: Utc::now(),
        })
    }
}

/// Fitted artifacts read from disk before the first request.
#[derive(Debug, Clone)]
pub struct RiskArtifacts {
    pub weights: Arc<WeightStore>,
    pub scaler: Option<Arc<StandardScaler>>,
    pub model: LogisticRegressionModel,
}

impl RiskArtifacts {
    pub fn load(config: &PipelineConfig) -> Result<Self, ConfigLoadError> {
        let weights = WeightStore::load(
            &config.health_weights_path,
            &config.cardiometabolic_weights_path,
        )?;
        let scaler = config
            .preprocessor_path
            .as_ref()
            .map(StandardScaler::from_path)
            .transpose()?;
        let model = LogisticRegressionModel::from_path(&config.model_path)?;

        info!(
            health_weights = weights.health.len(),
            cardiometabolic_weights = weights.cardiometabolic.len(),
            normalization = scaler.is_some(),
            model_features = model.feature_names.len(),
            "risk artifacts loaded"
        );

        Ok(Self {
            weights: Arc::new(weights),
            scaler: scaler.map(Arc::new),
            model,
        })
    }

    pub fn into_pipeline(
        self,
        options: PipelineOptions,
    ) -> Result<RiskPipeline<LogisticRegressionModel>, ConfigLoadError> {
        RiskPipeline::new(self.model, self.weights, self.scaler, options)
    }
}

/// Loads every artifact named in `config` and wires the production pipeline.
pub fn load_pipeline(
    config: &PipelineConfig,
) -> Result<RiskPipeline<LogisticRegressionModel>, ConfigLoadError> {
    let options = PipelineOptions::try_from(config)?;
    RiskArtifacts::load(config)?.into_pipeline(options)
}
