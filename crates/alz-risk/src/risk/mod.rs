//! Alzheimer's risk inference: raw measurements in, risk tier out.
//!
//! Requests flow through [`coercion`] into the [`features`] builder (using the
//! [`weights`] store and optional [`normalize`] stage), then through the
//! [`adapter`] which calls a [`classifier::RiskClassifier`] and thresholds its
//! output. [`pipeline::RiskPipeline`] wires the stages together.

pub mod adapter;
pub mod batch;
pub mod classifier;
pub mod coercion;
pub mod error;
pub mod features;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod router;
pub mod schema;
pub mod weights;

#[cfg(test)]
mod tests;

pub use adapter::{
    Prediction, RiskClassifierAdapter, RiskTier, RoundingPolicy, RoundingWidthError,
    MAX_PROBABILITY_DECIMALS,
};
pub use batch::{score_csv, BatchError, BatchSummary};
pub use classifier::{ClassifierError, RiskClassifier};
pub use coercion::{coerce, FeatureValue, RawInputRecord, TypedFeatureRecord};
pub use error::{
    ClassificationError, ConfigLoadError, PipelineError, SchemaMismatchError, TypeCoercionError,
};
pub use features::{
    composite_score, CompositeScores, FeatureVector, FeatureVectorBuilder, WeightColumnPolicy,
};
pub use model::LogisticRegressionModel;
pub use normalize::StandardScaler;
pub use pipeline::{load_pipeline, PipelineOptions, RiskArtifacts, RiskAssessment, RiskPipeline};
pub use router::prediction_router;
pub use schema::{FeatureKind, FieldSpec, DERIVED_COLUMNS, INPUT_SCHEMA};
pub use weights::{WeightMapping, WeightStore};
