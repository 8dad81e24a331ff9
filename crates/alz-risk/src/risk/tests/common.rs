use std::sync::Arc;

use crate::risk::classifier::{ClassifierError, RiskClassifier};
use crate::risk::coercion::RawInputRecord;
use crate::risk::features::FeatureVector;
use crate::risk::pipeline::{PipelineOptions, RiskPipeline};
use crate::risk::schema::vector_columns;
use crate::risk::weights::{WeightMapping, WeightStore};

/// Classifier double returning a fixed positive-class probability.
pub(super) struct StubClassifier {
    positive: f64,
    features: Vec<String>,
}

impl StubClassifier {
    pub(super) fn new(positive: f64) -> Self {
        Self {
            positive,
            features: vector_columns().into_iter().map(str::to_string).collect(),
        }
    }
}

impl RiskClassifier for StubClassifier {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict_proba(&self, vector: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        if vector.len() != self.features.len() {
            return Err(ClassifierError::Backend(format!(
                "expected {} columns, got {}",
                self.features.len(),
                vector.len()
            )));
        }
        Ok(vec![1.0 - self.positive, self.positive])
    }
}

pub(super) struct FailingClassifier;

impl RiskClassifier for FailingClassifier {
    fn feature_names(&self) -> &[String] {
        &[]
    }

    fn predict_proba(&self, _: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        Err(ClassifierError::Backend("model unavailable".to_string()))
    }
}

pub(super) fn sample_raw() -> RawInputRecord {
    [
        ("Age", "34"),
        ("Gender", "0"),
        ("Ethnicity", "1"),
        ("EducationLevel", "5"),
        ("BMI", "24"),
        ("Smoking", "0"),
        ("AlcoholConsumption", "3"),
        ("PhysicalActivity", "7"),
        ("DietQuality", "8"),
        ("SleepQuality", "6"),
        ("FamilyHistoryAlzheimers", "1"),
        ("CardiovascularDisease", "0"),
        ("Diabetes", "0"),
        ("Depression", "0"),
        ("HeadInjury", "0"),
        ("Hypertension", "1"),
        ("SystolicBP", "110"),
        ("DiastolicBP", "80"),
        ("CholesterolTotal", "140"),
        ("CholesterolLDL", "65"),
        ("CholesterolHDL", "60"),
        ("CholesterolTriglycerides", "150"),
        ("MMSE", "23"),
        ("FunctionalAssessment", "15"),
        ("MemoryComplaints", "2"),
        ("BehavioralProblems", "3"),
        ("ADL", "5"),
        ("Confusion", "1"),
        ("Disorientation", "1"),
        ("PersonalityChanges", "1"),
        ("DifficultyCompletingTasks", "0"),
        ("Forgetfulness", "1"),
    ]
    .into_iter()
    .collect()
}

pub(super) fn health_weights() -> WeightMapping {
    [
        ("SystolicBP", 0.16713048467999211),
        ("CholesterolTotal", 0.20538780018515296),
        ("CholesterolLDL", 0.20371637265656023),
        ("CholesterolHDL", 0.21295212981036069),
        ("CholesterolTriglycerides", 0.21081321266793412),
        ("BMI", 0.19723692111125013),
        ("PhysicalActivity", 0.1880104973471069),
        ("DietQuality", 0.19348311953836947),
        ("SleepQuality", 0.20101583931020794),
        ("Smoking", 0.023329569340162733),
        ("AlcoholConsumption", 0.1969240533529028),
    ]
    .into_iter()
    .collect()
}

pub(super) fn cardiometabolic_weights() -> WeightMapping {
    [
        ("SystolicBP", 0.16713048467999211),
        ("CholesterolTotal", 0.20538780018515296),
        ("CholesterolLDL", 0.20371637265656023),
        ("CholesterolHDL", 0.21295212981036069),
        ("CholesterolTriglycerides", 0.21081321266793412),
    ]
    .into_iter()
    .collect()
}

pub(super) fn weight_store() -> Arc<WeightStore> {
    Arc::new(WeightStore::new(health_weights(), cardiometabolic_weights()))
}

pub(super) fn pipeline_with<C: RiskClassifier>(classifier: C) -> Arc<RiskPipeline<C>> {
    Arc::new(
        RiskPipeline::new(classifier, weight_store(), None, PipelineOptions::default())
            .expect("pipeline builds"),
    )
}

pub(super) fn stub_pipeline(positive: f64) -> Arc<RiskPipeline<StubClassifier>> {
    pipeline_with(StubClassifier::new(positive))
}

/// Weighted sum written out term by term, in weight-file order.
pub(super) fn expected_health_score() -> f64 {
    0.0 + 110.0 * 0.16713048467999211
        + 140.0 * 0.20538780018515296
        + 65.0 * 0.20371637265656023
        + 60.0 * 0.21295212981036069
        + 150.0 * 0.21081321266793412
        + 24.0 * 0.19723692111125013
        + 7.0 * 0.1880104973471069
        + 8.0 * 0.19348311953836947
        + 6.0 * 0.20101583931020794
        + 0.0 * 0.023329569340162733
        + 3.0 * 0.1969240533529028
}

pub(super) fn expected_cardiometabolic_index() -> f64 {
    0.0 + 110.0 * 0.16713048467999211
        + 140.0 * 0.20538780018515296
        + 65.0 * 0.20371637265656023
        + 60.0 * 0.21295212981036069
        + 150.0 * 0.21081321266793412
}
