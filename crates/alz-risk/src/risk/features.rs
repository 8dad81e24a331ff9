use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::coercion::TypedFeatureRecord;
use super::error::{PipelineError, SchemaMismatchError};
use super::normalize::StandardScaler;
use super::schema::{
    vector_columns, FieldSpec, CARDIOMETABOLIC_INDEX, HEALTH_SCORE, INPUT_SCHEMA,
    TOTAL_HEALTH_SCORE,
};
use super::weights::{WeightMapping, WeightStore};

/// How composite scoring treats weight entries whose column is not in the vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightColumnPolicy {
    /// Drop the entry; the score is computed from the known columns only.
    #[default]
    Skip,
    /// Fail with a schema mismatch naming the unknown columns.
    Reject,
}

/// Composite scores as computed from the unscaled inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CompositeScores {
    pub health_score: f64,
    pub cardiometabolic_index: f64,
    pub total_health_score: f64,
}

/// A single model-ready row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    columns: Vec<&'static str>,
    values: Vec<f64>,
    composites: CompositeScores,
    normalized: bool,
}

impl FeatureVector {
    pub fn from_parts(
        columns: Vec<&'static str>,
        values: Vec<f64>,
        composites: CompositeScores,
    ) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self {
            columns,
            values,
            composites,
            normalized: false,
        }
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.position(column).map(|index| self.values[index])
    }

    pub fn composites(&self) -> CompositeScores {
        self.composites
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub(crate) fn value_mut(&mut self, column: &str) -> Option<&mut f64> {
        let index = self.position(column)?;
        self.values.get_mut(index)
    }

    pub(crate) fn mark_normalized(&mut self) {
        self.normalized = true;
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| *name == column)
    }
}

/// Sum of `value(column) * weight` over the mapping, in mapping order.
///
/// Entries naming a column outside `columns` are skipped or rejected per `policy`.
pub fn composite_score(
    columns: &[&str],
    values: &[f64],
    weights: &WeightMapping,
    policy: WeightColumnPolicy,
) -> Result<f64, SchemaMismatchError> {
    if policy == WeightColumnPolicy::Reject {
        let unknown = weights.unknown_columns(columns);
        if !unknown.is_empty() {
            return Err(SchemaMismatchError {
                missing: Vec::new(),
                unexpected: unknown,
            });
        }
    }

    Ok(weights
        .iter()
        .filter_map(|(column, weight)| {
            columns
                .iter()
                .position(|name| *name == column)
                .map(|index| values[index] * weight)
        })
        .fold(0.0, |total, term| total + term))
}

/// Arranges typed inputs into the classifier layout and appends the composites.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    schema: &'static [FieldSpec],
    policy: WeightColumnPolicy,
    scaler: Option<Arc<StandardScaler>>,
}

impl Default for FeatureVectorBuilder {
    fn default() -> Self {
        Self::new(WeightColumnPolicy::Skip, None)
    }
}

impl FeatureVectorBuilder {
    pub fn new(policy: WeightColumnPolicy, scaler: Option<Arc<StandardScaler>>) -> Self {
        Self {
            schema: &INPUT_SCHEMA,
            policy,
            scaler,
        }
    }

    pub fn policy(&self) -> WeightColumnPolicy {
        self.policy
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_deref()
    }

    /// Column layout produced by [`build`](Self::build).
    pub fn columns(&self) -> Vec<&'static str> {
        vector_columns()
    }

    pub fn build(
        &self,
        record: &TypedFeatureRecord,
        weights: &WeightStore,
    ) -> Result<FeatureVector, PipelineError> {
        let missing: Vec<String> = self
            .schema
            .iter()
            .filter(|field| record.get(field.name).is_none())
            .map(|field| field.name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaMismatchError {
                missing,
                unexpected: Vec::new(),
            }
            .into());
        }

        let mut columns: Vec<&'static str> = Vec::with_capacity(self.schema.len() + 3);
        let mut values = Vec::with_capacity(self.schema.len() + 3);
        for field in self.schema {
            columns.push(field.name);
            values.push(record.get(field.name).map_or(0.0, |value| value.as_f64()));
        }

        let health_score = composite_score(&columns, &values, &weights.health, self.policy)?;
        let cardiometabolic_index =
            composite_score(&columns, &values, &weights.cardiometabolic, self.policy)?;
        let composites = CompositeScores {
            health_score,
            cardiometabolic_index,
            total_health_score: health_score + cardiometabolic_index,
        };

        columns.extend([HEALTH_SCORE, CARDIOMETABOLIC_INDEX, TOTAL_HEALTH_SCORE]);
        values.extend([
            composites.health_score,
            composites.cardiometabolic_index,
            composites.total_health_score,
        ]);

        let mut vector = FeatureVector::from_parts(columns, values, composites);
        if let Some(scaler) = &self.scaler {
            scaler.transform(&mut vector)?;
        }
        Ok(vector)
    }
}
