use serde::{Deserialize, Serialize};

use super::classifier::RiskClassifier;
use super::error::ClassificationError;
use super::features::FeatureVector;

pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
pub const MODERATE_RISK_THRESHOLD: f64 = 0.4;
pub const MAX_PROBABILITY_DECIMALS: u32 = 10;

const POSITIVE_CLASS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// First match wins: `>= 0.7` high, `>= 0.4` moderate, otherwise low.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if probability >= MODERATE_RISK_THRESHOLD {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decimal places kept on the positive-class probability.
///
/// Ties round half away from zero. Tiers are assigned from the rounded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundingPolicy {
    decimals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "probability rounding width must be between 0 and {max}, found {decimals}",
    max = MAX_PROBABILITY_DECIMALS
)]
pub struct RoundingWidthError {
    pub decimals: u32,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self { decimals: 4 }
    }
}

impl RoundingPolicy {
    pub fn new(decimals: u32) -> Result<Self, RoundingWidthError> {
        if decimals > MAX_PROBABILITY_DECIMALS {
            return Err(RoundingWidthError { decimals });
        }
        Ok(Self { decimals })
    }

    pub fn decimals(self) -> u32 {
        self.decimals
    }

    pub fn round(self, value: f64) -> f64 {
        round_to(value, self.decimals)
    }

    /// Percentage form of an already rounded probability, always with at
    /// least one fractional digit (`0.75` → `"75.0"`).
    pub fn percent(self, probability: f64) -> String {
        let percent = round_to(probability * 100.0, self.decimals.saturating_sub(2));
        if percent.fract() == 0.0 {
            format!("{percent:.1}")
        } else {
            percent.to_string()
        }
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub probability: f64,
    pub tier: RiskTier,
    #[serde(skip)]
    rounding: RoundingPolicy,
}

impl Prediction {
    pub fn message(&self) -> String {
        format!(
            "Your chances of developing Alzheimer's is {}%. This indicates a {} risk.",
            self.rounding.percent(self.probability),
            self.tier
        )
    }
}

/// Runs the classifier and turns its positive-class output into a risk tier.
#[derive(Debug, Clone)]
pub struct RiskClassifierAdapter<C> {
    classifier: C,
    rounding: RoundingPolicy,
}

impl<C: RiskClassifier> RiskClassifierAdapter<C> {
    pub fn new(classifier: C, rounding: RoundingPolicy) -> Self {
        Self {
            classifier,
            rounding,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    pub fn classify(&self, vector: &FeatureVector) -> Result<Prediction, ClassificationError> {
        let proba = self
            .classifier
            .predict_proba(vector)
            .map_err(|err| ClassificationError::new(err.to_string()))?;

        if proba.len() != 2 {
            return Err(ClassificationError::new(format!(
                "expected 2 class probabilities, got {}",
                proba.len()
            )));
        }

        let positive = proba[POSITIVE_CLASS];
        if !positive.is_finite() || !(0.0..=1.0).contains(&positive) {
            return Err(ClassificationError::new(format!(
                "positive-class probability {positive} is outside [0, 1]"
            )));
        }

        let probability = self.rounding.round(positive);
        Ok(Prediction {
            probability,
            tier: RiskTier::from_probability(probability),
            rounding: self.rounding,
        })
    }
}
