use std::sync::Arc;

use axum::{extract::State, routing::post, Form, Json, Router};

use super::classifier::RiskClassifier;
use super::coercion::RawInputRecord;
use super::pipeline::{RiskAssessment, RiskPipeline};
use crate::error::AppError;

/// Router builder exposing the prediction endpoints.
pub fn prediction_router<C>(pipeline: Arc<RiskPipeline<C>>) -> Router
where
    C: RiskClassifier + 'static,
{
    Router::new()
        .route("/api/v1/risk/predict", post(predict_json_handler::<C>))
        .route("/predict", post(predict_form_handler::<C>))
        .with_state(pipeline)
}

pub(crate) async fn predict_json_handler<C>(
    State(pipeline): State<Arc<RiskPipeline<C>>>,
    Json(raw): Json<RawInputRecord>,
) -> Result<Json<RiskAssessment>, AppError>
where
    C: RiskClassifier + 'static,
{
    Ok(Json(pipeline.assess(&raw)?))
}

pub(crate) async fn predict_form_handler<C>(
    State(pipeline): State<Arc<RiskPipeline<C>>>,
    Form(raw): Form<RawInputRecord>,
) -> Result<Json<RiskAssessment>, AppError>
where
    C: RiskClassifier + 'static,
{
    Ok(Json(pipeline.assess(&raw)?))
}
