use crate::infra::AppState;
use alz_risk::risk::{prediction_router, RiskClassifier, RiskPipeline};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_operational_routes<C>(pipeline: Arc<RiskPipeline<C>>) -> axum::Router
where
    C: RiskClassifier + 'static,
{
    prediction_router(pipeline)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Acquire);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alz_risk::risk::{
        ClassifierError, FeatureVector, PipelineOptions, WeightStore, DERIVED_COLUMNS,
        INPUT_SCHEMA,
    };
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    struct Constant {
        features: Vec<String>,
    }

    impl RiskClassifier for Constant {
        fn feature_names(&self) -> &[String] {
            &self.features
        }

        fn predict_proba(&self, _: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
            Ok(vec![0.9, 0.1])
        }
    }

    fn router(ready: bool) -> axum::Router {
        let classifier = Constant {
            features: INPUT_SCHEMA
                .iter()
                .map(|field| field.name)
                .chain(DERIVED_COLUMNS)
                .map(str::to_string)
                .collect(),
        };
        let pipeline = RiskPipeline::new(
            classifier,
            Arc::new(WeightStore::default()),
            None,
            PipelineOptions::default(),
        )
        .expect("pipeline builds");
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(recorder.handle()),
        };
        state.readiness.store(ready, Ordering::Release);
        with_operational_routes(Arc::new(pipeline)).layer(Extension(state))
    }

    async fn get(router: axum::Router, uri: &str) -> StatusCode {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds");
        router.oneshot(request).await.expect("responds").status()
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        assert_eq!(get(router(false), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_tracks_startup_flag() {
        assert_eq!(
            get(router(false), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(get(router(true), "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_render_as_text() {
        assert_eq!(get(router(true), "/metrics").await, StatusCode::OK);
    }
}
