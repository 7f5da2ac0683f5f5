use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use neighborhood_insights::api::{insights_router, InsightsServices};
use neighborhood_insights::providers::{PropertyDataProvider, SuggestionProvider};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_insights_routes<S, P>(services: Arc<InsightsServices<S, P>>) -> axum::Router
where
    S: SuggestionProvider + 'static,
    P: PropertyDataProvider + 'static,
{
    insights_router(services)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use neighborhood_insights::insights::RawPropertyPayload;
    use neighborhood_insights::providers::{AddressSuggestion, ProviderError, ProviderKind};
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    struct NoPlaces;

    #[async_trait]
    impl SuggestionProvider for NoPlaces {
        async fn fetch_suggestions(
            &self,
            _partial_input: &str,
        ) -> Result<Vec<AddressSuggestion>, ProviderError> {
            Err(ProviderError::ConfigMissing {
                provider: ProviderKind::Places,
            })
        }
    }

    struct EmptyProperty;

    #[async_trait]
    impl PropertyDataProvider for EmptyProperty {
        async fn fetch_property_insights(
            &self,
            _full_address: &str,
        ) -> Result<RawPropertyPayload, ProviderError> {
            Ok(RawPropertyPayload::default())
        }
    }

    fn app(ready: bool) -> axum::Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_insights_routes(Arc::new(InsightsServices::new(NoPlaces, EmptyProperty)))
            .layer(Extension(state))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn health_and_readiness_report_status() {
        let (status, body) = get(app(true), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = get(app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let (status, body) = get(app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn insights_routes_are_mounted() {
        let (status, body) = get(app(true), "/suggestions?input=16105").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch autocomplete suggestions");

        let (status, body) = get(app(true), "/neighborhood-insights?address=1%20Main%20St").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["schoolDistrictName"], "Unknown District");
        assert_eq!(body["pricing"]["classification"], "Cheap");
    }

    #[tokio::test]
    async fn metrics_endpoint_renders_text() {
        let response = app(true)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
