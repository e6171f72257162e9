//! JSON endpoints under `/api/v1`.

mod chat;
mod explore;
mod recommendations;
mod reviews;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::assistant::ChatAssistant;
use crate::recommend::RecommendationService;

pub const API_PREFIX: &str = "/api/v1";

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Clone)]
pub struct AdvisorState {
    pub service: Arc<RecommendationService>,
    pub assistant: Arc<ChatAssistant>,
}

impl AdvisorState {
    pub fn new(service: Arc<RecommendationService>, assistant: Arc<ChatAssistant>) -> Self {
        Self { service, assistant }
    }
}

/// Router builder exposing the catalog, recommendation, review and chat endpoints.
pub fn advisor_router(state: AdvisorState) -> Router {
    Router::new()
        .route(&format!("{API_PREFIX}/health"), get(health_handler))
        .route(&format!("{API_PREFIX}/info"), get(info_handler))
        .merge(recommendations::routes())
        .merge(explore::routes())
        .merge(reviews::routes())
        .merge(chat::routes())
        .with_state(state)
}

async fn health_handler(State(state): State<AdvisorState>) -> ApiResponse<serde_json::Value> {
    let snapshot = state.service.snapshot();
    ApiResponse::ok(json!({
        "status": "healthy",
        "laptops_loaded": snapshot.catalog().len(),
    }))
}

async fn info_handler(State(state): State<AdvisorState>) -> ApiResponse<serde_json::Value> {
    let snapshot = state.service.snapshot();
    ApiResponse::ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "laptops": snapshot.catalog().len(),
        "similarity_available": snapshot.similarity().is_available(),
        "endpoints": {
            "recommendations": format!("{API_PREFIX}/recommendations"),
            "explore": format!("{API_PREFIX}/explore"),
            "reviews": format!("{API_PREFIX}/reviews"),
            "chat": format!("{API_PREFIX}/chat"),
        },
    }))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::assistant::{CompletionClient, CompletionError, CompletionOptions};
    use crate::catalog::{LaptopCatalog, LaptopId, LaptopRecord};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    pub(crate) struct EchoClient;

    #[async_trait]
    impl CompletionClient for EchoClient {
        async fn complete(
            &self,
            _system: &str,
            user: &str,
            _options: CompletionOptions,
        ) -> Result<String, CompletionError> {
            Ok(format!("echo: {}", user.lines().next().unwrap_or_default()))
        }
    }

    fn laptop(brand: &str, model: &str, price: &str, rating: &str) -> LaptopRecord {
        let mut record = LaptopRecord::new(LaptopId(0), brand, model);
        record.processor = Some("Intel Core i5".to_string());
        record.price_details = json!({ "Current Price": price })
            .as_object()
            .cloned()
            .expect("object");
        record.review_details = json!({ "Overall Rating": rating, "AI Summary": "Solid build." })
            .as_object()
            .cloned()
            .expect("object");
        record
    }

    pub(crate) fn router() -> Router {
        let catalog = LaptopCatalog::from_records(vec![
            laptop("Lenovo", "ThinkPad E14", "$900", "4.5/5 (50 reviews)"),
            laptop("HP", "ProBook 440", "$1200", "4.0/5 (10 reviews)"),
            laptop("Lenovo", "ThinkPad X1", "$2000", "4.8/5 (5 reviews)"),
        ]);
        let service = Arc::new(RecommendationService::new(catalog));
        let assistant = Arc::new(ChatAssistant::new(Arc::new(EchoClient)));
        advisor_router(AdvisorState::new(service, assistant))
    }

    pub(crate) async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = router().oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub(crate) async fn get(uri: &str) -> (StatusCode, Value) {
        send(Request::get(uri).body(Body::empty()).expect("request")).await
    }

    pub(crate) async fn post(uri: &str, payload: Value) -> (StatusCode, Value) {
        send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::get;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn info_reports_catalog_size() {
        let (status, body) = get("/api/v1/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["laptops"], 3);
        assert_eq!(body["data"]["similarity_available"], true);
    }

    #[tokio::test]
    async fn health_is_healthy() {
        let (status, body) = get("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "healthy");
    }
}
