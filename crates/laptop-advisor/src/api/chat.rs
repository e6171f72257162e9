use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::{AdvisorState, ApiResponse};
use crate::assistant::{ChatAnswer, Comparison, ConstraintAdvice};
use crate::catalog::LaptopId;
use crate::error::AppError;
use crate::recommend::ConstraintSet;

const MAX_QUERY_CHARS: usize = 1000;

pub(super) fn routes() -> Router<AdvisorState> {
    Router::new()
        .route("/api/v1/chat/query", post(query_handler))
        .route("/api/v1/chat/recommend", post(recommend_handler))
        .route("/api/v1/chat/compare", post(compare_handler))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    query: String,
    #[serde(default)]
    context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendRequest {
    #[serde(default)]
    constraints: ConstraintSet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareRequest {
    laptop_ids: Vec<LaptopId>,
}

async fn query_handler(
    State(state): State<AdvisorState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<ApiResponse<ChatAnswer>, AppError> {
    let Json(request) = payload.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let length = request.query.trim().chars().count();
    if length == 0 || length > MAX_QUERY_CHARS {
        return Err(AppError::BadRequest(format!(
            "query must be between 1 and {MAX_QUERY_CHARS} characters"
        )));
    }

    let snapshot = state.service.snapshot();
    let answer = state
        .assistant
        .answer(snapshot.catalog(), &request.query, request.context.as_deref())
        .await;
    Ok(ApiResponse::ok(answer))
}

async fn recommend_handler(
    State(state): State<AdvisorState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<ApiResponse<ConstraintAdvice>, AppError> {
    let Json(request) = payload.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let snapshot = state.service.snapshot();
    let advice = state
        .assistant
        .recommend(snapshot.catalog(), request.constraints)
        .await;
    Ok(ApiResponse::ok(advice))
}

async fn compare_handler(
    State(state): State<AdvisorState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<ApiResponse<Comparison>, AppError> {
    let Json(request) = payload.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let snapshot = state.service.snapshot();
    let comparison = state
        .assistant
        .compare(snapshot.catalog(), &request.laptop_ids)
        .await?;
    Ok(ApiResponse::ok(comparison))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::post;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn query_returns_assistant_answer() {
        let (status, body) = post("/api/v1/chat/query", json!({"query": "Is the HP ProBook good?"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["response"], "echo: Is the HP ProBook good?");
        assert!(body["data"]["context_used"]
            .as_str()
            .expect("context")
            .contains("ProBook 440"));

        let (status, _) = post("/api/v1/chat/query", json!({"query": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn recommend_reports_laptops_considered() {
        let (status, body) = post(
            "/api/v1/chat/recommend",
            json!({"constraints": {"maxPrice": 1500, "brand": "lenovo"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["laptops_considered"], 1);
        assert_eq!(body["data"]["constraints"]["max_price"], 1500.0);
        assert_eq!(
            body["data"]["recommendations"],
            "echo: Please recommend laptops based on these constraints: Brand: lenovo"
        );

        let (status, body) = post("/api/v1/chat/recommend", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["laptops_considered"], 3);

        let (status, _) = post(
            "/api/v1/chat/recommend",
            json!({"constraints": {"min_rating": "high"}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn compare_needs_two_resolvable_laptops() {
        let (status, body) = post("/api/v1/chat/compare", json!({"laptop_ids": [0, 1]})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["laptops"].as_array().map(Vec::len), Some(2));
        assert_eq!(
            body["data"]["comparison"],
            "echo: Please provide a detailed comparison of these laptops, highlighting key differences, pros and cons, and which would be best for different use cases: Compare these laptops:"
        );

        let (status, _) = post("/api/v1/chat/compare", json!({"laptop_ids": [0, 99]})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = post("/api/v1/chat/compare", json!({"laptop_ids": [0, 1, 2, 0, 1, 2]})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
