use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{AdvisorState, ApiResponse};
use crate::catalog::LaptopId;
use crate::error::AppError;
use crate::recommend::{
    ConstraintSet, Recommendation, DEFAULT_SIMILAR_LIMIT, DEFAULT_TRENDING_LIMIT,
};

const MAX_LIMIT: usize = 50;

pub(super) fn routes() -> Router<AdvisorState> {
    Router::new()
        .route(
            "/api/v1/recommendations/constraint-based",
            post(constraint_based_handler),
        )
        .route("/api/v1/recommendations/similar/:laptop_id", get(similar_handler))
        .route("/api/v1/recommendations/trending", get(trending_handler))
        .route("/api/v1/recommendations/budget/:max_price", get(budget_handler))
        .route("/api/v1/recommendations/brand/:brand", get(brand_handler))
        .route("/api/v1/recommendations/use-case", post(use_case_handler))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConstraintRequest {
    #[serde(default)]
    constraints: ConstraintSet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UseCaseRequest {
    use_case: String,
    #[serde(default)]
    constraints: ConstraintSet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationList {
    recommendations: Vec<Recommendation>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<ConstraintSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    laptop_id: Option<LaptopId>,
}

impl RecommendationList {
    fn new(recommendations: Vec<Recommendation>) -> Self {
        Self {
            count: recommendations.len(),
            recommendations,
            constraints: None,
            laptop_id: None,
        }
    }
}

fn resolve_limit(
    query: Result<Query<LimitQuery>, QueryRejection>,
    default: usize,
) -> Result<usize, AppError> {
    let Query(query) = query.map_err(|err| AppError::BadRequest(err.body_text()))?;
    match query.limit.unwrap_or(default) {
        limit @ 1..=MAX_LIMIT => Ok(limit),
        other => Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {other}"
        ))),
    }
}

async fn constraint_based_handler(
    State(state): State<AdvisorState>,
    payload: Result<Json<ConstraintRequest>, JsonRejection>,
) -> Result<ApiResponse<RecommendationList>, AppError> {
    let Json(request) = payload.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let mut list = RecommendationList::new(state.service.constraint_based(&request.constraints));
    list.constraints = Some(request.constraints);
    Ok(ApiResponse::ok(list))
}

async fn similar_handler(
    State(state): State<AdvisorState>,
    laptop_id: Result<Path<usize>, PathRejection>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<ApiResponse<RecommendationList>, AppError> {
    let Path(laptop_id) = laptop_id.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let laptop_id = LaptopId(laptop_id);
    let limit = resolve_limit(query, DEFAULT_SIMILAR_LIMIT)?;
    let mut list = RecommendationList::new(state.service.similar_to(laptop_id, limit)?);
    list.laptop_id = Some(laptop_id);
    Ok(ApiResponse::ok(list))
}

async fn trending_handler(
    State(state): State<AdvisorState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<ApiResponse<RecommendationList>, AppError> {
    let limit = resolve_limit(query, DEFAULT_TRENDING_LIMIT)?;
    Ok(ApiResponse::ok(RecommendationList::new(
        state.service.trending(limit),
    )))
}

async fn budget_handler(
    State(state): State<AdvisorState>,
    max_price: Result<Path<f64>, PathRejection>,
) -> Result<ApiResponse<RecommendationList>, AppError> {
    let Path(max_price) = max_price.map_err(|err| AppError::BadRequest(err.body_text()))?;
    if !max_price.is_finite() || max_price <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "max_price must be a positive number, got {max_price}"
        )));
    }
    let mut list = RecommendationList::new(state.service.budget(max_price));
    list.constraints = Some(ConstraintSet::with_max_price(max_price));
    Ok(ApiResponse::ok(list))
}

async fn brand_handler(
    State(state): State<AdvisorState>,
    Path(brand): Path<String>,
) -> ApiResponse<RecommendationList> {
    let mut list = RecommendationList::new(state.service.by_brand(&brand));
    list.constraints = Some(ConstraintSet::with_brand(brand));
    ApiResponse::ok(list)
}

async fn use_case_handler(
    State(state): State<AdvisorState>,
    payload: Result<Json<UseCaseRequest>, JsonRejection>,
) -> Result<ApiResponse<RecommendationList>, AppError> {
    let Json(request) = payload.map_err(|err| AppError::BadRequest(err.body_text()))?;
    Ok(ApiResponse::ok(RecommendationList::new(
        state
            .service
            .use_case(&request.use_case, request.constraints),
    )))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{get, post};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn ids(body: &Value) -> Vec<u64> {
        body["data"]["recommendations"]
            .as_array()
            .expect("recommendations")
            .iter()
            .map(|item| item["laptop_id"].as_u64().expect("id"))
            .collect()
    }

    #[tokio::test]
    async fn constraint_based_accepts_camel_case_keys() {
        let (status, body) = post(
            "/api/v1/recommendations/constraint-based",
            json!({"constraints": {"maxPrice": "1000"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![0]);
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["recommendations"][0]["match_reasons"][0], "Within budget: $900");
    }

    #[tokio::test]
    async fn constraint_results_always_carry_match_reasons() {
        let (status, body) = post(
            "/api/v1/recommendations/constraint-based",
            json!({"constraints": {"processor_type": "intel"}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![0, 1, 2]);
        assert_eq!(body["data"]["recommendations"][0]["match_reasons"], json!([]));

        let (_, trending) = get("/api/v1/recommendations/trending").await;
        assert!(trending["data"]["recommendations"][0]
            .get("match_reasons")
            .is_none());
    }

    #[tokio::test]
    async fn constraint_based_rejects_malformed_values() {
        let (status, body) = post(
            "/api/v1/recommendations/constraint-based",
            json!({"constraints": {"max_price": "cheap"}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn similar_answers_not_found_for_unknown_id() {
        let (status, body) = get("/api/v1/recommendations/similar/0?limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 1);
        assert!(!ids(&body).contains(&0));

        let (status, body) = get("/api/v1/recommendations/similar/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "laptop 42 not found");
    }

    #[tokio::test]
    async fn trending_orders_by_popularity() {
        let (status, body) = get("/api/v1/recommendations/trending").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![0, 1, 2]);

        let (status, _) = get("/api/v1/recommendations/trending?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn budget_and_brand_routes_rank() {
        let (status, body) = get("/api/v1/recommendations/budget/1500").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![0, 1]);
        assert!(body["data"]["recommendations"][0]["value_score"].is_number());

        let (status, _) = get("/api/v1/recommendations/budget/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = get("/api/v1/recommendations/brand/hp").await;
        assert_eq!(ids(&body), vec![1]);
    }

    #[tokio::test]
    async fn use_case_applies_preset() {
        let (status, body) = post(
            "/api/v1/recommendations/use-case",
            json!({"use_case": "student"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![0]);
    }
}
