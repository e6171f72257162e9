use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use super::explore::{laptop_id, not_found};
use super::{AdvisorState, ApiResponse};
use crate::catalog::{PriceRange, ReviewEntry, ReviewStats, ReviewsAndQa};
use crate::error::AppError;

pub(super) fn routes() -> Router<AdvisorState> {
    Router::new()
        .route("/api/v1/reviews", get(list_handler))
        .route("/api/v1/reviews/", get(list_handler))
        .route("/api/v1/reviews/stats", get(stats_handler))
        .route("/api/v1/reviews/:laptop_id", get(detail_handler))
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewList {
    reviews: Vec<ReviewEntry>,
    count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogStats {
    #[serde(flatten)]
    reviews: ReviewStats,
    price_range: Option<PriceRange>,
}

async fn list_handler(State(state): State<AdvisorState>) -> ApiResponse<ReviewList> {
    let reviews = state.service.snapshot().catalog().reviews();
    ApiResponse::ok(ReviewList {
        count: reviews.len(),
        reviews,
    })
}

async fn detail_handler(
    State(state): State<AdvisorState>,
    raw_id: Result<Path<usize>, PathRejection>,
) -> Result<ApiResponse<ReviewsAndQa>, AppError> {
    let laptop_id = laptop_id(raw_id)?;
    state
        .service
        .snapshot()
        .catalog()
        .reviews_and_qa(laptop_id)
        .map(ApiResponse::ok)
        .ok_or_else(|| not_found(laptop_id))
}

async fn stats_handler(State(state): State<AdvisorState>) -> ApiResponse<CatalogStats> {
    let snapshot = state.service.snapshot();
    let catalog = snapshot.catalog();
    ApiResponse::ok(CatalogStats {
        reviews: catalog.review_stats(),
        price_range: catalog.price_range(),
    })
}
