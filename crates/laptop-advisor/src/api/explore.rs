use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{AdvisorState, ApiResponse};
use crate::catalog::{FilterOptions, LaptopId, LaptopRecord, RatingSummary, SearchFilters};
use crate::error::AppError;

pub(super) fn routes() -> Router<AdvisorState> {
    Router::new()
        .route("/api/v1/explore", get(list_handler))
        .route("/api/v1/explore/", get(list_handler))
        .route("/api/v1/explore/filter-options", get(filter_options_handler))
        .route("/api/v1/explore/search", get(search_handler))
        .route("/api/v1/explore/:laptop_id", get(detail_handler))
        .route(
            "/api/v1/explore/:laptop_id/specifications",
            get(specifications_handler),
        )
}

#[derive(Debug, Serialize)]
pub(crate) struct LaptopList {
    laptops: Vec<LaptopRecord>,
    count: usize,
}

impl LaptopList {
    fn new(laptops: Vec<LaptopRecord>) -> Self {
        Self {
            count: laptops.len(),
            laptops,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LaptopDetail {
    #[serde(flatten)]
    record: LaptopRecord,
    price: Option<f64>,
    rating: Option<RatingSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Specifications {
    laptop_id: LaptopId,
    brand: String,
    model: String,
    specifications: BTreeMap<String, String>,
}

pub(super) fn laptop_id(raw: Result<Path<usize>, PathRejection>) -> Result<LaptopId, AppError> {
    raw.map(|Path(id)| LaptopId(id))
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

pub(super) fn not_found(laptop_id: LaptopId) -> AppError {
    AppError::NotFound(format!("laptop {laptop_id} not found"))
}

async fn list_handler(State(state): State<AdvisorState>) -> ApiResponse<LaptopList> {
    let snapshot = state.service.snapshot();
    ApiResponse::ok(LaptopList::new(snapshot.catalog().all_records().to_vec()))
}

async fn filter_options_handler(State(state): State<AdvisorState>) -> ApiResponse<FilterOptions> {
    ApiResponse::ok(state.service.snapshot().catalog().filter_options())
}

async fn search_handler(
    State(state): State<AdvisorState>,
    filters: Result<Query<SearchFilters>, QueryRejection>,
) -> Result<ApiResponse<LaptopList>, AppError> {
    let Query(filters) = filters.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let snapshot = state.service.snapshot();
    let found = snapshot
        .catalog()
        .search(&filters)
        .into_iter()
        .cloned()
        .collect();
    Ok(ApiResponse::ok(LaptopList::new(found)))
}

async fn detail_handler(
    State(state): State<AdvisorState>,
    raw_id: Result<Path<usize>, PathRejection>,
) -> Result<ApiResponse<LaptopDetail>, AppError> {
    let laptop_id = laptop_id(raw_id)?;
    let snapshot = state.service.snapshot();
    let record = snapshot
        .catalog()
        .record_by_id(laptop_id)
        .ok_or_else(|| not_found(laptop_id))?;
    Ok(ApiResponse::ok(LaptopDetail {
        price: record.price(),
        rating: record.rating(),
        record: record.clone(),
    }))
}

async fn specifications_handler(
    State(state): State<AdvisorState>,
    raw_id: Result<Path<usize>, PathRejection>,
) -> Result<ApiResponse<Specifications>, AppError> {
    let laptop_id = laptop_id(raw_id)?;
    let snapshot = state.service.snapshot();
    let catalog = snapshot.catalog();
    let (record, specifications) = catalog
        .record_by_id(laptop_id)
        .zip(catalog.specifications(laptop_id))
        .ok_or_else(|| not_found(laptop_id))?;
    Ok(ApiResponse::ok(Specifications {
        laptop_id,
        brand: record.brand.clone(),
        model: record.model.clone(),
        specifications,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::get;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn list_and_search() {
        let (status, body) = get("/api/v1/explore/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 3);

        let (status, body) = get("/api/v1/explore/search?q=thinkpad&max_price=1000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["laptops"][0]["model"], "ThinkPad E14");

        let (status, _) = get("/api/v1/explore/search?max_price=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn filter_options_are_distinct() {
        let (_, body) = get("/api/v1/explore/filter-options").await;
        assert_eq!(body["data"]["brands"], serde_json::json!(["HP", "Lenovo"]));
    }

    #[tokio::test]
    async fn detail_includes_normalized_values() {
        let (status, body) = get("/api/v1/explore/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["brand"], "HP");
        assert_eq!(body["data"]["price"], 1200.0);
        assert_eq!(body["data"]["rating"]["review_count"], 10);

        let (status, body) = get("/api/v1/explore/7/specifications").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, body) = get("/api/v1/explore/0/specifications").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["specifications"]["Processor"], "Intel Core i5");
    }
}
