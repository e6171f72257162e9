use serde::Serialize;

use crate::catalog::record::NO_REVIEW_SUMMARY;
use crate::catalog::{Details, LaptopId, LaptopRecord};

/// A ranked laptop with display fields and the score that placed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub laptop_id: LaptopId,
    pub brand: String,
    pub model: String,
    pub processor: Option<String>,
    pub memory: Option<String>,
    pub storage: Option<String>,
    pub display: Option<String>,
    pub price_details: Details,
    pub availability: Details,
    pub promos: Vec<String>,
    pub review_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    /// Set for constraint-based results, where it may be empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reasons: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trending_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
}

impl Recommendation {
    pub fn from_record(record: &LaptopRecord) -> Self {
        Self {
            laptop_id: record.laptop_id,
            brand: record.brand.clone(),
            model: record.model.clone(),
            processor: record.processor.clone(),
            memory: record.memory.clone(),
            storage: record.storage.clone(),
            display: record.display.clone(),
            price_details: record.price_details.clone(),
            availability: record.availability.clone(),
            promos: record.promos.clone(),
            review_summary: record
                .review_summary()
                .unwrap_or(NO_REVIEW_SUMMARY)
                .to_string(),
            match_score: None,
            match_reasons: None,
            similarity_score: None,
            trending_score: None,
            value_score: None,
            rating: None,
            review_count: None,
        }
    }

    /// The score this recommendation was ranked by, whichever kind it is.
    pub fn primary_score(&self) -> Option<f64> {
        self.value_score
            .or(self.match_score)
            .or(self.similarity_score)
            .or(self.trending_score)
    }
}
