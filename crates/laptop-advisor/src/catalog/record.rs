use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::normalizer::{
    self, RatingSummary, AI_SUMMARY_KEY, CURRENT_PRICE_KEY, OVERALL_RATING_KEY,
};

pub const UNKNOWN: &str = "Unknown";
pub const NO_REVIEW_SUMMARY: &str = "No review summary available";

/// Zero-based position of a record in the loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaptopId(pub usize);

impl fmt::Display for LaptopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key/value details parsed from a semi-structured column.
pub type Details = Map<String, Value>;

/// One laptop row with its specification text and parsed detail columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaptopRecord {
    pub laptop_id: LaptopId,
    pub brand: String,
    pub model: String,
    pub processor: Option<String>,
    pub memory: Option<String>,
    pub storage: Option<String>,
    pub display: Option<String>,
    pub operating_system: Option<String>,
    pub graphics: Option<String>,
    pub price_details: Details,
    pub review_details: Details,
    pub availability: Details,
    pub promos: Vec<String>,
    /// Parsed `Q&A / FAQ` entries, usually `{'Question': .., 'Answer': ..}` maps.
    pub qa: Vec<Value>,
    /// Remaining dataset columns, keyed by their header.
    pub specifications: BTreeMap<String, String>,
}

impl LaptopRecord {
    /// A bare record with only identity fields filled in.
    pub fn new(laptop_id: LaptopId, brand: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            laptop_id,
            brand: brand.into(),
            model: model.into(),
            processor: None,
            memory: None,
            storage: None,
            display: None,
            operating_system: None,
            graphics: None,
            price_details: Details::new(),
            review_details: Details::new(),
            availability: Details::new(),
            promos: Vec::new(),
            qa: Vec::new(),
            specifications: BTreeMap::new(),
        }
    }

    pub fn price(&self) -> Option<f64> {
        normalizer::price_from_details(&self.price_details)
    }

    pub fn rating(&self) -> Option<RatingSummary> {
        normalizer::rating_from_details(&self.review_details)
    }

    /// The price exactly as listed, e.g. `"$1,299.00"` or `"Not Available"`.
    pub fn listed_price(&self) -> Option<String> {
        normalizer::detail_text(&self.price_details, CURRENT_PRICE_KEY)
            .map(|text| text.into_owned())
    }

    pub fn overall_rating_label(&self) -> Option<String> {
        normalizer::detail_text(&self.review_details, OVERALL_RATING_KEY)
            .map(|text| text.into_owned())
    }

    pub fn review_summary(&self) -> Option<&str> {
        self.review_details
            .get(AI_SUMMARY_KEY)
            .and_then(Value::as_str)
            .filter(|summary| !summary.trim().is_empty())
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}
