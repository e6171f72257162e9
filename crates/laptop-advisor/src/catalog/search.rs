use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::record::{Details, LaptopId, LaptopRecord};
use super::LaptopCatalog;

/// Free-text query plus per-field filters accepted by catalog search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub processor: Option<String>,
    #[serde(default)]
    pub memory: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub brands: Vec<String>,
    pub processors: Vec<String>,
    pub memory: Vec<String>,
    pub storage: Vec<String>,
    pub displays: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total_products: usize,
    pub products_with_reviews: usize,
    pub avg_rating: f64,
    /// Counts keyed by whole-star bucket, e.g. `"4-5"`.
    pub rating_distribution: BTreeMap<String, usize>,
}

/// Per-laptop rating line for the reviews listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewEntry {
    pub laptop_id: LaptopId,
    pub brand: String,
    pub model: String,
    pub overall_rating: Option<f64>,
    pub review_count: Option<u64>,
    pub ai_summary: Option<String>,
    pub review_details: Details,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewsAndQa {
    pub laptop_id: LaptopId,
    pub brand: String,
    pub model: String,
    pub reviews: Details,
    pub qa: Vec<Value>,
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn field_matches(field: Option<&str>, filter: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|value| !value.is_empty()) {
        None => true,
        Some(wanted) => field
            .map(|value| contains_ignore_case(value, &wanted.to_lowercase()))
            .unwrap_or(false),
    }
}

impl SearchFilters {
    fn query_matches(&self, record: &LaptopRecord) -> bool {
        let Some(query) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return true;
        };
        let query = query.to_lowercase();

        [
            Some(record.brand.as_str()),
            Some(record.model.as_str()),
            record.processor.as_deref(),
            record.operating_system.as_deref(),
            record.graphics.as_deref(),
            record.memory.as_deref(),
            record.storage.as_deref(),
            record.display.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| contains_ignore_case(field, &query))
    }

    fn price_matches(&self, record: &LaptopRecord) -> bool {
        if self.min_price.is_none() && self.max_price.is_none() {
            return true;
        }
        let Some(price) = record.price() else {
            return false;
        };
        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }

    fn rating_matches(&self, record: &LaptopRecord) -> bool {
        match self.min_rating {
            None => true,
            Some(min) => record
                .rating()
                .map(|summary| summary.rating >= min)
                .unwrap_or(false),
        }
    }

    pub fn matches(&self, record: &LaptopRecord) -> bool {
        self.query_matches(record)
            && field_matches(Some(&record.brand), self.brand.as_deref())
            && field_matches(record.processor.as_deref(), self.processor.as_deref())
            && field_matches(record.memory.as_deref(), self.memory.as_deref())
            && field_matches(record.storage.as_deref(), self.storage.as_deref())
            && field_matches(record.display.as_deref(), self.display.as_deref())
            && self.price_matches(record)
            && self.rating_matches(record)
    }
}

impl LaptopCatalog {
    pub fn search(&self, filters: &SearchFilters) -> Vec<&LaptopRecord> {
        self.all_records()
            .iter()
            .filter(|record| filters.matches(record))
            .collect()
    }

    pub fn filter_options(&self) -> FilterOptions {
        fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
            values
                .flatten()
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        let records = self.all_records();
        FilterOptions {
            brands: distinct(records.iter().map(|r| Some(r.brand.as_str()))),
            processors: distinct(records.iter().map(|r| r.processor.as_deref())),
            memory: distinct(records.iter().map(|r| r.memory.as_deref())),
            storage: distinct(records.iter().map(|r| r.storage.as_deref())),
            displays: distinct(records.iter().map(|r| r.display.as_deref())),
        }
    }

    /// `None` when no record carries a usable price.
    pub fn price_range(&self) -> Option<PriceRange> {
        let prices: Vec<f64> = self.all_records().iter().filter_map(LaptopRecord::price).collect();
        if prices.is_empty() {
            return None;
        }

        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = prices.iter().sum::<f64>() / prices.len() as f64;
        Some(PriceRange { min, max, avg })
    }

    pub fn review_stats(&self) -> ReviewStats {
        let ratings: Vec<f64> = self
            .all_records()
            .iter()
            .filter_map(|record| record.rating().map(|summary| summary.rating))
            .collect();

        let mut stats = ReviewStats {
            total_products: self.len(),
            products_with_reviews: ratings.len(),
            ..ReviewStats::default()
        };
        if ratings.is_empty() {
            return stats;
        }

        stats.avg_rating = ratings.iter().sum::<f64>() / ratings.len() as f64;
        for rating in ratings {
            let floor = rating.floor() as u32;
            *stats
                .rating_distribution
                .entry(format!("{floor}-{}", floor + 1))
                .or_default() += 1;
        }
        stats
    }

    /// One entry per record in id order, rated or not.
    pub fn reviews(&self) -> Vec<ReviewEntry> {
        self.all_records()
            .iter()
            .map(|record| {
                let summary = record.rating();
                ReviewEntry {
                    laptop_id: record.laptop_id,
                    brand: record.brand.clone(),
                    model: record.model.clone(),
                    overall_rating: summary.map(|summary| summary.rating),
                    review_count: summary.map(|summary| summary.review_count),
                    ai_summary: record.review_summary().map(str::to_string),
                    review_details: record.review_details.clone(),
                }
            })
            .collect()
    }

    pub fn reviews_and_qa(&self, laptop_id: LaptopId) -> Option<ReviewsAndQa> {
        let record = self.record_by_id(laptop_id)?;
        Some(ReviewsAndQa {
            laptop_id,
            brand: record.brand.clone(),
            model: record.model.clone(),
            reviews: record.review_details.clone(),
            qa: record.qa.clone(),
        })
    }

    /// Specification text for one laptop: the core hardware fields followed by
    /// every extra dataset column.
    pub fn specifications(&self, laptop_id: LaptopId) -> Option<BTreeMap<String, String>> {
        let record = self.record_by_id(laptop_id)?;
        let mut specs = record.specifications.clone();
        let core = [
            ("Processor", &record.processor),
            ("Operating System", &record.operating_system),
            ("Graphics", &record.graphics),
            ("Memory (RAM)", &record.memory),
            ("Storage", &record.storage),
            ("Display", &record.display),
        ];
        for (name, value) in core {
            if let Some(value) = value {
                specs.insert(name.to_string(), value.clone());
            }
        }
        Some(specs)
    }
}
