//! Hard eligibility, additive scoring, and match explanations for one
//! record against one [`ConstraintSet`].

use crate::catalog::LaptopRecord;

use super::constraints::ConstraintSet;

pub const BRAND_WEIGHT: f64 = 10.0;
pub const PRICE_CEILING: f64 = 10.0;
pub const PRICE_RATIO_WEIGHT: f64 = 5.0;
pub const RATING_WEIGHT: f64 = 2.0;
pub const PROCESSOR_WEIGHT: f64 = 5.0;
pub const MEMORY_WEIGHT: f64 = 3.0;
pub const STORAGE_WEIGHT: f64 = 3.0;

/// Number of results a constraint-based ranking returns.
pub const MAX_RESULTS: usize = 10;

fn contains_ignore_case(field: Option<&str>, wanted: Option<&str>) -> bool {
    match (field, wanted) {
        (Some(field), Some(wanted)) => field.to_lowercase().contains(&wanted.to_lowercase()),
        _ => false,
    }
}

/// A record failing any set bound is removed before scoring. Records with
/// an unknown price or rating fail the corresponding bound.
pub fn is_hard_eligible(record: &LaptopRecord, constraints: &ConstraintSet) -> bool {
    if let Some(max_price) = constraints.max_price {
        match record.price() {
            Some(price) if price <= max_price => {}
            _ => return false,
        }
    }

    if let Some(min_rating) = constraints.min_rating {
        match record.rating() {
            Some(summary) if summary.rating >= min_rating => {}
            _ => return false,
        }
    }

    true
}

fn brand_matches(record: &LaptopRecord, constraints: &ConstraintSet) -> bool {
    contains_ignore_case(Some(&record.brand), constraints.brand.as_deref())
}

fn price_component(record: &LaptopRecord, constraints: &ConstraintSet) -> Option<f64> {
    let max_price = constraints.max_price?;
    let price = record.price()?;
    (price <= max_price).then(|| (PRICE_CEILING - (price / max_price) * PRICE_RATIO_WEIGHT).max(0.0))
}

fn rating_component(record: &LaptopRecord, constraints: &ConstraintSet) -> Option<f64> {
    let min_rating = constraints.min_rating?;
    let rating = record.rating()?.rating;
    (rating >= min_rating).then_some(rating * RATING_WEIGHT)
}

pub fn score(record: &LaptopRecord, constraints: &ConstraintSet) -> f64 {
    let mut score = 0.0;

    if brand_matches(record, constraints) {
        score += BRAND_WEIGHT;
    }
    score += price_component(record, constraints).unwrap_or(0.0);
    score += rating_component(record, constraints).unwrap_or(0.0);
    if contains_ignore_case(record.processor.as_deref(), constraints.processor_type.as_deref()) {
        score += PROCESSOR_WEIGHT;
    }
    if contains_ignore_case(record.memory.as_deref(), constraints.min_memory.as_deref()) {
        score += MEMORY_WEIGHT;
    }
    if contains_ignore_case(record.storage.as_deref(), constraints.storage_type.as_deref()) {
        score += STORAGE_WEIGHT;
    }

    score
}

/// Explanations for the brand, price and rating criteria, in that order.
pub fn match_reasons(record: &LaptopRecord, constraints: &ConstraintSet) -> Vec<String> {
    let mut reasons = Vec::new();

    if brand_matches(record, constraints) {
        reasons.push(format!("Matches preferred brand: {}", record.brand));
    }

    if price_component(record, constraints).is_some() {
        if let Some(listed) = record.listed_price() {
            reasons.push(format!("Within budget: {listed}"));
        }
    }

    if rating_component(record, constraints).is_some() {
        if let Some(label) = record.overall_rating_label() {
            reasons.push(format!("High rating: {label}"));
        }
    }

    reasons
}

/// A record that passed the hard filter together with its score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredRecord<'a> {
    pub record: &'a LaptopRecord,
    pub score: f64,
}

/// Hard filter, score, keep positive scores, stable sort descending, top `limit`.
pub fn rank<'a>(
    records: &'a [LaptopRecord],
    constraints: &ConstraintSet,
    limit: usize,
) -> Vec<ScoredRecord<'a>> {
    let mut scored: Vec<ScoredRecord<'a>> = records
        .iter()
        .filter(|record| is_hard_eligible(record, constraints))
        .map(|record| ScoredRecord {
            record,
            score: score(record, constraints),
        })
        .filter(|entry| entry.score > 0.0)
        .collect();

    scored.sort_by(|left, right| right.score.total_cmp(&left.score));
    scored.truncate(limit);
    scored
}
