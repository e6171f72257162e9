use serde_json::Value;
use tracing::debug;

use super::literal::{parse_literal, parse_map, parse_string_list};
use super::normalizer::{normalize_rating, AI_SUMMARY_KEY, CURRENT_PRICE_KEY, OVERALL_RATING_KEY};
use super::parser::LaptopRow;
use super::record::{Details, LaptopId, LaptopRecord, UNKNOWN};

const DEFAULT_PROCESSOR: &str = "Intel Core i5";
const DEFAULT_OPERATING_SYSTEM: &str = "Windows 11";
const DEFAULT_GRAPHICS: &str = "Integrated";

/// Memory, storage and display assumed when the dataset leaves them blank.
struct SpecDefaults {
    memory: &'static str,
    storage: &'static str,
    display: &'static str,
}

const BUSINESS_LINE_DEFAULTS: SpecDefaults = SpecDefaults {
    memory: "8GB DDR4 (upgradeable)",
    storage: "256GB SSD (upgradeable)",
    display: "14\" FHD IPS",
};

const BASELINE_DEFAULTS: SpecDefaults = SpecDefaults {
    memory: "8GB DDR4",
    storage: "256GB SSD",
    display: "14\" FHD",
};

const BUSINESS_LINES: &[&str] = &["ThinkPad", "ProBook"];

pub(crate) fn record_from_row(laptop_id: LaptopId, row: LaptopRow) -> LaptopRecord {
    let LaptopRow {
        brand,
        model,
        processor,
        memory,
        storage,
        display,
        operating_system,
        graphics,
        price_details,
        review_details,
        availability,
        promos,
        qa,
        extras,
    } = row;

    let brand = brand.unwrap_or_else(|| UNKNOWN.to_string());
    let model = model.unwrap_or_else(|| UNKNOWN.to_string());
    let defaults = spec_defaults(&model);

    LaptopRecord {
        laptop_id,
        processor: Some(infer_processor(&model, processor)),
        memory: Some(memory.unwrap_or_else(|| defaults.memory.to_string())),
        storage: Some(storage.unwrap_or_else(|| defaults.storage.to_string())),
        display: Some(display.unwrap_or_else(|| defaults.display.to_string())),
        operating_system: Some(
            operating_system.unwrap_or_else(|| DEFAULT_OPERATING_SYSTEM.to_string()),
        ),
        graphics: Some(graphics.unwrap_or_else(|| DEFAULT_GRAPHICS.to_string())),
        price_details: price_details_from(laptop_id, price_details.as_deref()),
        review_details: review_details_from(laptop_id, review_details.as_deref()),
        availability: availability
            .as_deref()
            .and_then(parse_map)
            .unwrap_or_default(),
        promos: promos
            .as_deref()
            .and_then(parse_string_list)
            .unwrap_or_default(),
        qa: qa_entries_from(laptop_id, qa.as_deref()),
        specifications: extras.into_iter().collect(),
        brand,
        model,
    }
}

/// Model names that mention a CPU vendor override the processor column.
fn infer_processor(model: &str, processor: Option<String>) -> String {
    if model.contains("AMD") {
        "AMD Ryzen (varies by model)".to_string()
    } else if model.contains("Intel") {
        "Intel Core (varies by model)".to_string()
    } else {
        processor.unwrap_or_else(|| DEFAULT_PROCESSOR.to_string())
    }
}

fn spec_defaults(model: &str) -> &'static SpecDefaults {
    if BUSINESS_LINES.iter().any(|line| model.contains(line)) {
        &BUSINESS_LINE_DEFAULTS
    } else {
        &BASELINE_DEFAULTS
    }
}

fn price_details_from(laptop_id: LaptopId, raw: Option<&str>) -> Details {
    let Some(raw) = raw.filter(|value| *value != "-") else {
        return Details::new();
    };

    if let Some(map) = parse_map(raw) {
        return map;
    }

    debug!(%laptop_id, "price column is not a literal map, keeping it as the current price");
    let mut details = Details::new();
    details.insert(CURRENT_PRICE_KEY.to_string(), Value::String(raw.to_string()));
    details
}

fn review_details_from(laptop_id: LaptopId, raw: Option<&str>) -> Details {
    let Some(raw) = raw.filter(|value| *value != "-") else {
        return Details::new();
    };

    if let Some(map) = parse_map(raw) {
        return map;
    }

    if raw.contains("out of 5 stars") {
        if let Some(summary) = normalize_rating(raw) {
            let rating = format_rating(summary.rating);
            let mut details = Details::new();
            details.insert(
                OVERALL_RATING_KEY.to_string(),
                Value::String(format!("{rating}/5 ({} reviews)", summary.review_count)),
            );
            details.insert(
                AI_SUMMARY_KEY.to_string(),
                Value::String(format!(
                    "User rating: {rating}/5 stars based on {} reviews.",
                    summary.review_count
                )),
            );
            return details;
        }
    }

    debug!(%laptop_id, "review column unreadable, treating the laptop as unrated");
    Details::new()
}

/// Question/answer entries; a single literal that is not a list is kept as
/// one entry.
fn qa_entries_from(laptop_id: LaptopId, raw: Option<&str>) -> Vec<Value> {
    let Some(raw) = raw.filter(|value| *value != "-") else {
        return Vec::new();
    };

    match parse_literal(raw) {
        Some(Value::Array(entries)) => entries,
        Some(Value::Null) => Vec::new(),
        Some(entry) => vec![entry],
        None => {
            debug!(%laptop_id, "Q&A column is not a literal, ignoring it");
            Vec::new()
        }
    }
}

fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{rating:.0}")
    } else {
        rating.to_string()
    }
}
