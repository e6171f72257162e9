//! Typed extraction of numeric values from the semi-structured detail fields.
//!
//! Every function here is total: malformed input resolves to `None` and never
//! to an error, so callers can treat "unparseable" and "missing" alike.

use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;

pub const NOT_AVAILABLE: &str = "Not Available";
pub const CURRENT_PRICE_KEY: &str = "Current Price";
pub const OVERALL_RATING_KEY: &str = "Overall Rating";
pub const AI_SUMMARY_KEY: &str = "AI Summary";

/// A positive rating on the five-star scale plus the number of reviews behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub rating: f64,
    pub review_count: u64,
}

/// Normalizes a price such as `"$1,299.00"` into `1299.0`.
///
/// The sentinel `"Not Available"` and anything that is not a non-negative
/// decimal once `$` and `,` are stripped yield `None`.
pub fn normalize_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return None;
    }

    let cleaned: String = trimmed.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let cleaned = cleaned.trim();
    let has_digit = cleaned.chars().any(|c| c.is_ascii_digit());
    let only_decimal = cleaned.chars().all(|c| c.is_ascii_digit() || c == '.');
    let dots = cleaned.chars().filter(|c| *c == '.').count();
    if !has_digit || !only_decimal || dots > 1 {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|price| price.is_finite())
}

/// Normalizes `"4.5/5 (116 reviews)"` or `"4.2 out of 5 stars, 48 reviews."`.
///
/// A rating of zero is treated as "no rating" rather than a real low score.
pub fn normalize_rating(raw: &str) -> Option<RatingSummary> {
    let trimmed = raw.trim();
    let slash = trimmed.split_once('/');
    let out_of = trimmed
        .find("out of")
        .map(|index| (&trimmed[..index], &trimmed[index..]));

    // The first split whose head is a number wins; "/" can also show up in
    // trailing text such as "48 reviews/ratings".
    let (rating, rest) = [slash, out_of].into_iter().flatten().find_map(|(head, tail)| {
        let rating = head.trim().parse::<f64>().ok()?;
        Some((rating, tail))
    })?;
    if !rating.is_finite() || rating <= 0.0 {
        return None;
    }

    Some(RatingSummary {
        rating,
        review_count: review_count(rest).unwrap_or(0),
    })
}

/// Finds the integer immediately preceding the word "review(s)".
fn review_count(text: &str) -> Option<u64> {
    let lower = text.to_ascii_lowercase();
    let index = lower.find("review")?;
    let before = lower[..index].trim_end();
    let digits: String = before
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse::<u64>().ok()
}

/// Text form of a detail entry; numbers are rendered as written.
pub fn detail_text<'a>(details: &'a Map<String, Value>, key: &str) -> Option<Cow<'a, str>> {
    match details.get(key)? {
        Value::String(value) => Some(Cow::Borrowed(value.as_str())),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        _ => None,
    }
}

pub fn price_from_details(details: &Map<String, Value>) -> Option<f64> {
    detail_text(details, CURRENT_PRICE_KEY).and_then(|text| normalize_price(&text))
}

pub fn rating_from_details(details: &Map<String, Value>) -> Option<RatingSummary> {
    detail_text(details, OVERALL_RATING_KEY).and_then(|text| normalize_rating(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_strips_currency_and_separators() {
        assert_eq!(normalize_price("$1,299.00"), Some(1299.0));
        assert_eq!(normalize_price(" 899 "), Some(899.0));
        assert_eq!(normalize_price("$0"), Some(0.0));
    }

    #[test]
    fn price_rejects_sentinels_and_garbage() {
        assert_eq!(normalize_price("Not Available"), None);
        assert_eq!(normalize_price("-"), None);
        assert_eq!(normalize_price("$-5"), None);
        assert_eq!(normalize_price("1.2.3"), None);
        assert_eq!(normalize_price("Call for price"), None);
        assert_eq!(normalize_price(""), None);
        assert_eq!(normalize_price("$"), None);
    }

    #[test]
    fn rating_reads_slash_format_with_count() {
        assert_eq!(
            normalize_rating("4.5/5 (116 reviews)"),
            Some(RatingSummary {
                rating: 4.5,
                review_count: 116
            })
        );
        assert_eq!(
            normalize_rating("3.9/5"),
            Some(RatingSummary {
                rating: 3.9,
                review_count: 0
            })
        );
        assert_eq!(
            normalize_rating("4/5 (1,204 reviews)"),
            Some(RatingSummary {
                rating: 4.0,
                review_count: 1204
            })
        );
    }

    #[test]
    fn rating_reads_out_of_five_stars_format() {
        assert_eq!(
            normalize_rating("4.2 out of 5 stars, 48 reviews."),
            Some(RatingSummary {
                rating: 4.2,
                review_count: 48
            })
        );
        assert_eq!(
            normalize_rating("3.5 out of 5 stars"),
            Some(RatingSummary {
                rating: 3.5,
                review_count: 0
            })
        );
    }

    #[test]
    fn slash_in_trailing_text_does_not_hide_out_of_rating() {
        assert_eq!(
            normalize_rating("4.2 out of 5 stars, 48 reviews/ratings"),
            Some(RatingSummary {
                rating: 4.2,
                review_count: 48
            })
        );
    }

    #[test]
    fn zero_and_non_numeric_ratings_are_absent() {
        assert_eq!(normalize_rating("0/5"), None);
        assert_eq!(normalize_rating("0"), None);
        assert_eq!(normalize_rating("-"), None);
        assert_eq!(normalize_rating("great/5"), None);
        assert_eq!(normalize_rating(""), None);
    }

    #[test]
    fn unreadable_review_count_defaults_to_zero() {
        let summary = normalize_rating("4.1/5 (many reviews)").expect("rating present");
        assert_eq!(summary.review_count, 0);
    }

    #[test]
    fn detail_lookups_accept_numbers_and_strings() {
        let price = json!({"Current Price": 749.5});
        let price = price.as_object().expect("object");
        assert_eq!(price_from_details(price), Some(749.5));

        let review = json!({"Overall Rating": "4.8/5 (5 reviews)"});
        let review = review.as_object().expect("object");
        assert_eq!(
            rating_from_details(review).map(|summary| summary.review_count),
            Some(5)
        );

        let empty = Map::new();
        assert_eq!(price_from_details(&empty), None);
        assert_eq!(rating_from_details(&empty), None);
    }
}
