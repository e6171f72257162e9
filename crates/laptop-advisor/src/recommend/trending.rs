use crate::catalog::{LaptopRecord, RatingSummary};

pub fn trending_score(summary: RatingSummary) -> f64 {
    summary.rating * ((summary.review_count as f64) + 1.0).ln()
}

#[derive(Debug, Clone, Copy)]
pub struct TrendingEntry<'a> {
    pub record: &'a LaptopRecord,
    pub summary: RatingSummary,
    pub score: f64,
}

/// Rated records by descending `rating * ln(count + 1)`; unrated records are skipped.
pub fn rank(records: &[LaptopRecord], limit: usize) -> Vec<TrendingEntry<'_>> {
    let mut entries: Vec<TrendingEntry<'_>> = records
        .iter()
        .filter_map(|record| {
            let summary = record.rating()?;
            Some(TrendingEntry {
                record,
                summary,
                score: trending_score(summary),
            })
        })
        .collect();

    entries.sort_by(|left, right| right.score.total_cmp(&left.score));
    entries.truncate(limit);
    entries
}
