//! Recommendation engine: constraint ranking, content similarity, trending.

mod constraints;
pub mod matcher;
pub mod similarity;
pub mod tfidf;
pub mod trending;
pub mod use_case;
mod views;

pub use constraints::{ConstraintError, ConstraintSet};
pub use similarity::SimilarityIndex;
pub use views::Recommendation;

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use crate::catalog::{CatalogError, LaptopCatalog, LaptopId};

pub const DEFAULT_SIMILAR_LIMIT: usize = 5;
pub const DEFAULT_TRENDING_LIMIT: usize = 5;

/// A catalog together with the similarity index derived from it.
#[derive(Debug)]
pub struct CatalogSnapshot {
    catalog: LaptopCatalog,
    similarity: SimilarityIndex,
}

impl CatalogSnapshot {
    pub fn build(catalog: LaptopCatalog) -> Self {
        let similarity = SimilarityIndex::build(catalog.all_records());
        Self {
            catalog,
            similarity,
        }
    }

    pub fn catalog(&self) -> &LaptopCatalog {
        &self.catalog
    }

    pub fn similarity(&self) -> &SimilarityIndex {
        &self.similarity
    }

    pub fn constraint_based(&self, constraints: &ConstraintSet) -> Vec<Recommendation> {
        matcher::rank(self.catalog.all_records(), constraints, matcher::MAX_RESULTS)
            .into_iter()
            .map(|entry| {
                let mut view = Recommendation::from_record(entry.record);
                view.match_score = Some(entry.score);
                view.match_reasons = Some(matcher::match_reasons(entry.record, constraints));
                view
            })
            .collect()
    }

    pub fn similar_to(
        &self,
        laptop_id: LaptopId,
        k: usize,
    ) -> Result<Vec<Recommendation>, LookupError> {
        if self.catalog.record_by_id(laptop_id).is_none() {
            return Err(LookupError::NotFound(laptop_id));
        }

        Ok(self
            .similarity
            .most_similar(laptop_id, k)
            .into_iter()
            .filter_map(|(id, score)| {
                let record = self.catalog.record_by_id(id)?;
                let mut view = Recommendation::from_record(record);
                view.similarity_score = Some(score);
                Some(view)
            })
            .collect())
    }

    pub fn trending(&self, limit: usize) -> Vec<Recommendation> {
        trending::rank(self.catalog.all_records(), limit)
            .into_iter()
            .map(|entry| {
                let mut view = Recommendation::from_record(entry.record);
                view.trending_score = Some(entry.score);
                view.rating = Some(entry.summary.rating);
                view.review_count = Some(entry.summary.review_count);
                view
            })
            .collect()
    }

    pub fn budget(&self, max_price: f64) -> Vec<Recommendation> {
        let constraints = ConstraintSet::with_max_price(max_price);
        let mut views: Vec<Recommendation> = self
            .constraint_based(&constraints)
            .into_iter()
            .map(|mut view| {
                let price = self
                    .catalog
                    .record_by_id(view.laptop_id)
                    .and_then(|record| record.price())
                    .filter(|price| *price > 0.0);
                view.value_score = Some(match (view.match_score, price) {
                    (Some(score), Some(price)) => score / price,
                    _ => 0.0,
                });
                view
            })
            .collect();

        views.sort_by(|left, right| {
            right
                .value_score
                .unwrap_or(0.0)
                .total_cmp(&left.value_score.unwrap_or(0.0))
        });
        views
    }

    pub fn use_case(&self, name: &str, constraints: ConstraintSet) -> Vec<Recommendation> {
        let constraints = match use_case::preset(name) {
            Some(preset) => constraints.overlaid_with(&preset),
            None => constraints,
        };
        self.constraint_based(&constraints)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("laptop {0} not found")]
    NotFound(LaptopId),
}

/// Shared entry point for every ranking operation.
///
/// Each call works against one snapshot `Arc` for its whole duration, so a
/// concurrent reload is either fully visible or not at all; reloads build a
/// full snapshot first and swap it in.
#[derive(Debug)]
pub struct RecommendationService {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl RecommendationService {
    pub fn new(catalog: LaptopCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(CatalogSnapshot::build(catalog))),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Ok(Self::new(LaptopCatalog::from_path(path)?))
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reload(&self, catalog: LaptopCatalog) {
        let snapshot = Arc::new(CatalogSnapshot::build(catalog));
        let laptops = snapshot.catalog.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        info!(laptops, "catalog snapshot replaced");
    }

    pub fn reload_from_path<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
        let catalog = LaptopCatalog::from_path(path)?;
        self.reload(catalog);
        Ok(())
    }

    pub fn constraint_based(&self, constraints: &ConstraintSet) -> Vec<Recommendation> {
        self.snapshot().constraint_based(constraints)
    }

    /// Records most similar to `laptop_id`, never including it.
    ///
    /// An unknown id is an error; an unavailable similarity index is an
    /// empty result.
    pub fn similar_to(
        &self,
        laptop_id: LaptopId,
        k: usize,
    ) -> Result<Vec<Recommendation>, LookupError> {
        self.snapshot().similar_to(laptop_id, k)
    }

    pub fn trending(&self, limit: usize) -> Vec<Recommendation> {
        self.snapshot().trending(limit)
    }

    /// Constraint ranking under `max_price`, re-ordered by score per dollar.
    pub fn budget(&self, max_price: f64) -> Vec<Recommendation> {
        self.snapshot().budget(max_price)
    }

    pub fn by_brand(&self, brand: &str) -> Vec<Recommendation> {
        self.constraint_based(&ConstraintSet::with_brand(brand))
    }

    /// Constraint ranking with the named preset laid over `constraints`.
    pub fn use_case(&self, name: &str, constraints: ConstraintSet) -> Vec<Recommendation> {
        self.snapshot().use_case(name, constraints)
    }
}
