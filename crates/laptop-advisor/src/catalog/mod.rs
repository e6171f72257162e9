//! In-memory laptop catalog loaded from the dataset CSV.

mod literal;
mod mapping;
pub mod normalizer;
mod parser;
pub mod record;
mod search;

pub use normalizer::RatingSummary;
pub use record::{Details, LaptopId, LaptopRecord};
pub use search::{
    FilterOptions, PriceRange, ReviewEntry, ReviewStats, ReviewsAndQa, SearchFilters,
};

use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read laptop dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid laptop dataset CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Immutable, id-addressable set of laptop records.
///
/// Ids are assigned by load order, so `record_by_id` is a direct index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaptopCatalog {
    records: Vec<LaptopRecord>,
}

impl LaptopCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        info!(path = %path.display(), laptops = catalog.len(), "laptop dataset loaded");
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let records = parser::parse_rows(reader)?
            .into_iter()
            .enumerate()
            .map(|(index, row)| mapping::record_from_row(LaptopId(index), row))
            .collect();
        Ok(Self { records })
    }

    /// Builds a catalog from prepared records, re-deriving ids from position.
    pub fn from_records(records: Vec<LaptopRecord>) -> Self {
        let records = records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                record.laptop_id = LaptopId(index);
                record
            })
            .collect();
        Self { records }
    }

    pub fn all_records(&self) -> &[LaptopRecord] {
        &self.records
    }

    pub fn record_by_id(&self, laptop_id: LaptopId) -> Option<&LaptopRecord> {
        self.records.get(laptop_id.0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
