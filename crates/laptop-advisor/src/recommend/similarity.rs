use tracing::{info, warn};

use crate::catalog::{LaptopId, LaptopRecord};

use super::tfidf::{TfidfVectorizer, VectorizeError};

/// Precomputed pairwise cosine similarity between every pair of records.
///
/// The matrix is dense, so memory grows with the square of the catalog size.
#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityIndex {
    Ready(SimilarityMatrix),
    /// The corpus could not be vectorized; every query answers empty.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn score(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.size || column >= self.size {
            return None;
        }
        self.scores.get(row * self.size + column).copied()
    }
}

/// Text that describes a record for similarity purposes.
pub fn feature_document(record: &LaptopRecord) -> String {
    [
        Some(record.brand.as_str()),
        Some(record.model.as_str()),
        record.processor.as_deref(),
        record.operating_system.as_deref(),
        record.graphics.as_deref(),
        record.memory.as_deref(),
        record.storage.as_deref(),
        record.display.as_deref(),
        record.review_summary(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

impl SimilarityIndex {
    pub fn build(records: &[LaptopRecord]) -> Self {
        Self::build_with(records, TfidfVectorizer::default())
    }

    pub fn build_with(records: &[LaptopRecord], vectorizer: TfidfVectorizer) -> Self {
        let documents: Vec<String> = records.iter().map(feature_document).collect();

        if documents.len() > 1 && documents.windows(2).all(|pair| pair[0] == pair[1]) {
            warn!(documents = documents.len(), "all feature documents identical, similarity disabled");
            return Self::Unavailable;
        }

        let matrix = match vectorizer.fit_transform(&documents) {
            Ok(matrix) => matrix,
            Err(VectorizeError::EmptyCorpus) => {
                info!("empty catalog, similarity disabled");
                return Self::Unavailable;
            }
            Err(err) => {
                warn!(error = %err, "similarity build failed, similarity disabled");
                return Self::Unavailable;
            }
        };

        let size = matrix.rows.len();
        let mut scores = vec![0.0; size * size];
        for row in 0..size {
            scores[row * size + row] = 1.0;
            for column in (row + 1)..size {
                let score = matrix.rows[row].dot(&matrix.rows[column]).clamp(0.0, 1.0);
                scores[row * size + column] = score;
                scores[column * size + row] = score;
            }
        }

        info!(
            laptops = size,
            vocabulary = matrix.vocabulary.len(),
            "similarity matrix built"
        );
        Self::Ready(SimilarityMatrix { size, scores })
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Up to `k` other records ordered by descending similarity; ties keep
    /// ascending id order. Empty when the index is unavailable or the id is
    /// out of range.
    pub fn most_similar(&self, laptop_id: LaptopId, k: usize) -> Vec<(LaptopId, f64)> {
        let Self::Ready(matrix) = self else {
            return Vec::new();
        };
        if laptop_id.0 >= matrix.size {
            return Vec::new();
        }

        let mut neighbours: Vec<(LaptopId, f64)> = (0..matrix.size)
            .filter(|&column| column != laptop_id.0)
            .filter_map(|column| {
                matrix
                    .score(laptop_id.0, column)
                    .map(|score| (LaptopId(column), score))
            })
            .collect();
        neighbours.sort_by(|left, right| right.1.total_cmp(&left.1));
        neighbours.truncate(k);
        neighbours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop(id: usize, brand: &str, model: &str, processor: &str) -> LaptopRecord {
        let mut record = LaptopRecord::new(LaptopId(id), brand, model);
        record.processor = Some(processor.to_string());
        record
    }

    #[test]
    fn closest_records_rank_first_and_self_is_excluded() {
        let records = vec![
            laptop(0, "Lenovo", "ThinkPad T14", "Intel Core i7"),
            laptop(1, "Apple", "MacBook Air", "Apple M2"),
            laptop(2, "Lenovo", "ThinkPad T16", "Intel Core i7"),
        ];
        let index = SimilarityIndex::build(&records);
        assert!(index.is_available());

        let similar = index.most_similar(LaptopId(0), 5);
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].0, LaptopId(2));
        assert!(similar.iter().all(|(id, score)| *id != LaptopId(0) && (0.0..=1.0).contains(score)));

        assert_eq!(index.most_similar(LaptopId(0), 1).len(), 1);
        assert!(index.most_similar(LaptopId(9), 5).is_empty());
    }

    #[test]
    fn equally_similar_neighbours_keep_id_order() {
        let records = vec![
            laptop(0, "Lenovo", "ThinkPad T14", "Intel Core i7"),
            laptop(1, "HP", "EliteBook 840", "Intel Core i7"),
            laptop(2, "HP", "EliteBook 840", "Intel Core i7"),
            laptop(3, "Apple", "MacBook Air", "Apple M2"),
        ];
        let index = SimilarityIndex::build(&records);
        assert!(index.is_available());

        let similar = index.most_similar(LaptopId(0), 2);
        assert_eq!(similar[0].0, LaptopId(1));
        assert_eq!(similar[1].0, LaptopId(2));
        assert_eq!(similar[0].1, similar[1].1);
    }

    #[test]
    fn diagonal_is_one() {
        let records = vec![
            laptop(0, "Dell", "XPS 13", "Intel"),
            laptop(1, "HP", "Spectre", "AMD"),
        ];
        let SimilarityIndex::Ready(matrix) = SimilarityIndex::build(&records) else {
            panic!("index should build");
        };
        assert_eq!(matrix.score(0, 0), Some(1.0));
        assert_eq!(matrix.score(1, 1), Some(1.0));
        assert_eq!(matrix.score(0, 1), matrix.score(1, 0));
    }

    #[test]
    fn degenerate_corpora_leave_index_unavailable() {
        assert_eq!(SimilarityIndex::build(&[]), SimilarityIndex::Unavailable);

        let identical = vec![
            laptop(0, "Dell", "XPS 13", "Intel"),
            laptop(1, "Dell", "XPS 13", "Intel"),
        ];
        let index = SimilarityIndex::build(&identical);
        assert!(!index.is_available());
        assert!(index.most_similar(LaptopId(0), 5).is_empty());
    }
}
