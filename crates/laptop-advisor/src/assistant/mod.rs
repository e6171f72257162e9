//! Conversational answers about the catalog, backed by a completion API.

pub mod client;
pub mod context;

pub use client::{CompletionClient, CompletionError, CompletionOptions, OpenAiCompatibleClient};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::catalog::{LaptopCatalog, LaptopId, LaptopRecord};
use crate::recommend::ConstraintSet;

pub const MAX_COMPARE: usize = 5;
/// Candidates shown to the model when recommending from constraints.
pub const RECOMMEND_CONTEXT_LIMIT: usize = 10;

const RECOMMEND_OPTIONS: CompletionOptions = CompletionOptions {
    temperature: 0.8,
    max_tokens: 1500,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatAnswer {
    pub query: String,
    pub response: String,
    pub context_used: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub laptops: Vec<LaptopRecord>,
    pub comparison: String,
    pub laptop_ids: Vec<LaptopId>,
}

/// Free-text recommendation written by the model for a constraint set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintAdvice {
    pub constraints: ConstraintSet,
    pub recommendations: String,
    /// Records that passed the constraint filter, before the context cap.
    pub laptops_considered: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    #[error("between 1 and 5 laptop ids are required, got {0}")]
    InvalidCount(usize),
    #[error("could not find enough laptops for comparison")]
    NotEnoughLaptops,
}

#[derive(Clone)]
pub struct ChatAssistant {
    client: Arc<dyn CompletionClient>,
    options: CompletionOptions,
}

impl std::fmt::Debug for ChatAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatAssistant")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ChatAssistant {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            options: CompletionOptions::default(),
        }
    }

    /// Answers `query` using the catalog as context. Completion failures
    /// become an `Error: ...` response instead of an error.
    pub async fn answer(
        &self,
        catalog: &LaptopCatalog,
        query: &str,
        conversation: Option<&str>,
    ) -> ChatAnswer {
        let relevant = context::relevant_laptops(query, catalog.all_records());
        let laptop_context = context::laptop_context(&relevant);
        let mut system = context::system_prompt(&laptop_context);
        if let Some(conversation) = conversation.map(str::trim).filter(|c| !c.is_empty()) {
            system.push_str("\n\nConversation so far:\n");
            system.push_str(conversation);
        }

        let response = match self.client.complete(&system, query, self.options).await {
            Ok(text) => context::clean_response(&text),
            Err(err) => {
                warn!(error = %err, "completion request failed");
                format!("Error: {err}")
            }
        };

        ChatAnswer {
            query: query.to_string(),
            response,
            context_used: context::context_preview(&laptop_context),
            timestamp: Utc::now(),
        }
    }

    /// Filters the catalog by `constraints` and asks the model to recommend
    /// from the first [`RECOMMEND_CONTEXT_LIMIT`] candidates.
    pub async fn recommend(
        &self,
        catalog: &LaptopCatalog,
        constraints: ConstraintSet,
    ) -> ConstraintAdvice {
        let candidates = context::recommendation_candidates(&constraints, catalog.all_records());
        let shown = &candidates[..candidates.len().min(RECOMMEND_CONTEXT_LIMIT)];
        let summary = context::constraints_summary(&constraints);
        let system = context::recommendation_prompt(&summary, &context::laptop_context(shown));
        let query = context::recommendation_query(&summary);

        let recommendations = match self.client.complete(&system, &query, RECOMMEND_OPTIONS).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "recommendation request failed");
                format!("Error: {err}")
            }
        };

        ConstraintAdvice {
            constraints,
            recommendations,
            laptops_considered: candidates.len(),
            timestamp: Utc::now(),
        }
    }

    pub async fn compare(
        &self,
        catalog: &LaptopCatalog,
        laptop_ids: &[LaptopId],
    ) -> Result<Comparison, CompareError> {
        if laptop_ids.is_empty() || laptop_ids.len() > MAX_COMPARE {
            return Err(CompareError::InvalidCount(laptop_ids.len()));
        }

        let found: Vec<&LaptopRecord> = laptop_ids
            .iter()
            .filter_map(|id| catalog.record_by_id(*id))
            .collect();
        if found.len() < 2 {
            return Err(CompareError::NotEnoughLaptops);
        }

        let query = context::comparison_query(&found);
        let answer = self.answer(catalog, &query, None).await;

        Ok(Comparison {
            laptops: found.into_iter().cloned().collect(),
            comparison: answer.response,
            laptop_ids: laptop_ids.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        reply: Option<String>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(
            &self,
            system: &str,
            user: &str,
            _options: CompletionOptions,
        ) -> Result<String, CompletionError> {
            self.prompts
                .lock()
                .expect("prompt log")
                .push((system.to_string(), user.to_string()));
            self.reply.clone().ok_or(CompletionError::MissingApiKey)
        }
    }

    fn catalog() -> LaptopCatalog {
        LaptopCatalog::from_records(vec![
            LaptopRecord::new(LaptopId(0), "Lenovo", "ThinkPad E14"),
            LaptopRecord::new(LaptopId(0), "HP", "ProBook 440"),
        ])
    }

    #[tokio::test]
    async fn answer_cleans_reply_and_uses_catalog_context() {
        let client = Arc::new(RecordingClient {
            reply: Some("- **ThinkPad E14** is solid".to_string()),
            ..RecordingClient::default()
        });
        let assistant = ChatAssistant::new(client.clone());

        let answer = assistant
            .answer(&catalog(), "Tell me about the HP ProBook", Some("earlier question"))
            .await;
        assert_eq!(answer.response, "• ThinkPad E14 is solid");
        assert!(answer.context_used.contains("ProBook 440"));

        let prompts = client.prompts.lock().expect("prompt log");
        assert!(prompts[0].0.contains("Model: ProBook 440"));
        assert!(!prompts[0].0.contains("ThinkPad"));
        assert!(prompts[0].0.ends_with("earlier question"));
    }

    #[tokio::test]
    async fn completion_failure_becomes_error_text() {
        let assistant = ChatAssistant::new(Arc::new(RecordingClient::default()));
        let answer = assistant.answer(&catalog(), "hello", None).await;
        assert_eq!(answer.response, "Error: API key not configured");
    }

    #[tokio::test]
    async fn recommend_counts_every_candidate_but_shows_ten() {
        let client = Arc::new(RecordingClient {
            reply: Some("**Top Recommendations:**".to_string()),
            ..RecordingClient::default()
        });
        let assistant = ChatAssistant::new(client.clone());
        let records: Vec<_> = (0..12)
            .map(|i| LaptopRecord::new(LaptopId(0), "Dell", format!("Latitude {i}")))
            .chain([LaptopRecord::new(LaptopId(0), "HP", "ProBook 440")])
            .collect();
        let catalog = LaptopCatalog::from_records(records);

        let advice = assistant
            .recommend(&catalog, ConstraintSet::with_brand("dell"))
            .await;
        assert_eq!(advice.laptops_considered, 12);
        assert_eq!(advice.recommendations, "**Top Recommendations:**");
        assert_eq!(advice.constraints.brand.as_deref(), Some("dell"));

        let prompts = client.prompts.lock().expect("prompt log");
        let (system, user) = &prompts[0];
        assert!(system.contains("User constraints:\nBrand: dell"));
        assert!(system.contains("Model: Latitude 9"));
        assert!(!system.contains("Model: Latitude 10"));
        assert!(!system.contains("ProBook"));
        assert_eq!(user, "Please recommend laptops based on these constraints: Brand: dell");
    }

    #[tokio::test]
    async fn recommend_failure_becomes_error_text() {
        let assistant = ChatAssistant::new(Arc::new(RecordingClient::default()));
        let advice = assistant
            .recommend(&catalog(), ConstraintSet::with_max_price(500.0))
            .await;
        assert_eq!(advice.recommendations, "Error: API key not configured");
        assert_eq!(advice.laptops_considered, 0);
    }

    #[tokio::test]
    async fn compare_requires_two_known_laptops() {
        let assistant = ChatAssistant::new(Arc::new(RecordingClient {
            reply: Some("ThinkPad wins".to_string()),
            ..RecordingClient::default()
        }));
        let catalog = catalog();

        let comparison = assistant
            .compare(&catalog, &[LaptopId(0), LaptopId(1)])
            .await
            .expect("two laptops");
        assert_eq!(comparison.laptops.len(), 2);
        assert_eq!(comparison.comparison, "ThinkPad wins");

        assert_eq!(
            assistant.compare(&catalog, &[LaptopId(0), LaptopId(9)]).await,
            Err(CompareError::NotEnoughLaptops)
        );
        assert_eq!(
            assistant.compare(&catalog, &[]).await,
            Err(CompareError::InvalidCount(0))
        );
    }
}
