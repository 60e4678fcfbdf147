//! Document Prioritizer
//!
//! Orders a batch of expiring documents by a weighted urgency score so the
//! most pressing documents are processed first. The score combines the
//! document type rank, the client segment rank and the days remaining until
//! expiry:
//!
//! `score = type_rank * 1000 + segment_rank * 100 + days_to_expiry`
//!
//! Lower scores sort first. Days to expiry is evaluated against the current
//! date at call time, not at document-load time, and is negative for
//! documents that have already expired.

pub mod config;

pub use config::PriorityConfig;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::models::ExpiringDocument;

/// Weight of the document type rank in the score
const TYPE_WEIGHT: i64 = 1000;

/// Weight of the client segment rank in the score
const SEGMENT_WEIGHT: i64 = 100;

/// Lookup key used when a document carries no segment
const FALLBACK_SEGMENT: &str = "otros";

/// Orders expiring documents by urgency
#[derive(Debug, Clone, Default)]
pub struct DocumentPrioritizer {
    config: PriorityConfig,
}

impl DocumentPrioritizer {
    pub fn new(config: PriorityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PriorityConfig {
        &self.config
    }

    /// Urgency score for one document as of `today` (lower = more urgent)
    pub fn score(&self, document: &ExpiringDocument, today: NaiveDate) -> i64 {
        let type_rank = self.config.type_rank(&document.document_type);

        let segment = document
            .client_segment
            .as_deref()
            .unwrap_or(FALLBACK_SEGMENT);
        let segment_rank = self.config.segment_rank(segment);

        let days_to_expiry = (document.expiry_date - today).num_days();

        type_rank * TYPE_WEIGHT + segment_rank * SEGMENT_WEIGHT + days_to_expiry
    }

    /// Sort documents ascending by urgency score, most urgent first
    ///
    /// "Today" is evaluated once per call.
    pub fn prioritize(&self, documents: Vec<ExpiringDocument>) -> Vec<ExpiringDocument> {
        self.prioritize_as_of(documents, Utc::now().date_naive())
    }

    /// Sort documents by their score as of a given date
    pub fn prioritize_as_of(
        &self,
        mut documents: Vec<ExpiringDocument>,
        today: NaiveDate,
    ) -> Vec<ExpiringDocument> {
        // Stable sort: equal scores keep their input order
        documents.sort_by_key(|doc| self.score(doc, today));

        debug!("Prioritized {} expiring documents", documents.len());

        documents
    }
}
