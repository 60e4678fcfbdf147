//! Document store collaborator contract
//!
//! The batch processor performs all of its mutations through this trait;
//! the crate itself holds no persistent state. The Postgres implementation
//! lives in [`postgres`] behind the `database` feature.

#[cfg(feature = "database")]
pub mod postgres;

#[cfg(feature = "database")]
pub use postgres::PgDocumentStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::models::{Client, DocumentStatus, ExpiringDocument};

/// Data-store boundary consumed by the batch processor
///
/// Implementations provide their own atomicity per call; no transactional
/// guarantee spans multiple calls for a single document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Resolve a client, or `None` when unknown
    async fn get_client_by_id(&self, client_id: Uuid) -> Result<Option<Client>>;

    /// Set a document's status, attaching free-form metadata
    async fn update_document_status(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
        metadata: JsonValue,
    ) -> Result<()>;

    /// Create a renewal request and return its id
    async fn create_document_request(
        &self,
        client_id: Uuid,
        document_type: &str,
        expiry_date: NaiveDate,
        notes: &str,
    ) -> Result<Uuid>;

    /// Recompute the client's aggregate documental status
    async fn update_client_documental_status(&self, client_id: Uuid) -> Result<()>;

    /// Documents whose expiry date falls within the threshold window
    async fn list_expiring_documents(&self, days_threshold: i64)
        -> Result<Vec<ExpiringDocument>>;
}
