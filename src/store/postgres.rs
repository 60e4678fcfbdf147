//! Postgres Document Store
//!
//! sqlx-backed implementation of the collaborator contract against the
//! `documental` schema (see `migrations/`). Each method is its own
//! statement; no transaction spans the steps of a single document.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::DocumentStore;
use crate::models::{Client, DocumentStatus, ExpiringDocument};

/// Document store backed by the documental Postgres schema
#[derive(Clone, Debug)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get_client_by_id(&self, client_id: Uuid) -> Result<Option<Client>> {
        let client: Option<Client> = sqlx::query_as(
            r#"
            SELECT client_id, name, email, segment, documental_status
            FROM documental.clients
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch client")?;

        Ok(client)
    }

    async fn update_document_status(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
        metadata: JsonValue,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE documental.documents
            SET status = $2,
                status_metadata = $3,
                updated_at = NOW()
            WHERE document_id = $1
            "#,
        )
        .bind(document_id)
        .bind(status.as_str())
        .bind(metadata)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update status of document {}", document_id))?;

        debug!("Set document {} status to {}", document_id, status);

        Ok(())
    }

    async fn create_document_request(
        &self,
        client_id: Uuid,
        document_type: &str,
        expiry_date: NaiveDate,
        notes: &str,
    ) -> Result<Uuid> {
        let request_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO documental.document_requests (
                request_id, client_id, document_type, expiry_date, notes, status
            ) VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING request_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(client_id)
        .bind(document_type)
        .bind(expiry_date)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to create document request for client {}",
                client_id
            )
        })?;

        info!(
            "Created document request {} for client {} ({})",
            request_id, client_id, document_type
        );

        Ok(request_id)
    }

    async fn update_client_documental_status(&self, client_id: Uuid) -> Result<()> {
        // Rollup: any expired document wins, then any document flagged as
        // about to expire, otherwise the file is complete.
        sqlx::query(
            r#"
            UPDATE documental.clients c
            SET documental_status = sub.status,
                updated_at = NOW()
            FROM (
                SELECT CASE
                    WHEN COUNT(*) FILTER (WHERE d.expiry_date < CURRENT_DATE) > 0 THEN 'expired'
                    WHEN COUNT(*) FILTER (WHERE d.status = 'about_to_expire') > 0 THEN 'expiring'
                    ELSE 'complete'
                END AS status
                FROM documental.documents d
                WHERE d.client_id = $1
            ) sub
            WHERE c.client_id = $1
            "#,
        )
        .bind(client_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update documental status of client {}", client_id))?;

        debug!("Updated documental status of client {}", client_id);

        Ok(())
    }

    async fn list_expiring_documents(
        &self,
        days_threshold: i64,
    ) -> Result<Vec<ExpiringDocument>> {
        let documents: Vec<ExpiringDocument> = sqlx::query_as(
            r#"
            SELECT
                d.document_id,
                d.client_id,
                d.document_type,
                d.expiry_date,
                c.segment AS client_segment,
                d.renewal_request_id
            FROM documental.documents d
            LEFT JOIN documental.clients c ON c.client_id = d.client_id
            WHERE d.status <> 'renewed'
              AND d.expiry_date <= CURRENT_DATE + $1
            ORDER BY d.expiry_date
            "#,
        )
        .bind(days_threshold as i32)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expiring documents")?;

        debug!(
            "Found {} documents expiring within {} days",
            documents.len(),
            days_threshold
        );

        Ok(documents)
    }
}
