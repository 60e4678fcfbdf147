//! Expiry Batch Processor
//!
//! Single-pass synchronous loop over a batch of expiring documents. For
//! each document, in input order:
//!
//! 1. Resolve the client; unknown clients skip the document entirely.
//! 2. Mark the document "about to expire" with the threshold and expiry
//!    date as metadata.
//! 3. Within the renewal window, create a renewal request and attach the
//!    returned id to the document.
//! 4. Send the expiry notice.
//! 5. Roll the client's documental status up, at most once per client per
//!    batch call.
//!
//! Per-document failures are caught at the item boundary and recorded; the
//! loop always runs to the end and the call never fails outright. Steps a
//! document completed before failing keep their counters.

use std::collections::HashSet;

use anyhow::Result;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::{
    DocumentOutcome, DocumentStatus, ExpiringDocument, ProcessingResult, StepFlags,
};
use crate::notifications::NotificationSender;
use crate::store::DocumentStore;

/// Thresholds at or below this many days also open a renewal request
pub const RENEWAL_REQUEST_THRESHOLD_DAYS: i64 = 15;

/// Processes batches of expiring documents against the store and the
/// notification sender
pub struct ExpiryBatchProcessor<S, N> {
    store: S,
    notifier: N,
}

impl<S, N> ExpiryBatchProcessor<S, N>
where
    S: DocumentStore,
    N: NotificationSender,
{
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Process one batch of expiring documents
    ///
    /// Documents are visited in input order (prioritize the slice first if
    /// ordering matters). Renewal request ids are written back onto the
    /// documents. The per-client rollup dedup set lives and dies with this
    /// call.
    pub async fn process(
        &self,
        documents: &mut [ExpiringDocument],
        days_threshold: i64,
    ) -> ProcessingResult {
        let mut result = ProcessingResult::new();
        let mut updated_clients: HashSet<Uuid> = HashSet::new();

        for document in documents.iter_mut() {
            let outcome = self
                .process_document(document, days_threshold, &mut updated_clients)
                .await;
            result.record(outcome);
        }

        info!(
            "Processed {} expiring documents: {} notified, {} requests, {} clients updated, {} skipped, {} errors",
            result.total(),
            result.notifications_sent,
            result.requests_created,
            result.clients_updated,
            result.skipped(),
            result.errors
        );

        result
    }

    /// Run all steps for one document, mapping any failure into an outcome
    async fn process_document(
        &self,
        document: &mut ExpiringDocument,
        days_threshold: i64,
        updated_clients: &mut HashSet<Uuid>,
    ) -> DocumentOutcome {
        let document_id = document.document_id;
        let mut steps = StepFlags::default();

        match self
            .run_steps(document, days_threshold, updated_clients, &mut steps)
            .await
        {
            Ok(Some(())) => DocumentOutcome::Processed { document_id, steps },
            Ok(None) => DocumentOutcome::SkippedMissingClient {
                document_id,
                client_id: document.client_id,
            },
            Err(err) => {
                error!("Failed to process document {}: {:#}", document_id, err);
                DocumentOutcome::Failed {
                    document_id,
                    steps,
                    reason: format!("{:#}", err),
                }
            }
        }
    }

    /// Steps 1-5; returns `Ok(None)` when the client cannot be resolved
    ///
    /// `steps` is an out-parameter so flags earned before an error survive
    /// into the `Failed` outcome.
    async fn run_steps(
        &self,
        document: &mut ExpiringDocument,
        days_threshold: i64,
        updated_clients: &mut HashSet<Uuid>,
        steps: &mut StepFlags,
    ) -> Result<Option<()>> {
        // 1. Resolve the client before touching anything
        let Some(client) = self.store.get_client_by_id(document.client_id).await? else {
            warn!(
                "Client {} not found for document {}, skipping",
                document.client_id, document.document_id
            );
            return Ok(None);
        };

        // 2. Mark the document as about to expire
        self.store
            .update_document_status(
                document.document_id,
                DocumentStatus::AboutToExpire,
                json!({
                    "days_threshold": days_threshold,
                    "expiry_date": document.expiry_date.to_string(),
                }),
            )
            .await?;

        // 3. Open a renewal request inside the renewal window
        if days_threshold <= RENEWAL_REQUEST_THRESHOLD_DAYS {
            let notes = format!(
                "Automatic renewal request: document expires within {} days",
                days_threshold
            );
            let request_id = self
                .store
                .create_document_request(
                    document.client_id,
                    &document.document_type,
                    document.expiry_date,
                    &notes,
                )
                .await?;

            document.renewal_request_id = Some(request_id);
            steps.request_created = true;
            debug!(
                "Created renewal request {} for document {}",
                request_id, document.document_id
            );
        }

        // 4. Notify the client; a declined send is not a failure
        steps.notified = self
            .notifier
            .send_expiry_notice(&client, document, days_threshold)
            .await?;

        // 5. Roll the client status up once per batch call. The id is only
        // marked after a successful update, so a later document of the same
        // client retries a failed rollup.
        if !updated_clients.contains(&client.client_id) {
            self.store
                .update_client_documental_status(client.client_id)
                .await?;
            updated_clients.insert(client.client_id);
            steps.client_updated = true;
        }

        Ok(Some(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::Value as JsonValue;

    use crate::models::Client;
    use crate::notifications::{InformationRequestDetails, NotificationError};

    // ========================================================================
    // In-memory collaborators
    // ========================================================================

    #[derive(Default)]
    struct StoreCalls {
        status_updates: Vec<(Uuid, String, JsonValue)>,
        requests: Vec<(Uuid, String)>,
        rollups: Vec<Uuid>,
    }

    #[derive(Default)]
    struct MockStore {
        clients: HashMap<Uuid, Client>,
        fail_rollup_once_for: Mutex<HashSet<Uuid>>,
        calls: Mutex<StoreCalls>,
    }

    impl MockStore {
        fn with_clients(clients: Vec<Client>) -> Self {
            Self {
                clients: clients.into_iter().map(|c| (c.client_id, c)).collect(),
                ..Default::default()
            }
        }

        fn fail_rollup_once(self, client_id: Uuid) -> Self {
            self.fail_rollup_once_for.lock().unwrap().insert(client_id);
            self
        }
    }

    #[async_trait]
    impl DocumentStore for MockStore {
        async fn get_client_by_id(&self, client_id: Uuid) -> Result<Option<Client>> {
            Ok(self.clients.get(&client_id).cloned())
        }

        async fn update_document_status(
            &self,
            document_id: Uuid,
            status: DocumentStatus,
            metadata: JsonValue,
        ) -> Result<()> {
            self.calls.lock().unwrap().status_updates.push((
                document_id,
                status.as_str().to_string(),
                metadata,
            ));
            Ok(())
        }

        async fn create_document_request(
            &self,
            client_id: Uuid,
            document_type: &str,
            _expiry_date: NaiveDate,
            notes: &str,
        ) -> Result<Uuid> {
            assert!(notes.contains("days"));
            let request_id = Uuid::new_v4();
            self.calls
                .lock()
                .unwrap()
                .requests
                .push((client_id, document_type.to_string()));
            Ok(request_id)
        }

        async fn update_client_documental_status(&self, client_id: Uuid) -> Result<()> {
            if self
                .fail_rollup_once_for
                .lock()
                .unwrap()
                .remove(&client_id)
            {
                anyhow::bail!("documental status rollup failed for {}", client_id);
            }
            self.calls.lock().unwrap().rollups.push(client_id);
            Ok(())
        }

        async fn list_expiring_documents(
            &self,
            _days_threshold: i64,
        ) -> Result<Vec<ExpiringDocument>> {
            Ok(vec![])
        }
    }

    /// Notifier scripted per document id
    #[derive(Default)]
    struct MockNotifier {
        fail_for: HashSet<Uuid>,
        decline_for: HashSet<Uuid>,
        sent: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl NotificationSender for MockNotifier {
        async fn send_expiry_notice(
            &self,
            _client: &Client,
            document: &ExpiringDocument,
            _days_threshold: i64,
        ) -> Result<bool, NotificationError> {
            if self.fail_for.contains(&document.document_id) {
                return Err(NotificationError::Gateway("boom".to_string()));
            }
            if self.decline_for.contains(&document.document_id) {
                return Ok(false);
            }
            self.sent.lock().unwrap().push(document.document_id);
            Ok(true)
        }

        async fn send_information_request(
            &self,
            _client: &Client,
            _details: &InformationRequestDetails,
        ) -> Result<bool, NotificationError> {
            Ok(true)
        }
    }

    // ========================================================================
    // Fixtures
    // ========================================================================

    fn client(client_id: Uuid) -> Client {
        Client {
            client_id,
            name: "Acme Holdings".to_string(),
            email: Some("ops@acme.example".to_string()),
            segment: Some("empresas".to_string()),
            documental_status: None,
        }
    }

    fn document(client_id: Uuid) -> ExpiringDocument {
        ExpiringDocument {
            document_id: Uuid::new_v4(),
            client_id,
            document_type: "PASSPORT".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            client_segment: Some("empresas".to_string()),
            renewal_request_id: None,
        }
    }

    // ========================================================================
    // Tests
    // ========================================================================

    #[tokio::test]
    async fn test_missing_client_skips_without_counters() {
        let store = MockStore::with_clients(vec![]);
        let processor = ExpiryBatchProcessor::new(store, MockNotifier::default());

        let mut docs = vec![document(Uuid::new_v4())];
        let result = processor.process(&mut docs, 10).await;

        assert_eq!(result.skipped(), 1);
        assert_eq!(result.errors, 0);
        assert_eq!(result.notifications_sent, 0);
        assert_eq!(result.requests_created, 0);
        assert_eq!(result.clients_updated, 0);

        // Client lookup precedes any mutation
        let calls = processor.store.calls.lock().unwrap();
        assert!(calls.status_updates.is_empty());
    }

    #[tokio::test]
    async fn test_full_processing_of_one_document() {
        let client_id = Uuid::new_v4();
        let store = MockStore::with_clients(vec![client(client_id)]);
        let processor = ExpiryBatchProcessor::new(store, MockNotifier::default());

        let mut docs = vec![document(client_id)];
        let result = processor.process(&mut docs, 10).await;

        assert_eq!(result.processed(), 1);
        assert_eq!(result.notifications_sent, 1);
        assert_eq!(result.requests_created, 1);
        assert_eq!(result.clients_updated, 1);
        assert_eq!(result.errors, 0);

        // The renewal request id was written back onto the document
        assert!(docs[0].renewal_request_id.is_some());

        // Status metadata carries the threshold and the ISO expiry date
        let calls = processor.store.calls.lock().unwrap();
        let (_, status, metadata) = &calls.status_updates[0];
        assert_eq!(status, "about_to_expire");
        assert_eq!(metadata["days_threshold"], 10);
        assert_eq!(metadata["expiry_date"], "2026-08-20");
    }

    #[tokio::test]
    async fn test_renewal_request_boundary_inclusive_at_15() {
        let client_id = Uuid::new_v4();

        let store = MockStore::with_clients(vec![client(client_id)]);
        let processor = ExpiryBatchProcessor::new(store, MockNotifier::default());
        let mut docs = vec![document(client_id)];
        let result = processor.process(&mut docs, 15).await;
        assert_eq!(result.requests_created, 1);
        assert!(docs[0].renewal_request_id.is_some());

        let store = MockStore::with_clients(vec![client(client_id)]);
        let processor = ExpiryBatchProcessor::new(store, MockNotifier::default());
        let mut docs = vec![document(client_id)];
        let result = processor.process(&mut docs, 16).await;
        assert_eq!(result.requests_created, 0);
        assert!(docs[0].renewal_request_id.is_none());
    }

    #[tokio::test]
    async fn test_client_rollup_runs_once_per_batch() {
        let client_id = Uuid::new_v4();
        let store = MockStore::with_clients(vec![client(client_id)]);
        let processor = ExpiryBatchProcessor::new(store, MockNotifier::default());

        let mut docs = vec![
            document(client_id),
            document(client_id),
            document(client_id),
        ];
        let result = processor.process(&mut docs, 10).await;

        assert_eq!(result.processed(), 3);
        assert_eq!(result.clients_updated, 1);
        assert_eq!(processor.store.calls.lock().unwrap().rollups.len(), 1);
    }

    #[tokio::test]
    async fn test_dedup_set_is_call_local() {
        let client_id = Uuid::new_v4();
        let store = MockStore::with_clients(vec![client(client_id)]);
        let processor = ExpiryBatchProcessor::new(store, MockNotifier::default());

        let mut first = vec![document(client_id)];
        let mut second = vec![document(client_id)];
        processor.process(&mut first, 10).await;
        let result = processor.process(&mut second, 10).await;

        // A fresh call updates the client again
        assert_eq!(result.clients_updated, 1);
        assert_eq!(processor.store.calls.lock().unwrap().rollups.len(), 2);
    }

    #[tokio::test]
    async fn test_notification_failure_counts_once_and_continues() {
        let client_id = Uuid::new_v4();
        let store = MockStore::with_clients(vec![client(client_id)]);

        let failing = document(client_id);
        let healthy = document(client_id);
        let notifier = MockNotifier {
            fail_for: HashSet::from([failing.document_id]),
            ..Default::default()
        };
        let processor = ExpiryBatchProcessor::new(store, notifier);

        let mut docs = vec![failing, healthy];
        let result = processor.process(&mut docs, 10).await;

        assert_eq!(result.errors, 1);
        assert_eq!(result.processed(), 1);
        assert_eq!(result.notifications_sent, 1);
        // The failing document still earned its renewal request
        assert_eq!(result.requests_created, 2);
        // The rollup never ran for the failing document, so the healthy one
        // picked it up
        assert_eq!(result.clients_updated, 1);
    }

    #[tokio::test]
    async fn test_declined_notification_is_not_an_error() {
        let client_id = Uuid::new_v4();
        let store = MockStore::with_clients(vec![client(client_id)]);

        let declined = document(client_id);
        let notifier = MockNotifier {
            decline_for: HashSet::from([declined.document_id]),
            ..Default::default()
        };
        let processor = ExpiryBatchProcessor::new(store, notifier);

        let mut docs = vec![declined];
        let result = processor.process(&mut docs, 10).await;

        assert_eq!(result.processed(), 1);
        assert_eq!(result.errors, 0);
        assert_eq!(result.notifications_sent, 0);
    }

    #[tokio::test]
    async fn test_failed_rollup_retried_by_later_document() {
        let client_id = Uuid::new_v4();
        let store =
            MockStore::with_clients(vec![client(client_id)]).fail_rollup_once(client_id);
        let processor = ExpiryBatchProcessor::new(store, MockNotifier::default());

        let mut docs = vec![document(client_id), document(client_id)];
        let result = processor.process(&mut docs, 10).await;

        // First document errored on the rollup, second retried it
        assert_eq!(result.errors, 1);
        assert_eq!(result.processed(), 1);
        assert_eq!(result.clients_updated, 1);
    }

    #[tokio::test]
    async fn test_outcomes_keep_input_order() {
        let client_id = Uuid::new_v4();
        let store = MockStore::with_clients(vec![client(client_id)]);
        let processor = ExpiryBatchProcessor::new(store, MockNotifier::default());

        let known = document(client_id);
        let unknown = document(Uuid::new_v4());
        let (known_id, unknown_id) = (known.document_id, unknown.document_id);

        let mut docs = vec![unknown, known];
        let result = processor.process(&mut docs, 20).await;

        assert_eq!(result.outcomes[0].document_id(), unknown_id);
        assert_eq!(result.outcomes[1].document_id(), known_id);
    }

    // ========================================================================
    // Partition property
    // ========================================================================

    use proptest::prelude::*;

    proptest! {
        /// processed + skipped + errors accounts for every input document
        /// exactly once, whatever mix of missing clients and notification
        /// failures the batch hits.
        #[test]
        fn prop_partition_accounts_for_every_document(
            plan in proptest::collection::vec(any::<(bool, bool)>(), 0..24),
            days_threshold in 1i64..40,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");

            let (processed, skipped, errors, total, len) = rt.block_on(async {
                let known_client_id = Uuid::new_v4();
                let store = MockStore::with_clients(vec![client(known_client_id)]);

                let mut fail_for = HashSet::new();
                let mut docs = Vec::new();
                for (known, fail_notify) in &plan {
                    let doc = if *known {
                        document(known_client_id)
                    } else {
                        document(Uuid::new_v4())
                    };
                    if *fail_notify {
                        fail_for.insert(doc.document_id);
                    }
                    docs.push(doc);
                }

                let notifier = MockNotifier { fail_for, ..Default::default() };
                let processor = ExpiryBatchProcessor::new(store, notifier);
                let result = processor.process(&mut docs, days_threshold).await;

                (
                    result.processed(),
                    result.skipped(),
                    result.errors,
                    result.total(),
                    docs.len(),
                )
            });

            prop_assert_eq!(total, len);
            prop_assert_eq!(processed + skipped + errors, len);
        }
    }
}
