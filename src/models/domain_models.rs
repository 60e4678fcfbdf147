//! Domain model types for document expiry processing
//!
//! Clients and expiring documents are supplied by the caller (usually read
//! from the documental schema); processing mutates documents in place by
//! attaching the renewal request id. Per-document outcomes and the batch
//! summary are built fresh on every `process` call and returned to the
//! caller - nothing here is persisted by this crate.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client that owns tracked documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Client {
    pub client_id: Uuid,

    /// Legal or display name
    pub name: String,

    /// Contact address for notifications (may be absent for dormant clients)
    pub email: Option<String>,

    /// Commercial segment name (e.g. "privada", "retail")
    pub segment: Option<String>,

    /// Aggregate indicator summarizing the state of all tracked documents
    pub documental_status: Option<String>,
}

/// A document record whose expiry date falls within a monitored window
///
/// Ephemeral: built from the store (or by the caller) per batch, ordered by
/// the prioritizer, then mutated in place by the processor when a renewal
/// request is created for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct ExpiringDocument {
    pub document_id: Uuid,

    pub client_id: Uuid,

    /// Document type code (e.g. "PASSPORT", "PROOF-OF-ADDRESS")
    pub document_type: String,

    pub expiry_date: NaiveDate,

    /// Segment of the owning client, denormalized for scoring
    pub client_segment: Option<String>,

    /// Renewal request id, assigned during processing
    pub renewal_request_id: Option<Uuid>,
}

/// Document lifecycle states as stored in `documental.documents.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Valid,
    AboutToExpire,
    Expired,
    Renewed,
}

impl DocumentStatus {
    /// Storage-boundary string form
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Valid => "valid",
            DocumentStatus::AboutToExpire => "about_to_expire",
            DocumentStatus::Expired => "expired",
            DocumentStatus::Renewed => "renewed",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side effects completed for one document
///
/// Steps completed before a failure keep their counters - there is no
/// rollback of collaborator calls that already succeeded.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StepFlags {
    /// A renewal request was created (threshold within the renewal window)
    pub request_created: bool,

    /// The notification sender reported a successful delivery
    pub notified: bool,

    /// This document triggered the per-client documental status rollup
    pub client_updated: bool,
}

/// Explicit per-document result
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// All steps ran to completion
    Processed {
        document_id: Uuid,
        steps: StepFlags,
    },
    /// The owning client could not be resolved; nothing was mutated
    SkippedMissingClient {
        document_id: Uuid,
        client_id: Uuid,
    },
    /// A step failed; earlier steps of the same document are not rolled back
    Failed {
        document_id: Uuid,
        steps: StepFlags,
        reason: String,
    },
}

impl DocumentOutcome {
    pub fn document_id(&self) -> Uuid {
        match self {
            DocumentOutcome::Processed { document_id, .. }
            | DocumentOutcome::SkippedMissingClient { document_id, .. }
            | DocumentOutcome::Failed { document_id, .. } => *document_id,
        }
    }
}

/// Summary of one batch call
///
/// Counters partition the input: every document is counted exactly once as
/// processed, skipped or errored, while the step counters track completed
/// side effects (which a later failure of the same document does not undo).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingResult {
    /// Notifications the sender confirmed as delivered
    pub notifications_sent: usize,

    /// Renewal requests created
    pub requests_created: usize,

    /// Clients whose documental status rollup ran
    pub clients_updated: usize,

    /// Documents that failed mid-processing
    pub errors: usize,

    /// Ordered per-document outcomes (same order as the input batch)
    pub outcomes: Vec<DocumentOutcome>,
}

impl ProcessingResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the counters
    pub fn record(&mut self, outcome: DocumentOutcome) {
        match &outcome {
            DocumentOutcome::Processed { steps, .. } => self.tally_steps(steps),
            DocumentOutcome::SkippedMissingClient { .. } => {}
            DocumentOutcome::Failed { steps, .. } => {
                self.tally_steps(steps);
                self.errors += 1;
            }
        }
        self.outcomes.push(outcome);
    }

    fn tally_steps(&mut self, steps: &StepFlags) {
        if steps.request_created {
            self.requests_created += 1;
        }
        if steps.notified {
            self.notifications_sent += 1;
        }
        if steps.client_updated {
            self.clients_updated += 1;
        }
    }

    /// Documents that ran all steps to completion
    pub fn processed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Processed { .. }))
            .count()
    }

    /// Documents skipped because their client could not be resolved
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::SkippedMissingClient { .. }))
            .count()
    }

    /// Total documents seen by this batch call
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}
