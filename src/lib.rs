//! doc-expiry - Client Document Expiry Processing
//!
//! This crate processes batches of client documents that are nearing their
//! expiry date. For each document it updates the document status, creates a
//! renewal request when the threshold is tight enough, notifies the client,
//! and rolls the client's aggregate documental status up - at most once per
//! client per batch.
//!
//! ## Processing Pipeline
//! Expiring documents -> prioritize (weighted urgency score) -> batch process
//! (status update, renewal request, notification, client rollup)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc_expiry::prioritizer::DocumentPrioritizer;
//!
//! let prioritizer = DocumentPrioritizer::default();
//! let ordered = prioritizer.prioritize(vec![]);
//! assert!(ordered.is_empty());
//! ```

// Domain model types
pub mod models;

// Urgency scoring and batch ordering
pub mod prioritizer;

// The batch processing loop
pub mod processor;

// Collaborator contract and Postgres implementation
pub mod store;

// Notification dispatch boundary
pub mod notifications;

// REST API surface (when enabled)
pub mod api;

// Re-export the batch entry points for convenience
pub use processor::ExpiryBatchProcessor;
pub use prioritizer::{DocumentPrioritizer, PriorityConfig};
