//! Models module for document expiry processing
//!
//! This module contains the data structures used to represent clients,
//! expiring documents, per-document processing outcomes and the batch
//! result summary.

pub mod domain_models;

// Re-export commonly used types for convenience
pub use domain_models::{
    Client, DocumentOutcome, DocumentStatus, ExpiringDocument, ProcessingResult, StepFlags,
};
