//! Notification dispatch boundary
//!
//! The processor and the information-request endpoint hand fully-resolved
//! (client, payload) pairs to a [`NotificationSender`]; delivery mechanics
//! live behind the trait. The REST gateway implementation is in [`rest`].

pub mod rest;

pub use rest::{NotificationGatewayConfig, RestNotificationSender};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Client, ExpiringDocument};

/// Notification dispatch errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Free-form details accompanying an information request
///
/// Everything is optional; an empty value still produces a valid request
/// asking the client to get in touch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InformationRequestDetails {
    /// Document type codes the client should (re)submit
    #[serde(default)]
    pub documents: Vec<String>,

    /// Additional information items to provide
    #[serde(default)]
    pub required_information: Vec<String>,

    /// Free-text deadline (e.g. "2026-09-30", "two weeks")
    #[serde(default)]
    pub deadline: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

/// Outbound notification boundary
///
/// `Ok(true)` means the dispatch mechanism accepted the notification for
/// delivery; `Ok(false)` means it declined without failing (e.g. client is
/// unsubscribed). Errors are reserved for dispatch failures.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Tell a client one of their documents is about to expire
    async fn send_expiry_notice(
        &self,
        client: &Client,
        document: &ExpiringDocument,
        days_threshold: i64,
    ) -> Result<bool, NotificationError>;

    /// Ask a client for documents or information
    async fn send_information_request(
        &self,
        client: &Client,
        details: &InformationRequestDetails,
    ) -> Result<bool, NotificationError>;
}
