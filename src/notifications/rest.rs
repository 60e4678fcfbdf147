//! REST Notification Gateway Client
//!
//! Posts notification payloads to the internal notification gateway, which
//! owns templating, channel selection and the actual email delivery. This
//! crate only reports whether the gateway accepted the notification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, error};
use uuid::Uuid;

use super::{InformationRequestDetails, NotificationError, NotificationSender};
use crate::models::{Client, ExpiringDocument};

/// Template for document expiry notices
const EXPIRY_TEMPLATE: &str = "document-expiry";

/// Template for information requests
const INFORMATION_REQUEST_TEMPLATE: &str = "information-request";

/// Notification gateway connection settings
#[derive(Debug, Clone)]
pub struct NotificationGatewayConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for NotificationGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8085".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

impl NotificationGatewayConfig {
    /// Build a config from `NOTIFICATION_GATEWAY_URL` / `NOTIFICATION_GATEWAY_API_KEY`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("NOTIFICATION_GATEWAY_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("NOTIFICATION_GATEWAY_API_KEY").ok(),
            timeout_seconds: defaults.timeout_seconds,
        }
    }
}

/// Notification sender backed by the REST gateway
#[derive(Debug, Clone)]
pub struct RestNotificationSender {
    config: NotificationGatewayConfig,
    client: HttpClient,
}

/// Gateway request format
#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    template: &'a str,
    recipient: GatewayRecipient<'a>,
    context: JsonValue,
}

/// Recipient block of a gateway request
#[derive(Debug, Serialize)]
struct GatewayRecipient<'a> {
    client_id: Uuid,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

/// Gateway response format
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    delivered: bool,
    #[serde(default)]
    message_id: Option<String>,
}

impl RestNotificationSender {
    pub fn new(config: NotificationGatewayConfig) -> Result<Self, NotificationError> {
        if config.base_url.is_empty() {
            return Err(NotificationError::Configuration(
                "Notification gateway base URL is empty".to_string(),
            ));
        }

        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    /// Post one notification to the gateway and report acceptance
    async fn dispatch(&self, request: GatewayRequest<'_>) -> Result<bool, NotificationError> {
        let url = format!("{}/notifications/send", self.config.base_url);

        debug!(
            "Sending '{}' notification to gateway for client {}",
            request.template, request.recipient.client_id
        );

        let mut builder = self.client.post(&url).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Notification gateway error: {} - {}", status, response_text);
            return Err(NotificationError::Gateway(format!(
                "HTTP {}: {}",
                status, response_text
            )));
        }

        let gateway_response: GatewayResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse gateway response: {}", e);
                NotificationError::InvalidResponse(e.to_string())
            })?;

        if let Some(message_id) = &gateway_response.message_id {
            debug!("Gateway accepted notification, message id {}", message_id);
        }

        Ok(gateway_response.delivered)
    }
}

#[async_trait]
impl NotificationSender for RestNotificationSender {
    async fn send_expiry_notice(
        &self,
        client: &Client,
        document: &ExpiringDocument,
        days_threshold: i64,
    ) -> Result<bool, NotificationError> {
        let request = GatewayRequest {
            template: EXPIRY_TEMPLATE,
            recipient: GatewayRecipient {
                client_id: client.client_id,
                name: &client.name,
                email: client.email.as_deref(),
            },
            context: json!({
                "document_id": document.document_id,
                "document_type": document.document_type,
                "expiry_date": document.expiry_date.to_string(),
                "days_threshold": days_threshold,
            }),
        };

        self.dispatch(request).await
    }

    async fn send_information_request(
        &self,
        client: &Client,
        details: &InformationRequestDetails,
    ) -> Result<bool, NotificationError> {
        let request = GatewayRequest {
            template: INFORMATION_REQUEST_TEMPLATE,
            recipient: GatewayRecipient {
                client_id: client.client_id,
                name: &client.name,
                email: client.email.as_deref(),
            },
            context: json!({
                "documents": details.documents,
                "required_information": details.required_information,
                "deadline": details.deadline,
                "notes": details.notes,
            }),
        };

        self.dispatch(request).await
    }
}
