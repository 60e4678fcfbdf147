//! Information Request routes
//!
//! `POST /client/send-information-request` resolves a client and dispatches
//! an information-request notification email through the gateway. The
//! request body carries the client id plus free-form request details
//! (documents wanted, required information, deadline, notes).

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::notifications::{InformationRequestDetails, NotificationSender};
use crate::store::DocumentStore;

// ============================================================================
// State
// ============================================================================

/// Shared state for the API routes
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn DocumentStore>,
    pub notifier: Arc<dyn NotificationSender>,
}

impl ApiState {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self { store, notifier }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of POST /client/send-information-request
#[derive(Debug, Deserialize)]
pub struct SendInformationRequest {
    pub client_id: Uuid,

    /// Free-form request details; an absent value asks the client to get
    /// in touch without naming specifics
    #[serde(default)]
    pub request_details: Option<InformationRequestDetails>,
}

/// Response for the information-request endpoint
#[derive(Debug, Serialize)]
pub struct SendInformationResponse {
    pub success: bool,
    pub client_id: Uuid,
    pub message: String,
}

// ============================================================================
// Routes
// ============================================================================

/// Build the information-request router
pub fn information_request_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/client/send-information-request",
            post(send_information_request),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// POST /client/send-information-request
async fn send_information_request(
    State(state): State<ApiState>,
    Json(request): Json<SendInformationRequest>,
) -> (StatusCode, Json<SendInformationResponse>) {
    let client_id = request.client_id;

    let client = match state.store.get_client_by_id(client_id).await {
        Ok(Some(client)) => client,
        Ok(None) => {
            warn!("Information request for unknown client {}", client_id);
            return respond(
                StatusCode::NOT_FOUND,
                false,
                client_id,
                "Client not found".to_string(),
            );
        }
        Err(err) => {
            error!("Failed to resolve client {}: {:#}", client_id, err);
            return respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                false,
                client_id,
                "Failed to resolve client".to_string(),
            );
        }
    };

    let details = request.request_details.unwrap_or_default();

    match state
        .notifier
        .send_information_request(&client, &details)
        .await
    {
        Ok(true) => {
            info!("Information request sent to client {}", client_id);
            respond(
                StatusCode::OK,
                true,
                client_id,
                format!("Information request sent to {}", client.name),
            )
        }
        Ok(false) => respond(
            StatusCode::BAD_GATEWAY,
            false,
            client_id,
            "Notification gateway declined the request".to_string(),
        ),
        Err(err) => {
            error!(
                "Failed to send information request to client {}: {}",
                client_id, err
            );
            respond(
                StatusCode::BAD_GATEWAY,
                false,
                client_id,
                "Failed to dispatch notification".to_string(),
            )
        }
    }
}

fn respond(
    status: StatusCode,
    success: bool,
    client_id: Uuid,
    message: String,
) -> (StatusCode, Json<SendInformationResponse>) {
    (
        status,
        Json(SendInformationResponse {
            success,
            client_id,
            message,
        }),
    )
}
