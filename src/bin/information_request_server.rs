//! Information Request API Server
//!
//! Serves the information-request endpoint over the documental Postgres
//! store and the REST notification gateway.
//!
//! Usage:
//!   DATABASE_URL="postgresql://localhost:5432/documental" \
//!     cargo run --bin information_request_server --features server

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use doc_expiry::api::{information_request_router, ApiState};
use doc_expiry::notifications::{NotificationGatewayConfig, RestNotificationSender};
use doc_expiry::store::PgDocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("doc_expiry=info".parse()?),
        )
        .init();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgDocumentStore::new(pool));
    let notifier = Arc::new(RestNotificationSender::new(
        NotificationGatewayConfig::from_env(),
    )?);

    let state = ApiState::new(store, notifier);
    let router = information_request_router(state);

    let host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("API_PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Information request API listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
