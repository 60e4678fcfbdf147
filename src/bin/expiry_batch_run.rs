//! Expiry Batch Runner
//!
//! Lists documents expiring within the threshold window, orders them by
//! urgency and runs the batch: status updates, renewal requests, client
//! notifications and per-client documental status rollups.
//!
//! Usage:
//!   DATABASE_URL="postgresql://localhost:5432/documental" \
//!     cargo run --bin expiry_batch_run --features "database cli" -- --days-threshold 15

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::PgPool;
use tracing::info;

use doc_expiry::notifications::{NotificationGatewayConfig, RestNotificationSender};
use doc_expiry::prioritizer::{DocumentPrioritizer, PriorityConfig};
use doc_expiry::processor::ExpiryBatchProcessor;
use doc_expiry::store::{DocumentStore, PgDocumentStore};

#[derive(Parser, Debug)]
#[command(name = "expiry_batch_run")]
#[command(about = "Process documents nearing expiry")]
struct Args {
    /// Days until expiry that put a document in this batch
    #[arg(long, default_value_t = 30)]
    days_threshold: i64,

    /// Optional YAML file overriding the priority rank tables
    #[arg(long)]
    priority_config: Option<std::path::PathBuf>,

    /// Process documents in store order instead of by urgency
    #[arg(long, default_value_t = false)]
    no_prioritize: bool,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("doc_expiry=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let pool = PgPool::connect(&args.database_url)
        .await
        .context("Failed to connect to database")?;
    let store = PgDocumentStore::new(pool);

    let documents = store.list_expiring_documents(args.days_threshold).await?;
    info!(
        "{} documents expire within {} days",
        documents.len(),
        args.days_threshold
    );

    let mut documents = if args.no_prioritize {
        documents
    } else {
        let config = match &args.priority_config {
            Some(path) => PriorityConfig::from_yaml_file(path)?,
            None => PriorityConfig::default(),
        };
        DocumentPrioritizer::new(config).prioritize(documents)
    };

    let notifier = RestNotificationSender::new(NotificationGatewayConfig::from_env())?;
    let processor = ExpiryBatchProcessor::new(store, notifier);

    let result = processor.process(&mut documents, args.days_threshold).await;

    println!("Batch complete:");
    println!("  documents:          {}", result.total());
    println!("  notifications sent: {}", result.notifications_sent);
    println!("  requests created:   {}", result.requests_created);
    println!("  clients updated:    {}", result.clients_updated);
    println!("  skipped:            {}", result.skipped());
    println!("  errors:             {}", result.errors);

    Ok(())
}
