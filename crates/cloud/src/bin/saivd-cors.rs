//! One-shot setup: apply the browser CORS rules to the video bucket.
//!
//! Reads the same `S3_*` and `CORS_ORIGINS` variables as the API server.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saivd_cloud::cors::{parse_origins, ALLOWED_METHODS};
use saivd_cloud::storage::{S3ObjectStore, StorageConfig};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "saivd_cloud=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StorageConfig::from_env().context("Invalid object store configuration")?;
    let origins = parse_origins(
        &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()),
    );

    let store = S3ObjectStore::from_config(&config).await;
    store
        .apply_cors(&origins)
        .await
        .with_context(|| format!("Failed to apply CORS rules to bucket '{}'", store.bucket()))?;

    tracing::info!(
        bucket = store.bucket(),
        ?origins,
        methods = ?ALLOWED_METHODS,
        "Bucket CORS rules applied"
    );
    Ok(())
}
