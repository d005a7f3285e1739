use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saivd_api::config::ServerConfig;
use saivd_api::notifications::email::{EmailConfig, EmailDelivery};
use saivd_api::router::build_app_router;
use saivd_api::state::AppState;
use saivd_cloud::storage::{S3ObjectStore, StorageConfig};
use saivd_cloud::watermark::{WatermarkClient, WatermarkConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "saivd_api=debug,saivd_cloud=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = saivd_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    saivd_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    saivd_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Object storage ---
    let storage_config = StorageConfig::from_env().expect("Invalid object storage configuration");
    let storage = S3ObjectStore::from_config(&storage_config).await;
    tracing::info!(bucket = %storage.bucket(), "Object storage client created");

    // --- Watermark service ---
    let watermark = match WatermarkConfig::from_env() {
        Some(wm_config) => {
            let client =
                WatermarkClient::new(&wm_config).expect("Failed to build watermark client");
            tracing::info!(base_url = %client.base_url(), "Watermark service configured");
            Some(client)
        }
        None => {
            tracing::warn!("WATERMARK_SERVICE_URL not set, watermark dispatch disabled");
            None
        }
    };
    if config.watermark_callback_secret.is_none() {
        tracing::warn!("WATERMARK_CALLBACK_SECRET not set, watermark callbacks are unauthenticated");
    }

    // --- Email ---
    let mailer = EmailConfig::from_env().map(|cfg| {
        Arc::new(EmailDelivery::new(&cfg).expect("Invalid SMTP configuration"))
    });
    if mailer.is_none() {
        tracing::info!("SMTP not configured, welcome emails disabled");
    }

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: Arc::new(storage),
        watermark,
        mailer,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
