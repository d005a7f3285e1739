use std::sync::Arc;

use saivd_cloud::storage::ObjectStore;
use saivd_cloud::watermark::WatermarkClient;

use crate::config::ServerConfig;
use crate::notifications::email::EmailDelivery;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind an `Arc` or is a pool.
#[derive(Clone)]
pub struct AppState {
    pub pool: saivd_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub storage: Arc<dyn ObjectStore>,
    /// `None` when no watermark service is configured.
    pub watermark: Option<WatermarkClient>,
    /// `None` when SMTP is not configured.
    pub mailer: Option<Arc<EmailDelivery>>,
}
