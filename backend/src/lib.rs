pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use services::document_store::ElasticBundleStore;
use services::relational_store::PostgresStore;
use services::youtube_client::YouTubeClient;

/// Explicitly constructed clients shared by the request handlers.
pub struct AppState {
    pub youtube: YouTubeClient,
    pub bundle_store: ElasticBundleStore,
    pub postgres: PostgresStore,
    pub admin_token: String,
    pub retry_failed: bool,
}
