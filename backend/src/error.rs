use crate::services::pipeline::HarvestStage;
use thiserror::Error;

/// Failure talking to the YouTube Data API.
#[derive(Error, Debug)]
pub enum RemoteApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("YouTube API returned {status} ({reason}): {message}")]
    Status {
        status: u16,
        reason: String,
        message: String,
    },

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("comments are disabled for video {video_id}")]
    CommentsDisabled { video_id: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteApiError {
    pub fn is_comments_disabled(&self) -> bool {
        matches!(self, RemoteApiError::CommentsDisabled { .. })
    }
}

/// Failure writing to (or reading from) one of the two sinks.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document store request failed: {0}")]
    Document(#[from] elasticsearch::Error),

    #[error("document store rejected the request with {status}: {body}")]
    DocumentRejected { status: u16, body: String },

    #[error("could not serialize bundle: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// A primary-key collision on insert.
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

/// Whole-channel failure reported to the retry supervisor.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("{stage} failed: {source}")]
    Remote {
        stage: HarvestStage,
        #[source]
        source: RemoteApiError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
