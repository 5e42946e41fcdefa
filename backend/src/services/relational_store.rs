use crate::error::StoreError;
use crate::models::{IngestionBundle, TableTally, WriteSummary};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgArguments, PgConnection, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{Connection, Postgres};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const INSERT_CHANNEL: &str = "INSERT INTO channels \
    (channel_id, channel_name, subscribers_count, views, total_videos, channel_description, playlist_id) \
    VALUES ($1, $2, $3, $4, $5, $6, $7)";

const INSERT_VIDEO: &str = "INSERT INTO videos \
    (video_id, channel_id, title, tags, thumbnail, description, published_date, duration, \
     views, likes, comments, favorite_count, caption_status) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8::interval, $9, $10, $11, $12, $13)";

const INSERT_COMMENT: &str = "INSERT INTO comments \
    (comment_id, video_id, comment_author, comment_text, comment_published_at, comment_likes) \
    VALUES ($1, $2, $3, $4, $5, $6)";

/// Creates the `channels`, `videos` and `comments` tables if needed. Run once at startup.
pub async fn migrate(database_url: &str) -> Result<(), StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await?;
    MIGRATOR.run(&pool).await?;
    pool.close().await;
    info!("Relational schema is up to date.");
    Ok(())
}

#[async_trait]
pub trait RelationalSink: Send + Sync {
    /// Inserts one row per channel, video and comment. Individual row failures
    /// are counted, not returned.
    async fn write_bundle(&self, bundle: &IngestionBundle) -> Result<WriteSummary, StoreError>;
}

pub struct PostgresStore {
    database_url: String,
}

impl PostgresStore {
    pub fn new(database_url: impl Into<String>) -> Self {
        PostgresStore {
            database_url: database_url.into(),
        }
    }
}

async fn execute_in_transaction(
    conn: &mut PgConnection,
    query: Query<'_, Postgres, PgArguments>,
) -> Result<(), StoreError> {
    let mut tx = conn.begin().await?;

    if let Err(e) = query.execute(&mut *tx).await {
        if let Err(rollback_err) = tx.rollback().await {
            warn!("Rollback failed: {rollback_err}");
        }
        return Err(e.into());
    }

    tx.commit().await?;
    Ok(())
}

fn record(tally: &mut TableTally, table: &str, key: &str, result: Result<(), StoreError>) {
    match result {
        Ok(()) => {
            tally.inserted += 1;
            debug!("Inserted {table} row {key}");
        }
        Err(e) if e.is_duplicate_key() => {
            tally.duplicates += 1;
            warn!("Failed to insert {table} row {key}, already stored: {e}");
        }
        Err(e) => {
            tally.failed += 1;
            error!("Failed to insert {table} row {key}: {e}");
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

#[async_trait]
impl RelationalSink for PostgresStore {
    async fn write_bundle(&self, bundle: &IngestionBundle) -> Result<WriteSummary, StoreError> {
        let mut conn = PgConnection::connect(&self.database_url).await?;
        let mut summary = WriteSummary::default();

        let channel = &bundle.channel;
        let result = execute_in_transaction(
            &mut conn,
            sqlx::query(INSERT_CHANNEL)
                .bind(&channel.channel_id)
                .bind(&channel.channel_name)
                .bind(channel.subscribers_count)
                .bind(channel.views)
                .bind(channel.video_count)
                .bind(&channel.channel_description)
                .bind(&channel.playlist_id),
        )
        .await;
        record(&mut summary.channels, "channel", &channel.channel_id, result);

        for video in &bundle.videos {
            let result = execute_in_transaction(
                &mut conn,
                sqlx::query(INSERT_VIDEO)
                    .bind(&video.video_id)
                    .bind(&video.channel_id)
                    .bind(&video.title)
                    .bind(&video.tags)
                    .bind(&video.thumbnail)
                    .bind(&video.description)
                    .bind(video.published_at)
                    .bind(non_empty(&video.duration))
                    .bind(video.view_count)
                    .bind(video.like_count)
                    .bind(video.comment_count)
                    .bind(video.favorite_count)
                    .bind(video.has_captions),
            )
            .await;
            record(&mut summary.videos, "video", &video.video_id, result);
        }

        for comment in &bundle.comments {
            let result = execute_in_transaction(
                &mut conn,
                sqlx::query(INSERT_COMMENT)
                    .bind(&comment.comment_id)
                    .bind(&comment.video_id)
                    .bind(&comment.author)
                    .bind(&comment.text)
                    .bind(comment.published_at)
                    .bind(comment.like_count),
            )
            .await;
            record(&mut summary.comments, "comment", &comment.comment_id, result);
        }

        if let Err(e) = conn.close().await {
            warn!("Failed to close PostgreSQL connection cleanly: {e}");
        }

        info!(
            "Data saved to PostgreSQL for channel {}: {} inserted, {} already stored, {} failed",
            channel.channel_id,
            summary.inserted(),
            summary.duplicates(),
            summary.failed()
        );
        Ok(summary)
    }
}
