//! In-memory stand-ins for the remote API and both sinks.

use crate::error::{RemoteApiError, StoreError};
use crate::models::{IngestionBundle, TableTally, WriteSummary};
use crate::services::document_store::DocumentSink;
use crate::services::normalizer::fixtures::{channel_item, comment_item, video_item};
use crate::services::relational_store::RelationalSink;
use crate::services::youtube_client::MetadataSource;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeSource {
    pub channels: HashMap<String, Value>,
    pub playlists: HashMap<String, Vec<String>>,
    pub videos: HashMap<String, Value>,
    pub comments: HashMap<String, Vec<Value>>,
    pub disabled_comments: HashSet<String>,
    pub broken_comments: HashSet<String>,
    pub failing_videos: HashSet<String>,
    pub broken_playlists: bool,
}

fn backend_error() -> RemoteApiError {
    RemoteApiError::Status {
        status: 500,
        reason: "backendError".into(),
        message: "Backend Error".into(),
    }
}

impl FakeSource {
    pub fn with_channel(mut self, channel_id: &str, video_ids: &[&str]) -> Self {
        let channel = channel_item(channel_id);
        let playlist_id = channel["contentDetails"]["relatedPlaylists"]["uploads"]
            .as_str()
            .unwrap()
            .to_string();

        self.channels.insert(channel_id.to_string(), channel);
        self.playlists.insert(
            playlist_id,
            video_ids.iter().map(|id| id.to_string()).collect(),
        );
        for video_id in video_ids {
            self.videos
                .insert(video_id.to_string(), video_item(video_id, channel_id));
        }
        self
    }

    pub fn with_comments(mut self, video_id: &str, count: usize) -> Self {
        let items = (0..count)
            .map(|i| comment_item(&format!("{video_id}-c{i}"), video_id))
            .collect();
        self.comments.insert(video_id.to_string(), items);
        self
    }
}

#[async_trait]
impl MetadataSource for FakeSource {
    async fn list_uploaded_video_ids(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<String>, RemoteApiError> {
        if self.broken_playlists {
            return Err(backend_error());
        }
        self.playlists
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| RemoteApiError::NotFound {
                resource: "playlist",
                id: playlist_id.to_string(),
            })
    }

    async fn get_channel_stats(&self, channel_id: &str) -> Result<Value, RemoteApiError> {
        self.channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| RemoteApiError::NotFound {
                resource: "channel",
                id: channel_id.to_string(),
            })
    }

    async fn get_video_stats(&self, video_id: &str) -> Result<Value, RemoteApiError> {
        if self.failing_videos.contains(video_id) {
            return Err(backend_error());
        }
        self.videos
            .get(video_id)
            .cloned()
            .ok_or_else(|| RemoteApiError::NotFound {
                resource: "video",
                id: video_id.to_string(),
            })
    }

    async fn list_top_level_comments(&self, video_id: &str) -> Result<Vec<Value>, RemoteApiError> {
        if self.disabled_comments.contains(video_id) {
            return Err(RemoteApiError::CommentsDisabled {
                video_id: video_id.to_string(),
            });
        }
        if self.broken_comments.contains(video_id) {
            return Err(backend_error());
        }
        Ok(self.comments.get(video_id).cloned().unwrap_or_default())
    }
}

/// Records every bundle it is handed.
#[derive(Default)]
pub struct RecordingSink {
    pub bundles: Mutex<Vec<IngestionBundle>>,
    pub reject: bool,
}

impl RecordingSink {
    pub fn rejecting() -> Self {
        RecordingSink {
            reject: true,
            ..Default::default()
        }
    }

    pub fn count(&self) -> usize {
        self.bundles.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentSink for RecordingSink {
    async fn insert_bundle(&self, bundle: &IngestionBundle) -> Result<String, StoreError> {
        if self.reject {
            return Err(StoreError::DocumentRejected {
                status: 503,
                body: "cluster unavailable".into(),
            });
        }
        let mut bundles = self.bundles.lock().unwrap();
        bundles.push(bundle.clone());
        Ok(format!("doc-{}", bundles.len()))
    }

    async fn scan_bundles(&self) -> Result<Vec<Value>, StoreError> {
        let bundles = self.bundles.lock().unwrap();
        Ok(bundles
            .iter()
            .map(|b| serde_json::to_value(b).unwrap())
            .collect())
    }
}

#[async_trait]
impl RelationalSink for RecordingSink {
    async fn write_bundle(&self, bundle: &IngestionBundle) -> Result<WriteSummary, StoreError> {
        if self.reject {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.bundles.lock().unwrap().push(bundle.clone());
        Ok(WriteSummary {
            channels: TableTally {
                inserted: 1,
                ..Default::default()
            },
            videos: TableTally {
                inserted: bundle.videos.len(),
                ..Default::default()
            },
            comments: TableTally {
                inserted: bundle.comments.len(),
                ..Default::default()
            },
        })
    }
}
