use crate::error::{HarvestError, RemoteApiError};
use crate::models::{Comment, IngestionBundle, Video};
use crate::services::normalizer::{normalize_channel, normalize_comment, normalize_video};
use crate::services::youtube_client::MetadataSource;
use log::{debug, error, info, warn};
use std::fmt;

/// Where a channel harvest currently is. Stages only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestStage {
    FetchingChannel,
    EnumeratingVideos,
    FetchingVideoDetails,
    FetchingComments,
    Assembled,
}

impl fmt::Display for HarvestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HarvestStage::FetchingChannel => "fetching channel",
            HarvestStage::EnumeratingVideos => "enumerating videos",
            HarvestStage::FetchingVideoDetails => "fetching video details",
            HarvestStage::FetchingComments => "fetching comments",
            HarvestStage::Assembled => "assembled",
        };
        f.write_str(name)
    }
}

pub struct IngestionPipeline<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: MetadataSource + ?Sized> IngestionPipeline<'a, S> {
    pub fn new(source: &'a S) -> Self {
        IngestionPipeline { source }
    }

    /// Collects one channel, all of its uploads and the first page of comments
    /// of every upload.
    pub async fn run(&self, channel_id: &str) -> Result<IngestionBundle, HarvestError> {
        let mut stage = HarvestStage::FetchingChannel;
        info!("[{channel_id}] {stage}");

        let raw_channel = self
            .source
            .get_channel_stats(channel_id)
            .await
            .map_err(|e| match e {
                RemoteApiError::NotFound { .. } => HarvestError::ChannelNotFound(channel_id.to_string()),
                source => HarvestError::Remote { stage, source },
            })?;
        let channel =
            normalize_channel(&raw_channel).map_err(|source| HarvestError::Remote { stage, source })?;

        stage = HarvestStage::EnumeratingVideos;
        info!("[{channel_id}] {stage} from playlist {}", channel.playlist_id);

        let video_ids = self
            .source
            .list_uploaded_video_ids(&channel.playlist_id)
            .await
            .map_err(|source| HarvestError::Remote { stage, source })?;

        stage = HarvestStage::FetchingVideoDetails;
        info!("[{channel_id}] {stage} for {} videos", video_ids.len());

        let mut videos: Vec<Video> = Vec::with_capacity(video_ids.len());
        for video_id in &video_ids {
            let raw_video = self
                .source
                .get_video_stats(video_id)
                .await
                .map_err(|source| HarvestError::Remote { stage, source })?;
            let video = normalize_video(video_id, &raw_video)
                .map_err(|source| HarvestError::Remote { stage, source })?;

            if video.channel_id != channel.channel_id {
                warn!(
                    "[{channel_id}] Dropping video {video_id}: it belongs to channel {}",
                    video.channel_id
                );
                continue;
            }
            debug!("[{channel_id}] Fetched video {video_id}: {}", video.title);
            videos.push(video);
        }

        stage = HarvestStage::FetchingComments;
        info!("[{channel_id}] {stage}");

        let mut comments: Vec<Comment> = Vec::new();
        for video in &videos {
            comments.extend(self.fetch_comments(&video.video_id).await);
        }

        stage = HarvestStage::Assembled;
        info!(
            "[{channel_id}] {stage}: {} videos, {} comments",
            videos.len(),
            comments.len()
        );
        if videos.len() as i64 != channel.video_count {
            warn!(
                "[{channel_id}] Channel reports {} videos but {} were harvested",
                channel.video_count,
                videos.len()
            );
        }

        Ok(IngestionBundle {
            channel,
            videos,
            comments,
        })
    }

    /// Never fails: any problem only costs this video its comments.
    async fn fetch_comments(&self, video_id: &str) -> Vec<Comment> {
        let items = match self.source.list_top_level_comments(video_id).await {
            Ok(items) => items,
            Err(e) if e.is_comments_disabled() => {
                info!("Comments are disabled for video ID: {video_id}");
                return Vec::new();
            }
            Err(e) => {
                error!("An error occurred while fetching comments for video ID {video_id}: {e}");
                return Vec::new();
            }
        };

        items
            .iter()
            .filter_map(|item| match normalize_comment(video_id, item) {
                Ok(comment) => Some(comment),
                Err(e) => {
                    error!("Skipping comment on video {video_id}: {e}");
                    None
                }
            })
            .collect()
    }
}
