use crate::error::RemoteApiError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

pub const DEFAULT_YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const PLAYLIST_PAGE_SIZE: &str = "50";
pub const COMMENT_PAGE_SIZE: &str = "100";

/// Read-only access to channel, video and comment metadata.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// All video ids of a playlist, in server order.
    async fn list_uploaded_video_ids(&self, playlist_id: &str)
        -> Result<Vec<String>, RemoteApiError>;

    /// The single `channels` item for `channel_id`.
    async fn get_channel_stats(&self, channel_id: &str) -> Result<Value, RemoteApiError>;

    /// The single `videos` item for `video_id`.
    async fn get_video_stats(&self, video_id: &str) -> Result<Value, RemoteApiError>;

    /// First page (up to 100) of top-level comment threads. No continuation.
    async fn list_top_level_comments(&self, video_id: &str) -> Result<Vec<Value>, RemoteApiError>;
}

pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        YouTubeClient {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, resource: &str, params: &[(&str, &str)]) -> Result<Value, RemoteApiError> {
        // Documentation: https://developers.google.com/youtube/v3/docs
        let url = format!("{}/{}", self.base_url, resource);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Turns a non-2xx response into an error, keeping the API's own reason code.
fn status_error(status: u16, body: &str) -> RemoteApiError {
    let parsed: Value = serde_json::from_str(body).unwrap_or_default();
    let error = &parsed["error"];

    let reason = error["errors"][0]["reason"]
        .as_str()
        .or_else(|| error["status"].as_str())
        .unwrap_or("unknown")
        .to_string();
    let message = error["message"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| body.chars().take(200).collect());

    RemoteApiError::Status {
        status,
        reason,
        message,
    }
}

fn single_item(mut response: Value, resource: &'static str, id: &str) -> Result<Value, RemoteApiError> {
    match response.get_mut("items").and_then(Value::as_array_mut) {
        Some(items) if items.len() == 1 => Ok(items.remove(0)),
        _ => Err(RemoteApiError::NotFound {
            resource,
            id: id.to_string(),
        }),
    }
}

#[async_trait]
impl MetadataSource for YouTubeClient {
    async fn list_uploaded_video_ids(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<String>, RemoteApiError> {
        let mut all_video_ids = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "snippet,contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", PLAYLIST_PAGE_SIZE),
            ];
            if let Some(token) = &next_page_token {
                params.push(("pageToken", token.as_str()));
            }

            let response = self.get_json("playlistItems", &params).await?;

            if let Some(items) = response["items"].as_array() {
                for item in items {
                    match item["contentDetails"]["videoId"].as_str() {
                        Some(video_id) => all_video_ids.push(video_id.to_string()),
                        None => debug!("Skipping playlist item without a video id in {playlist_id}"),
                    }
                }
            }
            debug!(
                "Playlist {playlist_id}: {} video ids collected so far",
                all_video_ids.len()
            );

            match response["nextPageToken"].as_str() {
                Some(token) if !token.is_empty() => next_page_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(all_video_ids)
    }

    async fn get_channel_stats(&self, channel_id: &str) -> Result<Value, RemoteApiError> {
        let response = self
            .get_json(
                "channels",
                &[("part", "snippet,contentDetails,statistics"), ("id", channel_id)],
            )
            .await?;
        single_item(response, "channel", channel_id)
    }

    async fn get_video_stats(&self, video_id: &str) -> Result<Value, RemoteApiError> {
        let response = self
            .get_json(
                "videos",
                &[("part", "snippet,contentDetails,statistics"), ("id", video_id)],
            )
            .await?;
        single_item(response, "video", video_id)
    }

    async fn list_top_level_comments(&self, video_id: &str) -> Result<Vec<Value>, RemoteApiError> {
        let response = self
            .get_json(
                "commentThreads",
                &[
                    ("part", "snippet"),
                    ("videoId", video_id),
                    ("maxResults", COMMENT_PAGE_SIZE),
                    ("textFormat", "plainText"),
                ],
            )
            .await
            .map_err(|e| match e {
                RemoteApiError::Status { ref reason, .. } if reason == "commentsDisabled" => {
                    RemoteApiError::CommentsDisabled {
                        video_id: video_id.to_string(),
                    }
                }
                other => other,
            })?;

        Ok(match response {
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        })
    }
}
