use chrono::NaiveDateTime;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::{response, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminToken(pub String);

/// One content publisher, as reported by the channels endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: String,
    pub channel_name: String,
    pub channel_description: String,
    pub subscribers_count: i64,
    pub views: i64,
    pub video_count: i64,
    /// Uploads playlist; only used to drive video enumeration.
    pub playlist_id: String,
    pub published_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub video_id: String,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    /// Comma separated, empty when the video has no tags.
    pub tags: String,
    pub published_at: NaiveDateTime,
    pub view_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub favorite_count: i64,
    pub comment_count: i64,
    /// Raw ISO-8601 duration token (PT4M13S).
    pub duration: String,
    pub thumbnail: String,
    pub has_captions: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub video_id: String,
    pub author: String,
    pub text: String,
    pub published_at: NaiveDateTime,
    pub like_count: i64,
}

/// Everything one harvest run produced for a single channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionBundle {
    pub channel: Channel,
    pub videos: Vec<Video>,
    pub comments: Vec<Comment>,
}

impl IngestionBundle {
    pub fn comments_for<'a>(&'a self, video_id: &'a str) -> impl Iterator<Item = &'a Comment> {
        self.comments.iter().filter(move |c| c.video_id == video_id)
    }
}

/// Per-table row counters of one relational write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTally {
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub channels: TableTally,
    pub videos: TableTally,
    pub comments: TableTally,
}

impl WriteSummary {
    pub fn inserted(&self) -> usize {
        self.channels.inserted + self.videos.inserted + self.comments.inserted
    }

    pub fn duplicates(&self) -> usize {
        self.channels.duplicates + self.videos.duplicates + self.comments.duplicates
    }

    pub fn failed(&self) -> usize {
        self.channels.failed + self.videos.failed + self.comments.failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestStatus {
    Success,
    Failed(String),
}

impl HarvestStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, HarvestStatus::Failed(_))
    }
}

impl fmt::Display for HarvestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarvestStatus::Success => write!(f, "Success"),
            HarvestStatus::Failed(reason) => write!(f, "Failed: {reason}"),
        }
    }
}

impl Serialize for HarvestStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelOutcome {
    pub channel_id: String,
    pub status: HarvestStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HarvestRequest {
    pub channels: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HarvestResponse {
    pub results: Vec<ChannelOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl HarvestResponse {
    pub fn from_outcomes(results: Vec<ChannelOutcome>) -> Self {
        let failed = results.iter().filter(|r| r.status.is_failed()).count();
        HarvestResponse {
            succeeded: results.len() - failed,
            failed,
            results,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(Status::BadRequest)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
