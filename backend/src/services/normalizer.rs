//! Raw API items to `Channel` / `Video` / `Comment`.
//!
//! Pure functions. A missing required field means the response did not have the
//! shape we asked for and is reported as [`RemoteApiError::Malformed`].

use crate::error::RemoteApiError;
use crate::models::{Channel, Comment, Video};
use crate::utils::{parse_count, parse_video_timestamp, parse_zulu_timestamp};
use serde_json::Value;

fn required_str<'a>(item: &'a Value, pointer: &str) -> Result<&'a str, RemoteApiError> {
    item.pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| RemoteApiError::Malformed(format!("missing {pointer}")))
}

fn optional_str(item: &Value, pointer: &str) -> String {
    item.pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn count(item: &Value, pointer: &str) -> i64 {
    item.pointer(pointer).map(parse_count).unwrap_or(0)
}

pub fn normalize_channel(item: &Value) -> Result<Channel, RemoteApiError> {
    let published = required_str(item, "/snippet/publishedAt")?;

    Ok(Channel {
        channel_id: required_str(item, "/id")?.to_string(),
        channel_name: required_str(item, "/snippet/title")?.to_string(),
        channel_description: optional_str(item, "/snippet/description"),
        subscribers_count: count(item, "/statistics/subscriberCount"),
        views: count(item, "/statistics/viewCount"),
        video_count: count(item, "/statistics/videoCount"),
        playlist_id: required_str(item, "/contentDetails/relatedPlaylists/uploads")?.to_string(),
        published_at: parse_zulu_timestamp(published).ok_or_else(|| {
            RemoteApiError::Malformed(format!("unparsable channel publishedAt {published:?}"))
        })?,
    })
}

pub fn normalize_video(video_id: &str, item: &Value) -> Result<Video, RemoteApiError> {
    let published = required_str(item, "/snippet/publishedAt")?;

    let tags = item
        .pointer("/snippet/tags")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default();

    Ok(Video {
        video_id: video_id.to_string(),
        channel_id: required_str(item, "/snippet/channelId")?.to_string(),
        title: required_str(item, "/snippet/title")?.to_string(),
        description: optional_str(item, "/snippet/description"),
        tags,
        published_at: parse_video_timestamp(published).ok_or_else(|| {
            RemoteApiError::Malformed(format!("unparsable video publishedAt {published:?}"))
        })?,
        view_count: count(item, "/statistics/viewCount"),
        like_count: count(item, "/statistics/likeCount"),
        dislike_count: count(item, "/statistics/dislikeCount"),
        favorite_count: count(item, "/statistics/favoriteCount"),
        comment_count: count(item, "/statistics/commentCount"),
        duration: optional_str(item, "/contentDetails/duration"),
        thumbnail: optional_str(item, "/snippet/thumbnails/medium/url"),
        has_captions: item
            .pointer("/contentDetails/caption")
            .and_then(Value::as_str)
            .map(|s| s == "true")
            .unwrap_or(false),
    })
}

/// `video_id` comes from the caller; comment threads are requested per video.
pub fn normalize_comment(video_id: &str, item: &Value) -> Result<Comment, RemoteApiError> {
    let published = required_str(item, "/snippet/topLevelComment/snippet/publishedAt")?;

    Ok(Comment {
        comment_id: required_str(item, "/snippet/topLevelComment/id")?.to_string(),
        video_id: video_id.to_string(),
        author: optional_str(item, "/snippet/topLevelComment/snippet/authorDisplayName"),
        text: optional_str(item, "/snippet/topLevelComment/snippet/textOriginal"),
        published_at: parse_zulu_timestamp(published).ok_or_else(|| {
            RemoteApiError::Malformed(format!("unparsable comment publishedAt {published:?}"))
        })?,
        like_count: count(item, "/snippet/topLevelComment/snippet/likeCount"),
    })
}
