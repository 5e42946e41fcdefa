use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yt_warehouse::error::RemoteApiError;
use yt_warehouse::services::youtube_client::{MetadataSource, YouTubeClient};

const API_KEY: &str = "test-key";

fn playlist_page(video_ids: &[&str], next_page_token: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = video_ids
        .iter()
        .map(|id| json!({ "kind": "youtube#playlistItem", "contentDetails": { "videoId": id } }))
        .collect();
    match next_page_token {
        Some(token) => json!({ "items": items, "nextPageToken": token }),
        None => json!({ "items": items }),
    }
}

#[tokio::test]
async fn playlist_enumeration_follows_continuation_tokens() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UUabc"))
        .and(query_param("maxResults", "50"))
        .and(query_param("key", API_KEY))
        .and(query_param_is_missing("pageToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["v1", "v2"], Some("PAGE2"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "PAGE2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["v3"], Some("PAGE3"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "PAGE3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v4"], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(API_KEY, mock_server.uri());
    let video_ids = client.list_uploaded_video_ids("UUabc").await.unwrap();

    assert_eq!(video_ids, vec!["v1", "v2", "v3", "v4"]);
}

#[tokio::test]
async fn empty_playlist_yields_no_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(API_KEY, mock_server.uri());
    assert!(client
        .list_uploaded_video_ids("UUempty")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn playlist_failure_is_a_remote_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": 404,
                "message": "The playlist identified with the request's playlistId parameter cannot be found.",
                "errors": [{ "reason": "playlistNotFound" }]
            }
        })))
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(API_KEY, mock_server.uri());
    let err = client.list_uploaded_video_ids("UUgone").await.unwrap_err();

    assert!(matches!(
        err,
        RemoteApiError::Status { status: 404, ref reason, .. } if reason == "playlistNotFound"
    ));
}

#[tokio::test]
async fn channel_lookup_returns_the_single_item() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UCGeGhS_akOxBWQcSmje6B-w"))
        .and(query_param("part", "snippet,contentDetails,statistics"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "UCGeGhS_akOxBWQcSmje6B-w",
                "snippet": { "title": "Rust Talks" }
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(API_KEY, mock_server.uri());
    let channel = client
        .get_channel_stats("UCGeGhS_akOxBWQcSmje6B-w")
        .await
        .unwrap();

    assert_eq!(channel["snippet"]["title"], "Rust Talks");
}

#[tokio::test]
async fn channel_without_items_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "kind": "youtube#channelListResponse", "pageInfo": { "totalResults": 0 } })),
        )
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(API_KEY, mock_server.uri());
    let err = client.get_channel_stats("UCnothing").await.unwrap_err();

    assert!(matches!(
        err,
        RemoteApiError::NotFound { resource: "channel", ref id } if id == "UCnothing"
    ));
}

#[tokio::test]
async fn video_lookup_uses_video_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "dQw4w9WgXcQ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "dQw4w9WgXcQ", "statistics": { "viewCount": "10" } }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(API_KEY, mock_server.uri());
    let video = client.get_video_stats("dQw4w9WgXcQ").await.unwrap();
    assert_eq!(video["statistics"]["viewCount"], "10");
}

#[tokio::test]
async fn comments_request_a_single_page_of_one_hundred() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "vid1"))
        .and(query_param("maxResults", "100"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "c1" }, { "id": "c2" }],
            "nextPageToken": "MORE"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(API_KEY, mock_server.uri());
    let comments = client.list_top_level_comments("vid1").await.unwrap();

    // the continuation token is deliberately not followed
    assert_eq!(comments.len(), 2);
}

#[tokio::test]
async fn disabled_comments_are_distinguished_from_other_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "quiet"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The video identified by the videoId parameter has disabled comments.",
                "errors": [{ "domain": "youtube.commentThread", "reason": "commentsDisabled" }]
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let client = YouTubeClient::new(API_KEY, mock_server.uri());

    let disabled = client.list_top_level_comments("quiet").await.unwrap_err();
    assert!(disabled.is_comments_disabled());

    let broken = client.list_top_level_comments("broken").await.unwrap_err();
    assert!(!broken.is_comments_disabled());
    assert!(matches!(broken, RemoteApiError::Status { status: 500, .. }));
}
