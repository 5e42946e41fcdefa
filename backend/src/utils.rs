use chrono::NaiveDateTime;
use serde_json::Value;

const VIDEO_PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Statistics come back as decimal strings ("1234"), sometimes as numbers.
/// Anything absent, unparsable or negative counts as zero.
pub fn parse_count(value: &Value) -> i64 {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed.filter(|n| *n >= 0).unwrap_or(0)
}

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` timestamp.
pub fn parse_video_timestamp(date_str: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(date_str, VIDEO_PUBLISHED_FORMAT).ok()
}

/// Strip the trailing `Z` and parse what remains as a naive timestamp.
/// Fractional seconds are accepted.
pub fn parse_zulu_timestamp(date_str: &str) -> Option<NaiveDateTime> {
    let trimmed = date_str.strip_suffix('Z').unwrap_or(date_str);
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn looks_like_channel_id(candidate: &str) -> bool {
    candidate.len() == 24
        && candidate.starts_with("UC")
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Accepts a bare channel id or a `youtube.com/channel/<id>` URL.
pub fn extract_channel_id(input: &str) -> Option<String> {
    use url::Url;

    let input = input.trim();
    if looks_like_channel_id(input) {
        return Some(input.to_string());
    }

    let parsed_url = Url::parse(input).ok()?;
    match parsed_url.host_str()? {
        "www.youtube.com" | "youtube.com" | "m.youtube.com" => {
            let mut segments = parsed_url.path_segments()?;
            match (segments.next(), segments.next()) {
                (Some("channel"), Some(id)) if looks_like_channel_id(id) => Some(id.to_string()),
                _ => None,
            }
        }
        _ => None,
    }
}
