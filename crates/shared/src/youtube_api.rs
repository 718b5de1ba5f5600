//! Minimal YouTube Data API v3 client: a channel's most recent uploads.
//!
//! Only needs an API key; every call costs one quota unit.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::models::{ChannelInfo, Video};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Matches the page size of a channel feed
pub const MAX_RESULTS: u32 = 10;

/// Response structure for the `channels.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels/list>
#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    /// Playlist holding every public upload of the channel
    uploads: String,
}

/// Response structure for the `playlistItems.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/list>
#[derive(Debug, Deserialize)]
struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    snippet: PlaylistItemSnippet,
    content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    #[serde(default)]
    title: String,
    /// When the item was added to the playlist
    #[serde(default)]
    published_at: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_published_at: Option<String>,
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

fn parse_uploads_playlist(body: &str) -> Result<Option<String>> {
    let response: ChannelListResponse =
        serde_json::from_str(body).context("Failed to parse channels.list response")?;
    Ok(response
        .items
        .into_iter()
        .next()
        .map(|c| c.content_details.related_playlists.uploads))
}

/// Turn a `playlistItems.list` page into videos, newest first by publish time
fn parse_playlist_videos(body: &str) -> Result<Vec<Video>> {
    let response: PlaylistItemListResponse =
        serde_json::from_str(body).context("Failed to parse playlistItems.list response")?;

    let mut videos: Vec<(Option<DateTime<Utc>>, Video)> = response
        .items
        .into_iter()
        .filter_map(|item| {
            let id = item.snippet.resource_id.video_id?;
            let published = item
                .content_details
                .and_then(|d| d.video_published_at)
                .unwrap_or(item.snippet.published_at);
            let sort_key = DateTime::parse_from_rfc3339(&published)
                .ok()
                .map(|dt| dt.with_timezone(&Utc));
            Some((
                sort_key,
                Video {
                    url: watch_url(&id),
                    id,
                    title: item.snippet.title,
                    published,
                },
            ))
        })
        .collect();

    // Stable: items with the same (or no) timestamp keep playlist order
    videos.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(videos.into_iter().map(|(_, video)| video).collect())
}

pub struct YouTubeApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: API_BASE.to_string(),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))
            .with_context(|| format!("Invalid API endpoint: {path}"))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn get_text(&self, url: Url, what: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to call YouTube API ({what})"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("YouTube API {} returned error: {} - {}", what, status, error_text);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read YouTube API response ({what})"))
    }

    /// Find the uploads playlist, by channel id when known, else by `@handle`
    pub async fn uploads_playlist(&self, channel: &ChannelInfo) -> Result<String> {
        let url = if let Some(channel_id) = &channel.channel_id {
            self.endpoint("channels", &[("part", "contentDetails"), ("id", channel_id.as_str())])?
        } else if let Some(handle) = channel.handle() {
            self.endpoint("channels", &[("part", "contentDetails"), ("forHandle", handle.as_str())])?
        } else {
            anyhow::bail!(
                "Cannot look up {} via the API: no channel id or @handle in {}",
                channel.key,
                channel.channel_url
            );
        };

        let body = self.get_text(url, "channels.list").await?;
        parse_uploads_playlist(&body)?
            .with_context(|| format!("YouTube API knows no channel for {}", channel.channel_url))
    }

    pub async fn latest_uploads(&self, channel: &ChannelInfo) -> Result<Vec<Video>> {
        let playlist_id = self.uploads_playlist(channel).await?;
        let max_results = MAX_RESULTS.to_string();
        let url = self.endpoint(
            "playlistItems",
            &[
                ("part", "snippet,contentDetails"),
                ("playlistId", playlist_id.as_str()),
                ("maxResults", max_results.as_str()),
            ],
        )?;

        let body = self.get_text(url, "playlistItems.list").await?;
        parse_playlist_videos(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uploads_playlist() {
        let body = r#"{
            "kind": "youtube#channelListResponse",
            "items": [{
                "kind": "youtube#channel",
                "id": "UCabc",
                "contentDetails": {"relatedPlaylists": {"likes": "", "uploads": "UUabc"}}
            }]
        }"#;
        assert_eq!(parse_uploads_playlist(body).unwrap().as_deref(), Some("UUabc"));
    }

    #[test]
    fn test_parse_uploads_playlist_unknown_channel() {
        let body = r#"{"kind": "youtube#channelListResponse", "pageInfo": {"totalResults": 0}}"#;
        assert_eq!(parse_uploads_playlist(body).unwrap(), None);
    }

    #[test]
    fn test_parse_playlist_videos_sorted_newest_first() {
        let body = r#"{
            "items": [
                {
                    "snippet": {
                        "title": "Older",
                        "publishedAt": "2026-01-10T10:00:00Z",
                        "resourceId": {"kind": "youtube#video", "videoId": "old"}
                    },
                    "contentDetails": {"videoId": "old", "videoPublishedAt": "2026-01-10T10:00:00Z"}
                },
                {
                    "snippet": {
                        "title": "Newer",
                        "publishedAt": "2026-01-12T10:00:00Z",
                        "resourceId": {"kind": "youtube#video", "videoId": "new"}
                    },
                    "contentDetails": {"videoId": "new", "videoPublishedAt": "2026-01-12T09:00:00Z"}
                }
            ]
        }"#;

        let videos = parse_playlist_videos(body).unwrap();
        let ids: Vec<_> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(videos[0].title, "Newer");
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=new");
        assert_eq!(videos[0].published, "2026-01-12T09:00:00Z");
    }

    #[test]
    fn test_parse_playlist_videos_falls_back_to_snippet_date() {
        let body = r#"{
            "items": [{
                "snippet": {
                    "title": "No details",
                    "publishedAt": "2026-01-10T10:00:00Z",
                    "resourceId": {"videoId": "v1"}
                }
            }]
        }"#;
        let videos = parse_playlist_videos(body).unwrap();
        assert_eq!(videos[0].published, "2026-01-10T10:00:00Z");
    }

    #[test]
    fn test_parse_playlist_videos_skips_non_videos() {
        let body = r#"{"items": [{"snippet": {"title": "x", "resourceId": {"kind": "youtube#playlist"}}}]}"#;
        assert!(parse_playlist_videos(body).unwrap().is_empty());
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let client = YouTubeApiClient::new("secret key".to_string()).unwrap();
        let url = client
            .endpoint("channels", &[("part", "contentDetails"), ("forHandle", "@Foo")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/channels?part=contentDetails&forHandle=%40Foo&key=secret+key"
        );
    }
}
