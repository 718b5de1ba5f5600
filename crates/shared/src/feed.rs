use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::Video;

// Some YouTube edges refuse obviously scripted user agents
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

pub fn channel_feed_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/feeds/videos.xml?channel_id={channel_id}")
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(rename = "yt:videoId", alias = "videoId", default)]
    video_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    published: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
    #[serde(rename = "@href", default)]
    href: Option<String>,
}

impl AtomEntry {
    fn into_video(self) -> Option<Video> {
        let id = self.video_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;

        let alternate = self
            .links
            .iter()
            .position(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
            .unwrap_or(0);
        let url = self
            .links
            .into_iter()
            .nth(alternate)
            .and_then(|l| l.href)
            .filter(|href| !href.is_empty())?;

        Some(Video {
            id,
            title: self.title.unwrap_or_default(),
            url,
            published: self.published.unwrap_or_default(),
        })
    }
}

/// Parse a channel's Atom feed into videos, keeping document order (newest first).
///
/// Entries without a video id or link are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<Video>> {
    let feed: AtomFeed = quick_xml::de::from_str(xml).context("Failed to parse Atom feed XML")?;
    Ok(feed
        .entries
        .into_iter()
        .filter_map(AtomEntry::into_video)
        .collect())
}

pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub async fn fetch_videos(&self, feed_url: &str) -> Result<Vec<Video>> {
        let response = self
            .client
            .get(feed_url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed {feed_url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Feed {} returned HTTP {}", feed_url, status);
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read feed body from {feed_url}"))?;

        parse_feed(&body).with_context(|| format!("Invalid feed from {feed_url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
 <link rel="self" href="http://www.youtube.com/feeds/videos.xml?channel_id=UCabc"/>
 <id>yt:channel:abc</id>
 <yt:channelId>abc</yt:channelId>
 <title>Hashtag United</title>
 <link rel="alternate" href="https://www.youtube.com/channel/UCabc"/>
 <author>
  <name>Hashtag United</name>
  <uri>https://www.youtube.com/channel/UCabc</uri>
 </author>
 <published>2014-01-01T00:00:00+00:00</published>
 <entry>
  <id>yt:video:new1</id>
  <yt:videoId>new1</yt:videoId>
  <yt:channelId>UCabc</yt:channelId>
  <title>We Won The League &amp; The Cup</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=new1"/>
  <author>
   <name>Hashtag United</name>
   <uri>https://www.youtube.com/channel/UCabc</uri>
  </author>
  <published>2026-02-03T18:00:05+00:00</published>
  <updated>2026-02-03T19:00:00+00:00</updated>
  <media:group>
   <media:title>We Won The League &amp; The Cup</media:title>
   <media:description>Highlights</media:description>
  </media:group>
 </entry>
 <entry>
  <id>yt:video:old1</id>
  <yt:videoId>old1</yt:videoId>
  <yt:channelId>UCabc</yt:channelId>
  <title>Matchday Vlog</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=old1"/>
  <published>2026-01-28T12:30:00+00:00</published>
  <updated>2026-01-28T12:30:00+00:00</updated>
 </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_keeps_order_and_fields() {
        let videos = parse_feed(FEED).unwrap();
        assert_eq!(videos.len(), 2);

        assert_eq!(videos[0].id, "new1");
        assert_eq!(videos[0].title, "We Won The League & The Cup");
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=new1");
        assert_eq!(videos[0].published, "2026-02-03T18:00:05+00:00");

        assert_eq!(videos[1].id, "old1");
    }

    #[test]
    fn test_parse_feed_without_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Empty</title></feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_skips_incomplete_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:yt="http://www.youtube.com/xml/schemas/2015">
 <entry>
  <title>No id</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=x"/>
 </entry>
 <entry>
  <yt:videoId>nolink</yt:videoId>
  <title>No link</title>
 </entry>
 <entry>
  <yt:videoId>ok</yt:videoId>
  <title>Fine</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=ok"/>
 </entry>
</feed>"#;
        let videos = parse_feed(xml).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "ok");
        assert_eq!(videos[0].published, "");
    }

    #[test]
    fn test_parse_feed_rejects_malformed_xml() {
        assert!(parse_feed("<feed><entry></feed>").is_err());
    }

    #[test]
    fn test_channel_feed_url() {
        assert_eq!(
            channel_feed_url("UC123"),
            "https://www.youtube.com/feeds/videos.xml?channel_id=UC123"
        );
    }
}
