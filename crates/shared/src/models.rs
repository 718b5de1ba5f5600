use serde::{Deserialize, Serialize};

/// A single published video as reported by a channel source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
    pub published: String,
}

impl Video {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        published: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            published: published.into(),
        }
    }
}

/// Static description of a channel we watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub key: String,
    pub label: String,
    pub channel_url: String,
    /// Channel id (`UC...`) when already known, saves a resolution round-trip
    pub channel_id: Option<String>,
    pub feed_urls: Vec<String>,
}

impl ChannelInfo {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        channel_url: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            channel_url: channel_url.into(),
            channel_id: None,
            feed_urls: Vec::new(),
        }
    }

    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn with_feed_url(mut self, feed_url: impl Into<String>) -> Self {
        self.feed_urls.push(feed_url.into());
        self
    }

    /// The `@handle` part of the channel URL, if it has one
    pub fn handle(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.channel_url).ok()?;
        parsed
            .path_segments()?
            .find(|segment| segment.starts_with('@') && segment.len() > 1)
            .map(|segment| segment.to_string())
    }
}
