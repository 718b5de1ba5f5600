use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;

use crate::feed::{channel_feed_url, FeedClient};
use crate::models::{ChannelInfo, Video};
use crate::resolve::resolve_channel_id_with_ytdlp;
use crate::youtube_api::YouTubeApiClient;

/// Anything that can list a channel's recent videos, newest first
#[async_trait]
pub trait VideoSource {
    async fn fetch_videos(&self, channel: &ChannelInfo) -> Result<Vec<Video>>;
}

/// One way of getting a channel's videos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// YouTube Data API uploads playlist (needs an API key)
    DataApi,
    /// The feed URLs listed for the channel, in order
    ConfiguredFeeds,
    /// Channel id (known or resolved with yt-dlp) -> official channel feed
    ResolvedFeed,
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FetchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            FetchStrategy::DataApi => "data-api",
            FetchStrategy::ConfiguredFeeds => "configured-feeds",
            FetchStrategy::ResolvedFeed => "resolved-feed",
        }
    }

    /// Strategies in the order they are tried
    pub fn chain(use_api: bool) -> Vec<FetchStrategy> {
        let mut chain = Vec::with_capacity(3);
        if use_api {
            chain.push(FetchStrategy::DataApi);
        }
        chain.push(FetchStrategy::ConfiguredFeeds);
        chain.push(FetchStrategy::ResolvedFeed);
        chain
    }
}

/// Try each strategy in turn; the first one that yields videos wins.
///
/// If any strategy errored and none produced videos, the last error is returned.
/// An empty list comes back only when every strategy succeeded with no entries.
pub async fn first_non_empty<F, Fut>(strategies: &[FetchStrategy], attempt: F) -> Result<Vec<Video>>
where
    F: FnMut(FetchStrategy) -> Fut,
    Fut: Future<Output = Result<Vec<Video>>>,
{
    first_non_empty_of(strategies.iter().copied(), attempt)
        .await
        .context("Could not fetch videos with any configured strategy")
}

/// Shared fold behind [`first_non_empty`] and the per-feed loop: stop at the
/// first non-empty batch, otherwise report the last failure, if any.
async fn first_non_empty_of<T, I, F, Fut>(candidates: I, mut attempt: F) -> Result<Vec<Video>>
where
    T: fmt::Display + Copy,
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<Vec<Video>>>,
{
    let mut last_error = None;

    for candidate in candidates {
        match attempt(candidate).await {
            Ok(videos) if !videos.is_empty() => {
                tracing::debug!(source = %candidate, count = videos.len(), "fetched videos");
                return Ok(videos);
            }
            Ok(_) => {
                tracing::debug!(source = %candidate, "no videos");
            }
            Err(e) => {
                tracing::warn!(source = %candidate, error = ?e, "fetch failed");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(Vec::new()),
    }
}

/// The production source: feeds, yt-dlp resolution and optionally the Data API
pub struct YouTubeSource {
    strategies: Vec<FetchStrategy>,
    feeds: FeedClient,
    api: Option<YouTubeApiClient>,
}

impl YouTubeSource {
    /// With an API key the Data API is tried first, then the feeds
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let api = api_key.map(YouTubeApiClient::new).transpose()?;
        Ok(Self {
            strategies: FetchStrategy::chain(api.is_some()),
            feeds: FeedClient::new()?,
            api,
        })
    }

    async fn run(&self, strategy: FetchStrategy, channel: &ChannelInfo) -> Result<Vec<Video>> {
        match strategy {
            FetchStrategy::DataApi => {
                let api = self
                    .api
                    .as_ref()
                    .context("Data API strategy needs an API key")?;
                api.latest_uploads(channel).await
            }
            FetchStrategy::ConfiguredFeeds => self.configured_feeds(channel).await,
            FetchStrategy::ResolvedFeed => {
                let channel_id = match &channel.channel_id {
                    Some(id) => id.clone(),
                    None => resolve_channel_id_with_ytdlp(&channel.channel_url)
                        .await
                        .with_context(|| {
                            format!("Could not resolve channel id for {}", channel.channel_url)
                        })?,
                };
                self.feeds.fetch_videos(&channel_feed_url(&channel_id)).await
            }
        }
    }

    async fn configured_feeds(&self, channel: &ChannelInfo) -> Result<Vec<Video>> {
        if channel.feed_urls.is_empty() {
            anyhow::bail!("No feed URLs configured for {}", channel.key);
        }

        first_non_empty_of(channel.feed_urls.iter(), |feed_url| {
            self.feeds.fetch_videos(feed_url)
        })
        .await
    }
}

#[async_trait]
impl VideoSource for YouTubeSource {
    async fn fetch_videos(&self, channel: &ChannelInfo) -> Result<Vec<Video>> {
        first_non_empty(&self.strategies, |strategy| self.run(strategy, channel)).await
    }
}
