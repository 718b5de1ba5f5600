use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::models::Video;

/// Delivers one message per new video
#[async_trait]
pub trait Announcer {
    async fn announce(&self, channel_label: &str, video: &Video) -> Result<()>;
}

/// Render a feed timestamp as `YYYY-MM-DD HH:MM UTC`, or return it untouched
/// when it cannot be parsed.
pub fn format_published(published: &str) -> String {
    match DateTime::parse_from_rfc3339(published.trim()) {
        Ok(dt) => dt
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M UTC")
            .to_string(),
        Err(_) => published.to_string(),
    }
}

/// The chat message for a video. The bare URL goes last so Discord expands it
/// into a rich embed.
pub fn format_message(channel_label: &str, video: &Video) -> String {
    format!(
        "📺 **{}** uploaded a new video\n**{}**\nPublished: {}\n{}",
        channel_label,
        video.title,
        format_published(&video.published),
        video.url
    )
}

#[derive(Serialize)]
struct DiscordWebhookPayload<'a> {
    content: &'a str,
}

pub struct DiscordWebhook {
    client: Client,
    webhook_url: String,
}

impl DiscordWebhook {
    pub fn new(webhook_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            webhook_url,
        })
    }
}

#[async_trait]
impl Announcer for DiscordWebhook {
    async fn announce(&self, channel_label: &str, video: &Video) -> Result<()> {
        let content = format_message(channel_label, video);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&DiscordWebhookPayload { content: &content })
            .send()
            .await
            .context("Failed to post to Discord webhook")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Discord webhook failed with status {} - {}", status, error_text);
        }

        Ok(())
    }
}
