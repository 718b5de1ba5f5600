use anyhow::{Context, Result};
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const YT_DLP_TIMEOUT: Duration = Duration::from_secs(60);

/// Pull a `UC...` channel id out of yt-dlp's `-J` playlist metadata
pub fn channel_id_from_metadata(metadata: &Value) -> Option<String> {
    ["channel_id", "uploader_id"].iter().find_map(|key| {
        metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| value.starts_with("UC"))
            .map(str::to_string)
    })
}

/// Resolve a channel page URL to its channel id by asking yt-dlp for one
/// flat playlist entry. Avoids parsing channel HTML, which is often blocked.
pub async fn resolve_channel_id_with_ytdlp(channel_url: &str) -> Result<String> {
    let videos_url = format!("{}/videos", channel_url.trim_end_matches('/'));

    let child = Command::new("yt-dlp")
        .args(["--flat-playlist", "--playlist-end", "1", "-J"])
        .arg(&videos_url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .context("Failed to run yt-dlp (is it installed?)")?;

    let output = tokio::time::timeout(YT_DLP_TIMEOUT, child.wait_with_output())
        .await
        .with_context(|| format!("yt-dlp timed out resolving {videos_url}"))?
        .context("Failed to wait for yt-dlp")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("yt-dlp failed for {}: {}", videos_url, stderr.trim());
    }

    let metadata: Value =
        serde_json::from_slice(&output.stdout).context("yt-dlp returned invalid JSON")?;

    channel_id_from_metadata(&metadata)
        .with_context(|| format!("yt-dlp metadata for {videos_url} has no channel id"))
}
