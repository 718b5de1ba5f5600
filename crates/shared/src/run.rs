use anyhow::Result;

use crate::announce::Announcer;
use crate::models::ChannelInfo;
use crate::selection::{next_marker, select_new_videos};
use crate::source::VideoSource;
use crate::state::StateMap;

/// A channel that could not be processed this run
#[derive(Debug)]
pub struct ChannelError {
    pub key: String,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub posted: usize,
    pub state_changed: bool,
    pub errors: Vec<ChannelError>,
}

impl RunReport {
    /// 0 when everything worked or at least one video went out, 1 when the run
    /// produced nothing but errors
    pub fn exit_code(&self) -> u8 {
        if !self.errors.is_empty() && self.posted == 0 {
            1
        } else {
            0
        }
    }
}

/// Fetch, select, announce and advance the marker for each channel in order.
///
/// A failing channel is recorded in the report and the next channel still runs.
/// `state` is only modified for channels that finished cleanly.
pub async fn run_channels<S, A>(
    source: &S,
    announcer: &A,
    channels: &[ChannelInfo],
    state: &mut StateMap,
    force_latest: bool,
) -> RunReport
where
    S: VideoSource + ?Sized,
    A: Announcer + ?Sized,
{
    let mut report = RunReport::default();

    for channel in channels {
        println!("Processing {} ({})", channel.key, channel.channel_url);

        if let Err(error) =
            process_channel(source, announcer, channel, state, force_latest, &mut report).await
        {
            eprintln!("  ERROR for {}: {:#}", channel.key, error);
            tracing::debug!(channel = %channel.key, error = ?error, "channel failed");
            report.errors.push(ChannelError {
                key: channel.key.clone(),
                error,
            });
        }
    }

    report
}

async fn process_channel<S, A>(
    source: &S,
    announcer: &A,
    channel: &ChannelInfo,
    state: &mut StateMap,
    force_latest: bool,
    report: &mut RunReport,
) -> Result<()>
where
    S: VideoSource + ?Sized,
    A: Announcer + ?Sized,
{
    let videos = source.fetch_videos(channel).await?;
    if videos.is_empty() {
        println!("  No feed entries found for {}", channel.key);
        return Ok(());
    }

    // A blank marker carries no position; treat the channel as never seen
    let last_seen = state
        .get(&channel.key)
        .map(String::as_str)
        .filter(|id| !id.is_empty());
    let to_post = select_new_videos(&videos, last_seen, force_latest);
    tracing::debug!(
        channel = %channel.key,
        fetched = videos.len(),
        selected = to_post.len(),
        last_seen = ?last_seen,
        "selected videos"
    );

    // Any failure here returns before the marker moves, so the whole batch is
    // reconsidered next run
    for video in &to_post {
        announcer.announce(&channel.label, video).await?;
        report.posted += 1;
        println!("  Posted: {} - {}", video.id, video.title);
    }

    let bootstrap = last_seen.is_none();
    if let Some(marker) = next_marker(&videos, last_seen) {
        if bootstrap {
            println!("  Initialized last-seen to {}", marker);
        } else {
            println!("  Updated last-seen to {}", marker);
        }
        state.insert(channel.key.clone(), marker);
        report.state_changed = true;
    }

    Ok(())
}
