//! Deciding which fetched videos are new, and how the per-channel marker moves.
//!
//! Both functions are pure. The caller feeds them the newest-first batch from a
//! [`VideoSource`](crate::source::VideoSource) and the marker from the state file.

use crate::models::Video;

/// Pick the videos to announce, oldest first.
///
/// - `force_latest` re-announces the newest video whatever the marker says.
/// - With no marker (first run for the channel) nothing is announced; the caller
///   still records `videos[0]` as the marker via [`next_marker`].
/// - Otherwise every video newer than `last_seen_id` is returned. A marker that
///   is not in the batch at all means the whole batch is new.
pub fn select_new_videos(
    videos: &[Video],
    last_seen_id: Option<&str>,
    force_latest: bool,
) -> Vec<Video> {
    let Some(latest) = videos.first() else {
        return Vec::new();
    };

    if force_latest {
        return vec![latest.clone()];
    }

    let Some(last_seen_id) = last_seen_id else {
        return Vec::new();
    };

    if latest.id == last_seen_id {
        return Vec::new();
    }

    let mut new_videos = Vec::with_capacity(videos.len());
    for video in videos {
        if video.id == last_seen_id {
            break;
        }
        new_videos.push(video.clone());
    }

    // Chat timelines read top to bottom, so post oldest first
    new_videos.reverse();
    new_videos
}

/// The marker to store once every selected video has been announced.
///
/// Returns `None` when the stored marker already points at the newest video
/// (or the batch is empty), meaning the state does not change.
pub fn next_marker(videos: &[Video], current: Option<&str>) -> Option<String> {
    let latest = videos.first()?;
    if current == Some(latest.id.as_str()) {
        None
    } else {
        Some(latest.id.clone())
    }
}
