// components/video_downloader/src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::utils::watch_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "pending"),
            ItemStatus::Completed => write!(f, "completed"),
            ItemStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One entry of a playlist together with its download status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub status: ItemStatus,
}

impl PlaylistItem {
    /// Create a pending item, deriving its URL from the id
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: watch_url(&id),
            id,
            title: title.into(),
            status: ItemStatus::Pending,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ItemStatus::Completed
    }
}

/// Playlist metadata as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistInfo {
    pub id: String,
    pub title: String,
    pub items: Vec<PlaylistItem>,
}

/// Persistent state of an in-progress playlist download
///
/// Field names on disk follow the `download_state.json` layout, so checkpoints
/// written by earlier versions of the tool can still be resumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistCheckpoint {
    pub playlist_id: String,
    pub playlist_title: String,
    #[serde(rename = "format_id")]
    pub format_selector: String,
    /// `None` means the current working directory
    pub output_path: Option<PathBuf>,
    #[serde(rename = "total_videos")]
    pub total_count: usize,
    #[serde(rename = "videos")]
    pub items: Vec<PlaylistItem>,
}

impl PlaylistCheckpoint {
    pub fn new(
        playlist: PlaylistInfo,
        format_selector: impl Into<String>,
        output_path: Option<PathBuf>,
    ) -> Self {
        Self {
            playlist_id: playlist.id,
            playlist_title: playlist.title,
            format_selector: format_selector.into(),
            output_path,
            total_count: playlist.items.len(),
            items: playlist.items,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Failed)
            .count()
    }

    /// Mark every item pending again so a restart re-attempts all of them
    pub fn reset_statuses(&mut self) {
        for item in &mut self.items {
            item.status = ItemStatus::Pending;
        }
    }
}

/// A single downloadable stream discovered for a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOption {
    pub id: String,
    /// Resolution such as `1920x1080`, `None` for audio-only streams
    pub resolution: Option<String>,
    pub ext: String,
    pub has_video: bool,
    pub has_audio: bool,
}

impl fmt::Display for FormatOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_video {
            return write!(f, "{} - audio only - {}", self.id, self.ext);
        }
        let resolution = self.resolution.as_deref().unwrap_or("N/A");
        write!(f, "{} - {} - {}", self.id, resolution, self.ext)?;
        if !self.has_audio {
            write!(f, " - no audio")?;
        }
        Ok(())
    }
}

/// Formats available for one video, grouped the way the menus present them
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoFormats {
    pub id: String,
    pub title: String,
    pub video: Vec<FormatOption>,
    pub audio: Vec<FormatOption>,
}

impl VideoFormats {
    pub fn is_empty(&self) -> bool {
        self.video.is_empty() && self.audio.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Downloading {
        percent: Option<f64>,
        speed: String,
        eta: String,
    },
    /// Stream finished, the engine moves on to post-processing
    Finished,
}

/// Receives progress notifications while the engine downloads
pub trait ProgressSink {
    fn report(&self, event: ProgressEvent);
}

/// Sink that drops every event
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}
