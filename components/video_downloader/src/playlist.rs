// components/video_downloader/src/playlist.rs
//! Sequential playlist download with a checkpoint after every item

use std::time::Duration;
use tracing::{info, warn};

use crate::checkpoint::CheckpointStore;
use crate::error::{CheckpointError, DownloadError, SelectionError};
use crate::invoker::{create_output_dir, download_one, DownloadOptions};
use crate::types::{ItemStatus, PlaylistCheckpoint, PlaylistInfo, ProgressSink};
use crate::ytdlp::Downloader;

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Pacing between playlist items
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistOptions {
    /// Pause after this many items
    pub batch_size: usize,
    pub cooldown: Duration,
}

impl Default for PlaylistOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

#[derive(Debug)]
pub enum PlaylistEvent<'a> {
    Started {
        title: &'a str,
        total: usize,
        start_from: usize,
    },
    ItemStarted {
        index: usize,
        total: usize,
        title: &'a str,
    },
    ItemSkipped {
        index: usize,
        title: &'a str,
    },
    ItemCompleted {
        index: usize,
        title: &'a str,
        used_fallback: bool,
    },
    ItemFailed {
        index: usize,
        title: &'a str,
        error: &'a DownloadError,
    },
    CheckpointNotSaved {
        error: &'a CheckpointError,
    },
    Cooldown {
        after_index: usize,
        duration: Duration,
    },
    Finished(&'a PlaylistSummary),
}

/// Receives notifications as the playlist run advances
pub trait PlaylistObserver {
    fn notify(&self, event: PlaylistEvent<'_>);
}

pub struct NoObserver;

impl PlaylistObserver for NoObserver {
    fn notify(&self, _event: PlaylistEvent<'_>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistSummary {
    /// Items completed across the whole playlist
    pub succeeded: usize,
    /// Items failed across the whole playlist
    pub failed: usize,
    /// Items already completed when the run reached them
    pub skipped: usize,
    pub total: usize,
    pub all_succeeded: bool,
}

/// Shared collaborators for one playlist run
pub struct PlaylistRun<'a> {
    pub downloader: &'a (dyn Downloader + Send + Sync),
    pub store: &'a CheckpointStore,
    pub download: &'a DownloadOptions,
    pub pacing: &'a PlaylistOptions,
    pub progress: &'a (dyn ProgressSink + Sync),
    pub observer: &'a (dyn PlaylistObserver + Sync),
}

impl PlaylistRun<'_> {
    /// Download items from `start_from` on, persisting the checkpoint after each
    ///
    /// Per-item failures are recorded in the checkpoint. Only an output
    /// directory that cannot be created ends the run with an error, leaving the
    /// remaining statuses untouched.
    pub async fn run(
        &self,
        checkpoint: &mut PlaylistCheckpoint,
        start_from: usize,
    ) -> Result<PlaylistSummary, DownloadError> {
        if let Some(dir) = &self.download.output_dir {
            create_output_dir(dir).await?;
        }

        let total = checkpoint.items.len();
        info!(
            "Downloading playlist '{}': {} items, starting at {}",
            checkpoint.playlist_title,
            total,
            start_from + 1
        );
        self.observer.notify(PlaylistEvent::Started {
            title: &checkpoint.playlist_title,
            total,
            start_from,
        });

        let mut skipped = 0;
        for index in start_from..total {
            if checkpoint.items[index].is_completed() {
                skipped += 1;
                self.observer.notify(PlaylistEvent::ItemSkipped {
                    index,
                    title: &checkpoint.items[index].title,
                });
                continue;
            }

            self.download_item(checkpoint, index).await?;

            if let Err(error) = self.store.save(checkpoint).await {
                warn!("Could not save checkpoint: {}", error);
                self.observer
                    .notify(PlaylistEvent::CheckpointNotSaved { error: &error });
            }

            if self.cooldown_due(index, total) {
                info!(
                    "Pausing {}s after {} items",
                    self.pacing.cooldown.as_secs(),
                    index + 1
                );
                self.observer.notify(PlaylistEvent::Cooldown {
                    after_index: index,
                    duration: self.pacing.cooldown,
                });
                tokio::time::sleep(self.pacing.cooldown).await;
            }
        }

        let succeeded = checkpoint.completed_count();
        let summary = PlaylistSummary {
            succeeded,
            failed: checkpoint.failed_count(),
            skipped,
            total,
            all_succeeded: succeeded == total,
        };
        info!(
            "Playlist finished: {} succeeded, {} failed, {} total",
            summary.succeeded, summary.failed, summary.total
        );
        self.observer.notify(PlaylistEvent::Finished(&summary));
        Ok(summary)
    }

    async fn download_item(
        &self,
        checkpoint: &mut PlaylistCheckpoint,
        index: usize,
    ) -> Result<(), DownloadError> {
        let total = checkpoint.items.len();
        let item = &checkpoint.items[index];
        self.observer.notify(PlaylistEvent::ItemStarted {
            index,
            total,
            title: &item.title,
        });

        let result = download_one(
            self.downloader,
            &item.url,
            &checkpoint.format_selector,
            self.download,
            self.progress,
        )
        .await;

        match result {
            Ok(outcome) => {
                self.observer.notify(PlaylistEvent::ItemCompleted {
                    index,
                    title: &item.title,
                    used_fallback: outcome.used_fallback,
                });
                checkpoint.items[index].status = ItemStatus::Completed;
            }
            Err(error @ DownloadError::OutputDir { .. }) => return Err(error),
            Err(error) => {
                warn!("Failed to download '{}': {}", item.title, error);
                self.observer.notify(PlaylistEvent::ItemFailed {
                    index,
                    title: &item.title,
                    error: &error,
                });
                checkpoint.items[index].status = ItemStatus::Failed;
            }
        }
        Ok(())
    }

    fn cooldown_due(&self, index: usize, total: usize) -> bool {
        self.pacing.batch_size > 0
            && (index + 1) % self.pacing.batch_size == 0
            && index + 1 < total
    }
}

/// Keep only the items picked by 1-based numbers such as `1,3,5`
pub fn select_items(playlist: PlaylistInfo, answer: &str) -> Result<PlaylistInfo, SelectionError> {
    let max = playlist.items.len();
    let mut indices = Vec::new();
    for part in answer.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let choice: usize = part
            .parse()
            .map_err(|_| SelectionError::NotANumber(part.to_string()))?;
        if choice == 0 || choice > max {
            return Err(SelectionError::OutOfRange { choice, max });
        }
        if !indices.contains(&(choice - 1)) {
            indices.push(choice - 1);
        }
    }

    if indices.is_empty() {
        return Err(SelectionError::Empty);
    }

    let items = indices
        .into_iter()
        .map(|i| playlist.items[i].clone())
        .collect();
    Ok(PlaylistInfo { items, ..playlist })
}

/// Drop the items before the 1-based position given
pub fn starting_at(playlist: PlaylistInfo, answer: &str) -> Result<PlaylistInfo, SelectionError> {
    let answer = answer.trim();
    let max = playlist.items.len();
    let position: usize = answer
        .parse()
        .map_err(|_| SelectionError::NotANumber(answer.to_string()))?;
    if position == 0 || position > max {
        return Err(SelectionError::OutOfRange {
            choice: position,
            max,
        });
    }

    let items = playlist.items[position - 1..].to_vec();
    Ok(PlaylistInfo { items, ..playlist })
}
