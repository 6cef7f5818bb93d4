// components/video_downloader/src/lib.rs
mod checkpoint;
mod error;
mod format;
mod invoker;
mod playlist;
mod resume;
mod transcoder;
mod types;
mod utils;
mod ytdlp;

use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use url::Url;

pub use checkpoint::{CheckpointStore, CHECKPOINT_FILE};
pub use error::{AttemptFailure, CheckpointError, DownloadError, ExtractionError, SelectionError};
pub use format::{choose_from, resolve, FormatSelector, Preset, UserChoice};
pub use invoker::{download_one, DownloadOptions, Outcome, DEFAULT_SUBTITLE_LANGS};
pub use playlist::{
    select_items, starting_at, NoObserver, PlaylistEvent, PlaylistObserver, PlaylistOptions,
    PlaylistRun, PlaylistSummary,
};
pub use resume::{plan, resume_index, ResumeDecision, ResumeSummary};
pub use transcoder::{locate_transcoder, transcoder_available, CapabilityWarning, Host, InstallGuide};
pub use types::{
    FormatOption, ItemStatus, NoProgress, PlaylistCheckpoint, PlaylistInfo, PlaylistItem,
    ProgressEvent, ProgressSink, VideoFormats,
};
pub use utils::is_playlist_url;
pub use ytdlp::{Downloader, EngineRequest, YtDlp};

/// Entry point tying the engine to the download settings of one session
pub struct VideoDownloader {
    downloader: Arc<dyn Downloader + Send + Sync>,
    options: DownloadOptions,
    warnings: Vec<CapabilityWarning>,
}

impl VideoDownloader {
    /// Create a VideoDownloader backed by yt-dlp
    pub async fn new(ytdlp: YtDlp, options: DownloadOptions) -> Result<Self, ExtractionError> {
        Self::new_with_downloader(Arc::new(ytdlp), options).await
    }

    /// Create a VideoDownloader with a specific engine implementation
    pub async fn new_with_downloader(
        downloader: Arc<dyn Downloader + Send + Sync>,
        options: DownloadOptions,
    ) -> Result<Self, ExtractionError> {
        downloader.check_available().await?;

        let mut warnings = Vec::new();
        if !options.transcoder_available {
            warnings.push(CapabilityWarning::TranscoderMissing);
        }
        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(Self {
            downloader,
            options,
            warnings,
        })
    }

    /// Reduced capabilities this session runs with, logged once at creation
    pub fn warnings(&self) -> &[CapabilityWarning] {
        &self.warnings
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// Direct downloads into `dir`, or the current directory for `None`
    pub fn set_output_dir(&mut self, dir: Option<PathBuf>) {
        self.options.output_dir = dir;
    }

    /// Fetch playlist metadata, a playlist without items is an error
    pub async fn fetch_playlist(&self, url: &str) -> Result<PlaylistInfo, ExtractionError> {
        let playlist = self.downloader.fetch_playlist(&parse_url(url)?).await?;
        if playlist.items.is_empty() {
            return Err(ExtractionError::EmptyPlaylist(url.to_string()));
        }
        Ok(playlist)
    }

    pub async fn list_formats(&self, url: &str) -> Result<VideoFormats, ExtractionError> {
        self.downloader.list_formats(&parse_url(url)?).await
    }

    /// Download a single video
    pub async fn download(
        &self,
        url: &str,
        selector: &FormatSelector,
        progress: &(dyn ProgressSink + Sync),
    ) -> Result<Outcome, DownloadError> {
        download_one(
            self.downloader.as_ref(),
            url,
            selector.as_str(),
            &self.options,
            progress,
        )
        .await
    }

    /// Prepare a playlist run sharing this downloader's engine and settings
    pub fn playlist_run<'a>(
        &'a self,
        store: &'a CheckpointStore,
        pacing: &'a PlaylistOptions,
        progress: &'a (dyn ProgressSink + Sync),
        observer: &'a (dyn PlaylistObserver + Sync),
    ) -> PlaylistRun<'a> {
        PlaylistRun {
            downloader: self.downloader.as_ref(),
            store,
            download: &self.options,
            pacing,
            progress,
            observer,
        }
    }
}

fn parse_url(url: &str) -> Result<Url, ExtractionError> {
    Url::parse(url).map_err(|e| ExtractionError::InvalidUrl(format!("{}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;
    use ytdlp::stub::DownloaderStub;

    #[tokio::test]
    async fn test_downloader_creation() {
        let downloader =
            VideoDownloader::new_with_downloader(Arc::new(DownloaderStub::default()), DownloadOptions::default())
                .await;

        assert!(
            downloader.is_ok(),
            "Downloader creation failed with error: {:?}",
            downloader.err()
        );
    }

    #[tokio::test]
    async fn test_download() {
        let downloader =
            VideoDownloader::new_with_downloader(Arc::new(DownloaderStub::default()), DownloadOptions::default())
                .await
                .unwrap();

        let result = downloader
            .download(
                "https://www.youtube.com/watch?v=abc",
                &resolve(UserChoice::AudioOnly),
                &NoProgress,
            )
            .await;

        assert!(result.is_ok(), "Download failed with error: {:?}", result.err());
        assert_eq!(result.unwrap().selector, "bestaudio/best");
    }

    #[tokio::test]
    async fn test_invalid_playlist_url() {
        let downloader =
            VideoDownloader::new_with_downloader(Arc::new(DownloaderStub::default()), DownloadOptions::default())
                .await
                .unwrap();

        assert_matches!(
            downloader.fetch_playlist("list=PL123").await,
            Err(ExtractionError::InvalidUrl(_))
        );
    }

    #[tokio::test]
    async fn test_playlist_run_through_facade() {
        let temp_dir = TempDir::new().unwrap();
        let stub = DownloaderStub::default().with_playlist(PlaylistInfo {
            id: "PL7".to_string(),
            title: "Facade".to_string(),
            items: vec![PlaylistItem::new("a", "A"), PlaylistItem::new("b", "B")],
        });
        let downloader =
            VideoDownloader::new_with_downloader(Arc::new(stub), DownloadOptions::default())
                .await
                .unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());
        let pacing = PlaylistOptions::default();

        let playlist = downloader
            .fetch_playlist("https://www.youtube.com/playlist?list=PL7")
            .await
            .unwrap();
        let mut checkpoint =
            PlaylistCheckpoint::new(playlist, resolve(UserChoice::VideoAndAudio).into_string(), None);
        let summary = downloader
            .playlist_run(&store, &pacing, &NoProgress, &NoObserver)
            .run(&mut checkpoint, 0)
            .await
            .unwrap();

        assert!(summary.all_succeeded);
        assert_eq!(store.load().await.map(|c| c.completed_count()), Some(2));
    }

    #[tokio::test]
    async fn test_empty_playlist_is_rejected() {
        let stub = DownloaderStub::default().with_playlist(PlaylistInfo {
            id: "PL0".to_string(),
            title: "Nothing".to_string(),
            items: Vec::new(),
        });
        let downloader =
            VideoDownloader::new_with_downloader(Arc::new(stub), DownloadOptions::default())
                .await
                .unwrap();

        assert_matches!(
            downloader
                .fetch_playlist("https://www.youtube.com/playlist?list=PL0")
                .await,
            Err(ExtractionError::EmptyPlaylist(_))
        );
    }

    #[tokio::test]
    async fn test_missing_transcoder_is_reported_once() {
        let without = VideoDownloader::new_with_downloader(
            Arc::new(DownloaderStub::default()),
            DownloadOptions::default(),
        )
        .await
        .unwrap();
        let with = VideoDownloader::new_with_downloader(
            Arc::new(DownloaderStub::default()),
            DownloadOptions {
                transcoder_available: true,
                ..DownloadOptions::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(without.warnings(), [CapabilityWarning::TranscoderMissing]);
        assert!(with.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_list_formats() {
        let formats = VideoFormats {
            id: "abc".to_string(),
            title: "Talk".to_string(),
            video: Vec::new(),
            audio: vec![FormatOption {
                id: "140".to_string(),
                resolution: None,
                ext: "m4a".to_string(),
                has_video: false,
                has_audio: true,
            }],
        };
        let downloader = VideoDownloader::new_with_downloader(
            Arc::new(DownloaderStub::default().with_formats(formats.clone())),
            DownloadOptions::default(),
        )
        .await
        .unwrap();

        let listed = downloader
            .list_formats("https://www.youtube.com/watch?v=abc")
            .await
            .unwrap();
        assert_eq!(listed, formats);
        assert_eq!(
            choose_from(&listed.audio, "1").map(resolve),
            Ok(FormatSelector::new("140"))
        );
    }
}
