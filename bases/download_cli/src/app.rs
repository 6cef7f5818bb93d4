// bases/download_cli/src/app.rs
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use video_downloader::{
    choose_from, is_playlist_url, locate_transcoder, plan, resolve, select_items, starting_at,
    transcoder_available, CheckpointStore, Downloader, FormatSelector, Host, InstallGuide,
    PlaylistCheckpoint, PlaylistInfo, Preset, ResumeDecision, SelectionError, UserChoice,
    VideoDownloader, YtDlp,
};

use crate::config::Config;
use crate::output::OutputHandler;
use crate::prompt::Prompter;

/// Where the format menus get their concrete format list from
enum FormatSource<'a> {
    /// Playlists only offer generic selectors
    Playlist,
    Single {
        downloader: &'a VideoDownloader,
        url: &'a str,
    },
}

pub struct App<P: Prompter> {
    config: Config,
    output: OutputHandler,
    prompter: P,
    engine: Arc<dyn Downloader + Send + Sync>,
    store: CheckpointStore,
}

impl<P: Prompter> App<P> {
    pub fn new(config: Config, prompter: P) -> Self {
        let engine = Arc::new(YtDlp::new(config.ytdlp.clone()));
        Self::with_parts(config, prompter, engine, CheckpointStore::in_current_dir())
    }

    pub fn with_parts(
        config: Config,
        prompter: P,
        engine: Arc<dyn Downloader + Send + Sync>,
        store: CheckpointStore,
    ) -> Self {
        let output = OutputHandler::new(config.verbose);
        Self {
            config,
            output,
            prompter,
            engine,
            store,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.config.check_ffmpeg {
            self.report_ffmpeg();
            return Ok(());
        }

        self.output.print_banner();

        let mut downloader = VideoDownloader::new_with_downloader(
            self.engine.clone(),
            self.config.download_options(None, transcoder_available()),
        )
        .await?;
        if !downloader.warnings().is_empty() {
            println!("Run with --check-ffmpeg for ffmpeg install steps");
        }

        if self.try_resume(&mut downloader).await? {
            return Ok(());
        }

        let url = match &self.config.url {
            Some(url) => url.clone(),
            None => self
                .prompter
                .ask("Enter a video or playlist URL: ")?
                .trim()
                .to_string(),
        };
        if url.is_empty() {
            return Err(eyre!("no URL given"));
        }

        if is_playlist_url(&url) {
            match downloader.fetch_playlist(&url).await {
                Ok(playlist) => return self.download_playlist(&mut downloader, playlist).await,
                Err(error) => {
                    warn!("Could not fetch playlist information: {}", error);
                    println!("Could not read the playlist, trying a single video download instead");
                }
            }
        }

        self.download_single(&mut downloader, &url).await
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }

    fn report_ffmpeg(&self) {
        match locate_transcoder() {
            Some(path) => self.output.print_ffmpeg_found(&path),
            None => self
                .output
                .print_install_guide(&InstallGuide::for_host(&Host::detect())),
        }
    }

    /// Offer to continue a checkpointed playlist, returns whether it ran
    async fn try_resume(&mut self, downloader: &mut VideoDownloader) -> Result<bool> {
        let Some(mut checkpoint) = self.store.load().await else {
            return Ok(false);
        };

        let assume_yes = self.config.assume_yes;
        let output = &self.output;
        let prompter = &mut self.prompter;
        let decision = plan(Some(&checkpoint), |summary| {
            output.print_resume_summary(summary);
            assume_yes
                || prompter
                    .confirm("Continue the previous download?")
                    .unwrap_or_else(|error| {
                        warn!("Could not read an answer, not resuming: {}", error);
                        false
                    })
        });

        let start_from = match decision {
            ResumeDecision::NoPriorState => return Ok(false),
            ResumeDecision::ResumeFrom(index) => index,
            ResumeDecision::RestartFromZero => {
                self.output.print_restart();
                checkpoint.reset_statuses();
                0
            }
        };

        info!(
            "Resuming '{}' from item {}",
            checkpoint.playlist_title,
            start_from + 1
        );
        downloader.set_output_dir(checkpoint.output_path.clone());
        self.run_playlist(downloader, checkpoint, start_from).await?;
        Ok(true)
    }

    async fn download_playlist(
        &mut self,
        downloader: &mut VideoDownloader,
        playlist: PlaylistInfo,
    ) -> Result<()> {
        self.output.print_playlist_found(&playlist);

        let playlist = if self.config.assume_yes {
            playlist
        } else {
            self.narrow_playlist(playlist)?
        };

        let selector = self.choose_format(FormatSource::Playlist).await?;
        let output_dir = self.choose_output_dir()?;
        downloader.set_output_dir(output_dir.clone());

        let checkpoint = PlaylistCheckpoint::new(playlist, selector.into_string(), output_dir);
        self.run_playlist(downloader, checkpoint, 0).await
    }

    async fn run_playlist(
        &self,
        downloader: &VideoDownloader,
        mut checkpoint: PlaylistCheckpoint,
        start_from: usize,
    ) -> Result<()> {
        downloader
            .playlist_run(&self.store, &self.config.pacing, &self.output, &self.output)
            .run(&mut checkpoint, start_from)
            .await?;
        Ok(())
    }

    async fn download_single(&mut self, downloader: &mut VideoDownloader, url: &str) -> Result<()> {
        let selector = self
            .choose_format(FormatSource::Single {
                downloader: &*downloader,
                url,
            })
            .await?;
        let output_dir = self.choose_output_dir()?;
        downloader.set_output_dir(output_dir.clone());

        self.output.print_download_start(url);
        let outcome = downloader.download(url, &selector, &self.output).await?;
        self.output
            .print_download_complete(output_dir.as_deref(), &outcome);
        Ok(())
    }

    /// Let the user keep every item, pick some, or start part-way through
    fn narrow_playlist(&mut self, playlist: PlaylistInfo) -> Result<PlaylistInfo> {
        self.output.print_playlist_menu();
        let answer = self.prompter.ask("Choose (1/2/3): ")?;

        let playlist = match answer.trim() {
            "1" => playlist,
            "2" => {
                self.output.print_playlist_items(&playlist);
                let picked = self
                    .prompter
                    .ask("Enter the numbers to download, separated by commas (e.g. 1,3,5): ")?;
                select_items(playlist, &picked)?
            }
            "3" => {
                let question = format!(
                    "Enter the number to start from (1 to {}): ",
                    playlist.items.len()
                );
                let position = self.prompter.ask(&question)?;
                starting_at(playlist, &position)?
            }
            other => return Err(SelectionError::UnknownChoice(other.to_string()).into()),
        };
        Ok(playlist)
    }

    async fn choose_format(&mut self, source: FormatSource<'_>) -> Result<FormatSelector> {
        if let Some(choice) = &self.config.format {
            return Ok(resolve(choice.clone()));
        }

        self.output.print_type_menu();
        let answer = self.prompter.ask("Enter your choice (1/2/3): ")?;
        let audio_only = match answer.trim() {
            "1" => false,
            "2" => true,
            "3" => return Ok(resolve(self.choose_preset()?)),
            other => return Err(SelectionError::UnknownChoice(other.to_string()).into()),
        };
        let generic = if audio_only {
            UserChoice::AudioOnly
        } else {
            UserChoice::VideoAndAudio
        };

        let FormatSource::Single { downloader, url } = source else {
            return Ok(resolve(generic));
        };

        println!("Fetching video information...");
        let formats = downloader.list_formats(url).await?;
        self.output.print_video_found(&formats);

        if formats.is_empty() {
            self.output.print_no_formats();
            return Ok(resolve(self.choose_preset()?));
        }

        let (heading, options) = if audio_only {
            ("Available audio formats", &formats.audio)
        } else {
            ("Available video formats", &formats.video)
        };
        if options.is_empty() {
            println!("No formats of that kind were listed, using the best available");
            return Ok(resolve(generic));
        }

        self.output.print_format_list(heading, options);
        let question = format!("Choose a format (1-{}): ", options.len());
        let picked = self.prompter.ask(&question)?;
        Ok(resolve(choose_from(options, &picked)?))
    }

    fn choose_preset(&mut self) -> Result<UserChoice> {
        self.output.print_preset_menu();
        let answer = self.prompter.ask("Choose (1-4): ")?;
        Ok(UserChoice::Preset(Preset::from_menu(&answer)?))
    }

    fn choose_output_dir(&mut self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.config.output_path {
            return Ok(Some(path.clone()));
        }
        if self.config.assume_yes || !self.prompter.confirm("\nSpecify a download path?")? {
            return Ok(None);
        }

        let path = self.prompter.ask("Enter the download path: ")?;
        let path = path.trim();
        Ok((!path.is_empty()).then(|| PathBuf::from(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use crate::prompt::scripted::ScriptedPrompter;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use clap::Parser;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use url::Url;
    use video_downloader::{
        DownloadError, EngineRequest, ExtractionError, FormatOption, ItemStatus, PlaylistItem,
        ProgressSink, VideoFormats,
    };

    #[derive(Default)]
    struct FakeEngine {
        playlist: Option<PlaylistInfo>,
        formats: VideoFormats,
        downloads: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Downloader for FakeEngine {
        async fn check_available(&self) -> Result<(), ExtractionError> {
            Ok(())
        }

        async fn list_formats(&self, _url: &Url) -> Result<VideoFormats, ExtractionError> {
            Ok(self.formats.clone())
        }

        async fn fetch_playlist(&self, url: &Url) -> Result<PlaylistInfo, ExtractionError> {
            self.playlist.clone().ok_or_else(|| ExtractionError::Unresolved {
                url: url.to_string(),
                stderr: "playlist does not exist".to_string(),
            })
        }

        async fn download(
            &self,
            request: &EngineRequest,
            _progress: &(dyn ProgressSink + Sync),
        ) -> std::io::Result<i32> {
            self.downloads
                .lock()
                .unwrap()
                .push((request.url.to_string(), request.format.clone()));
            Ok(0)
        }
    }

    const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PL5";
    const VIDEO_URL: &str = "https://www.youtube.com/watch?v=solo";

    fn three_items() -> PlaylistInfo {
        PlaylistInfo {
            id: "PL5".to_string(),
            title: "Three".to_string(),
            items: vec![
                PlaylistItem::new("v0", "Zero"),
                PlaylistItem::new("v1", "One"),
                PlaylistItem::new("v2", "Two"),
            ],
        }
    }

    fn config(argv: &[&str]) -> Config {
        let mut full = vec!["download-cli", "--cooldown-secs", "0"];
        full.extend_from_slice(argv);
        Config::from_args(Args::parse_from(full))
    }

    struct Fixture {
        dir: TempDir,
        store: CheckpointStore,
        engine: Arc<FakeEngine>,
    }

    impl Fixture {
        fn new(engine: FakeEngine) -> Self {
            let dir = TempDir::new().unwrap();
            let store = CheckpointStore::in_dir(dir.path());
            Self {
                dir,
                store,
                engine: Arc::new(engine),
            }
        }

        fn app(&self, config: Config, answers: &[&str]) -> App<ScriptedPrompter> {
            App::with_parts(
                config,
                ScriptedPrompter::new(answers),
                self.engine.clone(),
                self.store.clone(),
            )
        }

        fn downloads(&self) -> Vec<(String, String)> {
            self.engine.downloads.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn playlist_with_preset_downloads_everything() {
        let fixture = Fixture::new(FakeEngine {
            playlist: Some(three_items()),
            ..FakeEngine::default()
        });
        let mut app = fixture.app(config(&[PLAYLIST_URL, "--preset", "best-audio", "--yes"]), &[]);

        app.run().await.unwrap();

        let downloads = fixture.downloads();
        assert_eq!(downloads.len(), 3);
        assert!(downloads.iter().all(|(_, format)| format == "bestaudio/best"));
        let saved = fixture.store.load().await.unwrap();
        assert_eq!(saved.completed_count(), 3);
        assert_eq!(saved.format_selector, "bestaudio/best");
    }

    #[tokio::test]
    async fn interactive_playlist_start_position() {
        let fixture = Fixture::new(FakeEngine {
            playlist: Some(three_items()),
            ..FakeEngine::default()
        });
        // start at 2, video + audio, no custom path
        let mut app = fixture.app(config(&[PLAYLIST_URL]), &["3", "2", "1", "n"]);

        app.run().await.unwrap();

        let urls: Vec<_> = fixture.downloads().into_iter().map(|(url, _)| url).collect();
        assert_eq!(
            urls,
            [
                "https://www.youtube.com/watch?v=v1",
                "https://www.youtube.com/watch?v=v2"
            ]
        );
        assert_eq!(fixture.store.load().await.unwrap().total_count, 2);
    }

    #[tokio::test]
    async fn resumes_previous_checkpoint_when_confirmed() {
        let fixture = Fixture::new(FakeEngine::default());
        let mut checkpoint = PlaylistCheckpoint::new(three_items(), "best", None);
        checkpoint.items[0].status = ItemStatus::Completed;
        checkpoint.items[1].status = ItemStatus::Failed;
        fixture.store.save(&checkpoint).await.unwrap();

        let mut app = fixture.app(config(&[]), &["y"]);
        app.run().await.unwrap();

        let urls: Vec<_> = fixture.downloads().into_iter().map(|(url, _)| url).collect();
        assert_eq!(
            urls,
            [
                "https://www.youtube.com/watch?v=v1",
                "https://www.youtube.com/watch?v=v2"
            ]
        );
        assert_eq!(fixture.store.load().await.unwrap().completed_count(), 3);
    }

    #[tokio::test]
    async fn declined_resume_continues_with_new_url() {
        let fixture = Fixture::new(FakeEngine::default());
        let checkpoint = PlaylistCheckpoint::new(three_items(), "best", None);
        fixture.store.save(&checkpoint).await.unwrap();

        // decline the resume, then no custom path
        let mut app = fixture.app(config(&[VIDEO_URL, "--audio-only"]), &["n", "n"]);
        app.run().await.unwrap();

        assert_eq!(
            fixture.downloads(),
            [(VIDEO_URL.to_string(), "bestaudio/best".to_string())]
        );
        assert_eq!(
            app.prompter.questions[0],
            "Continue the previous download? (y/n): "
        );
    }

    #[tokio::test]
    async fn single_video_uses_chosen_format_id() {
        let fixture = Fixture::new(FakeEngine {
            formats: VideoFormats {
                id: "solo".to_string(),
                title: "Solo".to_string(),
                video: vec![
                    FormatOption {
                        id: "18".to_string(),
                        resolution: Some("640x360".to_string()),
                        ext: "mp4".to_string(),
                        has_video: true,
                        has_audio: true,
                    },
                    FormatOption {
                        id: "22".to_string(),
                        resolution: Some("1280x720".to_string()),
                        ext: "mp4".to_string(),
                        has_video: true,
                        has_audio: true,
                    },
                ],
                audio: Vec::new(),
            },
            ..FakeEngine::default()
        });
        let mut app = fixture.app(config(&[VIDEO_URL]), &["1", "2", "n"]);

        app.run().await.unwrap();

        assert_eq!(fixture.downloads(), [(VIDEO_URL.to_string(), "22".to_string())]);
    }

    #[tokio::test]
    async fn missing_formats_fall_back_to_preset_menu() {
        let fixture = Fixture::new(FakeEngine::default());
        let mut app = fixture.app(config(&[VIDEO_URL]), &["2", "3", "n"]);

        app.run().await.unwrap();

        assert_eq!(
            fixture.downloads(),
            [(
                VIDEO_URL.to_string(),
                "bestvideo[height<=720]+bestaudio/best[height<=720]/best".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn unreadable_playlist_falls_back_to_single_video() {
        let fixture = Fixture::new(FakeEngine::default());
        let mut app = fixture.app(config(&[PLAYLIST_URL, "--preset", "low", "--yes"]), &[]);

        app.run().await.unwrap();

        assert_eq!(
            fixture.downloads(),
            [(PLAYLIST_URL.to_string(), "worstvideo+worstaudio/worst".to_string())]
        );
        assert!(fixture.store.load().await.is_none());
    }

    #[tokio::test]
    async fn invalid_preset_answer_is_an_error() {
        let fixture = Fixture::new(FakeEngine::default());
        let mut app = fixture.app(config(&[VIDEO_URL]), &["3", "9"]);

        let error = app.run().await.unwrap_err();

        assert_matches!(
            error.downcast_ref::<SelectionError>(),
            Some(SelectionError::UnknownPreset(_))
        );
        assert!(fixture.downloads().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_format_is_an_error() {
        let fixture = Fixture::new(FakeEngine {
            formats: VideoFormats {
                id: "solo".to_string(),
                title: "Solo".to_string(),
                video: Vec::new(),
                audio: vec![FormatOption {
                    id: "140".to_string(),
                    resolution: None,
                    ext: "m4a".to_string(),
                    has_video: false,
                    has_audio: true,
                }],
            },
            ..FakeEngine::default()
        });
        let mut app = fixture.app(config(&[VIDEO_URL]), &["2", "5"]);

        let error = app.run().await.unwrap_err();

        assert_matches!(
            error.downcast_ref::<SelectionError>(),
            Some(SelectionError::OutOfRange { choice: 5, max: 1 })
        );
    }

    #[tokio::test]
    async fn custom_output_path_is_recorded_in_checkpoint() {
        let fixture = Fixture::new(FakeEngine {
            playlist: Some(three_items()),
            ..FakeEngine::default()
        });
        let target = fixture.dir.path().join("videos");
        let target_arg = target.to_string_lossy().into_owned();
        let mut app = fixture.app(config(&[PLAYLIST_URL, target_arg.as_str(), "--yes", "--audio-only"]), &[]);

        app.run().await.unwrap();

        let saved = fixture.store.load().await.unwrap();
        assert_eq!(saved.output_path, Some(target.clone()));
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn empty_playlist_falls_back_to_single_video() {
        let fixture = Fixture::new(FakeEngine {
            playlist: Some(PlaylistInfo {
                id: "PL5".to_string(),
                title: "Empty".to_string(),
                items: Vec::new(),
            }),
            ..FakeEngine::default()
        });
        let mut app = fixture.app(config(&[PLAYLIST_URL, "--audio-only", "--yes"]), &[]);

        app.run().await.unwrap();

        assert_eq!(
            fixture.downloads(),
            [(PLAYLIST_URL.to_string(), "bestaudio/best".to_string())]
        );
        assert!(fixture.store.load().await.is_none());
    }

    #[tokio::test]
    async fn uncreatable_playlist_output_dir_is_an_error() {
        let fixture = Fixture::new(FakeEngine {
            playlist: Some(three_items()),
            ..FakeEngine::default()
        });
        let blocker = fixture.dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let target_arg = blocker.join("videos").to_string_lossy().into_owned();
        let mut app = fixture.app(config(&[PLAYLIST_URL, target_arg.as_str(), "--yes", "--audio-only"]), &[]);

        let error = app.run().await.unwrap_err();

        assert_matches!(
            error.downcast_ref::<DownloadError>(),
            Some(DownloadError::OutputDir { .. })
        );
        assert!(fixture.downloads().is_empty());
        assert!(fixture.store.load().await.is_none());
    }

    #[tokio::test]
    async fn unanswerable_resume_question_declines_resume() {
        let fixture = Fixture::new(FakeEngine::default());
        let checkpoint = PlaylistCheckpoint::new(three_items(), "best", None);
        fixture.store.save(&checkpoint).await.unwrap();
        let target_arg = fixture.dir.path().join("videos").to_string_lossy().into_owned();

        // no scripted answers, so the resume question hits end of input
        let mut app = fixture.app(config(&[VIDEO_URL, target_arg.as_str(), "--audio-only"]), &[]);
        app.run().await.unwrap();

        assert_eq!(
            fixture.downloads(),
            [(VIDEO_URL.to_string(), "bestaudio/best".to_string())]
        );
        assert_eq!(fixture.store.load().await, Some(checkpoint));
    }
}
