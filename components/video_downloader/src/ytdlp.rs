// components/video_downloader/src/ytdlp.rs
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};
use url::Url;

use crate::error::ExtractionError;
use crate::types::{FormatOption, PlaylistInfo, PlaylistItem, ProgressEvent, ProgressSink, VideoFormats};

/// Marker prefixed to every progress line so it can be told apart from other output
const PROGRESS_MARKER: &str = "vdl-progress";

/// Everything the engine needs to fetch one URL
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub url: Url,
    pub format: String,
    pub output_template: String,
    /// Retries for both whole requests and fragments
    pub retries: u32,
    /// Subtitle languages, `None` disables subtitles
    pub subtitle_langs: Option<Vec<String>>,
    /// Convert to mp4 and embed subtitles, needs ffmpeg
    pub transcode: bool,
    pub ignore_errors: bool,
}

#[async_trait]
pub trait Downloader {
    /// Check if the engine is available
    async fn check_available(&self) -> Result<(), ExtractionError>;

    /// List the formats offered for a single video without downloading it
    async fn list_formats(&self, url: &Url) -> Result<VideoFormats, ExtractionError>;

    /// Fetch playlist title and entries without downloading them
    async fn fetch_playlist(&self, url: &Url) -> Result<PlaylistInfo, ExtractionError>;

    /// Run one download, returning the engine's exit code
    async fn download(
        &self,
        request: &EngineRequest,
        progress: &(dyn ProgressSink + Sync),
    ) -> std::io::Result<i32>;
}

/// The yt-dlp command line program
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    async fn dump_json(&self, args: &[&str], url: &Url) -> Result<Vec<u8>, ExtractionError> {
        let output = Command::new(&self.program)
            .args(args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExtractionError::spawn(self.program_name(), e))?;

        if !output.status.success() {
            return Err(ExtractionError::Unresolved {
                url: url.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn check_available(&self) -> Result<(), ExtractionError> {
        which::which(&self.program)
            .map(|_| ())
            .map_err(|_| ExtractionError::DependencyNotFound(self.program_name()))
    }

    async fn list_formats(&self, url: &Url) -> Result<VideoFormats, ExtractionError> {
        let stdout = self
            .dump_json(&["--dump-single-json", "--no-playlist", "--no-warnings"], url)
            .await?;

        let info: YtDlpVideo = serde_json::from_slice(&stdout).map_err(|source| {
            ExtractionError::Parse {
                url: url.to_string(),
                source,
            }
        })?;

        debug!("Engine reported {} formats for {}", info.formats.len(), url);
        Ok(group_formats(info))
    }

    async fn fetch_playlist(&self, url: &Url) -> Result<PlaylistInfo, ExtractionError> {
        let stdout = self
            .dump_json(&["--flat-playlist", "--dump-single-json", "--no-warnings"], url)
            .await?;

        let playlist: YtDlpPlaylist = serde_json::from_slice(&stdout).map_err(|source| {
            ExtractionError::Parse {
                url: url.to_string(),
                source,
            }
        })?;

        playlist.into_info(url)
    }

    async fn download(
        &self,
        request: &EngineRequest,
        progress: &(dyn ProgressSink + Sync),
    ) -> std::io::Result<i32> {
        let args = download_args(request);
        debug!("Running {} {}", self.program_name(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        // the child must be gone before a fallback attempt starts
                        if let Err(kill_error) = child.kill().await {
                            warn!("Could not stop {}: {}", self.program_name(), kill_error);
                        }
                        return Err(e);
                    }
                }

                // titles are not guaranteed to be UTF-8 on every console
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                match parse_progress(line) {
                    Some(event) => progress.report(event),
                    None => debug!("yt-dlp: {}", line),
                }
            }
        }

        let status = child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Command line arguments for one download
pub fn download_args(request: &EngineRequest) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--format".into(),
        request.format.clone(),
        "--output".into(),
        request.output_template.clone(),
        "--retries".into(),
        request.retries.to_string(),
        "--fragment-retries".into(),
        request.retries.to_string(),
        "--no-playlist".into(),
        "--newline".into(),
        "--progress-template".into(),
        format!(
            "download:{}|%(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s",
            PROGRESS_MARKER
        ),
    ];

    if request.ignore_errors {
        args.push("--ignore-errors".into());
    }

    if let Some(langs) = &request.subtitle_langs {
        args.extend([
            "--write-subs".into(),
            "--write-auto-subs".into(),
            "--sub-langs".into(),
            langs.join(","),
            "--sub-format".into(),
            "best".into(),
        ]);
    }

    if request.transcode {
        args.extend(["--recode-video".into(), "mp4".into()]);
        if request.subtitle_langs.is_some() {
            args.push("--embed-subs".into());
        }
    }

    args.push(request.url.to_string());
    args
}

/// Parse one line printed through the progress template
pub fn parse_progress(line: &str) -> Option<ProgressEvent> {
    let mut fields = line.trim().strip_prefix(PROGRESS_MARKER)?.split('|').skip(1);
    let status = fields.next()?.trim();

    if status == "finished" {
        return Some(ProgressEvent::Finished);
    }
    if status != "downloading" {
        return None;
    }

    let percent = fields.next().and_then(|raw| {
        raw.chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect::<String>()
            .parse()
            .ok()
    });
    let speed = fields.next().unwrap_or_default().trim().to_string();
    let eta = fields.next().unwrap_or_default().trim().to_string();

    Some(ProgressEvent::Downloading {
        percent,
        speed,
        eta,
    })
}

/// Split the raw format list into video and audio-only menus
///
/// When no format carries both tracks, any format with a video track is offered
/// instead so the menu is never empty while video streams exist.
fn group_formats(info: YtDlpVideo) -> VideoFormats {
    let options: Vec<FormatOption> = info.formats.into_iter().map(FormatOption::from).collect();

    let mut video: Vec<FormatOption> = options
        .iter()
        .filter(|f| f.has_video && f.has_audio)
        .cloned()
        .collect();
    if video.is_empty() {
        video = options.iter().filter(|f| f.has_video).cloned().collect();
    }

    let audio = options
        .iter()
        .filter(|f| !f.has_video && f.has_audio)
        .cloned()
        .collect();

    VideoFormats {
        id: info.id,
        title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
        video,
        audio,
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpVideo {
    #[serde(default)]
    id: String,
    title: Option<String>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    format_id: String,
    ext: Option<String>,
    resolution: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
}

impl From<YtDlpFormat> for FormatOption {
    fn from(format: YtDlpFormat) -> Self {
        // yt-dlp spells a missing track as the codec "none"
        let has_video = format.vcodec.as_deref() != Some("none");
        let has_audio = format.acodec.as_deref() != Some("none");
        FormatOption {
            id: format.format_id,
            resolution: format.resolution.filter(|_| has_video),
            ext: format.ext.unwrap_or_else(|| "N/A".to_string()),
            has_video,
            has_audio,
        }
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpPlaylist {
    #[serde(default)]
    id: String,
    title: Option<String>,
    #[serde(default)]
    entries: Vec<Option<YtDlpEntry>>,
}

#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    id: Option<String>,
    title: Option<String>,
}

impl YtDlpPlaylist {
    /// Usable playlist metadata, rejecting playlists left without any items
    fn into_info(self, url: &Url) -> Result<PlaylistInfo, ExtractionError> {
        let items = self
            .entries
            .into_iter()
            .flatten()
            .filter_map(|entry| {
                let id = entry.id.filter(|id| !id.is_empty())?;
                let title = entry.title.unwrap_or_else(|| "Unknown".to_string());
                Some(PlaylistItem::new(id, title))
            })
            .collect::<Vec<_>>();

        if items.is_empty() {
            return Err(ExtractionError::EmptyPlaylist(url.to_string()));
        }

        Ok(PlaylistInfo {
            id: self.id,
            title: self.title.unwrap_or_else(|| "Unknown Playlist".to_string()),
            items,
        })
    }
}
