// components/video_downloader/src/invoker.rs
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

use crate::error::{AttemptFailure, DownloadError};
use crate::format::FALLBACK;
use crate::types::ProgressSink;
use crate::utils::output_template;
use crate::ytdlp::{Downloader, EngineRequest};

pub const DEFAULT_RETRIES: u32 = 10;
pub const DEFAULT_SUBTITLE_LANGS: [&str; 3] = ["en", "zh-Hans", "zh-CN"];

/// Settings applied to every single download
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOptions {
    /// `None` downloads into the current working directory
    pub output_dir: Option<PathBuf>,
    pub subtitles: bool,
    /// Languages to fetch, the defaults are used when empty
    pub subtitle_langs: Vec<String>,
    pub retries: u32,
    /// Whether ffmpeg was found on the host
    pub transcoder_available: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            subtitles: true,
            subtitle_langs: Vec::new(),
            retries: DEFAULT_RETRIES,
            transcoder_available: false,
        }
    }
}

impl DownloadOptions {
    pub fn effective_subtitle_langs(&self) -> Option<Vec<String>> {
        if !self.subtitles {
            return None;
        }
        if self.subtitle_langs.is_empty() {
            Some(DEFAULT_SUBTITLE_LANGS.iter().map(|s| s.to_string()).collect())
        } else {
            Some(self.subtitle_langs.clone())
        }
    }
}

/// How a successful download was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub selector: String,
    pub used_fallback: bool,
}

/// Download one URL, retrying once with the single-stream `best` selector
pub async fn download_one(
    downloader: &(dyn Downloader + Send + Sync),
    url: &str,
    format_selector: &str,
    options: &DownloadOptions,
    progress: &(dyn ProgressSink + Sync),
) -> Result<Outcome, DownloadError> {
    let url = Url::parse(url).map_err(|e| DownloadError::InvalidUrl(format!("{}: {}", url, e)))?;

    if let Some(dir) = &options.output_dir {
        create_output_dir(dir).await?;
    }

    let mut request = EngineRequest {
        url,
        format: format_selector.to_string(),
        output_template: output_template(options.output_dir.as_deref()),
        retries: options.retries,
        subtitle_langs: options.effective_subtitle_langs(),
        transcode: options.transcoder_available,
        ignore_errors: true,
    };

    let primary = match attempt(downloader, &request, progress).await {
        Ok(()) => {
            return Ok(Outcome {
                selector: request.format,
                used_fallback: false,
            })
        }
        Err(failure) => failure,
    };

    warn!(
        "Download of {} with '{}' failed ({}), retrying with '{}'",
        request.url, request.format, primary, FALLBACK
    );
    request.format = FALLBACK.to_string();

    match attempt(downloader, &request, progress).await {
        Ok(()) => {
            info!("Fallback download of {} succeeded", request.url);
            Ok(Outcome {
                selector: request.format,
                used_fallback: true,
            })
        }
        Err(fallback) => Err(DownloadError::Failed {
            url: request.url.to_string(),
            primary,
            fallback,
        }),
    }
}

async fn attempt(
    downloader: &(dyn Downloader + Send + Sync),
    request: &EngineRequest,
    progress: &(dyn ProgressSink + Sync),
) -> Result<(), AttemptFailure> {
    match downloader.download(request, progress).await? {
        0 => Ok(()),
        code => Err(AttemptFailure::ExitCode(code)),
    }
}

pub(crate) async fn create_output_dir(dir: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| DownloadError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })
}
