// bases/download_cli/src/config.rs
use std::path::PathBuf;
use std::time::Duration;
use video_downloader::{DownloadOptions, PlaylistOptions, UserChoice};

use crate::args::Args;

/// Download CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL given on the command line
    pub url: Option<String>,

    /// Output directory given on the command line
    pub output_path: Option<PathBuf>,

    /// Format chosen on the command line, skips the format menus
    pub format: Option<UserChoice>,

    pub subtitles: bool,
    pub subtitle_langs: Vec<String>,

    /// Pacing for playlist downloads
    pub pacing: PlaylistOptions,

    pub ytdlp: PathBuf,
    pub assume_yes: bool,
    pub check_ffmpeg: bool,
    pub verbose: bool,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: Args) -> Self {
        let format = match (args.preset, args.audio_only, args.format) {
            (Some(preset), _, _) => Some(UserChoice::Preset(preset)),
            (None, true, _) => Some(UserChoice::AudioOnly),
            (None, false, Some(id)) => Some(UserChoice::Explicit(id)),
            (None, false, None) => None,
        };

        Self {
            url: args.url.filter(|url| !url.trim().is_empty()),
            output_path: args.output_path,
            format,
            subtitles: !args.no_subs,
            subtitle_langs: args.sub_langs,
            pacing: PlaylistOptions {
                batch_size: args.batch_size,
                cooldown: Duration::from_secs(args.cooldown_secs),
            },
            ytdlp: args.ytdlp,
            assume_yes: args.yes,
            check_ffmpeg: args.check_ffmpeg,
            verbose: args.verbose,
        }
    }

    /// Per-download options for the given output directory
    pub fn download_options(&self, output_dir: Option<PathBuf>, transcoder_available: bool) -> DownloadOptions {
        DownloadOptions {
            output_dir,
            subtitles: self.subtitles,
            subtitle_langs: self.subtitle_langs.clone(),
            transcoder_available,
            ..DownloadOptions::default()
        }
    }

    /// Default tracing filter
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "download_cli=debug,video_downloader=debug"
        } else {
            "download_cli=info,video_downloader=info"
        }
    }
}
