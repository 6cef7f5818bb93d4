// bases/download_cli/src/args.rs
use clap::Parser;
use std::path::PathBuf;
use video_downloader::Preset;

/// Download videos and playlists, resuming interrupted playlist downloads
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Video or playlist URL (prompted for when omitted)
    pub url: Option<String>,

    /// Directory to store downloaded files (defaults to the current directory)
    pub output_path: Option<PathBuf>,

    /// Use a preset format: best, best-audio, balanced, low-bandwidth
    #[arg(short, long, conflicts_with_all = ["audio_only", "format"])]
    pub preset: Option<Preset>,

    /// Download the best audio-only stream
    #[arg(short, long, conflicts_with = "format")]
    pub audio_only: bool,

    /// Exact format id as listed by the engine
    #[arg(short, long)]
    pub format: Option<String>,

    /// Subtitle languages to fetch, comma separated
    #[arg(long, value_delimiter = ',', conflicts_with = "no_subs")]
    pub sub_langs: Vec<String>,

    /// Do not download subtitles
    #[arg(long)]
    pub no_subs: bool,

    /// Answer yes to the resume question and skip optional prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Items to download between cooldown pauses
    #[arg(long, default_value_t = 5)]
    pub batch_size: usize,

    /// Length of the cooldown pause in seconds
    #[arg(long, default_value_t = 10)]
    pub cooldown_secs: u64,

    /// Path or name of the yt-dlp executable
    #[arg(long, default_value = "yt-dlp")]
    pub ytdlp: PathBuf,

    /// Report whether ffmpeg is installed and how to install it, then exit
    #[arg(long)]
    pub check_ffmpeg: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
