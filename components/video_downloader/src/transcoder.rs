// components/video_downloader/src/transcoder.rs
//! ffmpeg detection and host-specific install instructions

use std::fmt;
use std::path::PathBuf;

pub const TRANSCODER: &str = "ffmpeg";
const DOWNLOAD_PAGE: &str = "https://ffmpeg.org/download.html";
const WINDOWS_BUILDS: &str = "https://github.com/BtbN/FFmpeg-Builds/releases";

/// Reduced capability the run continues with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityWarning {
    TranscoderMissing,
}

impl fmt::Display for CapabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityWarning::TranscoderMissing => write!(
                f,
                "{} not found on PATH, streams may not be merged and subtitles will not be embedded",
                TRANSCODER
            ),
        }
    }
}

/// Location of ffmpeg on PATH, if any
pub fn locate_transcoder() -> Option<PathBuf> {
    which::which(TRANSCODER).ok()
}

pub fn transcoder_available() -> bool {
    locate_transcoder().is_some()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    Windows,
    MacOs,
    /// Linux with the `ID` from `/etc/os-release` when it could be read
    Linux(Option<String>),
    Other(String),
}

impl Host {
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "windows" => Host::Windows,
            "macos" => Host::MacOs,
            "linux" => Host::Linux(
                std::fs::read_to_string("/etc/os-release")
                    .ok()
                    .and_then(|content| distro_id(&content)),
            ),
            other => Host::Other(other.to_string()),
        }
    }
}

/// Extract the `ID=` value from os-release content
pub fn distro_id(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("ID="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Printable install steps for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallGuide {
    pub platform: String,
    pub steps: Vec<String>,
    /// Shell commands the user can run, in order
    pub commands: Vec<String>,
}

impl InstallGuide {
    pub fn for_host(host: &Host) -> Self {
        match host {
            Host::Windows => Self {
                platform: "Windows".to_string(),
                steps: vec![
                    format!("Download a build from {} or {}", DOWNLOAD_PAGE, WINDOWS_BUILDS),
                    "Extract the archive, for example to C:\\ffmpeg".to_string(),
                    "Add C:\\ffmpeg\\bin to the Path environment variable".to_string(),
                ],
                commands: Vec::new(),
            },
            Host::MacOs => Self {
                platform: "macOS".to_string(),
                steps: vec![
                    "Install with Homebrew (recommended)".to_string(),
                    "Or with MacPorts: sudo port install ffmpeg".to_string(),
                ],
                commands: vec!["brew install ffmpeg".to_string()],
            },
            Host::Linux(distro) => Self::for_linux(distro.as_deref()),
            Host::Other(os) => Self {
                platform: os.clone(),
                steps: vec![format!("See {} for install instructions", DOWNLOAD_PAGE)],
                commands: Vec::new(),
            },
        }
    }

    fn for_linux(distro: Option<&str>) -> Self {
        let commands: &[&str] = match distro {
            Some("ubuntu") | Some("debian") => &["sudo apt update", "sudo apt install ffmpeg"],
            Some("fedora") => &["sudo dnf install ffmpeg"],
            Some("arch") | Some("manjaro") => &["sudo pacman -S ffmpeg"],
            _ => &[],
        };

        if commands.is_empty() {
            return Self {
                platform: "Linux".to_string(),
                steps: vec![
                    "Install ffmpeg with your distribution's package manager:".to_string(),
                    "Ubuntu/Debian: sudo apt install ffmpeg".to_string(),
                    "Fedora: sudo dnf install ffmpeg".to_string(),
                    "Arch/Manjaro: sudo pacman -S ffmpeg".to_string(),
                    "CentOS: sudo yum install ffmpeg".to_string(),
                ],
                commands: Vec::new(),
            };
        }

        Self {
            platform: format!("Linux ({})", distro.unwrap_or_default()),
            steps: Vec::new(),
            commands: commands.iter().map(|c| c.to_string()).collect(),
        }
    }
}
