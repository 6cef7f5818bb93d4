// components/video_downloader/src/format.rs
//! Translate menu choices into engine format selectors

use std::fmt;
use std::str::FromStr;

use crate::error::SelectionError;
use crate::types::FormatOption;

pub const BEST_VIDEO_AUDIO: &str = "bestvideo+bestaudio/best";
pub const BEST_AUDIO: &str = "bestaudio/best";
pub const BALANCED_720P: &str = "bestvideo[height<=720]+bestaudio/best[height<=720]/best";
pub const LOW_BANDWIDTH: &str = "worstvideo+worstaudio/worst";
/// Single pre-muxed stream, used when the requested selector fails
pub const FALLBACK: &str = "best";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Best,
    BestAudio,
    Balanced,
    LowBandwidth,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Best,
        Preset::BestAudio,
        Preset::Balanced,
        Preset::LowBandwidth,
    ];

    /// Parse the 1-based number shown in the preset menu
    pub fn from_menu(answer: &str) -> Result<Self, SelectionError> {
        match answer.trim() {
            "1" => Ok(Preset::Best),
            "2" => Ok(Preset::BestAudio),
            "3" => Ok(Preset::Balanced),
            "4" => Ok(Preset::LowBandwidth),
            other => Err(SelectionError::UnknownPreset(other.to_string())),
        }
    }

    pub fn selector(self) -> &'static str {
        match self {
            Preset::Best => BEST_VIDEO_AUDIO,
            Preset::BestAudio => BEST_AUDIO,
            Preset::Balanced => BALANCED_720P,
            Preset::LowBandwidth => LOW_BANDWIDTH,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Best => "Best video + audio quality",
            Preset::BestAudio => "Best audio quality",
            Preset::Balanced => "Balanced quality (720p)",
            Preset::LowBandwidth => "Low quality (saves bandwidth)",
        }
    }
}

impl FromStr for Preset {
    type Err = SelectionError;

    /// Accepts either the menu number or the preset name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" => Ok(Preset::Best),
            "best-audio" => Ok(Preset::BestAudio),
            "balanced" => Ok(Preset::Balanced),
            "low" | "low-bandwidth" => Ok(Preset::LowBandwidth),
            other => Preset::from_menu(other),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Best => "best",
            Preset::BestAudio => "best-audio",
            Preset::Balanced => "balanced",
            Preset::LowBandwidth => "low-bandwidth",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserChoice {
    VideoAndAudio,
    AudioOnly,
    Preset(Preset),
    /// A format id picked from the discovered list
    Explicit(String),
}

/// Format selector string understood by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelector(String);

impl FormatSelector {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FormatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn resolve(choice: UserChoice) -> FormatSelector {
    match choice {
        UserChoice::VideoAndAudio => FormatSelector::new(BEST_VIDEO_AUDIO),
        UserChoice::AudioOnly => FormatSelector::new(BEST_AUDIO),
        UserChoice::Preset(preset) => FormatSelector::new(preset.selector()),
        UserChoice::Explicit(id) => FormatSelector::new(id),
    }
}

/// Pick a format from a discovered list by its 1-based menu number
pub fn choose_from(options: &[FormatOption], answer: &str) -> Result<UserChoice, SelectionError> {
    let answer = answer.trim();
    let choice: usize = answer
        .parse()
        .map_err(|_| SelectionError::NotANumber(answer.to_string()))?;

    if choice == 0 || choice > options.len() {
        return Err(SelectionError::OutOfRange {
            choice,
            max: options.len(),
        });
    }

    Ok(UserChoice::Explicit(options[choice - 1].id.clone()))
}
