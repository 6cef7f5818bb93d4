// components/video_downloader/src/error.rs
//! Error types for the downloader component
//!
//! Per-item download failures are recorded in the checkpoint and never abort a
//! playlist run. Extraction and selection errors bubble up to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// The engine could not resolve a URL, playlist or format list
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not extract {url}: {stderr}")]
    Unresolved { url: String, stderr: String },

    #[error("{0} lists no downloadable items")]
    EmptyPlaylist(String),

    #[error("unexpected engine output for {url}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A menu answer that does not map onto any known choice
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("choice {choice} is out of range, expected 1 to {max}")]
    OutOfRange { choice: usize, max: usize },

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("unknown choice '{0}'")]
    UnknownChoice(String),

    #[error("nothing selected")]
    Empty,
}

/// Why a single engine attempt did not succeed
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("engine exited with code {0}")]
    ExitCode(i32),

    #[error("engine could not be run")]
    Io(#[from] std::io::Error),
}

/// Download of one item failed, including the fallback attempt
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to create output directory {path}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("download of {url} failed ({primary}), fallback also failed")]
    Failed {
        url: String,
        primary: AttemptFailure,
        #[source]
        fallback: AttemptFailure,
    },
}

/// Reading or writing the resume checkpoint failed
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint at {path} is not valid JSON")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checkpoint declares {declared} items but contains {actual}")]
    Inconsistent { declared: usize, actual: usize },
}

impl CheckpointError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CheckpointError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CheckpointError::Json {
            path: path.into(),
            source,
        }
    }
}

impl ExtractionError {
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        ExtractionError::Spawn {
            program: program.into(),
            source,
        }
    }
}
