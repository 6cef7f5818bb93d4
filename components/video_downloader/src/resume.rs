// components/video_downloader/src/resume.rs
//! Decide where a playlist download picks up after a previous run

use crate::types::{PlaylistCheckpoint, PlaylistItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDecision {
    NoPriorState,
    ResumeFrom(usize),
    RestartFromZero,
}

/// What the user is asked about before resuming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSummary {
    pub playlist_title: String,
    pub completed: usize,
    pub total: usize,
}

impl ResumeSummary {
    pub fn of(checkpoint: &PlaylistCheckpoint) -> Self {
        Self {
            playlist_title: checkpoint.playlist_title.clone(),
            completed: checkpoint.completed_count(),
            total: checkpoint.total_count,
        }
    }
}

/// One past the highest completed index, 0 when nothing completed
///
/// The scan covers every item, so a failed item sitting before a completed one
/// is not revisited on resume.
pub fn resume_index(items: &[PlaylistItem]) -> usize {
    items
        .iter()
        .rposition(PlaylistItem::is_completed)
        .map_or(0, |index| index + 1)
}

/// Turn an optional checkpoint plus the user's confirmation into a decision
pub fn plan<F>(checkpoint: Option<&PlaylistCheckpoint>, confirm: F) -> ResumeDecision
where
    F: FnOnce(&ResumeSummary) -> bool,
{
    let Some(checkpoint) = checkpoint else {
        return ResumeDecision::NoPriorState;
    };

    if !confirm(&ResumeSummary::of(checkpoint)) {
        return ResumeDecision::NoPriorState;
    }

    let start_from = resume_index(&checkpoint.items);
    if start_from >= checkpoint.items.len() {
        ResumeDecision::RestartFromZero
    } else {
        ResumeDecision::ResumeFrom(start_from)
    }
}
