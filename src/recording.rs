//! Row types for the two recording tables and the progress flags derived from a draft.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// A session still being captured. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftRecording {
    pub id: i64,
    pub video_path: Option<String>,
    pub audio_path: Option<String>,
    pub symptoms: Vec<String>,
    /// Creation time in milliseconds since the Unix epoch, never updated
    pub started_at: i64,
}

impl DraftRecording {
    pub fn progress(&self) -> RecordingProgress {
        RecordingProgress::from_draft(Some(self))
    }

    pub fn started_at_utc(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.started_at)
    }
}

/// A finalized session. Rows are only ever inserted or bulk-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecording {
    pub id: i64,
    pub video_path: Option<String>,
    pub audio_path: Option<String>,
    pub symptoms: Vec<String>,
    pub started_at: i64,
    /// Time the draft was promoted, milliseconds since the Unix epoch
    pub saved_at: i64,
}

impl HistoryRecording {
    pub fn started_at_utc(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.started_at)
    }

    pub fn saved_at_utc(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.saved_at)
    }
}

/// Partial update of a draft. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftUpdate {
    pub video_path: Option<String>,
    pub audio_path: Option<String>,
    pub symptoms: Option<Vec<String>>,
}

impl DraftUpdate {
    pub fn video(path: impl Into<String>) -> Self {
        Self {
            video_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn audio(path: impl Into<String>) -> Self {
        Self {
            audio_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn symptoms(symptoms: Vec<String>) -> Self {
        Self {
            symptoms: Some(symptoms),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.video_path.is_none() && self.audio_path.is_none() && self.symptoms.is_none()
    }
}

/// Completion state of the three capture steps.
///
/// Always derived from a stored draft, never tracked on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordingProgress {
    pub heart_rate_completed: bool,
    pub respiratory_completed: bool,
    pub symptoms_completed: bool,
}

impl RecordingProgress {
    pub fn from_draft(draft: Option<&DraftRecording>) -> Self {
        match draft {
            Some(draft) => Self {
                heart_rate_completed: is_present(draft.video_path.as_deref()),
                respiratory_completed: is_present(draft.audio_path.as_deref()),
                symptoms_completed: !draft.symptoms.is_empty(),
            },
            None => Self::default(),
        }
    }

    /// All three steps done, the draft may be promoted to history
    pub fn is_complete(&self) -> bool {
        self.heart_rate_completed && self.respiratory_completed && self.symptoms_completed
    }

    pub fn completed_steps(&self) -> usize {
        [
            self.heart_rate_completed,
            self.respiratory_completed,
            self.symptoms_completed,
        ]
        .iter()
        .filter(|done| **done)
        .count()
    }
}

// blank paths are what a failed capture leaves behind
fn is_present(path: Option<&str>) -> bool {
    path.is_some_and(|path| !path.trim().is_empty())
}

pub(crate) fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
