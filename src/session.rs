//! The session being captured right now, and the history built from finished ones.
//!
//! [`SessionTracker`] remembers which draft is active; its progress flags are
//! re-read from the store after every mutation.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::Path;

use crate::capture::{normalize_capture_path, MediaKind};
use crate::error::{SessionError, StoreError};
use crate::recording::{DraftRecording, DraftUpdate, HistoryRecording, RecordingProgress};
use crate::store::RecordingStore;
use crate::symptoms::symptom_labels;

/// Issued when a capture starts; presented again when it completes.
///
/// A ticket from before a reset, finalize or delete-all is stale and its completion is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTicket {
    pub kind: MediaKind,
    generation: u64,
}

/// Display shape of a history row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub id: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub saved_at: Option<DateTime<Utc>>,
    pub video_path: Option<String>,
    pub audio_path: Option<String>,
    pub symptoms: Vec<String>,
    pub symptom_labels: String,
}

impl SessionSummary {
    /// `yyyy-MM-dd HH:mm` of the save time, UTC
    pub fn formatted_date(&self) -> String {
        self.saved_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }
}

impl From<HistoryRecording> for SessionSummary {
    fn from(record: HistoryRecording) -> Self {
        Self {
            id: record.id,
            started_at: record.started_at_utc(),
            saved_at: record.saved_at_utc(),
            symptom_labels: symptom_labels(&record.symptoms),
            video_path: record.video_path,
            audio_path: record.audio_path,
            symptoms: record.symptoms,
        }
    }
}

pub struct SessionTracker<'a> {
    store: &'a RecordingStore,
    draft_id: Option<i64>,
    progress: RecordingProgress,
    generation: u64,
}

impl<'a> SessionTracker<'a> {
    /// Tracker with no active session. Call [`SessionTracker::load`] to resume a stored draft.
    pub fn new(store: &'a RecordingStore) -> Self {
        Self {
            store,
            draft_id: None,
            progress: RecordingProgress::default(),
            generation: 0,
        }
    }

    /// Resume the stored draft, if there is one
    pub fn load(&mut self) -> Result<Option<DraftRecording>, SessionError> {
        let draft = self.store.current_draft()?;
        self.apply(draft.as_ref());
        if let Some(ref draft) = draft {
            info!(
                "Resumed draft {} ({} of 3 steps done)",
                draft.id,
                self.progress.completed_steps()
            );
        }
        Ok(draft)
    }

    pub fn draft_id(&self) -> Option<i64> {
        self.draft_id
    }

    pub fn progress(&self) -> RecordingProgress {
        self.progress
    }

    /// The active draft as currently stored
    pub fn current_draft(&self) -> Result<Option<DraftRecording>, SessionError> {
        match self.draft_id {
            Some(id) => Ok(self.store.draft_by_id(id)?),
            None => Ok(None),
        }
    }

    /// Store the heart-rate video. A blank path leaves the session unchanged.
    pub fn record_heart_rate(&mut self, video_path: &str) -> Result<RecordingProgress, SessionError> {
        match normalize_capture_path(Some(Path::new(video_path))) {
            Some(path) => self.write(DraftUpdate::video(path)),
            None => {
                warn!("Ignoring blank heart-rate video path");
                Ok(self.progress)
            }
        }
    }

    /// Store the respiratory audio. A blank path leaves the session unchanged.
    pub fn record_respiratory(&mut self, audio_path: &str) -> Result<RecordingProgress, SessionError> {
        match normalize_capture_path(Some(Path::new(audio_path))) {
            Some(path) => self.write(DraftUpdate::audio(path)),
            None => {
                warn!("Ignoring blank respiratory audio path");
                Ok(self.progress)
            }
        }
    }

    pub fn record_symptoms(&mut self, symptom_ids: Vec<String>) -> Result<RecordingProgress, SessionError> {
        self.write(DraftUpdate::symptoms(symptom_ids))
    }

    pub fn clear_heart_rate(&mut self) -> Result<RecordingProgress, SessionError> {
        let id = self.draft_id.ok_or(SessionError::NoActiveDraft)?;
        self.store.clear_video_path(id)?;
        self.refresh()
    }

    pub fn clear_respiratory(&mut self) -> Result<RecordingProgress, SessionError> {
        let id = self.draft_id.ok_or(SessionError::NoActiveDraft)?;
        self.store.clear_audio_path(id)?;
        self.refresh()
    }

    pub fn begin_capture(&self, kind: MediaKind) -> CaptureTicket {
        CaptureTicket {
            kind,
            generation: self.generation,
        }
    }

    /// Store the result of a finished capture.
    ///
    /// Returns `Ok(false)` without touching the store when the ticket is stale or the
    /// capture produced no usable path.
    pub fn complete_capture(
        &mut self,
        ticket: CaptureTicket,
        path: Option<&Path>,
    ) -> Result<bool, SessionError> {
        if ticket.generation != self.generation {
            debug!("Dropping {:?} capture from an abandoned session", ticket.kind);
            return Ok(false);
        }
        let Some(path) = normalize_capture_path(path) else {
            warn!("{:?} capture finished without a file", ticket.kind);
            return Ok(false);
        };
        match ticket.kind {
            MediaKind::Video => self.record_heart_rate(&path)?,
            MediaKind::Audio => self.record_respiratory(&path)?,
        };
        Ok(true)
    }

    /// Move the finished session to history and start over. All three steps must be done.
    pub fn finalize(&mut self) -> Result<i64, SessionError> {
        let id = self.draft_id.ok_or(SessionError::NoActiveDraft)?;
        let progress = self.refresh()?;
        // draft removed behind our back
        if self.draft_id.is_none() {
            return Err(SessionError::NoActiveDraft);
        }
        if !progress.is_complete() {
            return Err(SessionError::Incomplete(progress));
        }
        match self.store.move_draft_to_history(id)? {
            Some(history_id) => {
                self.reset();
                Ok(history_id)
            }
            None => {
                self.reset();
                Err(SessionError::NoActiveDraft)
            }
        }
    }

    /// Forget the active session in memory; the stored draft is left alone
    pub fn reset(&mut self) {
        self.draft_id = None;
        self.progress = RecordingProgress::default();
        self.generation += 1;
    }

    /// Erase every draft and history record
    pub fn delete_all(&mut self) -> Result<(), SessionError> {
        self.store.delete_all_records()?;
        self.reset();
        Ok(())
    }

    pub fn history(&self) -> Result<Vec<SessionSummary>, SessionError> {
        Ok(self
            .store
            .all_history()?
            .into_iter()
            .map(SessionSummary::from)
            .collect())
    }

    fn write(&mut self, update: DraftUpdate) -> Result<RecordingProgress, SessionError> {
        if let Some(id) = self.draft_id {
            if self.store.update_draft(id, &update)? {
                return self.refresh();
            }
            warn!("Draft {} disappeared, starting a new one", id);
            self.draft_id = None;
        }

        let symptoms = update.symptoms.clone().unwrap_or_default();
        let id = match self.store.save_draft(
            update.video_path.as_deref(),
            update.audio_path.as_deref(),
            &symptoms,
        ) {
            Ok(id) => id,
            // draft left by an earlier run or written by another tracker
            Err(StoreError::DraftExists { id }) => {
                if !self.store.update_draft(id, &update)? {
                    warn!("Draft {} vanished before it could be adopted", id);
                    return Err(SessionError::NoActiveDraft);
                }
                id
            }
            Err(e) => return Err(e.into()),
        };
        self.draft_id = Some(id);
        self.refresh()
    }

    fn refresh(&mut self) -> Result<RecordingProgress, SessionError> {
        let draft = self.current_draft()?;
        self.apply(draft.as_ref());
        Ok(self.progress)
    }

    fn apply(&mut self, draft: Option<&DraftRecording>) {
        self.draft_id = draft.map(|draft| draft.id);
        self.progress = RecordingProgress::from_draft(draft);
    }
}
