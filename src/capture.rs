//! Media capture collaborators.
//!
//! Recording itself happens elsewhere (camera and microphone APIs); this side only
//! names output files and receives the finished path through a completion callback.

use chrono::Utc;
use log::{debug, warn};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::{
    AUDIO_FILE_EXTENSION, AUDIO_FILE_PREFIX, VIDEO_FILE_EXTENSION, VIDEO_FILE_PREFIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Fingertip video used for the heart-rate step
    Video,
    /// Breathing audio used for the respiratory step
    Audio,
}

impl MediaKind {
    /// File name for a capture started at `timestamp_ms`, e.g. `VID_1700000000000.mp4`
    pub fn file_name(self, timestamp_ms: i64) -> String {
        match self {
            MediaKind::Video => format!(
                "{}{}.{}",
                VIDEO_FILE_PREFIX, timestamp_ms, VIDEO_FILE_EXTENSION
            ),
            MediaKind::Audio => format!(
                "{}{}.{}",
                AUDIO_FILE_PREFIX, timestamp_ms, AUDIO_FILE_EXTENSION
            ),
        }
    }
}

/// Output directories for captured media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDirs {
    pub video_dir: PathBuf,
    pub audio_dir: PathBuf,
}

impl MediaDirs {
    pub fn dir_for(&self, kind: MediaKind) -> &Path {
        match kind {
            MediaKind::Video => &self.video_dir,
            MediaKind::Audio => &self.audio_dir,
        }
    }

    /// Fresh output path for a capture of `kind` starting now
    pub fn new_output_path(&self, kind: MediaKind) -> PathBuf {
        self.dir_for(kind)
            .join(kind.file_name(Utc::now().timestamp_millis()))
    }
}

/// Called once when a capture ends. `None` means the capture produced nothing.
pub type CaptureCallback = Box<dyn FnOnce(Option<PathBuf>) + Send>;

/// A camera or microphone recorder.
pub trait MediaRecorder {
    fn kind(&self) -> MediaKind;

    /// Begin writing to `output`; `on_complete` fires when the recording is finalized.
    fn start(&mut self, output: &Path, on_complete: CaptureCallback) -> io::Result<()>;

    /// Stop an ongoing recording. Stopping an idle recorder does nothing.
    fn stop(&mut self);
}

/// Turn a raw completion value into a storable path. Missing or blank paths
/// count as "capture produced nothing".
pub fn normalize_capture_path(path: Option<&Path>) -> Option<String> {
    let path = path?;
    let text = path.to_str()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

/// Recorder that "captures" by copying an existing media file into the output
/// location. Used where no camera or microphone is available.
pub struct FileImportRecorder {
    kind: MediaKind,
    source: PathBuf,
    pending: Option<(PathBuf, CaptureCallback)>,
}

impl FileImportRecorder {
    pub fn new(kind: MediaKind, source: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            source: source.into(),
            pending: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.pending.is_some()
    }
}

impl MediaRecorder for FileImportRecorder {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn start(&mut self, output: &Path, on_complete: CaptureCallback) -> io::Result<()> {
        if self.pending.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "recording already in progress",
            ));
        }
        if !self.source.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("source media '{}' not found", self.source.display()),
            ));
        }
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.pending = Some((output.to_path_buf(), on_complete));
        debug!("Importing {} into {}", self.source.display(), output.display());
        Ok(())
    }

    fn stop(&mut self) {
        let Some((output, on_complete)) = self.pending.take() else {
            return;
        };
        match std::fs::copy(&self.source, &output) {
            Ok(_) => on_complete(Some(output)),
            Err(e) => {
                warn!(
                    "Failed to import {} into {}: {}",
                    self.source.display(),
                    output.display(),
                    e
                );
                on_complete(None)
            }
        }
    }
}
