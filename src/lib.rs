// Library interface for the CLI and integration tests

// Declare all modules
pub mod capture;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod queries;
pub mod recording;
pub mod schema;
pub mod session;
pub mod store;
pub mod symptoms;

pub use constants::EXPECTED_DB_VERSION;
pub use error::{ConfigError, SessionError, StoreError};
pub use recording::{DraftRecording, DraftUpdate, HistoryRecording, RecordingProgress};
pub use session::{CaptureTicket, SessionSummary, SessionTracker};
pub use store::RecordingStore;
