/// Expected database schema version
/// Databases written with a different version have their recording tables rebuilt
pub const EXPECTED_DB_VERSION: &str = "1";

/// Database file stem used when the configuration does not name one
pub const DEFAULT_DB_NAME: &str = "context_monitoring";

/// Separator used to pack a symptom id list into a single column
pub const SYMPTOM_DELIMITER: char = ',';

/// Category assigned to every entry of the built-in symptom catalog
pub const DEFAULT_SYMPTOM_CATEGORY: &str = "General";

pub const VIDEO_FILE_PREFIX: &str = "VID_";
pub const VIDEO_FILE_EXTENSION: &str = "mp4";
pub const AUDIO_FILE_PREFIX: &str = "AUD_";
pub const AUDIO_FILE_EXTENSION: &str = "mp3";
