use sea_query::{ColumnDef, Index, SqliteQueryBuilder, Table};

use crate::schema::{DraftRecordings, History, Metadata};

/// CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)
pub fn create_metadata_table() -> String {
    Table::create()
        .table(Metadata::Table)
        .if_not_exists()
        .col(ColumnDef::new(Metadata::Key).text().primary_key())
        .col(ColumnDef::new(Metadata::Value).text().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS draft_recordings (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     video_path TEXT,
///     audio_path TEXT,
///     symptoms TEXT,
///     started_at INTEGER NOT NULL
/// )
pub fn create_draft_recordings_table() -> String {
    Table::create()
        .table(DraftRecordings::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(DraftRecordings::Id)
                .integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(DraftRecordings::VideoPath).text().null())
        .col(ColumnDef::new(DraftRecordings::AudioPath).text().null())
        .col(ColumnDef::new(DraftRecordings::Symptoms).text().null())
        .col(
            ColumnDef::new(DraftRecordings::StartedAt)
                .big_integer()
                .not_null(),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS history (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     video_path TEXT,
///     audio_path TEXT,
///     symptoms TEXT,
///     started_at INTEGER NOT NULL,
///     saved_at INTEGER NOT NULL
/// )
pub fn create_history_table() -> String {
    Table::create()
        .table(History::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(History::Id)
                .integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(History::VideoPath).text().null())
        .col(ColumnDef::new(History::AudioPath).text().null())
        .col(ColumnDef::new(History::Symptoms).text().null())
        .col(ColumnDef::new(History::StartedAt).big_integer().not_null())
        .col(ColumnDef::new(History::SavedAt).big_integer().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_draft_recordings_started_at ON draft_recordings(started_at)
pub fn create_draft_started_at_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_draft_recordings_started_at")
        .table(DraftRecordings::Table)
        .col(DraftRecordings::StartedAt)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_history_saved_at ON history(saved_at)
pub fn create_history_saved_at_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_history_saved_at")
        .table(History::Table)
        .col(History::SavedAt)
        .to_string(SqliteQueryBuilder)
}

/// DROP TABLE IF EXISTS draft_recordings
pub fn drop_draft_recordings_table() -> String {
    Table::drop()
        .table(DraftRecordings::Table)
        .if_exists()
        .to_string(SqliteQueryBuilder)
}

/// DROP TABLE IF EXISTS history
pub fn drop_history_table() -> String {
    Table::drop()
        .table(History::Table)
        .if_exists()
        .to_string(SqliteQueryBuilder)
}
