use sea_query::Iden;

/// Metadata table - key-value store for database configuration
#[derive(Iden)]
pub enum Metadata {
    Table,
    Key,
    Value,
}

/// Draft recordings table - the session currently being captured
#[derive(Iden)]
pub enum DraftRecordings {
    Table,
    Id,
    VideoPath,
    AudioPath,
    Symptoms,
    StartedAt,
}

/// History table - finalized sessions, insert-only
#[derive(Iden)]
pub enum History {
    Table,
    Id,
    VideoPath,
    AudioPath,
    Symptoms,
    StartedAt,
    SavedAt,
}
