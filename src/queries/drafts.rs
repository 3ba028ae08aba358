use sea_query::{Expr, Func, Order, Query, SimpleExpr, SqliteQueryBuilder};

use crate::recording::DraftUpdate;
use crate::schema::DraftRecordings;
use crate::symptoms::encode_symptoms;

const DRAFT_COLUMNS: [DraftRecordings; 5] = [
    DraftRecordings::Id,
    DraftRecordings::VideoPath,
    DraftRecordings::AudioPath,
    DraftRecordings::Symptoms,
    DraftRecordings::StartedAt,
];

/// INSERT INTO draft_recordings (video_path, audio_path, symptoms, started_at) VALUES (?, ?, ?, ?)
pub fn insert(
    video_path: Option<&str>,
    audio_path: Option<&str>,
    symptoms: Option<&str>,
    started_at_ms: i64,
) -> String {
    Query::insert()
        .into_table(DraftRecordings::Table)
        .columns([
            DraftRecordings::VideoPath,
            DraftRecordings::AudioPath,
            DraftRecordings::Symptoms,
            DraftRecordings::StartedAt,
        ])
        .values_panic([
            video_path.map(str::to_owned).into(),
            audio_path.map(str::to_owned).into(),
            symptoms.map(str::to_owned).into(),
            started_at_ms.into(),
        ])
        .to_string(SqliteQueryBuilder)
}

/// UPDATE draft_recordings SET <provided columns> WHERE id = ?
///
/// Returns `None` when the update carries no fields, since an empty SET clause is not valid SQL.
pub fn update(id: i64, update: &DraftUpdate) -> Option<String> {
    let mut values: Vec<(DraftRecordings, SimpleExpr)> = Vec::new();
    if let Some(ref video_path) = update.video_path {
        values.push((DraftRecordings::VideoPath, video_path.clone().into()));
    }
    if let Some(ref audio_path) = update.audio_path {
        values.push((DraftRecordings::AudioPath, audio_path.clone().into()));
    }
    if let Some(ref symptoms) = update.symptoms {
        values.push((DraftRecordings::Symptoms, encode_symptoms(symptoms).into()));
    }
    if values.is_empty() {
        return None;
    }

    Some(
        Query::update()
            .table(DraftRecordings::Table)
            .values(values)
            .and_where(Expr::col(DraftRecordings::Id).eq(id))
            .to_string(SqliteQueryBuilder),
    )
}

/// UPDATE draft_recordings SET video_path = NULL WHERE id = ?
pub fn clear_video_path(id: i64) -> String {
    Query::update()
        .table(DraftRecordings::Table)
        .value(DraftRecordings::VideoPath, Option::<String>::None)
        .and_where(Expr::col(DraftRecordings::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// UPDATE draft_recordings SET audio_path = NULL WHERE id = ?
pub fn clear_audio_path(id: i64) -> String {
    Query::update()
        .table(DraftRecordings::Table)
        .value(DraftRecordings::AudioPath, Option::<String>::None)
        .and_where(Expr::col(DraftRecordings::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// SELECT id, video_path, audio_path, symptoms, started_at FROM draft_recordings WHERE id = ?
pub fn select_by_id(id: i64) -> String {
    Query::select()
        .columns(DRAFT_COLUMNS)
        .from(DraftRecordings::Table)
        .and_where(Expr::col(DraftRecordings::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// SELECT id, video_path, audio_path, symptoms, started_at FROM draft_recordings
/// ORDER BY started_at DESC, id DESC LIMIT 1
pub fn select_current() -> String {
    Query::select()
        .columns(DRAFT_COLUMNS)
        .from(DraftRecordings::Table)
        .order_by(DraftRecordings::StartedAt, Order::Desc)
        .order_by(DraftRecordings::Id, Order::Desc)
        .limit(1)
        .to_string(SqliteQueryBuilder)
}

/// SELECT COUNT(id) FROM draft_recordings
pub fn count() -> String {
    Query::select()
        .expr(Func::count(Expr::col(DraftRecordings::Id)))
        .from(DraftRecordings::Table)
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM draft_recordings WHERE id = ?
pub fn delete_by_id(id: i64) -> String {
    Query::delete()
        .from_table(DraftRecordings::Table)
        .and_where(Expr::col(DraftRecordings::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM draft_recordings
pub fn delete_all() -> String {
    Query::delete()
        .from_table(DraftRecordings::Table)
        .to_string(SqliteQueryBuilder)
}
