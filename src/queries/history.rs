use sea_query::{Expr, Func, Order, Query, SqliteQueryBuilder};

use crate::schema::History;

/// INSERT INTO history (video_path, audio_path, symptoms, started_at, saved_at) VALUES (?, ?, ?, ?, ?)
pub fn insert(
    video_path: Option<&str>,
    audio_path: Option<&str>,
    symptoms: Option<&str>,
    started_at_ms: i64,
    saved_at_ms: i64,
) -> String {
    Query::insert()
        .into_table(History::Table)
        .columns([
            History::VideoPath,
            History::AudioPath,
            History::Symptoms,
            History::StartedAt,
            History::SavedAt,
        ])
        .values_panic([
            video_path.map(str::to_owned).into(),
            audio_path.map(str::to_owned).into(),
            symptoms.map(str::to_owned).into(),
            started_at_ms.into(),
            saved_at_ms.into(),
        ])
        .to_string(SqliteQueryBuilder)
}

/// SELECT id, video_path, audio_path, symptoms, started_at, saved_at FROM history
/// ORDER BY saved_at DESC, id DESC
pub fn select_all() -> String {
    Query::select()
        .columns([
            History::Id,
            History::VideoPath,
            History::AudioPath,
            History::Symptoms,
            History::StartedAt,
            History::SavedAt,
        ])
        .from(History::Table)
        .order_by(History::SavedAt, Order::Desc)
        .order_by(History::Id, Order::Desc)
        .to_string(SqliteQueryBuilder)
}

/// SELECT COUNT(id) FROM history
pub fn count() -> String {
    Query::select()
        .expr(Func::count(Expr::col(History::Id)))
        .from(History::Table)
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM history
pub fn delete_all() -> String {
    Query::delete()
        .from_table(History::Table)
        .to_string(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_newest_first() {
        assert!(select_all().ends_with(r#"ORDER BY "saved_at" DESC, "id" DESC"#));
    }

    #[test]
    fn test_delete_all_has_no_filter() {
        assert_eq!(delete_all(), r#"DELETE FROM "history""#);
    }
}
