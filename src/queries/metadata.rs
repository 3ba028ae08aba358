use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};

use crate::schema::Metadata;

/// SELECT value FROM metadata WHERE key = ?
pub fn select_by_key(key: &str) -> String {
    Query::select()
        .column(Metadata::Value)
        .from(Metadata::Table)
        .and_where(Expr::col(Metadata::Key).eq(key))
        .to_string(SqliteQueryBuilder)
}

/// INSERT INTO metadata (key, value) VALUES (?, ?)
/// ON CONFLICT (key) DO UPDATE SET value = excluded.value
pub fn upsert(key: &str, value: &str) -> String {
    Query::insert()
        .into_table(Metadata::Table)
        .columns([Metadata::Key, Metadata::Value])
        .values_panic([key.into(), value.into()])
        .on_conflict(
            OnConflict::column(Metadata::Key)
                .update_column(Metadata::Value)
                .to_owned(),
        )
        .to_string(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_by_key() {
        let sql = select_by_key("version");
        assert!(sql.starts_with(r#"SELECT "value" FROM "metadata""#));
        assert!(sql.contains("'version'"));
    }

    #[test]
    fn test_upsert_has_conflict_clause() {
        let sql = upsert("version", "1");
        assert!(sql.contains("ON CONFLICT"));
        assert!(sql.contains("'version'"));
    }
}
