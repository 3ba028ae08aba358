//! Repository over the `draft_recordings` and `history` tables.
//!
//! Construct one [`RecordingStore`] per process and hand references to whatever
//! needs it. Every call blocks until the database has answered.

use chrono::Utc;
use log::{debug, info, warn};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};
use std::path::Path;

use crate::db::{self, SyncDb};
use crate::error::StoreError;
use crate::queries::{drafts, history};
use crate::recording::{DraftRecording, DraftUpdate, HistoryRecording};
use crate::symptoms::{decode_symptoms, encode_symptoms};

pub struct RecordingStore {
    db: SyncDb,
}

impl RecordingStore {
    /// Open the store at `db_path`, creating the file and schema if needed
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        let db = SyncDb::connect(db_path)?;
        db.block_on(db::init_database_schema(db.pool()))?;
        info!("Recording store ready at {}", db.path().display());
        Ok(Self { db })
    }

    /// Open `<dir>/<name>.sqlite`
    pub fn open_in_dir(dir: &Path, name: &str) -> Result<Self, StoreError> {
        Self::open(&db::database_path(dir, name))
    }

    pub fn db(&self) -> &SyncDb {
        &self.db
    }

    /// Create the draft. Returns its id.
    ///
    /// Only one unfinished draft may exist; if one is already stored this fails
    /// with [`StoreError::DraftExists`] and nothing is written.
    pub fn save_draft(
        &self,
        video_path: Option<&str>,
        audio_path: Option<&str>,
        symptoms: &[String],
    ) -> Result<i64, StoreError> {
        let pool = self.db.pool();
        let started_at = now_ms();
        let encoded = encode_symptoms(symptoms);
        let id = self.db.block_on(async {
            let mut tx = pool.begin().await?;
            if let Some(existing) = fetch_draft(&mut *tx, &drafts::select_current()).await? {
                return Err(StoreError::DraftExists { id: existing.id });
            }
            let sql = drafts::insert(video_path, audio_path, encoded.as_deref(), started_at);
            let result = sqlx::query(&sql).execute(&mut *tx).await?;
            tx.commit().await?;
            Ok::<_, StoreError>(result.last_insert_rowid())
        })?;
        info!("Created draft recording {}", id);
        Ok(id)
    }

    /// Write the provided fields of draft `id`; `started_at` is never touched.
    /// Returns whether the draft exists.
    pub fn update_draft(&self, id: i64, update: &DraftUpdate) -> Result<bool, StoreError> {
        let pool = self.db.pool();
        let matched = match drafts::update(id, update) {
            Some(sql) => self.db.block_on(execute(pool, &sql))? > 0,
            None => self.draft_by_id(id)?.is_some(),
        };
        if matched {
            debug!("Updated draft recording {}", id);
        } else {
            debug!("Update skipped, draft recording {} not found", id);
        }
        Ok(matched)
    }

    /// Mark the heart-rate step as not done
    pub fn clear_video_path(&self, id: i64) -> Result<bool, StoreError> {
        let matched = self
            .db
            .block_on(execute(self.db.pool(), &drafts::clear_video_path(id)))?
            > 0;
        debug!("Cleared video path of draft {}: {}", id, matched);
        Ok(matched)
    }

    /// Mark the respiratory step as not done
    pub fn clear_audio_path(&self, id: i64) -> Result<bool, StoreError> {
        let matched = self
            .db
            .block_on(execute(self.db.pool(), &drafts::clear_audio_path(id)))?
            > 0;
        debug!("Cleared audio path of draft {}: {}", id, matched);
        Ok(matched)
    }

    /// The draft with the latest `started_at`; on equal timestamps the highest id wins
    pub fn current_draft(&self) -> Result<Option<DraftRecording>, StoreError> {
        self.db
            .block_on(fetch_draft(self.db.pool(), &drafts::select_current()))
    }

    pub fn draft_by_id(&self, id: i64) -> Result<Option<DraftRecording>, StoreError> {
        self.db
            .block_on(fetch_draft(self.db.pool(), &drafts::select_by_id(id)))
    }

    /// Copy draft `id` into history with `saved_at = now` and delete the draft,
    /// in one transaction. Returns the new history id, or `None` if no such draft.
    pub fn move_draft_to_history(&self, id: i64) -> Result<Option<i64>, StoreError> {
        let pool = self.db.pool();
        let saved_at = now_ms();
        let history_id = self.db.block_on(async {
            let mut tx = pool.begin().await?;
            let draft = match fetch_draft(&mut *tx, &drafts::select_by_id(id)).await? {
                Some(draft) => draft,
                None => return Ok(None),
            };
            let encoded = encode_symptoms(&draft.symptoms);
            let sql = history::insert(
                draft.video_path.as_deref(),
                draft.audio_path.as_deref(),
                encoded.as_deref(),
                draft.started_at,
                saved_at,
            );
            let history_id = sqlx::query(&sql).execute(&mut *tx).await?.last_insert_rowid();
            sqlx::query(&drafts::delete_by_id(id))
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok::<_, StoreError>(Some(history_id))
        })?;
        match history_id {
            Some(history_id) => info!("Moved draft {} to history as {}", id, history_id),
            None => warn!("Cannot move draft {} to history: not found", id),
        }
        Ok(history_id)
    }

    /// All finalized sessions, most recently saved first
    pub fn all_history(&self) -> Result<Vec<HistoryRecording>, StoreError> {
        let pool = self.db.pool();
        self.db.block_on(async {
            let rows = sqlx::query(&history::select_all()).fetch_all(pool).await?;
            rows.iter()
                .map(history_from_row)
                .collect::<Result<Vec<_>, StoreError>>()
        })
    }

    /// Empty both tables. Irreversible.
    pub fn delete_all_records(&self) -> Result<(), StoreError> {
        let pool = self.db.pool();
        let (drafts_removed, history_removed) = self.db.block_on(async {
            let mut tx = pool.begin().await?;
            let drafts_removed = sqlx::query(&drafts::delete_all())
                .execute(&mut *tx)
                .await?
                .rows_affected();
            let history_removed = sqlx::query(&history::delete_all())
                .execute(&mut *tx)
                .await?
                .rows_affected();
            tx.commit().await?;
            Ok::<_, StoreError>((drafts_removed, history_removed))
        })?;
        info!(
            "Deleted all records ({} drafts, {} history)",
            drafts_removed, history_removed
        );
        Ok(())
    }

    pub fn count_drafts(&self) -> Result<i64, StoreError> {
        self.db.block_on(count(self.db.pool(), &drafts::count()))
    }

    pub fn count_history(&self) -> Result<i64, StoreError> {
        self.db.block_on(count(self.db.pool(), &history::count()))
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

async fn execute<'e, E>(executor: E, sql: &str) -> Result<u64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(sql).execute(executor).await?;
    Ok(result.rows_affected())
}

async fn count<'e, E>(executor: E, sql: &str) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar(sql).fetch_one(executor).await?;
    Ok(count)
}

async fn fetch_draft<'e, E>(executor: E, sql: &str) -> Result<Option<DraftRecording>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(sql).fetch_optional(executor).await?;
    row.as_ref().map(draft_from_row).transpose()
}

fn draft_from_row(row: &SqliteRow) -> Result<DraftRecording, StoreError> {
    let symptoms: Option<String> = row.try_get("symptoms")?;
    Ok(DraftRecording {
        id: row.try_get("id")?,
        video_path: row.try_get("video_path")?,
        audio_path: row.try_get("audio_path")?,
        symptoms: decode_symptoms(symptoms.as_deref()),
        started_at: row.try_get("started_at")?,
    })
}

fn history_from_row(row: &SqliteRow) -> Result<HistoryRecording, StoreError> {
    let symptoms: Option<String> = row.try_get("symptoms")?;
    Ok(HistoryRecording {
        id: row.try_get("id")?,
        video_path: row.try_get("video_path")?,
        audio_path: row.try_get("audio_path")?,
        symptoms: decode_symptoms(symptoms.as_deref()),
        started_at: row.try_get("started_at")?,
        saved_at: row.try_get("saved_at")?,
    })
}
