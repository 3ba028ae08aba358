//! SQLite connection handling for the recording store.
//!
//! The store exposes a blocking API, so [`SyncDb`] embeds a current-thread tokio
//! runtime next to the sqlx pool and blocks on each operation.

use fs2::FileExt;
use log::{debug, info, warn};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, Row, Sqlite};
use std::fs::File;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::constants::EXPECTED_DB_VERSION;
use crate::error::StoreError;
use crate::queries::{ddl, metadata};

/// Synchronous SQLite database wrapper that owns a runtime for blocking operations.
pub struct SyncDb {
    pool: SqlitePool,
    runtime: Runtime,
    path: PathBuf,
}

impl SyncDb {
    /// Open (creating if needed) the database file at `db_path`.
    /// Parent directories are created, WAL mode and foreign keys are enabled.
    pub fn connect(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let pool = runtime.block_on(open_database_connection(db_path))?;
        debug!("Opened SQLite database: {}", db_path.display());
        Ok(Self {
            pool,
            runtime,
            path: db_path.to_path_buf(),
        })
    }

    /// Block on an async future using the embedded runtime
    pub fn block_on<F, T>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        self.runtime.block_on(fut)
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `<dir>/<name>.sqlite`
pub fn database_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.sqlite", name))
}

/// Open a file-based connection pool for production use
/// Enables WAL mode and foreign keys
pub async fn open_database_connection(db_path: &Path) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Initialize database schema
/// Creates tables and indexes, then reconciles the stored schema version
pub async fn init_database_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(&ddl::create_metadata_table())
        .execute(pool)
        .await?;
    create_recording_tables(pool).await?;
    ensure_schema_version(pool).await?;
    Ok(())
}

async fn create_recording_tables<'e, E>(executor: E) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite> + Copy,
{
    sqlx::query(&ddl::create_draft_recordings_table())
        .execute(executor)
        .await?;
    sqlx::query(&ddl::create_history_table())
        .execute(executor)
        .await?;
    sqlx::query(&ddl::create_draft_started_at_index())
        .execute(executor)
        .await?;
    sqlx::query(&ddl::create_history_saved_at_index())
        .execute(executor)
        .await?;
    Ok(())
}

/// Write the expected version into a fresh database. A database written by a
/// different schema version has both recording tables dropped and recreated.
async fn ensure_schema_version(pool: &SqlitePool) -> Result<(), StoreError> {
    match query_metadata(pool, "version").await? {
        Some(version) if version == EXPECTED_DB_VERSION => Ok(()),
        Some(version) => {
            warn!(
                "Database schema version {} does not match expected {}, rebuilding recording tables",
                version, EXPECTED_DB_VERSION
            );
            let mut tx = pool.begin().await?;
            sqlx::query(&ddl::drop_draft_recordings_table())
                .execute(&mut *tx)
                .await?;
            sqlx::query(&ddl::drop_history_table())
                .execute(&mut *tx)
                .await?;
            for sql in [
                ddl::create_draft_recordings_table(),
                ddl::create_history_table(),
                ddl::create_draft_started_at_index(),
                ddl::create_history_saved_at_index(),
            ] {
                sqlx::query(&sql).execute(&mut *tx).await?;
            }
            sqlx::query(&metadata::upsert("version", EXPECTED_DB_VERSION))
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(())
        }
        None => {
            info!("Initialized database schema version {}", EXPECTED_DB_VERSION);
            upsert_metadata(pool, "version", EXPECTED_DB_VERSION).await
        }
    }
}

/// Query a single metadata value by key
pub async fn query_metadata<'e, E>(executor: E, key: &str) -> Result<Option<String>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = metadata::select_by_key(key);
    let row = sqlx::query(&sql).fetch_optional(executor).await?;
    match row {
        Some(row) => Ok(Some(row.try_get::<String, _>(0)?)),
        None => Ok(None),
    }
}

/// Update or insert a metadata key-value pair
pub async fn upsert_metadata<'e, E>(executor: E, key: &str, value: &str) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = metadata::upsert(key, value);
    sqlx::query(&sql).execute(executor).await?;
    Ok(())
}

/// Take an exclusive lock on `<dir>/<name>.lock` so only one process writes the store.
/// The lock is held until the returned file is dropped.
pub fn acquire_store_lock(dir: &Path, name: &str) -> Result<File, StoreError> {
    std::fs::create_dir_all(dir)?;
    let lock_path = dir.join(format!("{}.lock", name));
    let lock_file = File::create(&lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| StoreError::Locked { path: lock_path })?;
    Ok(lock_file)
}

/// Create a connection pool backed by a file in a fresh temporary directory.
/// Keep the returned guard alive for as long as the database is used.
pub async fn create_test_connection_in_temporary_file(
) -> Result<(SqlitePool, tempfile::TempDir), StoreError> {
    let guard = tempfile::TempDir::new()?;
    let db_path = guard.path().join("test.sqlite");
    let pool = open_database_connection(&db_path).await?;
    Ok((pool, guard))
}
