use chrono::Utc;
use sqlx::Row;
use tokio::runtime::Runtime;

use context_monitor::db::{
    acquire_store_lock, create_test_connection_in_temporary_file, database_path,
    init_database_schema, query_metadata, upsert_metadata,
};
use context_monitor::queries::drafts;
use context_monitor::{
    DraftUpdate, RecordingProgress, RecordingStore, StoreError, EXPECTED_DB_VERSION,
};

/// Open a store in a fresh temporary directory.
/// Returns (store, _guard) - keep _guard alive to prevent temp file deletion
fn create_test_store() -> (RecordingStore, tempfile::TempDir) {
    let guard = tempfile::TempDir::new().unwrap();
    let store = RecordingStore::open_in_dir(guard.path(), "test").unwrap();
    (store, guard)
}

fn symptoms(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// Insert a draft row directly, bypassing the single-draft check
fn insert_raw_draft(store: &RecordingStore, video: Option<&str>, started_at: i64) -> i64 {
    let pool = store.db().pool();
    store
        .db()
        .block_on(async {
            let sql = drafts::insert(video, None, None, started_at);
            let result = sqlx::query(&sql).execute(pool).await?;
            Ok::<_, StoreError>(result.last_insert_rowid())
        })
        .unwrap()
}

#[test]
fn test_current_draft_is_none_on_empty_store() {
    let (store, _guard) = create_test_store();
    assert_eq!(store.current_draft().unwrap(), None);
    assert_eq!(store.count_drafts().unwrap(), 0);
    assert!(store.all_history().unwrap().is_empty());
}

#[test]
fn test_save_draft_then_current_draft() {
    let (store, _guard) = create_test_store();
    let before = Utc::now().timestamp_millis();

    let id = store
        .save_draft(Some("v.mp4"), Some("a.mp3"), &symptoms(&["fever", "cough"]))
        .unwrap();

    let draft = store.current_draft().unwrap().expect("draft should exist");
    assert_eq!(draft.id, id);
    assert_eq!(draft.video_path.as_deref(), Some("v.mp4"));
    assert_eq!(draft.audio_path.as_deref(), Some("a.mp3"));
    assert_eq!(draft.symptoms, symptoms(&["fever", "cough"]));
    assert!(draft.started_at >= before);
    assert_eq!(store.draft_by_id(id).unwrap(), Some(draft));
}

#[test]
fn test_empty_symptoms_are_stored_as_null() {
    let (store, _guard) = create_test_store();
    let id = store.save_draft(None, None, &[]).unwrap();

    let pool = store.db().pool();
    let raw: Option<String> = store
        .db()
        .block_on(async {
            let row = sqlx::query("SELECT symptoms FROM draft_recordings WHERE id = ?")
                .bind(id)
                .fetch_one(pool)
                .await?;
            Ok::<_, StoreError>(row.try_get("symptoms")?)
        })
        .unwrap();
    assert_eq!(raw, None);

    let draft = store.current_draft().unwrap().unwrap();
    assert!(draft.symptoms.is_empty());
    assert_eq!(draft.progress(), RecordingProgress::default());
}

#[test]
fn test_second_draft_is_rejected() {
    let (store, _guard) = create_test_store();
    let first = store.save_draft(None, None, &[]).unwrap();

    let err = store
        .save_draft(Some("other.mp4"), None, &[])
        .unwrap_err();
    assert!(matches!(err, StoreError::DraftExists { id } if id == first));
    assert_eq!(store.count_drafts().unwrap(), 1);
    assert_eq!(store.current_draft().unwrap().unwrap().video_path, None);
}

#[test]
fn test_update_changes_only_given_field() {
    let (store, _guard) = create_test_store();
    let id = store
        .save_draft(None, Some("a.mp3"), &symptoms(&["fever"]))
        .unwrap();
    let before = store.current_draft().unwrap().unwrap();

    assert!(store.update_draft(id, &DraftUpdate::video("x")).unwrap());

    let after = store.current_draft().unwrap().unwrap();
    assert_eq!(after.video_path.as_deref(), Some("x"));
    assert_eq!(after.audio_path, before.audio_path);
    assert_eq!(after.symptoms, before.symptoms);
    assert_eq!(after.started_at, before.started_at);
}

#[test]
fn test_update_with_all_fields_and_empty_update() {
    let (store, _guard) = create_test_store();
    let id = store.save_draft(None, None, &[]).unwrap();

    let update = DraftUpdate {
        video_path: Some("v.mp4".to_string()),
        audio_path: Some("a.mp3".to_string()),
        symptoms: Some(symptoms(&["cough"])),
    };
    assert!(store.update_draft(id, &update).unwrap());
    let draft = store.draft_by_id(id).unwrap().unwrap();
    assert!(draft.progress().is_complete());

    // nothing to write, but the draft exists
    assert!(store.update_draft(id, &DraftUpdate::default()).unwrap());
    assert!(!store.update_draft(id + 1, &DraftUpdate::default()).unwrap());
}

#[test]
fn test_update_nonexistent_draft_returns_false() {
    let (store, _guard) = create_test_store();
    let id = store.save_draft(Some("v.mp4"), None, &[]).unwrap();
    let before = store.current_draft().unwrap();

    assert!(!store.update_draft(id + 100, &DraftUpdate::audio("a.mp3")).unwrap());

    assert_eq!(store.current_draft().unwrap(), before);
    assert_eq!(store.count_drafts().unwrap(), 1);
}

#[test]
fn test_clear_paths() {
    let (store, _guard) = create_test_store();
    let id = store
        .save_draft(Some("v.mp4"), Some("a.mp3"), &symptoms(&["fever"]))
        .unwrap();

    assert!(store.clear_video_path(id).unwrap());
    let draft = store.draft_by_id(id).unwrap().unwrap();
    assert_eq!(draft.video_path, None);
    assert_eq!(draft.audio_path.as_deref(), Some("a.mp3"));

    assert!(store.clear_audio_path(id).unwrap());
    let draft = store.draft_by_id(id).unwrap().unwrap();
    assert_eq!(draft.audio_path, None);
    assert_eq!(draft.symptoms, symptoms(&["fever"]));

    assert!(!store.clear_video_path(id + 1).unwrap());
}

#[test]
fn test_move_draft_to_history() {
    let (store, _guard) = create_test_store();
    let id = store
        .save_draft(Some("v.mp4"), Some("a.mp3"), &symptoms(&["fever", "cough"]))
        .unwrap();
    let draft = store.current_draft().unwrap().unwrap();
    let before = Utc::now().timestamp_millis();

    let history_id = store.move_draft_to_history(id).unwrap();
    assert!(history_id.is_some());

    let history = store.all_history().unwrap();
    assert_eq!(history.len(), 1);
    let record = &history[0];
    assert_eq!(Some(record.id), history_id);
    assert_eq!(record.video_path.as_deref(), Some("v.mp4"));
    assert_eq!(record.audio_path.as_deref(), Some("a.mp3"));
    assert_eq!(record.symptoms, symptoms(&["fever", "cough"]));
    assert_eq!(record.started_at, draft.started_at);
    assert!(record.saved_at >= before);

    assert_eq!(store.current_draft().unwrap(), None);
    assert_eq!(store.count_drafts().unwrap(), 0);
}

#[test]
fn test_move_nonexistent_draft_changes_nothing() {
    let (store, _guard) = create_test_store();
    let id = store.save_draft(Some("v.mp4"), None, &[]).unwrap();

    assert_eq!(store.move_draft_to_history(id + 1).unwrap(), None);

    assert_eq!(store.count_drafts().unwrap(), 1);
    assert_eq!(store.count_history().unwrap(), 0);
    assert_eq!(store.current_draft().unwrap().unwrap().id, id);
}

#[test]
fn test_history_is_newest_first() {
    let (store, _guard) = create_test_store();
    let mut history_ids = Vec::new();
    for name in ["first.mp4", "second.mp4", "third.mp4"] {
        let id = store.save_draft(Some(name), None, &[]).unwrap();
        history_ids.push(store.move_draft_to_history(id).unwrap().unwrap());
    }

    let history = store.all_history().unwrap();
    let ids: Vec<i64> = history.iter().map(|r| r.id).collect();
    history_ids.reverse();
    // saved_at may collide within a millisecond, the id breaks the tie
    assert_eq!(ids, history_ids);
    assert_eq!(history[0].video_path.as_deref(), Some("third.mp4"));
}

#[test]
fn test_delete_all_records() {
    let (store, _guard) = create_test_store();
    let id = store.save_draft(Some("v.mp4"), None, &[]).unwrap();
    store.move_draft_to_history(id).unwrap();
    store.save_draft(None, Some("a.mp3"), &[]).unwrap();

    store.delete_all_records().unwrap();

    assert!(store.all_history().unwrap().is_empty());
    assert_eq!(store.current_draft().unwrap(), None);
    assert_eq!(store.count_history().unwrap(), 0);

    // deleting an empty store is fine
    store.delete_all_records().unwrap();
}

#[test]
fn test_current_draft_prefers_latest_then_highest_id() {
    let (store, _guard) = create_test_store();
    insert_raw_draft(&store, Some("old.mp4"), 1_000);
    let tied_low = insert_raw_draft(&store, Some("tied-low.mp4"), 5_000);
    let tied_high = insert_raw_draft(&store, Some("tied-high.mp4"), 5_000);
    assert!(tied_high > tied_low);

    let current = store.current_draft().unwrap().unwrap();
    assert_eq!(current.id, tied_high);
    assert_eq!(current.video_path.as_deref(), Some("tied-high.mp4"));

    // legacy rows also block a new draft
    assert!(matches!(
        store.save_draft(None, None, &[]),
        Err(StoreError::DraftExists { id }) if id == tied_high
    ));
}

#[test]
fn test_end_to_end_scenario() {
    let (store, _guard) = create_test_store();

    let id = store.save_draft(None, None, &[]).unwrap();
    assert_eq!(id, 1);
    assert!(store.update_draft(1, &DraftUpdate::video("v.mp4")).unwrap());
    assert!(store.update_draft(1, &DraftUpdate::audio("a.mp3")).unwrap());
    assert!(store
        .update_draft(1, &DraftUpdate::symptoms(symptoms(&["fever", "cough"])))
        .unwrap());

    let progress = RecordingProgress::from_draft(store.current_draft().unwrap().as_ref());
    assert!(progress.heart_rate_completed);
    assert!(progress.respiratory_completed);
    assert!(progress.symptoms_completed);

    assert!(store.move_draft_to_history(1).unwrap().is_some());

    let history = store.all_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].video_path.as_deref(), Some("v.mp4"));
    assert_eq!(history[0].audio_path.as_deref(), Some("a.mp3"));
    assert_eq!(history[0].symptoms, symptoms(&["fever", "cough"]));
}

#[test]
fn test_store_survives_reopen() {
    let guard = tempfile::TempDir::new().unwrap();
    let id = {
        let store = RecordingStore::open_in_dir(guard.path(), "test").unwrap();
        store.save_draft(Some("v.mp4"), None, &[]).unwrap()
    };

    let store = RecordingStore::open_in_dir(guard.path(), "test").unwrap();
    assert_eq!(store.current_draft().unwrap().unwrap().id, id);
    assert_eq!(
        store.db().path(),
        database_path(guard.path(), "test").as_path()
    );
}

#[test]
fn test_schema_version_is_recorded() {
    let (store, _guard) = create_test_store();
    let version = store
        .db()
        .block_on(query_metadata(store.db().pool(), "version"))
        .unwrap();
    assert_eq!(version.as_deref(), Some(EXPECTED_DB_VERSION));
}

#[test]
fn test_schema_init_is_repeatable_on_fresh_pool() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (pool, _guard) = create_test_connection_in_temporary_file().await.unwrap();
        init_database_schema(&pool).await.unwrap();
        sqlx::query(&drafts::insert(Some("v.mp4"), None, None, 1_000))
            .execute(&pool)
            .await
            .unwrap();

        // second init keeps the data and the version
        init_database_schema(&pool).await.unwrap();
        let count: i64 = sqlx::query_scalar(&drafts::count())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
        let version = query_metadata(&pool, "version").await.unwrap();
        assert_eq!(version.as_deref(), Some(EXPECTED_DB_VERSION));
    });
}

#[test]
fn test_version_mismatch_rebuilds_recording_tables() {
    let guard = tempfile::TempDir::new().unwrap();
    {
        let store = RecordingStore::open_in_dir(guard.path(), "test").unwrap();
        let id = store.save_draft(Some("v.mp4"), None, &[]).unwrap();
        store.move_draft_to_history(id).unwrap();
        store.save_draft(None, Some("a.mp3"), &[]).unwrap();
        store
            .db()
            .block_on(upsert_metadata(store.db().pool(), "version", "0"))
            .unwrap();
    }

    let store = RecordingStore::open_in_dir(guard.path(), "test").unwrap();
    assert_eq!(store.count_drafts().unwrap(), 0);
    assert_eq!(store.count_history().unwrap(), 0);
    let version = store
        .db()
        .block_on(query_metadata(store.db().pool(), "version"))
        .unwrap();
    assert_eq!(version.as_deref(), Some(EXPECTED_DB_VERSION));

    // rebuilt tables are usable
    assert_eq!(store.save_draft(None, None, &[]).unwrap(), 1);
}

#[test]
fn test_store_lock_is_exclusive() {
    let guard = tempfile::TempDir::new().unwrap();
    let lock = acquire_store_lock(guard.path(), "test").unwrap();

    let err = acquire_store_lock(guard.path(), "test").unwrap_err();
    assert!(matches!(err, StoreError::Locked { .. }));

    drop(lock);
    assert!(acquire_store_lock(guard.path(), "test").is_ok());
}
