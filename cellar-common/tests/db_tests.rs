//! Database initialization and store operation tests

use cellar_common::db::{consumption, init_database, init_in_memory, profiles, rotation};
use cellar_common::models::{ProfileConfidence, ProfileSource, StructuralProfile};
use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

fn sample_profile() -> StructuralProfile {
    StructuralProfile {
        body: 4,
        tannin: 5,
        acidity: 3,
        oak: 4,
        sweetness: 0,
        alcohol: 4,
        power: 8,
        style_tags: vec!["structured".to_string(), "age-worthy".to_string()],
        confidence: ProfileConfidence::High,
        source: ProfileSource::Ai,
        generated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_database_created_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("data").join("cellar.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_database_reopens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("cellar.db");

    let first = init_database(&db_path).await.unwrap();
    profiles::save_profile(&first, "w1", &sample_profile()).await.unwrap();
    first.close().await;

    let second = init_database(&db_path).await.unwrap();
    let loaded = profiles::load_profile(&second, "w1").await.unwrap();
    assert_eq!(loaded, Some(sample_profile()));
}

#[tokio::test]
async fn test_profile_upsert_replaces_previous() {
    let pool = init_in_memory().await.unwrap();

    let mut profile = sample_profile();
    profiles::save_profile(&pool, "w1", &profile).await.unwrap();

    profile.power = 6;
    profiles::save_profile(&pool, "w1", &profile).await.unwrap();

    let loaded = profiles::load_profile(&pool, "w1").await.unwrap().unwrap();
    assert_eq!(loaded.power, 6);
    assert!(profiles::load_profile(&pool, "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rotation_mark_prunes_old_entries() {
    let pool = init_in_memory().await.unwrap();
    let window = Duration::days(3);
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();

    rotation::mark_shown(&pool, "alice", &["b1".to_string()], t0, window)
        .await
        .unwrap();

    let t1 = t0 + Duration::days(4);
    rotation::mark_shown(&pool, "alice", &["b2".to_string()], t1, window)
        .await
        .unwrap();

    let entries = rotation::load_rotation(&pool, "alice", t1 - window).await.unwrap();
    assert_eq!(entries, vec![("b2".to_string(), t1)]);

    let raw: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rotation_state")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(raw, 1, "expired entry should be deleted, not just hidden");
}

#[tokio::test]
async fn test_rotation_scopes_are_isolated() {
    let pool = init_in_memory().await.unwrap();
    let window = Duration::days(3);
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();

    rotation::mark_shown(&pool, "alice", &["b1".to_string()], now, window)
        .await
        .unwrap();
    rotation::mark_shown(&pool, "bob", &["b2".to_string()], now, window)
        .await
        .unwrap();

    let alice = rotation::load_rotation(&pool, "alice", now - window).await.unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].0, "b1");
}

#[tokio::test]
async fn test_rotation_keeps_latest_timestamp() {
    let pool = init_in_memory().await.unwrap();
    let window = Duration::days(3);
    let later = Utc.with_ymd_and_hms(2024, 5, 2, 18, 0, 0).unwrap();
    let earlier = later - Duration::hours(5);

    rotation::mark_shown(&pool, "alice", &["b1".to_string()], later, window)
        .await
        .unwrap();
    rotation::mark_shown(&pool, "alice", &["b1".to_string()], earlier, window)
        .await
        .unwrap();

    let entries = rotation::load_rotation(&pool, "alice", later - window).await.unwrap();
    assert_eq!(entries, vec![("b1".to_string(), later)]);
}

#[tokio::test]
async fn test_consumption_window_query() {
    let pool = init_in_memory().await.unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 10, 20, 0, 0).unwrap();

    consumption::record_opened(&pool, "alice", "old", now - Duration::days(10))
        .await
        .unwrap();
    consumption::record_opened(&pool, "alice", "recent", now - Duration::days(2))
        .await
        .unwrap();
    consumption::record_opened(&pool, "alice", "recent", now - Duration::days(1))
        .await
        .unwrap();
    consumption::record_opened(&pool, "bob", "other", now).await.unwrap();

    let ids = consumption::opened_since(&pool, "alice", now - Duration::days(7))
        .await
        .unwrap();
    assert_eq!(ids, vec!["recent".to_string()]);
}
