//! Record-store tests against a live Postgres.
//!
//! `#[sqlx::test]` creates a fresh database per test from `DATABASE_URL`.

use assert_matches::assert_matches;
use catering_core::session::SessionRecord;
use catering_core::store::{OwnerStore, SessionRecordStore, StoreError};
use catering_db::models::owner::CreateOwner;
use catering_db::repositories::OwnerRepo;
use catering_db::{PgOwnerStore, PgSessionRecordStore};
use chrono::{Duration, Utc};
use sqlx::PgPool;

async fn create_owner(pool: &PgPool, email: &str) -> i64 {
    let input = CreateOwner {
        name: "Test Owner".to_string(),
        email: email.to_string(),
        phone_number: "+628123456789".to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
    };
    OwnerRepo::create(pool, &input)
        .await
        .expect("owner creation should succeed")
        .id
}

fn record(sid: &str, owner_id: i64, expires_in: Duration) -> SessionRecord {
    SessionRecord {
        sid: sid.to_string(),
        owner_id,
        email: "owner@example.com".to_string(),
        jti: format!("jti-{sid}"),
        refresh_token: "refresh".to_string(),
        expired_at: Utc::now() + expires_in,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_lookup_by_email_and_id(pool: PgPool) {
    let id = create_owner(&pool, "owner@example.com").await;
    let store = PgOwnerStore::new(pool);

    let by_email = store.find_by_email("owner@example.com").await.unwrap();
    assert_eq!(by_email.map(|o| o.id), Some(id));

    let by_id = store.find_by_id(id).await.unwrap();
    assert_eq!(by_id.map(|o| o.email), Some("owner@example.com".to_string()));

    assert!(store.find_by_email("ghost@example.com").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_password_by_email(pool: PgPool) {
    create_owner(&pool, "owner@example.com").await;
    let store = PgOwnerStore::new(pool);

    assert!(store.update_password_by_email("owner@example.com", "new-hash").await.unwrap());
    assert!(!store.update_password_by_email("ghost@example.com", "new-hash").await.unwrap());

    let owner = store.find_by_email("owner@example.com").await.unwrap().unwrap();
    assert_eq!(owner.password_hash, "new-hash");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_insert_find_delete(pool: PgPool) {
    let owner_id = create_owner(&pool, "owner@example.com").await;
    let store = PgSessionRecordStore::new(pool);

    store.insert(&record("sid-1", owner_id, Duration::days(60))).await.unwrap();

    let found = store.find_by_sid("sid-1").await.unwrap().expect("row should exist");
    assert_eq!(found.owner_id, owner_id);
    assert_eq!(found.jti, "jti-sid-1");

    assert_eq!(store.delete_by_sid("sid-1").await.unwrap(), 1);
    assert_eq!(store.delete_by_sid("sid-1").await.unwrap(), 0);
    assert!(store.find_by_sid("sid-1").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_sid_is_rejected(pool: PgPool) {
    let owner_id = create_owner(&pool, "owner@example.com").await;
    let store = PgSessionRecordStore::new(pool);

    store.insert(&record("dup", owner_id, Duration::days(1))).await.unwrap();
    let result = store.insert(&record("dup", owner_id, Duration::days(1))).await;
    assert_matches!(result, Err(StoreError::Durable(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_expired_only_removes_closed_windows(pool: PgPool) {
    let owner_id = create_owner(&pool, "owner@example.com").await;
    let store = PgSessionRecordStore::new(pool);

    store.insert(&record("live", owner_id, Duration::days(1))).await.unwrap();
    store.insert(&record("stale", owner_id, Duration::seconds(-10))).await.unwrap();

    assert_eq!(store.delete_expired().await.unwrap(), 1);
    assert!(store.find_by_sid("live").await.unwrap().is_some());
    assert!(store.find_by_sid("stale").await.unwrap().is_none());
}
