//! Postgres-backed store tests. They run only when `TEST_DATABASE_URL` points
//! at a scratch database and skip otherwise.

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database};
use tokio::sync::OnceCell;
use uuid::Uuid;

use paddock_domain::horse::Gender;
use paddock_domain::id::{ExternalId, FarmId, HorseId, UserId};
use paddock_web::domain::repository::{FarmRepository, HorseRepository, Store, UserRepository};
use paddock_web::domain::types::Horse;
use paddock_web::error::WebError;
use paddock_web::infra::db::DbStore;
use paddock_web_migration::{Migrator, MigratorTrait};
use paddock_web_schema::farms;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// A store on a migrated database, or `None` when no database is configured.
async fn db_store() -> Option<DbStore> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };
    let db = Database::connect(&url).await.unwrap();
    MIGRATED
        .get_or_init(|| async {
            Migrator::up(&db, None).await.unwrap();
        })
        .await;
    Some(DbStore { db })
}

/// A provider id no other test run has used.
fn fresh_external_id() -> ExternalId {
    ExternalId::from(format!("ext-{}", Uuid::new_v4()))
}

async fn fresh_user(store: &DbStore) -> UserId {
    store
        .user_repo()
        .upsert(&fresh_external_id(), "Ana", "ana@example.com")
        .await
        .unwrap()
        .id
}

// ── Users ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_upsert_user_in_place() {
    let Some(store) = db_store().await else { return };
    let users = store.user_repo();
    let id = fresh_external_id();

    let first = users.upsert(&id, "Ana", "ana@example.com").await.unwrap();
    let second = users.upsert(&id, "Ana Lima", "ana@example.org").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "Ana Lima");
    assert_eq!(second.email, "ana@example.org");
    assert_eq!(second.created_at, first.created_at);
    let found = users.find_by_external_id(&id).await.unwrap().unwrap();
    assert_eq!(found.email, "ana@example.org");
}

#[tokio::test]
async fn should_converge_concurrent_upserts_on_one_row() {
    let Some(store) = db_store().await else { return };
    let (left, right) = (store.user_repo(), store.user_repo());
    let id = fresh_external_id();

    let (a, b) = tokio::join!(
        left.upsert(&id, "Ana", "ana@example.com"),
        right.upsert(&id, "Ana", "ana@example.com"),
    );

    assert_eq!(a.unwrap().id, b.unwrap().id);
}

#[tokio::test]
async fn should_not_touch_farm_on_upsert() {
    let Some(store) = db_store().await else { return };
    let id = fresh_external_id();
    let user = store
        .user_repo()
        .upsert(&id, "Ana", "ana@example.com")
        .await
        .unwrap();
    let farm = store
        .farm_repo()
        .create_or_attach("Sunny Acres", user.id)
        .await
        .unwrap();

    let again = store
        .user_repo()
        .upsert(&id, "Ana", "ana@example.com")
        .await
        .unwrap();

    assert_eq!(again.farm_id, Some(farm.id));
}

#[tokio::test]
async fn should_update_profile_of_existing_user_only() {
    let Some(store) = db_store().await else { return };
    let users = store.user_repo();
    let user_id = fresh_user(&store).await;

    let updated = users
        .update_profile(user_id, "Ana Lima", "ana.lima@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Ana Lima");
    assert_eq!(updated.email, "ana.lima@example.com");

    let missing = users
        .update_profile(UserId(Uuid::new_v4()), "Bea", "bea@example.com")
        .await
        .unwrap();
    assert!(missing.is_none());
}

// ── Farms ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_first_farm_on_repeat_create() {
    let Some(store) = db_store().await else { return };
    let farms = store.farm_repo();
    let user_id = fresh_user(&store).await;

    let first = farms.create_or_attach("X", user_id).await.unwrap();
    let second = farms.create_or_attach("Y", user_id).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "X");
    assert_eq!(second.owner_id, user_id);
    let user = store.user_repo().find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(user.farm_id, Some(first.id));
}

#[tokio::test]
async fn should_create_one_farm_under_concurrent_submissions() {
    let Some(store) = db_store().await else { return };
    let (left, right) = (store.farm_repo(), store.farm_repo());
    let user_id = fresh_user(&store).await;

    let (a, b) = tokio::join!(
        left.create_or_attach("A", user_id),
        right.create_or_attach("B", user_id),
    );

    assert_eq!(a.unwrap().id, b.unwrap().id);
}

#[tokio::test]
async fn should_reattach_owned_farm_left_without_user_link() {
    let Some(store) = db_store().await else { return };
    let user_id = fresh_user(&store).await;
    let orphan = farms::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set("Old Farm".to_owned()),
        owner_id: Set(user_id.0),
        created_at: Set(Utc::now()),
    }
    .insert(&store.db)
    .await
    .unwrap();

    let farm = store
        .farm_repo()
        .create_or_attach("New Farm", user_id)
        .await
        .unwrap();

    assert_eq!(farm.id, FarmId(orphan.id));
    assert_eq!(farm.name, "Old Farm");
    let user = store.user_repo().find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(user.farm_id, Some(farm.id));
}

#[tokio::test]
async fn should_report_unknown_user_on_create_or_attach() {
    let Some(store) = db_store().await else { return };

    let result = store
        .farm_repo()
        .create_or_attach("X", UserId(Uuid::new_v4()))
        .await;

    assert!(matches!(result, Err(WebError::UserNotFound)));
}

// ── Horses ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_scope_horses_to_their_farm() {
    let Some(store) = db_store().await else { return };
    let user_id = fresh_user(&store).await;
    let farm = store
        .farm_repo()
        .create_or_attach("Sunny Acres", user_id)
        .await
        .unwrap();
    let horses = store.horse_repo();
    let horse = Horse {
        id: HorseId(Uuid::now_v7()),
        farm_id: farm.id,
        name: "Comet".to_owned(),
        description: "bay".to_owned(),
        date_of_birth: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
        gender: Gender::Mare,
        created_at: Utc::now(),
    };
    horses.create(&horse).await.unwrap();
    let other_farm = FarmId(Uuid::new_v4());

    let listed = horses.list_by_farm(farm.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].gender, Gender::Mare);
    assert!(horses.find(other_farm, horse.id).await.unwrap().is_none());
    assert!(!horses.delete(other_farm, horse.id).await.unwrap());

    assert!(horses.delete(farm.id, horse.id).await.unwrap());
    assert!(horses.find(farm.id, horse.id).await.unwrap().is_none());
}
