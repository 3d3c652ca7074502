//! Live-database checks for `PgStore`.
//!
//! These need a reachable PostgreSQL instance and are ignored by
//! default; run them with a scratch database:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/byline_identity_test \
//!     cargo test --test postgres_store -- --ignored
//! ```

#![cfg(feature = "postgres")]

use byline_identity::account::NewAccountInput;
use byline_identity::store::{PgStore, StoreError, UniqueField};
use byline_identity::{AccountSelector, AuthService, Error};
use sqlx::postgres::PgPoolOptions;

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a scratch database");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("database should be reachable");

    let store = PgStore::new(pool);
    store.migrate().await.expect("migrations should apply");
    store
}

fn unique(name: &str) -> String {
    format!("{name}-{}", uuid::Uuid::new_v4().simple())
}

fn input(username: &str) -> NewAccountInput {
    NewAccountInput {
        username: username.to_string(),
        password: "integration-pass1".to_string(),
        full_name: "Integration Test".to_string(),
        email: format!("{username}@example.net"),
    }
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL database"]
async fn register_login_and_lookup_round_trip() {
    let service = AuthService::new(store().await);
    let username = unique("roundtrip");

    let registered = service.register_user(input(&username)).await.unwrap();

    let authed = service
        .login_user(&byline_identity::Credentials::password(username.as_str(), "integration-pass1"))
        .await
        .unwrap();
    assert_eq!(authed.account_id, registered.account_id);

    let profile = service
        .get_account(&AccountSelector::by_account_id(registered.account_id))
        .await
        .unwrap();
    assert_eq!(profile.username, username);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL database"]
async fn duplicate_username_maps_to_conflict() {
    let service = AuthService::new(store().await);
    let username = unique("duped");

    service.register_user(input(&username)).await.unwrap();
    let err = service.register_user(input(&username)).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists));
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL database"]
async fn raw_insert_reports_the_violated_column() {
    let pg = store().await;
    let service = AuthService::new(&pg);
    let username = unique("column");

    let account = service.register_user(input(&username)).await.unwrap();

    // Same row again: the primary key is the first constraint to trip
    let err = byline_identity::store::IdentityStore::insert(&pg, account).await.unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation { field: UniqueField::AccountId, .. }));
}
