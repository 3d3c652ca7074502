//! PostgreSQL-backed account store.
//!
//! Uniqueness is enforced by the `accounts` table's unique constraints;
//! a violated constraint maps to [`StoreError::UniqueViolation`] with
//! the offending column identified by constraint name. Everything else
//! sqlx reports is a backend failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

use super::{AccountQuery, IdentityStore, Result, StoreError, UniqueField};
use crate::account::StoredAccount;
use crate::types::{abbrev_uuid, PermissionSet};

/// sqlx/PostgreSQL [`IdentityStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

// Database entity model
#[derive(Debug, FromRow)]
struct AccountRow {
    account_id: Uuid,
    username: String,
    full_name: String,
    email: String,
    password_hash: String,
    api_key: String,
    api_key_expires_at: Option<DateTime<Utc>>,
    permissions: Vec<String>,
    deactivated: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for StoredAccount {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self> {
        // A tag outside the vocabulary means the row was written by
        // something other than this module; surface it, don't drop it.
        let permissions = PermissionSet::from_tags(&row.permissions)
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("corrupt permissions for {:?}: {e}", row.username)))?;

        Ok(StoredAccount {
            account_id: row.account_id,
            username: row.username,
            full_name: row.full_name,
            email: row.email,
            password_hash: row.password_hash,
            api_key: row.api_key,
            api_key_expires_at: row.api_key_expires_at,
            permissions,
            deactivated: row.deactivated,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = "account_id, username, full_name, email, password_hash, api_key, \
                              api_key_expires_at, permissions, deactivated, created_at";

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded migrations against the connected database.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.into()))?;
        Ok(())
    }
}

/// Map a sqlx error, attributing unique violations by constraint name.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("accounts_pkey") => UniqueField::AccountId,
                Some("accounts_api_key_key") => UniqueField::ApiKey,
                // accounts_username_key, plus any future username index
                _ => UniqueField::Username,
            };
            return StoreError::UniqueViolation {
                field,
                message: db_err.message().to_string(),
            };
        }
    }
    StoreError::Backend(err.into())
}

#[async_trait]
impl IdentityStore for PgStore {
    #[instrument(skip_all)]
    async fn find(&self, query: AccountQuery<'_>) -> Result<Option<StoredAccount>> {
        let row = match query {
            AccountQuery::Username(username) => {
                sqlx::query_as::<_, AccountRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM accounts WHERE username = $1"
                ))
                .bind(username)
                .fetch_optional(&self.pool)
                .await
            }
            AccountQuery::ApiKey(api_key) => {
                sqlx::query_as::<_, AccountRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM accounts WHERE api_key = $1"
                ))
                .bind(api_key)
                .fetch_optional(&self.pool)
                .await
            }
            AccountQuery::AccountId(account_id) => {
                sqlx::query_as::<_, AccountRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM accounts WHERE account_id = $1"
                ))
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;

        row.map(StoredAccount::try_from).transpose()
    }

    #[instrument(skip_all, fields(username = %account.username, account_id = %abbrev_uuid(&account.account_id)))]
    async fn insert(&self, account: StoredAccount) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts (account_id, username, full_name, email, password_hash, api_key, \
             api_key_expires_at, permissions, deactivated, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(account.account_id)
        .bind(&account.username)
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.api_key)
        .bind(account.api_key_expires_at)
        .bind(account.permissions.to_tags())
        .bind(account.deactivated)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
