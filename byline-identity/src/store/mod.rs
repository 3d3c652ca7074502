//! Identity persistence layer.
//!
//! The service talks to storage exclusively through the
//! [`IdentityStore`] trait, injected at construction, so tests run
//! against [`MemoryStore`] and deployments against
//! [`postgres::PgStore`].
//!
//! # Uniqueness contract
//!
//! [`IdentityStore::insert`] is a *conditional* insert: it must reject
//! a record whose username, account id, or API key already exists, with
//! [`StoreError::UniqueViolation`], atomically with respect to
//! concurrent inserts. This is the authoritative enforcement of the
//! uniqueness invariants; any read-before-write existence check above
//! it is only an optimization.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::account::StoredAccount;
use crate::types::AccountId;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

/// Which unique column an insert collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    AccountId,
    ApiKey,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueField::Username => f.write_str("username"),
            UniqueField::AccountId => f.write_str("account id"),
            UniqueField::ApiKey => f.write_str("api key"),
        }
    }
}

/// Errors surfaced by store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Conditional insert rejected a duplicate
    #[error("unique constraint violation on {field}")]
    UniqueViolation { field: UniqueField, message: String },

    /// Catch-all for backend failures (connection, I/O, corrupt rows)
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Type alias for store operation results
pub type Result<T> = std::result::Result<T, StoreError>;

/// Exact-match query against a single unique column.
#[derive(Debug, Clone, Copy)]
pub enum AccountQuery<'a> {
    Username(&'a str),
    ApiKey(&'a str),
    AccountId(AccountId),
}

/// Append-only account storage with exact-match reads.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find the account matching `query`, if any. A miss is `Ok(None)`.
    async fn find(&self, query: AccountQuery<'_>) -> Result<Option<StoredAccount>>;

    /// Insert a new account, rejecting duplicates per the uniqueness
    /// contract described at the module level.
    async fn insert(&self, account: StoredAccount) -> Result<()>;
}

#[async_trait]
impl<S: IdentityStore + ?Sized> IdentityStore for &S {
    async fn find(&self, query: AccountQuery<'_>) -> Result<Option<StoredAccount>> {
        (**self).find(query).await
    }

    async fn insert(&self, account: StoredAccount) -> Result<()> {
        (**self).insert(account).await
    }
}

#[async_trait]
impl<S: IdentityStore + ?Sized> IdentityStore for Arc<S> {
    async fn find(&self, query: AccountQuery<'_>) -> Result<Option<StoredAccount>> {
        (**self).find(query).await
    }

    async fn insert(&self, account: StoredAccount) -> Result<()> {
        (**self).insert(account).await
    }
}
