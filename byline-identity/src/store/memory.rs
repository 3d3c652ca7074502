//! In-process account store.
//!
//! Backs tests and embedded deployments. The username map is the
//! contended path: the entry API makes duplicate-username rejection
//! atomic, which is exactly the race the registration flow relies on
//! the store to close. Account ids and API keys come from generators
//! that are contractually unique, so their indexes are only consulted,
//! not raced over.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::instrument;

use super::{AccountQuery, IdentityStore, Result, StoreError, UniqueField};
use crate::account::StoredAccount;
use crate::types::AccountId;

/// `DashMap`-backed [`IdentityStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Primary records, keyed by username
    accounts: DashMap<String, StoredAccount>,
    /// api key -> username
    key_index: DashMap<String, String>,
    /// account id -> username
    id_index: DashMap<AccountId, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    #[instrument(skip_all)]
    async fn find(&self, query: AccountQuery<'_>) -> Result<Option<StoredAccount>> {
        let username = match query {
            AccountQuery::Username(username) => Some(username.to_string()),
            AccountQuery::ApiKey(api_key) => self.key_index.get(api_key).map(|entry| entry.value().clone()),
            AccountQuery::AccountId(account_id) => self.id_index.get(&account_id).map(|entry| entry.value().clone()),
        };

        Ok(username.and_then(|username| self.accounts.get(&username).map(|entry| entry.value().clone())))
    }

    #[instrument(skip_all, fields(username = %account.username))]
    async fn insert(&self, account: StoredAccount) -> Result<()> {
        if self.id_index.contains_key(&account.account_id) {
            return Err(StoreError::UniqueViolation {
                field: UniqueField::AccountId,
                message: format!("account id {} already stored", account.account_id),
            });
        }
        if self.key_index.contains_key(&account.api_key) {
            return Err(StoreError::UniqueViolation {
                field: UniqueField::ApiKey,
                message: "api key already stored".to_string(),
            });
        }

        match self.accounts.entry(account.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation {
                field: UniqueField::Username,
                message: format!("username {:?} already stored", account.username),
            }),
            Entry::Vacant(slot) => {
                self.key_index.insert(account.api_key.clone(), account.username.clone());
                self.id_index.insert(account.account_id, account.username.clone());
                slot.insert(account);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PermissionSet;
    use chrono::Utc;

    fn account(username: &str) -> StoredAccount {
        StoredAccount {
            account_id: crate::crypto::new_account_id(),
            username: username.to_string(),
            full_name: format!("{username} full"),
            email: format!("{username}@example.net"),
            password_hash: "$argon2id$stub".to_string(),
            api_key: crate::crypto::generate_api_key(),
            api_key_expires_at: None,
            permissions: PermissionSet::new_member(),
            deactivated: false,
            created_at: Utc::now(),
        }
    }

    #[test_log::test(tokio::test)]
    async fn finds_by_each_unique_field() {
        let store = MemoryStore::new();
        let stored = account("lookup-me");
        store.insert(stored.clone()).await.unwrap();

        for query in [
            AccountQuery::Username("lookup-me"),
            AccountQuery::ApiKey(&stored.api_key),
            AccountQuery::AccountId(stored.account_id),
        ] {
            let found = store.find(query).await.unwrap().expect("account should resolve");
            assert_eq!(found.account_id, stored.account_id);
        }
    }

    #[test_log::test(tokio::test)]
    async fn miss_is_ok_none() {
        let store = MemoryStore::new();
        assert!(store.find(AccountQuery::Username("ghost")).await.unwrap().is_none());
        assert!(store.find(AccountQuery::ApiKey("bk-nope")).await.unwrap().is_none());
    }

    #[test_log::test(tokio::test)]
    async fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        store.insert(account("taken")).await.unwrap();

        let err = store.insert(account("taken")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation {
                field: UniqueField::Username,
                ..
            }
        ));
        assert_eq!(store.len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn duplicate_api_key_is_rejected() {
        let store = MemoryStore::new();
        let first = account("first");
        let mut second = account("second");
        second.api_key = first.api_key.clone();

        store.insert(first).await.unwrap();
        let err = store.insert(second).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation {
                field: UniqueField::ApiKey,
                ..
            }
        ));
    }
}
