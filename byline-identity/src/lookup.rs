//! Account resolution.

use tracing::instrument;

use crate::account::StoredAccount;
use crate::errors::Error;
use crate::sanitize;
use crate::store::{AccountQuery, IdentityStore};
use crate::types::AccountSelector;

/// Resolves accounts by username, API key, or account id.
///
/// Exactly one selector field drives the query, with precedence
/// username > api key > account id. A username is sanitization-gated
/// before any store traffic; an unsanitized one fails the lookup
/// without touching the store.
#[derive(Debug)]
pub struct IdentityLookup<S> {
    store: S,
}

impl<S: IdentityStore> IdentityLookup<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve `selector` to an account. A miss (including an empty
    /// selector) is `Ok(None)`, not an error.
    #[instrument(skip_all, fields(username = selector.username.as_deref().unwrap_or("-")))]
    pub async fn find_account(&self, selector: &AccountSelector) -> Result<Option<StoredAccount>, Error> {
        if let Some(username) = selector.username.as_deref() {
            if !sanitize::username_is_sanitized(username) {
                return Err(Error::UnsanitizedUsername);
            }
            return Ok(self.store.find(AccountQuery::Username(username)).await?);
        }

        if let Some(api_key) = selector.api_key.as_deref() {
            return Ok(self.store.find(AccountQuery::ApiKey(api_key)).await?);
        }

        if let Some(account_id) = selector.account_id {
            return Ok(self.store.find(AccountQuery::AccountId(account_id)).await?);
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Result as StoreResult};
    use crate::types::PermissionSet;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Store wrapper that records which column each query hit.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        queried: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl IdentityStore for RecordingStore {
        async fn find(&self, query: AccountQuery<'_>) -> StoreResult<Option<StoredAccount>> {
            self.queried.lock().unwrap().push(match query {
                AccountQuery::Username(_) => "username",
                AccountQuery::ApiKey(_) => "api_key",
                AccountQuery::AccountId(_) => "account_id",
            });
            self.inner.find(query).await
        }

        async fn insert(&self, account: StoredAccount) -> StoreResult<()> {
            self.inner.insert(account).await
        }
    }

    fn account(username: &str) -> StoredAccount {
        StoredAccount {
            account_id: crate::crypto::new_account_id(),
            username: username.to_string(),
            full_name: String::new(),
            email: String::new(),
            password_hash: "$argon2id$stub".to_string(),
            api_key: crate::crypto::generate_api_key(),
            api_key_expires_at: None,
            permissions: PermissionSet::new_member(),
            deactivated: false,
            created_at: Utc::now(),
        }
    }

    #[test_log::test(tokio::test)]
    async fn unsanitized_username_fails_without_querying() {
        let store = RecordingStore::default();
        let lookup = IdentityLookup::new(&store);

        let err = lookup
            .find_account(&AccountSelector::by_username("bad name!"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnsanitizedUsername));
        assert!(store.queried.lock().unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn username_takes_precedence_over_api_key() {
        let store = RecordingStore::default();
        let stored = account("first-choice");
        store.insert(stored.clone()).await.unwrap();

        let lookup = IdentityLookup::new(&store);
        let selector = AccountSelector {
            username: Some("first-choice".to_string()),
            api_key: Some(stored.api_key.clone()),
            account_id: Some(stored.account_id),
        };

        let found = lookup.find_account(&selector).await.unwrap().unwrap();
        assert_eq!(found.account_id, stored.account_id);
        assert_eq!(*store.queried.lock().unwrap(), vec!["username"]);
    }

    #[test_log::test(tokio::test)]
    async fn api_key_takes_precedence_over_account_id() {
        let store = RecordingStore::default();
        let stored = account("keyed");
        store.insert(stored.clone()).await.unwrap();

        let lookup = IdentityLookup::new(&store);
        let selector = AccountSelector {
            username: None,
            api_key: Some(stored.api_key.clone()),
            account_id: Some(stored.account_id),
        };

        lookup.find_account(&selector).await.unwrap().unwrap();
        assert_eq!(*store.queried.lock().unwrap(), vec!["api_key"]);
    }

    #[test_log::test(tokio::test)]
    async fn empty_selector_resolves_to_none() {
        let store = RecordingStore::default();
        let lookup = IdentityLookup::new(&store);

        assert!(lookup.find_account(&AccountSelector::default()).await.unwrap().is_none());
        assert!(store.queried.lock().unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn deactivated_accounts_still_resolve() {
        let store = RecordingStore::default();
        let mut stored = account("sleeper");
        stored.deactivated = true;
        store.insert(stored).await.unwrap();

        let lookup = IdentityLookup::new(&store);
        let found = lookup
            .find_account(&AccountSelector::by_username("sleeper"))
            .await
            .unwrap()
            .unwrap();
        assert!(found.deactivated);
    }
}
