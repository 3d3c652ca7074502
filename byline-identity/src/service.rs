//! Registration, login, and privileged lookup.
//!
//! `AuthService` composes the sanitization gates, the hasher, the id
//! generators, and an injected [`IdentityStore`]. Every operation
//! resolves to a `Result`: success is a complete value, failure is an
//! [`Error`] variant. There is no partially valid record to inspect.

use chrono::Utc;
use tracing::{debug, instrument, warn};

use crate::account::{
    AccountProfile, AdminDisclosure, AdminFields, AuthenticatedAccount, Credentials, NewAccountInput, StoredAccount,
};
use crate::config::IdentityConfig;
use crate::crypto;
use crate::errors::Error;
use crate::lookup::IdentityLookup;
use crate::password;
use crate::sanitize;
use crate::store::{IdentityStore, StoreError, UniqueField};
use crate::types::{AccountSelector, PermissionSet};

/// The identity module's service surface.
pub struct AuthService<S> {
    store: S,
    config: IdentityConfig,
}

impl<S: IdentityStore> AuthService<S> {
    /// Service with default configuration (production hashing cost,
    /// non-expiring API keys).
    pub fn new(store: S) -> Self {
        Self::with_config(store, IdentityConfig::default())
    }

    pub fn with_config(store: S, config: IdentityConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    fn lookup(&self) -> IdentityLookup<&S> {
        IdentityLookup::new(&self.store)
    }

    /// Resolve an account without authenticating anyone. A miss is `Ok(None)`.
    pub async fn find_account(&self, selector: &AccountSelector) -> Result<Option<StoredAccount>, Error> {
        self.lookup().find_account(selector).await
    }

    /// Register a new account.
    ///
    /// The password is sanitization-gated before anything else; the new
    /// account starts with the `comment` permission and a freshly
    /// issued account id and API key. Username uniqueness is enforced
    /// by the store's conditional insert; the lookup beforehand only
    /// exists to fail fast on the common case.
    #[instrument(skip_all, fields(username = %input.username))]
    pub async fn register_user(&self, input: NewAccountInput) -> Result<StoredAccount, Error> {
        if !sanitize::password_is_sanitized(&input.password) {
            return Err(Error::UnsanitizedRegistration);
        }

        if self
            .lookup()
            .find_account(&AccountSelector::by_username(input.username.as_str()))
            .await?
            .is_some()
        {
            return Err(Error::AlreadyExists);
        }

        let now = Utc::now();
        let api_key_expires_at = match self.config.api_key_ttl {
            None => None,
            Some(ttl) => Some(
                now + chrono::Duration::from_std(ttl).map_err(|e| Error::Internal {
                    operation: format!("compute api key expiry: {e}"),
                })?,
            ),
        };

        let account = StoredAccount {
            account_id: crypto::new_account_id(),
            username: input.username,
            full_name: input.full_name,
            email: input.email,
            password_hash: password::hash_password(&input.password, self.config.argon2)?,
            api_key: crypto::generate_api_key(),
            api_key_expires_at,
            permissions: PermissionSet::new_member(),
            deactivated: false,
            created_at: now,
        };

        match self.store.insert(account.clone()).await {
            Ok(()) => {
                debug!(account_id = %crate::types::abbrev_uuid(&account.account_id), "account registered");
                Ok(account)
            }
            Err(StoreError::UniqueViolation {
                field: UniqueField::Username,
                ..
            }) => Err(Error::AlreadyExists),
            // The id and key generators are contractually unique, so a
            // collision here is a fault, not a caller conflict.
            Err(StoreError::UniqueViolation { field, .. }) => Err(Error::Internal {
                operation: format!("insert account: generated duplicate {field}"),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate with a password or an API key.
    ///
    /// A matching, unexpired API key is a full credential: no password
    /// comparison happens at all. An expired key falls back to password
    /// verification when a password accompanies it, and fails outright
    /// otherwise. Deactivation is checked before any credential is
    /// compared. The result never carries the password hash.
    #[instrument(skip_all, fields(username = credentials.username.as_deref().unwrap_or("-")))]
    pub async fn login_user(&self, credentials: &Credentials) -> Result<AuthenticatedAccount, Error> {
        let password_usable = credentials
            .password
            .as_deref()
            .is_some_and(sanitize::password_is_sanitized);
        if credentials.api_key.is_none() && !password_usable {
            return Err(Error::UnsanitizedPassword);
        }

        let selector = AccountSelector {
            username: credentials.username.clone(),
            api_key: credentials.api_key.clone(),
            account_id: None,
        };
        let stored = self.lookup().find_account(&selector).await?.ok_or(Error::NotFound)?;

        if stored.deactivated {
            return Err(Error::Deactivated);
        }

        let authenticated_by_key = match credentials.api_key.as_deref() {
            Some(supplied) if supplied == stored.api_key => {
                if stored.api_key_expired(Utc::now()) {
                    warn!(username = %stored.username, "login attempt with expired api key");
                    if credentials.password.is_none() {
                        return Err(Error::ApiKeyExpired);
                    }
                    false
                } else {
                    true
                }
            }
            _ => false,
        };

        if !authenticated_by_key {
            let supplied = credentials.password.as_deref().ok_or(Error::WrongPassword)?;
            if !password::verify_password(supplied, &stored.password_hash)? {
                return Err(Error::WrongPassword);
            }
        }

        Ok(AuthenticatedAccount::from_stored(&stored))
    }

    /// Look up an account's profile, disclosing sensitive fields only
    /// to callers whose API key authenticates an administrator.
    ///
    /// A failed disclosure check is not a failed lookup: the profile
    /// still comes back with public fields, and
    /// [`AccountProfile::admin`] records the denial. Only store
    /// failures during caller re-authentication abort the lookup.
    #[instrument(skip_all, fields(username = selector.username.as_deref().unwrap_or("-")))]
    pub async fn get_account(&self, selector: &AccountSelector) -> Result<AccountProfile, Error> {
        let target = self
            .lookup()
            .find_account(selector)
            .await?
            .ok_or(Error::ProfileNotFound)?;

        let admin = match selector.api_key.as_deref() {
            None => AdminDisclosure::NotRequested,
            Some(api_key) => match self.login_user(&Credentials::api_key(api_key)).await {
                Ok(caller) if caller.can_administrate() => AdminDisclosure::Granted(AdminFields {
                    email: target.email.clone(),
                    permissions: target.permissions.clone(),
                    deactivated: target.deactivated,
                }),
                Ok(caller) => {
                    debug!(caller = %caller.username, "administrative disclosure denied");
                    AdminDisclosure::Denied
                }
                Err(Error::Store(e)) => return Err(e.into()),
                Err(e) => {
                    debug!(error = %e, "caller re-authentication failed, disclosure denied");
                    AdminDisclosure::Denied
                }
            },
        };

        Ok(AccountProfile {
            account_id: target.account_id,
            username: target.username,
            full_name: target.full_name,
            admin,
        })
    }
}
