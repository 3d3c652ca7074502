//! Account data model.
//!
//! Three shapes for three audiences:
//!
//! - [`StoredAccount`] is the persisted record, hash included. It never
//!   crosses the module boundary as an authentication result.
//! - [`AuthenticatedAccount`] is what a successful login returns; the
//!   password hash is structurally absent.
//! - [`AccountProfile`] is the privileged-lookup view: public fields
//!   always, sensitive fields only behind [`AdminDisclosure::Granted`].
//!
//! All of them are complete values built in one step; there is no
//! partially populated record and no validity flag to check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Permission, PermissionSet};

/// The persisted representation of one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAccount {
    pub account_id: AccountId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub api_key: String,
    /// When set, the API key stops being a usable credential at this instant.
    pub api_key_expires_at: Option<DateTime<Utc>>,
    pub permissions: PermissionSet,
    pub deactivated: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredAccount {
    pub fn can_post(&self) -> bool {
        self.permissions.can_post()
    }

    pub fn can_comment(&self) -> bool {
        self.permissions.can_comment()
    }

    pub fn can_administrate(&self) -> bool {
        self.permissions.can_administrate()
    }

    /// Whether the account's API key is past its expiry at `now`.
    /// Keys without an expiry never expire.
    pub fn api_key_expired(&self, now: DateTime<Utc>) -> bool {
        self.api_key_expires_at.is_some_and(|expiry| expiry <= now)
    }
}

/// Raw registration input, validated by `AuthService::register_user`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccountInput {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
}

/// Login credentials. `api_key` is a full credential: when it matches,
/// no password comparison happens at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
}

impl Credentials {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            api_key: None,
        }
    }

    pub fn api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// A successfully authenticated account, as returned by login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub api_key: String,
    pub permissions: PermissionSet,
}

impl AuthenticatedAccount {
    pub(crate) fn from_stored(stored: &StoredAccount) -> Self {
        Self {
            account_id: stored.account_id,
            username: stored.username.clone(),
            full_name: stored.full_name.clone(),
            email: stored.email.clone(),
            api_key: stored.api_key.clone(),
            permissions: stored.permissions.clone(),
        }
    }

    pub fn can_post(&self) -> bool {
        self.permissions.can_post()
    }

    pub fn can_comment(&self) -> bool {
        self.permissions.can_comment()
    }

    pub fn can_administrate(&self) -> bool {
        self.permissions.can_administrate()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }
}

/// Fields disclosed only to administrators.
#[derive(Debug, Clone, Serialize)]
pub struct AdminFields {
    pub email: String,
    pub permissions: PermissionSet,
    pub deactivated: bool,
}

/// Outcome of the administrative-disclosure check in a profile lookup.
///
/// A denied check is deliberately not an error: the lookup still
/// succeeds with public fields, and the sensitive fields are withheld
/// by construction rather than blanked.
#[derive(Debug, Clone, Serialize)]
pub enum AdminDisclosure {
    /// No API key was supplied; public fields only, no check performed.
    NotRequested,
    /// The caller's key did not authenticate as an administrator.
    Denied,
    /// The caller holds `administrate`; sensitive fields included.
    Granted(AdminFields),
}

impl AdminDisclosure {
    pub fn is_granted(&self) -> bool {
        matches!(self, AdminDisclosure::Granted(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AdminDisclosure::Denied)
    }

    /// The human-readable reason when disclosure was denied.
    pub fn denial_reason(&self) -> Option<&'static str> {
        match self {
            AdminDisclosure::Denied => Some("Provided API key does NOT have administration permission!"),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&AdminFields> {
        match self {
            AdminDisclosure::Granted(fields) => Some(fields),
            _ => None,
        }
    }
}

/// A profile lookup result: public fields plus a disclosure outcome.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    pub account_id: AccountId,
    pub username: String,
    pub full_name: String,
    pub admin: AdminDisclosure,
}
