//! Common type definitions: entity ids, the permission vocabulary, and
//! account selectors.
//!
//! # Permission system
//!
//! Permissions are a flat set of capability tags drawn from a fixed
//! vocabulary ([`Permission`]). There is no hierarchy: `administrate`
//! does not imply `post` or `comment` unless those tags are also
//! present in the account's set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account identifier, generated once at registration and immutable after.
pub type AccountId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces.
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// A capability an account may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Post,
    Comment,
    Administrate,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Post => "post",
            Permission::Comment => "comment",
            Permission::Administrate => "administrate",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Permission::Post),
            "comment" => Ok(Permission::Comment),
            "administrate" => Ok(Permission::Administrate),
            other => Err(UnknownPermission(other.to_string())),
        }
    }
}

/// A tag outside the fixed permission vocabulary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown permission tag {0:?}")]
pub struct UnknownPermission(pub String);

/// An account's set of capability tags.
///
/// Membership is exact: each `can_*` predicate is true iff the
/// corresponding tag is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The starting set for a freshly registered account: `{comment}`.
    pub fn new_member() -> Self {
        Self(BTreeSet::from([Permission::Comment]))
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    pub fn can_post(&self) -> bool {
        self.contains(Permission::Post)
    }

    pub fn can_comment(&self) -> bool {
        self.contains(Permission::Comment)
    }

    pub fn can_administrate(&self) -> bool {
        self.contains(Permission::Administrate)
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Render as the stored string tags, in vocabulary order.
    pub fn to_tags(&self) -> Vec<String> {
        self.iter().map(|p| p.as_str().to_string()).collect()
    }

    /// Parse from stored string tags, rejecting anything outside the vocabulary.
    pub fn from_tags<I, S>(tags: I) -> Result<Self, UnknownPermission>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for tag in tags {
            set.insert(tag.as_ref().parse::<Permission>()?);
        }
        Ok(Self(set))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Selector for resolving an account.
///
/// Callers may populate more than one field; resolution uses exactly one,
/// with precedence `username` > `api_key` > `account_id`.
#[derive(Debug, Clone, Default)]
pub struct AccountSelector {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub account_id: Option<AccountId>,
}

impl AccountSelector {
    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn by_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn by_account_id(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.api_key.is_none() && self.account_id.is_none()
    }
}
