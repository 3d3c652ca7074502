//! # byline-identity: identity and access control for the byline platform
//!
//! `byline-identity` is the account subsystem of the byline publishing
//! platform: it registers accounts, authenticates passwords and API
//! keys, resolves account records for other subsystems, and gates
//! capabilities (posting, commenting, administration) behind a
//! permission set. It is a library contract: HTTP handlers, CLIs, and
//! the post/comment layers consume it; no transport lives here.
//!
//! ## Overview
//!
//! The entry point is [`AuthService`], constructed over any
//! [`store::IdentityStore`] implementation. Raw caller input is
//! sanitization-gated, resolved against the store, verified against
//! Argon2 password hashes or a stored API key, and returned as a
//! complete value: [`account::StoredAccount`] from registration,
//! [`account::AuthenticatedAccount`] from login (never carrying the
//! hash), and [`account::AccountProfile`] from privileged lookup, where
//! sensitive fields sit behind an administrative-disclosure check.
//! Every failure is a variant of [`errors::Error`]; there is no
//! partially valid record to inspect.
//!
//! ## Storage
//!
//! Persistence is injected. [`store::MemoryStore`] backs tests and
//! embedded use; [`store::PgStore`] (feature `postgres`, default on)
//! backs deployments. The store contract makes inserts conditional:
//! duplicate usernames are rejected atomically at the storage layer, so
//! two racing registrations can never both land.
//!
//! ```
//! use byline_identity::{account::NewAccountInput, store::MemoryStore, AuthService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), byline_identity::Error> {
//! let service = AuthService::new(MemoryStore::new());
//! let account = service
//!     .register_user(NewAccountInput {
//!         username: "first-writer".into(),
//!         password: "not-hunter2".into(),
//!         full_name: "First Writer".into(),
//!         email: "writer@example.net".into(),
//!     })
//!     .await?;
//! assert!(account.can_comment() && !account.can_post());
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod lookup;
pub mod password;
pub mod sanitize;
pub mod service;
pub mod store;
pub mod types;

pub use account::{AccountProfile, AdminDisclosure, AuthenticatedAccount, Credentials, NewAccountInput, StoredAccount};
pub use config::IdentityConfig;
pub use errors::{Error, ErrorCategory};
pub use lookup::IdentityLookup;
pub use service::AuthService;
pub use types::{AccountId, AccountSelector, Permission, PermissionSet};
