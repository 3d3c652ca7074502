use crate::store::StoreError;
use thiserror::Error as ThisError;

/// Unified error type for identity operations.
///
/// Every failure an operation can produce is a variant here; the
/// `Display` text of each soft-failure variant is the message the
/// platform has always shown for that condition. Infrastructure
/// failures ([`Error::Store`]) are hard errors and are never folded
/// into the soft categories.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Username contains characters outside `[A-Za-z0-9_-]`
    #[error("Username is NOT sanitized!")]
    UnsanitizedUsername,

    /// Registration password contains a space, single quote, or double quote
    #[error("Username and password are NOT sanitized!")]
    UnsanitizedRegistration,

    /// Login attempted with neither an API key nor a usable password
    #[error("Password not sanitized!")]
    UnsanitizedPassword,

    /// The username is already registered
    #[error("User already exists!")]
    AlreadyExists,

    /// No account matched the login selector
    #[error("User not found!")]
    NotFound,

    /// No account matched the profile lookup selector
    #[error("Could not find user!")]
    ProfileNotFound,

    /// The account exists but cannot authenticate
    #[error("This user is deactivated!")]
    Deactivated,

    /// Password verification failed
    #[error("Wrong password!")]
    WrongPassword,

    /// The supplied API key matched but is past its expiry
    #[error("API key is expired!")]
    ApiKeyExpired,

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Store/infrastructure failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse failure categories, for callers that branch on kind rather
/// than variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input failed a sanitization check
    Validation,
    /// No matching account
    NotFound,
    /// Uniqueness conflict
    Conflict,
    /// Credentials did not verify
    Authentication,
    /// Account state forbids the operation
    AccountState,
    /// Store or service failure; retryable, not a caller mistake
    Infrastructure,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnsanitizedUsername | Error::UnsanitizedRegistration | Error::UnsanitizedPassword => {
                ErrorCategory::Validation
            }
            Error::NotFound | Error::ProfileNotFound => ErrorCategory::NotFound,
            Error::AlreadyExists => ErrorCategory::Conflict,
            Error::WrongPassword | Error::ApiKeyExpired => ErrorCategory::Authentication,
            Error::Deactivated => ErrorCategory::AccountState,
            Error::Internal { .. } | Error::Store(_) => ErrorCategory::Infrastructure,
        }
    }
}
