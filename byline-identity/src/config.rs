//! Identity module configuration.
//!
//! Configuration is plain serde data with sensible defaults, loadable
//! from a YAML file with environment variable overrides. Variables are
//! prefixed with `BYLINE_`; nested values use double underscores, e.g.
//! `BYLINE_ARGON2__ITERATIONS=3`.
//!
//! ```no_run
//! use byline_identity::config::IdentityConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), figment::Error> {
//! let config = IdentityConfig::load(Some(Path::new("identity.yaml")))?;
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::password::Argon2Params;

/// Tunables for the identity service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Password hashing cost parameters
    pub argon2: Argon2Params,

    /// Lifetime stamped on newly issued API keys, in humantime notation
    /// ("30days", "12h"). `None` issues non-expiring keys.
    #[serde(with = "humantime_serde")]
    pub api_key_ttl: Option<Duration>,
}

impl IdentityConfig {
    /// Load configuration, merging (in override order): defaults, the
    /// YAML file at `path` if given, then `BYLINE_`-prefixed
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed("BYLINE_").split("__")).extract()
    }
}
