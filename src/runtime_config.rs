//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for a routegate process.
//!
//! ## Environment Variables
//!
//! ### `ROUTEGATE_CHARSET`
//!
//! Character set used to decode request bodies when the request itself does not name
//! one (via `Content-Type: ...; charset=`). Default: `utf-8`.
//!
//! ### `ROUTEGATE_ADDR`
//!
//! Address `routegate serve` binds to. Default: `127.0.0.1:8080`.
//!
//! ### `ROUTEGATE_WORKERS`
//!
//! Number of worker threads for the reference HTTP host. Decimal or `0x`-prefixed
//! hexadecimal. Default: `4`.
//!
//! ## Usage
//!
//! ```rust
//! use routegate::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Decoding bodies as {}", config.charset);
//! ```

use crate::dispatcher::AppConfig;
use crate::server::http_server::DEFAULT_WORKERS;
use crate::server::DEFAULT_CHARSET;
use std::env;

/// Default bind address for `routegate serve`
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Default character set for request bodies
    pub charset: String,
    /// Bind address for the reference HTTP host
    pub addr: String,
    /// Worker threads for the reference HTTP host
    pub workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
            addr: DEFAULT_ADDR.to_string(),
            workers: DEFAULT_WORKERS,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let charset = lookup("ROUTEGATE_CHARSET")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.charset);
        let addr = lookup("ROUTEGATE_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.addr);
        let workers = lookup("ROUTEGATE_WORKERS")
            .and_then(|val| parse_count(&val))
            .filter(|&n| n > 0)
            .unwrap_or(defaults.workers);
        Self {
            charset,
            addr,
            workers,
        }
    }

    /// Application settings derived from this configuration
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            charset: self.charset.clone(),
        }
    }
}

fn parse_count(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
