//! Environment helpers: one-time dotenv loading and typed getters.
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Once;

use anyhow::{anyhow, Result};

static INIT: Once = Once::new();

/// Load `.env` from the working directory, once. Safe to call repeatedly.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Optional env var; unset and blank are both `None`.
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Parsed env var, falling back to `default` when unset. A value that is set
/// but does not parse is an error rather than a silent fallback.
pub fn env_parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("invalid {key}={raw:?}: {e}")),
        None => Ok(default),
    }
}
