//! Server configuration
//!
//! Read once from the environment at startup. Invalid values fall back to
//! the defaults with a warning.

use std::path::PathBuf;
use std::time::Duration;

pub const DATABASE_PATH_VAR: &str = "SHELFSCORE_DATABASE_PATH";
pub const CACHE_MAX_AGE_VAR: &str = "SHELFSCORE_CACHE_MAX_AGE_HOURS";
pub const CATALOG_URL_VAR: &str = "SHELFSCORE_CATALOG_URL";
pub const CATALOG_TIMEOUT_VAR: &str = "SHELFSCORE_CATALOG_TIMEOUT_SECS";

pub const DEFAULT_CACHE_MAX_AGE_HOURS: u64 = 24;
pub const DEFAULT_CATALOG_URL: &str = "https://world.openfoodfacts.org";
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;

/// One hundred years
pub const MAX_CACHE_MAX_AGE_HOURS: u64 = 24 * 365 * 100;
pub const MAX_CATALOG_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub cache_max_age_hours: u64,
    pub catalog_url: String,
    pub catalog_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch the process env
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let cache_max_age_hours = parse_bounded(
            CACHE_MAX_AGE_VAR,
            lookup(CACHE_MAX_AGE_VAR),
            DEFAULT_CACHE_MAX_AGE_HOURS,
            MAX_CACHE_MAX_AGE_HOURS,
        );

        let catalog_url = match lookup(CATALOG_URL_VAR) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim_end_matches('/').to_string()
            }
            Some(url) => {
                tracing::warn!("Ignoring {}='{}': not an http(s) URL", CATALOG_URL_VAR, url);
                DEFAULT_CATALOG_URL.to_string()
            }
            None => DEFAULT_CATALOG_URL.to_string(),
        };

        let timeout_secs = parse_bounded(
            CATALOG_TIMEOUT_VAR,
            lookup(CATALOG_TIMEOUT_VAR),
            DEFAULT_CATALOG_TIMEOUT_SECS,
            MAX_CATALOG_TIMEOUT_SECS,
        );

        Self {
            database_path,
            cache_max_age_hours,
            catalog_url,
            catalog_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Freshness window; never negative
    pub fn cache_max_age(&self) -> chrono::Duration {
        hours(self.cache_max_age_hours).unwrap_or_else(chrono::Duration::zero)
    }
}

fn hours(value: u64) -> Option<chrono::Duration> {
    i64::try_from(value.min(MAX_CACHE_MAX_AGE_HOURS))
        .ok()
        .and_then(chrono::Duration::try_hours)
}

/// Parse a value in `1..=max`, falling back to `default` otherwise
fn parse_bounded(key: &str, raw: Option<String>, default: u64, max: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 && v <= max => v,
        _ => {
            tracing::warn!("Ignoring {}='{}' (allowed 1..={}), using {}", key, raw, max, default);
            default
        }
    }
}

/// `<project>/data/shelfscore.db`, resolved from the executable location
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // target/{release,debug} -> project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|p| p.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path.push("shelfscore.db");
    path
}
