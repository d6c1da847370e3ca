//! Typed configuration from environment variables.
//!
//! Loads once at startup. Missing, malformed, or negative counts fall back
//! to the compiled-in defaults rather than failing the run.

/// Worker count used when `NUM_WORKERS` is absent or unusable.
pub const DEFAULT_WORKERS: usize = 16;
/// Message count used when `NUM_MESSAGES` is absent or unusable.
pub const DEFAULT_MESSAGES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub workers: usize,
    pub messages: usize,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Self {
        Self::resolve(int_from_env, |name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::resolve(|name| parse_int(lookup(name)), &lookup)
    }

    fn resolve(
        int: impl Fn(&str) -> Option<i64>,
        text: impl Fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            workers: count_or_default(int("NUM_WORKERS"), DEFAULT_WORKERS),
            messages: count_or_default(int("NUM_MESSAGES"), DEFAULT_MESSAGES),
            otel_endpoint: text("OTEL_ENDPOINT").filter(|s| !s.is_empty()),
            log_level: text("LOG_LEVEL")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            messages: DEFAULT_MESSAGES,
            otel_endpoint: None,
            log_level: "info".to_string(),
        }
    }
}

/// Read a base-10 integer from the environment.
///
/// Returns `None` when the variable is unset, empty, or not an integer.
/// Every integer, `-1` included, is returned as `Some`.
pub fn int_from_env(name: &str) -> Option<i64> {
    parse_int(std::env::var(name).ok())
}

fn parse_int(raw: Option<String>) -> Option<i64> {
    raw.filter(|s| !s.is_empty())?.parse().ok()
}

fn count_or_default(value: Option<i64>, default: usize) -> usize {
    value
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(default)
}
