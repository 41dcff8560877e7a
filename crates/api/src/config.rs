//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use marketplace::providers::{provider_a, provider_b};
use marketplace::retry::{DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS};
use marketplace::transport::http::DEFAULT_TIMEOUT;
use marketplace::{DispatchMode, RetryPolicy};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `PROVIDER_A_BASE_URL` (default: `"http://localhost:3001/api"`)
/// - `PROVIDER_B_BASE_URL` (default: `"http://localhost:3002"`)
/// - `RETRY_MAX_ATTEMPTS`: attempts per provider call (default: `3`)
/// - `RETRY_DELAY_MS`: pause between attempts (default: `2000`)
/// - `HTTP_TIMEOUT_MS`: per-call timeout (default: `10000`)
/// - `DISPATCH_MODE`: `sequential` or `concurrent` (default: `sequential`)
///
/// A value that does not parse falls back to its default.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub provider_a_base_url: String,
    pub provider_b_base_url: String,
    pub retry_max_attempts: u32,
    pub retry_delay: Duration,
    pub http_timeout: Duration,
    pub dispatch_mode: DispatchMode,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env_or("HOST", defaults.host),
            port: parsed_or("PORT", defaults.port),
            log_level: env_or("RUST_LOG", defaults.log_level),
            provider_a_base_url: env_or("PROVIDER_A_BASE_URL", defaults.provider_a_base_url),
            provider_b_base_url: env_or("PROVIDER_B_BASE_URL", defaults.provider_b_base_url),
            retry_max_attempts: parsed_or("RETRY_MAX_ATTEMPTS", defaults.retry_max_attempts),
            retry_delay: millis_or("RETRY_DELAY_MS", defaults.retry_delay),
            http_timeout: millis_or("HTTP_TIMEOUT_MS", defaults.http_timeout),
            dispatch_mode: parsed_or("DISPATCH_MODE", defaults.dispatch_mode),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Retry policy shared by every provider client.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_max_attempts, self.retry_delay)
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.dispatch_mode
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            provider_a_base_url: provider_a::DEFAULT_BASE_URL.to_string(),
            provider_b_base_url: provider_b::DEFAULT_BASE_URL.to_string(),
            retry_max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_DELAY,
            http_timeout: DEFAULT_TIMEOUT,
            dispatch_mode: DispatchMode::Sequential,
        }
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn millis_or(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
