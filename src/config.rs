//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup, validated, and passed explicitly to
//! the components that need it.
//!
//! ## Redis
//!
//! ### Method 1: Full URL
//!
//! ```bash
//! export REDIS_URL="redis://:password@localhost:6379/0"
//! ```
//!
//! ### Method 2: Individual components
//!
//! ```bash
//! export REDIS_ADDR="localhost:6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```
//!
//! If `REDIS_URL` is not set, it is constructed from `REDIS_ADDR`,
//! `REDIS_PASSWORD` and `REDIS_DB`.
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:8080`); `SERVER_PORT` alone binds `0.0.0.0:<port>`
//! - `BASE_URL` - Prefix for generated short URLs (default: `http://localhost:8080`)
//! - `REDIS_CONNECT_ATTEMPTS` - Startup connection attempts, 1s apart (default: 30)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `CLICK_QUEUE_CAPACITY` - Click event buffer size (default: 10000, min: 100)
//! - `CLICK_WORKER_CONCURRENCY` - Click worker tasks (default: 4)
//! - `STRICT_ALLOCATION` - Commit new codes with create-if-absent (default: false)
//! - `BEHIND_PROXY` - Rate-limit by forwarded client IP (default: false)
//! - `RATE_LIMIT_PER_SECOND` / `RATE_LIMIT_BURST` - Per-IP token bucket (default: 10 / 100)

use anyhow::Result;
use std::env;
use std::str::FromStr;

use crate::application::allocator::CommitStrategy;
use crate::utils::mask::mask_connection_string;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    /// Startup connection attempts before giving up.
    pub redis_connect_attempts: usize,
    pub listen_addr: String,
    /// Prefix prepended to short codes in API responses, without trailing slash.
    pub base_url: String,
    pub log_level: String,
    pub log_format: String,
    pub click_queue_capacity: usize,
    /// Number of background tasks applying click increments.
    pub click_worker_concurrency: usize,
    /// When true, new codes are committed with an atomic create-if-absent
    /// instead of an unconditional save.
    pub strict_allocation: bool,
    /// When true, rate limiting reads client IP from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let redis_url = Self::load_redis_url();

        let listen_addr = Self::load_listen_addr();
        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            redis_url,
            redis_connect_attempts: parse_var("REDIS_CONNECT_ATTEMPTS", 30),
            listen_addr,
            base_url,
            log_level,
            log_format,
            click_queue_capacity: parse_var("CLICK_QUEUE_CAPACITY", 10_000),
            click_worker_concurrency: parse_var("CLICK_WORKER_CONCURRENCY", 4),
            strict_allocation: flag_var("STRICT_ALLOCATION"),
            behind_proxy: flag_var("BEHIND_PROXY"),
            rate_limit_per_second: parse_var("RATE_LIMIT_PER_SECOND", 10),
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", 100),
        })
    }

    /// Loads the bind address.
    ///
    /// Priority:
    /// 1. `LISTEN`
    /// 2. `0.0.0.0:` + `SERVER_PORT`
    /// 3. `0.0.0.0:8080`
    fn load_listen_addr() -> String {
        if let Ok(listen) = env::var("LISTEN") {
            return listen;
        }

        let port = env::var("SERVER_PORT").unwrap_or_else(|_| "8080".to_string());
        format!("0.0.0.0:{}", port)
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_ADDR`, `REDIS_PASSWORD`, `REDIS_DB`
    fn load_redis_url() -> String {
        if let Ok(url) = env::var("REDIS_URL") {
            return url;
        }

        let addr = env::var("REDIS_ADDR").unwrap_or_else(|_| "localhost:6379".to_string());
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        match env::var("REDIS_PASSWORD") {
            // Empty password means no authentication
            Ok(pwd) if !pwd.is_empty() => format!("redis://:{}@{}/{}", pwd, addr, db),
            _ => format!("redis://{}/{}", addr, db),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `click_queue_capacity` is outside 100..=1000000
    /// - `click_worker_concurrency` is outside 1..=256
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is not `host:port`
    /// - `redis_url` does not use `redis://` or `rediss://`
    /// - `base_url` does not use `http://` or `https://`
    /// - a rate limit or the connect attempt count is zero
    pub fn validate(&self) -> Result<()> {
        if self.click_queue_capacity < 100 {
            anyhow::bail!(
                "CLICK_QUEUE_CAPACITY must be at least 100, got {}",
                self.click_queue_capacity
            );
        }

        if self.click_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "CLICK_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.click_queue_capacity
            );
        }

        if self.click_worker_concurrency == 0 || self.click_worker_concurrency > 256 {
            anyhow::bail!(
                "CLICK_WORKER_CONCURRENCY must be between 1 and 256, got {}",
                self.click_worker_concurrency
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if !self.redis_url.starts_with("redis://") && !self.redis_url.starts_with("rediss://") {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                mask_connection_string(&self.redis_url)
            );
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!(
                "BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.base_url
            );
        }

        if self.redis_connect_attempts == 0 {
            anyhow::bail!("REDIS_CONNECT_ATTEMPTS must be at least 1");
        }

        if self.rate_limit_per_second == 0 || self.rate_limit_burst == 0 {
            anyhow::bail!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be greater than 0");
        }

        Ok(())
    }

    /// How the allocator commits newly chosen codes.
    pub fn commit_strategy(&self) -> CommitStrategy {
        if self.strict_allocation {
            CommitStrategy::CreateIfAbsent
        } else {
            CommitStrategy::LastWriterWins
        }
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Base URL: {}", self.base_url);
        tracing::info!("  Redis: {}", mask_connection_string(&self.redis_url));
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Click queue capacity: {}", self.click_queue_capacity);
        tracing::info!("  Click workers: {}", self.click_worker_concurrency);
        tracing::info!("  Allocation commit: {:?}", self.commit_strategy());
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn flag_var(name: &str) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn valid_config() -> Config {
        Config {
            redis_url: "redis://localhost:6379/0".to_string(),
            redis_connect_attempts: 30,
            listen_addr: "0.0.0.0:8080".to_string(),
            base_url: "http://localhost:8080".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            click_queue_capacity: 10_000,
            click_worker_concurrency: 4,
            strict_allocation: false,
            behind_proxy: false,
            rate_limit_per_second: 10,
            rate_limit_burst: 100,
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.click_queue_capacity = 50;
        assert!(config.validate().is_err());
        config.click_queue_capacity = 10_000;

        config.click_worker_concurrency = 0;
        assert!(config.validate().is_err());
        config.click_worker_concurrency = 4;

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());

        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.listen_addr = "8080".to_string();
        assert!(config.validate().is_err());
        config.listen_addr = "0.0.0.0:8080".to_string();

        config.redis_url = "memcached://localhost".to_string();
        assert!(config.validate().is_err());
        config.redis_url = "rediss://cache:6380/0".to_string();
        assert!(config.validate().is_ok());

        config.base_url = "localhost:8080".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_commit_strategy() {
        let mut config = valid_config();
        assert_eq!(config.commit_strategy(), CommitStrategy::LastWriterWins);

        config.strict_allocation = true;
        assert_eq!(config.commit_strategy(), CommitStrategy::CreateIfAbsent);
    }

    #[test]
    #[serial]
    fn test_load_redis_url_from_components() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::remove_var("REDIS_URL");
            env::set_var("REDIS_ADDR", "redis-host:6380");
            env::set_var("REDIS_DB", "1");
        }

        assert_eq!(Config::load_redis_url(), "redis://redis-host:6380/1");

        unsafe {
            env::set_var("REDIS_PASSWORD", "secret");
        }
        assert_eq!(Config::load_redis_url(), "redis://:secret@redis-host:6380/1");

        // Empty password is treated as no password
        unsafe {
            env::set_var("REDIS_PASSWORD", "");
        }
        assert_eq!(Config::load_redis_url(), "redis://redis-host:6380/1");

        unsafe {
            env::remove_var("REDIS_ADDR");
            env::remove_var("REDIS_DB");
            env::remove_var("REDIS_PASSWORD");
        }
    }

    #[test]
    #[serial]
    fn test_redis_url_priority() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("REDIS_URL", "redis://from-url:6379/0");
            env::set_var("REDIS_ADDR", "from-components:6379");
        }

        let url = Config::load_redis_url();
        assert!(url.contains("from-url"));
        assert!(!url.contains("from-components"));

        unsafe {
            env::remove_var("REDIS_URL");
            env::remove_var("REDIS_ADDR");
        }
    }

    #[test]
    #[serial]
    fn test_listen_addr_from_server_port() {
        // SAFETY: Tests are run serially
        unsafe {
            env::remove_var("LISTEN");
            env::set_var("SERVER_PORT", "9090");
        }
        assert_eq!(Config::load_listen_addr(), "0.0.0.0:9090");

        unsafe {
            env::set_var("LISTEN", "127.0.0.1:7000");
        }
        assert_eq!(Config::load_listen_addr(), "127.0.0.1:7000");

        unsafe {
            env::remove_var("LISTEN");
            env::remove_var("SERVER_PORT");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_and_trailing_slash() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("BASE_URL", "https://s.example.com/");
            env::set_var("CLICK_QUEUE_CAPACITY", "not-a-number");
            env::set_var("STRICT_ALLOCATION", "TRUE");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.base_url, "https://s.example.com");
        assert_eq!(config.click_queue_capacity, 10_000);
        assert!(config.strict_allocation);

        unsafe {
            env::remove_var("BASE_URL");
            env::remove_var("CLICK_QUEUE_CAPACITY");
            env::remove_var("STRICT_ALLOCATION");
        }
    }
}
