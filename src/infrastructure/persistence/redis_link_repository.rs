//! Redis implementation of the link repository.
//!
//! # Key layout
//!
//! - `url:<code>` - hash with `original_url`, `created_at` (RFC 3339), `clicks`
//! - `url:codes` - set of every active code

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use serde_json::json;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, warn};

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::mask::mask_connection_string;

const KEY_PREFIX: &str = "url:";
const CODES_KEY: &str = "url:codes";

const FIELD_URL: &str = "original_url";
const FIELD_CREATED_AT: &str = "created_at";
const FIELD_CLICKS: &str = "clicks";

/// Increments `clicks` only if the hash still exists. Returns 1 on increment.
const INCREMENT_IF_EXISTS: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
    redis.call('HINCRBY', KEYS[1], 'clicks', 1)
    return 1
end
return 0
";

/// Writes the hash and index entry only if the hash is absent. Returns 1 on write.
const SAVE_IF_ABSENT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return 0
end
redis.call('HSET', KEYS[1], 'original_url', ARGV[1], 'created_at', ARGV[2], 'clicks', ARGV[3])
redis.call('SADD', KEYS[2], ARGV[4])
return 1
";

/// Redis-backed link store.
///
/// Uses a `ConnectionManager`, which multiplexes one connection and
/// reconnects transparently; clones are cheap and share it.
#[derive(Clone)]
pub struct RedisLinkRepository {
    conn: ConnectionManager,
    increment_script: Script,
    save_if_absent_script: Script,
}

impl RedisLinkRepository {
    /// Wraps an established connection.
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            increment_script: Script::new(INCREMENT_IF_EXISTS),
            save_if_absent_script: Script::new(SAVE_IF_ABSENT),
        }
    }

    /// Connects to Redis and verifies the connection with a PING.
    ///
    /// Makes up to `attempts` tries, one second apart, so the service can
    /// start before Redis is ready.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the URL is invalid or every attempt fails.
    pub async fn connect(redis_url: &str, attempts: usize) -> Result<Self, AppError> {
        let client = Client::open(redis_url).map_err(|e| {
            AppError::storage(
                "Failed to create Redis client",
                json!({ "reason": e.to_string() }),
            )
        })?;

        info!("Connecting to Redis at {}", mask_connection_string(redis_url));

        let attempts = attempts.max(1);
        let strategy = FixedInterval::new(Duration::from_secs(1)).take(attempts - 1);
        let mut attempt = 0;

        let conn = Retry::start(strategy, || {
            attempt += 1;
            let client = client.clone();
            let current = attempt;
            async move {
                let result = Self::open(client).await;
                if let Err(e) = &result {
                    warn!("Waiting for Redis... attempt {}/{}: {}", current, attempts, e);
                }
                result
            }
        })
        .await
        .map_err(|e| {
            AppError::storage(
                format!("Failed to connect to Redis after {attempts} attempts"),
                json!({ "reason": e.to_string() }),
            )
        })?;

        info!("Connected to Redis");

        Ok(Self::new(conn))
    }

    async fn open(client: Client) -> redis::RedisResult<ConnectionManager> {
        let manager = ConnectionManager::new(client).await?;
        let mut probe = manager.clone();
        probe.ping::<()>().await?;
        Ok(manager)
    }

    fn build_key(code: &str) -> String {
        format!("{KEY_PREFIX}{code}")
    }

    fn format_timestamp(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn parse_record(code: &str, mut fields: HashMap<String, String>) -> Result<Link, AppError> {
        let corrupted = |field: &str| {
            AppError::storage(
                "Corrupted link record",
                json!({ "code": code, "field": field }),
            )
        };

        let original_url = fields
            .remove(FIELD_URL)
            .ok_or_else(|| corrupted(FIELD_URL))?;

        let created_at = fields
            .get(FIELD_CREATED_AT)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| corrupted(FIELD_CREATED_AT))?;

        let clicks = match fields.get(FIELD_CLICKS) {
            Some(v) => v.parse().map_err(|_| corrupted(FIELD_CLICKS))?,
            None => 0,
        };

        Ok(Link::new(code.to_string(), original_url, created_at, clicks))
    }
}

#[async_trait]
impl LinkRepository for RedisLinkRepository {
    async fn save(&self, link: &Link) -> Result<(), AppError> {
        let key = Self::build_key(&link.short_code);
        let created_at = Self::format_timestamp(&link.created_at);
        let clicks = link.clicks.to_string();
        let mut conn = self.conn.clone();

        redis::pipe()
            .atomic()
            .hset_multiple(
                &key,
                &[
                    (FIELD_URL, link.original_url.as_str()),
                    (FIELD_CREATED_AT, created_at.as_str()),
                    (FIELD_CLICKS, clicks.as_str()),
                ],
            )
            .ignore()
            .sadd(CODES_KEY, &link.short_code)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        debug!(code = %link.short_code, "Link saved");
        Ok(())
    }

    async fn save_if_absent(&self, link: &Link) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();

        let written: i64 = self
            .save_if_absent_script
            .key(Self::build_key(&link.short_code))
            .key(CODES_KEY)
            .arg(&link.original_url)
            .arg(Self::format_timestamp(&link.created_at))
            .arg(link.clicks)
            .arg(&link.short_code)
            .invoke_async(&mut conn)
            .await?;

        Ok(written == 1)
    }

    async fn find_by_code(&self, code: &str) -> Result<Link, AppError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(Self::build_key(code)).await?;

        if fields.is_empty() {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }

        Self::parse_record(code, fields)
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(Self::build_key(code)).await?;
        Ok(exists)
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();

        let incremented: i64 = self
            .increment_script
            .key(Self::build_key(code))
            .invoke_async(&mut conn)
            .await?;

        if incremented == 0 {
            debug!(code, "Click for missing link ignored");
        }

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Link>, AppError> {
        let mut conn = self.conn.clone();
        let codes: Vec<String> = conn.smembers(CODES_KEY).await?;

        let mut links = Vec::with_capacity(codes.len());
        for code in codes {
            match self.find_by_code(&code).await {
                Ok(link) => links.push(link),
                Err(e) => debug!(code, error = %e, "Skipping unresolvable code"),
            }
        }

        Ok(links)
    }

    async fn delete(&self, code: &str) -> Result<(), AppError> {
        if !self.exists(code).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }

        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .del(Self::build_key(code))
            .ignore()
            .srem(CODES_KEY, code)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        debug!(code, "Link deleted");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}
