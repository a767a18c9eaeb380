//! Per-client rate limiting using a token bucket.

use anyhow::{Context, Result};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor,
};

/// Creates a rate limiter keyed by `key_extractor`.
///
/// - **Rate**: `per_second` tokens replenished per second (1..=1000)
/// - **Burst**: `burst` requests allowed back to back
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// Use `PeerIpKeyExtractor` for direct exposure and `SmartIpKeyExtractor`
/// behind a trusted reverse proxy.
///
/// # Errors
///
/// Returns an error if the quota is invalid (zero rate or burst).
pub fn layer<K>(
    key_extractor: K,
    per_second: u64,
    burst: u32,
) -> Result<GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>>
where
    K: KeyExtractor,
{
    let replenish_ms = 1000 / per_second.clamp(1, 1000);

    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(key_extractor)
        .per_millisecond(replenish_ms)
        .burst_size(burst)
        .finish()
        .context("Invalid rate limit configuration")?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}
