//! Rate limiter initialization.
//!
//! This module provides the shared rate limiter that paces every worker to the
//! configured aggregate request rate.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

use crate::error_handling::ConfigError;

/// Smooth rate limiter for controlling aggregate request rate.
///
/// Each permit is assigned a slot on a virtual schedule spaced `1 / qps` apart.
/// `acquire` reserves the next free slot and sleeps until it arrives, so
/// concurrent callers queue behind one another instead of being dropped.
///
/// # Behavior
///
/// - Permits are never issued closer together than the minimum interval
/// - An idle limiter hands out one permit immediately and banks nothing more
/// - The lock is held only to reserve a slot, never while waiting for it
#[derive(Debug)]
pub struct RateLimiter {
    qps: u32,
    interval: Duration,
    next_permit: Mutex<Instant>,
}

impl RateLimiter {
    /// Creates a limiter issuing `qps` permits per second.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidQps` if `qps` is zero.
    pub fn new(qps: u32) -> Result<Self, ConfigError> {
        if qps == 0 {
            return Err(ConfigError::InvalidQps);
        }
        Ok(Self {
            qps,
            interval: Duration::from_secs(1) / qps,
            next_permit: Mutex::new(Instant::now()),
        })
    }

    /// Waits until a permit is available.
    pub async fn acquire(&self) {
        let slot = self.reserve();
        sleep_until(slot).await;
    }

    /// Reserves the next free slot and returns the instant it opens.
    fn reserve(&self) -> Instant {
        let now = Instant::now();
        let mut next = self
            .next_permit
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let slot = (*next).max(now);
        *next = slot + self.interval;
        slot
    }

    /// Configured permits per second.
    pub fn qps(&self) -> u32 {
        self.qps
    }

    /// Minimum spacing between two permits.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Initializes the shared rate limiter.
///
/// # Arguments
///
/// * `qps` - Target aggregate requests per second (must be positive)
///
/// # Returns
///
/// An `Arc<RateLimiter>` to be shared by every worker.
pub fn init_rate_limiter(qps: u32) -> Result<Arc<RateLimiter>, ConfigError> {
    Ok(Arc::new(RateLimiter::new(qps)?))
}
