//! Pacing policies between newsletter batches
//!
//! A pacer is awaited between two batches, never after the last one. Each
//! job gets a fresh pacer from [`build_pacer`], so concurrent broadcasts do
//! not share a budget.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::PacingConfig;

/// Waits until the next batch may start
#[async_trait]
pub trait Pacer: Send + Sync + std::fmt::Debug {
    async fn pause(&self);
}

/// Sleep a fixed delay between batches
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        tracing::debug!("Pausing {:?} before next batch", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}

/// No pacing at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pause(&self) {}
}

#[derive(Debug)]
struct Bucket {
    available: u32,
    last_refill: Instant,
}

/// Token bucket admitting `tokens_per_interval` batches per interval.
///
/// Tokens accrue one at a time, every `interval / tokens_per_interval`, up to
/// `tokens_per_interval`. The bucket starts empty so the first pause waits
/// one token period, like a fixed delay of that length.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    period: Duration,
    bucket: Mutex<Bucket>,
}

impl TokenBucket {
    pub fn new(tokens_per_interval: u32, interval: Duration) -> Self {
        let capacity = tokens_per_interval.max(1);
        Self {
            capacity,
            period: interval / capacity,
            bucket: Mutex::new(Bucket {
                available: 0,
                last_refill: Instant::now(),
            }),
        }
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        if self.period.is_zero() {
            bucket.available = self.capacity;
            bucket.last_refill = now;
            return;
        }
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        let earned = elapsed.as_nanos() / self.period.as_nanos();
        if earned == 0 {
            return;
        }
        let earned = u32::try_from(earned).unwrap_or(u32::MAX);
        bucket.available = bucket.available.saturating_add(earned).min(self.capacity);
        bucket.last_refill += self.period * earned;
        if bucket.available == self.capacity {
            bucket.last_refill = now;
        }
    }
}

#[async_trait]
impl Pacer for TokenBucket {
    async fn pause(&self) {
        let mut bucket = self.bucket.lock().await;
        loop {
            self.refill(&mut bucket, Instant::now());
            if bucket.available > 0 {
                bucket.available -= 1;
                return;
            }
            let ready_at = bucket.last_refill + self.period;
            tracing::debug!(
                "Token bucket empty, waiting {:?}",
                ready_at.saturating_duration_since(Instant::now())
            );
            tokio::time::sleep_until(ready_at).await;
        }
    }
}

/// Build a fresh pacer for one job
pub fn build_pacer(config: &PacingConfig) -> Box<dyn Pacer> {
    match config {
        PacingConfig::FixedDelay { delay_ms } => {
            Box::new(FixedDelay::new(Duration::from_millis(*delay_ms)))
        }
        PacingConfig::TokenBucket {
            tokens_per_interval,
            interval_ms,
        } => Box::new(TokenBucket::new(
            *tokens_per_interval,
            Duration::from_millis(*interval_ms),
        )),
        PacingConfig::None => Box::new(NoPacing),
    }
}
