use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const DEFAULT_SUBMISSION_DELAY: Duration = Duration::from_millis(100);

/// Admission control between two job submissions of a batch.
#[async_trait]
pub trait SubmissionPacer: Send + Sync {
    async fn pace(&self);
}

/// Waits a fixed delay after every submission. A zero delay disables pacing.
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelayPacer {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMISSION_DELAY)
    }
}

#[async_trait]
impl SubmissionPacer for FixedDelayPacer {
    async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Token bucket with a burst capacity, refilled at a constant rate.
#[derive(Debug)]
pub struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    rate: f64,
    capacity: u32,
}

impl TokenBucket {
    pub fn new(rate_per_sec: f64, capacity: u32, now: Instant) -> Self {
        let capacity = capacity.max(1);

        Self {
            tokens: capacity as f64,
            last_refill: now,
            rate: rate_per_sec.max(f64::EPSILON),
            capacity,
        }
    }

    /// Takes one token, or returns how long to wait until one is available.
    pub fn try_acquire_at(&mut self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity as f64);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            Some(Duration::from_secs_f64((1.0 - self.tokens) / self.rate))
        }
    }
}

pub struct TokenBucketPacer {
    bucket: Mutex<TokenBucket>,
}

impl TokenBucketPacer {
    pub fn new(rate_per_sec: f64, burst: u32) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(rate_per_sec, burst, Instant::now())),
        }
    }
}

#[async_trait]
impl SubmissionPacer for TokenBucketPacer {
    async fn pace(&self) {
        loop {
            let wait = self.bucket.lock().await.try_acquire_at(Instant::now());

            match wait {
                Some(duration) => tokio::time::sleep(duration).await,
                None => return,
            }
        }
    }
}
