//! Failure policy for refreshing cached server state after a mutation.
//!
//! The default waits for the mutation's own completion and invalidates once.
//! Backends known to be eventually consistent can opt into a bounded
//! exponential backoff. The fixed millisecond schedule survives only as a
//! compatibility option and is capped like the others.

use std::{str::FromStr, sync::Arc, time::Duration};

use fitcoach_adapters::{AdapterError, Envelope};
use serde_json::Value;
use tracing::{debug, info};

use super::cache::{KeyMatcher, ServerCache};

pub const LEGACY_SCHEDULE_MS: [u64; 5] = [0, 500, 1000, 2000, 3000];

const MAX_BACKOFF_SHIFT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationStrategy {
    AwaitThenInvalidate,
    ExponentialBackoff,
    FixedSchedule,
}

impl FromStr for InvalidationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "await" | "await-then-invalidate" => Ok(Self::AwaitThenInvalidate),
            "backoff" | "exponential-backoff" => Ok(Self::ExponentialBackoff),
            "fixed" | "fixed-schedule" => Ok(Self::FixedSchedule),
            other => Err(format!("unknown invalidation strategy {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailurePolicy {
    pub strategy: InvalidationStrategy,
    pub max_attempts: u32,
    /// Base delay for backoff, absolute offsets for a fixed schedule.
    pub delays: Vec<Duration>,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            strategy: InvalidationStrategy::AwaitThenInvalidate,
            max_attempts: 1,
            delays: Vec::new(),
        }
    }
}

impl FailurePolicy {
    pub fn for_strategy(strategy: InvalidationStrategy, max_attempts: u32, base_delay: Duration) -> Self {
        match strategy {
            InvalidationStrategy::AwaitThenInvalidate => Self::default(),
            InvalidationStrategy::ExponentialBackoff => Self {
                strategy,
                max_attempts,
                delays: vec![base_delay],
            },
            InvalidationStrategy::FixedSchedule => Self::legacy(max_attempts),
        }
    }

    pub fn legacy(max_attempts: u32) -> Self {
        Self {
            strategy: InvalidationStrategy::FixedSchedule,
            max_attempts,
            delays: LEGACY_SCHEDULE_MS.iter().map(|ms| Duration::from_millis(*ms)).collect(),
        }
    }

    /// Offsets, measured from mutation completion, at which invalidation runs.
    ///
    /// Never longer than `max_attempts` and never empty.
    pub fn schedule(&self) -> Vec<Duration> {
        let cap = self.max_attempts.max(1) as usize;

        match self.strategy {
            InvalidationStrategy::AwaitThenInvalidate => vec![Duration::ZERO],
            InvalidationStrategy::FixedSchedule => {
                let mut offsets: Vec<Duration> = self.delays.iter().take(cap).copied().collect();
                if offsets.is_empty() {
                    offsets.push(Duration::ZERO);
                }
                offsets.sort();
                offsets
            }
            InvalidationStrategy::ExponentialBackoff => {
                let base = self.delays.first().copied().unwrap_or(Duration::ZERO);
                let mut offsets = Vec::with_capacity(cap);
                let mut offset = Duration::ZERO;
                offsets.push(offset);

                for attempt in 0..cap.saturating_sub(1) as u32 {
                    let gap = base.saturating_mul(1 << attempt.min(MAX_BACKOFF_SHIFT));
                    offset = offset.saturating_add(gap);
                    offsets.push(offset);
                }
                offsets
            }
        }
    }
}

/// Submits a mutation and refreshes the keys selected by `matcher`.
///
/// Invalidation only happens after the backend confirmed the mutation. A
/// logical failure is returned untouched and leaves the cache alone.
pub async fn apply_mutation(
    cache: &Arc<ServerCache>,
    path: &str,
    body: Value,
    matcher: KeyMatcher,
    policy: &FailurePolicy,
) -> Result<Envelope, AdapterError> {
    let envelope = cache.backend().mutate(path, body, cache.credential()).await?;

    if !envelope.is_success() {
        info!(
            "Mutation of {path} rejected ({}): {}",
            envelope.status_code, envelope.message
        );
        return Ok(envelope);
    }

    let mut offsets = policy.schedule().into_iter().peekable();
    if offsets.peek() == Some(&Duration::ZERO) {
        offsets.next();
        cache.invalidate(&matcher);
    }

    let remaining: Vec<Duration> = offsets.collect();
    if !remaining.is_empty() {
        debug!("Scheduling {} follow-up invalidation(s) for {path}", remaining.len());
        tokio::spawn(follow_up(Arc::downgrade(cache), matcher, remaining));
    }

    Ok(envelope)
}

async fn follow_up(cache: std::sync::Weak<ServerCache>, matcher: KeyMatcher, offsets: Vec<Duration>) {
    let mut elapsed = Duration::ZERO;

    for offset in offsets {
        tokio::time::sleep(offset.saturating_sub(elapsed)).await;
        elapsed = offset;

        let Some(cache) = cache.upgrade() else {
            return;
        };
        cache.invalidate(&matcher);
    }
}
