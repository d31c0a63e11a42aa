// src/bucket.rs

//! The leaky bucket: a level in `0..=capacity` that drains at the current
//! leak rate and admits packets that fit.

// dependencies
use std::sync::Arc;

use tracing::{trace, warn};

use crate::errors::ShaperError;
use crate::packet::Priority;
use crate::policy::{LeakPolicy, RateContext};

/// Why a packet was turned away.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The bucket level plus the packet size would exceed capacity.
    BucketOverflow,
    /// The bounded queue is at capacity.
    QueueFull,
}

/// Outcome of offering a packet to the bucket, queue or shaper.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Admission {
    Accepted,
    Dropped(DropReason),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted)
    }
}

/// Leaky bucket state plus the policy that governs its leak rate.
#[derive(Debug, Clone)]
pub struct Bucket {
    capacity: u64,
    level: u64,
    base_rate: u64,
    current_rate: u64,
    last_leak_at: Option<u64>,
    policy: Arc<dyn LeakPolicy>,
}

impl Bucket {
    /// An empty bucket leaking at `base_rate`. Capacity is validated by the config.
    pub fn new(capacity: u64, base_rate: u64, policy: Arc<dyn LeakPolicy>) -> Self {
        Self {
            capacity,
            level: 0,
            base_rate,
            current_rate: base_rate,
            last_leak_at: None,
            policy,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn level(&self) -> u64 {
        self.level
    }

    pub fn base_rate(&self) -> u64 {
        self.base_rate
    }

    pub fn current_rate(&self) -> u64 {
        self.current_rate
    }

    pub fn last_leak_at(&self) -> Option<u64> {
        self.last_leak_at
    }

    pub fn policy(&self) -> &Arc<dyn LeakPolicy> {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: Arc<dyn LeakPolicy>) {
        self.policy = policy;
    }

    /// Fail if `now` is older than the last leak.
    pub fn check_clock(&self, now: u64) -> Result<(), ShaperError> {
        match self.last_leak_at {
            Some(last_leak_at) if now < last_leak_at => {
                warn!(now, last_leak_at, "clock regression");
                Err(ShaperError::ClockRegression { now, last_leak_at })
            }
            _ => Ok(()),
        }
    }

    /// Drain `elapsed * current_rate` units (at most the level) and move the
    /// leak mark to `now`. Returns the amount drained.
    pub fn leak(&mut self, now: u64) -> Result<u64, ShaperError> {
        self.check_clock(now)?;
        let Some(last) = self.last_leak_at else {
            // first observation anchors the clock
            self.last_leak_at = Some(now);
            return Ok(0);
        };
        let elapsed = now - last;
        if elapsed == 0 {
            return Ok(0);
        }
        let drained = self.level.min(elapsed.saturating_mul(self.current_rate));
        self.level -= drained;
        self.last_leak_at = Some(now);
        trace!(elapsed, drained, level = self.level, rate = self.current_rate, "leak");
        Ok(drained)
    }

    /// Whether `size` more units fit right now, without leaking.
    pub fn fits(&self, size: u64) -> bool {
        size <= self.capacity - self.level
    }

    /// Leak up to `now`, then admit `size` units if they fit.
    pub fn try_admit(&mut self, size: u64, now: u64) -> Result<Admission, ShaperError> {
        self.leak(now)?;
        if self.fits(size) {
            self.level += size;
            Ok(Admission::Accepted)
        } else {
            Ok(Admission::Dropped(DropReason::BucketOverflow))
        }
    }

    /// State handed to the policy.
    pub fn rate_context(&self, now: u64, load: u8, priority: Priority) -> RateContext {
        RateContext {
            level: self.level,
            capacity: self.capacity,
            base_rate: self.base_rate,
            now,
            load,
            priority,
        }
    }

    /// Re-evaluate the policy; returns `Some(old_rate)` when the rate changed.
    pub fn update_rate(&mut self, ctx: &RateContext) -> Option<u64> {
        let rate = self.policy.rate(ctx);
        if rate == self.current_rate {
            return None;
        }
        let old = std::mem::replace(&mut self.current_rate, rate);
        Some(old)
    }

    /// Empty the bucket. The current rate and the leak mark are kept.
    pub fn reset(&mut self) {
        self.level = 0;
    }
}
