// src/shaper.rs

// leaky-shaper: admission control and tick-bounded draining over a leaky bucket.

// dependencies
use tracing::debug;

use crate::bucket::{Admission, Bucket, DropReason};
use crate::clock::{Clock, SystemClock};
use crate::config::{DrainMode, ShaperConfig};
use crate::errors::{ConfigError, ShaperError};
use crate::load::MAX_LOAD;
use crate::packet::Packet;
use crate::policy::PolicyKind;
use crate::queue::BoundedQueue;
use crate::stats::{StatsCollector, StatsSnapshot};

/// The main Shaper model.
/// C is the clock type, defaulting to SystemClock. The clock only backs the
/// convenience methods; the `_at` methods take the tick explicitly.
/// All mutation goes through `&mut self`, so callers sharing a shaper put it
/// behind one lock (or use a [`ShaperPool`](crate::ShaperPool)).
#[derive(Debug)]
pub struct Shaper<C = SystemClock>
where
    C: Clock,
{
    bucket: Bucket,
    queue: Option<BoundedQueue>,
    stats: StatsCollector,
    load: u8,
    clock: C,
}

/// Read-only view of the shaper.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub level: u64,
    pub capacity: u64,
    pub base_rate: u64,
    pub current_rate: u64,
    pub policy: &'static str,
    pub load: u8,
    pub queue_len: usize,
    /// `None` in bucket-only mode
    pub queue_capacity: Option<usize>,
    pub fill_percent: f64,
    pub stats: StatsSnapshot,
}

impl Shaper<SystemClock> {
    /// Create a shaper driven by the system clock
    pub fn new(config: ShaperConfig) -> Result<Self, ShaperError> {
        Self::with_config(config, SystemClock)
    }
}

impl<C> Shaper<C>
where
    C: Clock,
{
    // method to create a new shaper from a config object
    pub fn with_config(config: ShaperConfig, clock: C) -> Result<Self, ShaperError> {
        config.validate()?;
        Ok(Self::from_validated(&config, clock))
    }

    pub(crate) fn from_validated(config: &ShaperConfig, clock: C) -> Self {
        let queue = match config.drain {
            DrainMode::Continuous => None,
            DrainMode::TickQueue { queue_capacity } => Some(BoundedQueue::new(queue_capacity)),
        };
        Self {
            bucket: Bucket::new(config.capacity, config.base_rate, config.policy.build()),
            queue,
            stats: StatsCollector::new(),
            load: 50,
            clock,
        }
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    /// The packet queue, when running in tick-queue mode
    pub fn queue(&self) -> Option<&BoundedQueue> {
        self.queue.as_ref()
    }

    pub fn drain_mode(&self) -> DrainMode {
        match &self.queue {
            None => DrainMode::Continuous,
            Some(q) => DrainMode::TickQueue {
                queue_capacity: q.capacity(),
            },
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue.as_ref().map_or(0, BoundedQueue::len)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn load(&self) -> u8 {
        self.load
    }

    /// Feed the external load signal, clamped to 100.
    pub fn set_load(&mut self, load: u8) {
        self.load = load.min(MAX_LOAD);
    }

    /// Swap the leak policy. The new rate takes effect on the next submit.
    pub fn set_policy(&mut self, policy: PolicyKind) -> Result<(), ConfigError> {
        policy.validate()?;
        let policy = policy.build();
        debug!(policy = policy.name(), "policy switched");
        self.bucket.set_policy(policy);
        Ok(())
    }

    /// Offer a packet at the clock's current tick
    pub fn submit(&mut self, packet: Packet) -> Result<Admission, ShaperError> {
        let now = self.clock.now()?;
        self.submit_at(packet, now)
    }

    /// Offer a packet at tick `now`.
    ///
    /// The policy is re-evaluated first, then the bucket leaks at the new
    /// rate and the admission check runs on the fresh level. In queue mode
    /// an accepted packet is queued; a full queue drops it before any bucket
    /// space is taken.
    pub fn submit_at(&mut self, packet: Packet, now: u64) -> Result<Admission, ShaperError> {
        if packet.size() == 0 {
            return Err(ShaperError::EmptyPacket { id: packet.id() });
        }
        self.bucket.check_clock(now)?;

        let ctx = self.bucket.rate_context(now, self.load, packet.priority());
        if let Some(old) = self.bucket.update_rate(&ctx) {
            self.stats.record_rate_change();
            debug!(
                policy = self.bucket.policy().name(),
                old,
                new = self.bucket.current_rate(),
                level = ctx.level,
                "leak rate changed"
            );
        }

        self.bucket.leak(now)?;
        let queue_full = self.queue.as_ref().is_some_and(BoundedQueue::is_full);
        let admission = if queue_full {
            Admission::Dropped(DropReason::QueueFull)
        } else {
            self.bucket.try_admit(packet.size(), now)?
        };

        self.stats.record_admission(admission);
        match admission {
            Admission::Accepted => {
                debug!(id = packet.id(), size = packet.size(), level = self.bucket.level(), "accepted");
                if let Some(queue) = self.queue.as_mut() {
                    let queued = queue.enqueue(packet);
                    debug_assert!(queued.is_accepted(), "queue room checked before admission");
                }
            }
            Admission::Dropped(reason) => {
                debug!(id = packet.id(), size = packet.size(), level = self.bucket.level(), ?reason, "dropped");
            }
        }
        Ok(admission)
    }

    /// Run one drain tick at the clock's current tick
    pub fn tick(&mut self) -> Result<Vec<Packet>, ShaperError> {
        let now = self.clock.now()?;
        self.tick_at(now)
    }

    /// Run one drain tick at `now` and return the packets sent.
    ///
    /// The bucket leaks up to `now`. In queue mode the queue is then drained
    /// against a fresh budget equal to the bucket capacity; bucket-only
    /// shapers send nothing.
    pub fn tick_at(&mut self, now: u64) -> Result<Vec<Packet>, ShaperError> {
        self.bucket.leak(now)?;
        let budget = self.bucket.capacity();
        let sent = match self.queue.as_mut() {
            Some(queue) => queue.drain_tick(budget),
            None => Vec::new(),
        };
        self.stats.record_tick(&sent);
        debug!(now, sent = sent.len(), queued = self.queue_len(), "tick");
        Ok(sent)
    }

    /// Snapshot of the current state. Does not leak, so repeated calls agree.
    pub fn status(&self) -> Status {
        let level = self.bucket.level();
        let capacity = self.bucket.capacity();
        Status {
            level,
            capacity,
            base_rate: self.bucket.base_rate(),
            current_rate: self.bucket.current_rate(),
            policy: self.bucket.policy().name(),
            load: self.load,
            queue_len: self.queue_len(),
            queue_capacity: self.queue.as_ref().map(BoundedQueue::capacity),
            fill_percent: level as f64 / capacity as f64 * 100.0,
            stats: self.stats.snapshot(),
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Zero the level, queue and stats. Configuration, policy, load and the
    /// current rate stay.
    pub fn reset(&mut self) {
        self.bucket.reset();
        if let Some(queue) = self.queue.as_mut() {
            queue.clear();
        }
        self.stats.reset();
        debug!("shaper reset");
    }
}
