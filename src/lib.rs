// src/lib.rs

//! # Leaky Shaper
//!
//! A traffic shaper built on the leaky-bucket algorithm. Arriving packets are
//! admitted into a fixed-capacity bucket that drains at a leak rate chosen by
//! a pluggable policy (fixed, fill-adaptive, scheduled, load-based or
//! priority-based). Admitted packets either just occupy the bucket, or wait in
//! a bounded queue drained once per clock tick against a per-tick budget.
//!
//! Time is an abstract `u64` tick supplied by the caller (or by an injected
//! [`Clock`]), so every decision is deterministic.
//!
//! ## Quick Example
//!
//! ```rust
//! use leaky_shaper::{Admission, Packet, Shaper, ShaperConfig, SystemClock};
//!
//! let config = ShaperConfig::new(20, 3).queue(16);
//! let mut shaper = Shaper::with_config(config, SystemClock).unwrap();
//!
//! let decision = shaper.submit_at(Packet::new(1, 5), 0).unwrap();
//! assert_eq!(decision, Admission::Accepted);
//!
//! let sent = shaper.tick_at(1).unwrap();
//! assert_eq!(sent.len(), 1);
//! ```

// private modules
mod bucket;
mod clock;
mod config;
mod driver;
mod errors;
mod load;
mod packet;
mod policy;
mod pool;
mod queue;
mod shaper;
mod stats;

// public API exports
pub use bucket::{Admission, Bucket, DropReason};
pub use clock::{Clock, ClockError, SystemClock};
pub use config::{DrainMode, ShaperConfig};
pub use driver::{StopSignal, TickReport, TickRunner};
pub use errors::{ConfigError, ShaperError};
pub use load::{LoadWalk, MAX_LOAD, clamp_load};
pub use packet::{Packet, Priority};
pub use policy::{
    AdaptivePolicy, FixedPolicy, LeakPolicy, LoadBasedPolicy, PolicyKind, PriorityPolicy,
    RateContext, RateRule, Schedule, ScheduleSlot, ScheduledPolicy,
};
pub use pool::ShaperPool;
pub use queue::BoundedQueue;
pub use shaper::{Shaper, Status};
pub use stats::{StatsCollector, StatsSnapshot};
