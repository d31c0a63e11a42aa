// src/clock.rs

// clock module definition and implementations

// dependencies
use std::time::{SystemTime, UNIX_EPOCH};

/// Clock trait to abstract time retrieval.
/// Implementors must be thread-safe (Send + Sync).
/// The `now` method returns the current tick as a u64. Leak rates are
/// expressed in units per tick, so the clock decides the time resolution.
/// The Clock trait is used by the Shaper for its clock-driven operations;
/// every such operation also has an `_at(now)` form that bypasses the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<u64, ClockError>;
}

/// Clock error type
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("system clock is set before the Unix epoch")]
    SystemTimeError,
}

/// SystemClock implementation using the system time.
/// Returns whole seconds since the Unix epoch, so one tick is one second.
/// This is the default clock used by the Shaper.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<u64, ClockError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|_| ClockError::SystemTimeError)
    }
}
