// src/errors.rs

// error handling for the shaper types

// dependencies
use thiserror::Error;

use crate::clock::ClockError;

/// Error type for invalid shaper configuration. Fatal to construction.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("bucket capacity must be positive")]
    InvalidCapacity,
    #[error("queue capacity must be positive")]
    InvalidQueueCapacity,
    #[error("invalid schedule table: {0}")]
    InvalidSchedule(&'static str),
}

/// Error type for shaper operations.
///
/// Drops are not errors; they come back as [`Admission::Dropped`](crate::Admission).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaperError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("clock went backwards: now {now} is older than last leak at {last_leak_at}")]
    ClockRegression { now: u64, last_leak_at: u64 },
    #[error("dequeue on an empty queue")]
    EmptyQueue,
    #[error("packet {id} has zero size")]
    EmptyPacket { id: u64 },
    #[error("clock error occurred: {0}")]
    Clock(#[from] ClockError),
}
