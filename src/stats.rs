// src/stats.rs

//! Counters observing submit and tick outcomes. Purely observational.

// dependencies
use crate::bucket::{Admission, DropReason};
use crate::packet::Packet;

/// Point-in-time copy of the shaper's counters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatsSnapshot {
    pub received: u64,
    pub accepted: u64,
    pub dropped: u64,
    pub dropped_overflow: u64,
    pub dropped_queue_full: u64,
    pub rate_changes: u64,
    pub ticks: u64,
    pub sent: u64,
    pub sent_units: u64,
    /// `accepted / received`, or 0 before anything arrived
    pub accept_ratio: f64,
    /// `dropped / received`, or 0 before anything arrived
    pub drop_ratio: f64,
}

/// Monotonic counters; only [`StatsCollector::reset`] brings them back to zero.
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    received: u64,
    accepted: u64,
    dropped_overflow: u64,
    dropped_queue_full: u64,
    rate_changes: u64,
    ticks: u64,
    sent: u64,
    sent_units: u64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_admission(&mut self, admission: Admission) {
        self.received += 1;
        match admission {
            Admission::Accepted => self.accepted += 1,
            Admission::Dropped(DropReason::BucketOverflow) => self.dropped_overflow += 1,
            Admission::Dropped(DropReason::QueueFull) => self.dropped_queue_full += 1,
        }
    }

    pub fn record_rate_change(&mut self) {
        self.rate_changes += 1;
    }

    pub fn record_tick(&mut self, sent: &[Packet]) {
        self.ticks += 1;
        self.sent += sent.len() as u64;
        self.sent_units += sent.iter().map(Packet::size).sum::<u64>();
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let dropped = self.dropped_overflow + self.dropped_queue_full;
        let ratio = |n: u64| {
            if self.received == 0 {
                0.0
            } else {
                n as f64 / self.received as f64
            }
        };
        StatsSnapshot {
            received: self.received,
            accepted: self.accepted,
            dropped,
            dropped_overflow: self.dropped_overflow,
            dropped_queue_full: self.dropped_queue_full,
            rate_changes: self.rate_changes,
            ticks: self.ticks,
            sent: self.sent,
            sent_units: self.sent_units,
            accept_ratio: ratio(self.accepted),
            drop_ratio: ratio(dropped),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
