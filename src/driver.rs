// src/driver.rs

//! Drives drain ticks until the queue empties or a stop is requested.

// dependencies
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::clock::Clock;
use crate::errors::ShaperError;
use crate::packet::Packet;
use crate::shaper::Shaper;

/// Cooperative stop flag shared between a tick loop and whoever may cancel it.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// What one tick sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 1-based tick number within the run
    pub index: u64,
    pub at: u64,
    pub sent: Vec<Packet>,
}

/// Issues ticks at `start`, `start + interval`, ... on a queued shaper.
#[derive(Debug, Clone, Copy)]
pub struct TickRunner {
    start: u64,
    interval: u64,
}

impl TickRunner {
    pub fn new(start: u64, interval: u64) -> Self {
        Self { start, interval }
    }

    /// Tick until the queue is empty or `stop` is raised.
    ///
    /// The signal is checked before each tick; a tick already running always
    /// completes. Every admitted packet fits in one tick's budget, so each
    /// tick on a non-empty queue sends at least one packet and the loop ends.
    pub fn run<C: Clock>(
        &self,
        shaper: &mut Shaper<C>,
        stop: &StopSignal,
    ) -> Result<Vec<TickReport>, ShaperError> {
        let mut reports = Vec::new();
        let mut at = self.start;
        while shaper.queue_len() > 0 {
            if stop.is_stopped() {
                debug!(ticks = reports.len(), queued = shaper.queue_len(), "tick loop stopped");
                break;
            }
            let sent = shaper.tick_at(at)?;
            if sent.is_empty() {
                // head does not fit any budget; nothing will ever move
                break;
            }
            reports.push(TickReport {
                index: reports.len() as u64 + 1,
                at,
                sent,
            });
            at = at.saturating_add(self.interval);
        }
        Ok(reports)
    }
}
