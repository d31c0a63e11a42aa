// src/pool.rs

// many independent shapers keyed by flow

// dependencies
use crate::bucket::Admission;
use crate::clock::{Clock, SystemClock};
use crate::config::ShaperConfig;
use crate::errors::ShaperError;
use crate::packet::Packet;
use crate::shaper::{Shaper, Status};
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// A set of shapers, one per flow, all built from the same config.
/// K identifies the flow (e.g., a connection id or an address).
/// C is the clock type, defaulting to SystemClock; each flow gets a clone.
/// Flows are created on first submit. Every operation on a flow holds that
/// flow's map entry for its whole duration, so submits and ticks for one
/// flow serialize while different flows proceed independently.
#[derive(Debug)]
pub struct ShaperPool<K, C = SystemClock>
where
    K: Hash + Eq + Clone,
    C: Clock + Clone,
{
    config: ShaperConfig,
    flows: Arc<DashMap<K, Shaper<C>>>,
    clock: C,
}

impl<K, C> ShaperPool<K, C>
where
    K: Hash + Eq + Clone,
    C: Clock + Clone,
{
    pub fn with_config(config: ShaperConfig, clock: C) -> Result<Self, ShaperError> {
        config.validate()?;
        Ok(Self {
            config,
            flows: Arc::new(DashMap::new()),
            clock,
        })
    }

    pub fn config(&self) -> &ShaperConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn contains(&self, flow: &K) -> bool {
        self.flows.contains_key(flow)
    }

    pub fn submit(&self, flow: K, packet: Packet) -> Result<Admission, ShaperError> {
        let now = self.clock.now()?;
        self.submit_at(flow, packet, now)
    }

    pub fn submit_at(&self, flow: K, packet: Packet, now: u64) -> Result<Admission, ShaperError> {
        self.flows
            .entry(flow)
            .or_insert_with(|| Shaper::from_validated(&self.config, self.clock.clone()))
            .submit_at(packet, now)
    }

    pub fn tick(&self, flow: &K) -> Result<Vec<Packet>, ShaperError> {
        let now = self.clock.now()?;
        self.tick_at(flow, now)
    }

    /// Tick one flow; an unknown flow has nothing to send.
    pub fn tick_at(&self, flow: &K, now: u64) -> Result<Vec<Packet>, ShaperError> {
        match self.flows.get_mut(flow) {
            Some(mut shaper) => shaper.tick_at(now),
            None => Ok(Vec::new()),
        }
    }

    /// Tick every flow, returning the flows that sent something.
    ///
    /// Every flow's clock is checked before any queue is drained, so a
    /// regression on one flow fails the sweep with no flow touched.
    pub fn tick_all_at(&self, now: u64) -> Result<Vec<(K, Vec<Packet>)>, ShaperError> {
        for entry in self.flows.iter() {
            entry.value().bucket().check_clock(now)?;
        }

        let mut out = Vec::new();
        for mut entry in self.flows.iter_mut() {
            // a concurrent submit may have moved this flow past `now` since the
            // check; tick_at fails before draining, so skip it and keep the rest
            match entry.value_mut().tick_at(now) {
                Ok(sent) if !sent.is_empty() => out.push((entry.key().clone(), sent)),
                Ok(_) => {}
                Err(err) => debug!(%err, "flow skipped in tick sweep"),
            }
        }
        Ok(out)
    }

    pub fn status(&self, flow: &K) -> Option<Status> {
        self.flows.get(flow).map(|shaper| shaper.status())
    }

    /// Reset one flow; returns false when the flow is unknown.
    pub fn reset(&self, flow: &K) -> bool {
        match self.flows.get_mut(flow) {
            Some(mut shaper) => {
                shaper.reset();
                true
            }
            None => false,
        }
    }

    /// Feed the same load reading to every flow.
    pub fn set_load_all(&self, load: u8) {
        for mut entry in self.flows.iter_mut() {
            entry.value_mut().set_load(load);
        }
    }

    // method to drop flows that have been quiet for longer than `max_idle` ticks
    pub fn cleanup_idle_flows(&self, max_idle: u64) -> Result<usize, ShaperError> {
        let now = self.clock.now()?;
        Ok(self.cleanup_idle_flows_at(max_idle, now))
    }

    /// Remove flows with an empty queue whose last activity is older than
    /// `now - max_idle`. Returns how many were removed.
    pub fn cleanup_idle_flows_at(&self, max_idle: u64, now: u64) -> usize {
        let before = self.flows.len();
        self.flows.retain(|_, shaper| {
            let busy = shaper.queue_len() > 0;
            let recent = shaper
                .bucket()
                .last_leak_at()
                .is_some_and(|last| last.saturating_add(max_idle) >= now);
            busy || recent
        });
        let removed = before.saturating_sub(self.flows.len());
        if removed > 0 {
            debug!(removed, remaining = self.flows.len(), "idle flows removed");
        }
        removed
    }
}
