// src/load.rs

//! Simulated system load for the load-based policy.

// dependencies
use rand::Rng;

/// Highest load value; anything above is clamped.
pub const MAX_LOAD: u8 = 100;

/// Clamp a proposed load reading into `0..=100`.
pub fn clamp_load(proposed: i64) -> u8 {
    proposed.clamp(0, i64::from(MAX_LOAD)) as u8
}

/// A bounded random walk over `0..=100`.
///
/// Each step moves the load by a uniform delta in `-max_step..=max_step`
/// and clamps. Randomness comes from the injected generator only, so a
/// seeded generator replays the same walk.
#[derive(Debug, Clone)]
pub struct LoadWalk<R> {
    rng: R,
    load: u8,
    max_step: u8,
}

impl<R: Rng> LoadWalk<R> {
    /// A walk starting at 50 with steps of up to ±10.
    pub fn new(rng: R) -> Self {
        Self::starting_at(rng, 50)
    }

    pub fn starting_at(rng: R, load: u8) -> Self {
        Self {
            rng,
            load: load.min(MAX_LOAD),
            max_step: 10,
        }
    }

    /// Builder-style: set the largest step in either direction
    pub fn max_step(mut self, max_step: u8) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn load(&self) -> u8 {
        self.load
    }

    /// Advance one step and return the new load.
    pub fn step(&mut self) -> u8 {
        let span = i64::from(self.max_step);
        let delta = self.rng.gen_range(-span..=span);
        self.load = clamp_load(i64::from(self.load) + delta);
        self.load
    }
}

impl<R: Rng> Iterator for LoadWalk<R> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        Some(self.step())
    }
}
