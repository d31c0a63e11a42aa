// src/config.rs

//! Configuration types for the shaper

// dependencies
use crate::errors::ConfigError;
use crate::policy::PolicyKind;

/// How admitted traffic leaves the shaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainMode {
    /// Bucket only: the level leaks continuously at the current rate.
    #[default]
    Continuous,
    /// Admitted packets wait in a bounded queue drained once per tick.
    TickQueue { queue_capacity: usize },
}

/// Configuration for shaper behavior
#[derive(Debug, Clone)]
pub struct ShaperConfig {
    pub(crate) capacity: u64,
    pub(crate) base_rate: u64,
    pub(crate) policy: PolicyKind,
    pub(crate) drain: DrainMode,
}

impl ShaperConfig {
    /// Create a new bucket-only configuration with a fixed leak rate
    pub fn new(capacity: u64, base_rate: u64) -> Self {
        Self {
            capacity,
            base_rate,
            policy: PolicyKind::Fixed,
            drain: DrainMode::Continuous,
        }
    }

    /// Builder-style: set bucket capacity (also the per-tick send budget)
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder-style: set base leak rate in units per tick
    pub fn base_rate(mut self, base_rate: u64) -> Self {
        self.base_rate = base_rate;
        self
    }

    /// Builder-style: set the leak-rate policy
    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Builder-style: queue admitted packets and drain them per tick
    pub fn queue(mut self, queue_capacity: usize) -> Self {
        self.drain = DrainMode::TickQueue { queue_capacity };
        self
    }

    /// Builder-style: no queue, the bucket level is the only state
    pub fn bucket_only(mut self) -> Self {
        self.drain = DrainMode::Continuous;
        self
    }

    pub fn drain_mode(&self) -> DrainMode {
        self.drain
    }

    pub fn policy_kind(&self) -> &PolicyKind {
        &self.policy
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        if let DrainMode::TickQueue { queue_capacity: 0 } = self.drain {
            return Err(ConfigError::InvalidQueueCapacity);
        }
        self.policy.validate()
    }
}
