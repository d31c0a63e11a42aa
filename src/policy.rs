// src/policy.rs

//! Leak-rate policies.
//!
//! A policy is a pure function from the observable bucket state to a leak
//! rate. The shaper re-evaluates the active policy on every submit and the
//! bucket only ever sees the resulting number, so adding a policy never
//! touches the bucket.

// dependencies
use std::fmt;
use std::sync::Arc;

use crate::errors::ConfigError;
use crate::packet::Priority;

/// Snapshot of the state a policy may base its rate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateContext {
    pub level: u64,
    pub capacity: u64,
    pub base_rate: u64,
    pub now: u64,
    /// Externally supplied load, 0..=100
    pub load: u8,
    /// Priority of the packet being submitted
    pub priority: Priority,
}

/// A strategy computing the bucket's current leak rate.
pub trait LeakPolicy: fmt::Debug + Send + Sync {
    /// Short name used in status reports and logs.
    fn name(&self) -> &'static str;

    /// Leak rate in units per tick. Zero is valid and stops the leak.
    fn rate(&self, ctx: &RateContext) -> u64;
}

/// How one band of a policy derives its rate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateRule {
    /// `base * num / den`, truncated
    Scaled { num: u64, den: u64 },
    /// A fixed rate regardless of base
    Absolute(u64),
}

impl RateRule {
    pub const fn times(num: u64) -> Self {
        RateRule::Scaled { num, den: 1 }
    }

    pub const fn ratio(num: u64, den: u64) -> Self {
        RateRule::Scaled { num, den }
    }

    pub fn apply(self, base: u64) -> u64 {
        match self {
            RateRule::Scaled { den: 0, .. } => 0,
            RateRule::Scaled { num, den } => base.saturating_mul(num) / den,
            RateRule::Absolute(rate) => rate,
        }
    }
}

/// Always the base rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPolicy;

impl LeakPolicy for FixedPolicy {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn rate(&self, ctx: &RateContext) -> u64 {
        ctx.base_rate
    }
}

/// Scales the rate with the fill ratio: the fuller the bucket, the faster it drains.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptivePolicy;

impl LeakPolicy for AdaptivePolicy {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn rate(&self, ctx: &RateContext) -> u64 {
        // level/capacity compared against tenths, exactly
        let level = u128::from(ctx.level) * 10;
        let cap = u128::from(ctx.capacity);
        let rule = if level > cap * 8 {
            RateRule::times(3)
        } else if level > cap * 6 {
            RateRule::times(2)
        } else if level > cap * 4 {
            RateRule::ratio(3, 2)
        } else if level < cap * 2 {
            RateRule::ratio(7, 10)
        } else {
            RateRule::times(1)
        };
        rule.apply(ctx.base_rate)
    }
}

/// One entry of a [`Schedule`]: from `offset` until the next slot, use `rule`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub offset: u64,
    pub rule: RateRule,
}

/// A repeating table of rate rules indexed by `now % period`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    period: u64,
    slots: Vec<ScheduleSlot>,
}

impl Schedule {
    /// Build a schedule from `(offset, rule)` pairs. Call [`Schedule::validate`]
    /// (or let the config do it) before use.
    pub fn new(period: u64, slots: impl IntoIterator<Item = (u64, RateRule)>) -> Self {
        Self {
            period,
            slots: slots
                .into_iter()
                .map(|(offset, rule)| ScheduleSlot { offset, rule })
                .collect(),
        }
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn slots(&self) -> &[ScheduleSlot] {
        &self.slots
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(ConfigError::InvalidSchedule("period must be positive"));
        }
        match self.slots.first() {
            None => return Err(ConfigError::InvalidSchedule("no slots")),
            Some(first) if first.offset != 0 => {
                return Err(ConfigError::InvalidSchedule("first slot must start at 0"));
            }
            Some(_) => {}
        }
        if self.slots.windows(2).any(|w| w[0].offset >= w[1].offset) {
            return Err(ConfigError::InvalidSchedule(
                "slot offsets must be strictly increasing",
            ));
        }
        if self.slots.iter().any(|s| s.offset >= self.period) {
            return Err(ConfigError::InvalidSchedule(
                "slot offset outside the period",
            ));
        }
        Ok(())
    }

    /// The rule in force at `now`.
    pub fn rule_at(&self, now: u64) -> Option<RateRule> {
        if self.period == 0 {
            return None;
        }
        let slot = now % self.period;
        self.slots
            .iter()
            .take_while(|s| s.offset <= slot)
            .last()
            .map(|s| s.rule)
    }
}

impl Default for Schedule {
    /// A 60-tick cycle: peak, business, off-peak, maintenance.
    fn default() -> Self {
        Schedule::new(
            60,
            [
                (0, RateRule::times(2)),
                (15, RateRule::times(1)),
                (30, RateRule::ratio(6, 10)),
                (45, RateRule::Absolute(1)),
            ],
        )
    }
}

/// Picks the rate from a repeating schedule table.
#[derive(Debug, Clone, Default)]
pub struct ScheduledPolicy {
    schedule: Schedule,
}

impl ScheduledPolicy {
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}

impl LeakPolicy for ScheduledPolicy {
    fn name(&self) -> &'static str {
        "scheduled"
    }

    fn rate(&self, ctx: &RateContext) -> u64 {
        self.schedule
            .rule_at(ctx.now)
            .map_or(ctx.base_rate, |rule| rule.apply(ctx.base_rate))
    }
}

/// Backs off as the external load rises.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadBasedPolicy;

impl LeakPolicy for LoadBasedPolicy {
    fn name(&self) -> &'static str {
        "load-based"
    }

    fn rate(&self, ctx: &RateContext) -> u64 {
        let rule = match ctx.load {
            81.. => RateRule::Absolute(1),
            61..=80 => RateRule::ratio(7, 10),
            41..=60 => RateRule::times(1),
            21..=40 => RateRule::ratio(3, 2),
            _ => RateRule::times(2),
        };
        rule.apply(ctx.base_rate)
    }
}

/// Keyed by the priority of the packet being submitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityPolicy;

impl LeakPolicy for PriorityPolicy {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn rate(&self, ctx: &RateContext) -> u64 {
        let rule = match ctx.priority {
            Priority::High => RateRule::times(3),
            Priority::Medium => RateRule::times(2),
            Priority::Normal => RateRule::times(1),
            Priority::Low => RateRule::ratio(1, 2),
        };
        rule.apply(ctx.base_rate)
    }
}

/// Selects the leak policy a shaper runs with.
#[derive(Debug, Clone, Default)]
pub enum PolicyKind {
    #[default]
    Fixed,
    Adaptive,
    Scheduled(Schedule),
    LoadBased,
    Priority,
    Custom(Arc<dyn LeakPolicy>),
}

impl PolicyKind {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            PolicyKind::Scheduled(schedule) => schedule.validate(),
            _ => Ok(()),
        }
    }

    pub(crate) fn build(&self) -> Arc<dyn LeakPolicy> {
        match self {
            PolicyKind::Fixed => Arc::new(FixedPolicy),
            PolicyKind::Adaptive => Arc::new(AdaptivePolicy),
            PolicyKind::Scheduled(schedule) => Arc::new(ScheduledPolicy::new(schedule.clone())),
            PolicyKind::LoadBased => Arc::new(LoadBasedPolicy),
            PolicyKind::Priority => Arc::new(PriorityPolicy),
            PolicyKind::Custom(policy) => Arc::clone(policy),
        }
    }
}
