// src/packet.rs

//! Packet and priority value types

/// Priority class of a packet.
///
/// Only the priority-based leak policy looks at this; every other policy
/// ignores it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    High,
    Medium,
    #[default]
    Normal,
    Low,
}

impl Priority {
    /// Numeric priority code, 1 (high) through 4 (low).
    pub fn code(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Normal => 3,
            Priority::Low => 4,
        }
    }
}

// unknown codes land on Normal, which the priority policy maps to the base rate
impl From<u8> for Priority {
    fn from(code: u8) -> Self {
        match code {
            1 => Priority::High,
            2 => Priority::Medium,
            4 => Priority::Low,
            _ => Priority::Normal,
        }
    }
}

/// An immutable unit of traffic offered to the shaper.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    id: u64,
    size: u64,
    priority: Priority,
    enqueued_at: u64,
}

impl Packet {
    /// Create a packet with normal priority, stamped at tick 0
    pub fn new(id: u64, size: u64) -> Self {
        Self {
            id,
            size,
            priority: Priority::Normal,
            enqueued_at: 0,
        }
    }

    /// Builder-style: set the priority class
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder-style: set the creation tick
    pub fn stamped(mut self, enqueued_at: u64) -> Self {
        self.enqueued_at = enqueued_at;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn enqueued_at(&self) -> u64 {
        self.enqueued_at
    }
}
