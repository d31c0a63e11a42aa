// src/queue.rs

//! Fixed-capacity FIFO of packets and the tick-bounded drain over it.

// dependencies
use std::collections::VecDeque;

use tracing::trace;

use crate::bucket::{Admission, DropReason};
use crate::errors::ShaperError;
use crate::packet::Packet;

/// FIFO of packets that never grows past its capacity.
#[derive(Debug, Clone)]
pub struct BoundedQueue {
    packets: VecDeque<Packet>,
    capacity: usize,
}

impl BoundedQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            packets: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.packets.len() >= self.capacity
    }

    /// Append at the tail; a full queue drops the packet and stays unchanged.
    pub fn enqueue(&mut self, packet: Packet) -> Admission {
        if self.is_full() {
            return Admission::Dropped(DropReason::QueueFull);
        }
        self.packets.push_back(packet);
        Admission::Accepted
    }

    pub fn peek(&self) -> Option<&Packet> {
        self.packets.front()
    }

    pub fn dequeue(&mut self) -> Result<Packet, ShaperError> {
        self.packets.pop_front().ok_or(ShaperError::EmptyQueue)
    }

    pub fn clear(&mut self) {
        self.packets.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Packet> {
        self.packets.iter()
    }

    /// Run one clock tick: send head packets while they fit in `budget`.
    ///
    /// The budget starts fresh each call and whatever is left over is
    /// discarded. The first head packet larger than what remains ends the
    /// tick and stays queued.
    pub fn drain_tick(&mut self, budget: u64) -> Vec<Packet> {
        let mut counter = budget;
        let mut sent = Vec::new();
        while let Some(head) = self.packets.front() {
            if counter < head.size() {
                break;
            }
            let Some(packet) = self.packets.pop_front() else {
                break;
            };
            counter -= packet.size();
            trace!(id = packet.id(), size = packet.size(), counter, "sent");
            sent.push(packet);
        }
        sent
    }
}
