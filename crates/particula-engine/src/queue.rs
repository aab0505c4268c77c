//! Bounded, time-ordered event store.
//!
//! Storage is reserved once at construction and never grows: a push into a
//! full queue is refused and counted. Entries are ordered by
//! `(time, sequence)` where the sequence is a monotonically increasing stamp
//! assigned on push, so events generated at the same sample keep their
//! generation order regardless of how blocks are split.

use crate::event::Event;

/// Default capacity, enough for several blocks of dense collisions.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

#[derive(Debug, Clone, Copy)]
struct Entry {
    seq: u64,
    event: Event,
}

impl Entry {
    fn key(&self) -> (u32, u64) {
        (self.event.time, self.seq)
    }
}

/// Fixed-capacity queue of [`Event`]s sorted by time.
#[derive(Debug, Clone)]
pub struct EventQueue {
    entries: Vec<Entry>,
    capacity: usize,
    head: usize,
    next_seq: u64,
    overflows: u64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl EventQueue {
    /// Queue that holds at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            head: 0,
            next_seq: 0,
            overflows: 0,
        }
    }

    /// Maximum number of stored events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events not yet popped.
    pub fn len(&self) -> usize {
        self.entries.len() - self.head
    }

    /// Whether no events are waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes refused because the queue was full.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Insert `event` after every queued event with the same or earlier time.
    ///
    /// Returns `false` if the queue is full.
    pub fn push(&mut self, event: Event) -> bool {
        if self.len() >= self.capacity {
            self.overflows += 1;
            return false;
        }
        if self.entries.len() >= self.capacity {
            // Reclaim popped slots in place.
            self.entries.drain(..self.head);
            self.head = 0;
        }
        let entry = Entry {
            seq: self.next_seq,
            event,
        };
        self.next_seq += 1;
        let key = entry.key();
        let idx = self.head + self.entries[self.head..].partition_point(|e| e.key() <= key);
        self.entries.insert(idx, entry);
        true
    }

    /// Time of the earliest waiting event.
    pub fn peek_time(&self) -> Option<u32> {
        self.entries.get(self.head).map(|e| e.event.time)
    }

    /// Pop the earliest event if its time is `<= time`.
    pub fn pop_due(&mut self, time: u32) -> Option<Event> {
        let entry = self.entries.get(self.head)?;
        if entry.event.time > time {
            return None;
        }
        self.head += 1;
        Some(entry.event)
    }

    /// Iterate over the waiting events in order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries[self.head..].iter().map(|e| &e.event)
    }

    /// Discard popped entries and shift every waiting event `offset` samples
    /// earlier, dropping those whose shifted time exceeds `horizon`.
    ///
    /// Returns how many events were dropped. Events already earlier than
    /// `offset` are clamped to time 0.
    pub fn rebase(&mut self, offset: u32, horizon: u32) -> usize {
        self.entries.drain(..self.head);
        self.head = 0;
        let before = self.entries.len();
        self.entries.retain_mut(|e| {
            e.event.time = e.event.time.saturating_sub(offset);
            e.event.time <= horizon
        });
        before - self.entries.len()
    }

    /// Remove every event.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = 0;
    }
}
