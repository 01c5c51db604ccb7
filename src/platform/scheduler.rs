//! Cooperative timer queue
//!
//! The tick and the spawn timer are both one-shot events on a single queue.
//! The host pumps the queue from its frame callback (or a test pumps it with
//! virtual timestamps), so callbacks never run concurrently.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// What a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    /// Run one update/render cycle
    Tick,
    /// Try to add one obstacle
    Spawn,
}

/// Identifies a scheduled timer for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// One-shot timer scheduling
pub trait Scheduler {
    /// Queue `event` to fire `delay_ms` after the scheduler's current time
    fn schedule_once(&mut self, delay_ms: f64, event: TimerEvent) -> TimerHandle;

    /// Drop a pending timer. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due_ms: f64,
    handle: TimerHandle,
    event: TimerEvent,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed so the max-heap pops the earliest due, then earliest scheduled
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.handle.cmp(&self.handle))
    }
}

/// Virtual-time event queue
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    now_ms: f64,
    next_handle: u64,
    heap: BinaryHeap<Pending>,
    live: HashSet<TimerHandle>,
}

impl EventQueue {
    pub fn new(now_ms: f64) -> Self {
        Self {
            now_ms,
            ..Default::default()
        }
    }

    /// Scheduler's notion of the current time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Number of live (uncancelled, unfired) timers
    pub fn pending(&self) -> usize {
        self.live.len()
    }

    /// Number of live timers for `event`
    pub fn pending_of(&self, event: TimerEvent) -> usize {
        self.heap
            .iter()
            .filter(|p| p.event == event && self.live.contains(&p.handle))
            .count()
    }

    /// Due time of the earliest live timer
    pub fn next_due(&self) -> Option<f64> {
        self.heap
            .iter()
            .filter(|p| self.live.contains(&p.handle))
            .map(|p| p.due_ms)
            .min_by(f64::total_cmp)
    }

    /// Pop the earliest timer due at or before `now_ms` and move the queue's
    /// clock to `now_ms`. Timers scheduled from the popped callback are
    /// therefore relative to `now_ms`, so an overdue timer fires once rather
    /// than catching up on every missed period.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TimerHandle, TimerEvent)> {
        self.discard_cancelled();
        self.now_ms = self.now_ms.max(now_ms);
        match self.heap.peek() {
            Some(p) if p.due_ms <= now_ms => {
                let p = *p;
                self.heap.pop();
                self.live.remove(&p.handle);
                Some((p.handle, p.event))
            }
            _ => None,
        }
    }

    fn discard_cancelled(&mut self) {
        while let Some(p) = self.heap.peek() {
            if self.live.contains(&p.handle) {
                break;
            }
            self.heap.pop();
        }
    }
}

impl Scheduler for EventQueue {
    fn schedule_once(&mut self, delay_ms: f64, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.heap.push(Pending {
            due_ms: self.now_ms + delay_ms.max(0.0),
            handle,
            event,
        });
        self.live.insert(handle);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.live.remove(&handle)
    }
}
