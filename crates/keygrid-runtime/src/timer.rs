#![forbid(unsafe_code)]

//! Single-threaded deadline queue driven by the event loop.
//!
//! The session never sleeps. It schedules a payload for later, asks
//! [`TimerQueue::next_deadline`] how long the event loop may block, and calls
//! [`TimerQueue::fire_due`] with the current time after every wake-up.
//! Cancelled tasks never fire.
//!
//! # Example
//!
//! ```
//! use keygrid_runtime::timer::TimerQueue;
//! use web_time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut timers = TimerQueue::new();
//! let a = timers.schedule(start + Duration::from_millis(50), "a");
//! timers.schedule(start + Duration::from_millis(10), "b");
//! timers.cancel(a);
//!
//! assert_eq!(timers.fire_due(start + Duration::from_millis(100)), vec!["b"]);
//! assert!(timers.is_empty());
//! ```

use web_time::Instant;

/// Identifies one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

impl TaskHandle {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Entry<T> {
    handle: TaskHandle,
    deadline: Instant,
    payload: T,
}

/// Pending tasks ordered by deadline, then by scheduling order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Queue `payload` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: Instant, payload: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        let pos = self.entries.partition_point(|e| e.deadline <= deadline);
        self.entries.insert(
            pos,
            Entry {
                handle,
                deadline,
                payload,
            },
        );
        handle
    }

    /// Drop a pending task. Returns its payload if it had not fired yet.
    pub fn cancel(&mut self, handle: TaskHandle) -> Option<T> {
        let pos = self.entries.iter().position(|e| e.handle == handle)?;
        Some(self.entries.remove(pos).payload)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.first().map(|e| e.deadline)
    }

    /// Whether `handle` is still pending.
    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every payload whose deadline is at or before `now`,
    /// earliest first.
    pub fn fire_due(&mut self, now: Instant) -> Vec<T> {
        let due = self.entries.partition_point(|e| e.deadline <= now);
        self.entries.drain(..due).map(|e| e.payload).collect()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use web_time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_in_deadline_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t0 + ms(30), 3);
        q.schedule(t0 + ms(10), 1);
        q.schedule(t0 + ms(20), 2);
        assert_eq!(q.next_deadline(), Some(t0 + ms(10)));
        assert_eq!(q.fire_due(t0 + ms(25)), vec![1, 2]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.fire_due(t0 + ms(30)), vec![3]);
        assert!(q.is_empty());
        assert_eq!(q.next_deadline(), None);
    }

    #[test]
    fn equal_deadlines_keep_schedule_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t0, 'a');
        q.schedule(t0, 'b');
        q.schedule(t0, 'c');
        assert_eq!(q.fire_due(t0), vec!['a', 'b', 'c']);
    }

    #[test]
    fn nothing_fires_early() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t0 + ms(50), ());
        assert!(q.fire_due(t0 + ms(49)).is_empty());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn cancel_removes_task() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        let h = q.schedule(t0, "x");
        assert!(q.is_pending(h));
        assert_eq!(q.cancel(h), Some("x"));
        assert!(!q.is_pending(h));
        assert_eq!(q.cancel(h), None);
        assert!(q.fire_due(t0 + ms(1)).is_empty());
    }

    #[test]
    fn handles_are_unique() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        let a = q.schedule(t0, ());
        let b = q.schedule(t0, ());
        assert_ne!(a, b);
        assert_eq!(b.id(), a.id() + 1);
    }
}
