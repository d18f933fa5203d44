//! A time-ordered queue of future events.
//!
//! Events are keyed by the simulated time they fall due. Events due at the
//! same instant come out in the order they were scheduled, so replaying the
//! same run yields the same event order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use habitat_types::MarsTime;

/// One queued event with its due time and insertion sequence.
#[derive(Debug)]
struct Scheduled<E> {
    due: f64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Future events ordered by due time, FIFO among equal times.
#[derive(Debug)]
pub struct EventSchedule<E> {
    queue: BinaryHeap<Reverse<Scheduled<E>>>,
    next_seq: u64,
}

impl<E> Default for EventSchedule<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventSchedule<E> {
    /// Create an empty schedule.
    pub const fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue `event` to fall due at `due`.
    pub fn schedule(&mut self, due: &MarsTime, event: E) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.queue.push(Reverse(Scheduled {
            due: due.total_millisols(),
            seq,
            event,
        }));
    }

    /// Remove and return the earliest event due at or before `now`.
    pub fn pop_due(&mut self, now: &MarsTime) -> Option<(MarsTime, E)> {
        let Reverse(next) = self.queue.peek()?;
        if next.due > now.total_millisols() {
            return None;
        }
        let Reverse(due) = self.queue.pop()?;
        Some((MarsTime::from_total_millisols(due.due), due.event))
    }

    /// Return when the earliest event falls due.
    pub fn next_due(&self) -> Option<MarsTime> {
        self.queue
            .peek()
            .map(|Reverse(next)| MarsTime::from_total_millisols(next.due))
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(total: f64) -> MarsTime {
        MarsTime::from_total_millisols(total)
    }

    #[test]
    fn events_come_out_in_time_order() {
        let mut schedule = EventSchedule::new();
        schedule.schedule(&at(30.0), "late");
        schedule.schedule(&at(10.0), "early");
        schedule.schedule(&at(20.0), "middle");

        let now = at(100.0);
        let order: Vec<&str> = std::iter::from_fn(|| schedule.pop_due(&now))
            .map(|(_, e)| e)
            .collect();
        assert_eq!(order, vec!["early", "middle", "late"]);
    }

    #[test]
    fn equal_times_keep_insertion_order() {
        let mut schedule = EventSchedule::new();
        for n in 0..5 {
            schedule.schedule(&at(7.0), n);
        }
        let now = at(7.0);
        let order: Vec<i32> = std::iter::from_fn(|| schedule.pop_due(&now))
            .map(|(_, e)| e)
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn future_events_stay_queued() {
        let mut schedule = EventSchedule::new();
        schedule.schedule(&at(1500.0), ());
        assert!(schedule.pop_due(&at(1499.0)).is_none());
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.next_due().unwrap().mission_sol(), 2);
        assert!(schedule.pop_due(&at(1500.0)).is_some());
        assert!(schedule.is_empty());
    }
}
