//! Logical-time event scheduler.
//!
//! The [`Timeline`] orders deferred work by simulated time. Events live in a
//! `BTreeMap` keyed by [`EventKey`], which sorts by time and then by a
//! monotonically increasing sequence number, so events that share a time run
//! in insertion order and replays are deterministic.
//!
//! ```text
//! schedule_at(t, ..) ──► BTreeMap<EventKey { time, seq }, ..>
//!                                   │
//! advance_to(now) ── snapshot of every key ≤ now ──► handler(event)
//!                                   │
//!             events scheduled by the handler wait for the next call
//! ```
//!
//! Time is a plain millisecond counter. The driving loop usually feeds it
//! real elapsed milliseconds, but nothing here reads the wall clock.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use tracing::trace;

use crate::error::{GatewaveError, Result};

/// A point on the simulated time axis, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(pub u64);

impl SimTime {
    /// The start of simulated time.
    pub const ZERO: SimTime = SimTime(0);

    /// Milliseconds since [`SimTime::ZERO`].
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

impl Add<u64> for SimTime {
    type Output = SimTime;

    fn add(self, millis: u64) -> SimTime {
        SimTime(self.0.saturating_add(millis))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Ordering key of a scheduled event: time first, then insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    pub time: SimTime,
    pub seq: u64,
}

/// An event removed from the queue for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent<E> {
    pub key: EventKey,
    pub description: String,
    pub payload: E,
}

/// Time-ordered queue of deferred events.
#[derive(Debug, Clone)]
pub struct Timeline<E> {
    queue: BTreeMap<EventKey, (String, E)>,
    now: SimTime,
    next_seq: u64,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timeline<E> {
    /// Create an empty timeline at [`SimTime::ZERO`].
    pub fn new() -> Self {
        Self::starting_at(SimTime::ZERO)
    }

    /// Create an empty timeline whose clock starts at `start`.
    pub fn starting_at(start: SimTime) -> Self {
        Self {
            queue: BTreeMap::new(),
            now: start,
            next_seq: 0,
        }
    }

    /// The scheduler's current logical time.
    pub fn adjusted_time(&self) -> SimTime {
        self.now
    }

    /// Enqueue `payload` to run at `time`.
    ///
    /// Scheduling before [`adjusted_time`](Self::adjusted_time) is a contract
    /// violation and fails with [`GatewaveError::ScheduledInPast`].
    pub fn schedule_at(
        &mut self,
        time: SimTime,
        description: impl Into<String>,
        payload: E,
    ) -> Result<EventKey> {
        if time < self.now {
            return Err(GatewaveError::ScheduledInPast {
                requested: time,
                now: self.now,
            });
        }
        let key = EventKey {
            time,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        let description = description.into();
        trace!(%time, seq = key.seq, %description, "Event scheduled");
        self.queue.insert(key, (description, payload));
        Ok(key)
    }

    /// Enqueue `payload` to run `delay` milliseconds from now.
    pub fn schedule_in(
        &mut self,
        delay: u64,
        description: impl Into<String>,
        payload: E,
    ) -> Result<EventKey> {
        self.schedule_at(self.now + delay, description, payload)
    }

    /// Remove a pending event. Returns its payload if it was still queued.
    pub fn cancel(&mut self, key: EventKey) -> Option<E> {
        self.queue.remove(&key).map(|(_, payload)| payload)
    }

    /// Time of the earliest pending event.
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.queue.keys().next().map(|key| key.time)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending events in execution order, as `(key, description)`.
    pub fn pending(&self) -> impl Iterator<Item = (EventKey, &str)> + '_ {
        self.queue
            .iter()
            .map(|(key, (description, _))| (*key, description.as_str()))
    }

    /// Remove and return every event due at or before `now`, in order.
    ///
    /// This is the first half of a split advance: the caller executes the
    /// returned events (calling [`set_time`](Self::set_time) before each) and
    /// then calls [`finish_advance`](Self::finish_advance). Events scheduled
    /// in between are not part of the snapshot.
    pub fn take_due(&mut self, now: SimTime) -> Result<Vec<ScheduledEvent<E>>> {
        if now < self.now {
            return Err(GatewaveError::TimeReversal {
                requested: now,
                now: self.now,
            });
        }
        let later = match now.0.checked_add(1) {
            Some(next) => self.queue.split_off(&EventKey {
                time: SimTime(next),
                seq: 0,
            }),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.queue, later);
        Ok(due
            .into_iter()
            .map(|(key, (description, payload))| ScheduledEvent {
                key,
                description,
                payload,
            })
            .collect())
    }

    /// Put events taken by [`take_due`](Self::take_due) back under their
    /// original keys, so an interrupted advance loses nothing.
    pub fn requeue(&mut self, events: impl IntoIterator<Item = ScheduledEvent<E>>) {
        for event in events {
            self.queue
                .insert(event.key, (event.description, event.payload));
        }
    }

    /// Move the clock forward to `time` while executing a due event.
    ///
    /// Never moves the clock backwards; an event that runs late keeps the
    /// current time.
    pub fn set_time(&mut self, time: SimTime) {
        if time > self.now {
            self.now = time;
        }
    }

    /// Complete a split advance by moving the clock to `now`.
    pub fn finish_advance(&mut self, now: SimTime) {
        self.set_time(now);
    }

    /// Execute, in order, every event due at or before `now`.
    ///
    /// The handler receives the timeline so it can schedule follow-up events;
    /// those only run in a later call, even if they are due by `now`.
    /// Returns the number of events executed.
    ///
    /// If the handler fails, the events after the failing one stay queued.
    pub fn advance_to<F>(&mut self, now: SimTime, mut handler: F) -> Result<usize>
    where
        F: FnMut(&mut Self, ScheduledEvent<E>) -> Result<()>,
    {
        let due = self.take_due(now)?;
        let count = due.len();
        let mut due = due.into_iter();
        while let Some(event) = due.next() {
            self.set_time(event.key.time);
            if let Err(e) = handler(self, event) {
                self.requeue(due);
                return Err(e);
            }
        }
        self.finish_advance(now);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_run_in_time_order() {
        let mut timeline = Timeline::new();
        timeline.schedule_at(SimTime(30), "c", 'c').unwrap();
        timeline.schedule_at(SimTime(10), "a", 'a').unwrap();
        timeline.schedule_at(SimTime(20), "b", 'b').unwrap();

        let mut order = Vec::new();
        let ran = timeline
            .advance_to(SimTime(100), |_, event| {
                order.push(event.payload);
                Ok(())
            })
            .unwrap();

        assert_eq!(ran, 3);
        assert_eq!(order, vec!['a', 'b', 'c']);
        assert_eq!(timeline.adjusted_time(), SimTime(100));
    }

    #[test]
    fn test_equal_times_are_fifo() {
        let mut timeline = Timeline::new();
        for i in 0..5 {
            timeline.schedule_at(SimTime(7), format!("e{i}"), i).unwrap();
        }
        let mut order = Vec::new();
        timeline
            .advance_to(SimTime(7), |_, event| {
                order.push(event.payload);
                Ok(())
            })
            .unwrap();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_only_due_events_run() {
        let mut timeline = Timeline::new();
        timeline.schedule_at(SimTime(5), "early", 1).unwrap();
        timeline.schedule_at(SimTime(50), "late", 2).unwrap();

        let mut seen = Vec::new();
        timeline
            .advance_to(SimTime(10), |_, event| {
                seen.push(event.payload);
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, vec![1]);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.peek_next_time(), Some(SimTime(50)));
    }

    #[test]
    fn test_rescheduled_events_wait_for_next_advance() {
        let mut timeline = Timeline::new();
        timeline.schedule_at(SimTime(0), "tick", 0u32).unwrap();

        let mut runs = 0;
        timeline
            .advance_to(SimTime(10), |timeline, event| {
                runs += 1;
                // Re-arm at the current instant: must not run in this call.
                timeline.schedule_at(event.key.time, "again", event.payload + 1)?;
                Ok(())
            })
            .unwrap();

        assert_eq!(runs, 1);
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_handler_sees_event_time() {
        let mut timeline = Timeline::new();
        timeline.schedule_at(SimTime(40), "x", ()).unwrap();
        let mut seen_time = SimTime::ZERO;
        timeline
            .advance_to(SimTime(90), |timeline, _| {
                seen_time = timeline.adjusted_time();
                Ok(())
            })
            .unwrap();
        assert_eq!(seen_time, SimTime(40));
    }

    #[test]
    fn test_scheduling_in_the_past_fails() {
        let mut timeline: Timeline<()> = Timeline::starting_at(SimTime(100));
        let err = timeline.schedule_at(SimTime(99), "late", ()).unwrap_err();
        assert!(matches!(err, GatewaveError::ScheduledInPast { .. }));
        assert!(timeline.is_empty());
        assert!(timeline.schedule_at(SimTime(100), "now", ()).is_ok());
    }

    #[test]
    fn test_advancing_backwards_fails() {
        let mut timeline: Timeline<()> = Timeline::starting_at(SimTime(100));
        let err = timeline.advance_to(SimTime(50), |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, GatewaveError::TimeReversal { .. }));
    }

    #[test]
    fn test_events_at_end_of_time_are_due() {
        let mut timeline = Timeline::new();
        timeline.schedule_at(SimTime(u64::MAX), "last", 1).unwrap();
        timeline.schedule_at(SimTime(3), "first", 0).unwrap();

        let due = timeline.take_due(SimTime(u64::MAX - 1)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(timeline.peek_next_time(), Some(SimTime(u64::MAX)));

        let due = timeline.take_due(SimTime(u64::MAX)).unwrap();
        assert_eq!(due[0].payload, 1);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_failed_handler_keeps_remaining_events() {
        let mut timeline = Timeline::new();
        timeline.schedule_at(SimTime(10), "ok", 1).unwrap();
        timeline.schedule_at(SimTime(20), "fails", 2).unwrap();
        timeline.schedule_at(SimTime(30), "after", 3).unwrap();
        timeline.schedule_at(SimTime(30), "after too", 4).unwrap();

        let err = timeline
            .advance_to(SimTime(100), |timeline, event| {
                if event.payload == 2 {
                    return timeline.schedule_at(SimTime(0), "past", 0).map(|_| ());
                }
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, GatewaveError::ScheduledInPast { .. }));

        let descriptions: Vec<&str> = timeline.pending().map(|(_, d)| d).collect();
        assert_eq!(descriptions, vec!["after", "after too"]);
        assert_eq!(timeline.adjusted_time(), SimTime(20));
    }

    #[test]
    fn test_cancel_removes_event() {
        let mut timeline = Timeline::new();
        let key = timeline.schedule_in(10, "cancel me", 1).unwrap();
        timeline.schedule_in(10, "keep", 2).unwrap();
        assert_eq!(timeline.cancel(key), Some(1));
        assert_eq!(timeline.cancel(key), None);

        let descriptions: Vec<&str> = timeline.pending().map(|(_, d)| d).collect();
        assert_eq!(descriptions, vec!["keep"]);
    }
}
