//! Heartbeat monitor
//!
//! Tracks when the next heartbeat is due and whether the last one was acknowledged in
//! time. The monitor holds no timers itself; the engine sleeps until
//! [`HeartbeatMonitor::next_deadline`] and then calls [`HeartbeatMonitor::poll`].

use std::time::Duration;
use tokio::time::Instant;

/// Outcome of polling the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatTick {
    /// Nothing due yet
    Idle,
    /// Send a heartbeat now
    Beat,
    /// The last heartbeat went unacknowledged past the grace window
    Expired,
}

/// Heartbeat cadence and ack tracking
#[derive(Debug, Clone, Default)]
pub struct HeartbeatMonitor {
    interval: Duration,
    grace: Duration,
    next_beat: Option<Instant>,
    ack_deadline: Option<Instant>,
    last_sent: Option<Instant>,
}

impl HeartbeatMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start beating at `interval`, first beat due at `now`
    ///
    /// `grace` bounds how long an ack may take; `None` uses one interval.
    pub fn start(&mut self, interval: Duration, grace: Option<Duration>, now: Instant) {
        self.interval = interval;
        self.grace = grace.unwrap_or(interval);
        self.next_beat = Some(now);
        self.ack_deadline = None;
        self.last_sent = None;
    }

    /// Stop the monitor; no further deadlines
    pub fn stop(&mut self) {
        self.next_beat = None;
        self.ack_deadline = None;
        self.last_sent = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.next_beat.is_some()
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check if a heartbeat is waiting for its ack
    #[must_use]
    pub fn awaiting_ack(&self) -> bool {
        self.ack_deadline.is_some()
    }

    /// Earliest instant at which [`poll`](Self::poll) has something to report
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.next_beat, self.ack_deadline) {
            (Some(beat), Some(ack)) => Some(beat.min(ack)),
            (beat, ack) => beat.or(ack),
        }
    }

    /// Advance the monitor to `now`
    pub fn poll(&mut self, now: Instant) -> HeartbeatTick {
        if self.ack_deadline.is_some_and(|deadline| deadline <= now) {
            self.stop();
            return HeartbeatTick::Expired;
        }

        match self.next_beat {
            Some(due) if due <= now => {
                self.next_beat = Some(now + self.interval);
                self.last_sent = Some(now);
                // An outstanding ack keeps its original deadline
                if self.ack_deadline.is_none() {
                    self.ack_deadline = Some(now + self.grace);
                }
                HeartbeatTick::Beat
            }
            _ => HeartbeatTick::Idle,
        }
    }

    /// Record an ack; returns the latency since the last beat
    pub fn acknowledge(&mut self, now: Instant) -> Option<Duration> {
        self.ack_deadline = None;
        self.last_sent.map(|sent| now.saturating_duration_since(sent))
    }
}
