//! Scheduled reconnect
//!
//! A role change on a live channel closes it and re-opens after a short
//! delay, so the gateway observes the close before the new open. The
//! pending reopen is an owned value polled by the UI loop; cancelling it is
//! dropping it.

use std::time::{Duration, Instant};

use crate::session::role::Role;

/// Delay between closing and re-opening on a role change
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReconnect {
    role: Role,
    due: Instant,
}

impl ScheduledReconnect {
    pub fn new(role: Role, now: Instant, delay: Duration) -> Self {
        Self {
            role,
            due: now + delay,
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }

    /// Time left before firing (zero once due)
    pub fn remaining(&self, now: Instant) -> Duration {
        self.due.saturating_duration_since(now)
    }
}
