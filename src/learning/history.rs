//! Rolling outcome history backing the insights computation.
//!
//! Keeps accepted outcomes in arrival order, bounded both by count and by the
//! configured retention window.

use super::Outcome;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe, bounded ring of recent outcomes.
#[derive(Debug)]
pub struct OutcomeHistory {
    entries: RwLock<VecDeque<Outcome>>,
    retention: Duration,
    capacity: usize,
}

impl OutcomeHistory {
    /// Create an empty history keeping at most `capacity` outcomes no older
    /// than `retention_hours`.
    pub fn new(retention_hours: u32, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            retention: Duration::hours(i64::from(retention_hours)),
            capacity: capacity.max(1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, VecDeque<Outcome>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Outcome history lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<Outcome>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Outcome history lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Append an outcome, evicting the oldest entries past capacity or
    /// retention.
    pub fn push(&self, outcome: Outcome) {
        let cutoff = Utc::now() - self.retention;
        let mut entries = self.write();
        entries.push_back(outcome);

        while entries.len() > self.capacity {
            entries.pop_front();
        }
        while entries.front().is_some_and(|front| front.timestamp < cutoff) {
            entries.pop_front();
        }
    }

    /// Outcomes whose timestamp is at or after `since`, oldest first.
    pub fn since(&self, since: DateTime<Utc>) -> Vec<Outcome> {
        self.read()
            .iter()
            .filter(|outcome| outcome.timestamp >= since)
            .cloned()
            .collect()
    }

    /// Retention window as configured.
    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
