//! Run statistics aggregation.
//!
//! [`RunStats`] is the only shared mutable state of a sweep. Every update goes
//! through [`RunStats::record`] (or [`RunStats::record_sink_failure`]), which
//! takes the inner lock, so concurrent completions can never lose an increment.
//! Readers get an immutable [`StatsSnapshot`].

use crate::types::ProbeOutcome;
use serde::{Serialize, Serializer};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Number of recent discoveries kept for display.
pub const RECENT_HITS_CAPACITY: usize = 3;

/// Bounded list of the most recently discovered available domains, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentHits {
    hits: VecDeque<String>,
}

impl RecentHits {
    pub fn new() -> Self {
        Self {
            hits: VecDeque::with_capacity(RECENT_HITS_CAPACITY + 1),
        }
    }

    /// Push a discovery to the front, evicting the oldest beyond capacity.
    pub fn push(&mut self, domain: impl Into<String>) {
        self.hits.push_front(domain.into());
        self.hits.truncate(RECENT_HITS_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.hits.iter().cloned().collect()
    }
}

#[derive(Debug, Default)]
struct StatsState {
    checked: usize,
    available: usize,
    errors: usize,
    sink_failures: usize,
    recent: RecentHits,
}

/// Mutex-guarded aggregate of a single run.
#[derive(Debug)]
pub struct RunStats {
    total: usize,
    started: Instant,
    state: Mutex<StatsState>,
}

impl RunStats {
    /// Start a new run over `total` candidates, with the clock starting now.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            started: Instant::now(),
            state: Mutex::new(StatsState::default()),
        }
    }

    /// Apply one completed probe and return the snapshot right after it.
    ///
    /// `checked` is never pushed past `total`; extra records are ignored.
    pub fn record(&self, domain: &str, outcome: ProbeOutcome) -> StatsSnapshot {
        let mut state = self.lock();
        if state.checked < self.total {
            state.checked += 1;
            match outcome {
                ProbeOutcome::Available => {
                    state.available += 1;
                    state.recent.push(domain);
                }
                ProbeOutcome::Error => state.errors += 1,
                ProbeOutcome::Unavailable => {}
            }
        }
        self.snapshot_locked(&state)
    }

    /// Count a discovered domain that could not be persisted.
    pub fn record_sink_failure(&self) {
        self.lock().sink_failures += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let state = self.lock();
        self.snapshot_locked(&state)
    }

    fn snapshot_locked(&self, state: &StatsState) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total,
            checked: state.checked,
            available: state.available,
            errors: state.errors,
            sink_failures: state.sink_failures,
            elapsed: self.started.elapsed(),
            recent_hits: state.recent.to_vec(),
        }
    }

    // A poisoned lock still holds consistent counters; every update is a
    // handful of integer increments.
    fn lock(&self) -> MutexGuard<'_, StatsState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Immutable view of run statistics at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total: usize,
    pub checked: usize,
    pub available: usize,
    pub errors: usize,
    pub sink_failures: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// Newest first, at most three entries
    pub recent_hits: Vec<String>,
}

impl StatsSnapshot {
    /// Checked candidates that resolved to an address.
    pub fn unavailable(&self) -> usize {
        self.checked
            .saturating_sub(self.available)
            .saturating_sub(self.errors)
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.checked)
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
