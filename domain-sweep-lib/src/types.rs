//! Core data types for domain sweeping.
//!
//! This module defines the probe outcome, candidate ordering, the resolved
//! runtime configuration and the summary returned at the end of a run.

use crate::generate::Alphabet;
use crate::stats::StatsSnapshot;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of probes in flight per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Upper bound accepted for the batch size.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Default per-probe timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default file the available domains are written to.
pub const DEFAULT_OUTPUT_FILE: &str = "available_domains.txt";

/// Default progress cadence, in completed checks.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 5;

/// Classification of a single probe.
///
/// Only `Available` is ever written to the result sink. `Error` is treated
/// like `Unavailable` for output purposes but is counted separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    /// Resolution reported no such name (or no data): likely unregistered
    Available,

    /// Resolution returned at least one address
    Unavailable,

    /// Timeout, network failure, malformed input, or any other failure
    Error,
}

impl ProbeOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Available => write!(f, "AVAILABLE"),
            ProbeOutcome::Unavailable => write!(f, "TAKEN"),
            ProbeOutcome::Error => write!(f, "ERROR"),
        }
    }
}

/// Order in which candidates are emitted by the generator.
///
/// Non-sequential orders permute the alphabet once per generation run, so the
/// candidate *set* never changes, only discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidateOrder {
    /// Alphabet order, fully deterministic
    Sequential,

    /// One random permutation drawn from the thread RNG
    #[default]
    Random,

    /// One permutation drawn from an RNG seeded with this value
    Seeded(u64),
}

impl CandidateOrder {
    /// Build an order from a shuffle flag and an optional seed.
    ///
    /// A seed implies shuffling; `shuffle = false` always wins.
    pub fn from_flags(shuffle: bool, seed: Option<u64>) -> Self {
        match (shuffle, seed) {
            (false, _) => Self::Sequential,
            (true, Some(seed)) => Self::Seeded(seed),
            (true, None) => Self::Random,
        }
    }
}

/// Resolved configuration for a sweep.
///
/// This is what the CLI produces after merging config files, environment
/// variables and arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// Probes launched together per batch; also the concurrency cap.
    /// Default: 10, Range: 1-1000
    pub batch_size: usize,

    /// Per-probe timeout.
    /// Default: 5000 ms
    pub timeout: Duration,

    /// Where available domains are written, one per line.
    /// Default: available_domains.txt
    pub output_path: PathBuf,

    /// Report progress every N completed checks (always at batch end too).
    /// Default: 5
    pub progress_interval: usize,

    /// Candidate ordering policy.
    /// Default: random
    pub order: CandidateOrder,

    /// Characters substituted for each wildcard.
    /// Default: a-z then 0-9
    pub alphabet: Alphabet,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_TIMEOUT,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            order: CandidateOrder::default(),
            alphabet: Alphabet::default(),
        }
    }
}

impl SweepConfig {
    /// Set the batch size, clamped to 1..=1000.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_path = path.into();
        self
    }

    /// Set the progress cadence; zero is bumped to one.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn with_order(mut self, order: CandidateOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }
}

/// Final result of a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Statistics at the moment the run stopped
    #[serde(flatten)]
    pub stats: StatsSnapshot,

    /// Whether the run stopped because of an operator interrupt
    pub interrupted: bool,
}

impl RunSummary {
    /// Whether every candidate was checked.
    pub fn is_complete(&self) -> bool {
        self.stats.checked == self.stats.total
    }
}
