//! Progress reporting contract.
//!
//! The scheduler hands reporters an immutable [`StatsSnapshot`] plus the domain
//! currently in flight. Reporters only read; they never feed back into the run.
//! [`Progress`] holds the derived numbers (percentage, rate, ETA) so every
//! front end computes them the same way.

use crate::stats::StatsSnapshot;
use std::time::Duration;

/// Consumer of progress snapshots.
///
/// Called on the scheduler's task, so implementations must return quickly and
/// must not do network or disk I/O beyond writing to the display.
pub trait ProgressReporter: Send + Sync {
    fn render(&self, snapshot: &StatsSnapshot, current: &str);
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn render(&self, _snapshot: &StatsSnapshot, _current: &str) {}
}

/// Derived progress figures for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub percent: f64,
    /// Checks per second
    pub rate: f64,
    pub elapsed: Duration,
    /// Only present when the rate is positive and finite
    pub eta: Option<Duration>,
}

impl Progress {
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        let elapsed = snapshot.elapsed;
        let secs = elapsed.as_secs_f64();

        let rate = if secs > 0.0 {
            snapshot.checked as f64 / secs
        } else {
            0.0
        };

        let percent = if snapshot.total == 0 {
            100.0
        } else {
            snapshot.checked as f64 * 100.0 / snapshot.total as f64
        };

        let eta = if rate > 0.0 && rate.is_finite() {
            let remaining = snapshot.remaining() as f64 / rate;
            if remaining.is_finite() {
                Some(Duration::from_secs_f64(remaining))
            } else {
                None
            }
        } else {
            None
        };

        Self {
            percent,
            rate,
            elapsed,
            eta,
        }
    }
}

/// Format a duration as `1h02m03s`, `2m05s` or `7s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h{:02}m{:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(total: usize, checked: usize, elapsed_ms: u64) -> StatsSnapshot {
        StatsSnapshot {
            total,
            checked,
            available: 0,
            errors: 0,
            sink_failures: 0,
            elapsed: Duration::from_millis(elapsed_ms),
            recent_hits: Vec::new(),
        }
    }

    #[test]
    fn test_progress_math() {
        let progress = Progress::from_snapshot(&snapshot(100, 25, 5_000));
        assert_eq!(progress.percent, 25.0);
        assert_eq!(progress.rate, 5.0);
        assert_eq!(progress.eta, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_no_eta_without_rate() {
        let progress = Progress::from_snapshot(&snapshot(100, 0, 5_000));
        assert_eq!(progress.rate, 0.0);
        assert!(progress.eta.is_none());

        let progress = Progress::from_snapshot(&snapshot(100, 10, 0));
        assert_eq!(progress.rate, 0.0);
        assert!(progress.eta.is_none());
    }

    #[test]
    fn test_empty_run_is_complete() {
        let progress = Progress::from_snapshot(&snapshot(0, 0, 10));
        assert_eq!(progress.percent, 100.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(7)), "7s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m05s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h02m03s");
    }
}
