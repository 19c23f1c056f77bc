//! Terminal display logic for domain-sweep CLI.
//!
//! This module handles the run header, the live progress block and the final
//! summary. Progress goes to stderr so stdout stays clean for `--json`.
//! Log lines share stderr with the live block, so they are written through
//! [`LiveBlock::log_writer`], which wipes the block first.
//! Uses only the `console` crate.

use console::{style, Term};
use domain_sweep_lib::{
    format_duration, Progress, ProgressReporter, RunSummary, StatsSnapshot, SweepConfig,
};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

const BAR_WIDTH: usize = 30;

/// Minimum gap between two redraws of the progress block.
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a run.
pub fn print_header(pattern: &str, candidate_count: usize, config: &SweepConfig) {
    println!(
        "{} {} {}",
        style("domain-sweep").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "· Sweeping {} candidate{} for {}",
            candidate_count,
            if candidate_count == 1 { "" } else { "s" },
            pattern
        ))
        .dim(),
    );

    let meta_parts = [
        format!("Batch size: {}", config.batch_size),
        format!("Timeout: {}ms", config.timeout.as_millis()),
        format!("Alphabet: {} chars", config.alphabet.len()),
        format!("Output: {}", config.output_path.display()),
    ];
    println!("{}", style(meta_parts.join(" | ")).dim());
    println!();
}

// ── Live progress ────────────────────────────────────────────────────────────

/// The progress block on stderr and how many lines of it are on screen.
///
/// Cloning shares the same block.
#[derive(Clone)]
pub struct LiveBlock {
    term: Term,
    interactive: bool,
    state: Arc<Mutex<DrawState>>,
}

#[derive(Default)]
struct DrawState {
    last_draw: Option<Instant>,
    drawn_lines: usize,
}

impl LiveBlock {
    pub fn new(term: Term) -> Self {
        let interactive = term.is_term();
        Self {
            term,
            interactive,
            state: Arc::new(Mutex::new(DrawState::default())),
        }
    }

    /// Writer for log output that clears the block before each write.
    pub fn log_writer(&self) -> LogWriter {
        LogWriter {
            block: self.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DrawState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wipe the block; the next redraw starts below whatever comes next.
    fn clear(&self, state: &mut DrawState) {
        if self.interactive && state.drawn_lines > 0 {
            let _ = self.term.clear_last_lines(state.drawn_lines);
        }
        state.drawn_lines = 0;
    }
}

/// `io::Write` handed to the tracing subscriber.
pub struct LogWriter {
    block: LiveBlock,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.block.lock();
        self.block.clear(&mut state);
        let mut term = &self.block.term;
        term.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut term = &self.block.term;
        term.flush()
    }
}

/// Progress reporter that redraws a fixed-height block in place.
///
/// When the target is not a terminal it falls back to one plain line per
/// redraw. Redraws closer together than [`REDRAW_INTERVAL`] are dropped,
/// except the final one.
pub struct TerminalReporter {
    block: LiveBlock,
}

impl TerminalReporter {
    pub fn new(block: LiveBlock) -> Self {
        Self { block }
    }
}

impl ProgressReporter for TerminalReporter {
    fn render(&self, snapshot: &StatsSnapshot, current: &str) {
        let block = &self.block;
        let mut state = block.lock();

        let finished = snapshot.checked >= snapshot.total;
        if let Some(last) = state.last_draw {
            if !finished && last.elapsed() < REDRAW_INTERVAL {
                return;
            }
        }
        state.last_draw = Some(Instant::now());

        // Display errors are not worth interrupting a sweep for.
        if block.interactive {
            let lines = progress_lines(snapshot, current);
            block.clear(&mut state);
            for line in &lines {
                let _ = block.term.write_line(line);
            }
            state.drawn_lines = lines.len();
        } else {
            let _ = block.term.write_line(&plain_line(snapshot, current));
        }
    }
}

/// The four lines of the live block.
pub fn progress_lines(snapshot: &StatsSnapshot, current: &str) -> Vec<String> {
    let progress = Progress::from_snapshot(snapshot);

    let filled = ((progress.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar = format!(
        "{}{}",
        style("█".repeat(filled)).cyan(),
        style("░".repeat(BAR_WIDTH - filled)).dim()
    );

    let eta = progress
        .eta
        .map(format_duration)
        .unwrap_or_else(|| "--".to_string());

    let recent = if snapshot.recent_hits.is_empty() {
        style("-".to_string()).dim().to_string()
    } else {
        style(snapshot.recent_hits.join(", ")).green().to_string()
    };

    vec![
        format!(
            "  {} {:>5.1}%  {}/{}",
            bar, progress.percent, snapshot.checked, snapshot.total
        ),
        format!(
            "  {}  {}  {}  {}  {}",
            style(format!("{} available", snapshot.available)).green(),
            style(format!("{} errors", snapshot.errors)).yellow(),
            style(format!("elapsed {}", format_duration(progress.elapsed))).dim(),
            style(format!("{:.1}/s", progress.rate)).dim(),
            style(format!("eta {}", eta)).dim(),
        ),
        format!("  {} {}", style("recent:").dim(), recent),
        format!("  {} {}", style("checking:").dim(), current),
    ]
}

/// Single-line form used when stderr is not a terminal.
pub fn plain_line(snapshot: &StatsSnapshot, current: &str) -> String {
    let progress = Progress::from_snapshot(snapshot);
    let eta = progress
        .eta
        .map(format_duration)
        .unwrap_or_else(|| "--".to_string());
    let recent = if snapshot.recent_hits.is_empty() {
        "-".to_string()
    } else {
        snapshot.recent_hits.join(",")
    };

    format!(
        "[{}/{}] {:.1}% available={} errors={} elapsed={} rate={:.1}/s eta={} recent={} current={}",
        snapshot.checked,
        snapshot.total,
        progress.percent,
        snapshot.available,
        snapshot.errors,
        format_duration(progress.elapsed),
        progress.rate,
        eta,
        recent,
        current,
    )
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary with colored counts.
pub fn print_summary(summary: &RunSummary, output: &str) {
    let stats = &summary.stats;

    println!();
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!("  {}", summary_line(summary));

    if stats.sink_failures > 0 {
        println!(
            "  {}",
            style(format!(
                "{} available domain{} could not be written to {}",
                stats.sink_failures,
                if stats.sink_failures == 1 { "" } else { "s" },
                output
            ))
            .yellow()
        );
    }

    if summary.interrupted {
        println!(
            "  {}",
            style(format!(
                "Interrupted: {} of {} candidates not checked",
                stats.remaining(),
                stats.total
            ))
            .yellow()
        );
    }

    println!(
        "  {} {}",
        style("Results written to").dim(),
        output
    );
}

/// `N checked in Xs | a available | t taken | e errors`
pub fn summary_line(summary: &RunSummary) -> String {
    let stats = &summary.stats;
    format!(
        "{} checked in {}  {}  {}  {}  {}  {}  {}",
        style(stats.checked).bold(),
        format_duration(stats.elapsed),
        style("|").dim(),
        style(format!("{} available", stats.available)).green(),
        style("|").dim(),
        style(format!("{} taken", stats.unavailable())).red(),
        style("|").dim(),
        style(format!("{} errors", stats.errors)).yellow(),
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use console::strip_ansi_codes;

    fn snapshot(checked: usize, hits: &[&str]) -> StatsSnapshot {
        StatsSnapshot {
            total: 100,
            checked,
            available: hits.len(),
            errors: 2,
            sink_failures: 0,
            elapsed: Duration::from_secs(10),
            recent_hits: hits.iter().map(|h| h.to_string()).collect(),
        }
    }

    #[test]
    fn test_progress_block_is_fixed_height() {
        assert_eq!(progress_lines(&snapshot(0, &[]), "a.com").len(), 4);
        assert_eq!(
            progress_lines(&snapshot(50, &["c.com", "b.com", "a.com"]), "d.com").len(),
            4
        );
    }

    #[test]
    fn test_progress_block_content() {
        let lines: Vec<String> = progress_lines(&snapshot(50, &["c.com", "b.com"]), "x.com")
            .iter()
            .map(|l| strip_ansi_codes(l).to_string())
            .collect();

        assert!(lines[0].contains("50.0%"));
        assert!(lines[0].contains("50/100"));
        assert!(lines[1].contains("2 available"));
        assert!(lines[1].contains("2 errors"));
        assert!(lines[1].contains("elapsed 10s"));
        assert!(lines[1].contains("5.0/s"));
        assert!(lines[1].contains("eta 10s"));
        assert!(lines[2].contains("c.com, b.com"));
        assert!(lines[3].contains("x.com"));
    }

    #[test]
    fn test_no_hits_placeholder() {
        let lines = progress_lines(&snapshot(0, &[]), "a.com");
        let recent = strip_ansi_codes(&lines[2]).to_string();
        assert!(recent.trim_end().ends_with('-'));
        assert!(strip_ansi_codes(&lines[1]).contains("eta --"));
    }

    #[test]
    fn test_plain_line() {
        let line = plain_line(&snapshot(25, &["b.com", "a.com"]), "x.com");
        assert_eq!(
            line,
            "[25/100] 25.0% available=2 errors=2 elapsed=10s rate=2.5/s eta=30s recent=b.com,a.com current=x.com"
        );
    }

    #[test]
    fn test_plain_line_before_first_check() {
        let line = plain_line(&snapshot(0, &[]), "a.com");
        assert!(line.contains("rate=0.0/s"));
        assert!(line.contains("eta=--"));
        assert!(line.contains("recent=-"));
        assert!(line.ends_with("current=a.com"));
    }

    #[test]
    fn test_log_write_forgets_drawn_block() {
        let block = LiveBlock::new(Term::stderr());
        block.lock().drawn_lines = 4;

        let mut writer = block.log_writer();
        writer.write_all(b"WARN interrupt received\n").unwrap();

        assert_eq!(block.lock().drawn_lines, 0);
    }

    #[test]
    fn test_final_render_is_never_throttled() {
        let block = LiveBlock::new(Term::stderr());
        let reporter = TerminalReporter::new(block.clone());

        reporter.render(&snapshot(50, &[]), "a.com");
        let first = block.lock().last_draw;
        assert!(first.is_some());

        // Too soon after the previous one: dropped
        reporter.render(&snapshot(60, &[]), "b.com");
        assert_eq!(block.lock().last_draw, first);

        std::thread::sleep(Duration::from_millis(2));
        reporter.render(&snapshot(100, &[]), "c.com");
        assert!(block.lock().last_draw > first);
    }

    #[test]
    fn test_summary_line() {
        let summary = RunSummary {
            stats: snapshot(100, &["a.com"]),
            interrupted: false,
        };
        let line = strip_ansi_codes(&summary_line(&summary)).to_string();
        assert!(line.starts_with("100 checked in 10s"));
        assert!(line.contains("1 available"));
        assert!(line.contains("97 taken"));
        assert!(line.contains("2 errors"));
    }
}
