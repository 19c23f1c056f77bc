//! Domain Sweep CLI Application
//!
//! Expands a wildcard domain pattern and records every candidate that does not
//! resolve. This binary is a thin front end over domain-sweep-lib: it resolves
//! configuration, asks for the pattern when needed, renders live progress and
//! turns Ctrl-C into a graceful stop.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use console::Term;
use domain_sweep_lib::{
    estimate_candidate_count, generate_candidates, load_env_config, normalize_pattern,
    parse_timeout, validate_batch_size, validate_pattern, Alphabet, CandidateOrder,
    ConfigManager, DnsResolver, EnvConfig, FileConfig, LineSink, SweepConfig, Sweeper,
};
use std::io::{BufRead, IsTerminal, Write};
use std::process;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Runs above this many candidates ask before starting.
const CONFIRM_THRESHOLD: usize = 100_000;

/// CLI arguments for domain-sweep
#[derive(Parser, Debug)]
#[command(name = "domain-sweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Find unregistered domains matching a wildcard pattern")]
#[command(
    long_about = "Expand a wildcard pattern such as 'go*.com' (each '*' is one character from the alphabet) and probe every candidate through DNS.\n\nNames that do not resolve are appended to the output file as they are found."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain pattern, '*' matches one alphabet character (e.g. "te*t.com")
    #[arg(value_name = "PATTERN", help_heading = "Pattern")]
    pub pattern: Option<String>,

    /// Characters substituted for each '*' (default: a-z0-9)
    #[arg(long = "alphabet", value_name = "CHARS", help_heading = "Pattern")]
    pub alphabet: Option<String>,

    /// Keep alphabet order instead of shuffling it
    #[arg(long = "no-shuffle", help_heading = "Pattern")]
    pub no_shuffle: bool,

    /// Seed the alphabet shuffle for a reproducible order
    #[arg(long = "seed", value_name = "N", help_heading = "Pattern")]
    pub seed: Option<u64>,

    /// Print the candidates without probing them
    #[arg(long = "dry-run", help_heading = "Pattern")]
    pub dry_run: bool,

    /// Lookups per batch, also the in-flight cap (default: 10, max: 1000)
    #[arg(
        short = 'c',
        long = "concurrency",
        value_name = "N",
        help_heading = "Performance"
    )]
    pub concurrency: Option<usize>,

    /// Per-lookup timeout (e.g. "5000ms", "5s", "1m")
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "DURATION",
        help_heading = "Performance"
    )]
    pub timeout: Option<String>,

    /// Skip the confirmation prompt for very large runs
    #[arg(long = "yes", short = 'y', help_heading = "Performance")]
    pub yes: bool,

    /// File available domains are written to (default: available_domains.txt)
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output"
    )]
    pub output: Option<String>,

    /// Refresh progress every N completed checks (default: 5)
    #[arg(long = "progress-every", value_name = "N", help_heading = "Output")]
    pub progress_every: Option<usize>,

    /// Print the final summary (or dry-run list) as JSON
    #[arg(short = 'j', long = "json", help_heading = "Output")]
    pub json: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logging
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Fully resolved settings for one invocation.
#[derive(Debug)]
struct Settings {
    sweep: SweepConfig,
    json: bool,
    env_pattern: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let block = ui::LiveBlock::new(Term::stderr());
    init_logging(&args, block.clone());
    debug!("domain-sweep v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_sweep(args, block).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(concurrency) = args.concurrency {
        validate_batch_size(concurrency).map_err(|e| e.to_string())?;
    }

    if args.progress_every == Some(0) {
        return Err("--progress-every must be at least 1".to_string());
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5000ms', '5s', '1m'",
                timeout
            ));
        }
    }

    if args.no_shuffle && args.seed.is_some() {
        return Err("Cannot combine --no-shuffle with --seed".to_string());
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over the flags.
///
/// Events go to stderr through the live progress block so a warning never
/// lands inside a half-erased block.
fn init_logging(args: &Args, block: ui::LiveBlock) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(move || block.log_writer())
        .with_target(false)
        .init();
}

async fn run_sweep(
    args: Args,
    block: ui::LiveBlock,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_config(&args)?;
    let config = settings.sweep;

    let pattern = resolve_pattern(&args, settings.env_pattern)?;
    let pattern = normalize_pattern(&pattern);
    validate_pattern(&pattern)?;

    let estimate = estimate_candidate_count(&pattern, &config.alphabet);
    info!(pattern = %pattern, candidates = estimate, "pattern accepted");

    // Dry-run: print candidates and exit without probing
    if args.dry_run {
        let candidates = generate_candidates(&pattern, &config.alphabet, config.order)?;
        if settings.json {
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        } else {
            for candidate in &candidates {
                println!("{}", candidate);
            }
        }
        eprintln!("{} candidates would be checked", candidates.len());
        return Ok(());
    }

    // Interactive confirmation for huge runs (TTY only)
    if estimate > CONFIRM_THRESHOLD && !args.yes && !confirm_large_run(estimate, &config)? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let candidates = generate_candidates(&pattern, &config.alphabet, config.order)?;
    let sink = LineSink::create(&config.output_path)?;
    let resolver = DnsResolver::from_system(config.timeout);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let sweeper = Sweeper::new(resolver, config);
    if !settings.json {
        ui::print_header(&pattern, candidates.len(), sweeper.config());
    }

    let reporter = ui::TerminalReporter::new(block);
    let summary = sweeper.run(&candidates, &sink, &reporter, &cancel).await;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        ui::print_summary(&summary, sink.label());
    }

    Ok(())
}

/// Cancel on the first Ctrl-C; a second one exits immediately.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("could not install Ctrl-C handler");
            return;
        }
        warn!("interrupt received, abandoning lookups in flight (Ctrl-C again to abort)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            process::exit(130);
        }
    });
}

/// Pattern from the CLI, then `DS_PATTERN`, then an interactive prompt.
fn resolve_pattern(
    args: &Args,
    env_pattern: Option<String>,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(pattern) = args.pattern.clone().or(env_pattern) {
        return Ok(pattern);
    }

    if !std::io::stdin().is_terminal() {
        return Err("No pattern given. Pass one as an argument or set DS_PATTERN".into());
    }

    eprint!("Enter domain pattern (e.g. go*.com): ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        return Err("No pattern given".into());
    }
    Ok(input.to_string())
}

/// Ask before starting a huge run. Non-terminals always proceed.
fn confirm_large_run(
    estimate: usize,
    config: &SweepConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let term = Term::stderr();
    if !term.is_term() {
        return Ok(true);
    }

    let batches = estimate.div_ceil(config.batch_size.max(1));
    let worst_case = config.timeout.saturating_mul(batches.min(u32::MAX as usize) as u32);
    eprint!(
        "Will probe {} candidates in {} batches of {} (up to {}). Proceed? [Y/n] ",
        estimate,
        batches,
        config.batch_size,
        domain_sweep_lib::format_duration(worst_case),
    );

    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();
    Ok(!(answer == "n" || answer == "no"))
}

/// Resolve settings: CLI > env > local file > global file > XDG file > defaults.
fn build_config(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let config_manager = ConfigManager::new();

    // Step 1: config files
    let explicit_path = args.config.clone().or_else(|| env_config.config.clone());
    let file_config = match explicit_path {
        Some(path) => {
            info!(path = %path, "using explicit config file");
            config_manager
                .load_file(&path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load().unwrap_or_else(|e| {
            warn!(error = %e, "config discovery failed, using defaults");
            FileConfig::default()
        }),
    };

    let mut layered = Layered::default();
    layered.apply_file(file_config)?;

    // Step 2: environment variables (DS_*)
    layered.apply_env(&env_config)?;

    // Step 3: CLI arguments (highest precedence)
    layered.apply_args(args)?;

    Ok(Settings {
        sweep: layered.finish(),
        json: layered.json,
        env_pattern: env_config.pattern,
    })
}

/// Settings being layered before they become a `SweepConfig`.
///
/// Shuffle and seed stay separate until the end so a seed from one layer can
/// combine with a shuffle flag from another.
#[derive(Debug)]
struct Layered {
    config: SweepConfig,
    shuffle: bool,
    seed: Option<u64>,
    json: bool,
}

impl Default for Layered {
    fn default() -> Self {
        Self {
            config: SweepConfig::default(),
            shuffle: true,
            seed: None,
            json: false,
        }
    }
}

impl Layered {
    fn apply_file(&mut self, file_config: FileConfig) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(defaults) = file_config.defaults {
            if let Some(batch_size) = defaults.batch_size {
                self.set_batch_size(batch_size);
            }
            if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout) {
                self.set_timeout(timeout);
            }
            if let Some(interval) = defaults.progress_interval {
                self.set_progress_interval(interval);
            }
            if let Some(shuffle) = defaults.shuffle {
                self.shuffle = shuffle;
            }
            if defaults.seed.is_some() {
                self.seed = defaults.seed;
            }
            if let Some(alphabet) = defaults.alphabet {
                self.set_alphabet(&alphabet)?;
            }
        }

        if let Some(output) = file_config.output {
            if let Some(file) = output.file {
                self.set_output(file);
            }
            if let Some(json) = output.json {
                self.json = json;
            }
        }

        Ok(())
    }

    fn apply_env(&mut self, env_config: &EnvConfig) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(batch_size) = env_config.batch_size {
            self.set_batch_size(batch_size);
        }
        if let Some(timeout) = env_config.timeout {
            self.set_timeout(timeout);
        }
        if let Some(interval) = env_config.progress_interval {
            self.set_progress_interval(interval);
        }
        if let Some(shuffle) = env_config.shuffle {
            self.shuffle = shuffle;
        }
        if env_config.seed.is_some() {
            self.seed = env_config.seed;
        }
        if let Some(alphabet) = &env_config.alphabet {
            self.set_alphabet(alphabet)?;
        }
        if let Some(output) = &env_config.output {
            self.set_output(output.clone());
        }
        if let Some(json) = env_config.json {
            self.json = json;
        }
        Ok(())
    }

    fn apply_args(&mut self, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(concurrency) = args.concurrency {
            self.set_batch_size(concurrency);
        }
        if let Some(timeout) = args.timeout.as_deref().and_then(parse_timeout) {
            self.set_timeout(timeout);
        }
        if let Some(interval) = args.progress_every {
            self.set_progress_interval(interval);
        }
        if let Some(alphabet) = &args.alphabet {
            self.set_alphabet(alphabet)?;
        }
        if let Some(output) = &args.output {
            self.set_output(output.clone());
        }

        // Flags only override when actually passed
        if args.no_shuffle {
            self.shuffle = false;
            self.seed = None;
        }
        if args.seed.is_some() {
            self.shuffle = true;
            self.seed = args.seed;
        }
        if args.json {
            self.json = true;
        }
        Ok(())
    }

    fn set_batch_size(&mut self, batch_size: usize) {
        self.config = self.config.clone().with_batch_size(batch_size);
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.config = self.config.clone().with_timeout(timeout);
    }

    fn set_progress_interval(&mut self, interval: usize) {
        self.config = self.config.clone().with_progress_interval(interval);
    }

    fn set_output(&mut self, path: String) {
        self.config = self.config.clone().with_output_path(path);
    }

    fn set_alphabet(&mut self, alphabet: &str) -> Result<(), Box<dyn std::error::Error>> {
        let alphabet = Alphabet::parse(alphabet)?;
        self.config = self.config.clone().with_alphabet(alphabet);
        Ok(())
    }

    fn finish(&self) -> SweepConfig {
        self.config
            .clone()
            .with_order(CandidateOrder::from_flags(self.shuffle, self.seed))
    }
}
