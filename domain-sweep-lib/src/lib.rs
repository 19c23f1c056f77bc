//! # Domain Sweep Library
//!
//! Expands a wildcard domain pattern into every concrete candidate and probes
//! each one through DNS to find names that do not resolve.
//!
//! Probing runs in sequential batches: all lookups of a batch run together and
//! the next batch starts only after the previous one has fully drained, so the
//! number of lookups in flight never exceeds the batch size.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_sweep_lib::{DnsResolver, LineSink, NoopReporter, SweepConfig, Sweeper};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SweepConfig::default().with_batch_size(20);
//!     let resolver = DnsResolver::from_system(config.timeout);
//!     let sink = LineSink::create(&config.output_path)?;
//!
//!     let summary = Sweeper::new(resolver, config)
//!         .sweep("te*t.com", &sink, &NoopReporter, &CancellationToken::new())
//!         .await?;
//!
//!     println!("{} of {} available", summary.stats.available, summary.stats.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Wildcard expansion**: `*` stands for one character from a configurable alphabet
//! - **Bounded concurrency**: batch size is the only in-flight cap
//! - **Contained failures**: a failed or slow probe is counted, never fatal
//! - **Streaming results**: available names are appended as soon as they are found
//! - **Pluggable seams**: resolver, sink and progress reporter are traits

// Re-export main public API types and functions
pub use config::{
    load_env_config, load_env_config_from, parse_timeout, validate_batch_size, ConfigManager,
    DefaultsConfig, EnvConfig, FileConfig, OutputConfig,
};
pub use error::SweepError;
pub use probe::{probe, DnsResolver, Lookup, Resolver};
pub use progress::{format_duration, NoopReporter, Progress, ProgressReporter};
pub use scheduler::Sweeper;
pub use sink::{LineSink, ResultSink};
pub use stats::{RecentHits, RunStats, StatsSnapshot, RECENT_HITS_CAPACITY};
pub use types::{
    CandidateOrder, ProbeOutcome, RunSummary, SweepConfig, DEFAULT_BATCH_SIZE,
    DEFAULT_OUTPUT_FILE, DEFAULT_PROGRESS_INTERVAL, DEFAULT_TIMEOUT, MAX_BATCH_SIZE,
};
pub use utils::{normalize_pattern, validate_pattern};

// Public modules
pub mod generate;

// Re-export generation types for convenience
pub use generate::{
    count_wildcards, estimate_candidate_count, generate_candidates, Alphabet, WILDCARD,
};

// Internal modules - these are not part of the public API
mod config;
mod error;
mod probe;
mod progress;
mod scheduler;
mod sink;
mod stats;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SweepError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
