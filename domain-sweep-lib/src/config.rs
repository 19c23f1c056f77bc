//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `DS_*`
//! environment variables, and merging file configurations with proper
//! precedence rules. Turning the merged values into a [`SweepConfig`] is done
//! by the caller, after CLI arguments have been layered on top.
//!
//! [`SweepConfig`]: crate::SweepConfig

use crate::error::SweepError;
use crate::generate::Alphabet;
use crate::types::MAX_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for sweep options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Output preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Probes per batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// Per-probe timeout (e.g. "5000ms", "5s", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Report progress every N checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_interval: Option<usize>,

    /// Shuffle the alphabet before expansion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle: Option<bool>,

    /// Seed for the shuffle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Characters substituted for wildcards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alphabet: Option<String>,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// File the available domains are written to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Print the final summary as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    /// Load and validate configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, SweepError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SweepError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            SweepError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;

        self.validate_config(&config)?;
        debug!(path = %path.display(), "loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is the lowest precedence, then the global file in `$HOME`,
    /// then a local file in the current directory. Files that fail to load are
    /// skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, SweepError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }

        if loaded_files.len() > 1 {
            let files: Vec<String> = loaded_files
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            info!(files = ?files, "multiple config files merged, later ones win");
        }

        Ok(merged_config)
    }

    /// Local configuration file in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./domain-sweep.toml", "./.domain-sweep.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Global configuration file in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".domain-sweep.toml", "domain-sweep.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// `$XDG_CONFIG_HOME/domain-sweep/config.toml`, defaulting to `~/.config`.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-sweep").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations; values from `higher` win.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.batch_size.is_some() {
                        lower_defaults.batch_size = higher_defaults.batch_size;
                    }
                    if higher_defaults.timeout.is_some() {
                        lower_defaults.timeout = higher_defaults.timeout;
                    }
                    if higher_defaults.progress_interval.is_some() {
                        lower_defaults.progress_interval = higher_defaults.progress_interval;
                    }
                    if higher_defaults.shuffle.is_some() {
                        lower_defaults.shuffle = higher_defaults.shuffle;
                    }
                    if higher_defaults.seed.is_some() {
                        lower_defaults.seed = higher_defaults.seed;
                    }
                    if higher_defaults.alphabet.is_some() {
                        lower_defaults.alphabet = higher_defaults.alphabet;
                    }
                    Some(lower_defaults)
                }
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            output: match (lower.output, higher.output) {
                (Some(mut lower_output), Some(higher_output)) => {
                    if higher_output.file.is_some() {
                        lower_output.file = higher_output.file;
                    }
                    if higher_output.json.is_some() {
                        lower_output.json = higher_output.json;
                    }
                    Some(lower_output)
                }
                (lower_output, higher_output) => higher_output.or(lower_output),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), SweepError> {
        if let Some(defaults) = &config.defaults {
            if let Some(batch_size) = defaults.batch_size {
                validate_batch_size(batch_size)?;
            }

            if let Some(interval) = defaults.progress_interval {
                if interval == 0 {
                    return Err(SweepError::config(
                        "progress_interval must be at least 1",
                    ));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout(timeout_str).is_none() {
                    return Err(SweepError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5000ms', '5s', '1m'",
                        timeout_str
                    )));
                }
            }

            if let Some(alphabet) = &defaults.alphabet {
                Alphabet::parse(alphabet).map_err(|e| SweepError::config(e.to_string()))?;
            }
        }

        if let Some(output) = &config.output {
            if let Some(file) = &output.file {
                if file.trim().is_empty() {
                    return Err(SweepError::config("output file cannot be empty"));
                }
            }
        }

        Ok(())
    }
}

/// Check a batch size against the accepted range.
pub fn validate_batch_size(batch_size: usize) -> Result<(), SweepError> {
    if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
        return Err(SweepError::config(format!(
            "Batch size must be between 1 and {}",
            MAX_BATCH_SIZE
        )));
    }
    Ok(())
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via DS_* environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub pattern: Option<String>,
    pub batch_size: Option<usize>,
    pub timeout: Option<Duration>,
    pub output: Option<String>,
    pub progress_interval: Option<usize>,
    pub shuffle: Option<bool>,
    pub seed: Option<u64>,
    pub alphabet: Option<String>,
    pub json: Option<bool>,
    pub config: Option<String>,
}

/// Load configuration from `DS_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Same as [`load_env_config`] with an injectable variable source.
pub fn load_env_config_from<F>(get: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig {
        pattern: non_empty(get("DS_PATTERN")),
        output: non_empty(get("DS_OUTPUT")),
        config: non_empty(get("DS_CONFIG")),
        ..Default::default()
    };

    if let Some(val) = get("DS_BATCH_SIZE") {
        match val.trim().parse::<usize>() {
            Ok(n) if validate_batch_size(n).is_ok() => env_config.batch_size = Some(n),
            _ => warn!(
                "Invalid DS_BATCH_SIZE='{}', must be 1-{}",
                val, MAX_BATCH_SIZE
            ),
        }
    }

    if let Some(val) = get("DS_TIMEOUT") {
        match parse_timeout(&val) {
            Some(timeout) => env_config.timeout = Some(timeout),
            None => warn!(
                "Invalid DS_TIMEOUT='{}', use format like '5000ms', '5s', '1m'",
                val
            ),
        }
    }

    if let Some(val) = get("DS_PROGRESS_INTERVAL") {
        match val.trim().parse::<usize>() {
            Ok(n) if n > 0 => env_config.progress_interval = Some(n),
            _ => warn!("Invalid DS_PROGRESS_INTERVAL='{}', must be at least 1", val),
        }
    }

    if let Some(val) = get("DS_SEED") {
        match val.trim().parse::<u64>() {
            Ok(seed) => env_config.seed = Some(seed),
            Err(_) => warn!("Invalid DS_SEED='{}', must be an unsigned integer", val),
        }
    }

    if let Some(val) = get("DS_ALPHABET") {
        match Alphabet::parse(&val) {
            Ok(_) => env_config.alphabet = Some(val),
            Err(e) => warn!("Invalid DS_ALPHABET='{}': {}", val, e),
        }
    }

    env_config.shuffle = get("DS_SHUFFLE").and_then(|val| parse_bool_var("DS_SHUFFLE", &val));
    env_config.json = get("DS_JSON").and_then(|val| parse_bool_var("DS_JSON", &val));

    for (key, set) in [
        ("DS_BATCH_SIZE", env_config.batch_size.is_some()),
        ("DS_TIMEOUT", env_config.timeout.is_some()),
        ("DS_OUTPUT", env_config.output.is_some()),
        ("DS_SHUFFLE", env_config.shuffle.is_some()),
        ("DS_ALPHABET", env_config.alphabet.is_some()),
    ] {
        if set {
            debug!("using {} from environment", key);
        }
    }

    env_config
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bool_var(key: &str, val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            warn!("Invalid {}='{}', use true/false", key, val);
            None
        }
    }
}

/// Parse a timeout like "5000ms", "5s", "2m", or bare seconds.
pub fn parse_timeout(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let duration = if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(s) = timeout_str.strip_suffix('s') {
        s.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(m) = timeout_str.strip_suffix('m') {
        m.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    }?;

    if duration.is_zero() {
        None
    } else {
        Some(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("5000ms"), Some(Duration::from_millis(5000)));
        assert_eq!(parse_timeout("750ms"), Some(Duration::from_millis(750)));
        assert_eq!(parse_timeout("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout("0s"), None);
        assert_eq!(parse_timeout("invalid"), None);
    }

    #[test]
    fn test_parse_timeout_rejects_overflowing_minutes() {
        assert_eq!(parse_timeout("999999999999999999m"), None);
        assert_eq!(
            parse_timeout(&format!("{}m", u64::MAX / 60)),
            Some(Duration::from_secs(u64::MAX / 60 * 60))
        );
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
batch_size = 25
timeout = "3s"
progress_interval = 10
shuffle = false
alphabet = "abc"

[output]
file = "hits.txt"
json = true
"#,
        );

        let config = ConfigManager::new().load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.batch_size, Some(25));
        assert_eq!(defaults.timeout, Some("3s".to_string()));
        assert_eq!(defaults.progress_interval, Some(10));
        assert_eq!(defaults.shuffle, Some(false));
        assert_eq!(defaults.alphabet, Some("abc".to_string()));

        let output = config.output.unwrap();
        assert_eq!(output.file, Some("hits.txt".to_string()));
        assert_eq!(output.json, Some(true));
    }

    #[test]
    fn test_invalid_batch_size() {
        let temp_file = write_config("[defaults]\nbatch_size = 0\n");
        assert!(ConfigManager::new().load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let temp_file = write_config("[defaults]\ntimeout = \"soon\"\n");
        let err = ConfigManager::new().load_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_invalid_alphabet() {
        let temp_file = write_config("[defaults]\nalphabet = \"aa\"\n");
        assert!(ConfigManager::new().load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let temp_file = write_config("[defaults\nbatch_size = ");
        let err = ConfigManager::new().load_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, SweepError::ConfigError { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigManager::new()
            .load_file("/definitely/not/here/domain-sweep.toml")
            .unwrap_err();
        assert!(matches!(err, SweepError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new();

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                batch_size: Some(10),
                timeout: Some("5s".to_string()),
                shuffle: Some(true),
                ..Default::default()
            }),
            output: Some(OutputConfig {
                file: Some("lower.txt".to_string()),
                json: None,
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                batch_size: Some(40),
                shuffle: Some(false),
                ..Default::default()
            }),
            output: None,
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.batch_size, Some(40)); // Higher wins
        assert_eq!(defaults.timeout, Some("5s".to_string())); // Lower preserved
        assert_eq!(defaults.shuffle, Some(false)); // Higher wins
        assert_eq!(merged.output.unwrap().file, Some("lower.txt".to_string()));
    }

    #[test]
    fn test_env_config() {
        let vars: HashMap<&str, &str> = [
            ("DS_PATTERN", "go*.dev"),
            ("DS_BATCH_SIZE", "20"),
            ("DS_TIMEOUT", "1500ms"),
            ("DS_SHUFFLE", "off"),
            ("DS_SEED", "42"),
            ("DS_OUTPUT", "out.txt"),
            ("DS_JSON", "yes"),
        ]
        .into_iter()
        .collect();

        let env = load_env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env.pattern, Some("go*.dev".to_string()));
        assert_eq!(env.batch_size, Some(20));
        assert_eq!(env.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(env.shuffle, Some(false));
        assert_eq!(env.seed, Some(42));
        assert_eq!(env.output, Some("out.txt".to_string()));
        assert_eq!(env.json, Some(true));
        assert_eq!(env.progress_interval, None);
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = [
            ("DS_BATCH_SIZE", "0"),
            ("DS_TIMEOUT", "forever"),
            ("DS_SHUFFLE", "maybe"),
            ("DS_ALPHABET", "aab"),
            ("DS_PATTERN", "   "),
        ]
        .into_iter()
        .collect();

        let env = load_env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env, EnvConfig::default());
    }
}
