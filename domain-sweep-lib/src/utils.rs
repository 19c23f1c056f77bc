//! Utility functions for pattern validation.
//!
//! The generator accepts any non-empty pattern. Deciding whether a pattern
//! looks like a domain (has a TLD, sane labels) is a caller concern, and these
//! helpers are what the CLI uses for it.

use crate::error::SweepError;
use crate::generate::WILDCARD;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// One label: letters, digits, hyphens or wildcards, no leading/trailing hyphen.
    static ref LABEL: Regex = Regex::new(r"^[a-z0-9*]([a-z0-9*-]*[a-z0-9*])?$")
        .expect("label regex is valid");

    /// Top-level label: letters or wildcards only.
    static ref TLD: Regex = Regex::new(r"^[a-z*]{2,63}$").expect("tld regex is valid");
}

/// Lowercase and trim a pattern.
pub fn normalize_pattern(pattern: &str) -> String {
    pattern.trim().to_lowercase()
}

/// Check that a pattern describes domain names with a TLD.
///
/// Accepts the normalized form; call [`normalize_pattern`] first.
pub fn validate_pattern(pattern: &str) -> Result<(), SweepError> {
    if pattern.is_empty() {
        return Err(SweepError::invalid_pattern(
            pattern,
            "pattern cannot be empty",
        ));
    }

    if pattern.len() > 253 {
        return Err(SweepError::invalid_pattern(
            pattern,
            "pattern is longer than 253 characters",
        ));
    }

    if !pattern.contains('.') {
        return Err(SweepError::invalid_pattern(
            pattern,
            "pattern must include a domain suffix (e.g. \"go*.com\")",
        ));
    }

    let labels: Vec<&str> = pattern.split('.').collect();
    for label in &labels {
        if label.is_empty() {
            return Err(SweepError::invalid_pattern(pattern, "empty label"));
        }
        if label.len() > 63 {
            return Err(SweepError::invalid_pattern(
                pattern,
                format!("label '{}' is longer than 63 characters", label),
            ));
        }
        if !LABEL.is_match(label) {
            return Err(SweepError::invalid_pattern(
                pattern,
                format!(
                    "label '{}' may only contain letters, digits, hyphens and '{}', and cannot start or end with a hyphen",
                    label, WILDCARD
                ),
            ));
        }
    }

    if let Some(tld) = labels.last() {
        if !TLD.is_match(tld) {
            return Err(SweepError::invalid_pattern(
                pattern,
                format!("'{}' is not a valid top-level domain", tld),
            ));
        }
    }

    Ok(())
}
