//! Candidate generation engine.
//!
//! Expands a wildcard pattern into every concrete domain it stands for.
//! Each `*` is exactly one character position and is filled with every
//! character of the [`Alphabet`], left to right, depth first.
//!
//! # Examples
//!
//! ```
//! use domain_sweep_lib::generate::{generate_candidates, Alphabet};
//! use domain_sweep_lib::CandidateOrder;
//!
//! let alphabet = Alphabet::parse("ab").unwrap();
//! let names = generate_candidates("te*t.com", &alphabet, CandidateOrder::Sequential).unwrap();
//! assert_eq!(names, vec!["teat.com", "tebt.com"]);
//!
//! // No wildcard: the pattern itself
//! let names = generate_candidates("example.com", &alphabet, CandidateOrder::Sequential).unwrap();
//! assert_eq!(names, vec!["example.com"]);
//! ```
//!
//! There is no cap on output size. Callers should bound the run with
//! [`estimate_candidate_count`] before generating.

use crate::error::SweepError;
use crate::types::CandidateOrder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

/// Placeholder for one substitutable character position.
pub const WILDCARD: char = '*';

/// Ordered, duplicate-free set of characters used to fill wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet, rejecting empty sets, duplicates and the wildcard itself.
    pub fn new(chars: Vec<char>) -> Result<Self, SweepError> {
        if chars.is_empty() {
            return Err(SweepError::invalid_alphabet("alphabet cannot be empty"));
        }

        let mut seen = HashSet::with_capacity(chars.len());
        for &c in &chars {
            if c == WILDCARD {
                return Err(SweepError::invalid_alphabet(
                    "alphabet cannot contain the wildcard marker '*'",
                ));
            }
            if c.is_whitespace() {
                return Err(SweepError::invalid_alphabet(
                    "alphabet cannot contain whitespace",
                ));
            }
            if !seen.insert(c) {
                return Err(SweepError::invalid_alphabet(format!(
                    "duplicate character '{}'",
                    c
                )));
            }
        }

        Ok(Self { chars })
    }

    /// Build an alphabet from the characters of a string, in order.
    pub fn parse(s: &str) -> Result<Self, SweepError> {
        Self::new(s.trim().chars().collect())
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; an alphabet cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The branch order to expand with for the given candidate order.
    ///
    /// Shuffling happens once here, not per wildcard position.
    pub fn ordered(&self, order: CandidateOrder) -> Vec<char> {
        let mut chars = self.chars.clone();
        match order {
            CandidateOrder::Sequential => {}
            CandidateOrder::Random => chars.shuffle(&mut rand::thread_rng()),
            CandidateOrder::Seeded(seed) => chars.shuffle(&mut StdRng::seed_from_u64(seed)),
        }
        chars
    }
}

impl Default for Alphabet {
    /// Lowercase letters followed by digits.
    fn default() -> Self {
        Self {
            chars: ('a'..='z').chain('0'..='9').collect(),
        }
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: String = self.chars.iter().collect();
        write!(f, "{}", s)
    }
}

/// Number of wildcard markers in a pattern.
pub fn count_wildcards(pattern: &str) -> usize {
    pattern.chars().filter(|&c| c == WILDCARD).count()
}

/// How many candidates a pattern expands to, saturating at `usize::MAX`.
pub fn estimate_candidate_count(pattern: &str, alphabet: &Alphabet) -> usize {
    let mut count: usize = 1;
    for _ in 0..count_wildcards(pattern) {
        count = count.saturating_mul(alphabet.len());
    }
    count
}

/// Expand a pattern into its full candidate set.
///
/// Wildcard positions are expanded left to right; for each position every
/// alphabet character is tried in branch order before moving on, so with
/// `CandidateOrder::Sequential` the output is the lexicographic product in
/// alphabet order.
pub fn generate_candidates(
    pattern: &str,
    alphabet: &Alphabet,
    order: CandidateOrder,
) -> Result<Vec<String>, SweepError> {
    if pattern.trim().is_empty() {
        return Err(SweepError::invalid_pattern(
            pattern,
            "pattern cannot be empty",
        ));
    }

    let mut buffer: Vec<char> = pattern.chars().collect();
    let positions: Vec<usize> = buffer
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == WILDCARD)
        .map(|(i, _)| i)
        .collect();

    if positions.is_empty() {
        return Ok(vec![pattern.to_string()]);
    }

    let branches = alphabet.ordered(order);
    let mut out = Vec::with_capacity(estimate_candidate_count(pattern, alphabet).min(1_000_000));
    expand(&mut buffer, &positions, &branches, &mut out);
    Ok(out)
}

fn expand(buffer: &mut [char], positions: &[usize], branches: &[char], out: &mut Vec<String>) {
    match positions.split_first() {
        None => out.push(buffer.iter().collect()),
        Some((&pos, rest)) => {
            for &c in branches {
                buffer[pos] = c;
                expand(buffer, rest, branches, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Alphabet {
        Alphabet::parse("ab").unwrap()
    }

    // ── Alphabet ────────────────────────────────────────────────────

    #[test]
    fn test_default_alphabet() {
        let alphabet = Alphabet::default();
        assert_eq!(alphabet.len(), 36);
        assert_eq!(alphabet.chars()[0], 'a');
        assert_eq!(alphabet.chars()[25], 'z');
        assert_eq!(alphabet.chars()[26], '0');
        assert_eq!(alphabet.to_string(), "abcdefghijklmnopqrstuvwxyz0123456789");
    }

    #[test]
    fn test_alphabet_rejects_empty() {
        assert!(matches!(
            Alphabet::parse(""),
            Err(SweepError::InvalidAlphabet { .. })
        ));
    }

    #[test]
    fn test_alphabet_rejects_duplicates() {
        let err = Alphabet::parse("abca").unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_alphabet_rejects_wildcard() {
        assert!(Alphabet::parse("a*").is_err());
    }

    #[test]
    fn test_sequential_order_is_identity() {
        let alphabet = Alphabet::default();
        assert_eq!(
            alphabet.ordered(CandidateOrder::Sequential),
            alphabet.chars().to_vec()
        );
    }

    #[test]
    fn test_seeded_order_is_permutation() {
        let alphabet = Alphabet::default();
        let mut shuffled = alphabet.ordered(CandidateOrder::Seeded(42));
        shuffled.sort_unstable();
        let mut original = alphabet.chars().to_vec();
        original.sort_unstable();
        assert_eq!(shuffled, original);
    }

    // ── Expansion ───────────────────────────────────────────────────

    #[test]
    fn test_no_wildcard_returns_pattern() {
        let names = generate_candidates("example.com", &ab(), CandidateOrder::Random).unwrap();
        assert_eq!(names, vec!["example.com"]);
    }

    #[test]
    fn test_single_wildcard_in_order() {
        let names = generate_candidates("te*t.com", &ab(), CandidateOrder::Sequential).unwrap();
        assert_eq!(names, vec!["teat.com", "tebt.com"]);
    }

    #[test]
    fn test_two_wildcards_left_to_right() {
        let names = generate_candidates("**.io", &ab(), CandidateOrder::Sequential).unwrap();
        assert_eq!(names, vec!["aa.io", "ab.io", "ba.io", "bb.io"]);
    }

    #[test]
    fn test_count_is_power_of_alphabet() {
        let alphabet = Alphabet::default();
        let names = generate_candidates("x**.com", &alphabet, CandidateOrder::Sequential).unwrap();
        assert_eq!(names.len(), 36 * 36);

        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());

        for name in &names {
            assert_eq!(name.len(), "x**.com".len());
            assert!(name.starts_with('x'));
            assert!(name.ends_with(".com"));
            assert!(!name.contains('*'));
        }
    }

    #[test]
    fn test_empty_pattern_error() {
        let result = generate_candidates("", &ab(), CandidateOrder::Sequential);
        assert!(matches!(result, Err(SweepError::InvalidPattern { .. })));
    }

    #[test]
    fn test_sequential_is_idempotent() {
        let alphabet = Alphabet::default();
        let first = generate_candidates("a*b*.net", &alphabet, CandidateOrder::Sequential).unwrap();
        let second = generate_candidates("a*b*.net", &alphabet, CandidateOrder::Sequential).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_is_reproducible_and_same_set() {
        let alphabet = Alphabet::default();
        let first = generate_candidates("**.dev", &alphabet, CandidateOrder::Seeded(7)).unwrap();
        let second = generate_candidates("**.dev", &alphabet, CandidateOrder::Seeded(7)).unwrap();
        assert_eq!(first, second);

        let sequential = generate_candidates("**.dev", &alphabet, CandidateOrder::Sequential).unwrap();
        let a: HashSet<_> = first.iter().collect();
        let b: HashSet<_> = sequential.iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_uses_one_permutation_for_all_positions() {
        let alphabet = Alphabet::default();
        let branches = alphabet.ordered(CandidateOrder::Seeded(99));
        let names = generate_candidates("**", &alphabet, CandidateOrder::Seeded(99)).unwrap();
        // First branch character is fixed while the second position cycles
        // through the very same permutation.
        let first: String = [branches[0], branches[0]].iter().collect();
        let second: String = [branches[0], branches[1]].iter().collect();
        assert_eq!(names[0], first);
        assert_eq!(names[1], second);
    }

    // ── Estimates ───────────────────────────────────────────────────

    #[test]
    fn test_count_wildcards() {
        assert_eq!(count_wildcards("example.com"), 0);
        assert_eq!(count_wildcards("*a*b*.com"), 3);
    }

    #[test]
    fn test_estimate() {
        let alphabet = Alphabet::default();
        assert_eq!(estimate_candidate_count("plain.com", &alphabet), 1);
        assert_eq!(estimate_candidate_count("***.com", &alphabet), 36usize.pow(3));
    }

    #[test]
    fn test_estimate_overflow_saturation() {
        let alphabet = Alphabet::default();
        let pattern = "*".repeat(40);
        assert_eq!(estimate_candidate_count(&pattern, &alphabet), usize::MAX);
    }
}
