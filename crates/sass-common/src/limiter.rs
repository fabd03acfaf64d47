//! Repetition limiting for diagnostics.
//!
//! Sass warns at most a handful of times for the same repeated deprecation
//! before collapsing further occurrences into a summary count. Unlike a
//! global dedup set, a [`RepetitionLimiter`] is owned by whichever
//! [`Logger`](#) or compilation context created it, so two concurrent
//! compilations never share state.

use std::collections::HashMap;

/// How many times the same key is allowed to print before being counted
/// silently instead.
pub const DEFAULT_LIMIT: usize = 5;

/// Tracks how many times each deduplication key has been seen, allowing the
/// first `limit` occurrences through and silently counting the rest.
#[derive(Debug, Clone)]
pub struct RepetitionLimiter {
    limit: usize,
    seen: HashMap<String, usize>,
}

/// What a caller should do with one occurrence of a repeated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// This occurrence should be printed; it is the `usize`th time seen (1-based).
    Print(usize),
    /// The limit has been reached; this occurrence should be counted but not printed.
    Suppressed,
}

impl RepetitionLimiter {
    /// Create a limiter that allows each key through [`DEFAULT_LIMIT`] times.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// Create a limiter with a custom repetition limit. A limit of `0` means
    /// unlimited (every occurrence is admitted) — used for `verbose` mode.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            seen: HashMap::new(),
        }
    }

    /// Record one occurrence of `key` and decide whether it should be printed.
    pub fn admit(&mut self, key: &str) -> Admission {
        let count = self.seen.entry(key.to_string()).or_insert(0);
        *count += 1;
        if self.limit == 0 || *count <= self.limit {
            Admission::Print(*count)
        } else {
            Admission::Suppressed
        }
    }

    /// Number of occurrences recorded for `key`, including suppressed ones.
    #[must_use]
    pub fn count(&self, key: &str) -> usize {
        self.seen.get(key).copied().unwrap_or(0)
    }

    /// Total number of occurrences suppressed across all keys, for a final
    /// "and N more" summary line.
    #[must_use]
    pub fn total_suppressed(&self) -> usize {
        if self.limit == 0 {
            return 0;
        }
        self.seen
            .values()
            .map(|&count| count.saturating_sub(self.limit))
            .sum()
    }
}

impl Default for RepetitionLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_limit_then_suppresses() {
        let mut limiter = RepetitionLimiter::with_limit(2);
        assert_eq!(limiter.admit("dup"), Admission::Print(1));
        assert_eq!(limiter.admit("dup"), Admission::Print(2));
        assert_eq!(limiter.admit("dup"), Admission::Suppressed);
        assert_eq!(limiter.admit("dup"), Admission::Suppressed);
        assert_eq!(limiter.total_suppressed(), 2);
    }

    #[test]
    fn distinct_keys_tracked_independently() {
        let mut limiter = RepetitionLimiter::with_limit(1);
        assert_eq!(limiter.admit("a"), Admission::Print(1));
        assert_eq!(limiter.admit("b"), Admission::Print(1));
        assert_eq!(limiter.admit("a"), Admission::Suppressed);
    }

    #[test]
    fn zero_limit_means_unlimited() {
        let mut limiter = RepetitionLimiter::with_limit(0);
        for i in 1..=10 {
            assert_eq!(limiter.admit("x"), Admission::Print(i));
        }
        assert_eq!(limiter.total_suppressed(), 0);
    }
}
