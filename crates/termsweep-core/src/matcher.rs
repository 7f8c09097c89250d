//! Multi-pattern substring matcher.
//!
//! Wraps an Aho-Corasick automaton built over the whole [`TermSet`]. A
//! single pass over a line reports every term that occurs in it, in
//! `O(line + matches)` time regardless of how many terms are loaded.
//!
//! Overlapping iteration is used so that a term which is a substring of
//! another term (or overlaps it in the text) is still reported. Repeated
//! hits of one term within a line collapse to a single report.
//!
//! The matcher is immutable after [`Matcher::build`] and is `Send + Sync`.

use aho_corasick::{AhoCorasick, MatchKind};

use crate::error::ConfigError;
use crate::terms::TermSet;

/// Compiled automaton plus the terms it reports.
#[derive(Debug, Clone)]
pub struct Matcher {
    automaton: AhoCorasick,
    terms: TermSet,
}

impl Matcher {
    /// Compile the automaton for `terms`.
    pub fn build(terms: TermSet) -> Result<Self, ConfigError> {
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(terms.iter())
            .map_err(|e| ConfigError::Matcher(e.to_string()))?;
        Ok(Self { automaton, terms })
    }

    /// Every distinct term occurring in `text`, in term-set order.
    ///
    /// Matching is exact over the bytes given; callers lowercase the line
    /// first for case-insensitive search.
    pub fn find_all<'a>(&'a self, text: &str) -> Vec<&'a str> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut ids: Vec<usize> = self
            .automaton
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .map(|id| self.terms.as_slice()[id].as_str())
            .collect()
    }

    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
