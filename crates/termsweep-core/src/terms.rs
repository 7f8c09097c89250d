//! Term set loading and normalization.
//!
//! A term is a trimmed, lowercased search string. The set keeps the first
//! occurrence of every term and preserves that order, so output and
//! resolution always walk terms in the order the user listed them.
//!
//! # Example
//!
//! ```rust
//! use termsweep_core::terms::TermSet;
//!
//! let terms = TermSet::parse("# targets\nExample.com\n\nexample.com\nshop.example.com\n").unwrap();
//! assert_eq!(terms.as_slice(), ["example.com", "shop.example.com"]);
//! ```

use std::collections::HashSet;

use crate::error::ConfigError;

/// Ordered set of unique, normalized search terms. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSet {
    terms: Vec<String>,
}

/// Trim and lowercase a raw term.
pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl TermSet {
    /// Parse a newline-delimited term list.
    ///
    /// Blank lines and lines starting with `#` (after trimming) are
    /// skipped. Fails with [`ConfigError::EmptyTermSet`] when nothing is
    /// left.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let candidates = text
            .lines()
            .map(normalize_term)
            .filter(|t| !t.starts_with('#'));
        Self::collect(candidates)
    }

    /// Build a set holding a single literal term.
    pub fn from_literal(raw: &str) -> Result<Self, ConfigError> {
        Self::collect(std::iter::once(normalize_term(raw)))
    }

    /// Build a set from already-split terms. Each term is normalized and
    /// blanks are dropped; `#` has no special meaning here.
    pub fn from_terms<I, S>(terms: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::collect(terms.into_iter().map(|t| normalize_term(t.as_ref())))
    }

    fn collect(candidates: impl Iterator<Item = String>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        for term in candidates {
            if term.is_empty() {
                continue;
            }
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
        if terms.is_empty() {
            return Err(ConfigError::EmptyTermSet);
        }
        Ok(Self { terms })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.terms.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.terms
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }
}

impl<'a> IntoIterator for &'a TermSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}
