//! Per-term aggregation of scanner output.
//!
//! The [`Aggregator`] is the only writer of the [`ResultSets`]. It applies
//! one file's batch at a time, so a file's lines keep their relative order
//! inside every term's result set while blocks from different files may
//! land in any order.
//!
//! With [`MergeOrder::Path`] batches are buffered by dispatch sequence and
//! applied in that order when the aggregator finishes, which makes the
//! output independent of worker scheduling.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::models::{FileHits, Hit};
use crate::terms::TermSet;

/// How file batches are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeOrder {
    /// Apply batches as workers complete them.
    #[default]
    Completion,
    /// Apply batches in dispatch (sorted path) order.
    Path,
}

impl std::str::FromStr for MergeOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completion" => Ok(MergeOrder::Completion),
            "path" => Ok(MergeOrder::Path),
            other => Err(format!(
                "unknown ordering '{}': must be completion or path",
                other
            )),
        }
    }
}

/// Matched lines per term, iterated in term-set order.
#[derive(Debug, Clone, Default)]
pub struct ResultSets {
    order: Vec<String>,
    lines: HashMap<String, Vec<String>>,
}

impl ResultSets {
    /// One empty result set per term.
    pub fn new(terms: &TermSet) -> Self {
        let order: Vec<String> = terms.iter().cloned().collect();
        let lines = order.iter().map(|t| (t.clone(), Vec::new())).collect();
        Self { order, lines }
    }

    fn push(&mut self, hit: Hit) {
        match self.lines.get_mut(&hit.term) {
            Some(lines) => lines.push(hit.line),
            None => {
                self.order.push(hit.term.clone());
                self.lines.insert(hit.term, vec![hit.line]);
            }
        }
    }

    pub fn lines(&self, term: &str) -> Option<&[String]> {
        self.lines.get(term).map(Vec::as_slice)
    }

    /// `(term, lines)` in term-set order, including terms with no lines.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.order
            .iter()
            .map(move |t| (t.as_str(), self.lines[t].as_slice()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn terms_with_matches(&self) -> usize {
        self.lines.values().filter(|l| !l.is_empty()).count()
    }

    pub fn total_lines(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }
}

/// File-level counters collected while aggregating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub files_received: u64,
    pub files_failed: u64,
}

/// Single-owner merger of [`FileHits`] batches.
#[derive(Debug)]
pub struct Aggregator {
    sets: ResultSets,
    order: MergeOrder,
    pending: BTreeMap<usize, Vec<Hit>>,
    stats: AggregateStats,
}

impl Aggregator {
    pub fn new(terms: &TermSet, order: MergeOrder) -> Self {
        Self {
            sets: ResultSets::new(terms),
            order,
            pending: BTreeMap::new(),
            stats: AggregateStats::default(),
        }
    }

    /// Apply (or buffer) one file's batch.
    pub fn accept(&mut self, batch: FileHits) {
        self.stats.files_received += 1;
        if batch.failed {
            self.stats.files_failed += 1;
        }
        match self.order {
            MergeOrder::Completion => {
                for hit in batch.hits {
                    self.sets.push(hit);
                }
            }
            MergeOrder::Path => {
                if !batch.hits.is_empty() {
                    self.pending.insert(batch.seq, batch.hits);
                }
            }
        }
    }

    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    /// Flush buffered batches and hand back the finalized result sets.
    pub fn finish(mut self) -> (ResultSets, AggregateStats) {
        for (_, hits) in std::mem::take(&mut self.pending) {
            for hit in hits {
                self.sets.push(hit);
            }
        }
        (self.sets, self.stats)
    }
}
