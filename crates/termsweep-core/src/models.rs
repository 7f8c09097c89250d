//! Data types that flow through the scan pipeline.

use std::path::PathBuf;

use serde::Serialize;

/// One (term, line) pair emitted by the file scanner.
///
/// `line` is the original line content, not the lowercased copy used for
/// matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub term: String,
    pub line: String,
}

/// Everything one file contributed, delivered to the aggregator as a unit.
#[derive(Debug, Clone)]
pub struct FileHits {
    /// Position of the file in the dispatch order.
    pub seq: usize,
    pub path: PathBuf,
    /// Hits in the file's line order.
    pub hits: Vec<Hit>,
    /// The file could not be read; `hits` is empty.
    pub failed: bool,
}

/// Final per-term record of a run, consumed by the notification stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub term: String,
    /// Result artifact, absent when none was written.
    pub output: Option<PathBuf>,
    pub owner: Option<String>,
    pub contact: Option<String>,
    pub matched_lines: usize,
}

/// Counters reported at the end of every completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_considered: u64,
    pub files_ignored: u64,
    pub files_failed: u64,
    /// Result files that could not be written.
    pub outputs_failed: u64,
    pub terms_total: u64,
    pub terms_with_matches: u64,
    pub total_lines: u64,
}
