//! File scanning and the worker pool.
//!
//! [`scan_file`] turns one file into `(term, line)` hits. [`run_pool`]
//! fans a file list out over a fixed-size `rayon` pool:
//!
//! ```text
//!  work queue (chunks of paths)        result queue (one batch per file)
//!  ┌──────────┐   ┌──────────┐          ┌────────────┐
//!  │ [p0..p9] │──▶│ worker 0 │──┐       │            │
//!  │ [p10..]  │   │ matcher  │  ├──────▶│ Aggregator │ (calling thread)
//!  │   ...    │──▶│ worker N │──┘       │            │
//!  └──────────┘   └──────────┘          └────────────┘
//! ```
//!
//! Each worker receives its own copy of the term set and builds its own
//! matcher. Workers never touch the result sets; only the aggregator does.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use termsweep_core::aggregate::{AggregateStats, Aggregator, MergeOrder, ResultSets};
use termsweep_core::error::{FileReadError, ScanError};
use termsweep_core::matcher::Matcher;
use termsweep_core::models::{FileHits, Hit};
use termsweep_core::terms::TermSet;
use tracing::{debug, warn};

use crate::progress::{should_report, ScanProgressEvent, ScanProgressReporter};

/// Lines between cancellation checks inside one file.
const CANCEL_CHECK_LINES: usize = 4096;

/// Shared abort flag, set from the interrupt handler.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub jobs: usize,
    pub chunk_size: usize,
    pub ordering: MergeOrder,
}

/// Aggregated output of a completed pool run.
#[derive(Debug)]
pub struct ScanOutcome {
    pub results: ResultSets,
    pub stats: AggregateStats,
}

/// Scan one file and return its hits in line order.
///
/// Invalid UTF-8 is replaced rather than rejected. Matching runs on a
/// lowercased copy of each line; hits carry the original line. With a
/// `cancel` token the scan stops early once it fires.
pub fn scan_file(
    path: &Path,
    matcher: &Matcher,
    cancel: Option<&CancelToken>,
) -> Result<Vec<Hit>, FileReadError> {
    File::open(path)
        .and_then(|file| scan_reader(BufReader::new(file), matcher, cancel))
        .map_err(|source| FileReadError {
            path: path.to_path_buf(),
            source,
        })
}

fn scan_reader<R: Read>(
    mut reader: BufReader<R>,
    matcher: &Matcher,
    cancel: Option<&CancelToken>,
) -> std::io::Result<Vec<Hit>> {
    let mut hits = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        if line_no % CANCEL_CHECK_LINES == 0 && cancel.is_some_and(|c| c.is_cancelled()) {
            break;
        }

        let mut end = buf.len();
        if buf[..end].ends_with(b"\n") {
            end -= 1;
        }
        if buf[..end].ends_with(b"\r") {
            end -= 1;
        }
        let line = String::from_utf8_lossy(&buf[..end]);
        let lower = line.to_lowercase();
        let terms = matcher.find_all(&lower);
        if terms.is_empty() {
            continue;
        }
        let line = line.into_owned();
        for term in terms {
            hits.push(Hit {
                term: term.to_string(),
                line: line.clone(),
            });
        }
    }
    Ok(hits)
}

/// Scan `files` on a pool of `options.jobs` workers and aggregate the hits.
///
/// Returns [`ScanError::Interrupted`] if `cancel` fires before every file
/// has been processed; partial results are dropped.
pub fn run_pool(
    files: &[PathBuf],
    terms: &TermSet,
    options: PoolOptions,
    cancel: &CancelToken,
    progress: &dyn ScanProgressReporter,
) -> Result<ScanOutcome, ScanError> {
    // Fail fast on a term set the automaton cannot hold.
    Matcher::build(terms.clone())?;

    let jobs = options.jobs.max(1);
    let chunk_size = options.chunk_size.max(1);
    let total = files.len() as u64;

    let (work_tx, work_rx) = crossbeam_channel::unbounded::<Vec<(usize, PathBuf)>>();
    let indexed: Vec<(usize, PathBuf)> = files.iter().cloned().enumerate().collect();
    for chunk in indexed.chunks(chunk_size) {
        work_tx
            .send(chunk.to_vec())
            .map_err(|e| ScanError::Pool(e.to_string()))?;
    }
    drop(work_tx);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("termsweep-scan-{}", i))
        .build()
        .map_err(|e| ScanError::Pool(e.to_string()))?;

    debug!(jobs, chunk_size, files = total, "starting worker pool");

    let (result_tx, result_rx) = crossbeam_channel::unbounded::<FileHits>();
    let aggregator = pool.in_place_scope(|scope| {
        for id in 0..jobs {
            let worker = Worker {
                id,
                terms: terms.clone(),
                work: work_rx.clone(),
                results: result_tx.clone(),
                cancel: cancel.clone(),
            };
            scope.spawn(move |_| worker.run());
        }
        drop(result_tx);

        let mut aggregator = Aggregator::new(terms, options.ordering);
        let mut done = 0u64;
        for batch in result_rx.iter() {
            if cancel.is_cancelled() {
                break;
            }
            aggregator.accept(batch);
            done += 1;
            if should_report(done, total, 100) {
                progress.report(ScanProgressEvent::Scanning { n: done, total });
            }
        }
        drop(result_rx);
        aggregator
    });

    if cancel.is_cancelled() || aggregator.stats().files_received < total {
        return Err(ScanError::Interrupted);
    }

    let (results, stats) = aggregator.finish();
    Ok(ScanOutcome { results, stats })
}

struct Worker {
    id: usize,
    terms: TermSet,
    work: Receiver<Vec<(usize, PathBuf)>>,
    results: Sender<FileHits>,
    cancel: CancelToken,
}

impl Worker {
    fn run(self) {
        let Worker {
            id,
            terms,
            work,
            results,
            cancel,
        } = self;

        let matcher = match Matcher::build(terms) {
            Ok(m) => m,
            Err(e) => {
                warn!(worker = id, error = %e, "worker could not build matcher");
                cancel.cancel();
                return;
            }
        };
        debug!(worker = id, terms = matcher.len(), "worker ready");

        for chunk in work.iter() {
            for (seq, path) in chunk {
                if cancel.is_cancelled() {
                    return;
                }
                let batch = match scan_file(&path, &matcher, Some(&cancel)) {
                    Ok(hits) => FileHits {
                        seq,
                        path,
                        hits,
                        failed: false,
                    },
                    Err(err) => {
                        warn!(error = %err, "skipping unreadable file");
                        FileHits {
                            seq,
                            path,
                            hits: Vec::new(),
                            failed: true,
                        }
                    }
                };
                if results.send(batch).is_err() {
                    return;
                }
            }
        }
    }
}
