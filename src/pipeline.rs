//! Scan pipeline orchestration.
//!
//! Coordinates a full run: inputs → discovery → worker pool → owner
//! resolution → artifacts → manifest → notification. Nothing is written
//! until every dispatched file has been scanned; an interrupted or failed
//! scan leaves the output directory untouched.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use termsweep_core::aggregate::ResultSets;
use termsweep_core::error::ConfigError;
use termsweep_core::models::{RunRecord, RunSummary};
use termsweep_core::owner::contact::resolve_contact;
use termsweep_core::owner::resolve::OwnerResolver;
use termsweep_core::owner::OwnerMap;
use tracing::{debug, info, warn};

use crate::config::{effective_jobs, validate, Config};
use crate::discover::{discover_files, DiscoverOptions, Discovery, ExtensionFilter};
use crate::ignore::{AllowAll, PathFilter, SystemArtifactFilter};
use crate::inputs::{load_owner_map, load_terms};
use crate::notify::{group_notices, notifier_from_config, notify_all, NotifyReport};
use crate::progress::{ScanProgressEvent, ScanProgressReporter};
use crate::scan::{run_pool, CancelToken, PoolOptions};
use crate::writer::{write_manifest, write_term, ArtifactNames};

/// Everything a completed run produced.
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub records: Vec<RunRecord>,
    pub output_dir: PathBuf,
    pub manifest: Option<PathBuf>,
    pub notify: Option<NotifyReport>,
}

/// Candidate files for the configured root, extensions and ignore policy.
///
/// A fired `cancel` token stops the walk with
/// [`termsweep_core::error::ScanError::Interrupted`].
pub fn discover(config: &Config, cancel: Option<&CancelToken>) -> Result<Discovery> {
    let root = scan_root(config)?;
    let extensions = ExtensionFilter::new(&config.scan.extensions);
    let filter: &dyn PathFilter = if config.scan.ignore_system_files {
        &SystemArtifactFilter
    } else {
        &AllowAll
    };
    let options = DiscoverOptions {
        extensions: &extensions,
        filter,
        exclude_globs: &config.scan.exclude_globs,
        follow_symlinks: config.scan.follow_symlinks,
        cancel,
    };
    discover_files(root, &options)
}

/// Owner resolver for the configured owner map (empty when none is set).
pub fn owner_resolver(config: &Config) -> OwnerResolver {
    let map = match &config.owners.map {
        Some(path) => load_owner_map(path),
        None => OwnerMap::new(),
    };
    OwnerResolver::new(map, config.owners.infer)
}

/// Final records for every term, in term-set order.
pub fn resolve_records(results: &ResultSets, resolver: &OwnerResolver) -> Vec<RunRecord> {
    results
        .iter()
        .map(|(term, lines)| {
            let resolution = resolver.resolve(term, lines);
            if let Some(found) = &resolution {
                debug!(term, owner = %found.owner, key = %found.key, via = %found.via, "resolved owner");
            }
            let owner = resolution.map(|r| r.owner);
            let contact = owner.as_deref().and_then(|o| resolve_contact(o, lines));
            RunRecord {
                term: term.to_string(),
                output: None,
                owner,
                contact,
                matched_lines: lines.len(),
            }
        })
        .collect()
}

/// Run the full pipeline.
///
/// Configuration problems surface as [`ConfigError`] and cancellation as
/// [`termsweep_core::error::ScanError::Interrupted`], both reachable via
/// `downcast_ref` on the returned error.
pub fn run_scan(
    config: &Config,
    cancel: &CancelToken,
    progress: &dyn ScanProgressReporter,
) -> Result<RunReport> {
    validate(config)?;

    let terms_input = config.scan.terms.as_deref().ok_or_else(|| {
        ConfigError::Invalid("no term list given (--terms or scan.terms)".into())
    })?;
    let terms = load_terms(terms_input)?;
    let root = scan_root(config)?;
    info!(terms = terms.len(), root = %root.display(), "starting scan");

    progress.report(ScanProgressEvent::Discovering {
        root: root.display().to_string(),
    });
    let discovery = discover(config, Some(cancel))?;
    info!(
        files = discovery.files.len(),
        ignored = discovery.ignored,
        "discovered candidate files"
    );

    let options = PoolOptions {
        jobs: effective_jobs(config.scan.jobs),
        chunk_size: config.scan.chunk_size,
        ordering: config.output.ordering,
    };
    let outcome = run_pool(&discovery.files, &terms, options, cancel, progress)?;

    let resolver = owner_resolver(config);
    let mut records = resolve_records(&outcome.results, &resolver);

    let output_dir = config.output.export_dir();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output dir {}", output_dir.display()))?;

    progress.report(ScanProgressEvent::Writing {
        terms: outcome.results.len() as u64,
    });
    let mut names = ArtifactNames::new();
    let mut outputs_failed = 0u64;
    for (record, (term, lines)) in records.iter_mut().zip(outcome.results.iter()) {
        if lines.is_empty() && !config.output.create_empty {
            continue;
        }
        let file_name = names.assign(term);
        match write_term(
            &output_dir,
            &file_name,
            term,
            lines,
            record.owner.as_deref(),
            config.output.create_empty,
        ) {
            Ok(path) => record.output = path,
            Err(e) => {
                warn!(term, "could not write result file: {:#}", e);
                outputs_failed += 1;
            }
        }
    }

    let summary = RunSummary {
        files_considered: discovery.files.len() as u64,
        files_ignored: discovery.ignored,
        files_failed: outcome.stats.files_failed,
        outputs_failed,
        terms_total: terms.len() as u64,
        terms_with_matches: outcome.results.terms_with_matches() as u64,
        total_lines: outcome.results.total_lines() as u64,
    };

    let manifest = if config.output.manifest {
        Some(write_manifest(&output_dir, root, &summary, &records)?)
    } else {
        None
    };

    let notify = run_notify(config, &records);

    Ok(RunReport {
        summary,
        records,
        output_dir,
        manifest,
        notify,
    })
}

fn run_notify(config: &Config, records: &[RunRecord]) -> Option<NotifyReport> {
    let notifier = match notifier_from_config(&config.notify) {
        Ok(Some(n)) => n,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "notification disabled");
            return None;
        }
    };
    let notices = group_notices(records);
    let report = notify_all(notifier.as_ref(), &notices);
    info!(
        backend = notifier.name(),
        sent = report.sent,
        failed = report.failed,
        "notification finished"
    );
    Some(report)
}

fn scan_root(config: &Config) -> Result<&Path, ConfigError> {
    let root = config
        .scan
        .root
        .as_deref()
        .ok_or_else(|| ConfigError::Invalid("no scan root given (--root or scan.root)".into()))?;
    if !root.is_dir() {
        return Err(ConfigError::InvalidRoot(root.to_path_buf()));
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::fs;
    use tempfile::TempDir;

    fn config(tmp: &TempDir, terms: &str) -> Config {
        let mut config = Config::default();
        config.scan.terms = Some(terms.to_string());
        config.scan.root = Some(tmp.path().join("corpus"));
        config.scan.jobs = 2;
        config.output.dir = tmp.path().join("out");
        config
    }

    #[test]
    fn test_resolve_records_with_contact_fallback() {
        let terms = termsweep_core::terms::TermSet::from_terms(["shop.example.org", "none.com"]).unwrap();
        let mut agg = termsweep_core::aggregate::Aggregator::new(&terms, Default::default());
        agg.accept(termsweep_core::models::FileHits {
            seq: 0,
            path: PathBuf::from("x"),
            hits: vec![termsweep_core::models::Hit {
                term: "shop.example.org".into(),
                line: "shop.example.org:leak@victim.net:pw".into(),
            }],
            failed: false,
        });
        let (results, _) = agg.finish();
        let resolver = OwnerResolver::new(OwnerMap::parse("example.org,Web Team\n").unwrap(), true);
        let records = resolve_records(&results, &resolver);
        assert_eq!(records[0].owner.as_deref(), Some("Web Team"));
        assert_eq!(records[0].contact.as_deref(), Some("leak@victim.net"));
        assert_eq!(records[0].matched_lines, 1);
        assert_eq!(records[1].owner, None);
        assert_eq!(records[1].contact, None);
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp, "a.com");
        let err = run_scan(&config, &CancelToken::new(), &NoProgress).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidRoot(_))
        ));
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn test_minimal_run() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("corpus")).unwrap();
        fs::write(tmp.path().join("corpus/a.txt"), "a.com here\n").unwrap();
        let report = run_scan(&config(&tmp, "a.com"), &CancelToken::new(), &NoProgress).unwrap();
        assert_eq!(report.summary.files_considered, 1);
        assert_eq!(report.summary.total_lines, 1);
        assert_eq!(report.output_dir, tmp.path().join("out/Export"));
        assert!(report.output_dir.join("a.com.txt").is_file());
        assert!(report.manifest.unwrap().is_file());
        assert!(report.notify.is_none());
    }
}
