//! Result artifacts and the run manifest.
//!
//! One text file per term lands in the export directory:
//!
//! ```text
//! # Results for: shop.example.com
//! # Owner: Alice alice@corp.test
//! visit shop.example.com today
//! ```
//!
//! Terms without matches get a `(no matches)` marker when empty outputs are
//! requested and no file at all otherwise. `run.json` records the summary
//! and every term's final record for downstream tooling.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use termsweep_core::models::{RunRecord, RunSummary};
use termsweep_core::owner::contact::display_owner;
use tracing::warn;

pub const NO_MATCHES: &str = "(no matches)";
pub const MANIFEST_FILE: &str = "run.json";

/// Longest file stem kept before a hash suffix is added.
const MAX_STEM_BYTES: usize = 200;

/// Term as a file name: path separators and NUL become `_`.
///
/// Stems longer than 200 bytes are cut and suffixed with a short hash of
/// the term, keeping the name under common file system limits.
pub fn safe_file_name(term: &str) -> String {
    let stem: String = term
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    if stem.len() <= MAX_STEM_BYTES {
        return format!("{}.txt", stem);
    }
    let mut end = MAX_STEM_BYTES;
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}-{}.txt", &stem[..end], short_hash(term))
}

fn short_hash(term: &str) -> String {
    Sha256::digest(term.as_bytes())
        .iter()
        .take(6)
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Hands out distinct artifact names within one run.
///
/// Terms such as `a/b` and `a_b` share a sanitized name; every term after
/// the first gets a hash suffix instead of overwriting the earlier file.
#[derive(Debug, Default)]
pub struct ArtifactNames {
    used: HashSet<String>,
}

impl ArtifactNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, term: &str) -> String {
        let name = safe_file_name(term);
        if self.used.insert(name.clone()) {
            return name;
        }
        let stem = name.strip_suffix(".txt").unwrap_or(&name);
        let renamed = format!("{}-{}.txt", stem, short_hash(term));
        warn!(term, file = %name, renamed = %renamed, "result file name already used; renaming");
        self.used.insert(renamed.clone());
        renamed
    }
}

/// Owner annotation for the artifact header, `None` when there is no owner.
///
/// A bare email address is kept as-is; anything else is display-cleaned.
pub fn owner_annotation(owner: Option<&str>) -> Option<String> {
    let cleaned = display_owner(owner?);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Write the artifact for one term as `dir/file_name`. Returns `None` when
/// nothing was written.
pub fn write_term(
    dir: &Path,
    file_name: &str,
    term: &str,
    lines: &[String],
    owner: Option<&str>,
    create_empty: bool,
) -> Result<Option<PathBuf>> {
    if lines.is_empty() && !create_empty {
        return Ok(None);
    }

    let path = dir.join(file_name);
    let file = fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# Results for: {}", term)?;
    if let Some(annotation) = owner_annotation(owner) {
        writeln!(out, "# Owner: {}", annotation)?;
    }
    if lines.is_empty() {
        writeln!(out, "{}", NO_MATCHES)?;
    } else {
        for line in lines {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(Some(path))
}

#[derive(Serialize)]
struct Manifest<'a> {
    generated_at: DateTime<Utc>,
    root: &'a Path,
    output_dir: &'a Path,
    summary: &'a RunSummary,
    records: &'a [RunRecord],
}

/// Write `run.json` into `dir`.
pub fn write_manifest(
    dir: &Path,
    root: &Path,
    summary: &RunSummary,
    records: &[RunRecord],
) -> Result<PathBuf> {
    let manifest = Manifest {
        generated_at: Utc::now(),
        root,
        output_dir: dir,
        summary,
        records,
    };
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
