use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use termsweep_core::error::{ConfigError, ScanError};
use tracing::debug;
use walkdir::WalkDir;

use crate::ignore::PathFilter;
use crate::scan::CancelToken;

/// Candidate files found under a root.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Sorted candidate paths.
    pub files: Vec<PathBuf>,
    /// Files skipped by the ignore policy or exclude globs, plus entries
    /// that could not be read during the walk.
    pub ignored: u64,
}

/// Case- and dot-insensitive extension allow-list. Empty accepts all.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    allowed: HashSet<String>,
}

impl ExtensionFilter {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let allowed = extensions
            .iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { allowed }
    }

    /// True when every extension is accepted.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn accepts(&self, path: &Path) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        path.extension()
            .map(|e| self.allowed.contains(&e.to_string_lossy().to_lowercase()))
            .unwrap_or(false)
    }
}

/// Options for [`discover_files`].
pub struct DiscoverOptions<'a> {
    pub extensions: &'a ExtensionFilter,
    pub filter: &'a dyn PathFilter,
    pub exclude_globs: &'a [String],
    pub follow_symlinks: bool,
    /// Checked once per entry; a fired token aborts the walk.
    pub cancel: Option<&'a CancelToken>,
}

/// Walk `root` and return the candidate files.
///
/// Fails only when the root itself is not a readable directory; entries
/// that error during the walk are counted as ignored.
pub fn discover_files(root: &Path, options: &DiscoverOptions<'_>) -> Result<Discovery> {
    if !root.is_dir() {
        return Err(ConfigError::InvalidRoot(root.to_path_buf()).into());
    }
    std::fs::read_dir(root).map_err(|_| ConfigError::InvalidRoot(root.to_path_buf()))?;

    let exclude_set = build_globset(options.exclude_globs)?;
    let filter = options.filter;

    let mut files = Vec::new();
    let mut ignored = 0u64;

    let walker = WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !filter.skip_dir(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        if options.cancel.is_some_and(|c| c.is_cancelled()) {
            return Err(ScanError::Interrupted.into());
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                ignored += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if filter.skip_file(&entry.file_name().to_string_lossy()) {
            ignored += 1;
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude_set.is_match(relative) {
            ignored += 1;
            continue;
        }

        if !options.extensions.accepts(path) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    // Sort for deterministic dispatch order
    files.sort();

    Ok(Discovery { files, ignored })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore::{AllowAll, SystemArtifactFilter};
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("archive")).unwrap();
        fs::write(root.join("a/one.txt"), "x").unwrap();
        fs::write(root.join("a/b/two.CSV"), "x").unwrap();
        fs::write(root.join("a/b/image.png"), "x").unwrap();
        fs::write(root.join("a/.DS_Store"), "x").unwrap();
        fs::write(root.join("a/dump.txt.tmp"), "x").unwrap();
        fs::write(root.join(".git/config.txt"), "x").unwrap();
        fs::write(root.join("archive/old.txt"), "x").unwrap();
        tmp
    }

    fn names(d: &Discovery, root: &Path) -> Vec<String> {
        d.files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_extension_filter() {
        let f = ExtensionFilter::new(&[".TXT", " csv ", ""]);
        assert!(f.accepts(Path::new("x/y.txt")));
        assert!(f.accepts(Path::new("y.Csv")));
        assert!(!f.accepts(Path::new("y.png")));
        assert!(!f.accepts(Path::new("noext")));
        assert!(ExtensionFilter::new::<&str>(&[]).accepts(Path::new("noext")));
    }

    #[test]
    fn test_discover_with_policy() {
        let tmp = tree();
        let exts = ExtensionFilter::new(&["txt", "csv"]);
        let excludes = vec!["archive/**".to_string()];
        let opts = DiscoverOptions {
            extensions: &exts,
            filter: &SystemArtifactFilter,
            exclude_globs: &excludes,
            follow_symlinks: false,
            cancel: None,
        };
        let d = discover_files(tmp.path(), &opts).unwrap();
        assert_eq!(names(&d, tmp.path()), ["a/b/two.CSV", "a/one.txt"]);
        // .DS_Store, dump.txt.tmp, archive/old.txt
        assert_eq!(d.ignored, 3);
    }

    #[test]
    fn test_discover_without_policy() {
        let tmp = tree();
        let exts = ExtensionFilter::new(&["txt"]);
        let opts = DiscoverOptions {
            extensions: &exts,
            filter: &AllowAll,
            exclude_globs: &[],
            follow_symlinks: false,
            cancel: None,
        };
        let d = discover_files(tmp.path(), &opts).unwrap();
        assert_eq!(
            names(&d, tmp.path()),
            [".git/config.txt", "a/one.txt", "archive/old.txt"]
        );
        assert_eq!(d.ignored, 0);
    }

    #[test]
    fn test_cancelled_walk_is_interrupted() {
        let tmp = tree();
        let exts = ExtensionFilter::default();
        let cancel = CancelToken::new();
        cancel.cancel();
        let opts = DiscoverOptions {
            extensions: &exts,
            filter: &AllowAll,
            exclude_globs: &[],
            follow_symlinks: false,
            cancel: Some(&cancel),
        };
        let err = discover_files(tmp.path(), &opts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScanError>(),
            Some(ScanError::Interrupted)
        ));
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let exts = ExtensionFilter::default();
        let opts = DiscoverOptions {
            extensions: &exts,
            filter: &AllowAll,
            exclude_globs: &[],
            follow_symlinks: false,
            cancel: None,
        };
        let err = discover_files(&tmp.path().join("nope"), &opts).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
