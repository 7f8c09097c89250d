//! System and temporary artifact policy.
//!
//! A fixed table of names that never hold corpus data: OS metadata,
//! VCS and tool caches, editor swap and lock files, partial downloads.
//! Discovery takes the policy as a [`PathFilter`] so callers can swap it
//! out (or disable it with [`AllowAll`]).

/// Predicate deciding which directory entries discovery skips.
pub trait PathFilter: Send + Sync {
    /// Skip a directory (and everything below it) by its name.
    fn skip_dir(&self, name: &str) -> bool;

    /// Skip a file by its name.
    fn skip_file(&self, name: &str) -> bool;
}

pub const IGNORE_DIRNAMES: &[&str] = &[
    ".Spotlight-V100",
    ".Trashes",
    ".Trash",
    ".fseventsd",
    ".TemporaryItems",
    ".DocumentRevisions-V100",
    ".AppleDouble",
    ".AppleDesktop",
    ".AppleDB",
    "__pycache__",
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".cache",
    "node_modules",
    "build",
    "dist",
    "target",
];

pub const IGNORE_FILENAMES: &[&str] = &[".DS_Store", "Icon\r", "Thumbs.db", "desktop.ini"];

pub const IGNORE_FILE_PREFIXES: &[&str] = &["._", "~$", ".#", "#"];

pub const IGNORE_FILE_SUFFIXES: &[&str] = &["~"];

/// Matched case-insensitively against the end of the file name.
pub const IGNORE_FILE_EXTS: &[&str] = &[
    ".tmp",
    ".temp",
    ".swp",
    ".swo",
    ".swx",
    ".bak",
    ".old",
    ".orig",
    ".part",
    ".crdownload",
    ".download",
];

/// The built-in policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemArtifactFilter;

impl PathFilter for SystemArtifactFilter {
    fn skip_dir(&self, name: &str) -> bool {
        IGNORE_DIRNAMES.contains(&name)
    }

    fn skip_file(&self, name: &str) -> bool {
        if IGNORE_FILENAMES.contains(&name) {
            return true;
        }
        if IGNORE_FILE_PREFIXES.iter().any(|p| name.starts_with(p)) {
            return true;
        }
        if IGNORE_FILE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            return true;
        }
        let lower = name.to_lowercase();
        IGNORE_FILE_EXTS.iter().any(|e| lower.ends_with(e))
    }
}

/// Policy that skips nothing (`--no-ignore`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PathFilter for AllowAll {
    fn skip_dir(&self, _name: &str) -> bool {
        false
    }

    fn skip_file(&self, _name: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_dirs() {
        let f = SystemArtifactFilter;
        assert!(f.skip_dir(".git"));
        assert!(f.skip_dir("node_modules"));
        assert!(!f.skip_dir("dumps"));
        assert!(!f.skip_dir("Build"));
    }

    #[test]
    fn test_system_files() {
        let f = SystemArtifactFilter;
        for name in [
            ".DS_Store",
            "._leak.txt",
            "~$sheet.csv",
            ".#notes.txt",
            "#autosave#",
            "dump.txt~",
            "dump.TXT.BAK",
            "movie.part",
            "Thumbs.db",
        ] {
            assert!(f.skip_file(name), "{} should be skipped", name);
        }
        for name in ["dump.txt", "users.csv", "temp.sql", "backup.json"] {
            assert!(!f.skip_file(name), "{} should be kept", name);
        }
    }

    #[test]
    fn test_allow_all() {
        assert!(!AllowAll.skip_dir(".git"));
        assert!(!AllowAll.skip_file(".DS_Store"));
    }
}
