use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use termsweep_core::aggregate::MergeOrder;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub owners: OwnersConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    /// Term list path, or a single literal term when no such file exists.
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Worker count; 0 means one per available CPU.
    #[serde(default)]
    pub jobs: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_true")]
    pub ignore_system_files: bool,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            terms: None,
            root: None,
            extensions: default_extensions(),
            jobs: 0,
            chunk_size: default_chunk_size(),
            ignore_system_files: true,
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

pub const DEFAULT_EXTENSIONS: [&str; 10] = [
    "txt", "csv", "log", "json", "sql", "tsv", "xml", "yml", "yaml", "ndjson",
];

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_chunk_size() -> usize {
    10
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_subdir")]
    pub subdir: String,
    #[serde(default)]
    pub create_empty: bool,
    #[serde(default)]
    pub ordering: MergeOrder,
    #[serde(default = "default_true")]
    pub manifest: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            subdir: default_subdir(),
            create_empty: false,
            ordering: MergeOrder::Completion,
            manifest: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_subdir() -> String {
    "Export".to_string()
}

impl OutputConfig {
    /// Directory the per-term artifacts are written to.
    pub fn export_dir(&self) -> PathBuf {
        if self.subdir.is_empty() {
            self.dir.clone()
        } else {
            self.dir.join(&self.subdir)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OwnersConfig {
    #[serde(default)]
    pub map: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub infer: bool,
}

impl Default for OwnersConfig {
    fn default() -> Self {
        Self {
            map: None,
            infer: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    #[serde(default = "default_notify_mode")]
    pub mode: String,
    #[serde(default)]
    pub outbox_dir: Option<PathBuf>,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            mode: default_notify_mode(),
            outbox_dir: None,
            from: default_from(),
            subject_prefix: default_subject_prefix(),
        }
    }
}

fn default_notify_mode() -> String {
    "off".to_string()
}
fn default_from() -> String {
    "termsweep@localhost".to_string()
}
fn default_subject_prefix() -> String {
    "[termsweep]".to_string()
}

impl NotifyConfig {
    pub fn is_enabled(&self) -> bool {
        self.mode != "off"
    }
}

/// Read and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Checks shared by file-based and flag-based configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.scan.chunk_size == 0 {
        anyhow::bail!("scan.chunk_size must be >= 1");
    }

    if config.output.subdir.contains('/') || config.output.subdir.contains('\\') {
        anyhow::bail!("output.subdir must be a single directory name");
    }

    match config.notify.mode.as_str() {
        "off" | "log" => {}
        "outbox" => {
            if config.notify.outbox_dir.is_none() {
                anyhow::bail!("notify.outbox_dir must be set when notify.mode is 'outbox'");
            }
        }
        other => anyhow::bail!(
            "Unknown notify mode: '{}'. Must be off, log, or outbox.",
            other
        ),
    }

    Ok(())
}

/// Worker count to use: the configured value, or the CPU count for 0.
pub fn effective_jobs(jobs: usize) -> usize {
    if jobs > 0 {
        return jobs;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
