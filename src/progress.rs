//! Scan progress reporting.
//!
//! Reports observable progress during `termsweep scan` so users see what
//! is being walked, how many files are left, and when results are being
//! written. Progress is emitted on **stderr** so stdout remains parseable
//! for scripts.

use std::io::Write;

/// A single progress event for a scan run.
#[derive(Clone, Debug)]
pub enum ScanProgressEvent {
    /// Walking the corpus root. Total unknown.
    Discovering { root: String },
    /// `n` of `total` files scanned.
    Scanning { n: u64, total: u64 },
    /// Writing artifacts for `terms` terms.
    Writing { terms: u64 },
}

/// Reports scan progress. Implementations write to stderr (human or JSON).
pub trait ScanProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the aggregating thread.
    fn report(&self, event: ScanProgressEvent);
}

/// Human-friendly progress on stderr: "scan  1,234 / 5,000 files".
pub struct StderrProgress;

impl ScanProgressReporter for StderrProgress {
    fn report(&self, event: ScanProgressEvent) {
        let line = match &event {
            ScanProgressEvent::Discovering { root } => {
                format!("scan {}  discovering...\n", root)
            }
            ScanProgressEvent::Scanning { n, total } => {
                format!(
                    "scan  {} / {} files\n",
                    format_number(*n),
                    format_number(*total)
                )
            }
            ScanProgressEvent::Writing { terms } => {
                format!("scan  writing results for {} terms\n", format_number(*terms))
            }
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ScanProgressReporter for JsonProgress {
    fn report(&self, event: ScanProgressEvent) {
        let obj = match &event {
            ScanProgressEvent::Discovering { root } => serde_json::json!({
                "event": "progress",
                "phase": "discovering",
                "root": root
            }),
            ScanProgressEvent::Scanning { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "scanning",
                "n": n,
                "total": total
            }),
            ScanProgressEvent::Writing { terms } => serde_json::json!({
                "event": "progress",
                "phase": "writing",
                "terms": terms
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ScanProgressReporter for NoProgress {
    fn report(&self, _event: ScanProgressEvent) {}
}

/// Emit a `Scanning` event only every `1/steps` of the total, and at the end.
pub fn should_report(n: u64, total: u64, steps: u64) -> bool {
    if n == total {
        return true;
    }
    let every = (total / steps.max(1)).max(1);
    n % every == 0
}

pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn ScanProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

impl std::str::FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!(
                "unknown progress mode '{}': must be off, human, or json",
                other
            )),
        }
    }
}
