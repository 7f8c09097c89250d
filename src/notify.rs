//! Owner notification.
//!
//! The scan core only produces [`RunRecord`]s. This module groups them by
//! contact address and hands each group to a [`Notifier`]. Delivery is
//! best-effort: a failed notice is logged and counted, never fatal.
//!
//! ```text
//!  RunRecord ─┐
//!  RunRecord ─┼─▶ group_notices() ─▶ Notice (one per contact) ─▶ dyn Notifier
//!  RunRecord ─┘                                                  ├─ LogNotifier
//!                                                                └─ OutboxNotifier (.eml)
//! ```

use chrono::Utc;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use termsweep_core::models::RunRecord;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::NotifyConfig;

/// Everything one contact is told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub contact: String,
    /// Owner string of the first record for this contact.
    pub owner: Option<String>,
    pub records: Vec<RunRecord>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to write outbox message {path}: {source}")]
    Outbox {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid notify mode '{0}': must be off, log, or outbox")]
    Mode(String),
}

/// Delivery backend for owner notices.
pub trait Notifier: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    fn send(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Dry run: logs what would be sent.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let terms: Vec<&str> = notice.records.iter().map(|r| r.term.as_str()).collect();
        info!(
            contact = %notice.contact,
            owner = notice.owner.as_deref().unwrap_or("-"),
            terms = ?terms,
            "would notify"
        );
        Ok(())
    }
}

/// Writes one RFC 5322 message per notice into a directory, for pickup by
/// an external mail transfer agent.
pub struct OutboxNotifier {
    dir: PathBuf,
    from: String,
    subject_prefix: String,
}

impl OutboxNotifier {
    pub fn new(dir: PathBuf, from: String, subject_prefix: String) -> Self {
        Self {
            dir,
            from,
            subject_prefix,
        }
    }

    fn message_path(&self, contact: &str) -> PathBuf {
        let name: String = contact
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '@') { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.eml", name))
    }
}

impl Notifier for OutboxNotifier {
    fn name(&self) -> &str {
        "outbox"
    }

    fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let path = self.message_path(&notice.contact);
        let message = render_message(&self.from, &self.subject_prefix, notice);
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, message))
            .map_err(|source| NotifyError::Outbox {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "queued notice");
        Ok(())
    }
}

/// Render a plain-text RFC 5322 message with CRLF line endings.
pub fn render_message(from: &str, subject_prefix: &str, notice: &Notice) -> String {
    let subject = if notice.records.len() == 1 {
        format!("{} matches for {}", subject_prefix, notice.records[0].term)
    } else {
        format!("{} matches for {} terms", subject_prefix, notice.records.len())
    };

    let mut body = String::new();
    let greeting = notice.owner.as_deref().unwrap_or(&notice.contact);
    let _ = writeln!(body, "Hello {},", greeting);
    let _ = writeln!(body);
    let _ = writeln!(body, "A scan found lines matching terms you own:");
    let _ = writeln!(body);
    for record in &notice.records {
        let output = record
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            body,
            "  {}  {} lines  {}",
            record.term, record.matched_lines, output
        );
    }

    let mut message = String::new();
    let _ = write!(message, "From: {}\r\n", from);
    let _ = write!(message, "To: {}\r\n", notice.contact);
    let _ = write!(message, "Subject: {}\r\n", subject);
    let _ = write!(message, "Date: {}\r\n", Utc::now().to_rfc2822());
    message.push_str("MIME-Version: 1.0\r\n");
    message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
    message.push_str("\r\n");
    for line in body.lines() {
        message.push_str(line);
        message.push_str("\r\n");
    }
    message
}

/// Group records by contact. Records without a contact are skipped.
pub fn group_notices(records: &[RunRecord]) -> Vec<Notice> {
    let mut grouped: BTreeMap<String, Notice> = BTreeMap::new();
    for record in records {
        let Some(contact) = record.contact.as_deref() else {
            if record.owner.is_some() {
                debug!(term = %record.term, "owner has no contact address");
            }
            continue;
        };
        let key = contact.to_lowercase();
        grouped
            .entry(key)
            .or_insert_with(|| Notice {
                contact: contact.to_string(),
                owner: record.owner.clone(),
                records: Vec::new(),
            })
            .records
            .push(record.clone());
    }
    grouped.into_values().collect()
}

/// Outcome of the notification stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub sent: usize,
    pub failed: usize,
}

/// Send every notice, logging failures.
pub fn notify_all(notifier: &dyn Notifier, notices: &[Notice]) -> NotifyReport {
    let mut report = NotifyReport::default();
    for notice in notices {
        match notifier.send(notice) {
            Ok(()) => report.sent += 1,
            Err(e) => {
                warn!(backend = notifier.name(), error = %e, "notification failed");
                report.failed += 1;
            }
        }
    }
    report
}

/// Notifier for the configured mode, `None` when notification is off.
pub fn notifier_from_config(config: &NotifyConfig) -> Result<Option<Box<dyn Notifier>>, NotifyError> {
    match config.mode.as_str() {
        "off" => Ok(None),
        "log" => Ok(Some(Box::new(LogNotifier))),
        "outbox" => {
            let dir = config
                .outbox_dir
                .clone()
                .ok_or_else(|| NotifyError::Mode("outbox (missing notify.outbox_dir)".into()))?;
            Ok(Some(Box::new(OutboxNotifier::new(
                dir,
                config.from.clone(),
                config.subject_prefix.clone(),
            ))))
        }
        other => Err(NotifyError::Mode(other.to_string())),
    }
}
