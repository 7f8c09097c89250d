//! End-of-run summary.
//!
//! Printed on stdout after every completed scan, regardless of how many
//! files or owner rows failed along the way.

use std::io::Write;
use std::path::Path;
use termsweep_core::models::{RunRecord, RunSummary};

use crate::notify::NotifyReport;
use crate::progress::format_number;

/// Write the summary block to `out`.
pub fn write_summary<W: Write>(
    out: &mut W,
    summary: &RunSummary,
    output_dir: &Path,
    notify: Option<&NotifyReport>,
) -> std::io::Result<()> {
    let without = summary.terms_total.saturating_sub(summary.terms_with_matches);
    writeln!(out, "scan complete")?;
    writeln!(out, "  files considered:   {}", format_number(summary.files_considered))?;
    writeln!(out, "  files ignored:      {}", format_number(summary.files_ignored))?;
    writeln!(out, "  files failed:       {}", format_number(summary.files_failed))?;
    if summary.outputs_failed > 0 {
        writeln!(out, "  outputs failed:     {}", format_number(summary.outputs_failed))?;
    }
    writeln!(
        out,
        "  terms with matches: {} / {} ({} without)",
        format_number(summary.terms_with_matches),
        format_number(summary.terms_total),
        format_number(without)
    )?;
    writeln!(out, "  matched lines:      {}", format_number(summary.total_lines))?;
    writeln!(out, "  output:             {}", output_dir.display())?;
    if let Some(report) = notify {
        writeln!(
            out,
            "  notices:            {} sent, {} failed",
            report.sent, report.failed
        )?;
    }
    Ok(())
}

/// Print the summary and a per-term table of terms that matched.
pub fn print_summary(
    summary: &RunSummary,
    records: &[RunRecord],
    output_dir: &Path,
    notify: Option<&NotifyReport>,
) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let _ = write_summary(&mut out, summary, output_dir, notify);

    let matched: Vec<&RunRecord> = records.iter().filter(|r| r.matched_lines > 0).collect();
    if matched.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<32} {:>8}   {}", "TERM", "LINES", "OWNER");
    let _ = writeln!(out, "  {}", "-".repeat(60));
    for r in matched {
        let _ = writeln!(
            out,
            "  {:<32} {:>8}   {}",
            r.term,
            format_number(r.matched_lines as u64),
            r.owner.as_deref().unwrap_or("-")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_block() {
        let summary = RunSummary {
            files_considered: 1200,
            files_ignored: 3,
            files_failed: 1,
            outputs_failed: 0,
            terms_total: 5,
            terms_with_matches: 2,
            total_lines: 42,
        };
        let mut buf = Vec::new();
        write_summary(&mut buf, &summary, Path::new("out/Export"), None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("files considered:   1,200"));
        assert!(text.contains("terms with matches: 2 / 5 (3 without)"));
        assert!(text.contains("matched lines:      42"));
        assert!(text.contains("output:             out/Export"));
        assert!(!text.contains("notices"));
        assert!(!text.contains("outputs failed"));
    }
}
