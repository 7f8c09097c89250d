//! Contact address extraction from owner strings and matched lines.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)*\.[a-z]{2,}").unwrap()
});

static WRAPPED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<([^<>]*)>|\(([^()]*)\)").unwrap());

static DECORATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<>()\[\]]").unwrap());

/// First email address in `text`.
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

/// Email embedded in an owner string.
///
/// Angle-bracket and parenthesis groups are searched first, so
/// `"Ops (backup: b@x.io) <ops@x.io>"` yields the first wrapped address
/// in reading order; the whole string is searched as a fallback.
pub fn extract_email(owner: &str) -> Option<String> {
    WRAPPED_RE
        .captures_iter(owner)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .find_map(|inner| find_email(inner.as_str()))
        .or_else(|| find_email(owner))
}

/// Contact for a resolved owner: the owner's own address, else the first
/// address found in the term's matched lines.
pub fn resolve_contact(owner: &str, lines: &[String]) -> Option<String> {
    extract_email(owner).or_else(|| lines.iter().find_map(|l| find_email(l)))
}

/// Owner string for display, with bracket and parenthesis characters
/// removed and whitespace collapsed.
///
/// ```rust
/// use termsweep_core::owner::contact::display_owner;
///
/// assert_eq!(display_owner("Ana Ruiz <ana@corp.test>"), "Ana Ruiz ana@corp.test");
/// assert_eq!(display_owner("ana@corp.test"), "ana@corp.test");
/// ```
pub fn display_owner(owner: &str) -> String {
    let trimmed = owner.trim();
    if find_email(trimmed).as_deref() == Some(trimmed) {
        return trimmed.to_string();
    }
    DECORATION_RE
        .replace_all(trimmed, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
