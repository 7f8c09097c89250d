//! Host normalization and host extraction from matched lines.

use url::Url;

/// Lowercased hostname of a bare host, URL or URL-like fragment, with a
/// single leading `www.` removed.
///
/// Anything containing `://` or `/` is parsed as a URL (`http://` is
/// prepended when no scheme is present) and reduced to its host. Empty or
/// unparseable input yields an empty string.
///
/// ```rust
/// use termsweep_core::domain::normalize_domain;
///
/// assert_eq!(normalize_domain("https://WWW.Example.com/login?x=1"), "example.com");
/// assert_eq!(normalize_domain(" www.shop.example.com "), "shop.example.com");
/// assert_eq!(normalize_domain(""), "");
/// ```
pub fn normalize_domain(value: &str) -> String {
    let host = lowercase_host(value);
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Same as [`normalize_domain`] but keeps a leading `www.` label.
pub fn lowercase_host(value: &str) -> String {
    let s = value.trim().to_lowercase();
    if s.is_empty() {
        return s;
    }
    if s.contains("://") || s.contains('/') {
        return url_host(&s).unwrap_or_default();
    }
    s
}

fn url_host(s: &str) -> Option<String> {
    let parsed = if s.contains("://") {
        Url::parse(s)
    } else {
        Url::parse(&format!("http://{}", s))
    };
    let url = parsed.ok()?;
    let host = url.host_str()?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    Some(host.to_lowercase())
}

/// Host of the first whitespace-delimited token of a URL-ish string.
///
/// Returns `None` when no host can be parsed.
pub fn host_from_urlish(value: &str) -> Option<String> {
    let token = value.split_whitespace().next()?;
    let host = url_host(&token.to_lowercase())?;
    let host = normalize_domain(&host);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Candidate host embedded in a matched line.
///
/// Looks at the first whitespace-delimited field. Credential-style lines
/// (`host:user:pass`) without a scheme contribute the part before the
/// first colon. Falls back to the text before the first colon of the
/// whole line.
///
/// ```rust
/// use termsweep_core::domain::candidate_host_from_line;
///
/// assert_eq!(candidate_host_from_line("admin.example.org:user:pass").as_deref(), Some("admin.example.org"));
/// assert_eq!(candidate_host_from_line("https://portal.example.net/login bob:pw").as_deref(), Some("portal.example.net"));
/// ```
pub fn candidate_host_from_line(line: &str) -> Option<String> {
    let field = line.split_whitespace().next().unwrap_or("");
    let candidate = if !field.contains("://") && field.contains(':') {
        field.split(':').next().unwrap_or("")
    } else {
        field
    };
    host_from_urlish(candidate).or_else(|| {
        let first = line.split(':').next().unwrap_or("").trim();
        host_from_urlish(first)
    })
}
