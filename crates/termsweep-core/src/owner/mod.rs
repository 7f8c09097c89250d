//! Owner map construction.
//!
//! An [`OwnerMap`] maps normalized hosts to a free-form owner string
//! (a name, an address, or both). It is loaded from CSV-like text with
//! loose conventions:
//!
//! - delimiter: first of `,` `;` `:` present in the first 4 KiB, else `,`
//! - header: first row counts as a header when any cell names a known
//!   domain column (`dominio`, `domain`, `host`, `url`) or owner column
//!   (`pm`, `owner`, `responsable`, `manager`, `contacto`, `contact`,
//!   `mail`, `email`, `correo`)
//! - without a header the first row's width decides the layout:
//!   `domain,url,owner`, `domain,owner` or a single `domain` column that
//!   doubles as owner
//!
//! Every explicit key gets a `www.` alias. Aliases are weak: an explicit
//! row for the alias key always wins, whichever order the rows appear in.

pub mod contact;
pub mod resolve;

use std::collections::HashMap;
use std::io::Read;

use crate::domain::{lowercase_host, normalize_domain};
use crate::error::OwnerMapError;

const SAMPLE_BYTES: usize = 4096;
const DELIMITERS: [u8; 3] = [b',', b';', b':'];

const DOMAIN_COLUMNS: [&str; 4] = ["dominio", "domain", "host", "url"];
const OWNER_COLUMNS: [&str; 9] = [
    "pm",
    "owner",
    "responsable",
    "manager",
    "contacto",
    "contact",
    "mail",
    "email",
    "correo",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    owner: String,
    explicit: bool,
}

/// Read-only host → owner lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerMap {
    entries: HashMap<String, Entry>,
}

/// Resolved column positions for one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    domain: usize,
    owner: usize,
    url: Option<usize>,
}

impl OwnerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse owner-map text.
    pub fn parse(text: &str) -> Result<Self, OwnerMapError> {
        let delimiter = detect_delimiter(sample(text));
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.iter().any(|c| !c.trim().is_empty()) {
                rows.push(row);
            }
        }

        let mut map = Self::new();
        let Some(first) = rows.first() else {
            return Ok(map);
        };

        let (columns, data) = if is_header(first) {
            (columns_from_header(first), &rows[1..])
        } else {
            (columns_from_width(first.len()), &rows[..])
        };

        for row in data {
            map.insert_row(row, columns);
        }
        Ok(map)
    }

    /// Parse owner-map bytes from a reader, replacing invalid UTF-8.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, OwnerMapError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| OwnerMapError::Malformed(csv::Error::from(e)))?;
        Self::parse(&String::from_utf8_lossy(&bytes))
    }

    fn insert_row(&mut self, row: &[String], columns: Columns) {
        let cell = |i: usize| row.get(i).map(|c| c.trim()).unwrap_or("");
        let mut domain = cell(columns.domain);
        let owner = cell(columns.owner);
        if domain.is_empty() {
            if let Some(url) = columns.url {
                domain = cell(url);
            }
        }
        self.insert(domain, owner);
    }

    /// Register `owner` for the host in `domain`.
    ///
    /// Returns `false` when the host or owner is empty after trimming.
    pub fn insert(&mut self, domain: &str, owner: &str) -> bool {
        let owner = owner.trim();
        let host = lowercase_host(domain);
        let canonical = normalize_domain(domain);
        if canonical.is_empty() || owner.is_empty() {
            return false;
        }
        let www = format!("www.{}", canonical);
        if host == www {
            self.put(www, owner, true);
            self.put(canonical, owner, false);
        } else {
            self.put(canonical, owner, true);
            self.put(www, owner, false);
        }
        true
    }

    fn put(&mut self, key: String, owner: &str, explicit: bool) {
        match self.entries.get_mut(&key) {
            Some(entry) if entry.explicit && !explicit => {}
            Some(entry) => {
                entry.owner = owner.to_string();
                entry.explicit = explicit;
            }
            None => {
                self.entries.insert(
                    key,
                    Entry {
                        owner: owner.to_string(),
                        explicit,
                    },
                );
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.owner.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys, aliases included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn sample(text: &str) -> &str {
    if text.len() <= SAMPLE_BYTES {
        return text;
    }
    let mut end = SAMPLE_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn detect_delimiter(sample: &str) -> u8 {
    DELIMITERS
        .iter()
        .copied()
        .find(|d| sample.as_bytes().contains(d))
        .unwrap_or(b',')
}

fn is_header(row: &[String]) -> bool {
    row.iter().any(|c| {
        let c = c.trim().to_lowercase();
        DOMAIN_COLUMNS.contains(&c.as_str()) || OWNER_COLUMNS.contains(&c.as_str())
    })
}

fn columns_from_header(row: &[String]) -> Columns {
    let cols: Vec<String> = row.iter().map(|c| c.trim().to_lowercase()).collect();
    let position = |name: &str| cols.iter().position(|c| c == name);
    Columns {
        domain: DOMAIN_COLUMNS.iter().find_map(|n| position(n)).unwrap_or(0),
        owner: OWNER_COLUMNS.iter().find_map(|n| position(n)).unwrap_or(1),
        url: position("url"),
    }
}

fn columns_from_width(width: usize) -> Columns {
    match width {
        0 | 1 => Columns {
            domain: 0,
            owner: 0,
            url: None,
        },
        2 => Columns {
            domain: 0,
            owner: 1,
            url: None,
        },
        _ => Columns {
            domain: 0,
            owner: 2,
            url: Some(1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_columns_without_header() {
        let map = OwnerMap::parse("example.com,alice\nother.org,bob\n").unwrap();
        assert_eq!(map.get("example.com"), Some("alice"));
        assert_eq!(map.get("www.example.com"), Some("alice"));
        assert_eq!(map.get("other.org"), Some("bob"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_three_columns_uses_url_when_domain_blank() {
        let map = OwnerMap::parse("a.com,https://a.com,ann\n,https://www.b.com/login,ben\n").unwrap();
        assert_eq!(map.get("a.com"), Some("ann"));
        assert_eq!(map.get("b.com"), Some("ben"));
    }

    #[test]
    fn test_header_locates_columns_by_name() {
        let text = "Owner;Notes;Domain\ncarla@corp.test;x;shop.example.org\n";
        let map = OwnerMap::parse(text).unwrap();
        assert_eq!(map.get("shop.example.org"), Some("carla@corp.test"));
        assert!(!map.contains_key("owner"));
    }

    #[test]
    fn test_semicolon_preferred_over_colon() {
        let map = OwnerMap::parse("dominio;pm\nhttps://x.io:8443/a;dana\n").unwrap();
        assert_eq!(map.get("x.io"), Some("dana"));
    }

    #[test]
    fn test_colon_only_delimiter() {
        let map = OwnerMap::parse("a.com:ann\nb.org:bea\n").unwrap();
        assert_eq!(map.get("a.com"), Some("ann"));
        assert_eq!(map.get("www.b.org"), Some("bea"));
    }

    #[test]
    fn test_comma_is_default_without_any_delimiter() {
        assert_eq!(detect_delimiter("solo.example.com\nother.example.com\n"), b',');
        let map = OwnerMap::parse("solo.example.com\nother.example.com\n").unwrap();
        assert_eq!(map.get("other.example.com"), Some("other.example.com"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_header_url_column_used_when_domain_blank() {
        let text = "domain,url,owner\n,https://www.c.com/login,cora\nd.com,https://elsewhere.net,dan\n";
        let map = OwnerMap::parse(text).unwrap();
        assert_eq!(map.get("c.com"), Some("cora"));
        assert_eq!(map.get("d.com"), Some("dan"));
        assert!(!map.contains_key("elsewhere.net"));
    }

    #[test]
    fn test_single_column_degenerate() {
        let map = OwnerMap::parse("solo.example.com\n").unwrap();
        assert_eq!(map.get("solo.example.com"), Some("solo.example.com"));
    }

    #[test]
    fn test_rows_with_blank_owner_skipped() {
        let map = OwnerMap::parse("a.com,\n,\nb.com,  \nc.com,carl\n").unwrap();
        assert!(map.get("a.com").is_none());
        assert!(map.get("b.com").is_none());
        assert_eq!(map.get("c.com"), Some("carl"));
    }

    #[test]
    fn test_explicit_alias_wins_regardless_of_order() {
        let before = OwnerMap::parse("www.example.com,bob\nexample.com,alice\n").unwrap();
        let after = OwnerMap::parse("example.com,alice\nwww.example.com,bob\n").unwrap();
        for map in [before, after] {
            assert_eq!(map.get("www.example.com"), Some("bob"));
            assert_eq!(map.get("example.com"), Some("alice"));
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(OwnerMap::parse("").unwrap().is_empty());
        assert!(OwnerMap::parse("\n\n ,, \n").unwrap().is_empty());
    }

    #[test]
    fn test_from_reader_lossy() {
        let bytes: &[u8] = b"ex\xffample.com,eve\nok.com,olga\n";
        let map = OwnerMap::from_reader(bytes).unwrap();
        assert_eq!(map.get("ok.com"), Some("olga"));
    }
}
