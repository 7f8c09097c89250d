//! Owner resolution.
//!
//! Resolution runs an ordered chain of [`HostStrategy`] implementations
//! against a host and stops at the first hit:
//!
//! 1. [`ExactMatch`]: the host as given, then its canonical (`www.`-less) form
//! 2. [`WwwAlias`]: `www.` + canonical
//! 3. [`SuffixMatch`]: parent domains from the immediate parent outward,
//!    never the full host and never a bare TLD
//!
//! When the chain finds nothing for the term itself and inference is
//! enabled, each matched line is mined for a host
//! ([`candidate_host_from_line`]) and the same chain is applied to it.
//! The first line that resolves wins.

use crate::domain::{candidate_host_from_line, lowercase_host, normalize_domain};
use crate::owner::OwnerMap;

/// How an owner was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedVia {
    Exact,
    Alias,
    Suffix,
    /// Found by resolving a host seen in a matched line.
    Inferred { host: String, via: Box<ResolvedVia> },
}

impl std::fmt::Display for ResolvedVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedVia::Exact => write!(f, "exact"),
            ResolvedVia::Alias => write!(f, "alias"),
            ResolvedVia::Suffix => write!(f, "suffix"),
            ResolvedVia::Inferred { host, via } => write!(f, "inferred from {} ({})", host, via),
        }
    }
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub owner: String,
    /// Map key that produced the owner.
    pub key: String,
    pub via: ResolvedVia,
}

/// Host forms shared by every strategy in one lookup.
#[derive(Debug, Clone)]
pub struct HostQuery {
    /// Lowercased host, `www.` kept.
    pub host: String,
    /// Host without a leading `www.`.
    pub canonical: String,
}

impl HostQuery {
    pub fn new(value: &str) -> Option<Self> {
        let canonical = normalize_domain(value);
        if canonical.is_empty() {
            return None;
        }
        Some(Self {
            host: lowercase_host(value),
            canonical,
        })
    }
}

/// One link of the resolution chain.
pub trait HostStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn lookup(&self, map: &OwnerMap, query: &HostQuery) -> Option<Resolution>;
}

fn hit(map: &OwnerMap, key: &str, via: ResolvedVia) -> Option<Resolution> {
    map.get(key).map(|owner| Resolution {
        owner: owner.to_string(),
        key: key.to_string(),
        via,
    })
}

pub struct ExactMatch;

impl HostStrategy for ExactMatch {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn lookup(&self, map: &OwnerMap, query: &HostQuery) -> Option<Resolution> {
        if query.host != query.canonical {
            if let Some(found) = hit(map, &query.host, ResolvedVia::Exact) {
                return Some(found);
            }
        }
        hit(map, &query.canonical, ResolvedVia::Exact)
    }
}

pub struct WwwAlias;

impl HostStrategy for WwwAlias {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn lookup(&self, map: &OwnerMap, query: &HostQuery) -> Option<Resolution> {
        hit(map, &format!("www.{}", query.canonical), ResolvedVia::Alias)
    }
}

pub struct SuffixMatch;

impl HostStrategy for SuffixMatch {
    fn name(&self) -> &'static str {
        "suffix"
    }

    fn lookup(&self, map: &OwnerMap, query: &HostQuery) -> Option<Resolution> {
        let labels: Vec<&str> = query.canonical.split('.').collect();
        for start in 1..labels.len().saturating_sub(1) {
            let suffix = labels[start..].join(".");
            if let Some(found) = hit(map, &suffix, ResolvedVia::Suffix) {
                return Some(found);
            }
            if let Some(found) = hit(map, &format!("www.{}", suffix), ResolvedVia::Suffix) {
                return Some(found);
            }
        }
        None
    }
}

/// Strategy chain plus the owner map it runs against.
pub struct OwnerResolver {
    map: OwnerMap,
    chain: Vec<Box<dyn HostStrategy>>,
    infer: bool,
}

impl OwnerResolver {
    /// Resolver with the default exact → alias → suffix chain.
    pub fn new(map: OwnerMap, infer: bool) -> Self {
        Self {
            map,
            chain: vec![Box::new(ExactMatch), Box::new(WwwAlias), Box::new(SuffixMatch)],
            infer,
        }
    }

    /// Resolver with a caller-supplied chain.
    pub fn with_chain(map: OwnerMap, chain: Vec<Box<dyn HostStrategy>>, infer: bool) -> Self {
        Self { map, chain, infer }
    }

    pub fn map(&self) -> &OwnerMap {
        &self.map
    }

    pub fn infers(&self) -> bool {
        self.infer
    }

    /// Run the chain against one host.
    pub fn resolve_host(&self, host: &str) -> Option<Resolution> {
        let query = HostQuery::new(host)?;
        self.chain
            .iter()
            .find_map(|strategy| strategy.lookup(&self.map, &query))
    }

    /// Owner for `term`, falling back to hosts seen in `lines`.
    pub fn resolve(&self, term: &str, lines: &[String]) -> Option<Resolution> {
        if self.map.is_empty() {
            return None;
        }
        if let Some(found) = self.resolve_host(term) {
            return Some(found);
        }
        if !self.infer {
            return None;
        }
        lines.iter().find_map(|line| {
            let host = candidate_host_from_line(line)?;
            let found = self.resolve_host(&host)?;
            Some(Resolution {
                owner: found.owner,
                key: found.key,
                via: ResolvedVia::Inferred {
                    host,
                    via: Box::new(found.via),
                },
            })
        })
    }
}

impl std::fmt::Debug for OwnerResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.chain.iter().map(|s| s.name()).collect();
        f.debug_struct("OwnerResolver")
            .field("entries", &self.map.len())
            .field("chain", &names)
            .field("infer", &self.infer)
            .finish()
    }
}
