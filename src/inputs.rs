//! Loading of the run's inputs: the term list and the owner map.

use std::path::Path;

use termsweep_core::error::{ConfigError, OwnerMapError};
use termsweep_core::owner::OwnerMap;
use termsweep_core::terms::TermSet;
use tracing::{info, warn};

/// Load terms from `input`.
///
/// An existing file is read as a newline-delimited term list (invalid
/// UTF-8 is replaced). Anything else is taken as a single literal term.
pub fn load_terms(input: &str) -> Result<TermSet, ConfigError> {
    let path = Path::new(input.trim());
    if path.is_file() {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::TermList {
            path: path.to_path_buf(),
            source,
        })?;
        let terms = TermSet::parse(&String::from_utf8_lossy(&bytes))?;
        info!(path = %path.display(), terms = terms.len(), "loaded term list");
        return Ok(terms);
    }
    TermSet::from_literal(input)
}

/// Read an owner map, surfacing every failure as an [`OwnerMapError`].
pub fn read_owner_map(path: &Path) -> Result<OwnerMap, OwnerMapError> {
    if !path.is_file() {
        return Err(OwnerMapError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path).map_err(|source| OwnerMapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    OwnerMap::from_reader(std::io::BufReader::new(file))
}

/// Load the owner map; failures are logged and yield an empty map.
pub fn load_owner_map(path: &Path) -> OwnerMap {
    match read_owner_map(path) {
        Ok(map) if map.is_empty() => {
            warn!(path = %path.display(), "owner map is empty; continuing without owners");
            map
        }
        Ok(map) => {
            info!(path = %path.display(), keys = map.len(), "loaded owner map");
            map
        }
        Err(e) => {
            warn!(error = %e, "could not load owner map; continuing without owners");
            OwnerMap::new()
        }
    }
}
