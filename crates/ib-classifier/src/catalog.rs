//! Intent catalog discovery. The first candidate path that parses wins.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use ib_protocol::intent::{Catalog, Intent};

use crate::error::{CatalogError, CatalogResult};

/// File name searched for in each default location.
pub const CATALOG_FILE_NAME: &str = "intents.json";

/// Accepted on-disk shapes: a bare array or `{"intents": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { intents: Vec<Intent> },
    Bare(Vec<Intent>),
}

impl From<CatalogFile> for Catalog {
    fn from(file: CatalogFile) -> Self {
        match file {
            CatalogFile::Wrapped { intents } | CatalogFile::Bare(intents) => Catalog::new(intents),
        }
    }
}

/// Ordered candidate locations, `explicit` first when given.
pub fn default_candidates(explicit: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = explicit.into_iter().collect();
    candidates.push(PathBuf::from(CATALOG_FILE_NAME));
    candidates.push(Path::new("data").join(CATALOG_FILE_NAME));
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(CATALOG_FILE_NAME));
    }
    candidates
}

/// Load the catalog from the first candidate that exists and parses.
pub fn load_catalog(candidates: &[PathBuf]) -> CatalogResult<Catalog> {
    for path in candidates {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::info!(path = %path.display(), error = %e, "intent catalog not found");
                continue;
            }
        };

        let catalog = match parse_catalog(&contents) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "intent catalog does not parse, skipping");
                continue;
            }
        };

        validate(&catalog)?;
        tracing::info!(
            path = %path.display(),
            intents = catalog.len(),
            patterns = catalog.pattern_count(),
            "intent catalog loaded"
        );
        return Ok(catalog);
    }

    Err(CatalogError::NotFound {
        searched: candidates.to_vec(),
    })
}

/// Parse catalog JSON without validating it.
pub fn parse_catalog(contents: &str) -> Result<Catalog, serde_json::Error> {
    serde_json::from_str::<CatalogFile>(contents).map(Catalog::from)
}

/// Reject catalogs the bot cannot serve from.
pub fn validate(catalog: &Catalog) -> CatalogResult<()> {
    if catalog.pattern_count() == 0 {
        return Err(CatalogError::Empty);
    }

    let mut seen = HashSet::new();
    for intent in &catalog.intents {
        if !seen.insert(intent.tag.as_str()) {
            return Err(CatalogError::DuplicateTag(intent.tag.clone()));
        }
        if intent.responses.is_empty() {
            return Err(CatalogError::NoResponses(intent.tag.clone()));
        }
        if intent.patterns.is_empty() {
            tracing::warn!(tag = %intent.tag, "intent has no patterns and can only be reached by rules");
        }
    }
    Ok(())
}
