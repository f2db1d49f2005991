use std::io::Read;
use std::path::Path;

use super::domain::Candidate;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog lists candidate id '{0}' more than once")]
    DuplicateId(String),
}

pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<Candidate>, CatalogError> {
    let file = std::fs::File::open(path)?;
    parse_catalog(file)
}

/// Reads a JSON array of candidates, re-applying ingredient de-duplication.
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<Candidate>, CatalogError> {
    let candidates: Vec<Candidate> = serde_json::from_reader(reader)?;
    let mut seen = std::collections::BTreeSet::new();
    candidates
        .into_iter()
        .map(|candidate| {
            if seen.insert(candidate.id.clone()) {
                Ok(candidate.normalized())
            } else {
                Err(CatalogError::DuplicateId(candidate.id))
            }
        })
        .collect()
}
