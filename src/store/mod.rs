use crate::models::{CandidateId, CandidateRecord};
use log::info;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read candidate file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse candidate file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate candidate id {0}")]
    DuplicateId(CandidateId),
    #[error("candidate {0} has an empty name")]
    EmptyName(CandidateId),
}

pub fn load_candidates(path: impl AsRef<Path>) -> Result<Vec<CandidateRecord>, StoreError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let candidates = parse_candidates(&raw)?;
    info!("Loaded {} candidates from {}", candidates.len(), path.display());
    Ok(candidates)
}

/// Parses a JSON array of candidate records, keeping file order.
pub fn parse_candidates(raw: &str) -> Result<Vec<CandidateRecord>, StoreError> {
    let candidates: Vec<CandidateRecord> = serde_json::from_str(raw)?;

    let mut seen = HashSet::new();
    for candidate in &candidates {
        if candidate.nombre.trim().is_empty() {
            return Err(StoreError::EmptyName(candidate.id));
        }
        if !seen.insert(candidate.id) {
            return Err(StoreError::DuplicateId(candidate.id));
        }
    }

    Ok(candidates)
}
