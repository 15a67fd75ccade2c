//! In-memory candidate directory.
//!
//! Loaded once at startup from a JSON file (or the bundled list) and served
//! read-only.

use std::path::Path;

use async_trait::async_trait;
use talent_core::candidate::Candidate;
use talent_dashboard::{CandidateSource, DirectoryError};

/// Candidate list shipped with the binary.
const BUNDLED_CANDIDATES: &str = include_str!("../data/candidates.json");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read candidates file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid candidates JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct CandidateStore {
    candidates: Vec<Candidate>,
}

impl CandidateStore {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Parse a JSON array of candidates.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn bundled() -> Result<Self, StoreError> {
        Self::from_json(BUNDLED_CANDIDATES)
    }

    /// Load from `path`, or the bundled list when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, StoreError> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_json(&json)
            }
            None => Self::bundled(),
        }
    }

    pub fn list(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[async_trait]
impl CandidateSource for CandidateStore {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, DirectoryError> {
        Ok(self.candidates.clone())
    }

    async fn get_candidate(&self, id: &str) -> Result<Candidate, DirectoryError> {
        self.get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use talent_core::candidate::CandidateStatus;

    use super::*;

    #[test]
    fn bundled_list_parses() {
        let store = CandidateStore::bundled().unwrap();
        assert!(!store.is_empty());
        assert!(store
            .list()
            .iter()
            .any(|c| c.status == CandidateStatus::Active));
    }

    #[test]
    fn get_finds_by_id() {
        let store = CandidateStore::bundled().unwrap();
        let first = store.list()[0].id.clone();
        assert_eq!(store.get(&first).map(|c| c.id.as_str()), Some(first.as_str()));
        assert!(store.get("does-not-exist").is_none());
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert_matches!(
            CandidateStore::from_json("{\"not\": \"an array\"}"),
            Err(StoreError::Parse(_))
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CandidateStore::load(Some(Path::new("/nonexistent/candidates.json")))
            .err()
            .unwrap();
        assert!(err.to_string().contains("/nonexistent/candidates.json"));
    }

    #[tokio::test]
    async fn source_reports_unknown_candidate() {
        let store = CandidateStore::new(vec![]);
        assert_matches!(
            store.get_candidate("x").await,
            Err(DirectoryError::NotFound(id)) if id == "x"
        );
    }
}
