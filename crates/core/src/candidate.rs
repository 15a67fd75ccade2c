//! Candidate records as served by the candidate directory.
//!
//! Candidates are read-only from this service's point of view: they are
//! loaded once from the backing source and never mutated.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{CandidateId, Timestamp};

// ---------------------------------------------------------------------------
// Candidate status
// ---------------------------------------------------------------------------

/// Hiring status of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Active,
    Inactive,
    Pending,
}

impl CandidateStatus {
    /// Parse a status string as it appears on the wire.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            _ => Err(CoreError::Validation(format!(
                "Invalid candidate status '{s}'. Must be one of: active, inactive, pending"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A single candidate in the directory.
///
/// Serialized with camelCase keys (`createdAt`, `updatedAt`) to match the
/// directory's JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: String,
    pub status: CandidateStatus,
    /// Years of experience, if known.
    #[serde(default)]
    pub experience: Option<u32>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Candidate {
    /// Only active candidates may be hired (i.e. start onboarding).
    pub fn is_hireable(&self) -> bool {
        self.status == CandidateStatus::Active
    }

    /// Fail with a validation error unless the candidate can be onboarded.
    pub fn ensure_hireable(&self) -> Result<(), CoreError> {
        if self.is_hireable() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Candidate {} has status '{}'; only active candidates can be onboarded",
                self.id, self.status
            )))
        }
    }
}
