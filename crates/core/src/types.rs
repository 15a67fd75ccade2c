/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Candidate identifiers are opaque strings assigned by the directory.
pub type CandidateId = String;

/// Onboarding template identifiers (the connector's template code).
pub type TemplateId = String;
