use talent_integration::ConnectorError;

/// Errors from a [`CandidateSource`](crate::directory::CandidateSource).
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The candidate does not exist.
    #[error("Candidate not found: {0}")]
    NotFound(String),

    /// The source could not be reached or answered with an error.
    #[error("Candidate source unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Errors from onboarding workflow transitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    /// Submit was requested while the guard does not allow it.
    #[error("Submission requires a selected template and non-empty form data")]
    SubmitDisabled,

    /// The modal was closed before the operation completed.
    #[error("Onboarding modal is closed")]
    Closed,

    /// The connector rejected the call.
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}
