//! Dashboard-side logic: the candidate directory and the onboarding
//! workflow modal.
//!
//! The modal is a plain state machine driven by method calls. It does not
//! render anything itself; callers read [`modal::ModalSnapshot`]s.

pub mod debounce;
pub mod directory;
pub mod error;
pub mod modal;

pub use directory::{CandidateDirectory, CandidateSource, DirectoryRow, DirectoryView};
pub use error::{DirectoryError, WorkflowError};
pub use modal::{ModalConfig, ModalSnapshot, ModalStep, OnboardingModal};
