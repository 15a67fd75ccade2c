use std::sync::Arc;

use talent_dashboard::CandidateDirectory;
use talent_integration::TemplateCatalog;

use crate::config::ServerConfig;
use crate::sessions::SessionRegistry;
use crate::store::CandidateStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Read-only candidate directory backing `/candidates`.
    pub candidates: Arc<CandidateStore>,
    /// Table view over `candidates`.
    pub directory: Arc<CandidateDirectory>,
    /// Onboarding template catalog (connector client).
    pub catalog: Arc<TemplateCatalog>,
    /// Open onboarding sessions.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        candidates: CandidateStore,
        catalog: Arc<TemplateCatalog>,
    ) -> Self {
        let candidates = Arc::new(candidates);
        let directory = Arc::new(CandidateDirectory::new(candidates.clone()));
        Self {
            config: Arc::new(config),
            candidates,
            directory,
            catalog,
            sessions: SessionRegistry::new(),
        }
    }
}
