//! Registry of open onboarding sessions.
//!
//! Each session is one [`OnboardingModal`]. A modal removes itself from the
//! registry through its close handler, so a closed session is gone whether
//! it was closed explicitly or by a successful submission. Sessions nobody
//! has touched for the idle timeout are closed by [`SessionRegistry::sweep_idle`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use talent_core::candidate::Candidate;
use talent_dashboard::{ModalConfig, OnboardingModal};
use talent_integration::TemplateCatalog;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

pub type SessionId = Uuid;

/// A freshly opened session.
pub struct OpenedSession {
    pub id: SessionId,
    pub modal: Arc<OnboardingModal>,
    /// Resolves once the template list has been loaded into the modal.
    pub templates_loaded: JoinHandle<()>,
}

struct Session {
    modal: Arc<OnboardingModal>,
    last_touched: Instant,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create and open an onboarding modal for `candidate`.
    pub fn open(
        self: &Arc<Self>,
        candidate: Candidate,
        catalog: Arc<TemplateCatalog>,
        config: ModalConfig,
    ) -> OpenedSession {
        let id = Uuid::new_v4();
        let registry: Weak<Self> = Arc::downgrade(self);
        let modal = Arc::new(OnboardingModal::new(
            candidate,
            catalog,
            config,
            Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(&id);
                }
            }),
        ));

        self.sessions().insert(
            id,
            Session {
                modal: Arc::clone(&modal),
                last_touched: Instant::now(),
            },
        );
        let templates_loaded = modal.open();

        tracing::info!(
            session_id = %id,
            candidate_id = %modal.candidate().id,
            "Onboarding session opened"
        );

        OpenedSession {
            id,
            modal,
            templates_loaded,
        }
    }

    /// Look up a session and mark it as used.
    pub fn get(&self, id: &SessionId) -> Option<Arc<OnboardingModal>> {
        let mut sessions = self.sessions();
        let session = sessions.get_mut(id)?;
        session.last_touched = Instant::now();
        Some(Arc::clone(&session.modal))
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    /// Close every open session (used on shutdown).
    pub fn close_all(&self) {
        let drained: Vec<_> = self.sessions().drain().collect();
        for (id, session) in drained {
            tracing::debug!(session_id = %id, "Closing onboarding session");
            session.modal.close();
        }
    }

    /// Close every session untouched for longer than `idle_timeout`.
    ///
    /// Returns how many sessions were closed.
    pub fn sweep_idle(&self, idle_timeout: Duration) -> usize {
        let now = Instant::now();
        let expired: Vec<(SessionId, Session)> = {
            let mut sessions = self.sessions();
            let ids: Vec<SessionId> = sessions
                .iter()
                .filter(|(_, s)| now.duration_since(s.last_touched) > idle_timeout)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|s| (id, s)))
                .collect()
        };

        // Closing runs the modal's close handler, which takes the lock.
        for (id, session) in &expired {
            tracing::info!(session_id = %id, "Closing idle onboarding session");
            session.modal.close();
        }
        expired.len()
    }

    fn remove(&self, id: &SessionId) {
        if self.sessions().remove(id).is_some() {
            tracing::info!(session_id = %id, "Onboarding session closed");
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
