//! Onboarding workflow modal.
//!
//! Two steps per open: pick a template, then fill and submit the form
//! generated from that template's schema. Only schema loading and submission
//! cross the connector boundary; every other transition is local.
//!
//! Every transition that invalidates in-flight work bumps a generation
//! counter. Async results (schema fetches, debounced form edits, submit
//! outcomes) carry the generation they were issued under and are dropped if
//! it no longer matches. Background tasks additionally run under a
//! per-open [`CancellationToken`] that close and drop cancel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use talent_core::candidate::Candidate;
use talent_core::onboarding::{
    self, FormData, FormSchema, OnboardingTemplate, GENERIC_SUBMIT_FAILURE,
};
use talent_integration::{ConnectorError, TemplateCatalog};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::debounce::Debouncer;
use crate::error::WorkflowError;

/// Delay applied to form edits before they land in the modal state.
pub const DEFAULT_FORM_DEBOUNCE: Duration = Duration::from_millis(300);

/// Fallback text when a schema fetch fails without a message.
const GENERIC_SCHEMA_FAILURE: &str = "Failed to load template schema";

const SUBMIT_FAILED_TITLE: &str = "Onboarding failed";

#[derive(Debug, Clone)]
pub struct ModalConfig {
    pub form_debounce: Duration,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            form_debounce: DEFAULT_FORM_DEBOUNCE,
        }
    }
}

/// Invoked after the modal has closed and reset.
pub type CloseHandler = Box<dyn Fn() + Send + Sync>;

// ---------------------------------------------------------------------------
// Public state types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalStep {
    TemplateSelection,
    Form,
}

/// Template list as shown in the selection step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TemplateList {
    Loading,
    Failed { message: String },
    Loaded { templates: Vec<OnboardingTemplate> },
}

/// A dismissible error notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    fn from_error(title: &str, err: &ConnectorError, fallback: &str) -> Self {
        let message = match err.user_message().trim() {
            "" => fallback.to_string(),
            msg => msg.to_string(),
        };
        Self {
            title: title.to_string(),
            message,
        }
    }
}

/// Read-only view of the modal for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalSnapshot {
    pub open: bool,
    pub step: ModalStep,
    pub selected_template_id: Option<String>,
    pub search_query: String,
    pub templates: TemplateList,
    pub filtered_templates: Vec<OnboardingTemplate>,
    pub form_schema: Option<FormSchema>,
    /// Fields the schema marks as required, for highlighting in the form.
    pub required_fields: Vec<String>,
    pub form_data: FormData,
    pub is_loading_schema: bool,
    pub is_submitting: bool,
    pub can_submit: bool,
    pub notification: Option<Notification>,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

struct ModalState {
    open: bool,
    step: ModalStep,
    selected_template_id: Option<String>,
    search_query: String,
    templates: TemplateList,
    form_schema: Option<FormSchema>,
    form_data: FormData,
    is_loading_schema: bool,
    is_submitting: bool,
    notification: Option<Notification>,
    /// Bumped by open and close; guards the template list load.
    epoch: u64,
    /// Bumped by every transition that invalidates in-flight work.
    generation: u64,
}

impl ModalState {
    fn closed() -> Self {
        Self {
            open: false,
            step: ModalStep::TemplateSelection,
            selected_template_id: None,
            search_query: String::new(),
            templates: TemplateList::Loading,
            form_schema: None,
            form_data: FormData::new(),
            is_loading_schema: false,
            is_submitting: false,
            notification: None,
            epoch: 0,
            generation: 0,
        }
    }

    /// Return every user-visible field to its initial value.
    fn reset(&mut self) {
        let epoch = self.epoch + 1;
        let generation = self.generation + 1;
        *self = Self {
            epoch,
            generation,
            ..Self::closed()
        };
    }

    fn leave_form(&mut self) {
        self.generation += 1;
        self.step = ModalStep::TemplateSelection;
        self.selected_template_id = None;
        self.form_schema = None;
        self.form_data.clear();
        self.is_loading_schema = false;
        self.is_submitting = false;
    }

    fn can_submit(&self) -> bool {
        self.open
            && self.step == ModalStep::Form
            && !self.is_submitting
            && onboarding::can_submit(self.selected_template_id.as_deref(), &self.form_data)
    }

    fn filtered_templates(&self) -> Vec<OnboardingTemplate> {
        match &self.templates {
            TemplateList::Loaded { templates } => {
                onboarding::filter_templates(templates, &self.search_query)
                    .into_iter()
                    .cloned()
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn snapshot(&self) -> ModalSnapshot {
        ModalSnapshot {
            open: self.open,
            step: self.step,
            selected_template_id: self.selected_template_id.clone(),
            search_query: self.search_query.clone(),
            templates: self.templates.clone(),
            filtered_templates: self.filtered_templates(),
            form_schema: self.form_schema.clone(),
            required_fields: self
                .form_schema
                .as_ref()
                .map(|schema| {
                    schema
                        .required_fields()
                        .into_iter()
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            form_data: self.form_data.clone(),
            is_loading_schema: self.is_loading_schema,
            is_submitting: self.is_submitting,
            can_submit: self.can_submit(),
            notification: self.notification.clone(),
        }
    }
}

struct Inner {
    catalog: Arc<TemplateCatalog>,
    state: Mutex<ModalState>,
    tasks: Mutex<CancellationToken>,
    on_close: CloseHandler,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, ModalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn task_token(&self) -> CancellationToken {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cancel every background task of the current open and start a fresh
    /// scope.
    fn rotate_task_token(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.cancel();
        *tasks = CancellationToken::new();
    }

    fn apply_templates(
        &self,
        epoch: u64,
        result: Result<Vec<OnboardingTemplate>, ConnectorError>,
    ) {
        let mut state = self.state();
        if !state.open || state.epoch != epoch {
            tracing::debug!(epoch, "Discarding template list for a closed modal");
            return;
        }
        state.templates = match result {
            Ok(templates) => TemplateList::Loaded { templates },
            Err(e) => TemplateList::Failed {
                message: e.to_string(),
            },
        };
    }

    fn apply_schema(
        &self,
        generation: u64,
        template_id: &str,
        result: Result<FormSchema, ConnectorError>,
    ) {
        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!(template_id, generation, "Discarding stale schema response");
            return;
        }
        match result {
            Ok(schema) => {
                state.form_schema = Some(schema);
                state.is_loading_schema = false;
            }
            Err(e) => {
                tracing::warn!(template_id, error = %e, "Failed to load template schema");
                state.leave_form();
                state.notification = Some(Notification::from_error(
                    "Could not load template",
                    &e,
                    GENERIC_SCHEMA_FAILURE,
                ));
            }
        }
    }

    fn apply_form_data(&self, generation: u64, data: FormData) {
        let mut state = self.state();
        if state.open && state.step == ModalStep::Form && state.generation == generation {
            state.form_data = data;
        }
    }
}

// ---------------------------------------------------------------------------
// OnboardingModal
// ---------------------------------------------------------------------------

/// Onboarding workflow for one candidate.
///
/// Created closed; call [`open`](Self::open) to start. Dropping the modal
/// cancels its background tasks and pending form edits.
pub struct OnboardingModal {
    candidate: Candidate,
    inner: Arc<Inner>,
    form_changes: Debouncer<(u64, FormData)>,
}

impl OnboardingModal {
    pub fn new(
        candidate: Candidate,
        catalog: Arc<TemplateCatalog>,
        config: ModalConfig,
        on_close: CloseHandler,
    ) -> Self {
        let inner = Arc::new(Inner {
            catalog,
            state: Mutex::new(ModalState::closed()),
            tasks: Mutex::new(CancellationToken::new()),
            on_close,
        });

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        let form_changes = Debouncer::new(
            config.form_debounce,
            move |(generation, data): (u64, FormData)| {
                if let Some(inner) = weak.upgrade() {
                    inner.apply_form_data(generation, data);
                }
            },
        );

        Self {
            candidate,
            inner,
            form_changes,
        }
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// Open the modal in template selection and start loading templates.
    ///
    /// The returned handle resolves once the template list has been
    /// applied (or discarded because the modal closed meanwhile).
    pub fn open(&self) -> JoinHandle<()> {
        self.form_changes.cancel();
        self.inner.rotate_task_token();

        let epoch = {
            let mut state = self.inner.state();
            state.reset();
            state.open = true;
            state.epoch
        };
        tracing::info!(candidate_id = %self.candidate.id, "Onboarding modal opened");

        let inner = Arc::clone(&self.inner);
        let token = inner.task_token();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = inner.catalog.list_templates() => result,
            };
            inner.apply_templates(epoch, result);
        })
    }

    /// Update the template search query. Purely local.
    pub fn set_search_query(&self, query: impl Into<String>) {
        let mut state = self.inner.state();
        if state.open {
            state.search_query = query.into();
        }
    }

    /// Templates whose name matches the current query.
    pub fn filtered_templates(&self) -> Vec<OnboardingTemplate> {
        self.inner.state().filtered_templates()
    }

    /// Select a template: switch to the form step now and fetch its schema
    /// in the background.
    ///
    /// The returned handle resolves when the fetch result has been applied
    /// or discarded.
    pub fn select_template(&self, template_id: &str) -> Result<JoinHandle<()>, WorkflowError> {
        self.form_changes.cancel();

        let generation = {
            let mut state = self.inner.state();
            if !state.open {
                return Err(WorkflowError::Closed);
            }
            state.generation += 1;
            state.step = ModalStep::Form;
            state.selected_template_id = Some(template_id.to_string());
            state.form_schema = None;
            state.form_data.clear();
            state.is_loading_schema = true;
            state.is_submitting = false;
            state.notification = None;
            state.generation
        };
        tracing::debug!(template_id, generation, "Template selected");

        let inner = Arc::clone(&self.inner);
        let token = inner.task_token();
        let template_id = template_id.to_string();
        Ok(tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = inner.catalog.get_template_schema(&template_id) => result,
            };
            inner.apply_schema(generation, &template_id, result);
        }))
    }

    /// Report the full current value set of the rendered form.
    ///
    /// Debounced: a burst of calls results in one update with the last
    /// value. Ignored outside the form step.
    pub fn on_form_change(&self, data: FormData) {
        let generation = {
            let state = self.inner.state();
            if !state.open || state.step != ModalStep::Form {
                return;
            }
            state.generation
        };
        self.form_changes.call((generation, data));
    }

    /// Return to template selection, abandoning the form. Also serves as the
    /// cancel affordance while a schema is loading.
    pub fn back(&self) {
        self.form_changes.cancel();
        let mut state = self.inner.state();
        if state.open {
            state.leave_form();
        }
    }

    pub fn can_submit(&self) -> bool {
        self.inner.state().can_submit()
    }

    /// Run the onboarding action with the current form data.
    ///
    /// Success closes the modal. Failure keeps the form and its data and
    /// raises a notification carrying the upstream message.
    pub async fn submit(&self) -> Result<Value, WorkflowError> {
        self.form_changes.flush();

        let (generation, template_id, data) = {
            let mut state = self.inner.state();
            if !state.open {
                return Err(WorkflowError::Closed);
            }
            if !state.can_submit() {
                return Err(WorkflowError::SubmitDisabled);
            }
            state.is_submitting = true;
            state.notification = None;
            let template_id = state.selected_template_id.clone().unwrap_or_default();
            (state.generation, template_id, state.form_data.clone())
        };
        let mut guard = SubmitGuard {
            inner: &self.inner,
            generation,
            armed: true,
        };

        tracing::info!(
            candidate_id = %self.candidate.id,
            template_id = %template_id,
            "Starting onboarding"
        );

        let result = self.inner.catalog.run_onboarding(data, &template_id).await;
        guard.armed = false;

        match result {
            Ok(output) => {
                let current = self.inner.state().generation == generation;
                if current {
                    self.close();
                } else {
                    tracing::debug!(generation, "Modal changed during submission; not closing");
                }
                Ok(output)
            }
            Err(e) => {
                tracing::warn!(template_id = %template_id, error = %e, "Onboarding failed");
                let mut state = self.inner.state();
                if state.generation == generation {
                    state.is_submitting = false;
                    state.notification = Some(Notification::from_error(
                        SUBMIT_FAILED_TITLE,
                        &e,
                        GENERIC_SUBMIT_FAILURE,
                    ));
                }
                Err(WorkflowError::Connector(e))
            }
        }
    }

    pub fn dismiss_notification(&self) {
        self.inner.state().notification = None;
    }

    /// Close from any state: reset everything, then notify the owner.
    pub fn close(&self) {
        self.form_changes.cancel();
        self.inner.rotate_task_token();
        self.inner.state().reset();
        tracing::info!(candidate_id = %self.candidate.id, "Onboarding modal closed");
        (self.inner.on_close)();
    }

    pub fn is_open(&self) -> bool {
        self.inner.state().open
    }

    pub fn snapshot(&self) -> ModalSnapshot {
        self.inner.state().snapshot()
    }
}

/// Releases a submission whose caller stopped waiting (request timeout,
/// client disconnect) so the form can be submitted again.
struct SubmitGuard<'a> {
    inner: &'a Inner,
    generation: u64,
    armed: bool,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.inner.state();
        if state.generation == self.generation && state.is_submitting {
            tracing::warn!(generation = self.generation, "Onboarding submission abandoned");
            state.is_submitting = false;
            state.notification = Some(Notification {
                title: SUBMIT_FAILED_TITLE.to_string(),
                message: GENERIC_SUBMIT_FAILURE.to_string(),
            });
        }
    }
}

impl Drop for OnboardingModal {
    fn drop(&mut self) {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}
