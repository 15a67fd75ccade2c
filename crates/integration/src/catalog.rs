//! Onboarding template catalog backed by the HR connector.
//!
//! All three operations go through one fixed connection. The template list
//! is cached and concurrent callers share a single in-flight request; schema
//! reads and onboarding runs always hit the connector.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde_json::{json, Value};
use talent_core::onboarding::{FormData, FormSchema, OnboardingRequest, OnboardingTemplate};

use crate::client::IntegrationClient;
use crate::error::ConnectorError;

/// Default connection key of the HR / workforce connector.
pub const DEFAULT_CONNECTION_KEY: &str = "adp-workforce";

/// Action listing the available onboarding templates.
pub const LIST_TEMPLATES_ACTION: &str = "list-onboarding-templates";

/// Data collection yielding the form schema of one template.
pub const SCHEMA_COLLECTION: &str = "application-onboard";

/// Parameter of [`SCHEMA_COLLECTION`] carrying the template code.
pub const TEMPLATE_CODE_PARAM: &str = "onboardingTemplateCode";

/// Action starting onboarding for a candidate.
pub const ONBOARDING_ACTION: &str = "onboard-candidate";

/// Which connection the catalog talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorKeys {
    pub connection: String,
}

impl Default for ConnectorKeys {
    fn default() -> Self {
        Self {
            connection: DEFAULT_CONNECTION_KEY.to_string(),
        }
    }
}

/// Loading / error flags of the template listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

type TemplateFuture =
    Shared<BoxFuture<'static, Result<Arc<Vec<OnboardingTemplate>>, ConnectorError>>>;

enum CacheSlot {
    Empty,
    InFlight { fetch_id: u64, future: TemplateFuture },
    Ready(Arc<Vec<OnboardingTemplate>>),
    Failed(ConnectorError),
}

// ---------------------------------------------------------------------------
// TemplateCatalog
// ---------------------------------------------------------------------------

/// Client for onboarding templates, their schemas, and the onboarding run.
pub struct TemplateCatalog {
    client: Arc<dyn IntegrationClient>,
    keys: ConnectorKeys,
    slot: Arc<Mutex<CacheSlot>>,
    next_fetch_id: AtomicU64,
}

impl TemplateCatalog {
    pub fn new(client: Arc<dyn IntegrationClient>, keys: ConnectorKeys) -> Self {
        Self {
            client,
            keys,
            slot: Arc::new(Mutex::new(CacheSlot::Empty)),
            next_fetch_id: AtomicU64::new(0),
        }
    }

    /// Return the cached template list, fetching it if needed.
    ///
    /// Concurrent callers share one in-flight request. A failure is
    /// recorded in [`status`](Self::status) and the next call fetches again.
    /// The request runs to completion on its own task, so the listing
    /// settles even when every caller stops waiting.
    pub async fn list_templates(&self) -> Result<Vec<OnboardingTemplate>, ConnectorError> {
        let (fetch_id, future) = {
            let mut slot = self.slot();
            match &*slot {
                CacheSlot::Ready(templates) => return Ok(templates.as_ref().clone()),
                CacheSlot::InFlight { fetch_id, future } => (*fetch_id, future.clone()),
                CacheSlot::Empty | CacheSlot::Failed(_) => {
                    let fetch_id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let future =
                        fetch_templates(Arc::clone(&self.client), self.keys.connection.clone())
                            .boxed()
                            .shared();
                    *slot = CacheSlot::InFlight {
                        fetch_id,
                        future: future.clone(),
                    };
                    tokio::spawn(settle_when_done(
                        Arc::clone(&self.slot),
                        fetch_id,
                        future.clone(),
                    ));
                    (fetch_id, future)
                }
            }
        };

        let result = future.await;
        settle(&self.slot, fetch_id, &result);

        result.map(|templates| templates.as_ref().clone())
    }

    /// Current loading / error flags of the template listing.
    pub fn status(&self) -> CatalogStatus {
        match &*self.slot() {
            CacheSlot::InFlight { .. } => CatalogStatus {
                is_loading: true,
                error: None,
            },
            CacheSlot::Failed(e) => CatalogStatus {
                is_loading: false,
                error: Some(e.to_string()),
            },
            CacheSlot::Empty | CacheSlot::Ready(_) => CatalogStatus::default(),
        }
    }

    /// Drop the cached list so the next call refetches.
    pub fn invalidate(&self) {
        *self.slot() = CacheSlot::Empty;
    }

    /// Fetch the form schema for `template_id`. Never cached.
    pub async fn get_template_schema(&self, template_id: &str) -> Result<FormSchema, ConnectorError> {
        let mut spec = self
            .client
            .get_data_collection(
                &self.keys.connection,
                SCHEMA_COLLECTION,
                json!({ TEMPLATE_CODE_PARAM: template_id }),
            )
            .await?;

        match spec.get_mut("fieldsSchema").map(Value::take) {
            Some(schema) if !schema.is_null() => Ok(FormSchema(schema)),
            _ => Err(ConnectorError::Decode(format!(
                "data collection '{SCHEMA_COLLECTION}' returned no fieldsSchema for template '{template_id}'"
            ))),
        }
    }

    /// Run the onboarding action with the form data and template id.
    pub async fn run_onboarding(
        &self,
        data: FormData,
        template_id: &str,
    ) -> Result<Value, ConnectorError> {
        let request = OnboardingRequest {
            data,
            onboarding_template: template_id.to_string(),
        };
        let input =
            serde_json::to_value(&request).map_err(|e| ConnectorError::Decode(e.to_string()))?;

        let output = self
            .client
            .run_action(&self.keys.connection, ONBOARDING_ACTION, input)
            .await?;

        tracing::info!(template_id, "Onboarding action completed");
        Ok(output)
    }

    fn slot(&self) -> MutexGuard<'_, CacheSlot> {
        lock(&self.slot)
    }
}

fn lock(slot: &Mutex<CacheSlot>) -> MutexGuard<'_, CacheSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Record the outcome of fetch `fetch_id` unless the slot moved on
/// (invalidated, or replaced by a newer fetch).
fn settle(
    slot: &Mutex<CacheSlot>,
    fetch_id: u64,
    result: &Result<Arc<Vec<OnboardingTemplate>>, ConnectorError>,
) {
    let mut slot = lock(slot);
    if matches!(&*slot, CacheSlot::InFlight { fetch_id: id, .. } if *id == fetch_id) {
        *slot = match result {
            Ok(templates) => CacheSlot::Ready(Arc::clone(templates)),
            Err(e) => CacheSlot::Failed(e.clone()),
        };
    }
}

async fn settle_when_done(slot: Arc<Mutex<CacheSlot>>, fetch_id: u64, future: TemplateFuture) {
    let result = future.await;
    settle(&slot, fetch_id, &result);
}

async fn fetch_templates(
    client: Arc<dyn IntegrationClient>,
    connection: String,
) -> Result<Arc<Vec<OnboardingTemplate>>, ConnectorError> {
    tracing::debug!(connection = %connection, "Fetching onboarding templates");

    let mut output = client
        .run_action(&connection, LIST_TEMPLATES_ACTION, json!({}))
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to list onboarding templates"))?;

    let records = output
        .get_mut("records")
        .map(Value::take)
        .ok_or_else(|| ConnectorError::Decode("template listing has no records".to_string()))?;

    let templates: Vec<OnboardingTemplate> =
        serde_json::from_value(records).map_err(|e| ConnectorError::Decode(e.to_string()))?;

    tracing::debug!(count = templates.len(), "Fetched onboarding templates");
    Ok(Arc::new(templates))
}
