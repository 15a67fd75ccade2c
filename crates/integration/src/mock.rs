//! Scripted test double for [`IntegrationClient`].
//!
//! Replies are scripted per action / per data-collection parameters and may
//! be delayed, which lets tests reorder responses under a paused tokio
//! clock. Every call is recorded.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use talent_core::onboarding::{FormSchema, OnboardingTemplate};

use crate::catalog::{
    LIST_TEMPLATES_ACTION, ONBOARDING_ACTION, SCHEMA_COLLECTION, TEMPLATE_CODE_PARAM,
};
use crate::client::IntegrationClient;
use crate::error::ConnectorError;

/// A scripted reply.
#[derive(Debug, Clone)]
pub struct MockReply {
    result: Result<Value, ConnectorError>,
    delay: Option<Duration>,
    hang: bool,
}

impl MockReply {
    pub fn ok(value: Value) -> Self {
        Self {
            result: Ok(value),
            delay: None,
            hang: false,
        }
    }

    pub fn err(err: ConnectorError) -> Self {
        Self {
            result: Err(err),
            delay: None,
            hang: false,
        }
    }

    /// A reply that never resolves.
    pub fn hang() -> Self {
        Self {
            result: Ok(Value::Null),
            delay: None,
            hang: true,
        }
    }

    /// Resolve only after `delay` has elapsed.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn resolve(self) -> Result<Value, ConnectorError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result
    }
}

/// A call seen by the mock, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Action {
        connection: String,
        action: String,
        input: Value,
    },
    DataCollection {
        connection: String,
        collection: String,
        parameters: Value,
    },
}

/// Mock integration platform.
#[derive(Default)]
pub struct MockIntegrationClient {
    actions: Mutex<HashMap<String, MockReply>>,
    collections: Mutex<Vec<(String, Value, MockReply)>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockIntegrationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply for `action`, replacing any earlier script.
    pub fn on_action(&self, action: &str, reply: MockReply) {
        self.actions
            .lock()
            .unwrap()
            .insert(action.to_string(), reply);
    }

    /// Script the reply for `collection` read with exactly `parameters`.
    pub fn on_collection(&self, collection: &str, parameters: Value, reply: MockReply) {
        let mut collections = self.collections.lock().unwrap();
        collections.retain(|(c, p, _)| !(c == collection && *p == parameters));
        collections.push((collection.to_string(), parameters, reply));
    }

    // ---- onboarding shortcuts ----

    /// Script the template listing to return `templates`.
    pub fn on_list_templates(&self, templates: &[OnboardingTemplate]) {
        self.on_action(
            LIST_TEMPLATES_ACTION,
            MockReply::ok(json!({ "records": templates })),
        );
    }

    /// Script the schema returned for `template_id`.
    pub fn on_template_schema(&self, template_id: &str, reply: MockReply) {
        self.on_collection(
            SCHEMA_COLLECTION,
            json!({ TEMPLATE_CODE_PARAM: template_id }),
            reply,
        );
    }

    /// Shortcut for a successful schema reply.
    pub fn schema_reply(schema: &FormSchema) -> MockReply {
        MockReply::ok(json!({ "fieldsSchema": schema }))
    }

    /// Script the onboarding action.
    pub fn on_onboarding(&self, reply: MockReply) {
        self.on_action(ONBOARDING_ACTION, reply);
    }

    // ---- inspection ----

    /// All calls received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times `action` was run.
    pub fn action_count(&self, action: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockCall::Action { action: a, .. } if a == action))
            .count()
    }

    /// Inputs passed to `action`, in call order.
    pub fn action_inputs(&self, action: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                MockCall::Action {
                    action: a, input, ..
                } if a == action => Some(input.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl IntegrationClient for MockIntegrationClient {
    async fn run_action(
        &self,
        connection: &str,
        action: &str,
        input: Value,
    ) -> Result<Value, ConnectorError> {
        self.calls.lock().unwrap().push(MockCall::Action {
            connection: connection.to_string(),
            action: action.to_string(),
            input,
        });

        let reply = self.actions.lock().unwrap().get(action).cloned();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(ConnectorError::Rejected(format!(
                "no mock reply for action '{action}'"
            ))),
        }
    }

    async fn get_data_collection(
        &self,
        connection: &str,
        collection: &str,
        parameters: Value,
    ) -> Result<Value, ConnectorError> {
        self.calls.lock().unwrap().push(MockCall::DataCollection {
            connection: connection.to_string(),
            collection: collection.to_string(),
            parameters: parameters.clone(),
        });

        let reply = self
            .collections
            .lock()
            .unwrap()
            .iter()
            .find(|(c, p, _)| c == collection && *p == parameters)
            .map(|(_, _, r)| r.clone());
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(ConnectorError::Rejected(format!(
                "no mock reply for data collection '{collection}' with {parameters}"
            ))),
        }
    }
}
