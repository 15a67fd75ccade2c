//! Onboarding templates, form payloads, and the rules that gate submission.
//!
//! Template shape and form schemas are owned by the connector. This module
//! only copies what the connector returns and decides locally whether a
//! submission may go out.

use serde::{Deserialize, Serialize};

use crate::types::TemplateId;

/// User-facing fallback when a failed submission carries no message.
pub const GENERIC_SUBMIT_FAILURE: &str = "Failed to start onboarding";

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// An onboarding template as listed by the connector.
///
/// Only `id` and `name` are populated in practice; any other fields the
/// connector sends are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingTemplate {
    pub id: TemplateId,
    pub name: String,
}

/// Case-insensitive substring match of `query` against the template name.
///
/// An empty query matches everything.
pub fn matches_query(template: &OnboardingTemplate, query: &str) -> bool {
    template
        .name
        .to_lowercase()
        .contains(&query.to_lowercase())
}

/// Filter templates by name, preserving the connector's ordering.
pub fn filter_templates<'a>(
    templates: &'a [OnboardingTemplate],
    query: &str,
) -> Vec<&'a OnboardingTemplate> {
    templates
        .iter()
        .filter(|t| matches_query(t, query))
        .collect()
}

// ---------------------------------------------------------------------------
// Form schema / data
// ---------------------------------------------------------------------------

/// JSON-Schema-like description of the onboarding form for one template.
///
/// Opaque on purpose: rendered as received, never validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSchema(pub serde_json::Value);

impl FormSchema {
    /// Field names listed under the schema's top-level `required` array.
    pub fn required_fields(&self) -> Vec<&str> {
        self.0
            .get("required")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Field name to entered value, as built up by the rendered form.
pub type FormData = serde_json::Map<String, serde_json::Value>;

/// Input of the connector's onboarding action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingRequest {
    pub data: FormData,
    #[serde(rename = "onboardingTemplate")]
    pub onboarding_template: TemplateId,
}

/// A submission is valid only with a selected template and non-empty data.
pub fn can_submit(selected_template: Option<&str>, form_data: &FormData) -> bool {
    selected_template.is_some_and(|id| !id.is_empty()) && !form_data.is_empty()
}
