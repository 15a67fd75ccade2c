//! Candidate directory: fetches candidates and turns them into table rows.
//!
//! A failed fetch is terminal for that load. Nothing retries; the caller
//! decides when to [`load`](CandidateDirectory::load) again.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use talent_core::candidate::{Candidate, CandidateStatus};

use crate::error::DirectoryError;

/// Column headers, in display order.
pub const COLUMNS: [&str; 8] = [
    "Name",
    "Email",
    "Role",
    "Status",
    "Experience",
    "Location",
    "Created",
    "Action",
];

/// Placeholder for an absent cell value.
const EMPTY_CELL: &str = "-";

/// Display format of the Created column (e.g. `Jan 5, 2024`).
const CREATED_FORMAT: &str = "%b %-d, %Y";

// ---------------------------------------------------------------------------
// CandidateSource
// ---------------------------------------------------------------------------

/// Read-only access to the candidate directory.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, DirectoryError>;

    async fn get_candidate(&self, id: &str) -> Result<Candidate, DirectoryError>;
}

/// [`CandidateSource`] over the `GET /candidates` HTTP endpoints.
pub struct HttpCandidateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCandidateSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CandidateSource for HttpCandidateSource {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, DirectoryError> {
        let response = self
            .client
            .get(format!("{}/candidates", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "GET /candidates returned {status}"
            )));
        }
        Ok(response.json().await?)
    }

    async fn get_candidate(&self, id: &str) -> Result<Candidate, DirectoryError> {
        let response = self
            .client
            .get(format!("{}/candidates/{id}", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "GET /candidates/{id} returned {status}"
            )));
        }
        Ok(response.json().await?)
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Visual variant of the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Default,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: String,
    pub variant: BadgeVariant,
}

/// Action offered on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    /// Opens the onboarding workflow for the candidate.
    Hire,
}

impl RowAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Hire => "Hire",
        }
    }
}

/// One rendered directory row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryRow {
    pub candidate_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: StatusBadge,
    pub experience: String,
    pub location: String,
    pub created: String,
    pub action: Option<RowAction>,
}

impl DirectoryRow {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        let is_active = candidate.status == CandidateStatus::Active;
        Self {
            candidate_id: candidate.id.clone(),
            name: text_cell(&candidate.name),
            email: text_cell(&candidate.email),
            role: text_cell(&candidate.role),
            status: StatusBadge {
                label: candidate.status.as_str().to_string(),
                variant: if is_active {
                    BadgeVariant::Default
                } else {
                    BadgeVariant::Secondary
                },
            },
            experience: match candidate.experience {
                Some(years) if years > 0 => format!("{years} years"),
                _ => EMPTY_CELL.to_string(),
            },
            location: text_cell(&candidate.location),
            created: candidate
                .created_at
                .map(|ts| ts.format(CREATED_FORMAT).to_string())
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
            action: is_active.then_some(RowAction::Hire),
        }
    }

    fn cells(&self) -> [&str; 8] {
        [
            &self.name,
            &self.email,
            &self.role,
            &self.status.label,
            &self.experience,
            &self.location,
            &self.created,
            self.action.map(RowAction::label).unwrap_or(""),
        ]
    }
}

fn text_cell(value: &str) -> String {
    if value.trim().is_empty() {
        EMPTY_CELL.to_string()
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// DirectoryView
// ---------------------------------------------------------------------------

/// What the directory currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DirectoryView {
    Loading,
    Failed { message: String },
    Loaded { rows: Vec<DirectoryRow> },
}

impl DirectoryView {
    pub fn from_candidates(candidates: &[Candidate]) -> Self {
        Self::Loaded {
            rows: candidates.iter().map(DirectoryRow::from_candidate).collect(),
        }
    }
}

/// Render a view as a plain-text table.
pub fn render_table(view: &DirectoryView) -> String {
    let rows = match view {
        DirectoryView::Loading => return "Loading...".to_string(),
        DirectoryView::Failed { .. } => return "Failed to load candidates".to_string(),
        DirectoryView::Loaded { rows } => rows,
    };

    let mut widths = COLUMNS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |cells: [&str; 8]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(COLUMNS)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(rows.iter().map(|row| line(row.cells())));
    out.join("\n")
}

// ---------------------------------------------------------------------------
// CandidateDirectory
// ---------------------------------------------------------------------------

/// Loads candidates from a [`CandidateSource`] and keeps the latest view.
pub struct CandidateDirectory {
    source: Arc<dyn CandidateSource>,
    view: Mutex<DirectoryView>,
}

impl CandidateDirectory {
    pub fn new(source: Arc<dyn CandidateSource>) -> Self {
        Self {
            source,
            view: Mutex::new(DirectoryView::Loading),
        }
    }

    /// Fetch all candidates and replace the current view.
    pub async fn load(&self) -> DirectoryView {
        self.set_view(DirectoryView::Loading);

        let view = match self.source.list_candidates().await {
            Ok(candidates) => DirectoryView::from_candidates(&candidates),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load candidates");
                DirectoryView::Failed {
                    message: e.to_string(),
                }
            }
        };

        self.set_view(view.clone());
        view
    }

    /// The latest view without fetching.
    pub fn view(&self) -> DirectoryView {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_view(&self, view: DirectoryView) {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner) = view;
    }
}
