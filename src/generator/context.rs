//! Inputs of a render: the stored template and the rendering context.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Page orientation of a certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

/// A stored certificate template.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateTemplate {
    pub id: Uuid,
    #[schema(example = "Work at Height")]
    pub name: String,
    /// Raw HTML with bracket tokens, in any historical layout.
    pub html_body: String,
    #[serde(default)]
    pub orientation: Orientation,
    /// One lettered list item per entry.
    #[serde(default)]
    pub program_content: Vec<String>,
    #[serde(default)]
    pub footer_address: Option<String>,
    /// Number of date inputs the emission form starts with.
    #[serde(default = "default_day_count")]
    pub expected_day_count: u32,
    /// Layout generation of `html_body`; 0 means unknown history.
    #[serde(default)]
    pub schema_version: u32,
}

fn default_day_count() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EmployeeSnapshot {
    #[schema(example = "Maria Souza")]
    pub full_name: String,
    /// National identity document (RG).
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    #[schema(example = "Electrician")]
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CompanySnapshot {
    pub legal_name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SignerSnapshot {
    pub full_name: String,
    #[serde(default)]
    pub job_title: Option<String>,
}

/// Read-only data for one render.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RenderingContext {
    #[serde(default)]
    pub employee: Option<EmployeeSnapshot>,
    #[serde(default)]
    pub company: Option<CompanySnapshot>,
    #[serde(default)]
    pub signer: Option<SignerSnapshot>,
    /// `YYYY-MM-DD` strings, in attendance order.
    #[serde(default)]
    #[schema(example = json!(["2025-01-10", "2025-01-11"]))]
    pub training_dates: Vec<String>,
    #[serde(default)]
    pub training_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RenderingContext {
    /// Drop blank date entries, as the emission form leaves unused inputs empty.
    pub fn with_filtered_dates(mut self) -> Self {
        self.training_dates.retain(|d| !d.trim().is_empty());
        for date in self.training_dates.iter_mut() {
            *date = date.trim().to_string();
        }
        self
    }
}
