use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::generator::{CertificateTemplate, Orientation};
use crate::validation::{validate_required, ValidationErrors, Validator};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTemplateRequest {
    #[schema(example = "Work at Height")]
    pub name: String,
    pub html_body: String,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    #[schema(example = json!(["Anchorage points", "Harness inspection"]))]
    pub program_content: Vec<String>,
    #[serde(default)]
    pub footer_address: Option<String>,
    #[serde(default)]
    pub expected_day_count: Option<u32>,
    /// Omit for markup of unknown history.
    #[serde(default)]
    pub schema_version: Option<u32>,
}

impl CreateTemplateRequest {
    pub fn into_template(self) -> CertificateTemplate {
        CertificateTemplate {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            html_body: self.html_body,
            orientation: self.orientation,
            program_content: self
                .program_content
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            footer_address: self
                .footer_address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            expected_day_count: self.expected_day_count.unwrap_or(1).max(1),
            schema_version: self.schema_version.unwrap_or(0),
        }
    }
}

impl Validator for CreateTemplateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.html_body, "html_body", "Template HTML", &mut errors);
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DefaultTemplateQuery {
    /// `landscape` (default) or `portrait`
    pub orientation: Option<Orientation>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MigrationResponse {
    pub template: CertificateTemplate,
    /// Migration steps that ran, in order.
    pub applied: Vec<String>,
}
