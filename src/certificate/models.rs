use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::generator::{RenderOutput, RenderingContext};
use crate::validation::{
    validate_required, validate_training_dates, ValidationError, ValidationErrors, Validator,
};

/// A certificate as issued, with a snapshot of the data it was issued from.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmittedCertificate {
    pub id: Uuid,
    pub template_id: Uuid,
    pub employee_id: Uuid,
    pub signer_id: Option<Uuid>,
    #[schema(example = "Maria Souza")]
    pub employee_name: String,
    pub employee_national_id: Option<String>,
    pub company_name: Option<String>,
    pub company_tax_id: Option<String>,
    #[schema(example = json!(["2025-01-10", "2025-01-11"]))]
    pub training_dates: Vec<String>,
    pub rendered_html: String,
    /// Tokens still present in `rendered_html` at issue time.
    pub unresolved_tokens: Vec<String>,
    pub issued_at: DateTime<Utc>,
}

impl EmittedCertificate {
    pub fn new(
        template_id: Uuid,
        employee_id: Uuid,
        signer_id: Option<Uuid>,
        context: &RenderingContext,
        output: RenderOutput,
    ) -> Self {
        let employee = context.employee.as_ref();
        let company = context.company.as_ref();
        Self {
            id: Uuid::new_v4(),
            template_id,
            employee_id,
            signer_id,
            employee_name: employee
                .map(|e| e.full_name.trim().to_string())
                .unwrap_or_default(),
            employee_national_id: employee.and_then(|e| e.national_id.clone()),
            company_name: company.map(|c| c.legal_name.clone()),
            company_tax_id: company.and_then(|c| c.tax_id.clone()),
            training_dates: context.training_dates.clone(),
            unresolved_tokens: output
                .unresolved_tokens
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            rendered_html: output.html,
            issued_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EmitCertificateRequest {
    /// The nil id selects the built-in template.
    pub template_id: Uuid,
    pub employee_id: Uuid,
    #[serde(default)]
    pub signer_id: Option<Uuid>,
    pub context: RenderingContext,
}

impl Validator for EmitCertificateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match &self.context.employee {
            Some(employee) => validate_required(
                &employee.full_name,
                "context.employee.full_name",
                "Employee name",
                &mut errors,
            ),
            None => errors.add(
                ValidationError::missing("context.employee", "Employee")
                    .with_suggestion("Select the employee the certificate is issued to"),
            ),
        }

        if self.signer_id.is_some() && self.context.signer.is_none() {
            errors.add(
                ValidationError::missing("context.signer", "Signer")
                    .with_suggestion("Send the signer snapshot together with signer_id"),
            );
        }

        validate_training_dates(
            &self.context.training_dates,
            "context.training_dates",
            &mut errors,
        );

        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BatchItem {
    pub employee_id: Uuid,
    pub context: RenderingContext,
}

/// One template issued to many employees.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchEmitRequest {
    pub template_id: Uuid,
    #[serde(default)]
    pub signer_id: Option<Uuid>,
    pub items: Vec<BatchItem>,
}

impl BatchEmitRequest {
    pub fn into_requests(self) -> Vec<EmitCertificateRequest> {
        let template_id = self.template_id;
        let signer_id = self.signer_id;
        self.items
            .into_iter()
            .map(|item| EmitCertificateRequest {
                template_id,
                employee_id: item.employee_id,
                signer_id,
                context: item.context,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BatchFailure {
    /// Position of the item in the request.
    pub index: usize,
    pub employee_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BatchEmitResponse {
    pub issued: Vec<EmittedCertificate>,
    pub failed: Vec<BatchFailure>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewRequest {
    /// The nil id selects the built-in template.
    pub template_id: Uuid,
    /// Unsaved markup to render with the template's settings.
    #[serde(default)]
    pub html_body: Option<String>,
    #[serde(default)]
    pub context: RenderingContext,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Issue month as `YYYY-MM`
    #[param(example = "2025-01")]
    pub month: Option<String>,
    pub employee_id: Option<Uuid>,
}

impl ListQuery {
    pub fn into_filter(self) -> Result<CertificateFilter, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let month = match self.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => match NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
                Ok(first_day) => Some((first_day.year(), first_day.month())),
                Err(_) => {
                    errors.add(
                        ValidationError::new("month", format!("Month '{}' is not valid", raw))
                            .with_suggestion("Use the YYYY-MM format, e.g. 2025-01"),
                    );
                    None
                }
            },
            None => None,
        };
        errors.into_result()?;
        Ok(CertificateFilter {
            month,
            employee_id: self.employee_id,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificateFilter {
    /// `(year, month)` of `issued_at`.
    pub month: Option<(i32, u32)>,
    pub employee_id: Option<Uuid>,
}

impl CertificateFilter {
    pub fn matches(&self, certificate: &EmittedCertificate) -> bool {
        let month_ok = self.month.map_or(true, |(year, month)| {
            certificate.issued_at.year() == year && certificate.issued_at.month() == month
        });
        let employee_ok = self
            .employee_id
            .map_or(true, |id| certificate.employee_id == id);
        month_ok && employee_ok
    }
}
