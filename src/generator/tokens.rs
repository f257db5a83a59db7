//! Token catalog.
//!
//! The fixed vocabulary of bracket placeholders a certificate template may
//! contain, plus the markup fragments and class names the migrator and the
//! CSS patch engine look for.

use serde::{Serialize, Serializer};
use std::fmt;

/// A bracket placeholder recognised by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    EmployeeName,
    EmployeeId,
    EmployeeJobTitle,
    CompanyName,
    CompanyTaxId,
    IssueDate,
    AttendanceDateText,
    ProgramContentList,
    TrainingAddress,
    SignerName,
    SignerTitle,
    TrainingName,
    CertificateDescription,
}

impl Token {
    /// Every token, in the order unresolved tokens are reported.
    pub const ALL: [Token; 13] = [
        Token::EmployeeName,
        Token::EmployeeId,
        Token::EmployeeJobTitle,
        Token::CompanyName,
        Token::CompanyTaxId,
        Token::IssueDate,
        Token::AttendanceDateText,
        Token::ProgramContentList,
        Token::TrainingAddress,
        Token::SignerName,
        Token::SignerTitle,
        Token::TrainingName,
        Token::CertificateDescription,
    ];

    /// The literal text of the token as it appears in a template.
    pub fn as_str(self) -> &'static str {
        match self {
            Token::EmployeeName => "[EMPLOYEE NAME]",
            Token::EmployeeId => "[EMPLOYEE ID]",
            Token::EmployeeJobTitle => "[EMPLOYEE JOB TITLE]",
            Token::CompanyName => "[COMPANY NAME]",
            Token::CompanyTaxId => "[COMPANY TAX ID]",
            Token::IssueDate => "[ISSUE DATE]",
            Token::AttendanceDateText => "[ATTENDANCE DATE TEXT]",
            Token::ProgramContentList => "[PROGRAM CONTENT LIST]",
            Token::TrainingAddress => "[TRAINING ADDRESS]",
            Token::SignerName => "[SIGNER NAME]",
            Token::SignerTitle => "[SIGNER TITLE]",
            Token::TrainingName => "[TRAINING NAME]",
            Token::CertificateDescription => "[CERTIFICATE DESCRIPTION]",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Tokens still present in `html`, in catalog order.
pub fn find_unresolved(html: &str) -> Vec<Token> {
    Token::ALL
        .iter()
        .copied()
        .filter(|t| html.contains(t.as_str()))
        .collect()
}

/// Placeholder used by pre-sentence templates for a single attendance date.
pub const LEGACY_ATTENDANCE_DATE: &str = "[ATTENDANCE DATE]";

/// Fixed caption older signature blocks carried instead of a job title.
pub const LEGACY_INSTRUCTOR_CAPTION: &str = "Instructor of the Training";

/// Text whose presence marks the canonical certification sentence.
pub const CERTIFICATION_PROBE: &str = "Certifies that Employee:";

/// Stock opening of the description paragraph.
pub const DESCRIPTION_STOCK_PHRASE: &str = "Participated in the";

/// The canonical certification sentence inserted by the migrator.
pub fn certification_sentence() -> String {
    format!(
        r#"<div class="{class}">{probe} <strong>{name}</strong>, ID: <strong>{id}</strong>, of Company: <strong>{company}</strong> and Tax-ID: <strong>{tax_id}</strong></div>"#,
        class = class::COMPANY_CERTIFICATION,
        probe = CERTIFICATION_PROBE,
        name = Token::EmployeeName,
        id = Token::EmployeeId,
        company = Token::CompanyName,
        tax_id = Token::CompanyTaxId,
    )
}

/// Inline style shared by the secondary lines of a signature block.
pub const SIGNATURE_LINE_STYLE: &str =
    "font-size: 10px; line-height: 1.2; color: #374151; margin: 0; padding: 0; margin-top: 1px;";

/// Class names used by current and historical template layouts.
pub mod class {
    pub const CONTENT: &str = "content";
    pub const COMPANY_CERTIFICATION: &str = "company-certification";
    pub const PROGRAM_CONTENT: &str = "program-content";
    pub const PROGRAM_CONTENT_WRAPPER: &str = "program-content-wrapper";
    pub const ISSUE_DATE_ASIDE: &str = "issue-date-aside";
    pub const FOOTER: &str = "footer";
    pub const TRAINING_ADDRESS: &str = "training-address";
    pub const SIGNATURES: &str = "signatures";
    pub const SIGNATURE: &str = "signature";
    pub const SIGNATURE_LINE: &str = "signature-line";
    pub const SIGNATURE_NAME: &str = "signature-name";
    pub const SIGNATURE_TITLE: &str = "signature-title";

    // Retired layouts.
    pub const ISSUING_COMPANY: &str = "issuing-company";
    pub const ISSUING_TAX_ID: &str = "issuing-tax-id";
    pub const CERTIFIES_THAT: &str = "certifies-that";
    pub const EMPLOYEE_NAME: &str = "employee-name";
    pub const FOOTER_DATE: &str = "footer-date";
}
