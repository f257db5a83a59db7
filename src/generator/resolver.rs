//! Placeholder resolver.
//!
//! Tokens are substituted in a fixed order: the employee job title goes
//! before the employee name because the two sit next to each other in the
//! signature block. Every inserted value is shielded until the end of the
//! pass, so data that happens to contain token text is never substituted
//! again.

use lazy_static::lazy_static;
use regex::{Captures, NoExpand, Regex};

use super::common::{attendance_text, escape_html, issue_date};
use super::context::{CertificateTemplate, RenderingContext};
use super::program::render_program_list;
use super::tokens::{Token, DESCRIPTION_STOCK_PHRASE};

const SHIELD_OPEN: char = '\u{E000}';
const SHIELD_CLOSE: char = '\u{E001}';

lazy_static! {
    static ref SHIELDED: Regex = Regex::new(r"\x{E000}(\d+)\x{E001}").unwrap();
    static ref TRAINING_NAME_PHRASES: [Regex; 2] = [
        Regex::new(r"(?i)\s+of\s+\[TRAINING NAME\]\s*,").unwrap(),
        Regex::new(r"(?i)\s+of\s+\[TRAINING NAME\]").unwrap(),
    ];
    static ref LEGACY_ATTENDANCE_PHRASE: Regex =
        Regex::new(r"(?i)held\s+on\s+days?\s+<strong>\s*\[ATTENDANCE DATE\]\s*</strong>").unwrap();
    static ref PROGRAM_CONTENT_VARIANTS: Regex =
        Regex::new(r"(?i)\[PROGRAM[ _]CONTENT[^\]]*\]").unwrap();
    static ref STOCK_PHRASE_PREFIX: Regex = Regex::new(r"(?i)^participated\s+in\s+the\s+").unwrap();
}

/// Accumulates substitutions over one HTML string.
struct Substitution {
    html: String,
    values: Vec<String>,
}

impl Substitution {
    fn new(html: &str) -> Self {
        // Markup must not carry shield markers of its own.
        Self {
            html: html
                .chars()
                .filter(|c| *c != SHIELD_OPEN && *c != SHIELD_CLOSE)
                .collect(),
            values: Vec::new(),
        }
    }

    fn shield(&mut self, value: String) -> String {
        self.values.push(value);
        format!("{}{}{}", SHIELD_OPEN, self.values.len() - 1, SHIELD_CLOSE)
    }

    fn token(&mut self, token: Token, value: String) {
        if self.html.contains(token.as_str()) {
            let shielded = self.shield(value);
            self.html = self.html.replace(token.as_str(), &shielded);
        }
    }

    fn pattern(&mut self, pattern: &Regex, value: String) {
        if pattern.is_match(&self.html) {
            let shielded = self.shield(value);
            self.html = pattern
                .replace_all(&self.html, NoExpand(&shielded))
                .into_owned();
        }
    }

    fn remove_pattern(&mut self, pattern: &Regex) {
        self.html = pattern.replace_all(&self.html, "").into_owned();
    }

    fn finish(self) -> String {
        let values = self.values;
        SHIELDED
            .replace_all(&self.html, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| values.get(i).cloned())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Trimmed value, or `None` when blank or still equal to its own token.
fn present(value: Option<&str>, token: Token) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed == token.as_str() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve every bracket token of `html` from `context` and `template`.
pub fn resolve_placeholders(
    html: &str,
    template: &CertificateTemplate,
    context: &RenderingContext,
) -> String {
    let mut sub = Substitution::new(html);
    let employee = context.employee.as_ref();
    let company = context.company.as_ref();
    let signer = context.signer.as_ref();

    // Job title first; the element carrying it stays even when emptied.
    let job_title = present(
        employee.and_then(|e| e.job_title.as_deref()),
        Token::EmployeeJobTitle,
    );
    sub.token(
        Token::EmployeeJobTitle,
        job_title.map(|t| escape_html(&t)).unwrap_or_default(),
    );

    if let Some(name) = present(employee.map(|e| e.full_name.as_str()), Token::EmployeeName) {
        sub.token(Token::EmployeeName, escape_html(&name));
    }

    // The "ID: " label survives an empty value.
    let national_id = present(employee.and_then(|e| e.national_id.as_deref()), Token::EmployeeId);
    sub.token(
        Token::EmployeeId,
        national_id.map(|id| escape_html(&id)).unwrap_or_default(),
    );

    if let Some(name) = present(company.map(|c| c.legal_name.as_str()), Token::CompanyName) {
        sub.token(Token::CompanyName, escape_html(&name));
    }
    if let Some(tax_id) = present(company.and_then(|c| c.tax_id.as_deref()), Token::CompanyTaxId) {
        sub.token(Token::CompanyTaxId, escape_html(&tax_id));
    }

    if let Some(name) = present(signer.map(|s| s.full_name.as_str()), Token::SignerName) {
        sub.token(Token::SignerName, escape_html(&name));
    }
    if let Some(title) = present(signer.and_then(|s| s.job_title.as_deref()), Token::SignerTitle) {
        sub.token(Token::SignerTitle, escape_html(&title));
    }

    let training_name = present(context.training_name.as_deref(), Token::TrainingName);
    match &training_name {
        Some(name) => sub.token(Token::TrainingName, escape_html(name)),
        None => {
            // "of [TRAINING NAME]" goes as a whole phrase.
            for phrase in TRAINING_NAME_PHRASES.iter() {
                sub.remove_pattern(phrase);
            }
            sub.token(Token::TrainingName, String::new());
        }
    }

    if let Some(description) = present(context.description.as_deref(), Token::CertificateDescription) {
        let description = dedupe_stock_phrase(&sub.html, &description)
            .replace(Token::TrainingName.as_str(), training_name.as_deref().unwrap_or(""));
        sub.token(Token::CertificateDescription, escape_html(description.trim()));
    }

    let dates: Vec<String> = context
        .training_dates
        .iter()
        .filter(|d| !d.trim().is_empty())
        .map(|d| escape_html(d.trim()))
        .collect();
    let attendance = attendance_text(&dates, template.expected_day_count);
    sub.token(Token::AttendanceDateText, attendance.clone());
    sub.pattern(&LEGACY_ATTENDANCE_PHRASE, attendance);

    if let Some(address) = present(template.footer_address.as_deref(), Token::TrainingAddress) {
        sub.token(Token::TrainingAddress, escape_html(&address));
    }

    sub.pattern(
        &PROGRAM_CONTENT_VARIANTS,
        render_program_list(&template.program_content),
    );

    if let Some(date) = issue_date(&dates) {
        sub.token(Token::IssueDate, date);
    }

    sub.finish()
}

/// Strip the stock opening from a description when the template already
/// says it.
fn dedupe_stock_phrase(html: &str, description: &str) -> String {
    let template_has_phrase = html
        .to_lowercase()
        .contains(&DESCRIPTION_STOCK_PHRASE.to_lowercase());
    if !template_has_phrase {
        return description.to_string();
    }

    let mut stripped = description.trim().to_string();
    while STOCK_PHRASE_PREFIX.is_match(&stripped) {
        stripped = STOCK_PHRASE_PREFIX.replace(&stripped, "").trim().to_string();
    }
    stripped
}
