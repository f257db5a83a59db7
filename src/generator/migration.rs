//! Legacy structure migrator.
//!
//! Templates carry a `schema_version`. Each migration lifts the markup from
//! one version to the next; a template already at
//! [`CURRENT_SCHEMA_VERSION`] is left alone. Every step is also guarded by a
//! content probe, so running the whole chain over markup that already has
//! the current shape changes nothing.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::tokens::{
    certification_sentence, class, Token, CERTIFICATION_PROBE, LEGACY_INSTRUCTOR_CAPTION,
    SIGNATURE_LINE_STYLE,
};

/// Schema version produced by the last migration step.
pub const CURRENT_SCHEMA_VERSION: u32 = 4;

struct Migration {
    /// Version the template is at after this step.
    target: u32,
    name: &'static str,
    apply: fn(&str) -> String,
}

const MIGRATIONS: [Migration; 4] = [
    Migration {
        target: 1,
        name: "consolidate certification sentence",
        apply: consolidate_certification_sentence,
    },
    Migration {
        target: 2,
        name: "data-driven signature block",
        apply: data_driven_signature_block,
    },
    Migration {
        target: 3,
        name: "drop retired fields",
        apply: drop_retired_fields,
    },
    Migration {
        target: 4,
        name: "issue date beside program content",
        apply: issue_date_beside_program_content,
    },
];

lazy_static! {
    static ref LEGACY_CERTIFICATION_BLOCKS: Vec<Regex> = [
        class::ISSUING_COMPANY,
        class::ISSUING_TAX_ID,
        class::CERTIFIES_THAT,
        class::EMPLOYEE_NAME,
    ]
    .iter()
    .map(|name| div_with_class(name))
    .collect();
    static ref CERTIFICATION_BLOCK: Regex = div_with_class(class::COMPANY_CERTIFICATION);
    static ref CONTENT_OPENING: Regex =
        Regex::new(&format!(r#"(?i)(<div[^>]*class="{}"[^>]*>)"#, class::CONTENT)).unwrap();

    static ref SIGNATURE_PATTERNS: [Regex; 3] = [
        // Inline-styled column with a 192px rule above the name.
        signature_pattern(
            r#"<div[^>]*style="[^"]*display:\s*flex[^"]*flex-direction:\s*column[^"]*align-items:\s*center[^"]*"[^>]*>\s*<div[^>]*style="[^"]*width:\s*192px[^"]*border-top:[^"]*"[^>]*>\s*</div>\s*<p[^>]*>"#
        ),
        // Class-based signature block.
        signature_pattern(&format!(
            r#"<div[^>]*class="{}"[^>]*>\s*<div[^>]*class="{}"[^>]*>\s*</div>\s*<p[^>]*class="{}"[^>]*>"#,
            class::SIGNATURE,
            class::SIGNATURE_LINE,
            class::SIGNATURE_NAME
        )),
        // Any div holding an empty rule div followed by the name.
        signature_pattern(r#"<div[^>]*>\s*<div[^>]*>\s*</div>\s*<p[^>]*>"#),
    ];
    static ref SIGNATURE_FALLBACK: Regex = signature_pattern(r#"<p[^>]*>"#);

    static ref RETIRED_FIELDS: [Regex; 4] = [
        Regex::new(r#"(?i)<div[^>]*>\s*<strong>\s*Regulatory\s+Standard\s*-\s*\[NR\][^<]*</strong>\s*</div>"#).unwrap(),
        Regex::new(r#"(?i)Regulatory\s+Standard\s*-\s*\[NR\],*"#).unwrap(),
        Regex::new(r#"(?i)with\s+a\s+workload\s+of\s+<strong>\s*\[WORKLOAD\]\s+hours\.\s*</strong>"#).unwrap(),
        Regex::new(r#"(?i)with\s+a\s+workload\s+of\s+\[WORKLOAD\]\s+hours\."#).unwrap(),
    ];

    static ref FOOTER_DATE_BLOCK: Regex = div_with_class(class::FOOTER_DATE);
    static ref PROGRAM_CONTENT_BLOCK: Regex = Regex::new(&format!(
        r#"(?i)(<div[^>]*class="{}"[^>]*>(?s:.*?)</div>)"#,
        class::PROGRAM_CONTENT
    ))
    .unwrap();
}

/// Single-line `<div class="name">…</div>` block.
fn div_with_class(name: &str) -> Regex {
    Regex::new(&format!(r#"(?i)<div[^>]*class="{}"[^>]*>.*?</div>"#, name)).unwrap()
}

/// Name paragraph behind `prefix`, an optional trailing paragraph, and the
/// closing div of the block.
fn signature_pattern(prefix: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)({}\s*\[EMPLOYEE NAME\]\s*</p>)(\s*(?:<p[^>]*>[^<]*</p>)?\s*)(</div>)"#,
        prefix
    ))
    .unwrap()
}

/// Result of running the migration chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MigratedTemplate {
    pub html: String,
    pub schema_version: u32,
    /// Names of the steps that ran, in order.
    pub applied: Vec<&'static str>,
}

/// Lift `html` from `schema_version` to [`CURRENT_SCHEMA_VERSION`].
pub fn migrate_from(html: &str, schema_version: u32) -> MigratedTemplate {
    let mut current = html.to_string();
    let mut applied = Vec::new();

    for step in MIGRATIONS.iter().filter(|m| m.target > schema_version) {
        current = (step.apply)(&current);
        log::debug!("Template migrated to v{} ({})", step.target, step.name);
        applied.push(step.name);
    }

    if applied.is_empty() {
        log::debug!("Template already at schema v{}, skipping migration", schema_version);
    }

    MigratedTemplate {
        html: current,
        schema_version: schema_version.max(CURRENT_SCHEMA_VERSION),
        applied,
    }
}

/// Run the full chain over markup of unknown history.
pub fn migrate(html: &str) -> String {
    migrate_from(html, 0).html
}

fn consolidate_certification_sentence(html: &str) -> String {
    let mut html = html.to_string();
    for block in LEGACY_CERTIFICATION_BLOCKS.iter() {
        html = block.replace_all(&html, "").into_owned();
    }

    // Older sentences reused the class with different wording.
    html = CERTIFICATION_BLOCK
        .replace_all(&html, |caps: &Captures| {
            if caps[0].contains(CERTIFICATION_PROBE) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned();

    if !html.contains(CERTIFICATION_PROBE) {
        let sentence = certification_sentence();
        html = CONTENT_OPENING
            .replace_all(&html, |caps: &Captures| {
                format!("{}\n      {}", &caps[1], sentence)
            })
            .into_owned();
    }
    html
}

fn data_driven_signature_block(html: &str) -> String {
    let mut html = html.replace(LEGACY_INSTRUCTOR_CAPTION, Token::EmployeeJobTitle.as_str());

    let name = Token::EmployeeName.as_str();
    let job_title = Token::EmployeeJobTitle.as_str();
    if !html.contains(name) {
        return html;
    }

    let replacement = format!(
        "${{1}}\n          <p style=\"{style}\">\n            {job_title}\n          </p>\n          <p style=\"{style}\">\n            ID: {id}\n          </p>\n        ${{3}}",
        style = SIGNATURE_LINE_STYLE,
        job_title = job_title,
        id = Token::EmployeeId,
    );

    // The generic fallback only runs while the job title token is absent.
    let fallback = (!html.contains(job_title)).then_some(&*SIGNATURE_FALLBACK);
    let matched = SIGNATURE_PATTERNS
        .iter()
        .chain(fallback)
        .find(|pattern| pattern.is_match(&html));

    match matched {
        Some(pattern) => {
            html = pattern.replace_all(&html, replacement.as_str()).into_owned();
        }
        None => {
            log::debug!("No signature block pattern matched; job title and ID lines not added");
        }
    }
    html
}

fn drop_retired_fields(html: &str) -> String {
    RETIRED_FIELDS
        .iter()
        .fold(html.to_string(), |acc, field| field.replace_all(&acc, "").into_owned())
}

fn issue_date_beside_program_content(html: &str) -> String {
    let issue_date = Token::IssueDate.as_str();
    let legacy_footer = html.contains(class::FOOTER_DATE);
    let misplaced = html.contains(issue_date) && !html.contains(class::ISSUE_DATE_ASIDE);
    if !legacy_footer && !misplaced {
        return html.to_string();
    }

    let mut html = FOOTER_DATE_BLOCK.replace_all(html, "").into_owned();
    if !html.contains(class::PROGRAM_CONTENT_WRAPPER) {
        let wrapped = format!(
            r#"<div class="{}">${{1}}<div class="{}">{}</div></div>"#,
            class::PROGRAM_CONTENT_WRAPPER,
            class::ISSUE_DATE_ASIDE,
            issue_date
        );
        html = PROGRAM_CONTENT_BLOCK
            .replace_all(&html, wrapped.as_str())
            .into_owned();
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"<html><head><style>.content { padding: 20px; }</style></head>
<body>
  <div class="certificate">
    <div class="content">
      <div class="issuing-company">ACME Training Ltd</div>
      <div class="issuing-tax-id">Tax-ID: 00.000.000/0001-00</div>
      <div class="certifies-that">We certify that</div>
      <div class="employee-name">[EMPLOYEE NAME] <span class="rg">ID: [EMPLOYEE ID]</span></div>
      <div class="training-text">Regulatory Standard - [NR], with a workload of <strong>[WORKLOAD] hours.</strong> [CERTIFICATE DESCRIPTION]</div>
      <div class="program-content">
        <h3>Program content:</h3>
        <ul>[PROGRAM CONTENT LIST]</ul>
      </div>
    </div>
    <div class="footer">
      <div class="footer-date">[ISSUE DATE]</div>
      <div class="signatures">
        <div class="signature">
          <div class="signature-line"></div>
          <p class="signature-name">[EMPLOYEE NAME]</p>
          <p class="signature-title">Instructor of the Training</p>
        </div>
        <div class="signature">
          <div class="signature-line"></div>
          <p class="signature-name">[SIGNER NAME]</p>
          <p class="signature-title">[SIGNER TITLE]</p>
        </div>
      </div>
    </div>
  </div>
</body></html>"#;

    #[test]
    fn test_legacy_blocks_replaced_by_canonical_sentence() {
        let html = migrate(LEGACY);
        assert!(!html.contains("issuing-company"));
        assert!(!html.contains("issuing-tax-id"));
        assert!(!html.contains("certifies-that"));
        assert!(!html.contains(r#"class="employee-name""#));
        assert_eq!(html.matches(CERTIFICATION_PROBE).count(), 1);
        assert!(html.contains(&format!(
            "<div class=\"content\">\n      {}",
            certification_sentence()
        )));
    }

    #[test]
    fn test_stale_certification_wording_is_replaced() {
        let html = r#"<div class="content"><div class="company-certification">We certify [EMPLOYEE NAME]</div></div>"#;
        let migrated = migrate(html);
        assert!(!migrated.contains("We certify"));
        assert_eq!(migrated.matches(CERTIFICATION_PROBE).count(), 1);
    }

    #[test]
    fn test_instructor_caption_becomes_job_title_token() {
        let html = migrate(LEGACY);
        assert!(!html.contains(LEGACY_INSTRUCTOR_CAPTION));
        assert!(!html.contains(r#"<p class="signature-title">[EMPLOYEE JOB TITLE]</p>"#));
        assert_eq!(html.matches("[EMPLOYEE JOB TITLE]").count(), 1);
    }

    #[test]
    fn test_caption_block_gets_job_title_and_id_lines() {
        let html = r#"<div class="signature"><div class="signature-line"></div><p class="signature-name">[EMPLOYEE NAME]</p><p class="signature-title">Instructor of the Training</p></div>"#;
        let migrated = data_driven_signature_block(html);
        let name_at = migrated.find("[EMPLOYEE NAME]</p>").unwrap();
        let title_at = migrated.find("[EMPLOYEE JOB TITLE]").unwrap();
        let id_at = migrated.find("ID: [EMPLOYEE ID]").unwrap();
        assert!(name_at < title_at && title_at < id_at);
        assert_eq!(migrated.matches("[EMPLOYEE JOB TITLE]").count(), 1);
        assert!(migrated.trim_end().ends_with("</div>"));
        assert_eq!(data_driven_signature_block(&migrated), migrated);
    }

    #[test]
    fn test_fallback_skipped_when_job_title_present() {
        let html = r#"<section><p>[EMPLOYEE NAME]</p><p>[EMPLOYEE JOB TITLE]</p></div>"#;
        assert_eq!(data_driven_signature_block(html), html);
    }

    #[test]
    fn test_signature_lines_inserted_after_name() {
        let html = r#"<div class="content"></div>
<div class="signature">
  <div class="signature-line"></div>
  <p class="signature-name">[EMPLOYEE NAME]</p>
</div>"#;
        let migrated = migrate(html);
        let name_at = migrated.find(r#"<p class="signature-name">[EMPLOYEE NAME]</p>"#).unwrap();
        let title_at = migrated.find("[EMPLOYEE JOB TITLE]").unwrap();
        let id_at = migrated.rfind("ID: [EMPLOYEE ID]").unwrap();
        assert!(name_at < title_at && title_at < id_at);
        assert!(migrated.trim_end().ends_with("</div>"));
    }

    #[test]
    fn test_signature_inline_styled_block() {
        let html = r#"<div style="display: flex; flex-direction: column; align-items: center;">
  <div style="width: 192px; border-top: 1px solid #000000;"></div>
  <p style="font-size: 12px;">
    [EMPLOYEE NAME]
  </p>
</div>"#;
        let migrated = data_driven_signature_block(html);
        assert!(migrated.contains("[EMPLOYEE JOB TITLE]"));
        assert!(migrated.contains("ID: [EMPLOYEE ID]"));
    }

    #[test]
    fn test_signature_fallback_pattern() {
        let html = r#"<section><p>[EMPLOYEE NAME]</p></div>"#;
        let migrated = data_driven_signature_block(html);
        assert!(migrated.contains("[EMPLOYEE JOB TITLE]"));
    }

    #[test]
    fn test_signature_without_any_match_is_left_alone() {
        let html = "<span>[EMPLOYEE NAME]</span>";
        assert_eq!(data_driven_signature_block(html), html);
    }

    #[test]
    fn test_retired_fields_removed() {
        let html = migrate(LEGACY);
        assert!(!html.contains("[NR]"));
        assert!(!html.contains("[WORKLOAD]"));
        assert!(html.contains("[CERTIFICATE DESCRIPTION]"));
    }

    #[test]
    fn test_issue_date_moves_beside_program_content() {
        let html = migrate(LEGACY);
        assert!(!html.contains("footer-date"));
        assert!(html.contains(r#"<div class="program-content-wrapper"><div class="program-content">"#));
        assert!(html.contains(r#"<div class="issue-date-aside">[ISSUE DATE]</div></div>"#));
        assert_eq!(html.matches("[ISSUE DATE]").count(), 1);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let once = migrate(LEGACY);
        let twice = migrate(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_version_gates_the_chain() {
        let at_v2 = migrate_from(LEGACY, 2);
        assert_eq!(at_v2.applied, vec!["drop retired fields", "issue date beside program content"]);
        assert_eq!(at_v2.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(at_v2.html.contains("issuing-company"));

        let current = migrate_from(LEGACY, CURRENT_SCHEMA_VERSION);
        assert!(current.applied.is_empty());
        assert_eq!(current.html, LEGACY);
    }

    #[test]
    fn test_markup_without_targets_is_untouched() {
        let html = "<html><body><p>Plain document</p></body></html>";
        assert_eq!(migrate(html), html);
    }
}
