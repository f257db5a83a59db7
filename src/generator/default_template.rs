//! The built-in certificate layout.
//!
//! Generated on demand instead of stored, using the same token vocabulary as
//! stored templates.

use uuid::Uuid;

use super::context::{CertificateTemplate, Orientation};
use super::migration::CURRENT_SCHEMA_VERSION;
use super::tokens::{certification_sentence, SIGNATURE_LINE_STYLE};

/// Id under which the built-in template is addressed.
pub const DEFAULT_TEMPLATE_ID: Uuid = Uuid::nil();

struct PageMetrics {
    width: &'static str,
    height: &'static str,
    page_size: &'static str,
    header_padding: &'static str,
    title_size: &'static str,
    content_padding: &'static str,
    content_max_height: &'static str,
    body_size: &'static str,
    list_size: &'static str,
    side_padding: &'static str,
    address_size: &'static str,
    address_width: &'static str,
}

fn metrics(orientation: Orientation) -> PageMetrics {
    match orientation {
        Orientation::Landscape => PageMetrics {
            width: "297mm",
            height: "210mm",
            page_size: "297mm 210mm",
            header_padding: "15px 20px",
            title_size: "42px",
            content_padding: "20px 50px",
            content_max_height: "calc(210mm - 120px)",
            body_size: "13px",
            list_size: "11px",
            side_padding: "50px",
            address_size: "10px",
            address_width: "400px",
        },
        Orientation::Portrait => PageMetrics {
            width: "210mm",
            height: "297mm",
            page_size: "210mm 297mm",
            header_padding: "18px 20px",
            title_size: "38px",
            content_padding: "18px 35px",
            content_max_height: "calc(297mm - 130px)",
            body_size: "12px",
            list_size: "10px",
            side_padding: "35px",
            address_size: "9px",
            address_width: "300px",
        },
    }
}

/// HTML body of the built-in layout.
pub fn default_template_html(orientation: Orientation) -> String {
    let m = metrics(orientation);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Certificate</title>
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    @page {{ size: {page_size}; margin: 0; }}
    html, body {{ font-family: Arial, sans-serif; background: #ffffff; color: #000000; width: {width}; height: {height}; overflow: hidden; }}
    .certificate {{ width: {width}; height: {height}; background: #ffffff; position: relative; overflow: hidden; page-break-after: avoid; page-break-inside: avoid; }}
    .header {{ background: #1e40af; color: #ffffff; padding: {header_padding}; text-align: center; }}
    .header h1 {{ font-size: {title_size}; font-weight: bold; text-transform: uppercase; letter-spacing: 2px; }}
    .content {{ padding: {content_padding}; max-height: {content_max_height}; display: flex; flex-direction: column; overflow: hidden; }}
    .company-certification {{ font-size: 16px; text-align: center; margin-bottom: 12px; color: #000000; line-height: 1.5; }}
    .training-text {{ font-size: {body_size}; line-height: 1.6; margin: 10px 0; text-align: justify; }}
    .training-details {{ font-size: {body_size}; line-height: 1.5; margin: 10px 0; }}
    .program-content-wrapper {{ display: flex; justify-content: space-between; align-items: flex-start; margin: 12px 0; gap: 20px; }}
    .program-content {{ flex: 1; padding: 8px 12px; background: transparent; }}
    .program-content h3 {{ font-weight: bold; font-size: {body_size}; margin-bottom: 6px; color: #1e40af; }}
    .program-content ul {{ list-style: none; font-size: {list_size}; line-height: 1.5; }}
    .issue-date-aside {{ text-align: right; font-size: 12px; color: #000000; white-space: nowrap; padding-top: 8px; }}
    .footer {{ position: absolute; bottom: 3cm; left: 0; right: 0; width: 100%; padding: 0 {side_padding}; z-index: 1; }}
    .signatures {{ display: flex; justify-content: space-between; gap: 96px; margin-top: 64px; align-items: flex-start; }}
    .signature {{ display: flex; flex-direction: column; align-items: center; }}
    .signature-line {{ width: 192px; border-top: 1px solid #000000; margin-bottom: 0px; }}
    .signature-name {{ font-size: 12px; font-weight: 600; line-height: 1.2; color: #000000; margin-top: 1px; }}
    .signature-title {{ font-size: 10px; line-height: 1.2; color: #374151; margin-top: 1px; }}
    .training-address {{ position: absolute; bottom: 0.5cm; left: {side_padding}; font-size: {address_size}; opacity: 0.7; z-index: 0; max-width: {address_width}; }}
  </style>
</head>
<body>
  <div class="certificate">
    <div class="header">
      <h1>Certificate</h1>
    </div>
    <div class="content">
      {sentence}
      <div class="training-text">Participated in the training of [TRAINING NAME], [CERTIFICATE DESCRIPTION]</div>
      <div class="training-details">
        <div>[ATTENDANCE DATE TEXT]</div>
      </div>
      <div class="program-content-wrapper">
        <div class="program-content">
          <h3>Program content:</h3>
          <ul>[PROGRAM CONTENT LIST]</ul>
        </div>
        <div class="issue-date-aside">[ISSUE DATE]</div>
      </div>
    </div>
    <div class="training-address"><strong>Training address:</strong> [TRAINING ADDRESS]</div>
    <div class="footer">
      <div class="signatures">
        <div class="signature">
          <div class="signature-line"></div>
          <p class="signature-name">[EMPLOYEE NAME]</p>
          <p class="signature-title" style="{line_style}">[EMPLOYEE JOB TITLE]</p>
          <p class="signature-title" style="{line_style}">ID: [EMPLOYEE ID]</p>
        </div>
        <div class="signature">
          <div class="signature-line"></div>
          <p class="signature-name">[SIGNER NAME]</p>
          <p class="signature-title">[SIGNER TITLE]</p>
        </div>
      </div>
    </div>
  </div>
</body>
</html>"#,
        page_size = m.page_size,
        width = m.width,
        height = m.height,
        header_padding = m.header_padding,
        title_size = m.title_size,
        content_padding = m.content_padding,
        content_max_height = m.content_max_height,
        body_size = m.body_size,
        list_size = m.list_size,
        side_padding = m.side_padding,
        address_size = m.address_size,
        address_width = m.address_width,
        sentence = certification_sentence(),
        line_style = SIGNATURE_LINE_STYLE,
    )
}

/// The built-in template record for `orientation`.
pub fn default_template(orientation: Orientation) -> CertificateTemplate {
    CertificateTemplate {
        id: DEFAULT_TEMPLATE_ID,
        name: "Default certificate".to_string(),
        html_body: default_template_html(orientation),
        orientation,
        program_content: Vec::new(),
        footer_address: None,
        expected_day_count: 1,
        schema_version: CURRENT_SCHEMA_VERSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::migration::migrate;
    use crate::generator::tokens::Token;

    #[test]
    fn test_default_template_uses_full_vocabulary() {
        let html = default_template_html(Orientation::Landscape);
        for token in Token::ALL {
            assert!(html.contains(token.as_str()), "missing {}", token);
        }
    }

    #[test]
    fn test_orientation_sizes() {
        assert!(default_template_html(Orientation::Landscape).contains("size: 297mm 210mm;"));
        assert!(default_template_html(Orientation::Portrait).contains("size: 210mm 297mm;"));
    }

    #[test]
    fn test_default_template_is_already_canonical() {
        let html = default_template_html(Orientation::Portrait);
        assert_eq!(migrate(&html), html);
        assert_eq!(default_template(Orientation::Portrait).id, DEFAULT_TEMPLATE_ID);
    }
}
