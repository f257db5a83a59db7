//! Print surface hand-off.
//!
//! The stored document is served with a print stylesheet and a script that
//! opens the browser print dialog once layout has settled. Nothing reports
//! back to the server.

/// Delay before `window.print()` when none is configured.
pub const DEFAULT_PRINT_DELAY_MS: u64 = 250;

const PRINT_MARKER: &str = "data-print-surface";

const PRINT_CSS: &str = "@media print {
      @page { size: auto; margin: 0; }
      html, body { -webkit-print-color-adjust: exact; print-color-adjust: exact; color-adjust: exact; }
      .certificate, .content, .footer { page-break-inside: avoid; break-inside: avoid; }
    }";

fn print_script(delay_ms: u64) -> String {
    format!(
        "<script {marker}>window.addEventListener('load', function () {{ setTimeout(function () {{ window.print(); }}, {delay}); }});</script>",
        marker = PRINT_MARKER,
        delay = delay_ms
    )
}

/// Prepare a rendered certificate for printing.
///
/// Already prepared documents are returned unchanged.
pub fn prepare_for_print(html: &str, delay_ms: u64) -> String {
    if html.contains(PRINT_MARKER) {
        return html.to_string();
    }

    let mut out = html.to_string();
    let css = format!("\n    {}\n  ", PRINT_CSS);

    if let Some(at) = out.find("</style>") {
        out.insert_str(at, &css);
    } else if let Some(at) = out.find("</head>") {
        out.insert_str(at, &format!("<style>{}</style>\n", css));
    } else {
        out.insert_str(0, &format!("<style>{}</style>\n", css));
    }

    let script = print_script(delay_ms);
    match out.rfind("</body>") {
        Some(at) => out.insert_str(at, &format!("{}\n", script)),
        None => out.push_str(&script),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_goes_into_existing_style() {
        let html = "<html><head><style>.a { x: 1; }</style></head><body><p>Hi</p></body></html>";
        let out = prepare_for_print(html, 250);
        assert_eq!(out.matches("<style>").count(), 1);
        let style_end = out.find("</style>").unwrap();
        assert!(out.find("@page { size: auto; margin: 0; }").unwrap() < style_end);
        assert!(out.contains("setTimeout(function () { window.print(); }, 250)"));
        assert!(out.find("<script").unwrap() < out.find("</body>").unwrap());
    }

    #[test]
    fn test_style_created_when_missing() {
        let out = prepare_for_print("<html><head></head><body></body></html>", 500);
        assert!(out.contains("<style>"));
        assert!(out.find("<style>").unwrap() < out.find("</head>").unwrap());
        assert!(out.contains("}, 500)"));
    }

    #[test]
    fn test_fragment_and_repeat_preparation() {
        let once = prepare_for_print("<p>fragment</p>", DEFAULT_PRINT_DELAY_MS);
        assert!(once.starts_with("<style>"));
        assert!(once.ends_with("</script>"));
        assert_eq!(prepare_for_print(&once, DEFAULT_PRINT_DELAY_MS), once);
    }
}
