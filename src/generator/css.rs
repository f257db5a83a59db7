//! CSS patch engine.
//!
//! The template's stylesheet is parsed into a flat list of rules, patched in
//! place and serialised once. Layout and signature declarations are forced
//! to canonical values on every render; rule blocks introduced by newer
//! layouts are appended when a template predates them.

use lazy_static::lazy_static;
use regex::Regex;

use super::tokens::class;

lazy_static! {
    static ref STYLE_ELEMENT: Regex = Regex::new(r"(?is)(<style[^>]*>)(.*?)(</style>)").unwrap();
    static ref TRANSLUCENT_BLACK: Regex =
        Regex::new(r"(?i)^rgba\(\s*0\s*,\s*0\s*,\s*0\s*,\s*(?:0(?:\.\d*)?|\.\d+)\s*\)$").unwrap();
}

const ITEM_INDENT: &str = "    ";

/// A declaration block, e.g. `.footer { bottom: 3cm; }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Rule(Rule),
    /// At-rules (`@page`, `@media`, ...) are kept verbatim.
    AtRule(String),
    Comment(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub items: Vec<Item>,
}

impl Rule {
    fn new(selector: &str, declarations: &[(&str, &str)]) -> Self {
        Self {
            selector: selector.to_string(),
            declarations: declarations
                .iter()
                .map(|(property, value)| Declaration {
                    property: property.to_string(),
                    value: value.to_string(),
                    important: false,
                })
                .collect(),
        }
    }

    /// True when any selector of the (possibly grouped) rule equals `selector`.
    pub fn matches(&self, selector: &str) -> bool {
        self.selector.split(',').any(|s| s.trim() == selector)
    }

    pub fn get(&self, property: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.property == property)
    }

    /// Set `property` to `value`, adding the declaration when missing.
    /// An existing `!important` flag is kept.
    pub fn set(&mut self, property: &str, value: &str) {
        let mut found = false;
        for decl in self.declarations.iter_mut().filter(|d| d.property == property) {
            decl.value = value.to_string();
            found = true;
        }
        if !found {
            self.declarations.push(Declaration {
                property: property.to_string(),
                value: value.to_string(),
                important: false,
            });
        }
    }

    /// Overwrite `property` only where the rule already declares it.
    /// Returns whether anything changed.
    pub fn replace(&mut self, property: &str, value: &str) -> bool {
        let mut changed = false;
        for decl in self.declarations.iter_mut().filter(|d| d.property == property) {
            if decl.value != value {
                decl.value = value.to_string();
                changed = true;
            }
        }
        changed
    }

    pub fn remove(&mut self, property: &str) {
        self.declarations.retain(|d| d.property != property);
    }

    fn to_css(&self) -> String {
        let body: Vec<String> = self
            .declarations
            .iter()
            .map(|d| {
                if d.important {
                    format!("{}: {} !important;", d.property, d.value)
                } else {
                    format!("{}: {};", d.property, d.value)
                }
            })
            .collect();
        if body.is_empty() {
            format!("{} {{ }}", self.selector)
        } else {
            format!("{} {{ {} }}", self.selector, body.join(" "))
        }
    }
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let mut items = Vec::new();
        let mut rest = css;

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            if rest.starts_with("/*") {
                let end = rest.find("*/").map(|i| i + 2).unwrap_or(rest.len());
                items.push(Item::Comment(rest[..end].to_string()));
                rest = &rest[end..];
                continue;
            }

            let open = rest.find('{');
            if rest.starts_with('@') {
                let semi = rest.find(';');
                let end = match (open, semi) {
                    (Some(o), Some(s)) if s < o => s + 1,
                    (None, Some(s)) => s + 1,
                    (Some(o), _) => matching_brace_end(rest, o),
                    (None, None) => rest.len(),
                };
                items.push(Item::AtRule(rest[..end].trim().to_string()));
                rest = &rest[end..];
                continue;
            }

            let Some(open) = open else {
                // Dangling text without a block is not valid CSS; drop it.
                log::debug!("Discarding trailing stylesheet text: {}", rest.trim());
                break;
            };
            let close = rest[open..].find('}').map(|i| open + i).unwrap_or(rest.len());
            items.push(Item::Rule(Rule {
                selector: normalize_selector(&rest[..open]),
                declarations: parse_declarations(&rest[open + 1..close]),
            }));
            rest = rest.get(close + 1..).unwrap_or("");
        }

        Self { items }
    }

    pub fn to_css(&self) -> String {
        let mut out = String::from("\n");
        for item in &self.items {
            out.push_str(ITEM_INDENT);
            match item {
                Item::Rule(rule) => out.push_str(&rule.to_css()),
                Item::AtRule(raw) | Item::Comment(raw) => out.push_str(raw),
            }
            out.push('\n');
        }
        out.push_str("  ");
        out
    }

    pub fn has_rule(&self, selector: &str) -> bool {
        self.rules().any(|r| r.matches(selector))
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.items.iter().filter_map(|item| match item {
            Item::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn rules_mut(&mut self) -> impl Iterator<Item = &mut Rule> {
        self.items.iter_mut().filter_map(|item| match item {
            Item::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn push_rule(&mut self, rule: Rule) {
        self.items.push(Item::Rule(rule));
    }
}

fn normalize_selector(raw: &str) -> String {
    raw.split(',')
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(", ")
}

fn matching_brace_end(css: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (i, ch) in css[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return open + i + 1;
                }
            }
            _ => {}
        }
    }
    css.len()
}

fn parse_declarations(body: &str) -> Vec<Declaration> {
    split_declarations(body)
        .into_iter()
        .filter_map(|raw| {
            let (property, value) = raw.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let mut value = value.trim();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            let mut important = false;
            let lower = value.to_ascii_lowercase();
            if let Some(stripped) = lower.strip_suffix("!important") {
                important = true;
                value = value[..stripped.len()].trim_end();
            }
            Some(Declaration {
                property,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

// Splits on `;` outside parentheses and quotes (`url(a;b)`, `"a;b"`).
fn split_declarations(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in body.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            (None, ';') if depth <= 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

struct RulePatch {
    selector: &'static str,
    declarations: &'static [(&'static str, &'static str)],
}

impl RulePatch {
    fn to_rule(&self) -> Rule {
        Rule::new(self.selector, self.declarations)
    }
}

const FORCED_RULES: [RulePatch; 7] = [
    RulePatch {
        selector: ".footer",
        declarations: &[
            ("position", "absolute"),
            ("bottom", "3cm"),
            ("left", "0"),
            ("right", "0"),
            ("width", "100%"),
            ("z-index", "1"),
        ],
    },
    RulePatch {
        selector: ".training-address",
        declarations: &[("position", "absolute"), ("bottom", "0.5cm"), ("z-index", "0")],
    },
    RulePatch {
        selector: ".signatures",
        declarations: &[
            ("display", "flex"),
            ("justify-content", "space-between"),
            ("gap", "96px"),
            ("margin-top", "64px"),
            ("align-items", "flex-start"),
        ],
    },
    RulePatch {
        selector: ".signature",
        declarations: &[
            ("display", "flex"),
            ("flex-direction", "column"),
            ("align-items", "center"),
        ],
    },
    RulePatch {
        selector: ".signature-line",
        declarations: &[
            ("width", "192px"),
            ("border-top", "1px solid #000000"),
            ("margin-bottom", "0px"),
        ],
    },
    RulePatch {
        selector: ".signature-name",
        declarations: &[
            ("font-size", "12px"),
            ("font-weight", "600"),
            ("line-height", "1.2"),
            ("color", "#000000"),
            ("margin-top", "1px"),
        ],
    },
    RulePatch {
        selector: ".signature-title",
        declarations: &[
            ("font-size", "10px"),
            ("line-height", "1.2"),
            ("color", "#374151"),
            ("margin-top", "1px"),
        ],
    },
];

const ENSURED_RULES: [RulePatch; 4] = [
    RulePatch {
        selector: ".program-content-wrapper",
        declarations: &[
            ("display", "flex"),
            ("justify-content", "space-between"),
            ("align-items", "flex-start"),
            ("margin", "12px 0"),
            ("gap", "20px"),
        ],
    },
    RulePatch {
        selector: ".program-content",
        declarations: &[("flex", "1"), ("padding", "8px 12px"), ("background", "transparent")],
    },
    RulePatch {
        selector: ".issue-date-aside",
        declarations: &[
            ("text-align", "right"),
            ("font-size", "12px"),
            ("color", "#000000"),
            ("white-space", "nowrap"),
            ("padding-top", "8px"),
        ],
    },
    RulePatch {
        selector: ".company-certification",
        declarations: &[
            ("font-size", "16px"),
            ("text-align", "center"),
            ("margin-bottom", "12px"),
            ("color", "#000000"),
            ("line-height", "1.5"),
        ],
    },
];

fn is_background(property: &str) -> bool {
    property == "background" || property == "background-color"
}

fn is_transparent_or_white(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "transparent" | "none" | "white" | "#fff" | "#ffff" | "#ffffff" | "#ffffffff"
    )
}

fn neutralize_backgrounds(sheet: &mut Stylesheet) {
    for rule in sheet.rules_mut() {
        for decl in rule
            .declarations
            .iter_mut()
            .filter(|d| is_background(&d.property))
        {
            if TRANSLUCENT_BLACK.is_match(decl.value.trim()) {
                decl.value = "transparent".to_string();
            }
        }
    }

    let program_selector = format!(".{}", class::PROGRAM_CONTENT);
    for rule in sheet.rules_mut().filter(|r| r.matches(&program_selector)) {
        let tinted = rule
            .declarations
            .iter()
            .any(|d| is_background(&d.property) && !is_transparent_or_white(&d.value));
        if tinted {
            rule.remove("background");
            rule.remove("background-color");
            rule.remove("border-radius");
            rule.set("background", "transparent");
        }
    }
}

/// Apply the canonical patches to a parsed stylesheet.
pub fn apply_patches(sheet: &mut Stylesheet) {
    for patch in ENSURED_RULES.iter() {
        if !sheet.has_rule(patch.selector) {
            sheet.push_rule(patch.to_rule());
        }
    }

    neutralize_backgrounds(sheet);

    for patch in FORCED_RULES.iter() {
        let mut patched = 0;
        for rule in sheet.rules_mut().filter(|r| r.matches(patch.selector)) {
            for (property, value) in patch.declarations {
                rule.replace(property, value);
            }
            patched += 1;
        }
        if patched == 0 {
            sheet.push_rule(patch.to_rule());
        }
    }
}

/// Patch the first `<style>` element of `html`; markup without one is
/// returned unchanged.
pub fn patch_stylesheet(html: &str) -> String {
    let Some(body) = STYLE_ELEMENT.captures(html).and_then(|caps| caps.get(2)) else {
        log::debug!("Template has no <style> element; CSS patches skipped");
        return html.to_string();
    };

    let mut sheet = Stylesheet::parse(body.as_str());
    apply_patches(&mut sheet);

    let mut out = String::with_capacity(html.len() + 1024);
    out.push_str(&html[..body.start()]);
    out.push_str(&sheet.to_css());
    out.push_str(&html[body.end()..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule<'a>(sheet: &'a Stylesheet, selector: &str) -> &'a Rule {
        sheet.rules().find(|r| r.matches(selector)).unwrap()
    }

    fn value<'a>(sheet: &'a Stylesheet, selector: &str, property: &str) -> &'a str {
        &rule(sheet, selector).get(property).unwrap().value
    }

    #[test]
    fn test_parse_rules_at_rules_and_comments() {
        let css = r#"
            /* base */
            * { margin: 0; padding: 0; }
            @page { size: 297mm 210mm; margin: 0; }
            @media print { .footer { page-break-inside: avoid; } }
            .a, .b { color: red !important; background: url("x;y.png"); }
        "#;
        let sheet = Stylesheet::parse(css);
        assert_eq!(sheet.items.len(), 5);
        assert_eq!(sheet.items[0], Item::Comment("/* base */".into()));
        assert!(matches!(&sheet.items[2], Item::AtRule(raw) if raw.starts_with("@page")));
        assert!(matches!(&sheet.items[3], Item::AtRule(raw) if raw.ends_with("} }")));

        let grouped = rule(&sheet, ".b");
        assert_eq!(grouped.selector, ".a, .b");
        let color = grouped.get("color").unwrap();
        assert_eq!(color.value, "red");
        assert!(color.important);
        assert_eq!(grouped.get("background").unwrap().value, r#"url("x;y.png")"#);
    }

    #[test]
    fn test_serialization_round_trips() {
        let css = ".x { color: red; }\n@media print { .x { color: blue; } }";
        let sheet = Stylesheet::parse(css);
        assert_eq!(Stylesheet::parse(&sheet.to_css()), sheet);
    }

    #[test]
    fn test_forced_values_override_stored_values() {
        let mut sheet = Stylesheet::parse(
            ".footer { position: relative; bottom: 1cm; padding: 0 50px; }
             .signature-line { width: 120px; border-top: 2px dashed red !important; }",
        );
        apply_patches(&mut sheet);
        assert_eq!(value(&sheet, ".footer", "bottom"), "3cm");
        assert_eq!(value(&sheet, ".footer", "position"), "absolute");
        assert_eq!(value(&sheet, ".footer", "padding"), "0 50px");
        assert_eq!(value(&sheet, ".signature-line", "width"), "192px");
        let border = rule(&sheet, ".signature-line").get("border-top").unwrap();
        assert_eq!(border.value, "1px solid #000000");
        assert!(border.important);
    }

    #[test]
    fn test_forced_values_only_touch_declared_properties() {
        let mut sheet = Stylesheet::parse(".footer { bottom: 1cm; }");
        apply_patches(&mut sheet);
        let footer = rule(&sheet, ".footer");
        assert_eq!(footer.get("bottom").unwrap().value, "3cm");
        assert!(footer.get("position").is_none());
        assert!(footer.get("z-index").is_none());
        assert_eq!(sheet.rules().filter(|r| r.matches(".footer")).count(), 1);
    }

    #[test]
    fn test_selectors_match_exactly() {
        let mut sheet = Stylesheet::parse(".signatures { gap: 10px; } .signature-line { width: 1px; }");
        apply_patches(&mut sheet);
        assert!(rule(&sheet, ".signatures").get("flex-direction").is_none());
        assert!(rule(&sheet, ".signature-line").get("flex-direction").is_none());
        assert_eq!(value(&sheet, ".signature", "flex-direction"), "column");
    }

    #[test]
    fn test_missing_rules_are_appended_once() {
        let mut sheet = Stylesheet::parse("body { margin: 0; }");
        apply_patches(&mut sheet);
        let first = sheet.clone();
        apply_patches(&mut sheet);
        assert_eq!(sheet, first);
        for selector in [".program-content-wrapper", ".issue-date-aside", ".company-certification", ".footer"] {
            assert_eq!(sheet.rules().filter(|r| r.matches(selector)).count(), 1, "{}", selector);
        }
    }

    #[test]
    fn test_program_content_background_neutralized() {
        let mut sheet = Stylesheet::parse(
            ".program-content { flex: 1; background: #f3f4f6; border-radius: 8px; }",
        );
        apply_patches(&mut sheet);
        let program = rule(&sheet, ".program-content");
        assert_eq!(program.get("background").unwrap().value, "transparent");
        assert!(program.get("border-radius").is_none());
        assert_eq!(program.get("flex").unwrap().value, "1");
    }

    #[test]
    fn test_white_program_background_untouched() {
        let mut sheet = Stylesheet::parse(".program-content { background: #ffffff; border-radius: 4px; }");
        apply_patches(&mut sheet);
        let program = rule(&sheet, ".program-content");
        assert_eq!(program.get("background").unwrap().value, "#ffffff");
        assert_eq!(program.get("border-radius").unwrap().value, "4px");
    }

    #[test]
    fn test_translucent_black_backgrounds_cleared() {
        let mut sheet = Stylesheet::parse(
            ".overlay { background: rgba(0, 0, 0, 0.05); } .solid { background: rgba(0,0,0,1); }",
        );
        apply_patches(&mut sheet);
        assert_eq!(value(&sheet, ".overlay", "background"), "transparent");
        assert_eq!(value(&sheet, ".solid", "background"), "rgba(0,0,0,1)");
    }

    #[test]
    fn test_patch_stylesheet_rewrites_only_style_element() {
        let html = "<html><head><style>.footer { bottom: 9cm; }</style></head><body style=\"bottom: 9cm;\"></body></html>";
        let patched = patch_stylesheet(html);
        assert!(patched.contains("bottom: 3cm;"));
        assert!(patched.contains("<body style=\"bottom: 9cm;\">"));
        assert_eq!(patch_stylesheet(&patched), patched);
    }

    #[test]
    fn test_no_style_element_is_noop() {
        let html = "<html><body><p>[EMPLOYEE NAME]</p></body></html>";
        assert_eq!(patch_stylesheet(html), html);
    }
}
