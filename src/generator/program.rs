//! Program content renderer.

use super::common::escape_html;

/// Items shown when a template has no program content configured.
pub const DEFAULT_PROGRAM_ITEMS: [&str; 2] = ["Program content item 1", "Program content item 2"];

/// Render program items as lettered `<li>` elements: `a) …`, `b) …`.
///
/// Empty input renders the two default items so the list is never blank.
pub fn render_program_list(items: &[String]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        return lettered(DEFAULT_PROGRAM_ITEMS.iter().copied());
    }
    lettered(items.into_iter())
}

fn lettered<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .enumerate()
        .map(|(i, item)| format!("<li>{}) {}</li>", item_letter(i), escape_html(item)))
        .collect()
}

// Past 'z' the letters continue as "aa", "ab", ...
fn item_letter(index: usize) -> String {
    let mut n = index;
    let mut letters = Vec::new();
    loop {
        letters.push((b'a' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_are_lettered_in_order() {
        let items = vec!["Risks".to_string(), "PPE usage".to_string(), "Rescue".to_string()];
        assert_eq!(
            render_program_list(&items),
            "<li>a) Risks</li><li>b) PPE usage</li><li>c) Rescue</li>"
        );
    }

    #[test]
    fn test_empty_input_yields_default_pair() {
        assert_eq!(
            render_program_list(&[]),
            "<li>a) Program content item 1</li><li>b) Program content item 2</li>"
        );
        assert_eq!(
            render_program_list(&["   ".to_string()]),
            render_program_list(&[])
        );
    }

    #[test]
    fn test_item_text_is_escaped() {
        let items = vec!["Lifting <5t> & slinging".to_string()];
        assert_eq!(
            render_program_list(&items),
            "<li>a) Lifting &lt;5t&gt; &amp; slinging</li>"
        );
    }

    #[test]
    fn test_letters_past_z() {
        assert_eq!(item_letter(0), "a");
        assert_eq!(item_letter(25), "z");
        assert_eq!(item_letter(26), "aa");
        assert_eq!(item_letter(27), "ab");
    }
}
