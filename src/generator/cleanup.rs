//! Final cleanup pass.
//!
//! Removing the training-name phrase can leave dangling commas and doubled
//! spaces behind; this pass collapses them.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DANGLING_TRAINING_COMMA: Regex =
        Regex::new(r"(?i)\b(training)(?:\s+of\s*|\s+),\s*").unwrap();
    static ref REPEATED_COMMAS: Regex = Regex::new(r",(?:\s*,)+").unwrap();
    static ref HORIZONTAL_RUNS: Regex = Regex::new(r"[ \t\x{A0}]{2,}").unwrap();
}

/// Collapse punctuation and whitespace artifacts in the rendered document.
pub fn normalize(html: &str) -> String {
    let html = DANGLING_TRAINING_COMMA.replace_all(html, "$1 ");
    let html = REPEATED_COMMAS.replace_all(&html, ",");
    HORIZONTAL_RUNS.replace_all(&html, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_of_comma() {
        assert_eq!(
            normalize("Participated in the training of , Training X"),
            "Participated in the training Training X"
        );
    }

    #[test]
    fn test_training_space_comma() {
        assert_eq!(normalize("the training , held"), "the training held");
        assert_eq!(normalize("After the training, rest."), "After the training, rest.");
    }

    #[test]
    fn test_repeated_commas_and_spaces() {
        assert_eq!(normalize("a, , b,, c"), "a, b, c");
        assert_eq!(normalize("one   two\t\tthree"), "one two three");
    }

    #[test]
    fn test_line_breaks_preserved() {
        assert_eq!(normalize("<p>\n  x\n</p>"), "<p>\n x\n</p>");
    }
}
