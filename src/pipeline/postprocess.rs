//! Post-processing: deterministic cleanup of extracted PDF text.
//!
//! pdfium returns text with the artefacts of the page layout: CRLF line
//! endings, zero-width characters and soft hyphens, runs of spaces used for
//! alignment, and stacks of empty lines between blocks. None of that helps a
//! summarizer, and long whitespace runs waste the local model's chunk budget.
//!
//! Rules (applied in order):
//! 1. Normalise line endings (CRLF → LF)
//! 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
//! 3. Collapse runs of spaces and tabs to one space
//! 4. Trim trailing whitespace per line
//! 5. Collapse 3+ consecutive newlines down to 2
//! 6. Trim the whole text

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw extracted text.
pub fn clean_extracted_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = collapse_horizontal_space(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

static RE_HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}]{2,}|\t").unwrap());

fn collapse_horizontal_space(input: &str) -> String {
    RE_HORIZONTAL_SPACE.replace_all(input, " ").to_string()
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_remove_invisible() {
        assert_eq!(remove_invisible_chars("mito\u{00AD}chon\u{200B}dria"), "mitochondria");
    }

    #[test]
    fn test_collapse_horizontal_space() {
        assert_eq!(collapse_horizontal_space("Cell    wall\tand  membrane"), "Cell wall and membrane");
        assert_eq!(collapse_horizontal_space("single space"), "single space");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_clean_extracted_text_full_pipeline() {
        let raw = "\u{FEFF}Chapter 1  \r\n\r\n\r\n\r\nThe   cell is\t the unit of life.   \r\n";
        assert_eq!(
            clean_extracted_text(raw),
            "Chapter 1\n\nThe cell is the unit of life."
        );
    }

    #[test]
    fn test_clean_whitespace_only() {
        assert_eq!(clean_extracted_text(" \n\t\r\n "), "");
    }
}
