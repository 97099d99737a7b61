// 🧹 Line Normalizer
// OCR lines arrive with random spacing ("合 計  1, 125") and mixed case ("PayPay")

/// Line break characters recognised when splitting OCR output into lines.
pub const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Remove every whitespace character and lowercase the rest.
pub fn normalize_line(line: &str) -> String {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split raw OCR text into lines. `\r\n` counts as one break.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\r\n").flat_map(|chunk| chunk.split(LINE_BREAKS))
}

// ============================================================================
// TESTS
// ============================================================================
