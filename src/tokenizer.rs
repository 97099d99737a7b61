// 🔢 Amount Tokenizer
// Finds currency-looking numbers on a normalized line.
//
// Totals are printed on the right edge of a receipt line, after the item
// name and quantity, so the LAST numeric token wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// Monetary amount in the smallest unit implied by the receipt text.
pub type Amount = u64;

/// Either digits + one separator + exactly three digits ("1,125", "1.125",
/// ",125"), or a plain run of digits. Leftmost-first alternation keeps the
/// grouped form when both could match.
///
/// `\d` is Unicode-aware, so full-width digits ("１２５０") are amounts too.
/// Only the ASCII comma and period act as separators.
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d*[,.]\d{3}|\d+").expect("amount pattern is valid")
});

static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d$").expect("digit pattern is valid"));

/// All numeric tokens on the line, left to right.
pub fn amount_tokens(line: &str) -> Vec<&str> {
    AMOUNT_RE.find_iter(line).map(|m| m.as_str()).collect()
}

/// Parse the right-most numeric token of `line`.
///
/// Returns `None` when the line has no digits. A digit run too long for
/// [`Amount`] is treated the same way.
pub fn extract_amount(line: &str) -> Option<Amount> {
    let token = AMOUNT_RE.find_iter(line).last()?.as_str();
    parse_token(token)
}

fn parse_token(token: &str) -> Option<Amount> {
    let mut amount: Amount = 0;
    for digit in token.chars().filter_map(digit_value) {
        amount = match amount
            .checked_mul(10)
            .and_then(|a| a.checked_add(Amount::from(digit)))
        {
            Some(amount) => amount,
            None => {
                tracing::debug!(token, "numeric token does not fit an amount");
                return None;
            }
        };
    }
    Some(amount)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT_RE.is_match(c.encode_utf8(&mut buf))
}

/// Value of a Unicode decimal digit, `None` for anything else.
///
/// Decimal digits are encoded in contiguous runs of ten starting at zero,
/// so the value is the distance to the start of the run, modulo ten.
pub fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut code = c as u32;
    let mut offset = 0;
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        offset += 1;
        code -= 1;
    }
    Some(offset % 10)
}

// ============================================================================
// TESTS
// ============================================================================
