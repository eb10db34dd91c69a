//! Numeric extraction from heterogeneous cell text.
//!
//! Telemetry exports are not clean numeric tables: the same column can hold
//! `310`, `"310 kPa"`, `"3,000"`, full-width digits from a Japanese-locale
//! recorder, or status text. Extraction turns one cell into at most one
//! `f64`, and is total: malformed input yields a missing value, never an
//! error.
//!
//! The procedure:
//!
//! 1. Normalize full-width punctuation and digits to ASCII, strip
//!    thousands-separator commas, trim whitespace
//! 2. Try to parse the whole normalized string as a decimal number
//! 3. On failure, scan for the first signed-decimal token and parse that
//!
//! The token grammar is explicit (no regex): optional sign, digits, optional
//! fractional part (`.` followed by digits), optional exponent (`e`/`E`,
//! optional sign, digits). Non-finite results ("inf"/"nan" spellings or
//! overflowing literals) are treated as missing so they can never enter an
//! aligned numeric column.

use crate::table::Cell;

/// Extracts a numeric value from one raw cell.
///
/// # Examples
///
/// ```
/// use railcor_analysis::extract::extract_numeric;
/// use railcor_analysis::table::Cell;
///
/// assert_eq!(extract_numeric(&Cell::from("１２．５")), Some(12.5));
/// assert_eq!(extract_numeric(&Cell::from("-3,000 kPa")), Some(-3000.0));
/// assert_eq!(extract_numeric(&Cell::from("")), None);
/// assert_eq!(extract_numeric(&Cell::from("n/a")), None);
/// assert_eq!(extract_numeric(&Cell::Number(4.2)), Some(4.2));
/// assert_eq!(extract_numeric(&Cell::Missing), None);
/// ```
#[must_use]
pub fn extract_numeric(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Missing => None,
        Cell::Number(value) => value.is_finite().then_some(*value),
        Cell::Text(text) => extract_from_text(text),
    }
}

/// Extracts a numeric value from cell text.
///
/// ```
/// use railcor_analysis::extract::extract_from_text;
///
/// assert_eq!(extract_from_text(" 1.5e3 "), Some(1500.0));
/// assert_eq!(extract_from_text("pressure: 12.5 bar"), Some(12.5));
/// assert_eq!(extract_from_text("inf"), None);
/// ```
#[must_use]
pub fn extract_from_text(text: &str) -> Option<f64> {
    let normalized = normalize(text);
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return Some(value);
        }
    }

    scan_numeric_token(trimmed)
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Offset between full-width and ASCII digits ('０' − '0').
const FULLWIDTH_DIGIT_OFFSET: u32 = '０' as u32 - '0' as u32;

/// Maps full-width punctuation and digits to ASCII and strips thousands
/// separators.
fn normalize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '．' => Some('.'),
            '－' => Some('-'),
            '＋' => Some('+'),
            ',' | '，' => None,
            '０'..='９' => char::from_u32(u32::from(c) - FULLWIDTH_DIGIT_OFFSET),
            _ => Some(c),
        })
        .collect()
}

/// Finds the first signed-decimal token in `text`.
///
/// Grammar: `[+-]? digits ('.' digits)? ([eE] [+-]? digits)?`. A sign only
/// opens a token when immediately followed by a digit; a dangling fractional
/// point or exponent marker ends the token before it.
///
/// # Examples
///
/// ```
/// use railcor_analysis::extract::scan_numeric_token;
///
/// assert_eq!(scan_numeric_token("abc-5.25def"), Some("-5.25"));
/// assert_eq!(scan_numeric_token("v=1e-3;"), Some("1e-3"));
/// assert_eq!(scan_numeric_token("12."), Some("12"));
/// assert_eq!(scan_numeric_token("1e"), Some("1"));
/// assert_eq!(scan_numeric_token("--"), None);
/// ```
#[must_use]
pub fn scan_numeric_token(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let (token_start, first_digit) = match bytes[pos] {
            b'0'..=b'9' => (pos, pos),
            b'+' | b'-' if bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) => (pos, pos + 1),
            _ => {
                pos += 1;
                continue;
            }
        };

        let mut end = first_digit;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }

        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end += 1;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
        }

        if matches!(bytes.get(end), Some(&(b'e' | b'E'))) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(&(b'+' | b'-'))) {
                exp += 1;
            }
            if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                end = exp;
                while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                    end += 1;
                }
            }
        }

        return Some(&text[token_start..end]);
    }

    None
}
