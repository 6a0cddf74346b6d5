// Typed cell extraction from tokenized byte ranges.
//
// Extractors see exactly the cell slice (sentinel excluded, padding already
// trimmed by the caller) and allocate only when building owned strings. NA
// matching is an allocation-free byte comparison and runs before any type
// parsing.

use crate::core::classify::is_whitespace;

/// Outcome of extracting one cell at a candidate type.
#[derive(Debug, Clone, PartialEq)]
pub enum Extract<T> {
    /// Parsed as a present value.
    Value(T),
    /// Empty or matched the NA set.
    Missing,
    /// Not representable at this type.
    Fail,
}

/// Membership test against a configured literal set, byte for byte.
#[inline]
pub fn byte_match(cell: &[u8], set: &[String]) -> bool {
    set.iter().any(|lit| lit.as_bytes() == cell)
}

/// Strip ASCII whitespace padding from both ends of an unquoted cell.
pub fn trim_padding(mut cell: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = cell {
        if !is_whitespace(*first) {
            break;
        }
        cell = rest;
    }
    while let [rest @ .., last] = cell {
        if !is_whitespace(*last) {
            break;
        }
        cell = rest;
    }
    cell
}

/// Signed 64-bit integer. Digits accumulate right to left; a leading `-` or
/// `+` is accepted only with at least one digit after it. Values outside
/// the i64 range wrap rather than error.
pub fn extract_int(cell: &[u8], na_strings: &[String]) -> Extract<i64> {
    if cell.is_empty() || byte_match(cell, na_strings) {
        return Extract::Missing;
    }
    let mut value: i64 = 0;
    let mut power: i64 = 1;
    for index in (1..cell.len()).rev() {
        let byte = cell[index];
        if !byte.is_ascii_digit() {
            return Extract::Fail;
        }
        value = value.wrapping_add(i64::from(byte - b'0').wrapping_mul(power));
        power = power.wrapping_mul(10);
    }
    match cell[0] {
        byte if byte.is_ascii_digit() => {
            value = value.wrapping_add(i64::from(byte - b'0').wrapping_mul(power));
            Extract::Value(value)
        }
        b'-' if cell.len() > 1 => Extract::Value(value.wrapping_neg()),
        b'+' if cell.len() > 1 => Extract::Value(value),
        _ => Extract::Fail,
    }
}

/// 64-bit float via the standard library's locale-independent parser. The
/// whole range must be consumed for the parse to count.
pub fn extract_float(cell: &[u8], na_strings: &[String]) -> Extract<f64> {
    if cell.is_empty() || byte_match(cell, na_strings) {
        return Extract::Missing;
    }
    let Ok(text) = std::str::from_utf8(cell) else {
        return Extract::Fail;
    };
    match text.parse::<f64>() {
        Ok(value) => Extract::Value(value),
        Err(_) => Extract::Fail,
    }
}

/// Boolean via the configured true/false literal sets.
pub fn extract_bool(
    cell: &[u8],
    na_strings: &[String],
    true_strings: &[String],
    false_strings: &[String],
) -> Extract<bool> {
    if cell.is_empty() || byte_match(cell, na_strings) {
        return Extract::Missing;
    }
    if byte_match(cell, true_strings) {
        return Extract::Value(true);
    }
    if byte_match(cell, false_strings) {
        return Extract::Value(false);
    }
    Extract::Fail
}

/// Owned string; string cells never fail, so the outcome is just the value
/// and a missing flag. An empty cell is missing unless it was quoted, which
/// is what distinguishes `""` from a skipped value.
pub fn extract_str(cell: &[u8], na_strings: &[String], was_quoted: bool) -> (String, bool) {
    if cell.is_empty() {
        return (String::new(), !was_quoted);
    }
    if byte_match(cell, na_strings) {
        return (String::new(), true);
    }
    (String::from_utf8_lossy(cell).into_owned(), false)
}
