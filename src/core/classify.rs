// Byte classification for the scan loop.
//
// All predicates operate on the rolling two-byte window (chr, nextchr); the
// lookahead is an Option because the window may sit at end of input.

use crate::error::ReadError;

/// ASCII whitespace: HT, LF, VT, FF, CR, or space.
#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    (0x09..=0x0d).contains(&byte) || byte == 0x20
}

/// LF or CR.
#[inline]
pub fn at_newline(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// Two adjacent line-terminator bytes. Seen either at a genuinely blank
/// line or at the CR of a CRLF pair; the blank-skip loop nets the CRLF case
/// out by leaving one terminator for normal processing.
#[inline]
pub fn at_blank_line(chr: u8, nextchr: Option<u8>) -> bool {
    at_newline(chr) && nextchr.is_some_and(at_newline)
}

/// Escape inside a quoted region: backslash before a backslash or quote
/// mark, or a doubled quote mark.
#[inline]
pub fn at_quote_escape(chr: u8, nextchr: Option<u8>, quote_marks: &[u8]) -> bool {
    let Some(next) = nextchr else { return false };
    if chr == b'\\' {
        return next == b'\\' || quote_marks.contains(&next);
    }
    chr == next && quote_marks.contains(&chr)
}

/// Translate the second byte of a C-style escape pair to the byte it
/// denotes. Pairs outside the recognized set are an error; the tokenizer
/// calls this for every backslash it sees outside quotes, so this is where
/// unrecognized escapes are rejected.
pub fn merge_c_escape(nextchr: Option<u8>) -> Result<u8, ReadError> {
    match nextchr {
        Some(b'n') => Ok(b'\n'),
        Some(b't') => Ok(b'\t'),
        Some(b'r') => Ok(b'\r'),
        Some(b'a') => Ok(0x07),
        Some(b'b') => Ok(0x08),
        Some(b'f') => Ok(0x0c),
        Some(b'v') => Ok(0x0b),
        Some(b'\\') => Ok(b'\\'),
        Some(other) => Err(ReadError::BadEscape(format!("\\{}", other as char))),
        None => Err(ReadError::BadEscape("\\ at end of input".to_string())),
    }
}
