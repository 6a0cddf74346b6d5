// Single-pass tokenizer: byte stream in, ParsedBuffer out.
//
// The hot loop is monomorphized over the four scan flags via const generics;
// `tokenize_rows` dispatches to one of the 16 specializations so disabled
// checks cost nothing inside the loop.
//
// Comment marks are recognized only at field starts: at a line start the
// whole line is skipped without emitting a row, at a field start mid-row the
// tail is stripped and the line ends there, and a mark in the middle of a
// field passes through as a literal byte.

use std::io::{self, BufRead};

use crate::core::buffer::ParsedBuffer;
use crate::core::classify::{
    at_blank_line, at_newline, at_quote_escape, is_whitespace, merge_c_escape,
};
use crate::core::scanner::Scanner;
use crate::error::ReadError;

/// Scan options the tokenizer is specialized over, plus the separator and
/// quote sets.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    pub separator: u8,
    pub quote_marks: Vec<u8>,
    pub comment_mark: u8,
    pub allow_comments: bool,
    pub skip_blanks: bool,
    pub allow_escapes: bool,
}

impl TokenizerConfig {
    /// Space-separated mode: tab also separates and whitespace runs
    /// collapse to a single separator.
    pub fn space_separated(&self) -> bool {
        self.separator == b' '
    }
}

/// Byte/field/line counts appended by one `tokenize_rows` call, dummy
/// entries excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCounts {
    pub bytes: usize,
    pub fields: usize,
    pub lines: usize,
}

/// Consume up to `nrows` rows (-1 = until end of input) from the scanner
/// into `buf`. The scanner keeps the one-byte lookahead across calls, so a
/// header pass and a body pass chain over a single scan of the stream.
pub fn tokenize_rows<R: BufRead>(
    scanner: &mut Scanner<R>,
    buf: &mut ParsedBuffer,
    config: &TokenizerConfig,
    nrows: i64,
) -> Result<TokenCounts, ReadError> {
    let flags = (
        config.allow_comments,
        config.skip_blanks,
        config.allow_escapes,
        config.space_separated(),
    );
    match flags {
        (false, false, false, false) => scan::<R, false, false, false, false>(scanner, buf, config, nrows),
        (false, false, false, true) => scan::<R, false, false, false, true>(scanner, buf, config, nrows),
        (false, false, true, false) => scan::<R, false, false, true, false>(scanner, buf, config, nrows),
        (false, false, true, true) => scan::<R, false, false, true, true>(scanner, buf, config, nrows),
        (false, true, false, false) => scan::<R, false, true, false, false>(scanner, buf, config, nrows),
        (false, true, false, true) => scan::<R, false, true, false, true>(scanner, buf, config, nrows),
        (false, true, true, false) => scan::<R, false, true, true, false>(scanner, buf, config, nrows),
        (false, true, true, true) => scan::<R, false, true, true, true>(scanner, buf, config, nrows),
        (true, false, false, false) => scan::<R, true, false, false, false>(scanner, buf, config, nrows),
        (true, false, false, true) => scan::<R, true, false, false, true>(scanner, buf, config, nrows),
        (true, false, true, false) => scan::<R, true, false, true, false>(scanner, buf, config, nrows),
        (true, false, true, true) => scan::<R, true, false, true, true>(scanner, buf, config, nrows),
        (true, true, false, false) => scan::<R, true, true, false, false>(scanner, buf, config, nrows),
        (true, true, false, true) => scan::<R, true, true, false, true>(scanner, buf, config, nrows),
        (true, true, true, false) => scan::<R, true, true, true, false>(scanner, buf, config, nrows),
        (true, true, true, true) => scan::<R, true, true, true, true>(scanner, buf, config, nrows),
    }
}

/// Close the open field: sentinel byte, boundary, quoted bit.
#[inline]
fn close_field(buf: &mut ParsedBuffer, cur_quoted: &mut bool) {
    buf.bytes.push(b'\n');
    buf.bounds.push(buf.bytes.len() - 1);
    buf.quoted.push(*cur_quoted);
    *cur_quoted = false;
}

/// Record a line terminator at the sentinel just written by `close_field`.
#[inline]
fn close_line(buf: &mut ParsedBuffer) {
    buf.lines.push(buf.bytes.len() - 1);
}

#[inline]
fn is_sep<const SPACE_SEP: bool>(chr: u8, separator: u8) -> bool {
    if SPACE_SEP {
        chr == b' ' || chr == b'\t'
    } else {
        chr == separator
    }
}

fn scan<
    R: BufRead,
    const COMMENTS: bool,
    const BLANKS: bool,
    const ESCAPES: bool,
    const SPACE_SEP: bool,
>(
    scanner: &mut Scanner<R>,
    buf: &mut ParsedBuffer,
    config: &TokenizerConfig,
    nrows: i64,
) -> Result<TokenCounts, ReadError> {
    let start_bytes = buf.bytes.len();
    let start_fields = buf.fields();
    let start_rows = buf.rows();

    let mut in_quotes = false;
    // One-byte latch: the current byte came from an escape and must not be
    // reinterpreted as separator, terminator, or quote.
    let mut in_escape = false;
    let mut at_start = true;
    let mut skip_white = true;
    let mut cur_quoted = false;
    // No content byte has landed in the open field yet.
    let mut field_fresh = true;
    // A byte of the current row was processed since the last terminator;
    // decides whether end of input synthesizes a final field and line.
    let mut line_open = false;

    loop {
        if nrows >= 0 && (buf.rows() - start_rows) as i64 >= nrows {
            break;
        }
        let Some(mut chr) = scanner.advance()? else {
            break;
        };

        // Comment handling: recognized at field starts only.
        if COMMENTS && !in_quotes && chr == config.comment_mark && field_fresh {
            scanner.skip_to_eol()?;
            if at_start {
                continue;
            }
            // The mark sat at a field start mid-row: the line ends here.
            close_field(buf, &mut cur_quoted);
            close_line(buf);
            at_start = true;
            skip_white = true;
            field_fresh = true;
            line_open = false;
            continue;
        }

        // Blank-line handling.
        if BLANKS && !in_quotes {
            if COMMENTS && at_start && at_newline(chr) {
                // A terminator with nothing on the line yet: blank line
                // directly after a comment skip. Never counts as a row.
                if chr == b'\r' && scanner.peek() == Some(b'\n') {
                    scanner.advance()?;
                }
                continue;
            }
            // Eat terminator pairs; the last terminator of the run is left
            // for normal processing so the preceding row still closes.
            while at_blank_line(chr, scanner.peek()) {
                match scanner.advance()? {
                    Some(next) => chr = next,
                    None => break,
                }
                if chr == b'\r' && scanner.peek() == Some(b'\n') {
                    if let Some(next) = scanner.advance()? {
                        chr = next;
                    }
                }
            }
        }

        // C-style escapes, outside quotes only.
        if ESCAPES && !in_escape && !in_quotes && chr == b'\\' {
            chr = merge_c_escape(scanner.peek())?;
            scanner.advance()?;
            in_escape = true;
        }

        if COMMENTS {
            at_start = false;
        }

        if !in_quotes {
            if !in_escape && config.quote_marks.contains(&chr) {
                in_quotes = true;
                cur_quoted = true;
                field_fresh = false;
                line_open = true;
                if SPACE_SEP {
                    skip_white = false;
                }
            } else if !in_escape && is_sep::<SPACE_SEP>(chr, config.separator) {
                if SPACE_SEP {
                    // Close only at the end of a whitespace run, and never
                    // for leading whitespace on a line.
                    let close = !skip_white
                        && scanner.peek().is_some_and(|next| !is_whitespace(next));
                    if close {
                        close_field(buf, &mut cur_quoted);
                        field_fresh = true;
                        line_open = true;
                    }
                } else {
                    close_field(buf, &mut cur_quoted);
                    field_fresh = true;
                    line_open = true;
                }
            } else if !in_escape && at_newline(chr) {
                if chr == b'\r' && scanner.peek() == Some(b'\n') {
                    scanner.advance()?;
                }
                close_field(buf, &mut cur_quoted);
                close_line(buf);
                field_fresh = true;
                line_open = false;
                if COMMENTS {
                    at_start = true;
                }
                if SPACE_SEP {
                    skip_white = true;
                }
            } else {
                buf.bytes.push(chr);
                in_escape = false;
                field_fresh = false;
                line_open = true;
                if SPACE_SEP {
                    skip_white = false;
                }
            }
        } else {
            if !in_escape && at_quote_escape(chr, scanner.peek(), &config.quote_marks) {
                // The initiator itself is dropped; the next byte is literal.
                in_escape = true;
            } else if !in_escape && config.quote_marks.contains(&chr) {
                in_quotes = false;
            } else {
                buf.bytes.push(chr);
                in_escape = false;
            }
            line_open = true;
        }
    }

    // Input ended without a terminator: synthesize the final field closure
    // and line.
    if line_open {
        close_field(buf, &mut cur_quoted);
        close_line(buf);
    }

    Ok(TokenCounts {
        bytes: buf.bytes.len() - start_bytes,
        fields: buf.fields() - start_fields,
        lines: buf.rows() - start_rows,
    })
}

/// Consume `n` physical lines, stopping early at end of input.
pub fn skip_lines<R: BufRead>(scanner: &mut Scanner<R>, n: usize) -> io::Result<()> {
    for _ in 0..n {
        if !scanner.skip_to_eol()? {
            break;
        }
    }
    Ok(())
}

/// Consume leading comment lines and/or blank lines before any row is
/// tokenized, each gated on its own flag.
pub fn skip_leading<R: BufRead>(
    scanner: &mut Scanner<R>,
    config: &TokenizerConfig,
) -> io::Result<()> {
    loop {
        match scanner.peek() {
            Some(chr) if config.skip_blanks && at_newline(chr) => {
                scanner.advance()?;
                if chr == b'\r' && scanner.peek() == Some(b'\n') {
                    scanner.advance()?;
                }
            }
            Some(chr) if config.allow_comments && chr == config.comment_mark => {
                scanner.skip_to_eol()?;
            }
            _ => return Ok(()),
        }
    }
}
