// rustytable - Streaming delimited-text reader producing typed columns
//
// Pipeline: Scanner (two-byte window) -> tokenizer (single pass, specialized
// over the scan flags) -> ParsedBuffer -> materializer (i64 -> f64 -> bool ->
// string promotion with a per-cell missing mask) -> Table.
//
// Library safety: no unwrap/expect in production code. Fallible paths
// return ReadError and propagate with `?`.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod column;
pub mod core;
mod error;
pub mod input;
mod materialize;
mod options;
mod table;
pub mod writer;

pub use column::{Column, ElType, FactorColumn, TypedColumn};
pub use error::ReadError;
pub use options::{Encoding, ReadOptions};
pub use table::Table;
pub use writer::WriteOptions;

use std::io::BufRead;
use std::path::Path;

use crate::core::buffer::ParsedBuffer;
use crate::core::scanner::Scanner;
use crate::core::tokenizer::{skip_leading, skip_lines, tokenize_rows};

/// Parse a table from an open byte stream. `nbytes_hint` pre-sizes the
/// parse buffers; zero is fine for small inputs.
///
/// The stream must be positioned at the first byte to parse; it is consumed
/// through the last requested row and dropped with the caller's reader.
pub fn read_table_from_reader<R: BufRead>(
    reader: R,
    nbytes_hint: usize,
    options: &ReadOptions,
) -> Result<Table, ReadError> {
    options.validate()?;
    let separator = options.resolved_separator();
    let config = options.tokenizer_config(separator);
    let mut scanner = Scanner::new(reader)?;

    skip_lines(&mut scanner, options.skip_start)?;
    if config.allow_comments || config.skip_blanks {
        skip_leading(&mut scanner, &config)?;
    }

    let header = if options.header {
        let mut buf = ParsedBuffer::with_hint(1024);
        tokenize_rows(&mut scanner, &mut buf, &config, 1)?;
        Some(buf)
    } else {
        None
    };

    let mut body = ParsedBuffer::with_hint(nbytes_hint);
    let counts = tokenize_rows(&mut scanner, &mut body, &config, options.nrows)?;
    if counts.bytes == 0 || counts.lines == 0 || counts.fields == 0 {
        return Err(ReadError::EmptyInput {
            bytes: counts.bytes,
            rows: counts.lines,
            fields: counts.fields,
        });
    }

    let rows = body.rows();
    let cols = materialize::column_count(&body)?;
    let names = materialize::column_names(header.as_ref(), cols, options)?;
    let columns = materialize::build_columns(&body, rows, cols, options)?;
    let missing: usize = columns.iter().map(Column::missing_count).sum();
    log::debug!(
        "parsed {rows} rows x {cols} cols from {} bytes, {missing} missing cells",
        counts.bytes
    );
    Ok(Table::new(names, columns))
}

/// Parse a table from a file path. The suffix routes the stream (`.gz`
/// decompresses, `.bz`/`.bz2` and URLs are rejected) and picks the default
/// separator (`.csv` comma, `.tsv` tab, `.wsv` space) unless the options
/// name one explicitly.
pub fn read_table<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Table, ReadError> {
    let path = path.as_ref();
    let mut options = options;
    if options.separator.is_none() {
        options.separator = Some(input::infer_separator(path));
    }
    let (reader, nbytes_hint) = input::open_path(path)?;
    read_table_from_reader(reader, nbytes_hint, &options)
}
