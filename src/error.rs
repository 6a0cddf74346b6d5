// Error taxonomy for table ingestion
//
// Everything fatal to a parse funnels into ReadError. Configuration errors
// are raised before any byte is consumed; structural and value errors carry
// enough position detail to locate the offending row or cell. There is no
// partial table on failure.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    // --- configuration, raised pre-parse ---
    #[error("unsupported encoding {0}; only utf8 input is supported")]
    UnsupportedEncoding(String),

    #[error("only '.' is supported as the decimal separator, got {0:?}")]
    UnsupportedDecimal(char),

    #[error("skip_rows is not supported; use skip_start to drop leading lines")]
    SkipRowsUnsupported,

    #[error("{declared} declared column types for {cols} columns")]
    EltypeArity { declared: usize, cols: usize },

    #[error("{declared} column names for {cols} columns")]
    NamesArity { declared: usize, cols: usize },

    #[error("both {old} (deprecated) and {new} were given; keep only {new}")]
    DeprecatedConflict {
        old: &'static str,
        new: &'static str,
    },

    #[error("cannot read {0}")]
    UnsupportedInput(String),

    // --- structural, raised during or after tokenization ---
    #[error("no data parsed: {bytes} bytes, {rows} rows, {fields} fields")]
    EmptyInput {
        bytes: usize,
        rows: usize,
        fields: usize,
    },

    #[error(
        "row {row} has {found} columns where {expected} were expected \
         ({rows} rows, {fields} fields total)"
    )]
    RaggedRows {
        row: usize,
        found: usize,
        expected: usize,
        rows: usize,
        fields: usize,
    },

    // --- value, raised during materialization ---
    #[error("cell {cell:?} at row {row}, column {col} cannot be parsed as {expected}")]
    TypeMismatch {
        row: usize,
        col: usize,
        cell: String,
        expected: &'static str,
    },

    // --- escape, raised by the tokenizer ---
    #[error("invalid escape sequence {0}")]
    BadEscape(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[cfg(feature = "snapshot")]
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] bincode::Error),
}
