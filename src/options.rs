// User-facing parse configuration.
//
// Plain struct with public fields and defaults; `validate` runs once before
// any byte is consumed and is the only place configuration errors surface.

use crate::column::ElType;
use crate::core::tokenizer::TokenizerConfig;
use crate::error::ReadError;

/// Input text encoding. Only `Utf8` passes validation; the other variants
/// exist so callers get a configuration error instead of mojibake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
    Utf16Le,
    Utf16Be,
}

#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Consume one leading row as column names.
    pub header: bool,
    /// Field separator. `None` lets `read_table` infer one from the file
    /// name, falling back to comma. `Some(b' ')` activates space-separated
    /// mode: tab also separates and whitespace runs collapse.
    pub separator: Option<u8>,
    /// Characters that open and close quoted fields.
    pub quote_marks: Vec<u8>,
    /// Decimal separator; only `.` is supported.
    pub decimal: u8,
    /// Cell bytes matching any of these are missing.
    pub na_strings: Vec<String>,
    pub true_strings: Vec<String>,
    pub false_strings: Vec<String>,
    /// Dictionary-encode string columns.
    pub make_factors: bool,
    /// Maximum body rows; -1 reads to end of input.
    pub nrows: i64,
    /// Explicit column names, overriding the header row.
    pub names: Vec<String>,
    /// Per-column declared types; empty means infer by promotion.
    pub eltypes: Vec<ElType>,
    pub allow_comments: bool,
    pub comment_mark: u8,
    /// Trim ASCII whitespace from unquoted cells.
    pub ignore_padding: bool,
    /// Physical lines to skip before parsing.
    pub skip_start: usize,
    /// Row-index skipping is not supported; anything here is rejected.
    pub skip_rows: Vec<usize>,
    /// Skip blank lines outside quoted regions.
    pub skip_blanks: bool,
    pub encoding: Encoding,
    /// Honor C-style backslash escapes outside quotes.
    pub allow_escapes: bool,
    /// Deprecated alias for `names`.
    pub colnames: Option<Vec<String>>,
    /// Deprecated alias for `eltypes`.
    pub coltypes: Option<Vec<ElType>>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            header: true,
            separator: None,
            quote_marks: vec![b'"'],
            decimal: b'.',
            na_strings: vec![String::new(), "NA".to_string()],
            true_strings: ["T", "t", "TRUE", "true"].map(String::from).to_vec(),
            false_strings: ["F", "f", "FALSE", "false"].map(String::from).to_vec(),
            make_factors: false,
            nrows: -1,
            names: Vec::new(),
            eltypes: Vec::new(),
            allow_comments: false,
            comment_mark: b'#',
            ignore_padding: true,
            skip_start: 0,
            skip_rows: Vec::new(),
            skip_blanks: true,
            encoding: Encoding::Utf8,
            allow_escapes: false,
            colnames: None,
            coltypes: None,
        }
    }
}

impl ReadOptions {
    /// Reject unsupported or conflicting configuration before the stream is
    /// touched. Deprecated aliases warn here.
    pub fn validate(&self) -> Result<(), ReadError> {
        if self.encoding != Encoding::Utf8 {
            return Err(ReadError::UnsupportedEncoding(format!("{:?}", self.encoding)));
        }
        if self.decimal != b'.' {
            return Err(ReadError::UnsupportedDecimal(self.decimal as char));
        }
        if !self.skip_rows.is_empty() {
            return Err(ReadError::SkipRowsUnsupported);
        }
        if self.colnames.is_some() {
            log::warn!("option colnames is deprecated, use names");
            if !self.names.is_empty() {
                return Err(ReadError::DeprecatedConflict {
                    old: "colnames",
                    new: "names",
                });
            }
        }
        if self.coltypes.is_some() {
            log::warn!("option coltypes is deprecated, use eltypes");
            if !self.eltypes.is_empty() {
                return Err(ReadError::DeprecatedConflict {
                    old: "coltypes",
                    new: "eltypes",
                });
            }
        }
        Ok(())
    }

    /// `names` with the deprecated alias folded in.
    pub fn effective_names(&self) -> &[String] {
        if !self.names.is_empty() {
            return &self.names;
        }
        self.colnames.as_deref().unwrap_or(&[])
    }

    /// `eltypes` with the deprecated alias folded in.
    pub fn effective_eltypes(&self) -> &[ElType] {
        if !self.eltypes.is_empty() {
            return &self.eltypes;
        }
        self.coltypes.as_deref().unwrap_or(&[])
    }

    /// The separator a reader should use when none was inferred from a
    /// file name.
    pub fn resolved_separator(&self) -> u8 {
        self.separator.unwrap_or(b',')
    }

    pub fn tokenizer_config(&self, separator: u8) -> TokenizerConfig {
        TokenizerConfig {
            separator,
            quote_marks: self.quote_marks.clone(),
            comment_mark: self.comment_mark,
            allow_comments: self.allow_comments,
            skip_blanks: self.skip_blanks,
            allow_escapes: self.allow_escapes,
        }
    }
}
