// Column materialization: the promotion ladder over a tokenized buffer.
//
// Integer->float promotion converts the partial column in place (a lossless
// representation change), so a long integer prefix is never re-parsed.
// Float->bool and bool->string restart the row scan from the top instead: the
// NA/true/false literal sets give the same bytes a different meaning at
// those types, so every cell must be re-evaluated under the final rules.

use crate::column::{
    make_unique, sanitize_identifier, Column, ElType, FactorColumn, TypedColumn,
};
use crate::core::buffer::{BitVec, ParsedBuffer};
use crate::core::extract::{
    extract_bool, extract_float, extract_int, extract_str, trim_padding, Extract,
};
use crate::error::ReadError;
use crate::options::ReadOptions;

/// Cell slice plus quoted flag, padding already applied.
#[inline]
fn cell_at(buf: &ParsedBuffer, index: usize, ignore_padding: bool) -> (&[u8], bool) {
    let quoted = buf.cell_quoted(index);
    let mut cell = buf.cell(index);
    if ignore_padding && !quoted {
        cell = trim_padding(cell);
    }
    (cell, quoted)
}

/// Derive the column count from the tokenized shape. When fields and rows
/// don't divide, scan per-row field counts and report the first row that
/// deviates from the median.
pub fn column_count(buf: &ParsedBuffer) -> Result<usize, ReadError> {
    let rows = buf.rows();
    let fields = buf.fields();
    debug_assert!(rows > 0);
    let cols = fields / rows;
    if fields == rows * cols {
        return Ok(cols);
    }
    let counts = buf.fields_per_row();
    let mut sorted = counts.clone();
    sorted.sort_unstable();
    let median = sorted[sorted.len() / 2];
    let (row, found) = counts
        .iter()
        .enumerate()
        .find(|&(_, &count)| count != median)
        .map(|(row, &count)| (row + 1, count))
        .unwrap_or((rows, cols));
    Err(ReadError::RaggedRows {
        row,
        found,
        expected: median,
        rows,
        fields,
    })
}

/// Column names for the table: user names win, then the header row (trimmed
/// like data cells, sanitized, deduplicated), then generated `x1..xN`.
pub fn column_names(
    header: Option<&ParsedBuffer>,
    cols: usize,
    options: &ReadOptions,
) -> Result<Vec<String>, ReadError> {
    let user = options.effective_names();
    if !user.is_empty() {
        if user.len() != cols {
            return Err(ReadError::NamesArity {
                declared: user.len(),
                cols,
            });
        }
        return Ok(user.to_vec());
    }
    let mut names = match header {
        Some(buf) => {
            if buf.fields() != cols {
                return Err(ReadError::NamesArity {
                    declared: buf.fields(),
                    cols,
                });
            }
            (0..cols)
                .map(|index| {
                    let (cell, _) = cell_at(buf, index, options.ignore_padding);
                    sanitize_identifier(&String::from_utf8_lossy(cell))
                })
                .collect()
        }
        None => (1..=cols).map(|index| format!("x{index}")).collect::<Vec<_>>(),
    };
    make_unique(&mut names);
    Ok(names)
}

/// Build all columns, honoring declared `eltypes` when present.
pub fn build_columns(
    buf: &ParsedBuffer,
    rows: usize,
    cols: usize,
    options: &ReadOptions,
) -> Result<Vec<Column>, ReadError> {
    let eltypes = options.effective_eltypes();
    if !eltypes.is_empty() && eltypes.len() != cols {
        return Err(ReadError::EltypeArity {
            declared: eltypes.len(),
            cols,
        });
    }
    let mut columns = Vec::with_capacity(cols);
    for j in 0..cols {
        let column = match eltypes.get(j) {
            Some(&eltype) => build_declared(buf, rows, cols, j, eltype, options)?,
            None => build_promoted(buf, rows, cols, j, options),
        };
        columns.push(column);
    }
    Ok(columns)
}

/// The promotion ladder for one column.
fn build_promoted(
    buf: &ParsedBuffer,
    rows: usize,
    cols: usize,
    j: usize,
    options: &ReadOptions,
) -> Column {
    let nas = &options.na_strings;

    // Steps 1 and 2: numeric, promoting int->float in place on the first
    // cell that only parses as float.
    let mut ints: Vec<i64> = Vec::with_capacity(rows);
    let mut floats: Vec<f64> = Vec::new();
    let mut missing = BitVec::with_capacity(rows);
    let mut is_float = false;
    let mut numeric = true;

    for i in 0..rows {
        let (cell, _) = cell_at(buf, i * cols + j, options.ignore_padding);
        if !is_float {
            match extract_int(cell, nas) {
                Extract::Value(value) => {
                    ints.push(value);
                    missing.push(false);
                    continue;
                }
                Extract::Missing => {
                    ints.push(0);
                    missing.push(true);
                    continue;
                }
                Extract::Fail => {
                    floats = ints.iter().map(|&value| value as f64).collect();
                    is_float = true;
                }
            }
        }
        match extract_float(cell, nas) {
            Extract::Value(value) => {
                floats.push(value);
                missing.push(false);
            }
            Extract::Missing => {
                floats.push(0.0);
                missing.push(true);
            }
            Extract::Fail => {
                numeric = false;
                break;
            }
        }
    }
    if numeric {
        return if is_float {
            Column::Float(TypedColumn::new(floats, missing))
        } else {
            Column::Int(TypedColumn::new(ints, missing))
        };
    }

    // Step 3: boolean, restarted from the first row.
    let mut bools: Vec<bool> = Vec::with_capacity(rows);
    let mut bool_missing = BitVec::with_capacity(rows);
    let mut boolean = true;
    for i in 0..rows {
        let (cell, _) = cell_at(buf, i * cols + j, options.ignore_padding);
        match extract_bool(cell, nas, &options.true_strings, &options.false_strings) {
            Extract::Value(value) => {
                bools.push(value);
                bool_missing.push(false);
            }
            Extract::Missing => {
                bools.push(false);
                bool_missing.push(true);
            }
            Extract::Fail => {
                boolean = false;
                break;
            }
        }
    }
    if boolean {
        return Column::Bool(TypedColumn::new(bools, bool_missing));
    }

    // Step 4: string, also restarted; never fails.
    let (strings, str_missing) = collect_strings(buf, rows, cols, j, options);
    if options.make_factors {
        Column::Factor(FactorColumn::from_strings(strings, str_missing))
    } else {
        Column::Str(TypedColumn::new(strings, str_missing))
    }
}

fn collect_strings(
    buf: &ParsedBuffer,
    rows: usize,
    cols: usize,
    j: usize,
    options: &ReadOptions,
) -> (Vec<String>, BitVec) {
    let mut strings = Vec::with_capacity(rows);
    let mut missing = BitVec::with_capacity(rows);
    for i in 0..rows {
        let (cell, quoted) = cell_at(buf, i * cols + j, options.ignore_padding);
        let (value, is_missing) = extract_str(cell, &options.na_strings, quoted);
        strings.push(value);
        missing.push(is_missing);
    }
    (strings, missing)
}

/// Materialize one column at its declared type; the first cell the
/// extractor rejects fails the parse.
fn build_declared(
    buf: &ParsedBuffer,
    rows: usize,
    cols: usize,
    j: usize,
    eltype: ElType,
    options: &ReadOptions,
) -> Result<Column, ReadError> {
    let nas = &options.na_strings;
    let mismatch = |i: usize, cell: &[u8]| ReadError::TypeMismatch {
        row: i + 1,
        col: j + 1,
        cell: String::from_utf8_lossy(cell).into_owned(),
        expected: eltype.name(),
    };
    match eltype {
        ElType::Int => {
            let mut values = Vec::with_capacity(rows);
            let mut missing = BitVec::with_capacity(rows);
            for i in 0..rows {
                let (cell, _) = cell_at(buf, i * cols + j, options.ignore_padding);
                match extract_int(cell, nas) {
                    Extract::Value(value) => {
                        values.push(value);
                        missing.push(false);
                    }
                    Extract::Missing => {
                        values.push(0);
                        missing.push(true);
                    }
                    Extract::Fail => return Err(mismatch(i, cell)),
                }
            }
            Ok(Column::Int(TypedColumn::new(values, missing)))
        }
        ElType::Float => {
            let mut values = Vec::with_capacity(rows);
            let mut missing = BitVec::with_capacity(rows);
            for i in 0..rows {
                let (cell, _) = cell_at(buf, i * cols + j, options.ignore_padding);
                match extract_float(cell, nas) {
                    Extract::Value(value) => {
                        values.push(value);
                        missing.push(false);
                    }
                    Extract::Missing => {
                        values.push(0.0);
                        missing.push(true);
                    }
                    Extract::Fail => return Err(mismatch(i, cell)),
                }
            }
            Ok(Column::Float(TypedColumn::new(values, missing)))
        }
        ElType::Bool => {
            let mut values = Vec::with_capacity(rows);
            let mut missing = BitVec::with_capacity(rows);
            for i in 0..rows {
                let (cell, _) = cell_at(buf, i * cols + j, options.ignore_padding);
                match extract_bool(cell, nas, &options.true_strings, &options.false_strings) {
                    Extract::Value(value) => {
                        values.push(value);
                        missing.push(false);
                    }
                    Extract::Missing => {
                        values.push(false);
                        missing.push(true);
                    }
                    Extract::Fail => return Err(mismatch(i, cell)),
                }
            }
            Ok(Column::Bool(TypedColumn::new(values, missing)))
        }
        ElType::Str => {
            let (strings, missing) = collect_strings(buf, rows, cols, j, options);
            if options.make_factors {
                Ok(Column::Factor(FactorColumn::from_strings(strings, missing)))
            } else {
                Ok(Column::Str(TypedColumn::new(strings, missing)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::Scanner;
    use crate::core::tokenizer::tokenize_rows;
    use std::io::BufReader;

    fn tokenize(input: &[u8]) -> ParsedBuffer {
        let options = ReadOptions::default();
        let config = options.tokenizer_config(b',');
        let mut scanner = Scanner::new(BufReader::new(input)).unwrap();
        let mut buf = ParsedBuffer::with_hint(input.len());
        tokenize_rows(&mut scanner, &mut buf, &config, -1).unwrap();
        buf
    }

    fn promote(input: &[u8]) -> Column {
        let buf = tokenize(input);
        let cols = column_count(&buf).unwrap();
        assert_eq!(cols, 1);
        build_promoted(&buf, buf.rows(), 1, 0, &ReadOptions::default())
    }

    #[test]
    fn test_column_count_consistent() {
        let buf = tokenize(b"a,b\n1,2\n3,4\n");
        assert_eq!(column_count(&buf).unwrap(), 2);
    }

    #[test]
    fn test_column_count_reports_deviant_row() {
        let buf = tokenize(b"a,b\n1,2,3\n4,5\n");
        let err = column_count(&buf).unwrap_err();
        match err {
            ReadError::RaggedRows { row, found, expected, rows, fields } => {
                assert_eq!(row, 2);
                assert_eq!(found, 3);
                assert_eq!(expected, 2);
                assert_eq!(rows, 3);
                assert_eq!(fields, 7);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_promote_int() {
        let col = promote(b"1\n-2\nNA\n30\n");
        match col {
            Column::Int(col) => {
                assert_eq!(col.values(), &[1, -2, 0, 30]);
                assert!(col.missing().get(2));
                assert!(!col.missing().get(0));
            }
            other => panic!("expected int column, got {other:?}"),
        }
    }

    #[test]
    fn test_promote_int_to_float_in_place() {
        let col = promote(b"1\n2\n2.5\n4\n");
        match col {
            Column::Float(col) => {
                assert_eq!(col.values(), &[1.0, 2.0, 2.5, 4.0]);
            }
            other => panic!("expected float column, got {other:?}"),
        }
    }

    #[test]
    fn test_promote_missing_survives_float_promotion() {
        let col = promote(b"1\nNA\n2.5\n");
        match col {
            Column::Float(col) => {
                assert_eq!(col.get(0), Some(&1.0));
                assert_eq!(col.get(1), None);
                assert_eq!(col.get(2), Some(&2.5));
            }
            other => panic!("expected float column, got {other:?}"),
        }
    }

    #[test]
    fn test_promote_bool() {
        let col = promote(b"T\nfalse\nNA\ntrue\n");
        match col {
            Column::Bool(col) => {
                assert_eq!(col.values(), &[true, false, false, true]);
                assert!(col.missing().get(2));
            }
            other => panic!("expected bool column, got {other:?}"),
        }
    }

    #[test]
    fn test_promote_string_after_numeric_prefix() {
        // The numeric prefix parses as int, then a word forces a string
        // restart; earlier cells come back as text, not as stale numbers.
        let col = promote(b"1\n2\nhello\n");
        match col {
            Column::Str(col) => {
                assert_eq!(col.get(0).map(String::as_str), Some("1"));
                assert_eq!(col.get(1).map(String::as_str), Some("2"));
                assert_eq!(col.get(2).map(String::as_str), Some("hello"));
            }
            other => panic!("expected string column, got {other:?}"),
        }
    }

    #[test]
    fn test_t_token_means_bool_in_bool_column_and_text_in_string_column() {
        // "T" alone promotes to bool.
        assert!(matches!(promote(b"T\nF\n"), Column::Bool(_)));
        // With a non-boolean neighbor the restart re-reads "T" as text.
        let col = promote(b"T\nxyz\n");
        match col {
            Column::Str(col) => {
                assert_eq!(col.get(0).map(String::as_str), Some("T"));
            }
            other => panic!("expected string column, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_type_rejects_cell() {
        let buf = tokenize(b"1\nx\n");
        let options = ReadOptions {
            eltypes: vec![ElType::Int],
            ..ReadOptions::default()
        };
        let err = build_columns(&buf, 2, 1, &options).unwrap_err();
        match err {
            ReadError::TypeMismatch { row, col, cell, expected } => {
                assert_eq!(row, 2);
                assert_eq!(col, 1);
                assert_eq!(cell, "x");
                assert_eq!(expected, "i64");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_declared_arity_checked() {
        let buf = tokenize(b"1,2\n");
        let options = ReadOptions {
            eltypes: vec![ElType::Int],
            ..ReadOptions::default()
        };
        assert!(matches!(
            build_columns(&buf, 1, 2, &options),
            Err(ReadError::EltypeArity { declared: 1, cols: 2 })
        ));
    }

    #[test]
    fn test_declared_string_column_never_fails() {
        let buf = tokenize(b"1\n2.5\n");
        let options = ReadOptions {
            eltypes: vec![ElType::Str],
            ..ReadOptions::default()
        };
        let columns = build_columns(&buf, 2, 1, &options).unwrap();
        assert!(matches!(columns[0], Column::Str(_)));
    }

    #[test]
    fn test_make_factors_pools_string_column() {
        let buf = tokenize(b"a\nb\na\n");
        let options = ReadOptions {
            make_factors: true,
            ..ReadOptions::default()
        };
        let columns = build_columns(&buf, 3, 1, &options).unwrap();
        match &columns[0] {
            Column::Factor(col) => {
                assert_eq!(col.levels(), &["a", "b"]);
                assert_eq!(col.codes(), &[0, 1, 0]);
            }
            other => panic!("expected factor column, got {other:?}"),
        }
    }

    #[test]
    fn test_padding_trimmed_only_outside_quotes() {
        let buf = tokenize(b" 1 \n\" 2 \"\n");
        let options = ReadOptions::default();
        let columns = build_columns(&buf, 2, 1, &options).unwrap();
        // Second cell keeps its padding because it was quoted, so the
        // column degrades to string.
        match &columns[0] {
            Column::Str(col) => {
                assert_eq!(col.get(0).map(String::as_str), Some("1"));
                assert_eq!(col.get(1).map(String::as_str), Some(" 2 "));
            }
            other => panic!("expected string column, got {other:?}"),
        }
    }

    #[test]
    fn test_header_names_sanitized_and_deduplicated() {
        let header = tokenize(b"a b,a b,9c\n");
        let names = column_names(Some(&header), 3, &ReadOptions::default()).unwrap();
        assert_eq!(names, vec!["a_b", "a_b_1", "x9c"]);
    }

    #[test]
    fn test_user_names_override_header() {
        let header = tokenize(b"a,b\n");
        let options = ReadOptions {
            names: ["u", "v"].map(String::from).to_vec(),
            ..ReadOptions::default()
        };
        let names = column_names(Some(&header), 2, &options).unwrap();
        assert_eq!(names, vec!["u", "v"]);
    }

    #[test]
    fn test_generated_names_without_header() {
        let names = column_names(None, 3, &ReadOptions::default()).unwrap();
        assert_eq!(names, vec!["x1", "x2", "x3"]);
    }

    #[test]
    fn test_header_width_must_match_body() {
        let header = tokenize(b"a,b,c\n");
        assert!(matches!(
            column_names(Some(&header), 2, &ReadOptions::default()),
            Err(ReadError::NamesArity { declared: 3, cols: 2 })
        ));
    }
}
