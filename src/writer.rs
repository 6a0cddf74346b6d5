// Table output: delimited text, HTML, and binary snapshots.
//
// The delimited writer quotes non-numeric cells (strings, factors, and all
// column names) and doubles internal quote marks; numeric and boolean cells
// print bare. Rows are assembled in a reusable byte buffer and written in
// one call each.

use std::borrow::Cow;
use std::io::{self, Write};

use memchr::memchr3;

use crate::column::Column;
use crate::table::Table;

/// Delimited-writer configuration.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub separator: u8,
    pub quote_mark: u8,
    pub header: bool,
    /// Printed for missing cells.
    pub na_string: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            separator: b',',
            quote_mark: b'"',
            header: true,
            na_string: "NA".to_string(),
        }
    }
}

/// Append a quoted field: quote mark, content with doubled quote marks,
/// quote mark.
fn push_quoted(line: &mut Vec<u8>, field: &[u8], quote_mark: u8) {
    line.push(quote_mark);
    for &byte in field {
        line.push(byte);
        if byte == quote_mark {
            line.push(quote_mark);
        }
    }
    line.push(quote_mark);
}

/// Write the table as delimited text.
pub fn write_delimited<W: Write>(
    out: &mut W,
    table: &Table,
    options: &WriteOptions,
) -> io::Result<()> {
    let mut line = Vec::new();
    if options.header {
        for (j, name) in table.names().iter().enumerate() {
            if j > 0 {
                line.push(options.separator);
            }
            push_quoted(&mut line, name.as_bytes(), options.quote_mark);
        }
        line.push(b'\n');
        out.write_all(&line)?;
    }
    for i in 0..table.nrows() {
        line.clear();
        for (j, column) in table.columns().iter().enumerate() {
            if j > 0 {
                line.push(options.separator);
            }
            match column.format(i) {
                None => line.extend_from_slice(options.na_string.as_bytes()),
                Some(text) if column.is_numeric() || matches!(column, Column::Bool(_)) => {
                    line.extend_from_slice(text.as_bytes());
                }
                Some(text) => push_quoted(&mut line, text.as_bytes(), options.quote_mark),
            }
        }
        line.push(b'\n');
        out.write_all(&line)?;
    }
    Ok(())
}

/// Escape `&`, `<`, `>` for HTML output; borrows when nothing needs it.
fn escape_html(text: &str) -> Cow<'_, str> {
    if memchr3(b'&', b'<', b'>', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Write the table as an HTML fragment, truncating the body at `max_rows`
/// rows with an ellipsis row.
pub fn write_html<W: Write>(out: &mut W, table: &Table, max_rows: usize) -> io::Result<()> {
    writeln!(out, "<table>")?;
    write!(out, "<tr>")?;
    for name in table.names() {
        write!(out, "<th>{}</th>", escape_html(name))?;
    }
    writeln!(out, "</tr>")?;
    let shown = table.nrows().min(max_rows);
    for i in 0..shown {
        write!(out, "<tr>")?;
        for column in table.columns() {
            match column.format(i) {
                Some(text) => write!(out, "<td>{}</td>", escape_html(&text))?,
                None => write!(out, "<td>NA</td>")?,
            }
        }
        writeln!(out, "</tr>")?;
    }
    if table.nrows() > shown {
        write!(out, "<tr>")?;
        for _ in 0..table.ncols() {
            write!(out, "<td>&#8942;</td>")?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")
}

/// Serialize the table to a binary snapshot.
#[cfg(feature = "snapshot")]
pub fn save_snapshot<W: Write>(out: &mut W, table: &Table) -> Result<(), crate::ReadError> {
    Ok(bincode::serialize_into(out, table)?)
}

/// Read a table back from a binary snapshot.
#[cfg(feature = "snapshot")]
pub fn load_snapshot<R: io::Read>(input: R) -> Result<Table, crate::ReadError> {
    Ok(bincode::deserialize_from(input)?)
}
