// Path routing: suffix-based stream opening and separator inference.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::ReadError;

fn lowercase_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Open `path` for reading, routing by suffix. Returns the buffered stream
/// and a byte-count hint for pre-sizing the parse buffers: twice the
/// on-disk size for gzip, the file size otherwise.
pub fn open_path(path: &Path) -> Result<(Box<dyn BufRead>, usize), ReadError> {
    let display = path.display().to_string();
    if display.starts_with("http://") || display.starts_with("ftp://") {
        return Err(ReadError::UnsupportedInput(format!(
            "{display}: URL fetching is not supported"
        )));
    }
    let name = lowercase_name(path);
    if name.ends_with(".bz") || name.ends_with(".bz2") {
        return Err(ReadError::UnsupportedInput(format!(
            "{display}: bzip2 decompression is not supported"
        )));
    }
    let file = File::open(path)?;
    let size = file.metadata()?.len() as usize;
    if name.ends_with(".gz") {
        log::debug!("opening {display} as gzip, {size} bytes on disk");
        Ok((
            Box::new(BufReader::new(GzDecoder::new(file))),
            size.saturating_mul(2),
        ))
    } else {
        log::debug!("opening {display}, {size} bytes");
        Ok((Box::new(BufReader::new(file)), size))
    }
}

/// Infer the separator from the file suffix, compression suffix stripped:
/// `.csv` comma, `.tsv` tab, `.wsv` space, anything else comma.
pub fn infer_separator(path: &Path) -> u8 {
    let mut name = lowercase_name(path);
    for suffix in [".gz", ".bz2", ".bz"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_string();
            break;
        }
    }
    if name.ends_with(".tsv") {
        b'\t'
    } else if name.ends_with(".wsv") {
        b' '
    } else {
        b','
    }
}
