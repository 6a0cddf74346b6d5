// Shared tokenizer output: flat byte/boundary arrays plus a quoted bitmap.
//
// One ParsedBuffer lives for the duration of a single parse. The tokenizer
// appends, the materializer reads, and the buffer is dropped once typed
// columns exist.

#[cfg(feature = "snapshot")]
use serde::{Deserialize, Serialize};

/// Growable bit array backed by 64-bit words, amortized O(1) push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub struct BitVec {
    words: Vec<u64>,
    len: usize,
}

impl BitVec {
    pub fn new() -> Self {
        BitVec::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        BitVec {
            words: Vec::with_capacity(bits.div_ceil(64)),
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        let word = self.len / 64;
        if word == self.words.len() {
            self.words.push(0);
        }
        if bit {
            self.words[word] |= 1 << (self.len % 64);
        }
        self.len += 1;
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        self.words[index / 64] >> (index % 64) & 1 == 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits; bits past `len` are never set.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }
}

/// Tokenizer output. Field k (0-based) content is
/// `bytes[bounds[k] + 1 .. bounds[k + 1]]`: every field is followed by one
/// `\n` sentinel whose index lands in `bounds`, and a leading sentinel at
/// index 0 backs the dummy `bounds[0] = 0`. `lines[r]` is the sentinel index
/// closing row r, with the same dummy at `lines[0]`.
///
/// Quoted fields may carry raw `\n`/`\r` content bytes, so consumers address
/// cells only through `bounds` and never scan `bytes` for sentinels.
#[derive(Debug)]
pub struct ParsedBuffer {
    pub bytes: Vec<u8>,
    pub bounds: Vec<usize>,
    pub lines: Vec<usize>,
    pub quoted: BitVec,
}

impl ParsedBuffer {
    /// Fresh buffer with dummy entries installed, pre-sized for an input of
    /// roughly `nbytes` bytes.
    pub fn with_hint(nbytes: usize) -> Self {
        let mut bytes = Vec::with_capacity(nbytes.saturating_add(1));
        bytes.push(b'\n');
        ParsedBuffer {
            bytes,
            bounds: vec![0],
            lines: vec![0],
            quoted: BitVec::new(),
        }
    }

    /// Closed fields, dummy entry excluded.
    pub fn fields(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Terminated rows, dummy entry excluded.
    pub fn rows(&self) -> usize {
        self.lines.len() - 1
    }

    /// Content of field `index` (0-based), sentinels excluded. Empty fields
    /// yield an empty slice.
    #[inline]
    pub fn cell(&self, index: usize) -> &[u8] {
        &self.bytes[self.bounds[index] + 1..self.bounds[index + 1]]
    }

    /// Whether a quote opened inside field `index`.
    #[inline]
    pub fn cell_quoted(&self, index: usize) -> bool {
        self.quoted.get(index)
    }

    /// Field count of each terminated row, scanned from `bounds` against
    /// `lines`. Used by the consistency diagnosis.
    pub fn fields_per_row(&self) -> Vec<usize> {
        let mut counts = Vec::with_capacity(self.rows());
        let mut k = 1;
        for &end in &self.lines[1..] {
            let mut count = 0;
            while k < self.bounds.len() && self.bounds[k] <= end {
                count += 1;
                k += 1;
            }
            counts.push(count);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitvec_push_get() {
        let mut bits = BitVec::new();
        for i in 0..130 {
            bits.push(i % 3 == 0);
        }
        assert_eq!(bits.len(), 130);
        for i in 0..130 {
            assert_eq!(bits.get(i), i % 3 == 0, "bit {i}");
        }
        assert_eq!(bits.count_ones(), (0..130).filter(|i| i % 3 == 0).count());
    }

    #[test]
    fn test_empty_buffer_counts() {
        let buf = ParsedBuffer::with_hint(0);
        assert_eq!(buf.fields(), 0);
        assert_eq!(buf.rows(), 0);
        assert_eq!(buf.bytes, b"\n");
    }

    #[test]
    fn test_cell_addressing() {
        // Hand-built layout for "ab,,c" as one row:
        //   \n a b \n \n c \n
        //   0  1 2 3  4  5 6
        let mut buf = ParsedBuffer::with_hint(8);
        buf.bytes.extend_from_slice(b"ab\n\nc\n");
        buf.bounds.extend_from_slice(&[3, 4, 6]);
        buf.lines.push(6);
        for _ in 0..3 {
            buf.quoted.push(false);
        }
        assert_eq!(buf.fields(), 3);
        assert_eq!(buf.rows(), 1);
        assert_eq!(buf.cell(0), b"ab");
        assert_eq!(buf.cell(1), b"");
        assert_eq!(buf.cell(2), b"c");
        assert_eq!(buf.fields_per_row(), vec![3]);
    }
}
