// Two-byte lookahead window over a byte stream.
//
// The scan loop works on (chr, nextchr): chr is consumed, nextchr is peeked.
// Scanner holds the single peeked byte outside the reader; handing the same
// scanner from the header pass to the body pass is what lets both share one
// pass over the stream without re-reading or seeking.

use std::io::{self, BufRead};

use memchr::memchr2;

use crate::core::classify::at_newline;

pub struct Scanner<R> {
    reader: R,
    peeked: Option<u8>,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> io::Result<Self> {
        let mut scanner = Scanner {
            reader,
            peeked: None,
        };
        scanner.peeked = scanner.read_byte()?;
        Ok(scanner)
    }

    /// The byte the next `advance` will return, without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.peeked
    }

    /// Consume and return the current byte; `None` at end of input.
    #[inline]
    pub fn advance(&mut self) -> io::Result<Option<u8>> {
        let chr = self.peeked;
        if chr.is_some() {
            self.peeked = self.read_byte()?;
        }
        Ok(chr)
    }

    #[inline]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let buf = self.reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        let byte = buf[0];
        self.reader.consume(1);
        Ok(Some(byte))
    }

    /// Consume through the next line terminator (LF, CR, or CRLF).
    /// Returns false when end of input arrives first.
    pub fn skip_to_eol(&mut self) -> io::Result<bool> {
        loop {
            match self.advance()? {
                None => return Ok(false),
                Some(b'\n') => return Ok(true),
                Some(b'\r') => {
                    if self.peeked == Some(b'\n') {
                        self.advance()?;
                    }
                    return Ok(true);
                }
                Some(_) => {
                    // Fast-forward to the terminator inside the buffered
                    // window. The peeked byte already left the reader, so
                    // it has to be checked before the buffer is scanned.
                    match self.peeked {
                        None => return Ok(false),
                        Some(byte) if at_newline(byte) => continue,
                        Some(_) => {
                            self.peeked = None;
                            loop {
                                let buf = self.reader.fill_buf()?;
                                if buf.is_empty() {
                                    return Ok(false);
                                }
                                match memchr2(b'\n', b'\r', buf) {
                                    Some(pos) => {
                                        self.reader.consume(pos);
                                        break;
                                    }
                                    None => {
                                        let len = buf.len();
                                        self.reader.consume(len);
                                    }
                                }
                            }
                            // Re-prime the window; the terminator is next.
                            self.peeked = self.read_byte()?;
                        }
                    }
                }
            }
        }
    }
}
