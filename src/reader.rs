use std::io;
use std::str::Chars;

use crate::never::Never;

/// An object that provides characters to the parser.
///
/// Readers yield the source text unchanged: newline normalization, position
/// tracking and input-stream validation all happen in the input stream that
/// wraps the reader, so implementing this trait is just "give me the next
/// code point".
pub trait Reader {
    /// The error type the reader can fail with. In-memory readers use
    /// [`Never`] so that error handling disappears at compile time.
    type Error: std::error::Error;

    /// Return the next character of the input, or `None` at end of input.
    fn read_char(&mut self) -> Result<Option<char>, Self::Error>;
}

/// An object that can be converted into a [`Reader`].
///
/// `&str`, `&String` and `&[u8]` are `Readable`, so `parse("<p>hi")` works
/// directly; any [`io::BufRead`] can be wrapped in an [`IoReader`].
pub trait Readable<'a> {
    /// The reader type to which this type should be converted.
    type Reader: Reader + 'a;

    /// Convert self to some sort of reader.
    fn to_reader(self) -> Self::Reader;
}

impl<'a, R: 'a + Reader> Readable<'a> for R {
    type Reader = Self;

    fn to_reader(self) -> Self::Reader {
        self
    }
}

/// A reader over an in-memory string. Infallible.
pub struct StringReader<'a> {
    chars: Chars<'a>,
}

impl<'a> StringReader<'a> {
    fn new(input: &'a str) -> Self {
        StringReader {
            chars: input.chars(),
        }
    }
}

impl<'a> Reader for StringReader<'a> {
    type Error = Never;

    fn read_char(&mut self) -> Result<Option<char>, Never> {
        Ok(self.chars.next())
    }
}

impl<'a> Readable<'a> for &'a str {
    type Reader = StringReader<'a>;

    fn to_reader(self) -> Self::Reader {
        StringReader::new(self)
    }
}

impl<'a> Readable<'a> for &'a String {
    type Reader = StringReader<'a>;

    fn to_reader(self) -> Self::Reader {
        StringReader::new(self.as_str())
    }
}

/// A reader over any [`io::BufRead`].
///
/// The stream must be UTF-8: decoding to code points is the job of an
/// upstream decoder, and this reader only bridges the common case. Invalid
/// UTF-8 surfaces as an [`io::ErrorKind::InvalidData`] error, which the
/// parser propagates untranslated.
pub struct IoReader<R: io::BufRead> {
    reader: R,
    buffer: String,
    pos: usize,
}

impl<R: io::BufRead> IoReader<R> {
    /// Wrap a buffered byte stream.
    pub fn new(reader: R) -> Self {
        IoReader {
            reader,
            buffer: String::new(),
            pos: 0,
        }
    }

    fn refill(&mut self) -> Result<bool, io::Error> {
        self.buffer.clear();
        self.pos = 0;
        let mut raw = Vec::new();
        self.reader.read_until(b'\n', &mut raw)?;
        if raw.is_empty() {
            return Ok(false);
        }
        match String::from_utf8(raw) {
            Ok(s) => {
                self.buffer = s;
                Ok(true)
            }
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }
}

impl<R: io::BufRead> Reader for IoReader<R> {
    type Error = io::Error;

    fn read_char(&mut self) -> Result<Option<char>, io::Error> {
        loop {
            if let Some(c) = self.buffer[self.pos..].chars().next() {
                self.pos += c.len_utf8();
                return Ok(Some(c));
            }
            if !self.refill()? {
                return Ok(None);
            }
        }
    }
}

impl<'a> Readable<'a> for &'a [u8] {
    type Reader = IoReader<&'a [u8]>;

    fn to_reader(self) -> Self::Reader {
        IoReader::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_reader_yields_chars() {
        let mut r = "aé".to_reader();
        assert_eq!(r.read_char(), Ok(Some('a')));
        assert_eq!(r.read_char(), Ok(Some('é')));
        assert_eq!(r.read_char(), Ok(None));
    }

    #[test]
    fn io_reader_crosses_line_boundaries() {
        let mut r = b"x\ny".as_ref().to_reader();
        let mut out = String::new();
        while let Some(c) = r.read_char().unwrap() {
            out.push(c);
        }
        assert_eq!(out, "x\ny");
    }

    #[test]
    fn io_reader_rejects_invalid_utf8() {
        let mut r = b"\xff\xfe".as_ref().to_reader();
        assert!(r.read_char().is_err());
    }
}
