//! Rejoining lines split at escaped newlines.
//!
//! A naive reader splits its input on every `\n`, including the ones the
//! serializer escaped inside a field. [`Reassembler`] sits between such a
//! reader and the consumer and glues those pieces back together: a raw line
//! whose terminator follows an odd number of backslashes continues on the
//! next raw line.
//!
//! ```rust
//! use serde_escsv::Reassembler;
//!
//! let input: &[u8] = b"field1,\\\nfield2\na,\\\\\nb\n";
//! let lines: Vec<Vec<u8>> = Reassembler::from_reader(input)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(lines, vec![
//!     b"field1,\\\nfield2\n".to_vec(),
//!     b"a,\\\\\n".to_vec(),
//!     b"b\n".to_vec(),
//! ]);
//! ```

use crate::{Error, Result};
use log::{trace, warn};
use std::io::{self, BufRead, BufReader, Read};

const BACKSLASH: u8 = b'\\';

/// A sequential, closable source of raw lines.
///
/// Each call to [`next_line`](LineSource::next_line) returns the next span up
/// to and including `\n`, or the unterminated tail at end of input, or `None`
/// once the input is exhausted.
pub trait LineSource {
    /// Reads the next raw line, or `None` at end of input.
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>>;

    /// Releases the underlying resource.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Splits a buffered reader on `\n` and nothing else.
#[derive(Debug)]
pub struct ReadLines<R> {
    reader: Option<R>,
}

impl<R: BufRead> ReadLines<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        ReadLines {
            reader: Some(reader),
        }
    }
}

impl<R: BufRead> LineSource for ReadLines<R> {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }

    /// Drops the reader, which closes files and sockets it owns.
    fn close(&mut self) -> io::Result<()> {
        self.reader = None;
        Ok(())
    }
}

impl LineSource for std::vec::IntoIter<Vec<u8>> {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.next())
    }
}

/// Returns `true` if `line` ends in `\n` preceded by an odd run of backslashes.
#[inline]
fn escapes_terminator(line: &[u8]) -> bool {
    match line.split_last() {
        Some((&b'\n', body)) => {
            body.iter().rev().take_while(|&&b| b == BACKSLASH).count() % 2 == 1
        }
        _ => false,
    }
}

/// Yields logical lines from a [`LineSource`].
///
/// NUL bytes are removed from every raw line. If the source runs out while a
/// line is still waiting for its continuation, the partial text is yielded
/// as-is. A read error is yielded in place of the line being assembled.
///
/// The source is closed exactly once: by [`Reassembler::close`], or when the
/// reassembler is dropped.
#[derive(Debug)]
pub struct Reassembler<S: LineSource> {
    source: S,
    closed: bool,
}

impl<R: Read> Reassembler<ReadLines<BufReader<R>>> {
    /// Reassembles lines read from any `Read`.
    pub fn from_reader(reader: R) -> Self {
        Reassembler::new(ReadLines::new(BufReader::new(reader)))
    }
}

impl<S: LineSource> Reassembler<S> {
    /// Reassembles lines pulled from `source`.
    pub fn new(source: S) -> Self {
        Reassembler {
            source,
            closed: false,
        }
    }

    /// Closes the underlying source and reports how that went.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the source fails to close.
    pub fn close(mut self) -> Result<()> {
        self.close_source()?;
        Ok(())
    }

    fn close_source(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.source.close()
    }

    fn fetch(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = self.source.next_line()?;
        if let Some(line) = line.as_mut() {
            line.retain(|&b| b != 0);
        }
        Ok(line)
    }

    fn next_logical(&mut self) -> io::Result<Option<Vec<u8>>> {
        let Some(mut line) = self.fetch()? else {
            return Ok(None);
        };
        while escapes_terminator(&line) {
            match self.fetch()? {
                Some(next) => {
                    line.extend_from_slice(&next);
                    trace!("joined escaped newline, logical line is {} bytes", line.len());
                }
                None => {
                    trace!("source exhausted inside an escaped newline");
                    break;
                }
            }
        }
        Ok(Some(line))
    }
}

impl<S: LineSource> Iterator for Reassembler<S> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_logical().map_err(Error::from).transpose()
    }
}

impl<S: LineSource> Drop for Reassembler<S> {
    fn drop(&mut self) {
        if let Err(err) = self.close_source() {
            warn!("failed to close line source: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn raw(lines: &[&[u8]]) -> std::vec::IntoIter<Vec<u8>> {
        lines.iter().map(|l| l.to_vec()).collect::<Vec<_>>().into_iter()
    }

    fn logical(lines: &[&[u8]]) -> Vec<Vec<u8>> {
        Reassembler::new(raw(lines))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    struct Tracked {
        lines: std::vec::IntoIter<Vec<u8>>,
        closes: Rc<Cell<usize>>,
        fail_read: bool,
    }

    impl LineSource for Tracked {
        fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
            if self.fail_read {
                return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
            }
            Ok(self.lines.next())
        }

        fn close(&mut self) -> io::Result<()> {
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    fn tracked(lines: &[&[u8]], fail_read: bool) -> (Tracked, Rc<Cell<usize>>) {
        let closes = Rc::new(Cell::new(0));
        let source = Tracked {
            lines: raw(lines),
            closes: Rc::clone(&closes),
            fail_read,
        };
        (source, closes)
    }

    #[test]
    fn test_single_backslash_joins() {
        assert_eq!(
            logical(&[b"field1,\\\n", b"field2\n"]),
            vec![b"field1,\\\nfield2\n".to_vec()]
        );
    }

    #[test]
    fn test_escaped_backslash_does_not_join() {
        assert_eq!(
            logical(&[b"a,\\\\\n", b"b\n"]),
            vec![b"a,\\\\\n".to_vec(), b"b\n".to_vec()]
        );
    }

    #[test]
    fn test_three_backslashes_join() {
        assert_eq!(
            logical(&[b"a\\\\\\\n", b"b\n"]),
            vec![b"a\\\\\\\nb\n".to_vec()]
        );
    }

    #[test]
    fn test_repeated_continuation() {
        assert_eq!(
            logical(&[b"\"x\\\n", b"y\\\n", b"z\"\n", b"next\n"]),
            vec![b"\"x\\\ny\\\nz\"\n".to_vec(), b"next\n".to_vec()]
        );
    }

    #[test]
    fn test_lone_backslash_line() {
        assert_eq!(
            logical(&[b"a\n", b"\\\\\n", b"a\\\n", b"b\n"]),
            vec![b"a\n".to_vec(), b"\\\\\n".to_vec(), b"a\\\nb\n".to_vec()]
        );
        assert_eq!(logical(&[b"\\\n", b"x"]), vec![b"\\\nx".to_vec()]);
    }

    #[test]
    fn test_unterminated_last_line() {
        assert_eq!(
            logical(&[b"a\n", b"a\\\n", b"b"]),
            vec![b"a\n".to_vec(), b"a\\\nb".to_vec()]
        );
    }

    #[test]
    fn test_exhausted_during_continuation() {
        assert_eq!(logical(&[b"a\\\n"]), vec![b"a\\\n".to_vec()]);
    }

    #[test]
    fn test_nul_bytes_stripped_from_every_line() {
        assert_eq!(
            logical(&[b"a\0\\\n", b"\0b\n"]),
            vec![b"a\\\nb\n".to_vec()]
        );
        // NUL between the backslash and the terminator does not hide the escape.
        assert_eq!(logical(&[b"a\\\0\n", b"b\n"]), vec![b"a\\\nb\n".to_vec()]);
    }

    #[test]
    fn test_passthrough_without_escapes() {
        let input: &[&[u8]] = &[b"a,b\n", b"\n", b"c\\d\n", b"tail"];
        let expected: Vec<Vec<u8>> = input.iter().map(|l| l.to_vec()).collect();
        assert_eq!(logical(input), expected);
    }

    #[test]
    fn test_from_reader_splits_on_newline_only() {
        let input: &[u8] = b"a\r\nb\\\nc\n";
        let lines: Vec<Vec<u8>> = Reassembler::from_reader(input)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(lines, vec![b"a\r\n".to_vec(), b"b\\\nc\n".to_vec()]);
    }

    #[test]
    fn test_drop_closes_source_once() {
        let (source, closes) = tracked(&[b"a\n", b"b\n"], false);
        {
            let mut lines = Reassembler::new(source);
            assert!(lines.next().is_some());
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_explicit_close_is_not_repeated_by_drop() {
        let (source, closes) = tracked(&[b"a\n"], false);
        let lines = Reassembler::new(source);
        lines.close().unwrap();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_read_error_is_surfaced() {
        let (source, closes) = tracked(&[b"a\n"], true);
        let mut lines = Reassembler::new(source);
        assert!(matches!(lines.next(), Some(Err(Error::Io(_)))));
        drop(lines);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_read_lines_after_close() {
        let mut source = ReadLines::new(&b"a\nb\n"[..]);
        assert_eq!(source.next_line().unwrap(), Some(b"a\n".to_vec()));
        source.close().unwrap();
        assert_eq!(source.next_line().unwrap(), None);
    }
}
