//! Streaming record writer.
//!
//! [`Writer`] encodes records one at a time into any `io::Write`, reusing one
//! line buffer for the whole stream.
//!
//! ```rust
//! use serde_escsv::{Field, Writer};
//!
//! let mut writer = Writer::new(Vec::new());
//! writer.write_record(&[Field::from("a b"), Field::Null]).unwrap();
//! writer.serialize(&("x", 1)).unwrap();
//! assert_eq!(writer.records_written(), 2);
//!
//! let output = writer.into_inner().unwrap();
//! assert_eq!(output, b"\"a b\",\nx,1\n");
//! ```

use crate::{CsvOptions, Field, Result, Serializer};
use log::debug;
use serde::Serialize;
use std::io;

/// Writes encoded records to an underlying writer.
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    inner: W,
    serializer: Serializer,
    line: Vec<u8>,
    records: u64,
}

impl<W: io::Write> Writer<W> {
    /// Creates a writer with default options.
    pub fn new(inner: W) -> Self {
        Self::with_serializer(inner, Serializer::default())
    }

    /// Creates a writer with custom options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if the
    /// options do not validate.
    pub fn with_options(inner: W, options: CsvOptions) -> Result<Self> {
        Ok(Self::with_serializer(inner, Serializer::new(options)?))
    }

    /// Creates a writer around an already built serializer.
    pub fn with_serializer(inner: W, serializer: Serializer) -> Self {
        Writer {
            inner,
            serializer,
            line: Vec::with_capacity(256),
            records: 0,
        }
    }

    /// Encodes and writes one record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the write fails.
    pub fn write_record(&mut self, record: &[Field]) -> Result<()> {
        self.line.clear();
        self.serializer.write_record(&mut self.line, record);
        self.inner.write_all(&self.line)?;
        self.records += 1;
        Ok(())
    }

    /// Flattens `value` into a record, then encodes and writes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`](crate::Error::UnsupportedType) if
    /// `value` is not a flat row, or [`Error::Io`](crate::Error::Io) if the
    /// write fails.
    pub fn serialize<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let record = crate::to_record(value)?;
        self.write_record(&record)
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        debug!("flushed after {} records", self.records);
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the final flush fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Sanitize};

    struct Broken;

    impl io::Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_records_are_appended() {
        let mut writer = Writer::new(Vec::new());
        writer.write_record(&[Field::from("ab"), Field::from(20)]).unwrap();
        writer.write_record(&[Field::from("c d")]).unwrap();
        assert_eq!(writer.records_written(), 2);
        assert_eq!(writer.into_inner().unwrap(), b"ab,20\n\"c d\"\n");
    }

    #[test]
    fn test_with_options_sanitizes() {
        let options = CsvOptions::new().with_sanitize(Sanitize::Utf16);
        let mut writer = Writer::with_options(Vec::new(), options).unwrap();
        writer
            .write_record(&[Field::from(&b"\xf0\x9f\x8e\x82x"[..])])
            .unwrap();
        assert_eq!(writer.into_inner().unwrap(), b"x\n");
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = CsvOptions::new().with_quote('~');
        assert!(matches!(
            Writer::with_options(Vec::new(), options),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_write_error_not_counted() {
        let mut writer = Writer::new(Broken);
        assert!(matches!(writer.write_record(&[Field::Null]), Err(Error::Io(_))));
        assert_eq!(writer.records_written(), 0);
    }

    #[test]
    fn test_nested_value_rejected() {
        let mut writer = Writer::new(Vec::new());
        let result = writer.serialize(&(1, (2, 3)));
        assert!(matches!(result, Err(Error::UnsupportedType(_))));
    }
}
