//! # serde_escsv
//!
//! A Serde-compatible encoder for backslash-escaped CSV lines, with byte-exact
//! UTF-8 repair and a line reassembler for reading the output back.
//!
//! ## What is escaped CSV?
//!
//! Each record becomes one line. Fields are separated by a delimiter (`,` by
//! default). Instead of RFC 4180 quote doubling, special characters get a
//! leading backslash, and a field is wrapped in quotes whenever it contains
//! whitespace, the delimiter, a backslash, a quote, CR or LF:
//!
//! ```text
//! ab,20,"c d"
//! "it\'s","two\
//! lines",
//! ```
//!
//! An escaped newline keeps a multi-line field inside its record, but a
//! reader that splits on `\n` sees two lines. The [`Reassembler`] joins them
//! back.
//!
//! ## Key Features
//!
//! - **Total serializer**: encoding a record never fails; malformed UTF-8 is
//!   repaired, not rejected
//! - **Byte-exact repair**: only the malformed spans are removed, and clean
//!   input is handed back without a copy
//! - **Serde Compatible**: structs, tuples, sequences and maps of scalars are
//!   rows via `#[derive(Serialize)]`
//! - **Validated configuration**: options that would make quoted fields
//!   ambiguous are rejected up front
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Serialize;
//! use serde_escsv::{to_string, Field, Serializer};
//!
//! #[derive(Serialize)]
//! struct PetLicense {
//!     number: u32,
//!     name: String,
//!     breed: Option<String>,
//! }
//!
//! let row = PetLicense { number: 42, name: "Mr. Whiskers".to_string(), breed: None };
//! assert_eq!(to_string(&row).unwrap(), "42,\"Mr. Whiskers\",\n");
//!
//! // Or build records by hand
//! let serializer = Serializer::default();
//! let line = serializer.serialize(&[Field::from("e\n"), Field::Null]);
//! assert_eq!(line, b"\"e\\\n\",\n");
//! ```
//!
//! ### Reading it Back
//!
//! ```rust
//! use serde_escsv::{parse_line, Reassembler};
//!
//! let file: &[u8] = b"a,\"x\\\ny\"\nb,z\n";
//! let mut records = Vec::new();
//! for line in Reassembler::from_reader(file) {
//!     records.push(parse_line(&line.unwrap()).unwrap());
//! }
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0][1], b"x\ny");
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - [`Serializer::serialize`] and [`sanitize`] cannot fail or panic
//! - Proper error propagation with `Result` types at configuration, serde and
//!   I/O boundaries

pub mod de;
pub mod error;
pub mod options;
pub mod reassemble;
pub mod sanitize;
pub mod ser;
pub mod value;
pub mod writer;

pub use de::{parse_line, Parser};
pub use error::{Error, Result};
pub use options::{CsvOptions, EscapeSet, Sanitize};
pub use reassemble::{LineSource, ReadLines, Reassembler};
pub use sanitize::sanitize;
pub use ser::{to_record, FieldSerializer, RecordSerializer, Serializer};
pub use value::{Field, Record, Scalar};
pub use writer::Writer;

use serde::Serialize;
use std::io;

/// Encode any `T: Serialize` row as one line of bytes.
///
/// # Examples
///
/// ```rust
/// use serde_escsv::to_vec;
///
/// assert_eq!(to_vec(&("ab", 20, "c d")).unwrap(), b"ab,20,\"c d\"\n");
/// ```
///
/// # Errors
///
/// Returns an error if `value` is not a flat row of scalar fields.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    Serializer::default().serialize_value(value)
}

/// Encode any `T: Serialize` row as one line of bytes with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_escsv::{to_vec_with_options, CsvOptions};
///
/// let options = CsvOptions::new().with_delimiter('\t').with_null_value("\\N");
/// let line = to_vec_with_options(&(1, None::<i32>), options).unwrap();
/// assert_eq!(line, b"1\t\\N\n");
/// ```
///
/// # Errors
///
/// Returns an error if the options do not validate or `value` is not a flat row.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_options<T>(value: &T, options: CsvOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    Serializer::new(options)?.serialize_value(value)
}

/// Encode any `T: Serialize` row as one line of text.
///
/// # Errors
///
/// Returns [`Error::Utf8`] if a byte field carried invalid UTF-8 and
/// sanitization was off, or any error [`to_vec`] returns.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(String::from_utf8(to_vec(value)?)?)
}

/// Encode any `T: Serialize` row as one line of text with custom options.
///
/// # Errors
///
/// See [`to_string`] and [`to_vec_with_options`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: CsvOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(String::from_utf8(to_vec_with_options(value, options)?)?)
}

/// Encode any `T: Serialize` row and write it to a writer.
///
/// # Examples
///
/// ```rust
/// use serde_escsv::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &["a", "b"]).unwrap();
/// assert_eq!(buffer, b"a,b\n");
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, CsvOptions::default())
}

/// Encode any `T: Serialize` row with custom options and write it to a writer.
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: CsvOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let line = to_vec_with_options(value, options)?;
    writer.write_all(&line)?;
    Ok(())
}
