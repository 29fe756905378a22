//! Escaped CSV serialization.
//!
//! This module provides the [`Serializer`], which turns one record into one
//! newline-terminated line, and the serde bridge that flattens any
//! `T: Serialize` row into a [`Record`].
//!
//! ## Encoding Rules
//!
//! For each text field, in order:
//!
//! 1. Sanitize UTF-8 if enabled in [`CsvOptions`]
//! 2. Decide quoting: the field is quoted iff it contains a space, tab,
//!    the delimiter, backslash, single quote, double quote, CR or LF
//! 3. Drop every NUL byte
//! 4. Put a backslash in front of every byte in the escape set
//! 5. Wrap in the quote character if step 2 said so
//!
//! Null fields become the configured null text and scalars their canonical
//! text. Neither is quoted nor escaped.
//!
//! ## Usage
//!
//! ```rust
//! use serde_escsv::{Field, Serializer};
//!
//! let serializer = Serializer::default();
//! let line = serializer.serialize(&[
//!     Field::from("a "),
//!     Field::from(" c\t"),
//!     Field::from("e\n"),
//! ]);
//! assert_eq!(line, b"\"a \",\" c\t\",\"e\\\n\"\n");
//! ```
//!
//! ## Serde Rows
//!
//! Sequences, tuples, structs and maps of scalar values serialize as one
//! record each. Map keys and struct field names are not written.
//!
//! Every field carries whatever its own `Serialize` impl emits. A
//! `chrono::DateTime` field arrives as chrono's RFC 3339 string, not in
//! [`DATE_FORMAT`](crate::value::DATE_FORMAT); build the record from
//! [`Field::from`] to get [`Scalar::Date`] text.
//!
//! ```rust
//! use serde::Serialize;
//! use serde_escsv::to_vec;
//!
//! #[derive(Serialize)]
//! struct License { number: u32, name: String, species: Option<String> }
//!
//! let row = License { number: 7, name: "Rex Jr".to_string(), species: None };
//! assert_eq!(to_vec(&row).unwrap(), b"7,\"Rex Jr\",\n");
//! ```

use crate::sanitize::sanitize;
use crate::{CsvOptions, Error, Field, Record, Result, Scalar};
use num_bigint::BigInt;
use serde::{ser, Serialize};
use std::borrow::Cow;

const BACKSLASH: u8 = b'\\';

/// The record serializer.
///
/// Built once from validated [`CsvOptions`]; every method takes `&self`, so
/// one serializer can be shared across threads.
#[derive(Clone, Debug)]
pub struct Serializer {
    options: CsvOptions,
    delimiter: u8,
    quote: u8,
}

impl Default for Serializer {
    fn default() -> Self {
        Serializer {
            options: CsvOptions::default(),
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl Serializer {
    /// Creates a serializer after validating `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if [`CsvOptions::validate`] fails.
    pub fn new(options: CsvOptions) -> Result<Self> {
        options.validate()?;
        // validate() guarantees both are ASCII.
        let delimiter = options.delimiter as u8;
        let quote = options.quote as u8;
        Ok(Serializer {
            options,
            delimiter,
            quote,
        })
    }

    /// The validated options this serializer was built from.
    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Encodes `record` as one line, terminated by `\n`.
    #[must_use]
    pub fn serialize(&self, record: &[Field]) -> Vec<u8> {
        let mut output = Vec::with_capacity(record.len() * 16);
        self.write_record(&mut output, record);
        output
    }

    /// Appends the encoded line for `record` to `output`.
    pub fn write_record(&self, output: &mut Vec<u8>, record: &[Field]) {
        for (i, field) in record.iter().enumerate() {
            if i > 0 {
                output.push(self.delimiter);
            }
            self.write_column(output, field);
        }
        output.push(b'\n');
    }

    /// Encodes a single field.
    ///
    /// Text that needs no repair, quoting or escaping is returned borrowed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_escsv::{Field, Serializer};
    ///
    /// let serializer = Serializer::default();
    /// assert_eq!(&*serializer.escape_column(&Field::from("plain")), b"plain");
    /// assert_eq!(&*serializer.escape_column(&Field::from("it's")), b"\"it\\'s\"");
    /// assert_eq!(&*serializer.escape_column(&Field::Null), b"");
    /// ```
    #[must_use]
    pub fn escape_column<'a>(&'a self, field: &'a Field) -> Cow<'a, [u8]> {
        match field {
            Field::Null => Cow::Borrowed(self.options.null_value.as_bytes()),
            Field::Scalar(scalar) => Cow::Owned(scalar.to_string().into_bytes()),
            Field::Text(bytes) => {
                let text = sanitize(bytes, self.options.sanitize);
                if self.is_verbatim(&text) {
                    return text;
                }
                let mut output = Vec::with_capacity(text.len() + 8);
                self.write_text(&mut output, &text);
                Cow::Owned(output)
            }
        }
    }

    /// Flattens `value` into a record and encodes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] if a field of `value` is itself a
    /// sequence, map or struct.
    pub fn serialize_value<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: ?Sized + Serialize,
    {
        let record = to_record(value)?;
        Ok(self.serialize(&record))
    }

    fn write_column(&self, output: &mut Vec<u8>, field: &Field) {
        match field {
            Field::Null => output.extend_from_slice(self.options.null_value.as_bytes()),
            Field::Scalar(scalar) => output.extend_from_slice(scalar.to_string().as_bytes()),
            Field::Text(bytes) => {
                let text = sanitize(bytes, self.options.sanitize);
                self.write_text(output, &text);
            }
        }
    }

    fn write_text(&self, output: &mut Vec<u8>, text: &[u8]) {
        let quoted = self.needs_quote(text);
        if quoted {
            output.push(self.quote);
        }
        for &b in text {
            match b {
                0 => {}
                b if self.options.escapes.contains(b) => {
                    output.push(BACKSLASH);
                    output.push(b);
                }
                b => output.push(b),
            }
        }
        if quoted {
            output.push(self.quote);
        }
    }

    #[inline]
    fn is_quotable(&self, b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\\' | b'\'' | b'"' | b'\r' | b'\n') || b == self.delimiter
    }

    #[inline]
    fn needs_quote(&self, text: &[u8]) -> bool {
        text.iter().any(|&b| self.is_quotable(b))
    }

    fn is_verbatim(&self, text: &[u8]) -> bool {
        text.iter()
            .all(|&b| b != 0 && !self.is_quotable(b) && !self.options.escapes.contains(b))
    }
}

/// Flattens a `T: Serialize` row into its fields without encoding them.
///
/// A top-level scalar becomes a one-field record. Fields hold the text
/// their `Serialize` impls produce, so dates keep their own serde format.
///
/// # Examples
///
/// ```rust
/// use serde_escsv::{to_record, Field};
///
/// let record = to_record(&("a", 1, None::<bool>)).unwrap();
/// assert_eq!(record, vec![Field::from("a"), Field::from(1), Field::Null]);
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for nested compound values.
pub fn to_record<T>(value: &T) -> Result<Record>
where
    T: ?Sized + Serialize,
{
    let mut fields = Vec::new();
    value.serialize(RecordSerializer {
        fields: &mut fields,
    })?;
    Ok(fields)
}

/// Serde serializer for one whole row. Collects fields into a [`Record`].
pub struct RecordSerializer<'a> {
    fields: &'a mut Record,
}

impl<'a> RecordSerializer<'a> {
    fn push_one<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.push(value.serialize(FieldSerializer)?);
        Ok(())
    }
}

macro_rules! forward_scalar {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<()> {
                self.push_one(&v)
            }
        )*
    };
}

impl<'a> ser::Serializer for RecordSerializer<'a> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Columns<'a>;
    type SerializeTuple = Columns<'a>;
    type SerializeTupleStruct = Columns<'a>;
    type SerializeTupleVariant = Columns<'a>;
    type SerializeMap = Columns<'a>;
    type SerializeStruct = Columns<'a>;
    type SerializeStructVariant = Columns<'a>;

    forward_scalar! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.push_one(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.fields.push(Field::Text(v.to_vec()));
        Ok(())
    }

    fn serialize_none(self) -> Result<()> {
        self.fields.push(Field::Null);
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.serialize_none()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_none()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(Columns::new(self.fields, len))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        Ok(Columns::new(self.fields, Some(len)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(Columns::new(self.fields, Some(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(Columns::new(self.fields, Some(len)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(Columns::new(self.fields, len))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(Columns::new(self.fields, Some(len)))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(Columns::new(self.fields, Some(len)))
    }
}

/// Collects the columns of a compound row value.
pub struct Columns<'a> {
    fields: &'a mut Record,
}

impl<'a> Columns<'a> {
    fn new(fields: &'a mut Record, len: Option<usize>) -> Self {
        if let Some(len) = len {
            fields.reserve(len);
        }
        Columns { fields }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.push(value.serialize(FieldSerializer)?);
        Ok(())
    }
}

impl<'a> ser::SerializeSeq for Columns<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for Columns<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for Columns<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for Columns<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeMap for Columns<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, _key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for Columns<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for Columns<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Serde serializer for a single column value.
pub struct FieldSerializer;

type Nested = ser::Impossible<Field, Error>;

fn nested(kind: &str) -> Error {
    Error::unsupported_type(&format!("{} cannot be written as a single field", kind))
}

impl ser::Serializer for FieldSerializer {
    type Ok = Field;
    type Error = Error;

    type SerializeSeq = Nested;
    type SerializeTuple = Nested;
    type SerializeTupleStruct = Nested;
    type SerializeTupleVariant = Nested;
    type SerializeMap = Nested;
    type SerializeStruct = Nested;
    type SerializeStructVariant = Nested;

    fn serialize_bool(self, v: bool) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Field> {
        Ok(match i64::try_from(v) {
            Ok(small) => Field::from(small),
            Err(_) => Field::Scalar(Scalar::BigInt(BigInt::from(v))),
        })
    }

    fn serialize_u8(self, v: u8) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Field> {
        Ok(match u64::try_from(v) {
            Ok(small) => Field::from(small),
            Err(_) => Field::Scalar(Scalar::BigInt(BigInt::from(v))),
        })
    }

    fn serialize_f32(self, v: f32) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Field> {
        let mut buf = [0u8; 4];
        Ok(Field::from(&*v.encode_utf8(&mut buf)))
    }

    fn serialize_str(self, v: &str) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Field> {
        Ok(Field::from(v))
    }

    fn serialize_none(self) -> Result<Field> {
        Ok(Field::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Field>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Field> {
        Ok(Field::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Field> {
        Ok(Field::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Field> {
        Ok(Field::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Field>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Field>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Nested> {
        Err(nested("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Nested> {
        Err(nested("tuple"))
    }

    fn serialize_tuple_struct(self, name: &'static str, _len: usize) -> Result<Nested> {
        Err(nested(name))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Nested> {
        Err(nested(variant))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Nested> {
        Err(nested("map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Nested> {
        Err(nested(name))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Nested> {
        Err(nested(variant))
    }
}
