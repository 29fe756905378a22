//! Field values of a record.
//!
//! This module provides the [`Field`] enum, the closed set of things a record
//! column can hold, and [`Scalar`], the non-text values that are written in
//! their canonical textual form without quoting or escaping.
//!
//! ## Creating Fields
//!
//! ```rust
//! use serde_escsv::{Field, Scalar};
//!
//! let null = Field::Null;
//! let text = Field::from("hello");
//! let number = Field::from(42);
//! let missing: Field = Option::<i32>::None.into();
//!
//! assert!(null.is_null());
//! assert!(missing.is_null());
//! assert_eq!(number, Field::Scalar(Scalar::Integer(42)));
//! assert_eq!(text.as_bytes(), Some(&b"hello"[..]));
//! ```
//!
//! Text fields hold raw bytes rather than `String`, because the data they
//! carry is not guaranteed to be valid UTF-8 until it has been sanitized.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::fmt;

/// Canonical layout for [`Scalar::Date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An ordered sequence of fields, one per output column.
pub type Record = Vec<Field>;

/// One column of a record.
///
/// # Examples
///
/// ```rust
/// use serde_escsv::{Field, Serializer};
///
/// let serializer = Serializer::default();
/// let row = [Field::from("ab"), Field::from(20), Field::from("c d")];
/// assert_eq!(serializer.serialize(&row), b"ab,20,\"c d\"\n");
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Field {
    #[default]
    Null,
    Text(Vec<u8>),
    Scalar(Scalar),
}

/// A non-text value with a canonical textual form.
///
/// Scalars are trusted not to contain delimiters and are never quoted.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    BigInt(BigInt),
    Date(DateTime<Utc>),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Unsigned(u) => write!(f, "{}", u),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::BigInt(n) => write!(f, "{}", n),
            Scalar::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl Field {
    /// Returns `true` if this is [`Field::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Returns `true` if this is [`Field::Text`].
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Field::Text(_))
    }

    /// Returns the raw bytes of a text field.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Field::Text(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the scalar of a non-text field.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Field::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.as_bytes().to_vec())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Text(value.into_bytes())
    }
}

impl From<&[u8]> for Field {
    fn from(value: &[u8]) -> Self {
        Field::Text(value.to_vec())
    }
}

impl From<Vec<u8>> for Field {
    fn from(value: Vec<u8>) -> Self {
        Field::Text(value)
    }
}

impl From<Scalar> for Field {
    fn from(value: Scalar) -> Self {
        Field::Scalar(value)
    }
}

impl<T: Into<Field>> From<Option<T>> for Field {
    fn from(value: Option<T>) -> Self {
        value.map_or(Field::Null, Into::into)
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Field {
                fn from(value: $ty) -> Self {
                    Field::Scalar(Scalar::$variant(<$target>::from(value)))
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool as bool,
    i8 => Integer as i64,
    i16 => Integer as i64,
    i32 => Integer as i64,
    i64 => Integer as i64,
    u8 => Unsigned as u64,
    u16 => Unsigned as u64,
    u32 => Unsigned as u64,
    u64 => Unsigned as u64,
    f32 => Float as f64,
    f64 => Float as f64,
    BigInt => BigInt as BigInt,
    DateTime<Utc> => Date as DateTime<Utc>,
}
