//! Error types for escaped CSV encoding, parsing and line reassembly.
//!
//! The record serializer and the UTF-8 sanitizer are total: malformed text is
//! repaired, never reported. Errors only come from the edges of the crate:
//!
//! - **Configuration**: options that would produce ambiguous output
//! - **Shape mismatches**: a `Serialize` type that is not a flat record
//! - **Syntax**: a logical line that cannot be split back into fields
//! - **I/O**: the underlying reader or writer failed
//!
//! ## Examples
//!
//! ```rust
//! use serde_escsv::{CsvOptions, Error, Serializer};
//!
//! // A quote character that is never escaped cannot appear safely inside a quoted field.
//! let options = CsvOptions::new().with_quote('|');
//! let result = Serializer::new(options);
//! assert!(matches!(result, Err(Error::InvalidConfig(_))));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors surfaced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error from the underlying reader, writer or line source
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Options rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The value cannot be represented as a flat record of scalar fields
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A logical line could not be split into fields
    #[error("Syntax error at byte {offset}: {msg}")]
    Syntax { offset: usize, msg: String },

    /// The encoded line is not valid UTF-8 (sanitization was off)
    #[error("Encoded line is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a configuration error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_escsv::Error;
    ///
    /// let err = Error::invalid_config("delimiter must be ASCII");
    /// assert!(err.to_string().contains("delimiter must be ASCII"));
    /// ```
    pub fn invalid_config<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidConfig(msg.to_string())
    }

    /// Creates a syntax error at the given byte offset of a logical line.
    pub fn syntax(offset: usize, msg: &str) -> Self {
        Error::Syntax {
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates an unsupported type error for values that are not flat records.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
