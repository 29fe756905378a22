//! Configuration options for escaped CSV serialization.
//!
//! This module provides types to customize the encoded line format:
//!
//! - [`CsvOptions`]: Main configuration struct
//! - [`Sanitize`]: UTF-8 repair mode applied to text fields
//! - [`EscapeSet`]: Characters that receive a leading backslash
//!
//! Options are plain values. Build them once, hand them to a
//! [`Serializer`](crate::Serializer), and they never change afterwards.
//! They also implement serde's traits, so a pipeline can keep its serializer
//! settings in a config file:
//!
//! ```rust
//! use serde_escsv::{CsvOptions, Sanitize};
//!
//! let options = CsvOptions::new()
//!     .with_delimiter('\t')
//!     .with_null_value("\\N")
//!     .with_sanitize(Sanitize::Utf16);
//! assert!(options.validate().is_ok());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const BACKSLASH: u8 = b'\\';

/// UTF-8 repair mode for text fields.
///
/// - **Off**: bytes pass through untouched
/// - **Utf8**: strip malformed sequences, surrogates and U+FFFF
/// - **Utf16**: as `Utf8`, and also strip every codepoint at or above U+10000
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sanitize {
    #[default]
    Off,
    Utf8,
    Utf16,
}

impl Sanitize {
    /// Returns `true` unless the mode is [`Sanitize::Off`].
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Sanitize::Off)
    }
}

/// The set of ASCII characters that are escaped with a backslash.
///
/// The default set is backslash, single quote, double quote, CR and LF.
///
/// # Examples
///
/// ```rust
/// use serde_escsv::EscapeSet;
///
/// let set = EscapeSet::new(['\\', '"', '\t', '\n']).unwrap();
/// assert!(set.contains(b'\t'));
/// assert!(!set.contains(b'\''));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct EscapeSet {
    table: [bool; 128],
}

impl EscapeSet {
    const DEFAULT: [char; 5] = ['\\', '\'', '"', '\r', '\n'];

    /// Builds a set from characters. Every character must be ASCII.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a non-ASCII character.
    pub fn new<I>(chars: I) -> Result<Self>
    where
        I: IntoIterator<Item = char>,
    {
        let mut table = [false; 128];
        for ch in chars {
            if !ch.is_ascii() {
                return Err(Error::invalid_config(format!(
                    "escape character {:?} is not ASCII",
                    ch
                )));
            }
            table[ch as usize] = true;
        }
        Ok(EscapeSet { table })
    }

    /// An escape set with no members.
    #[must_use]
    pub const fn empty() -> Self {
        EscapeSet {
            table: [false; 128],
        }
    }

    /// Returns `true` if `byte` must be preceded by a backslash.
    #[inline]
    #[must_use]
    pub fn contains(&self, byte: u8) -> bool {
        self.table.get(byte as usize).copied().unwrap_or(false)
    }

    /// Iterates over the members in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter(|&(_, &set)| set)
            .map(|(i, _)| i as u8 as char)
    }
}

impl Default for EscapeSet {
    fn default() -> Self {
        let mut table = [false; 128];
        for ch in Self::DEFAULT {
            table[ch as usize] = true;
        }
        EscapeSet { table }
    }
}

impl fmt::Debug for EscapeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl TryFrom<String> for EscapeSet {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        EscapeSet::new(value.chars())
    }
}

impl From<EscapeSet> for String {
    fn from(set: EscapeSet) -> Self {
        set.iter().collect()
    }
}

impl Serialize for EscapeSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&String::from(self.clone()))
    }
}

impl<'de> Deserialize<'de> for EscapeSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let chars = String::deserialize(deserializer)?;
        EscapeSet::try_from(chars).map_err(serde::de::Error::custom)
    }
}

/// Configuration options for escaped CSV serialization.
///
/// # Examples
///
/// ```rust
/// use serde_escsv::{CsvOptions, Sanitize};
///
/// // Defaults: ',' delimiter, '"' quote, empty null text, no sanitization
/// let options = CsvOptions::new();
/// assert_eq!(options.delimiter, ',');
///
/// // Strict UTF-8 repair
/// let options = CsvOptions::sanitized();
/// assert_eq!(options.sanitize, Sanitize::Utf8);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub delimiter: char,
    pub quote: char,
    pub null_value: String,
    pub sanitize: Sanitize,
    pub escapes: EscapeSet,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: ',',
            quote: '"',
            null_value: String::new(),
            sanitize: Sanitize::Off,
            escapes: EscapeSet::default(),
        }
    }
}

impl CsvOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates default options with strict UTF-8 sanitization enabled.
    #[must_use]
    pub fn sanitized() -> Self {
        CsvOptions {
            sanitize: Sanitize::Utf8,
            ..Default::default()
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the quote character wrapped around fields that need quoting.
    #[must_use]
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Sets the text written for null fields.
    ///
    /// The null text is written verbatim, without quoting or escaping.
    #[must_use]
    pub fn with_null_value(mut self, null_value: impl Into<String>) -> Self {
        self.null_value = null_value.into();
        self
    }

    /// Sets the UTF-8 repair mode.
    #[must_use]
    pub fn with_sanitize(mut self, sanitize: Sanitize) -> Self {
        self.sanitize = sanitize;
        self
    }

    /// Replaces the escape set.
    #[must_use]
    pub fn with_escapes(mut self, escapes: EscapeSet) -> Self {
        self.escapes = escapes;
        self
    }

    /// Checks that these options produce lines that can be split back into fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the delimiter or quote is not an
    /// ASCII character other than NUL, backslash, CR and LF, or if they are
    /// equal. The escape set must hold backslash, LF and the quote character.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_escsv::{CsvOptions, EscapeSet};
    ///
    /// let escapes = EscapeSet::new(['\\', '\n']).unwrap();
    /// let options = CsvOptions::new().with_escapes(escapes);
    /// assert!(options.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        for (name, ch) in [("delimiter", self.delimiter), ("quote", self.quote)] {
            if !ch.is_ascii() || matches!(ch, '\0' | '\\' | '\r' | '\n') {
                return Err(Error::invalid_config(format!(
                    "{} {:?} must be an ASCII character other than NUL, backslash, CR and LF",
                    name, ch
                )));
            }
        }
        if self.delimiter == self.quote {
            return Err(Error::invalid_config(
                "delimiter and quote must be different characters",
            ));
        }
        for (name, byte) in [("backslash", BACKSLASH), ("LF", b'\n')] {
            if !self.escapes.contains(byte) {
                return Err(Error::invalid_config(format!(
                    "{} must be in the escape set",
                    name
                )));
            }
        }
        if !self.escapes.contains(self.quote as u8) {
            return Err(Error::invalid_config(format!(
                "quote {:?} must be in the escape set, otherwise quoted fields are ambiguous",
                self.quote
            )));
        }
        Ok(())
    }
}
