//! Splitting logical lines back into fields.
//!
//! [`Parser`] undoes what the [`Serializer`](crate::Serializer) does to one
//! line: it splits on the delimiter outside quotes, drops the enclosing quote
//! pair and removes the backslash in front of every escaped byte. Feed it
//! lines that came out of a [`Reassembler`](crate::Reassembler), so that an
//! escaped newline inside a field has already been joined back.
//!
//! The read side cannot tell a null field from an empty text field, and a
//! line holding a single empty field looks like an empty record. Both come
//! back as one empty field.
//!
//! ```rust
//! use serde_escsv::parse_line;
//!
//! let fields = parse_line(b"ab,20,\"c d\",\"e\\\nf\"\n").unwrap();
//! assert_eq!(fields, vec![b"ab".to_vec(), b"20".to_vec(), b"c d".to_vec(), b"e\nf".to_vec()]);
//! ```

use crate::{CsvOptions, Error, Result};

const BACKSLASH: u8 = b'\\';

/// Splits logical lines into raw field bytes.
#[derive(Clone, Debug)]
pub struct Parser {
    delimiter: u8,
    quote: u8,
}

impl Default for Parser {
    fn default() -> Self {
        Parser {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl Parser {
    /// Creates a parser for lines written with `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `options` do not validate.
    pub fn new(options: &CsvOptions) -> Result<Self> {
        options.validate()?;
        Ok(Parser {
            delimiter: options.delimiter as u8,
            quote: options.quote as u8,
        })
    }

    /// Splits one logical line. A single trailing `\n` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] for an unterminated quoted field, a backslash
    /// with nothing after it, or bytes between a closing quote and the next
    /// delimiter.
    pub fn parse_line(&self, line: &[u8]) -> Result<Vec<Vec<u8>>> {
        let body = line.strip_suffix(b"\n").unwrap_or(line);
        let mut fields = Vec::new();
        let mut field = Vec::new();
        let mut pos = 0;

        loop {
            let quoted = body.get(pos) == Some(&self.quote);
            if quoted {
                pos += 1;
            }
            let start = pos;

            loop {
                let Some(&b) = body.get(pos) else {
                    if quoted {
                        return Err(Error::syntax(start - 1, "unterminated quoted field"));
                    }
                    break;
                };
                pos += 1;
                match b {
                    BACKSLASH => match body.get(pos) {
                        Some(&escaped) => {
                            field.push(escaped);
                            pos += 1;
                        }
                        None => return Err(Error::syntax(pos - 1, "dangling backslash")),
                    },
                    b if quoted && b == self.quote => {
                        match body.get(pos) {
                            None => {}
                            Some(&next) if next == self.delimiter => {}
                            Some(_) => {
                                return Err(Error::syntax(
                                    pos,
                                    "expected delimiter after closing quote",
                                ));
                            }
                        }
                        break;
                    }
                    b if !quoted && b == self.delimiter => {
                        pos -= 1;
                        break;
                    }
                    b => field.push(b),
                }
            }

            fields.push(std::mem::take(&mut field));
            match body.get(pos) {
                Some(&b) if b == self.delimiter => pos += 1,
                _ => return Ok(fields),
            }
        }
    }
}

/// Splits one logical line written with the default options.
///
/// # Errors
///
/// See [`Parser::parse_line`].
pub fn parse_line(line: &[u8]) -> Result<Vec<Vec<u8>>> {
    Parser::default().parse_line(line)
}
