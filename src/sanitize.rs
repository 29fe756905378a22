//! Byte-exact UTF-8 repair.
//!
//! [`sanitize`] removes every malformed byte span from a buffer, then removes
//! codepoints that downstream stores refuse: U+FFFF always, and every
//! codepoint at or above U+10000 in [`Sanitize::Utf16`] mode. Surrogates
//! (U+D800 to U+DFFF) never survive decoding, since their three-byte
//! encodings are malformed UTF-8.
//!
//! Nothing is reported. When no byte had to go, the input slice itself is
//! handed back as [`Cow::Borrowed`].
//!
//! ```rust
//! use serde_escsv::{sanitize, Sanitize};
//! use std::borrow::Cow;
//!
//! // Valid 3-byte sequence followed by a stray continuation byte
//! let repaired = sanitize(b"\xe5\xae\x89\x8d", Sanitize::Utf8);
//! assert_eq!(&*repaired, "安".as_bytes());
//!
//! // Clean input is returned as-is
//! assert!(matches!(sanitize(b"plain", Sanitize::Utf8), Cow::Borrowed(_)));
//! ```

use crate::Sanitize;
use std::borrow::Cow;

#[inline]
fn is_forbidden(ch: char, mode: Sanitize) -> bool {
    ch == '\u{FFFF}' || (mode == Sanitize::Utf16 && u32::from(ch) >= 0x1_0000)
}

/// Repairs `input` according to `mode`.
///
/// Returns `input` unchanged when `mode` is [`Sanitize::Off`], when it is
/// empty, or when nothing had to be removed.
#[must_use]
pub fn sanitize(input: &[u8], mode: Sanitize) -> Cow<'_, [u8]> {
    if input.is_empty() || !mode.is_enabled() {
        return Cow::Borrowed(input);
    }

    let decoded = strip_malformed(input);
    if !decoded.chars().any(|ch| is_forbidden(ch, mode)) {
        return match decoded {
            Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
            Cow::Owned(text) => Cow::Owned(text.into_bytes()),
        };
    }

    let kept: String = decoded.chars().filter(|&ch| !is_forbidden(ch, mode)).collect();
    Cow::Owned(kept.into_bytes())
}

/// Drops every malformed span and keeps the text between them.
///
/// Each span is the maximal invalid subsequence the standard library's
/// decoder reports; a sequence cut short by the end of the buffer is a
/// single span reaching the end.
fn strip_malformed(input: &[u8]) -> Cow<'_, str> {
    let mut chunks = input.utf8_chunks();
    let Some(first) = chunks.next() else {
        return Cow::Borrowed("");
    };
    // Only the last chunk can end without an invalid span.
    if first.invalid().is_empty() {
        return Cow::Borrowed(first.valid());
    }

    let mut repaired = String::with_capacity(input.len());
    repaired.push_str(first.valid());
    for chunk in chunks {
        repaired.push_str(chunk.valid());
    }
    Cow::Owned(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(input: &[u8]) -> Vec<u8> {
        sanitize(input, Sanitize::Utf8).into_owned()
    }

    fn utf16(input: &[u8]) -> Vec<u8> {
        sanitize(input, Sanitize::Utf16).into_owned()
    }

    #[test]
    fn test_off_is_identity_even_for_garbage() {
        let input = b"\xff\xfe\x00";
        assert!(matches!(sanitize(input, Sanitize::Off), Cow::Borrowed(b) if b == input));
    }

    #[test]
    fn test_text_between_spans_is_kept() {
        assert_eq!(utf8(b"a\xffb\xe5\xaec\xe5\xae"), b"abc");
        assert_eq!(utf8(b"\x80\x80\xe5\xae\x89"), "安".as_bytes());
    }

    #[test]
    fn test_truncated_two_byte_lead() {
        assert_eq!(utf8(b"\xc3"), b"");
        assert_eq!(utf8(b"\xc3 "), b" ");
    }

    #[test]
    fn test_stray_continuation_after_valid_sequence() {
        assert_eq!(utf8(b"\xe5\xae\x89\x8d"), b"\xe5\xae\x89");
        assert_eq!(utf8(b"\xe5\xae\x89\x8d "), b"\xe5\xae\x89 ");
    }

    #[test]
    fn test_garbage_intermixed_with_valid_bytes() {
        assert_eq!(utf8(b"\x91\xea"), b"");
        assert_eq!(utf8(b"\x90\xea\xae"), b"");
        assert_eq!(utf8(b"\x90\x24\x90"), b"\x24");
        assert_eq!(utf8(b"\x90 \x45\xae"), b" \x45");
        assert_eq!(utf8(b"\x91 \x90 "), b"  ");
        assert_eq!(utf8(b"\xe5\x91 \x90 "), b"  ");
        assert_eq!(utf8(b"\x91\xe5\xae\x89 "), b"\xe5\xae\x89 ");
    }

    #[test]
    fn test_incomplete_tail() {
        assert_eq!(utf8(b"\xe5\x8d"), b"");
        assert_eq!(utf8(b"\xe5\x8d "), b" ");
        assert_eq!(utf8(b"\xe5\x87\xb8-\xe5\x87"), b"\xe5\x87\xb8-");
        assert_eq!(utf8(b"\xe5\x87\xb8-\xe5"), b"\xe5\x87\xb8-");
    }

    #[test]
    fn test_invalid_lead_bytes() {
        assert_eq!(utf8(b"\xff\xff\xff"), b"");
    }

    #[test]
    fn test_forbidden_codepoints() {
        // U+FFFF
        assert_eq!(utf8(b"\xef\xbf\xbf"), b"");
        assert_eq!(utf8(b"a\xef\xbf\xbfb"), b"ab");
        // Encoded surrogates
        assert_eq!(utf8(b"\xed\xa0\x80"), b"");
        assert_eq!(utf8(b"\xed\xbf\xbf"), b"");
        // U+D7FF sits just below the surrogate range
        assert_eq!(utf8(b"\xed\x9f\xbf"), b"\xed\x9f\xbf");
    }

    #[test]
    fn test_four_byte_sequence_by_mode() {
        let cake = "\u{1F382}".as_bytes();
        assert!(matches!(sanitize(cake, Sanitize::Utf8), Cow::Borrowed(b) if b == cake));
        assert_eq!(utf16(cake), b"");
        assert_eq!(utf16("a\u{10FFFD}b".as_bytes()), b"ab");
        assert_eq!(utf16("\u{FFFD}".as_bytes()), "\u{FFFD}".as_bytes());
    }

    #[test]
    fn test_clean_input_is_same_slice() {
        let input = "déjà vu".as_bytes();
        match sanitize(input, Sanitize::Utf8) {
            Cow::Borrowed(out) => assert_eq!(out.as_ptr(), input.as_ptr()),
            Cow::Owned(_) => panic!("clean input must not be copied"),
        }
    }

    #[test]
    fn test_idempotent_on_repaired_output() {
        let once = utf16(b"\x91\xf0\x9f\x8e\x82 \xe5\xae\x89\x8d");
        assert_eq!(once, b" \xe5\xae\x89");
        assert_eq!(utf16(&once), once);
    }
}
