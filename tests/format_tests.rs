use serde_escsv::{sanitize, CsvOptions, Field, Reassembler, Sanitize, Serializer};
use std::borrow::Cow;

fn text_row(fields: &[&str]) -> Vec<Field> {
    fields.iter().map(|&f| Field::from(f)).collect()
}

fn reassemble(raw: &[&[u8]]) -> Vec<Vec<u8>> {
    let lines: Vec<Vec<u8>> = raw.iter().map(|l| l.to_vec()).collect();
    Reassembler::new(lines.into_iter())
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_only_field_with_space_is_quoted() {
    let line = Serializer::default().serialize(&text_row(&["ab", "20", "c d"]));
    assert_eq!(line, b"ab,20,\"c d\"\n");
}

#[test]
fn test_newline_escaped_and_whitespace_quoted() {
    let line = Serializer::default().serialize(&text_row(&["a ", " c\t", "e\n"]));
    assert_eq!(line, b"\"a \",\" c\t\",\"e\\\n\"\n");
}

#[test]
fn test_two_nulls_make_one_delimiter() {
    let line = Serializer::default().serialize(&[Field::Null, Field::Null]);
    assert_eq!(line, b",\n");
}

#[test]
fn test_truncated_lead_byte_sanitizes_to_empty() {
    assert_eq!(&*sanitize(b"\xc3", Sanitize::Utf8), b"");
}

#[test]
fn test_stray_continuation_byte_dropped() {
    assert_eq!(&*sanitize(b"\xe5\x8d\x90\x8d", Sanitize::Utf8), b"\xe5\x8d\x90");
}

#[test]
fn test_four_byte_sequence_depends_on_mode() {
    let cake = b"\xf0\x9f\x8e\x82";
    assert_eq!(&*sanitize(cake, Sanitize::Utf16), b"");
    match sanitize(cake, Sanitize::Utf8) {
        Cow::Borrowed(out) => assert_eq!(out.as_ptr(), cake.as_ptr()),
        Cow::Owned(_) => panic!("valid input must come back unchanged"),
    }
}

#[test]
fn test_odd_backslash_joins_lines() {
    assert_eq!(
        reassemble(&[b"field1,\\\n", b"field2\n"]),
        vec![b"field1,\\\nfield2\n".to_vec()]
    );
}

#[test]
fn test_even_backslash_keeps_lines_apart() {
    assert_eq!(
        reassemble(&[b"a,\\\\\n", b"b\n"]),
        vec![b"a,\\\\\n".to_vec(), b"b\n".to_vec()]
    );
}

#[test]
fn test_sanitized_rows_match_expected_lines() {
    let cases: &[(&[u8], &[u8])] = &[
        (b"\xc3", b"\n"),
        (b"\xc3 ", b"\" \"\n"),
        (b"\xe5\xae\x89\x8d", b"\xe5\xae\x89\n"),
        (b"\x90\x24\x90", b"\x24\n"),
        (b"\x90 \x45\xae", b"\" \x45\"\n"),
        (b"\xef\xbf\xbf", b"\n"),
        (b"\xed\x9f\xbf", b"\xed\x9f\xbf\n"),
        (b"\xed\xa0\x80", b"\n"),
        (b"\xff\xff\xff", b"\n"),
        (b"\xe5\x87\xb8-\xe5\x87", b"\xe5\x87\xb8-\n"),
    ];
    for mode in [Sanitize::Utf8, Sanitize::Utf16] {
        let serializer = Serializer::new(CsvOptions::new().with_sanitize(mode)).unwrap();
        for &(input, expected) in cases {
            let line = serializer.serialize(&[Field::from(input)]);
            assert_eq!(line, expected, "input {:?} in {:?} mode", input, mode);
        }
    }
}

#[test]
fn test_null_text_is_written_raw() {
    let options = CsvOptions::new().with_null_value("a b");
    let serializer = Serializer::new(options).unwrap();
    assert_eq!(serializer.serialize(&[Field::Null, Field::from("a b")]), b"a b,\"a b\"\n");
}

#[test]
fn test_pipeline_settings_escape_tab() {
    // Escape set used by the import pipeline: backslash, double quote, tab, newline.
    let options: CsvOptions = serde_json::from_str(
        r#"{"sanitize": "utf8", "null_value": "", "delimiter": ",", "escapes": "\\\"\t\n", "quote": "\""}"#,
    )
    .unwrap();
    let serializer = Serializer::new(options).unwrap();
    let line = serializer.serialize(&text_row(&["x\ty", "it's", "r\r"]));
    assert_eq!(line, b"\"x\\\ty\",\"it's\",\"r\r\"\n");
}
