//! Customizing delimiter, null text, escapes and UTF-8 repair.
//!
//! Run with: cargo run --example custom_options

use serde_escsv::{CsvOptions, EscapeSet, Field, Sanitize, Serializer};
use std::error::Error;

fn show(label: &str, serializer: &Serializer, record: &[Field]) {
    let line = serializer.serialize(record);
    println!("{:<14} {:?}", label, String::from_utf8_lossy(&line));
}

fn main() -> Result<(), Box<dyn Error>> {
    let record = vec![
        Field::from("tab\there"),
        Field::Null,
        Field::from(&b"broken \xe5\xae\x89\x8d utf-8"[..]),
        Field::from("cake \u{1F382}"),
    ];

    show("default", &Serializer::default(), &record);

    let tsv = CsvOptions::new().with_delimiter('\t').with_null_value("\\N");
    show("tsv", &Serializer::new(tsv)?, &record);

    let strict = CsvOptions::sanitized();
    show("utf8", &Serializer::new(strict)?, &record);

    let utf16 = CsvOptions::new()
        .with_sanitize(Sanitize::Utf16)
        .with_escapes(EscapeSet::new(['\\', '"', '\t', '\n'])?);
    show("utf16+escapes", &Serializer::new(utf16)?, &record);

    // Settings can live in a config file
    let from_json: CsvOptions = serde_json::from_str(r#"{"delimiter": "|", "sanitize": "utf8"}"#)?;
    show("from json", &Serializer::new(from_json)?, &record);

    // A quote that is never escaped would make quoted fields ambiguous
    let ambiguous = CsvOptions::new().with_quote('|');
    if let Err(err) = Serializer::new(ambiguous) {
        println!("\nrejected: {}", err);
    }

    Ok(())
}
