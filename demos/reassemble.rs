//! Reading escaped CSV back: reassemble lines, then split fields.
//!
//! Run with: cargo run --example reassemble

use serde_escsv::{parse_line, Field, Reassembler, Writer};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_record(&[Field::from("1"), Field::from("first line\nsecond line")])?;
    writer.write_record(&[Field::from("2"), Field::from("ends with \\")])?;
    writer.write_record(&[Field::from("3"), Field::from("plain")])?;
    let file = writer.into_inner()?;

    println!("Naive split sees {} lines", file.split(|&b| b == b'\n').count() - 1);

    let lines = Reassembler::from_reader(&file[..]);
    for line in lines {
        let fields = parse_line(&line?)?;
        let fields: Vec<String> = fields
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect();
        println!("{:?}", fields);
    }

    Ok(())
}
