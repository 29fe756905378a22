//! Basic escaped CSV serialization.
//!
//! Run with: cargo run --example simple

use serde::Serialize;
use serde_escsv::{to_string, Field, Serializer};
use std::error::Error;

#[derive(Debug, Serialize)]
struct PetLicense {
    license_number: String,
    animal_name: Option<String>,
    species: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let licenses = vec![
        PetLicense {
            license_number: "S107948".to_string(),
            animal_name: Some("Zen".to_string()),
            species: "Cat".to_string(),
        },
        PetLicense {
            license_number: "S116503".to_string(),
            animal_name: Some("Mr. \"Biscuit\"\nthe 2nd".to_string()),
            species: "Dog".to_string(),
        },
        PetLicense {
            license_number: "83024".to_string(),
            animal_name: None,
            species: "Goat".to_string(),
        },
    ];

    println!("Struct rows:");
    for license in &licenses {
        print!("{}", to_string(license)?);
    }

    // Records can also be built field by field
    let serializer = Serializer::default();
    let line = serializer.serialize(&[Field::from("ab"), Field::from(20), Field::from("c d")]);
    println!("\nHand-built record:\n{}", String::from_utf8(line)?);

    Ok(())
}
