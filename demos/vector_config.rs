//! Encodes the reference Vector and Config records and compares the text
//! size against JSON.
//!
//! Run with: RUST_LOG=minibuf=trace cargo run --example vector_config

use minibuf::{decode, encode, from_str, to_string, FieldType, Shape};
use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Vector {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Config {
    auto_restart: bool,
    id: i32,
    user_name: String,
    score: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let vector = Vector {
        x: 1.234,
        y: 5.678,
        z: 9.012,
    };
    let config = Config {
        auto_restart: false,
        id: 42,
        user_name: "test".to_string(),
        score: 99.5,
    };

    let vector_text = to_string(&vector)?;
    let config_text = to_string(&config)?;
    println!("Serialized Vector: {}", vector_text);
    println!("Serialized Config: {}", config_text);

    let vector_back: Vector = from_str(&vector_text)?;
    let config_back: Config = from_str(&config_text)?;
    assert_eq!(vector, vector_back);
    assert_eq!(config, config_back);
    println!("Parsed Vector: {:?}", vector_back);
    println!("Parsed Config: {:?}", config_back);

    let json = serde_json::to_string(&config)?;
    println!(
        "\nminibuf: {} bytes, JSON: {} bytes ({})",
        config_text.len(),
        json.len(),
        json
    );

    // Without a derived type the shape is spelled out explicitly.
    let shape = Shape::new([FieldType::Float; 3]);
    let record = decode(&vector_text, &shape)?;
    assert_eq!(encode(&record, &shape)?, vector_text);

    match decode("[3]1.234;abc;9.012", &shape) {
        Ok(record) => println!("unexpected success: {:?}", record),
        Err(e) => println!("\nRejected: {}", e),
    }
    match decode("[3]1.234;5.678", &shape) {
        Ok(record) => println!("unexpected success: {:?}", record),
        Err(e) => println!("Rejected: {}", e),
    }

    Ok(())
}
