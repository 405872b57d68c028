//! Loads shapes from a `.mb` schema file and encodes records by name.
//!
//! Run with: cargo run --example schema_file [path/to/schema.mb]

use minibuf::{record, Schema};
use std::env;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/demos/mellon.mb").to_string());
    let schema = Schema::from_file(&path)?;

    println!("Shapes in {}:", path);
    for shape in schema.shapes() {
        let fields: Vec<_> = shape.field_names().collect();
        println!("  {} ({})", shape, fields.join(", "));
    }

    let text = schema.encode("Config", &record![true, 7, "sensor-a", 21.75])?;
    println!("\nEncoded Config: {}", text);

    let legacy = schema.decode("Config", "[3]F;8;sensor-b")?;
    let shape = schema.shape("Config").ok_or("Config shape missing")?;
    println!("Legacy Config, defaults filled:");
    for (name, value) in legacy.to_named(shape)? {
        println!("  {} = {}", name, value);
    }

    Ok(())
}
