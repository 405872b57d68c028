use minibuf::{record, Error, Field, FieldType, Schema};
use std::fs;
use std::path::PathBuf;

const MELLON: &str = "\
# filename: mellon.mb

config float_precision = 3;

Vector {
  x: float;
  y: float;
  z: float;
}

Config {
  auto_restart: bool;
  id: number;
  user_name: string;
  score: float = 0.0;      // default value for backward compatibility
}
";

fn temp_schema(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("minibuf-{}-{name}", std::process::id()));
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn test_schema_round_trip() {
    let schema = Schema::parse(MELLON).unwrap();

    let vector = record![1.234, 5.678, 9.012];
    let text = schema.encode("Vector", &vector).unwrap();
    assert_eq!(text, "[3]1.234;5.678;9.012");
    assert_eq!(schema.decode("Vector", &text).unwrap(), vector);

    let config = record![false, 42, "test", 99.5];
    let text = schema.encode("Config", &config).unwrap();
    assert_eq!(text, "[4]F;42;test;99.500");
    assert_eq!(schema.decode("Config", &text).unwrap(), config);
}

#[test]
fn test_schema_precision_applies() {
    let source = MELLON.replace("float_precision = 3", "float_precision = 1");
    let schema = Schema::parse(&source).unwrap();
    let text = schema.encode("Vector", &record![1.25, 5.678, -0.04]).unwrap();
    assert_eq!(text, "[3]1.3;5.7;0.0");
}

#[test]
fn test_schema_fill_defaults() {
    let source = format!("fill_defaults = true;\n{MELLON}");
    let schema = Schema::parse(&source).unwrap();
    let record = schema.decode("Config", "[3]T;7;legacy").unwrap();
    assert_eq!(record, record![true, 7, "legacy", 0.0]);

    // Without the directive the short record is rejected.
    let strict = Schema::parse(MELLON).unwrap();
    assert!(matches!(
        strict.decode("Config", "[3]T;7;legacy"),
        Err(Error::FieldCountMismatch { expected: 4, .. })
    ));
}

#[test]
fn test_named_view() {
    let schema = Schema::parse(MELLON).unwrap();
    let shape = schema.shape("Config").unwrap();
    let record = schema.decode("Config", "[4]T;-1;root;0.500").unwrap();

    let named = record.to_named(shape).unwrap();
    let pairs: Vec<(&str, &Field)> = named.iter().map(|(k, v)| (k.as_str(), v)).collect();
    assert_eq!(
        pairs,
        vec![
            ("auto_restart", &Field::Boolean(true)),
            ("id", &Field::Integer(-1)),
            ("user_name", &Field::Text("root".to_string())),
            ("score", &Field::Float(0.5)),
        ]
    );

    let vector = schema.shape("Vector").unwrap();
    assert!(matches!(
        record.to_named(vector),
        Err(Error::ShapeMismatch(_))
    ));
}

#[test]
fn test_schema_types_by_keyword() {
    let schema = Schema::parse(MELLON).unwrap();
    let types: Vec<FieldType> = schema.shape("Config").unwrap().types().collect();
    assert_eq!(
        types,
        vec![
            FieldType::Boolean,
            FieldType::Integer,
            FieldType::Text,
            FieldType::Float
        ]
    );

    // Display names are not schema keywords.
    let err = Schema::parse("A {\n  n: integer;\n}\n").unwrap_err();
    assert!(matches!(err, Error::Schema { line: 2, .. }));
}

#[test]
fn test_schema_from_file() {
    let path = temp_schema("mellon.mb", MELLON);
    let schema = Schema::from_file(&path).unwrap();
    assert_eq!(schema.shapes().count(), 2);
    fs::remove_file(&path).unwrap();

    let path = temp_schema("mellon.txt", MELLON);
    let err = Schema::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_schema_error_message() {
    let err = Schema::parse("Vector {\n  x: float;\n  x: float;\n}\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Schema error at line 3: duplicate field name 'x' in shape 'Vector'"
    );
}

#[test]
fn test_schema_rejects_unbounded_precision() {
    let err = Schema::parse("float_precision = 4294967295;\nV {\n  x: float;\n}\n").unwrap_err();
    assert!(matches!(err, Error::Schema { line: 1, .. }));

    let schema = Schema::parse("float_precision = 1074;\nV {\n  x: float;\n}\n").unwrap();
    let text = schema.encode("V", &record![0.5]).unwrap();
    assert_eq!(text.len(), "[1]0.".len() + 1074);
    assert_eq!(schema.decode("V", &text).unwrap(), record![0.5]);
}

#[test]
fn test_schema_text_default_with_slashes() {
    let source = "\
fill_defaults = true;
Link {
  id: number;
  url: string = http://x;   // landing page
}
";
    let schema = Schema::parse(source).unwrap();
    let record = schema.decode("Link", "[1]3").unwrap();
    assert_eq!(record, record![3, "http://x"]);
}
