//! Property-based tests for the codec laws.
//!
//! Generated records are restricted to values that survive the text form:
//! floats already rounded to three fractional digits, text without the
//! reserved characters.

use minibuf::{decode, encode, from_str, to_string, Field, FieldType, Record, Shape};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Config {
    auto_restart: bool,
    id: i64,
    user_name: String,
    score: f64,
}

fn float_field() -> impl Strategy<Value = f64> {
    (-1_000_000_000i64..1_000_000_000).prop_map(|milli| milli as f64 / 1000.0)
}

fn text_field() -> impl Strategy<Value = String> {
    "[^;\\[\\]]{0,16}"
}

fn field() -> impl Strategy<Value = Field> {
    prop_oneof![
        float_field().prop_map(Field::Float),
        any::<i64>().prop_map(Field::Integer),
        any::<bool>().prop_map(Field::Boolean),
        text_field().prop_map(Field::Text),
    ]
}

fn record() -> impl Strategy<Value = Record> {
    prop::collection::vec(field(), 0..12).prop_map(Record::from)
}

fn field_type() -> impl Strategy<Value = FieldType> {
    prop_oneof![
        Just(FieldType::Float),
        Just(FieldType::Integer),
        Just(FieldType::Boolean),
        Just(FieldType::Text),
    ]
}

proptest! {
    #[test]
    fn prop_round_trip(record in record()) {
        let shape = record.shape();
        let text = encode(&record, &shape).unwrap();
        prop_assert_eq!(decode(&text, &shape).unwrap(), record);
    }

    #[test]
    fn prop_reencode_is_idempotent(record in record()) {
        let shape = record.shape();
        let text = encode(&record, &shape).unwrap();
        let again = encode(&decode(&text, &shape).unwrap(), &shape).unwrap();
        prop_assert_eq!(again, text);
    }

    #[test]
    fn prop_any_float_renders_three_digits(value in -1e12f64..1e12) {
        let text = encode(&Record::from(vec![Field::Float(value)]), &Shape::new([FieldType::Float])).unwrap();
        let body = text.strip_prefix("[1]").unwrap();
        let (_, frac) = body.split_once('.').unwrap();
        prop_assert_eq!(frac.len(), 3);
        // Reencoding the rounded value is stable.
        let shape = Shape::new([FieldType::Float]);
        let again = encode(&decode(&text, &shape).unwrap(), &shape).unwrap();
        prop_assert_eq!(again, text);
    }

    #[test]
    fn prop_header_consistency(declared in 0usize..20, body in prop::collection::vec("[a-z]{1,3}", 1..20)) {
        prop_assume!(declared != body.len());
        let input = format!("[{}]{}", declared, body.join(";"));
        let shape = Shape::new(vec![FieldType::Text; declared]);
        let is_count_mismatch = matches!(
            decode(&input, &shape),
            Err(minibuf::Error::FieldCountMismatch { .. })
        );
        prop_assert!(is_count_mismatch, "{}", input);
    }

    #[test]
    fn prop_boolean_rejects_non_canonical(text in "[a-zA-Z0-9]{1,5}") {
        prop_assume!(text != "T" && text != "F");
        let shape = Shape::new([FieldType::Boolean]);
        let rejected = decode(&format!("[1]{}", text), &shape).is_err();
        prop_assert!(rejected);
    }

    #[test]
    fn prop_decode_never_panics(input in "\\PC{0,40}", types in prop::collection::vec(field_type(), 0..6)) {
        let _ = decode(&input, &Shape::new(types));
    }

    #[test]
    fn prop_serde_round_trip(
        auto_restart in any::<bool>(),
        id in any::<i64>(),
        user_name in text_field(),
        score in float_field(),
    ) {
        let config = Config { auto_restart, id, user_name, score };
        let text = to_string(&config).unwrap();
        let back: Config = from_str(&text).unwrap();
        prop_assert_eq!(back, config);
    }
}
