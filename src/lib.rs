//! # minibuf
//!
//! A compact text codec for fixed-shape typed records.
//!
//! ## What is minibuf?
//!
//! minibuf turns a record with a known shape (a 3-component vector, a
//! configuration block, ...) into one line of text and back. The line carries
//! the field count up front and the fields in order:
//!
//! ```text
//! [3]1.234;5.678;9.012
//! [4]F;42;test;99.500
//! ```
//!
//! Producer and consumer agree on the shape ahead of time; the text carries
//! no field names or type tags.
//!
//! ## Key Features
//!
//! - **Explicit shapes**: [`encode`] and [`decode`] take a [`Shape`], so every
//!   field is parsed with the grammar of its declared type
//! - **Serde compatible**: [`to_string`] and [`from_str`] bind the shape
//!   statically through `#[derive(Serialize, Deserialize)]`
//! - **Schema files**: [`Schema`] loads named shapes, field defaults and the
//!   float precision from `.mb` files
//! - **Typed errors**: every rejection names the failing step and carries the
//!   offending input
//!
//! ## Quick Start
//!
//! ### Explicit shape
//!
//! ```rust
//! use minibuf::{decode, encode, record, FieldType, Shape};
//!
//! let shape = Shape::new([FieldType::Float; 3]);
//! let vector = record![1.234, 5.678, 9.012];
//!
//! let text = encode(&vector, &shape).unwrap();
//! assert_eq!(text, "[3]1.234;5.678;9.012");
//!
//! let back = decode(&text, &shape).unwrap();
//! assert_eq!(back, vector);
//! ```
//!
//! ### Derived shape
//!
//! ```rust
//! use minibuf::{from_str, to_string};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Config {
//!     auto_restart: bool,
//!     id: i32,
//!     user_name: String,
//!     score: f64,
//! }
//!
//! let config = Config {
//!     auto_restart: false,
//!     id: 42,
//!     user_name: "test".to_string(),
//!     score: 99.5,
//! };
//!
//! let text = to_string(&config).unwrap();
//! assert_eq!(text, "[4]F;42;test;99.500");
//!
//! let back: Config = from_str(&text).unwrap();
//! assert_eq!(back, config);
//! ```
//!
//! ## Encoding Rules
//!
//! | Type | Text form |
//! |------|-----------|
//! | Float | fixed-point, three fractional digits, ties away from zero |
//! | Integer | base 10, no leading zeros, `-` only if negative |
//! | Boolean | `T` or `F` |
//! | Text | verbatim; `;`, `[` and `]` are rejected |
//!
//! ## Thread Safety
//!
//! Encoding and decoding are pure functions of their inputs. Nothing is
//! cached or shared between calls, and every public type is `Send + Sync`.

pub mod de;
pub mod error;
pub mod macros;
pub mod options;
pub mod schema;
pub mod ser;
pub mod shape;
pub mod value;

mod format;

pub use de::Deserializer;
pub use error::{Error, Result};
pub use options::CodecOptions;
pub use schema::Schema;
pub use ser::Serializer;
pub use shape::{FieldDef, Shape};
pub use value::{Field, FieldType, Record};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;

/// Encodes `record` as `[N]f1;...;fN` after checking it against `shape`.
///
/// # Examples
///
/// ```rust
/// use minibuf::{encode, record, FieldType, Shape};
///
/// let shape = Shape::new([
///     FieldType::Boolean,
///     FieldType::Integer,
///     FieldType::Text,
///     FieldType::Float,
/// ]);
/// let text = encode(&record![false, 42, "test", 99.5], &shape).unwrap();
/// assert_eq!(text, "[4]F;42;test;99.500");
/// ```
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the record's arity or field types do
/// not match `shape`, if a text field contains `;`, `[` or `]`, or if a float
/// is NaN or infinite.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(record: &Record, shape: &Shape) -> Result<String> {
    encode_with_options(record, shape, &CodecOptions::default())
}

/// Encodes `record` against `shape` with custom options.
///
/// # Errors
///
/// Same as [`encode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_with_options(record: &Record, shape: &Shape, options: &CodecOptions) -> Result<String> {
    shape.check(record)?;
    let text = ser::write_record(record, options)?;
    tracing::trace!(shape = %shape, len = text.len(), "encoded record");
    Ok(text)
}

/// Decodes one encoded record, parsing each field as the type `shape`
/// declares at its position.
///
/// # Examples
///
/// ```rust
/// use minibuf::{decode, Error, FieldType, Shape};
///
/// let shape = Shape::new([FieldType::Float; 3]);
/// let record = decode("[3]1.234;5.678;9.012", &shape).unwrap();
/// assert_eq!(record.get(2).and_then(|f| f.as_f64()), Some(9.012));
///
/// let err = decode("[3]1.234;abc;9.012", &shape).unwrap_err();
/// assert!(matches!(err, Error::InvalidFloat { index: 1, .. }));
/// ```
///
/// # Errors
///
/// Returns [`Error::MalformedHeader`], [`Error::FieldCountMismatch`],
/// [`Error::InvalidFloat`], [`Error::InvalidInteger`] or
/// [`Error::InvalidBoolean`], whichever step fails first. No partial record
/// is returned.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(text: &str, shape: &Shape) -> Result<Record> {
    decode_with_options(text, shape, &CodecOptions::default())
}

/// Decodes one encoded record against `shape` with custom options.
///
/// With [`CodecOptions::fill_defaults`] set, a record that stops short of the
/// shape's arity is completed from the shape's field defaults.
///
/// # Errors
///
/// Same as [`decode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_options(text: &str, shape: &Shape, options: &CodecOptions) -> Result<Record> {
    let record = de::decode_record(text, shape, options)?;
    tracing::trace!(shape = %shape, fields = record.len(), "decoded record");
    Ok(record)
}

/// Serialize any `T: Serialize` to a minibuf string.
///
/// `T` must be a struct, tuple, tuple struct or sequence whose members are
/// scalars.
///
/// # Examples
///
/// ```rust
/// use minibuf::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Vector { x: f32, y: f32, z: f32 }
///
/// let text = to_string(&Vector { x: 1.0, y: -0.5, z: 2.25 }).unwrap();
/// assert_eq!(text, "[3]1.000;-0.500;2.250");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for values with no flat record form and
/// [`Error::ShapeMismatch`] for text containing reserved characters or
/// non-finite floats.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &CodecOptions::default())
}

/// Serialize any `T: Serialize` to a minibuf string with custom options.
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &CodecOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    ser::write_record(&to_record(value)?, options)
}

/// Convert any `T: Serialize` to a [`Record`].
///
/// # Examples
///
/// ```rust
/// use minibuf::{record, to_record};
///
/// let record = to_record(&(true, 3u8, "x")).unwrap();
/// assert_eq!(record, record![true, 3, "x"]);
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value has no flat record form.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_record<T>(value: &T) -> Result<Record>
where
    T: ?Sized + Serialize,
{
    value.serialize(Serializer)
}

/// Serialize any `T: Serialize` to a writer as one minibuf line (no newline).
///
/// # Examples
///
/// ```rust
/// use minibuf::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &(1.0f64, 2.0f64)).unwrap();
/// assert_eq!(buffer, b"[2]1.000;2.000");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, &CodecOptions::default())
}

/// Serialize any `T: Serialize` to a writer with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: &CodecOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from one encoded record.
///
/// # Examples
///
/// ```rust
/// use minibuf::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Vector { x: f64, y: f64, z: f64 }
///
/// let v: Vector = from_str("[3]1.234;5.678;9.012").unwrap();
/// assert_eq!(v, Vector { x: 1.234, y: 5.678, z: 9.012 });
/// ```
///
/// # Errors
///
/// Returns the same error kinds as [`decode`], with the arity taken from `T`,
/// or [`Error::UnsupportedType`] if `T` is not a flat record type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_str(s);
    T::deserialize(&mut deserializer)
}

/// Deserialize an instance of type `T` from one encoded record with custom
/// options.
///
/// Use the options the text was written with: at precision 0 floats carry
/// no fractional part, which the default grammar rejects.
///
/// # Examples
///
/// ```rust
/// use minibuf::{from_str, from_str_with_options, to_string_with_options, CodecOptions};
///
/// let options = CodecOptions::new().with_float_precision(0);
/// let text = to_string_with_options(&(2.5f64,), &options).unwrap();
/// assert_eq!(text, "[1]3");
///
/// let back: (f64,) = from_str_with_options(&text, &options).unwrap();
/// assert_eq!(back, (3.0,));
/// assert!(from_str::<(f64,)>(&text).is_err());
/// ```
///
/// # Errors
///
/// Same as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<'a, T>(s: &'a str, options: &CodecOptions) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::with_options(s, options);
    T::deserialize(&mut deserializer)
}

/// Deserialize an instance of type `T` from an I/O stream holding one record.
///
/// A single trailing line break is ignored, so a line written by
/// `writeln!` reads back.
///
/// # Examples
///
/// ```rust
/// use minibuf::from_reader;
/// use std::io::Cursor;
///
/// let pair: (i64, bool) = from_reader(Cursor::new(b"[2]-7;T\n")).unwrap();
/// assert_eq!(pair, (-7, true));
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the text does not decode into `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    let line = string
        .strip_suffix("\r\n")
        .or_else(|| string.strip_suffix('\n'))
        .unwrap_or(&string);
    from_str(line)
}

/// Deserialize an instance of type `T` from bytes of encoded text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or do not decode into `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Convert a [`Record`] into any `T: Deserialize`, matching fields by position.
///
/// # Examples
///
/// ```rust
/// use minibuf::{from_record, record};
///
/// let (flag, id): (bool, u16) = from_record(record![true, 7]).unwrap();
/// assert_eq!((flag, id), (true, 7));
/// ```
///
/// # Errors
///
/// Returns [`Error::FieldCountMismatch`] if `T` has a different arity, or a
/// custom error if a field's type does not fit its target.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_record<T>(record: Record) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(de::RecordDeserializer::new(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Vector {
        x: f64,
        y: f64,
        z: f64,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Config {
        auto_restart: bool,
        id: i32,
        user_name: String,
        score: f64,
    }

    fn config_shape() -> Shape {
        Shape::named("Config")
            .with_field("auto_restart", FieldType::Boolean)
            .with_field("id", FieldType::Integer)
            .with_field("user_name", FieldType::Text)
            .with_field("score", FieldType::Float)
    }

    #[test]
    fn test_serialize_deserialize_vector() {
        let vector = Vector {
            x: 1.234,
            y: 5.678,
            z: 9.012,
        };
        let text = to_string(&vector).unwrap();
        assert_eq!(text, "[3]1.234;5.678;9.012");
        let vector_back: Vector = from_str(&text).unwrap();
        assert_eq!(vector, vector_back);
    }

    #[test]
    fn test_serde_and_shape_paths_agree() {
        let config = Config {
            auto_restart: true,
            id: -3,
            user_name: "Ted Balkjfa".to_string(),
            score: 100.0,
        };
        let via_serde = to_string(&config).unwrap();
        let record = to_record(&config).unwrap();
        let via_shape = encode(&record, &config_shape()).unwrap();
        assert_eq!(via_serde, via_shape);
        assert_eq!(via_serde, "[4]T;-3;Ted Balkjfa;100.000");

        let decoded = decode(&via_shape, &config_shape()).unwrap();
        let config_back: Config = from_record(decoded).unwrap();
        assert_eq!(config_back, config);
    }

    #[test]
    fn test_encode_rejects_wrong_shape() {
        let vector_shape = Shape::new([FieldType::Float; 3]);
        let record = record![false, 42, "test", 99.5];
        assert!(matches!(
            encode(&record, &vector_shape),
            Err(Error::ShapeMismatch(_))
        ));
        assert!(matches!(
            encode(&record![1.0, 2.0, 3], &vector_shape),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_custom_precision() {
        let options = CodecOptions::new().with_float_precision(0);
        let text = to_string_with_options(&(2.5f64, -7.0f64), &options).unwrap();
        assert_eq!(text, "[2]3;-7");
        let back: (f64, f64) = from_str_with_options(&text, &options).unwrap();
        assert_eq!(back, (3.0, -7.0));
        assert!(matches!(
            from_str::<(f64, f64)>(&text),
            Err(Error::InvalidFloat { index: 0, .. })
        ));
    }

    #[test]
    fn test_from_slice_rejects_invalid_utf8() {
        let result: Result<(i32,)> = from_slice(&[b'[', b'1', b']', 0xff]);
        assert!(matches!(result, Err(Error::Custom(_))));
    }
}
