//! minibuf serialization.
//!
//! Two paths produce encoded text:
//!
//! - **Explicit shape**: [`encode`](crate::encode) checks a [`Record`] against
//!   a [`Shape`](crate::Shape) and writes it.
//! - **Serde**: [`to_string`](crate::to_string) runs a `T: Serialize` through
//!   [`Serializer`], which flattens a struct, tuple or sequence of scalars
//!   into a [`Record`], and then writes that record.
//!
//! Scalars map onto field types as follows:
//!
//! | Rust | Field |
//! |------|-------|
//! | `f32`, `f64` | `Float` |
//! | `i8`..`i64`, `u8`..`u64` (up to `i64::MAX`) | `Integer` |
//! | `bool` | `Boolean` |
//! | `&str`, `String`, `char`, unit enum variants | `Text` |
//!
//! Anything nested (sequences inside a record, maps, `Option`) is rejected
//! with [`Error::UnsupportedType`].
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use minibuf::{Field, Serializer};
//! use serde::Serialize;
//!
//! let record = (1.5f64, 7u8, "seven").serialize(Serializer).unwrap();
//! assert_eq!(record.get(1), Some(&Field::Integer(7)));
//! ```

use crate::format::write_field;
use crate::options::{DELIMITER, HEADER_CLOSE, HEADER_OPEN};
use crate::{CodecOptions, Error, Field, Record, Result};
use serde::ser::Impossible;
use serde::{ser, Serialize};

/// Writes `record` as `[N]f1;...;fN`. Does not consult a shape.
pub(crate) fn write_record(record: &Record, options: &CodecOptions) -> Result<String> {
    // Header plus a typical float width per field.
    let mut output = String::with_capacity(4 + record.len() * 8);
    output.push(HEADER_OPEN);
    output.push_str(&record.len().to_string());
    output.push(HEADER_CLOSE);
    for (index, field) in record.iter().enumerate() {
        if index > 0 {
            output.push(DELIMITER);
        }
        write_field(&mut output, index, field, options.float_precision)?;
    }
    Ok(output)
}

/// The minibuf serializer.
///
/// Turns a `T: Serialize` into a [`Record`]. Only compound values with scalar
/// members (structs, tuples, tuple structs, sequences) form records; a unit
/// or unit struct is the empty record.
pub struct Serializer;

fn not_a_record(found: &str) -> Error {
    Error::unsupported_type(&format!(
        "a record must be a struct, tuple or sequence, found {found}"
    ))
}

impl ser::Serializer for Serializer {
    type Ok = Record;
    type Error = Error;

    type SerializeSeq = SerializeRecord;
    type SerializeTuple = SerializeRecord;
    type SerializeTupleStruct = SerializeRecord;
    type SerializeTupleVariant = Impossible<Record, Error>;
    type SerializeMap = Impossible<Record, Error>;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = Impossible<Record, Error>;

    fn serialize_bool(self, _v: bool) -> Result<Record> {
        Err(not_a_record("bool"))
    }

    fn serialize_i8(self, _v: i8) -> Result<Record> {
        Err(not_a_record("integer"))
    }

    fn serialize_i16(self, _v: i16) -> Result<Record> {
        Err(not_a_record("integer"))
    }

    fn serialize_i32(self, _v: i32) -> Result<Record> {
        Err(not_a_record("integer"))
    }

    fn serialize_i64(self, _v: i64) -> Result<Record> {
        Err(not_a_record("integer"))
    }

    fn serialize_u8(self, _v: u8) -> Result<Record> {
        Err(not_a_record("integer"))
    }

    fn serialize_u16(self, _v: u16) -> Result<Record> {
        Err(not_a_record("integer"))
    }

    fn serialize_u32(self, _v: u32) -> Result<Record> {
        Err(not_a_record("integer"))
    }

    fn serialize_u64(self, _v: u64) -> Result<Record> {
        Err(not_a_record("integer"))
    }

    fn serialize_f32(self, _v: f32) -> Result<Record> {
        Err(not_a_record("float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Record> {
        Err(not_a_record("float"))
    }

    fn serialize_char(self, _v: char) -> Result<Record> {
        Err(not_a_record("char"))
    }

    fn serialize_str(self, _v: &str) -> Result<Record> {
        Err(not_a_record("string"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Record> {
        Err(not_a_record("bytes"))
    }

    fn serialize_none(self) -> Result<Record> {
        Err(not_a_record("none"))
    }

    fn serialize_some<T>(self, _value: &T) -> Result<Record>
    where
        T: ?Sized + Serialize,
    {
        Err(not_a_record("option"))
    }

    fn serialize_unit(self) -> Result<Record> {
        Ok(Record::new())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Record> {
        Ok(Record::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Record> {
        Err(not_a_record(&format!("enum variant {variant}")))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Record>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Record>
    where
        T: ?Sized + Serialize,
    {
        Err(not_a_record(&format!("enum variant {variant}")))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(not_a_record(&format!("enum variant {variant}")))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::unsupported_type(
            "maps have no fixed shape; use a struct instead",
        ))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord::new(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(not_a_record(&format!("enum variant {variant}")))
    }
}

/// Collects the members of a compound value into a [`Record`].
pub struct SerializeRecord {
    fields: Vec<Field>,
}

impl SerializeRecord {
    fn new(capacity: usize) -> Self {
        SerializeRecord {
            fields: Vec::with_capacity(capacity),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let index = self.fields.len();
        let field = value.serialize(FieldSerializer { index })?;
        self.fields.push(field);
        Ok(())
    }
}

impl ser::SerializeSeq for SerializeRecord {
    type Ok = Record;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Record> {
        Ok(Record::from(self.fields))
    }
}

impl ser::SerializeTuple for SerializeRecord {
    type Ok = Record;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Record> {
        Ok(Record::from(self.fields))
    }
}

impl ser::SerializeTupleStruct for SerializeRecord {
    type Ok = Record;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Record> {
        Ok(Record::from(self.fields))
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = Record;
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    // Fields are positional, so a skipped field would shift every later one.
    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        Err(Error::unsupported_type(&format!(
            "field {} ({key}) was skipped; records need every field present",
            self.fields.len()
        )))
    }

    fn end(self) -> Result<Record> {
        Ok(Record::from(self.fields))
    }
}

/// Serializes one member of a record into a [`Field`].
struct FieldSerializer {
    index: usize,
}

impl FieldSerializer {
    fn nested(&self, what: &str) -> Error {
        Error::unsupported_type(&format!(
            "field {}: {what} cannot be a record field",
            self.index
        ))
    }
}

impl ser::Serializer for FieldSerializer {
    type Ok = Field;
    type Error = Error;

    type SerializeSeq = Impossible<Field, Error>;
    type SerializeTuple = Impossible<Field, Error>;
    type SerializeTupleStruct = Impossible<Field, Error>;
    type SerializeTupleVariant = Impossible<Field, Error>;
    type SerializeMap = Impossible<Field, Error>;
    type SerializeStruct = Impossible<Field, Error>;
    type SerializeStructVariant = Impossible<Field, Error>;

    fn serialize_bool(self, v: bool) -> Result<Field> {
        Ok(Field::Boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Field> {
        Ok(Field::Integer(v as i64))
    }

    fn serialize_i16(self, v: i16) -> Result<Field> {
        Ok(Field::Integer(v as i64))
    }

    fn serialize_i32(self, v: i32) -> Result<Field> {
        Ok(Field::Integer(v as i64))
    }

    fn serialize_i64(self, v: i64) -> Result<Field> {
        Ok(Field::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Field> {
        Ok(Field::Integer(v as i64))
    }

    fn serialize_u16(self, v: u16) -> Result<Field> {
        Ok(Field::Integer(v as i64))
    }

    fn serialize_u32(self, v: u32) -> Result<Field> {
        Ok(Field::Integer(v as i64))
    }

    fn serialize_u64(self, v: u64) -> Result<Field> {
        i64::try_from(v).map(Field::Integer).map_err(|_| {
            Error::unsupported_type(&format!(
                "field {}: integer {v} exceeds i64::MAX",
                self.index
            ))
        })
    }

    fn serialize_f32(self, v: f32) -> Result<Field> {
        Ok(Field::Float(v as f64))
    }

    fn serialize_f64(self, v: f64) -> Result<Field> {
        Ok(Field::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Field> {
        Ok(Field::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Field> {
        Ok(Field::Text(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Field> {
        Err(self.nested("bytes"))
    }

    fn serialize_none(self) -> Result<Field> {
        Err(self.nested("an optional value"))
    }

    // Options have no wire form, present or not.
    fn serialize_some<T>(self, _value: &T) -> Result<Field>
    where
        T: ?Sized + Serialize,
    {
        Err(self.nested("an optional value"))
    }

    fn serialize_unit(self) -> Result<Field> {
        Err(self.nested("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Field> {
        Err(self.nested(&format!("unit struct {name}")))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Field> {
        Ok(Field::Text(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Field>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Field>
    where
        T: ?Sized + Serialize,
    {
        Err(self.nested(&format!("enum variant {variant} with data")))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(self.nested("a sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(self.nested("a tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(self.nested(&format!("tuple struct {name}")))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.nested(&format!("enum variant {variant} with data")))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.nested("a map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(self.nested(&format!("struct {name}")))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.nested(&format!("enum variant {variant} with data")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Vector {
        x: f32,
        y: f32,
        z: f32,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Mode {
        Fast,
    }

    #[derive(Serialize)]
    struct Nested {
        id: u32,
        inner: Vec<u8>,
    }

    #[test]
    fn test_write_record() {
        let text = write_record(&record![1.234, 5.678, 9.012], &CodecOptions::default()).unwrap();
        assert_eq!(text, "[3]1.234;5.678;9.012");
        assert_eq!(write_record(&Record::new(), &CodecOptions::default()).unwrap(), "[0]");
    }

    #[test]
    fn test_struct_becomes_record() {
        let record = Vector {
            x: 1.5,
            y: -2.0,
            z: 0.25,
        }
        .serialize(Serializer)
        .unwrap();
        assert_eq!(record, record![1.5, -2.0, 0.25]);
    }

    #[test]
    fn test_scalar_mapping() {
        let record = ('c', Mode::Fast, u64::MAX >> 1, true)
            .serialize(Serializer)
            .unwrap();
        assert_eq!(record, record!["c", "fast", i64::MAX, true]);
    }

    #[test]
    fn test_rejects_non_records() {
        assert!(matches!(
            42.serialize(Serializer),
            Err(Error::UnsupportedType(_))
        ));
        assert!(matches!(
            Nested {
                id: 1,
                inner: vec![1]
            }
            .serialize(Serializer),
            Err(Error::UnsupportedType(_))
        ));
        assert!(matches!(
            (u64::MAX,).serialize(Serializer),
            Err(Error::UnsupportedType(_))
        ));
        assert!(matches!(
            (None::<i32>,).serialize(Serializer),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[derive(Serialize)]
    struct Reading {
        id: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        value: f64,
    }

    #[test]
    fn test_skipped_field_is_rejected() {
        let reading = Reading {
            id: 1,
            note: None,
            value: 0.5,
        };
        let err = reading.serialize(Serializer).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(ref msg) if msg.contains("note")));
    }

    #[test]
    fn test_unit_is_empty_record() {
        assert_eq!(().serialize(Serializer).unwrap(), Record::new());
    }
}
