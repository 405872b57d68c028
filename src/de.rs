//! minibuf deserialization.
//!
//! Decoding runs in a fixed order, and the first failing step determines the
//! reported error:
//!
//! 1. **Header**: `[` decimal count `]`, else [`Error::MalformedHeader`]
//! 2. **Split**: the body is split on `;`; the segment count must equal the
//!    declared count, and the declared count must equal the target arity,
//!    else [`Error::FieldCountMismatch`]
//! 3. **Fields**: each segment is parsed with the grammar of its target type
//!
//! The target is either an explicit [`Shape`] ([`decode`](crate::decode)) or a
//! `T: Deserialize` ([`from_str`](crate::from_str)). In the serde path the
//! type requested for each field picks the grammar, so a struct with an `f64`
//! member parses that position as a float.
//!
//! ```rust
//! use minibuf::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Config<'a> {
//!     auto_restart: bool,
//!     id: i32,
//!     user_name: &'a str,
//!     score: f32,
//! }
//!
//! let config: Config = from_str("[4]F;42;test;99.500").unwrap();
//! assert_eq!(
//!     config,
//!     Config { auto_restart: false, id: 42, user_name: "test", score: 99.5 }
//! );
//! ```

use crate::format::{
    is_float_literal, is_integer_literal, parse_bool, parse_f32, parse_field, parse_float,
    parse_integer,
};
use crate::options::{DELIMITER, HEADER_CLOSE, HEADER_OPEN};
use crate::{CodecOptions, Error, Field, FieldType, Record, Result, Shape};
use serde::de::IntoDeserializer;
use serde::{de, forward_to_deserialize_any};

/// The header count and the body segments of an encoded record.
#[derive(Debug, PartialEq)]
pub(crate) struct Frame<'a> {
    pub declared: usize,
    pub segments: Vec<&'a str>,
}

/// Parses the `[N]` header and splits the body on the delimiter.
///
/// An empty body is zero segments when `N` is 0 and one empty segment
/// otherwise, so a record holding a single empty text field survives.
pub(crate) fn split_frame(input: &str) -> Result<Frame<'_>> {
    let rest = input
        .strip_prefix(HEADER_OPEN)
        .ok_or_else(|| Error::malformed_header(input, "missing '['"))?;
    let close = rest
        .find(HEADER_CLOSE)
        .ok_or_else(|| Error::malformed_header(input, "missing ']'"))?;
    let count = &rest[..close];
    if count.is_empty() {
        return Err(Error::malformed_header(input, "empty field count"));
    }
    if !count.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::malformed_header(
            input,
            "field count is not a decimal integer",
        ));
    }
    let declared: usize = count
        .parse()
        .map_err(|_| Error::malformed_header(input, "field count out of range"))?;

    let body = &rest[close + HEADER_CLOSE.len_utf8()..];
    let segments: Vec<&str> = if body.is_empty() && declared == 0 {
        Vec::new()
    } else {
        body.split(DELIMITER).collect()
    };
    if segments.len() != declared {
        return Err(Error::field_count_mismatch(declared, segments.len(), declared));
    }
    tracing::trace!(declared, "parsed record header");
    Ok(Frame { declared, segments })
}

/// Decodes `input` against `shape`.
pub(crate) fn decode_record(
    input: &str,
    shape: &Shape,
    options: &CodecOptions,
) -> Result<Record> {
    let Frame { declared, segments } = split_frame(input).map_err(|err| match err {
        Error::FieldCountMismatch {
            declared, actual, ..
        } => Error::field_count_mismatch(declared, actual, shape.arity()),
        other => other,
    })?;

    let defaults = if declared == shape.arity() {
        Vec::new()
    } else if options.fill_defaults && declared < shape.arity() {
        shape
            .trailing_defaults(declared)
            .ok_or_else(|| Error::field_count_mismatch(declared, declared, shape.arity()))?
    } else {
        return Err(Error::field_count_mismatch(declared, declared, shape.arity()));
    };

    let mut record = Record::with_capacity(shape.arity());
    for (index, (text, ty)) in segments.iter().zip(shape.types()).enumerate() {
        record.push(parse_field(text, ty, index, options.float_precision)?);
    }
    if !defaults.is_empty() {
        tracing::debug!(
            missing = defaults.len(),
            shape = %shape,
            "filled trailing fields from shape defaults"
        );
        for field in defaults {
            record.push(field);
        }
    }
    Ok(record)
}

/// The minibuf deserializer.
///
/// Parses one encoded record into a `T: Deserialize`. Structs, tuples and
/// tuple structs check the declared count against their own arity;
/// sequences take however many fields the header declares.
/// Created via [`Deserializer::from_str`].
pub struct Deserializer<'de> {
    input: &'de str,
    precision: usize,
}

impl<'de> Deserializer<'de> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Self {
        Self::with_options(input, &CodecOptions::default())
    }

    /// Reads floats with the grammar matching `options.float_precision`, so
    /// text written with precision 0 reads back.
    pub fn with_options(input: &'de str, options: &CodecOptions) -> Self {
        Deserializer {
            input,
            precision: options.float_precision,
        }
    }

    fn frame(&self, expected: Option<usize>) -> Result<Frame<'de>> {
        let frame = split_frame(self.input).map_err(|err| match (err, expected) {
            (
                Error::FieldCountMismatch {
                    declared, actual, ..
                },
                Some(expected),
            ) => Error::field_count_mismatch(declared, actual, expected),
            (other, _) => other,
        })?;
        if let Some(expected) = expected {
            if frame.declared != expected {
                return Err(Error::field_count_mismatch(
                    frame.declared,
                    frame.segments.len(),
                    expected,
                ));
            }
        }
        Ok(frame)
    }

    fn not_a_record(&self, found: &str) -> Error {
        Error::unsupported_type(&format!(
            "a record decodes into a struct, tuple or sequence, not {found}"
        ))
    }
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let frame = self.frame(None)?;
        visitor.visit_seq(FieldSeq::new(frame.segments, self.precision))
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let frame = self.frame(Some(len))?;
        visitor.visit_seq(FieldSeq::new(frame.segments, self.precision))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(fields.len(), visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.frame(Some(0))?;
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_bool<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("bool"))
    }

    fn deserialize_i8<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an integer"))
    }

    fn deserialize_i16<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an integer"))
    }

    fn deserialize_i32<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an integer"))
    }

    fn deserialize_i64<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an integer"))
    }

    fn deserialize_u8<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an integer"))
    }

    fn deserialize_u16<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an integer"))
    }

    fn deserialize_u32<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an integer"))
    }

    fn deserialize_u64<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an integer"))
    }

    fn deserialize_f32<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("a float"))
    }

    fn deserialize_f64<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("a float"))
    }

    fn deserialize_char<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("a char"))
    }

    fn deserialize_str<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("a string"))
    }

    fn deserialize_string<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("a string"))
    }

    fn deserialize_bytes<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("bytes"))
    }

    fn deserialize_byte_buf<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("bytes"))
    }

    fn deserialize_option<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an option"))
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("a map"))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an enum"))
    }

    fn deserialize_identifier<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_record("an identifier"))
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.frame(None)?;
        visitor.visit_unit()
    }
}

struct FieldSeq<'de> {
    iter: std::vec::IntoIter<&'de str>,
    index: usize,
    precision: usize,
}

impl<'de> FieldSeq<'de> {
    fn new(segments: Vec<&'de str>, precision: usize) -> Self {
        FieldSeq {
            iter: segments.into_iter(),
            index: 0,
            precision,
        }
    }
}

impl<'de> de::SeqAccess<'de> for FieldSeq<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(text) => {
                let index = self.index;
                self.index += 1;
                seed.deserialize(FieldDeserializer {
                    text,
                    index,
                    precision: self.precision,
                })
                .map(Some)
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Deserializes one field's text, using the grammar of the requested type.
struct FieldDeserializer<'de> {
    text: &'de str,
    index: usize,
    precision: usize,
}

impl<'de> FieldDeserializer<'de> {
    fn integer<T: TryFrom<i64>>(&self) -> Result<T> {
        let value = parse_integer(self.text, self.index)?;
        T::try_from(value)
            .map_err(|_| Error::invalid_field(FieldType::Integer, self.index, self.text))
    }

    fn nested(&self, what: &str) -> Error {
        Error::unsupported_type(&format!(
            "field {}: {what} cannot be a record field",
            self.index
        ))
    }
}

impl<'de> de::Deserializer<'de> for FieldDeserializer<'de> {
    type Error = Error;

    /// Self-describing targets get the narrowest type the text fits:
    /// `T`/`F`, then integer, then float, then text.
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Ok(b) = parse_bool(self.text, self.index) {
            visitor.visit_bool(b)
        } else if is_integer_literal(self.text) {
            visitor.visit_i64(parse_integer(self.text, self.index)?)
        } else if is_float_literal(self.text, self.precision) {
            visitor.visit_f64(parse_float(self.text, self.index, self.precision)?)
        } else {
            visitor.visit_borrowed_str(self.text)
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(parse_bool(self.text, self.index)?)
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i8(self.integer()?)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i16(self.integer()?)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i32(self.integer()?)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(self.integer()?)
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u8(self.integer()?)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u16(self.integer()?)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u32(self.integer()?)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(self.integer()?)
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f32(parse_f32(self.text, self.index, self.precision)?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f64(parse_float(self.text, self.index, self.precision)?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => visitor.visit_char(ch),
            _ => Err(Error::custom(format!(
                "field {}: expected a single character, found {:?}",
                self.index, self.text
            ))),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.text)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.text)
    }

    fn deserialize_bytes<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested("bytes"))
    }

    fn deserialize_byte_buf<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested("bytes"))
    }

    fn deserialize_option<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested("an optional value"))
    }

    fn deserialize_unit<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested("unit"))
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested(&format!("unit struct {name}")))
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested("a sequence"))
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested("a tuple"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested(&format!("tuple struct {name}")))
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested("a map"))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.nested(&format!("struct {name}")))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(self.text.into_deserializer())
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.text)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Deserializes a `T` from an already decoded [`Record`].
pub(crate) struct RecordDeserializer {
    fields: Vec<Field>,
}

impl RecordDeserializer {
    pub(crate) fn new(record: Record) -> Self {
        RecordDeserializer {
            fields: record.into_fields(),
        }
    }

    fn check_arity(&self, expected: usize) -> Result<()> {
        if self.fields.len() == expected {
            Ok(())
        } else {
            Err(Error::field_count_mismatch(
                self.fields.len(),
                self.fields.len(),
                expected,
            ))
        }
    }
}

impl<'de> de::Deserializer<'de> for RecordDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(FieldValueSeq {
            iter: self.fields.into_iter(),
        })
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_arity(len)?;
        self.deserialize_any(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(fields.len(), visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq map enum identifier ignored_any
    }
}

struct FieldValueSeq {
    iter: std::vec::IntoIter<Field>,
}

impl<'de> de::SeqAccess<'de> for FieldValueSeq {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(field) => seed.deserialize(FieldValueDeserializer { field }).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct FieldValueDeserializer {
    field: Field,
}

impl<'de> de::Deserializer<'de> for FieldValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.field {
            Field::Float(f) => visitor.visit_f64(f),
            Field::Integer(i) => visitor.visit_i64(i),
            Field::Boolean(b) => visitor.visit_bool(b),
            Field::Text(s) => visitor.visit_string(s),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.field {
            Field::Text(s) => visitor.visit_enum(s.into_deserializer()),
            other => Err(Error::custom(format!(
                "expected enum variant name, found {}",
                other.field_type()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}
