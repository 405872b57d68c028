//! Typed fields and records.
//!
//! A [`Record`] is an ordered sequence of [`Field`]s. Each field carries one of
//! four closed types, named by [`FieldType`]:
//!
//! | Type | Rust value | Encoded as |
//! |------|------------|------------|
//! | `Float` | `f64` | fixed-point, three fractional digits by default |
//! | `Integer` | `i64` | base-10, sign only if negative |
//! | `Boolean` | `bool` | `T` or `F` |
//! | `Text` | `String` | verbatim, no `;`, `[` or `]` |
//!
//! ## Examples
//!
//! ```rust
//! use minibuf::{record, Field, FieldType};
//!
//! let config = record![false, 42, "test", 99.5];
//! assert_eq!(config.len(), 4);
//! assert_eq!(config.get(1), Some(&Field::Integer(42)));
//! assert_eq!(config.get(2).map(Field::field_type), Some(FieldType::Text));
//! ```

use crate::{Error, Shape};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The type tag of a [`Field`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Float,
    Integer,
    Boolean,
    Text,
}

impl FieldType {
    /// Returns the lowercase name used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::Float => "float",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Text => "text",
        }
    }

    /// Returns the keyword that declares this type in a schema file.
    #[must_use]
    pub const fn schema_keyword(&self) -> &'static str {
        match self {
            FieldType::Float => "float",
            FieldType::Integer => "number",
            FieldType::Boolean => "bool",
            FieldType::Text => "string",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = Error;

    /// Accepts both schema keywords (`number`, `bool`, `string`) and the
    /// display names (`integer`, `boolean`, `text`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use minibuf::FieldType;
    ///
    /// assert_eq!("number".parse::<FieldType>().unwrap(), FieldType::Integer);
    /// assert_eq!("text".parse::<FieldType>().unwrap(), FieldType::Text);
    /// assert!("double".parse::<FieldType>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(FieldType::Float),
            "number" | "integer" => Ok(FieldType::Integer),
            "bool" | "boolean" => Ok(FieldType::Boolean),
            "string" | "text" => Ok(FieldType::Text),
            other => Err(Error::custom(format!("unknown field type '{other}'"))),
        }
    }
}

/// A single typed value within a record.
///
/// # Examples
///
/// ```rust
/// use minibuf::{Field, FieldType};
///
/// let score = Field::from(99.5);
/// assert_eq!(score.field_type(), FieldType::Float);
/// assert_eq!(score.as_f64(), Some(99.5));
/// assert_eq!(score.as_i64(), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    Float(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl Field {
    /// Returns the type tag of this field.
    #[inline]
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Field::Float(_) => FieldType::Float,
            Field::Integer(_) => FieldType::Integer,
            Field::Boolean(_) => FieldType::Boolean,
            Field::Text(_) => FieldType::Text,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Field::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Field::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Field::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Float(v) => write!(f, "{}", v),
            Field::Integer(i) => write!(f, "{}", i),
            Field::Boolean(b) => write!(f, "{}", b),
            Field::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Float(f) => serializer.serialize_f64(*f),
            Field::Integer(i) => serializer.serialize_i64(*i),
            Field::Boolean(b) => serializer.serialize_bool(*b),
            Field::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Field::Boolean(value)
    }
}

impl From<i8> for Field {
    fn from(value: i8) -> Self {
        Field::Integer(value as i64)
    }
}

impl From<i16> for Field {
    fn from(value: i16) -> Self {
        Field::Integer(value as i64)
    }
}

impl From<i32> for Field {
    fn from(value: i32) -> Self {
        Field::Integer(value as i64)
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Integer(value)
    }
}

impl From<u8> for Field {
    fn from(value: u8) -> Self {
        Field::Integer(value as i64)
    }
}

impl From<u16> for Field {
    fn from(value: u16) -> Self {
        Field::Integer(value as i64)
    }
}

impl From<u32> for Field {
    fn from(value: u32) -> Self {
        Field::Integer(value as i64)
    }
}

impl From<f32> for Field {
    fn from(value: f32) -> Self {
        Field::Float(value as f64)
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Float(value)
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Text(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_string())
    }
}

/// An ordered collection of fields.
///
/// A record does not know its shape; the shape is supplied alongside it to
/// [`encode`](crate::encode) and checked there.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Record(Vec<Field>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Record(Vec::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Record(Vec::with_capacity(capacity))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, field: impl Into<Field>) {
        self.0.push(field.into());
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Field> {
        self.0.get(index)
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_fields(self) -> Vec<Field> {
        self.0
    }

    /// Derives the anonymous shape this record conforms to.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use minibuf::{record, FieldType};
    ///
    /// let shape = record![1.0, 2, "x"].shape();
    /// assert_eq!(
    ///     shape.types().collect::<Vec<_>>(),
    ///     vec![FieldType::Float, FieldType::Integer, FieldType::Text]
    /// );
    /// ```
    #[must_use]
    pub fn shape(&self) -> Shape {
        Shape::new(self.0.iter().map(Field::field_type))
    }

    /// Pairs each field with its name in `shape`, preserving order.
    ///
    /// Returns [`Error::ShapeMismatch`] when the record does not conform to
    /// the shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use minibuf::{record, FieldType, Shape};
    ///
    /// let shape = Shape::named("Vector")
    ///     .with_field("x", FieldType::Float)
    ///     .with_field("y", FieldType::Float);
    /// let named = record![1.0, 2.0].to_named(&shape).unwrap();
    /// assert_eq!(named.keys().collect::<Vec<_>>(), vec!["x", "y"]);
    /// ```
    pub fn to_named(&self, shape: &Shape) -> crate::Result<IndexMap<String, Field>> {
        shape.check(self)?;
        Ok(shape
            .fields()
            .iter()
            .zip(self.0.iter())
            .map(|(def, field)| (def.name().to_string(), field.clone()))
            .collect())
    }
}

impl From<Vec<Field>> for Record {
    fn from(fields: Vec<Field>) -> Self {
        Record(fields)
    }
}

impl FromIterator<Field> for Record {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Record(iter.into_iter().collect())
    }
}

impl IntoIterator for Record {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for field in &self.0 {
            seq.serialize_element(field)?;
        }
        seq.end()
    }
}
