//! Shape descriptors.
//!
//! A [`Shape`] names the arity of a record kind and the type expected at each
//! position. Encoder and decoder both take one: the encoder checks the record
//! against it, the decoder uses it to pick the grammar for each field.
//!
//! Shapes are either anonymous, built from a list of types, or named with
//! named fields as declared in a schema file:
//!
//! ```rust
//! use minibuf::{Field, FieldDef, FieldType, Shape};
//!
//! let vector = Shape::new([FieldType::Float; 3]);
//! assert_eq!(vector.arity(), 3);
//!
//! let config = Shape::named("Config")
//!     .with_field("auto_restart", FieldType::Boolean)
//!     .with_field("id", FieldType::Integer)
//!     .with_field("user_name", FieldType::Text)
//!     .with_def(FieldDef::new("score", FieldType::Float).with_default(Field::Float(0.0)).unwrap());
//! assert_eq!(config.name(), Some("Config"));
//! assert_eq!(config.index_of("score"), Some(3));
//! ```

use crate::{Error, Field, FieldType, Record, Result};
use std::fmt;

/// One position of a shape: a name, a type and an optional default.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    name: String,
    ty: FieldType,
    default: Option<Field>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        FieldDef {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// Attaches a default value, used when decoding short records with
    /// [`CodecOptions::fill_defaults`](crate::CodecOptions::fill_defaults).
    ///
    /// The default must have the field's own type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use minibuf::{Field, FieldDef, FieldType};
    ///
    /// assert!(FieldDef::new("score", FieldType::Float).with_default(Field::Float(0.0)).is_ok());
    /// assert!(FieldDef::new("score", FieldType::Float).with_default(Field::Integer(0)).is_err());
    /// ```
    pub fn with_default(mut self, default: Field) -> Result<Self> {
        if default.field_type() != self.ty {
            return Err(Error::shape_mismatch(format!(
                "default for '{}': expected {}, found {}",
                self.name,
                self.ty,
                default.field_type()
            )));
        }
        self.default = Some(default);
        Ok(self)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    #[inline]
    #[must_use]
    pub fn default(&self) -> Option<&Field> {
        self.default.as_ref()
    }
}

/// An ordered list of field definitions describing one record kind.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Shape {
    name: Option<String>,
    fields: Vec<FieldDef>,
}

impl Shape {
    /// Creates an anonymous shape from a list of types.
    ///
    /// Fields are named by their position (`"0"`, `"1"`, ...).
    pub fn new<I>(types: I) -> Self
    where
        I: IntoIterator<Item = FieldType>,
    {
        let fields = types
            .into_iter()
            .enumerate()
            .map(|(i, ty)| FieldDef::new(i.to_string(), ty))
            .collect();
        Shape { name: None, fields }
    }

    /// Creates an empty named shape; add fields with [`Shape::with_field`].
    pub fn named(name: impl Into<String>) -> Self {
        Shape {
            name: Some(name.into()),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    #[must_use]
    pub fn with_def(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    pub fn push(&mut self, def: FieldDef) {
        self.fields.push(def);
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    #[must_use]
    pub fn field_type(&self, index: usize) -> Option<FieldType> {
        self.fields.get(index).map(FieldDef::field_type)
    }

    pub fn types(&self) -> impl Iterator<Item = FieldType> + '_ {
        self.fields.iter().map(FieldDef::field_type)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(FieldDef::name)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|def| def.name == name)
    }

    /// Verifies that `record` has this shape's arity and per-position types.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use minibuf::{record, FieldType, Shape};
    ///
    /// let shape = Shape::new([FieldType::Boolean, FieldType::Integer]);
    /// assert!(shape.check(&record![true, 1]).is_ok());
    /// assert!(shape.check(&record![1, true]).is_err());
    /// assert!(shape.check(&record![true]).is_err());
    /// ```
    pub fn check(&self, record: &Record) -> Result<()> {
        if record.len() != self.arity() {
            return Err(Error::arity_mismatch(self.arity(), record.len()));
        }
        for (index, (def, field)) in self.fields.iter().zip(record.iter()).enumerate() {
            if def.ty != field.field_type() {
                return Err(Error::type_mismatch(index, def.ty, field.field_type()));
            }
        }
        Ok(())
    }

    /// Returns the defaults for every field from `start` on, or `None` if any
    /// of them lacks a default.
    pub(crate) fn trailing_defaults(&self, start: usize) -> Option<Vec<Field>> {
        self.fields
            .get(start..)?
            .iter()
            .map(|def| def.default.clone())
            .collect()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{} ", name)?;
        }
        f.write_str("[")?;
        for (i, def) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", def.ty)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Shape {
        Shape::named("Config")
            .with_field("auto_restart", FieldType::Boolean)
            .with_field("id", FieldType::Integer)
            .with_field("user_name", FieldType::Text)
            .with_def(
                FieldDef::new("score", FieldType::Float)
                    .with_default(Field::Float(6000.0))
                    .unwrap(),
            )
    }

    #[test]
    fn test_anonymous_fields_named_by_position() {
        let shape = Shape::new([FieldType::Float, FieldType::Text]);
        assert_eq!(shape.name(), None);
        assert_eq!(shape.field_names().collect::<Vec<_>>(), vec!["0", "1"]);
        assert_eq!(shape.field_type(1), Some(FieldType::Text));
        assert_eq!(shape.field_type(2), None);
    }

    #[test]
    fn test_check_reports_first_bad_position() {
        let record = Record::from(vec![
            Field::Boolean(true),
            Field::Text("7".to_string()),
            Field::Integer(3),
            Field::Float(1.0),
        ]);
        let err = config().check(&record).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch("field 1: expected integer, found text".to_string())
        );
    }

    #[test]
    fn test_trailing_defaults() {
        let shape = config();
        assert_eq!(shape.trailing_defaults(3), Some(vec![Field::Float(6000.0)]));
        assert_eq!(shape.trailing_defaults(4), Some(vec![]));
        assert_eq!(shape.trailing_defaults(2), None);
        assert_eq!(shape.trailing_defaults(5), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            config().to_string(),
            "Config [boolean, integer, text, float]"
        );
        assert_eq!(Shape::new([FieldType::Float; 2]).to_string(), "[float, float]");
    }
}
