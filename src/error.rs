//! Error types for minibuf encoding and decoding.
//!
//! Decoding failures name the step that rejected the input:
//!
//! - **Header**: the `[N]` prefix is missing or its count is not a decimal integer
//! - **Count**: the declared count, the body's field count and the shape arity disagree
//! - **Field grammar**: a field's text does not match the grammar of its type
//!
//! Encoding failures are caller-contract violations and surface as
//! [`Error::ShapeMismatch`].
//!
//! ## Examples
//!
//! ```rust
//! use minibuf::{decode, Error, FieldType, Shape};
//!
//! let shape = Shape::new([FieldType::Float; 3]);
//! let err = decode("[3]1.234;5.678", &shape).unwrap_err();
//! assert!(matches!(err, Error::FieldCountMismatch { declared: 3, actual: 2, .. }));
//! ```

use crate::FieldType;
use std::fmt;
use thiserror::Error;

/// Everything that can go wrong while encoding, decoding or loading a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The `[N]` header is absent or its count is not a valid non-negative integer.
    #[error("Malformed header: {reason} (input: {input:?})")]
    MalformedHeader { input: String, reason: String },

    /// Declared count, delimiter-separated count and shape arity disagree.
    #[error(
        "Field count mismatch: header declares {declared}, body has {actual}, shape expects {expected}"
    )]
    FieldCountMismatch {
        declared: usize,
        actual: usize,
        expected: usize,
    },

    #[error("Invalid float at field {index}: {text:?}")]
    InvalidFloat { index: usize, text: String },

    #[error("Invalid integer at field {index}: {text:?}")]
    InvalidInteger { index: usize, text: String },

    #[error("Invalid boolean at field {index}: {text:?} (expected T or F)")]
    InvalidBoolean { index: usize, text: String },

    /// The record handed to the encoder does not fit the shape it was paired with.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A serde value that has no flat record representation.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Syntax or validation error in a schema file.
    #[error("Schema error at line {line}: {msg}")]
    Schema { line: usize, msg: String },

    #[error("Unknown shape: {0}")]
    UnknownShape(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a header error, keeping the offending input for the message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use minibuf::Error;
    ///
    /// let err = Error::malformed_header("3]1.0", "missing '['");
    /// assert!(err.to_string().contains("missing '['"));
    /// ```
    pub fn malformed_header(input: &str, reason: &str) -> Self {
        Error::MalformedHeader {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn field_count_mismatch(declared: usize, actual: usize, expected: usize) -> Self {
        Error::FieldCountMismatch {
            declared,
            actual,
            expected,
        }
    }

    /// Creates the grammar error matching `ty` for the field at `index`.
    ///
    /// Only the parsers call this. Text has no grammar, so a `Text` request
    /// falls back to [`Error::Custom`].
    pub(crate) fn invalid_field(ty: FieldType, index: usize, text: &str) -> Self {
        let text = text.to_string();
        match ty {
            FieldType::Float => Error::InvalidFloat { index, text },
            FieldType::Integer => Error::InvalidInteger { index, text },
            FieldType::Boolean => Error::InvalidBoolean { index, text },
            FieldType::Text => Error::Custom(format!("text field {index} cannot be invalid")),
        }
    }

    /// Creates a shape mismatch error for an arity disagreement.
    pub fn arity_mismatch(expected: usize, found: usize) -> Self {
        Error::ShapeMismatch(format!(
            "shape has {expected} fields, record has {found}"
        ))
    }

    /// Creates a shape mismatch error for a field of the wrong type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use minibuf::{Error, FieldType};
    ///
    /// let err = Error::type_mismatch(1, FieldType::Integer, FieldType::Text);
    /// assert!(err.to_string().contains("expected integer, found text"));
    /// ```
    pub fn type_mismatch(index: usize, expected: FieldType, found: FieldType) -> Self {
        Error::ShapeMismatch(format!(
            "field {index}: expected {expected}, found {found}"
        ))
    }

    pub fn shape_mismatch<T: fmt::Display>(msg: T) -> Self {
        Error::ShapeMismatch(msg.to_string())
    }

    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    pub fn schema(line: usize, msg: &str) -> Self {
        Error::Schema {
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_picks_variant() {
        assert!(matches!(
            Error::invalid_field(FieldType::Float, 2, "abc"),
            Error::InvalidFloat { index: 2, .. }
        ));
        assert!(matches!(
            Error::invalid_field(FieldType::Integer, 0, "1.5"),
            Error::InvalidInteger { index: 0, .. }
        ));
        assert!(matches!(
            Error::invalid_field(FieldType::Boolean, 1, "true"),
            Error::InvalidBoolean { index: 1, .. }
        ));
        assert!(matches!(
            Error::invalid_field(FieldType::Text, 4, "x"),
            Error::Custom(_)
        ));
    }

    #[test]
    fn test_messages_carry_offending_input() {
        let err = Error::invalid_field(FieldType::Boolean, 3, "true");
        let msg = err.to_string();
        assert!(msg.contains("field 3"));
        assert!(msg.contains("\"true\""));

        let err = Error::field_count_mismatch(3, 2, 3);
        assert!(err.to_string().contains("header declares 3, body has 2"));
    }
}
