//! Named shapes loaded from `.mb` schema files.
//!
//! A schema file declares record kinds by name, with typed fields and
//! optional defaults, plus a few codec directives:
//!
//! ```text
//! # shapes shared by the firmware and the dashboard
//! config float_precision = 3;
//!
//! Vector {
//!   x: float;
//!   y: float;
//!   z: float;
//! }
//!
//! Config {
//!   auto_restart: bool;
//!   id: number;
//!   user_name: string;
//!   score: float = 0.0;   // filled in when older producers omit it
//! }
//! ```
//!
//! Field types are `float`, `number`, `bool` and `string`. Directives sit
//! outside blocks as `key = value;`, optionally prefixed by `config`. The
//! codec reads `float_precision` and `fill_defaults`; any other key is kept
//! as a raw string and available through [`Schema::config`].
//!
//! ## Examples
//!
//! ```rust
//! use minibuf::{record, Schema};
//!
//! let schema = Schema::parse("Vector {\n  x: float;\n  y: float;\n  z: float;\n}\n").unwrap();
//! let text = schema.encode("Vector", &record![1.234, 5.678, 9.012]).unwrap();
//! assert_eq!(text, "[3]1.234;5.678;9.012");
//! assert_eq!(schema.decode("Vector", &text).unwrap().len(), 3);
//! ```

use crate::format::{is_float_literal, is_integer_literal};
use crate::options::{DELIMITER, HEADER_CLOSE, HEADER_OPEN, MAX_FLOAT_PRECISION};
use crate::{CodecOptions, Error, Field, FieldDef, FieldType, Record, Result, Shape};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// File extension required by [`Schema::from_file`].
pub const SCHEMA_EXTENSION: &str = "mb";

const CONFIG_KEYWORD: &str = "config";
const FLOAT_PRECISION_KEY: &str = "float_precision";
const FILL_DEFAULTS_KEY: &str = "fill_defaults";

/// A set of named shapes and codec directives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    config: IndexMap<String, String>,
    shapes: IndexMap<String, Shape>,
    options: CodecOptions,
}

impl Schema {
    /// Parses schema source text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] with the 1-based line number for unknown
    /// types, duplicate shape or field names, malformed lines, defaults that
    /// do not parse as their field's type, bad directive values and blocks
    /// left open at end of input.
    pub fn parse(source: &str) -> Result<Self> {
        let mut schema = Schema::default();
        let mut open: Option<(usize, Shape)> = None;

        for (number, raw) in source.lines().enumerate() {
            let line_no = number + 1;
            let line = strip_comment(raw);
            if line.is_empty() {
                continue;
            }

            match open.take() {
                Some((start, mut shape)) => {
                    if line == "}" {
                        schema.insert_shape(start, shape)?;
                    } else {
                        shape.push(parse_field_line(line_no, line, &shape)?);
                        open = Some((start, shape));
                    }
                }
                None => {
                    if let Some(head) = line.strip_suffix('{') {
                        open = Some((line_no, Shape::named(shape_name(line_no, head)?)));
                    } else if let Some(head) = line.strip_suffix("{}") {
                        let shape = Shape::named(shape_name(line_no, head)?);
                        schema.insert_shape(line_no, shape)?;
                    } else if line.contains('=') {
                        schema.apply_directive(line_no, line)?;
                    } else {
                        return Err(Error::schema(
                            line_no,
                            &format!("expected a shape block or a directive, found {line:?}"),
                        ));
                    }
                }
            }
        }

        if let Some((start, shape)) = open {
            let name = shape.name().unwrap_or_default().to_string();
            return Err(Error::schema(
                start,
                &format!("block '{name}' is never closed"),
            ));
        }

        tracing::debug!(
            shapes = schema.shapes.len(),
            directives = schema.config.len(),
            "parsed schema"
        );
        Ok(schema)
    }

    /// Reads and parses a schema file. The path must end in `.mb`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the extension is wrong or the file cannot be
    /// read, and any error of [`Schema::parse`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().and_then(|ext| ext.to_str()) != Some(SCHEMA_EXTENSION) {
            return Err(Error::io(&format!(
                "schema file must have a .{SCHEMA_EXTENSION} extension: {}",
                path.display()
            )));
        }
        let source = fs::read_to_string(path)
            .map_err(|e| Error::io(&format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loading schema file");
        Self::parse(&source)
    }

    /// Looks up a shape by name.
    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.shapes.get(name)
    }

    /// Iterates over the shapes in declaration order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes.values()
    }

    /// Returns the raw value of a directive.
    pub fn config(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Codec options derived from the file's directives.
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Encodes `record` with the shape called `name` and this schema's options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownShape`] if no such shape exists, otherwise the
    /// errors of [`crate::encode`].
    pub fn encode(&self, name: &str, record: &Record) -> Result<String> {
        crate::encode_with_options(record, self.require(name)?, &self.options)
    }

    /// Decodes `text` with the shape called `name` and this schema's options.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use minibuf::{Field, Schema};
    ///
    /// let source = "fill_defaults = true;\nReading {\n  id: number;\n  value: float = -1.0;\n}\n";
    /// let schema = Schema::parse(source).unwrap();
    /// let record = schema.decode("Reading", "[1]7").unwrap();
    /// assert_eq!(record.get(1), Some(&Field::Float(-1.0)));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownShape`] if no such shape exists, otherwise the
    /// errors of [`crate::decode`].
    pub fn decode(&self, name: &str, text: &str) -> Result<Record> {
        crate::decode_with_options(text, self.require(name)?, &self.options)
    }

    fn require(&self, name: &str) -> Result<&Shape> {
        self.shape(name)
            .ok_or_else(|| Error::UnknownShape(name.to_string()))
    }

    fn insert_shape(&mut self, line: usize, shape: Shape) -> Result<()> {
        let name = shape.name().unwrap_or_default().to_string();
        if self.shapes.contains_key(&name) {
            return Err(Error::schema(line, &format!("duplicate shape name '{name}'")));
        }
        tracing::trace!(shape = %shape, "declared shape");
        self.shapes.insert(name, shape);
        Ok(())
    }

    fn apply_directive(&mut self, line: usize, text: &str) -> Result<()> {
        let text = text.strip_suffix(DELIMITER).unwrap_or(text);
        let (key, value) = text
            .split_once('=')
            .ok_or_else(|| Error::schema(line, "directive needs '='"))?;
        let key = key.trim();
        let key = key
            .strip_prefix(CONFIG_KEYWORD)
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .map_or(key, str::trim_start);
        let value = value.trim();

        if !is_identifier(key) {
            return Err(Error::schema(line, &format!("invalid directive name {key:?}")));
        }

        match key {
            FLOAT_PRECISION_KEY => {
                self.options.float_precision = value
                    .parse::<usize>()
                    .ok()
                    .filter(|&precision| precision <= MAX_FLOAT_PRECISION)
                    .ok_or_else(|| {
                        Error::schema(
                            line,
                            &format!(
                                "float_precision must be an integer from 0 to {MAX_FLOAT_PRECISION}, found {value:?}"
                            ),
                        )
                    })?;
            }
            FILL_DEFAULTS_KEY => {
                self.options.fill_defaults = parse_bool_literal(value).ok_or_else(|| {
                    Error::schema(
                        line,
                        &format!("fill_defaults must be true or false, found {value:?}"),
                    )
                })?;
            }
            _ => {}
        }
        self.config.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Trims the line and drops `#` and `//` comment lines and trailing `//`
/// comments.
///
/// On a line terminated by `;` a comment can only follow the `;`, so values
/// such as `http://host` stay intact. Elsewhere `//` opens a comment when it
/// follows whitespace.
fn strip_comment(raw: &str) -> &str {
    let line = raw.trim();
    if line.starts_with('#') || line.starts_with("//") {
        return "";
    }
    let comment = match line.find(DELIMITER) {
        Some(end) => line[end..].find("//").map(|at| end + at),
        None => line
            .match_indices("//")
            .map(|(at, _)| at)
            .find(|&at| line[..at].ends_with(char::is_whitespace)),
    };
    match comment {
        Some(at) => line[..at].trim_end(),
        None => line,
    }
}

fn shape_name(line: usize, head: &str) -> Result<&str> {
    let name = head.trim();
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(Error::schema(line, &format!("invalid shape name {name:?}")))
    }
}

/// Parses `name: type;` or `name: type = default;`.
fn parse_field_line(line: usize, text: &str, shape: &Shape) -> Result<FieldDef> {
    let text = text.strip_suffix(DELIMITER).unwrap_or(text).trim_end();
    let (name, rest) = text
        .split_once(':')
        .ok_or_else(|| Error::schema(line, &format!("expected 'name: type;', found {text:?}")))?;
    let name = name.trim();
    if !is_identifier(name) {
        return Err(Error::schema(line, &format!("invalid field name {name:?}")));
    }
    if shape.index_of(name).is_some() {
        return Err(Error::schema(
            line,
            &format!(
                "duplicate field name '{name}' in shape '{}'",
                shape.name().unwrap_or_default()
            ),
        ));
    }

    let (keyword, default) = match rest.split_once('=') {
        Some((keyword, default)) => (keyword.trim(), Some(default.trim())),
        None => (rest.trim(), None),
    };
    let ty = type_for_keyword(keyword)
        .ok_or_else(|| Error::schema(line, &format!("unknown type '{keyword}' for field '{name}'")))?;

    let def = FieldDef::new(name, ty);
    match default {
        Some(text) => {
            let value = parse_default(ty, text).ok_or_else(|| {
                Error::schema(
                    line,
                    &format!("default {text:?} for field '{name}' is not a valid {keyword}"),
                )
            })?;
            def.with_default(value)
                .map_err(|e| Error::schema(line, &e.to_string()))
        }
        None => Ok(def),
    }
}

fn type_for_keyword(keyword: &str) -> Option<FieldType> {
    [
        FieldType::Float,
        FieldType::Integer,
        FieldType::Boolean,
        FieldType::Text,
    ]
    .into_iter()
    .find(|ty| ty.schema_keyword() == keyword)
}

/// Defaults use schema literals (`true`, `1.5`, `0`, `-3`), not wire text.
fn parse_default(ty: FieldType, text: &str) -> Option<Field> {
    match ty {
        FieldType::Float if is_float_literal(text, 0) => {
            text.parse::<f64>().ok().filter(|v| v.is_finite()).map(Field::Float)
        }
        FieldType::Integer if is_integer_literal(text) => text.parse().ok().map(Field::Integer),
        FieldType::Boolean => parse_bool_literal(text).map(Field::Boolean),
        FieldType::Text if !text.contains(&[DELIMITER, HEADER_OPEN, HEADER_CLOSE][..]) => {
            Some(Field::Text(text.to_string()))
        }
        _ => None,
    }
}

fn parse_bool_literal(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
