//! Configuration options for the minibuf codec.
//!
//! The wire grammar itself is fixed (`[N]` header, `;` delimiter); options
//! only tune how floats are rendered and how strictly short records are
//! treated on decode.
//!
//! ## Examples
//!
//! ```rust
//! use minibuf::{encode_with_options, record, CodecOptions};
//!
//! let record = record![1.5, -2.25];
//! let options = CodecOptions::new().with_float_precision(1);
//! let text = encode_with_options(&record, &record.shape(), &options).unwrap();
//! assert_eq!(text, "[2]1.5;-2.3");
//! ```

/// Opening bracket of the count header.
pub const HEADER_OPEN: char = '[';

/// Closing bracket of the count header.
pub const HEADER_CLOSE: char = ']';

/// Separator between fields in the body.
pub const DELIMITER: char = ';';

/// Fractional digits used for floats unless configured otherwise.
pub const DEFAULT_FLOAT_PRECISION: usize = 3;

/// Largest useful float precision: the exact decimal expansion of any finite
/// `f64` has at most this many fractional digits.
pub const MAX_FLOAT_PRECISION: usize = 1074;

/// Configuration options for encoding and decoding.
///
/// # Examples
///
/// ```rust
/// use minibuf::CodecOptions;
///
/// let options = CodecOptions::new();
/// assert_eq!(options.float_precision, 3);
/// assert!(!options.fill_defaults);
///
/// let lenient = CodecOptions::new().with_fill_defaults(true);
/// assert!(lenient.fill_defaults);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    /// Number of digits rendered after the decimal point of a float.
    pub float_precision: usize,
    /// Whether the decoder may complete short records from shape defaults.
    pub fill_defaults: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            float_precision: DEFAULT_FLOAT_PRECISION,
            fill_defaults: false,
        }
    }
}

impl CodecOptions {
    /// Creates default options (three fractional digits, strict field counts).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of fractional digits rendered for floats.
    ///
    /// A precision of 0 renders floats without a decimal point, and the
    /// decoder then also accepts floats written as bare integers. Values
    /// above [`MAX_FLOAT_PRECISION`] are clamped to it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use minibuf::CodecOptions;
    ///
    /// let options = CodecOptions::new().with_float_precision(6);
    /// assert_eq!(options.float_precision, 6);
    ///
    /// let clamped = CodecOptions::new().with_float_precision(usize::MAX);
    /// assert_eq!(clamped.float_precision, minibuf::options::MAX_FLOAT_PRECISION);
    /// ```
    #[must_use]
    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = precision.min(MAX_FLOAT_PRECISION);
        self
    }

    /// Lets the decoder accept records that stop short of the shape's arity,
    /// provided every missing trailing field declares a default.
    #[must_use]
    pub fn with_fill_defaults(mut self, fill: bool) -> Self {
        self.fill_defaults = fill;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_precision_is_capped() {
        let options = CodecOptions::new().with_float_precision(4_294_967_295);
        assert_eq!(options.float_precision, MAX_FLOAT_PRECISION);
        let options = CodecOptions::new().with_float_precision(MAX_FLOAT_PRECISION);
        assert_eq!(options.float_precision, MAX_FLOAT_PRECISION);
        assert_eq!(CodecOptions::new().with_float_precision(0).float_precision, 0);
    }
}
