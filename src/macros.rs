/// Builds a [`Record`](crate::Record) from a list of expressions.
///
/// Each expression is converted with `Field::from`, so floats become `Float`,
/// integers `Integer`, booleans `Boolean` and strings `Text`.
///
/// ```rust
/// use minibuf::{record, Field};
///
/// let vector = record![1.234, 5.678, 9.012];
/// assert_eq!(vector.get(0), Some(&Field::Float(1.234)));
///
/// let empty = record![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };

    ($($field:expr),+ $(,)?) => {
        $crate::Record::from(vec![$($crate::Field::from($field)),+])
    };
}

#[cfg(test)]
mod tests {
    use crate::{Field, Record};

    #[test]
    fn test_record_macro_empty() {
        assert_eq!(record![], Record::new());
    }

    #[test]
    fn test_record_macro_mixed() {
        let name = String::from("test");
        let config = record![false, 42, name, 99.5,];
        assert_eq!(
            config.into_fields(),
            vec![
                Field::Boolean(false),
                Field::Integer(42),
                Field::Text("test".to_string()),
                Field::Float(99.5),
            ]
        );
    }
}
