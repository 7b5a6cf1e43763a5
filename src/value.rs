//! Scalar values accepted by `param`, `header`, `cookie` and body entries.

use std::fmt;

/// A parameter, header, cookie or body value: text or an integer.
///
/// Integers are rendered in base 10 when the value is stored, so every
/// container in this crate holds plain strings.
///
/// ```
/// use httpctx::Value;
///
/// assert_eq!(Value::from(42).into_string(), "42");
/// assert_eq!(Value::from("iphone").into_string(), "iphone");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A text value, stored as given.
    Text(String),
    /// An integer value.
    Integer(i128),
}

impl Value {
    /// Canonicalize into the stored string form.
    pub fn into_string(self) -> String {
        match self {
            Value::Text(s) => s,
            Value::Integer(n) => n.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

macro_rules! integer_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Integer(i128::from(n))
                }
            }
        )*
    };
}

integer_value!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        // usize is at most 64 bits on every supported target.
        Value::Integer(n as i128)
    }
}

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        Value::Integer(n as i128)
    }
}
