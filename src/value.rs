use std::convert::{TryFrom, TryInto};
use std::{collections::HashMap, error, fmt};

/// A plain, JSON-representable value produced by serialization.
///
/// The tree only ever contains objects, arrays and atomic primitives, so it
/// can be handed to any JSON encoder as-is.
#[derive(PartialEq, Clone, Debug)]
#[allow(missing_docs)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

impl Value {
    /// Cast value to a str.
    ///
    /// Returns `Some(&str)` if value is a `Value::String`, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(ref s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert to `String`.
    pub fn into_string(self) -> Option<String> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if the value is `Value::Null`.
    pub fn is_null(&self) -> bool {
        *self == Value::Null
    }

    /// Borrow the entries if value is a `Value::Object`.
    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(ref map) => Some(map),
            _ => None,
        }
    }
}

macro_rules! value_impl_from {
    (
        (
            $(  $t1:ty => $var1:ident, )*
        )
        (
            $( $t2:ty => |$exprname:ident| $expr:expr => $var2:ident, )*
        )
    ) => {
        $(
            impl From<$t1> for Value {
                fn from(value: $t1) -> Self {
                    Value::$var1(value)
                }
            }

            impl std::convert::TryFrom<Value> for $t1 {
                type Error = ValueError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::$var1(inner) => Ok(inner),
                        _ => Err(ValueError::UnexpectedType)
                    }

                }
            }
        )*
        $(
            impl From<$t2> for Value {
                fn from(value: $t2) -> Self {
                    let $exprname = value;
                    let inner = $expr;
                    Value::$var2(inner)
                }
            }
        )*
    }
}

value_impl_from! {
    (
        bool => Bool,
        i64 => Int,
        f64 => Float,
        String => String,
    )
    (
        i8 => |x| i64::from(x) => Int,
        i16 => |x| i64::from(x) => Int,
        i32 => |x| i64::from(x) => Int,
        u8 => |x| i64::from(x) => Int,
        u16 => |x| i64::from(x) => Int,
        u32 => |x| i64::from(x) => Int,
        f32 => |x| f64::from(x) => Float,
    )
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        // Values that do not fit the signed integer variant degrade to a
        // float, the same way JSON encoders treat big unsigned numbers.
        match i64::try_from(value) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Float(value as f64),
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(values: Vec<T>) -> Self {
        let items = values.into_iter().map(|x| x.into()).collect();
        Value::Array(items)
    }
}

impl<T> TryFrom<Value> for Vec<T>
where
    T: TryFrom<Value>,
{
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| item.try_into().map_err(|_| ValueError::UnexpectedType))
                .collect(),
            _ => Err(ValueError::UnexpectedType),
        }
    }
}

impl<'a> From<&'a str> for Value {
    fn from(val: &'a str) -> Self {
        Value::String(val.into())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        if let Some(value) = opt {
            value.into()
        } else {
            Value::Null
        }
    }
}

impl<K, V> From<HashMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: HashMap<K, V>) -> Self {
        let new_map = map.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Value::Object(new_map)
    }
}

impl<V> TryFrom<Value> for HashMap<String, V>
where
    V: TryFrom<Value>,
{
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => object
                .into_iter()
                .map(|(k, v)| match v.try_into() {
                    Ok(v) => Ok((k, v)),
                    Err(_) => Err(ValueError::UnexpectedType),
                })
                .collect(),
            _ => Err(ValueError::UnexpectedType),
        }
    }
}

/// Error during value conversion.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ValueError {
    /// Internal error.
    Internal(String),
    /// Received an unexpected type that could not be converted.
    UnexpectedType,
    #[doc(hidden)]
    __NonExhaustive,
}

// TODO: remove this once either the Never type get's stabilized or the compiler
// can properly handle Infallible.
impl From<std::convert::Infallible> for ValueError {
    fn from(_: std::convert::Infallible) -> Self {
        unreachable!()
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ValueError::*;
        match self {
            Internal(e) => write!(f, "Value conversion failed - internal error: {}", e),
            UnexpectedType => write!(f, "Could not convert - received unexpected type"),
            __NonExhaustive => unreachable!(),
        }
    }
}

impl error::Error for ValueError {}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(map) => serializer.collect_map(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(22u8), Value::Int(22));
        assert_eq!(Value::from(-5i32), Value::Int(-5));
        assert_eq!(Value::from(1.25f32), Value::Float(1.25));
        assert_eq!(Value::from("abc"), Value::String("abc".into()));
    }

    #[test]
    fn test_from_u64_overflow() {
        assert_eq!(Value::from(17u64), Value::Int(17));
        let value = Value::from(u64::MAX);
        if let Value::Float(f) = value {
            assert!(f > i64::MAX as f64);
        } else {
            panic!("Expected Value::Float");
        }
    }

    #[test]
    fn test_try_from() {
        let value = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        let items: Vec<i64> = value.try_into().unwrap();
        assert_eq!(items, vec![1, 2]);

        let err = String::try_from(Value::Int(1)).unwrap_err();
        assert_eq!(err, ValueError::UnexpectedType);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert_eq!(Value::Int(1).as_str(), None);
        assert!(Value::Null.is_null());
    }
}
