use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::convert::TryFrom;
use std::rc::Rc;
use std::sync::Arc;

use crate::callback::{Callable, Func};
use crate::value::Value;
use crate::SerializeError;

/// The underlying scalar of an enumerated constant.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Scalar {
    /// Integer-valued constant.
    Int(i64),
    /// String-valued constant.
    Str(&'static str),
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<&'static str> for Scalar {
    fn from(value: &'static str) -> Self {
        Scalar::Str(value)
    }
}

/// The built-in category a value reports itself as.
///
/// Every [Reflect](Reflect) value has exactly one shape. The serializer
/// matches on it after the callable and self-describing probes, so the shape
/// only decides behavior for values that are neither.
pub enum Shape<'a> {
    /// Null/none.
    Null,
    /// Boolean primitive.
    Bool(bool),
    /// Integer primitive.
    Int(i64),
    /// Floating-point primitive.
    Float(f64),
    /// String primitive.
    Str(&'a str),
    /// Enumerated constant, serialized as its underlying scalar.
    Enum(Scalar),
    /// Date/time, serialized as an RFC 3339 string.
    ///
    /// Only available with the optional `chrono` feature.
    #[cfg(feature = "chrono")]
    DateTime(chrono::DateTime<chrono::Utc>),
    /// Calendar date, serialized as an ISO-8601 date string.
    ///
    /// Only available with the optional `chrono` feature.
    #[cfg(feature = "chrono")]
    Date(chrono::NaiveDate),
    /// A record: named fields of a struct, serialized as an object.
    Record(Vec<(&'static str, &'a dyn Reflect)>),
    /// A string-keyed mapping, serialized as an object. Keys are passed
    /// through untransformed; only values are serialized recursively.
    Map(Vec<(&'a str, &'a dyn Reflect)>),
    /// A sequence, tuple or set, serialized as an array.
    ///
    /// For unordered containers the element order is whatever the container
    /// yields and is not guaranteed to be stable across runs.
    Seq(Vec<&'a dyn Reflect>),
    /// No built-in category. Only a registered handler can serialize the
    /// value; without one it degrades to null (or an error in strict mode).
    Opaque,
}

/// Classification contract for serializable values.
///
/// This is the explicit replacement for runtime attribute reflection: a value
/// states its own category instead of being probed through a live attribute
/// table. Most implementations come from the blanket impls in this module or
/// from the [plain_fields!](crate::plain_fields) / [plain_enum!](crate::plain_enum)
/// macros; hand-written impls are only needed for opaque or self-describing
/// types.
pub trait Reflect: Any {
    /// The single built-in category of this value.
    fn shape(&self) -> Shape<'_>;

    /// Access to the dynamic type, used for handler dispatch and cycle
    /// detection.
    fn as_any(&self) -> &dyn Any;

    /// The type name used in diagnostics and strict-mode errors.
    fn type_name(&self) -> &'static str;

    /// Callable probe. A `Some` return classifies the value as callable
    /// before any other category is considered.
    fn as_callable(&self) -> Option<&dyn Callable> {
        None
    }

    /// Self-describing probe. A `Some` return is used directly, without any
    /// further recursion, and short-circuits every other category except the
    /// callable one.
    fn as_plain(&self) -> Option<Result<Value, SerializeError>> {
        None
    }
}

/// The record capability: enumerate the publicly serializable fields.
///
/// Usually implemented via [plain_fields!](crate::plain_fields). The trait
/// can also be implemented for foreign types, which is what the pass-through
/// entry point [serialize_object](crate::serialize_object) relies on.
pub trait Fields {
    /// Field name/value pairs, in declaration order.
    fn fields(&self) -> Vec<(&'static str, &dyn Reflect)>;
}

macro_rules! reflect_atomic {
    ( $( $t:ty => |$name:ident| $shape:expr, )* ) => {
        $(
            impl Reflect for $t {
                fn shape(&self) -> Shape<'_> {
                    let $name = self;
                    $shape
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn type_name(&self) -> &'static str {
                    std::any::type_name::<$t>()
                }
            }
        )*
    };
}

reflect_atomic! {
    bool => |v| Shape::Bool(*v),
    i8 => |v| Shape::Int(i64::from(*v)),
    i16 => |v| Shape::Int(i64::from(*v)),
    i32 => |v| Shape::Int(i64::from(*v)),
    i64 => |v| Shape::Int(*v),
    isize => |v| Shape::Int(*v as i64),
    u8 => |v| Shape::Int(i64::from(*v)),
    u16 => |v| Shape::Int(i64::from(*v)),
    u32 => |v| Shape::Int(i64::from(*v)),
    f32 => |v| Shape::Float(f64::from(*v)),
    f64 => |v| Shape::Float(*v),
    String => |v| Shape::Str(v.as_str()),
    &'static str => |v| Shape::Str(*v),
    () => |_v| Shape::Null,
}

impl Reflect for u64 {
    fn shape(&self) -> Shape<'_> {
        // Same degradation rule as `Value::from(u64)`.
        match i64::try_from(*self) {
            Ok(v) => Shape::Int(v),
            Err(_) => Shape::Float(*self as f64),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        "u64"
    }
}

impl Reflect for usize {
    fn shape(&self) -> Shape<'_> {
        match i64::try_from(*self) {
            Ok(v) => Shape::Int(v),
            Err(_) => Shape::Float(*self as f64),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        "usize"
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Null,
        }
    }

    // The probes and the dynamic type are forwarded to the inner value, so
    // an optional field behaves exactly like a plain one when present.
    fn as_any(&self) -> &dyn Any {
        match self {
            Some(value) => value.as_any(),
            None => self,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Some(value) => value.type_name(),
            None => std::any::type_name::<Self>(),
        }
    }

    fn as_callable(&self) -> Option<&dyn Callable> {
        self.as_ref().and_then(|value| value.as_callable())
    }

    fn as_plain(&self) -> Option<Result<Value, SerializeError>> {
        self.as_ref().and_then(|value| value.as_plain())
    }
}

macro_rules! reflect_forward {
    ( $( $t:ident, )* ) => {
        $(
            impl<T: Reflect> Reflect for $t<T> {
                fn shape(&self) -> Shape<'_> {
                    (**self).shape()
                }

                fn as_any(&self) -> &dyn Any {
                    (**self).as_any()
                }

                fn type_name(&self) -> &'static str {
                    (**self).type_name()
                }

                fn as_callable(&self) -> Option<&dyn Callable> {
                    (**self).as_callable()
                }

                fn as_plain(&self) -> Option<Result<Value, SerializeError>> {
                    (**self).as_plain()
                }
            }
        )*
    };
}

reflect_forward![Box, Rc, Arc,];

impl<T: Reflect> Reflect for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self.iter().map(|item| item as &dyn Reflect).collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self.iter().map(|item| item as &dyn Reflect).collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

macro_rules! reflect_tuple {
    ( $( ( $( $idx:tt : $t:ident ),+ ), )* ) => {
        $(
            impl< $( $t: Reflect, )+ > Reflect for ( $( $t, )+ ) {
                fn shape(&self) -> Shape<'_> {
                    Shape::Seq(vec![ $( &self.$idx as &dyn Reflect, )+ ])
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn type_name(&self) -> &'static str {
                    std::any::type_name::<Self>()
                }
            }
        )*
    };
}

reflect_tuple![
    (0: T1),
    (0: T1, 1: T2),
    (0: T1, 1: T2, 2: T3),
    (0: T1, 1: T2, 2: T3, 3: T4),
];

impl<T: Reflect> Reflect for HashSet<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self.iter().map(|item| item as &dyn Reflect).collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: Reflect> Reflect for BTreeSet<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self.iter().map(|item| item as &dyn Reflect).collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: Reflect> Reflect for HashMap<String, T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(
            self.iter()
                .map(|(key, value)| (key.as_str(), value as &dyn Reflect))
                .collect(),
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: Reflect> Reflect for BTreeMap<String, T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(
            self.iter()
                .map(|(key, value)| (key.as_str(), value as &dyn Reflect))
                .collect(),
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(feature = "chrono")]
impl Reflect for chrono::DateTime<chrono::Utc> {
    fn shape(&self) -> Shape<'_> {
        Shape::DateTime(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(feature = "chrono")]
impl Reflect for chrono::DateTime<chrono::FixedOffset> {
    // Normalized to UTC; the rendered string always carries a +00:00 offset.
    fn shape(&self) -> Shape<'_> {
        Shape::DateTime(self.with_timezone(&chrono::Utc))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(feature = "chrono")]
impl Reflect for chrono::DateTime<chrono::Local> {
    fn shape(&self) -> Shape<'_> {
        Shape::DateTime(self.with_timezone(&chrono::Utc))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(feature = "chrono")]
impl Reflect for chrono::NaiveDate {
    fn shape(&self) -> Shape<'_> {
        Shape::Date(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

// Serialized output is itself serializable, which makes the conversion
// idempotent: feeding a result back in reproduces it.
impl Reflect for Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Null => Shape::Null,
            Value::Bool(v) => Shape::Bool(*v),
            Value::Int(v) => Shape::Int(*v),
            Value::Float(v) => Shape::Float(*v),
            Value::String(v) => Shape::Str(v.as_str()),
            Value::Array(items) => {
                Shape::Seq(items.iter().map(|item| item as &dyn Reflect).collect())
            }
            Value::Object(map) => Shape::Map(
                map.iter()
                    .map(|(key, value)| (key.as_str(), value as &dyn Reflect))
                    .collect(),
            ),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        "plaintree::Value"
    }
}

impl Reflect for Func {
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        "plaintree::Func"
    }

    fn as_callable(&self) -> Option<&dyn Callable> {
        Some(self)
    }
}

/// An opaque binary payload.
///
/// Raw bytes have no built-in category: a blob only serializes through a
/// registered handler (hex, base64, ...) and degrades to null without one.
/// A dedicated newtype is used because a `Vec<u8>` impl would collide with
/// the generic sequence impl.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Wrap an owned byte buffer.
    pub fn new(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }

    /// Borrow the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap into the owned byte buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Bytes(value)
    }
}

impl<'a> From<&'a [u8]> for Bytes {
    fn from(value: &'a [u8]) -> Self {
        Bytes(value.to_vec())
    }
}

impl Reflect for Bytes {
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        "plaintree::Bytes"
    }
}

/// Implement [Fields](Fields) and [Reflect](Reflect) for a struct by listing
/// its serializable fields.
///
/// ```rust
/// use plaintree::{plain_fields, serialize_object, Handlers, Options, Value};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// plain_fields!(Point { x, y });
///
/// let point = Point { x: 1, y: 2 };
/// let value = serialize_object(&point, &Handlers::new(), &Options::new()).unwrap();
///
/// let object = value.as_object().unwrap();
/// assert_eq!(object["x"], Value::Int(1));
/// assert_eq!(object["y"], Value::Int(2));
/// ```
#[macro_export]
macro_rules! plain_fields {
    ( $ty:ty { $( $field:ident ),+ $(,)? } ) => {
        impl $crate::Fields for $ty {
            fn fields(&self) -> Vec<(&'static str, &dyn $crate::Reflect)> {
                vec![
                    $( (stringify!($field), &self.$field as &dyn $crate::Reflect), )+
                ]
            }
        }

        impl $crate::Reflect for $ty {
            fn shape(&self) -> $crate::Shape<'_> {
                $crate::Shape::Record($crate::Fields::fields(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }
        }
    };
}

/// Implement [Reflect](Reflect) for an enumerated constant.
///
/// Two forms are supported: `Type as i64` serializes a fieldless `Copy` enum
/// as its discriminant, and an explicit variant table maps each variant to a
/// scalar (string or integer):
///
/// ```rust
/// use plaintree::{plain_enum, serialize, Handlers, Options, Value};
///
/// #[derive(Clone, Copy)]
/// enum Priority {
///     Low = 10,
///     High = 20,
/// }
///
/// plain_enum!(Priority as i64);
///
/// enum Color {
///     Red,
///     Green,
/// }
///
/// plain_enum!(Color {
///     Red => "red",
///     Green => "green",
/// });
///
/// let handlers = Handlers::new();
/// let options = Options::new();
/// assert_eq!(
///     serialize(&Priority::High, &handlers, &options).unwrap(),
///     Value::Int(20)
/// );
/// assert_eq!(
///     serialize(&Color::Red, &handlers, &options).unwrap(),
///     Value::String("red".into())
/// );
/// ```
#[macro_export]
macro_rules! plain_enum {
    ( $ty:ty as i64 ) => {
        impl $crate::Reflect for $ty {
            fn shape(&self) -> $crate::Shape<'_> {
                $crate::Shape::Enum($crate::Scalar::Int(*self as i64))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }
        }
    };
    ( $ty:ty { $( $variant:ident => $value:expr ),+ $(,)? } ) => {
        impl $crate::Reflect for $ty {
            fn shape(&self) -> $crate::Shape<'_> {
                match self {
                    $( <$ty>::$variant => $crate::Shape::Enum($crate::Scalar::from($value)), )+
                }
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }
        }
    };
}
