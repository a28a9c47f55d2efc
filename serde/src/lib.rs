//! A `serde::Serializer` that builds [plaintree::Value](plaintree::Value)
//! trees, so any `#[derive(Serialize)]` type can take part in plain-data
//! serialization without implementing the reflection traits by hand.

mod errors;
mod ser;

use std::any::Any;

pub use errors::SerializationError;
use plaintree::{Reflect, SerializeError, Shape, Value, ValueError};
use serde::Serialize;

/// Serialize any `serde::Serialize` value into a plain value tree.
///
/// ```rust
/// use plaintree::Value;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Inner {
///     b: u8,
/// }
///
/// let value = plaintree_serde::to_value(&Inner { b: 5 }).unwrap();
/// let object = value.as_object().unwrap();
/// assert_eq!(object["b"], Value::Int(5));
/// ```
pub fn to_value<T: ?Sized>(value: &T) -> Result<Value, SerializationError>
where
    T: Serialize,
{
    value.serialize(ser::Serializer)
}

/// Integrates a `serde::Serialize` type into the reflection classification.
///
/// The wrapped value is self-describing: it renders itself through serde and
/// the result is used as-is, so per-type handlers of the surrounding call do
/// not reach into its fields (unlike records going through the
/// [Fields](plaintree::Fields) capability).
///
/// ```rust
/// use plaintree::{serialize, Handlers, Options, Value};
/// use plaintree_serde::Reflected;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Inner {
///     b: u8,
/// }
///
/// let wrapped = Reflected(Inner { b: 5 });
/// let value = serialize(&wrapped, &Handlers::new(), &Options::new()).unwrap();
/// assert_eq!(value.as_object().unwrap()["b"], Value::Int(5));
/// ```
pub struct Reflected<T>(pub T);

impl<T> Reflected<T> {
    /// Unwrap the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize + 'static> Reflect for Reflected<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_plain(&self) -> Option<Result<Value, SerializeError>> {
        let converted = to_value(&self.0)
            .map_err(|e| SerializeError::Conversion(ValueError::Internal(e.to_string())));
        Some(converted)
    }
}
