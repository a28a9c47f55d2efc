use std::any::Any;
use std::collections::HashMap;
use std::mem;

use crate::handlers::Handlers;
use crate::reflect::{Fields, Reflect, Scalar, Shape};
use crate::value::Value;
use crate::{Options, SerializeError};

/// Serialize a value and everything reachable from it into a plain
/// [Value](Value) tree.
///
/// Classification order, first match wins:
///
/// 1. callable values: a matching handler, else the repr string (with
///    `serialize_callables`), else null
/// 2. self-describing values: their own rendering, used as-is
/// 3. records, mappings and sequences: recursed into
/// 4. enumerated constants: the underlying scalar
/// 5. date/time values: ISO-8601 strings
/// 6. atomic primitives: passed through
/// 7. anything else: a matching handler, else null (or
///    [SerializeError::UnsupportedType](crate::SerializeError) in strict mode)
///
/// The order is part of the contract: it decides what happens when a value
/// would fit several categories, e.g. a callable with a registered handler.
///
/// ```rust
/// use plaintree::{serialize, Handlers, Options, Value};
///
/// let tags = vec!["a".to_string(), "b".to_string()];
/// let value = serialize(&tags, &Handlers::new(), &Options::new()).unwrap();
/// assert_eq!(
///     value,
///     Value::Array(vec![
///         Value::String("a".into()),
///         Value::String("b".into()),
///     ])
/// );
/// ```
///
/// The conversion never mutates its input and, with infallible handlers and
/// default options, always succeeds. It does not terminate on cyclic inputs
/// unless [Options::detect_cycles](crate::Options::detect_cycles) is set.
pub fn serialize(
    value: &dyn Reflect,
    handlers: &Handlers,
    options: &Options,
) -> Result<Value, SerializeError> {
    let mut trail = Trail::new(options.detect_cycles);
    convert(value, handlers, options, &mut trail)
}

/// Serialize the fields of any record as an object, without requiring the
/// type to carry its own serialization method.
///
/// This is the pass-through entry style: the subject only needs the
/// [Fields](Fields) capability, which can be implemented for foreign types.
/// The output is identical to the [ToPlain](crate::ToPlain) and
/// [Profile](crate::Profile) entry styles for the same value and
/// configuration.
pub fn serialize_object(
    subject: &dyn Fields,
    handlers: &Handlers,
    options: &Options,
) -> Result<Value, SerializeError> {
    fields_to_object(subject.fields(), handlers, options)
}

/// Shared top-level routine behind all three entry styles.
pub(crate) fn fields_to_object(
    fields: Vec<(&'static str, &dyn Reflect)>,
    handlers: &Handlers,
    options: &Options,
) -> Result<Value, SerializeError> {
    let mut trail = Trail::new(options.detect_cycles);
    let mut object = HashMap::with_capacity(fields.len());
    for (name, value) in fields {
        object.insert(name.to_string(), convert(value, handlers, options, &mut trail)?);
    }
    Ok(Value::Object(object))
}

fn convert(
    value: &dyn Reflect,
    handlers: &Handlers,
    options: &Options,
    trail: &mut Trail,
) -> Result<Value, SerializeError> {
    // Callables are classified before everything else, so a registered
    // handler can override even the repr fallback.
    if let Some(callable) = value.as_callable() {
        if let Some(converted) = handlers.dispatch(callable.as_any()) {
            return converted;
        }
        return Ok(if options.serialize_callables {
            Value::String(callable.describe())
        } else {
            Value::Null
        });
    }

    // A self-describing value is trusted to have produced plain data; its
    // rendering is used without further recursion.
    if let Some(converted) = value.as_plain() {
        return converted;
    }

    let tracked = trail.enter(value)?;
    let converted = convert_shape(value, handlers, options, trail);
    if tracked {
        trail.exit();
    }
    converted
}

fn convert_shape(
    value: &dyn Reflect,
    handlers: &Handlers,
    options: &Options,
    trail: &mut Trail,
) -> Result<Value, SerializeError> {
    match value.shape() {
        Shape::Record(fields) => {
            let mut object = HashMap::with_capacity(fields.len());
            for (name, field) in fields {
                object.insert(name.to_string(), convert(field, handlers, options, trail)?);
            }
            Ok(Value::Object(object))
        }
        // Keys are passed through untransformed; only values are serialized.
        Shape::Map(entries) => {
            let mut object = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                object.insert(key.to_string(), convert(entry, handlers, options, trail)?);
            }
            Ok(Value::Object(object))
        }
        Shape::Seq(items) => {
            let mut array = Vec::with_capacity(items.len());
            for item in items {
                array.push(convert(item, handlers, options, trail)?);
            }
            Ok(Value::Array(array))
        }
        Shape::Enum(Scalar::Int(v)) => Ok(Value::Int(v)),
        Shape::Enum(Scalar::Str(v)) => Ok(Value::String(v.to_string())),
        #[cfg(feature = "chrono")]
        Shape::DateTime(v) => Ok(Value::String(v.to_rfc3339())),
        #[cfg(feature = "chrono")]
        Shape::Date(v) => Ok(Value::String(v.format("%Y-%m-%d").to_string())),
        Shape::Null => Ok(Value::Null),
        Shape::Bool(v) => Ok(Value::Bool(v)),
        Shape::Int(v) => Ok(Value::Int(v)),
        Shape::Float(v) => Ok(Value::Float(v)),
        Shape::Str(v) => Ok(Value::String(v.to_string())),
        Shape::Opaque => match handlers.dispatch(value.as_any()) {
            // The handler result is used as-is, not serialized again.
            Some(converted) => converted,
            None if options.strict => Err(SerializeError::UnsupportedType(value.type_name())),
            None => {
                // Silent data loss is the designed fallback for unknown
                // types; it is only surfaced through the log.
                #[cfg(feature = "log")]
                log::debug!("no handler for `{}`, substituting null", value.type_name());
                Ok(Value::Null)
            }
        },
    }
}

/// Identity trail of the nodes on the current recursion path.
///
/// Only active with `detect_cycles`. Zero-sized values are skipped: they can
/// share addresses without owning a cycle.
struct Trail {
    enabled: bool,
    path: Vec<*const ()>,
}

impl Trail {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            path: Vec::new(),
        }
    }

    fn enter(&mut self, value: &dyn Reflect) -> Result<bool, SerializeError> {
        if !self.enabled || mem::size_of_val(value) == 0 {
            return Ok(false);
        }
        let addr = value.as_any() as *const dyn Any as *const ();
        if self.path.contains(&addr) {
            return Err(SerializeError::CyclicReference);
        }
        self.path.push(addr);
        Ok(true)
    }

    fn exit(&mut self) {
        self.path.pop();
    }
}
