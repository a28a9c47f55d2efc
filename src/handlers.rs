use std::any::Any;
use std::fmt;

use crate::value::Value;
use crate::SerializeError;

type Converter = Box<dyn Fn(&dyn Any) -> Option<Result<Value, SerializeError>> + Send + Sync>;

struct Handler {
    type_name: &'static str,
    convert: Converter,
}

/// Registry of per-type conversion handlers.
///
/// Handlers cover types the serializer has no built-in category for: the
/// registry is consulted for callable values (before the repr/null fallback)
/// and for opaque values (before the null fallback). Entries are tested in
/// registration order and the first entry whose type matches wins; built-in
/// categories are never overridden by a handler.
///
/// The registry is always supplied by the caller, per call or captured per
/// [Profile](crate::Profile) - there is no global registry. Converters must
/// be `Send + Sync`, so a registry can be shared between threads as long as
/// it is not mutated concurrently.
///
/// ```rust
/// use plaintree::{serialize, Bytes, Handlers, Options, Value};
///
/// let handlers = Handlers::new().with(|bytes: &Bytes| {
///     let hex: String = bytes.as_slice().iter().map(|b| format!("{:02x}", b)).collect();
///     Value::String(hex)
/// });
///
/// let blob = Bytes::new(vec![0xde, 0xad]);
/// let value = serialize(&blob, &handlers, &Options::new()).unwrap();
/// assert_eq!(value, Value::String("dead".into()));
/// ```
#[derive(Default)]
pub struct Handlers {
    entries: Vec<Handler>,
}

impl Handlers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a conversion for values of type `T`.
    ///
    /// The handler result is used as-is and is not serialized again.
    pub fn register<T, F>(&mut self, convert: F)
    where
        T: Any,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.entries.push(Handler {
            type_name: std::any::type_name::<T>(),
            convert: Box::new(move |any| any.downcast_ref::<T>().map(|value| Ok(convert(value)))),
        });
    }

    /// Register a conversion for values of type `T` that can fail.
    ///
    /// A handler error aborts the whole conversion; there is no partial
    /// recovery.
    pub fn register_fallible<T, F>(&mut self, convert: F)
    where
        T: Any,
        F: Fn(&T) -> Result<Value, String> + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        self.entries.push(Handler {
            type_name,
            convert: Box::new(move |any| {
                any.downcast_ref::<T>().map(|value| {
                    convert(value).map_err(|message| SerializeError::Handler {
                        type_name,
                        message,
                    })
                })
            }),
        });
    }

    /// Builder-style variant of [register](Handlers::register).
    pub fn with<T, F>(self, convert: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let mut s = self;
        s.register(convert);
        s
    }

    /// Builder-style variant of [register_fallible](Handlers::register_fallible).
    pub fn with_fallible<T, F>(self, convert: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Result<Value, String> + Send + Sync + 'static,
    {
        let mut s = self;
        s.register_fallible(convert);
        s
    }

    /// The number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first handler matching the value's runtime type and apply it.
    pub(crate) fn dispatch(&self, value: &dyn Any) -> Option<Result<Value, SerializeError>> {
        for handler in &self.entries {
            if let Some(converted) = (handler.convert)(value) {
                #[cfg(feature = "log")]
                log::trace!("dispatching `{}` handler", handler.type_name);
                return Some(converted);
            }
        }
        None
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<_> = self.entries.iter().map(|h| h.type_name).collect();
        f.debug_tuple("Handlers").field(&names).finish()
    }
}
