//! plaintree converts in-memory object graphs into plain, JSON-representable
//! value trees.
//!
//! The conversion is a single recursive routine with a fixed classification
//! order (callables, self-describing values, records, mappings, sequences,
//! enumerated constants, date/time values, primitives) plus a caller-supplied
//! registry of per-type handlers for everything else. Unknown types degrade
//! to null instead of failing the conversion.
//!
//! The same routine is reachable through three equivalent entry styles:
//! the [ToPlain](ToPlain) base trait, a configuration-capturing
//! [Profile](Profile)/[Bound](Bound) wrapper, and the free functions
//! [serialize](serialize) / [serialize_object](serialize_object).
//!
//! ## Quickstart:
//!
//! ```rust
//! use plaintree::{plain_fields, serialize_object, Bytes, Handlers, Options, Value};
//!
//! struct FileResource {
//!     name: String,
//!     content: Bytes,
//! }
//!
//! plain_fields!(FileResource { name, content });
//!
//! let file = FileResource {
//!     name: "file.txt".to_string(),
//!     content: Bytes::new(vec![0x01, 0x02]),
//! };
//!
//! // Bytes have no built-in category: without a handler they degrade to null.
//! let handlers = Handlers::new().with(|bytes: &Bytes| {
//!     let hex: String = bytes.as_slice().iter().map(|b| format!("{:02x}", b)).collect();
//!     Value::String(hex)
//! });
//!
//! let value = serialize_object(&file, &handlers, &Options::new()).unwrap();
//! let object = value.as_object().unwrap();
//! assert_eq!(object["name"], Value::String("file.txt".into()));
//! assert_eq!(object["content"], Value::String("0102".into()));
//! ```

#![deny(missing_docs)]

mod callback;
mod convert;
mod handlers;
mod reflect;
mod value;

#[cfg(test)]
mod tests;

use std::ops::Deref;
use std::sync::Arc;
use std::{error, fmt};

pub use callback::{Callable, Func, IntoInvokeResult, Invocable};
pub use convert::{serialize, serialize_object};
pub use handlers::Handlers;
pub use reflect::{Bytes, Fields, Reflect, Scalar, Shape};
pub use value::*;

/// Error during serialization.
///
/// With default options and infallible handlers the conversion is total and
/// never returns an error.
#[derive(PartialEq, Clone, Debug)]
pub enum SerializeError {
    /// A fallible handler failed. The whole conversion is aborted; there is
    /// no partial result.
    Handler {
        /// The registered type of the failing handler.
        type_name: &'static str,
        /// The error reported by the handler.
        message: String,
    },
    /// A value had no built-in category and no matching handler. Only
    /// returned in strict mode; the default is to substitute null.
    UnsupportedType(&'static str),
    /// The value graph contains a cycle. Only returned with cycle detection
    /// enabled; the default mirrors the unbounded recursion of the original
    /// behavior.
    CyclicReference,
    /// Value conversion failed (arguments or result of a callable).
    Conversion(ValueError),
    #[doc(hidden)]
    __NonExhaustive,
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use SerializeError::*;
        match self {
            Handler { type_name, message } => {
                write!(f, "Handler for `{}` failed: {}", type_name, message)
            }
            UnsupportedType(type_name) => {
                write!(f, "No handler registered for type `{}`", type_name)
            }
            CyclicReference => write!(f, "Cyclic reference in value graph"),
            Conversion(e) => e.fmt(f),
            __NonExhaustive => unreachable!(),
        }
    }
}

impl error::Error for SerializeError {}

impl From<ValueError> for SerializeError {
    fn from(v: ValueError) -> Self {
        SerializeError::Conversion(v)
    }
}

/// Serialization options.
///
/// The defaults reproduce the permissive behavior of the conversion: callable
/// values and unknown types degrade to null, and cyclic graphs are not
/// detected (a cyclic input recurses without bound - callers that cannot rule
/// cycles out should enable [detect_cycles](Options::detect_cycles)).
///
/// ```rust
/// use plaintree::Options;
///
/// let options = Options::new().serialize_callables(true).detect_cycles(true);
/// ```
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Options {
    pub(crate) serialize_callables: bool,
    pub(crate) strict: bool,
    pub(crate) detect_cycles: bool,
}

impl Options {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize callables without a matching handler to their repr-style
    /// description instead of null.
    pub fn serialize_callables(self, enabled: bool) -> Self {
        let mut s = self;
        s.serialize_callables = enabled;
        s
    }

    /// Fail with [SerializeError::UnsupportedType](SerializeError) on unknown
    /// types instead of silently substituting null.
    pub fn strict(self, enabled: bool) -> Self {
        let mut s = self;
        s.strict = enabled;
        s
    }

    /// Detect cyclic value graphs and fail with
    /// [SerializeError::CyclicReference](SerializeError) instead of recursing
    /// without bound.
    pub fn detect_cycles(self, enabled: bool) -> Self {
        let mut s = self;
        s.detect_cycles = enabled;
        s
    }
}

/// The inheritable entry style: serialize the implementing record itself.
///
/// A provided method over the shared conversion routine; implementers only
/// need the [Fields](Fields) capability:
///
/// ```rust
/// use plaintree::{plain_fields, Handlers, Options, ToPlain, Value};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// plain_fields!(Point { x, y });
/// impl ToPlain for Point {}
///
/// let point = Point { x: 3, y: 4 };
/// let value = point.to_plain(&Handlers::new(), &Options::new()).unwrap();
/// assert_eq!(value.as_object().unwrap()["x"], Value::Int(3));
/// ```
pub trait ToPlain: Fields {
    /// Serialize this record's fields as an object.
    fn to_plain(&self, handlers: &Handlers, options: &Options) -> Result<Value, SerializeError> {
        convert::fields_to_object(self.fields(), handlers, options)
    }
}

/// A captured serialization configuration: handler registry plus options.
///
/// The attachment entry style. A profile is built once and then
/// [bound](Profile::bind) to any number of values; each [Bound](Bound) value
/// serializes itself with the captured configuration and takes no further
/// arguments. The handler registry is shared behind an `Arc`, so binding is
/// cheap and profiles can be used from multiple threads.
#[derive(Clone, Debug)]
pub struct Profile {
    handlers: Arc<Handlers>,
    options: Options,
}

impl Profile {
    /// Capture a configuration.
    pub fn new(handlers: Handlers, options: Options) -> Self {
        Self {
            handlers: Arc::new(handlers),
            options,
        }
    }

    /// Pair a value with this configuration.
    pub fn bind<T: Fields>(&self, value: T) -> Bound<T> {
        Bound {
            value,
            handlers: self.handlers.clone(),
            options: self.options.clone(),
        }
    }

    /// The captured handler registry.
    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// The captured options.
    pub fn options(&self) -> &Options {
        &self.options
    }
}

/// A value paired with the configuration captured by a [Profile](Profile).
///
/// ```rust
/// use plaintree::{plain_fields, Handlers, Options, Profile, Value};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// plain_fields!(Point { x, y });
///
/// let profile = Profile::new(Handlers::new(), Options::new());
/// let point = profile.bind(Point { x: 1, y: 2 });
///
/// // No arguments: the configuration was captured at bind time.
/// let value = point.to_plain().unwrap();
/// assert_eq!(value.as_object().unwrap()["y"], Value::Int(2));
/// ```
#[derive(Clone, Debug)]
pub struct Bound<T> {
    value: T,
    handlers: Arc<Handlers>,
    options: Options,
}

impl<T: Fields> Bound<T> {
    /// Serialize the wrapped value's fields with the captured configuration.
    pub fn to_plain(&self) -> Result<Value, SerializeError> {
        convert::fields_to_object(self.value.fields(), &self.handlers, &self.options)
    }
}

impl<T> Bound<T> {
    /// Borrow the wrapped value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Unwrap the value, discarding the captured configuration.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Bound<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

// A bound value nested inside a larger graph serializes with its captured
// configuration, not the configuration of the outer call.
impl<T: Fields + 'static> Reflect for Bound<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_plain(&self) -> Option<Result<Value, SerializeError>> {
        Some(self.to_plain())
    }
}
