use std::any::Any;
use std::{convert::TryFrom, fmt, marker::PhantomData};

use crate::value::{Value, ValueError};

/// Conversion of invocation results into the value tree.
pub trait IntoInvokeResult {
    /// Convert the result, turning errors into their message.
    fn into_invoke_res(self) -> Result<Value, String>;
}

impl<T: Into<Value>> IntoInvokeResult for T {
    fn into_invoke_res(self) -> Result<Value, String> {
        Ok(self.into())
    }
}

impl<T: Into<Value>, E: std::fmt::Display> IntoInvokeResult for Result<T, E> {
    fn into_invoke_res(self) -> Result<Value, String> {
        match self {
            Ok(v) => Ok(v.into()),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// The Invocable trait is implemented for functions/closures that can be
/// stored as callable fields via [Func](Func).
pub trait Invocable<F>: Send + Sync {
    /// The number of arguments required.
    fn argument_count(&self) -> usize;
    /// Execute the function.
    ///
    /// Should return:
    ///   - Err(_) if the arguments could not be converted
    ///   - Ok(Err(_)) if an error ocurred while processing
    ///   - Ok(Ok(result)) when execution succeeded
    fn invoke(&self, args: Vec<Value>) -> Result<Result<Value, String>, ValueError>;
}

macro_rules! impl_invocable {
    (@call $len:literal $self:ident $args:ident ) => {
        $self()
    };

    (@call $len:literal $self:ident $args:ident $( $arg:ident ),* ) => {
        {
            let mut iter = $args.into_iter();
            $self(
                $(
                    $arg::try_from(iter.next().unwrap())?,
                )*
            )
        }
    };

    [ $(  $len:literal : ( $( $arg:ident, )* ), )* ] => {
        $(

            impl<
                $( $arg, )*
                R,
                F,
            > Invocable<PhantomData<(
                $( &$arg, )*
                &R,
                &F,
            )>> for F
            where
                $( $arg: TryFrom<Value, Error = ValueError>, )*
                R: IntoInvokeResult,
                F: Fn( $( $arg, )*  ) -> R + Sized + Send + Sync,
            {
                fn argument_count(&self) -> usize {
                    $len
                }

                fn invoke(&self, args: Vec<Value>) -> Result<Result<Value, String>, ValueError> {
                    if args.len() != $len {
                        return Ok(Err(format!(
                            "Invalid argument count: Expected {}, got {}",
                            self.argument_count(),
                            args.len()
                        )));
                    }

                    let res = impl_invocable!(@call $len self args $($arg),* );
                    Ok(res.into_invoke_res())
                }
            }
        )*
    };
}

impl_invocable![
    0: (),
    1: (A1,),
    2: (A1, A2,),
    3: (A1, A2, A3,),
    4: (A1, A2, A3, A4,),
    5: (A1, A2, A3, A4, A5,),
];

/// Object-safe view of a callable value, used by the serializer to classify
/// function-valued fields.
///
/// Any type can opt into the callable category by returning itself from
/// [Reflect::as_callable](crate::Reflect::as_callable). The [Func](Func)
/// wrapper is the ready-made implementation for closures and functions.
pub trait Callable {
    /// A debug/repr-style rendering of the callable, used when
    /// `serialize_callables` is enabled.
    fn describe(&self) -> String;
    /// Access to the dynamic type, used for handler dispatch.
    fn as_any(&self) -> &dyn Any;
}

type ErasedInvocable = dyn Fn(Vec<Value>) -> Result<Result<Value, String>, ValueError> + Send + Sync;

/// A type-erased callable field.
///
/// Wraps a function or closure so that it can be stored inside an otherwise
/// serializable record. By default such a field serializes to null; with
/// `serialize_callables` enabled it serializes to its description, and a
/// handler registered for `Func` can invoke it and serialize the result:
///
/// ```rust
/// use plaintree::{serialize, Func, Handlers, Options, Value};
///
/// let greet = Func::new(|| "hello".to_string());
///
/// let value = serialize(&greet, &Handlers::new(), &Options::new()).unwrap();
/// assert_eq!(value, Value::Null);
///
/// let mut handlers = Handlers::new();
/// handlers.register_fallible(|f: &Func| {
///     f.invoke(Vec::new()).map_err(|e| e.to_string())?
/// });
/// let value = serialize(&greet, &handlers, &Options::new()).unwrap();
/// assert_eq!(value, Value::String("hello".into()));
/// ```
pub struct Func {
    name: &'static str,
    arity: usize,
    inner: Box<ErasedInvocable>,
}

impl Func {
    /// Wrap a function or closure.
    ///
    /// The function must satisfy several requirements:
    /// * accepts 0 - 5 arguments
    /// * each argument must be convertible from a [Value](Value)
    /// * must return a value
    /// * the return value must either:
    ///   - be convertible to [Value](Value)
    ///   - be a Result<T, E> where T is convertible to [Value](Value)
    pub fn new<F, M>(f: F) -> Self
    where
        F: Invocable<M> + 'static,
    {
        Self {
            name: std::any::type_name::<F>(),
            arity: f.argument_count(),
            inner: Box::new(move |args| f.invoke(args)),
        }
    }

    /// The number of arguments the wrapped function requires.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invoke the wrapped function.
    ///
    /// Returns `Err(_)` if an argument could not be converted, `Ok(Err(_))`
    /// if the function itself reported an error.
    pub fn invoke(&self, args: Vec<Value>) -> Result<Result<Value, String>, ValueError> {
        (self.inner)(args)
    }
}

impl Callable for Func {
    fn describe(&self) -> String {
        format!("<callable {} ({} args)>", self.name, self.arity)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Func")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}
