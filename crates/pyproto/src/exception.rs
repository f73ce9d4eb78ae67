use std::{
    borrow::Cow,
    fmt::{self, Display},
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{args::ArgValues, value::Value};

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// Python exception types known to the runtime.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>` implementations.
/// The string representation matches the variant name exactly (e.g., `ValueError` -> "ValueError").
/// The class hierarchy is encoded by [`ExcType::parent`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter, Serialize, Deserialize,
)]
pub enum ExcType {
    /// Root of the exception hierarchy.
    BaseException,
    SystemExit,
    KeyboardInterrupt,
    GeneratorExit,
    /// Base of all non-exit exceptions.
    Exception,
    /// Signals iterator exhaustion; `next()` intercepts exactly this class.
    StopIteration,

    // --- ArithmeticError hierarchy ---
    ArithmeticError,
    FloatingPointError,
    OverflowError,
    ZeroDivisionError,

    AssertionError,
    AttributeError,
    BufferError,
    EOFError,

    // --- ImportError hierarchy ---
    ImportError,
    ModuleNotFoundError,

    // --- LookupError hierarchy ---
    LookupError,
    IndexError,
    KeyError,

    MemoryError,

    // --- NameError hierarchy ---
    NameError,
    UnboundLocalError,

    // --- OSError hierarchy ---
    OSError,
    BlockingIOError,
    ChildProcessError,
    ConnectionError,
    BrokenPipeError,
    ConnectionAbortedError,
    ConnectionRefusedError,
    ConnectionResetError,
    FileExistsError,
    FileNotFoundError,
    InterruptedError,
    IsADirectoryError,
    NotADirectoryError,
    PermissionError,
    ProcessLookupError,
    TimeoutError,

    ReferenceError,

    // --- RuntimeError hierarchy ---
    RuntimeError,
    NotImplementedError,
    /// Raised when the nested call depth exceeds the configured limit.
    RecursionError,

    // --- SyntaxError hierarchy ---
    SyntaxError,
    IndentationError,
    TabError,

    SystemError,
    TypeError,

    // --- ValueError hierarchy ---
    ValueError,
    UnicodeError,
    UnicodeDecodeError,
    UnicodeEncodeError,
    UnicodeTranslateError,

    // --- Warning hierarchy ---
    Warning,
    DeprecationWarning,
    PendingDeprecationWarning,
    RuntimeWarning,
    SyntaxWarning,
    UserWarning,
    FutureWarning,
    ImportWarning,
    UnicodeWarning,
    BytesWarning,
    ResourceWarning,
}

impl ExcType {
    /// Returns the direct base class of this exception type, or `None` for `BaseException`.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        let parent = match self {
            Self::BaseException => return None,
            Self::SystemExit | Self::KeyboardInterrupt | Self::GeneratorExit | Self::Exception => Self::BaseException,
            Self::FloatingPointError | Self::OverflowError | Self::ZeroDivisionError => Self::ArithmeticError,
            Self::ModuleNotFoundError => Self::ImportError,
            Self::IndexError | Self::KeyError => Self::LookupError,
            Self::UnboundLocalError => Self::NameError,
            Self::BlockingIOError
            | Self::ChildProcessError
            | Self::ConnectionError
            | Self::FileExistsError
            | Self::FileNotFoundError
            | Self::InterruptedError
            | Self::IsADirectoryError
            | Self::NotADirectoryError
            | Self::PermissionError
            | Self::ProcessLookupError
            | Self::TimeoutError => Self::OSError,
            Self::BrokenPipeError
            | Self::ConnectionAbortedError
            | Self::ConnectionRefusedError
            | Self::ConnectionResetError => Self::ConnectionError,
            Self::NotImplementedError | Self::RecursionError => Self::RuntimeError,
            Self::IndentationError => Self::SyntaxError,
            Self::TabError => Self::IndentationError,
            Self::UnicodeError => Self::ValueError,
            Self::UnicodeDecodeError | Self::UnicodeEncodeError | Self::UnicodeTranslateError => Self::UnicodeError,
            Self::DeprecationWarning
            | Self::PendingDeprecationWarning
            | Self::RuntimeWarning
            | Self::SyntaxWarning
            | Self::UserWarning
            | Self::FutureWarning
            | Self::ImportWarning
            | Self::UnicodeWarning
            | Self::BytesWarning
            | Self::ResourceWarning => Self::Warning,
            _ => Self::Exception,
        };
        Some(parent)
    }

    /// Walks the hierarchy from this type up to `BaseException`, inclusive.
    pub fn ancestors(self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |t| t.parent())
    }

    /// Checks if this exception type is `handler_type` or one of its subclasses.
    ///
    /// Used for `except`-style matching and for `getattr(obj, name, default)`, which swallows
    /// `AttributeError` subclasses as well.
    #[must_use]
    pub fn is_subclass_of(self, handler_type: Self) -> bool {
        self.ancestors().any(|t| t == handler_type)
    }

    /// Creates an exception instance when an exception class is called, e.g. `ValueError('x')`.
    ///
    /// Zero arguments give an empty message; one argument is stored via its `str()`.
    pub(crate) fn call(self, args: ArgValues) -> RunResult<Value> {
        let name: &'static str = self.into();
        args.check_no_kwargs(name)?;
        let (positional, _) = args.into_parts();
        let arg = match positional.as_slice() {
            [] => None,
            [value] => Some(value.py_str().into_owned()),
            _ => return Err(Self::type_error_at_most(name, 1, positional.len())),
        };
        Ok(Value::Exception(std::rc::Rc::new(SimpleException { exc_type: self, arg })))
    }

    /// Creates a TypeError with the given message.
    #[must_use]
    pub fn type_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, msg).into()
    }

    /// Creates a ValueError with the given message.
    #[must_use]
    pub fn value_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::ValueError, msg).into()
    }

    /// Creates an AttributeError for when an attribute is not found (GET operation).
    #[must_use]
    pub(crate) fn attribute_error(type_name: impl Display, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("'{type_name}' object has no attribute '{attr}'"),
        )
        .into()
    }

    /// Creates an AttributeError for a missing attribute on a class or builtin type.
    #[must_use]
    pub(crate) fn attribute_error_type(type_name: &str, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("type object '{type_name}' has no attribute '{attr}'"),
        )
        .into()
    }

    /// Creates an AttributeError for a missing module attribute.
    #[must_use]
    pub(crate) fn attribute_error_module(module_name: &str, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("module '{module_name}' has no attribute '{attr}'"),
        )
        .into()
    }

    /// Creates an AttributeError for setting an attribute on a builtin type.
    ///
    /// Matches CPython's format: `cannot set '{attr}' attribute of immutable type '{type}'`
    #[must_use]
    pub(crate) fn attribute_error_immutable_type(type_name: &str, attr: &str) -> RunError {
        SimpleException::new_msg(
            Self::AttributeError,
            format!("cannot set '{attr}' attribute of immutable type '{type_name}'"),
        )
        .into()
    }

    /// Creates a TypeError for when a function receives the wrong number of arguments.
    ///
    /// Matches CPython's error format exactly:
    /// - For 1 expected arg: `{name}() takes exactly one argument ({actual} given)`
    /// - For N expected args: `{name} expected {expected} arguments, got {actual}`
    ///
    /// # Arguments
    /// * `name` - The function name (e.g., "len")
    /// * `expected` - Number of expected arguments
    /// * `actual` - Number of arguments actually provided
    #[must_use]
    pub fn type_error_arg_count(name: &str, expected: usize, actual: usize) -> RunError {
        if expected == 1 {
            // CPython: "len() takes exactly one argument (2 given)"
            Self::type_error(format!("{name}() takes exactly one argument ({actual} given)"))
        } else {
            // CPython: "setattr expected 3 arguments, got 1"
            Self::type_error(format!("{name} expected {expected} arguments, got {actual}"))
        }
    }

    /// Creates a TypeError for when a function receives fewer arguments than required.
    ///
    /// Matches CPython's format: `{name} expected at least {min} argument(s), got {actual}`
    #[must_use]
    pub fn type_error_at_least(name: &str, min: usize, actual: usize) -> RunError {
        let plural = if min == 1 { "" } else { "s" };
        Self::type_error(format!("{name} expected at least {min} argument{plural}, got {actual}"))
    }

    /// Creates a TypeError for when a function receives more arguments than allowed.
    ///
    /// Matches CPython's format: `{name} expected at most {max} argument(s), got {actual}`
    #[must_use]
    pub fn type_error_at_most(name: &str, max: usize, actual: usize) -> RunError {
        let plural = if max == 1 { "" } else { "s" };
        Self::type_error(format!("{name} expected at most {max} argument{plural}, got {actual}"))
    }

    /// Creates a TypeError for a function that accepts no keyword arguments.
    #[must_use]
    pub fn type_error_no_kwargs(name: &str) -> RunError {
        Self::type_error(format!("{name}() takes no keyword arguments"))
    }

    /// Creates a TypeError for an unknown keyword argument.
    ///
    /// Matches CPython's format: `'{key}' is an invalid keyword argument for {name}()`
    #[must_use]
    pub fn type_error_unexpected_keyword(name: &str, key: &str) -> RunError {
        Self::type_error(format!("'{key}' is an invalid keyword argument for {name}()"))
    }

    /// Creates a TypeError for an argument supplied both positionally and by keyword.
    ///
    /// Matches CPython's format: `argument for {name}() given by name ('{key}') and position ({pos})`
    #[must_use]
    pub fn type_error_duplicate_arg(name: &str, key: &str, pos: usize) -> RunError {
        Self::type_error(format!(
            "argument for {name}() given by name ('{key}') and position ({pos})"
        ))
    }

    /// Creates a TypeError for a required argument that was not supplied.
    #[must_use]
    pub fn type_error_missing_arg(name: &str, key: &str, pos: usize) -> RunError {
        Self::type_error(format!("{name}() missing required argument '{key}' (pos {pos})"))
    }

    /// Creates a TypeError for a value that cannot be used as an integer.
    #[must_use]
    pub(crate) fn type_error_not_integer(type_name: &str) -> RunError {
        Self::type_error(format!("'{type_name}' object cannot be interpreted as an integer"))
    }

    /// Creates a TypeError for calling a non-callable value.
    #[must_use]
    pub(crate) fn type_error_not_callable(type_name: &str) -> RunError {
        Self::type_error(format!("'{type_name}' object is not callable"))
    }

    /// Creates a TypeError for iterating a non-iterable value.
    #[must_use]
    pub(crate) fn type_error_not_iterable(type_name: &str) -> RunError {
        Self::type_error(format!("'{type_name}' object is not iterable"))
    }

    /// Creates the metaclass conflict TypeError raised by class construction.
    #[must_use]
    pub(crate) fn type_error_metaclass_conflict() -> RunError {
        Self::type_error(
            "metaclass conflict: the metaclass of a derived class must be a (non-strict) subclass \
             of the metaclasses of all its bases",
        )
    }

    /// Creates a bare StopIteration, signalling exhaustion.
    #[must_use]
    pub fn stop_iteration() -> RunError {
        SimpleException::new(Self::StopIteration, None).into()
    }

    /// Creates the error raised when the nested call depth exceeds its limit.
    #[must_use]
    pub(crate) fn recursion_error() -> RunError {
        SimpleException::new_msg(Self::RecursionError, "maximum recursion depth exceeded").into()
    }

    /// Creates the ZeroDivisionError raised when zero is raised to a negative power.
    #[must_use]
    pub(crate) fn zero_negative_power() -> RunError {
        SimpleException::new_msg(Self::ZeroDivisionError, "0.0 cannot be raised to a negative power").into()
    }

    /// Creates the OverflowError raised for float results that leave the finite range.
    #[must_use]
    pub(crate) fn overflow_error(msg: impl Display) -> RunError {
        SimpleException::new_msg(Self::OverflowError, msg).into()
    }
}

/// A raised exception: its class and optional message.
///
/// This is the value carried by [`RunError::Exc`] and by `Value::Exception` when an
/// exception instance is created without being raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleException {
    exc_type: ExcType,
    arg: Option<String>,
}

impl SimpleException {
    #[must_use]
    pub fn new(exc_type: ExcType, arg: Option<String>) -> Self {
        Self { exc_type, arg }
    }

    #[must_use]
    pub fn new_msg(exc_type: ExcType, msg: impl Display) -> Self {
        Self {
            exc_type,
            arg: Some(msg.to_string()),
        }
    }

    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    #[must_use]
    pub fn arg(&self) -> Option<&str> {
        self.arg.as_deref()
    }

    /// `str(exc)`: the message, or an empty string.
    #[must_use]
    pub fn py_str(&self) -> &str {
        self.arg.as_deref().unwrap_or_default()
    }

    /// `repr(exc)`, e.g. `ValueError('bad value')`.
    #[must_use]
    pub fn py_repr(&self) -> String {
        match &self.arg {
            Some(arg) => format!("{}({})", self.exc_type, crate::value::str_repr(arg)),
            None => format!("{}()", self.exc_type),
        }
    }
}

impl Display for SimpleException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) if !arg.is_empty() => write!(f, "{}: {arg}", self.exc_type),
            _ => write!(f, "{}", self.exc_type),
        }
    }
}

/// Runtime error types that can occur while a builtin runs.
///
/// - `Exc`: a Python exception that callers may catch
/// - `Internal`: a bug or misconfiguration in the embedding, not catchable from Python
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// A Python exception, e.g. `TypeError` from a bad argument.
    Exc(SimpleException),
    /// An internal invariant failed; indicates a bug in the embedder or this crate.
    Internal(Cow<'static, str>),
}

impl RunError {
    #[must_use]
    pub fn internal(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the exception class if this is a Python exception.
    #[must_use]
    pub fn exc_type(&self) -> Option<ExcType> {
        match self {
            Self::Exc(exc) => Some(exc.exc_type),
            Self::Internal(_) => None,
        }
    }

    /// Checks whether this error is an exception of exactly `exc_type`, subclasses excluded.
    #[must_use]
    pub fn is_exception_type(&self, exc_type: ExcType) -> bool {
        self.exc_type() == Some(exc_type)
    }

    /// Checks whether this error is an exception of `exc_type` or one of its subclasses.
    #[must_use]
    pub fn matches(&self, exc_type: ExcType) -> bool {
        self.exc_type().is_some_and(|t| t.is_subclass_of(exc_type))
    }

    /// Consumes the error, returning the exception if there is one.
    #[must_use]
    pub fn into_exception(self) -> Option<SimpleException> {
        match self {
            Self::Exc(exc) => Some(exc),
            Self::Internal(_) => None,
        }
    }
}

impl From<SimpleException> for RunError {
    fn from(exc: SimpleException) -> Self {
        Self::Exc(exc)
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exc(exc) => write!(f, "{exc}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for RunError {}
