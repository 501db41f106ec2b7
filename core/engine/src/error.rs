//! Error types of the engine.
//!
//! Every fallible engine operation returns [`JsResult<T>`][crate::JsResult].
//! The error can be a *native* error (a Rust-side error with a kind matching
//! one of the ECMAScript `Error` subtypes) or an *opaque* error (an arbitrary
//! thrown value, e.g. `throw 42`). Native errors materialise into JS `Error`
//! objects when a script observes them, and thrown JS errors convert back
//! into native errors when they reach the host.

use crate::{object::ObjectFlags, Context, JsString, JsValue};
use thiserror::Error;

/// The error type of all engine operations.
#[derive(Debug, Clone, Error)]
pub struct JsError {
    repr: Repr,
}

#[derive(Debug, Clone)]
enum Repr {
    Native(JsNativeError),
    Opaque(JsValue),
}

impl JsError {
    /// Creates an error from an arbitrary thrown value.
    #[must_use]
    pub fn from_opaque(value: JsValue) -> Self {
        Self {
            repr: Repr::Opaque(value),
        }
    }

    /// Converts the error into the value seen by `catch` clauses.
    pub fn to_value(&self, context: &mut Context) -> JsValue {
        match &self.repr {
            Repr::Native(native) => native.to_value(context),
            Repr::Opaque(value) => value.clone(),
        }
    }

    /// Gets the native error, if this is one.
    #[must_use]
    pub fn as_native(&self) -> Option<&JsNativeError> {
        match &self.repr {
            Repr::Native(native) => Some(native),
            Repr::Opaque(_) => None,
        }
    }

    /// Gets the opaque thrown value, if this is one.
    #[must_use]
    pub fn as_opaque(&self) -> Option<&JsValue> {
        match &self.repr {
            Repr::Opaque(value) => Some(value),
            Repr::Native(_) => None,
        }
    }

    /// Converts a caught value back into a `JsError`, recovering the native
    /// kind for engine-created error objects.
    #[must_use]
    pub fn from_value(value: JsValue) -> Self {
        if let JsValue::Object(object) = &value {
            let borrowed = object.borrow();
            if borrowed.flags().contains(ObjectFlags::ERROR_DATA) {
                if let (Some(kind), Some(message)) =
                    (borrowed.error_kind(), borrowed.error_message())
                {
                    drop(borrowed);
                    return Self {
                        repr: Repr::Native(JsNativeError {
                            kind,
                            message: message.to_std_string_lossy().into(),
                            value: Some(value),
                        }),
                    };
                }
            }
        }
        Self::from_opaque(value)
    }
}

impl std::fmt::Display for JsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.repr {
            Repr::Native(native) => native.fmt(f),
            Repr::Opaque(value) => write!(f, "uncaught exception: {}", value.display()),
        }
    }
}

impl From<JsNativeError> for JsError {
    fn from(native: JsNativeError) -> Self {
        Self {
            repr: Repr::Native(native),
        }
    }
}

/// A native error with a kind matching an ECMAScript `Error` subtype.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct JsNativeError {
    /// The kind of the error.
    pub kind: JsNativeErrorKind,
    message: Box<str>,
    // The original error object, kept so a rethrown error preserves
    // identity.
    value: Option<JsValue>,
}

/// The list of native error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JsNativeErrorKind {
    /// A plain `Error`.
    #[error("Error")]
    Error,
    /// A `SyntaxError`: parser-visible failure, always carrying a line.
    #[error("SyntaxError")]
    Syntax,
    /// A `ReferenceError`: access to an undeclared identifier.
    #[error("ReferenceError")]
    Reference,
    /// A `TypeError`: coercion failure, wrong receiver, non-function call.
    #[error("TypeError")]
    Type,
    /// A `RangeError`: numeric out-of-domain.
    #[error("RangeError")]
    Range,
    /// A `URIError`: invalid escape in the `decodeURI` family.
    #[error("URIError")]
    Uri,
    /// An `InternalError`: implementation limit or unsupported construct.
    #[error("InternalError")]
    Internal,
    /// A `MemoryError`: allocation failure. The instance observed by scripts
    /// is pre-allocated so that reporting it never allocates.
    #[error("MemoryError")]
    Memory,
}

impl JsNativeError {
    fn new(kind: JsNativeErrorKind) -> Self {
        Self {
            kind,
            message: Box::default(),
            value: None,
        }
    }

    /// Creates a plain `Error`.
    #[must_use]
    pub fn error() -> Self {
        Self::new(JsNativeErrorKind::Error)
    }

    /// Creates a `SyntaxError`.
    #[must_use]
    pub fn syntax() -> Self {
        Self::new(JsNativeErrorKind::Syntax)
    }

    /// Creates a `ReferenceError`.
    #[must_use]
    pub fn reference() -> Self {
        Self::new(JsNativeErrorKind::Reference)
    }

    /// Creates a `TypeError`.
    #[must_use]
    pub fn typ() -> Self {
        Self::new(JsNativeErrorKind::Type)
    }

    /// Creates a `RangeError`.
    #[must_use]
    pub fn range() -> Self {
        Self::new(JsNativeErrorKind::Range)
    }

    /// Creates a `URIError`.
    #[must_use]
    pub fn uri() -> Self {
        Self::new(JsNativeErrorKind::Uri)
    }

    /// Creates an `InternalError`.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(JsNativeErrorKind::Internal)
    }

    /// Creates a `MemoryError`.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(JsNativeErrorKind::Memory)
    }

    /// Sets the message of the error.
    #[must_use]
    pub fn with_message<M: Into<Box<str>>>(mut self, message: M) -> Self {
        self.message = message.into();
        self
    }

    /// Gets the message of the error.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Materialises the error as the JS value seen by `catch`.
    pub fn to_value(&self, context: &mut Context) -> JsValue {
        if let Some(value) = &self.value {
            return value.clone();
        }
        if self.kind == JsNativeErrorKind::Memory {
            return context.memory_error();
        }
        let message = if self.message.is_empty() {
            None
        } else {
            Some(JsString::from(self.message.as_ref()))
        };
        let object = crate::builtins::error::build_error(self.kind, message, context);
        JsValue::from(object)
    }
}
