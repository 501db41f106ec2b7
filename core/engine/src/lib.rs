//! Adder is an embeddable JavaScript engine: a lexer, parser, bytecode
//! compiler and register based virtual machine with the standard built-in
//! object hierarchy.
//!
//! The engine executes a `var`-only ECMAScript 5.1 subset extended with
//! arrow functions, rest parameters, spread elements, template literals and
//! destructuring. It is single-threaded and synchronous: one [`Context`] is
//! one independent world, cheaply cloned from a process-wide shared state,
//! and is used by at most one task at a time.
//!
//! # Example
//!
//! ```
//! use adder_engine::{Context, JsValue};
//!
//! let mut context = Context::new();
//! let value = context.eval("21 * 2").unwrap();
//! assert!(value.strict_equals(&JsValue::from(42.0)));
//! ```

pub mod builtins;
pub mod bytecompiler;
pub mod context;
pub mod environments;
pub mod error;
pub mod external;
pub mod object;
pub mod property;
pub mod realm;
pub mod shared;
pub mod symbol;
pub mod value;
pub mod vm;

mod string;

pub use crate::{
    context::{Context, ContextBuilder},
    error::{JsError, JsNativeError, JsNativeErrorKind},
    string::JsString,
    symbol::JsSymbol,
    value::JsValue,
};

/// The result type of all engine operations.
pub type JsResult<T> = Result<T, JsError>;

/// Utility trait to access arguments of native functions with the "absent
/// is undefined" convention.
pub trait JsArgs {
    /// Gets the argument at `index`, or `undefined` when absent.
    fn get_or_undefined(&self, index: usize) -> &JsValue;
}

impl JsArgs for [JsValue] {
    fn get_or_undefined(&self, index: usize) -> &JsValue {
        const UNDEFINED: &JsValue = &JsValue::Undefined;
        self.get(index).unwrap_or(UNDEFINED)
    }
}

#[cfg(test)]
mod tests;
