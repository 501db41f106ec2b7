//! The function representation attached to function objects.

use crate::{
    environments::JsEnvironment, object::JsObject, vm::CodeBlock, Context, JsResult, JsString,
    JsValue,
};
use std::rc::Rc;

/// The signature of a native built-in function.
pub type NativeFunctionPointer = fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue>;

/// A native function that captures state (host bridge callbacks, timer
/// hooks). Built-ins proper use plain fn pointers.
pub type NativeClosure = Rc<dyn Fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue>>;

/// The callable payload of a function object.
pub enum Function {
    /// A native function backed by a Rust fn pointer.
    Native {
        /// The called function.
        function: NativeFunctionPointer,
        /// Value of `fn.name`.
        name: JsString,
        /// Value of `fn.length`.
        length: u32,
        /// Whether `new` is allowed on it.
        constructor: bool,
    },
    /// A native function backed by a capturing closure; never a
    /// constructor.
    Closure {
        /// The called closure.
        function: NativeClosure,
        /// Value of `fn.name`.
        name: JsString,
        /// Value of `fn.length`.
        length: u32,
    },
    /// A bytecode function with its captured environment chain.
    Ordinary {
        /// The compiled template.
        code: Rc<CodeBlock>,
        /// Captured environments, closest first.
        environments: Box<[JsEnvironment]>,
        /// The lexical `this` captured by an arrow function.
        captured_this: Option<JsValue>,
        /// The `arguments` object captured by an arrow function.
        captured_arguments: Option<JsObject>,
    },
    /// A function produced by `Function.prototype.bind`.
    Bound {
        /// The wrapped function object.
        target: JsObject,
        /// The fixed `this`.
        this: JsValue,
        /// Arguments prepended on every call.
        arguments: Box<[JsValue]>,
    },
}

impl Function {
    /// The value of the `name` instance property.
    #[must_use]
    pub fn name(&self) -> JsString {
        match self {
            Self::Native { name, .. } | Self::Closure { name, .. } => name.clone(),
            Self::Ordinary { code, .. } => code.name.clone(),
            Self::Bound { target, .. } => {
                let name = target
                    .borrow()
                    .as_function()
                    .map_or_else(JsString::default, Self::name);
                JsString::from(format!("bound {name}"))
            }
        }
    }

    /// The value of the `length` instance property.
    #[must_use]
    pub fn length(&self) -> u32 {
        match self {
            Self::Native { length, .. } | Self::Closure { length, .. } => *length,
            Self::Ordinary { code, .. } => u32::from(code.params),
            Self::Bound {
                target, arguments, ..
            } => {
                let target_length = target.borrow().as_function().map_or(0, Self::length);
                target_length.saturating_sub(arguments.len() as u32)
            }
        }
    }

    /// Whether `new` may be applied to the function. Arrow functions,
    /// closures and non-constructor natives are not constructable; a bound
    /// function inherits the answer from its target.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        match self {
            Self::Native { constructor, .. } => *constructor,
            Self::Closure { .. } => false,
            Self::Ordinary { code, .. } => !code.arrow,
            Self::Bound { target, .. } => target
                .borrow()
                .as_function()
                .is_some_and(Self::is_constructor),
        }
    }

    /// Whether this is an arrow function closure.
    #[must_use]
    pub fn is_arrow(&self) -> bool {
        matches!(self, Self::Ordinary { code, .. } if code.arrow)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native { name, length, constructor, .. } => f
                .debug_struct("Native")
                .field("name", name)
                .field("length", length)
                .field("constructor", constructor)
                .finish_non_exhaustive(),
            Self::Closure { name, length, .. } => f
                .debug_struct("Closure")
                .field("name", name)
                .field("length", length)
                .finish_non_exhaustive(),
            Self::Ordinary { code, .. } => f
                .debug_struct("Ordinary")
                .field("name", &code.name)
                .finish_non_exhaustive(),
            Self::Bound { this, .. } => f
                .debug_struct("Bound")
                .field("this", this)
                .finish_non_exhaustive(),
        }
    }
}
