//! The JavaScript value representation.

mod conversions;
mod display;
mod equality;
mod integer;
mod operations;

pub use conversions::{
    f64_to_int32, f64_to_uint32, number_to_js_string, string_to_number, PreferredType,
};
pub use display::ValueDisplay;
pub use equality::{same_value, same_value_zero};
pub use integer::IntegerOrInfinity;

use crate::{
    external::JsExternal,
    object::{Function, JsObject, ObjectKind},
    Context, JsResult, JsString, JsSymbol,
};
use std::{any::Any, fmt::Debug, rc::Rc};

/// An opaque host payload carried by [`JsValue::Data`].
#[derive(Debug, Clone)]
pub struct JsData {
    inner: Rc<dyn Any>,
}

impl JsData {
    /// Wraps a host value.
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
        }
    }

    /// Downcasts back to the host type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

/// A JavaScript value.
///
/// Primitives order before the object variants, mirroring the type-tag
/// range checks of the original layout; `is_object`/`is_primitive` are
/// single-pattern checks here.
#[derive(Debug, Clone, Default)]
pub enum JsValue {
    /// `null`
    Null,
    /// `undefined`
    #[default]
    Undefined,
    /// A boolean.
    Boolean(bool),
    /// A number, including `-0`, `NaN` and the infinities.
    Number(f64),
    /// A string.
    String(JsString),
    /// A symbol.
    Symbol(JsSymbol),
    /// An opaque host payload; never observable from scripts.
    Data(JsData),
    /// A host-backed external object.
    External(JsExternal),
    /// An object.
    Object(JsObject),
    /// The uninitialised marker used for array holes. Never escapes to
    /// scripts: reads convert it to `undefined`.
    Invalid,
}

impl JsValue {
    /// The `undefined` value.
    #[must_use]
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    /// The `null` value.
    #[must_use]
    pub const fn null() -> Self {
        Self::Null
    }

    /// The `NaN` number.
    #[must_use]
    pub const fn nan() -> Self {
        Self::Number(f64::NAN)
    }

    /// Creates a number value.
    #[must_use]
    pub const fn new_number(value: f64) -> Self {
        Self::Number(value)
    }

    /// Whether this is `undefined`.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Whether this is `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is `null` or `undefined`.
    #[must_use]
    pub const fn is_null_or_undefined(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Whether this is an object (externals included).
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_) | Self::External(_))
    }

    /// Whether this is a primitive value.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        !self.is_object()
    }

    /// Whether this is a number.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Whether this is a string.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Whether this is a symbol.
    #[must_use]
    pub const fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// The object, if this is one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&JsObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The number, if this is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// The string, if this is one.
    #[must_use]
    pub const fn as_string(&self) -> Option<&JsString> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    /// The symbol, if this is one.
    #[must_use]
    pub const fn as_symbol(&self) -> Option<&JsSymbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// The callable object, if this value is a function.
    #[must_use]
    pub fn as_callable(&self) -> Option<&JsObject> {
        match self {
            Self::Object(object) if object.is_callable() => Some(object),
            _ => None,
        }
    }

    /// Whether the value is callable.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.as_callable().is_some()
    }

    /// `ToBoolean`: total and allocation free for every variant.
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Null | Self::Undefined | Self::Invalid => false,
            Self::Boolean(boolean) => *boolean,
            Self::Number(number) => *number != 0.0 && !number.is_nan(),
            // The truth bit of a short string is exactly "length != 0".
            Self::String(string) => !string.is_empty(),
            Self::Symbol(_) | Self::Data(_) | Self::External(_) | Self::Object(_) => true,
        }
    }

    /// The `typeof` string.
    #[must_use]
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Null => "object",
            Self::Undefined | Self::Invalid => "undefined",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Data(_) => "data",
            Self::External(_) => "external",
            Self::Object(object) => {
                if object.is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// A short word describing the type for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Object(object) => object.borrow().kind().type_name(),
            Self::External(_) => "external",
            _ => self.type_of(),
        }
    }

    /// Normalises array holes to `undefined`.
    #[must_use]
    pub fn materialized(self) -> Self {
        match self {
            Self::Invalid => Self::Undefined,
            value => value,
        }
    }

    /// `instanceof`, walking the prototype chain of `self` against the
    /// `prototype` property of `target`.
    pub fn instance_of(&self, target: &JsValue, context: &mut Context) -> JsResult<bool> {
        let Some(function) = target.as_callable() else {
            return Err(crate::error::JsNativeError::typ()
                .with_message(format!(
                    "right-hand side of 'instanceof' is not callable, got {}",
                    target.type_of()
                ))
                .into());
        };
        // A bound function checks against its target.
        let function = {
            let borrowed = function.borrow();
            match borrowed.as_function() {
                Some(Function::Bound { target, .. }) => target.clone(),
                _ => function.clone(),
            }
        };
        let prototype = function.get(&"prototype".into(), context)?;
        let Some(prototype) = prototype.as_object() else {
            return Err(crate::error::JsNativeError::typ()
                .with_message("function has non-object prototype in instanceof check")
                .into());
        };
        let Self::Object(object) = self else {
            return Ok(false);
        };
        let mut cursor = object.prototype();
        while let Some(object) = cursor {
            if object.ptr_eq(prototype) {
                return Ok(true);
            }
            cursor = object.prototype();
        }
        Ok(false)
    }

    /// The wrapper prototype consulted when a property is read off a
    /// primitive.
    pub(crate) fn primitive_prototype(&self, context: &Context) -> Option<JsObject> {
        let objects = context.standard_objects();
        match self {
            Self::Boolean(_) => Some(objects.boolean().prototype()),
            Self::Number(_) => Some(objects.number().prototype()),
            Self::String(_) => Some(objects.string().prototype()),
            Self::Symbol(_) => Some(objects.symbol().prototype()),
            _ => None,
        }
    }

    /// Property read on any value, including primitives and externals.
    pub fn get_v(&self, key: &crate::property::PropertyKey, context: &mut Context) -> JsResult<JsValue> {
        use crate::property::PropertyKey;
        match self {
            Self::Object(object) => object.get_with_receiver(key, self, context),
            Self::External(external) => external.get(key, context),
            Self::String(string) => {
                if let PropertyKey::Index(index) = key {
                    return Ok(string
                        .code_point_at(*index as usize)
                        .map_or(Self::Undefined, |cp| {
                            Self::String(JsString::from_code_point(cp))
                        }));
                }
                if let PropertyKey::String(name) = key {
                    if name.as_str() == Some("length") {
                        return Ok(Self::Number(string.len() as f64));
                    }
                }
                self.prototype_get(key, context)
            }
            Self::Null | Self::Undefined => Err(crate::error::JsNativeError::typ()
                .with_message(format!(
                    "cannot get property \"{key}\" of {}",
                    self.type_of()
                ))
                .into()),
            _ => self.prototype_get(key, context),
        }
    }

    fn prototype_get(
        &self,
        key: &crate::property::PropertyKey,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        match self.primitive_prototype(context) {
            Some(prototype) => prototype.get_with_receiver(key, self, context),
            None => Ok(Self::Undefined),
        }
    }

    /// Property write on any value.
    pub fn set_v(
        &self,
        key: crate::property::PropertyKey,
        value: JsValue,
        context: &mut Context,
    ) -> JsResult<()> {
        match self {
            Self::Object(object) => object.set_with_receiver(key, value, self, context),
            Self::External(external) => external.set(&key, &value, context),
            Self::String(_) => Err(crate::error::JsNativeError::typ()
                .with_message("property set on primitive string type")
                .into()),
            Self::Null | Self::Undefined => Err(crate::error::JsNativeError::typ()
                .with_message(format!(
                    "cannot set property \"{key}\" of {}",
                    self.type_of()
                ))
                .into()),
            _ => Err(crate::error::JsNativeError::typ()
                .with_message(format!(
                    "cannot create property \"{key}\" on {}",
                    self.type_of()
                ))
                .into()),
        }
    }

    /// `delete` on any value.
    pub fn delete_v(
        &self,
        key: &crate::property::PropertyKey,
        context: &mut Context,
    ) -> JsResult<bool> {
        match self {
            Self::Object(object) => object.delete(key, context),
            Self::External(external) => external.delete(key, context),
            _ => Ok(true),
        }
    }

    /// `in` / `HasProperty` on any value.
    pub fn has_property_v(
        &self,
        key: &crate::property::PropertyKey,
        context: &mut Context,
    ) -> JsResult<bool> {
        match self {
            Self::Object(object) => Ok(object.has_property(key)),
            Self::External(external) => external.has(key, context),
            _ => Err(crate::error::JsNativeError::typ()
                .with_message(format!(
                    "right-hand side of 'in' should be an object, got {}",
                    self.type_of()
                ))
                .into()),
        }
    }
}

impl From<bool> for JsValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for JsValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for JsValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for JsValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<usize> for JsValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for JsValue {
    fn from(value: &str) -> Self {
        Self::String(JsString::from(value))
    }
}

impl From<String> for JsValue {
    fn from(value: String) -> Self {
        Self::String(JsString::from(value))
    }
}

impl From<JsString> for JsValue {
    fn from(value: JsString) -> Self {
        Self::String(value)
    }
}

impl From<JsSymbol> for JsValue {
    fn from(value: JsSymbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<JsObject> for JsValue {
    fn from(value: JsObject) -> Self {
        Self::Object(value)
    }
}

impl From<JsExternal> for JsValue {
    fn from(value: JsExternal) -> Self {
        Self::External(value)
    }
}

// The wrapper kinds keep their primitive close; this helper reads it back.
pub(crate) fn wrapped_primitive(object: &JsObject) -> Option<JsValue> {
    let borrowed = object.borrow();
    match borrowed.kind() {
        ObjectKind::Boolean(value) => Some(JsValue::Boolean(*value)),
        ObjectKind::Number(value) => Some(JsValue::Number(*value)),
        ObjectKind::String(value) => Some(JsValue::String(value.clone())),
        ObjectKind::Symbol(value) => Some(JsValue::Symbol(value.clone())),
        _ => None,
    }
}
