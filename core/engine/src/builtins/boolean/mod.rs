//! The global `Boolean` object.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-boolean-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Boolean

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::{ConstructorBuilder, JsObject, ObjectKind},
    Context, JsArgs, JsResult, JsValue,
};

/// The `Boolean` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Boolean;

impl BuiltIn for Boolean {
    const NAME: &'static str = "Boolean";

    fn init(context: &mut Context) -> JsValue {
        let standard = context.standard_objects().boolean();
        let constructor =
            ConstructorBuilder::with_standard_object(context, Self::constructor, standard)
                .name(Self::NAME)
                .length(1)
                .method(Self::to_string, "toString", 0)
                .method(Self::value_of, "valueOf", 0)
                .build();
        JsValue::Object(constructor)
    }
}

impl Boolean {
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get_or_undefined(0).to_boolean();
        if context.take_constructing() {
            return Ok(JsValue::Object(JsObject::new(
                ObjectKind::Boolean(value),
                Some(context.standard_objects().boolean().prototype()),
            )));
        }
        Ok(JsValue::Boolean(value))
    }

    fn boolean_value(this: &JsValue) -> JsResult<bool> {
        match this.unwrapped() {
            JsValue::Boolean(value) => Ok(value),
            _ => Err(JsNativeError::typ()
                .with_message("Boolean.prototype.valueOf requires a boolean receiver")
                .into()),
        }
    }

    /// `Boolean.prototype.toString()`
    fn to_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::from(if Self::boolean_value(this)? {
            "true"
        } else {
            "false"
        }))
    }

    /// `Boolean.prototype.valueOf()`
    fn value_of(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(Self::boolean_value(this)?))
    }
}
