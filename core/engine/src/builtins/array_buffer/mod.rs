//! The global `ArrayBuffer` object.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-arraybuffer-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/ArrayBuffer

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::{ConstructorBuilder, JsObject, ObjectKind},
    property::Attribute,
    value::IntegerOrInfinity,
    Context, JsArgs, JsResult, JsValue,
};

/// The `ArrayBuffer` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArrayBuffer;

impl BuiltIn for ArrayBuffer {
    const NAME: &'static str = "ArrayBuffer";

    fn init(context: &mut Context) -> JsValue {
        let standard = context.standard_objects().array_buffer();
        let constructor =
            ConstructorBuilder::with_standard_object(context, Self::constructor, standard)
                .name(Self::NAME)
                .length(1)
                .static_method(Self::is_view, "isView", 1)
                .method(Self::slice, "slice", 2)
                .accessor(
                    "byteLength",
                    Some(Self::byte_length),
                    None,
                    Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
                )
                .build();
        JsValue::Object(constructor)
    }
}

/// Creates a buffer object over the given bytes.
pub(crate) fn from_bytes(bytes: Vec<u8>, context: &mut Context) -> JsObject {
    JsObject::new(
        ObjectKind::ArrayBuffer(bytes),
        Some(context.standard_objects().array_buffer().prototype()),
    )
}

fn with_bytes<R>(this: &JsValue, read: impl FnOnce(&[u8]) -> R) -> JsResult<R> {
    let Some(object) = this.as_object() else {
        return Err(receiver_error());
    };
    let borrowed = object.borrow();
    match borrowed.kind() {
        ObjectKind::ArrayBuffer(bytes) => Ok(read(bytes)),
        _ => Err(receiver_error()),
    }
}

fn receiver_error() -> crate::JsError {
    JsNativeError::typ()
        .with_message("ArrayBuffer method called on incompatible receiver")
        .into()
}

impl ArrayBuffer {
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        context.take_constructing();
        let length = match args.get_or_undefined(0) {
            JsValue::Undefined => 0,
            value => {
                let length = value.to_integer_or_infinity(context)?;
                let IntegerOrInfinity::Integer(length) = length else {
                    return Err(JsNativeError::range()
                        .with_message("Invalid array buffer length")
                        .into());
                };
                if length < 0 || length > i64::from(u32::MAX) {
                    return Err(JsNativeError::range()
                        .with_message("Invalid array buffer length")
                        .into());
                }
                length as usize
            }
        };
        Ok(JsValue::Object(from_bytes(vec![0; length], context)))
    }

    /// `ArrayBuffer.isView( value )`
    fn is_view(_: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        // The engine has no typed array views.
        Ok(JsValue::Boolean(false))
    }

    /// `get ArrayBuffer.prototype.byteLength`
    fn byte_length(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::from(with_bytes(this, <[u8]>::len)? as f64))
    }

    /// `ArrayBuffer.prototype.slice( start, end )`
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let length = with_bytes(this, <[u8]>::len)? as u64;
        let start = args
            .get(0)
            .cloned()
            .unwrap_or(JsValue::from(0.0))
            .to_integer_or_infinity(context)?
            .relative_index(length) as usize;
        let end = match args.get_or_undefined(1) {
            JsValue::Undefined => length as usize,
            value => value.to_integer_or_infinity(context)?.relative_index(length) as usize,
        };
        let bytes = with_bytes(this, |bytes| {
            bytes[start.min(bytes.len())..end.max(start).min(bytes.len())].to_vec()
        })?;
        Ok(JsValue::Object(from_bytes(bytes, context)))
    }
}
