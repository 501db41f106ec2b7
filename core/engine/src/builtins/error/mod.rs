//! The `Error` constructor hierarchy.
//!
//! Every error kind is both a JS `Error` subtype and a host error code
//! ([`JsNativeErrorKind`]). The `MemoryError` instance observed by scripts
//! is pre-allocated and immutable, so reporting an allocation failure never
//! allocates.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-error-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Error

use crate::{
    error::{JsNativeError, JsNativeErrorKind},
    object::{ConstructorBuilder, JsObject, ObjectFlags, ObjectKind},
    property::{Attribute, PropertyKey},
    realm::StandardConstructor,
    Context, JsArgs, JsResult, JsString, JsValue,
};

/// Builds the whole error constructor family and wires the prototype
/// chains: subclass prototypes inherit from `Error.prototype`.
pub(crate) fn init_error_constructors(context: &mut Context) {
    let error_standard = context.standard_objects().error();
    ConstructorBuilder::with_standard_object(context, error_constructor, error_standard.clone())
        .name("Error")
        .length(1)
        .property("name", "Error", writable_config())
        .property("message", "", writable_config())
        .method(to_string, "toString", 0)
        .build();

    let error_prototype = error_standard.prototype();
    let subclasses: [(&str, StandardConstructor, Constructor); 8] = [
        (
            "EvalError",
            context.standard_objects().eval_error(),
            eval_error_constructor,
        ),
        (
            "RangeError",
            context.standard_objects().range_error(),
            range_error_constructor,
        ),
        (
            "ReferenceError",
            context.standard_objects().reference_error(),
            reference_error_constructor,
        ),
        (
            "SyntaxError",
            context.standard_objects().syntax_error(),
            syntax_error_constructor,
        ),
        (
            "TypeError",
            context.standard_objects().type_error(),
            type_error_constructor,
        ),
        (
            "URIError",
            context.standard_objects().uri_error(),
            uri_error_constructor,
        ),
        (
            "InternalError",
            context.standard_objects().internal_error(),
            internal_error_constructor,
        ),
        (
            "MemoryError",
            context.standard_objects().memory_error(),
            memory_error_constructor,
        ),
    ];
    for (name, standard, constructor) in subclasses {
        ConstructorBuilder::with_standard_object(context, constructor, standard)
            .name(name)
            .length(1)
            .inherit(error_prototype.clone())
            .property("name", name, writable_config())
            .build();
    }
}

fn writable_config() -> Attribute {
    Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE
}

type Constructor = fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue>;

/// Creates an error object of the given kind with an optional message.
pub(crate) fn build_error(
    kind: JsNativeErrorKind,
    message: Option<JsString>,
    context: &mut Context,
) -> JsObject {
    let objects = context.standard_objects();
    let prototype = match kind {
        JsNativeErrorKind::Error => objects.error().prototype(),
        JsNativeErrorKind::Syntax => objects.syntax_error().prototype(),
        JsNativeErrorKind::Reference => objects.reference_error().prototype(),
        JsNativeErrorKind::Type => objects.type_error().prototype(),
        JsNativeErrorKind::Range => objects.range_error().prototype(),
        JsNativeErrorKind::Uri => objects.uri_error().prototype(),
        JsNativeErrorKind::Internal => objects.internal_error().prototype(),
        JsNativeErrorKind::Memory => objects.memory_error().prototype(),
    };
    let object = JsObject::new(ObjectKind::Error(kind), Some(prototype));
    {
        let mut borrowed = object.borrow_mut();
        borrowed.flags_mut().insert(ObjectFlags::ERROR_DATA);
        if let Some(message) = message {
            borrowed.insert_property("message", message, writable_config());
        }
    }
    object
}

/// The pre-allocated `MemoryError` instance.
pub(crate) fn build_memory_error(context: &mut Context) -> JsValue {
    let object = build_error(JsNativeErrorKind::Memory, None, context);
    object.prevent_extensions();
    JsValue::Object(object)
}

fn construct(
    kind: JsNativeErrorKind,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    context.take_constructing();
    let message = match args.get_or_undefined(0) {
        JsValue::Undefined => None,
        value => Some(value.to_string(context)?),
    };
    Ok(JsValue::Object(build_error(kind, message, context)))
}

fn error_constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    construct(JsNativeErrorKind::Error, args, context)
}

fn eval_error_constructor(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    construct(JsNativeErrorKind::Error, args, context)
}

fn range_error_constructor(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    construct(JsNativeErrorKind::Range, args, context)
}

fn reference_error_constructor(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    construct(JsNativeErrorKind::Reference, args, context)
}

fn syntax_error_constructor(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    construct(JsNativeErrorKind::Syntax, args, context)
}

fn type_error_constructor(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    construct(JsNativeErrorKind::Type, args, context)
}

fn uri_error_constructor(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    construct(JsNativeErrorKind::Uri, args, context)
}

fn internal_error_constructor(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    construct(JsNativeErrorKind::Internal, args, context)
}

fn memory_error_constructor(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    construct(JsNativeErrorKind::Memory, args, context)
}

/// `Error.prototype.toString()`: `name: message`, eliding an empty name or
/// message.
fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let Some(object) = this.as_object() else {
        return Err(JsNativeError::typ()
            .with_message("Error.prototype.toString requires an object receiver")
            .into());
    };
    let object = object.clone();
    let name = match object.get(&PropertyKey::from("name"), context)? {
        JsValue::Undefined => JsString::from("Error"),
        value => value.to_string(context)?,
    };
    let message = match object.get(&PropertyKey::from("message"), context)? {
        JsValue::Undefined => JsString::default(),
        value => value.to_string(context)?,
    };
    let text = if name.is_empty() {
        message
    } else if message.is_empty() {
        name
    } else {
        JsString::from(format!("{name}: {message}"))
    };
    Ok(JsValue::String(text))
}
