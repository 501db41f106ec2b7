//! The ECMAScript built-in object implementations: Object, Array, String,
//! Math, JSON and friends, plus the engine-specific `adder` object and the
//! host modules (`crypto`, `fs`).
//!
//! Constructor/prototype pairs are created eagerly when a context is built
//! (scripts need the prototypes before the first literal evaluates). The
//! global *bindings* are handler properties: the first read of `Math`,
//! `JSON`, `process`, `adder` or a constructor name materialises the value
//! and caches it into the global object's own table.

pub mod array;
pub mod array_buffer;
pub mod boolean;
pub mod console;
pub mod crypto;
pub mod date;
pub mod engine;
pub mod error;
pub mod fs;
pub mod function;
pub mod json;
pub mod math;
pub mod number;
pub mod object;
pub mod process;
pub mod regexp;
pub mod string;
pub mod symbol;
pub mod uri;

mod encoding;

use crate::{
    error::JsNativeError,
    object::{FunctionBuilder, JsObject},
    property::{Attribute, PropertyDescriptor, PropertyHandler, PropertyKey},
    Context, JsResult, JsValue,
};

/// A global built-in, bound under [`BuiltIn::NAME`].
pub(crate) trait BuiltIn {
    /// Binding name of the built-in inside the global object.
    const NAME: &'static str;

    /// Builds the value of the built-in.
    fn init(context: &mut Context) -> JsValue;
}

/// Creates the intrinsic objects and populates the global object of a
/// fresh context.
pub(crate) fn init(context: &mut Context) {
    // Intrinsics; `Function.prototype` and `Object.prototype` first, since
    // every builder hangs objects off them.
    function::BuiltInFunctionObject::init(context);
    object::BuiltInObjectObject::init(context);
    array::Array::init(context);
    string::String::init(context);
    boolean::Boolean::init(context);
    number::Number::init(context);
    symbol::Symbol::init(context);
    regexp::RegExp::init(context);
    date::Date::init(context);
    array_buffer::ArrayBuffer::init(context);
    error::init_error_constructors(context);

    let global = context.global_object();
    global
        .borrow_mut()
        .set_prototype_unchecked(Some(context.standard_objects().object().prototype()));

    // Restricted value bindings of the top level.
    let restricted = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
    global.insert_property("undefined", JsValue::Undefined, restricted);
    global.insert_property("NaN", f64::NAN, restricted);
    global.insert_property("Infinity", f64::INFINITY, restricted);
    global.insert_property(
        "globalThis",
        global.clone(),
        Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
    );

    // Lazily materialised globals.
    for name in [
        "Object",
        "Function",
        "Array",
        "String",
        "Boolean",
        "Number",
        "Symbol",
        "RegExp",
        "Date",
        "ArrayBuffer",
        "Error",
        "EvalError",
        "RangeError",
        "ReferenceError",
        "SyntaxError",
        "TypeError",
        "URIError",
        "InternalError",
        "MemoryError",
        "Math",
        "JSON",
        "process",
        "console",
        engine::EngineObject::NAME,
    ] {
        global.insert(
            PropertyKey::from(name),
            PropertyDescriptor::handler(
                PropertyHandler {
                    get: Some(lazy_global_get),
                    set: Some(lazy_global_set),
                    delete: None,
                },
                Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            ),
        );
    }

    // Plain global functions.
    let functions: &[(&str, crate::object::NativeFunctionPointer, u32)] = &[
        ("parseInt", number::parse_int, 2),
        ("parseFloat", number::parse_float, 1),
        ("isNaN", number::global_is_nan, 1),
        ("isFinite", number::global_is_finite, 1),
        ("encodeURI", uri::encode_uri, 1),
        ("encodeURIComponent", uri::encode_uri_component, 1),
        ("decodeURI", uri::decode_uri, 1),
        ("decodeURIComponent", uri::decode_uri_component, 1),
        ("require", require, 1),
        ("setTimeout", set_timeout, 2),
        ("setImmediate", set_immediate, 1),
        ("clearTimeout", clear_timeout, 1),
    ];
    for &(name, function, length) in functions {
        let function = FunctionBuilder::new(context, function)
            .name(name)
            .length(length)
            .build();
        context.global_object().insert_property(
            name,
            function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
    }
}

// First read of a lazy global: build the value and cache it as a plain
// data property.
fn lazy_global_get(
    holder: &JsObject,
    key: &PropertyKey,
    context: &mut Context,
) -> JsResult<JsValue> {
    let name = key.to_js_string();
    let value = match name.as_str().unwrap_or_default() {
        "Object" => context.standard_objects().object().constructor().into(),
        "Function" => context.standard_objects().function().constructor().into(),
        "Array" => context.standard_objects().array().constructor().into(),
        "String" => context.standard_objects().string().constructor().into(),
        "Boolean" => context.standard_objects().boolean().constructor().into(),
        "Number" => context.standard_objects().number().constructor().into(),
        "Symbol" => context.standard_objects().symbol().constructor().into(),
        "RegExp" => context.standard_objects().regexp().constructor().into(),
        "Date" => context.standard_objects().date().constructor().into(),
        "ArrayBuffer" => context
            .standard_objects()
            .array_buffer()
            .constructor()
            .into(),
        "Error" => context.standard_objects().error().constructor().into(),
        "EvalError" => context.standard_objects().eval_error().constructor().into(),
        "RangeError" => context
            .standard_objects()
            .range_error()
            .constructor()
            .into(),
        "ReferenceError" => context
            .standard_objects()
            .reference_error()
            .constructor()
            .into(),
        "SyntaxError" => context
            .standard_objects()
            .syntax_error()
            .constructor()
            .into(),
        "TypeError" => context.standard_objects().type_error().constructor().into(),
        "URIError" => context.standard_objects().uri_error().constructor().into(),
        "InternalError" => context
            .standard_objects()
            .internal_error()
            .constructor()
            .into(),
        "MemoryError" => context
            .standard_objects()
            .memory_error()
            .constructor()
            .into(),
        "Math" => math::Math::init(context),
        "JSON" => json::Json::init(context),
        "process" => process::Process::init(context),
        "console" => console::Console::init(context),
        engine::EngineObject::NAME => engine::EngineObject::init(context),
        _ => JsValue::Undefined,
    };
    holder.borrow_mut().insert(
        key.clone(),
        PropertyDescriptor::data(
            value.clone(),
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        ),
    );
    Ok(value)
}

fn lazy_global_set(
    holder: &JsObject,
    key: &PropertyKey,
    value: &JsValue,
    _context: &mut Context,
) -> JsResult<()> {
    holder.borrow_mut().insert(
        key.clone(),
        PropertyDescriptor::data(
            value.clone(),
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        ),
    );
    Ok(())
}

/// `require(id)`: resolves the built-in module identifiers.
pub(crate) fn require(
    _this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let id = args
        .first()
        .cloned()
        .unwrap_or_default()
        .to_string(context)?;
    let Some(id) = id.as_str().map(str::to_owned) else {
        return Err(JsNativeError::error()
            .with_message("Cannot find module")
            .into());
    };
    load_module(&id, context)
}

pub(crate) fn load_module(id: &str, context: &mut Context) -> JsResult<JsValue> {
    if let Some(module) = context.modules.get(id) {
        return Ok(module.clone());
    }
    let module = match id {
        "crypto" => crypto::Crypto::init(context),
        // `fs` is marked "sandbox": unavailable in sandboxed contexts.
        "fs" if !context.sandbox => fs::Fs::init(context),
        _ => {
            return Err(JsNativeError::error()
                .with_message(format!("Cannot find module \"{id}\""))
                .into());
        }
    };
    context.modules.insert(id.to_owned(), module.clone());
    Ok(module)
}

// The timer globals only forward to a host hook; the core itself never
// schedules anything.
fn set_timeout(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    forward_to_timer_hook(this, args, context)
}

fn set_immediate(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    forward_to_timer_hook(this, args, context)
}

fn clear_timeout(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    forward_to_timer_hook(this, args, context)
}

fn forward_to_timer_hook(
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let Some(hook) = context.timer_hook.clone() else {
        return Err(JsNativeError::internal()
            .with_message("not supported by host environment")
            .into());
    };
    hook(this, args, context)
}
