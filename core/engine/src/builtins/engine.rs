//! The engine's own global object (`adder`): version metadata and the
//! `dump` debug formatter.
//!
//! `dump` mirrors `JSON.stringify` but is loss-tolerant: it preserves
//! holes, marks boxed primitives and accessors, renders `-0` and walks
//! cycles with a seen set instead of throwing.

use super::BuiltIn;
use crate::{
    object::{JsObject, ObjectInitializer, ObjectKind},
    property::{Attribute, PropertyKey, PropertyKind},
    value::number_to_js_string,
    Context, JsArgs, JsResult, JsString, JsValue,
};

/// The engine object built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EngineObject;

impl BuiltIn for EngineObject {
    const NAME: &'static str = "adder";

    fn init(context: &mut Context) -> JsValue {
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        let object = ObjectInitializer::new(context)
            .property("version", crate::shared::VERSION, attribute)
            .function(Self::dump, "dump", 1)
            .build();
        JsValue::Object(object)
    }
}

impl EngineObject {
    /// `adder.dump( value )`
    fn dump(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut seen = Vec::new();
        let text = dump_value(args.get_or_undefined(0), &mut seen, context)?;
        Ok(JsValue::String(JsString::from(text)))
    }
}

/// Renders a value for debugging; shared with `console.log`.
pub(crate) fn dump_value(
    value: &JsValue,
    seen: &mut Vec<JsObject>,
    context: &mut Context,
) -> JsResult<String> {
    match value {
        JsValue::Null => Ok("null".to_owned()),
        JsValue::Undefined | JsValue::Invalid => Ok("undefined".to_owned()),
        JsValue::Boolean(boolean) => Ok(boolean.to_string()),
        JsValue::Number(number) => {
            // -0 stays visible here, unlike in JSON.
            if *number == 0.0 && number.is_sign_negative() {
                return Ok("-0".to_owned());
            }
            Ok(number_to_js_string(*number).to_std_string_lossy())
        }
        JsValue::String(string) => Ok(format!("'{string}'")),
        JsValue::Symbol(symbol) => Ok(symbol.descriptive_string().to_std_string_lossy()),
        JsValue::Data(_) => Ok("[data]".to_owned()),
        JsValue::External(_) => Ok("[external]".to_owned()),
        JsValue::Object(object) => dump_object(object, seen, context),
    }
}

fn dump_object(
    object: &JsObject,
    seen: &mut Vec<JsObject>,
    context: &mut Context,
) -> JsResult<String> {
    if seen.iter().any(|earlier| earlier.ptr_eq(object)) {
        return Ok("[Circular]".to_owned());
    }

    enum Shape {
        Array,
        Plain,
        Date(f64),
        Done(String),
    }
    let shape = {
        let borrowed = object.borrow();
        match borrowed.kind() {
            ObjectKind::Boolean(value) => Shape::Done(format!("[Boolean: {value}]")),
            ObjectKind::Number(value) => Shape::Done(format!(
                "[Number: {}]",
                number_to_js_string(*value).to_std_string_lossy()
            )),
            ObjectKind::String(value) => Shape::Done(format!("[String: '{value}']")),
            ObjectKind::Symbol(value) => {
                Shape::Done(format!("[Symbol: {}]", value.descriptive_string()))
            }
            ObjectKind::Function(function) => {
                let name = function.name();
                Shape::Done(if name.is_empty() {
                    "[Function (anonymous)]".to_owned()
                } else {
                    format!("[Function: {name}]")
                })
            }
            ObjectKind::RegExp(data) => Shape::Done(format!("/{}/{}", data.source, data.flags)),
            ObjectKind::Date(time) => Shape::Date(*time),
            ObjectKind::Error(kind) => {
                let message = borrowed
                    .error_message()
                    .map_or_else(String::new, |m| m.to_std_string_lossy());
                Shape::Done(if message.is_empty() {
                    kind.to_string()
                } else {
                    format!("{kind}: {message}")
                })
            }
            ObjectKind::Array(_) => Shape::Array,
            _ => Shape::Plain,
        }
    };

    match shape {
        Shape::Done(text) => Ok(text),
        Shape::Date(time) => {
            if time.is_nan() {
                return Ok("Invalid Date".to_owned());
            }
            let receiver = JsValue::Object(object.clone());
            let method = receiver.get_v(&PropertyKey::from("toISOString"), context)?;
            let text = context.call(&method, &receiver, &[])?.to_string(context)?;
            Ok(text.to_std_string_lossy())
        }
        Shape::Array => {
            seen.push(object.clone());
            let result = dump_array(object, seen, context);
            seen.pop();
            result
        }
        Shape::Plain => {
            seen.push(object.clone());
            let result = dump_plain_object(object, seen, context);
            seen.pop();
            result
        }
    }
}

fn dump_array(
    object: &JsObject,
    seen: &mut Vec<JsObject>,
    context: &mut Context,
) -> JsResult<String> {
    let length = {
        let borrowed = object.borrow();
        borrowed
            .as_array()
            .map_or(0, crate::object::ArrayStorage::length)
    };
    let mut parts = Vec::new();
    for index in 0..length {
        let key = PropertyKey::Index(index);
        if object.has_own_property(&key) {
            let element = object.get(&key, context)?;
            parts.push(dump_value(&element, seen, context)?);
        } else {
            parts.push("<empty>".to_owned());
        }
    }
    Ok(format!("[{}]", parts.join(",")))
}

fn dump_plain_object(
    object: &JsObject,
    seen: &mut Vec<JsObject>,
    context: &mut Context,
) -> JsResult<String> {
    let mut parts = Vec::new();
    for key in object.enumerable_keys() {
        let rendered = match accessor_view(object, &key) {
            Some((true, true)) => "[Getter/Setter]".to_owned(),
            Some((true, false)) => "[Getter]".to_owned(),
            Some((false, _)) => "[Setter]".to_owned(),
            None => {
                let value = object.get(&key, context)?;
                dump_value(&value, seen, context)?
            }
        };
        parts.push(format!("{key}:{rendered}"));
    }
    Ok(format!("{{{}}}", parts.join(",")))
}

// Accessor properties are marked instead of invoked.
fn accessor_view(object: &JsObject, key: &PropertyKey) -> Option<(bool, bool)> {
    let borrowed = object.borrow();
    let descriptor = borrowed.properties().get(key).or_else(|| {
        borrowed
            .shared_properties()
            .and_then(|shared| shared.get(key))
    })?;
    match descriptor.kind() {
        PropertyKind::Accessor { get, set } => Some((get.is_some(), set.is_some())),
        _ => None,
    }
}
