//! The realm: the mutable world of one context, cloned from the shared
//! descriptions at context creation.
//!
//! Holds the global object, the standard constructor/prototype pairs, and
//! the per-kind instance property tables (the handler-backed `length`,
//! `name`, `prototype`, `lastIndex`, … members every instance of a kind
//! presents without owning a copy).

use crate::{
    builtins,
    error::JsNativeError,
    object::{Function, JsObject, ObjectKind, PropertyMap},
    property::{Attribute, PropertyDescriptor, PropertyHandler, PropertyKey},
    Context, JsResult, JsValue,
};
use std::rc::Rc;

/// A constructor/prototype pair of one standard built-in.
#[derive(Debug, Clone)]
pub struct StandardConstructor {
    constructor: JsObject,
    prototype: JsObject,
}

impl StandardConstructor {
    fn new() -> Self {
        Self {
            // Placeholders; the builders upgrade them during init.
            constructor: JsObject::ordinary(None),
            prototype: JsObject::ordinary(None),
        }
    }

    /// The constructor object.
    #[must_use]
    pub fn constructor(&self) -> JsObject {
        self.constructor.clone()
    }

    /// The prototype object.
    #[must_use]
    pub fn prototype(&self) -> JsObject {
        self.prototype.clone()
    }
}

/// The standard constructors of a realm.
#[derive(Debug, Clone)]
pub struct StandardObjects {
    object: StandardConstructor,
    function: StandardConstructor,
    array: StandardConstructor,
    boolean: StandardConstructor,
    number: StandardConstructor,
    string: StandardConstructor,
    symbol: StandardConstructor,
    regexp: StandardConstructor,
    date: StandardConstructor,
    array_buffer: StandardConstructor,
    error: StandardConstructor,
    eval_error: StandardConstructor,
    range_error: StandardConstructor,
    reference_error: StandardConstructor,
    syntax_error: StandardConstructor,
    type_error: StandardConstructor,
    uri_error: StandardConstructor,
    internal_error: StandardConstructor,
    memory_error: StandardConstructor,
}

macro_rules! standard_object_accessors {
    ($($name:ident),* $(,)?) => {
        $(
            /// Gets this standard constructor pair.
            #[must_use]
            pub fn $name(&self) -> StandardConstructor {
                self.$name.clone()
            }
        )*
    };
}

impl StandardObjects {
    fn new() -> Self {
        Self {
            object: StandardConstructor::new(),
            function: StandardConstructor::new(),
            array: StandardConstructor::new(),
            boolean: StandardConstructor::new(),
            number: StandardConstructor::new(),
            string: StandardConstructor::new(),
            symbol: StandardConstructor::new(),
            regexp: StandardConstructor::new(),
            date: StandardConstructor::new(),
            array_buffer: StandardConstructor::new(),
            error: StandardConstructor::new(),
            eval_error: StandardConstructor::new(),
            range_error: StandardConstructor::new(),
            reference_error: StandardConstructor::new(),
            syntax_error: StandardConstructor::new(),
            type_error: StandardConstructor::new(),
            uri_error: StandardConstructor::new(),
            internal_error: StandardConstructor::new(),
            memory_error: StandardConstructor::new(),
        }
    }

    standard_object_accessors!(
        object,
        function,
        array,
        boolean,
        number,
        string,
        symbol,
        regexp,
        date,
        array_buffer,
        error,
        eval_error,
        range_error,
        reference_error,
        syntax_error,
        type_error,
        uri_error,
        internal_error,
        memory_error,
    );
}

/// The mutable world of one context.
#[derive(Debug)]
pub struct Realm {
    global: JsObject,
    standard_objects: StandardObjects,
    function_instances: Rc<PropertyMap>,
    arrow_instances: Rc<PropertyMap>,
    arguments_instances: Rc<PropertyMap>,
    array_instances: Rc<PropertyMap>,
    string_instances: Rc<PropertyMap>,
    regexp_instances: Rc<PropertyMap>,
}

impl Realm {
    pub(crate) fn new() -> Self {
        Self {
            global: JsObject::new(ObjectKind::Global, None),
            standard_objects: StandardObjects::new(),
            function_instances: Rc::new(function_instance_table(false)),
            arrow_instances: Rc::new(function_instance_table(true)),
            arguments_instances: Rc::new(arguments_instance_table()),
            array_instances: Rc::new(array_instance_table()),
            string_instances: Rc::new(string_instance_table()),
            regexp_instances: Rc::new(regexp_instance_table()),
        }
    }

    /// The global object.
    #[must_use]
    pub fn global_object(&self) -> JsObject {
        self.global.clone()
    }

    /// The standard constructors.
    #[must_use]
    pub fn standard_objects(&self) -> &StandardObjects {
        &self.standard_objects
    }

    /// Instance table for ordinary bytecode functions.
    #[must_use]
    pub fn function_instance_table(&self) -> Rc<PropertyMap> {
        Rc::clone(&self.function_instances)
    }

    /// Instance table for arrow functions (no `prototype`).
    #[must_use]
    pub fn arrow_instance_table(&self) -> Rc<PropertyMap> {
        Rc::clone(&self.arrow_instances)
    }

    /// Instance table for `arguments` objects.
    #[must_use]
    pub fn arguments_instance_table(&self) -> Rc<PropertyMap> {
        Rc::clone(&self.arguments_instances)
    }

    /// Instance table for arrays.
    #[must_use]
    pub fn array_instance_table(&self) -> Rc<PropertyMap> {
        Rc::clone(&self.array_instances)
    }

    /// Instance table for string wrappers.
    #[must_use]
    pub fn string_instance_table(&self) -> Rc<PropertyMap> {
        Rc::clone(&self.string_instances)
    }

    /// Instance table for regexps.
    #[must_use]
    pub fn regexp_instance_table(&self) -> Rc<PropertyMap> {
        Rc::clone(&self.regexp_instances)
    }
}

// === instance property handlers ===

fn array_length_get(holder: &JsObject, _: &PropertyKey, _: &mut Context) -> JsResult<JsValue> {
    let length = holder
        .borrow()
        .as_array()
        .map_or(0, crate::object::ArrayStorage::length);
    Ok(JsValue::from(f64::from(length)))
}

fn array_length_set(
    holder: &JsObject,
    _: &PropertyKey,
    value: &JsValue,
    context: &mut Context,
) -> JsResult<()> {
    let length = builtins::array::to_array_length(value, context)?;
    holder.set_array_length(length, context)
}

fn array_instance_table() -> PropertyMap {
    let mut table = PropertyMap::new();
    table.insert(
        PropertyKey::from("length"),
        PropertyDescriptor::handler(
            PropertyHandler {
                get: Some(array_length_get),
                set: Some(array_length_set),
                delete: None,
            },
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
        ),
    );
    table
}

fn function_name_get(holder: &JsObject, _: &PropertyKey, _: &mut Context) -> JsResult<JsValue> {
    let name = holder
        .borrow()
        .as_function()
        .map_or_else(crate::JsString::default, Function::name);
    Ok(JsValue::from(name))
}

fn function_length_get(holder: &JsObject, _: &PropertyKey, _: &mut Context) -> JsResult<JsValue> {
    let length = holder.borrow().as_function().map_or(0, Function::length);
    Ok(JsValue::from(f64::from(length)))
}

// `fn.prototype` materialises on first read and caches into the private
// table, so every later read sees the same object.
fn function_prototype_get(
    holder: &JsObject,
    key: &PropertyKey,
    context: &mut Context,
) -> JsResult<JsValue> {
    let prototype = JsObject::ordinary(Some(context.standard_objects().object().prototype()));
    prototype.insert_property(
        "constructor",
        holder.clone(),
        Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
    );
    holder.borrow_mut().insert(
        key.clone(),
        PropertyDescriptor::data(
            prototype.clone(),
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
        ),
    );
    Ok(JsValue::from(prototype))
}

fn function_prototype_set(
    holder: &JsObject,
    key: &PropertyKey,
    value: &JsValue,
    _: &mut Context,
) -> JsResult<()> {
    holder.borrow_mut().insert(
        key.clone(),
        PropertyDescriptor::data(
            value.clone(),
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
        ),
    );
    Ok(())
}

fn function_instance_table(arrow: bool) -> PropertyMap {
    let mut table = PropertyMap::new();
    let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
    table.insert(
        PropertyKey::from("name"),
        PropertyDescriptor::handler(
            PropertyHandler {
                get: Some(function_name_get),
                set: None,
                delete: None,
            },
            attribute,
        ),
    );
    table.insert(
        PropertyKey::from("length"),
        PropertyDescriptor::handler(
            PropertyHandler {
                get: Some(function_length_get),
                set: None,
                delete: None,
            },
            attribute,
        ),
    );
    if !arrow {
        table.insert(
            PropertyKey::from("prototype"),
            PropertyDescriptor::handler(
                PropertyHandler {
                    get: Some(function_prototype_get),
                    set: Some(function_prototype_set),
                    delete: None,
                },
                Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
            ),
        );
    }
    table
}

fn arguments_restricted(
    _holder: &JsObject,
    key: &PropertyKey,
    _: &mut Context,
) -> JsResult<JsValue> {
    Err(JsNativeError::typ()
        .with_message(format!(
            "\"{key}\" property of the arguments object may not be accessed"
        ))
        .into())
}

fn arguments_restricted_set(
    _holder: &JsObject,
    key: &PropertyKey,
    _: &JsValue,
    _: &mut Context,
) -> JsResult<()> {
    Err(JsNativeError::typ()
        .with_message(format!(
            "\"{key}\" property of the arguments object may not be accessed"
        ))
        .into())
}

fn arguments_instance_table() -> PropertyMap {
    let mut table = PropertyMap::new();
    let handler = PropertyHandler {
        get: Some(arguments_restricted),
        set: Some(arguments_restricted_set),
        delete: None,
    };
    let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
    table.insert(
        PropertyKey::from("callee"),
        PropertyDescriptor::handler(handler, attribute),
    );
    table.insert(
        PropertyKey::from("caller"),
        PropertyDescriptor::handler(handler, attribute),
    );
    table
}

fn string_length_get(holder: &JsObject, _: &PropertyKey, _: &mut Context) -> JsResult<JsValue> {
    let length = match holder.borrow().kind() {
        ObjectKind::String(string) => string.len(),
        _ => 0,
    };
    Ok(JsValue::from(length as f64))
}

fn string_instance_table() -> PropertyMap {
    let mut table = PropertyMap::new();
    table.insert(
        PropertyKey::from("length"),
        PropertyDescriptor::handler(
            PropertyHandler {
                get: Some(string_length_get),
                set: None,
                delete: None,
            },
            Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
        ),
    );
    table
}

fn with_regexp<R>(holder: &JsObject, read: impl FnOnce(&crate::object::RegExpData) -> R) -> Option<R> {
    let borrowed = holder.borrow();
    match borrowed.kind() {
        ObjectKind::RegExp(data) => Some(read(data)),
        _ => None,
    }
}

fn regexp_source_get(holder: &JsObject, _: &PropertyKey, _: &mut Context) -> JsResult<JsValue> {
    Ok(with_regexp(holder, |data| JsValue::from(data.source.clone()))
        .unwrap_or(JsValue::Undefined))
}

fn regexp_flags_get(holder: &JsObject, _: &PropertyKey, _: &mut Context) -> JsResult<JsValue> {
    Ok(with_regexp(holder, |data| JsValue::from(data.flags.clone())).unwrap_or(JsValue::Undefined))
}

fn regexp_global_get(holder: &JsObject, _: &PropertyKey, _: &mut Context) -> JsResult<JsValue> {
    Ok(with_regexp(holder, |data| JsValue::from(data.global())).unwrap_or(JsValue::Undefined))
}

fn regexp_flag_get(holder: &JsObject, key: &PropertyKey, _: &mut Context) -> JsResult<JsValue> {
    let flag = match key.to_js_string().as_str() {
        Some("ignoreCase") => 'i',
        Some("multiline") => 'm',
        Some("sticky") => 'y',
        _ => return Ok(JsValue::Undefined),
    };
    Ok(
        with_regexp(holder, |data| {
            JsValue::from(data.flags.as_str().is_some_and(|f| f.contains(flag)))
        })
        .unwrap_or(JsValue::Undefined),
    )
}

fn regexp_last_index_get(holder: &JsObject, _: &PropertyKey, _: &mut Context) -> JsResult<JsValue> {
    Ok(with_regexp(holder, |data| JsValue::from(data.last_index)).unwrap_or(JsValue::Undefined))
}

fn regexp_last_index_set(
    holder: &JsObject,
    _: &PropertyKey,
    value: &JsValue,
    context: &mut Context,
) -> JsResult<()> {
    let number = value.to_number(context)?;
    let mut borrowed = holder.borrow_mut();
    if let ObjectKind::RegExp(data) = borrowed.kind_mut() {
        data.last_index = number;
    }
    Ok(())
}

fn regexp_instance_table() -> PropertyMap {
    let mut table = PropertyMap::new();
    let readonly = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
    let getter = |get| PropertyHandler {
        get: Some(get),
        set: None,
        delete: None,
    };
    table.insert(
        PropertyKey::from("lastIndex"),
        PropertyDescriptor::handler(
            PropertyHandler {
                get: Some(regexp_last_index_get),
                set: Some(regexp_last_index_set),
                delete: None,
            },
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
        ),
    );
    table.insert(
        PropertyKey::from("source"),
        PropertyDescriptor::handler(getter(regexp_source_get), readonly),
    );
    table.insert(
        PropertyKey::from("flags"),
        PropertyDescriptor::handler(getter(regexp_flags_get), readonly),
    );
    table.insert(
        PropertyKey::from("global"),
        PropertyDescriptor::handler(getter(regexp_global_get), readonly),
    );
    table.insert(
        PropertyKey::from("ignoreCase"),
        PropertyDescriptor::handler(getter(regexp_flag_get), readonly),
    );
    table.insert(
        PropertyKey::from("multiline"),
        PropertyDescriptor::handler(getter(regexp_flag_get), readonly),
    );
    table.insert(
        PropertyKey::from("sticky"),
        PropertyDescriptor::handler(getter(regexp_flag_get), readonly),
    );
    table
}
