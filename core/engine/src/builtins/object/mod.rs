//! The global `Object` object.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-object-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Object

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::{ConstructorBuilder, JsObject, ObjectKind},
    property::{Attribute, PropertyDescriptor, PropertyKey, PropertyKind},
    value::same_value,
    Context, JsArgs, JsResult, JsString, JsValue,
};

/// The `Object` built-in (named to avoid clashing with [`crate::object`]).
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuiltInObjectObject;

impl BuiltIn for BuiltInObjectObject {
    const NAME: &'static str = "Object";

    fn init(context: &mut Context) -> JsValue {
        let standard = context.standard_objects().object();
        let constructor = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            standard,
        )
        .name(Self::NAME)
        .length(1)
        .static_method(Self::keys, "keys", 1)
        .static_method(Self::values, "values", 1)
        .static_method(Self::entries, "entries", 1)
        .static_method(Self::assign, "assign", 2)
        .static_method(Self::create, "create", 2)
        .static_method(Self::define_property, "defineProperty", 3)
        .static_method(Self::define_properties, "defineProperties", 2)
        .static_method(
            Self::get_own_property_descriptor,
            "getOwnPropertyDescriptor",
            2,
        )
        .static_method(Self::get_own_property_names, "getOwnPropertyNames", 1)
        .static_method(Self::get_prototype_of, "getPrototypeOf", 1)
        .static_method(Self::set_prototype_of, "setPrototypeOf", 2)
        .static_method(Self::freeze, "freeze", 1)
        .static_method(Self::is_frozen, "isFrozen", 1)
        .static_method(Self::seal, "seal", 1)
        .static_method(Self::is_sealed, "isSealed", 1)
        .static_method(Self::prevent_extensions, "preventExtensions", 1)
        .static_method(Self::is_extensible, "isExtensible", 1)
        .static_method(Self::is, "is", 2)
        .method(Self::has_own_property, "hasOwnProperty", 1)
        .method(Self::is_prototype_of, "isPrototypeOf", 1)
        .method(Self::property_is_enumerable, "propertyIsEnumerable", 1)
        .method(Self::to_string, "toString", 0)
        .method(Self::to_locale_string, "toLocaleString", 0)
        .method(Self::value_of, "valueOf", 0)
        .accessor(
            "__proto__",
            Some(Self::proto_getter),
            Some(Self::proto_setter),
            Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        )
        .build();

        // `Object.prototype` terminates every prototype chain.
        let prototype = context.standard_objects().object().prototype();
        prototype.borrow_mut().set_prototype_unchecked(None);
        JsValue::Object(constructor)
    }
}

impl BuiltInObjectObject {
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        match args.get_or_undefined(0) {
            JsValue::Null | JsValue::Undefined => Ok(JsValue::Object(context.object_new())),
            value => Ok(JsValue::Object(value.to_object(context)?)),
        }
    }

    /// `Object.keys( target )`
    pub(crate) fn keys(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = args.get_or_undefined(0).to_object(context)?;
        let keys: Vec<JsValue> = object
            .enumerable_keys()
            .into_iter()
            .map(|key| JsValue::String(key.to_js_string()))
            .collect();
        Ok(JsValue::Object(context.array_from(keys)))
    }

    /// `Object.values( target )`
    fn values(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = args.get_or_undefined(0).to_object(context)?;
        let mut values = Vec::new();
        for key in object.enumerable_keys() {
            values.push(object.get(&key, context)?.materialized());
        }
        Ok(JsValue::Object(context.array_from(values)))
    }

    /// `Object.entries( target )`
    fn entries(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = args.get_or_undefined(0).to_object(context)?;
        let mut entries = Vec::new();
        for key in object.enumerable_keys() {
            let value = object.get(&key, context)?.materialized();
            let pair = context.array_from(vec![JsValue::String(key.to_js_string()), value]);
            entries.push(JsValue::Object(pair));
        }
        Ok(JsValue::Object(context.array_from(entries)))
    }

    /// `Object.assign( target, ...sources )`
    fn assign(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = args.get_or_undefined(0).to_object(context)?;
        for source in args.iter().skip(1) {
            if source.is_null_or_undefined() {
                continue;
            }
            let source = source.to_object(context)?;
            for (key, enumerable) in source.own_keys_with_enumerability(true) {
                if !enumerable {
                    continue;
                }
                let value = source.get(&key, context)?.materialized();
                target.set(key, value, context)?;
            }
        }
        Ok(JsValue::Object(target))
    }

    /// `Object.create( prototype[, properties] )`
    fn create(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let prototype = match args.get_or_undefined(0) {
            JsValue::Null => None,
            JsValue::Object(object) => Some(object.clone()),
            other => {
                return Err(JsNativeError::typ()
                    .with_message(format!(
                        "Object prototype may only be an Object or null: {}",
                        other.display()
                    ))
                    .into());
            }
        };
        let object = JsObject::ordinary(prototype);
        if let Some(properties) = args.get(1) {
            if !properties.is_undefined() {
                Self::define_properties_on(&object, properties, context)?;
            }
        }
        Ok(JsValue::Object(object))
    }

    /// `Object.defineProperty( target, key, descriptor )`
    pub(crate) fn define_property(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let Some(object) = args.get_or_undefined(0).as_object().cloned() else {
            return Err(JsNativeError::typ()
                .with_message("Object.defineProperty called on non-object")
                .into());
        };
        let key = args.get_or_undefined(1).to_property_key(context)?;
        let descriptor = descriptor_from_object(args.get_or_undefined(2), context)?;
        object.define_own_property(key, descriptor, context)?;
        Ok(JsValue::Object(object))
    }

    /// `Object.defineProperties( target, properties )`
    fn define_properties(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let Some(object) = args.get_or_undefined(0).as_object().cloned() else {
            return Err(JsNativeError::typ()
                .with_message("Object.defineProperties called on non-object")
                .into());
        };
        Self::define_properties_on(&object, args.get_or_undefined(1), context)?;
        Ok(JsValue::Object(object))
    }

    fn define_properties_on(
        object: &JsObject,
        properties: &JsValue,
        context: &mut Context,
    ) -> JsResult<()> {
        let properties = properties.to_object(context)?;
        for key in properties.enumerable_keys() {
            let descriptor = properties.get(&key, context)?;
            let descriptor = descriptor_from_object(&descriptor, context)?;
            object.define_own_property(key, descriptor, context)?;
        }
        Ok(())
    }

    /// `Object.getOwnPropertyDescriptor( target, key )`
    fn get_own_property_descriptor(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = args.get_or_undefined(0).to_object(context)?;
        let key = args.get_or_undefined(1).to_property_key(context)?;
        match object.own_property_descriptor(&key, context)? {
            Some(descriptor) => descriptor_to_object(&descriptor, context),
            None => Ok(JsValue::Undefined),
        }
    }

    /// `Object.getOwnPropertyNames( target )`
    fn get_own_property_names(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = args.get_or_undefined(0).to_object(context)?;
        let names: Vec<JsValue> = object
            .own_keys_with_enumerability(false)
            .into_iter()
            .map(|(key, _)| JsValue::String(key.to_js_string()))
            .collect();
        Ok(JsValue::Object(context.array_from(names)))
    }

    /// `Object.getPrototypeOf( target )`
    fn get_prototype_of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = args.get_or_undefined(0).to_object(context)?;
        Ok(object
            .prototype()
            .map_or(JsValue::Null, JsValue::Object))
    }

    /// `Object.setPrototypeOf( target, prototype )`
    fn set_prototype_of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = args.get_or_undefined(0).clone();
        let prototype = args.get_or_undefined(1).clone();
        Self::apply_prototype(&target, &prototype, context)?;
        Ok(target)
    }

    fn apply_prototype(
        target: &JsValue,
        prototype: &JsValue,
        _context: &mut Context,
    ) -> JsResult<()> {
        let Some(object) = target.as_object() else {
            return Ok(());
        };
        let prototype = match prototype {
            JsValue::Null => None,
            JsValue::Object(prototype) => Some(prototype.clone()),
            _ => return Ok(()),
        };
        if !object.set_prototype(prototype) {
            return Err(JsNativeError::typ()
                .with_message("Cyclic __proto__ value")
                .into());
        }
        Ok(())
    }

    /// `Object.freeze( target )`
    fn freeze(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get_or_undefined(0).clone();
        if let Some(object) = value.as_object() {
            object.freeze(context)?;
        }
        Ok(value)
    }

    /// `Object.isFrozen( target )`
    fn is_frozen(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(
            args.get_or_undefined(0)
                .as_object()
                .is_none_or(JsObject::is_frozen),
        ))
    }

    /// `Object.seal( target )`
    fn seal(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get_or_undefined(0).clone();
        if let Some(object) = value.as_object() {
            object.seal(context)?;
        }
        Ok(value)
    }

    /// `Object.isSealed( target )`
    fn is_sealed(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(
            args.get_or_undefined(0)
                .as_object()
                .is_none_or(JsObject::is_sealed),
        ))
    }

    /// `Object.preventExtensions( target )`
    fn prevent_extensions(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let value = args.get_or_undefined(0).clone();
        if let Some(object) = value.as_object() {
            object.prevent_extensions();
        }
        Ok(value)
    }

    /// `Object.isExtensible( target )`
    fn is_extensible(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(
            args.get_or_undefined(0)
                .as_object()
                .is_some_and(|object| object.borrow().extensible()),
        ))
    }

    /// `Object.is( a, b )`
    fn is(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(same_value(
            args.get_or_undefined(0),
            args.get_or_undefined(1),
        )))
    }

    /// `Object.prototype.hasOwnProperty( key )`
    fn has_own_property(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let key = args.get_or_undefined(0).to_property_key(context)?;
        let object = this.to_object(context)?;
        Ok(JsValue::Boolean(object.has_own_property(&key)))
    }

    /// `Object.prototype.isPrototypeOf( value )`
    fn is_prototype_of(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let Some(target) = args.get_or_undefined(0).as_object() else {
            return Ok(JsValue::Boolean(false));
        };
        let this = this.to_object(context)?;
        let mut cursor = target.prototype();
        while let Some(object) = cursor {
            if object.ptr_eq(&this) {
                return Ok(JsValue::Boolean(true));
            }
            cursor = object.prototype();
        }
        Ok(JsValue::Boolean(false))
    }

    /// `Object.prototype.propertyIsEnumerable( key )`
    fn property_is_enumerable(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let key = args.get_or_undefined(0).to_property_key(context)?;
        let object = this.to_object(context)?;
        let enumerable = object
            .own_property_descriptor(&key, context)?
            .is_some_and(|descriptor| descriptor.enumerable());
        Ok(JsValue::Boolean(enumerable))
    }

    /// `Object.prototype.toString()`
    pub(crate) fn to_string(
        this: &JsValue,
        _: &[JsValue],
        _: &mut Context,
    ) -> JsResult<JsValue> {
        let tag = match this {
            JsValue::Null => "Null",
            JsValue::Undefined => "Undefined",
            JsValue::Boolean(_) => "Boolean",
            JsValue::Number(_) => "Number",
            JsValue::String(_) => "String",
            JsValue::Symbol(_) => "Symbol",
            JsValue::Object(object) => match object.borrow().kind() {
                ObjectKind::Array(_) => "Array",
                ObjectKind::Function(_) => "Function",
                ObjectKind::Boolean(_) => "Boolean",
                ObjectKind::Number(_) => "Number",
                ObjectKind::String(_) => "String",
                ObjectKind::Error(_) => "Error",
                ObjectKind::Date(_) => "Date",
                ObjectKind::RegExp(_) => "RegExp",
                _ => "Object",
            },
            _ => "Object",
        };
        Ok(JsValue::String(JsString::from(format!("[object {tag}]"))))
    }

    /// `Object.prototype.toLocaleString()`
    fn to_locale_string(
        this: &JsValue,
        _: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let method = this.get_v(&PropertyKey::from("toString"), context)?;
        context.call(&method, this, &[])
    }

    /// `Object.prototype.valueOf()`
    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Object(this.to_object(context)?))
    }

    fn proto_getter(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.to_object(context)?;
        Ok(object
            .prototype()
            .map_or(JsValue::Null, JsValue::Object))
    }

    fn proto_setter(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::apply_prototype(this, args.get_or_undefined(0), context)?;
        Ok(JsValue::Undefined)
    }
}

/// Reads a JS descriptor object (`{value, get, set, writable, …}`) into a
/// [`PropertyDescriptor`].
pub(crate) fn descriptor_from_object(
    value: &JsValue,
    context: &mut Context,
) -> JsResult<PropertyDescriptor> {
    let Some(object) = value.as_object() else {
        return Err(JsNativeError::typ()
            .with_message("Property description must be an object")
            .into());
    };
    let mut descriptor = PropertyDescriptor::empty();

    let has = |name: &str| object.has_property(&PropertyKey::from(name));
    if has("enumerable") {
        let flag = object.get(&PropertyKey::from("enumerable"), context)?;
        descriptor.set_enumerable(flag.to_boolean());
    }
    if has("configurable") {
        let flag = object.get(&PropertyKey::from("configurable"), context)?;
        descriptor.set_configurable(flag.to_boolean());
    }
    if has("writable") {
        let flag = object.get(&PropertyKey::from("writable"), context)?;
        descriptor.set_writable(flag.to_boolean());
    }

    let has_value = has("value");
    let has_get = has("get");
    let has_set = has("set");
    if (has_get || has_set) && (has_value || has("writable")) {
        return Err(JsNativeError::typ()
            .with_message("Invalid property descriptor: cannot mix accessors and a value")
            .into());
    }
    if has_get || has_set {
        let get = accessor_half(object, "get", context)?;
        let set = accessor_half(object, "set", context)?;
        descriptor.set_kind(PropertyKind::Accessor { get, set });
    } else if has_value {
        let value = object.get(&PropertyKey::from("value"), context)?;
        descriptor.set_kind(PropertyKind::Data(value));
    }
    Ok(descriptor)
}

fn accessor_half(
    object: &JsObject,
    name: &str,
    context: &mut Context,
) -> JsResult<Option<JsObject>> {
    let value = object.get(&PropertyKey::from(name), context)?;
    match value {
        JsValue::Undefined => Ok(None),
        JsValue::Object(function) if function.is_callable() => Ok(Some(function)),
        _ => Err(JsNativeError::typ()
            .with_message(format!("Property descriptor \"{name}\" must be callable"))
            .into()),
    }
}

/// Reifies a [`PropertyDescriptor`] into the JS object form.
pub(crate) fn descriptor_to_object(
    descriptor: &PropertyDescriptor,
    context: &mut Context,
) -> JsResult<JsValue> {
    let object = context.object_new();
    let attribute = Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::CONFIGURABLE;
    match descriptor.kind() {
        PropertyKind::Data(value) => {
            object.insert_property("value", value.clone(), attribute);
            object.insert_property("writable", descriptor.writable(), attribute);
        }
        PropertyKind::Accessor { get, set } => {
            object.insert_property(
                "get",
                get.clone().map_or(JsValue::Undefined, JsValue::Object),
                attribute,
            );
            object.insert_property(
                "set",
                set.clone().map_or(JsValue::Undefined, JsValue::Object),
                attribute,
            );
        }
        _ => {}
    }
    object.insert_property("enumerable", descriptor.enumerable(), attribute);
    object.insert_property("configurable", descriptor.configurable(), attribute);
    Ok(JsValue::Object(object))
}
