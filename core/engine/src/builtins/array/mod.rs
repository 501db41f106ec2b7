//! The global `Array` object.
//!
//! The methods follow the ECMAScript algorithms: they read `length` up
//! front and access elements through the property protocol, so callbacks
//! that mutate the array mid-iteration observe the mutations the way the
//! standard prescribes.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-array-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Array

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::{ConstructorBuilder, JsObject},
    property::PropertyKey,
    value::{same_value_zero, IntegerOrInfinity},
    Context, JsArgs, JsResult, JsString, JsValue,
};

/// The `Array` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Array;

impl BuiltIn for Array {
    const NAME: &'static str = "Array";

    fn init(context: &mut Context) -> JsValue {
        let standard = context.standard_objects().array();
        let constructor =
            ConstructorBuilder::with_standard_object(context, Self::constructor, standard)
                .name(Self::NAME)
                .length(1)
                .static_method(Self::is_array, "isArray", 1)
                .static_method(Self::of, "of", 0)
                .static_method(Self::from, "from", 1)
                .method(Self::push, "push", 1)
                .method(Self::pop, "pop", 0)
                .method(Self::shift, "shift", 0)
                .method(Self::unshift, "unshift", 1)
                .method(Self::slice, "slice", 2)
                .method(Self::splice, "splice", 2)
                .method(Self::concat, "concat", 1)
                .method(Self::join, "join", 1)
                .method(Self::reverse, "reverse", 0)
                .method(Self::index_of, "indexOf", 1)
                .method(Self::last_index_of, "lastIndexOf", 1)
                .method(Self::includes, "includes", 1)
                .method(Self::for_each, "forEach", 1)
                .method(Self::map, "map", 1)
                .method(Self::filter, "filter", 1)
                .method(Self::reduce, "reduce", 1)
                .method(Self::reduce_right, "reduceRight", 1)
                .method(Self::some, "some", 1)
                .method(Self::every, "every", 1)
                .method(Self::find, "find", 1)
                .method(Self::find_index, "findIndex", 1)
                .method(Self::fill, "fill", 1)
                .method(Self::sort, "sort", 1)
                .method(Self::to_string, "toString", 0)
                .build();
        JsValue::Object(constructor)
    }
}

/// Converts a value into an array length, rejecting anything outside
/// `0..2^32 - 1`.
pub(crate) fn to_array_length(value: &JsValue, context: &mut Context) -> JsResult<u32> {
    let number = value.to_number(context)?;
    let length = crate::value::f64_to_uint32(number);
    if f64::from(length) != number {
        return Err(JsNativeError::range()
            .with_message("Invalid array length")
            .into());
    }
    Ok(length)
}

fn this_object(this: &JsValue, context: &mut Context) -> JsResult<JsObject> {
    this.to_object(context)
}

fn length_of(object: &JsObject, context: &mut Context) -> JsResult<u64> {
    object
        .get(&PropertyKey::from("length"), context)?
        .to_length(context)
}

fn callback_of(args: &[JsValue], name: &str) -> JsResult<JsValue> {
    let callback = args.get_or_undefined(0);
    if !callback.is_callable() {
        return Err(JsNativeError::typ()
            .with_message(format!("{name} callback must be a function"))
            .into());
    }
    Ok(callback.clone())
}

impl Array {
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if args.len() == 1 {
            if let JsValue::Number(length) = &args[0] {
                let length = to_array_length(&JsValue::Number(*length), context)?;
                let array = context.array_from(Vec::new());
                array.set_array_length(length, context)?;
                return Ok(JsValue::Object(array));
            }
        }
        Ok(JsValue::Object(context.array_from(args.to_vec())))
    }

    /// `Array.isArray( value )`
    fn is_array(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(
            args.get_or_undefined(0)
                .as_object()
                .is_some_and(JsObject::is_array),
        ))
    }

    /// `Array.of( ...items )`
    fn of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Object(context.array_from(args.to_vec())))
    }

    /// `Array.from( source[, mapFn] )` over arrays, strings and
    /// array-likes.
    fn from(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let values = context.spread_values(args.get_or_undefined(0))?;
        let map = args.get_or_undefined(1);
        if map.is_undefined() {
            return Ok(JsValue::Object(context.array_from(values)));
        }
        if !map.is_callable() {
            return Err(JsNativeError::typ()
                .with_message("Array.from map argument must be a function")
                .into());
        }
        let mut mapped = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            mapped.push(context.call(map, &JsValue::Undefined, &[value, JsValue::from(index)])?);
        }
        Ok(JsValue::Object(context.array_from(mapped)))
    }

    /// `Array.prototype.push( ...items )`
    fn push(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let mut length = length_of(&object, context)?;
        for item in args {
            object.set(
                PropertyKey::from(length as usize),
                item.clone(),
                context,
            )?;
            length += 1;
        }
        object.set(
            PropertyKey::from("length"),
            JsValue::from(length as f64),
            context,
        )?;
        Ok(JsValue::from(length as f64))
    }

    /// `Array.prototype.pop()`
    fn pop(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        if length == 0 {
            object.set(PropertyKey::from("length"), JsValue::from(0.0), context)?;
            return Ok(JsValue::Undefined);
        }
        let key = PropertyKey::from((length - 1) as usize);
        let value = object.get(&key, context)?.materialized();
        object.delete(&key, context)?;
        object.set(
            PropertyKey::from("length"),
            JsValue::from((length - 1) as f64),
            context,
        )?;
        Ok(value)
    }

    /// `Array.prototype.shift()`
    fn shift(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        if length == 0 {
            object.set(PropertyKey::from("length"), JsValue::from(0.0), context)?;
            return Ok(JsValue::Undefined);
        }
        let first = object.get(&PropertyKey::Index(0), context)?.materialized();
        for to in 0..length - 1 {
            let from_key = PropertyKey::from((to + 1) as usize);
            let to_key = PropertyKey::from(to as usize);
            if object.has_property(&from_key) {
                let value = object.get(&from_key, context)?.materialized();
                object.set(to_key, value, context)?;
            } else {
                object.delete(&to_key, context)?;
            }
        }
        object.delete(&PropertyKey::from((length - 1) as usize), context)?;
        object.set(
            PropertyKey::from("length"),
            JsValue::from((length - 1) as f64),
            context,
        )?;
        Ok(first)
    }

    /// `Array.prototype.unshift( ...items )`
    fn unshift(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let count = args.len() as u64;
        if count > 0 {
            for index in (0..length).rev() {
                let from_key = PropertyKey::from(index as usize);
                let to_key = PropertyKey::from((index + count) as usize);
                if object.has_property(&from_key) {
                    let value = object.get(&from_key, context)?.materialized();
                    object.set(to_key, value, context)?;
                } else {
                    object.delete(&to_key, context)?;
                }
            }
            for (index, item) in args.iter().enumerate() {
                object.set(PropertyKey::from(index), item.clone(), context)?;
            }
        }
        object.set(
            PropertyKey::from("length"),
            JsValue::from((length + count) as f64),
            context,
        )?;
        Ok(JsValue::from((length + count) as f64))
    }

    /// `Array.prototype.slice( start, end )`
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let start = args
            .get_or_undefined(0)
            .to_integer_or_infinity(context)?
            .relative_index(length);
        let end = match args.get_or_undefined(1) {
            JsValue::Undefined => length,
            value => value.to_integer_or_infinity(context)?.relative_index(length),
        };
        let mut values = Vec::new();
        for index in start..end {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key) {
                values.push(object.get(&key, context)?.materialized());
            } else {
                values.push(JsValue::Invalid);
            }
        }
        let result = context.array_from(Vec::new());
        if let Some(storage) = result.borrow_mut().as_array_mut() {
            for value in values {
                match value {
                    JsValue::Invalid => storage.push_hole(),
                    value => storage.push(value),
                }
            }
        }
        Ok(JsValue::Object(result))
    }

    /// `Array.prototype.splice( start, deleteCount, ...items )`
    fn splice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let start = args
            .get_or_undefined(0)
            .to_integer_or_infinity(context)?
            .relative_index(length);
        let delete_count = match args.len() {
            0 => 0,
            1 => length - start,
            _ => {
                let count = args.get_or_undefined(1).to_integer_or_infinity(context)?;
                (count.clamp_finite(0, i64::MAX) as u64).min(length - start)
            }
        };
        let items = args.get(2..).unwrap_or_default();

        let mut removed = Vec::new();
        for offset in 0..delete_count {
            let key = PropertyKey::from((start + offset) as usize);
            removed.push(object.get(&key, context)?.materialized());
        }

        let insert_count = items.len() as u64;
        if insert_count < delete_count {
            for index in start..length - delete_count {
                let from_key = PropertyKey::from((index + delete_count) as usize);
                let to_key = PropertyKey::from((index + insert_count) as usize);
                if object.has_property(&from_key) {
                    let value = object.get(&from_key, context)?.materialized();
                    object.set(to_key, value, context)?;
                } else {
                    object.delete(&to_key, context)?;
                }
            }
            for index in (length - delete_count + insert_count..length).rev() {
                object.delete(&PropertyKey::from(index as usize), context)?;
            }
        } else if insert_count > delete_count {
            for index in (start..length - delete_count).rev() {
                let from_key = PropertyKey::from((index + delete_count) as usize);
                let to_key = PropertyKey::from((index + insert_count) as usize);
                if object.has_property(&from_key) {
                    let value = object.get(&from_key, context)?.materialized();
                    object.set(to_key, value, context)?;
                } else {
                    object.delete(&to_key, context)?;
                }
            }
        }
        for (offset, item) in items.iter().enumerate() {
            object.set(
                PropertyKey::from(start as usize + offset),
                item.clone(),
                context,
            )?;
        }
        object.set(
            PropertyKey::from("length"),
            JsValue::from((length - delete_count + insert_count) as f64),
            context,
        )?;
        Ok(JsValue::Object(context.array_from(removed)))
    }

    /// `Array.prototype.concat( ...items )`
    fn concat(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut values = Vec::new();
        let mut append = |value: &JsValue, context: &mut Context| -> JsResult<()> {
            match value.as_object() {
                Some(object) if object.is_array() => {
                    let length = length_of(object, context)?;
                    for index in 0..length {
                        values.push(
                            object
                                .get(&PropertyKey::from(index as usize), context)?
                                .materialized(),
                        );
                    }
                }
                _ => values.push(value.clone()),
            }
            Ok(())
        };
        append(this, context)?;
        for arg in args {
            append(arg, context)?;
        }
        Ok(JsValue::Object(context.array_from(values)))
    }

    /// `Array.prototype.join( separator )`
    fn join(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let separator = match args.get_or_undefined(0) {
            JsValue::Undefined => JsString::from(","),
            value => value.to_string(context)?,
        };
        let mut result = JsString::default();
        for index in 0..length {
            if index > 0 {
                result = result.concat(&separator);
            }
            let element = object.get(&PropertyKey::from(index as usize), context)?;
            if !element.is_null_or_undefined() && !matches!(element, JsValue::Invalid) {
                result = result.concat(&element.to_string(context)?);
            }
        }
        Ok(JsValue::String(result))
    }

    /// `Array.prototype.reverse()`
    fn reverse(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let mut lower = 0;
        let mut upper = length.saturating_sub(1);
        while lower < upper {
            let lower_key = PropertyKey::from(lower as usize);
            let upper_key = PropertyKey::from(upper as usize);
            let lower_present = object.has_property(&lower_key);
            let upper_present = object.has_property(&upper_key);
            let lower_value = object.get(&lower_key, context)?.materialized();
            let upper_value = object.get(&upper_key, context)?.materialized();
            match (lower_present, upper_present) {
                (true, true) => {
                    object.set(lower_key, upper_value, context)?;
                    object.set(upper_key, lower_value, context)?;
                }
                (true, false) => {
                    object.set(upper_key, lower_value, context)?;
                    object.delete(&lower_key, context)?;
                }
                (false, true) => {
                    object.set(lower_key, upper_value, context)?;
                    object.delete(&upper_key, context)?;
                }
                (false, false) => {}
            }
            lower += 1;
            upper -= 1;
        }
        Ok(this.clone())
    }

    /// `Array.prototype.indexOf( search, fromIndex )`
    fn index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let search = args.get_or_undefined(0);
        let start = args
            .get(1)
            .cloned()
            .unwrap_or(JsValue::from(0.0))
            .to_integer_or_infinity(context)?
            .relative_index(length);
        for index in start..length {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key)
                && object.get(&key, context)?.materialized().strict_equals(search)
            {
                return Ok(JsValue::from(index as f64));
            }
        }
        Ok(JsValue::from(-1))
    }

    /// `Array.prototype.lastIndexOf( search, fromIndex )`
    fn last_index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        if length == 0 {
            return Ok(JsValue::from(-1));
        }
        let search = args.get_or_undefined(0);
        let from = match args.get(1) {
            Some(value) => match value.to_integer_or_infinity(context)? {
                IntegerOrInfinity::NegativeInfinity => return Ok(JsValue::from(-1)),
                IntegerOrInfinity::PositiveInfinity => length - 1,
                IntegerOrInfinity::Integer(value) if value < 0 => {
                    let offset = value.unsigned_abs();
                    if offset > length {
                        return Ok(JsValue::from(-1));
                    }
                    length - offset
                }
                IntegerOrInfinity::Integer(value) => (value as u64).min(length - 1),
            },
            None => length - 1,
        };
        for index in (0..=from).rev() {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key)
                && object.get(&key, context)?.materialized().strict_equals(search)
            {
                return Ok(JsValue::from(index as f64));
            }
        }
        Ok(JsValue::from(-1))
    }

    /// `Array.prototype.includes( search, fromIndex )`
    fn includes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let search = args.get_or_undefined(0);
        let start = args
            .get(1)
            .cloned()
            .unwrap_or(JsValue::from(0.0))
            .to_integer_or_infinity(context)?
            .relative_index(length);
        for index in start..length {
            let value = object
                .get(&PropertyKey::from(index as usize), context)?
                .materialized();
            if same_value_zero(&value, search) {
                return Ok(JsValue::Boolean(true));
            }
        }
        Ok(JsValue::Boolean(false))
    }

    /// `Array.prototype.forEach( callback, thisArg )`
    fn for_each(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let callback = callback_of(args, "forEach")?;
        let this_arg = args.get_or_undefined(1).clone();
        for index in 0..length {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key) {
                let value = object.get(&key, context)?.materialized();
                context.call(
                    &callback,
                    &this_arg,
                    &[value, JsValue::from(index as f64), this.clone()],
                )?;
            }
        }
        Ok(JsValue::Undefined)
    }

    /// `Array.prototype.map( callback, thisArg )`
    fn map(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let callback = callback_of(args, "map")?;
        let this_arg = args.get_or_undefined(1).clone();
        let result = context.array_from(Vec::new());
        for index in 0..length {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key) {
                let value = object.get(&key, context)?.materialized();
                let mapped = context.call(
                    &callback,
                    &this_arg,
                    &[value, JsValue::from(index as f64), this.clone()],
                )?;
                result.set(key, mapped, context)?;
            } else if let Some(storage) = result.borrow_mut().as_array_mut() {
                storage.push_hole();
            }
        }
        result.set_array_length(length as u32, context)?;
        Ok(JsValue::Object(result))
    }

    /// `Array.prototype.filter( callback, thisArg )`
    fn filter(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let callback = callback_of(args, "filter")?;
        let this_arg = args.get_or_undefined(1).clone();
        let mut values = Vec::new();
        for index in 0..length {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key) {
                let value = object.get(&key, context)?.materialized();
                let keep = context.call(
                    &callback,
                    &this_arg,
                    &[value.clone(), JsValue::from(index as f64), this.clone()],
                )?;
                if keep.to_boolean() {
                    values.push(value);
                }
            }
        }
        Ok(JsValue::Object(context.array_from(values)))
    }

    /// `Array.prototype.reduce( callback[, initialValue] )`
    fn reduce(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let callback = callback_of(args, "reduce")?;
        let mut index = 0u64;
        let mut accumulator = match args.get(1) {
            Some(initial) => initial.clone(),
            None => loop {
                if index >= length {
                    return Err(JsNativeError::typ()
                        .with_message("Reduce of empty array with no initial value")
                        .into());
                }
                let key = PropertyKey::from(index as usize);
                index += 1;
                if object.has_property(&key) {
                    break object.get(&key, context)?.materialized();
                }
            },
        };
        while index < length {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key) {
                let value = object.get(&key, context)?.materialized();
                accumulator = context.call(
                    &callback,
                    &JsValue::Undefined,
                    &[
                        accumulator,
                        value,
                        JsValue::from(index as f64),
                        this.clone(),
                    ],
                )?;
            }
            index += 1;
        }
        Ok(accumulator)
    }

    /// `Array.prototype.reduceRight( callback[, initialValue] )`
    fn reduce_right(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let callback = callback_of(args, "reduceRight")?;
        let mut index = length as i64 - 1;
        let mut accumulator = match args.get(1) {
            Some(initial) => initial.clone(),
            None => loop {
                if index < 0 {
                    return Err(JsNativeError::typ()
                        .with_message("Reduce of empty array with no initial value")
                        .into());
                }
                let key = PropertyKey::from(index as usize);
                index -= 1;
                if object.has_property(&key) {
                    break object.get(&key, context)?.materialized();
                }
            },
        };
        while index >= 0 {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key) {
                let value = object.get(&key, context)?.materialized();
                accumulator = context.call(
                    &callback,
                    &JsValue::Undefined,
                    &[
                        accumulator,
                        value,
                        JsValue::from(index as f64),
                        this.clone(),
                    ],
                )?;
            }
            index -= 1;
        }
        Ok(accumulator)
    }

    /// `Array.prototype.some( callback, thisArg )`
    fn some(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let callback = callback_of(args, "some")?;
        let this_arg = args.get_or_undefined(1).clone();
        for index in 0..length {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key) {
                let value = object.get(&key, context)?.materialized();
                let result = context.call(
                    &callback,
                    &this_arg,
                    &[value, JsValue::from(index as f64), this.clone()],
                )?;
                if result.to_boolean() {
                    return Ok(JsValue::Boolean(true));
                }
            }
        }
        Ok(JsValue::Boolean(false))
    }

    /// `Array.prototype.every( callback, thisArg )`
    fn every(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let callback = callback_of(args, "every")?;
        let this_arg = args.get_or_undefined(1).clone();
        for index in 0..length {
            let key = PropertyKey::from(index as usize);
            if object.has_property(&key) {
                let value = object.get(&key, context)?.materialized();
                let result = context.call(
                    &callback,
                    &this_arg,
                    &[value, JsValue::from(index as f64), this.clone()],
                )?;
                if !result.to_boolean() {
                    return Ok(JsValue::Boolean(false));
                }
            }
        }
        Ok(JsValue::Boolean(true))
    }

    /// `Array.prototype.find( callback, thisArg )`
    fn find(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let callback = callback_of(args, "find")?;
        let this_arg = args.get_or_undefined(1).clone();
        for index in 0..length {
            let value = object
                .get(&PropertyKey::from(index as usize), context)?
                .materialized();
            let found = context.call(
                &callback,
                &this_arg,
                &[value.clone(), JsValue::from(index as f64), this.clone()],
            )?;
            if found.to_boolean() {
                return Ok(value);
            }
        }
        Ok(JsValue::Undefined)
    }

    /// `Array.prototype.findIndex( callback, thisArg )`
    fn find_index(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let callback = callback_of(args, "findIndex")?;
        let this_arg = args.get_or_undefined(1).clone();
        for index in 0..length {
            let value = object
                .get(&PropertyKey::from(index as usize), context)?
                .materialized();
            let found = context.call(
                &callback,
                &this_arg,
                &[value, JsValue::from(index as f64), this.clone()],
            )?;
            if found.to_boolean() {
                return Ok(JsValue::from(index as f64));
            }
        }
        Ok(JsValue::from(-1))
    }

    /// `Array.prototype.fill( value, start, end )`
    fn fill(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let value = args.get_or_undefined(0).clone();
        let start = args
            .get(1)
            .cloned()
            .unwrap_or(JsValue::from(0.0))
            .to_integer_or_infinity(context)?
            .relative_index(length);
        let end = match args.get_or_undefined(2) {
            JsValue::Undefined => length,
            bound => bound.to_integer_or_infinity(context)?.relative_index(length),
        };
        for index in start..end {
            object.set(PropertyKey::from(index as usize), value.clone(), context)?;
        }
        Ok(this.clone())
    }

    /// `Array.prototype.sort( comparator )`
    fn sort(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this_object(this, context)?;
        let length = length_of(&object, context)?;
        let comparator = args.get_or_undefined(0).clone();
        if !comparator.is_undefined() && !comparator.is_callable() {
            return Err(JsNativeError::typ()
                .with_message("The comparison function must be either a function or undefined")
                .into());
        }

        // Holes and undefined sort to the end, in that order.
        let mut values = Vec::new();
        let mut undefined_count = 0u64;
        let mut hole_count = 0u64;
        for index in 0..length {
            let key = PropertyKey::from(index as usize);
            if !object.has_property(&key) {
                hole_count += 1;
                continue;
            }
            let value = object.get(&key, context)?.materialized();
            if value.is_undefined() {
                undefined_count += 1;
            } else {
                values.push(value);
            }
        }

        // An insertion sort keeps the comparator callback re-entrant.
        for sorted in 1..values.len() {
            let value = values[sorted].clone();
            let mut position = sorted;
            while position > 0 {
                let ordering =
                    Self::compare_elements(&values[position - 1], &value, &comparator, context)?;
                if ordering <= 0.0 {
                    break;
                }
                values[position] = values[position - 1].clone();
                position -= 1;
            }
            values[position] = value;
        }

        let mut index = 0u64;
        for value in values {
            object.set(PropertyKey::from(index as usize), value, context)?;
            index += 1;
        }
        for _ in 0..undefined_count {
            object.set(
                PropertyKey::from(index as usize),
                JsValue::Undefined,
                context,
            )?;
            index += 1;
        }
        for _ in 0..hole_count {
            object.delete(&PropertyKey::from(index as usize), context)?;
            index += 1;
        }
        Ok(this.clone())
    }

    fn compare_elements(
        a: &JsValue,
        b: &JsValue,
        comparator: &JsValue,
        context: &mut Context,
    ) -> JsResult<f64> {
        if comparator.is_undefined() {
            let a = a.to_string(context)?;
            let b = b.to_string(context)?;
            return Ok(match a.cmp(&b) {
                std::cmp::Ordering::Less => -1.0,
                std::cmp::Ordering::Equal => 0.0,
                std::cmp::Ordering::Greater => 1.0,
            });
        }
        let result = context.call(comparator, &JsValue::Undefined, &[a.clone(), b.clone()])?;
        let number = result.to_number(context)?;
        Ok(if number.is_nan() { 0.0 } else { number })
    }

    /// `Array.prototype.toString()`
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::join(this, &[], context)
    }
}
