//! The global `String` object.
//!
//! Lengths and indices count code points, matching the engine's string
//! representation; byte strings index by byte.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-string-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/String

use super::{regexp, BuiltIn};
use crate::{
    error::JsNativeError,
    object::{ConstructorBuilder, JsObject, ObjectKind},
    string::push_code_point,
    value::IntegerOrInfinity,
    Context, JsArgs, JsResult, JsString, JsValue,
};

/// The `String` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct String;

impl BuiltIn for String {
    const NAME: &'static str = "String";

    fn init(context: &mut Context) -> JsValue {
        let standard = context.standard_objects().string();
        let constructor =
            ConstructorBuilder::with_standard_object(context, Self::constructor, standard)
                .name(Self::NAME)
                .length(1)
                .static_method(Self::from_char_code, "fromCharCode", 1)
                .static_method(Self::from_code_point, "fromCodePoint", 1)
                .method(Self::char_at, "charAt", 1)
                .method(Self::char_code_at, "charCodeAt", 1)
                .method(Self::code_point_at, "codePointAt", 1)
                .method(Self::concat, "concat", 1)
                .method(Self::ends_with, "endsWith", 1)
                .method(Self::starts_with, "startsWith", 1)
                .method(Self::includes, "includes", 1)
                .method(Self::index_of, "indexOf", 1)
                .method(Self::last_index_of, "lastIndexOf", 1)
                .method(Self::repeat, "repeat", 1)
                .method(Self::slice, "slice", 2)
                .method(Self::substring, "substring", 2)
                .method(Self::substr, "substr", 2)
                .method(Self::split, "split", 2)
                .method(Self::to_lower_case, "toLowerCase", 0)
                .method(Self::to_upper_case, "toUpperCase", 0)
                .method(Self::trim, "trim", 0)
                .method(Self::pad_start, "padStart", 1)
                .method(Self::pad_end, "padEnd", 1)
                .method(Self::replace, "replace", 2)
                .method(Self::r#match, "match", 1)
                .method(Self::search, "search", 1)
                .method(Self::to_string, "toString", 0)
                .method(Self::value_of, "valueOf", 0)
                .build();
        JsValue::Object(constructor)
    }
}

// `RequireObjectCoercible` + `ToString` for method receivers.
fn this_string(this: &JsValue, context: &mut Context) -> JsResult<JsString> {
    if this.is_null_or_undefined() {
        return Err(JsNativeError::typ()
            .with_message("String.prototype method called on null or undefined")
            .into());
    }
    this.unwrapped().to_string(context)
}

impl String {
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let constructing = context.take_constructing();
        let string = match args.first() {
            // String(symbol) is the one place a symbol stringifies.
            Some(JsValue::Symbol(symbol)) if !constructing => symbol.descriptive_string(),
            Some(value) => value.to_string(context)?,
            None => JsString::default(),
        };
        if constructing {
            let object = JsObject::new(
                ObjectKind::String(string),
                Some(context.standard_objects().string().prototype()),
            );
            object
                .borrow_mut()
                .set_shared_properties(context.realm().string_instance_table());
            return Ok(JsValue::Object(object));
        }
        Ok(JsValue::String(string))
    }

    /// `String.fromCharCode( ...codes )`
    fn from_char_code(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut bytes = Vec::new();
        for arg in args {
            let code = arg.to_uint32(context)? & 0xFFFF;
            push_code_point(&mut bytes, code);
        }
        Ok(JsValue::String(JsString::from_wtf8(bytes)))
    }

    /// `String.fromCodePoint( ...codePoints )`
    fn from_code_point(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut bytes = Vec::new();
        for arg in args {
            let number = arg.to_number(context)?;
            if number.fract() != 0.0 || !(0.0..=1_114_111.0).contains(&number) {
                return Err(JsNativeError::range()
                    .with_message(format!("Invalid code point {}", number))
                    .into());
            }
            push_code_point(&mut bytes, number as u32);
        }
        Ok(JsValue::String(JsString::from_wtf8(bytes)))
    }

    /// `String.prototype.charAt( index )`
    fn char_at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let index = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        let IntegerOrInfinity::Integer(index) = index else {
            return Ok(JsValue::String(JsString::default()));
        };
        if index < 0 {
            return Ok(JsValue::String(JsString::default()));
        }
        Ok(JsValue::String(
            string
                .code_point_at(index as usize)
                .map_or_else(JsString::default, JsString::from_code_point),
        ))
    }

    /// `String.prototype.charCodeAt( index )`
    fn char_code_at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let index = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        let IntegerOrInfinity::Integer(index) = index else {
            return Ok(JsValue::nan());
        };
        if index < 0 {
            return Ok(JsValue::nan());
        }
        Ok(string
            .code_point_at(index as usize)
            .map_or(JsValue::nan(), |cp| JsValue::from(cp as f64)))
    }

    /// `String.prototype.codePointAt( index )`
    fn code_point_at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let index = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        let IntegerOrInfinity::Integer(index) = index else {
            return Ok(JsValue::Undefined);
        };
        if index < 0 {
            return Ok(JsValue::Undefined);
        }
        Ok(string
            .code_point_at(index as usize)
            .map_or(JsValue::Undefined, |cp| JsValue::from(cp as f64)))
    }

    /// `String.prototype.concat( ...strings )`
    fn concat(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut result = this_string(this, context)?;
        for arg in args {
            result = result.concat(&arg.to_string(context)?);
        }
        Ok(JsValue::String(result))
    }

    /// `String.prototype.endsWith( search, endPosition )`
    fn ends_with(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let search = args.get_or_undefined(0).to_string(context)?;
        let end = match args.get_or_undefined(1) {
            JsValue::Undefined => string.len(),
            value => value
                .to_integer_or_infinity(context)?
                .relative_index(string.len() as u64) as usize,
        };
        let prefix = string.substring(0, end);
        Ok(JsValue::Boolean(
            prefix.as_bytes().ends_with(search.as_bytes()),
        ))
    }

    /// `String.prototype.startsWith( search, position )`
    fn starts_with(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let search = args.get_or_undefined(0).to_string(context)?;
        let start = match args.get_or_undefined(1) {
            JsValue::Undefined => 0,
            value => value
                .to_integer_or_infinity(context)?
                .relative_index(string.len() as u64) as usize,
        };
        let offset = string.byte_offset_of(start);
        Ok(JsValue::Boolean(
            string.as_bytes()[offset..].starts_with(search.as_bytes()),
        ))
    }

    /// `String.prototype.includes( search, position )`
    fn includes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let found = Self::index_of(this, args, context)?;
        Ok(JsValue::Boolean(
            found.as_number().is_some_and(|index| index >= 0.0),
        ))
    }

    /// `String.prototype.indexOf( search, position )`
    fn index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let search = args.get_or_undefined(0).to_string(context)?;
        let start = match args.get(1) {
            Some(value) => value
                .to_integer_or_infinity(context)?
                .relative_index(string.len() as u64) as usize,
            None => 0,
        };
        Ok(JsValue::from(match find_code_point_index(
            &string, &search, start,
        ) {
            Some(index) => index as f64,
            None => -1.0,
        }))
    }

    /// `String.prototype.lastIndexOf( search, position )`
    fn last_index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let search = args.get_or_undefined(0).to_string(context)?;
        let mut result: Option<usize> = None;
        let mut from = 0;
        while let Some(index) = find_code_point_index(&string, &search, from) {
            result = Some(index);
            from = index + 1;
        }
        Ok(JsValue::from(match result {
            Some(index) => index as f64,
            None => -1.0,
        }))
    }

    /// `String.prototype.repeat( count )`
    fn repeat(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let count = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        let IntegerOrInfinity::Integer(count) = count else {
            return Err(JsNativeError::range()
                .with_message("Invalid count value")
                .into());
        };
        if count < 0 {
            return Err(JsNativeError::range()
                .with_message("Invalid count value")
                .into());
        }
        let mut bytes = Vec::with_capacity(string.byte_len() * count as usize);
        for _ in 0..count {
            bytes.extend_from_slice(string.as_bytes());
        }
        Ok(JsValue::String(JsString::from_wtf8(bytes)))
    }

    /// `String.prototype.slice( start, end )`
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let length = string.len() as u64;
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
        Ok(JsValue::String(string.substring(start, end)))
    }

    /// `String.prototype.substring( start, end )`
    fn substring(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let length = string.len() as i64;
        let clamp = |value: IntegerOrInfinity| value.clamp_finite(0, length) as usize;
        let start = clamp(args.get_or_undefined(0).to_integer_or_infinity(context)?);
        let end = match args.get_or_undefined(1) {
            JsValue::Undefined => length as usize,
            value => clamp(value.to_integer_or_infinity(context)?),
        };
        let (from, to) = if start <= end { (start, end) } else { (end, start) };
        Ok(JsValue::String(string.substring(from, to)))
    }

    /// `String.prototype.substr( start, length )`
    fn substr(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let length = string.len() as u64;
        let start = args
            .get(0)
            .cloned()
            .unwrap_or(JsValue::from(0.0))
            .to_integer_or_infinity(context)?
            .relative_index(length) as usize;
        let count = match args.get_or_undefined(1) {
            JsValue::Undefined => length as usize,
            value => value
                .to_integer_or_infinity(context)?
                .clamp_finite(0, length as i64) as usize,
        };
        Ok(JsValue::String(string.substring(start, start + count)))
    }

    /// `String.prototype.split( separator, limit )`
    fn split(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let limit = match args.get_or_undefined(1) {
            JsValue::Undefined => u32::MAX,
            value => value.to_uint32(context)?,
        };
        if limit == 0 {
            return Ok(JsValue::Object(context.array_from(Vec::new())));
        }
        match args.get_or_undefined(0) {
            JsValue::Undefined => {
                let parts = vec![JsValue::String(string)];
                Ok(JsValue::Object(context.array_from(parts)))
            }
            JsValue::Object(object) if regexp::is_regexp(object) => {
                regexp::split(object, &string, limit, context)
            }
            separator => {
                let separator = separator.to_string(context)?;
                let mut parts = Vec::new();
                if separator.is_empty() {
                    for cp in string.code_points().take(limit as usize) {
                        parts.push(JsValue::String(JsString::from_code_point(cp)));
                    }
                } else {
                    let mut start = 0usize;
                    while parts.len() < limit as usize {
                        match find_code_point_index(&string, &separator, start) {
                            Some(index) => {
                                parts.push(JsValue::String(string.substring(start, index)));
                                start = index + separator.len().max(1);
                            }
                            None => {
                                parts
                                    .push(JsValue::String(string.substring(start, string.len())));
                                break;
                            }
                        }
                    }
                }
                Ok(JsValue::Object(context.array_from(parts)))
            }
        }
    }

    /// `String.prototype.toLowerCase()`
    fn to_lower_case(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let mut bytes = Vec::with_capacity(string.byte_len());
        for cp in string.code_points() {
            match char::from_u32(cp) {
                Some(c) => {
                    for lower in c.to_lowercase() {
                        push_code_point(&mut bytes, lower as u32);
                    }
                }
                None => push_code_point(&mut bytes, cp),
            }
        }
        Ok(JsValue::String(JsString::from_wtf8(bytes)))
    }

    /// `String.prototype.toUpperCase()`
    fn to_upper_case(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let mut bytes = Vec::with_capacity(string.byte_len());
        for cp in string.code_points() {
            match char::from_u32(cp) {
                Some(c) => {
                    for upper in c.to_uppercase() {
                        push_code_point(&mut bytes, upper as u32);
                    }
                }
                None => push_code_point(&mut bytes, cp),
            }
        }
        Ok(JsValue::String(JsString::from_wtf8(bytes)))
    }

    /// `String.prototype.trim()`
    fn trim(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let is_trimmed = |cp: u32| {
            matches!(
                cp,
                0x09 | 0x0A | 0x0B | 0x0C | 0x0D | 0x20 | 0xA0 | 0xFEFF | 0x2028 | 0x2029
                    | 0x1680 | 0x2000..=0x200A | 0x202F | 0x205F | 0x3000
            )
        };
        let total = string.len();
        let mut start = 0;
        for cp in string.code_points() {
            if !is_trimmed(cp) {
                break;
            }
            start += 1;
        }
        let mut end = total;
        let points: Vec<u32> = string.code_points().collect();
        while end > start && is_trimmed(points[end - 1]) {
            end -= 1;
        }
        Ok(JsValue::String(string.substring(start, end)))
    }

    /// `String.prototype.padStart( targetLength, padString )`
    fn pad_start(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::pad(this, args, context, true)
    }

    /// `String.prototype.padEnd( targetLength, padString )`
    fn pad_end(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::pad(this, args, context, false)
    }

    fn pad(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
        at_start: bool,
    ) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let target = args.get_or_undefined(0).to_length(context)? as usize;
        if target <= string.len() {
            return Ok(JsValue::String(string));
        }
        let filler = match args.get_or_undefined(1) {
            JsValue::Undefined => JsString::from(" "),
            value => value.to_string(context)?,
        };
        if filler.is_empty() {
            return Ok(JsValue::String(string));
        }
        let missing = target - string.len();
        let mut pad_points = Vec::with_capacity(missing);
        while pad_points.len() < missing {
            for cp in filler.code_points() {
                if pad_points.len() == missing {
                    break;
                }
                pad_points.push(cp);
            }
        }
        let mut bytes = Vec::new();
        if at_start {
            for cp in pad_points {
                push_code_point(&mut bytes, cp);
            }
            bytes.extend_from_slice(string.as_bytes());
        } else {
            bytes.extend_from_slice(string.as_bytes());
            for cp in pad_points {
                push_code_point(&mut bytes, cp);
            }
        }
        Ok(JsValue::String(JsString::from_wtf8(bytes)))
    }

    /// `String.prototype.replace( pattern, replacement )`
    fn replace(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        match args.get_or_undefined(0) {
            JsValue::Object(object) if regexp::is_regexp(object) => {
                regexp::replace(object, &string, args.get_or_undefined(1), context)
            }
            pattern => {
                let pattern = pattern.to_string(context)?;
                let Some(index) = find_code_point_index(&string, &pattern, 0) else {
                    return Ok(JsValue::String(string));
                };
                let matched_end = index + pattern.len();
                let replacement = regexp::resolve_replacement(
                    args.get_or_undefined(1),
                    &pattern,
                    &[],
                    index,
                    &string,
                    context,
                )?;
                let mut result = string.substring(0, index);
                result = result.concat(&replacement);
                result = result.concat(&string.substring(matched_end, string.len()));
                Ok(JsValue::String(result))
            }
        }
    }

    /// `String.prototype.match( regexp )`
    fn r#match(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let regexp = regexp::coerce_to_regexp(args.get_or_undefined(0), context)?;
        regexp::match_string(&regexp, &string, context)
    }

    /// `String.prototype.search( regexp )`
    fn search(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string(this, context)?;
        let regexp = regexp::coerce_to_regexp(args.get_or_undefined(0), context)?;
        regexp::search(&regexp, &string, context)
    }

    /// `String.prototype.toString()`
    fn to_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Self::string_value(this)
    }

    /// `String.prototype.valueOf()`
    fn value_of(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Self::string_value(this)
    }

    fn string_value(this: &JsValue) -> JsResult<JsValue> {
        match this.unwrapped() {
            JsValue::String(string) => Ok(JsValue::String(string)),
            _ => Err(JsNativeError::typ()
                .with_message("String.prototype.valueOf requires a string receiver")
                .into()),
        }
    }
}

// Finds `search` in `string` starting at code point `start`, returning the
// code point index of the first occurrence.
fn find_code_point_index(string: &JsString, search: &JsString, start: usize) -> Option<usize> {
    let total = string.len();
    if search.len() > total {
        return None;
    }
    for index in start..=total.saturating_sub(search.len()) {
        let offset = string.byte_offset_of(index);
        if string.as_bytes()[offset..].starts_with(search.as_bytes()) {
            return Some(index);
        }
    }
    None
}
