//! The global `JSON` object.
//!
//! The parser is a strict, non-recursive JSON reader over the raw bytes:
//! nesting is tracked on an explicit stack with a depth bound, and error
//! messages carry byte offsets. The serializer implements the standard
//! algorithm including replacers, indentation, `toJSON` and cycle
//! detection.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-json
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/JSON

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::JsObject,
    property::PropertyKey,
    string::push_code_point,
    value::number_to_js_string,
    Context, JsArgs, JsResult, JsString, JsValue,
};

// The structural depth bound of the parser.
const MAX_DEPTH: usize = 2048;

/// The `JSON` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Json;

impl BuiltIn for Json {
    const NAME: &'static str = "JSON";

    fn init(context: &mut Context) -> JsValue {
        let object = crate::object::ObjectInitializer::new(context)
            .function(Self::parse, "parse", 2)
            .function(Self::stringify, "stringify", 3)
            .build();
        JsValue::Object(object)
    }
}

impl Json {
    /// `JSON.parse( text[, reviver] )`
    pub(crate) fn parse(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let text = args.get_or_undefined(0).to_string(context)?;
        let unfiltered = Parser::new(text.as_bytes()).parse(context)?;

        let Some(reviver) = args.get_or_undefined(1).as_callable().cloned() else {
            return Ok(unfiltered);
        };
        let root = context.object_new();
        root.set(PropertyKey::from(""), unfiltered, context)?;
        internalize(
            &root,
            &PropertyKey::from(""),
            &JsValue::Object(reviver),
            context,
        )
    }

    /// `JSON.stringify( value[, replacer[, space]] )`
    pub(crate) fn stringify(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let mut serializer = Serializer::new(args.get_or_undefined(1), args.get_or_undefined(2), context)?;
        let wrapper = context.object_new();
        wrapper.set(PropertyKey::from(""), args.get_or_undefined(0).clone(), context)?;
        match serializer.serialize_property(&wrapper, &PropertyKey::from(""), context)? {
            Some(text) => Ok(JsValue::String(JsString::from_wtf8(text))),
            None => Ok(JsValue::Undefined),
        }
    }
}

// === parsing ===

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

// One unfinished container on the parse stack.
enum Open {
    Array(Vec<JsValue>),
    Object(Vec<(JsString, JsValue)>, Option<JsString>),
}

impl<'a> Parser<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn error(&self, message: &str) -> crate::JsError {
        JsNativeError::syntax()
            .with_message(format!("{message} at position {}", self.pos))
            .into()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.bytes.get(self.pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn parse(mut self, context: &mut Context) -> JsResult<JsValue> {
        let mut stack: Vec<Open> = Vec::new();
        // A scalar, or a just-closed container, waiting to be attached.
        let mut pending: Option<JsValue> = None;

        loop {
            if pending.is_none() {
                self.skip_whitespace();
                match self.bytes.get(self.pos) {
                    Some(b'[') => {
                        self.pos += 1;
                        if stack.len() >= MAX_DEPTH {
                            return Err(self.error("JSON structure is nested too deeply"));
                        }
                        self.skip_whitespace();
                        if self.bytes.get(self.pos) == Some(&b']') {
                            self.pos += 1;
                            pending = Some(self.finish_array(Vec::new(), context));
                        } else {
                            stack.push(Open::Array(Vec::new()));
                        }
                        continue;
                    }
                    Some(b'{') => {
                        self.pos += 1;
                        if stack.len() >= MAX_DEPTH {
                            return Err(self.error("JSON structure is nested too deeply"));
                        }
                        self.skip_whitespace();
                        if self.bytes.get(self.pos) == Some(&b'}') {
                            self.pos += 1;
                            pending = Some(self.finish_object(Vec::new(), context));
                        } else {
                            let key = self.parse_key()?;
                            stack.push(Open::Object(Vec::new(), Some(key)));
                        }
                        continue;
                    }
                    _ => pending = Some(self.parse_scalar()?),
                }
            }

            let value = pending.take().expect("a value was just produced");
            match stack.last_mut() {
                None => {
                    self.skip_whitespace();
                    if self.pos != self.bytes.len() {
                        return Err(self.error("Unexpected token"));
                    }
                    return Ok(value);
                }
                Some(Open::Array(elements)) => {
                    elements.push(value);
                    self.skip_whitespace();
                    match self.bytes.get(self.pos) {
                        Some(b',') => {
                            self.pos += 1;
                        }
                        Some(b']') => {
                            self.pos += 1;
                            let Some(Open::Array(elements)) = stack.pop() else {
                                unreachable!("the top of stack is an array");
                            };
                            pending = Some(self.finish_array(elements, context));
                        }
                        _ => return Err(self.error("Expected ',' or ']'")),
                    }
                }
                Some(Open::Object(entries, key)) => {
                    let key = key.take().expect("a key precedes every value");
                    entries.push((key, value));
                    self.skip_whitespace();
                    match self.bytes.get(self.pos) {
                        Some(b',') => {
                            self.pos += 1;
                            self.skip_whitespace();
                            let next_key = self.parse_key()?;
                            let Some(Open::Object(_, key_slot)) = stack.last_mut() else {
                                unreachable!("the top of stack is an object");
                            };
                            *key_slot = Some(next_key);
                        }
                        Some(b'}') => {
                            self.pos += 1;
                            let Some(Open::Object(entries, _)) = stack.pop() else {
                                unreachable!("the top of stack is an object");
                            };
                            pending = Some(self.finish_object(entries, context));
                        }
                        _ => return Err(self.error("Expected ',' or '}'")),
                    }
                }
            }
        }
    }

    fn finish_array(&self, elements: Vec<JsValue>, context: &mut Context) -> JsValue {
        JsValue::Object(context.array_from(elements))
    }

    fn finish_object(&self, entries: Vec<(JsString, JsValue)>, context: &mut Context) -> JsValue {
        let object = context.object_new();
        for (key, value) in entries {
            object.borrow_mut().insert_property(
                PropertyKey::from(key),
                value,
                crate::property::Attribute::WRITABLE
                    | crate::property::Attribute::ENUMERABLE
                    | crate::property::Attribute::CONFIGURABLE,
            );
        }
        JsValue::Object(object)
    }

    fn parse_key(&mut self) -> JsResult<JsString> {
        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b'"') {
            return Err(self.error("Expected a string key"));
        }
        let key = self.parse_string()?;
        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b':') {
            return Err(self.error("Expected ':'"));
        }
        self.pos += 1;
        Ok(key)
    }

    fn parse_scalar(&mut self) -> JsResult<JsValue> {
        match self.bytes.get(self.pos) {
            Some(b'"') => Ok(JsValue::String(self.parse_string()?)),
            Some(b't') => self.parse_literal(b"true", JsValue::Boolean(true)),
            Some(b'f') => self.parse_literal(b"false", JsValue::Boolean(false)),
            Some(b'n') => self.parse_literal(b"null", JsValue::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            _ => Err(self.error("Unexpected token")),
        }
    }

    fn parse_literal(&mut self, literal: &[u8], value: JsValue) -> JsResult<JsValue> {
        if self.bytes[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            return Ok(value);
        }
        Err(self.error("Unexpected token"))
    }

    fn parse_number(&mut self) -> JsResult<JsValue> {
        let start = self.pos;
        if self.bytes.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        // Leading zeros are not allowed.
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                if matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
                    return Err(self.error("Unexpected number"));
                }
            }
            Some(b'1'..=b'9') => {
                while matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
            _ => return Err(self.error("Unexpected token")),
        }
        if self.bytes.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            if !matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
                return Err(self.error("Unexpected number"));
            }
            while matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.bytes.get(self.pos), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
                return Err(self.error("Unexpected number"));
            }
            while matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.error("Unexpected token"))?;
        let value = fast_float2::parse::<f64, _>(text)
            .map_err(|_| self.error("Unexpected number"))?;
        Ok(JsValue::Number(value))
    }

    fn parse_string(&mut self) -> JsResult<JsString> {
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            match self.bytes.get(self.pos) {
                None => return Err(self.error("Unterminated string")),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(JsString::from_wtf8(out));
                }
                Some(&byte) if byte < 0x20 => {
                    return Err(self.error("Bad control character in string"));
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.bytes.get(self.pos) {
                        Some(b'"') => out.push(b'"'),
                        Some(b'\\') => out.push(b'\\'),
                        Some(b'/') => out.push(b'/'),
                        Some(b'b') => out.push(0x08),
                        Some(b'f') => out.push(0x0C),
                        Some(b'n') => out.push(b'\n'),
                        Some(b'r') => out.push(b'\r'),
                        Some(b't') => out.push(b'\t'),
                        Some(b'u') => {
                            let cp = self.parse_unicode_escape()?;
                            push_code_point(&mut out, cp);
                            continue;
                        }
                        _ => return Err(self.error("Bad escaped character in string")),
                    }
                    self.pos += 1;
                }
                Some(&byte) => {
                    out.push(byte);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> JsResult<u32> {
        let hex4 = |parser: &mut Self| -> JsResult<u32> {
            let mut value = 0u32;
            for _ in 0..4 {
                parser.pos += 1;
                let digit = parser
                    .bytes
                    .get(parser.pos)
                    .and_then(|&byte| char::from(byte).to_digit(16))
                    .ok_or_else(|| parser.error("Bad Unicode escape in string"))?;
                value = value * 16 + digit;
            }
            Ok(value)
        };
        let first = hex4(self)?;
        // Combine surrogate pairs when both halves are escaped.
        if (0xD800..0xDC00).contains(&first)
            && self.bytes.get(self.pos + 1) == Some(&b'\\')
            && self.bytes.get(self.pos + 2) == Some(&b'u')
        {
            let saved = self.pos;
            self.pos += 2;
            let second = hex4(self)?;
            if (0xDC00..0xE000).contains(&second) {
                self.pos += 1;
                return Ok(0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00));
            }
            self.pos = saved;
        }
        self.pos += 1;
        Ok(first)
    }
}

// `InternalizeJSONProperty`: walks the parsed structure bottom-up, calling
// the reviver for every member. A reviver that deletes a sibling is
// honoured because every member is re-read from the live holder.
fn internalize(
    holder: &JsObject,
    key: &PropertyKey,
    reviver: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let value = holder.get(key, context)?.materialized();
    if let Some(object) = value.as_object().cloned() {
        if object.is_array() {
            let length = object
                .get(&PropertyKey::from("length"), context)?
                .to_length(context)?;
            for index in 0..length {
                let index_key = PropertyKey::from(index as usize);
                let element = internalize(&object, &index_key, reviver, context)?;
                if element.is_undefined() {
                    object.delete(&index_key, context)?;
                } else {
                    object.set(index_key, element, context)?;
                }
            }
        } else {
            for child_key in object.enumerable_keys() {
                let element = internalize(&object, &child_key, reviver, context)?;
                if element.is_undefined() {
                    object.delete(&child_key, context)?;
                } else {
                    object.set(child_key, element, context)?;
                }
            }
        }
    }
    let holder_value = JsValue::Object(holder.clone());
    context.call(
        reviver,
        &holder_value,
        &[JsValue::String(key.to_js_string()), value],
    )
}

// === serialization ===

struct Serializer {
    replacer: Option<JsValue>,
    allow_list: Option<Vec<PropertyKey>>,
    indent: Vec<u8>,
    depth: usize,
    seen: Vec<JsObject>,
}

impl Serializer {
    fn new(replacer: &JsValue, space: &JsValue, context: &mut Context) -> JsResult<Self> {
        let (replacer_fn, allow_list) = match replacer {
            value if value.is_callable() => (Some(value.clone()), None),
            JsValue::Object(object) if object.is_array() => {
                let mut keys = Vec::new();
                let length = object
                    .get(&PropertyKey::from("length"), context)?
                    .to_length(context)?;
                for index in 0..length {
                    let entry = object
                        .get(&PropertyKey::from(index as usize), context)?
                        .materialized();
                    let key = match entry.unwrapped() {
                        JsValue::String(string) => Some(PropertyKey::from(string)),
                        JsValue::Number(number) => {
                            Some(PropertyKey::from(number_to_js_string(number)))
                        }
                        _ => None,
                    };
                    if let Some(key) = key {
                        if !keys.contains(&key) {
                            keys.push(key);
                        }
                    }
                }
                (None, Some(keys))
            }
            _ => (None, None),
        };

        let indent = match space.unwrapped() {
            JsValue::Number(number) => {
                let count = (number.max(0.0).min(10.0)) as usize;
                vec![b' '; count]
            }
            JsValue::String(string) => {
                string.as_bytes().iter().copied().take(10).collect()
            }
            _ => Vec::new(),
        };

        Ok(Self {
            replacer: replacer_fn,
            allow_list,
            indent,
            depth: 0,
            seen: Vec::new(),
        })
    }

    // `SerializeJSONProperty`: `None` filters the member out.
    fn serialize_property(
        &mut self,
        holder: &JsObject,
        key: &PropertyKey,
        context: &mut Context,
    ) -> JsResult<Option<Vec<u8>>> {
        let mut value = holder.get(key, context)?.materialized();

        // toJSON and the replacer both see the original value.
        if let Some(object) = value.as_object().cloned() {
            let to_json = object.get(&PropertyKey::from("toJSON"), context)?;
            if to_json.is_callable() {
                value = context.call(
                    &to_json,
                    &value,
                    &[JsValue::String(key.to_js_string())],
                )?;
            }
        }
        if let Some(replacer) = self.replacer.clone() {
            let holder_value = JsValue::Object(holder.clone());
            value = context.call(
                &replacer,
                &holder_value,
                &[JsValue::String(key.to_js_string()), value],
            )?;
        }
        self.serialize_value(&value, context)
    }

    fn serialize_value(
        &mut self,
        value: &JsValue,
        context: &mut Context,
    ) -> JsResult<Option<Vec<u8>>> {
        let value = value.unwrapped();
        match &value {
            JsValue::Null => Ok(Some(b"null".to_vec())),
            JsValue::Boolean(true) => Ok(Some(b"true".to_vec())),
            JsValue::Boolean(false) => Ok(Some(b"false".to_vec())),
            JsValue::String(string) => Ok(Some(quote_string(string))),
            JsValue::Number(number) => {
                if number.is_finite() {
                    // -0 serializes as 0.
                    let normalized = if *number == 0.0 { 0.0 } else { *number };
                    Ok(Some(
                        number_to_js_string(normalized).as_bytes().to_vec(),
                    ))
                } else {
                    Ok(Some(b"null".to_vec()))
                }
            }
            JsValue::Object(object) if !object.is_callable() => {
                if self.seen.iter().any(|seen| seen.ptr_eq(object)) {
                    return Err(JsNativeError::typ()
                        .with_message("Converting circular structure to JSON")
                        .into());
                }
                self.seen.push(object.clone());
                self.depth += 1;
                let result = if object.is_array() {
                    self.serialize_array(object, context)
                } else {
                    self.serialize_object(object, context)
                };
                self.depth -= 1;
                self.seen.pop();
                result.map(Some)
            }
            // Functions, symbols and undefined are filtered out.
            _ => Ok(None),
        }
    }

    fn newline_indent(&self, depth: usize) -> Vec<u8> {
        let mut out = Vec::new();
        if !self.indent.is_empty() {
            out.push(b'\n');
            for _ in 0..depth {
                out.extend_from_slice(&self.indent);
            }
        }
        out
    }

    fn serialize_array(
        &mut self,
        object: &JsObject,
        context: &mut Context,
    ) -> JsResult<Vec<u8>> {
        let length = object
            .get(&PropertyKey::from("length"), context)?
            .to_length(context)?;
        if length == 0 {
            return Ok(b"[]".to_vec());
        }
        let mut out = b"[".to_vec();
        for index in 0..length {
            if index > 0 {
                out.push(b',');
            }
            out.extend_from_slice(&self.newline_indent(self.depth));
            let element =
                self.serialize_property(object, &PropertyKey::from(index as usize), context)?;
            match element {
                Some(text) => out.extend_from_slice(&text),
                None => out.extend_from_slice(b"null"),
            }
        }
        out.extend_from_slice(&self.newline_indent(self.depth - 1));
        out.push(b']');
        Ok(out)
    }

    fn serialize_object(
        &mut self,
        object: &JsObject,
        context: &mut Context,
    ) -> JsResult<Vec<u8>> {
        let keys = match &self.allow_list {
            Some(keys) => keys.clone(),
            None => object.enumerable_keys(),
        };
        let mut members = Vec::new();
        for key in keys {
            if matches!(key, PropertyKey::Symbol(_)) {
                continue;
            }
            if let Some(text) = self.serialize_property(object, &key, context)? {
                let mut member = quote_string(&key.to_js_string());
                member.push(b':');
                if !self.indent.is_empty() {
                    member.push(b' ');
                }
                member.extend_from_slice(&text);
                members.push(member);
            }
        }
        if members.is_empty() {
            return Ok(b"{}".to_vec());
        }
        let mut out = b"{".to_vec();
        for (index, member) in members.iter().enumerate() {
            if index > 0 {
                out.push(b',');
            }
            out.extend_from_slice(&self.newline_indent(self.depth));
            out.extend_from_slice(member);
        }
        out.extend_from_slice(&self.newline_indent(self.depth - 1));
        out.push(b'}');
        Ok(out)
    }
}

// `QuoteJSONString`: control characters escape to \uXXXX.
fn quote_string(string: &JsString) -> Vec<u8> {
    let mut out = vec![b'"'];
    for cp in string.code_points() {
        match cp {
            0x22 => out.extend_from_slice(b"\\\""),
            0x5C => out.extend_from_slice(b"\\\\"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            0x0A => out.extend_from_slice(b"\\n"),
            0x0D => out.extend_from_slice(b"\\r"),
            0x09 => out.extend_from_slice(b"\\t"),
            cp if cp < 0x20 => {
                out.extend_from_slice(format!("\\u{cp:04x}").as_bytes());
            }
            cp => push_code_point(&mut out, cp),
        }
    }
    out.push(b'"');
    out
}
