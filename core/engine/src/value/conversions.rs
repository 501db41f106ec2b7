//! Abstract conversion operations (`ToPrimitive`, `ToNumber`, `ToString`,
//! `ToObject` and the integer clamps).

use super::{wrapped_primitive, IntegerOrInfinity, JsValue};
use crate::{
    error::JsNativeError,
    object::{JsObject, ObjectKind},
    property::PropertyKey,
    symbol::WellKnownSymbol,
    Context, JsResult, JsString,
};

/// The hint passed to `ToPrimitive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    /// No preference (`default`).
    Default,
    /// Prefer a number result.
    Number,
    /// Prefer a string result.
    String,
}

impl JsValue {
    /// `ToPrimitive`, honouring a `Symbol.toPrimitive` method when the
    /// object provides one, then `valueOf`/`toString` in hint order.
    pub fn to_primitive(&self, hint: PreferredType, context: &mut Context) -> JsResult<JsValue> {
        let Self::Object(object) = self else {
            if let Self::External(_) = self {
                // Externals stringify through their description.
                return Ok(Self::String(JsString::from("[external]")));
            }
            return Ok(self.clone());
        };

        let exotic = context.well_known_symbol(WellKnownSymbol::ToPrimitive);
        let exotic = object.get(&PropertyKey::Symbol(exotic), context)?;
        if !exotic.is_null_or_undefined() {
            let hint_string = match hint {
                PreferredType::Default => "default",
                PreferredType::Number => "number",
                PreferredType::String => "string",
            };
            let result = context.call(&exotic, self, &[JsValue::from(hint_string)])?;
            if result.is_primitive() {
                return Ok(result);
            }
            return Err(JsNativeError::typ()
                .with_message("Cannot convert object to primitive value")
                .into());
        }

        let methods: [&str; 2] = match hint {
            PreferredType::String => ["toString", "valueOf"],
            _ => ["valueOf", "toString"],
        };
        for name in methods {
            let method = object.get(&name.into(), context)?;
            if method.is_callable() {
                let result = context.call(&method, self, &[])?;
                if result.is_primitive() {
                    return Ok(result);
                }
            }
        }
        Err(JsNativeError::typ()
            .with_message("Cannot convert object to primitive value")
            .into())
    }

    /// `ToNumber`.
    pub fn to_number(&self, context: &mut Context) -> JsResult<f64> {
        match self {
            Self::Null => Ok(0.0),
            Self::Undefined | Self::Invalid => Ok(f64::NAN),
            Self::Boolean(boolean) => Ok(if *boolean { 1.0 } else { 0.0 }),
            Self::Number(number) => Ok(*number),
            Self::String(string) => Ok(string_to_number(string)),
            Self::Symbol(_) => Err(JsNativeError::typ()
                .with_message("Cannot convert a Symbol value to a number")
                .into()),
            Self::Data(_) => Ok(f64::NAN),
            Self::External(_) | Self::Object(_) => {
                let primitive = self.to_primitive(PreferredType::Number, context)?;
                let number = primitive.to_number(context)?;
                Ok(context.canonicalize_number(number))
            }
        }
    }

    /// `ToString`.
    pub fn to_string(&self, context: &mut Context) -> JsResult<JsString> {
        match self {
            Self::Null => Ok(JsString::from("null")),
            Self::Undefined | Self::Invalid => Ok(JsString::from("undefined")),
            Self::Boolean(boolean) => Ok(JsString::from(if *boolean { "true" } else { "false" })),
            Self::Number(number) => Ok(number_to_js_string(*number)),
            Self::String(string) => Ok(string.clone()),
            Self::Symbol(_) => Err(JsNativeError::typ()
                .with_message("Cannot convert a Symbol value to a string")
                .into()),
            Self::Data(_) => Ok(JsString::from("[data]")),
            Self::External(_) | Self::Object(_) => {
                let primitive = self.to_primitive(PreferredType::String, context)?;
                primitive.to_string(context)
            }
        }
    }

    /// `ToObject`: wraps primitives, rejects `null`/`undefined`.
    pub fn to_object(&self, context: &mut Context) -> JsResult<JsObject> {
        let objects = context.standard_objects();
        let (kind, prototype) = match self {
            Self::Object(object) => return Ok(object.clone()),
            Self::Null | Self::Undefined | Self::Invalid => {
                return Err(JsNativeError::typ()
                    .with_message(format!("cannot convert {} to object", self.type_of()))
                    .into());
            }
            Self::Boolean(boolean) => (ObjectKind::Boolean(*boolean), objects.boolean().prototype()),
            Self::Number(number) => (ObjectKind::Number(*number), objects.number().prototype()),
            Self::String(string) => {
                let object = JsObject::new(
                    ObjectKind::String(string.clone()),
                    Some(objects.string().prototype()),
                );
                object
                    .borrow_mut()
                    .set_shared_properties(context.realm().string_instance_table());
                return Ok(object);
            }
            Self::Symbol(symbol) => (ObjectKind::Symbol(symbol.clone()), objects.symbol().prototype()),
            Self::Data(_) | Self::External(_) => {
                return Err(JsNativeError::typ()
                    .with_message("cannot convert host value to object")
                    .into());
            }
        };
        Ok(JsObject::new(kind, Some(prototype)))
    }

    /// `ToPropertyKey`.
    pub fn to_property_key(&self, context: &mut Context) -> JsResult<PropertyKey> {
        match self {
            Self::Symbol(symbol) => Ok(PropertyKey::Symbol(symbol.clone())),
            Self::Number(number) => {
                if let Some(index) = f64_to_index(*number) {
                    return Ok(PropertyKey::Index(index));
                }
                Ok(PropertyKey::from(number_to_js_string(*number)))
            }
            _ => Ok(PropertyKey::from(self.to_string(context)?)),
        }
    }

    /// `ToInt32`.
    pub fn to_int32(&self, context: &mut Context) -> JsResult<i32> {
        Ok(f64_to_int32(self.to_number(context)?))
    }

    /// `ToUint32`.
    pub fn to_uint32(&self, context: &mut Context) -> JsResult<u32> {
        Ok(f64_to_uint32(self.to_number(context)?))
    }

    /// `ToIntegerOrInfinity`.
    pub fn to_integer_or_infinity(&self, context: &mut Context) -> JsResult<IntegerOrInfinity> {
        Ok(IntegerOrInfinity::from_number(self.to_number(context)?))
    }

    /// `ToLength`: clamps to `[0, 2^53 - 1]`.
    pub fn to_length(&self, context: &mut Context) -> JsResult<u64> {
        let number = self.to_number(context)?;
        if number.is_nan() || number <= 0.0 {
            return Ok(0);
        }
        Ok(number.min(9_007_199_254_740_991.0) as u64)
    }

    /// Unwraps a primitive wrapper object, for `valueOf`-style receivers.
    #[must_use]
    pub fn unwrapped(&self) -> JsValue {
        if let Self::Object(object) = self {
            if let Some(primitive) = wrapped_primitive(object) {
                return primitive;
            }
        }
        self.clone()
    }
}

/// `ToInt32` on a plain number.
#[must_use]
pub fn f64_to_int32(number: f64) -> i32 {
    f64_to_uint32(number) as i32
}

/// `ToUint32` on a plain number.
#[must_use]
pub fn f64_to_uint32(number: f64) -> u32 {
    if !number.is_finite() || number == 0.0 {
        return 0;
    }
    let modulus = 4_294_967_296.0;
    let mut value = number.trunc() % modulus;
    if value < 0.0 {
        value += modulus;
    }
    value as u32
}

// A number usable as an array index key.
fn f64_to_index(number: f64) -> Option<u32> {
    if number.fract() != 0.0 || !(0.0..4_294_967_295.0).contains(&number) {
        return None;
    }
    if number == 0.0 && number.is_sign_negative() {
        return None;
    }
    Some(number as u32)
}

/// `Number → String` with ECMAScript shortest round-trip formatting.
#[must_use]
pub fn number_to_js_string(number: f64) -> JsString {
    let mut buffer = ryu_js::Buffer::new();
    JsString::from(buffer.format(number))
}

/// `String → Number`: trims ECMAScript whitespace, accepts decimal,
/// `Infinity` and the `0x`/`0o`/`0b` prefixes, and yields `NaN` otherwise.
#[must_use]
pub fn string_to_number(string: &JsString) -> f64 {
    let Some(text) = string.as_str() else {
        return f64::NAN;
    };
    let trimmed = text.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '\u{FEFF}' | '\u{2028}' | '\u{2029}')
    });
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(rest) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return parse_radix(rest, 16);
    }
    if let Some(rest) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
        return parse_radix(rest, 8);
    }
    if let Some(rest) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        return parse_radix(rest, 2);
    }
    // fast-float accepts "inf"/"nan" spellings ECMAScript does not, so
    // validate the shape first.
    if !is_decimal_literal(trimmed) {
        return f64::NAN;
    }
    match fast_float2::parse::<f64, _>(trimmed) {
        Ok(value) => value,
        Err(_) => f64::NAN,
    }
}

// StrDecimalLiteral: [+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?
fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = 0usize;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }
    let int_digits = count_digits(bytes, pos);
    pos += int_digits;
    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        frac_digits = count_digits(bytes, pos);
        pos += frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exp_digits = count_digits(bytes, pos);
        if exp_digits == 0 {
            return false;
        }
        pos += exp_digits;
    }
    pos == bytes.len()
}

fn count_digits(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .count()
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0_f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(digit) => value = value * f64::from(radix) + f64::from(digit),
            None => return f64::NAN,
        }
    }
    value
}
