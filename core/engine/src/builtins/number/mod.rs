//! The global `Number` object and the numeric global functions.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-number-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Number

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::{ConstructorBuilder, JsObject, ObjectKind},
    property::Attribute,
    value::number_to_js_string,
    Context, JsArgs, JsResult, JsString, JsValue,
};

/// The `Number` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Number;

impl BuiltIn for Number {
    const NAME: &'static str = "Number";

    fn init(context: &mut Context) -> JsValue {
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        let standard = context.standard_objects().number();
        let constructor =
            ConstructorBuilder::with_standard_object(context, Self::constructor, standard)
                .name(Self::NAME)
                .length(1)
                .static_property("EPSILON", f64::EPSILON, attribute)
                .static_property("MAX_SAFE_INTEGER", 9_007_199_254_740_991.0_f64, attribute)
                .static_property("MIN_SAFE_INTEGER", -9_007_199_254_740_991.0_f64, attribute)
                .static_property("MAX_VALUE", f64::MAX, attribute)
                .static_property("MIN_VALUE", f64::MIN_POSITIVE, attribute)
                .static_property("POSITIVE_INFINITY", f64::INFINITY, attribute)
                .static_property("NEGATIVE_INFINITY", f64::NEG_INFINITY, attribute)
                .static_property("NaN", f64::NAN, attribute)
                .static_method(Self::is_finite, "isFinite", 1)
                .static_method(Self::is_nan, "isNaN", 1)
                .static_method(Self::is_integer, "isInteger", 1)
                .static_method(Self::is_safe_integer, "isSafeInteger", 1)
                .static_method(parse_int, "parseInt", 2)
                .static_method(parse_float, "parseFloat", 1)
                .method(Self::to_string, "toString", 1)
                .method(Self::to_fixed, "toFixed", 1)
                .method(Self::to_precision, "toPrecision", 1)
                .method(Self::to_exponential, "toExponential", 1)
                .method(Self::value_of, "valueOf", 0)
                .build();
        JsValue::Object(constructor)
    }
}

fn this_number(this: &JsValue) -> JsResult<f64> {
    match this.unwrapped() {
        JsValue::Number(value) => Ok(value),
        _ => Err(JsNativeError::typ()
            .with_message("Number.prototype.valueOf requires a number receiver")
            .into()),
    }
}

impl Number {
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let constructing = context.take_constructing();
        let value = match args.first() {
            Some(value) => value.to_number(context)?,
            None => 0.0,
        };
        if constructing {
            return Ok(JsValue::Object(JsObject::new(
                ObjectKind::Number(value),
                Some(context.standard_objects().number().prototype()),
            )));
        }
        Ok(JsValue::Number(value))
    }

    /// `Number.isFinite( value )`
    fn is_finite(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(matches!(
            args.get_or_undefined(0),
            JsValue::Number(value) if value.is_finite()
        )))
    }

    /// `Number.isNaN( value )`
    fn is_nan(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(matches!(
            args.get_or_undefined(0),
            JsValue::Number(value) if value.is_nan()
        )))
    }

    /// `Number.isInteger( value )`
    fn is_integer(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(matches!(
            args.get_or_undefined(0),
            JsValue::Number(value) if value.is_finite() && value.fract() == 0.0
        )))
    }

    /// `Number.isSafeInteger( value )`
    fn is_safe_integer(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Boolean(matches!(
            args.get_or_undefined(0),
            JsValue::Number(value)
                if value.is_finite()
                    && value.fract() == 0.0
                    && value.abs() <= 9_007_199_254_740_991.0
        )))
    }

    /// `Number.prototype.toString( radix )`
    fn to_string(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = this_number(this)?;
        let radix = match args.get_or_undefined(0) {
            JsValue::Undefined => 10,
            radix => {
                let radix = radix.to_number(context)?;
                if !(2.0..=36.0).contains(&radix) || radix.fract() != 0.0 {
                    return Err(JsNativeError::range()
                        .with_message("toString() radix must be between 2 and 36")
                        .into());
                }
                radix as u32
            }
        };
        if radix == 10 {
            return Ok(JsValue::String(number_to_js_string(value)));
        }
        Ok(JsValue::String(JsString::from(to_radix_string(
            value, radix,
        ))))
    }

    /// `Number.prototype.toFixed( digits )`
    fn to_fixed(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = this_number(this)?;
        let digits = fraction_digits(args.get_or_undefined(0), context, "toFixed")?;
        if !value.is_finite() || value.abs() >= 1e21 {
            return Ok(JsValue::String(number_to_js_string(value)));
        }
        Ok(JsValue::String(JsString::from(format!(
            "{value:.digits$}",
        ))))
    }

    /// `Number.prototype.toExponential( digits )`
    fn to_exponential(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = this_number(this)?;
        if !value.is_finite() {
            return Ok(JsValue::String(number_to_js_string(value)));
        }
        let digits = match args.get_or_undefined(0) {
            JsValue::Undefined => 6,
            value => fraction_digits(value, context, "toExponential")?,
        };
        let formatted = format!("{value:.digits$e}");
        // Rust prints `1.5e2`; ECMAScript wants `1.5e+2`.
        let formatted = match formatted.find('e') {
            Some(position) if !formatted[position + 1..].starts_with('-') => {
                format!("{}e+{}", &formatted[..position], &formatted[position + 1..])
            }
            _ => formatted,
        };
        Ok(JsValue::String(JsString::from(formatted)))
    }

    /// `Number.prototype.toPrecision( precision )`
    fn to_precision(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = this_number(this)?;
        let precision = match args.get_or_undefined(0) {
            JsValue::Undefined => return Ok(JsValue::String(number_to_js_string(value))),
            precision => {
                let precision = precision.to_number(context)?;
                if !(1.0..=100.0).contains(&precision) || precision.fract() != 0.0 {
                    return Err(JsNativeError::range()
                        .with_message("toPrecision() argument must be between 1 and 100")
                        .into());
                }
                precision as usize
            }
        };
        if !value.is_finite() || value == 0.0 {
            return Ok(JsValue::String(number_to_js_string(value)));
        }
        let exponent = value.abs().log10().floor() as i64;
        if exponent < -6 || exponent >= precision as i64 {
            return Self::to_exponential(
                this,
                &[JsValue::from((precision - 1) as f64)],
                context,
            );
        }
        let digits = (precision as i64 - 1 - exponent).max(0) as usize;
        Ok(JsValue::String(JsString::from(format!(
            "{value:.digits$}",
        ))))
    }

    /// `Number.prototype.valueOf()`
    fn value_of(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Number(this_number(this)?))
    }
}

fn fraction_digits(value: &JsValue, context: &mut Context, name: &str) -> JsResult<usize> {
    let digits = value.to_number(context)?;
    if digits.is_nan() {
        return Ok(0);
    }
    if !(0.0..=100.0).contains(&digits) {
        return Err(JsNativeError::range()
            .with_message(format!(
                "{name}() digits argument must be between 0 and 100"
            ))
            .into());
    }
    Ok(digits as usize)
}

// Integer-and-fraction conversion for non-decimal radixes.
fn to_radix_string(value: f64, radix: u32) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let negative = value < 0.0;
    let mut integer = value.abs().trunc();
    let mut fraction = value.abs().fract();

    let digit_char = |digit: u32| {
        char::from_digit(digit, radix).expect("digit is below the radix")
    };
    let mut digits = Vec::new();
    if integer == 0.0 {
        digits.push('0');
    }
    while integer >= 1.0 {
        let digit = (integer % f64::from(radix)) as u32;
        digits.push(digit_char(digit));
        integer = (integer / f64::from(radix)).trunc();
    }
    let mut result = String::new();
    if negative {
        result.push('-');
    }
    result.extend(digits.iter().rev());
    if fraction > 0.0 {
        result.push('.');
        // 20 fractional digits bound the precision of an f64 in any radix.
        for _ in 0..20 {
            fraction *= f64::from(radix);
            let digit = fraction.trunc() as u32;
            result.push(digit_char(digit));
            fraction -= fraction.trunc();
            if fraction == 0.0 {
                break;
            }
        }
    }
    result
}

/// The global `parseInt`.
pub(crate) fn parse_int(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let text = args.get_or_undefined(0).to_string(context)?;
    let text = text.to_std_string_lossy();
    let mut rest = text.trim_start_matches(|c: char| c.is_whitespace());
    let mut sign = 1.0;
    if let Some(stripped) = rest.strip_prefix('-') {
        sign = -1.0;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }
    let mut radix = match args.get_or_undefined(1) {
        JsValue::Undefined => 0,
        value => value.to_int32(context)?,
    };
    if radix != 0 && !(2..=36).contains(&radix) {
        return Ok(JsValue::nan());
    }
    if radix == 0 || radix == 16 {
        if let Some(stripped) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
            rest = stripped;
            radix = 16;
        } else if radix == 0 {
            radix = 10;
        }
    }
    let mut value = 0.0_f64;
    let mut digits = 0usize;
    for c in rest.chars() {
        match c.to_digit(radix as u32) {
            Some(digit) => {
                value = value * f64::from(radix) + f64::from(digit);
                digits += 1;
            }
            None => break,
        }
    }
    if digits == 0 {
        return Ok(JsValue::nan());
    }
    Ok(JsValue::Number(sign * value))
}

/// The global `parseFloat`.
pub(crate) fn parse_float(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let text = args.get_or_undefined(0).to_string(context)?;
    let text = text.to_std_string_lossy();
    let rest = text.trim_start_matches(|c: char| c.is_whitespace());

    // Longest valid decimal prefix.
    let bytes = rest.as_bytes();
    let mut end = 0usize;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    while end < bytes.len() {
        match bytes[end] {
            b'+' | b'-' if end == 0 => {}
            b'+' | b'-' if matches!(bytes.get(end - 1), Some(b'e' | b'E')) => {}
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => seen_exp = true,
            _ => break,
        }
        end += 1;
    }
    let prefix = &rest[..end];
    if rest.starts_with("Infinity") || rest.starts_with("+Infinity") {
        return Ok(JsValue::Number(f64::INFINITY));
    }
    if rest.starts_with("-Infinity") {
        return Ok(JsValue::Number(f64::NEG_INFINITY));
    }
    if !seen_digit {
        return Ok(JsValue::nan());
    }
    // Trim a trailing exponent marker without digits.
    let prefix = prefix.trim_end_matches(|c| matches!(c, 'e' | 'E' | '+' | '-'));
    match fast_float2::parse::<f64, _>(prefix) {
        Ok(value) => Ok(JsValue::Number(value)),
        Err(_) => Ok(JsValue::nan()),
    }
}

/// The global `isNaN`.
pub(crate) fn global_is_nan(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let number = args.get_or_undefined(0).to_number(context)?;
    Ok(JsValue::Boolean(number.is_nan()))
}

/// The global `isFinite`.
pub(crate) fn global_is_finite(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let number = args.get_or_undefined(0).to_number(context)?;
    Ok(JsValue::Boolean(number.is_finite()))
}
