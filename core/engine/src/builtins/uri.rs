//! The URI handling global functions (`encodeURI`, `decodeURI` and the
//! component variants).
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-uri-handling-functions
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/encodeURI

use crate::{
    error::JsNativeError,
    string::push_code_point,
    Context, JsArgs, JsResult, JsString, JsValue,
};

// Characters encodeURI leaves alone beyond the unreserved set.
const URI_RESERVED: &[u8] = b";/?:@&=+$,#";
const URI_MARK: &[u8] = b"-_.!~*'()";

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || URI_MARK.contains(&byte)
}

fn encode(value: &JsValue, keep_reserved: bool, context: &mut Context) -> JsResult<JsValue> {
    let string = value.to_string(context)?;
    let mut out = Vec::with_capacity(string.byte_len());
    for cp in string.code_points() {
        // Unpaired surrogates cannot be UTF-8 encoded.
        if (0xD800..0xE000).contains(&cp) {
            return Err(JsNativeError::uri()
                .with_message("URI malformed")
                .into());
        }
        let mut utf8 = Vec::with_capacity(4);
        push_code_point(&mut utf8, cp);
        if utf8.len() == 1 {
            let byte = utf8[0];
            if is_unreserved(byte) || (keep_reserved && URI_RESERVED.contains(&byte)) {
                out.push(byte);
                continue;
            }
        }
        for byte in utf8 {
            out.extend_from_slice(format!("%{byte:02X}").as_bytes());
        }
    }
    Ok(JsValue::String(JsString::from_wtf8(out)))
}

fn decode(value: &JsValue, keep_reserved: bool, context: &mut Context) -> JsResult<JsValue> {
    let string = value.to_string(context)?;
    let bytes = string.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0usize;
    let malformed = || -> crate::JsError {
        JsNativeError::uri().with_message("URI malformed").into()
    };
    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte != b'%' {
            out.push(byte);
            pos += 1;
            continue;
        }
        let hex = |offset: usize| -> JsResult<u8> {
            let high = bytes
                .get(offset)
                .and_then(|&b| char::from(b).to_digit(16))
                .ok_or_else(malformed)?;
            let low = bytes
                .get(offset + 1)
                .and_then(|&b| char::from(b).to_digit(16))
                .ok_or_else(malformed)?;
            Ok((high * 16 + low) as u8)
        };
        let decoded = hex(pos + 1)?;
        // decodeURI leaves encoded reserved characters encoded.
        if keep_reserved && decoded < 0x80 && URI_RESERVED.contains(&decoded) {
            out.extend_from_slice(&bytes[pos..pos + 3]);
        } else {
            out.push(decoded);
        }
        pos += 3;
    }
    // The decoded bytes must be valid UTF-8.
    match std::string::String::from_utf8(out) {
        Ok(text) => Ok(JsValue::String(JsString::from(text))),
        Err(_) => Err(malformed()),
    }
}

/// The global `encodeURI`.
pub(crate) fn encode_uri(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    encode(args.get_or_undefined(0), true, context)
}

/// The global `encodeURIComponent`.
pub(crate) fn encode_uri_component(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    encode(args.get_or_undefined(0), false, context)
}

/// The global `decodeURI`.
pub(crate) fn decode_uri(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    decode(args.get_or_undefined(0), true, context)
}

/// The global `decodeURIComponent`.
pub(crate) fn decode_uri_component(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    decode(args.get_or_undefined(0), false, context)
}
