//! The binary encodings shared by the `crypto` and `fs` modules: `hex`,
//! `base64`, `base64url` and `utf8`. Decoded bytes that are not UTF-8 text
//! surface as byte strings and round-trip losslessly.

use crate::{error::JsNativeError, Context, JsResult, JsString, JsValue};
use base64::Engine;

/// A supported binary encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    /// Lowercase hexadecimal.
    Hex,
    /// Standard base64 with padding.
    Base64,
    /// URL-safe base64 without padding.
    Base64Url,
    /// Plain text.
    Utf8,
}

impl Encoding {
    /// Parses an encoding name.
    pub(crate) fn from_value(value: &JsValue, context: &mut Context) -> JsResult<Self> {
        let name = value.to_string(context)?;
        match name.as_str() {
            Some("hex") => Ok(Self::Hex),
            Some("base64") => Ok(Self::Base64),
            Some("base64url") => Ok(Self::Base64Url),
            Some("utf8" | "utf-8") => Ok(Self::Utf8),
            _ => Err(JsNativeError::typ()
                .with_message(format!("Unknown encoding: \"{name}\""))
                .into()),
        }
    }

    /// Encodes raw bytes into a string of this encoding.
    pub(crate) fn encode(self, bytes: &[u8]) -> JsString {
        match self {
            Self::Hex => JsString::from(hex::encode(bytes)),
            Self::Base64 => {
                JsString::from(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            Self::Base64Url => {
                JsString::from(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
            }
            Self::Utf8 => JsString::from_encoded(bytes.to_vec()),
        }
    }

    /// Decodes a string of this encoding back into raw bytes.
    pub(crate) fn decode(self, string: &JsString) -> JsResult<Vec<u8>> {
        let malformed = |encoding: &str| -> crate::JsError {
            JsNativeError::typ()
                .with_message(format!("Invalid {encoding} input"))
                .into()
        };
        match self {
            Self::Hex => {
                let text = string.as_str().ok_or_else(|| malformed("hex"))?;
                hex::decode(text).map_err(|_| malformed("hex"))
            }
            Self::Base64 => {
                let text = string.as_str().ok_or_else(|| malformed("base64"))?;
                base64::engine::general_purpose::STANDARD
                    .decode(text)
                    .map_err(|_| malformed("base64"))
            }
            Self::Base64Url => {
                let text = string.as_str().ok_or_else(|| malformed("base64url"))?;
                base64::engine::general_purpose::URL_SAFE_NO_PAD
                    .decode(text)
                    .map_err(|_| malformed("base64url"))
            }
            Self::Utf8 => Ok(string.as_bytes().to_vec()),
        }
    }
}
