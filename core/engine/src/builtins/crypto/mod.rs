//! The `crypto` host module: MD5/SHA-1/SHA-256 digests and HMAC.
//!
//! Hash and Hmac values are single-use native-state objects; `digest`
//! consumes the state and later calls throw, matching the reference
//! behaviour.

use super::{encoding::Encoding, BuiltIn};
use crate::{
    error::JsNativeError,
    object::{ObjectInitializer, ObjectKind},
    Context, JsArgs, JsResult, JsValue,
};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::Sha256;

/// The `crypto` module object.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Crypto;

impl BuiltIn for Crypto {
    const NAME: &'static str = "crypto";

    fn init(context: &mut Context) -> JsValue {
        let object = ObjectInitializer::new(context)
            .function(Self::create_hash, "createHash", 1)
            .function(Self::create_hmac, "createHmac", 2)
            .build();
        JsValue::Object(object)
    }
}

// The running state of a digest; `digest()` takes it out.
#[derive(Debug)]
enum HashState {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Consumed,
}

impl HashState {
    fn new(algorithm: &str) -> Option<Self> {
        match algorithm {
            "md5" => Some(Self::Md5(Md5::new())),
            "sha1" => Some(Self::Sha1(Sha1::new())),
            "sha256" => Some(Self::Sha256(Sha256::new())),
            _ => None,
        }
    }

    fn update(&mut self, bytes: &[u8]) -> bool {
        match self {
            Self::Md5(state) => state.update(bytes),
            Self::Sha1(state) => state.update(bytes),
            Self::Sha256(state) => state.update(bytes),
            Self::Consumed => return false,
        }
        true
    }

    fn finalize(&mut self) -> Option<Vec<u8>> {
        match std::mem::replace(self, Self::Consumed) {
            Self::Md5(state) => Some(state.finalize().to_vec()),
            Self::Sha1(state) => Some(state.finalize().to_vec()),
            Self::Sha256(state) => Some(state.finalize().to_vec()),
            Self::Consumed => None,
        }
    }
}

#[derive(Debug)]
enum HmacState {
    Md5(Hmac<Md5>),
    Sha1(Hmac<Sha1>),
    Sha256(Hmac<Sha256>),
    Consumed,
}

impl HmacState {
    fn new(algorithm: &str, key: &[u8]) -> Option<Self> {
        match algorithm {
            "md5" => Hmac::new_from_slice(key).ok().map(Self::Md5),
            "sha1" => Hmac::new_from_slice(key).ok().map(Self::Sha1),
            "sha256" => Hmac::new_from_slice(key).ok().map(Self::Sha256),
            _ => None,
        }
    }

    fn update(&mut self, bytes: &[u8]) -> bool {
        match self {
            Self::Md5(state) => state.update(bytes),
            Self::Sha1(state) => state.update(bytes),
            Self::Sha256(state) => state.update(bytes),
            Self::Consumed => return false,
        }
        true
    }

    fn finalize(&mut self) -> Option<Vec<u8>> {
        match std::mem::replace(self, Self::Consumed) {
            Self::Md5(state) => Some(state.finalize().into_bytes().to_vec()),
            Self::Sha1(state) => Some(state.finalize().into_bytes().to_vec()),
            Self::Sha256(state) => Some(state.finalize().into_bytes().to_vec()),
            Self::Consumed => None,
        }
    }
}

// Resolves the `update` argument: strings pass their raw bytes through, an
// optional encoding re-decodes them first.
fn data_bytes(args: &[JsValue], context: &mut Context) -> JsResult<Vec<u8>> {
    let data = args.get_or_undefined(0).to_string(context)?;
    match args.get(1) {
        None | Some(JsValue::Undefined) => Ok(data.as_bytes().to_vec()),
        Some(encoding) => Encoding::from_value(encoding, context)?.decode(&data),
    }
}

fn digest_value(bytes: &[u8], args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    match args.first() {
        None | Some(JsValue::Undefined) => {
            Ok(JsValue::String(Encoding::Utf8.encode(bytes)))
        }
        Some(encoding) => {
            let encoding = Encoding::from_value(encoding, context)?;
            Ok(JsValue::String(encoding.encode(bytes)))
        }
    }
}

fn consumed_error(kind: &str) -> crate::JsError {
    JsNativeError::internal()
        .with_message(format!("{kind} state was already consumed"))
        .into()
}

impl Crypto {
    /// `crypto.createHash( algorithm )`
    fn create_hash(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let algorithm = args.get_or_undefined(0).to_string(context)?;
        let state = algorithm
            .as_str()
            .and_then(HashState::new)
            .ok_or_else(|| -> crate::JsError {
                JsNativeError::typ()
                    .with_message(format!("Unknown digest algorithm: \"{algorithm}\""))
                    .into()
            })?;
        let object = ObjectInitializer::new(context)
            .function(Self::hash_update, "update", 1)
            .function(Self::hash_digest, "digest", 1)
            .build();
        object.borrow_mut().set_kind(ObjectKind::Native(Box::new(state)));
        Ok(JsValue::Object(object))
    }

    /// `crypto.createHmac( algorithm, key )`
    fn create_hmac(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let algorithm = args.get_or_undefined(0).to_string(context)?;
        let key = args.get_or_undefined(1).to_string(context)?;
        let state = algorithm
            .as_str()
            .and_then(|name| HmacState::new(name, key.as_bytes()))
            .ok_or_else(|| -> crate::JsError {
                JsNativeError::typ()
                    .with_message(format!("Unknown digest algorithm: \"{algorithm}\""))
                    .into()
            })?;
        let object = ObjectInitializer::new(context)
            .function(Self::hmac_update, "update", 1)
            .function(Self::hmac_digest, "digest", 1)
            .build();
        object.borrow_mut().set_kind(ObjectKind::Native(Box::new(state)));
        Ok(JsValue::Object(object))
    }

    fn hash_update(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = data_bytes(args, context)?;
        with_hash(this, |state| state.update(&bytes))?
            .then(|| this.clone())
            .ok_or_else(|| consumed_error("Hash"))
    }

    fn hash_digest(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes =
            with_hash(this, HashState::finalize)?.ok_or_else(|| consumed_error("Hash"))?;
        digest_value(&bytes, args, context)
    }

    fn hmac_update(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes = data_bytes(args, context)?;
        with_hmac(this, |state| state.update(&bytes))?
            .then(|| this.clone())
            .ok_or_else(|| consumed_error("Hmac"))
    }

    fn hmac_digest(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let bytes =
            with_hmac(this, HmacState::finalize)?.ok_or_else(|| consumed_error("Hmac"))?;
        digest_value(&bytes, args, context)
    }
}

fn with_hash<R>(this: &JsValue, act: impl FnOnce(&mut HashState) -> R) -> JsResult<R> {
    with_native(this, act, "Hash")
}

fn with_hmac<R>(this: &JsValue, act: impl FnOnce(&mut HmacState) -> R) -> JsResult<R> {
    with_native(this, act, "Hmac")
}

fn with_native<S: 'static, R>(
    this: &JsValue,
    act: impl FnOnce(&mut S) -> R,
    kind: &str,
) -> JsResult<R> {
    let Some(object) = this.as_object() else {
        return Err(incompatible(kind));
    };
    let mut borrowed = object.borrow_mut();
    let ObjectKind::Native(native) = borrowed.kind_mut() else {
        return Err(incompatible(kind));
    };
    let Some(state) = native.as_mut_any().downcast_mut::<S>() else {
        return Err(incompatible(kind));
    };
    Ok(act(state))
}

fn incompatible(kind: &str) -> crate::JsError {
    JsNativeError::typ()
        .with_message(format!("{kind} method called on incompatible receiver"))
        .into()
}
