//! Property keys, attributes and descriptors.

use crate::{object::JsObject, Context, JsResult, JsString, JsSymbol, JsValue};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// The attribute flags of a property.
    ///
    /// The readonly/permanent aliases exist so attribute lists in the
    /// built-in tables read the way the prose does.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attribute: u8 {
        /// The property can be written to.
        const WRITABLE = 0b0000_0001;
        /// The property shows up in `for…in` and `Object.keys`.
        const ENUMERABLE = 0b0000_0010;
        /// The property can be deleted and reconfigured.
        const CONFIGURABLE = 0b0000_0100;
    }
}

impl Attribute {
    /// Alias: not writable.
    pub const READONLY: Self = Self::empty();
    /// Alias: not enumerable.
    pub const NON_ENUMERABLE: Self = Self::empty();
    /// Alias: not configurable.
    pub const PERMANENT: Self = Self::empty();

    /// Checks if the writable flag is set.
    #[must_use]
    pub const fn writable(self) -> bool {
        self.contains(Self::WRITABLE)
    }

    /// Checks if the enumerable flag is set.
    #[must_use]
    pub const fn enumerable(self) -> bool {
        self.contains(Self::ENUMERABLE)
    }

    /// Checks if the configurable flag is set.
    #[must_use]
    pub const fn configurable(self) -> bool {
        self.contains(Self::CONFIGURABLE)
    }
}

/// A normalised property key.
///
/// Strings holding a canonical integer in `0..u32::MAX` become
/// [`PropertyKey::Index`], so array indices never string-compare.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// An array index.
    Index(u32),
    /// A string key.
    String(JsString),
    /// A symbol key.
    Symbol(JsSymbol),
}

impl PropertyKey {
    /// Renders the key the way error messages and `for…in` see it.
    #[must_use]
    pub fn to_js_string(&self) -> JsString {
        match self {
            Self::Index(index) => JsString::from(index.to_string()),
            Self::String(string) => string.clone(),
            Self::Symbol(symbol) => symbol.descriptive_string(),
        }
    }

    /// The index, if this is an index key.
    #[must_use]
    pub fn as_index(&self) -> Option<u32> {
        match self {
            Self::Index(index) => Some(*index),
            _ => None,
        }
    }
}

impl From<JsString> for PropertyKey {
    fn from(string: JsString) -> Self {
        if let Some(text) = string.as_str() {
            if let Some(index) = canonical_index(text) {
                return Self::Index(index);
            }
        }
        Self::String(string)
    }
}

impl From<&str> for PropertyKey {
    fn from(string: &str) -> Self {
        if let Some(index) = canonical_index(string) {
            return Self::Index(index);
        }
        Self::String(JsString::from(string))
    }
}

impl From<u32> for PropertyKey {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl From<usize> for PropertyKey {
    fn from(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(index) if index != u32::MAX => Self::Index(index),
            _ => Self::String(JsString::from(index.to_string())),
        }
    }
}

impl From<JsSymbol> for PropertyKey {
    fn from(symbol: JsSymbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}

// A string is a canonical array index if it round-trips through u32 and is
// below 2^32 - 1.
fn canonical_index(text: &str) -> Option<u32> {
    if text.is_empty() || (text.len() > 1 && text.starts_with('0')) {
        return None;
    }
    let index: u32 = text.parse().ok()?;
    if index == u32::MAX {
        return None;
    }
    Some(index)
}

/// The get callback of a handler property.
pub type HandlerGet = fn(&JsObject, &PropertyKey, &mut Context) -> JsResult<JsValue>;
/// The set callback of a handler property.
pub type HandlerSet = fn(&JsObject, &PropertyKey, &JsValue, &mut Context) -> JsResult<()>;
/// The delete callback of a handler property.
pub type HandlerDelete = fn(&JsObject, &PropertyKey, &mut Context) -> JsResult<bool>;

/// A property whose reads and writes go through native callbacks instead of
/// a stored value. Used for lazily materialised globals and for the
/// per-kind instance properties (`array.length`, `fn.prototype`, …).
#[derive(Debug, Clone, Copy)]
pub struct PropertyHandler {
    /// Called on reads. A `None` entry reads as `undefined`.
    pub get: Option<HandlerGet>,
    /// Called on writes. A `None` entry falls back to a plain own write.
    pub set: Option<HandlerSet>,
    /// Called on deletes. A `None` entry uses the attribute rules.
    pub delete: Option<HandlerDelete>,
}

/// The payload of a property.
#[derive(Debug, Clone)]
pub enum PropertyKind {
    /// A plain data property.
    Data(JsValue),
    /// An accessor pair. Either side may be absent.
    Accessor {
        /// The getter function.
        get: Option<JsObject>,
        /// The setter function.
        set: Option<JsObject>,
    },
    /// A native handler property.
    Handler(PropertyHandler),
    /// A tombstone shadowing an entry of the shared table after `delete`.
    Whiteout,
    /// No payload specified: a `defineProperty` descriptor that only
    /// changes attributes.
    Generic,
}

/// A property descriptor: a payload plus tri-valued attributes (`None`
/// means unset, which matters for `Object.defineProperty`).
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    kind: PropertyKind,
    enumerable: Option<bool>,
    writable: Option<bool>,
    configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Creates a data descriptor with all attributes set from `attribute`.
    #[must_use]
    pub fn data<V: Into<JsValue>>(value: V, attribute: Attribute) -> Self {
        Self {
            kind: PropertyKind::Data(value.into()),
            enumerable: Some(attribute.enumerable()),
            writable: Some(attribute.writable()),
            configurable: Some(attribute.configurable()),
        }
    }

    /// Creates an accessor descriptor.
    #[must_use]
    pub fn accessor(get: Option<JsObject>, set: Option<JsObject>, attribute: Attribute) -> Self {
        Self {
            kind: PropertyKind::Accessor { get, set },
            enumerable: Some(attribute.enumerable()),
            writable: None,
            configurable: Some(attribute.configurable()),
        }
    }

    /// Creates a handler descriptor.
    #[must_use]
    pub fn handler(handler: PropertyHandler, attribute: Attribute) -> Self {
        Self {
            kind: PropertyKind::Handler(handler),
            enumerable: Some(attribute.enumerable()),
            writable: Some(attribute.writable()),
            configurable: Some(attribute.configurable()),
        }
    }

    /// Creates the whiteout tombstone.
    #[must_use]
    pub fn whiteout() -> Self {
        Self {
            kind: PropertyKind::Whiteout,
            enumerable: Some(false),
            writable: Some(false),
            configurable: Some(true),
        }
    }

    /// Creates an empty descriptor with every field unset, for
    /// `Object.defineProperty` style incremental construction.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kind: PropertyKind::Generic,
            enumerable: None,
            writable: None,
            configurable: None,
        }
    }

    /// The payload of the property.
    #[must_use]
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Replaces the payload.
    pub fn set_kind(&mut self, kind: PropertyKind) {
        self.kind = kind;
    }

    /// Returns `true` for data and handler properties.
    #[must_use]
    pub fn is_data(&self) -> bool {
        matches!(
            self.kind,
            PropertyKind::Data(_) | PropertyKind::Handler(_)
        )
    }

    /// Returns `true` for accessor properties.
    #[must_use]
    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, PropertyKind::Accessor { .. })
    }

    /// Returns `true` for the whiteout tombstone.
    #[must_use]
    pub fn is_whiteout(&self) -> bool {
        matches!(self.kind, PropertyKind::Whiteout)
    }

    /// The stored value of a data property.
    #[must_use]
    pub fn value(&self) -> Option<&JsValue> {
        match &self.kind {
            PropertyKind::Data(value) => Some(value),
            _ => None,
        }
    }

    /// Effective enumerability (unset reads as `false`).
    #[must_use]
    pub fn enumerable(&self) -> bool {
        self.enumerable.unwrap_or(false)
    }

    /// Effective writability (unset reads as `false`).
    #[must_use]
    pub fn writable(&self) -> bool {
        self.writable.unwrap_or(false)
    }

    /// Effective configurability (unset reads as `false`).
    #[must_use]
    pub fn configurable(&self) -> bool {
        self.configurable.unwrap_or(false)
    }

    /// The raw tri-valued enumerable field.
    #[must_use]
    pub fn enumerable_raw(&self) -> Option<bool> {
        self.enumerable
    }

    /// The raw tri-valued writable field.
    #[must_use]
    pub fn writable_raw(&self) -> Option<bool> {
        self.writable
    }

    /// The raw tri-valued configurable field.
    #[must_use]
    pub fn configurable_raw(&self) -> Option<bool> {
        self.configurable
    }

    /// Sets the enumerable field.
    pub fn set_enumerable(&mut self, enumerable: bool) {
        self.enumerable = Some(enumerable);
    }

    /// Sets the writable field.
    pub fn set_writable(&mut self, writable: bool) {
        self.writable = Some(writable);
    }

    /// Sets the configurable field.
    pub fn set_configurable(&mut self, configurable: bool) {
        self.configurable = Some(configurable);
    }

    /// Fills unset attributes with `false` and an unset payload with
    /// `undefined`, the `defineProperty` defaults for a new property.
    pub fn complete(&mut self) {
        if matches!(self.kind, PropertyKind::Generic) {
            self.kind = PropertyKind::Data(JsValue::Undefined);
        }
        self.enumerable.get_or_insert(false);
        self.configurable.get_or_insert(false);
        if matches!(self.kind, PropertyKind::Data(_)) {
            self.writable.get_or_insert(false);
        }
    }
}
