//! The Rust representation of a JavaScript object.

use crate::{
    error::JsNativeErrorKind,
    property::{Attribute, PropertyDescriptor, PropertyKey, PropertyKind},
    Context, JsString, JsSymbol, JsValue,
};
use bitflags::bitflags;
use std::{
    any::Any,
    cell::{Ref, RefCell, RefMut},
    fmt::{self, Debug},
    rc::Rc,
};

mod function;
mod internal_methods;
mod property_map;

pub use function::{Function, NativeClosure, NativeFunctionPointer};
pub use property_map::PropertyMap;

/// Static `prototype` property name, used when wiring constructors.
pub const PROTOTYPE: &str = "prototype";

/// Static `constructor` property name.
pub const CONSTRUCTOR: &str = "constructor";

/// This trait allows Rust types to be stored inside objects (crypto
/// digests and similar native state).
pub trait NativeObject: Debug + Any {
    /// Upcast to `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Upcast to `&mut dyn Any` for downcasting.
    fn as_mut_any(&mut self) -> &mut dyn Any;
}

impl<T: Any + Debug> NativeObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

bitflags! {
    /// Single-bit object state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ObjectFlags: u8 {
        /// New properties may be added.
        const EXTENSIBLE = 0b0000_0001;
        /// The object was instantiated from a shared descriptor table.
        const SHARED = 0b0000_0010;
        /// The object is an `Error` instance (toString shortcut).
        const ERROR_DATA = 0b0000_0100;
        /// Array elements are frozen (set by `Object.freeze`).
        const FROZEN_ELEMENTS = 0b0000_1000;
        /// Array elements are sealed (set by `Object.seal`).
        const SEALED_ELEMENTS = 0b0001_0000;
    }
}

/// The dense element store of an array.
///
/// `length` can exceed `elements.len()`: indices past the vector are holes,
/// as are [`JsValue::Invalid`] entries inside it.
#[derive(Debug, Default)]
pub struct ArrayStorage {
    pub(crate) elements: Vec<JsValue>,
    pub(crate) length: u32,
    pub(crate) length_writable: bool,
}

impl ArrayStorage {
    /// Creates an empty array store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            length: 0,
            length_writable: true,
        }
    }

    /// Creates a store with a capacity hint.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            length: 0,
            length_writable: true,
        }
    }

    /// Creates a store from a list of elements.
    #[must_use]
    pub fn from_elements(elements: Vec<JsValue>) -> Self {
        let length = elements.len() as u32;
        Self {
            elements,
            length,
            length_writable: true,
        }
    }

    /// The array length.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Reads an element; `None` for holes and out-of-range indices.
    #[must_use]
    pub fn element(&self, index: u32) -> Option<&JsValue> {
        match self.elements.get(index as usize) {
            Some(JsValue::Invalid) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Writes an element, padding holes and growing `length` as needed.
    pub fn set_element(&mut self, index: u32, value: JsValue) {
        let index = index as usize;
        if index >= self.elements.len() {
            self.elements.resize(index + 1, JsValue::Invalid);
        }
        self.elements[index] = value;
        if index as u32 >= self.length {
            self.length = index as u32 + 1;
        }
    }

    /// Appends an element.
    pub fn push(&mut self, value: JsValue) {
        self.set_element(self.length, value);
    }

    /// Appends a hole (array literal elision).
    pub fn push_hole(&mut self) {
        self.length += 1;
    }

    /// Removes an element, leaving a hole.
    pub fn delete_element(&mut self, index: u32) {
        if let Some(slot) = self.elements.get_mut(index as usize) {
            *slot = JsValue::Invalid;
        }
    }
}

/// Per-object regexp state.
#[derive(Debug)]
pub struct RegExpData {
    /// The pattern source.
    pub source: JsString,
    /// The flags string.
    pub flags: JsString,
    /// The compiled matcher, shared with the literal template.
    pub matcher: Rc<regress::Regex>,
    /// Mutable `lastIndex`.
    pub last_index: f64,
}

impl RegExpData {
    /// Returns `true` when the `g` flag is set.
    #[must_use]
    pub fn global(&self) -> bool {
        self.flags.as_str().is_some_and(|f| f.contains('g'))
    }

    /// Returns `true` when the `y` flag is set.
    #[must_use]
    pub fn sticky(&self) -> bool {
        self.flags.as_str().is_some_and(|f| f.contains('y'))
    }
}

/// The type of an object, together with its type-specific payload.
#[derive(Debug)]
pub enum ObjectKind {
    /// A plain object.
    Ordinary,
    /// The global object of a context.
    Global,
    /// An array with its dense element store.
    Array(ArrayStorage),
    /// A callable object.
    Function(Function),
    /// A `Boolean` wrapper.
    Boolean(bool),
    /// A `Number` wrapper.
    Number(f64),
    /// A `String` wrapper.
    String(JsString),
    /// A `Symbol` wrapper.
    Symbol(JsSymbol),
    /// An `Error` instance of the given native kind.
    Error(JsNativeErrorKind),
    /// A regular expression.
    RegExp(RegExpData),
    /// A `Date`, as milliseconds since the epoch (or NaN).
    Date(f64),
    /// An `ArrayBuffer` and its backing bytes.
    ArrayBuffer(Vec<u8>),
    /// Engine-native state (crypto digests and similar).
    Native(Box<dyn NativeObject>),
}

impl ObjectKind {
    /// A short type word for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Array(_) => "array",
            Self::Function(_) => "function",
            Self::String(_) => "string",
            _ => "object",
        }
    }
}

/// The internal representation of an object: its kind, property tables,
/// prototype link and flags.
#[derive(Debug)]
pub struct Object {
    kind: ObjectKind,
    properties: PropertyMap,
    // Per-kind instance properties shared between objects of one kind
    // (function name/length/prototype, array length, …). Deleting one of
    // these leaves a whiteout in `properties`.
    shared: Option<Rc<PropertyMap>>,
    prototype: Option<JsObject>,
    flags: ObjectFlags,
}

impl Object {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            properties: PropertyMap::new(),
            shared: None,
            prototype: None,
            flags: ObjectFlags::EXTENSIBLE,
        }
    }

    /// The kind of the object.
    #[must_use]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// The kind of the object, mutably.
    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    /// Replaces the kind (used by builders that upgrade placeholders).
    pub fn set_kind(&mut self, kind: ObjectKind) {
        self.kind = kind;
    }

    /// The flag bits.
    #[must_use]
    pub fn flags(&self) -> ObjectFlags {
        self.flags
    }

    /// The flag bits, mutably.
    pub fn flags_mut(&mut self) -> &mut ObjectFlags {
        &mut self.flags
    }

    /// Whether new properties may be added.
    #[must_use]
    pub fn extensible(&self) -> bool {
        self.flags.contains(ObjectFlags::EXTENSIBLE)
    }

    /// The private property table.
    #[must_use]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// The private property table, mutably.
    pub fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.properties
    }

    /// The shared instance property table, if the object has one.
    #[must_use]
    pub fn shared_properties(&self) -> Option<&Rc<PropertyMap>> {
        self.shared.as_ref()
    }

    /// Attaches the shared instance property table.
    pub fn set_shared_properties(&mut self, table: Rc<PropertyMap>) {
        self.shared = Some(table);
        self.flags.insert(ObjectFlags::SHARED);
    }

    /// The prototype link.
    #[must_use]
    pub fn prototype(&self) -> Option<&JsObject> {
        self.prototype.as_ref()
    }

    /// Sets the prototype link without a cycle check; use
    /// [`JsObject::set_prototype`] for script-visible mutation.
    pub fn set_prototype_unchecked(&mut self, prototype: Option<JsObject>) {
        self.prototype = prototype;
    }

    /// Inserts a property descriptor into the private table.
    pub fn insert<K: Into<PropertyKey>>(&mut self, key: K, property: PropertyDescriptor) {
        self.properties.insert(key.into(), property);
    }

    /// Inserts a plain data property.
    pub fn insert_property<K, V>(&mut self, key: K, value: V, attribute: Attribute)
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.insert(key, PropertyDescriptor::data(value.into(), attribute));
    }

    /// The function payload, for callable objects.
    #[must_use]
    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            ObjectKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// The array store, for arrays.
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayStorage> {
        match &self.kind {
            ObjectKind::Array(storage) => Some(storage),
            _ => None,
        }
    }

    /// The array store mutably, for arrays.
    pub fn as_array_mut(&mut self) -> Option<&mut ArrayStorage> {
        match &mut self.kind {
            ObjectKind::Array(storage) => Some(storage),
            _ => None,
        }
    }

    /// The error kind, for `Error` instances.
    #[must_use]
    pub fn error_kind(&self) -> Option<JsNativeErrorKind> {
        match &self.kind {
            ObjectKind::Error(kind) => Some(*kind),
            _ => None,
        }
    }

    /// The own `message` property of an `Error` instance, when it is a
    /// plain string.
    #[must_use]
    pub fn error_message(&self) -> Option<JsString> {
        let property = self.properties.get(&PropertyKey::from("message"))?;
        match property.kind() {
            PropertyKind::Data(JsValue::String(message)) => Some(message.clone()),
            _ => None,
        }
    }
}

/// Garbage collected handle to an [`Object`], with pointer identity.
#[derive(Clone)]
pub struct JsObject {
    inner: Rc<RefCell<Object>>,
}

impl JsObject {
    /// Creates an object of the given kind and prototype.
    #[must_use]
    pub fn new(kind: ObjectKind, prototype: Option<JsObject>) -> Self {
        let mut object = Object::new(kind);
        object.prototype = prototype;
        Self {
            inner: Rc::new(RefCell::new(object)),
        }
    }

    /// Creates a plain object with the given prototype.
    #[must_use]
    pub fn ordinary(prototype: Option<JsObject>) -> Self {
        Self::new(ObjectKind::Ordinary, prototype)
    }

    /// Immutably borrows the object.
    ///
    /// # Panics
    ///
    /// Panics if a mutable borrow is live.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.inner.borrow()
    }

    /// Mutably borrows the object.
    ///
    /// # Panics
    ///
    /// Panics if any borrow is live.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.inner.borrow_mut()
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The prototype link.
    #[must_use]
    pub fn prototype(&self) -> Option<JsObject> {
        self.borrow().prototype.clone()
    }

    /// Sets the prototype, rejecting cycles and non-extensible receivers.
    /// Returns `false` when the mutation is not allowed.
    #[must_use]
    pub fn set_prototype(&self, prototype: Option<JsObject>) -> bool {
        if let Some(new_proto) = &prototype {
            // Walk up from the new prototype looking for ourselves.
            let mut cursor = Some(new_proto.clone());
            while let Some(object) = cursor {
                if object.ptr_eq(self) {
                    return false;
                }
                cursor = object.prototype();
            }
        }
        let mut borrowed = self.borrow_mut();
        let same = match (&borrowed.prototype, &prototype) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };
        if !same && !borrowed.extensible() {
            return false;
        }
        borrowed.prototype = prototype;
        true
    }

    /// Whether the object is callable.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self.borrow().kind, ObjectKind::Function(_))
    }

    /// Whether the object may be used with `new`.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.borrow()
            .as_function()
            .is_some_and(Function::is_constructor)
    }

    /// Whether the object is an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.borrow().kind, ObjectKind::Array(_))
    }

    /// Inserts a plain data property.
    pub fn insert_property<K, V>(&self, key: K, value: V, attribute: Attribute)
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.borrow_mut().insert_property(key, value, attribute);
    }

    /// Inserts a property descriptor.
    pub fn insert<K: Into<PropertyKey>>(&self, key: K, property: PropertyDescriptor) {
        self.borrow_mut().insert(key, property);
    }
}

impl Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Prototype chains are cyclic; print the kind only.
        match self.inner.try_borrow() {
            Ok(object) => write!(f, "JsObject {{ kind: {} }}", object.kind.type_name()),
            Err(_) => f.write_str("JsObject {{ <borrowed> }}"),
        }
    }
}

impl PartialEq for JsObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for JsObject {}

// === builders ===

/// Builder for native function objects.
#[derive(Debug)]
pub struct FunctionBuilder<'context> {
    context: &'context mut Context,
    function: NativeFunctionPointer,
    name: JsString,
    length: u32,
    constructor: bool,
}

impl<'context> FunctionBuilder<'context> {
    /// Creates a new `FunctionBuilder`.
    pub fn new(context: &'context mut Context, function: NativeFunctionPointer) -> Self {
        Self {
            context,
            function,
            name: JsString::default(),
            length: 0,
            constructor: false,
        }
    }

    /// Sets the name of the function object.
    #[must_use]
    pub fn name<N: Into<JsString>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the length of the function object.
    #[must_use]
    pub fn length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// Marks the function as usable with `new`.
    #[must_use]
    pub fn constructor(mut self, yes: bool) -> Self {
        self.constructor = yes;
        self
    }

    /// Builds the function object.
    #[must_use]
    pub fn build(self) -> JsObject {
        let prototype = self.context.standard_objects().function().prototype();
        let object = JsObject::new(
            ObjectKind::Function(Function::Native {
                function: self.function,
                name: self.name.clone(),
                length: self.length,
                constructor: self.constructor,
            }),
            Some(prototype),
        );
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
        object.insert_property("name", self.name, attribute);
        object.insert_property("length", f64::from(self.length), attribute);
        object
    }
}

/// Builder for plain objects with properties, used to assemble the
/// namespace-style built-ins (`Math`, `JSON`, modules).
#[derive(Debug)]
pub struct ObjectInitializer<'context> {
    context: &'context mut Context,
    object: JsObject,
}

impl<'context> ObjectInitializer<'context> {
    /// Creates a new `ObjectInitializer` with an ordinary object.
    pub fn new(context: &'context mut Context) -> Self {
        let prototype = context.standard_objects().object().prototype();
        let object = JsObject::ordinary(Some(prototype));
        Self { context, object }
    }

    /// Creates an `ObjectInitializer` over an existing object.
    pub fn with_object(context: &'context mut Context, object: JsObject) -> Self {
        Self { context, object }
    }

    /// Adds a native method.
    pub fn function<N: Into<JsString>>(
        &mut self,
        function: NativeFunctionPointer,
        name: N,
        length: u32,
    ) -> &mut Self {
        let name = name.into();
        let function = FunctionBuilder::new(self.context, function)
            .name(name.clone())
            .length(length)
            .build();
        self.object.insert_property(
            name,
            function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
        self
    }

    /// Adds a data property.
    pub fn property<K, V>(&mut self, key: K, value: V, attribute: Attribute) -> &mut Self
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.object.insert_property(key, value, attribute);
        self
    }

    /// Adds an accessor property.
    pub fn accessor<K: Into<PropertyKey>>(
        &mut self,
        key: K,
        get: Option<NativeFunctionPointer>,
        set: Option<NativeFunctionPointer>,
        attribute: Attribute,
    ) -> &mut Self {
        let get = get.map(|f| FunctionBuilder::new(self.context, f).name("get").build());
        let set = set.map(|f| FunctionBuilder::new(self.context, f).name("set").build());
        self.object
            .insert(key, PropertyDescriptor::accessor(get, set, attribute));
        self
    }

    /// Finishes the object.
    #[must_use]
    pub fn build(&mut self) -> JsObject {
        self.object.clone()
    }
}

/// Builder for constructor/prototype pairs like `Array` or `Error`.
pub struct ConstructorBuilder<'context> {
    context: &'context mut Context,
    function: NativeFunctionPointer,
    constructor_object: JsObject,
    prototype: JsObject,
    name: JsString,
    length: u32,
    inherit: Option<JsObject>,
}

impl Debug for ConstructorBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorBuilder")
            .field("name", &self.name)
            .field("length", &self.length)
            .field("constructor", &self.constructor_object)
            .field("prototype", &self.prototype)
            .finish()
    }
}

impl<'context> ConstructorBuilder<'context> {
    /// Creates a builder over a pre-registered standard constructor pair.
    pub fn with_standard_object(
        context: &'context mut Context,
        function: NativeFunctionPointer,
        standard: crate::realm::StandardConstructor,
    ) -> Self {
        Self {
            context,
            function,
            constructor_object: standard.constructor(),
            prototype: standard.prototype(),
            name: JsString::default(),
            length: 0,
            inherit: None,
        }
    }

    /// Sets the name of the constructor.
    pub fn name<N: Into<JsString>>(&mut self, name: N) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Sets the length of the constructor.
    pub fn length(&mut self, length: u32) -> &mut Self {
        self.length = length;
        self
    }

    /// Sets the prototype of the built prototype object (defaults to
    /// `Object.prototype`).
    pub fn inherit(&mut self, prototype: JsObject) -> &mut Self {
        self.inherit = Some(prototype);
        self
    }

    /// Adds a method to the prototype.
    pub fn method<N: Into<JsString>>(
        &mut self,
        function: NativeFunctionPointer,
        name: N,
        length: u32,
    ) -> &mut Self {
        let name = name.into();
        let function = FunctionBuilder::new(self.context, function)
            .name(name.clone())
            .length(length)
            .build();
        self.prototype.insert_property(
            name,
            function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
        self
    }

    /// Adds a static method to the constructor.
    pub fn static_method<N: Into<JsString>>(
        &mut self,
        function: NativeFunctionPointer,
        name: N,
        length: u32,
    ) -> &mut Self {
        let name = name.into();
        let function = FunctionBuilder::new(self.context, function)
            .name(name.clone())
            .length(length)
            .build();
        self.constructor_object.insert_property(
            name,
            function,
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
        self
    }

    /// Adds a data property to the prototype.
    pub fn property<K, V>(&mut self, key: K, value: V, attribute: Attribute) -> &mut Self
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.prototype.insert_property(key, value, attribute);
        self
    }

    /// Adds a data property to the constructor.
    pub fn static_property<K, V>(&mut self, key: K, value: V, attribute: Attribute) -> &mut Self
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.constructor_object.insert_property(key, value, attribute);
        self
    }

    /// Adds an accessor property to the prototype.
    pub fn accessor<K: Into<PropertyKey>>(
        &mut self,
        key: K,
        get: Option<NativeFunctionPointer>,
        set: Option<NativeFunctionPointer>,
        attribute: Attribute,
    ) -> &mut Self {
        let get = get.map(|f| FunctionBuilder::new(self.context, f).name("get").build());
        let set = set.map(|f| FunctionBuilder::new(self.context, f).name("set").build());
        self.prototype
            .insert(key, PropertyDescriptor::accessor(get, set, attribute));
        self
    }

    /// Builds the constructor and wires the constructor/prototype pair.
    pub fn build(&mut self) -> JsObject {
        {
            let mut constructor = self.constructor_object.borrow_mut();
            constructor.set_kind(ObjectKind::Function(Function::Native {
                function: self.function,
                name: self.name.clone(),
                length: self.length,
                constructor: true,
            }));
            let attribute =
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
            constructor.insert_property("name", self.name.clone(), attribute);
            constructor.insert_property("length", f64::from(self.length), attribute);
            constructor.insert_property(
                PROTOTYPE,
                self.prototype.clone(),
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
            );
            constructor
                .set_prototype_unchecked(Some(self.context.standard_objects().function().prototype()));
        }
        {
            let mut prototype = self.prototype.borrow_mut();
            prototype.insert_property(
                CONSTRUCTOR,
                self.constructor_object.clone(),
                Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            );
            let inherit = self
                .inherit
                .clone()
                .unwrap_or_else(|| self.context.standard_objects().object().prototype());
            prototype.set_prototype_unchecked(Some(inherit));
        }
        self.constructor_object.clone()
    }
}
