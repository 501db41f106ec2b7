//! The host-extension bridge.
//!
//! A host registers an [`ExternalPrototype`]: a tree of named nodes, each a
//! property (getter/setter/deleter callbacks), a method (a call callback)
//! or a nested object. Binding the prototype to a host payload produces a
//! [`JsExternal`] value; property accesses on it dispatch to the node
//! callbacks, and nested objects and methods keep a stable identity per
//! instance.

use crate::{
    error::JsNativeError,
    object::{Function, JsObject, ObjectKind},
    property::PropertyKey,
    Context, JsResult, JsString, JsValue,
};
use rustc_hash::FxHashMap;
use std::{any::Any, cell::RefCell, fmt, rc::Rc};

/// Getter callback of a property node.
pub type ExternalGet = Rc<dyn Fn(&JsExternal, &mut Context) -> JsResult<JsValue>>;
/// Setter callback of a property node.
pub type ExternalSet = Rc<dyn Fn(&JsExternal, &JsValue, &mut Context) -> JsResult<()>>;
/// Deleter callback of a property node.
pub type ExternalDelete = Rc<dyn Fn(&JsExternal, &mut Context) -> JsResult<bool>>;
/// Call callback of a method node.
pub type ExternalCall = Rc<dyn Fn(&JsExternal, &[JsValue], &mut Context) -> JsResult<JsValue>>;
/// Key enumeration callback of an object node.
pub type ExternalKeys = Rc<dyn Fn(&JsExternal, &mut Context) -> JsResult<Vec<JsString>>>;

/// The payload of one descriptor node.
#[derive(Clone)]
pub enum ExternalNodeKind {
    /// A value-like property.
    Property {
        /// Invoked on reads.
        get: Option<ExternalGet>,
        /// Invoked on writes.
        set: Option<ExternalSet>,
        /// Invoked on `delete`.
        delete: Option<ExternalDelete>,
    },
    /// A callable member.
    Method {
        /// Invoked on calls, with the receiver validated first.
        call: ExternalCall,
    },
    /// A nested external object.
    Object {
        /// The children of the nested object.
        children: Vec<Rc<ExternalNode>>,
        /// Overrides the enumerated key set (defaults to the child names).
        keys: Option<ExternalKeys>,
    },
}

/// One named node of an external prototype tree.
pub struct ExternalNode {
    name: Box<str>,
    kind: ExternalNodeKind,
}

impl fmt::Debug for ExternalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            ExternalNodeKind::Property { .. } => "property",
            ExternalNodeKind::Method { .. } => "method",
            ExternalNodeKind::Object { .. } => "object",
        };
        write!(f, "ExternalNode {{ name: {:?}, kind: {kind} }}", self.name)
    }
}

/// A host-registered description tree. Bound to a payload it becomes an
/// external value.
#[derive(Debug, Clone)]
pub struct ExternalPrototype {
    root: Rc<ExternalNode>,
}

impl ExternalPrototype {
    /// Starts building a prototype tree.
    #[must_use]
    pub fn builder() -> ExternalPrototypeBuilder {
        ExternalPrototypeBuilder {
            children: Vec::new(),
            keys: None,
        }
    }

    pub(crate) fn root(&self) -> &Rc<ExternalNode> {
        &self.root
    }
}

/// Builder for one object level of an external prototype tree.
pub struct ExternalPrototypeBuilder {
    children: Vec<Rc<ExternalNode>>,
    keys: Option<ExternalKeys>,
}

impl fmt::Debug for ExternalPrototypeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExternalPrototypeBuilder {{ children: {} }}",
            self.children.len()
        )
    }
}

impl ExternalPrototypeBuilder {
    /// Adds a property node.
    #[must_use]
    pub fn property<N: Into<Box<str>>>(
        mut self,
        name: N,
        get: Option<ExternalGet>,
        set: Option<ExternalSet>,
        delete: Option<ExternalDelete>,
    ) -> Self {
        self.children.push(Rc::new(ExternalNode {
            name: name.into(),
            kind: ExternalNodeKind::Property { get, set, delete },
        }));
        self
    }

    /// Adds a method node.
    #[must_use]
    pub fn method<N: Into<Box<str>>>(mut self, name: N, call: ExternalCall) -> Self {
        self.children.push(Rc::new(ExternalNode {
            name: name.into(),
            kind: ExternalNodeKind::Method { call },
        }));
        self
    }

    /// Adds a nested object node built by `build`.
    #[must_use]
    pub fn object<N: Into<Box<str>>>(
        mut self,
        name: N,
        build: impl FnOnce(Self) -> Self,
    ) -> Self {
        let nested = build(Self {
            children: Vec::new(),
            keys: None,
        });
        self.children.push(Rc::new(ExternalNode {
            name: name.into(),
            kind: ExternalNodeKind::Object {
                children: nested.children,
                keys: nested.keys,
            },
        }));
        self
    }

    /// Overrides the key set reported to `for…in`.
    #[must_use]
    pub fn keys(mut self, keys: ExternalKeys) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Finishes the tree.
    #[must_use]
    pub fn build(self) -> ExternalPrototype {
        ExternalPrototype {
            root: Rc::new(ExternalNode {
                name: Box::from(""),
                kind: ExternalNodeKind::Object {
                    children: self.children,
                    keys: self.keys,
                },
            }),
        }
    }
}

struct ExternalInstance {
    node: Rc<ExternalNode>,
    data: Rc<dyn Any>,
    // Stable identities for nested objects and bound method values.
    children: RefCell<FxHashMap<Box<str>, JsValue>>,
}

/// A host-backed external value: an opaque payload plus the prototype node
/// describing its members.
#[derive(Clone)]
pub struct JsExternal {
    inner: Rc<ExternalInstance>,
}

impl fmt::Debug for JsExternal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsExternal {{ node: {:?} }}", self.inner.node)
    }
}

impl JsExternal {
    pub(crate) fn new(node: Rc<ExternalNode>, data: Rc<dyn Any>) -> Self {
        Self {
            inner: Rc::new(ExternalInstance {
                node,
                data,
                children: RefCell::new(FxHashMap::default()),
            }),
        }
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The host payload, downcast to its original type.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.inner.data).downcast().ok()
    }

    /// The raw host payload.
    #[must_use]
    pub fn data_any(&self) -> Rc<dyn Any> {
        Rc::clone(&self.inner.data)
    }

    fn find_child(&self, name: &str) -> Option<Rc<ExternalNode>> {
        match &self.inner.node.kind {
            ExternalNodeKind::Object { children, .. } => children
                .iter()
                .find(|child| &*child.name == name)
                .cloned(),
            _ => None,
        }
    }

    /// Property read dispatch.
    pub fn get(&self, key: &PropertyKey, context: &mut Context) -> JsResult<JsValue> {
        let name = key.to_js_string();
        let Some(name) = name.as_str().map(str::to_owned) else {
            return Ok(JsValue::Undefined);
        };
        let Some(child) = self.find_child(&name) else {
            return Ok(JsValue::Undefined);
        };
        match &child.kind {
            ExternalNodeKind::Property { get, .. } => match get {
                Some(get) => get(self, context),
                None => Ok(JsValue::Undefined),
            },
            ExternalNodeKind::Method { .. } => Ok(self.cached_child(&name, |this| {
                method_value(this, &child, context)
            })),
            ExternalNodeKind::Object { .. } => Ok(self.cached_child(&name, |this| {
                JsValue::External(Self::new(child.clone(), Rc::clone(&this.inner.data)))
            })),
        }
    }

    fn cached_child(&self, name: &str, make: impl FnOnce(&Self) -> JsValue) -> JsValue {
        if let Some(value) = self.inner.children.borrow().get(name) {
            return value.clone();
        }
        let value = make(self);
        self.inner
            .children
            .borrow_mut()
            .insert(Box::from(name), value.clone());
        value
    }

    /// Property write dispatch.
    pub fn set(&self, key: &PropertyKey, value: &JsValue, context: &mut Context) -> JsResult<()> {
        let name = key.to_js_string();
        let child = name
            .as_str()
            .and_then(|name| self.find_child(name))
            .ok_or_else(|| -> crate::JsError {
                JsNativeError::typ()
                    .with_message(format!("Cannot add property \"{key}\" to external value"))
                    .into()
            })?;
        match &child.kind {
            ExternalNodeKind::Property { set: Some(set), .. } => set(self, value, context),
            _ => Err(JsNativeError::typ()
                .with_message(format!(
                    "Cannot assign to read-only property \"{key}\" of external"
                ))
                .into()),
        }
    }

    /// `delete` dispatch.
    pub fn delete(&self, key: &PropertyKey, context: &mut Context) -> JsResult<bool> {
        let name = key.to_js_string();
        let child = name.as_str().and_then(|name| self.find_child(name));
        match child.as_deref().map(|node| &node.kind) {
            Some(ExternalNodeKind::Property {
                delete: Some(delete),
                ..
            }) => delete(self, context),
            Some(_) => Err(JsNativeError::typ()
                .with_message(format!("Cannot delete property \"{key}\" of external"))
                .into()),
            None => Ok(true),
        }
    }

    /// `in` / membership dispatch.
    pub fn has(&self, key: &PropertyKey, _context: &mut Context) -> JsResult<bool> {
        let name = key.to_js_string();
        Ok(name.as_str().and_then(|name| self.find_child(name)).is_some())
    }

    /// The key list enumerated by `for…in`.
    pub fn keys(&self, context: &mut Context) -> JsResult<Vec<JsString>> {
        match &self.inner.node.kind {
            ExternalNodeKind::Object {
                keys: Some(keys), ..
            } => keys(self, context),
            ExternalNodeKind::Object { children, .. } => Ok(children
                .iter()
                .map(|child| JsString::from(&*child.name))
                .collect()),
            _ => Ok(Vec::new()),
        }
    }
}

// Builds the function value of a method node; the receiver is re-validated
// on every call so extracted methods cannot be applied to foreign values.
fn method_value(instance: &JsExternal, node: &Rc<ExternalNode>, context: &mut Context) -> JsValue {
    let ExternalNodeKind::Method { call } = &node.kind else {
        unreachable!("method_value takes method nodes");
    };
    let call = Rc::clone(call);
    let expected = Rc::clone(&instance.inner.node);
    let fallback = instance.clone();
    let name = JsString::from(&*node.name);
    let function = move |this: &JsValue, args: &[JsValue], context: &mut Context| {
        let receiver = match this {
            JsValue::External(external) => {
                if !Rc::ptr_eq(&external.inner.node, &expected) {
                    return Err(JsNativeError::typ()
                        .with_message("external method called on incompatible receiver")
                        .into());
                }
                external.clone()
            }
            JsValue::Undefined | JsValue::Null => fallback.clone(),
            _ => {
                return Err(JsNativeError::typ()
                    .with_message("external method called on incompatible receiver")
                    .into());
            }
        };
        call(&receiver, args, context)
    };
    let prototype = context.standard_objects().function().prototype();
    let object = JsObject::new(
        ObjectKind::Function(Function::Closure {
            function: Rc::new(function),
            name,
            length: 0,
        }),
        Some(prototype),
    );
    JsValue::Object(object)
}
