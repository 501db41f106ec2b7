//! The property access protocol: lookup, write, delete, definition and
//! enumeration, including the array and string wrapper special cases.

use super::{JsObject, ObjectFlags, ObjectKind};
use crate::{
    error::JsNativeError,
    property::{Attribute, PropertyDescriptor, PropertyKey, PropertyKind},
    Context, JsResult, JsString, JsValue,
};

/// The result of an own-property probe, without prototype involvement.
#[derive(Debug)]
pub(crate) enum OwnSlot {
    /// No own property.
    None,
    /// A whiteout tombstone: the name was deleted here.
    Deleted,
    /// A dense array element or a string wrapper code point.
    Element(JsValue),
    /// A table-resident property.
    Property {
        /// A clone of the descriptor.
        descriptor: PropertyDescriptor,
        /// Whether it came from the shared instance table.
        shared: bool,
    },
}

impl JsObject {
    pub(crate) fn own_slot(&self, key: &PropertyKey) -> OwnSlot {
        let object = self.borrow();
        if let Some(descriptor) = object.properties().get(key) {
            if descriptor.is_whiteout() {
                return OwnSlot::Deleted;
            }
            return OwnSlot::Property {
                descriptor: descriptor.clone(),
                shared: false,
            };
        }
        if let Some(shared) = object.shared_properties() {
            if let Some(descriptor) = shared.get(key) {
                return OwnSlot::Property {
                    descriptor: descriptor.clone(),
                    shared: true,
                };
            }
        }
        match (object.kind(), key) {
            (ObjectKind::Array(storage), PropertyKey::Index(index)) => storage
                .element(*index)
                .map_or(OwnSlot::None, |value| OwnSlot::Element(value.clone())),
            (ObjectKind::String(string), PropertyKey::Index(index)) => string
                .code_point_at(*index as usize)
                .map_or(OwnSlot::None, |cp| {
                    OwnSlot::Element(JsValue::from(JsString::from_code_point(cp)))
                }),
            _ => OwnSlot::None,
        }
    }

    /// `[[Get]]` with `self` as the receiver.
    pub fn get(&self, key: &PropertyKey, context: &mut Context) -> JsResult<JsValue> {
        let receiver = JsValue::Object(self.clone());
        self.get_with_receiver(key, &receiver, context)
    }

    /// `[[Get]]`: walks the prototype chain from `self`, invoking handlers
    /// and getters against `receiver`.
    pub fn get_with_receiver(
        &self,
        key: &PropertyKey,
        receiver: &JsValue,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let mut holder = self.clone();
        loop {
            match holder.own_slot(key) {
                OwnSlot::Element(value) => return Ok(value),
                OwnSlot::Property { descriptor, .. } => match descriptor.kind() {
                    PropertyKind::Data(value) => return Ok(value.clone()),
                    PropertyKind::Handler(handler) => {
                        return match handler.get {
                            Some(get) => get(&holder, key, context),
                            None => Ok(JsValue::Undefined),
                        };
                    }
                    PropertyKind::Accessor { get, .. } => {
                        return match get {
                            Some(getter) => {
                                let getter = JsValue::Object(getter.clone());
                                context.call(&getter, receiver, &[])
                            }
                            None => Ok(JsValue::Undefined),
                        };
                    }
                    PropertyKind::Whiteout | PropertyKind::Generic => {
                        unreachable!("only materialised kinds are stored")
                    }
                },
                OwnSlot::Deleted | OwnSlot::None => {}
            }
            match holder.prototype() {
                Some(prototype) => holder = prototype,
                None => return Ok(JsValue::Undefined),
            }
        }
    }

    /// `[[Set]]` with `self` as the receiver.
    pub fn set(&self, key: PropertyKey, value: JsValue, context: &mut Context) -> JsResult<()> {
        let receiver = JsValue::Object(self.clone());
        self.set_with_receiver(key, value, &receiver, context)
    }

    /// `[[Set]]`: walks the chain checking writability, then writes on (or
    /// creates on) `self`.
    pub fn set_with_receiver(
        &self,
        key: PropertyKey,
        value: JsValue,
        receiver: &JsValue,
        context: &mut Context,
    ) -> JsResult<()> {
        if matches!(self.borrow().kind(), ObjectKind::String(_))
            && matches!(key, PropertyKey::Index(_))
        {
            return Err(JsNativeError::typ()
                .with_message("property set on primitive string type")
                .into());
        }

        let mut holder = self.clone();
        loop {
            let own = holder.own_slot(&key);
            match own {
                OwnSlot::Element(_) => {
                    if holder.ptr_eq(self) {
                        return self.write_element(&key, value, context);
                    }
                    // Inherited elements are always writable.
                    break;
                }
                OwnSlot::Property { descriptor, shared } => {
                    match descriptor.kind() {
                        PropertyKind::Data(_) => {
                            if !descriptor.writable() {
                                return Err(read_only_error(&key, self));
                            }
                            if holder.ptr_eq(self) {
                                if shared {
                                    // Copy the shared entry on write.
                                    let mut copy = descriptor.clone();
                                    copy.set_kind(PropertyKind::Data(value));
                                    self.borrow_mut().properties_mut().insert(key, copy);
                                } else {
                                    let mut object = self.borrow_mut();
                                    if let Some(slot) =
                                        object.properties_mut().get_mut(&key)
                                    {
                                        slot.set_kind(PropertyKind::Data(value));
                                    }
                                }
                                return Ok(());
                            }
                            break;
                        }
                        PropertyKind::Accessor { set, .. } => {
                            return match set {
                                Some(setter) => {
                                    let setter = JsValue::Object(setter.clone());
                                    context.call(&setter, receiver, &[value]).map(drop)
                                }
                                None => Err(JsNativeError::typ()
                                    .with_message(format!(
                                        "Cannot set property \"{key}\" of object which has only a getter"
                                    ))
                                    .into()),
                            };
                        }
                        PropertyKind::Handler(handler) => {
                            return match handler.set {
                                Some(set) => set(&holder, &key, &value, context),
                                None if holder.ptr_eq(self) => {
                                    let mut copy = descriptor.clone();
                                    copy.set_kind(PropertyKind::Data(value));
                                    self.borrow_mut().properties_mut().insert(key, copy);
                                    Ok(())
                                }
                                None => Err(read_only_error(&key, self)),
                            };
                        }
                        PropertyKind::Whiteout | PropertyKind::Generic => {
                            unreachable!("only materialised kinds are stored")
                        }
                    }
                }
                // A deleted entry shadows the shared table but not the
                // prototype chain.
                OwnSlot::Deleted | OwnSlot::None => {}
            }
            match holder.prototype() {
                Some(prototype) => holder = prototype,
                None => break,
            }
        }

        // Create a fresh own property on the receiver.
        if matches!(self.borrow().kind(), ObjectKind::Array(_)) {
            if let PropertyKey::Index(_) = key {
                return self.write_element(&key, value, context);
            }
        }
        if !self.borrow().extensible() {
            return Err(JsNativeError::typ()
                .with_message(format!(
                    "Cannot add property \"{key}\", object is not extensible"
                ))
                .into());
        }
        self.borrow_mut().properties_mut().insert(
            key,
            PropertyDescriptor::data(
                value,
                Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::CONFIGURABLE,
            ),
        );
        Ok(())
    }

    fn write_element(
        &self,
        key: &PropertyKey,
        value: JsValue,
        _context: &mut Context,
    ) -> JsResult<()> {
        let index = key.as_index().expect("element writes take index keys");
        let mut object = self.borrow_mut();
        if object.flags().contains(ObjectFlags::FROZEN_ELEMENTS) {
            return Err(read_only_borrowed(key, object.kind().type_name()));
        }
        let extensible = object.extensible();
        let storage = object.as_array_mut().expect("receiver must be an array");
        let grows = index >= storage.length;
        if grows && !storage.length_writable {
            return Err(read_only_borrowed(&PropertyKey::from("length"), "array"));
        }
        let adds = storage.element(index).is_none();
        if adds && grows && !extensible {
            return Err(JsNativeError::typ()
                .with_message(format!(
                    "Cannot add property \"{index}\", object is not extensible"
                ))
                .into());
        }
        if adds && !grows && object.flags().contains(ObjectFlags::SEALED_ELEMENTS) {
            return Err(JsNativeError::typ()
                .with_message(format!("Cannot add property \"{index}\", object is sealed"))
                .into());
        }
        let storage = object.as_array_mut().expect("receiver must be an array");
        storage.set_element(index, value);
        Ok(())
    }

    /// `[[HasProperty]]`: own or inherited.
    #[must_use]
    pub fn has_property(&self, key: &PropertyKey) -> bool {
        let mut holder = self.clone();
        loop {
            match holder.own_slot(key) {
                OwnSlot::Element(_) | OwnSlot::Property { .. } => return true,
                OwnSlot::Deleted | OwnSlot::None => {}
            }
            match holder.prototype() {
                Some(prototype) => holder = prototype,
                None => return false,
            }
        }
    }

    /// Checks for an own property (whiteouts read as absent).
    #[must_use]
    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        matches!(
            self.own_slot(key),
            OwnSlot::Element(_) | OwnSlot::Property { .. }
        )
    }

    /// `[[Delete]]`: removes an own property. Deleting an absent property
    /// succeeds; deleting a non-configurable one throws.
    pub fn delete(&self, key: &PropertyKey, context: &mut Context) -> JsResult<bool> {
        match self.own_slot(key) {
            OwnSlot::None | OwnSlot::Deleted => Ok(true),
            OwnSlot::Element(_) => {
                let mut object = self.borrow_mut();
                if matches!(object.kind(), ObjectKind::String(_)) {
                    return Err(JsNativeError::typ()
                        .with_message(format!("Cannot delete property \"{key}\" of string"))
                        .into());
                }
                if object
                    .flags()
                    .intersects(ObjectFlags::SEALED_ELEMENTS | ObjectFlags::FROZEN_ELEMENTS)
                {
                    return Err(JsNativeError::typ()
                        .with_message(format!("Cannot delete property \"{key}\" of array"))
                        .into());
                }
                if let (Some(storage), PropertyKey::Index(index)) =
                    (object.as_array_mut(), key)
                {
                    storage.delete_element(*index);
                }
                Ok(true)
            }
            OwnSlot::Property { descriptor, shared } => {
                if let PropertyKind::Handler(handler) = descriptor.kind() {
                    if let Some(delete) = handler.delete {
                        return delete(self, key, context);
                    }
                }
                if !descriptor.configurable() {
                    return Err(JsNativeError::typ()
                        .with_message(format!(
                            "Cannot delete property \"{key}\" of {}",
                            self.borrow().kind().type_name()
                        ))
                        .into());
                }
                let mut object = self.borrow_mut();
                if shared {
                    object
                        .properties_mut()
                        .insert(key.clone(), PropertyDescriptor::whiteout());
                } else {
                    object.properties_mut().remove(key);
                    // Keep shadowing a shared entry of the same name.
                    if object
                        .shared_properties()
                        .is_some_and(|table| table.contains_key(key))
                    {
                        object
                            .properties_mut()
                            .insert(key.clone(), PropertyDescriptor::whiteout());
                    }
                }
                Ok(true)
            }
        }
    }

    /// The own property descriptor, with handler entries materialised into
    /// data descriptors the way `Object.getOwnPropertyDescriptor` reports
    /// them.
    pub fn own_property_descriptor(
        &self,
        key: &PropertyKey,
        context: &mut Context,
    ) -> JsResult<Option<PropertyDescriptor>> {
        match self.own_slot(key) {
            OwnSlot::None | OwnSlot::Deleted => Ok(None),
            OwnSlot::Element(value) => {
                let (writable, configurable) = {
                    let object = self.borrow();
                    if matches!(object.kind(), ObjectKind::String(_)) {
                        (false, false)
                    } else {
                        let flags = object.flags();
                        (
                            !flags.contains(ObjectFlags::FROZEN_ELEMENTS),
                            !flags.intersects(
                                ObjectFlags::SEALED_ELEMENTS | ObjectFlags::FROZEN_ELEMENTS,
                            ),
                        )
                    }
                };
                let mut attribute = Attribute::ENUMERABLE;
                attribute.set(Attribute::WRITABLE, writable);
                attribute.set(Attribute::CONFIGURABLE, configurable);
                Ok(Some(PropertyDescriptor::data(value, attribute)))
            }
            OwnSlot::Property { descriptor, .. } => match descriptor.kind() {
                PropertyKind::Handler(handler) => {
                    let value = match handler.get {
                        Some(get) => get(self, key, context)?,
                        None => JsValue::Undefined,
                    };
                    let mut materialised = descriptor.clone();
                    materialised.set_kind(PropertyKind::Data(value));
                    Ok(Some(materialised))
                }
                _ => Ok(Some(descriptor)),
            },
        }
    }

    /// Own keys with their enumerability, in enumeration order: array
    /// elements first, then the private table, then the shared table.
    #[must_use]
    pub fn own_keys_with_enumerability(&self, include_symbols: bool) -> Vec<(PropertyKey, bool)> {
        let object = self.borrow();
        let mut keys = Vec::new();
        match object.kind() {
            ObjectKind::Array(storage) => {
                for (index, value) in storage.elements.iter().enumerate() {
                    if !matches!(value, JsValue::Invalid) {
                        keys.push((PropertyKey::Index(index as u32), true));
                    }
                }
            }
            ObjectKind::String(string) => {
                for index in 0..string.len() {
                    keys.push((PropertyKey::Index(index as u32), true));
                }
            }
            _ => {}
        }
        for (key, descriptor) in object.properties().iter() {
            if descriptor.is_whiteout() {
                continue;
            }
            if !include_symbols && matches!(key, PropertyKey::Symbol(_)) {
                continue;
            }
            keys.push((key.clone(), descriptor.enumerable()));
        }
        if let Some(shared) = object.shared_properties() {
            for (key, descriptor) in shared.iter() {
                if object.properties().contains_key(key) {
                    continue;
                }
                if !include_symbols && matches!(key, PropertyKey::Symbol(_)) {
                    continue;
                }
                keys.push((key.clone(), descriptor.enumerable()));
            }
        }
        keys
    }

    /// Own enumerable string keys, the `Object.keys` order.
    #[must_use]
    pub fn enumerable_keys(&self) -> Vec<PropertyKey> {
        self.own_keys_with_enumerability(false)
            .into_iter()
            .filter_map(|(key, enumerable)| enumerable.then_some(key))
            .collect()
    }

    /// `[[DefineOwnProperty]]`, throwing on failure.
    pub fn define_own_property(
        &self,
        key: PropertyKey,
        mut descriptor: PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<()> {
        // Array length and index definitions take their own route.
        if matches!(self.borrow().kind(), ObjectKind::Array(_)) {
            if let PropertyKey::String(name) = &key {
                if name.as_str() == Some("length") {
                    return self.define_array_length(&descriptor, context);
                }
            }
            if let PropertyKey::Index(index) = key {
                return self.define_array_index(index, descriptor, context);
            }
        }

        let existing = self.own_property_descriptor(&key, context)?;
        match existing {
            None => {
                if !self.borrow().extensible() {
                    return Err(JsNativeError::typ()
                        .with_message(format!(
                            "Cannot define property \"{key}\", object is not extensible"
                        ))
                        .into());
                }
                descriptor.complete();
                self.borrow_mut().properties_mut().insert(key, descriptor);
                Ok(())
            }
            Some(existing) => {
                let merged = merge_descriptors(&key, &existing, descriptor)?;
                self.borrow_mut().properties_mut().insert(key, merged);
                Ok(())
            }
        }
    }

    fn define_array_length(
        &self,
        descriptor: &PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<()> {
        if let Some(value) = descriptor.value() {
            let length = crate::builtins::array::to_array_length(value, context)?;
            self.set_array_length(length, context)?;
        }
        if descriptor.writable_raw() == Some(false) {
            let mut object = self.borrow_mut();
            if let Some(storage) = object.as_array_mut() {
                storage.length_writable = false;
            }
        } else if descriptor.writable_raw() == Some(true) {
            let object = self.borrow();
            let writable = object.as_array().is_some_and(|s| s.length_writable);
            drop(object);
            if !writable {
                return Err(JsNativeError::typ()
                    .with_message("Cannot redefine property: \"length\"")
                    .into());
            }
        }
        Ok(())
    }

    fn define_array_index(
        &self,
        index: u32,
        mut descriptor: PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<()> {
        descriptor.complete();
        let plain = matches!(descriptor.kind(), PropertyKind::Data(_))
            && descriptor.writable()
            && descriptor.enumerable()
            && descriptor.configurable();
        if plain {
            let value = descriptor
                .value()
                .cloned()
                .expect("data descriptor has a value");
            self.borrow_mut()
                .properties_mut()
                .remove(&PropertyKey::Index(index));
            return self.write_element(&PropertyKey::Index(index), value, context);
        }
        // Exotic index properties move into the table; the element slot is
        // vacated so the table entry wins lookups.
        {
            let mut object = self.borrow_mut();
            let extensible = object.extensible();
            let storage = object.as_array_mut().expect("checked array kind");
            let existed = storage.element(index).is_some();
            if !existed && !extensible {
                return Err(JsNativeError::typ()
                    .with_message(format!(
                        "Cannot define property \"{index}\", object is not extensible"
                    ))
                    .into());
            }
            storage.delete_element(index);
            if index >= storage.length {
                storage.length = index + 1;
            }
        }
        self.borrow_mut()
            .properties_mut()
            .insert(PropertyKey::Index(index), descriptor);
        Ok(())
    }

    /// Sets `array.length`, truncating with per-index delete semantics.
    pub fn set_array_length(&self, new_length: u32, _context: &mut Context) -> JsResult<()> {
        let old_length = {
            let object = self.borrow();
            let storage = object.as_array().expect("receiver must be an array");
            if !storage.length_writable && storage.length != new_length {
                return Err(read_only_borrowed(&PropertyKey::from("length"), "array"));
            }
            storage.length
        };
        if new_length >= old_length {
            let mut object = self.borrow_mut();
            let storage = object.as_array_mut().expect("receiver must be an array");
            storage.length = new_length;
            return Ok(());
        }
        // Truncation deletes indices from the top down and stops at the
        // first non-configurable one.
        let mut blocked = None;
        {
            let object = self.borrow();
            let mut table_indices: Vec<u32> = object
                .properties()
                .keys()
                .filter_map(PropertyKey::as_index)
                .filter(|&index| index >= new_length)
                .collect();
            table_indices.sort_unstable_by(|a, b| b.cmp(a));
            for index in table_indices {
                let configurable = object
                    .properties()
                    .get(&PropertyKey::Index(index))
                    .is_some_and(PropertyDescriptor::configurable);
                if !configurable {
                    blocked = Some(index);
                    break;
                }
            }
        }
        let floor = blocked.map_or(new_length, |index| index + 1);
        {
            let mut object = self.borrow_mut();
            let retained: Vec<u32> = object
                .properties()
                .keys()
                .filter_map(PropertyKey::as_index)
                .filter(|&index| index >= floor)
                .collect();
            for index in retained {
                object.properties_mut().remove(&PropertyKey::Index(index));
            }
            let storage = object.as_array_mut().expect("receiver must be an array");
            storage.elements.truncate(floor as usize);
            storage.length = floor;
        }
        if blocked.is_some() {
            return Err(JsNativeError::typ()
                .with_message("Cannot delete property of array during length truncation")
                .into());
        }
        Ok(())
    }

    /// `Object.preventExtensions`.
    pub fn prevent_extensions(&self) {
        self.borrow_mut().flags_mut().remove(ObjectFlags::EXTENSIBLE);
    }

    /// `Object.seal`: non-extensible, all own properties non-configurable.
    pub fn seal(&self, context: &mut Context) -> JsResult<()> {
        self.prevent_extensions();
        self.materialise_shared(context)?;
        let mut object = self.borrow_mut();
        object.flags_mut().insert(ObjectFlags::SEALED_ELEMENTS);
        for (_, descriptor) in object.properties_mut().iter_mut() {
            if !descriptor.is_whiteout() {
                descriptor.set_configurable(false);
            }
        }
        Ok(())
    }

    /// `Object.freeze`: sealed, and every data property non-writable.
    pub fn freeze(&self, context: &mut Context) -> JsResult<()> {
        self.prevent_extensions();
        self.materialise_shared(context)?;
        let mut object = self.borrow_mut();
        object
            .flags_mut()
            .insert(ObjectFlags::SEALED_ELEMENTS | ObjectFlags::FROZEN_ELEMENTS);
        if let Some(storage) = object.as_array_mut() {
            storage.length_writable = false;
        }
        for (_, descriptor) in object.properties_mut().iter_mut() {
            if descriptor.is_whiteout() {
                continue;
            }
            descriptor.set_configurable(false);
            if descriptor.is_data() {
                descriptor.set_writable(false);
            }
        }
        Ok(())
    }

    // Copies shared-table entries into the private table so that freezing
    // and sealing can change their attributes.
    fn materialise_shared(&self, context: &mut Context) -> JsResult<()> {
        let shared_keys: Vec<PropertyKey> = {
            let object = self.borrow();
            match object.shared_properties() {
                Some(shared) => shared
                    .keys()
                    .filter(|key| !object.properties().contains_key(key))
                    .cloned()
                    .collect(),
                None => return Ok(()),
            }
        };
        for key in shared_keys {
            if let Some(descriptor) = self.own_property_descriptor(&key, context)? {
                self.borrow_mut().properties_mut().insert(key, descriptor);
            }
        }
        Ok(())
    }

    /// `Object.isSealed`.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        let object = self.borrow();
        if object.extensible() {
            return false;
        }
        if matches!(object.kind(), ObjectKind::Array(_))
            && !object.flags().contains(ObjectFlags::SEALED_ELEMENTS)
        {
            return false;
        }
        let result = object
            .properties()
            .iter()
            .all(|(_, descriptor)| descriptor.is_whiteout() || !descriptor.configurable());
        result
    }

    /// `Object.isFrozen`.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        let object = self.borrow();
        if object.extensible() {
            return false;
        }
        if let Some(storage) = object.as_array() {
            if !object.flags().contains(ObjectFlags::FROZEN_ELEMENTS) || storage.length_writable {
                return false;
            }
        }
        let result = object.properties().iter().all(|(_, descriptor)| {
            descriptor.is_whiteout()
                || (!descriptor.configurable() && (!descriptor.is_data() || !descriptor.writable()))
        });
        result
    }
}

fn read_only_error(key: &PropertyKey, object: &JsObject) -> crate::JsError {
    read_only_borrowed(key, object.borrow().kind().type_name())
}

fn read_only_borrowed(key: &PropertyKey, type_name: &str) -> crate::JsError {
    JsNativeError::typ()
        .with_message(format!(
            "Cannot assign to read-only property \"{key}\" of {type_name}"
        ))
        .into()
}

// ES5 8.12.9 validation, approximated: a non-configurable property rejects
// everything except narrowing writability and same-value writes.
fn merge_descriptors(
    key: &PropertyKey,
    existing: &PropertyDescriptor,
    incoming: PropertyDescriptor,
) -> JsResult<PropertyDescriptor> {
    let redefine_error = || -> crate::JsError {
        JsNativeError::typ()
            .with_message(format!("Cannot redefine property: \"{key}\""))
            .into()
    };

    if !existing.configurable() {
        if incoming.configurable_raw() == Some(true) {
            return Err(redefine_error());
        }
        if incoming
            .enumerable_raw()
            .is_some_and(|e| e != existing.enumerable())
        {
            return Err(redefine_error());
        }
        match incoming.kind() {
            PropertyKind::Generic | PropertyKind::Handler(_) | PropertyKind::Whiteout => {}
            PropertyKind::Data(value) => {
                if existing.is_accessor() {
                    return Err(redefine_error());
                }
                if !existing.writable() {
                    if incoming.writable_raw() == Some(true) {
                        return Err(redefine_error());
                    }
                    let old = existing.value().cloned().unwrap_or(JsValue::Undefined);
                    if !crate::value::same_value(&old, value) {
                        return Err(redefine_error());
                    }
                }
            }
            PropertyKind::Accessor { get, set } => match existing.kind() {
                PropertyKind::Accessor {
                    get: old_get,
                    set: old_set,
                } => {
                    let same = |a: &Option<JsObject>, b: &Option<JsObject>| match (a, b) {
                        (Some(a), Some(b)) => a.ptr_eq(b),
                        (None, None) => true,
                        _ => false,
                    };
                    if !same(get, old_get) || !same(set, old_set) {
                        return Err(redefine_error());
                    }
                }
                _ => return Err(redefine_error()),
            },
        }
        if existing.is_data() && !existing.writable() && incoming.writable_raw() == Some(true) {
            return Err(redefine_error());
        }
    }

    let mut merged = existing.clone();
    match incoming.kind() {
        PropertyKind::Generic | PropertyKind::Handler(_) | PropertyKind::Whiteout => {}
        kind => merged.set_kind(kind.clone()),
    }
    if let Some(enumerable) = incoming.enumerable_raw() {
        merged.set_enumerable(enumerable);
    }
    if let Some(writable) = incoming.writable_raw() {
        merged.set_writable(writable);
    }
    if let Some(configurable) = incoming.configurable_raw() {
        merged.set_configurable(configurable);
    }
    Ok(merged)
}
