//! Runtime closure environments.
//!
//! An environment is a fixed-size vector of value slots, sized at compile
//! time by the scope analysis. Closures capture whole environments by
//! reference, so inner functions keep outer slots alive after the outer
//! call returns.

use crate::JsValue;
use std::{cell::RefCell, rc::Rc};

/// A closure environment: a shared, fixed-size vector of slots.
#[derive(Debug, Clone)]
pub struct JsEnvironment {
    slots: Rc<RefCell<Box<[JsValue]>>>,
}

impl JsEnvironment {
    /// Creates an environment with `size` slots, all `undefined`.
    #[must_use]
    pub fn new(size: u16) -> Self {
        Self {
            slots: Rc::new(RefCell::new(
                vec![JsValue::Undefined; usize::from(size)].into_boxed_slice(),
            )),
        }
    }

    /// Reads a slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is out of range; slot indices come from the
    /// compiler and are trusted.
    #[must_use]
    pub fn get(&self, slot: u16) -> JsValue {
        self.slots.borrow()[usize::from(slot)].clone()
    }

    /// Writes a slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is out of range.
    pub fn set(&self, slot: u16, value: JsValue) {
        self.slots.borrow_mut()[usize::from(slot)] = value;
    }
}
