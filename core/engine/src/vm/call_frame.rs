//! Call frames and their try/iteration bookkeeping.

use super::{code_block::CodeBlock, opcode::Operand};
use crate::{environments::JsEnvironment, object::JsObject, property::PropertyKey, JsError, JsValue};
use std::rc::Rc;

/// The pending completion recorded while a `finally` block runs.
#[derive(Debug, Default)]
pub enum PendingCompletion {
    /// Normal completion.
    #[default]
    Normal,
    /// A throw travelling outwards.
    Throw(JsError),
    /// A `break`/`continue` to a pc outside the region.
    Jump(u32),
    /// A `return`; the value already sits in the retval register.
    Return,
}

/// Which part of a protected region is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryState {
    /// The `try` block.
    Try,
    /// The `catch` block; the catch entry is used up.
    Catch,
    /// The `finally` block.
    Finally,
}

/// One active protected region of a frame.
#[derive(Debug)]
pub struct TryRecord {
    /// Pc of the opening `TryStart`, used to detect jumps leaving the
    /// region.
    pub start_pc: u32,
    /// Catch entry pc ([`super::opcode::NO_TARGET`] when absent).
    pub catch_pc: u32,
    /// Finally entry pc ([`super::opcode::NO_TARGET`] when absent).
    pub finally_pc: u32,
    /// First pc after the whole statement.
    pub end_pc: u32,
    /// Current state.
    pub state: TryState,
    /// The completion to resolve at `FinallyEnd`.
    pub pending: PendingCompletion,
}

impl TryRecord {
    /// Whether the region still has a usable catch entry.
    #[must_use]
    pub fn can_catch(&self) -> bool {
        self.catch_pc != super::opcode::NO_TARGET && self.state == TryState::Try
    }

    /// Whether the region has a finally entry it is not already running.
    #[must_use]
    pub fn can_finalize(&self) -> bool {
        self.finally_pc != super::opcode::NO_TARGET && self.state != TryState::Finally
    }
}

/// The key iterator of one active `for…in` loop.
#[derive(Debug)]
pub struct ForInIterator {
    /// The snapshot of enumerable keys, most derived object first.
    pub keys: Vec<PropertyKey>,
    /// Next position in `keys`.
    pub index: usize,
    /// The enumerated value, re-checked for key liveness on each step.
    pub target: JsValue,
}

/// One frame of the call stack.
#[derive(Debug)]
pub struct CallFrame {
    /// The executing code.
    pub code: Rc<CodeBlock>,
    /// The program counter.
    pub pc: u32,
    /// The local register window.
    pub registers: Box<[JsValue]>,
    /// The argument window.
    pub arguments: Box<[JsValue]>,
    /// Environment chain: own environment first, then the captured chain.
    pub environments: Vec<JsEnvironment>,
    /// The `this` value.
    pub this: JsValue,
    /// The function being executed (`None` for the script top level).
    pub function: Option<JsObject>,
    /// The return value register.
    pub retval: JsValue,
    /// Where the caller wants the result stored.
    pub return_dst: Option<Operand>,
    /// Whether this is a `new` activation (the result defaults to `this`).
    pub construct: bool,
    /// The lazily materialised `arguments` object.
    pub arguments_object: Option<JsObject>,
    /// Active protected regions, innermost last.
    pub tries: Vec<TryRecord>,
    /// Active `for…in` iterators, innermost last.
    pub iterators: Vec<ForInIterator>,
}

impl CallFrame {
    /// Creates a frame for `code` with everything defaulted; the caller
    /// fills `this`, arguments and environments.
    #[must_use]
    pub fn new(code: Rc<CodeBlock>) -> Self {
        let registers = vec![JsValue::Undefined; usize::from(code.locals)].into_boxed_slice();
        Self {
            code,
            pc: 0,
            registers,
            arguments: Box::from([]),
            environments: Vec::new(),
            this: JsValue::Undefined,
            function: None,
            retval: JsValue::Undefined,
            return_dst: None,
            construct: false,
            arguments_object: None,
            tries: Vec::new(),
            iterators: Vec::new(),
        }
    }

    /// Reads an operand.
    #[must_use]
    pub fn read(&self, operand: Operand) -> JsValue {
        match operand {
            Operand::Local(index) => self.registers[usize::from(index)].clone(),
            Operand::Argument(index) => self
                .arguments
                .get(usize::from(index))
                .cloned()
                .unwrap_or(JsValue::Undefined),
            Operand::Closure { level, slot } => self.environments[usize::from(level)].get(slot),
            Operand::This => self.this.clone(),
            Operand::Retval => self.retval.clone(),
        }
    }

    /// Writes an operand.
    pub fn write(&mut self, operand: Operand, value: JsValue) {
        match operand {
            Operand::Local(index) => self.registers[usize::from(index)] = value,
            Operand::Argument(index) => {
                let index = usize::from(index);
                if index < self.arguments.len() {
                    self.arguments[index] = value;
                }
            }
            Operand::Closure { level, slot } => {
                self.environments[usize::from(level)].set(slot, value);
            }
            Operand::This => self.this = value,
            Operand::Retval => self.retval = value,
        }
    }
}
