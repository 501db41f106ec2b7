//! The compiled representation of a function.

use super::opcode::{Instruction, Operand};
use crate::{JsString, JsValue};
use std::rc::Rc;

/// A pre-compiled regexp literal, shared by every evaluation of the
/// literal.
#[derive(Debug)]
pub struct RegExpTemplate {
    /// The source between the slashes.
    pub source: JsString,
    /// The literal flags.
    pub flags: JsString,
    /// The compiled matcher.
    pub matcher: Rc<regress::Regex>,
}

/// The compiled code of one function (or of the script top level), plus its
/// constant pool, name table, regexp literals and nested function
/// templates.
#[derive(Debug)]
pub struct CodeBlock {
    /// Name of the function, shown by `fn.name` and stack messages.
    pub name: JsString,
    /// Number of declared parameters (`fn.length`).
    pub params: u16,
    /// Whether the final parameter is a rest parameter.
    pub rest: bool,
    /// Whether this is an arrow function.
    pub arrow: bool,
    /// Whether the function (or an arrow inside it) uses `arguments`.
    pub uses_arguments: bool,
    /// Size of the register window (variables plus temporaries).
    pub locals: u16,
    /// Size of the closure environment created per activation.
    pub env_size: u16,
    /// `(argument index, environment slot)` pairs copied at entry for
    /// captured parameters.
    pub param_copies: Box<[(u16, u16)]>,
    /// Slot of the named-function-expression self binding.
    pub self_slot: Option<Operand>,
    /// The instructions.
    pub instructions: Box<[Instruction]>,
    /// The constant pool. Numbers are deduplicated by bit pattern and
    /// strings by content.
    pub constants: Box<[JsValue]>,
    /// Property and global names referenced by index.
    pub names: Box<[JsString]>,
    /// Pre-compiled regexp literals.
    pub regexps: Box<[RegExpTemplate]>,
    /// Nested function templates.
    pub functions: Box<[Rc<CodeBlock>]>,
}

impl CodeBlock {
    /// Looks up an entry of the name table.
    #[must_use]
    pub fn name_at(&self, index: u32) -> &JsString {
        &self.names[index as usize]
    }

    /// Looks up an entry of the constant pool.
    #[must_use]
    pub fn constant_at(&self, index: u32) -> &JsValue {
        &self.constants[index as usize]
    }
}
