//! Function nodes shared by declarations, expressions and arrows.

use crate::{scope::ScopeId, statement::Statement};

/// The flavour of a function node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// A `function` declaration or expression.
    Ordinary,
    /// An arrow function; captures `this` and `arguments` lexically and is
    /// not constructable.
    Arrow,
}

/// The formal parameters of a function.
///
/// Parameter patterns are not supported; the only non-identifier form is a
/// final rest parameter.
#[derive(Debug, Clone, Default)]
pub struct FormalParameterList {
    /// The named parameters in order.
    pub params: Box<[Box<str>]>,
    /// The rest parameter, if present.
    pub rest: Option<Box<str>>,
}

impl FormalParameterList {
    /// The number of named parameters, excluding the rest parameter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if the function declares no parameters at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.rest.is_none()
    }
}

/// A function expression, declaration or arrow body.
#[derive(Debug, Clone)]
pub struct FunctionExpression {
    /// The function name; `None` for anonymous expressions and arrows.
    pub name: Option<Box<str>>,
    /// The formal parameters.
    pub parameters: FormalParameterList,
    /// The body statements.
    pub body: Box<[Statement]>,
    /// Ordinary or arrow.
    pub kind: FunctionKind,
    /// The scope created for this function in the scope tree.
    pub scope: ScopeId,
    /// Line the function started on.
    pub line: u32,
}

impl FunctionExpression {
    /// Returns `true` for arrow functions.
    #[must_use]
    pub fn is_arrow(&self) -> bool {
        self.kind == FunctionKind::Arrow
    }
}
