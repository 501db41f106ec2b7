//! The Abstract Syntax Tree (AST) of the Adder JavaScript engine.
//!
//! This crate defines the nodes produced by [`adder_parser`] and consumed by
//! the bytecode compiler of `adder_engine`, plus the scope tree that records
//! where every variable lives at runtime (local slot, argument slot, closure
//! slot or global binding).
//!
//! The engine implements a `var`-only ECMAScript 5.1 subset extended with
//! arrow functions, rest parameters, spread elements, template literals and
//! destructuring in declarations and assignments, so the node set here is
//! deliberately smaller than a full ES2015+ AST.
//!
//! [`adder_parser`]: https://docs.rs/adder_parser

pub mod expression;
pub mod function;
pub mod op;
pub mod pattern;
pub mod position;
pub mod scope;
pub mod statement;

mod keyword;
mod punctuator;

pub use self::{
    expression::Expression,
    function::{FormalParameterList, FunctionExpression, FunctionKind},
    keyword::Keyword,
    pattern::Pattern,
    position::{Position, Span},
    punctuator::Punctuator,
    scope::{Binding, ScopeId, ScopeTree},
    statement::Statement,
};

/// The result of parsing a whole source text.
///
/// Bundles the top level statement list with the scope tree assembled while
/// parsing. The scope tree is finalized (slots assigned, captures promoted)
/// before the script is handed to the code generator.
#[derive(Debug)]
pub struct Script {
    statements: Box<[Statement]>,
    scope_tree: ScopeTree,
    module: bool,
}

impl Script {
    /// Creates a new script from its parts.
    #[must_use]
    pub fn new(statements: Box<[Statement]>, scope_tree: ScopeTree, module: bool) -> Self {
        Self {
            statements,
            scope_tree,
            module,
        }
    }

    /// Gets the list of top level statements.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Gets the scope tree of the script.
    #[must_use]
    pub fn scope_tree(&self) -> &ScopeTree {
        &self.scope_tree
    }

    /// Returns `true` if the source was parsed in module mode.
    #[must_use]
    pub fn is_module(&self) -> bool {
        self.module
    }
}
