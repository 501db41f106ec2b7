//! Statement nodes.

use crate::{
    expression::{AssignTarget, Expression, Identifier},
    function::FunctionExpression,
    pattern::Pattern,
};

/// A statement node.
#[derive(Debug, Clone)]
pub enum Statement {
    /// A block, `{ … }`. Blocks do not open a new variable scope.
    Block(Box<[Statement]>),
    /// A `var` declaration list.
    Var(VarDeclarationList),
    /// The empty statement, `;`.
    Empty,
    /// An expression statement.
    Expression(Expression),
    /// An `if` statement with optional `else`.
    If(Box<If>),
    /// A `do … while` loop.
    DoWhile(Box<DoWhile>),
    /// A `while` loop.
    While(Box<While>),
    /// A C-style `for` loop.
    For(Box<For>),
    /// A `for … in` loop.
    ForIn(Box<ForIn>),
    /// A `continue` statement with optional label.
    Continue(JumpStatement),
    /// A `break` statement with optional label.
    Break(JumpStatement),
    /// A `return` statement.
    Return(ReturnStatement),
    /// A labelled statement.
    Labelled(Box<Labelled>),
    /// A `switch` statement.
    Switch(Box<Switch>),
    /// A `throw` statement.
    Throw(ThrowStatement),
    /// A `try … catch … finally` statement.
    Try(Box<Try>),
    /// A function declaration hoisted to the top of its scope.
    FunctionDeclaration(Box<FunctionExpression>),
    /// A module `import` declaration (module mode only).
    Import(Import),
    /// A module `export default` declaration (module mode only).
    ExportDefault(Box<Expression>),
}

/// The target of a single `var` declarator.
#[derive(Debug, Clone)]
pub enum VarDeclarationTarget {
    /// A plain identifier.
    Identifier(Box<str>),
    /// A destructuring pattern; always carries an initializer.
    Pattern(Pattern),
}

/// A single `var` declarator.
#[derive(Debug, Clone)]
pub struct VarDeclaration {
    /// The declared target.
    pub target: VarDeclarationTarget,
    /// The initializer, if any.
    pub init: Option<Expression>,
}

/// A `var` declaration list, `var a = 1, b;`.
#[derive(Debug, Clone)]
pub struct VarDeclarationList {
    /// The declarators in source order.
    pub list: Box<[VarDeclaration]>,
}

/// An `if` statement.
#[derive(Debug, Clone)]
pub struct If {
    /// The tested condition.
    pub condition: Expression,
    /// Statement executed when the condition is truthy.
    pub body: Statement,
    /// Statement executed when the condition is falsy.
    pub else_node: Option<Statement>,
}

/// A `do … while` loop.
#[derive(Debug, Clone)]
pub struct DoWhile {
    /// The loop body.
    pub body: Statement,
    /// The loop condition, tested after the body.
    pub condition: Expression,
}

/// A `while` loop.
#[derive(Debug, Clone)]
pub struct While {
    /// The loop condition.
    pub condition: Expression,
    /// The loop body.
    pub body: Statement,
}

/// The init part of a C-style `for` loop.
#[derive(Debug, Clone)]
pub enum ForInit {
    /// `for (var i = 0; …)`
    Var(VarDeclarationList),
    /// `for (i = 0; …)`
    Expression(Expression),
}

/// A C-style `for` loop.
#[derive(Debug, Clone)]
pub struct For {
    /// The init clause.
    pub init: Option<ForInit>,
    /// The condition clause.
    pub condition: Option<Expression>,
    /// The step clause.
    pub step: Option<Expression>,
    /// The loop body.
    pub body: Statement,
}

/// The loop variable of a `for … in` loop.
#[derive(Debug, Clone)]
pub enum ForInTarget {
    /// `for (var k in o)`
    Var(Box<str>),
    /// `for (k in o)` or `for (o.k in o)`
    Assign(AssignTarget),
}

/// A `for … in` loop.
#[derive(Debug, Clone)]
pub struct ForIn {
    /// Where each enumerated key lands.
    pub target: ForInTarget,
    /// The enumerated object.
    pub object: Expression,
    /// The loop body.
    pub body: Statement,
}

/// A `break` or `continue` statement.
#[derive(Debug, Clone)]
pub struct JumpStatement {
    /// The target label, if any.
    pub label: Option<Box<str>>,
    /// Line of the statement.
    pub line: u32,
}

/// A `return` statement.
#[derive(Debug, Clone)]
pub struct ReturnStatement {
    /// The returned expression; `None` returns `undefined`.
    pub expression: Option<Box<Expression>>,
    /// Line of the statement.
    pub line: u32,
}

/// A labelled statement.
#[derive(Debug, Clone)]
pub struct Labelled {
    /// The label name.
    pub label: Box<str>,
    /// The labelled statement.
    pub body: Statement,
}

/// A single `case` clause; `test` is `None` for `default`.
#[derive(Debug, Clone)]
pub struct Case {
    /// The tested expression.
    pub test: Option<Expression>,
    /// The statements of the clause.
    pub body: Box<[Statement]>,
}

/// A `switch` statement.
#[derive(Debug, Clone)]
pub struct Switch {
    /// The discriminant.
    pub discriminant: Expression,
    /// The case clauses in source order.
    pub cases: Box<[Case]>,
}

/// A `throw` statement.
#[derive(Debug, Clone)]
pub struct ThrowStatement {
    /// The thrown expression.
    pub expression: Box<Expression>,
}

/// The `catch` clause of a `try` statement.
#[derive(Debug, Clone)]
pub struct Catch {
    /// The exception binding; `catch {}` has none.
    pub parameter: Option<Box<str>>,
    /// The clause body.
    pub block: Box<[Statement]>,
}

/// A `try … catch … finally` statement.
#[derive(Debug, Clone)]
pub struct Try {
    /// The protected block.
    pub block: Box<[Statement]>,
    /// The catch clause.
    pub catch: Option<Catch>,
    /// The finally block.
    pub finally: Option<Box<[Statement]>>,
}

/// A module import of a built-in module, `import fs from 'fs'`.
#[derive(Debug, Clone)]
pub struct Import {
    /// The bound default name.
    pub binding: Box<str>,
    /// The module specifier.
    pub specifier: Box<str>,
    /// Line of the declaration.
    pub line: u32,
}

/// Helper alias so statements with a single boxed child stay readable.
pub type StatementList = Box<[Statement]>;

impl Statement {
    /// Returns `true` if the statement is a function declaration.
    #[must_use]
    pub fn is_function_declaration(&self) -> bool {
        matches!(self, Self::FunctionDeclaration(_))
    }
}

// `If`, `While` and friends store their bodies inline; boxing happens at the
// `Statement` variant level to keep the enum small.
impl From<Identifier> for AssignTarget {
    fn from(identifier: Identifier) -> Self {
        Self::Identifier(identifier)
    }
}
