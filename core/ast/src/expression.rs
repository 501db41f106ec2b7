//! Expression nodes.

use crate::{
    function::FunctionExpression,
    op::{AssignOp, BinaryOp, UnaryOp, UpdateOp},
    pattern::Pattern,
};

/// An expression node.
#[derive(Debug, Clone)]
pub enum Expression {
    /// The `this` keyword.
    This,
    /// A reference to a variable or global binding.
    Identifier(Identifier),
    /// A literal constant.
    Literal(Literal),
    /// An array literal, `[a, , ...b]`.
    ArrayLiteral(ArrayLiteral),
    /// An object literal, `{a: 1, get b() {}}`.
    ObjectLiteral(ObjectLiteral),
    /// A template literal, `` `a${b}c` ``.
    Template(TemplateLiteral),
    /// A function expression or declaration body.
    Function(Box<FunctionExpression>),
    /// An arrow function.
    Arrow(Box<FunctionExpression>),
    /// A regular expression literal, `/ab+c/gi`.
    RegExpLiteral(RegExpLiteral),
    /// A unary operation.
    Unary(Box<Unary>),
    /// An increment or decrement.
    Update(Box<Update>),
    /// A binary operation.
    Binary(Box<Binary>),
    /// The conditional (ternary) operator.
    Conditional(Box<Conditional>),
    /// An assignment, plain or compound.
    Assign(Box<Assign>),
    /// A function call.
    Call(Box<Call>),
    /// A `new` expression.
    New(Box<New>),
    /// A property access, `a.b` or `a[b]`.
    PropertyAccess(Box<PropertyAccess>),
    /// A spread element inside an array literal or argument list.
    Spread(Box<Expression>),
    /// A comma-separated sequence of expressions.
    Sequence(Box<[Expression]>),
}

/// A variable reference with the source line it appeared on, used for
/// reference error messages.
#[derive(Debug, Clone)]
pub struct Identifier {
    /// The referenced name.
    pub name: Box<str>,
    /// Line of the reference.
    pub line: u32,
}

impl Identifier {
    /// Creates a new identifier reference.
    #[must_use]
    pub fn new<N: Into<Box<str>>>(name: N, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

/// A literal constant.
///
/// String payloads are stored as WTF-8 bytes: escape sequences may produce
/// lone surrogates, which have no `str` representation.
#[derive(Debug, Clone)]
pub enum Literal {
    /// A numeric literal.
    Num(f64),
    /// A string literal (cooked WTF-8 bytes).
    String(Box<[u8]>),
    /// A boolean literal.
    Bool(bool),
    /// The `null` literal.
    Null,
}

/// An element of an array literal.
#[derive(Debug, Clone)]
pub enum ArrayElement {
    /// An elision (hole), `[,]`.
    Elision,
    /// A plain element.
    Expr(Expression),
    /// A spread element, `[...a]`.
    Spread(Expression),
}

/// An array literal.
#[derive(Debug, Clone)]
pub struct ArrayLiteral {
    /// The elements in source order.
    pub elements: Box<[ArrayElement]>,
}

/// The name of an object literal property.
#[derive(Debug, Clone)]
pub enum PropertyName {
    /// An identifier or string key.
    Literal(Box<str>),
    /// A numeric key, canonicalised at runtime.
    Numeric(f64),
}

/// A single definition inside an object literal.
#[derive(Debug, Clone)]
pub enum PropertyDefinition {
    /// `key: value`
    Property(PropertyName, Expression),
    /// Shorthand `{a}`.
    Shorthand(Identifier),
    /// `get key() { … }`
    Getter(PropertyName, FunctionExpression),
    /// `set key(v) { … }`
    Setter(PropertyName, FunctionExpression),
}

/// An object literal.
#[derive(Debug, Clone)]
pub struct ObjectLiteral {
    /// The property definitions in source order.
    pub properties: Box<[PropertyDefinition]>,
}

/// One part of a template literal.
#[derive(Debug, Clone)]
pub enum TemplatePart {
    /// A cooked string fragment (WTF-8 bytes).
    String(Box<[u8]>),
    /// An interpolated `${…}` expression.
    Expr(Expression),
}

/// A template literal.
#[derive(Debug, Clone)]
pub struct TemplateLiteral {
    /// Interleaved string fragments and interpolated expressions.
    pub parts: Box<[TemplatePart]>,
}

/// A regular expression literal. The pattern is compiled by the code
/// generator, which reports invalid patterns as syntax errors.
#[derive(Debug, Clone)]
pub struct RegExpLiteral {
    /// The pattern between the slashes.
    pub pattern: Box<str>,
    /// The flags after the closing slash.
    pub flags: Box<str>,
    /// Line of the literal.
    pub line: u32,
}

/// A unary operation.
#[derive(Debug, Clone)]
pub struct Unary {
    /// The operator.
    pub op: UnaryOp,
    /// The operand.
    pub target: Expression,
}

/// An increment or decrement operation.
#[derive(Debug, Clone)]
pub struct Update {
    /// The operator.
    pub op: UpdateOp,
    /// `true` for the prefix form.
    pub prefix: bool,
    /// The updated target; restricted to identifiers and property accesses.
    pub target: AssignTarget,
}

/// A binary operation.
#[derive(Debug, Clone)]
pub struct Binary {
    /// The operator.
    pub op: BinaryOp,
    /// The left-hand side.
    pub lhs: Expression,
    /// The right-hand side.
    pub rhs: Expression,
}

/// The conditional (ternary) operator.
#[derive(Debug, Clone)]
pub struct Conditional {
    /// The tested expression.
    pub condition: Expression,
    /// Value when the condition is truthy.
    pub if_true: Expression,
    /// Value when the condition is falsy.
    pub if_false: Expression,
}

/// The target of an assignment or update.
#[derive(Debug, Clone)]
pub enum AssignTarget {
    /// A variable.
    Identifier(Identifier),
    /// A property access.
    Access(Box<PropertyAccess>),
    /// A destructuring pattern (plain `=` assignments only).
    Pattern(Pattern),
}

/// An assignment, plain or compound.
#[derive(Debug, Clone)]
pub struct Assign {
    /// The operator.
    pub op: AssignOp,
    /// The assignment target.
    pub lhs: AssignTarget,
    /// The assigned value.
    pub rhs: Expression,
}

/// A function call.
#[derive(Debug, Clone)]
pub struct Call {
    /// The called expression.
    pub function: Expression,
    /// The arguments; spread arguments appear as [`Expression::Spread`].
    pub args: Box<[Expression]>,
    /// Line of the call, used for "is not a function" messages.
    pub line: u32,
}

/// A `new` expression.
#[derive(Debug, Clone)]
pub struct New {
    /// The constructed expression.
    pub constructor: Expression,
    /// The arguments.
    pub args: Box<[Expression]>,
    /// Line of the expression.
    pub line: u32,
}

/// The field of a property access.
#[derive(Debug, Clone)]
pub enum PropertyAccessField {
    /// A constant name, `a.b`.
    Const(Box<str>),
    /// A computed key, `a[b]`.
    Expr(Box<Expression>),
}

/// A property access.
#[derive(Debug, Clone)]
pub struct PropertyAccess {
    /// The accessed object.
    pub target: Expression,
    /// The accessed field.
    pub field: PropertyAccessField,
}
