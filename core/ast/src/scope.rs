//! Scope analysis.
//!
//! Every function (ordinary or arrow) and the top level of a script owns one
//! scope. Blocks do not create scopes: declarations are `var`-only and hoist
//! to the enclosing function. The parser registers declarations while
//! parsing; [`ScopeTree::analyze`] then walks the finished AST to find which
//! variables are captured by nested functions, and [`ScopeTree::finalize`]
//! assigns every variable its runtime slot:
//!
//! * uncaptured variables become frame-local registers,
//! * uncaptured parameters stay in the argument window,
//! * captured variables (and captured parameters) are promoted into the
//!   function's closure environment,
//! * top level variables become properties of the global object.

use crate::{
    expression::{
        ArrayElement, AssignTarget, Expression, PropertyAccessField, PropertyDefinition,
        TemplatePart,
    },
    function::FunctionExpression,
    statement::{ForInit, ForInTarget, Statement, VarDeclarationTarget},
};
use rustc_hash::FxHashMap;
use std::fmt;

/// An index of a scope in the scope tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The scope of the script top level.
    pub const GLOBAL: Self = Self(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a variable entered its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// A `var` declaration.
    Var,
    /// A hoisted function declaration.
    Function,
    /// A formal parameter with its position.
    Parameter(u16),
    /// A `catch` clause binding.
    CatchParameter,
    /// The self-binding of a named function expression.
    FunctionSelf,
}

/// The runtime location of a variable, produced by [`ScopeTree::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A frame-local register.
    Local(u16),
    /// A slot of the argument window.
    Argument(u16),
    /// A slot of a closure environment `level` function scopes up
    /// (level 0 is the current function's own environment).
    Closure {
        /// Distance in function scopes to the declaring function.
        level: u16,
        /// Slot inside that environment.
        slot: u16,
    },
    /// A property of the global object.
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Unassigned,
    Local(u16),
    Argument(u16),
    Closure(u16),
    Global,
}

#[derive(Debug)]
struct Variable {
    kind: DeclarationKind,
    captured: bool,
    slot: Slot,
}

/// A single function (or global) scope.
#[derive(Debug)]
pub struct Scope {
    parent: Option<ScopeId>,
    arrow: bool,
    names: FxHashMap<Box<str>, usize>,
    order: Vec<Box<str>>,
    variables: Vec<Variable>,
    uses_arguments: bool,
    num_locals: u16,
    env_size: u16,
    // (argument index, environment slot) pairs copied at frame entry.
    param_copies: Vec<(u16, u16)>,
    self_slot: Option<Slot>,
}

impl Scope {
    fn new(parent: Option<ScopeId>, arrow: bool) -> Self {
        Self {
            parent,
            arrow,
            names: FxHashMap::default(),
            order: Vec::new(),
            variables: Vec::new(),
            uses_arguments: false,
            num_locals: 0,
            env_size: 0,
            param_copies: Vec::new(),
            self_slot: None,
        }
    }

    /// Number of local registers needed for the scope's variables.
    #[must_use]
    pub fn num_locals(&self) -> u16 {
        self.num_locals
    }

    /// Size of the closure environment of the scope.
    #[must_use]
    pub fn env_size(&self) -> u16 {
        self.env_size
    }

    /// `(argument index, environment slot)` pairs that must be copied into
    /// the environment when a frame for this scope is entered.
    #[must_use]
    pub fn param_copies(&self) -> &[(u16, u16)] {
        &self.param_copies
    }

    /// Returns `true` if the scope (or an arrow nested in it) references the
    /// `arguments` object.
    #[must_use]
    pub fn uses_arguments(&self) -> bool {
        self.uses_arguments
    }

    /// The binding of the named-function-expression self reference, if the
    /// function has one.
    #[must_use]
    pub fn self_binding(&self) -> Option<Binding> {
        self.self_slot.map(|slot| match slot {
            Slot::Local(index) => Binding::Local(index),
            Slot::Argument(index) => Binding::Argument(index),
            Slot::Closure(slot) => Binding::Closure { level: 0, slot },
            Slot::Unassigned | Slot::Global => Binding::Global,
        })
    }

    /// Iterates the names declared directly in this scope, in declaration
    /// order, together with their kinds.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, DeclarationKind)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(move |(i, name)| (&**name, self.variables[i].kind))
    }
}

/// The error returned when a declaration conflicts with an earlier one.
#[derive(Debug, Clone)]
pub struct DeclarationError {
    /// The redeclared name.
    pub name: Box<str>,
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" has already been declared", self.name)
    }
}

impl std::error::Error for DeclarationError {}

/// The scope tree of one script.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Creates a scope tree holding only the global scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None, false)],
        }
    }

    /// Opens a new function scope under `parent`.
    pub fn push_function(&mut self, parent: ScopeId, arrow: bool) -> ScopeId {
        let id = ScopeId(u32::try_from(self.scopes.len()).expect("scope count overflow"));
        self.scopes.push(Scope::new(Some(parent), arrow));
        id
    }

    /// Gets a scope by id.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Declares a name in `scope`.
    ///
    /// Redeclaring a `var` with another `var` is allowed; any combination
    /// that involves a hoisted function or a duplicate parameter is an
    /// error. A `var` naming an existing parameter merges with it.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: DeclarationKind,
    ) -> Result<(), DeclarationError> {
        let scope = &mut self.scopes[scope.index()];
        if let Some(&index) = scope.names.get(name) {
            let existing = scope.variables[index].kind;
            let compatible = matches!(
                (existing, kind),
                (
                    DeclarationKind::Var
                        | DeclarationKind::Parameter(_)
                        | DeclarationKind::CatchParameter,
                    DeclarationKind::Var | DeclarationKind::CatchParameter,
                )
            );
            if compatible {
                return Ok(());
            }
            return Err(DeclarationError { name: name.into() });
        }
        let index = scope.variables.len();
        scope.names.insert(name.into(), index);
        scope.order.push(name.into());
        scope.variables.push(Variable {
            kind,
            captured: false,
            slot: Slot::Unassigned,
        });
        Ok(())
    }

    /// Resolves `name` from `scope` after [`Self::finalize`] ran.
    ///
    /// Unknown names resolve to [`Binding::Global`]; whether the access
    /// throws a `ReferenceError` is decided at runtime.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Binding {
        let mut level = 0u16;
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(&index) = scope.names.get(name) {
                return match scope.variables[index].slot {
                    Slot::Local(index) => Binding::Local(index),
                    Slot::Argument(index) => Binding::Argument(index),
                    Slot::Closure(slot) => Binding::Closure { level, slot },
                    Slot::Global | Slot::Unassigned => Binding::Global,
                };
            }
            current = scope.parent;
            level += 1;
        }
        Binding::Global
    }

    /// Walks the finished AST, promoting variables referenced across function
    /// boundaries to closure slots and recording `arguments` usage.
    pub fn analyze(&mut self, statements: &[Statement]) {
        self.analyze_statements(statements, ScopeId::GLOBAL);
    }

    /// Assigns runtime slots to every variable of every scope.
    pub fn finalize(&mut self) {
        for index in 0..self.scopes.len() {
            let global = index == ScopeId::GLOBAL.index();
            let scope = &mut self.scopes[index];
            let mut locals = 0u16;
            let mut env = 0u16;
            for variable in &mut scope.variables {
                if global {
                    variable.slot = Slot::Global;
                    continue;
                }
                match (variable.kind, variable.captured) {
                    (DeclarationKind::Parameter(position), false) => {
                        variable.slot = Slot::Argument(position);
                    }
                    (DeclarationKind::Parameter(position), true) => {
                        variable.slot = Slot::Closure(env);
                        scope.param_copies.push((position, env));
                        env += 1;
                    }
                    (_, true) => {
                        variable.slot = Slot::Closure(env);
                        env += 1;
                    }
                    (_, false) => {
                        variable.slot = Slot::Local(locals);
                        locals += 1;
                    }
                }
            }
            scope.self_slot = scope
                .names
                .iter()
                .find(|(_, &index)| scope.variables[index].kind == DeclarationKind::FunctionSelf)
                .map(|(_, &index)| scope.variables[index].slot);
            scope.num_locals = locals;
            scope.env_size = env;
        }
    }

    fn reference(&mut self, from: ScopeId, name: &str) {
        if name == "arguments" {
            self.mark_arguments(from);
            return;
        }
        let mut level = 0u32;
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &mut self.scopes[id.index()];
            if let Some(&index) = scope.names.get(name) {
                if level > 0 && scope.parent.is_some() {
                    scope.variables[index].captured = true;
                }
                return;
            }
            current = scope.parent;
            level += 1;
        }
    }

    // `arguments` used in an arrow must be captured from every enclosing
    // arrow up to the nearest ordinary function, which then has to
    // materialize its arguments object.
    fn mark_arguments(&mut self, from: ScopeId) {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &mut self.scopes[id.index()];
            scope.uses_arguments = true;
            if !scope.arrow {
                break;
            }
            current = scope.parent;
        }
    }

    fn analyze_statements(&mut self, statements: &[Statement], scope: ScopeId) {
        for statement in statements {
            self.analyze_statement(statement, scope);
        }
    }

    fn analyze_statement(&mut self, statement: &Statement, scope: ScopeId) {
        match statement {
            Statement::Block(statements) => self.analyze_statements(statements, scope),
            Statement::Var(list) => {
                for declaration in &*list.list {
                    if let Some(init) = &declaration.init {
                        self.analyze_expression(init, scope);
                    }
                    match &declaration.target {
                        VarDeclarationTarget::Identifier(name) => self.reference(scope, name),
                        VarDeclarationTarget::Pattern(pattern) => {
                            pattern.for_each_bound_name(&mut |name| self.reference(scope, name));
                        }
                    }
                }
            }
            Statement::Empty | Statement::Continue(_) | Statement::Break(_) => {}
            Statement::Expression(expression) => self.analyze_expression(expression, scope),
            Statement::If(node) => {
                self.analyze_expression(&node.condition, scope);
                self.analyze_statement(&node.body, scope);
                if let Some(else_node) = &node.else_node {
                    self.analyze_statement(else_node, scope);
                }
            }
            Statement::DoWhile(node) => {
                self.analyze_statement(&node.body, scope);
                self.analyze_expression(&node.condition, scope);
            }
            Statement::While(node) => {
                self.analyze_expression(&node.condition, scope);
                self.analyze_statement(&node.body, scope);
            }
            Statement::For(node) => {
                match &node.init {
                    Some(ForInit::Var(list)) => {
                        for declaration in &*list.list {
                            if let Some(init) = &declaration.init {
                                self.analyze_expression(init, scope);
                            }
                            match &declaration.target {
                                VarDeclarationTarget::Identifier(name) => {
                                    self.reference(scope, name);
                                }
                                VarDeclarationTarget::Pattern(pattern) => {
                                    pattern.for_each_bound_name(&mut |name| {
                                        self.reference(scope, name);
                                    });
                                }
                            }
                        }
                    }
                    Some(ForInit::Expression(expression)) => {
                        self.analyze_expression(expression, scope);
                    }
                    None => {}
                }
                if let Some(condition) = &node.condition {
                    self.analyze_expression(condition, scope);
                }
                if let Some(step) = &node.step {
                    self.analyze_expression(step, scope);
                }
                self.analyze_statement(&node.body, scope);
            }
            Statement::ForIn(node) => {
                match &node.target {
                    ForInTarget::Var(name) => self.reference(scope, name),
                    ForInTarget::Assign(target) => self.analyze_assign_target(target, scope),
                }
                self.analyze_expression(&node.object, scope);
                self.analyze_statement(&node.body, scope);
            }
            Statement::Return(node) => {
                if let Some(expression) = &node.expression {
                    self.analyze_expression(expression, scope);
                }
            }
            Statement::Labelled(node) => self.analyze_statement(&node.body, scope),
            Statement::Switch(node) => {
                self.analyze_expression(&node.discriminant, scope);
                for case in &*node.cases {
                    if let Some(test) = &case.test {
                        self.analyze_expression(test, scope);
                    }
                    self.analyze_statements(&case.body, scope);
                }
            }
            Statement::Throw(node) => self.analyze_expression(&node.expression, scope),
            Statement::Try(node) => {
                self.analyze_statements(&node.block, scope);
                if let Some(catch) = &node.catch {
                    if let Some(parameter) = &catch.parameter {
                        self.reference(scope, parameter);
                    }
                    self.analyze_statements(&catch.block, scope);
                }
                if let Some(finally) = &node.finally {
                    self.analyze_statements(finally, scope);
                }
            }
            Statement::FunctionDeclaration(function) => {
                if let Some(name) = &function.name {
                    self.reference(scope, name);
                }
                self.analyze_function(function);
            }
            Statement::Import(_) => {}
            Statement::ExportDefault(expression) => self.analyze_expression(expression, scope),
        }
    }

    fn analyze_function(&mut self, function: &FunctionExpression) {
        self.analyze_statements(&function.body, function.scope);
    }

    fn analyze_assign_target(&mut self, target: &AssignTarget, scope: ScopeId) {
        match target {
            AssignTarget::Identifier(identifier) => self.reference(scope, &identifier.name),
            AssignTarget::Access(access) => {
                self.analyze_expression(&access.target, scope);
                if let PropertyAccessField::Expr(expression) = &access.field {
                    self.analyze_expression(expression, scope);
                }
            }
            AssignTarget::Pattern(pattern) => {
                pattern.for_each_bound_name(&mut |name| self.reference(scope, name));
            }
        }
    }

    fn analyze_expression(&mut self, expression: &Expression, scope: ScopeId) {
        match expression {
            Expression::This | Expression::Literal(_) | Expression::RegExpLiteral(_) => {}
            Expression::Identifier(identifier) => self.reference(scope, &identifier.name),
            Expression::ArrayLiteral(array) => {
                for element in &*array.elements {
                    match element {
                        ArrayElement::Elision => {}
                        ArrayElement::Expr(expression) | ArrayElement::Spread(expression) => {
                            self.analyze_expression(expression, scope);
                        }
                    }
                }
            }
            Expression::ObjectLiteral(object) => {
                for property in &*object.properties {
                    match property {
                        PropertyDefinition::Property(_, value) => {
                            self.analyze_expression(value, scope);
                        }
                        PropertyDefinition::Shorthand(identifier) => {
                            self.reference(scope, &identifier.name);
                        }
                        PropertyDefinition::Getter(_, function)
                        | PropertyDefinition::Setter(_, function) => {
                            self.analyze_function(function);
                        }
                    }
                }
            }
            Expression::Template(template) => {
                for part in &*template.parts {
                    if let TemplatePart::Expr(expression) = part {
                        self.analyze_expression(expression, scope);
                    }
                }
            }
            Expression::Function(function) | Expression::Arrow(function) => {
                self.analyze_function(function);
            }
            Expression::Unary(node) => self.analyze_expression(&node.target, scope),
            Expression::Update(node) => self.analyze_assign_target(&node.target, scope),
            Expression::Binary(node) => {
                self.analyze_expression(&node.lhs, scope);
                self.analyze_expression(&node.rhs, scope);
            }
            Expression::Conditional(node) => {
                self.analyze_expression(&node.condition, scope);
                self.analyze_expression(&node.if_true, scope);
                self.analyze_expression(&node.if_false, scope);
            }
            Expression::Assign(node) => {
                self.analyze_assign_target(&node.lhs, scope);
                self.analyze_expression(&node.rhs, scope);
            }
            Expression::Call(node) => {
                self.analyze_expression(&node.function, scope);
                for argument in &*node.args {
                    self.analyze_expression(argument, scope);
                }
            }
            Expression::New(node) => {
                self.analyze_expression(&node.constructor, scope);
                for argument in &*node.args {
                    self.analyze_expression(argument, scope);
                }
            }
            Expression::PropertyAccess(node) => {
                self.analyze_expression(&node.target, scope);
                if let PropertyAccessField::Expr(expression) = &node.field {
                    self.analyze_expression(expression, scope);
                }
            }
            Expression::Spread(expression) => self.analyze_expression(expression, scope),
            Expression::Sequence(expressions) => {
                for expression in &**expressions {
                    self.analyze_expression(expression, scope);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Binding, DeclarationKind, ScopeId, ScopeTree};

    #[test]
    fn locals_and_arguments_get_distinct_slots() {
        let mut tree = ScopeTree::new();
        let f = tree.push_function(ScopeId::GLOBAL, false);
        tree.declare(f, "a", DeclarationKind::Parameter(0)).unwrap();
        tree.declare(f, "b", DeclarationKind::Var).unwrap();
        tree.declare(f, "c", DeclarationKind::Var).unwrap();
        tree.finalize();

        assert_eq!(tree.lookup(f, "a"), Binding::Argument(0));
        assert_eq!(tree.lookup(f, "b"), Binding::Local(0));
        assert_eq!(tree.lookup(f, "c"), Binding::Local(1));
        assert_eq!(tree.lookup(f, "missing"), Binding::Global);
    }

    #[test]
    fn redeclaring_a_function_errors() {
        let mut tree = ScopeTree::new();
        let f = tree.push_function(ScopeId::GLOBAL, false);
        tree.declare(f, "dup", DeclarationKind::Var).unwrap();
        assert!(tree.declare(f, "dup", DeclarationKind::Function).is_err());
    }

    #[test]
    fn var_can_merge_with_parameter() {
        let mut tree = ScopeTree::new();
        let f = tree.push_function(ScopeId::GLOBAL, false);
        tree.declare(f, "a", DeclarationKind::Parameter(0)).unwrap();
        assert!(tree.declare(f, "a", DeclarationKind::Var).is_ok());
    }
}
