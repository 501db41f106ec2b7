//! The bytecode compiler: a tree walk over the AST that fills a
//! [`CodeBlock`] per function, recording forward-jump fixups as it goes.
//!
//! Registers are allocated in two bands: the scope's variables occupy the
//! low registers, temporaries grow stack-like above them. Call arguments
//! are compiled into a contiguous temporary block so the `Call` family can
//! name them as a window.

use crate::{
    error::JsNativeError,
    value::number_to_js_string,
    vm::{
        opcode::{BinaryOpKind, Instruction, Operand, UnaryOpKind, NO_TARGET},
        CodeBlock, RegExpTemplate,
    },
    JsResult, JsString, JsValue,
};
use adder_ast::{
    expression::{
        ArrayElement, Assign, AssignTarget, Call, Expression, Identifier, Literal, New,
        ObjectLiteral, PropertyAccess, PropertyAccessField, PropertyDefinition, PropertyName,
        RegExpLiteral, TemplateLiteral, TemplatePart, Update,
    },
    function::FunctionExpression,
    op::{BinaryOp, UnaryOp, UpdateOp},
    pattern::{ArrayPatternElement, Pattern, PatternBinding},
    scope::{Binding, DeclarationKind, ScopeId, ScopeTree},
    statement::{
        Case, ForIn, ForInTarget, ForInit, Statement, Switch, Try, VarDeclaration,
        VarDeclarationList, VarDeclarationTarget,
    },
    Script,
};
use rustc_hash::FxHashMap;
use std::rc::Rc;

// The resolved storage of an identifier.
enum Place {
    Operand(Operand),
    Global(u32),
    Arguments,
}

// Identity of a jump that leaves a protected region; one region supports a
// single such exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitId {
    Break(usize),
    Continue(usize),
    Return,
}

struct TryContext {
    has_finally: bool,
    in_finally: bool,
    exit: Option<ExitId>,
}

struct LoopContext {
    labels: Vec<Box<str>>,
    iteration: bool,
    // `true` when a bare `break` may target this context (loops and
    // switches, not plain labelled statements).
    bare_breakable: bool,
    for_in: bool,
    continue_fixups: Vec<usize>,
    break_fixups: Vec<usize>,
    try_depth: usize,
}

/// The per-function bytecode compiler.
pub struct ByteCompiler<'a> {
    scope_tree: &'a ScopeTree,
    scope: ScopeId,
    global: bool,
    instructions: Vec<Instruction>,
    constants: Vec<JsValue>,
    number_constants: FxHashMap<u64, u32>,
    string_constants: FxHashMap<Vec<u8>, u32>,
    null_constant: Option<u32>,
    bool_constants: [Option<u32>; 2],
    names: Vec<JsString>,
    name_indices: FxHashMap<Vec<u8>, u32>,
    regexps: Vec<RegExpTemplate>,
    functions: Vec<Rc<CodeBlock>>,
    register_base: u16,
    register_top: u16,
    max_registers: u16,
    loops: Vec<LoopContext>,
    tries: Vec<TryContext>,
}

impl std::fmt::Debug for ByteCompiler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteCompiler")
            .field("instructions", &self.instructions.len())
            .field("registers", &self.max_registers)
            .finish_non_exhaustive()
    }
}

impl<'a> ByteCompiler<'a> {
    /// Compiles a whole script into its top level code.
    pub fn compile_script(script: &'a Script) -> JsResult<CodeBlock> {
        let mut compiler = Self::new(script.scope_tree(), ScopeId::GLOBAL, true);

        // Hoisting: declare every top level binding, then initialise the
        // function declarations before any other statement runs.
        let declarations: Vec<(JsString, DeclarationKind)> = compiler
            .scope_tree
            .scope(ScopeId::GLOBAL)
            .declarations()
            .map(|(name, kind)| (JsString::from(name), kind))
            .collect();
        for (name, _) in &declarations {
            let name = compiler.name_index(name.clone());
            compiler.emit(Instruction::DefineGlobal { name });
        }
        compiler.hoist_functions(script.statements())?;

        for statement in script.statements() {
            compiler.compile_statement(statement)?;
        }
        compiler.emit(Instruction::Return {
            src: Operand::Retval,
        });
        Ok(compiler.finish(JsString::default(), 0, false, false))
    }

    fn new(scope_tree: &'a ScopeTree, scope: ScopeId, global: bool) -> Self {
        let register_base = if global {
            0
        } else {
            scope_tree.scope(scope).num_locals()
        };
        Self {
            scope_tree,
            scope,
            global,
            instructions: Vec::new(),
            constants: Vec::new(),
            number_constants: FxHashMap::default(),
            string_constants: FxHashMap::default(),
            null_constant: None,
            bool_constants: [None, None],
            names: Vec::new(),
            name_indices: FxHashMap::default(),
            regexps: Vec::new(),
            functions: Vec::new(),
            register_base,
            register_top: register_base,
            max_registers: register_base,
            loops: Vec::new(),
            tries: Vec::new(),
        }
    }

    fn finish(self, name: JsString, params: u16, rest: bool, arrow: bool) -> CodeBlock {
        let scope = self.scope_tree.scope(self.scope);
        CodeBlock {
            name,
            params,
            rest,
            arrow,
            uses_arguments: scope.uses_arguments(),
            locals: self.max_registers,
            env_size: scope.env_size(),
            param_copies: scope.param_copies().to_vec().into_boxed_slice(),
            self_slot: scope.self_binding().map(binding_operand),
            instructions: self.instructions.into_boxed_slice(),
            constants: self.constants.into_boxed_slice(),
            names: self.names.into_boxed_slice(),
            regexps: self.regexps.into_boxed_slice(),
            functions: self.functions.into_boxed_slice(),
        }
    }

    // === emission helpers ===

    fn emit(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    fn next_pc(&self) -> u32 {
        self.instructions.len() as u32
    }

    fn patch_jump(&mut self, at: usize, target: u32) {
        match &mut self.instructions[at] {
            Instruction::Jump { target: slot }
            | Instruction::JumpIfFalse { target: slot, .. }
            | Instruction::JumpIfTrue { target: slot, .. }
            | Instruction::CaseJump { target: slot, .. }
            | Instruction::TryJump { target: slot }
            | Instruction::ForInNext { exit: slot, .. } => *slot = target,
            other => unreachable!("patching a non-jump instruction {other:?}"),
        }
    }

    fn alloc(&mut self) -> Operand {
        let register = self.register_top;
        self.register_top += 1;
        self.max_registers = self.max_registers.max(self.register_top);
        Operand::Local(register)
    }

    fn free(&mut self, count: u16) {
        self.register_top -= count;
    }

    // === constant and name pools ===

    fn number_constant(&mut self, value: f64) -> u32 {
        if let Some(&index) = self.number_constants.get(&value.to_bits()) {
            return index;
        }
        let index = self.constants.len() as u32;
        self.constants.push(JsValue::Number(value));
        self.number_constants.insert(value.to_bits(), index);
        index
    }

    fn string_constant(&mut self, bytes: &[u8]) -> u32 {
        if let Some(&index) = self.string_constants.get(bytes) {
            return index;
        }
        let index = self.constants.len() as u32;
        self.constants
            .push(JsValue::String(JsString::from_wtf8(bytes.to_vec())));
        self.string_constants.insert(bytes.to_vec(), index);
        index
    }

    fn simple_constant(&mut self, value: JsValue) -> u32 {
        let slot = match &value {
            JsValue::Null => &mut self.null_constant,
            JsValue::Boolean(false) => &mut self.bool_constants[0],
            JsValue::Boolean(true) => &mut self.bool_constants[1],
            _ => unreachable!("only null and booleans are simple constants"),
        };
        if let Some(index) = *slot {
            return index;
        }
        let index = self.constants.len() as u32;
        *slot = Some(index);
        self.constants.push(value);
        index
    }

    fn name_index(&mut self, name: JsString) -> u32 {
        if let Some(&index) = self.name_indices.get(name.as_bytes()) {
            return index;
        }
        let index = self.names.len() as u32;
        self.name_indices.insert(name.as_bytes().to_vec(), index);
        self.names.push(name);
        index
    }

    fn property_name_index(&mut self, name: &PropertyName) -> u32 {
        match name {
            PropertyName::Literal(name) => self.name_index(JsString::from(&**name)),
            PropertyName::Numeric(value) => self.name_index(number_to_js_string(*value)),
        }
    }

    // === identifiers ===

    fn resolve(&mut self, name: &str) -> Place {
        if name == "arguments" && !self.global {
            return Place::Arguments;
        }
        match self.scope_tree.lookup(self.scope, name) {
            Binding::Global => Place::Global(self.name_index(JsString::from(name))),
            binding => Place::Operand(binding_operand(binding)),
        }
    }

    fn load_identifier(&mut self, identifier: &Identifier, dst: Operand) -> JsResult<()> {
        match self.resolve(&identifier.name) {
            Place::Operand(src) => {
                self.emit(Instruction::Move { dst, src });
            }
            Place::Global(name) => {
                self.emit(Instruction::GetGlobal { dst, name });
            }
            Place::Arguments => {
                self.emit(Instruction::GetArguments { dst });
            }
        }
        Ok(())
    }

    fn store_identifier(&mut self, name: &str, src: Operand) -> JsResult<()> {
        match self.resolve(name) {
            Place::Operand(dst) => {
                self.emit(Instruction::Move { dst, src });
                Ok(())
            }
            Place::Global(name) => {
                self.emit(Instruction::SetGlobal { name, src });
                Ok(())
            }
            Place::Arguments => Err(JsNativeError::syntax()
                .with_message("Identifier \"arguments\" is forbidden as left-hand in assignment")
                .into()),
        }
    }

    // === statements ===

    // Collects function declarations from every statement list of this
    // function (blocks and switch cases included) and initialises them.
    fn hoist_functions(&mut self, statements: &[Statement]) -> JsResult<()> {
        for statement in statements {
            match statement {
                Statement::FunctionDeclaration(function) => {
                    let index = self.compile_function_template(function)?;
                    let temp = self.alloc();
                    self.emit(Instruction::LoadFunction { dst: temp, index });
                    let name = function.name.clone().unwrap_or_default();
                    self.store_identifier(&name, temp)?;
                    self.free(1);
                }
                Statement::Block(body) => self.hoist_functions(body)?,
                Statement::If(node) => {
                    self.hoist_functions(std::slice::from_ref(&node.body))?;
                    if let Some(else_node) = &node.else_node {
                        self.hoist_functions(std::slice::from_ref(else_node))?;
                    }
                }
                Statement::Labelled(node) => {
                    self.hoist_functions(std::slice::from_ref(&node.body))?;
                }
                Statement::While(node) => {
                    self.hoist_functions(std::slice::from_ref(&node.body))?;
                }
                Statement::DoWhile(node) => {
                    self.hoist_functions(std::slice::from_ref(&node.body))?;
                }
                Statement::For(node) => {
                    self.hoist_functions(std::slice::from_ref(&node.body))?;
                }
                Statement::ForIn(node) => {
                    self.hoist_functions(std::slice::from_ref(&node.body))?;
                }
                Statement::Switch(node) => {
                    for case in &*node.cases {
                        self.hoist_functions(&case.body)?;
                    }
                }
                Statement::Try(node) => {
                    self.hoist_functions(&node.block)?;
                    if let Some(catch) = &node.catch {
                        self.hoist_functions(&catch.block)?;
                    }
                    if let Some(finally) = &node.finally {
                        self.hoist_functions(finally)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn compile_statements(&mut self, statements: &[Statement]) -> JsResult<()> {
        for statement in statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_statement(&mut self, statement: &Statement) -> JsResult<()> {
        match statement {
            Statement::Empty | Statement::FunctionDeclaration(_) => Ok(()),
            Statement::Import(node) => {
                let specifier = self.name_index(JsString::from(&*node.specifier));
                let temp = self.alloc();
                self.emit(Instruction::ImportModule {
                    dst: temp,
                    name: specifier,
                });
                self.store_identifier(&node.binding, temp)?;
                self.free(1);
                Ok(())
            }
            Statement::Block(body) => self.compile_statements(body),
            Statement::Expression(expression) => {
                if self.global {
                    // Top level expression statements feed the script's
                    // completion value. Function frames keep the retval
                    // register for pending returns instead.
                    self.compile_expression(expression, Operand::Retval)
                } else {
                    let temp = self.alloc();
                    self.compile_expression(expression, temp)?;
                    self.free(1);
                    Ok(())
                }
            }
            Statement::ExportDefault(expression) => {
                self.compile_expression(expression, Operand::Retval)
            }
            Statement::Var(list) => self.compile_var_list(list),
            Statement::If(node) => {
                let cond = self.alloc();
                self.compile_expression(&node.condition, cond)?;
                let to_else = self.emit(Instruction::JumpIfFalse {
                    cond,
                    target: NO_TARGET,
                });
                self.free(1);
                self.compile_statement(&node.body)?;
                match &node.else_node {
                    Some(else_node) => {
                        let to_end = self.emit(Instruction::Jump { target: NO_TARGET });
                        let else_pc = self.next_pc();
                        self.patch_jump(to_else, else_pc);
                        self.compile_statement(else_node)?;
                        let end = self.next_pc();
                        self.patch_jump(to_end, end);
                    }
                    None => {
                        let end = self.next_pc();
                        self.patch_jump(to_else, end);
                    }
                }
                Ok(())
            }
            Statement::While(_)
            | Statement::DoWhile(_)
            | Statement::For(_)
            | Statement::ForIn(_) => self.compile_labelled_body(statement, &[]),
            Statement::Labelled(node) => {
                let mut labels = vec![node.label.clone()];
                let mut body = &node.body;
                while let Statement::Labelled(inner) = body {
                    labels.push(inner.label.clone());
                    body = &inner.body;
                }
                self.compile_labelled_body(body, &labels)
            }
            Statement::Continue(node) => self.compile_continue(node.label.as_deref(), node.line),
            Statement::Break(node) => self.compile_break(node.label.as_deref(), node.line),
            Statement::Return(node) => {
                let temp = self.alloc();
                match &node.expression {
                    Some(expression) => self.compile_expression(expression, temp)?,
                    None => {
                        self.emit(Instruction::LoadUndefined { dst: temp });
                    }
                }
                self.compile_return_with(temp)?;
                self.free(1);
                Ok(())
            }
            Statement::Throw(node) => {
                let temp = self.alloc();
                self.compile_expression(&node.expression, temp)?;
                self.emit(Instruction::Throw { src: temp });
                self.free(1);
                Ok(())
            }
            Statement::Switch(_) => self.compile_labelled_body(statement, &[]),
            Statement::Try(node) => self.compile_try(node),
        }
    }

    fn compile_labelled_body(&mut self, body: &Statement, labels: &[Box<str>]) -> JsResult<()> {
        match body {
            Statement::While(node) => self.compile_loop(labels, |compiler| {
                let start = compiler.next_pc();
                let cond = compiler.alloc();
                compiler.compile_expression(&node.condition, cond)?;
                let exit = compiler.emit(Instruction::JumpIfFalse {
                    cond,
                    target: NO_TARGET,
                });
                compiler.free(1);
                compiler.compile_statement(&node.body)?;
                compiler.emit(Instruction::Jump { target: start });
                let end = compiler.next_pc();
                compiler.patch_jump(exit, end);
                Ok((start, end))
            }),
            Statement::DoWhile(node) => self.compile_loop(labels, |compiler| {
                let start = compiler.next_pc();
                compiler.compile_statement(&node.body)?;
                let continue_pc = compiler.next_pc();
                let cond = compiler.alloc();
                compiler.compile_expression(&node.condition, cond)?;
                compiler.emit(Instruction::JumpIfTrue {
                    cond,
                    target: start,
                });
                compiler.free(1);
                Ok((continue_pc, compiler.next_pc()))
            }),
            Statement::For(node) => {
                match &node.init {
                    Some(ForInit::Var(list)) => self.compile_var_list(list)?,
                    Some(ForInit::Expression(expression)) => {
                        let temp = self.alloc();
                        self.compile_expression(expression, temp)?;
                        self.free(1);
                    }
                    None => {}
                }
                self.compile_loop(labels, |compiler| {
                    let start = compiler.next_pc();
                    let exit = match &node.condition {
                        Some(condition) => {
                            let cond = compiler.alloc();
                            compiler.compile_expression(condition, cond)?;
                            let exit = compiler.emit(Instruction::JumpIfFalse {
                                cond,
                                target: NO_TARGET,
                            });
                            compiler.free(1);
                            Some(exit)
                        }
                        None => None,
                    };
                    compiler.compile_statement(&node.body)?;
                    let continue_pc = compiler.next_pc();
                    if let Some(step) = &node.step {
                        let temp = compiler.alloc();
                        compiler.compile_expression(step, temp)?;
                        compiler.free(1);
                    }
                    compiler.emit(Instruction::Jump { target: start });
                    let end = compiler.next_pc();
                    if let Some(exit) = exit {
                        compiler.patch_jump(exit, end);
                    }
                    Ok((continue_pc, end))
                })
            }
            Statement::ForIn(node) => self.compile_for_in(node, labels),
            Statement::Switch(node) => self.compile_switch(node, labels),
            // A plain labelled statement is only a break target.
            other => {
                self.loops.push(LoopContext {
                    labels: labels.to_vec(),
                    iteration: false,
                    bare_breakable: false,
                    for_in: false,
                    continue_fixups: Vec::new(),
                    break_fixups: Vec::new(),
                    try_depth: self.tries.len(),
                });
                let result = self.compile_statement(other);
                let context = self.loops.pop().expect("labelled context pushed");
                result?;
                let end = self.next_pc();
                for fixup in context.break_fixups {
                    self.patch_jump(fixup, end);
                }
                Ok(())
            }
        }
    }

    // Runs `body` inside a fresh loop context; `body` returns the continue
    // target and the break target.
    fn compile_loop(
        &mut self,
        labels: &[Box<str>],
        body: impl FnOnce(&mut Self) -> JsResult<(u32, u32)>,
    ) -> JsResult<()> {
        self.loops.push(LoopContext {
            labels: labels.to_vec(),
            iteration: true,
            bare_breakable: true,
            for_in: false,
            continue_fixups: Vec::new(),
            break_fixups: Vec::new(),
            try_depth: self.tries.len(),
        });
        let result = body(self);
        let context = self.loops.pop().expect("loop context pushed");
        let (continue_pc, break_pc) = result?;
        for fixup in context.continue_fixups {
            self.patch_jump(fixup, continue_pc);
        }
        for fixup in context.break_fixups {
            self.patch_jump(fixup, break_pc);
        }
        Ok(())
    }

    fn compile_for_in(&mut self, node: &ForIn, labels: &[Box<str>]) -> JsResult<()> {
        let object = self.alloc();
        self.compile_expression(&node.object, object)?;
        self.emit(Instruction::ForInInit { object });
        self.free(1);

        self.loops.push(LoopContext {
            labels: labels.to_vec(),
            iteration: true,
            bare_breakable: true,
            for_in: true,
            continue_fixups: Vec::new(),
            break_fixups: Vec::new(),
            try_depth: self.tries.len(),
        });

        let result = (|| -> JsResult<(u32, u32)> {
            let start = self.next_pc();
            let key = self.alloc();
            let next = self.emit(Instruction::ForInNext {
                dst: key,
                exit: NO_TARGET,
            });
            match &node.target {
                ForInTarget::Var(name) => self.store_identifier(name, key)?,
                ForInTarget::Assign(target) => self.compile_store_target(target, key)?,
            }
            self.free(1);
            self.compile_statement(&node.body)?;
            self.emit(Instruction::Jump { target: start });
            let exit = self.next_pc();
            self.patch_jump(next, exit);
            self.emit(Instruction::ForInDone);
            Ok((start, exit))
        })();

        let context = self.loops.pop().expect("loop context pushed");
        let (continue_pc, break_pc) = result?;
        for fixup in context.continue_fixups {
            self.patch_jump(fixup, continue_pc);
        }
        // Breaks land on the `ForInDone` so the iterator always closes.
        for fixup in context.break_fixups {
            self.patch_jump(fixup, break_pc);
        }
        Ok(())
    }

    fn compile_switch(&mut self, node: &Switch, labels: &[Box<str>]) -> JsResult<()> {
        let discriminant = self.alloc();
        self.compile_expression(&node.discriminant, discriminant)?;

        self.loops.push(LoopContext {
            labels: labels.to_vec(),
            iteration: false,
            bare_breakable: true,
            for_in: false,
            continue_fixups: Vec::new(),
            break_fixups: Vec::new(),
            try_depth: self.tries.len(),
        });

        let result = (|| -> JsResult<u32> {
            let mut case_jumps = Vec::new();
            let mut default_index = None;
            for (index, case) in node.cases.iter().enumerate() {
                match &case.test {
                    Some(test) => {
                        let temp = self.alloc();
                        self.compile_expression(test, temp)?;
                        let jump = self.emit(Instruction::CaseJump {
                            lhs: discriminant,
                            rhs: temp,
                            target: NO_TARGET,
                        });
                        self.free(1);
                        case_jumps.push((index, jump));
                    }
                    None => default_index = Some(index),
                }
            }
            let default_jump = self.emit(Instruction::Jump { target: NO_TARGET });

            let mut body_starts = vec![0u32; node.cases.len()];
            for (index, case) in node.cases.iter().enumerate() {
                body_starts[index] = self.next_pc();
                self.compile_case_body(case)?;
            }
            let end = self.next_pc();

            for (index, jump) in case_jumps {
                self.patch_jump(jump, body_starts[index]);
            }
            match default_index {
                Some(index) => self.patch_jump(default_jump, body_starts[index]),
                None => self.patch_jump(default_jump, end),
            }
            Ok(end)
        })();

        let context = self.loops.pop().expect("switch context pushed");
        let end = result?;
        for fixup in context.break_fixups {
            self.patch_jump(fixup, end);
        }
        self.free(1);
        Ok(())
    }

    fn compile_case_body(&mut self, case: &Case) -> JsResult<()> {
        self.compile_statements(&case.body)
    }

    fn compile_var_list(&mut self, list: &VarDeclarationList) -> JsResult<()> {
        for declaration in &*list.list {
            self.compile_var_declaration(declaration)?;
        }
        Ok(())
    }

    fn compile_var_declaration(&mut self, declaration: &VarDeclaration) -> JsResult<()> {
        match (&declaration.target, &declaration.init) {
            (VarDeclarationTarget::Identifier(_), None) => Ok(()),
            (VarDeclarationTarget::Identifier(name), Some(init)) => {
                let temp = self.alloc();
                self.compile_expression(init, temp)?;
                self.store_identifier(name, temp)?;
                self.free(1);
                Ok(())
            }
            (VarDeclarationTarget::Pattern(pattern), Some(init)) => {
                let temp = self.alloc();
                self.compile_expression(init, temp)?;
                self.compile_destructuring(pattern, temp)?;
                self.free(1);
                Ok(())
            }
            (VarDeclarationTarget::Pattern(_), None) => {
                unreachable!("the parser requires initialisers on patterns")
            }
        }
    }

    fn compile_destructuring(&mut self, pattern: &Pattern, src: Operand) -> JsResult<()> {
        match pattern {
            Pattern::Array(array) => {
                for (index, element) in array.elements.iter().enumerate() {
                    let ArrayPatternElement::Binding(binding) = element else {
                        continue;
                    };
                    let value = self.alloc();
                    let name = self.name_index(JsString::from(index.to_string()));
                    self.emit(Instruction::GetPropertyConst {
                        dst: value,
                        object: src,
                        name,
                    });
                    self.compile_pattern_binding(binding, value)?;
                    self.free(1);
                }
                if let Some(rest) = &array.rest {
                    let value = self.alloc();
                    self.emit(Instruction::CopyRest {
                        dst: value,
                        src,
                        start: array.elements.len() as u32,
                    });
                    self.compile_pattern_binding(rest, value)?;
                    self.free(1);
                }
                Ok(())
            }
            Pattern::Object(object) => {
                for property in &*object.properties {
                    let value = self.alloc();
                    let name = self.name_index(JsString::from(&*property.name));
                    self.emit(Instruction::GetPropertyConst {
                        dst: value,
                        object: src,
                        name,
                    });
                    self.compile_pattern_binding(&property.binding, value)?;
                    self.free(1);
                }
                Ok(())
            }
        }
    }

    fn compile_pattern_binding(&mut self, binding: &PatternBinding, src: Operand) -> JsResult<()> {
        match binding {
            PatternBinding::Identifier(name) => self.store_identifier(name, src),
            PatternBinding::Pattern(pattern) => self.compile_destructuring(pattern, src),
        }
    }

    // === break / continue / return across protected regions ===

    fn find_loop(&self, label: Option<&str>, continue_target: bool) -> Option<usize> {
        match label {
            Some(label) => self
                .loops
                .iter()
                .rposition(|context| context.labels.iter().any(|l| &**l == label)),
            None if continue_target => {
                self.loops.iter().rposition(|context| context.iteration)
            }
            None => self
                .loops
                .iter()
                .rposition(|context| context.bare_breakable),
        }
    }

    // Emits the try bookkeeping for a jump that leaves every region above
    // `target_depth`, returning `true` when a finally chain will perform
    // the jump itself.
    fn unwind_tries(&mut self, target_depth: usize, exit: ExitId, line: u32) -> JsResult<bool> {
        let crossing: Vec<usize> = (target_depth..self.tries.len()).rev().collect();
        // Register the single-exit identity on every crossed region that
        // owns a finally block.
        for &index in &crossing {
            let context = &mut self.tries[index];
            if context.has_finally && !context.in_finally {
                match context.exit {
                    None => context.exit = Some(exit),
                    Some(existing) if existing == exit => {}
                    Some(_) => {
                        return Err(JsNativeError::internal()
                            .with_message(format!(
                                "try/catch/finally with conflicting jump targets at line {line}"
                            ))
                            .into());
                    }
                }
            }
        }
        for &index in &crossing {
            let (has_finally, in_finally) = {
                let context = &self.tries[index];
                (context.has_finally, context.in_finally)
            };
            if has_finally && !in_finally {
                // The finally chain resolves the jump from here on.
                return Ok(true);
            }
            self.emit(Instruction::TryEnd);
        }
        Ok(false)
    }

    // Emits `ForInDone` for every for-in loop strictly inside the target.
    fn close_inner_iterators(&mut self, target: usize) {
        let closes = self.loops[target + 1..]
            .iter()
            .filter(|context| context.for_in)
            .count();
        for _ in 0..closes {
            self.emit(Instruction::ForInDone);
        }
    }

    fn compile_break(&mut self, label: Option<&str>, line: u32) -> JsResult<()> {
        let target = self
            .find_loop(label, false)
            .expect("the parser validated the break target");
        self.close_inner_iterators(target);
        let through_finally = self.unwind_tries(self.loops[target].try_depth, ExitId::Break(target), line)?;
        let fixup = if through_finally {
            self.emit(Instruction::TryJump { target: NO_TARGET })
        } else {
            self.emit(Instruction::Jump { target: NO_TARGET })
        };
        self.loops[target].break_fixups.push(fixup);
        Ok(())
    }

    fn compile_continue(&mut self, label: Option<&str>, line: u32) -> JsResult<()> {
        let target = self
            .find_loop(label, true)
            .expect("the parser validated the continue target");
        self.close_inner_iterators(target);
        let through_finally =
            self.unwind_tries(self.loops[target].try_depth, ExitId::Continue(target), line)?;
        let fixup = if through_finally {
            self.emit(Instruction::TryJump { target: NO_TARGET })
        } else {
            self.emit(Instruction::Jump { target: NO_TARGET })
        };
        self.loops[target].continue_fixups.push(fixup);
        Ok(())
    }

    fn compile_return_with(&mut self, src: Operand) -> JsResult<()> {
        let through_finally = self.unwind_tries(0, ExitId::Return, 0)?;
        if through_finally {
            self.emit(Instruction::TryReturn { src });
        } else {
            self.emit(Instruction::Return { src });
        }
        Ok(())
    }

    // === try/catch/finally ===

    fn compile_try(&mut self, node: &Try) -> JsResult<()> {
        let try_start = self.emit(Instruction::TryStart {
            catch: NO_TARGET,
            finally: NO_TARGET,
            end: NO_TARGET,
        });
        self.tries.push(TryContext {
            has_finally: node.finally.is_some(),
            in_finally: false,
            exit: None,
        });

        let result = (|| -> JsResult<(Option<u32>, Option<u32>)> {
            self.compile_statements(&node.block)?;
            self.emit(Instruction::TryEnd);
            let mut after_jumps = vec![self.emit(Instruction::Jump { target: NO_TARGET })];

            let catch_pc = match &node.catch {
                Some(catch) => {
                    let catch_pc = self.next_pc();
                    match &catch.parameter {
                        Some(parameter) => match self.resolve(parameter) {
                            Place::Operand(dst) => {
                                self.emit(Instruction::Catch { dst });
                            }
                            Place::Global(name) => {
                                let temp = self.alloc();
                                self.emit(Instruction::Catch { dst: temp });
                                self.emit(Instruction::SetGlobal { name, src: temp });
                                self.free(1);
                            }
                            Place::Arguments => {
                                unreachable!("the parser rejects `arguments` declarations")
                            }
                        },
                        None => {
                            let temp = self.alloc();
                            self.emit(Instruction::Catch { dst: temp });
                            self.free(1);
                        }
                    }
                    self.compile_statements(&catch.block)?;
                    self.emit(Instruction::TryEnd);
                    after_jumps.push(self.emit(Instruction::Jump { target: NO_TARGET }));
                    Some(catch_pc)
                }
                None => None,
            };

            let finally_pc = match &node.finally {
                Some(finally) => {
                    let finally_pc = self.next_pc();
                    self.tries
                        .last_mut()
                        .expect("try context pushed")
                        .in_finally = true;
                    self.compile_statements(finally)?;
                    self.emit(Instruction::FinallyEnd);
                    Some(finally_pc)
                }
                None => None,
            };

            let after = self.next_pc();
            for jump in after_jumps {
                self.patch_jump(jump, after);
            }
            if let Instruction::TryStart { catch, finally, end } =
                &mut self.instructions[try_start]
            {
                *catch = catch_pc.unwrap_or(NO_TARGET);
                *finally = finally_pc.unwrap_or(NO_TARGET);
                *end = after;
            }
            Ok((catch_pc, finally_pc))
        })();

        self.tries.pop();
        result?;
        Ok(())
    }

    // === functions ===

    fn compile_function_template(&mut self, function: &FunctionExpression) -> JsResult<u32> {
        let mut compiler = ByteCompiler::new(self.scope_tree, function.scope, false);
        compiler.compile_function_body(function)?;
        let name = function
            .name
            .as_deref()
            .map_or_else(JsString::default, JsString::from);
        let code = compiler.finish(
            name,
            function.parameters.len() as u16,
            function.parameters.rest.is_some(),
            function.is_arrow(),
        );
        let index = self.functions.len() as u32;
        self.functions.push(Rc::new(code));
        Ok(index)
    }

    fn compile_function_body(&mut self, function: &FunctionExpression) -> JsResult<()> {
        if let Some(rest) = &function.parameters.rest {
            let temp = self.alloc();
            self.emit(Instruction::RestArguments {
                dst: temp,
                start: function.parameters.len() as u16,
            });
            self.store_identifier(rest, temp)?;
            self.free(1);
        }
        self.hoist_functions(&function.body)?;
        self.compile_statements(&function.body)?;
        self.emit(Instruction::Return {
            src: Operand::Retval,
        });
        Ok(())
    }

    // === expressions ===

    #[allow(clippy::too_many_lines)]
    fn compile_expression(&mut self, expression: &Expression, dst: Operand) -> JsResult<()> {
        match expression {
            Expression::This => {
                self.emit(Instruction::Move {
                    dst,
                    src: Operand::This,
                });
                Ok(())
            }
            Expression::Identifier(identifier) => self.load_identifier(identifier, dst),
            Expression::Literal(literal) => {
                let index = match literal {
                    Literal::Num(value) => self.number_constant(*value),
                    Literal::String(bytes) => self.string_constant(bytes),
                    Literal::Bool(value) => self.simple_constant(JsValue::Boolean(*value)),
                    Literal::Null => self.simple_constant(JsValue::Null),
                };
                self.emit(Instruction::LoadConst { dst, index });
                Ok(())
            }
            Expression::ArrayLiteral(array) => {
                self.emit(Instruction::NewArray {
                    dst,
                    capacity: array.elements.len() as u32,
                });
                for element in &*array.elements {
                    match element {
                        ArrayElement::Elision => {
                            self.emit(Instruction::AppendHole { array: dst });
                        }
                        ArrayElement::Expr(expression) => {
                            let temp = self.alloc();
                            self.compile_expression(expression, temp)?;
                            self.emit(Instruction::Append {
                                array: dst,
                                src: temp,
                            });
                            self.free(1);
                        }
                        ArrayElement::Spread(expression) => {
                            let temp = self.alloc();
                            self.compile_expression(expression, temp)?;
                            self.emit(Instruction::AppendSpread {
                                array: dst,
                                src: temp,
                            });
                            self.free(1);
                        }
                    }
                }
                Ok(())
            }
            Expression::ObjectLiteral(object) => self.compile_object_literal(object, dst),
            Expression::Template(template) => self.compile_template(template, dst),
            Expression::Function(function) => {
                let index = self.compile_function_template(function)?;
                self.emit(Instruction::LoadFunction { dst, index });
                Ok(())
            }
            Expression::Arrow(function) => {
                let index = self.compile_function_template(function)?;
                self.emit(Instruction::LoadFunction { dst, index });
                Ok(())
            }
            Expression::RegExpLiteral(literal) => self.compile_regexp(literal, dst),
            Expression::Unary(node) => self.compile_unary(&node.op, &node.target, dst),
            Expression::Update(node) => self.compile_update(node, dst),
            Expression::Binary(node) => match node.op {
                BinaryOp::LogicalAnd => {
                    self.compile_expression(&node.lhs, dst)?;
                    let short = self.emit(Instruction::JumpIfFalse {
                        cond: dst,
                        target: NO_TARGET,
                    });
                    self.compile_expression(&node.rhs, dst)?;
                    let end = self.next_pc();
                    self.patch_jump(short, end);
                    Ok(())
                }
                BinaryOp::LogicalOr => {
                    self.compile_expression(&node.lhs, dst)?;
                    let short = self.emit(Instruction::JumpIfTrue {
                        cond: dst,
                        target: NO_TARGET,
                    });
                    self.compile_expression(&node.rhs, dst)?;
                    let end = self.next_pc();
                    self.patch_jump(short, end);
                    Ok(())
                }
                op => {
                    self.compile_expression(&node.lhs, dst)?;
                    let rhs = self.alloc();
                    self.compile_expression(&node.rhs, rhs)?;
                    self.emit(Instruction::Binary {
                        op: binary_kind(op),
                        dst,
                        lhs: dst,
                        rhs,
                    });
                    self.free(1);
                    Ok(())
                }
            },
            Expression::Conditional(node) => {
                let cond = self.alloc();
                self.compile_expression(&node.condition, cond)?;
                let to_else = self.emit(Instruction::JumpIfFalse {
                    cond,
                    target: NO_TARGET,
                });
                self.free(1);
                self.compile_expression(&node.if_true, dst)?;
                let to_end = self.emit(Instruction::Jump { target: NO_TARGET });
                let else_pc = self.next_pc();
                self.patch_jump(to_else, else_pc);
                self.compile_expression(&node.if_false, dst)?;
                let end = self.next_pc();
                self.patch_jump(to_end, end);
                Ok(())
            }
            Expression::Assign(node) => self.compile_assign(node, dst),
            Expression::Call(node) => self.compile_call(node, dst),
            Expression::New(node) => self.compile_new(node, dst),
            Expression::PropertyAccess(node) => {
                let object = self.alloc();
                self.compile_expression(&node.target, object)?;
                match &node.field {
                    PropertyAccessField::Const(name) => {
                        let name = self.name_index(JsString::from(&**name));
                        self.emit(Instruction::GetPropertyConst { dst, object, name });
                    }
                    PropertyAccessField::Expr(key) => {
                        let key_temp = self.alloc();
                        self.compile_expression(key, key_temp)?;
                        self.emit(Instruction::GetProperty {
                            dst,
                            object,
                            key: key_temp,
                        });
                        self.free(1);
                    }
                }
                self.free(1);
                Ok(())
            }
            Expression::Spread(_) => Err(JsNativeError::syntax()
                .with_message("Unexpected spread element")
                .into()),
            Expression::Sequence(expressions) => {
                for expression in &**expressions {
                    self.compile_expression(expression, dst)?;
                }
                Ok(())
            }
        }
    }

    fn compile_object_literal(&mut self, object: &ObjectLiteral, dst: Operand) -> JsResult<()> {
        self.emit(Instruction::NewObject { dst });
        for property in &*object.properties {
            match property {
                PropertyDefinition::Property(name, value) => {
                    let name = self.property_name_index(name);
                    let temp = self.alloc();
                    self.compile_expression(value, temp)?;
                    self.emit(Instruction::DefineDataConst {
                        object: dst,
                        name,
                        src: temp,
                    });
                    self.free(1);
                }
                PropertyDefinition::Shorthand(identifier) => {
                    let name = self.name_index(JsString::from(&*identifier.name));
                    let temp = self.alloc();
                    self.load_identifier(identifier, temp)?;
                    self.emit(Instruction::DefineDataConst {
                        object: dst,
                        name,
                        src: temp,
                    });
                    self.free(1);
                }
                PropertyDefinition::Getter(name, function) => {
                    let name = self.property_name_index(name);
                    let index = self.compile_function_template(function)?;
                    let temp = self.alloc();
                    self.emit(Instruction::LoadFunction { dst: temp, index });
                    self.emit(Instruction::DefineGetter {
                        object: dst,
                        name,
                        function: temp,
                    });
                    self.free(1);
                }
                PropertyDefinition::Setter(name, function) => {
                    let name = self.property_name_index(name);
                    let index = self.compile_function_template(function)?;
                    let temp = self.alloc();
                    self.emit(Instruction::LoadFunction { dst: temp, index });
                    self.emit(Instruction::DefineSetter {
                        object: dst,
                        name,
                        function: temp,
                    });
                    self.free(1);
                }
            }
        }
        Ok(())
    }

    // Templates compile into an initial string plus ToString-and-concat
    // steps.
    fn compile_template(&mut self, template: &TemplateLiteral, dst: Operand) -> JsResult<()> {
        let mut parts = template.parts.iter();
        match parts.next() {
            Some(TemplatePart::String(bytes)) => {
                let index = self.string_constant(bytes);
                self.emit(Instruction::LoadConst { dst, index });
            }
            _ => {
                let index = self.string_constant(b"");
                self.emit(Instruction::LoadConst { dst, index });
            }
        }
        for part in parts {
            match part {
                TemplatePart::String(bytes) => {
                    if bytes.is_empty() {
                        continue;
                    }
                    let index = self.string_constant(bytes);
                    let temp = self.alloc();
                    self.emit(Instruction::LoadConst { dst: temp, index });
                    self.emit(Instruction::Binary {
                        op: BinaryOpKind::Add,
                        dst,
                        lhs: dst,
                        rhs: temp,
                    });
                    self.free(1);
                }
                TemplatePart::Expr(expression) => {
                    let temp = self.alloc();
                    self.compile_expression(expression, temp)?;
                    self.emit(Instruction::ToString {
                        dst: temp,
                        src: temp,
                    });
                    self.emit(Instruction::Binary {
                        op: BinaryOpKind::Add,
                        dst,
                        lhs: dst,
                        rhs: temp,
                    });
                    self.free(1);
                }
            }
        }
        Ok(())
    }

    fn compile_regexp(&mut self, literal: &RegExpLiteral, dst: Operand) -> JsResult<()> {
        let index = self.regexp_template(&literal.pattern, &literal.flags, literal.line)?;
        self.emit(Instruction::LoadRegExp { dst, index });
        Ok(())
    }

    fn regexp_template(&mut self, pattern: &str, flags: &str, line: u32) -> JsResult<u32> {
        let mut seen = Vec::new();
        for flag in flags.chars() {
            if !"gimsuy".contains(flag) || seen.contains(&flag) {
                return Err(JsNativeError::syntax()
                    .with_message(format!(
                        "Invalid regular expression flags \"{flags}\" in [string]:{line}"
                    ))
                    .into());
            }
            seen.push(flag);
        }
        let backend_flags: String = flags.chars().filter(|&c| c != 'g').collect();
        let matcher = regress::Regex::with_flags(pattern, backend_flags.as_str()).map_err(
            |error| -> crate::JsError {
                JsNativeError::syntax()
                    .with_message(format!(
                        "Invalid regular expression /{pattern}/: {error} in [string]:{line}"
                    ))
                    .into()
            },
        )?;
        let index = self.regexps.len() as u32;
        self.regexps.push(RegExpTemplate {
            source: JsString::from(pattern),
            flags: JsString::from(flags),
            matcher: Rc::new(matcher),
        });
        Ok(index)
    }

    fn compile_unary(
        &mut self,
        op: &UnaryOp,
        target: &Expression,
        dst: Operand,
    ) -> JsResult<()> {
        match op {
            UnaryOp::Void => {
                self.compile_expression(target, dst)?;
                self.emit(Instruction::LoadUndefined { dst });
                Ok(())
            }
            UnaryOp::Delete => match target {
                Expression::PropertyAccess(access) => {
                    let object = self.alloc();
                    self.compile_expression(&access.target, object)?;
                    match &access.field {
                        PropertyAccessField::Const(name) => {
                            let name = self.name_index(JsString::from(&**name));
                            self.emit(Instruction::DeletePropertyConst { dst, object, name });
                        }
                        PropertyAccessField::Expr(key) => {
                            let key_temp = self.alloc();
                            self.compile_expression(key, key_temp)?;
                            self.emit(Instruction::DeleteProperty {
                                dst,
                                object,
                                key: key_temp,
                            });
                            self.free(1);
                        }
                    }
                    self.free(1);
                    Ok(())
                }
                other => {
                    // `delete <non-reference>` evaluates the operand and
                    // yields true.
                    self.compile_expression(other, dst)?;
                    let index = self.simple_constant(JsValue::Boolean(true));
                    self.emit(Instruction::LoadConst { dst, index });
                    Ok(())
                }
            },
            UnaryOp::TypeOf => {
                if let Expression::Identifier(identifier) = target {
                    if let Place::Global(name) = self.resolve(&identifier.name) {
                        self.emit(Instruction::TypeOfGlobal { dst, name });
                        return Ok(());
                    }
                }
                self.compile_expression(target, dst)?;
                self.emit(Instruction::Unary {
                    op: UnaryOpKind::TypeOf,
                    dst,
                    src: dst,
                });
                Ok(())
            }
            UnaryOp::Minus | UnaryOp::Plus | UnaryOp::Not | UnaryOp::Tilde => {
                self.compile_expression(target, dst)?;
                let kind = match op {
                    UnaryOp::Minus => UnaryOpKind::Neg,
                    UnaryOp::Plus => UnaryOpKind::Plus,
                    UnaryOp::Not => UnaryOpKind::Not,
                    UnaryOp::Tilde => UnaryOpKind::BitNot,
                    _ => unreachable!(),
                };
                self.emit(Instruction::Unary {
                    op: kind,
                    dst,
                    src: dst,
                });
                Ok(())
            }
        }
    }

    fn compile_update(&mut self, node: &Update, dst: Operand) -> JsResult<()> {
        let op = match node.op {
            UpdateOp::Increment => BinaryOpKind::Add,
            UpdateOp::Decrement => BinaryOpKind::Sub,
        };
        let one = self.number_constant(1.0);

        match &node.target {
            AssignTarget::Identifier(identifier) => {
                self.load_identifier(identifier, dst)?;
                self.emit(Instruction::ToNumber { dst, src: dst });
                let temp = self.alloc();
                self.emit(Instruction::LoadConst {
                    dst: temp,
                    index: one,
                });
                if node.prefix {
                    self.emit(Instruction::Binary {
                        op,
                        dst,
                        lhs: dst,
                        rhs: temp,
                    });
                    self.store_identifier(&identifier.name, dst)?;
                } else {
                    self.emit(Instruction::Binary {
                        op,
                        dst: temp,
                        lhs: dst,
                        rhs: temp,
                    });
                    self.store_identifier(&identifier.name, temp)?;
                }
                self.free(1);
                Ok(())
            }
            AssignTarget::Access(access) => {
                let object = self.alloc();
                self.compile_expression(&access.target, object)?;
                let (name, key_temp) = self.compile_access_key(&access.field)?;
                match (name, key_temp) {
                    (Some(name), None) => {
                        self.emit(Instruction::GetPropertyConst { dst, object, name });
                        self.emit(Instruction::ToNumber { dst, src: dst });
                        let temp = self.alloc();
                        self.emit(Instruction::LoadConst {
                            dst: temp,
                            index: one,
                        });
                        let result = if node.prefix { dst } else { temp };
                        self.emit(Instruction::Binary {
                            op,
                            dst: result,
                            lhs: dst,
                            rhs: temp,
                        });
                        self.emit(Instruction::SetPropertyConst {
                            object,
                            name,
                            src: result,
                        });
                        self.free(1);
                    }
                    (None, Some(key)) => {
                        self.emit(Instruction::GetProperty { dst, object, key });
                        self.emit(Instruction::ToNumber { dst, src: dst });
                        let temp = self.alloc();
                        self.emit(Instruction::LoadConst {
                            dst: temp,
                            index: one,
                        });
                        let result = if node.prefix { dst } else { temp };
                        self.emit(Instruction::Binary {
                            op,
                            dst: result,
                            lhs: dst,
                            rhs: temp,
                        });
                        self.emit(Instruction::SetProperty {
                            object,
                            key,
                            src: result,
                        });
                        self.free(2);
                    }
                    _ => unreachable!("access key is a name or a register"),
                }
                self.free(1);
                Ok(())
            }
            AssignTarget::Pattern(_) => Err(JsNativeError::syntax()
                .with_message("Invalid left-hand side in update operation")
                .into()),
        }
    }

    // Compiles the key of a member access: a name table index for constant
    // fields or a temporary holding the computed key.
    fn compile_access_key(
        &mut self,
        field: &PropertyAccessField,
    ) -> JsResult<(Option<u32>, Option<Operand>)> {
        match field {
            PropertyAccessField::Const(name) => {
                Ok((Some(self.name_index(JsString::from(&**name))), None))
            }
            PropertyAccessField::Expr(key) => {
                let temp = self.alloc();
                self.compile_expression(key, temp)?;
                Ok((None, Some(temp)))
            }
        }
    }

    fn compile_assign(&mut self, node: &Assign, dst: Operand) -> JsResult<()> {
        match (&node.lhs, node.op.binary_op()) {
            (AssignTarget::Identifier(identifier), None) => {
                self.compile_expression(&node.rhs, dst)?;
                self.store_identifier(&identifier.name, dst)
            }
            (AssignTarget::Identifier(identifier), Some(op)) => {
                self.load_identifier(identifier, dst)?;
                let rhs = self.alloc();
                self.compile_expression(&node.rhs, rhs)?;
                self.emit(Instruction::Binary {
                    op: binary_kind(op),
                    dst,
                    lhs: dst,
                    rhs,
                });
                self.free(1);
                self.store_identifier(&identifier.name, dst)
            }
            (AssignTarget::Access(access), compound) => {
                self.compile_member_assign(access, compound, &node.rhs, dst)
            }
            (AssignTarget::Pattern(pattern), None) => {
                self.compile_expression(&node.rhs, dst)?;
                self.compile_destructuring(pattern, dst)
            }
            (AssignTarget::Pattern(_), Some(_)) => Err(JsNativeError::syntax()
                .with_message("Invalid left-hand side in compound assignment")
                .into()),
        }
    }

    fn compile_member_assign(
        &mut self,
        access: &PropertyAccess,
        compound: Option<BinaryOp>,
        rhs: &Expression,
        dst: Operand,
    ) -> JsResult<()> {
        let object = self.alloc();
        self.compile_expression(&access.target, object)?;
        let (name, key_temp) = self.compile_access_key(&access.field)?;

        if let Some(op) = compound {
            match (name, key_temp) {
                (Some(name), None) => {
                    self.emit(Instruction::GetPropertyConst { dst, object, name });
                }
                (None, Some(key)) => {
                    self.emit(Instruction::GetProperty { dst, object, key });
                }
                _ => unreachable!("access key is a name or a register"),
            }
            let temp = self.alloc();
            self.compile_expression(rhs, temp)?;
            self.emit(Instruction::Binary {
                op: binary_kind(op),
                dst,
                lhs: dst,
                rhs: temp,
            });
            self.free(1);
        } else {
            self.compile_expression(rhs, dst)?;
        }

        match (name, key_temp) {
            (Some(name), None) => {
                self.emit(Instruction::SetPropertyConst {
                    object,
                    name,
                    src: dst,
                });
                self.free(1);
            }
            (None, Some(key)) => {
                self.emit(Instruction::SetProperty {
                    object,
                    key,
                    src: dst,
                });
                self.free(2);
            }
            _ => unreachable!("access key is a name or a register"),
        }
        Ok(())
    }

    fn has_spread(args: &[Expression]) -> bool {
        args.iter()
            .any(|argument| matches!(argument, Expression::Spread(_)))
    }

    // Builds an argument array for spread calls.
    fn compile_spread_arguments(&mut self, args: &[Expression]) -> JsResult<Operand> {
        let array = self.alloc();
        self.emit(Instruction::NewArray {
            dst: array,
            capacity: args.len() as u32,
        });
        for argument in args {
            let temp = self.alloc();
            match argument {
                Expression::Spread(expression) => {
                    self.compile_expression(expression, temp)?;
                    self.emit(Instruction::AppendSpread { array, src: temp });
                }
                other => {
                    self.compile_expression(other, temp)?;
                    self.emit(Instruction::Append { array, src: temp });
                }
            }
            self.free(1);
        }
        Ok(array)
    }

    // Compiles the arguments into a contiguous temporary block, returning
    // its first register.
    fn compile_argument_block(&mut self, args: &[Expression]) -> JsResult<u16> {
        let argv = self.register_top;
        for argument in args {
            let temp = self.alloc();
            self.compile_expression(argument, temp)?;
        }
        Ok(argv)
    }

    fn compile_call(&mut self, node: &Call, dst: Operand) -> JsResult<()> {
        let spread = Self::has_spread(&node.args);
        match &node.function {
            Expression::PropertyAccess(access) => {
                let object = self.alloc();
                self.compile_expression(&access.target, object)?;
                match &access.field {
                    PropertyAccessField::Const(name) if !spread => {
                        let name = self.name_index(JsString::from(&**name));
                        let argv = self.compile_argument_block(&node.args)?;
                        self.emit(Instruction::CallMethod {
                            dst,
                            object,
                            name,
                            argv,
                            argc: node.args.len() as u16,
                        });
                        self.free(node.args.len() as u16);
                    }
                    field => {
                        let function = self.alloc();
                        match field {
                            PropertyAccessField::Const(name) => {
                                let name = self.name_index(JsString::from(&**name));
                                self.emit(Instruction::GetPropertyConst {
                                    dst: function,
                                    object,
                                    name,
                                });
                            }
                            PropertyAccessField::Expr(key) => {
                                let key_temp = self.alloc();
                                self.compile_expression(key, key_temp)?;
                                self.emit(Instruction::GetProperty {
                                    dst: function,
                                    object,
                                    key: key_temp,
                                });
                                self.free(1);
                            }
                        }
                        if spread {
                            let args = self.compile_spread_arguments(&node.args)?;
                            self.emit(Instruction::CallVarargs {
                                dst,
                                function,
                                this_value: object,
                                args,
                            });
                            self.free(1);
                        } else {
                            let argv = self.compile_argument_block(&node.args)?;
                            self.emit(Instruction::Call {
                                dst,
                                function,
                                this_value: object,
                                argv,
                                argc: node.args.len() as u16,
                            });
                            self.free(node.args.len() as u16);
                        }
                        self.free(1);
                    }
                }
                self.free(1);
                Ok(())
            }
            callee => {
                let function = self.alloc();
                self.compile_expression(callee, function)?;
                let this_value = self.alloc();
                self.emit(Instruction::LoadUndefined { dst: this_value });
                if spread {
                    let args = self.compile_spread_arguments(&node.args)?;
                    self.emit(Instruction::CallVarargs {
                        dst,
                        function,
                        this_value,
                        args,
                    });
                    self.free(1);
                } else {
                    let argv = self.compile_argument_block(&node.args)?;
                    self.emit(Instruction::Call {
                        dst,
                        function,
                        this_value,
                        argv,
                        argc: node.args.len() as u16,
                    });
                    self.free(node.args.len() as u16);
                }
                self.free(2);
                Ok(())
            }
        }
    }

    fn compile_new(&mut self, node: &New, dst: Operand) -> JsResult<()> {
        let function = self.alloc();
        self.compile_expression(&node.constructor, function)?;
        if Self::has_spread(&node.args) {
            let args = self.compile_spread_arguments(&node.args)?;
            self.emit(Instruction::NewVarargs {
                dst,
                function,
                args,
            });
            self.free(1);
        } else {
            let argv = self.compile_argument_block(&node.args)?;
            self.emit(Instruction::New {
                dst,
                function,
                argv,
                argc: node.args.len() as u16,
            });
            self.free(node.args.len() as u16);
        }
        self.free(1);
        Ok(())
    }

    fn compile_store_target(&mut self, target: &AssignTarget, src: Operand) -> JsResult<()> {
        match target {
            AssignTarget::Identifier(identifier) => {
                self.store_identifier(&identifier.name, src)
            }
            AssignTarget::Access(access) => {
                let object = self.alloc();
                self.compile_expression(&access.target, object)?;
                match &access.field {
                    PropertyAccessField::Const(name) => {
                        let name = self.name_index(JsString::from(&**name));
                        self.emit(Instruction::SetPropertyConst { object, name, src });
                    }
                    PropertyAccessField::Expr(key) => {
                        let key_temp = self.alloc();
                        self.compile_expression(key, key_temp)?;
                        self.emit(Instruction::SetProperty {
                            object,
                            key: key_temp,
                            src,
                        });
                        self.free(1);
                    }
                }
                self.free(1);
                Ok(())
            }
            AssignTarget::Pattern(pattern) => self.compile_destructuring(pattern, src),
        }
    }
}

fn binding_operand(binding: Binding) -> Operand {
    match binding {
        Binding::Local(index) => Operand::Local(index),
        Binding::Argument(index) => Operand::Argument(index),
        Binding::Closure { level, slot } => Operand::Closure { level, slot },
        Binding::Global => unreachable!("global bindings have no operand"),
    }
}

fn binary_kind(op: BinaryOp) -> BinaryOpKind {
    match op {
        BinaryOp::Add => BinaryOpKind::Add,
        BinaryOp::Sub => BinaryOpKind::Sub,
        BinaryOp::Mul => BinaryOpKind::Mul,
        BinaryOp::Div => BinaryOpKind::Div,
        BinaryOp::Mod => BinaryOpKind::Mod,
        BinaryOp::Exp => BinaryOpKind::Exp,
        BinaryOp::BitAnd => BinaryOpKind::BitAnd,
        BinaryOp::BitOr => BinaryOpKind::BitOr,
        BinaryOp::BitXor => BinaryOpKind::BitXor,
        BinaryOp::Shl => BinaryOpKind::Shl,
        BinaryOp::Shr => BinaryOpKind::Shr,
        BinaryOp::UShr => BinaryOpKind::UShr,
        BinaryOp::Eq => BinaryOpKind::Eq,
        BinaryOp::NotEq => BinaryOpKind::NotEq,
        BinaryOp::StrictEq => BinaryOpKind::StrictEq,
        BinaryOp::StrictNotEq => BinaryOpKind::StrictNotEq,
        BinaryOp::LessThan => BinaryOpKind::LessThan,
        BinaryOp::LessThanOrEq => BinaryOpKind::LessThanOrEq,
        BinaryOp::GreaterThan => BinaryOpKind::GreaterThan,
        BinaryOp::GreaterThanOrEq => BinaryOpKind::GreaterThanOrEq,
        BinaryOp::In => BinaryOpKind::In,
        BinaryOp::InstanceOf => BinaryOpKind::InstanceOf,
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            unreachable!("logical operators compile to jumps")
        }
    }
}
