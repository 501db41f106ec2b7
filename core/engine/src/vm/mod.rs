//! The virtual machine: a register based, `match`-dispatched interpreter.
//!
//! Execution is strictly sequential; no instruction yields. Ordinary
//! JS-to-JS calls push a frame and stay inside one dispatch loop, so deep
//! script recursion costs no host stack. Native functions that call back
//! into scripts re-enter [`Context::run`]; the combined depth is guarded
//! and overflow surfaces as a deterministic `RangeError`.

mod call_frame;
mod code_block;
pub mod opcode;

pub use call_frame::{CallFrame, ForInIterator, PendingCompletion, TryRecord, TryState};
pub use code_block::{CodeBlock, RegExpTemplate};
pub use opcode::{BinaryOpKind, Instruction, Operand, UnaryOpKind, NO_TARGET};

use crate::{
    environments::JsEnvironment,
    error::{JsError, JsNativeError},
    object::{ArrayStorage, Function, JsObject, ObjectKind},
    property::{Attribute, PropertyDescriptor, PropertyKey, PropertyKind},
    Context, JsResult, JsString, JsValue,
};
use std::rc::Rc;

/// The call stack and transient exception slot of one context.
#[derive(Debug, Default)]
pub struct Vm {
    pub(crate) frames: Vec<CallFrame>,
    pending_exception: Option<JsError>,
}

impl Vm {
    /// Creates an empty vm.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

enum Control {
    Continue,
    Return,
}

impl Context {
    // Builds a frame for an ordinary bytecode function.
    pub(crate) fn prepare_frame(
        &mut self,
        function: &JsObject,
        this: JsValue,
        args: &[JsValue],
    ) -> JsResult<CallFrame> {
        let (code, captured_envs, captured_this, captured_arguments) = {
            let borrowed = function.borrow();
            let Some(Function::Ordinary {
                code,
                environments,
                captured_this,
                captured_arguments,
            }) = borrowed.as_function()
            else {
                return Err(JsNativeError::typ()
                    .with_message("value is not a function")
                    .into());
            };
            (
                Rc::clone(code),
                environments.to_vec(),
                captured_this.clone(),
                captured_arguments.clone(),
            )
        };

        let mut frame = CallFrame::new(Rc::clone(&code));
        frame.function = Some(function.clone());
        frame.arguments = args.to_vec().into_boxed_slice();
        frame.this = if code.arrow {
            captured_this.unwrap_or(JsValue::Undefined)
        } else {
            this
        };
        frame.arguments_object = captured_arguments;
        frame.environments.push(JsEnvironment::new(code.env_size));
        frame.environments.extend(captured_envs);
        for &(argument, slot) in code.param_copies.iter() {
            let value = frame
                .arguments
                .get(usize::from(argument))
                .cloned()
                .unwrap_or(JsValue::Undefined);
            frame.environments[0].set(slot, value);
        }
        if let Some(slot) = code.self_slot {
            frame.write(slot, JsValue::Object(function.clone()));
        }
        Ok(frame)
    }

    /// Runs the topmost frame (and everything it calls) to completion.
    pub(crate) fn run(&mut self) -> JsResult<JsValue> {
        let entry = self.vm.frames.len();
        debug_assert!(entry >= 1, "run requires a pushed frame");
        loop {
            let (instruction, pc) = {
                let frame = self.vm.frames.last_mut().expect("a frame is running");
                let pc = frame.pc;
                frame.pc += 1;
                (frame.code.instructions[pc as usize], pc)
            };
            #[cfg(feature = "trace")]
            {
                let depth = self.vm.frames.len();
                eprintln!("{depth:>3} {pc:>5} {instruction:?}");
            }
            match self.execute_instruction(instruction, pc) {
                Ok(Control::Continue) => {}
                Ok(Control::Return) => {
                    let frame = self.vm.frames.pop().expect("a frame is running");
                    let mut value = frame.retval;
                    if frame.construct && !value.is_object() {
                        value = frame.this;
                    }
                    if self.vm.frames.len() < entry {
                        return Ok(value);
                    }
                    if let Some(dst) = frame.return_dst {
                        let caller = self.vm.frames.last_mut().expect("caller frame exists");
                        caller.write(dst, value);
                    }
                }
                Err(error) => {
                    if let Some(error) = self.unwind(error, entry) {
                        return Err(error);
                    }
                }
            }
        }
    }

    // Walks the try chain of the running frames, entering a catch or
    // finally when one applies; otherwise pops frames down to (and
    // including) the entry frame and yields the error to the caller.
    fn unwind(&mut self, error: JsError, entry: usize) -> Option<JsError> {
        enum Entered {
            Catch(u32),
            Finally(u32),
            No,
        }
        let mut error = Some(error);
        loop {
            let frame = self.vm.frames.last_mut().expect("a frame is unwinding");
            let mut entered = Entered::No;
            while let Some(record) = frame.tries.last_mut() {
                if record.can_catch() {
                    record.state = TryState::Catch;
                    entered = Entered::Catch(record.catch_pc);
                    break;
                }
                if record.can_finalize() {
                    record.state = TryState::Finally;
                    record.pending =
                        PendingCompletion::Throw(error.take().expect("error is pending"));
                    entered = Entered::Finally(record.finally_pc);
                    break;
                }
                frame.tries.pop();
            }
            match entered {
                Entered::Catch(pc) => {
                    frame.pc = pc;
                    self.vm.pending_exception = error.take();
                    return None;
                }
                Entered::Finally(pc) => {
                    frame.pc = pc;
                    return None;
                }
                Entered::No => {
                    self.vm.frames.pop();
                    if self.vm.frames.len() < entry {
                        return error;
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn execute_instruction(&mut self, instruction: Instruction, pc: u32) -> JsResult<Control> {
        macro_rules! frame {
            () => {
                self.vm.frames.last().expect("a frame is running")
            };
        }
        macro_rules! frame_mut {
            () => {
                self.vm.frames.last_mut().expect("a frame is running")
            };
        }
        macro_rules! read {
            ($operand:expr) => {
                frame!().read($operand)
            };
        }
        macro_rules! write {
            ($operand:expr, $value:expr) => {{
                let value = $value;
                frame_mut!().write($operand, value);
            }};
        }

        match instruction {
            Instruction::Nop => {}
            Instruction::Move { dst, src } => write!(dst, read!(src).materialized()),
            Instruction::LoadConst { dst, index } => {
                let value = frame!().code.constant_at(index).clone();
                write!(dst, value);
            }
            Instruction::LoadUndefined { dst } => write!(dst, JsValue::Undefined),
            Instruction::LoadFunction { dst, index } => {
                let value = self.make_closure(index)?;
                write!(dst, value);
            }
            Instruction::LoadRegExp { dst, index } => {
                let template = &frame!().code.regexps[index as usize];
                let (source, flags, matcher) = (
                    template.source.clone(),
                    template.flags.clone(),
                    Rc::clone(&template.matcher),
                );
                let value = crate::builtins::regexp::from_parts(source, flags, matcher, self);
                write!(dst, JsValue::Object(value));
            }
            Instruction::GetGlobal { dst, name } => {
                let name = frame!().code.name_at(name).clone();
                let value = self.global_get(&name)?;
                write!(dst, value);
            }
            Instruction::SetGlobal { name, src } => {
                let name = frame!().code.name_at(name).clone();
                let value = read!(src);
                self.global_set(&name, value)?;
            }
            Instruction::DefineGlobal { name } => {
                let name = frame!().code.name_at(name).clone();
                self.global_declare(&name);
            }
            Instruction::TypeOfGlobal { dst, name } => {
                let name = frame!().code.name_at(name).clone();
                let value = self.global_typeof(&name)?;
                write!(dst, value);
            }
            Instruction::Binary { op, dst, lhs, rhs } => {
                let lhs = read!(lhs).materialized();
                let rhs = read!(rhs).materialized();
                let value = self.binary_op(op, &lhs, &rhs)?;
                write!(dst, value);
            }
            Instruction::Unary { op, dst, src } => {
                let value = read!(src).materialized();
                let value = match op {
                    UnaryOpKind::Neg => value.neg(self)?,
                    UnaryOpKind::Plus => JsValue::Number(value.to_number(self)?),
                    UnaryOpKind::BitNot => value.bitnot(self)?,
                    UnaryOpKind::Not => JsValue::Boolean(!value.to_boolean()),
                    UnaryOpKind::TypeOf => JsValue::from(value.type_of()),
                };
                write!(dst, value);
            }
            Instruction::ToString { dst, src } => {
                let value = read!(src).materialized();
                let value = value.to_string(self)?;
                write!(dst, JsValue::String(value));
            }
            Instruction::ToNumber { dst, src } => {
                let value = read!(src).materialized();
                let value = value.to_number(self)?;
                write!(dst, JsValue::Number(value));
            }
            Instruction::GetProperty { dst, object, key } => {
                let object = read!(object).materialized();
                let key = read!(key).materialized().to_property_key(self)?;
                let value = object.get_v(&key, self)?.materialized();
                write!(dst, value);
            }
            Instruction::GetPropertyConst { dst, object, name } => {
                let object = read!(object).materialized();
                let key = PropertyKey::from(frame!().code.name_at(name).clone());
                let value = object.get_v(&key, self)?.materialized();
                write!(dst, value);
            }
            Instruction::SetProperty { object, key, src } => {
                let object = read!(object).materialized();
                let key = read!(key).materialized().to_property_key(self)?;
                let value = read!(src).materialized();
                object.set_v(key, value, self)?;
            }
            Instruction::SetPropertyConst { object, name, src } => {
                let object = read!(object).materialized();
                let key = PropertyKey::from(frame!().code.name_at(name).clone());
                let value = read!(src).materialized();
                object.set_v(key, value, self)?;
            }
            Instruction::DeleteProperty { dst, object, key } => {
                let object = read!(object).materialized();
                let key = read!(key).materialized().to_property_key(self)?;
                let value = object.delete_v(&key, self)?;
                write!(dst, JsValue::Boolean(value));
            }
            Instruction::DeletePropertyConst { dst, object, name } => {
                let object = read!(object).materialized();
                let key = PropertyKey::from(frame!().code.name_at(name).clone());
                let value = object.delete_v(&key, self)?;
                write!(dst, JsValue::Boolean(value));
            }
            Instruction::DefineDataConst { object, name, src } => {
                let object = read!(object);
                let key = PropertyKey::from(frame!().code.name_at(name).clone());
                let value = read!(src).materialized();
                if let JsValue::Object(object) = object {
                    object.insert(
                        key,
                        PropertyDescriptor::data(
                            value,
                            Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::CONFIGURABLE,
                        ),
                    );
                }
            }
            Instruction::DefineGetter { object, name, function }
            | Instruction::DefineSetter { object, name, function } => {
                let is_getter = matches!(instruction, Instruction::DefineGetter { .. });
                let object = read!(object);
                let key = PropertyKey::from(frame!().code.name_at(name).clone());
                let accessor = read!(function);
                if let (JsValue::Object(object), JsValue::Object(accessor)) = (object, accessor) {
                    define_literal_accessor(&object, key, accessor, is_getter);
                }
            }
            Instruction::NewObject { dst } => {
                let object = self.object_new();
                write!(dst, JsValue::Object(object));
            }
            Instruction::NewArray { dst, capacity } => {
                let array = self.array_from(Vec::with_capacity(capacity as usize));
                write!(dst, JsValue::Object(array));
            }
            Instruction::Append { array, src } => {
                let value = read!(src).materialized();
                let array = read!(array);
                if let Some(object) = array.as_object() {
                    if let Some(storage) = object.borrow_mut().as_array_mut() {
                        storage.push(value);
                    }
                }
            }
            Instruction::AppendHole { array } => {
                let array = read!(array);
                if let Some(object) = array.as_object() {
                    if let Some(storage) = object.borrow_mut().as_array_mut() {
                        storage.push_hole();
                    }
                }
            }
            Instruction::AppendSpread { array, src } => {
                let source = read!(src).materialized();
                let values = self.spread_values(&source)?;
                let array = read!(array);
                if let Some(object) = array.as_object() {
                    if let Some(storage) = object.borrow_mut().as_array_mut() {
                        for value in values {
                            storage.push(value);
                        }
                    }
                }
            }
            Instruction::RestArguments { dst, start } => {
                let values: Vec<JsValue> = frame!()
                    .arguments
                    .iter()
                    .skip(usize::from(start))
                    .cloned()
                    .collect();
                let array = self.array_from(values);
                write!(dst, JsValue::Object(array));
            }
            Instruction::CopyRest { dst, src, start } => {
                let source = read!(src).materialized();
                let values = self.spread_values(&source)?;
                let rest: Vec<JsValue> = values.into_iter().skip(start as usize).collect();
                let array = self.array_from(rest);
                write!(dst, JsValue::Object(array));
            }
            Instruction::Call {
                dst,
                function,
                this_value,
                argv,
                argc,
            } => {
                let function = read!(function).materialized();
                let this = read!(this_value).materialized();
                let args = self.collect_arguments(argv, argc);
                return self.dispatch_call(dst, &function, &this, args, None);
            }
            Instruction::CallMethod {
                dst,
                object,
                name,
                argv,
                argc,
            } => {
                let this = read!(object).materialized();
                let name = frame!().code.name_at(name).clone();
                let key = PropertyKey::from(name.clone());
                let function = this.get_v(&key, self)?.materialized();
                let args = self.collect_arguments(argv, argc);
                return self.dispatch_call(dst, &function, &this, args, Some(name));
            }
            Instruction::CallVarargs {
                dst,
                function,
                this_value,
                args,
            } => {
                let function = read!(function).materialized();
                let this = read!(this_value).materialized();
                let args = self.spread_values(&read!(args).materialized())?;
                return self.dispatch_call(dst, &function, &this, args, None);
            }
            Instruction::New {
                dst,
                function,
                argv,
                argc,
            } => {
                let function = read!(function).materialized();
                let args = self.collect_arguments(argv, argc);
                let value = self.construct(&function, &args)?;
                write!(dst, value);
            }
            Instruction::NewVarargs { dst, function, args } => {
                let function = read!(function).materialized();
                let args = self.spread_values(&read!(args).materialized())?;
                let value = self.construct(&function, &args)?;
                write!(dst, value);
            }
            Instruction::GetArguments { dst } => {
                let value = self.materialize_arguments()?;
                write!(dst, value);
            }
            Instruction::ImportModule { dst, name } => {
                let specifier = frame!().code.name_at(name).clone();
                let value =
                    crate::builtins::load_module(&specifier.to_std_string_lossy(), self)?;
                write!(dst, value);
            }
            Instruction::Return { src } => {
                let value = read!(src).materialized();
                frame_mut!().retval = value;
                return Ok(Control::Return);
            }
            Instruction::Throw { src } => {
                let value = read!(src).materialized();
                return Err(JsError::from_value(value));
            }
            Instruction::Jump { target } => frame_mut!().pc = target,
            Instruction::JumpIfFalse { cond, target } => {
                if !read!(cond).to_boolean() {
                    frame_mut!().pc = target;
                }
            }
            Instruction::JumpIfTrue { cond, target } => {
                if read!(cond).to_boolean() {
                    frame_mut!().pc = target;
                }
            }
            Instruction::CaseJump { lhs, rhs, target } => {
                if read!(lhs).materialized().strict_equals(&read!(rhs).materialized()) {
                    frame_mut!().pc = target;
                }
            }
            Instruction::TryStart { catch, finally, end } => {
                frame_mut!().tries.push(TryRecord {
                    start_pc: pc,
                    catch_pc: catch,
                    finally_pc: finally,
                    end_pc: end,
                    state: TryState::Try,
                    pending: PendingCompletion::Normal,
                });
            }
            Instruction::Catch { dst } => {
                let error = self
                    .vm
                    .pending_exception
                    .take()
                    .expect("catch entered with a pending exception");
                let value = error.to_value(self);
                write!(dst, value);
            }
            Instruction::TryEnd => {
                let frame = frame_mut!();
                let finally_pc = {
                    let record = frame.tries.last_mut().expect("an open try record");
                    if record.can_finalize() {
                        record.state = TryState::Finally;
                        record.pending = PendingCompletion::Normal;
                        Some(record.finally_pc)
                    } else {
                        None
                    }
                };
                match finally_pc {
                    Some(pc) => frame.pc = pc,
                    None => {
                        frame.tries.pop();
                    }
                }
            }
            Instruction::TryJump { target } => {
                let frame = frame_mut!();
                let finally_pc = {
                    let record = frame.tries.last_mut().expect("an open try record");
                    record.state = TryState::Finally;
                    record.pending = PendingCompletion::Jump(target);
                    record.finally_pc
                };
                frame.pc = finally_pc;
            }
            Instruction::TryReturn { src } => {
                let value = read!(src).materialized();
                let frame = frame_mut!();
                frame.retval = value;
                let finally_pc = {
                    let record = frame.tries.last_mut().expect("an open try record");
                    record.state = TryState::Finally;
                    record.pending = PendingCompletion::Return;
                    record.finally_pc
                };
                frame.pc = finally_pc;
            }
            Instruction::FinallyEnd => {
                return self.finally_end();
            }
            Instruction::ForInInit { object } => {
                let target = read!(object).materialized();
                let keys = self.enumerate_keys(&target)?;
                frame_mut!().iterators.push(ForInIterator {
                    keys,
                    index: 0,
                    target,
                });
            }
            Instruction::ForInNext { dst, exit } => {
                loop {
                    let (key, done) = {
                        let frame = frame_mut!();
                        let iterator = frame.iterators.last_mut().expect("an open iterator");
                        match iterator.keys.get(iterator.index) {
                            Some(key) => {
                                iterator.index += 1;
                                (Some((key.clone(), iterator.target.clone())), false)
                            }
                            None => (None, true),
                        }
                    };
                    if done {
                        frame_mut!().pc = exit;
                        break;
                    }
                    let (key, target) = key.expect("key present unless done");
                    // Keys deleted mid-loop are skipped.
                    let alive = match &target {
                        JsValue::Object(object) => object.has_property(&key),
                        JsValue::External(external) => external.has(&key, self)?,
                        _ => true,
                    };
                    if alive {
                        write!(dst, JsValue::String(key.to_js_string()));
                        break;
                    }
                }
            }
            Instruction::ForInDone => {
                frame_mut!().iterators.pop();
            }
        }
        Ok(Control::Continue)
    }

    fn binary_op(&mut self, op: BinaryOpKind, lhs: &JsValue, rhs: &JsValue) -> JsResult<JsValue> {
        match op {
            BinaryOpKind::Add => lhs.add(rhs, self),
            BinaryOpKind::Sub => lhs.sub(rhs, self),
            BinaryOpKind::Mul => lhs.mul(rhs, self),
            BinaryOpKind::Div => lhs.div(rhs, self),
            BinaryOpKind::Mod => lhs.rem(rhs, self),
            BinaryOpKind::Exp => lhs.pow(rhs, self),
            BinaryOpKind::BitAnd => lhs.bitand(rhs, self),
            BinaryOpKind::BitOr => lhs.bitor(rhs, self),
            BinaryOpKind::BitXor => lhs.bitxor(rhs, self),
            BinaryOpKind::Shl => lhs.shl(rhs, self),
            BinaryOpKind::Shr => lhs.shr(rhs, self),
            BinaryOpKind::UShr => lhs.ushr(rhs, self),
            BinaryOpKind::Eq => Ok(JsValue::Boolean(lhs.equals(rhs, self)?)),
            BinaryOpKind::NotEq => Ok(JsValue::Boolean(!lhs.equals(rhs, self)?)),
            BinaryOpKind::StrictEq => Ok(JsValue::Boolean(lhs.strict_equals(rhs))),
            BinaryOpKind::StrictNotEq => Ok(JsValue::Boolean(!lhs.strict_equals(rhs))),
            BinaryOpKind::LessThan => lhs.lt(rhs, self),
            BinaryOpKind::LessThanOrEq => lhs.le(rhs, self),
            BinaryOpKind::GreaterThan => lhs.gt(rhs, self),
            BinaryOpKind::GreaterThanOrEq => lhs.ge(rhs, self),
            BinaryOpKind::In => {
                let key = lhs.to_property_key(self)?;
                Ok(JsValue::Boolean(rhs.has_property_v(&key, self)?))
            }
            BinaryOpKind::InstanceOf => Ok(JsValue::Boolean(lhs.instance_of(rhs, self)?)),
        }
    }

    // Calls with an ordinary bytecode callee push a frame and stay in this
    // dispatch loop; everything else goes through the context call path.
    fn dispatch_call(
        &mut self,
        dst: Operand,
        function: &JsValue,
        this: &JsValue,
        args: Vec<JsValue>,
        method_name: Option<JsString>,
    ) -> JsResult<Control> {
        let Some(object) = function.as_callable() else {
            let message = match method_name {
                Some(name) => format!("{name} is not a function"),
                None => format!("{} is not a function", function.display()),
            };
            return Err(JsNativeError::typ().with_message(message).into());
        };
        let is_ordinary = matches!(
            object.borrow().as_function(),
            Some(Function::Ordinary { .. })
        );
        if is_ordinary {
            if self.call_depth + self.vm.frames.len() >= self.recursion_limit {
                return Err(JsNativeError::range()
                    .with_message("Maximum call stack size exceeded")
                    .into());
            }
            let mut frame = self.prepare_frame(&object.clone(), this.clone(), &args)?;
            frame.return_dst = Some(dst);
            self.vm.frames.push(frame);
            return Ok(Control::Continue);
        }
        let object = object.clone();
        let value = self.call_object(&object, this, &args)?;
        let frame = self.vm.frames.last_mut().expect("a frame is running");
        frame.write(dst, value);
        Ok(Control::Continue)
    }

    fn collect_arguments(&self, argv: u16, argc: u16) -> Vec<JsValue> {
        let frame = self.vm.frames.last().expect("a frame is running");
        (argv..argv + argc)
            .map(|register| frame.registers[usize::from(register)].clone().materialized())
            .collect()
    }

    fn make_closure(&mut self, index: u32) -> JsResult<JsValue> {
        let (template, environments, this, arrow) = {
            let frame = self.vm.frames.last().expect("a frame is running");
            let template = Rc::clone(&frame.code.functions[index as usize]);
            let arrow = template.arrow;
            (
                template,
                frame.environments.clone(),
                frame.this.clone(),
                arrow,
            )
        };
        let captured_arguments = if arrow && template.uses_arguments {
            match self.materialize_arguments()? {
                JsValue::Object(object) => Some(object),
                _ => None,
            }
        } else {
            None
        };
        let function = Function::Ordinary {
            code: template,
            environments: environments.into_boxed_slice(),
            captured_this: arrow.then_some(this),
            captured_arguments,
        };
        let object = JsObject::new(
            ObjectKind::Function(function),
            Some(self.standard_objects().function().prototype()),
        );
        let table = if arrow {
            self.realm().arrow_instance_table()
        } else {
            self.realm().function_instance_table()
        };
        object.borrow_mut().set_shared_properties(table);
        Ok(JsValue::Object(object))
    }

    // The `arguments` object: array-like own indices plus the restricted
    // callee/caller handlers from the shared instance table.
    fn materialize_arguments(&mut self) -> JsResult<JsValue> {
        if let Some(object) = self
            .vm
            .frames
            .last()
            .and_then(|frame| frame.arguments_object.clone())
        {
            return Ok(JsValue::Object(object));
        }
        let values: Vec<JsValue> = self
            .vm
            .frames
            .last()
            .map(|frame| frame.arguments.to_vec())
            .unwrap_or_default();
        let object = JsObject::ordinary(Some(self.standard_objects().object().prototype()));
        object
            .borrow_mut()
            .set_shared_properties(self.realm().arguments_instance_table());
        for (index, value) in values.iter().enumerate() {
            object.insert_property(
                PropertyKey::from(index),
                value.clone(),
                Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::CONFIGURABLE,
            );
        }
        object.insert_property(
            "length",
            values.len(),
            Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
        );
        if let Some(frame) = self.vm.frames.last_mut() {
            frame.arguments_object = Some(object.clone());
        }
        Ok(JsValue::Object(object))
    }

    fn finally_end(&mut self) -> JsResult<Control> {
        let pending = {
            let frame = self.vm.frames.last_mut().expect("a frame is running");
            let record = frame.tries.pop().expect("an open try record");
            record.pending
        };
        match pending {
            PendingCompletion::Normal => Ok(Control::Continue),
            PendingCompletion::Throw(error) => Err(error),
            PendingCompletion::Return => {
                let frame = self.vm.frames.last_mut().expect("a frame is running");
                loop {
                    let finally_pc = {
                        let Some(record) = frame.tries.last_mut() else {
                            return Ok(Control::Return);
                        };
                        if record.can_finalize() {
                            record.state = TryState::Finally;
                            record.pending = PendingCompletion::Return;
                            Some(record.finally_pc)
                        } else {
                            None
                        }
                    };
                    match finally_pc {
                        Some(pc) => {
                            frame.pc = pc;
                            return Ok(Control::Continue);
                        }
                        None => {
                            frame.tries.pop();
                        }
                    }
                }
            }
            PendingCompletion::Jump(target) => {
                let frame = self.vm.frames.last_mut().expect("a frame is running");
                loop {
                    enum Step {
                        Land,
                        Finalize(u32),
                        Pop,
                    }
                    let step = {
                        let Some(record) = frame.tries.last_mut() else {
                            frame.pc = target;
                            return Ok(Control::Continue);
                        };
                        let outside = target < record.start_pc || target >= record.end_pc;
                        if !outside {
                            Step::Land
                        } else if record.can_finalize() {
                            record.state = TryState::Finally;
                            record.pending = PendingCompletion::Jump(target);
                            Step::Finalize(record.finally_pc)
                        } else {
                            Step::Pop
                        }
                    };
                    match step {
                        Step::Land => {
                            frame.pc = target;
                            return Ok(Control::Continue);
                        }
                        Step::Finalize(pc) => {
                            frame.pc = pc;
                            return Ok(Control::Continue);
                        }
                        Step::Pop => {
                            frame.tries.pop();
                        }
                    }
                }
            }
        }
    }

    // Spread semantics over arrays, strings and array-likes.
    pub(crate) fn spread_values(&mut self, source: &JsValue) -> JsResult<Vec<JsValue>> {
        match source {
            JsValue::Object(object) => {
                if object.is_array() {
                    let length = {
                        let borrowed = object.borrow();
                        borrowed.as_array().map_or(0, ArrayStorage::length)
                    };
                    let mut values = Vec::with_capacity(length as usize);
                    for index in 0..length {
                        values.push(
                            object
                                .get(&PropertyKey::Index(index), self)?
                                .materialized(),
                        );
                    }
                    return Ok(values);
                }
                // Array-likes spread by length.
                let length_key = PropertyKey::from("length");
                if object.has_property(&length_key) {
                    let length = object.get(&length_key, self)?.to_length(self)?;
                    let mut values = Vec::new();
                    for index in 0..length {
                        values.push(
                            object
                                .get(&PropertyKey::from(index as usize), self)?
                                .materialized(),
                        );
                    }
                    return Ok(values);
                }
                Err(JsNativeError::typ()
                    .with_message("spread source is not iterable")
                    .into())
            }
            JsValue::String(string) => Ok(string
                .code_points()
                .map(|cp| JsValue::String(JsString::from_code_point(cp)))
                .collect()),
            _ => Err(JsNativeError::typ()
                .with_message("spread source is not iterable")
                .into()),
        }
    }

    // The snapshot of `for…in` keys: own-then-inherited enumerable string
    // keys in insertion order, shadowed names suppressed.
    fn enumerate_keys(&mut self, target: &JsValue) -> JsResult<Vec<PropertyKey>> {
        match target {
            JsValue::Object(object) => {
                let mut keys = Vec::new();
                let mut seen: Vec<PropertyKey> = Vec::new();
                let mut cursor = Some(object.clone());
                while let Some(object) = cursor {
                    for (key, enumerable) in object.own_keys_with_enumerability(false) {
                        if seen.contains(&key) {
                            continue;
                        }
                        seen.push(key.clone());
                        if enumerable {
                            keys.push(key);
                        }
                    }
                    cursor = object.prototype();
                }
                Ok(keys)
            }
            JsValue::External(external) => Ok(external
                .keys(self)?
                .into_iter()
                .map(PropertyKey::from)
                .collect()),
            JsValue::String(string) => {
                Ok((0..string.len()).map(PropertyKey::from).collect())
            }
            _ => Ok(Vec::new()),
        }
    }
}

// Object literal accessors merge getter/setter halves under one key.
fn define_literal_accessor(object: &JsObject, key: PropertyKey, accessor: JsObject, getter: bool) {
    let mut borrowed = object.borrow_mut();
    let existing = borrowed.properties_mut().get_mut(&key);
    if let Some(descriptor) = existing {
        if let PropertyKind::Accessor { get, set } = descriptor.kind() {
            let (mut get, mut set) = (get.clone(), set.clone());
            if getter {
                get = Some(accessor);
            } else {
                set = Some(accessor);
            }
            descriptor.set_kind(PropertyKind::Accessor { get, set });
            return;
        }
    }
    let (get, set) = if getter {
        (Some(accessor), None)
    } else {
        (None, Some(accessor))
    };
    borrowed.insert(
        key,
        PropertyDescriptor::accessor(
            get,
            set,
            Attribute::ENUMERABLE | Attribute::CONFIGURABLE,
        ),
    );
}
