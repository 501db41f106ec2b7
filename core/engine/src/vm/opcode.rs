//! The instruction set of the vm.
//!
//! The machine is register based: every instruction is a fixed-size value
//! naming its operands explicitly, and the operand space is typed — a slot
//! is a frame local, an argument, a closure slot, `this` or the frame's
//! return value register.

/// A typed operand of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A frame-local register (variables and temporaries).
    Local(u16),
    /// A slot of the argument window.
    Argument(u16),
    /// A slot of a closure environment. Level 0 is the frame's own
    /// environment; higher levels walk the captured chain.
    Closure {
        /// Environments up the chain.
        level: u16,
        /// Slot inside that environment.
        slot: u16,
    },
    /// The `this` value of the frame.
    This,
    /// The return value register of the frame. The top level frame's
    /// completion value accumulates here.
    Retval,
}

/// Binary operations dispatched by [`Instruction::Binary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpKind {
    /// `+` (numeric addition or string concatenation)
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Exp,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNotEq,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEq,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEq,
    /// `in`
    In,
    /// `instanceof`
    InstanceOf,
}

/// Unary operations dispatched by [`Instruction::Unary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    /// `-a`
    Neg,
    /// `+a` (`ToNumber`)
    Plus,
    /// `~a`
    BitNot,
    /// `!a`
    Not,
    /// `typeof a`
    TypeOf,
}

/// Sentinel for an absent jump target in try descriptors.
pub const NO_TARGET: u32 = u32::MAX;

/// One instruction of the vm.
#[derive(Debug, Clone, Copy)]
pub enum Instruction {
    /// `dst = src`
    Move {
        /// Destination.
        dst: Operand,
        /// Source.
        src: Operand,
    },
    /// `dst = constants[index]`
    LoadConst {
        /// Destination.
        dst: Operand,
        /// Index into the constant pool.
        index: u32,
    },
    /// `dst = undefined`
    LoadUndefined {
        /// Destination.
        dst: Operand,
    },
    /// `dst = closure of functions[index]` capturing the current frame.
    LoadFunction {
        /// Destination.
        dst: Operand,
        /// Index into the function template table.
        index: u32,
    },
    /// `dst = new RegExp` from the pre-compiled literal `regexps[index]`.
    LoadRegExp {
        /// Destination.
        dst: Operand,
        /// Index into the regexp literal table.
        index: u32,
    },
    /// `dst = global[names[name]]`, throwing `ReferenceError` when absent.
    GetGlobal {
        /// Destination.
        dst: Operand,
        /// Index into the name table.
        name: u32,
    },
    /// `global[names[name]] = src`, throwing `ReferenceError` when the
    /// binding was never declared.
    SetGlobal {
        /// Index into the name table.
        name: u32,
        /// Source.
        src: Operand,
    },
    /// Declares a global binding (hoisted `var`/`function` at top level).
    DefineGlobal {
        /// Index into the name table.
        name: u32,
    },
    /// `dst = typeof global[names[name]]` without throwing.
    TypeOfGlobal {
        /// Destination.
        dst: Operand,
        /// Index into the name table.
        name: u32,
    },
    /// `dst = lhs <op> rhs`
    Binary {
        /// The operation.
        op: BinaryOpKind,
        /// Destination.
        dst: Operand,
        /// Left operand.
        lhs: Operand,
        /// Right operand.
        rhs: Operand,
    },
    /// `dst = <op> src`
    Unary {
        /// The operation.
        op: UnaryOpKind,
        /// Destination.
        dst: Operand,
        /// Operand.
        src: Operand,
    },
    /// `dst = ToString(src)`
    ToString {
        /// Destination.
        dst: Operand,
        /// Operand.
        src: Operand,
    },
    /// `dst = ToNumber(src)`
    ToNumber {
        /// Destination.
        dst: Operand,
        /// Operand.
        src: Operand,
    },
    /// `dst = object[key]`
    GetProperty {
        /// Destination.
        dst: Operand,
        /// The read object.
        object: Operand,
        /// The key value.
        key: Operand,
    },
    /// `dst = object.names[name]`
    GetPropertyConst {
        /// Destination.
        dst: Operand,
        /// The read object.
        object: Operand,
        /// Index into the name table.
        name: u32,
    },
    /// `object[key] = src`
    SetProperty {
        /// The written object.
        object: Operand,
        /// The key value.
        key: Operand,
        /// Source.
        src: Operand,
    },
    /// `object.names[name] = src`
    SetPropertyConst {
        /// The written object.
        object: Operand,
        /// Index into the name table.
        name: u32,
        /// Source.
        src: Operand,
    },
    /// `dst = delete object[key]`
    DeleteProperty {
        /// Destination for the boolean result.
        dst: Operand,
        /// The object.
        object: Operand,
        /// The key value.
        key: Operand,
    },
    /// `dst = delete object.names[name]`
    DeletePropertyConst {
        /// Destination for the boolean result.
        dst: Operand,
        /// The object.
        object: Operand,
        /// Index into the name table.
        name: u32,
    },
    /// Installs an own enumerable data property (object literals).
    DefineDataConst {
        /// The object under construction.
        object: Operand,
        /// Index into the name table.
        name: u32,
        /// The value.
        src: Operand,
    },
    /// Installs a getter from an object literal.
    DefineGetter {
        /// The object under construction.
        object: Operand,
        /// Index into the name table.
        name: u32,
        /// The getter function.
        function: Operand,
    },
    /// Installs a setter from an object literal.
    DefineSetter {
        /// The object under construction.
        object: Operand,
        /// Index into the name table.
        name: u32,
        /// The setter function.
        function: Operand,
    },
    /// `dst = {}`
    NewObject {
        /// Destination.
        dst: Operand,
    },
    /// `dst = []` with a capacity hint.
    NewArray {
        /// Destination.
        dst: Operand,
        /// Expected element count.
        capacity: u32,
    },
    /// Appends one element to an array literal under construction.
    Append {
        /// The array.
        array: Operand,
        /// The element.
        src: Operand,
    },
    /// Appends a hole to an array literal under construction.
    AppendHole {
        /// The array.
        array: Operand,
    },
    /// Spreads `src` into an array literal under construction.
    AppendSpread {
        /// The array.
        array: Operand,
        /// The spread value.
        src: Operand,
    },
    /// Collects `arguments[start..]` into a fresh array (rest parameter).
    RestArguments {
        /// Destination.
        dst: Operand,
        /// First argument index collected.
        start: u16,
    },
    /// Collects `src[start..]` into a fresh array (destructuring rest).
    CopyRest {
        /// Destination.
        dst: Operand,
        /// The source array-like.
        src: Operand,
        /// First index collected.
        start: u32,
    },
    /// `dst = function.call(this_value, locals[argv..argv+argc])`
    Call {
        /// Destination for the result.
        dst: Operand,
        /// The callee.
        function: Operand,
        /// The `this` value.
        this_value: Operand,
        /// First local register of the argument block.
        argv: u16,
        /// Argument count.
        argc: u16,
    },
    /// `dst = object.names[name](locals[argv..argv+argc])` with
    /// `this = object`.
    CallMethod {
        /// Destination for the result.
        dst: Operand,
        /// The receiver.
        object: Operand,
        /// Method name index into the name table.
        name: u32,
        /// First local register of the argument block.
        argv: u16,
        /// Argument count.
        argc: u16,
    },
    /// `dst = function.apply(this_value, args)` where `args` is an array
    /// built by spread evaluation.
    CallVarargs {
        /// Destination for the result.
        dst: Operand,
        /// The callee.
        function: Operand,
        /// The `this` value.
        this_value: Operand,
        /// The argument array.
        args: Operand,
    },
    /// `dst = new function(locals[argv..argv+argc])`
    New {
        /// Destination for the result.
        dst: Operand,
        /// The constructor.
        function: Operand,
        /// First local register of the argument block.
        argv: u16,
        /// Argument count.
        argc: u16,
    },
    /// `dst = new function(...args)` with an array of arguments.
    NewVarargs {
        /// Destination for the result.
        dst: Operand,
        /// The constructor.
        function: Operand,
        /// The argument array.
        args: Operand,
    },
    /// Materialises (or fetches) the `arguments` object of the frame.
    GetArguments {
        /// Destination.
        dst: Operand,
    },
    /// Loads (and caches) a built-in host module by specifier.
    ImportModule {
        /// Destination.
        dst: Operand,
        /// Specifier index into the name table.
        name: u32,
    },
    /// Returns `src` to the caller.
    Return {
        /// The returned value.
        src: Operand,
    },
    /// Throws `src`.
    Throw {
        /// The thrown value.
        src: Operand,
    },
    /// Unconditional jump.
    Jump {
        /// Target pc.
        target: u32,
    },
    /// Jumps when `cond` is falsy.
    JumpIfFalse {
        /// The tested value.
        cond: Operand,
        /// Target pc.
        target: u32,
    },
    /// Jumps when `cond` is truthy.
    JumpIfTrue {
        /// The tested value.
        cond: Operand,
        /// Target pc.
        target: u32,
    },
    /// Jumps when `lhs === rhs` (switch dispatch).
    CaseJump {
        /// The discriminant.
        lhs: Operand,
        /// The case test value.
        rhs: Operand,
        /// Target pc.
        target: u32,
    },
    /// Opens a protected region. `catch`/`finally` are entry points
    /// ([`NO_TARGET`] when absent), `end` is the first pc after the whole
    /// statement, used to detect jumps that leave the region.
    TryStart {
        /// Catch entry point.
        catch: u32,
        /// Finally entry point.
        finally: u32,
        /// First pc after the try statement.
        end: u32,
    },
    /// First instruction of a catch block: stores the pending exception.
    Catch {
        /// Where the exception value lands.
        dst: Operand,
    },
    /// Normal completion of the protected region (and of a catch block):
    /// pops the record, entering `finally` if the region has one.
    TryEnd,
    /// A `break`/`continue` leaving the region: records the target as the
    /// pending completion and enters `finally`.
    TryJump {
        /// Final jump target after the finally chain runs.
        target: u32,
    },
    /// A `return` leaving the region: stores the value in the retval
    /// register, records the pending return and enters `finally`.
    TryReturn {
        /// The returned value.
        src: Operand,
    },
    /// End of a finally block: resolves the pending completion.
    FinallyEnd,
    /// Pushes a `for…in` key iterator over `object`.
    ForInInit {
        /// The enumerated object.
        object: Operand,
    },
    /// Stores the next key in `dst`, or jumps to `exit` when exhausted.
    ForInNext {
        /// Where the key lands.
        dst: Operand,
        /// Exit target when iteration is done.
        exit: u32,
    },
    /// Pops the current `for…in` iterator.
    ForInDone,
    /// Does nothing.
    Nop,
}
