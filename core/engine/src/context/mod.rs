//! The JavaScript context: one cloned world plus its virtual machine.
//!
//! A `Context` is the primary way to interact with the engine. Creating one
//! clones the shared world into a fresh realm; each context is then fully
//! independent and must stay on its creating thread.

use crate::{
    builtins,
    bytecompiler::ByteCompiler,
    error::JsNativeError,
    external::{ExternalPrototype, JsExternal},
    object::{ArrayStorage, Function, JsObject, NativeClosure, ObjectKind},
    property::{Attribute, PropertyKey},
    realm::{Realm, StandardObjects},
    shared::SharedWorld,
    symbol::WellKnownSymbol,
    vm::{CallFrame, CodeBlock, Vm},
    JsResult, JsString, JsSymbol, JsValue,
};
use adder_parser::{ParserOptions, Source};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Builder for a [`Context`] with non-default options.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    sandbox: bool,
    module: bool,
    unsafe_eval: bool,
    denormals: bool,
    argv: Vec<String>,
    recursion_limit: usize,
    max_nesting: u32,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            sandbox: false,
            module: false,
            unsafe_eval: false,
            denormals: true,
            argv: Vec::new(),
            recursion_limit: 512,
            max_nesting: 256,
        }
    }
}

impl ContextBuilder {
    /// Creates a builder with the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips host modules marked as sandboxed (`fs`).
    #[must_use]
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Treats sources as modules: top level `import`/`export` allowed.
    #[must_use]
    pub fn module(mut self, module: bool) -> Self {
        self.module = module;
        self
    }

    /// Allows constructs the safety policy otherwise forbids (currently
    /// the `Function` constructor).
    #[must_use]
    pub fn unsafe_eval(mut self, unsafe_eval: bool) -> Self {
        self.unsafe_eval = unsafe_eval;
        self
    }

    /// Keeps subnormal numbers instead of flushing them to zero.
    #[must_use]
    pub fn denormals(mut self, denormals: bool) -> Self {
        self.denormals = denormals;
        self
    }

    /// Sets `process.argv`.
    #[must_use]
    pub fn argv(mut self, argv: Vec<String>) -> Self {
        self.argv = argv;
        self
    }

    /// Sets the call nesting limit guarded by the vm.
    #[must_use]
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Sets the parser's function nesting limit.
    #[must_use]
    pub fn max_nesting(mut self, limit: u32) -> Self {
        self.max_nesting = limit;
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> Context {
        Context::with_builder(self)
    }
}

/// The JavaScript context.
pub struct Context {
    realm: Realm,
    pub(crate) vm: Vm,
    shared: Rc<SharedWorld>,
    pub(crate) sandbox: bool,
    module: bool,
    pub(crate) unsafe_eval: bool,
    denormals: bool,
    pub(crate) argv: Vec<String>,
    pub(crate) recursion_limit: usize,
    max_nesting: u32,
    well_known: [JsSymbol; 13],
    pub(crate) symbol_registry: FxHashMap<JsString, JsSymbol>,
    memory_error: Option<JsValue>,
    retval: JsValue,
    pub(crate) timer_hook: Option<NativeClosure>,
    pub(crate) modules: FxHashMap<String, JsValue>,
    pub(crate) call_depth: usize,
    constructing: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("sandbox", &self.sandbox)
            .field("module", &self.module)
            .field("unsafe_eval", &self.unsafe_eval)
            .finish_non_exhaustive()
    }
}

impl Default for Context {
    fn default() -> Self {
        ContextBuilder::default().build()
    }
}

impl Context {
    /// Creates a context with the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a context with custom options.
    #[must_use]
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    fn with_builder(builder: ContextBuilder) -> Self {
        let well_known = [
            JsSymbol::well_known(WellKnownSymbol::AsyncIterator),
            JsSymbol::well_known(WellKnownSymbol::HasInstance),
            JsSymbol::well_known(WellKnownSymbol::IsConcatSpreadable),
            JsSymbol::well_known(WellKnownSymbol::Iterator),
            JsSymbol::well_known(WellKnownSymbol::Match),
            JsSymbol::well_known(WellKnownSymbol::MatchAll),
            JsSymbol::well_known(WellKnownSymbol::Replace),
            JsSymbol::well_known(WellKnownSymbol::Search),
            JsSymbol::well_known(WellKnownSymbol::Species),
            JsSymbol::well_known(WellKnownSymbol::Split),
            JsSymbol::well_known(WellKnownSymbol::ToPrimitive),
            JsSymbol::well_known(WellKnownSymbol::ToStringTag),
            JsSymbol::well_known(WellKnownSymbol::Unscopables),
        ];
        let mut context = Self {
            realm: Realm::new(),
            vm: Vm::new(),
            shared: SharedWorld::get(),
            sandbox: builder.sandbox,
            module: builder.module,
            unsafe_eval: builder.unsafe_eval,
            denormals: builder.denormals,
            argv: builder.argv,
            recursion_limit: builder.recursion_limit,
            max_nesting: builder.max_nesting,
            well_known,
            symbol_registry: FxHashMap::default(),
            memory_error: None,
            retval: JsValue::Undefined,
            timer_hook: None,
            modules: FxHashMap::default(),
            call_depth: 0,
            constructing: false,
        };
        builtins::init(&mut context);
        context.memory_error = Some(builtins::error::build_memory_error(&mut context));
        context
    }

    /// The realm of the context.
    #[must_use]
    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// The standard constructors of the realm.
    #[must_use]
    pub fn standard_objects(&self) -> &StandardObjects {
        self.realm.standard_objects()
    }

    /// The global object.
    #[must_use]
    pub fn global_object(&self) -> JsObject {
        self.realm.global_object()
    }

    /// The shared world this context was cloned from.
    #[must_use]
    pub fn shared_world(&self) -> &SharedWorld {
        &self.shared
    }

    /// The cached well-known symbol instance.
    #[must_use]
    pub fn well_known_symbol(&self, which: WellKnownSymbol) -> JsSymbol {
        self.well_known[which.index()].clone()
    }

    /// The pre-allocated `MemoryError` instance.
    #[must_use]
    pub fn memory_error(&self) -> JsValue {
        self.memory_error
            .clone()
            .expect("memory error is built during init")
    }

    /// `true` while a native constructor is being invoked through `new`;
    /// reading the flag consumes it so nested calls see a clean state.
    pub(crate) fn take_constructing(&mut self) -> bool {
        std::mem::take(&mut self.constructing)
    }

    /// Flushes subnormals to zero when denormal support is off.
    #[must_use]
    pub fn canonicalize_number(&self, number: f64) -> f64 {
        if !self.denormals && number.is_subnormal() {
            return 0.0_f64.copysign(number);
        }
        number
    }

    /// Installs the hook backing `setTimeout`/`setImmediate`. Without one,
    /// the timer globals throw `InternalError`.
    pub fn set_timer_hook(&mut self, hook: NativeClosure) {
        self.timer_hook = Some(hook);
    }

    /// Parses and compiles a source, returning the top level code.
    pub fn compile(&mut self, source: &str) -> JsResult<Rc<CodeBlock>> {
        let options = ParserOptions {
            module: self.module,
            denormals: self.denormals,
            max_nesting: self.max_nesting,
        };
        let script = adder_parser::parse(Source::from_bytes(source), options)
            .map_err(|err| JsNativeError::syntax().with_message(err.to_string()))?;
        let code = ByteCompiler::compile_script(&script)?;
        Ok(Rc::new(code))
    }

    /// Executes compiled top level code, returning (and remembering) its
    /// completion value.
    pub fn execute(&mut self, code: Rc<CodeBlock>) -> JsResult<JsValue> {
        let mut frame = CallFrame::new(code);
        frame.this = JsValue::Object(self.global_object());
        frame
            .environments
            .push(crate::environments::JsEnvironment::new(frame.code.env_size));
        self.vm.frames.push(frame);
        let result = self.run();
        if let Ok(value) = &result {
            self.retval = value.clone();
        }
        result
    }

    /// Compiles and executes a source.
    pub fn eval(&mut self, source: &str) -> JsResult<JsValue> {
        let code = self.compile(source)?;
        self.execute(code)
    }

    /// The completion value of the last execution.
    #[must_use]
    pub fn retval(&self) -> JsValue {
        self.retval.clone()
    }

    /// The completion value of the last execution, as a string.
    pub fn retval_string(&mut self) -> JsResult<JsString> {
        let retval = self.retval();
        retval.to_string(self)
    }

    /// Installs a global binding.
    pub fn bind<N: Into<JsString>>(&mut self, name: N, value: JsValue, readonly: bool) {
        let mut attribute = Attribute::ENUMERABLE;
        if !readonly {
            attribute |= Attribute::WRITABLE | Attribute::CONFIGURABLE;
        }
        self.global_object()
            .insert_property(PropertyKey::from(name.into()), value, attribute);
    }

    /// Reads a global binding (for hosts).
    pub fn global_value<N: Into<JsString>>(&mut self, name: N) -> JsResult<JsValue> {
        let global = self.global_object();
        global.get(&PropertyKey::from(name.into()), self)
    }

    /// Creates an external value from a registered prototype and a host
    /// payload.
    #[must_use]
    pub fn external_create(
        &mut self,
        prototype: &ExternalPrototype,
        data: Rc<dyn std::any::Any>,
    ) -> JsValue {
        JsValue::External(JsExternal::new(Rc::clone(prototype.root()), data))
    }

    /// Creates an array from a list of values (for hosts and built-ins).
    #[must_use]
    pub fn array_from(&mut self, elements: Vec<JsValue>) -> JsObject {
        let object = JsObject::new(
            ObjectKind::Array(ArrayStorage::from_elements(elements)),
            Some(self.standard_objects().array().prototype()),
        );
        object
            .borrow_mut()
            .set_shared_properties(self.realm.array_instance_table());
        object
    }

    /// Creates a plain object with `Object.prototype` (for hosts).
    #[must_use]
    pub fn object_new(&mut self) -> JsObject {
        JsObject::ordinary(Some(self.standard_objects().object().prototype()))
    }

    /// Calls a function value.
    pub fn call(
        &mut self,
        function: &JsValue,
        this: &JsValue,
        args: &[JsValue],
    ) -> JsResult<JsValue> {
        let Some(object) = function.as_callable() else {
            return Err(JsNativeError::typ()
                .with_message(format!("{} is not a function", function.display()))
                .into());
        };
        self.call_object(&object.clone(), this, args)
    }

    pub(crate) fn call_object(
        &mut self,
        function: &JsObject,
        this: &JsValue,
        args: &[JsValue],
    ) -> JsResult<JsValue> {
        self.enter_call()?;
        let result = self.call_object_inner(function, this, args);
        self.call_depth -= 1;
        result
    }

    fn call_object_inner(
        &mut self,
        function: &JsObject,
        this: &JsValue,
        args: &[JsValue],
    ) -> JsResult<JsValue> {
        enum Kind {
            Native(crate::object::NativeFunctionPointer),
            Closure(NativeClosure),
            Bound(JsObject, JsValue, Vec<JsValue>),
            Ordinary,
        }
        let kind = {
            let borrowed = function.borrow();
            match borrowed.as_function() {
                Some(Function::Native { function, .. }) => Kind::Native(*function),
                Some(Function::Closure { function, .. }) => Kind::Closure(Rc::clone(function)),
                Some(Function::Bound {
                    target,
                    this,
                    arguments,
                }) => Kind::Bound(target.clone(), this.clone(), arguments.to_vec()),
                Some(Function::Ordinary { .. }) => Kind::Ordinary,
                None => {
                    return Err(JsNativeError::typ()
                        .with_message("value is not a function")
                        .into());
                }
            }
        };
        match kind {
            Kind::Native(native) => native(this, args, self),
            Kind::Closure(closure) => closure(this, args, self),
            Kind::Bound(target, bound_this, mut bound_args) => {
                bound_args.extend_from_slice(args);
                self.call_object_inner(&target, &bound_this, &bound_args)
            }
            Kind::Ordinary => {
                let frame = self.prepare_frame(function, this.clone(), args)?;
                self.vm.frames.push(frame);
                self.run()
            }
        }
    }

    /// Constructs an object with `new`.
    pub fn construct(&mut self, function: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
        let Some(object) = function.as_callable() else {
            return Err(JsNativeError::typ()
                .with_message(format!("{} is not a function", function.display()))
                .into());
        };
        let object = object.clone();
        if !object.is_constructor() {
            return Err(JsNativeError::typ()
                .with_message("function is not a constructor")
                .into());
        }
        self.enter_call()?;
        let result = self.construct_inner(&object, args);
        self.call_depth -= 1;
        result
    }

    fn construct_inner(&mut self, function: &JsObject, args: &[JsValue]) -> JsResult<JsValue> {
        enum Kind {
            Native(crate::object::NativeFunctionPointer),
            Bound(JsObject, Vec<JsValue>),
            Ordinary,
        }
        let kind = {
            let borrowed = function.borrow();
            match borrowed.as_function() {
                Some(Function::Native { function, .. }) => Kind::Native(*function),
                Some(Function::Bound {
                    target, arguments, ..
                }) => Kind::Bound(target.clone(), arguments.to_vec()),
                _ => Kind::Ordinary,
            }
        };
        match kind {
            Kind::Native(native) => {
                self.constructing = true;
                let result = native(&JsValue::Undefined, args, self);
                self.constructing = false;
                result
            }
            Kind::Bound(target, mut bound_args) => {
                bound_args.extend_from_slice(args);
                self.construct_inner(&target, &bound_args)
            }
            Kind::Ordinary => {
                let prototype = function.get(&PropertyKey::from("prototype"), self)?;
                let prototype = match prototype {
                    JsValue::Object(object) => object,
                    _ => self.standard_objects().object().prototype(),
                };
                let this = JsObject::ordinary(Some(prototype));
                let this_value = JsValue::Object(this.clone());
                let mut frame = self.prepare_frame(function, this_value, args)?;
                frame.construct = true;
                self.vm.frames.push(frame);
                let result = self.run()?;
                if result.is_object() {
                    Ok(result)
                } else {
                    Ok(JsValue::Object(this))
                }
            }
        }
    }

    pub(crate) fn enter_call(&mut self) -> JsResult<()> {
        if self.call_depth + self.vm.frames.len() >= self.recursion_limit {
            return Err(JsNativeError::range()
                .with_message("Maximum call stack size exceeded")
                .into());
        }
        self.call_depth += 1;
        Ok(())
    }

    // === global binding protocol used by the vm ===

    pub(crate) fn global_get(&mut self, name: &JsString) -> JsResult<JsValue> {
        let global = self.global_object();
        let key = PropertyKey::from(name.clone());
        if !global.has_property(&key) {
            return Err(JsNativeError::reference()
                .with_message(format!("\"{name}\" is not defined"))
                .into());
        }
        global.get(&key, self)
    }

    pub(crate) fn global_set(&mut self, name: &JsString, value: JsValue) -> JsResult<()> {
        let global = self.global_object();
        let key = PropertyKey::from(name.clone());
        if !global.has_property(&key) {
            return Err(JsNativeError::reference()
                .with_message(format!("\"{name}\" is not defined"))
                .into());
        }
        global.set(key, value, self)
    }

    pub(crate) fn global_typeof(&mut self, name: &JsString) -> JsResult<JsValue> {
        let global = self.global_object();
        let key = PropertyKey::from(name.clone());
        if !global.has_property(&key) {
            return Ok(JsValue::from("undefined"));
        }
        let value = global.get(&key, self)?;
        Ok(JsValue::from(value.type_of()))
    }

    pub(crate) fn global_declare(&mut self, name: &JsString) {
        let global = self.global_object();
        let key = PropertyKey::from(name.clone());
        if !global.has_own_property(&key) {
            global.insert_property(
                key,
                JsValue::Undefined,
                Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::PERMANENT,
            );
        }
    }
}
