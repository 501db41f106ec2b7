//! The global `Function` object and `Function.prototype` methods.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-function-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Function

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::{ConstructorBuilder, Function, JsObject, ObjectKind},
    Context, JsArgs, JsResult, JsString, JsValue,
};

/// The `Function` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuiltInFunctionObject;

impl BuiltIn for BuiltInFunctionObject {
    const NAME: &'static str = "Function";

    fn init(context: &mut Context) -> JsValue {
        let standard = context.standard_objects().function();
        let constructor =
            ConstructorBuilder::with_standard_object(context, Self::constructor, standard)
                .name(Self::NAME)
                .length(1)
                .method(Self::call, "call", 1)
                .method(Self::apply, "apply", 2)
                .method(Self::bind, "bind", 1)
                .method(Self::to_string, "toString", 0)
                .build();

        // `Function.prototype` is itself callable and returns `undefined`.
        let prototype = context.standard_objects().function().prototype();
        prototype
            .borrow_mut()
            .set_kind(ObjectKind::Function(Function::Native {
                function: Self::prototype_call,
                name: JsString::default(),
                length: 0,
                constructor: false,
            }));
        JsValue::Object(constructor)
    }
}

impl BuiltInFunctionObject {
    // The `Function` constructor compiles a new function from source; the
    // safety policy forbids it unless the context opted in.
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.unsafe_eval {
            return Err(JsNativeError::typ()
                .with_message("function constructor is disabled in \"safe\" mode")
                .into());
        }
        let (params, body) = match args.split_last() {
            Some((body, params)) => {
                let mut names = Vec::with_capacity(params.len());
                for param in params {
                    names.push(param.to_string(context)?.to_std_string_lossy());
                }
                (names.join(", "), body.to_string(context)?)
            }
            None => (String::new(), JsString::default()),
        };
        let source = format!("(function({params}) {{ {body} }})");
        let code = context.compile(&source)?;
        context.execute(code)
    }

    fn prototype_call(_: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Undefined)
    }

    /// `Function.prototype.call( thisArg, ...args )`
    fn call(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let this_arg = args.get_or_undefined(0).clone();
        let rest = args.get(1..).unwrap_or_default();
        context.call(this, &this_arg, rest)
    }

    /// `Function.prototype.apply( thisArg, argsArray )`
    fn apply(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let this_arg = args.get_or_undefined(0).clone();
        let arguments = match args.get_or_undefined(1) {
            JsValue::Null | JsValue::Undefined => Vec::new(),
            value => context.spread_values(value)?,
        };
        context.call(this, &this_arg, &arguments)
    }

    /// `Function.prototype.bind( thisArg, ...args )`
    fn bind(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(target) = this.as_callable() else {
            return Err(JsNativeError::typ()
                .with_message("Bind must be called on a function")
                .into());
        };
        let bound = Function::Bound {
            target: target.clone(),
            this: args.get_or_undefined(0).clone(),
            arguments: args.get(1..).unwrap_or_default().to_vec().into_boxed_slice(),
        };
        let object = JsObject::new(
            ObjectKind::Function(bound),
            Some(context.standard_objects().function().prototype()),
        );
        object
            .borrow_mut()
            .set_shared_properties(context.realm().function_instance_table());
        Ok(JsValue::Object(object))
    }

    /// `Function.prototype.toString()`
    fn to_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let Some(function) = this.as_callable() else {
            return Err(JsNativeError::typ()
                .with_message("Function.prototype.toString requires a function receiver")
                .into());
        };
        let name = function
            .borrow()
            .as_function()
            .map_or_else(JsString::default, Function::name);
        Ok(JsValue::String(JsString::from(format!(
            "function {name}() {{ [native code] }}"
        ))))
    }
}
