//! The global `Symbol` object, including the well-known symbols and the
//! `Symbol.for` registry.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-symbol-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Symbol

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::ConstructorBuilder,
    property::Attribute,
    symbol::WellKnownSymbol,
    Context, JsArgs, JsResult, JsSymbol, JsValue,
};

/// The `Symbol` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Symbol;

impl BuiltIn for Symbol {
    const NAME: &'static str = "Symbol";

    fn init(context: &mut Context) -> JsValue {
        let standard = context.standard_objects().symbol();
        let mut builder =
            ConstructorBuilder::with_standard_object(context, Self::constructor, standard);
        builder
            .name(Self::NAME)
            .length(0)
            .static_method(Self::r#for, "for", 1)
            .static_method(Self::key_for, "keyFor", 1)
            .method(Self::to_string, "toString", 0)
            .method(Self::value_of, "valueOf", 0)
            .accessor(
                "description",
                Some(Self::description),
                None,
                Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            );
        let constructor = builder.build();

        // The well-known symbols hang off the constructor as readonly
        // properties.
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        for which in WellKnownSymbol::ALL {
            let symbol = context.well_known_symbol(which);
            constructor.insert_property(which.name(), symbol, attribute);
        }
        JsValue::Object(constructor)
    }
}

impl Symbol {
    // `Symbol` cannot be constructed with `new`.
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if context.take_constructing() {
            return Err(JsNativeError::typ()
                .with_message("Symbol is not a constructor")
                .into());
        }
        let description = match args.get_or_undefined(0) {
            JsValue::Undefined => None,
            value => Some(value.to_string(context)?),
        };
        Ok(JsValue::Symbol(JsSymbol::new(description)))
    }

    /// `Symbol.for( key )`
    fn r#for(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let key = args.get_or_undefined(0).to_string(context)?;
        if let Some(symbol) = context.symbol_registry.get(&key) {
            return Ok(JsValue::Symbol(symbol.clone()));
        }
        let symbol = JsSymbol::new(Some(key.clone()));
        context.symbol_registry.insert(key, symbol.clone());
        Ok(JsValue::Symbol(symbol))
    }

    /// `Symbol.keyFor( symbol )`
    fn key_for(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(symbol) = args.get_or_undefined(0).as_symbol() else {
            return Err(JsNativeError::typ()
                .with_message("Symbol.keyFor requires a symbol argument")
                .into());
        };
        for (key, registered) in &context.symbol_registry {
            if registered == symbol {
                return Ok(JsValue::String(key.clone()));
            }
        }
        Ok(JsValue::Undefined)
    }

    fn this_symbol(this: &JsValue) -> JsResult<JsSymbol> {
        match this.unwrapped() {
            JsValue::Symbol(symbol) => Ok(symbol),
            _ => Err(JsNativeError::typ()
                .with_message("Symbol.prototype method requires a symbol receiver")
                .into()),
        }
    }

    /// `Symbol.prototype.toString()`
    fn to_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::String(Self::this_symbol(this)?.descriptive_string()))
    }

    /// `Symbol.prototype.valueOf()`
    fn value_of(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Symbol(Self::this_symbol(this)?))
    }

    /// `get Symbol.prototype.description`
    fn description(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let symbol = Self::this_symbol(this)?;
        if let Some(well_known) = symbol.as_well_known() {
            return Ok(JsValue::from(well_known.description()));
        }
        Ok(symbol
            .description()
            .map_or(JsValue::Undefined, |description| {
                JsValue::String(description.clone())
            }))
    }
}
