//! The global `Math` object.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-math-object
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Math

use super::BuiltIn;
use crate::{
    object::ObjectInitializer, property::Attribute, Context, JsArgs, JsResult, JsValue,
};

/// The `Math` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Math;

impl BuiltIn for Math {
    const NAME: &'static str = "Math";

    fn init(context: &mut Context) -> JsValue {
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        let object = ObjectInitializer::new(context)
            .property("E", std::f64::consts::E, attribute)
            .property("LN2", std::f64::consts::LN_2, attribute)
            .property("LN10", std::f64::consts::LN_10, attribute)
            .property("LOG2E", std::f64::consts::LOG2_E, attribute)
            .property("LOG10E", std::f64::consts::LOG10_E, attribute)
            .property("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2, attribute)
            .property("SQRT2", std::f64::consts::SQRT_2, attribute)
            .property("PI", std::f64::consts::PI, attribute)
            .function(Self::abs, "abs", 1)
            .function(Self::acos, "acos", 1)
            .function(Self::acosh, "acosh", 1)
            .function(Self::asin, "asin", 1)
            .function(Self::asinh, "asinh", 1)
            .function(Self::atan, "atan", 1)
            .function(Self::atanh, "atanh", 1)
            .function(Self::atan2, "atan2", 2)
            .function(Self::cbrt, "cbrt", 1)
            .function(Self::ceil, "ceil", 1)
            .function(Self::clz32, "clz32", 1)
            .function(Self::cos, "cos", 1)
            .function(Self::cosh, "cosh", 1)
            .function(Self::exp, "exp", 1)
            .function(Self::expm1, "expm1", 1)
            .function(Self::floor, "floor", 1)
            .function(Self::fround, "fround", 1)
            .function(Self::hypot, "hypot", 2)
            .function(Self::imul, "imul", 2)
            .function(Self::log, "log", 1)
            .function(Self::log1p, "log1p", 1)
            .function(Self::log10, "log10", 1)
            .function(Self::log2, "log2", 1)
            .function(Self::max, "max", 2)
            .function(Self::min, "min", 2)
            .function(Self::pow, "pow", 2)
            .function(Self::random, "random", 0)
            .function(Self::round, "round", 1)
            .function(Self::sign, "sign", 1)
            .function(Self::sin, "sin", 1)
            .function(Self::sinh, "sinh", 1)
            .function(Self::sqrt, "sqrt", 1)
            .function(Self::tan, "tan", 1)
            .function(Self::tanh, "tanh", 1)
            .function(Self::trunc, "trunc", 1)
            .build();
        JsValue::Object(object)
    }
}

macro_rules! math_fn {
    ($(#[$doc:meta] $name:ident => $op:expr;)*) => {
        impl Math {
            $(
                #[$doc]
                #[allow(clippy::redundant_closure_call)]
                fn $name(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
                    let x = args.get_or_undefined(0).to_number(context)?;
                    let result: f64 = ($op)(x);
                    Ok(JsValue::Number(context.canonicalize_number(result)))
                }
            )*
        }
    };
}

math_fn! {
    /// `Math.abs( x )`
    abs => f64::abs;
    /// `Math.acos( x )`
    acos => f64::acos;
    /// `Math.acosh( x )`
    acosh => f64::acosh;
    /// `Math.asin( x )`
    asin => f64::asin;
    /// `Math.asinh( x )`
    asinh => f64::asinh;
    /// `Math.atan( x )`
    atan => f64::atan;
    /// `Math.atanh( x )`
    atanh => f64::atanh;
    /// `Math.cbrt( x )`
    cbrt => f64::cbrt;
    /// `Math.ceil( x )`
    ceil => f64::ceil;
    /// `Math.cos( x )`
    cos => f64::cos;
    /// `Math.cosh( x )`
    cosh => f64::cosh;
    /// `Math.exp( x )`
    exp => f64::exp;
    /// `Math.expm1( x )`
    expm1 => f64::exp_m1;
    /// `Math.floor( x )`
    floor => f64::floor;
    /// `Math.fround( x )`
    fround => |x: f64| f64::from(x as f32);
    /// `Math.log( x )`
    log => f64::ln;
    /// `Math.log1p( x )`
    log1p => f64::ln_1p;
    /// `Math.log10( x )`
    log10 => f64::log10;
    /// `Math.log2( x )`
    log2 => f64::log2;
    /// `Math.sign( x )`
    sign => |x: f64| if x == 0.0 || x.is_nan() { x } else { x.signum() };
    /// `Math.sin( x )`
    sin => f64::sin;
    /// `Math.sinh( x )`
    sinh => f64::sinh;
    /// `Math.sqrt( x )`
    sqrt => f64::sqrt;
    /// `Math.tan( x )`
    tan => f64::tan;
    /// `Math.tanh( x )`
    tanh => f64::tanh;
    /// `Math.trunc( x )`
    trunc => f64::trunc;
}

impl Math {
    /// `Math.atan2( y, x )`
    fn atan2(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let y = args.get_or_undefined(0).to_number(context)?;
        let x = args.get_or_undefined(1).to_number(context)?;
        Ok(JsValue::Number(y.atan2(x)))
    }

    /// `Math.clz32( x )`
    fn clz32(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let x = args.get_or_undefined(0).to_uint32(context)?;
        Ok(JsValue::from(x.leading_zeros() as f64))
    }

    /// `Math.hypot( ...values )`
    fn hypot(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut sum = 0.0_f64;
        for arg in args {
            let value = arg.to_number(context)?;
            sum += value * value;
        }
        Ok(JsValue::Number(sum.sqrt()))
    }

    /// `Math.imul( a, b )`
    fn imul(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let a = args.get_or_undefined(0).to_int32(context)?;
        let b = args.get_or_undefined(1).to_int32(context)?;
        Ok(JsValue::from(a.wrapping_mul(b)))
    }

    /// `Math.max( ...values )`
    fn max(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut result = f64::NEG_INFINITY;
        for arg in args {
            let value = arg.to_number(context)?;
            if value.is_nan() {
                return Ok(JsValue::nan());
            }
            // +0 beats -0.
            if value > result || (value == result && value.is_sign_positive()) {
                result = value;
            }
        }
        Ok(JsValue::Number(result))
    }

    /// `Math.min( ...values )`
    fn min(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut result = f64::INFINITY;
        for arg in args {
            let value = arg.to_number(context)?;
            if value.is_nan() {
                return Ok(JsValue::nan());
            }
            if value < result || (value == result && value.is_sign_negative()) {
                result = value;
            }
        }
        Ok(JsValue::Number(result))
    }

    /// `Math.pow( base, exponent )`
    fn pow(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let base = args.get_or_undefined(0).clone();
        let exponent = args.get_or_undefined(1).clone();
        base.pow(&exponent, context)
    }

    /// `Math.random()`
    fn random(_: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::Number(rand::random::<f64>()))
    }

    /// `Math.round( x )`: halfway cases round towards positive infinity,
    /// so `Math.round(-0.5)` is `-0`.
    fn round(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let x = args.get_or_undefined(0).to_number(context)?;
        if !x.is_finite() || x.fract() == 0.0 {
            return Ok(JsValue::Number(x));
        }
        let rounded = (x + 0.5).floor();
        // Keep the negative zero of (-0.5, 0) inputs.
        let rounded = if rounded == 0.0 && x < 0.0 { -0.0 } else { rounded };
        Ok(JsValue::Number(rounded))
    }
}
