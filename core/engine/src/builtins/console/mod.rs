//! A minimal `console` for embedded scripts: `log`, `info`, `warn` and
//! `error`, rendered through the debug formatter.

use super::{engine::dump_value, BuiltIn};
use crate::{object::ObjectInitializer, Context, JsResult, JsValue};
use std::io::Write;

/// The `console` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Console;

impl BuiltIn for Console {
    const NAME: &'static str = "console";

    fn init(context: &mut Context) -> JsValue {
        let object = ObjectInitializer::new(context)
            .function(Self::log, "log", 0)
            .function(Self::log, "info", 0)
            .function(Self::warn, "warn", 0)
            .function(Self::warn, "error", 0)
            .build();
        JsValue::Object(object)
    }
}

fn render(args: &[JsValue], context: &mut Context) -> JsResult<String> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        // Bare strings print unquoted, everything else like `adder.dump`.
        match arg {
            JsValue::String(string) => parts.push(string.to_std_string_lossy()),
            other => {
                let mut seen = Vec::new();
                parts.push(dump_value(other, &mut seen, context)?);
            }
        }
    }
    Ok(parts.join(" "))
}

impl Console {
    fn log(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let text = render(args, context)?;
        let mut out = std::io::stdout();
        let _ = writeln!(out, "{text}");
        Ok(JsValue::Undefined)
    }

    fn warn(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let text = render(args, context)?;
        let mut err = std::io::stderr();
        let _ = writeln!(err, "{text}");
        Ok(JsValue::Undefined)
    }
}
