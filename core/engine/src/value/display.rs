//! Context-free display of values, used in host-facing messages.

use super::{conversions::number_to_js_string, JsValue};
use std::fmt;

/// A lightweight display wrapper that renders a value without running any
/// script code: objects print as type tags, not via `toString`.
#[derive(Debug)]
pub struct ValueDisplay<'a> {
    value: &'a JsValue,
}

impl JsValue {
    /// Displays the value without invoking user code.
    #[must_use]
    pub fn display(&self) -> ValueDisplay<'_> {
        ValueDisplay { value: self }
    }
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            JsValue::Null => f.write_str("null"),
            JsValue::Undefined | JsValue::Invalid => f.write_str("undefined"),
            JsValue::Boolean(boolean) => write!(f, "{boolean}"),
            JsValue::Number(number) => write!(f, "{}", number_to_js_string(*number)),
            JsValue::String(string) => write!(f, "{string}"),
            JsValue::Symbol(symbol) => write!(f, "{symbol}"),
            JsValue::Data(_) => f.write_str("[data]"),
            JsValue::External(_) => f.write_str("[external]"),
            JsValue::Object(object) => {
                if object.is_callable() {
                    f.write_str("[function]")
                } else if object.is_array() {
                    f.write_str("[array]")
                } else {
                    f.write_str("[object]")
                }
            }
        }
    }
}
