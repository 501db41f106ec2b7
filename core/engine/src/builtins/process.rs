//! The global `process` object: argv, the environment snapshot and the
//! process id.

use super::BuiltIn;
use crate::{
    object::ObjectInitializer,
    property::{Attribute, PropertyKey},
    Context, JsValue,
};

/// The `process` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Process;

impl BuiltIn for Process {
    const NAME: &'static str = "process";

    fn init(context: &mut Context) -> JsValue {
        let attribute = Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::CONFIGURABLE;

        let argv: Vec<JsValue> = context
            .argv
            .iter()
            .map(|argument| JsValue::from(argument.as_str()))
            .collect();
        let argv = context.array_from(argv);

        // The environment is the shared world's snapshot: captured once per
        // process, never re-read.
        let snapshot: Vec<(String, String)> = context
            .shared_world()
            .env()
            .iter()
            .cloned()
            .collect();
        let env = context.object_new();
        for (key, value) in snapshot {
            env.insert_property(
                PropertyKey::from(key.as_str()),
                JsValue::from(value),
                attribute,
            );
        }

        let object = ObjectInitializer::new(context)
            .property("argv", argv, attribute)
            .property("env", env, attribute)
            .property("pid", f64::from(std::process::id()), attribute)
            .build();
        JsValue::Object(object)
    }
}
