//! The `fs` host module: synchronous file operations plus callback-style
//! wrappers that run synchronously and report through the callback.
//!
//! The module is marked "sandbox": a context created with `sandbox: true`
//! cannot load it.

use super::{encoding::Encoding, BuiltIn};
use crate::{
    error::JsNativeError,
    object::ObjectInitializer,
    property::PropertyKey,
    Context, JsArgs, JsResult, JsString, JsValue,
};
use std::io::Write;

/// The `fs` module object.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fs;

impl BuiltIn for Fs {
    const NAME: &'static str = "fs";

    fn init(context: &mut Context) -> JsValue {
        let object = ObjectInitializer::new(context)
            .function(Self::read_file, "readFile", 3)
            .function(Self::read_file_sync, "readFileSync", 2)
            .function(Self::write_file, "writeFile", 4)
            .function(Self::write_file_sync, "writeFileSync", 3)
            .function(Self::append_file_sync, "appendFileSync", 3)
            .function(Self::rename_sync, "renameSync", 2)
            .build();
        JsValue::Object(object)
    }
}

// Options are either an encoding name or an `{encoding, flag}` bag.
#[derive(Debug, Clone, Copy)]
struct FileOptions {
    encoding: Option<Encoding>,
    append: bool,
}

fn parse_options(value: &JsValue, context: &mut Context) -> JsResult<FileOptions> {
    match value {
        JsValue::Undefined | JsValue::Null => Ok(FileOptions {
            encoding: None,
            append: false,
        }),
        JsValue::String(_) => Ok(FileOptions {
            encoding: Some(Encoding::from_value(value, context)?),
            append: false,
        }),
        JsValue::Object(object) => {
            let encoding = match object.get(&PropertyKey::from("encoding"), context)? {
                JsValue::Undefined | JsValue::Null => None,
                value => Some(Encoding::from_value(&value, context)?),
            };
            let append = match object.get(&PropertyKey::from("flag"), context)? {
                JsValue::Undefined => false,
                value => {
                    let flag = value.to_string(context)?;
                    matches!(flag.as_str(), Some("a" | "a+" | "as" | "as+"))
                }
            };
            Ok(FileOptions { encoding, append })
        }
        _ => Err(JsNativeError::typ()
            .with_message("Invalid options argument")
            .into()),
    }
}

fn io_error(operation: &str, path: &JsString, error: &std::io::Error) -> crate::JsError {
    JsNativeError::error()
        .with_message(format!("{operation} \"{path}\" failed ({error})"))
        .into()
}

fn path_of(args: &[JsValue], context: &mut Context) -> JsResult<(JsString, String)> {
    let path = args.get_or_undefined(0).to_string(context)?;
    let text = path.to_std_string_lossy();
    Ok((path, text))
}

fn read_with_options(
    args: &[JsValue],
    options: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let (path, path_text) = path_of(args, context)?;
    let options = parse_options(options, context)?;
    let bytes =
        std::fs::read(&path_text).map_err(|error| io_error("readFileSync", &path, &error))?;
    let string = match options.encoding {
        Some(encoding) => encoding.encode(&bytes),
        None => JsString::from_encoded(bytes),
    };
    Ok(JsValue::String(string))
}

fn write_with_options(
    args: &[JsValue],
    options: &JsValue,
    append: bool,
    context: &mut Context,
) -> JsResult<JsValue> {
    let (path, path_text) = path_of(args, context)?;
    let data = args.get_or_undefined(1).to_string(context)?;
    let options = parse_options(options, context)?;
    let bytes = match options.encoding {
        Some(encoding) => encoding.decode(&data)?,
        None => data.as_bytes().to_vec(),
    };
    let append = append || options.append;
    let operation = if append {
        "appendFileSync"
    } else {
        "writeFileSync"
    };
    let result = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(&path_text)
        .and_then(|mut file| file.write_all(&bytes));
    result.map_err(|error| io_error(operation, &path, &error))?;
    Ok(JsValue::Undefined)
}

impl Fs {
    /// `fs.readFileSync( path[, options] )`
    fn read_file_sync(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        read_with_options(args, args.get_or_undefined(1), context)
    }

    /// `fs.readFile( path[, options], callback )`: synchronous execution,
    /// callback-style reporting.
    fn read_file(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (options, callback) = split_callback(args, 1)?;
        let result = read_with_options(args, &options, context);
        invoke_callback(&callback, result, context)
    }

    /// `fs.writeFileSync( path, data[, options] )`
    fn write_file_sync(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        write_with_options(args, args.get_or_undefined(2), false, context)
    }

    /// `fs.writeFile( path, data[, options], callback )`
    fn write_file(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (options, callback) = split_callback(args, 2)?;
        let result = write_with_options(args, &options, false, context);
        invoke_callback(&callback, result, context)
    }

    /// `fs.appendFileSync( path, data[, options] )`
    fn append_file_sync(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        write_with_options(args, args.get_or_undefined(2), true, context)
    }

    /// `fs.renameSync( oldPath, newPath )`
    fn rename_sync(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (from, from_text) = path_of(args, context)?;
        let to = args.get_or_undefined(1).to_string(context)?;
        std::fs::rename(&from_text, to.to_std_string_lossy())
            .map_err(|error| io_error("renameSync", &from, &error))?;
        Ok(JsValue::Undefined)
    }
}

// The callback is the last argument; an options bag may sit before it.
fn split_callback(args: &[JsValue], options_at: usize) -> JsResult<(JsValue, JsValue)> {
    let callback = args
        .last()
        .filter(|value| value.is_callable())
        .cloned()
        .ok_or_else(|| -> crate::JsError {
            JsNativeError::typ()
                .with_message("Callback must be a function")
                .into()
        })?;
    let options = match args.get(options_at) {
        Some(value) if !value.is_callable() => value.clone(),
        _ => JsValue::Undefined,
    };
    Ok((options, callback))
}

fn invoke_callback(
    callback: &JsValue,
    result: JsResult<JsValue>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let args = match result {
        Ok(JsValue::Undefined) => vec![JsValue::Undefined],
        Ok(value) => vec![JsValue::Undefined, value],
        Err(error) => vec![error.to_value(context)],
    };
    context.call(callback, &JsValue::Undefined, &args)?;
    Ok(JsValue::Undefined)
}
