//! The global `RegExp` object, backed by the `regress` matcher.
//!
//! The engine tracks `lastIndex` and the `g`/`y` looping protocol itself;
//! the backend only runs single matches. Offsets reported to scripts are
//! code point indices into the subject string.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!  - [MDN documentation][mdn]
//!
//! [spec]: https://tc39.es/ecma262/#sec-regexp-regular-expression-objects
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/RegExp

use super::BuiltIn;
use crate::{
    error::JsNativeError,
    object::{ConstructorBuilder, JsObject, ObjectKind, RegExpData},
    property::Attribute,
    Context, JsArgs, JsResult, JsString, JsValue,
};
use std::rc::Rc;

/// The `RegExp` built-in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegExp;

impl BuiltIn for RegExp {
    const NAME: &'static str = "RegExp";

    fn init(context: &mut Context) -> JsValue {
        let standard = context.standard_objects().regexp();
        let constructor =
            ConstructorBuilder::with_standard_object(context, Self::constructor, standard)
                .name(Self::NAME)
                .length(2)
                .method(Self::exec, "exec", 1)
                .method(Self::test, "test", 1)
                .method(Self::to_string, "toString", 0)
                .build();
        JsValue::Object(constructor)
    }
}

/// Builds a regexp object from a pre-compiled literal template.
pub(crate) fn from_parts(
    source: JsString,
    flags: JsString,
    matcher: Rc<regress::Regex>,
    context: &mut Context,
) -> JsObject {
    let object = JsObject::new(
        ObjectKind::RegExp(RegExpData {
            source,
            flags,
            matcher,
            last_index: 0.0,
        }),
        Some(context.standard_objects().regexp().prototype()),
    );
    object
        .borrow_mut()
        .set_shared_properties(context.realm().regexp_instance_table());
    object
}

/// Whether the object is a regexp.
pub(crate) fn is_regexp(object: &JsObject) -> bool {
    matches!(object.borrow().kind(), ObjectKind::RegExp(_))
}

/// Compiles a pattern/flags pair at runtime (the `RegExp` constructor and
/// `String.prototype.match` coercions).
pub(crate) fn compile_pattern(
    pattern: &JsString,
    flags: &JsString,
    context: &mut Context,
) -> JsResult<JsObject> {
    let pattern_text = pattern.to_std_string_lossy();
    let flags_text = flags.to_std_string_lossy();
    let mut seen = Vec::new();
    for flag in flags_text.chars() {
        if !"gimsuy".contains(flag) || seen.contains(&flag) {
            return Err(JsNativeError::syntax()
                .with_message(format!("Invalid regular expression flags \"{flags_text}\""))
                .into());
        }
        seen.push(flag);
    }
    let matcher = if pattern_text.is_empty() {
        context.shared_world().empty_regexp()
    } else {
        let backend_flags: std::string::String =
            flags_text.chars().filter(|&c| c != 'g').collect();
        Rc::new(
            regress::Regex::with_flags(&pattern_text, backend_flags.as_str()).map_err(
                |error| -> crate::JsError {
                    JsNativeError::syntax()
                        .with_message(format!(
                            "Invalid regular expression /{pattern_text}/: {error}"
                        ))
                        .into()
                },
            )?,
        )
    };
    let source = if pattern_text.is_empty() {
        JsString::from("(?:)")
    } else {
        pattern.clone()
    };
    Ok(from_parts(source, flags.clone(), matcher, context))
}

/// Coerces a `match`/`search` argument into a regexp object.
pub(crate) fn coerce_to_regexp(value: &JsValue, context: &mut Context) -> JsResult<JsObject> {
    match value {
        JsValue::Object(object) if is_regexp(object) => Ok(object.clone()),
        JsValue::Undefined => compile_pattern(&JsString::default(), &JsString::default(), context),
        other => {
            let pattern = other.to_string(context)?;
            compile_pattern(&pattern, &JsString::default(), context)
        }
    }
}

// One raw match: the code point range of the whole match plus the captured
// substrings.
struct MatchResult {
    start: usize,
    end: usize,
    captures: Vec<Option<JsString>>,
}

fn byte_to_code_point(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

fn with_data<R>(object: &JsObject, read: impl FnOnce(&RegExpData) -> R) -> JsResult<R> {
    let borrowed = object.borrow();
    match borrowed.kind() {
        ObjectKind::RegExp(data) => Ok(read(data)),
        _ => Err(JsNativeError::typ()
            .with_message("Method called on incompatible receiver")
            .into()),
    }
}

fn set_last_index(object: &JsObject, value: f64) {
    let mut borrowed = object.borrow_mut();
    if let ObjectKind::RegExp(data) = borrowed.kind_mut() {
        data.last_index = value;
    }
}

// Runs the matcher once from the code point index `from`.
fn run_match(
    object: &JsObject,
    subject: &str,
    from: usize,
    sticky: bool,
) -> JsResult<Option<MatchResult>> {
    let matcher = with_data(object, |data| Rc::clone(&data.matcher))?;
    let byte_start = subject
        .char_indices()
        .nth(from)
        .map_or(subject.len(), |(offset, _)| offset);
    if from > subject.chars().count() {
        return Ok(None);
    }
    let Some(found) = matcher.find_from(subject, byte_start).next() else {
        return Ok(None);
    };
    if sticky && found.range.start != byte_start {
        return Ok(None);
    }
    let captures = found
        .captures
        .iter()
        .map(|capture| {
            capture
                .as_ref()
                .map(|range| JsString::from(&subject[range.clone()]))
        })
        .collect();
    Ok(Some(MatchResult {
        start: byte_to_code_point(subject, found.range.start),
        end: byte_to_code_point(subject, found.range.end),
        captures,
    }))
}

// Builds the array returned by `exec` and non-global `match`.
fn match_array(
    result: &MatchResult,
    subject: &JsString,
    context: &mut Context,
) -> JsResult<JsValue> {
    let mut elements = vec![JsValue::String(subject.substring(result.start, result.end))];
    for capture in &result.captures {
        elements.push(match capture {
            Some(string) => JsValue::String(string.clone()),
            None => JsValue::Undefined,
        });
    }
    let array = context.array_from(elements);
    array.borrow_mut().insert_property(
        "index",
        result.start as f64,
        Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::CONFIGURABLE,
    );
    array.borrow_mut().insert_property(
        "input",
        subject.clone(),
        Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::CONFIGURABLE,
    );
    Ok(JsValue::Object(array))
}

/// The shared `exec` algorithm.
pub(crate) fn exec(object: &JsObject, subject: &JsString, context: &mut Context) -> JsResult<JsValue> {
    let (global, sticky, last_index) =
        with_data(object, |data| (data.global(), data.sticky(), data.last_index))?;
    let text = subject.to_std_string_lossy();
    let from = if global || sticky {
        if last_index < 0.0 || last_index.fract() != 0.0 {
            set_last_index(object, 0.0);
            return Ok(JsValue::Null);
        }
        last_index as usize
    } else {
        0
    };
    match run_match(object, &text, from, sticky)? {
        Some(result) => {
            if global || sticky {
                set_last_index(object, result.end as f64);
            }
            match_array(&result, subject, context)
        }
        None => {
            if global || sticky {
                set_last_index(object, 0.0);
            }
            Ok(JsValue::Null)
        }
    }
}

/// `String.prototype.match` support.
pub(crate) fn match_string(
    object: &JsObject,
    subject: &JsString,
    context: &mut Context,
) -> JsResult<JsValue> {
    let global = with_data(object, RegExpData::global)?;
    if !global {
        return exec(object, subject, context);
    }
    set_last_index(object, 0.0);
    let text = subject.to_std_string_lossy();
    let mut matches = Vec::new();
    let mut from = 0usize;
    let total = subject.len();
    loop {
        match run_match(object, &text, from, false)? {
            Some(result) => {
                matches.push(JsValue::String(subject.substring(result.start, result.end)));
                // Empty matches advance by one code point to guarantee
                // progress.
                from = if result.end == result.start {
                    result.end + 1
                } else {
                    result.end
                };
                if from > total {
                    break;
                }
            }
            None => break,
        }
    }
    set_last_index(object, 0.0);
    if matches.is_empty() {
        return Ok(JsValue::Null);
    }
    Ok(JsValue::Object(context.array_from(matches)))
}

/// `String.prototype.search` support.
pub(crate) fn search(
    object: &JsObject,
    subject: &JsString,
    _context: &mut Context,
) -> JsResult<JsValue> {
    let text = subject.to_std_string_lossy();
    match run_match(object, &text, 0, false)? {
        Some(result) => Ok(JsValue::from(result.start as f64)),
        None => Ok(JsValue::from(-1)),
    }
}

/// `String.prototype.split` support for regexp separators.
pub(crate) fn split(
    object: &JsObject,
    subject: &JsString,
    limit: u32,
    context: &mut Context,
) -> JsResult<JsValue> {
    let text = subject.to_std_string_lossy();
    let total = subject.len();
    let mut parts = Vec::new();
    let mut last = 0usize;
    let mut from = 0usize;
    while parts.len() < limit as usize {
        match run_match(object, &text, from, false)? {
            Some(result) if result.end <= total => {
                if result.start == result.end {
                    // Zero-width match: split between code points.
                    if result.start >= total {
                        break;
                    }
                    from = result.start + 1;
                    if result.start >= last {
                        parts.push(JsValue::String(subject.substring(last, result.start + 1)));
                        last = result.start + 1;
                    }
                    continue;
                }
                parts.push(JsValue::String(subject.substring(last, result.start)));
                for capture in &result.captures {
                    if parts.len() >= limit as usize {
                        break;
                    }
                    parts.push(match capture {
                        Some(string) => JsValue::String(string.clone()),
                        None => JsValue::Undefined,
                    });
                }
                last = result.end;
                from = result.end;
            }
            _ => break,
        }
    }
    if parts.len() < limit as usize {
        parts.push(JsValue::String(subject.substring(last, total)));
    }
    Ok(JsValue::Object(context.array_from(parts)))
}

/// `String.prototype.replace` support for regexp patterns.
pub(crate) fn replace(
    object: &JsObject,
    subject: &JsString,
    replacement: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let global = with_data(object, RegExpData::global)?;
    let text = subject.to_std_string_lossy();
    let total = subject.len();
    let mut result = JsString::default();
    let mut last = 0usize;
    let mut from = 0usize;
    loop {
        let Some(found) = run_match(object, &text, from, false)? else {
            break;
        };
        let matched = subject.substring(found.start, found.end);
        let resolved = resolve_replacement(
            replacement,
            &matched,
            &found.captures,
            found.start,
            subject,
            context,
        )?;
        result = result.concat(&subject.substring(last, found.start));
        result = result.concat(&resolved);
        last = found.end;
        from = if found.end == found.start {
            found.end + 1
        } else {
            found.end
        };
        if !global || from > total {
            break;
        }
    }
    if global {
        set_last_index(object, 0.0);
    }
    result = result.concat(&subject.substring(last, total));
    Ok(JsValue::String(result))
}

/// Resolves a replacement: calls the function form, or expands the
/// `$&`/`$1`/`` $` ``/`$'` template.
pub(crate) fn resolve_replacement(
    replacement: &JsValue,
    matched: &JsString,
    captures: &[Option<JsString>],
    position: usize,
    subject: &JsString,
    context: &mut Context,
) -> JsResult<JsString> {
    if replacement.is_callable() {
        let mut args = vec![JsValue::String(matched.clone())];
        for capture in captures {
            args.push(match capture {
                Some(string) => JsValue::String(string.clone()),
                None => JsValue::Undefined,
            });
        }
        args.push(JsValue::from(position as f64));
        args.push(JsValue::String(subject.clone()));
        let result = context.call(replacement, &JsValue::Undefined, &args)?;
        return result.to_string(context);
    }

    let template = replacement.to_string(context)?;
    let text = template.to_std_string_lossy();
    let mut out = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            let mut buffer = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push(b'$');
            }
            Some('&') => {
                chars.next();
                out.extend_from_slice(matched.as_bytes());
            }
            Some('`') => {
                chars.next();
                out.extend_from_slice(subject.substring(0, position).as_bytes());
            }
            Some('\'') => {
                chars.next();
                out.extend_from_slice(
                    subject
                        .substring(position + matched.len(), subject.len())
                        .as_bytes(),
                );
            }
            Some(digit) if digit.is_ascii_digit() => {
                let mut number = chars.next().and_then(|c| c.to_digit(10)).unwrap_or(0) as usize;
                if let Some(next) = chars.peek() {
                    if next.is_ascii_digit() {
                        let wide = number * 10 + next.to_digit(10).unwrap_or(0) as usize;
                        if wide >= 1 && wide <= captures.len() {
                            chars.next();
                            number = wide;
                        }
                    }
                }
                if number >= 1 && number <= captures.len() {
                    if let Some(Some(capture)) = captures.get(number - 1) {
                        out.extend_from_slice(capture.as_bytes());
                    }
                } else {
                    out.push(b'$');
                    out.extend_from_slice(number.to_string().as_bytes());
                }
            }
            _ => out.push(b'$'),
        }
    }
    Ok(JsString::from_wtf8(out))
}

impl RegExp {
    fn constructor(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        context.take_constructing();
        match args.get_or_undefined(0) {
            JsValue::Object(object) if is_regexp(object) => {
                let (source, flags) = with_data(object, |data| {
                    (data.source.clone(), data.flags.clone())
                })?;
                let flags = match args.get_or_undefined(1) {
                    JsValue::Undefined => flags,
                    value => value.to_string(context)?,
                };
                Ok(JsValue::Object(compile_pattern(&source, &flags, context)?))
            }
            pattern => {
                let source = match pattern {
                    JsValue::Undefined => JsString::default(),
                    value => value.to_string(context)?,
                };
                let flags = match args.get_or_undefined(1) {
                    JsValue::Undefined => JsString::default(),
                    value => value.to_string(context)?,
                };
                Ok(JsValue::Object(compile_pattern(&source, &flags, context)?))
            }
        }
    }

    /// `RegExp.prototype.exec( string )`
    fn exec(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(object) = this.as_object().filter(|o| is_regexp(o)) else {
            return Err(JsNativeError::typ()
                .with_message("RegExp.prototype.exec called on incompatible receiver")
                .into());
        };
        let subject = args.get_or_undefined(0).to_string(context)?;
        exec(&object.clone(), &subject, context)
    }

    /// `RegExp.prototype.test( string )`
    fn test(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let result = Self::exec(this, args, context)?;
        Ok(JsValue::Boolean(!result.is_null()))
    }

    /// `RegExp.prototype.toString()`
    fn to_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let Some(object) = this.as_object().filter(|o| is_regexp(o)) else {
            return Err(JsNativeError::typ()
                .with_message("RegExp.prototype.toString called on incompatible receiver")
                .into());
        };
        let text = with_data(object, |data| format!("/{}/{}", data.source, data.flags))?;
        Ok(JsValue::String(JsString::from(text)))
    }
}
