//! String and template literal lexing.
//!
//! Cooked contents are collected as WTF-8 bytes: `\u` escapes may produce
//! lone surrogates, which are preserved rather than replaced.

use super::{
    cursor::{is_line_terminator, Cursor},
    token::TokenKind,
};
use crate::error::Error;

// Lexes a single- or double-quoted string literal.
pub(super) fn lex_string(cursor: &mut Cursor<'_>) -> Result<TokenKind, Error> {
    let line = cursor.line();
    let quote = u32::from(cursor.next_byte().expect("caller checked the quote"));
    let mut cooked = Vec::new();
    loop {
        let Some(cp) = cursor.peek_char() else {
            return Err(Error::syntax("Unterminated string literal", line));
        };
        if is_line_terminator(cp) {
            return Err(Error::syntax("Unterminated string literal", line));
        }
        cursor.next_char();
        if cp == quote {
            break;
        }
        if cp == u32::from(b'\\') {
            lex_escape(cursor, &mut cooked, line)?;
        } else {
            push_code_point(&mut cooked, cp);
        }
    }
    Ok(TokenKind::String(cooked.into_boxed_slice()))
}

/// What ended a template fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TemplateTerminator {
    /// The closing backtick.
    End,
    /// A `${` substitution start.
    Substitution,
}

// Lexes template characters up to the next backtick or `${`.
pub(super) fn lex_template_fragment(
    cursor: &mut Cursor<'_>,
) -> Result<(Vec<u8>, TemplateTerminator), Error> {
    let line = cursor.line();
    let mut cooked = Vec::new();
    loop {
        let Some(cp) = cursor.peek_char() else {
            return Err(Error::syntax("Unterminated template literal", line));
        };
        if cp == u32::from(b'`') {
            cursor.next_byte();
            return Ok((cooked, TemplateTerminator::End));
        }
        if cp == u32::from(b'$') && cursor.peek_byte_at(1) == Some(b'{') {
            cursor.next_byte();
            cursor.next_byte();
            return Ok((cooked, TemplateTerminator::Substitution));
        }
        cursor.next_char();
        if cp == u32::from(b'\\') {
            // `\${` suppresses interpolation.
            if cursor.peek_byte() == Some(b'$') {
                cursor.next_byte();
                cooked.push(b'$');
                continue;
            }
            lex_escape(cursor, &mut cooked, line)?;
        } else {
            push_code_point(&mut cooked, cp);
        }
    }
}

// Lexes the escape sequence after a consumed backslash.
fn lex_escape(cursor: &mut Cursor<'_>, cooked: &mut Vec<u8>, line: u32) -> Result<(), Error> {
    let Some(cp) = cursor.peek_char() else {
        return Err(Error::syntax("Unterminated string literal", line));
    };
    // Line continuations disappear from the cooked contents.
    if is_line_terminator(cp) {
        cursor.next_char();
        return Ok(());
    }
    cursor.next_char();
    match cp {
        0x27 => cooked.push(b'\''),
        0x22 => cooked.push(b'"'),
        0x5C => cooked.push(b'\\'),
        0x62 => cooked.push(0x08),
        0x66 => cooked.push(0x0C),
        0x6E => cooked.push(b'\n'),
        0x72 => cooked.push(b'\r'),
        0x74 => cooked.push(b'\t'),
        0x76 => cooked.push(0x0B),
        0x30 => {
            if matches!(cursor.peek_byte(), Some(b'0'..=b'9')) {
                return Err(Error::syntax(
                    "Octal escape sequences are not supported",
                    line,
                ));
            }
            cooked.push(0);
        }
        0x31..=0x37 => {
            return Err(Error::syntax(
                "Octal escape sequences are not supported",
                line,
            ));
        }
        0x78 => {
            // \xHH
            let value = lex_hex_digits(cursor, 2, line)?;
            push_code_point(cooked, value);
        }
        0x75 => {
            // \uHHHH or \u{H…}
            if cursor.next_if(b'{') {
                let mut value = 0u32;
                let mut digits = 0usize;
                while let Some(byte) = cursor.peek_byte() {
                    if byte == b'}' {
                        break;
                    }
                    let digit = char::from(byte)
                        .to_digit(16)
                        .ok_or_else(|| Error::syntax("Invalid Unicode code point", line))?;
                    cursor.next_byte();
                    value = value * 16 + digit;
                    digits += 1;
                    if value > 0x0010_FFFF {
                        return Err(Error::syntax("Invalid Unicode code point", line));
                    }
                }
                if digits == 0 || !cursor.next_if(b'}') {
                    return Err(Error::syntax("Invalid Unicode code point", line));
                }
                push_code_point(cooked, value);
            } else {
                let value = lex_hex_digits(cursor, 4, line)?;
                push_code_point(cooked, value);
            }
        }
        // Any other escaped character stands for itself.
        other => push_code_point(cooked, other),
    }
    Ok(())
}

fn lex_hex_digits(cursor: &mut Cursor<'_>, count: usize, line: u32) -> Result<u32, Error> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = cursor
            .peek_byte()
            .and_then(|byte| char::from(byte).to_digit(16))
            .ok_or_else(|| Error::syntax("Invalid hexadecimal escape sequence", line))?;
        cursor.next_byte();
        value = value * 16 + digit;
    }
    Ok(value)
}

// Encodes a code point as WTF-8: standard UTF-8, except that lone
// surrogates are encoded like any other three-byte value.
pub(super) fn push_code_point(out: &mut Vec<u8>, cp: u32) {
    match cp {
        0..=0x7F => out.push(cp as u8),
        0x80..=0x7FF => {
            out.push(0xC0 | (cp >> 6) as u8);
            out.push(0x80 | (cp & 0x3F) as u8);
        }
        0x800..=0xFFFF => {
            out.push(0xE0 | (cp >> 12) as u8);
            out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
            out.push(0x80 | (cp & 0x3F) as u8);
        }
        _ => {
            out.push(0xF0 | (cp >> 18) as u8);
            out.push(0x80 | ((cp >> 12) & 0x3F) as u8);
            out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
            out.push(0x80 | (cp & 0x3F) as u8);
        }
    }
}
