//! Numeric literal lexing.

use super::{cursor::Cursor, token::TokenKind};
use crate::{error::Error, ParserOptions};

// Numeric literals: decimal with optional fraction and exponent, `0x`/`0X`
// hex, `0b`/`0B` binary and `0o`/`0O` octal. A legacy `0`-prefixed octal is
// a syntax error, as is an identifier character glued to the literal.
pub(super) fn lex(cursor: &mut Cursor<'_>, options: &ParserOptions) -> Result<TokenKind, Error> {
    let line = cursor.line();
    let value = lex_value(cursor, line)?;

    if let Some(byte) = cursor.peek_byte() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$' {
            return Err(Error::syntax("Unexpected token after number literal", line));
        }
    }

    let value = if !options.denormals && value.is_subnormal() {
        0.0_f64.copysign(value)
    } else {
        value
    };
    Ok(TokenKind::Numeric(value))
}

fn lex_value(cursor: &mut Cursor<'_>, line: u32) -> Result<f64, Error> {
    if cursor.peek_byte() == Some(b'0') {
        match cursor.peek_byte_at(1) {
            Some(b'x' | b'X') => {
                cursor.next_byte();
                cursor.next_byte();
                return lex_radix(cursor, 16, line);
            }
            Some(b'b' | b'B') => {
                cursor.next_byte();
                cursor.next_byte();
                return lex_radix(cursor, 2, line);
            }
            Some(b'o' | b'O') => {
                cursor.next_byte();
                cursor.next_byte();
                return lex_radix(cursor, 8, line);
            }
            Some(b'0'..=b'9') => {
                return Err(Error::syntax(
                    "Legacy octal literals are not supported",
                    line,
                ));
            }
            _ => {}
        }
    }
    lex_decimal(cursor, line)
}

fn lex_radix(cursor: &mut Cursor<'_>, radix: u32, line: u32) -> Result<f64, Error> {
    let mut value = 0.0_f64;
    let mut digits = 0usize;
    while let Some(byte) = cursor.peek_byte() {
        let Some(digit) = char::from(byte).to_digit(radix) else {
            break;
        };
        cursor.next_byte();
        value = value * f64::from(radix) + f64::from(digit);
        digits += 1;
    }
    if digits == 0 {
        return Err(Error::syntax("Invalid number literal", line));
    }
    Ok(value)
}

fn lex_decimal(cursor: &mut Cursor<'_>, line: u32) -> Result<f64, Error> {
    let mut text = String::new();
    while matches!(cursor.peek_byte(), Some(b'0'..=b'9')) {
        text.push(char::from(cursor.next_byte().expect("peeked digit")));
    }
    if cursor.peek_byte() == Some(b'.') {
        text.push('.');
        cursor.next_byte();
        while matches!(cursor.peek_byte(), Some(b'0'..=b'9')) {
            text.push(char::from(cursor.next_byte().expect("peeked digit")));
        }
    }
    if matches!(cursor.peek_byte(), Some(b'e' | b'E')) {
        let sign_offset = match cursor.peek_byte_at(1) {
            Some(b'+' | b'-') => 1,
            _ => 0,
        };
        if matches!(cursor.peek_byte_at(1 + sign_offset), Some(b'0'..=b'9')) {
            text.push(char::from(cursor.next_byte().expect("peeked exponent")));
            if sign_offset == 1 {
                text.push(char::from(cursor.next_byte().expect("peeked sign")));
            }
            while matches!(cursor.peek_byte(), Some(b'0'..=b'9')) {
                text.push(char::from(cursor.next_byte().expect("peeked digit")));
            }
        } else {
            return Err(Error::syntax("Invalid number literal", line));
        }
    }
    // Overflow to infinity is a value, not an error.
    fast_float2::parse(&text).map_err(|_| Error::syntax("Invalid number literal", line))
}
