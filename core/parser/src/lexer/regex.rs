//! Regular expression literal lexing.
//!
//! The lexer only locates the terminating slash; the pattern itself is
//! compiled by the code generator. Character classes and escape sequences
//! are tracked so that `/[/]/` and `/\//` terminate correctly.

use super::{cursor::is_line_terminator, cursor::Cursor, token::TokenKind};
use crate::error::Error;

pub(super) fn lex(cursor: &mut Cursor<'_>) -> Result<TokenKind, Error> {
    let line = cursor.line();
    cursor.next_byte();

    let mut pattern = String::new();
    let mut in_class = false;
    loop {
        let Some(cp) = cursor.peek_char() else {
            return Err(Error::syntax(
                "Unterminated regular expression literal",
                line,
            ));
        };
        if is_line_terminator(cp) {
            return Err(Error::syntax(
                "Unterminated regular expression literal",
                line,
            ));
        }
        cursor.next_char();
        match cp {
            0x2F if !in_class => break,
            0x5B => in_class = true,
            0x5D => in_class = false,
            0x5C => {
                pattern.push('\\');
                let Some(escaped) = cursor.peek_char() else {
                    return Err(Error::syntax(
                        "Unterminated regular expression literal",
                        line,
                    ));
                };
                if is_line_terminator(escaped) {
                    return Err(Error::syntax(
                        "Unterminated regular expression literal",
                        line,
                    ));
                }
                cursor.next_char();
                pattern.push(char::from_u32(escaped).unwrap_or('\u{FFFD}'));
                continue;
            }
            _ => {}
        }
        if cp != 0x2F || in_class {
            pattern.push(char::from_u32(cp).unwrap_or('\u{FFFD}'));
        }
    }

    let mut flags = String::new();
    while let Some(byte) = cursor.peek_byte() {
        if !byte.is_ascii_alphabetic() {
            break;
        }
        cursor.next_byte();
        flags.push(char::from(byte));
    }

    Ok(TokenKind::RegExp {
        pattern: pattern.into(),
        flags: flags.into(),
    })
}
