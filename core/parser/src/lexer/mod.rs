//! The Adder lexer.
//!
//! Tokenises a whole source text in one pass. Template literals make the
//! lexer re-enter itself: the tokens of every `${…}` block are lexed
//! recursively and stored inside the template token, so the parser never has
//! to switch lexer modes.

mod cursor;
mod number;
mod regex;
mod string;
mod token;

pub use token::{TemplatePart, Token, TokenKind};

use self::cursor::{is_line_terminator, is_whitespace, Cursor};
use crate::{error::Error, ParserOptions, Source};
use adder_ast::{Keyword, Punctuator};

/// Keyword table of the shared world, resolved at compile time.
static KEYWORDS: phf::Map<&'static str, Keyword> = phf::phf_map! {
    "break" => Keyword::Break,
    "case" => Keyword::Case,
    "catch" => Keyword::Catch,
    "class" => Keyword::Class,
    "const" => Keyword::Const,
    "continue" => Keyword::Continue,
    "debugger" => Keyword::Debugger,
    "default" => Keyword::Default,
    "delete" => Keyword::Delete,
    "do" => Keyword::Do,
    "else" => Keyword::Else,
    "enum" => Keyword::Enum,
    "export" => Keyword::Export,
    "extends" => Keyword::Extends,
    "finally" => Keyword::Finally,
    "for" => Keyword::For,
    "function" => Keyword::Function,
    "if" => Keyword::If,
    "import" => Keyword::Import,
    "in" => Keyword::In,
    "instanceof" => Keyword::InstanceOf,
    "let" => Keyword::Let,
    "new" => Keyword::New,
    "return" => Keyword::Return,
    "super" => Keyword::Super,
    "switch" => Keyword::Switch,
    "this" => Keyword::This,
    "throw" => Keyword::Throw,
    "try" => Keyword::Try,
    "typeof" => Keyword::TypeOf,
    "var" => Keyword::Var,
    "void" => Keyword::Void,
    "while" => Keyword::While,
    "with" => Keyword::With,
    "yield" => Keyword::Yield,
};

/// The ECMAScript lexer.
#[derive(Debug)]
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    options: ParserOptions,
    regex_allowed: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over `source`.
    #[must_use]
    pub fn new(source: Source<'a>, options: ParserOptions) -> Self {
        Self {
            cursor: Cursor::new(source.bytes()),
            options,
            regex_allowed: true,
        }
    }

    /// Lexes the whole source into a token buffer.
    pub fn lex(mut self) -> Result<Vec<Token>, Error> {
        self.lex_until(false)
    }

    fn error<M: Into<Box<str>>>(&self, message: M) -> Error {
        Error::syntax(message, self.cursor.line())
    }

    // Lexes tokens until end of input, or until the `}` closing a template
    // `${…}` block when `stop_at_close_block` is set.
    fn lex_until(&mut self, stop_at_close_block: bool) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        loop {
            let newline_before = self.skip_whitespace_and_comments()?;
            if self.cursor.is_at_end() {
                if stop_at_close_block {
                    return Err(self.error("Unterminated template literal"));
                }
                break;
            }
            if stop_at_close_block && depth == 0 && self.cursor.peek_byte() == Some(b'}') {
                self.cursor.next_byte();
                break;
            }
            let line = self.cursor.line();
            let column = self.cursor.column();
            let kind = self.next_token_kind()?;
            if stop_at_close_block {
                match kind {
                    TokenKind::Punctuator(Punctuator::OpenBlock) => depth += 1,
                    TokenKind::Punctuator(Punctuator::CloseBlock) => {
                        depth = depth
                            .checked_sub(1)
                            .ok_or_else(|| self.error("Unterminated template literal"))?;
                    }
                    _ => {}
                }
            }
            self.regex_allowed = kind.allows_regexp();
            tokens.push(Token {
                kind,
                line,
                column,
                newline_before,
            });
        }
        Ok(tokens)
    }

    // Skips whitespace and comments, reporting whether a line terminator was
    // crossed.
    fn skip_whitespace_and_comments(&mut self) -> Result<bool, Error> {
        let mut newline = false;
        loop {
            let Some(cp) = self.cursor.peek_char() else {
                return Ok(newline);
            };
            if is_line_terminator(cp) {
                newline = true;
                self.cursor.next_char();
                continue;
            }
            if is_whitespace(cp) {
                self.cursor.next_char();
                continue;
            }
            if cp == u32::from(b'/') {
                match self.cursor.peek_byte_at(1) {
                    Some(b'/') => {
                        self.cursor.next_byte();
                        self.cursor.next_byte();
                        while let Some(cp) = self.cursor.peek_char() {
                            if is_line_terminator(cp) {
                                break;
                            }
                            self.cursor.next_char();
                        }
                        continue;
                    }
                    Some(b'*') => {
                        self.cursor.next_byte();
                        self.cursor.next_byte();
                        let mut closed = false;
                        while let Some(cp) = self.cursor.next_char() {
                            if is_line_terminator(cp) {
                                newline = true;
                            }
                            if cp == u32::from(b'*') && self.cursor.next_if(b'/') {
                                closed = true;
                                break;
                            }
                        }
                        if !closed {
                            return Err(self.error("Unterminated multi-line comment"));
                        }
                        continue;
                    }
                    _ => return Ok(newline),
                }
            }
            return Ok(newline);
        }
    }

    fn next_token_kind(&mut self) -> Result<TokenKind, Error> {
        let byte = self
            .cursor
            .peek_byte()
            .expect("caller checked for end of input");
        match byte {
            b'0'..=b'9' => number::lex(&mut self.cursor, &self.options),
            b'.' => {
                if matches!(self.cursor.peek_byte_at(1), Some(b'0'..=b'9')) {
                    number::lex(&mut self.cursor, &self.options)
                } else {
                    self.lex_punctuator()
                }
            }
            b'"' | b'\'' => string::lex_string(&mut self.cursor),
            b'`' => self.lex_template(),
            b'/' if self.regex_allowed => regex::lex(&mut self.cursor),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => Ok(self.lex_identifier()),
            byte if byte >= 0x80 => Ok(self.lex_identifier()),
            _ => self.lex_punctuator(),
        }
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(cp) = self.cursor.peek_char() {
            let continues = match u8::try_from(cp) {
                Ok(byte) => byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$',
                Err(_) => !is_whitespace(cp) && !is_line_terminator(cp) && cp != cursor::REPLACEMENT,
            };
            if !continues {
                break;
            }
            let cp = self.cursor.next_char().expect("peeked code point");
            name.push(char::from_u32(cp).unwrap_or('\u{FFFD}'));
        }
        if let Some(&keyword) = KEYWORDS.get(&name) {
            return TokenKind::Keyword(keyword);
        }
        match &*name {
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            "null" => TokenKind::Null,
            _ => TokenKind::Identifier(name.into()),
        }
    }

    fn lex_template(&mut self) -> Result<TokenKind, Error> {
        self.cursor.next_byte();
        let mut parts = Vec::new();
        loop {
            let (fragment, terminator) = string::lex_template_fragment(&mut self.cursor)?;
            parts.push(TemplatePart::String(fragment.into_boxed_slice()));
            match terminator {
                string::TemplateTerminator::End => break,
                string::TemplateTerminator::Substitution => {
                    let saved = self.regex_allowed;
                    self.regex_allowed = true;
                    let tokens = self.lex_until(true)?;
                    self.regex_allowed = saved;
                    parts.push(TemplatePart::Tokens(tokens));
                }
            }
        }
        Ok(TokenKind::Template(parts))
    }

    fn lex_punctuator(&mut self) -> Result<TokenKind, Error> {
        use Punctuator as P;
        let byte = self.cursor.next_byte().expect("caller checked the byte");
        let punctuator = match byte {
            b'{' => P::OpenBlock,
            b'}' => P::CloseBlock,
            b'(' => P::OpenParen,
            b')' => P::CloseParen,
            b'[' => P::OpenBracket,
            b']' => P::CloseBracket,
            b';' => P::Semicolon,
            b',' => P::Comma,
            b':' => P::Colon,
            b'?' => P::Question,
            b'~' => P::Neg,
            b'.' => {
                if self.cursor.peek_byte() == Some(b'.') && self.cursor.peek_byte_at(1) == Some(b'.')
                {
                    self.cursor.next_byte();
                    self.cursor.next_byte();
                    P::Spread
                } else {
                    P::Dot
                }
            }
            b'+' => {
                if self.cursor.next_if(b'+') {
                    P::Inc
                } else if self.cursor.next_if(b'=') {
                    P::AssignAdd
                } else {
                    P::Add
                }
            }
            b'-' => {
                if self.cursor.next_if(b'-') {
                    P::Dec
                } else if self.cursor.next_if(b'=') {
                    P::AssignSub
                } else {
                    P::Sub
                }
            }
            b'*' => {
                if self.cursor.next_if(b'*') {
                    if self.cursor.next_if(b'=') {
                        P::AssignPow
                    } else {
                        P::Pow
                    }
                } else if self.cursor.next_if(b'=') {
                    P::AssignMul
                } else {
                    P::Mul
                }
            }
            b'/' => {
                if self.cursor.next_if(b'=') {
                    P::AssignDiv
                } else {
                    P::Div
                }
            }
            b'%' => {
                if self.cursor.next_if(b'=') {
                    P::AssignMod
                } else {
                    P::Mod
                }
            }
            b'&' => {
                if self.cursor.next_if(b'&') {
                    P::BoolAnd
                } else if self.cursor.next_if(b'=') {
                    P::AssignAnd
                } else {
                    P::And
                }
            }
            b'|' => {
                if self.cursor.next_if(b'|') {
                    P::BoolOr
                } else if self.cursor.next_if(b'=') {
                    P::AssignOr
                } else {
                    P::Or
                }
            }
            b'^' => {
                if self.cursor.next_if(b'=') {
                    P::AssignXor
                } else {
                    P::Xor
                }
            }
            b'!' => {
                if self.cursor.next_if(b'=') {
                    if self.cursor.next_if(b'=') {
                        P::StrictNotEq
                    } else {
                        P::NotEq
                    }
                } else {
                    P::Not
                }
            }
            b'=' => {
                if self.cursor.next_if(b'=') {
                    if self.cursor.next_if(b'=') {
                        P::StrictEq
                    } else {
                        P::Eq
                    }
                } else if self.cursor.next_if(b'>') {
                    P::Arrow
                } else {
                    P::Assign
                }
            }
            b'<' => {
                if self.cursor.next_if(b'<') {
                    if self.cursor.next_if(b'=') {
                        P::AssignLeftSh
                    } else {
                        P::LeftSh
                    }
                } else if self.cursor.next_if(b'=') {
                    P::LessThanOrEq
                } else {
                    P::LessThan
                }
            }
            b'>' => {
                if self.cursor.next_if(b'>') {
                    if self.cursor.next_if(b'>') {
                        if self.cursor.next_if(b'=') {
                            P::AssignURightSh
                        } else {
                            P::URightSh
                        }
                    } else if self.cursor.next_if(b'=') {
                        P::AssignRightSh
                    } else {
                        P::RightSh
                    }
                } else if self.cursor.next_if(b'=') {
                    P::GreaterThanOrEq
                } else {
                    P::GreaterThan
                }
            }
            _ => {
                return Err(self.error(format!(
                    "Unexpected token \"{}\"",
                    char::from_u32(u32::from(byte)).unwrap_or('\u{FFFD}')
                )))
            }
        };
        Ok(TokenKind::Punctuator(punctuator))
    }
}
