//! Token definitions.

use adder_ast::{Keyword, Punctuator};
use std::fmt;

/// One token of the source text.
#[derive(Debug, Clone)]
pub struct Token {
    /// The token kind and payload.
    pub kind: TokenKind,
    /// 1-based line the token starts on.
    pub line: u32,
    /// 1-based column the token starts on.
    pub column: u32,
    /// `true` if at least one line terminator preceded this token, which
    /// drives automatic semicolon insertion and restricted productions.
    pub newline_before: bool,
}

/// The kind of a token, with its payload.
#[derive(Debug, Clone)]
pub enum TokenKind {
    /// A boolean literal.
    Boolean(bool),
    /// The `null` literal.
    Null,
    /// An identifier.
    Identifier(Box<str>),
    /// A keyword or reserved word.
    Keyword(Keyword),
    /// A numeric literal.
    Numeric(f64),
    /// A string literal, cooked into WTF-8 bytes.
    String(Box<[u8]>),
    /// A template literal: cooked fragments interleaved with the token
    /// streams of its `${…}` blocks.
    Template(Vec<TemplatePart>),
    /// A regular expression literal.
    RegExp {
        /// Pattern between the slashes.
        pattern: Box<str>,
        /// Flags after the closing slash.
        flags: Box<str>,
    },
    /// A punctuator.
    Punctuator(Punctuator),
}

/// One part of a lexed template literal.
#[derive(Debug, Clone)]
pub enum TemplatePart {
    /// A cooked string fragment.
    String(Box<[u8]>),
    /// The tokens of one `${…}` block, re-lexed recursively.
    Tokens(Vec<Token>),
}

impl TokenKind {
    /// Returns `true` if a regular expression literal may directly follow
    /// this token. Tokens that can end an expression force `/` to be lexed
    /// as division instead.
    #[must_use]
    pub(crate) fn allows_regexp(&self) -> bool {
        match self {
            Self::Identifier(_)
            | Self::Numeric(_)
            | Self::String(_)
            | Self::Template(_)
            | Self::RegExp { .. }
            | Self::Boolean(_)
            | Self::Null => false,
            Self::Keyword(keyword) => !matches!(keyword, Keyword::This),
            Self::Punctuator(punctuator) => !matches!(
                punctuator,
                Punctuator::CloseParen
                    | Punctuator::CloseBracket
                    | Punctuator::Inc
                    | Punctuator::Dec
            ),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Null => f.write_str("null"),
            Self::Identifier(name) => f.write_str(name),
            Self::Keyword(keyword) => f.write_str(keyword.as_str()),
            Self::Numeric(number) => write!(f, "{number}"),
            Self::String(_) => f.write_str("string"),
            Self::Template(_) => f.write_str("template"),
            Self::RegExp { pattern, flags } => write!(f, "/{pattern}/{flags}"),
            Self::Punctuator(punctuator) => f.write_str(punctuator.as_str()),
        }
    }
}
