//! The ECMAScript lexer and parser of the Adder JavaScript engine.
//!
//! The lexer tokenises a whole source text up front, which keeps the parser
//! free to look arbitrarily far ahead (arrow-function parameter lists and
//! `for … in` headers need it). The parser is a classic recursive-descent
//! parser over that token buffer; it builds [`adder_ast`] nodes and registers
//! declarations into the scope tree as it goes, so that capture analysis and
//! slot assignment can run right after parsing.
//!
//! The accepted grammar is a `var`-only ECMAScript 5.1 subset extended with
//! arrow functions, rest parameters, spread elements, template literals and
//! destructuring in declarations and assignments. See the crate level
//! documentation of `adder_engine` for the exact language surface.

pub mod error;
pub mod lexer;
pub mod parser;
mod source;

pub use error::Error;
pub use source::Source;

use adder_ast::Script;

/// Parser options supplied by the embedding context.
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Treat the source as a module: top level `import`/`export` allowed.
    pub module: bool,
    /// Keep subnormal number literals instead of flushing them to zero.
    pub denormals: bool,
    /// Maximum function nesting depth before parsing is aborted.
    pub max_nesting: u32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            module: false,
            denormals: true,
            max_nesting: 256,
        }
    }
}

/// Parses a whole source text into a [`Script`].
///
/// This is the single entry point of the crate: it runs the lexer, the
/// parser and the scope analysis in sequence.
pub fn parse(source: Source<'_>, options: ParserOptions) -> Result<Script, Error> {
    let tokens = lexer::Lexer::new(source, options).lex()?;
    parser::Parser::new(tokens, options).parse_script()
}

#[cfg(test)]
mod tests;
