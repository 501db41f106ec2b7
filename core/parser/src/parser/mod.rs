//! The Adder recursive-descent parser.

mod expression;
mod statement;

use crate::{
    error::Error,
    lexer::{Token, TokenKind},
    ParserOptions,
};
use adder_ast::{
    scope::{DeclarationKind, ScopeId, ScopeTree},
    Keyword, Punctuator, Script, Statement,
};

/// A cursor over a lexed token buffer.
///
/// Template literals carry their own nested buffers, so several streams can
/// be live at once while a template is being parsed.
#[derive(Debug)]
pub(crate) struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    last_line: u32,
}

impl TokenStream {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            last_line: 1,
        }
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    pub(crate) fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        self.last_line = token.line;
        Some(token)
    }

    pub(crate) fn advance(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.last_line = token.line;
        }
        self.pos += 1;
    }

    /// Line of the next token, or of the last consumed one at end of input.
    pub(crate) fn line(&self) -> u32 {
        self.peek().map_or(self.last_line, |token| token.line)
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Consumes the next token if it is the given punctuator.
    pub(crate) fn accept(&mut self, punctuator: Punctuator) -> bool {
        if self.is(punctuator) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn is(&self, punctuator: Punctuator) -> bool {
        matches!(
            self.peek(),
            Some(Token {
                kind: TokenKind::Punctuator(p),
                ..
            }) if *p == punctuator
        )
    }

    pub(crate) fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(
            self.peek(),
            Some(Token {
                kind: TokenKind::Keyword(k),
                ..
            }) if *k == keyword
        )
    }

    pub(crate) fn accept_keyword(&mut self, keyword: Keyword) -> bool {
        if self.is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }
}

// A label currently in scope, with whether it labels an iteration statement
// (only those are valid `continue` targets).
#[derive(Debug)]
struct Label {
    name: Box<str>,
    iteration: bool,
}

/// The ECMAScript parser.
#[derive(Debug)]
pub struct Parser {
    stream: TokenStream,
    options: ParserOptions,
    scope_tree: ScopeTree,
    scopes: Vec<ScopeId>,
    labels: Vec<Label>,
    iteration_depth: u32,
    switch_depth: u32,
    function_depth: u32,
}

impl Parser {
    /// Creates a new parser over a lexed token buffer.
    #[must_use]
    pub fn new(tokens: Vec<Token>, options: ParserOptions) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            options,
            scope_tree: ScopeTree::new(),
            scopes: vec![ScopeId::GLOBAL],
            labels: Vec::new(),
            iteration_depth: 0,
            switch_depth: 0,
            function_depth: 0,
        }
    }

    /// Parses the whole token buffer into a [`Script`], running scope
    /// analysis before returning.
    pub fn parse_script(mut self) -> Result<Script, Error> {
        let mut statements = Vec::new();
        while !self.stream.at_end() {
            let statement = self.parse_source_element()?;
            statements.push(statement);
        }
        let statements = statements.into_boxed_slice();
        self.scope_tree.analyze(&statements);
        self.scope_tree.finalize();
        Ok(Script::new(statements, self.scope_tree, self.options.module))
    }

    fn current_scope(&self) -> ScopeId {
        *self.scopes.last().expect("scope stack is never empty")
    }

    fn error<M: Into<Box<str>>>(&self, message: M) -> Error {
        Error::syntax(message, self.stream.line())
    }

    fn unexpected(&mut self) -> Error {
        match self.stream.peek() {
            Some(token) => {
                let message = format!("Unexpected token \"{}\"", token.kind);
                Error::syntax(message, token.line)
            }
            None => Error::syntax("Unexpected end of input", self.stream.line()),
        }
    }

    fn expect(&mut self, punctuator: Punctuator) -> Result<(), Error> {
        if self.stream.accept(punctuator) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), Error> {
        if self.stream.accept_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_identifier(&mut self) -> Result<(Box<str>, u32), Error> {
        match self.stream.peek() {
            Some(Token {
                kind: TokenKind::Identifier(_),
                ..
            }) => {
                let Some(Token {
                    kind: TokenKind::Identifier(name),
                    line,
                    ..
                }) = self.stream.next()
                else {
                    unreachable!("peeked identifier");
                };
                Ok((name, line))
            }
            _ => Err(self.unexpected()),
        }
    }

    // Automatic semicolon insertion: an explicit `;`, a closing brace, end
    // of input or a preceding line terminator all end the statement.
    fn consume_semicolon(&mut self) -> Result<(), Error> {
        match self.stream.peek() {
            None => Ok(()),
            Some(token) => match &token.kind {
                TokenKind::Punctuator(Punctuator::Semicolon) => {
                    self.stream.advance();
                    Ok(())
                }
                TokenKind::Punctuator(Punctuator::CloseBlock) => Ok(()),
                _ if token.newline_before => Ok(()),
                _ => Err(self.unexpected()),
            },
        }
    }

    fn declare(&mut self, name: &str, kind: DeclarationKind, line: u32) -> Result<(), Error> {
        if name == "arguments" {
            return Err(Error::syntax(
                "Identifier \"arguments\" is forbidden as a declared name",
                line,
            ));
        }
        let scope = self.current_scope();
        self.scope_tree
            .declare(scope, name, kind)
            .map_err(|err| Error::syntax(err.to_string(), line))
    }

    fn parse_source_element(&mut self) -> Result<Statement, Error> {
        match self.stream.peek().map(|token| &token.kind) {
            Some(TokenKind::Keyword(Keyword::Import)) => self.parse_import(),
            Some(TokenKind::Keyword(Keyword::Export)) => self.parse_export(),
            Some(TokenKind::Keyword(Keyword::Function)) => self.parse_function_declaration(),
            _ => self.parse_statement(),
        }
    }
}
