//! Statement parsing.

use super::{Label, Parser};
use crate::{
    error::Error,
    lexer::{Token, TokenKind},
};
use adder_ast::{
    pattern::{ArrayPattern, ArrayPatternElement, ObjectPattern, ObjectPatternProperty, Pattern,
        PatternBinding},
    scope::DeclarationKind,
    statement::{
        Case, Catch, DoWhile, For, ForIn, ForInTarget, ForInit, If, Import, JumpStatement,
        Labelled, ReturnStatement, Statement, Switch, ThrowStatement, Try, VarDeclaration,
        VarDeclarationList, VarDeclarationTarget, While,
    },
    Keyword, Punctuator,
};

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Result<Statement, Error> {
        let Some(token) = self.stream.peek() else {
            return Err(self.unexpected());
        };
        match &token.kind {
            TokenKind::Punctuator(Punctuator::OpenBlock) => self.parse_block(),
            TokenKind::Punctuator(Punctuator::Semicolon) => {
                self.stream.advance();
                Ok(Statement::Empty)
            }
            TokenKind::Keyword(keyword) => match keyword {
                Keyword::Var => {
                    let statement = self.parse_var_statement()?;
                    self.consume_semicolon()?;
                    Ok(statement)
                }
                Keyword::If => self.parse_if(),
                Keyword::Do => self.parse_do_while(),
                Keyword::While => self.parse_while(),
                Keyword::For => self.parse_for(),
                Keyword::Continue => self.parse_continue(),
                Keyword::Break => self.parse_break(),
                Keyword::Return => self.parse_return(),
                Keyword::Switch => self.parse_switch(),
                Keyword::Throw => self.parse_throw(),
                Keyword::Try => self.parse_try(),
                Keyword::Function => Err(self.error(
                    "Functions can only be declared at top level or inside a block",
                )),
                Keyword::Import | Keyword::Export => {
                    Err(self.error("Module declarations are only allowed at top level"))
                }
                keyword if keyword.is_reserved() => {
                    let message = format!("Unexpected token \"{}\"", keyword.as_str());
                    Err(self.error(message))
                }
                _ => self.parse_expression_statement(),
            },
            TokenKind::Identifier(_) => {
                if matches!(
                    self.stream.peek_at(1),
                    Some(Token {
                        kind: TokenKind::Punctuator(Punctuator::Colon),
                        ..
                    })
                ) {
                    self.parse_labelled()
                } else {
                    self.parse_expression_statement()
                }
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, Error> {
        let expression = self.parse_expression(false)?;
        self.consume_semicolon()?;
        Ok(Statement::Expression(expression))
    }

    fn parse_block(&mut self) -> Result<Statement, Error> {
        self.expect(Punctuator::OpenBlock)?;
        let statements = self.parse_statement_list_until_close()?;
        Ok(Statement::Block(statements))
    }

    // Parses statements up to (and including) the closing brace. Function
    // declarations are allowed at the top level of a block.
    pub(super) fn parse_statement_list_until_close(&mut self) -> Result<Box<[Statement]>, Error> {
        let mut statements = Vec::new();
        loop {
            if self.stream.accept(Punctuator::CloseBlock) {
                break;
            }
            if self.stream.at_end() {
                return Err(self.unexpected());
            }
            let statement = if self.stream.is_keyword(Keyword::Function) {
                self.parse_function_declaration()?
            } else {
                self.parse_statement()?
            };
            statements.push(statement);
        }
        Ok(statements.into_boxed_slice())
    }

    pub(super) fn parse_function_declaration(&mut self) -> Result<Statement, Error> {
        let line = self.stream.line();
        self.expect_keyword(Keyword::Function)?;
        let (name, name_line) = self.expect_identifier()?;
        self.declare(&name, DeclarationKind::Function, name_line)?;
        let function = self.parse_function_rest(Some(name), false, line)?;
        Ok(Statement::FunctionDeclaration(Box::new(function)))
    }

    fn parse_var_statement(&mut self) -> Result<Statement, Error> {
        self.expect_keyword(Keyword::Var)?;
        let list = self.parse_var_declaration_list(false)?;
        Ok(Statement::Var(list))
    }

    // Parses the declarator list after `var`. `no_in` is set inside a `for`
    // head, where `in` terminates the list.
    fn parse_var_declaration_list(&mut self, no_in: bool) -> Result<VarDeclarationList, Error> {
        let mut list = Vec::new();
        loop {
            list.push(self.parse_var_declaration(no_in)?);
            if !self.stream.accept(Punctuator::Comma) {
                break;
            }
        }
        Ok(VarDeclarationList {
            list: list.into_boxed_slice(),
        })
    }

    fn parse_var_declaration(&mut self, no_in: bool) -> Result<VarDeclaration, Error> {
        if self.stream.is(Punctuator::OpenBracket) || self.stream.is(Punctuator::OpenBlock) {
            let line = self.stream.line();
            let pattern = self.parse_binding_pattern()?;
            let mut names = Vec::new();
            pattern.for_each_bound_name(&mut |name| names.push(name.to_owned()));
            for name in &names {
                self.declare(name, DeclarationKind::Var, line)?;
            }
            if !self.stream.accept(Punctuator::Assign) {
                return Err(Error::syntax(
                    "Missing initializer in destructuring declaration",
                    line,
                ));
            }
            let init = self.parse_assignment_expression(no_in)?;
            return Ok(VarDeclaration {
                target: VarDeclarationTarget::Pattern(pattern),
                init: Some(init),
            });
        }

        let (name, line) = self.expect_identifier()?;
        if &*name == "eval" {
            return Err(Error::syntax(
                "Identifier \"eval\" is forbidden as a declared name",
                line,
            ));
        }
        self.declare(&name, DeclarationKind::Var, line)?;
        let init = if self.stream.accept(Punctuator::Assign) {
            Some(self.parse_assignment_expression(no_in)?)
        } else {
            None
        };
        Ok(VarDeclaration {
            target: VarDeclarationTarget::Identifier(name),
            init,
        })
    }

    // Parses an array or object binding pattern for a declaration.
    fn parse_binding_pattern(&mut self) -> Result<Pattern, Error> {
        if self.stream.accept(Punctuator::OpenBracket) {
            let mut elements = Vec::new();
            let mut rest = None;
            loop {
                if self.stream.accept(Punctuator::CloseBracket) {
                    break;
                }
                if self.stream.accept(Punctuator::Comma) {
                    elements.push(ArrayPatternElement::Elision);
                    continue;
                }
                if self.stream.accept(Punctuator::Spread) {
                    rest = Some(self.parse_pattern_binding()?);
                    self.expect(Punctuator::CloseBracket)?;
                    break;
                }
                elements.push(ArrayPatternElement::Binding(self.parse_pattern_binding()?));
                if !self.stream.accept(Punctuator::Comma) {
                    self.expect(Punctuator::CloseBracket)?;
                    break;
                }
            }
            return Ok(Pattern::Array(ArrayPattern {
                elements: elements.into_boxed_slice(),
                rest,
            }));
        }

        self.expect(Punctuator::OpenBlock)?;
        let mut properties = Vec::new();
        loop {
            if self.stream.accept(Punctuator::CloseBlock) {
                break;
            }
            let (name, _) = self.expect_identifier()?;
            let binding = if self.stream.accept(Punctuator::Colon) {
                self.parse_pattern_binding()?
            } else {
                PatternBinding::Identifier(name.clone())
            };
            properties.push(ObjectPatternProperty { name, binding });
            if !self.stream.accept(Punctuator::Comma) {
                self.expect(Punctuator::CloseBlock)?;
                break;
            }
        }
        Ok(Pattern::Object(ObjectPattern {
            properties: properties.into_boxed_slice(),
        }))
    }

    fn parse_pattern_binding(&mut self) -> Result<PatternBinding, Error> {
        if self.stream.is(Punctuator::OpenBracket) || self.stream.is(Punctuator::OpenBlock) {
            Ok(PatternBinding::Pattern(Box::new(
                self.parse_binding_pattern()?,
            )))
        } else {
            let (name, _) = self.expect_identifier()?;
            Ok(PatternBinding::Identifier(name))
        }
    }

    fn parse_if(&mut self) -> Result<Statement, Error> {
        self.expect_keyword(Keyword::If)?;
        self.expect(Punctuator::OpenParen)?;
        let condition = self.parse_expression(false)?;
        self.expect(Punctuator::CloseParen)?;
        let body = self.parse_statement()?;
        let else_node = if self.stream.accept_keyword(Keyword::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(Statement::If(Box::new(If {
            condition,
            body,
            else_node,
        })))
    }

    fn parse_do_while(&mut self) -> Result<Statement, Error> {
        self.expect_keyword(Keyword::Do)?;
        self.iteration_depth += 1;
        let body = self.parse_statement();
        self.iteration_depth -= 1;
        let body = body?;
        self.expect_keyword(Keyword::While)?;
        self.expect(Punctuator::OpenParen)?;
        let condition = self.parse_expression(false)?;
        self.expect(Punctuator::CloseParen)?;
        // The semicolon of `do … while ();` is always insertable.
        self.stream.accept(Punctuator::Semicolon);
        Ok(Statement::DoWhile(Box::new(DoWhile { body, condition })))
    }

    fn parse_while(&mut self) -> Result<Statement, Error> {
        self.expect_keyword(Keyword::While)?;
        self.expect(Punctuator::OpenParen)?;
        let condition = self.parse_expression(false)?;
        self.expect(Punctuator::CloseParen)?;
        self.iteration_depth += 1;
        let body = self.parse_statement();
        self.iteration_depth -= 1;
        Ok(Statement::While(Box::new(While {
            condition,
            body: body?,
        })))
    }

    fn parse_for(&mut self) -> Result<Statement, Error> {
        self.expect_keyword(Keyword::For)?;
        self.expect(Punctuator::OpenParen)?;

        let init = if self.stream.is(Punctuator::Semicolon) {
            None
        } else if self.stream.is_keyword(Keyword::Var) {
            self.stream.advance();
            let list = self.parse_var_declaration_list(true)?;
            if self.stream.accept_keyword(Keyword::In) {
                let target = Self::single_var_name(&list)
                    .ok_or_else(|| self.error("Invalid left-hand side in for-in loop"))?;
                return self.parse_for_in_rest(ForInTarget::Var(target));
            }
            Some(ForInit::Var(list))
        } else {
            let expression = self.parse_expression(true)?;
            if self.stream.accept_keyword(Keyword::In) {
                let target = Self::expression_to_assign_target(expression, false)
                    .ok_or_else(|| self.error("Invalid left-hand side in for-in loop"))?;
                return self.parse_for_in_rest(ForInTarget::Assign(target));
            }
            Some(ForInit::Expression(expression))
        };

        self.expect(Punctuator::Semicolon)?;
        let condition = if self.stream.is(Punctuator::Semicolon) {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect(Punctuator::Semicolon)?;
        let step = if self.stream.is(Punctuator::CloseParen) {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect(Punctuator::CloseParen)?;

        self.iteration_depth += 1;
        let body = self.parse_statement();
        self.iteration_depth -= 1;
        Ok(Statement::For(Box::new(For {
            init,
            condition,
            step,
            body: body?,
        })))
    }

    fn single_var_name(list: &VarDeclarationList) -> Option<Box<str>> {
        match &*list.list {
            [VarDeclaration {
                target: VarDeclarationTarget::Identifier(name),
                init: None,
            }] => Some(name.clone()),
            _ => None,
        }
    }

    fn parse_for_in_rest(&mut self, target: ForInTarget) -> Result<Statement, Error> {
        let object = self.parse_expression(false)?;
        self.expect(Punctuator::CloseParen)?;
        self.iteration_depth += 1;
        let body = self.parse_statement();
        self.iteration_depth -= 1;
        Ok(Statement::ForIn(Box::new(ForIn {
            target,
            object,
            body: body?,
        })))
    }

    fn parse_continue(&mut self) -> Result<Statement, Error> {
        let line = self.stream.line();
        self.expect_keyword(Keyword::Continue)?;
        let label = self.parse_jump_label();
        match &label {
            Some(name) => {
                let found = self.labels.iter().find(|label| label.name == *name);
                match found {
                    Some(label) if label.iteration => {}
                    Some(_) => return Err(Error::syntax("Illegal continue statement", line)),
                    None => {
                        return Err(Error::syntax(format!("Undefined label \"{name}\""), line));
                    }
                }
            }
            None if self.iteration_depth == 0 => {
                return Err(Error::syntax("Illegal continue statement", line));
            }
            None => {}
        }
        self.consume_semicolon()?;
        Ok(Statement::Continue(JumpStatement { label, line }))
    }

    fn parse_break(&mut self) -> Result<Statement, Error> {
        let line = self.stream.line();
        self.expect_keyword(Keyword::Break)?;
        let label = self.parse_jump_label();
        match &label {
            Some(name) => {
                if !self.labels.iter().any(|label| label.name == *name) {
                    return Err(Error::syntax(format!("Undefined label \"{name}\""), line));
                }
            }
            None if self.iteration_depth == 0 && self.switch_depth == 0 => {
                return Err(Error::syntax("Illegal break statement", line));
            }
            None => {}
        }
        self.consume_semicolon()?;
        Ok(Statement::Break(JumpStatement { label, line }))
    }

    // `break`/`continue` labels are restricted productions: a line
    // terminator before the label ends the statement instead.
    fn parse_jump_label(&mut self) -> Option<Box<str>> {
        match self.stream.peek() {
            Some(Token {
                kind: TokenKind::Identifier(_),
                newline_before: false,
                ..
            }) => match self.stream.next() {
                Some(Token {
                    kind: TokenKind::Identifier(name),
                    ..
                }) => Some(name),
                _ => unreachable!("peeked identifier"),
            },
            _ => None,
        }
    }

    fn parse_return(&mut self) -> Result<Statement, Error> {
        let line = self.stream.line();
        self.expect_keyword(Keyword::Return)?;
        if self.function_depth == 0 {
            return Err(Error::syntax("Illegal return statement", line));
        }
        let expression = match self.stream.peek() {
            None => None,
            Some(token) if token.newline_before => None,
            Some(Token {
                kind:
                    TokenKind::Punctuator(Punctuator::Semicolon | Punctuator::CloseBlock),
                ..
            }) => None,
            Some(_) => Some(Box::new(self.parse_expression(false)?)),
        };
        self.consume_semicolon()?;
        Ok(Statement::Return(ReturnStatement { expression, line }))
    }

    fn parse_labelled(&mut self) -> Result<Statement, Error> {
        let mut names = Vec::new();
        loop {
            let is_label = matches!(
                (self.stream.peek(), self.stream.peek_at(1)),
                (
                    Some(Token {
                        kind: TokenKind::Identifier(_),
                        ..
                    }),
                    Some(Token {
                        kind: TokenKind::Punctuator(Punctuator::Colon),
                        ..
                    }),
                )
            );
            if !is_label {
                break;
            }
            let (name, line) = self.expect_identifier()?;
            self.stream.advance();
            if self.labels.iter().any(|label| label.name == name)
                || names.iter().any(|existing| *existing == name)
            {
                return Err(Error::syntax(
                    format!("Label \"{name}\" has already been declared"),
                    line,
                ));
            }
            names.push(name);
        }

        let iteration = matches!(
            self.stream.peek(),
            Some(Token {
                kind: TokenKind::Keyword(Keyword::For | Keyword::While | Keyword::Do),
                ..
            })
        );
        for name in &names {
            self.labels.push(Label {
                name: name.clone(),
                iteration,
            });
        }
        let body = self.parse_statement();
        self.labels.truncate(self.labels.len() - names.len());
        let mut statement = body?;
        for name in names.into_iter().rev() {
            statement = Statement::Labelled(Box::new(Labelled {
                label: name,
                body: statement,
            }));
        }
        Ok(statement)
    }

    fn parse_switch(&mut self) -> Result<Statement, Error> {
        self.expect_keyword(Keyword::Switch)?;
        self.expect(Punctuator::OpenParen)?;
        let discriminant = self.parse_expression(false)?;
        self.expect(Punctuator::CloseParen)?;
        self.expect(Punctuator::OpenBlock)?;

        self.switch_depth += 1;
        let result = self.parse_switch_cases();
        self.switch_depth -= 1;
        let cases = result?;

        Ok(Statement::Switch(Box::new(Switch {
            discriminant,
            cases,
        })))
    }

    fn parse_switch_cases(&mut self) -> Result<Box<[Case]>, Error> {
        let mut cases = Vec::new();
        let mut seen_default = false;
        loop {
            if self.stream.accept(Punctuator::CloseBlock) {
                break;
            }
            let test = if self.stream.accept_keyword(Keyword::Case) {
                let test = self.parse_expression(false)?;
                Some(test)
            } else if self.stream.is_keyword(Keyword::Default) {
                let line = self.stream.line();
                self.stream.advance();
                if seen_default {
                    return Err(Error::syntax(
                        "More than one default clause in switch statement",
                        line,
                    ));
                }
                seen_default = true;
                None
            } else {
                return Err(self.unexpected());
            };
            self.expect(Punctuator::Colon)?;

            let mut body = Vec::new();
            loop {
                match self.stream.peek() {
                    None => return Err(self.unexpected()),
                    Some(Token {
                        kind:
                            TokenKind::Keyword(Keyword::Case | Keyword::Default)
                            | TokenKind::Punctuator(Punctuator::CloseBlock),
                        ..
                    }) => break,
                    Some(Token {
                        kind: TokenKind::Keyword(Keyword::Function),
                        ..
                    }) => body.push(self.parse_function_declaration()?),
                    Some(_) => body.push(self.parse_statement()?),
                }
            }
            cases.push(Case {
                test,
                body: body.into_boxed_slice(),
            });
        }
        Ok(cases.into_boxed_slice())
    }

    fn parse_throw(&mut self) -> Result<Statement, Error> {
        let line = self.stream.line();
        self.expect_keyword(Keyword::Throw)?;
        if self.stream.peek().is_some_and(|token| token.newline_before) {
            return Err(Error::syntax("Illegal newline after throw", line));
        }
        let expression = self.parse_expression(false)?;
        self.consume_semicolon()?;
        Ok(Statement::Throw(ThrowStatement {
            expression: Box::new(expression),
        }))
    }

    fn parse_try(&mut self) -> Result<Statement, Error> {
        let line = self.stream.line();
        self.expect_keyword(Keyword::Try)?;
        self.expect(Punctuator::OpenBlock)?;
        let block = self.parse_statement_list_until_close()?;

        let catch = if self.stream.accept_keyword(Keyword::Catch) {
            let parameter = if self.stream.accept(Punctuator::OpenParen) {
                let (name, name_line) = self.expect_identifier()?;
                self.declare(&name, DeclarationKind::CatchParameter, name_line)?;
                self.expect(Punctuator::CloseParen)?;
                Some(name)
            } else {
                None
            };
            self.expect(Punctuator::OpenBlock)?;
            let block = self.parse_statement_list_until_close()?;
            Some(Catch { parameter, block })
        } else {
            None
        };

        let finally = if self.stream.accept_keyword(Keyword::Finally) {
            self.expect(Punctuator::OpenBlock)?;
            Some(self.parse_statement_list_until_close()?)
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            return Err(Error::syntax("Missing catch or finally after try", line));
        }
        Ok(Statement::Try(Box::new(Try {
            block,
            catch,
            finally,
        })))
    }

    pub(super) fn parse_import(&mut self) -> Result<Statement, Error> {
        let line = self.stream.line();
        if !self.options.module {
            return Err(Error::syntax(
                "Cannot use import statement outside a module",
                line,
            ));
        }
        self.expect_keyword(Keyword::Import)?;
        let (binding, binding_line) = self.expect_identifier()?;
        self.declare(&binding, DeclarationKind::Var, binding_line)?;
        match self.stream.next() {
            Some(Token {
                kind: TokenKind::Identifier(from),
                ..
            }) if &*from == "from" => {}
            _ => return Err(self.unexpected()),
        }
        let specifier = match self.stream.next() {
            Some(Token {
                kind: TokenKind::String(bytes),
                line,
                ..
            }) => String::from_utf8(bytes.into_vec())
                .map_err(|_| Error::syntax("Invalid module specifier", line))?,
            _ => return Err(self.unexpected()),
        };
        self.consume_semicolon()?;
        Ok(Statement::Import(Import {
            binding,
            specifier: specifier.into(),
            line,
        }))
    }

    pub(super) fn parse_export(&mut self) -> Result<Statement, Error> {
        let line = self.stream.line();
        if !self.options.module {
            return Err(Error::syntax(
                "Cannot use export statement outside a module",
                line,
            ));
        }
        self.expect_keyword(Keyword::Export)?;
        self.expect_keyword(Keyword::Default)?;
        let expression = self.parse_assignment_expression(false)?;
        self.consume_semicolon()?;
        Ok(Statement::ExportDefault(Box::new(expression)))
    }
}
