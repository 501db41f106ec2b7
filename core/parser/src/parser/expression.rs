//! Expression parsing.

use super::{Parser, TokenStream};
use crate::{
    error::Error,
    lexer::{self, Token, TokenKind},
};
use adder_ast::statement::{ReturnStatement, Statement};
use adder_ast::{
    expression::{
        ArrayElement, ArrayLiteral, Assign, AssignTarget, Binary, Call, Conditional, Expression,
        Identifier, Literal, New, ObjectLiteral, PropertyAccess, PropertyAccessField,
        PropertyDefinition, PropertyName, RegExpLiteral, TemplateLiteral, TemplatePart, Unary,
        Update,
    },
    function::{FormalParameterList, FunctionExpression, FunctionKind},
    op::{BinaryOp, UnaryOp, UpdateOp},
    pattern::{
        ArrayPattern, ArrayPatternElement, ObjectPattern, ObjectPatternProperty, Pattern,
        PatternBinding,
    },
    scope::DeclarationKind,
    Keyword, Punctuator,
};

// Binding powers for the precedence climbing binary parser.
const fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::LogicalOr => 1,
        BinaryOp::LogicalAnd => 2,
        BinaryOp::BitOr => 3,
        BinaryOp::BitXor => 4,
        BinaryOp::BitAnd => 5,
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 6,
        BinaryOp::LessThan
        | BinaryOp::LessThanOrEq
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterThanOrEq
        | BinaryOp::In
        | BinaryOp::InstanceOf => 7,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 8,
        BinaryOp::Add | BinaryOp::Sub => 9,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 10,
        BinaryOp::Exp => 11,
    }
}

impl Parser {
    // `Expression`: assignment expressions separated by commas.
    pub(super) fn parse_expression(&mut self, no_in: bool) -> Result<Expression, Error> {
        let first = self.parse_assignment_expression(no_in)?;
        if !self.stream.is(Punctuator::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.stream.accept(Punctuator::Comma) {
            expressions.push(self.parse_assignment_expression(no_in)?);
        }
        Ok(Expression::Sequence(expressions.into_boxed_slice()))
    }

    pub(super) fn parse_assignment_expression(&mut self, no_in: bool) -> Result<Expression, Error> {
        // Arrow functions need unbounded lookahead: `(a, b) => …` reparses
        // badly as a parenthesized expression, so detect the arrow first.
        if self.is_arrow_ahead() {
            return self.parse_arrow_function();
        }

        let lhs = self.parse_conditional_expression(no_in)?;

        let Some(op) = self.stream.peek().and_then(|token| match &token.kind {
            TokenKind::Punctuator(punctuator) => punctuator.as_assign_op(),
            _ => None,
        }) else {
            return Ok(lhs);
        };
        let line = self.stream.line();
        self.stream.advance();

        let allow_pattern = op.binary_op().is_none();
        let target = Self::expression_to_assign_target(lhs, allow_pattern)
            .ok_or_else(|| Error::syntax("Invalid left-hand side in assignment", line))?;
        if let AssignTarget::Identifier(identifier) = &target {
            if &*identifier.name == "eval" {
                return Err(Error::syntax(
                    "Identifier \"eval\" is forbidden as left-hand side in assignment",
                    line,
                ));
            }
        }
        let rhs = self.parse_assignment_expression(no_in)?;
        Ok(Expression::Assign(Box::new(Assign {
            op,
            lhs: target,
            rhs,
        })))
    }

    fn parse_conditional_expression(&mut self, no_in: bool) -> Result<Expression, Error> {
        let condition = self.parse_binary_expression(1, no_in)?;
        if !self.stream.accept(Punctuator::Question) {
            return Ok(condition);
        }
        let if_true = self.parse_assignment_expression(false)?;
        self.expect(Punctuator::Colon)?;
        let if_false = self.parse_assignment_expression(no_in)?;
        Ok(Expression::Conditional(Box::new(Conditional {
            condition,
            if_true,
            if_false,
        })))
    }

    fn parse_binary_expression(
        &mut self,
        min_precedence: u8,
        no_in: bool,
    ) -> Result<Expression, Error> {
        let mut lhs = self.parse_unary_expression()?;
        loop {
            let op = match self.stream.peek().map(|token| &token.kind) {
                Some(TokenKind::Punctuator(punctuator)) => match punctuator.as_binary_op() {
                    Some(op) => op,
                    None => break,
                },
                Some(TokenKind::Keyword(Keyword::In)) if !no_in => BinaryOp::In,
                Some(TokenKind::Keyword(Keyword::InstanceOf)) => BinaryOp::InstanceOf,
                _ => break,
            };
            let op_precedence = precedence(op);
            if op_precedence < min_precedence {
                break;
            }
            self.stream.advance();
            // `**` is right-associative.
            let next_min = if op == BinaryOp::Exp {
                op_precedence
            } else {
                op_precedence + 1
            };
            let rhs = self.parse_binary_expression(next_min, no_in)?;
            lhs = Expression::Binary(Box::new(Binary { op, lhs, rhs }));
        }
        Ok(lhs)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, Error> {
        let op = match self.stream.peek().map(|token| &token.kind) {
            Some(TokenKind::Punctuator(Punctuator::Not)) => Some(UnaryOp::Not),
            Some(TokenKind::Punctuator(Punctuator::Neg)) => Some(UnaryOp::Tilde),
            Some(TokenKind::Punctuator(Punctuator::Add)) => Some(UnaryOp::Plus),
            Some(TokenKind::Punctuator(Punctuator::Sub)) => Some(UnaryOp::Minus),
            Some(TokenKind::Keyword(Keyword::Delete)) => Some(UnaryOp::Delete),
            Some(TokenKind::Keyword(Keyword::Void)) => Some(UnaryOp::Void),
            Some(TokenKind::Keyword(Keyword::TypeOf)) => Some(UnaryOp::TypeOf),
            _ => None,
        };
        if let Some(op) = op {
            let line = self.stream.line();
            self.stream.advance();
            let target = self.parse_unary_expression()?;
            if op == UnaryOp::Delete {
                if let Expression::Identifier(identifier) = &target {
                    return Err(Error::syntax(
                        format!("Delete of an unqualified identifier \"{}\"", identifier.name),
                        line,
                    ));
                }
            }
            return Ok(Expression::Unary(Box::new(Unary { op, target })));
        }

        if let Some(op) = self.peek_update_op() {
            let line = self.stream.line();
            self.stream.advance();
            let operand = self.parse_unary_expression()?;
            let target = Self::expression_to_assign_target(operand, false).ok_or_else(|| {
                Error::syntax("Invalid left-hand side in prefix operation", line)
            })?;
            return Ok(Expression::Update(Box::new(Update {
                op,
                prefix: true,
                target,
            })));
        }

        self.parse_postfix_expression()
    }

    fn peek_update_op(&self) -> Option<UpdateOp> {
        match self.stream.peek().map(|token| &token.kind) {
            Some(TokenKind::Punctuator(Punctuator::Inc)) => Some(UpdateOp::Increment),
            Some(TokenKind::Punctuator(Punctuator::Dec)) => Some(UpdateOp::Decrement),
            _ => None,
        }
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression, Error> {
        let expression = self.parse_left_hand_side_expression()?;
        // Postfix operators are restricted productions: a preceding line
        // terminator turns them into prefix operators of what follows.
        if let Some(op) = self.peek_update_op() {
            let newline = self
                .stream
                .peek()
                .is_some_and(|token| token.newline_before);
            if !newline {
                let line = self.stream.line();
                self.stream.advance();
                let target =
                    Self::expression_to_assign_target(expression, false).ok_or_else(|| {
                        Error::syntax("Invalid left-hand side in postfix operation", line)
                    })?;
                return Ok(Expression::Update(Box::new(Update {
                    op,
                    prefix: false,
                    target,
                })));
            }
        }
        Ok(expression)
    }

    fn parse_left_hand_side_expression(&mut self) -> Result<Expression, Error> {
        let mut expression = self.parse_new_or_member_expression()?;
        loop {
            if self.stream.is(Punctuator::OpenParen) {
                let line = self.stream.line();
                let args = self.parse_arguments()?;
                expression = Expression::Call(Box::new(Call {
                    function: expression,
                    args,
                    line,
                }));
            } else if let Some(field) = self.parse_member_suffix()? {
                expression = Expression::PropertyAccess(Box::new(PropertyAccess {
                    target: expression,
                    field,
                }));
            } else {
                break;
            }
        }
        Ok(expression)
    }

    fn parse_new_or_member_expression(&mut self) -> Result<Expression, Error> {
        if self.stream.is_keyword(Keyword::New) {
            let line = self.stream.line();
            self.stream.advance();
            let constructor = self.parse_new_or_member_expression()?;
            let args = if self.stream.is(Punctuator::OpenParen) {
                self.parse_arguments()?
            } else {
                Box::from([])
            };
            let mut expression = Expression::New(Box::new(New {
                constructor,
                args,
                line,
            }));
            while let Some(field) = self.parse_member_suffix()? {
                expression = Expression::PropertyAccess(Box::new(PropertyAccess {
                    target: expression,
                    field,
                }));
            }
            return Ok(expression);
        }

        let mut expression = self.parse_primary_expression()?;
        while let Some(field) = self.parse_member_suffix()? {
            expression = Expression::PropertyAccess(Box::new(PropertyAccess {
                target: expression,
                field,
            }));
        }
        Ok(expression)
    }

    // Parses one `.name` or `[expr]` member suffix.
    fn parse_member_suffix(&mut self) -> Result<Option<PropertyAccessField>, Error> {
        if self.stream.accept(Punctuator::Dot) {
            let name = self.parse_property_name_after_dot()?;
            return Ok(Some(PropertyAccessField::Const(name)));
        }
        if self.stream.accept(Punctuator::OpenBracket) {
            let key = self.parse_expression(false)?;
            self.expect(Punctuator::CloseBracket)?;
            return Ok(Some(PropertyAccessField::Expr(Box::new(key))));
        }
        Ok(None)
    }

    // Keywords and literal words are valid property names after a dot.
    fn parse_property_name_after_dot(&mut self) -> Result<Box<str>, Error> {
        match self.stream.next() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => Ok(name),
            Some(Token {
                kind: TokenKind::Keyword(keyword),
                ..
            }) => Ok(keyword.as_str().into()),
            Some(Token {
                kind: TokenKind::Boolean(value),
                ..
            }) => Ok(if value { "true".into() } else { "false".into() }),
            Some(Token {
                kind: TokenKind::Null,
                ..
            }) => Ok("null".into()),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_arguments(&mut self) -> Result<Box<[Expression]>, Error> {
        self.expect(Punctuator::OpenParen)?;
        let mut args = Vec::new();
        loop {
            if self.stream.accept(Punctuator::CloseParen) {
                break;
            }
            if self.stream.accept(Punctuator::Spread) {
                let expression = self.parse_assignment_expression(false)?;
                args.push(Expression::Spread(Box::new(expression)));
            } else {
                args.push(self.parse_assignment_expression(false)?);
            }
            if !self.stream.accept(Punctuator::Comma) {
                self.expect(Punctuator::CloseParen)?;
                break;
            }
        }
        Ok(args.into_boxed_slice())
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, Error> {
        let Some(token) = self.stream.peek() else {
            return Err(self.unexpected());
        };
        let line = token.line;
        match &token.kind {
            TokenKind::Keyword(Keyword::This) => {
                self.stream.advance();
                Ok(Expression::This)
            }
            TokenKind::Keyword(Keyword::Function) => {
                self.stream.advance();
                let name = if matches!(
                    self.stream.peek(),
                    Some(Token {
                        kind: TokenKind::Identifier(_),
                        ..
                    })
                ) {
                    Some(self.expect_identifier()?.0)
                } else {
                    None
                };
                let function = self.parse_function_rest(name, true, line)?;
                Ok(Expression::Function(Box::new(function)))
            }
            TokenKind::Identifier(_) => {
                let (name, line) = self.expect_identifier()?;
                Ok(Expression::Identifier(Identifier::new(name, line)))
            }
            TokenKind::Numeric(value) => {
                let value = *value;
                self.stream.advance();
                Ok(Expression::Literal(Literal::Num(value)))
            }
            TokenKind::String(_) => {
                let Some(Token {
                    kind: TokenKind::String(bytes),
                    ..
                }) = self.stream.next()
                else {
                    unreachable!("peeked string literal");
                };
                Ok(Expression::Literal(Literal::String(bytes)))
            }
            TokenKind::Boolean(value) => {
                let value = *value;
                self.stream.advance();
                Ok(Expression::Literal(Literal::Bool(value)))
            }
            TokenKind::Null => {
                self.stream.advance();
                Ok(Expression::Literal(Literal::Null))
            }
            TokenKind::Template(_) => {
                let Some(Token {
                    kind: TokenKind::Template(parts),
                    ..
                }) = self.stream.next()
                else {
                    unreachable!("peeked template literal");
                };
                self.parse_template(parts)
            }
            TokenKind::RegExp { .. } => {
                let Some(Token {
                    kind: TokenKind::RegExp { pattern, flags },
                    ..
                }) = self.stream.next()
                else {
                    unreachable!("peeked regexp literal");
                };
                Ok(Expression::RegExpLiteral(RegExpLiteral {
                    pattern,
                    flags,
                    line,
                }))
            }
            TokenKind::Punctuator(Punctuator::OpenParen) => {
                self.stream.advance();
                let expression = self.parse_expression(false)?;
                self.expect(Punctuator::CloseParen)?;
                Ok(expression)
            }
            TokenKind::Punctuator(Punctuator::OpenBracket) => self.parse_array_literal(),
            TokenKind::Punctuator(Punctuator::OpenBlock) => self.parse_object_literal(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expression, Error> {
        self.expect(Punctuator::OpenBracket)?;
        let mut elements = Vec::new();
        loop {
            if self.stream.accept(Punctuator::CloseBracket) {
                break;
            }
            if self.stream.accept(Punctuator::Comma) {
                elements.push(ArrayElement::Elision);
                continue;
            }
            if self.stream.accept(Punctuator::Spread) {
                elements.push(ArrayElement::Spread(
                    self.parse_assignment_expression(false)?,
                ));
            } else {
                elements.push(ArrayElement::Expr(self.parse_assignment_expression(false)?));
            }
            if !self.stream.accept(Punctuator::Comma) {
                self.expect(Punctuator::CloseBracket)?;
                break;
            }
        }
        Ok(Expression::ArrayLiteral(ArrayLiteral {
            elements: elements.into_boxed_slice(),
        }))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, Error> {
        self.expect(Punctuator::OpenBlock)?;
        let mut properties = Vec::new();
        loop {
            if self.stream.accept(Punctuator::CloseBlock) {
                break;
            }
            properties.push(self.parse_property_definition()?);
            if !self.stream.accept(Punctuator::Comma) {
                self.expect(Punctuator::CloseBlock)?;
                break;
            }
        }
        Ok(Expression::ObjectLiteral(ObjectLiteral {
            properties: properties.into_boxed_slice(),
        }))
    }

    fn parse_property_definition(&mut self) -> Result<PropertyDefinition, Error> {
        // `get`/`set` lex as identifiers; they start an accessor only when a
        // property name follows.
        if let Some(Token {
            kind: TokenKind::Identifier(word),
            line,
            ..
        }) = self.stream.peek()
        {
            let accessor = match &**word {
                "get" => Some(true),
                "set" => Some(false),
                _ => None,
            };
            if let Some(is_getter) = accessor {
                let line = *line;
                if self.property_name_follows() {
                    self.stream.advance();
                    let name = self.parse_property_name()?;
                    let function = self.parse_function_rest(None, false, line)?;
                    if is_getter {
                        if !function.parameters.is_empty() {
                            return Err(Error::syntax(
                                "Getter must not have any formal parameters",
                                line,
                            ));
                        }
                        return Ok(PropertyDefinition::Getter(name, function));
                    }
                    if function.parameters.len() != 1 || function.parameters.rest.is_some() {
                        return Err(Error::syntax(
                            "Setter must have exactly one formal parameter",
                            line,
                        ));
                    }
                    return Ok(PropertyDefinition::Setter(name, function));
                }
            }
        }

        let is_identifier = matches!(
            self.stream.peek(),
            Some(Token {
                kind: TokenKind::Identifier(_),
                ..
            })
        );
        let line = self.stream.line();
        let name = self.parse_property_name()?;
        if self.stream.accept(Punctuator::Colon) {
            let value = self.parse_assignment_expression(false)?;
            return Ok(PropertyDefinition::Property(name, value));
        }
        if is_identifier {
            if let PropertyName::Literal(word) = &name {
                return Ok(PropertyDefinition::Shorthand(Identifier::new(
                    word.clone(),
                    line,
                )));
            }
        }
        Err(self.unexpected())
    }

    // `true` if the token at offset 1 can be a property name, which makes
    // the current `get`/`set` word an accessor prefix.
    fn property_name_follows(&self) -> bool {
        matches!(
            self.stream.peek_at(1).map(|token| &token.kind),
            Some(
                TokenKind::Identifier(_)
                    | TokenKind::Keyword(_)
                    | TokenKind::String(_)
                    | TokenKind::Numeric(_)
                    | TokenKind::Boolean(_)
                    | TokenKind::Null
            )
        )
    }

    fn parse_property_name(&mut self) -> Result<PropertyName, Error> {
        match self.stream.next() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => Ok(PropertyName::Literal(name)),
            Some(Token {
                kind: TokenKind::Keyword(keyword),
                ..
            }) => Ok(PropertyName::Literal(keyword.as_str().into())),
            Some(Token {
                kind: TokenKind::Boolean(value),
                ..
            }) => Ok(PropertyName::Literal(
                if value { "true" } else { "false" }.into(),
            )),
            Some(Token {
                kind: TokenKind::Null,
                ..
            }) => Ok(PropertyName::Literal("null".into())),
            Some(Token {
                kind: TokenKind::String(bytes),
                line,
                ..
            }) => {
                let name = String::from_utf8(bytes.into_vec())
                    .map_err(|_| Error::syntax("Invalid property name", line))?;
                Ok(PropertyName::Literal(name.into()))
            }
            Some(Token {
                kind: TokenKind::Numeric(value),
                ..
            }) => Ok(PropertyName::Numeric(value)),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_template(&mut self, parts: Vec<lexer::TemplatePart>) -> Result<Expression, Error> {
        let mut ast_parts = Vec::new();
        for part in parts {
            match part {
                lexer::TemplatePart::String(fragment) => {
                    ast_parts.push(TemplatePart::String(fragment));
                }
                lexer::TemplatePart::Tokens(tokens) => {
                    let expression = self.parse_subexpression(tokens)?;
                    ast_parts.push(TemplatePart::Expr(expression));
                }
            }
        }
        Ok(Expression::Template(TemplateLiteral {
            parts: ast_parts.into_boxed_slice(),
        }))
    }

    // Parses a complete expression out of a nested token stream (a template
    // `${…}` block), temporarily swapping it in as the current stream.
    fn parse_subexpression(&mut self, tokens: Vec<Token>) -> Result<Expression, Error> {
        let saved = std::mem::replace(&mut self.stream, TokenStream::new(tokens));
        let result = self.parse_expression(false);
        let exhausted = self.stream.at_end();
        self.stream = saved;
        let expression = result?;
        if !exhausted {
            return Err(self.unexpected());
        }
        Ok(expression)
    }

    // === arrow functions ===

    // Looks ahead for `ident =>` or `( … ) =>`.
    fn is_arrow_ahead(&self) -> bool {
        match self.stream.peek().map(|token| &token.kind) {
            Some(TokenKind::Identifier(_)) => matches!(
                self.stream.peek_at(1),
                Some(Token {
                    kind: TokenKind::Punctuator(Punctuator::Arrow),
                    newline_before: false,
                    ..
                })
            ),
            Some(TokenKind::Punctuator(Punctuator::OpenParen)) => {
                let mut depth = 0usize;
                let mut offset = 0usize;
                loop {
                    let Some(token) = self.stream.peek_at(offset) else {
                        return false;
                    };
                    match &token.kind {
                        TokenKind::Punctuator(Punctuator::OpenParen) => depth += 1,
                        TokenKind::Punctuator(Punctuator::CloseParen) => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(
                                    self.stream.peek_at(offset + 1),
                                    Some(Token {
                                        kind: TokenKind::Punctuator(Punctuator::Arrow),
                                        newline_before: false,
                                        ..
                                    })
                                );
                            }
                        }
                        _ => {}
                    }
                    offset += 1;
                }
            }
            _ => false,
        }
    }

    fn parse_arrow_function(&mut self) -> Result<Expression, Error> {
        let line = self.stream.line();
        self.check_nesting(line)?;
        let scope = self.scope_tree.push_function(self.current_scope(), true);
        self.scopes.push(scope);

        let parameters = if self.stream.is(Punctuator::OpenParen) {
            self.parse_formal_parameters()
        } else {
            let (name, name_line) = self.expect_identifier()?;
            self.declare(&name, DeclarationKind::Parameter(0), name_line)
                .map(|()| FormalParameterList {
                    params: Box::from([name]),
                    rest: None,
                })
        };
        let parameters = match parameters {
            Ok(parameters) => parameters,
            Err(err) => {
                self.scopes.pop();
                return Err(err);
            }
        };

        let result = self.parse_arrow_rest();
        self.scopes.pop();
        let body = result?;

        Ok(Expression::Arrow(Box::new(FunctionExpression {
            name: None,
            parameters,
            body,
            kind: FunctionKind::Arrow,
            scope,
            line,
        })))
    }

    fn parse_arrow_rest(&mut self) -> Result<Box<[Statement]>, Error> {
        self.expect(Punctuator::Arrow)?;

        let saved_labels = std::mem::take(&mut self.labels);
        let saved_iteration = std::mem::replace(&mut self.iteration_depth, 0);
        let saved_switch = std::mem::replace(&mut self.switch_depth, 0);
        self.function_depth += 1;

        let body = if self.stream.accept(Punctuator::OpenBlock) {
            self.parse_statement_list_until_close()
        } else {
            let line = self.stream.line();
            self.parse_assignment_expression(false).map(|expression| {
                Box::from([Statement::Return(ReturnStatement {
                    expression: Some(Box::new(expression)),
                    line,
                })])
            })
        };

        self.function_depth -= 1;
        self.iteration_depth = saved_iteration;
        self.switch_depth = saved_switch;
        self.labels = saved_labels;
        body
    }

    // === ordinary functions ===

    fn check_nesting(&self, line: u32) -> Result<(), Error> {
        if self.function_depth + 1 > self.options.max_nesting {
            return Err(Error::syntax(
                format!(
                    "The maximum function nesting level is \"{}\"",
                    self.options.max_nesting
                ),
                line,
            ));
        }
        Ok(())
    }

    // Parses the part of a function after its name: parameters and body.
    // `declare_self` installs the name as the self binding of a named
    // function expression.
    pub(super) fn parse_function_rest(
        &mut self,
        name: Option<Box<str>>,
        declare_self: bool,
        line: u32,
    ) -> Result<FunctionExpression, Error> {
        self.check_nesting(line)?;
        let scope = self.scope_tree.push_function(self.current_scope(), false);
        self.scopes.push(scope);

        let result = self.parse_function_rest_in_scope(&name, declare_self, line);
        self.scopes.pop();
        let (parameters, body) = result?;

        Ok(FunctionExpression {
            name,
            parameters,
            body,
            kind: FunctionKind::Ordinary,
            scope,
            line,
        })
    }

    fn parse_function_rest_in_scope(
        &mut self,
        name: &Option<Box<str>>,
        declare_self: bool,
        line: u32,
    ) -> Result<(FormalParameterList, Box<[Statement]>), Error> {
        if declare_self {
            if let Some(name) = name {
                self.declare(name, DeclarationKind::FunctionSelf, line)?;
            }
        }
        let parameters = self.parse_formal_parameters()?;
        self.expect(Punctuator::OpenBlock)?;

        let saved_labels = std::mem::take(&mut self.labels);
        let saved_iteration = std::mem::replace(&mut self.iteration_depth, 0);
        let saved_switch = std::mem::replace(&mut self.switch_depth, 0);
        self.function_depth += 1;

        let body = self.parse_statement_list_until_close();

        self.function_depth -= 1;
        self.iteration_depth = saved_iteration;
        self.switch_depth = saved_switch;
        self.labels = saved_labels;

        Ok((parameters, body?))
    }

    fn parse_formal_parameters(&mut self) -> Result<FormalParameterList, Error> {
        self.expect(Punctuator::OpenParen)?;
        let mut params = Vec::new();
        let mut rest = None;
        loop {
            if self.stream.accept(Punctuator::CloseParen) {
                break;
            }
            if self.stream.accept(Punctuator::Spread) {
                let (name, line) = self.expect_identifier()?;
                // The rest array is a plain function-scoped binding filled
                // at frame entry.
                self.declare(&name, DeclarationKind::Var, line)?;
                rest = Some(name);
                self.expect(Punctuator::CloseParen)?;
                break;
            }
            let (name, line) = self.expect_identifier()?;
            let position = u16::try_from(params.len())
                .map_err(|_| Error::syntax("Too many formal parameters", line))?;
            self.declare(&name, DeclarationKind::Parameter(position), line)?;
            params.push(name);
            if !self.stream.accept(Punctuator::Comma) {
                self.expect(Punctuator::CloseParen)?;
                break;
            }
        }
        Ok(FormalParameterList {
            params: params.into_boxed_slice(),
            rest,
        })
    }

    // === assignment target conversions ===

    pub(super) fn expression_to_assign_target(
        expression: Expression,
        allow_pattern: bool,
    ) -> Option<AssignTarget> {
        match expression {
            Expression::Identifier(identifier) => Some(AssignTarget::Identifier(identifier)),
            Expression::PropertyAccess(access) => Some(AssignTarget::Access(access)),
            Expression::ArrayLiteral(_) | Expression::ObjectLiteral(_) if allow_pattern => {
                Self::expression_to_pattern(expression).map(AssignTarget::Pattern)
            }
            _ => None,
        }
    }

    fn expression_to_pattern(expression: Expression) -> Option<Pattern> {
        match expression {
            Expression::ArrayLiteral(array) => {
                let mut elements = Vec::new();
                let mut rest = None;
                let count = array.elements.len();
                for (index, element) in array.elements.into_vec().into_iter().enumerate() {
                    match element {
                        ArrayElement::Elision => elements.push(ArrayPatternElement::Elision),
                        ArrayElement::Expr(expression) => {
                            elements.push(ArrayPatternElement::Binding(
                                Self::expression_to_pattern_binding(expression)?,
                            ));
                        }
                        ArrayElement::Spread(expression) => {
                            if index + 1 != count {
                                return None;
                            }
                            rest = Some(Self::expression_to_pattern_binding(expression)?);
                        }
                    }
                }
                Some(Pattern::Array(ArrayPattern {
                    elements: elements.into_boxed_slice(),
                    rest,
                }))
            }
            Expression::ObjectLiteral(object) => {
                let mut properties = Vec::new();
                for property in object.properties.into_vec() {
                    match property {
                        PropertyDefinition::Shorthand(identifier) => {
                            properties.push(ObjectPatternProperty {
                                name: identifier.name.clone(),
                                binding: PatternBinding::Identifier(identifier.name),
                            });
                        }
                        PropertyDefinition::Property(PropertyName::Literal(name), value) => {
                            properties.push(ObjectPatternProperty {
                                name,
                                binding: Self::expression_to_pattern_binding(value)?,
                            });
                        }
                        _ => return None,
                    }
                }
                Some(Pattern::Object(ObjectPattern {
                    properties: properties.into_boxed_slice(),
                }))
            }
            _ => None,
        }
    }

    fn expression_to_pattern_binding(expression: Expression) -> Option<PatternBinding> {
        match expression {
            Expression::Identifier(identifier) => {
                Some(PatternBinding::Identifier(identifier.name))
            }
            Expression::ArrayLiteral(_) | Expression::ObjectLiteral(_) => {
                Self::expression_to_pattern(expression).map(|p| PatternBinding::Pattern(Box::new(p)))
            }
            _ => None,
        }
    }
}
