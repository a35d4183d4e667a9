use crate::ast::{
    BinaryOp, Block, Expr, FunctionDeclaration, LogicalOp, Parameter, Program, Stmt,
    TypeAnnotation, UnaryOp,
};
use crate::error::{SanskritError, Span, SyntaxError};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};
use std::mem;

/// Recursive descent parser with one token of lookahead. Tokens are pulled
/// from the lexer on demand, so a lexical error surfaces as soon as the
/// offending token becomes the lookahead.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    previous_end: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, SanskritError> {
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            previous_end: 0,
        })
    }

    pub fn parse(&mut self) -> Result<Program, SanskritError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.statement()?);
        }

        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, SanskritError> {
        match self.current.kind {
            TokenKind::Keyword(Keyword::Fn) => self.function_declaration(),
            TokenKind::Keyword(Keyword::Let) | TokenKind::Keyword(Keyword::Const) => {
                self.variable_declaration()
            }
            TokenKind::Keyword(Keyword::If) => self.if_statement(),
            TokenKind::Keyword(Keyword::While) => self.while_statement(),
            TokenKind::Keyword(Keyword::Return) => self.return_statement(),
            // Reserved words with no statement form (async, await, match, ...).
            TokenKind::Keyword(_) => Err(self.error("statement")),
            _ => self.expression_statement(),
        }
    }

    fn function_declaration(&mut self) -> Result<Stmt, SanskritError> {
        let start = self.advance()?.span.start;
        let (name, _) = self.expect_identifier("function name")?;

        self.expect(TokenKind::Delimiter, "(", "'(' after function name")?;
        let mut parameters = Vec::new();
        if !self.check(TokenKind::Delimiter, ")") {
            loop {
                parameters.push(self.parameter()?);
                if !self.match_token(TokenKind::Delimiter, ",")? {
                    break;
                }
            }
        }
        self.expect(TokenKind::Delimiter, ")", "')' after parameters")?;

        // `->` is two operator tokens.
        let return_type = if self.match_token(TokenKind::Operator, "-")? {
            self.expect(TokenKind::Operator, ">", "'>' in '->'")?;
            Some(self.type_annotation()?)
        } else {
            None
        };

        let body = self.block()?;
        let span = Span::new(start, body.span.end);

        Ok(Stmt::Function(FunctionDeclaration {
            name,
            parameters,
            return_type,
            body,
            span,
        }))
    }

    fn parameter(&mut self) -> Result<Parameter, SanskritError> {
        let (name, span) = self.expect_identifier("parameter name")?;
        let type_annotation = if self.match_token(TokenKind::Delimiter, ":")? {
            Some(self.type_annotation()?)
        } else {
            None
        };
        let span = Span::new(span.start, self.previous_end);

        Ok(Parameter {
            name,
            type_annotation,
            span,
        })
    }

    fn type_annotation(&mut self) -> Result<TypeAnnotation, SanskritError> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Keyword(Keyword::Tensor) => {
                let token = self.advance()?;
                Ok(TypeAnnotation {
                    name: token.text().to_string(),
                    span: token.span,
                })
            }
            _ => Err(self.error("type name")),
        }
    }

    fn variable_declaration(&mut self) -> Result<Stmt, SanskritError> {
        let keyword = self.advance()?;
        let constant = keyword.is_keyword(Keyword::Const);
        let (name, _) = self.expect_identifier("variable name")?;

        let type_annotation = if self.match_token(TokenKind::Delimiter, ":")? {
            Some(self.type_annotation()?)
        } else {
            None
        };

        let initializer = if self.match_token(TokenKind::Operator, "=")? {
            Some(self.expression()?)
        } else {
            None
        };

        self.expect(TokenKind::Delimiter, ";", "';' after variable declaration")?;

        Ok(Stmt::Variable {
            name,
            constant,
            type_annotation,
            initializer,
            span: Span::new(keyword.span.start, self.previous_end),
        })
    }

    fn if_statement(&mut self) -> Result<Stmt, SanskritError> {
        let start = self.advance()?.span.start;
        let condition = self.expression()?;
        let then_branch = self.block()?;

        let else_branch = if self.current.is_keyword(Keyword::Else) {
            self.advance()?;
            if self.current.is_keyword(Keyword::If) {
                let nested = self.if_statement()?;
                let span = *nested.span();
                Some(Block {
                    statements: vec![nested],
                    span,
                })
            } else {
                Some(self.block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            span: Span::new(start, self.previous_end),
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, SanskritError> {
        let start = self.advance()?.span.start;
        let condition = self.expression()?;
        let body = self.block()?;
        let span = Span::new(start, body.span.end);

        Ok(Stmt::While {
            condition,
            body,
            span,
        })
    }

    fn return_statement(&mut self) -> Result<Stmt, SanskritError> {
        let start = self.advance()?.span.start;
        let value = if self.check(TokenKind::Delimiter, ";") {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Delimiter, ";", "';' after return value")?;

        Ok(Stmt::Return {
            value,
            span: Span::new(start, self.previous_end),
        })
    }

    fn block(&mut self) -> Result<Block, SanskritError> {
        let start = self.expect(TokenKind::Delimiter, "{", "'{' to open a block")?.span.start;

        let mut statements = Vec::new();
        while !self.check(TokenKind::Delimiter, "}") && !self.is_at_end() {
            statements.push(self.statement()?);
        }

        let end = self.expect(TokenKind::Delimiter, "}", "'}' after block")?.span.end;

        Ok(Block {
            statements,
            span: Span::new(start, end),
        })
    }

    fn expression_statement(&mut self) -> Result<Stmt, SanskritError> {
        let start = self.current.span.start;
        let expr = self.expression()?;
        self.expect(TokenKind::Delimiter, ";", "';' after expression")?;

        Ok(Stmt::Expression {
            expr,
            span: Span::new(start, self.previous_end),
        })
    }

    pub fn expression(&mut self) -> Result<Expr, SanskritError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, SanskritError> {
        let expr = self.logical_or()?;

        if !self.check(TokenKind::Operator, "=") {
            return Ok(expr);
        }

        let equals = self.advance()?;
        let value = self.assignment()?;

        match expr {
            Expr::Identifier { name, span } => Ok(Expr::Assignment {
                name,
                span: span.to(*value.span()),
                value: Box::new(value),
            }),
            _ => Err(Self::error_at(&equals, "identifier before '='")),
        }
    }

    fn logical_or(&mut self) -> Result<Expr, SanskritError> {
        let mut expr = self.logical_and()?;

        while self.match_token(TokenKind::Operator, "||")? {
            let right = self.logical_and()?;
            expr = Expr::Logical {
                span: expr.span().to(*right.span()),
                left: Box::new(expr),
                operator: LogicalOp::Or,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<Expr, SanskritError> {
        let mut expr = self.equality()?;

        while self.match_token(TokenKind::Operator, "&&")? {
            let right = self.equality()?;
            expr = Expr::Logical {
                span: expr.span().to(*right.span()),
                left: Box::new(expr),
                operator: LogicalOp::And,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, SanskritError> {
        self.binary(&["==", "!="], Self::relational)
    }

    fn relational(&mut self) -> Result<Expr, SanskritError> {
        self.binary(&["<", ">", "<=", ">="], Self::additive)
    }

    fn additive(&mut self) -> Result<Expr, SanskritError> {
        self.binary(&["+", "-"], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Expr, SanskritError> {
        self.binary(&["*", "/", "%"], Self::unary)
    }

    /// One left-associative precedence level.
    fn binary(
        &mut self,
        symbols: &[&str],
        operand: fn(&mut Self) -> Result<Expr, SanskritError>,
    ) -> Result<Expr, SanskritError> {
        let mut expr = operand(self)?;

        while let Some(operator) = self.match_operator(symbols)? {
            let right = operand(self)?;
            expr = Expr::Binary {
                span: expr.span().to(*right.span()),
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn match_operator(&mut self, symbols: &[&str]) -> Result<Option<BinaryOp>, SanskritError> {
        if self.current.kind != TokenKind::Operator || !symbols.contains(&self.current.text()) {
            return Ok(None);
        }
        let operator = BinaryOp::from_symbol(self.current.text());
        self.advance()?;
        Ok(operator)
    }

    fn unary(&mut self) -> Result<Expr, SanskritError> {
        if self.current.kind == TokenKind::Operator {
            if let Some(operator) = UnaryOp::from_symbol(self.current.text()) {
                let start = self.advance()?.span.start;
                let operand = self.unary()?;
                return Ok(Expr::Unary {
                    span: Span::new(start, operand.span().end),
                    operator,
                    operand: Box::new(operand),
                });
            }
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, SanskritError> {
        match self.current.kind {
            TokenKind::Number => {
                let token = self.advance()?;
                Ok(Expr::NumericLiteral {
                    value: token.number().unwrap_or(f64::NAN),
                    span: token.span,
                })
            }
            TokenKind::String => {
                let token = self.advance()?;
                Ok(Expr::StringLiteral {
                    value: token.text().to_string(),
                    span: token.span,
                })
            }
            TokenKind::Identifier => {
                let token = self.advance()?;
                let name = token.text().to_string();
                if self.check(TokenKind::Delimiter, "(") {
                    self.call(name, token.span)
                } else {
                    Ok(Expr::Identifier {
                        name,
                        span: token.span,
                    })
                }
            }
            TokenKind::Delimiter if self.current.text() == "(" => {
                self.advance()?;
                let expr = self.expression()?;
                self.expect(TokenKind::Delimiter, ")", "')' after expression")?;
                Ok(expr)
            }
            _ => Err(self.error("expression")),
        }
    }

    fn call(&mut self, callee: String, callee_span: Span) -> Result<Expr, SanskritError> {
        self.advance()?;

        let mut arguments = Vec::new();
        if !self.check(TokenKind::Delimiter, ")") {
            loop {
                arguments.push(self.expression()?);
                if !self.match_token(TokenKind::Delimiter, ",")? {
                    break;
                }
            }
        }

        let end = self.expect(TokenKind::Delimiter, ")", "')' after arguments")?.span.end;

        Ok(Expr::Call {
            callee,
            arguments,
            span: Span::new(callee_span.start, end),
        })
    }

    // Token helpers

    fn advance(&mut self) -> Result<Token, SanskritError> {
        let next = self.lexer.next_token()?;
        let token = mem::replace(&mut self.current, next);
        self.previous_end = token.span.end;
        Ok(token)
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::EndOfInput
    }

    fn check(&self, kind: TokenKind, text: &str) -> bool {
        self.current.is(kind, text)
    }

    fn match_token(&mut self, kind: TokenKind, text: &str) -> Result<bool, SanskritError> {
        if self.check(kind, text) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind, text: &str, expected: &str) -> Result<Token, SanskritError> {
        if self.check(kind, text) {
            self.advance()
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<(String, Span), SanskritError> {
        if self.current.kind == TokenKind::Identifier {
            let token = self.advance()?;
            Ok((token.text().to_string(), token.span))
        } else {
            Err(self.error(expected))
        }
    }

    fn error(&self, expected: &str) -> SanskritError {
        Self::error_at(&self.current, expected)
    }

    fn error_at(token: &Token, expected: &str) -> SanskritError {
        SyntaxError {
            expected: expected.to_string(),
            found: token.kind,
            lexeme: token.lexeme(),
            position: token.position,
            span: token.span,
        }
        .into()
    }
}
