mod expr;
mod stmt;

use std::fmt::Display;

use itertools::Itertools;

pub use expr::{Expr, LiteralValue};
pub use stmt::Stmt;

use scanner::{Line, Literal, Token, TokenType};
use TokenType::*;

pub type Result<T> = std::result::Result<T, ParseError>;

/// How deeply expressions may nest before parsing gives up.
pub const MAX_DEPTH: usize = 200;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ')' after expression.")]
    ExpectedRightParen,
    #[error("Expect ';' after {0}.")]
    ExpectedSemicolon(&'static str),
    #[error("Expression nesting exceeds {0} levels.")]
    MaxDepthExceeded(usize),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub struct ParseError {
    error: ParseErrorType,
    token: Token,
}

impl ParseError {
    pub fn new(error: ParseErrorType, token: Token) -> Self {
        Self { error, token }
    }

    pub fn error(&self) -> &ParseErrorType {
        &self.error
    }

    /// The token the parser was looking at when it gave up.
    pub fn token(&self) -> &Token {
        &self.token
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let at = match self.token.kind() {
            Eof => " at end".to_string(),
            _ => format!(" at '{}'", self.token.lexeme()),
        };
        write!(f, "[line {}] Error{}: {}", self.token.line(), at, self.error)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, derive_more::Deref)]
pub struct ParseErrors(pub Vec<ParseError>);

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self(vec![error])
    }
}

impl Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

/// Parses a whole program, stopping at the first syntax error.
pub fn parse(tokens: &[Token]) -> Result<Vec<Stmt>> {
    Parser::new(tokens).parse()
}

#[derive(Debug)]
pub struct Parser<'t> {
    tokens: &'t [Token],
    current: usize,
    depth: usize,
    // Stands in for a missing trailing Eof, so peeking never runs off the end.
    eof: Token,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let line = tokens.last().map_or(Line(1), Token::line);
        Self { tokens, current: 0, depth: 0, eof: Token::eof(line) }
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            stmts.push(self.statement()?);
        }
        Ok(stmts)
    }

    /// Like [`Parser::parse`], but resynchronizes at the next statement
    /// boundary after an error and reports every error it finds.
    pub fn parse_all(mut self) -> std::result::Result<Vec<Stmt>, ParseErrors> {
        let mut errors = Vec::new();
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    log::debug!("Hit error: {}, syncing...", e);
                    errors.push(e);
                    self.synchronize();
                }
            }
        }

        if errors.is_empty() {
            Ok(stmts)
        } else {
            Err(ParseErrors(errors))
        }
    }

    fn statement(&mut self) -> Result<Stmt> {
        self.depth = 0;
        if let Some(keyword) = self.consume(Print) {
            return self.print_statement(keyword);
        }

        self.expression_statement()
    }

    fn print_statement(&mut self, keyword: Token) -> Result<Stmt> {
        let value = self.expression()?;

        self.consume_or_error(Semicolon, ParseErrorType::ExpectedSemicolon("value"))?;

        Ok(Stmt::Print { keyword, value })
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let value = self.expression()?;

        self.consume_or_error(Semicolon, ParseErrorType::ExpectedSemicolon("expression"))?;

        Ok(Stmt::Expression(value))
    }

    fn expression(&mut self) -> Result<Expr> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        let depth = self.depth;
        while let BangEqual | EqualEqual = self.peek().kind() {
            self.descend()?;
            let operator = self.advance();
            let right = Box::new(self.comparison()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.addition()?;

        let depth = self.depth;
        while let Greater | GreaterEqual | Less | LessEqual = self.peek().kind() {
            self.descend()?;
            let operator = self.advance();
            let right = Box::new(self.addition()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn addition(&mut self) -> Result<Expr> {
        let mut expr = self.multiplication()?;

        let depth = self.depth;
        while let Minus | Plus = self.peek().kind() {
            self.descend()?;
            let operator = self.advance();
            let right = Box::new(self.multiplication()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn multiplication(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        let depth = self.depth;
        while let Slash | Star = self.peek().kind() {
            self.descend()?;
            let operator = self.advance();
            let right = Box::new(self.unary()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Bang | Minus = self.peek().kind() {
            self.descend()?;
            let operator = self.advance();
            let right = Box::new(self.unary()?);
            self.depth -= 1;
            return Ok(Expr::Unary { operator, right });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.peek().clone();
        let value = match (token.kind(), token.literal()) {
            (False, _) => LiteralValue::Boolean(false),
            (True, _) => LiteralValue::Boolean(true),
            (Nil, _) => LiteralValue::Nil,
            (Number, Some(Literal::Number(n))) => LiteralValue::Number(*n),
            (Str, Some(Literal::Str(s))) => LiteralValue::Str(s.clone()),
            (LeftParen, _) => {
                self.descend()?;
                self.advance();
                let expr = self.expression()?;

                self.consume_or_error(RightParen, ParseErrorType::ExpectedRightParen)?;
                self.depth -= 1;

                return Ok(Expr::Grouping(Box::new(expr)));
            }
            _ => {
                return Err(ParseError::new(ParseErrorType::ExpectedExpression, token))
            }
        };

        self.advance();
        Ok(Expr::Literal(value))
    }

    /// Skips tokens until just after a `;` or just before a keyword that
    /// starts a statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous_kind() == Some(Semicolon) {
                return;
            }

            if let Class | Fun | Var | For | If | While | Print | Return = self.peek().kind() {
                return;
            }

            self.advance();
        }
    }
}

// Helpers
impl<'t> Parser<'t> {
    fn consume(&mut self, kind: TokenType) -> Option<Token> {
        (self.peek().kind() == kind).then(|| self.advance())
    }

    // One level per nested unary, grouping or chained binary operator.
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new(
                ParseErrorType::MaxDepthExceeded(MAX_DEPTH),
                self.peek().clone(),
            ));
        }
        Ok(())
    }

    fn consume_or_error(&mut self, kind: TokenType, error: ParseErrorType) -> Result<Token> {
        match self.consume(kind) {
            Some(token) => Ok(token),
            None => Err(ParseError::new(error, self.peek().clone())),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.eof)
    }

    fn previous_kind(&self) -> Option<TokenType> {
        self.current.checked_sub(1).and_then(|i| self.tokens.get(i)).map(Token::kind)
    }

    /// Returns the current token and moves past it, unless it is the end of input.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind() == Eof
    }
}
