use std::{
    fmt::Display,
    io::{self, Stdout, Write},
};

use parser::{Expr, ParseErrors, Parser, Stmt};
use scanner::{ScanErrors, Token, TokenType};

mod value;
pub use value::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorType {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings,
    #[error("Unsupported operator '{0}'.")]
    UnsupportedOperator(String),
    #[error("Failed to write output: {0}")]
    Output(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub struct RuntimeError {
    error: RuntimeErrorType,
    token: Token,
}

impl RuntimeError {
    pub fn new(error: RuntimeErrorType, token: Token) -> Self {
        Self { error, token }
    }

    pub fn error(&self) -> &RuntimeErrorType {
        &self.error
    }

    pub fn token(&self) -> &Token {
        &self.token
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n[line {}]", self.error, self.token.line())
    }
}

/// Any failure of the whole scan → parse → evaluate pipeline.
#[derive(thiserror::Error, Debug)]
pub enum InterpretError {
    #[error(transparent)]
    Scan(#[from] ScanErrors),
    #[error(transparent)]
    Parse(#[from] ParseErrors),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Runs `stmts` in order, printing to stdout, and stops at the first runtime error.
pub fn interpret(stmts: &[Stmt]) -> Result<()> {
    Interpreter::default().interpret(stmts)
}

#[derive(Debug)]
pub struct Interpreter<W> {
    output: W,
}

impl Default for Interpreter<Stdout> {
    fn default() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Scans, parses and runs `source`. Lexical errors stop the pipeline
    /// before parsing; all syntax errors are reported before anything runs.
    pub fn run_source(&mut self, source: &str) -> std::result::Result<(), InterpretError> {
        let (tokens, errors) = scanner::scan(source);
        if !errors.is_empty() {
            return Err(ScanErrors(errors).into());
        }

        let stmts = Parser::new(&tokens).parse_all()?;
        log::debug!("Parsed {} statements", stmts.len());

        self.interpret(&stmts)?;
        Ok(())
    }

    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<()> {
        for s in stmts {
            self.execute(s)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<()> {
        log::trace!("Executing {}", stmt);
        match stmt {
            Stmt::Print { keyword, value } => {
                let value = evaluate(value)?;
                writeln!(self.output, "{}", value).map_err(|e| {
                    RuntimeError::new(RuntimeErrorType::Output(e.to_string()), keyword.clone())
                })
            }
            Stmt::Expression(expr) => {
                evaluate(expr)?;
                Ok(())
            }
        }
    }
}

/// Evaluates `expr` depth-first; children are always evaluated before their parent.
pub fn evaluate(expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.into()),

        Expr::Grouping(expr) => evaluate(expr),

        Expr::Unary { operator, right } => {
            let right = evaluate(right)?;
            match (operator.kind(), right) {
                (TokenType::Minus, Value::Number(n)) => Ok((-n).into()),
                (TokenType::Minus, _) => {
                    Err(RuntimeError::new(RuntimeErrorType::OperandMustBeNumber, operator.clone()))
                }
                (TokenType::Bang, v) => Ok((!v.is_truthy()).into()),
                _ => Err(unsupported_operator(operator)),
            }
        }

        Expr::Binary { left, operator, right } => {
            let left = evaluate(left)?;
            let right = evaluate(right)?;
            binary(operator, left, right)
        }
    }
}

fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    let error = |error| RuntimeError::new(error, operator.clone());

    match (operator.kind(), left, right) {
        (TokenType::Plus, Value::Number(l), Value::Number(r)) => Ok((l + r).into()),
        (TokenType::Plus, Value::Str(l), Value::Str(r)) => Ok((l + &r).into()),
        (TokenType::Plus, _, _) => Err(error(RuntimeErrorType::OperandsMustBeNumbersOrStrings)),

        (TokenType::Minus, Value::Number(l), Value::Number(r)) => Ok((l - r).into()),
        // Division by zero is left to IEEE-754
        (TokenType::Slash, Value::Number(l), Value::Number(r)) => Ok((l / r).into()),
        (TokenType::Star, Value::Number(l), Value::Number(r)) => Ok((l * r).into()),

        (TokenType::Greater, Value::Number(l), Value::Number(r)) => Ok((l > r).into()),
        (TokenType::GreaterEqual, Value::Number(l), Value::Number(r)) => Ok((l >= r).into()),
        (TokenType::Less, Value::Number(l), Value::Number(r)) => Ok((l < r).into()),
        (TokenType::LessEqual, Value::Number(l), Value::Number(r)) => Ok((l <= r).into()),

        (
            TokenType::Minus
            | TokenType::Slash
            | TokenType::Star
            | TokenType::Greater
            | TokenType::GreaterEqual
            | TokenType::Less
            | TokenType::LessEqual,
            _,
            _,
        ) => Err(error(RuntimeErrorType::OperandsMustBeNumbers)),

        (TokenType::EqualEqual, l, r) => Ok(l.is_equal(&r).into()),
        (TokenType::BangEqual, l, r) => Ok((!l.is_equal(&r)).into()),

        _ => Err(unsupported_operator(operator)),
    }
}

// Only reachable for trees that were not built by the parser.
fn unsupported_operator(operator: &Token) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorType::UnsupportedOperator(operator.lexeme().to_string()),
        operator.clone(),
    )
}
