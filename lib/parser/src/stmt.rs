use std::fmt::{self, Display, Formatter};

use scanner::Token;

use crate::Expr;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    // The keyword is kept so that output failures can point at a line.
    Print { keyword: Token, value: Expr },
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expression(expr) => write!(f, "(; {})", expr),
            Stmt::Print { value, .. } => write!(f, "(print {})", value),
        }
    }
}
