use std::fmt::Display;

use cursor::Line;
use strum_macros::{AsRefStr, EnumIter, EnumString};

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenType,
    lexeme: String,
    literal: Option<Literal>,
    line: Line,
}

impl Token {
    pub fn new(
        kind: TokenType,
        lexeme: impl Into<String>,
        literal: Option<Literal>,
        line: Line,
    ) -> Self {
        Self { kind, lexeme: lexeme.into(), literal, line }
    }

    pub fn eof(line: Line) -> Self {
        Self::new(TokenType::Eof, "", None, line)
    }

    pub fn kind(&self) -> TokenType {
        self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn literal(&self) -> Option<&Literal> {
        self.literal.as_ref()
    }

    pub fn line(&self) -> Line {
        self.line
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

/// Value carried by number and string tokens.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum Literal {
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    Str,
    Number,

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    SelfKw,
    Super,
    True,
    Var,
    While,

    Eof,
}

/// Reserved words. Parsing a lexeme with [`std::str::FromStr`] is the keyword lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    And,
    Class,
    Else,
    False,
    For,
    #[strum(serialize = "fn")]
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    #[strum(serialize = "self")]
    SelfKw,
    Super,
    True,
    Var,
    While,
}

impl From<Keyword> for TokenType {
    fn from(keyword: Keyword) -> Self {
        match keyword {
            Keyword::And => TokenType::And,
            Keyword::Class => TokenType::Class,
            Keyword::Else => TokenType::Else,
            Keyword::False => TokenType::False,
            Keyword::For => TokenType::For,
            Keyword::Fun => TokenType::Fun,
            Keyword::If => TokenType::If,
            Keyword::Nil => TokenType::Nil,
            Keyword::Or => TokenType::Or,
            Keyword::Print => TokenType::Print,
            Keyword::Return => TokenType::Return,
            Keyword::SelfKw => TokenType::SelfKw,
            Keyword::Super => TokenType::Super,
            Keyword::True => TokenType::True,
            Keyword::Var => TokenType::Var,
            Keyword::While => TokenType::While,
        }
    }
}
