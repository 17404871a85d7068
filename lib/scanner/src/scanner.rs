use std::fmt::Display;

use itertools::Itertools;

use cursor::Cursor;
pub use cursor::Line;

pub mod token;
pub use token::{Keyword, Literal, Token, TokenType};
use TokenType::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character '{0}'.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Invalid number literal '{0}'.")]
    InvalidNumber(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {error}")]
pub struct ScanError {
    pub line: Line,
    pub error: ScanErrorType,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, derive_more::Deref)]
pub struct ScanErrors(pub Vec<ScanError>);

impl Display for ScanErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

/// Scans `source` into tokens, collecting every lexical error along the way.
///
/// The token list always ends with an [`TokenType::Eof`] token, even when
/// errors were found.
pub fn scan(source: &str) -> (Vec<Token>, Vec<ScanError>) {
    Scanner::new(source).scan_tokens()
}

pub struct Scanner<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
    errors: Vec<ScanError>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source), tokens: Vec::new(), errors: Vec::new() }
    }

    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<ScanError>) {
        loop {
            self.cursor.start_lexeme();
            let Some(c) = self.cursor.next() else { break };
            self.scan_token(c);
        }

        self.tokens.push(Token::eof(self.cursor.line()));
        log::debug!(
            "Scanned {} tokens with {} errors",
            self.tokens.len(),
            self.errors.len()
        );

        (self.tokens, self.errors)
    }

    fn scan_token(&mut self, c: char) {
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),

            '!' => {
                let kind = if self.cursor.advance_if('=') { BangEqual } else { Bang };
                self.add_token(kind)
            }
            '=' => {
                let kind = if self.cursor.advance_if('=') { EqualEqual } else { Equal };
                self.add_token(kind)
            }
            '<' => {
                let kind = if self.cursor.advance_if('=') { LessEqual } else { Less };
                self.add_token(kind)
            }
            '>' => {
                let kind = if self.cursor.advance_if('=') { GreaterEqual } else { Greater };
                self.add_token(kind)
            }

            '/' => {
                if self.cursor.advance_if('/') {
                    // Comment
                    self.cursor.advance_while(|c| c != '\n');
                } else {
                    self.add_token(Slash)
                }
            }

            '"' => self.string(),

            d if d.is_ascii_digit() => self.number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            // The cursor already counted the newline.
            ' ' | '\r' | '\t' | '\n' => (),

            c => self.error(ScanErrorType::UnexpectedCharacter(c)),
        }
    }

    fn add_token(&mut self, kind: TokenType) {
        self.push_token(kind, None)
    }

    fn push_token(&mut self, kind: TokenType, literal: Option<Literal>) {
        let token = Token::new(kind, self.cursor.lexeme(), literal, self.cursor.line());
        log::trace!("Scanned {:?}", token);
        self.tokens.push(token);
    }

    fn error(&mut self, error: ScanErrorType) {
        log::trace!("Scan error on line {}: {}", self.cursor.line(), error);
        self.errors.push(ScanError { line: self.cursor.line(), error });
    }

    fn string(&mut self) {
        self.cursor.advance_while(|c| c != '"');

        if self.cursor.next().is_none() {
            self.error(ScanErrorType::UnterminatedString);
            return;
        }

        let lexeme = self.cursor.lexeme();
        let value = lexeme[1..lexeme.len() - 1].to_string();
        self.push_token(Str, Some(Literal::Str(value)));
    }

    fn number(&mut self) {
        self.cursor.advance_while(|c| c.is_ascii_digit());

        // A trailing '.' is not part of the number
        if self.cursor.peek() == Some('.')
            && matches!(self.cursor.peek_next(), Some(c) if c.is_ascii_digit())
        {
            self.cursor.next();
            self.cursor.advance_while(|c| c.is_ascii_digit());
        }

        let lexeme = self.cursor.lexeme();
        match lexeme.parse::<f64>() {
            Ok(n) => self.push_token(Number, Some(Literal::Number(n))),
            Err(_) => self.error(ScanErrorType::InvalidNumber(lexeme.to_string())),
        }
    }

    fn identifier(&mut self) {
        self.cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');

        let kind = self
            .cursor
            .lexeme()
            .parse::<Keyword>()
            .map(TokenType::from)
            .unwrap_or(Identifier);
        self.add_token(kind)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    fn token(kind: TokenType, lexeme: &str, line: usize) -> Token {
        Token::new(kind, lexeme, None, Line(line))
    }

    fn kinds(source: &str) -> Vec<TokenType> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "{errors:?}");
        tokens.iter().map(Token::kind).collect()
    }

    #[test]
    fn string_literals() {
        let (tokens, errors) = scan("\"hello world\"");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(
            tokens,
            vec![
                Token::new(
                    Str,
                    "\"hello world\"",
                    Some(Literal::Str("hello world".to_string())),
                    Line(1)
                ),
                Token::eof(Line(1)),
            ]
        );

        let (tokens, _) = scan("\"one\ntwo\" x");
        assert_eq!(tokens[0].literal(), Some(&Literal::Str("one\ntwo".to_string())));
        assert_eq!(tokens[0].line(), Line(2));
        assert_eq!(tokens[1], token(Identifier, "x", 2));
    }

    #[test]
    fn unterminated_string() {
        let (tokens, errors) = scan("\"abc");
        assert_eq!(tokens, vec![Token::eof(Line(1))]);
        assert_eq!(
            errors,
            vec![ScanError { line: Line(1), error: ScanErrorType::UnterminatedString }]
        );
        assert_eq!(errors[0].to_string(), "[line 1] Error: Unterminated string.");

        let (tokens, errors) = scan("print \"abc\n\n");
        assert_eq!(tokens, vec![token(Print, "print", 1), Token::eof(Line(3))]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn two_char_tokens() {
        assert_eq!(
            kinds("! != = == < <= > >="),
            vec![Bang, BangEqual, Equal, EqualEqual, Less, LessEqual, Greater, GreaterEqual, Eof]
        );
    }

    #[test]
    fn single_char_tokens() {
        let (tokens, errors) = scan("=(){},.-+;*/!<>");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(
            tokens,
            vec![
                token(Equal, "=", 1),
                token(LeftParen, "(", 1),
                token(RightParen, ")", 1),
                token(LeftBrace, "{", 1),
                token(RightBrace, "}", 1),
                token(Comma, ",", 1),
                token(Dot, ".", 1),
                token(Minus, "-", 1),
                token(Plus, "+", 1),
                token(Semicolon, ";", 1),
                token(Star, "*", 1),
                token(Slash, "/", 1),
                token(Bang, "!", 1),
                token(Less, "<", 1),
                token(Greater, ">", 1),
                Token::eof(Line(1)),
            ]
        );
    }

    #[test]
    fn comments() {
        let (tokens, errors) = scan("a // comment\nb // trailing");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(
            tokens,
            vec![token(Identifier, "a", 1), token(Identifier, "b", 2), Token::eof(Line(2))]
        );
    }

    #[test]
    fn numbers() {
        let (tokens, errors) = scan("123 4.5 6. .7");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(
            tokens,
            vec![
                Token::new(Number, "123", Some(Literal::Number(123.0)), Line(1)),
                Token::new(Number, "4.5", Some(Literal::Number(4.5)), Line(1)),
                Token::new(Number, "6", Some(Literal::Number(6.0)), Line(1)),
                token(Dot, ".", 1),
                token(Dot, ".", 1),
                Token::new(Number, "7", Some(Literal::Number(7.0)), Line(1)),
                Token::eof(Line(1)),
            ]
        );
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            kinds("fn self _private orchid var2 nil"),
            vec![Fun, SelfKw, Identifier, Identifier, Identifier, Nil, Eof]
        );

        for keyword in Keyword::iter() {
            assert_eq!(kinds(keyword.as_ref()), vec![TokenType::from(keyword), Eof]);
        }

        // Lookup is case sensitive
        assert_eq!(kinds("Print PRINT"), vec![Identifier, Identifier, Eof]);
    }

    #[test]
    fn unexpected_characters_do_not_stop_scanning() {
        let (tokens, errors) = scan("1 @ 2\n#");
        assert_eq!(tokens.iter().map(Token::kind).collect::<Vec<_>>(), vec![Number, Number, Eof]);
        assert_eq!(
            errors,
            vec![
                ScanError { line: Line(1), error: ScanErrorType::UnexpectedCharacter('@') },
                ScanError { line: Line(2), error: ScanErrorType::UnexpectedCharacter('#') },
            ]
        );
        assert_eq!(
            ScanErrors(errors).to_string(),
            "[line 1] Error: Unexpected character '@'.\n[line 2] Error: Unexpected character '#'."
        );
    }

    #[test]
    fn always_ends_with_eof() {
        for source in ["", "\n\n", "\"", "//", "1.", "é", "print 1;"] {
            let (tokens, _) = scan(source);
            assert_eq!(tokens.last().map(Token::kind), Some(Eof), "source: {source:?}");
        }
        assert_eq!(scan("\n\n").0, vec![Token::eof(Line(3))]);
    }

    #[test]
    fn independent_runs() {
        let (_, errors) = scan("@\n\n\"");
        assert_eq!(errors.len(), 2);

        let (tokens, errors) = scan("1;");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(tokens.last(), Some(&Token::eof(Line(1))));
    }
}
