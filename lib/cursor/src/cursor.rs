use std::fmt::Formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub struct Line(pub usize);

/// Walks a source string one `char` at a time, remembering where the current
/// lexeme started and which line the lookahead position is on.
#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    start: usize,
    current: usize,
    line: Line,
}

impl<'a> std::fmt::Debug for Cursor<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The whole source is usually too verbose, so it is only shown with {:#?}
        if f.alternate() {
            f.debug_struct("Cursor")
                .field("line", &self.line)
                .field("lexeme", &self.lexeme())
                .field("source", &self.source)
                .finish()
        } else {
            f.debug_struct("Cursor")
                .field("line", &self.line)
                .field("lexeme", &self.lexeme())
                .finish()
        }
    }
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, start: 0, current: 0, line: Line(1) }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Marks the lookahead position as the beginning of the next lexeme.
    pub fn start_lexeme(&mut self) {
        self.start = self.current;
    }

    /// Everything consumed since the last call to [`Cursor::start_lexeme`].
    pub fn lexeme(&self) -> &'a str {
        &self.source[self.start..self.current]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    pub fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.next();
            true
        } else {
            false
        }
    }

    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while matches!(self.peek(), Some(c) if predicate(c)) {
            self.next();
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.current..]
    }
}

impl<'a> From<&'a str> for Cursor<'a> {
    fn from(source: &'a str) -> Self {
        Self::new(source)
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.peek()?;
        self.current += c.len_utf8();
        if c == '\n' {
            self.line.0 += 1;
        }
        Some(c)
    }
}
