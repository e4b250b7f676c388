//! Tokens and source spans
//!
//! Every token carries the byte range it was read from so diagnostics from
//! any later stage can point back at the offending source text.

use std::fmt;

/// Byte offset range in the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 1-based line and column of the span start within `source`
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let upto = &source[..self.start.min(source.len())];
        let line = upto.matches('\n').count() + 1;
        let col = upto
            .rfind('\n')
            .map_or(upto.chars().count(), |nl| upto[nl + 1..].chars().count())
            + 1;
        (line, col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// The fixed symbol set of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Dot,
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Symbol::LParen => '(',
            Symbol::RParen => ')',
            Symbol::Comma => ',',
            Symbol::Plus => '+',
            Symbol::Minus => '-',
            Symbol::Star => '*',
            Symbol::Slash => '/',
            Symbol::Dot => '.',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            ',' => Symbol::Comma,
            '+' => Symbol::Plus,
            '-' => Symbol::Minus,
            '*' => Symbol::Star,
            '/' => Symbol::Slash,
            '.' => Symbol::Dot,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f32),
    Ident(String),
    Symbol(Symbol),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Symbol(s) => write!(f, "'{}'", s.as_char()),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let src = "union(\n  sphere(1),\n  box(x))";
        let pos = src.find("box").unwrap_or_default();
        assert_eq!(Span::new(pos, pos + 3).line_col(src), (3, 3));
        assert_eq!(Span::new(0, 1).line_col(src), (1, 1));
    }

    #[test]
    fn test_merge() {
        let span = Span::new(4, 6).merge(Span::new(1, 2));
        assert_eq!(span, Span::new(1, 6));
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn test_symbol_round_trip() {
        for c in "(),+-*/.".chars() {
            assert_eq!(Symbol::from_char(c).map(Symbol::as_char), Some(c));
        }
        assert_eq!(Symbol::from_char('$'), None);
    }
}
