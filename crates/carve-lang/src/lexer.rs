//! Lexer: source text to tokens
//!
//! Whitespace and `#` line comments are skipped. Numbers are unsigned
//! decimals (`2`, `0.5`, `.5`, `1.`); a leading `-` is a symbol and becomes
//! unary minus in the parser.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{Error, Result};
use crate::token::{Span, Symbol, Token, TokenKind};

/// Tokenize `source`, always ending with an [`TokenKind::Eof`] token.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let tokens = Lexer::new(source).run()?;
    tracing::trace!(count = tokens.len(), "tokenized");
    Ok(tokens)
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let Some(&(start, c)) = self.chars.peek() else {
                let end = self.source.len();
                tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));
                return Ok(tokens);
            };

            let token = if c.is_ascii_digit() || (c == '.' && self.digit_follows(start)) {
                self.number(start)?
            } else if c.is_ascii_alphabetic() {
                self.ident(start)
            } else if let Some(symbol) = Symbol::from_char(c) {
                self.chars.next();
                Token::new(TokenKind::Symbol(symbol), Span::new(start, start + 1))
            } else {
                return Err(Error::Lex {
                    span: Span::new(start, start + c.len_utf8()),
                    found: c,
                });
            };
            tokens.push(token);
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else if c == '#' {
                while self.chars.next_if(|&(_, c)| c != '\n').is_some() {}
            } else {
                break;
            }
        }
    }

    fn digit_follows(&self, dot: usize) -> bool {
        self.source[dot + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn number(&mut self, start: usize) -> Result<Token> {
        let mut end = start;
        let mut seen_dot = false;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                seen_dot |= c == '.';
                end = i + 1;
                self.chars.next();
            } else {
                break;
            }
        }

        let span = Span::new(start, end);
        let text = &self.source[start..end];
        let value = text.parse::<f32>().map_err(|_| Error::Lex {
            span,
            found: text.chars().next().unwrap_or('.'),
        })?;
        Ok(Token::new(TokenKind::Number(value), span))
    }

    fn ident(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some((i, c)) = self
            .chars
            .next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_')
        {
            end = i + c.len_utf8();
        }
        Token::new(
            TokenKind::Ident(self.source[start..end].to_string()),
            Span::new(start, end),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_call() {
        assert_eq!(
            kinds("sphere(1)"),
            vec![
                TokenKind::Ident("sphere".into()),
                TokenKind::Symbol(Symbol::LParen),
                TokenKind::Number(1.0),
                TokenKind::Symbol(Symbol::RParen),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(
            kinds("2 0.25 .5 1."),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Number(0.25),
                TokenKind::Number(0.5),
                TokenKind::Number(1.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_is_a_symbol() {
        assert_eq!(
            kinds("-1-2"),
            vec![
                TokenKind::Symbol(Symbol::Minus),
                TokenKind::Number(1.0),
                TokenKind::Symbol(Symbol::Minus),
                TokenKind::Number(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_whitespace() {
        let src = "# a ball\n  sphere( 1 ) # trailing\n";
        assert_eq!(kinds(src).len(), 5);
    }

    #[test]
    fn test_identifier_with_digits_and_underscore() {
        assert_eq!(
            kinds("x_axis vec3"),
            vec![
                TokenKind::Ident("x_axis".into()),
                TokenKind::Ident("vec3".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lone_dot_is_symbol() {
        assert_eq!(
            kinds("a.b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Symbol(Symbol::Dot),
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("box(vec3(1, 2, 3))").unwrap_or_default();
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[2].span, Span::new(4, 8));
        let eof = tokens.last().map(|t| t.span);
        assert_eq!(eof, Some(Span::new(18, 18)));
    }

    #[test]
    fn test_invalid_character() {
        let err = tokenize("sphere(1) $").err();
        assert_eq!(
            err,
            Some(Error::Lex {
                span: Span::new(10, 11),
                found: '$',
            })
        );
    }

    #[test]
    fn test_leading_underscore_rejected() {
        assert!(matches!(
            tokenize("_foo"),
            Err(Error::Lex { found: '_', .. })
        ));
    }

    #[test]
    fn test_non_ascii_character() {
        let err = tokenize("sphère(1)").err();
        assert!(matches!(err, Some(Error::Lex { found: 'è', .. })));
    }

    #[test]
    fn test_empty_source_is_just_eof() {
        assert_eq!(kinds("   # nothing"), vec![TokenKind::Eof]);
    }
}
