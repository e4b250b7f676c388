//! Recursive-descent parser: tokens to AST
//!
//! ```text
//! expr           := additive
//! additive       := multiplicative (('+'|'-') multiplicative)*
//! multiplicative := unary (('*'|'/') unary)*
//! unary          := '-' unary | primary
//! primary        := NUMBER | vector | call | IDENT | '(' expr ')'
//! call           := IDENT '(' (expr (',' expr)*)? ')'
//! vector         := 'vec3' '(' expr ',' expr ',' expr ')'
//! ```
//!
//! The parser knows nothing about builtins; arity and types are the
//! checker's job.

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use crate::token::{Span, Symbol, Token, TokenKind};

/// Maximum nesting depth of expressions.
///
/// Every later stage recurses over the tree, so bounding depth here bounds
/// the stack use of the whole pipeline.
pub const MAX_DEPTH: usize = 256;

/// Tokenize and parse `source`
pub fn parse_source(source: &str) -> Result<Expr> {
    parse(tokenize(source)?)
}

/// Parse a complete token stream (as produced by [`tokenize`]) into one expression.
pub fn parse(tokens: Vec<Token>) -> Result<Expr> {
    let mut parser = Parser::new(tokens);
    let expr = parser.expr()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(Error::parse(trailing.span, "end of input", &trailing.kind));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        // Callers may hand over a stream without the terminator
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        // Never past the Eof token the constructor guarantees
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, symbol: Symbol) -> Option<Token> {
        self.peek().is_symbol(symbol).then(|| self.advance())
    }

    fn expect(&mut self, symbol: Symbol) -> Result<Token> {
        if let Some(token) = self.eat(symbol) {
            return Ok(token);
        }
        let found = self.peek();
        Err(Error::parse(
            found.span,
            format!("'{}'", symbol.as_char()),
            &found.kind,
        ))
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let span = self.peek().span;
            return Err(Error::parse(
                span,
                format!("at most {} levels of nesting", MAX_DEPTH),
                "a deeper expression",
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<Expr> {
        self.enter()?;
        let expr = self.additive();
        self.leave();
        expr
    }

    /// Run a left fold, restoring the depth it accumulated afterwards
    fn folded(&mut self, fold: fn(&mut Self) -> Result<Expr>) -> Result<Expr> {
        let depth = self.depth;
        let expr = fold(self);
        self.depth = depth;
        expr
    }

    fn additive(&mut self) -> Result<Expr> {
        self.folded(Self::additive_chain)
    }

    // Each folded operator nests the tree one level deeper on the left
    fn additive_chain(&mut self) -> Result<Expr> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = if self.eat(Symbol::Plus).is_some() {
                BinaryOp::Add
            } else if self.eat(Symbol::Minus).is_some() {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            self.enter()?;
            let rhs = self.multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        self.folded(Self::multiplicative_chain)
    }

    fn multiplicative_chain(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(Symbol::Star).is_some() {
                BinaryOp::Mul
            } else if self.eat(Symbol::Slash).is_some() {
                BinaryOp::Div
            } else {
                return Ok(lhs);
            };
            self.enter()?;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Some(minus) = self.eat(Symbol::Minus) {
            self.enter()?;
            let operand = self.unary();
            self.leave();
            let operand = operand?;
            let span = minus.span.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::new(ExprKind::Number(value), token.span)),
            TokenKind::Ident(name) => {
                if !self.peek().is_symbol(Symbol::LParen) {
                    return Ok(Expr::new(ExprKind::Identifier(name), token.span));
                }
                if name == "vec3" {
                    self.vector(token.span)
                } else {
                    self.call(name, token.span)
                }
            }
            TokenKind::Symbol(Symbol::LParen) => {
                let inner = self.expr()?;
                let close = self.expect(Symbol::RParen)?;
                // Grouping leaves no node behind, only widens the span
                Ok(Expr {
                    span: token.span.merge(close.span),
                    ..inner
                })
            }
            other => Err(Error::parse(token.span, "an expression", &other)),
        }
    }

    fn call(&mut self, name: String, name_span: Span) -> Result<Expr> {
        self.expect(Symbol::LParen)?;
        let mut args = Vec::new();
        let close = if let Some(close) = self.eat(Symbol::RParen) {
            close
        } else {
            loop {
                args.push(self.argument()?);
                if self.eat(Symbol::Comma).is_none() {
                    break self.expect_close()?;
                }
            }
        };
        Ok(Expr::new(
            ExprKind::Call { name, args },
            name_span.merge(close.span),
        ))
    }

    fn vector(&mut self, name_span: Span) -> Result<Expr> {
        self.expect(Symbol::LParen)?;
        let x = self.argument()?;
        self.expect(Symbol::Comma)?;
        let y = self.argument()?;
        self.expect(Symbol::Comma)?;
        let z = self.argument()?;
        let close = self.expect_close()?;
        Ok(Expr::new(
            ExprKind::Vector {
                x: Box::new(x),
                y: Box::new(y),
                z: Box::new(z),
            },
            name_span.merge(close.span),
        ))
    }

    /// One argument; an empty slot such as `f(1,)` is reported as such.
    fn argument(&mut self) -> Result<Expr> {
        let next = self.peek();
        if next.is_symbol(Symbol::Comma) || next.is_symbol(Symbol::RParen) {
            return Err(Error::parse(next.span, "an argument", &next.kind));
        }
        self.expr()
    }

    fn expect_close(&mut self) -> Result<Token> {
        if let Some(close) = self.eat(Symbol::RParen) {
            return Ok(close);
        }
        let found = self.peek();
        let expected = if found.kind == TokenKind::Eof {
            "')' to close the argument list"
        } else {
            "',' or ')'"
        };
        Err(Error::parse(found.span, expected, &found.kind))
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = lhs.span.merge(rhs.span);
    Expr::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;

    fn parse_ok(src: &str) -> Expr {
        match parse_source(src) {
            Ok(expr) => expr,
            Err(e) => panic!("{} should parse: {}", src, e),
        }
    }

    fn parse_err(src: &str) -> Error {
        match parse_source(src) {
            Ok(expr) => panic!("{} should not parse, got {}", src, expr),
            Err(e) => e,
        }
    }

    #[test]
    fn test_simple_call() {
        let expr = parse_ok("sphere(1)");
        let (name, args) = expr.call_parts().unwrap_or(("", &[]));
        assert_eq!(name, "sphere");
        assert_eq!(args.len(), 1);
        assert_eq!(expr.span, Span::new(0, 9));
    }

    #[test]
    fn test_vector_literal() {
        let expr = parse_ok("vec3(1, 2, 3)");
        assert!(matches!(expr.kind, ExprKind::Vector { .. }));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse_ok("1 + 2 * 3").to_string(), "1 + 2 * 3");
        assert_eq!(parse_ok("(1 + 2) * 3").to_string(), "(1 + 2) * 3");
        assert_eq!(parse_ok("1 - 2 - 3").to_string(), "1 - 2 - 3");
        assert_eq!(parse_ok("1 - (2 - 3)").to_string(), "1 - (2 - 3)");
        assert_eq!(parse_ok("-2 * 3").to_string(), "-2 * 3");
        assert_eq!(parse_ok("-(2 * 3)").to_string(), "-(2 * 3)");
    }

    #[test]
    fn test_left_associative() {
        let expr = parse_ok("8 / 4 / 2");
        let ExprKind::Binary { lhs, .. } = &expr.kind else {
            panic!("expected binary");
        };
        assert!(matches!(
            lhs.kind,
            ExprKind::Binary {
                op: BinaryOp::Div,
                ..
            }
        ));
    }

    #[test]
    fn test_bare_identifier_is_not_a_call_node() {
        let expr = parse_ok("translate(sphere(1), x_axis * 2)");
        let (_, args) = expr.call_parts().unwrap_or(("", &[]));
        let ExprKind::Binary { lhs, .. } = &args[1].kind else {
            panic!("expected binary");
        };
        assert_eq!(lhs.kind, ExprKind::Identifier("x_axis".into()));
    }

    #[test]
    fn test_empty_call() {
        let expr = parse_ok("pi()");
        assert_eq!(
            expr.kind,
            ExprKind::Call {
                name: "pi".into(),
                args: vec![]
            }
        );
    }

    #[test]
    fn test_grouping_widens_span() {
        let expr = parse_ok("(sphere(1))");
        assert_eq!(expr.span, Span::new(0, 11));
        assert!(matches!(expr.kind, ExprKind::Call { .. }));
    }

    #[test]
    fn test_unclosed_call() {
        let err = parse_err("sphere(");
        assert_eq!(err.kind(), DiagnosticKind::Parse);
        assert!(matches!(err, Error::Parse { ref found, .. } if found == "end of input"));
    }

    #[test]
    fn test_missing_close_paren() {
        let err = parse_err("union(sphere(1), sphere(2)");
        assert!(
            matches!(err, Error::Parse { ref expected, .. } if expected.contains("')'")),
            "{}",
            err
        );
    }

    #[test]
    fn test_empty_argument() {
        let err = parse_err("union(sphere(1),)");
        assert!(matches!(err, Error::Parse { ref expected, .. } if expected == "an argument"));
        let err = parse_err("box(vec3(1,,2))");
        assert!(matches!(err, Error::Parse { span, .. } if span == Span::new(11, 12)));
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse_err("sphere(1) sphere(2)");
        assert!(matches!(
            err,
            Error::Parse { ref expected, span, .. }
                if expected == "end of input" && span.start == 10
        ));
        assert_eq!(parse_err("sphere(1))").kind(), DiagnosticKind::Parse);
    }

    #[test]
    fn test_vector_needs_three_components() {
        assert_eq!(parse_err("vec3(1, 2)").kind(), DiagnosticKind::Parse);
        assert_eq!(parse_err("vec3(1, 2, 3, 4)").kind(), DiagnosticKind::Parse);
    }

    #[test]
    fn test_dot_is_rejected() {
        assert_eq!(parse_err("x_axis.x").kind(), DiagnosticKind::Parse);
    }

    #[test]
    fn test_empty_input() {
        let err = parse_err("");
        assert!(matches!(err, Error::Parse { ref expected, .. } if expected == "an expression"));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(parse_err(&deep).kind(), DiagnosticKind::Parse);

        let negs = format!("{}1", "-".repeat(MAX_DEPTH + 1));
        assert_eq!(parse_err(&negs).kind(), DiagnosticKind::Parse);

        let ok = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        parse_ok(&ok);
    }

    #[test]
    fn test_operator_chains_count_toward_depth() {
        let sum = format!("sphere({})", vec!["1"; MAX_DEPTH + 1].join(" + "));
        assert_eq!(parse_err(&sum).kind(), DiagnosticKind::Parse);

        let product = format!("sphere({})", vec!["1"; MAX_DEPTH + 1].join(" * "));
        assert_eq!(parse_err(&product).kind(), DiagnosticKind::Parse);

        // depth is released once a chain ends
        let short = vec!["1"; 100].join(" + ");
        parse_ok(&format!("union(sphere({0}), sphere({0}), sphere({0}))", short));
    }

    #[test]
    fn test_accepts_token_stream_without_eof() {
        let mut tokens = tokenize("sphere(1)").unwrap_or_default();
        tokens.pop();
        assert!(parse(tokens).is_ok());
    }
}
