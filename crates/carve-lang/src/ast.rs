//! Abstract syntax tree
//!
//! The tree is produced by the parser with every `ty` set to `None`; the type
//! checker fills them in while building a [`crate::Program`]. Parents own their
//! children exclusively, so the tree can never share or cycle.

use std::fmt;

use serde::Serialize;

use crate::token::Span;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }
}

/// An expression node with its source span and, once checked, its type
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(f32),
    Vector {
        x: Box<Expr>,
        y: Box<Expr>,
        z: Box<Expr>,
    },
    /// A bare name: a zero-argument builtin call such as `pi` or `x_axis`
    Identifier(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }

    /// Name and arguments if this node invokes a builtin.
    ///
    /// Bare identifiers are calls with no arguments.
    pub fn call_parts(&self) -> Option<(&str, &[Expr])> {
        match &self.kind {
            ExprKind::Identifier(name) => Some((name.as_str(), [].as_slice())),
            ExprKind::Call { name, args } => Some((name.as_str(), args.as_slice())),
            _ => None,
        }
    }

    /// Resolved type as assigned by the checker.
    ///
    /// Nodes inside a [`crate::Program`] are always typed; untyped nodes
    /// report `Scalar`.
    pub fn resolved_type(&self) -> Type {
        self.ty.unwrap_or(Type::Scalar)
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + match &self.kind {
            ExprKind::Number(_) | ExprKind::Identifier(_) => 0,
            ExprKind::Vector { x, y, z } => x.node_count() + y.node_count() + z.node_count(),
            ExprKind::Unary { operand, .. } => operand.node_count(),
            ExprKind::Binary { lhs, rhs, .. } => lhs.node_count() + rhs.node_count(),
            ExprKind::Call { args, .. } => args.iter().map(Expr::node_count).sum(),
        }
    }

    fn precedence(&self) -> u8 {
        match &self.kind {
            ExprKind::Binary { op, .. } => op.precedence(),
            ExprKind::Unary { .. } => 3,
            _ => 4,
        }
    }
}

struct Operand<'a> {
    expr: &'a Expr,
    parens: bool,
}

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parens {
            write!(f, "({})", self.expr)
        } else {
            write!(f, "{}", self.expr)
        }
    }
}

/// Prints canonical source; parentheses are inserted only where precedence
/// requires them, so the output parses back to the same tree.
///
/// The exception is a literal too large for `f32`: it prints as the
/// division `(1 / 0)`, which reparses to a different tree with the same value.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) if n.is_nan() => f.write_str("(0 / 0)"),
            ExprKind::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "(1 / 0)" } else { "(-1 / 0)" })
            }
            ExprKind::Number(n) => write!(f, "{}", n),
            ExprKind::Vector { x, y, z } => write!(f, "vec3({}, {}, {})", x, y, z),
            ExprKind::Identifier(name) => f.write_str(name),
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => {
                let operand = Operand {
                    expr: operand,
                    parens: operand.precedence() < 3,
                };
                write!(f, "-{}", operand)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = Operand {
                    expr: lhs,
                    parens: lhs.precedence() < op.precedence(),
                };
                let rhs = Operand {
                    expr: rhs,
                    parens: rhs.precedence() <= op.precedence(),
                };
                write!(f, "{} {} {}", lhs, op.symbol(), rhs)
            }
            ExprKind::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f32) -> Expr {
        Expr::new(ExprKind::Number(n), Span::default())
    }

    fn bin(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            Span::default(),
        )
    }

    #[test]
    fn test_display_minimal_parens() {
        // (1 - 2) - 3 needs none, 1 - (2 - 3) needs one pair
        let left = bin(BinaryOp::Sub, bin(BinaryOp::Sub, num(1.0), num(2.0)), num(3.0));
        assert_eq!(left.to_string(), "1 - 2 - 3");
        let right = bin(BinaryOp::Sub, num(1.0), bin(BinaryOp::Sub, num(2.0), num(3.0)));
        assert_eq!(right.to_string(), "1 - (2 - 3)");
        let mixed = bin(BinaryOp::Mul, bin(BinaryOp::Add, num(1.0), num(2.0)), num(0.5));
        assert_eq!(mixed.to_string(), "(1 + 2) * 0.5");
    }

    #[test]
    fn test_display_overflowing_literal_reparses() {
        use crate::checker::check;
        use crate::parser::parse_source;

        let src = format!("sphere({})", "9".repeat(50));
        let printed = match parse_source(&src) {
            Ok(expr) => expr.to_string(),
            Err(e) => panic!("{} should parse: {}", src, e),
        };
        assert_eq!(printed, "sphere((1 / 0))");
        let reparsed = parse_source(&printed).and_then(check);
        assert!(reparsed.is_ok(), "{:?}", reparsed);

        let quotient = bin(BinaryOp::Div, num(1.0), num(f32::INFINITY));
        assert_eq!(quotient.to_string(), "1 / (1 / 0)");
        assert_eq!(num(f32::NAN).to_string(), "(0 / 0)");
    }

    #[test]
    fn test_call_parts() {
        let ident = Expr::new(ExprKind::Identifier("pi".into()), Span::default());
        assert_eq!(ident.call_parts().map(|(n, a)| (n, a.len())), Some(("pi", 0)));
        assert!(num(1.0).call_parts().is_none());
    }

    #[test]
    fn test_node_count() {
        let e = bin(BinaryOp::Add, num(1.0), bin(BinaryOp::Mul, num(2.0), num(3.0)));
        assert_eq!(e.node_count(), 5);
    }
}
