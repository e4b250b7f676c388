//! Type checker: AST to [`Program`]
//!
//! A single bottom-up pass assigns a type to every node. The only way to
//! obtain a [`Program`] is through [`check`], so everything downstream may
//! assume a fully typed tree whose calls all resolve.

use crate::ast::{BinaryOp, Expr, ExprKind};
use crate::builtins::{self, Builtin};
use crate::error::{Error, Result};
use crate::types::{Type, type_list};

/// A type-checked program: every node is typed and the root is a solid
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    root: Expr,
}

impl Program {
    pub fn root(&self) -> &Expr {
        &self.root
    }

    pub fn into_root(self) -> Expr {
        self.root
    }
}

/// Type check an expression as a whole program
pub fn check(mut expr: Expr) -> Result<Program> {
    let ty = infer(&mut expr)?;
    if ty != Type::Geometry {
        return Err(Error::type_error(
            expr.span,
            format!("program must describe a solid, but it has type {}", ty),
        ));
    }
    Ok(Program { root: expr })
}

/// Type check an expression of any type, annotating it in place
pub fn infer(expr: &mut Expr) -> Result<Type> {
    let ty = match &mut expr.kind {
        ExprKind::Number(_) => Type::Scalar,

        ExprKind::Vector { x, y, z } => {
            let constructor = builtins::vec3();
            for (axis, component) in ["x", "y", "z"].into_iter().zip([x, y, z]) {
                let ty = infer(component)?;
                if ty != Type::Scalar {
                    return Err(Error::type_error(
                        component.span,
                        format!(
                            "vec3 expects {}, but the {} component is {}",
                            constructor.signature, axis, ty
                        ),
                    ));
                }
            }
            constructor.signature.ret
        }

        ExprKind::Unary { operand, .. } => match infer(operand)? {
            Type::Geometry => {
                return Err(Error::type_error(
                    expr.span,
                    "cannot negate Geometry; use subtract to carve one solid from another",
                ));
            }
            ty => ty,
        },

        ExprKind::Binary { op, lhs, rhs } => {
            let left = infer(lhs)?;
            let right = infer(rhs)?;
            binary_type(*op, left, right).ok_or_else(|| {
                Error::type_error(expr.span, binary_mismatch(*op, left, right))
            })?
        }

        ExprKind::Identifier(name) => {
            let builtin = resolve(name, expr.span)?;
            check_call(builtin, &[], expr.span)?
        }

        ExprKind::Call { name, args } => {
            // An unknown callee is reported before anything inside it
            let builtin = resolve(name, expr.span)?;
            let mut arg_types = Vec::with_capacity(args.len());
            for arg in args.iter_mut() {
                arg_types.push(infer(arg)?);
            }
            check_call(builtin, &arg_types, expr.span)?
        }
    };
    expr.ty = Some(ty);
    Ok(ty)
}

fn resolve(name: &str, span: crate::token::Span) -> Result<&'static Builtin> {
    builtins::lookup(name).ok_or_else(|| Error::UndefinedFunction {
        span,
        name: name.to_string(),
    })
}

fn check_call(builtin: &Builtin, args: &[Type], span: crate::token::Span) -> Result<Type> {
    if builtin.signature.accepts(args) {
        return Ok(builtin.signature.ret);
    }
    Err(Error::type_error(
        span,
        format!(
            "{} expects {}, but was given {}",
            builtin.name,
            builtin.signature,
            type_list(args)
        ),
    ))
}

fn binary_type(op: BinaryOp, left: Type, right: Type) -> Option<Type> {
    use Type::{Scalar, Vec3};
    match (op, left, right) {
        (BinaryOp::Add | BinaryOp::Sub, Scalar, Scalar) => Some(Scalar),
        (BinaryOp::Add | BinaryOp::Sub, Vec3, Vec3) => Some(Vec3),
        (BinaryOp::Mul | BinaryOp::Div, Scalar, Scalar) => Some(Scalar),
        (BinaryOp::Mul | BinaryOp::Div, Scalar, Vec3) => Some(Vec3),
        (BinaryOp::Mul | BinaryOp::Div, Vec3, Scalar) => Some(Vec3),
        _ => None,
    }
}

fn binary_mismatch(op: BinaryOp, left: Type, right: Type) -> String {
    let verb = match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "subtract",
        BinaryOp::Mul => "multiply",
        BinaryOp::Div => "divide",
    };
    let mut message = format!(
        "cannot {} {} and {} (left side is {}, right side is {})",
        verb, left, right, left, right
    );
    if left == Type::Geometry || right == Type::Geometry {
        message.push_str("; arithmetic does not apply to solids");
    } else if matches!(op, BinaryOp::Mul | BinaryOp::Div) {
        message.push_str("; vectors only scale by scalars");
    }
    message
}
