//! GLSL emission straight from the checked tree

use super::{float_literal, render, shader};
use crate::Program;
use crate::ast::{Expr, ExprKind};
use crate::builtins::{self, Builtin, Rule};

/// Emit a complete shader as a single nested `return` expression
pub fn emit(program: &Program) -> String {
    let expr = emit_expr(program.root(), "p");
    shader(&format!("    return {};\n", expr))
}

/// Emit one expression with `point` as the GLSL expression for the current point
fn emit_expr(expr: &Expr, point: &str) -> String {
    match &expr.kind {
        ExprKind::Number(n) => float_literal(*n),
        ExprKind::Vector { x, y, z } => render(
            builtins::vec3().glsl.template,
            &[],
            &[emit_expr(x, point), emit_expr(y, point), emit_expr(z, point)],
        ),
        ExprKind::Unary { operand, .. } => format!("(-{})", emit_expr(operand, point)),
        ExprKind::Binary { op, lhs, rhs } => format!(
            "({} {} {})",
            emit_expr(lhs, point),
            op.symbol(),
            emit_expr(rhs, point)
        ),
        ExprKind::Identifier(name) => call(builtins::resolved(name), &[], point),
        ExprKind::Call { name, args } => call(builtins::resolved(name), args, point),
    }
}

fn emit_all(exprs: &[Expr], point: &str) -> Vec<String> {
    exprs.iter().map(|e| emit_expr(e, point)).collect()
}

fn call(builtin: &Builtin, args: &[Expr], point: &str) -> String {
    let glsl = &builtin.glsl;
    match builtin.rule {
        Rule::Value(_) => render(glsl.template, &[], &emit_all(args, point)),
        Rule::Shape(_) => render(glsl.template, &[("p", point)], &emit_all(args, point)),
        Rule::Combine(_) => {
            let Some((first, rest)) = args.split_first() else {
                return float_literal(f32::NAN);
            };
            rest.iter().fold(emit_expr(first, point), |acc, operand| {
                let rhs = emit_expr(operand, point);
                render(glsl.template, &[("a", acc.as_str()), ("b", rhs.as_str())], &[])
            })
        }
        Rule::Transform { .. } => {
            let Some((geometry, params)) = args.split_first() else {
                return float_literal(f32::NAN);
            };
            let params = emit_all(params, point);
            let inner = if builtin.has_warp() {
                render(glsl.template, &[("p", point)], &params)
            } else {
                point.to_string()
            };
            let dist = emit_expr(geometry, &inner);
            match glsl.correct {
                Some(correct) => render(correct, &[("d", dist.as_str())], &params),
                None => dist,
            }
        }
    }
}
