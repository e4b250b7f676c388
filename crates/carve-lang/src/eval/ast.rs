//! Tree-walking interpreter

use glam::Vec3;

use crate::Program;
use crate::ast::{Expr, ExprKind};
use crate::builtins::{self, Builtin, Rule};
use crate::value::Value;

/// Evaluate a program at a point. Geometry evaluates to its scalar distance.
pub fn evaluate(program: &Program, point: Vec3) -> Value {
    eval(program.root(), point)
}

fn eval(expr: &Expr, point: Vec3) -> Value {
    match &expr.kind {
        ExprKind::Number(n) => Value::Scalar(*n),
        ExprKind::Vector { x, y, z } => {
            builtins::vec3().value(&[eval(x, point), eval(y, point), eval(z, point)])
        }
        ExprKind::Unary { operand, .. } => -eval(operand, point),
        ExprKind::Binary { op, lhs, rhs } => Value::binary(*op, eval(lhs, point), eval(rhs, point)),
        ExprKind::Identifier(name) => call(builtins::resolved(name), &[], point),
        ExprKind::Call { name, args } => call(builtins::resolved(name), args, point),
    }
}

fn eval_all(exprs: &[Expr], point: Vec3) -> Vec<Value> {
    exprs.iter().map(|e| eval(e, point)).collect()
}

fn call(builtin: &Builtin, args: &[Expr], point: Vec3) -> Value {
    match builtin.rule {
        Rule::Value(_) => builtin.value(&eval_all(args, point)),
        Rule::Shape(_) => Value::Scalar(builtin.shape(point, &eval_all(args, point))),
        Rule::Combine(_) => {
            let Some((first, rest)) = args.split_first() else {
                return Value::Scalar(f32::NAN);
            };
            let d = rest.iter().fold(eval(first, point).scalar(), |acc, operand| {
                builtin.combine(acc, eval(operand, point).scalar())
            });
            Value::Scalar(d)
        }
        Rule::Transform { .. } => {
            let Some((geometry, params)) = args.split_first() else {
                return Value::Scalar(f32::NAN);
            };
            let params = eval_all(params, point);
            let inner = builtin.warp(point, &params);
            let d = eval(geometry, inner).scalar();
            Value::Scalar(builtin.correct(d, &params))
        }
    }
}
