//! GLSL emission from the IR, one statement per instruction

// String writing is infallible, so .unwrap() is safe here
#![allow(clippy::unwrap_used)]

use std::fmt::Write;

use super::{float_literal, render, shader};
use crate::ir::{IrProgram, Op, ValueId};

fn var(id: ValueId) -> String {
    format!("v{}", id.0)
}

fn vars(ids: &[ValueId]) -> Vec<String> {
    ids.iter().copied().map(var).collect()
}

/// Emit a complete shader with one local variable per IR slot
pub fn emit(program: &IrProgram) -> String {
    let mut body = String::new();
    for (id, inst) in program.iter() {
        let value = match &inst.op {
            Op::Point => "p".to_string(),
            Op::Const(n) => float_literal(*n),
            Op::Neg(v) => format!("-{}", var(*v)),
            Op::Binary { op, lhs, rhs } => format!("{} {} {}", var(*lhs), op.symbol(), var(*rhs)),
            Op::Value { builtin, args } => render(builtin.glsl.template, &[], &vars(args)),
            Op::Shape {
                builtin,
                point,
                args,
            }
            | Op::Warp {
                builtin,
                point,
                args,
            } => render(builtin.glsl.template, &[("p", var(*point).as_str())], &vars(args)),
            Op::Combine { builtin, lhs, rhs } => render(
                builtin.glsl.template,
                &[("a", var(*lhs).as_str()), ("b", var(*rhs).as_str())],
                &[],
            ),
            Op::Correct {
                builtin,
                dist,
                args,
            } => render(
                builtin.glsl.correct.unwrap_or("{d}"),
                &[("d", var(*dist).as_str())],
                &vars(args),
            ),
        };
        writeln!(body, "    {} {} = {};", inst.ty.glsl_name(), var(id), value).unwrap();
    }
    let result = program
        .result()
        .map_or_else(|| float_literal(f32::NAN), var);
    writeln!(body, "    return {};", result).unwrap();
    shader(&body)
}
