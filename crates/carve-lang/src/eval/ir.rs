//! Linear IR interpreter

use glam::Vec3;

use crate::ir::{IrProgram, Op, ValueId};
use crate::value::Value;

/// Execute a lowered program at a point, one slot per instruction.
pub fn execute(program: &IrProgram, point: Vec3) -> Value {
    let mut slots: Vec<Value> = Vec::with_capacity(program.len());
    for inst in program.insts() {
        let read = |id: &ValueId| slots[id.0];
        let gather = |ids: &[ValueId]| ids.iter().map(read).collect::<Vec<_>>();
        let value = match &inst.op {
            Op::Point => Value::Vec3(point),
            Op::Const(n) => Value::Scalar(*n),
            Op::Neg(v) => -read(v),
            Op::Binary { op, lhs, rhs } => Value::binary(*op, read(lhs), read(rhs)),
            Op::Value { builtin, args } => builtin.value(&gather(args)),
            Op::Shape {
                builtin,
                point,
                args,
            } => Value::Scalar(builtin.shape(read(point).vector(), &gather(args))),
            Op::Combine { builtin, lhs, rhs } => {
                Value::Scalar(builtin.combine(read(lhs).scalar(), read(rhs).scalar()))
            }
            Op::Warp {
                builtin,
                point,
                args,
            } => Value::Vec3(builtin.warp(read(point).vector(), &gather(args))),
            Op::Correct {
                builtin,
                dist,
                args,
            } => Value::Scalar(builtin.correct(read(dist).scalar(), &gather(args))),
        };
        slots.push(value);
    }
    slots.last().copied().unwrap_or(Value::Scalar(f32::NAN))
}
