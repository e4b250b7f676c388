//! Lowering from the checked AST to the flat IR
//!
//! Operands are lowered before the op that reads them, so every reference
//! points backward. Geometry is lowered against the slot holding the current
//! point; a spatial operator emits a `Warp` and lowers its geometry operand
//! against the new slot. Repeated sub-expressions are lowered each time they
//! occur.

use tracing::trace;

use super::{Inst, IrProgram, Op, ValueId};
use crate::Program;
use crate::ast::{Expr, ExprKind};
use crate::builtins::{self, Builtin, Rule};
use crate::types::Type;

/// Lower a checked program
pub fn lower(program: &Program) -> IrProgram {
    let mut lowerer = Lowerer::default();
    let point = lowerer.push(Op::Point, Type::Vec3);
    lowerer.lower(program.root(), point);
    let ir = IrProgram::new(lowerer.insts);
    debug_assert!(ir.is_well_formed(), "lowering produced malformed IR:\n{}", ir);
    ir
}

#[derive(Default)]
struct Lowerer {
    insts: Vec<Inst>,
}

impl Lowerer {
    fn push(&mut self, op: Op, ty: Type) -> ValueId {
        let id = ValueId(self.insts.len());
        trace!(%id, %op, "emit");
        self.insts.push(Inst { op, ty });
        id
    }

    fn lower(&mut self, expr: &Expr, point: ValueId) -> ValueId {
        let ty = expr.resolved_type();
        match &expr.kind {
            ExprKind::Number(n) => self.push(Op::Const(*n), ty),
            ExprKind::Vector { x, y, z } => {
                let args = vec![self.lower(x, point), self.lower(y, point), self.lower(z, point)];
                self.push(
                    Op::Value {
                        builtin: builtins::vec3(),
                        args,
                    },
                    ty,
                )
            }
            ExprKind::Unary { operand, .. } => {
                let v = self.lower(operand, point);
                self.push(Op::Neg(v), ty)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.lower(lhs, point);
                let rhs = self.lower(rhs, point);
                self.push(Op::Binary { op: *op, lhs, rhs }, ty)
            }
            ExprKind::Identifier(name) => self.call(builtins::resolved(name), &[], ty, point),
            ExprKind::Call { name, args } => self.call(builtins::resolved(name), args, ty, point),
        }
    }

    fn lower_all(&mut self, exprs: &[Expr], point: ValueId) -> Vec<ValueId> {
        exprs.iter().map(|e| self.lower(e, point)).collect()
    }

    fn call(
        &mut self,
        builtin: &'static Builtin,
        args: &[Expr],
        ty: Type,
        point: ValueId,
    ) -> ValueId {
        match builtin.rule {
            Rule::Value(_) => {
                let args = self.lower_all(args, point);
                self.push(Op::Value { builtin, args }, ty)
            }
            Rule::Shape(_) => {
                let args = self.lower_all(args, point);
                self.push(
                    Op::Shape {
                        builtin,
                        point,
                        args,
                    },
                    ty,
                )
            }
            Rule::Combine(_) => {
                let Some((first, rest)) = args.split_first() else {
                    return self.push(Op::Const(f32::NAN), ty);
                };
                let mut acc = self.lower(first, point);
                for operand in rest {
                    let rhs = self.lower(operand, point);
                    acc = self.push(
                        Op::Combine {
                            builtin,
                            lhs: acc,
                            rhs,
                        },
                        ty,
                    );
                }
                acc
            }
            Rule::Transform { .. } => {
                let Some((geometry, params)) = args.split_first() else {
                    return self.push(Op::Const(f32::NAN), ty);
                };
                let params = self.lower_all(params, point);
                let inner = if builtin.has_warp() {
                    self.push(
                        Op::Warp {
                            builtin,
                            point,
                            args: params.clone(),
                        },
                        Type::Vec3,
                    )
                } else {
                    point
                };
                let dist = self.lower(geometry, inner);
                if builtin.has_correction() {
                    self.push(
                        Op::Correct {
                            builtin,
                            dist,
                            args: params,
                        },
                        ty,
                    )
                } else {
                    dist
                }
            }
        }
    }
}
