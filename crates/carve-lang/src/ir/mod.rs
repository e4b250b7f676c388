//! Flat intermediate representation
//!
//! An [`IrProgram`] is an ordered list of instructions. Operands are
//! [`ValueId`] indices into the same list and always refer to an earlier
//! instruction, so a single forward pass can execute or emit it. Slot 0 is
//! always the evaluation point and the last slot holds the program's distance.

pub mod lower;

use std::fmt;

use serde::{Serialize, Serializer};

use crate::ast::BinaryOp;
use crate::builtins::Builtin;
use crate::types::Type;

pub use lower::lower;

/// Index of an instruction result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ValueId(pub usize);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

fn builtin_name<S: Serializer>(
    builtin: &&'static Builtin,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(builtin.name)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// The point the program is evaluated at
    Point,
    Const(f32),
    Neg(ValueId),
    Binary {
        op: BinaryOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    /// A non-geometry builtin such as `vec3` or `pi`
    Value {
        #[serde(serialize_with = "builtin_name")]
        builtin: &'static Builtin,
        args: Vec<ValueId>,
    },
    /// Distance from `point` to a primitive solid
    Shape {
        #[serde(serialize_with = "builtin_name")]
        builtin: &'static Builtin,
        point: ValueId,
        args: Vec<ValueId>,
    },
    /// Boolean of two distances
    Combine {
        #[serde(serialize_with = "builtin_name")]
        builtin: &'static Builtin,
        lhs: ValueId,
        rhs: ValueId,
    },
    /// Point transformed for the geometry operand of a spatial operator
    Warp {
        #[serde(serialize_with = "builtin_name")]
        builtin: &'static Builtin,
        point: ValueId,
        args: Vec<ValueId>,
    },
    /// Distance adjusted after a spatial operator
    Correct {
        #[serde(serialize_with = "builtin_name")]
        builtin: &'static Builtin,
        dist: ValueId,
        args: Vec<ValueId>,
    },
}

impl Op {
    /// Every slot this op reads, in operand order
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Op::Point | Op::Const(_) => Vec::new(),
            Op::Neg(v) => vec![*v],
            Op::Binary { lhs, rhs, .. } | Op::Combine { lhs, rhs, .. } => vec![*lhs, *rhs],
            Op::Value { args, .. } => args.clone(),
            Op::Shape { point, args, .. } | Op::Warp { point, args, .. } => {
                std::iter::once(*point).chain(args.iter().copied()).collect()
            }
            Op::Correct { dist, args, .. } => {
                std::iter::once(*dist).chain(args.iter().copied()).collect()
            }
        }
    }
}

/// Writes `%1, %2`
struct Slots<'a>(&'a [ValueId]);

impl fmt::Display for Slots<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Point => f.write_str("point"),
            Op::Const(n) => write!(f, "const {:?}", n),
            Op::Neg(v) => write!(f, "neg {}", v),
            Op::Binary { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op.symbol(), rhs),
            Op::Value { builtin, args } => write!(f, "value {}({})", builtin.name, Slots(args)),
            Op::Shape {
                builtin,
                point,
                args,
            } => write!(f, "shape {}({}; {})", builtin.name, point, Slots(args)),
            Op::Combine { builtin, lhs, rhs } => {
                write!(f, "combine {}({}, {})", builtin.name, lhs, rhs)
            }
            Op::Warp {
                builtin,
                point,
                args,
            } => write!(f, "warp {}({}; {})", builtin.name, point, Slots(args)),
            Op::Correct {
                builtin,
                dist,
                args,
            } => write!(f, "correct {}({}; {})", builtin.name, dist, Slots(args)),
        }
    }
}

/// One instruction and the type of the value it produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inst {
    pub op: Op,
    pub ty: Type,
}

/// A lowered program. Built only by [`lower`], so every instance is well formed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrProgram {
    insts: Vec<Inst>,
}

impl IrProgram {
    pub(crate) fn new(insts: Vec<Inst>) -> Self {
        Self { insts }
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Slot holding the program's distance
    pub fn result(&self) -> Option<ValueId> {
        self.insts.len().checked_sub(1).map(ValueId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ValueId, &Inst)> {
        self.insts.iter().enumerate().map(|(i, inst)| (ValueId(i), inst))
    }

    /// Check the structural invariants: slot 0 is the point, every operand
    /// refers strictly backward, and the result is a distance.
    pub fn is_well_formed(&self) -> bool {
        let starts_at_point = matches!(
            self.insts.first(),
            Some(Inst {
                op: Op::Point,
                ty: Type::Vec3
            })
        );
        let backward = self
            .iter()
            .all(|(id, inst)| inst.op.operands().iter().all(|operand| *operand < id));
        let single_point = self.insts.iter().skip(1).all(|inst| inst.op != Op::Point);
        let ends_in_distance = self.insts.last().is_some_and(|inst| inst.ty == Type::Geometry);
        starts_at_point && backward && single_point && ends_in_distance
    }
}

/// One instruction per line: `%2 = shape sphere(%0; %1) : Geometry`
impl fmt::Display for IrProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, inst) in self.iter() {
            writeln!(f, "{} = {} : {}", id, inst.op, inst.ty)?;
        }
        Ok(())
    }
}
