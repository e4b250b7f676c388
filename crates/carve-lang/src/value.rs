//! Runtime values of the interpreters

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use glam::Vec3;

use crate::ast::BinaryOp;

/// A runtime value. Geometry has no value of its own; evaluating one at a
/// point produces a `Scalar` distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Scalar(f32),
    Vec3(Vec3),
}

impl Value {
    /// The scalar payload.
    ///
    /// Type-checked programs only ask for scalars where the checker proved
    /// one; a vector here yields NaN rather than a panic.
    pub fn scalar(self) -> f32 {
        match self {
            Value::Scalar(s) => s,
            Value::Vec3(_) => f32::NAN,
        }
    }

    /// The vector payload, NaN-filled for a scalar.
    pub fn vector(self) -> Vec3 {
        match self {
            Value::Vec3(v) => v,
            Value::Scalar(_) => Vec3::NAN,
        }
    }

    /// Apply an arithmetic operator with the language's promotion rules:
    /// matching types work componentwise, and a scalar scales a vector.
    pub fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
        match op {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
        }
    }
}

impl From<f32> for Value {
    fn from(s: f32) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Vec3(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{}", s),
            Value::Vec3(v) => write!(f, "vec3({}, {}, {})", v.x, v.y, v.z),
        }
    }
}

macro_rules! impl_arith {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Value {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                match (self, rhs) {
                    (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(a $op b),
                    (Value::Vec3(a), Value::Vec3(b)) => Value::Vec3(a $op b),
                    (Value::Scalar(a), Value::Vec3(b)) => Value::Vec3(Vec3::splat(a) $op b),
                    (Value::Vec3(a), Value::Scalar(b)) => Value::Vec3(a $op Vec3::splat(b)),
                }
            }
        }
    };
}

impl_arith!(Add, add, +);
impl_arith!(Sub, sub, -);
impl_arith!(Mul, mul, *);
impl_arith!(Div, div, /);

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        match self {
            Value::Scalar(s) => Value::Scalar(-s),
            Value::Vec3(v) => Value::Vec3(-v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_vector_promotion() {
        let v = Value::Vec3(Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(Value::Scalar(2.0) * v, Value::Vec3(Vec3::new(2.0, 4.0, 8.0)));
        assert_eq!(v / Value::Scalar(2.0), Value::Vec3(Vec3::new(0.5, 1.0, 2.0)));
        assert_eq!(Value::Scalar(4.0) / v, Value::Vec3(Vec3::new(4.0, 2.0, 1.0)));
    }

    #[test]
    fn test_division_by_zero_is_signed_infinity() {
        assert_eq!(
            Value::binary(BinaryOp::Div, Value::Scalar(1.0), Value::Scalar(0.0)),
            Value::Scalar(f32::INFINITY)
        );
        assert_eq!(
            Value::binary(BinaryOp::Div, Value::Scalar(-1.0), Value::Scalar(0.0)),
            Value::Scalar(f32::NEG_INFINITY)
        );
        let nan = Value::binary(BinaryOp::Div, Value::Scalar(0.0), Value::Scalar(0.0));
        assert!(nan.scalar().is_nan());
    }

    #[test]
    fn test_negation_preserves_kind() {
        assert_eq!(-Value::Scalar(1.5), Value::Scalar(-1.5));
        assert_eq!(-Value::Vec3(Vec3::X), Value::Vec3(-Vec3::X));
    }

    #[test]
    fn test_mismatched_accessors_are_nan() {
        assert!(Value::Vec3(Vec3::ONE).scalar().is_nan());
        assert!(Value::Scalar(1.0).vector().is_nan());
    }
}
