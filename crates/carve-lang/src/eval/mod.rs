//! Numeric evaluation of compiled programs
//!
//! Two interpreters compute the same distance field: [`ast::evaluate`] walks
//! the checked tree and [`ir::execute`] runs the lowered instruction list.
//! Both dispatch through the builtin table, so they agree exactly.
//!
//! Division by zero follows IEEE-754 and yields a signed infinity (NaN for
//! `0 / 0`); `min` and `max` return the non-NaN operand when exactly one side
//! is NaN.

pub mod ast;
pub mod ir;

use glam::Vec3;

use crate::Program;
use crate::ir::IrProgram;

/// Anything that can report a signed distance at a point.
///
/// Negative values are inside the solid, positive values outside, zero on
/// the surface.
pub trait DistanceField: Send + Sync {
    fn distance(&self, p: Vec3) -> f32;

    /// Surface normal estimated with central differences
    fn normal(&self, p: Vec3) -> Vec3 {
        const EPS: f32 = 1e-3;
        let dx = Vec3::new(EPS, 0.0, 0.0);
        let dy = Vec3::new(0.0, EPS, 0.0);
        let dz = Vec3::new(0.0, 0.0, EPS);
        Vec3::new(
            self.distance(p + dx) - self.distance(p - dx),
            self.distance(p + dy) - self.distance(p - dy),
            self.distance(p + dz) - self.distance(p - dz),
        )
        .normalize_or_zero()
    }
}

impl DistanceField for Program {
    fn distance(&self, p: Vec3) -> f32 {
        ast::evaluate(self, p).scalar()
    }
}

impl DistanceField for IrProgram {
    fn distance(&self, p: Vec3) -> f32 {
        ir::execute(self, p).scalar()
    }
}
