//! Carve Math - Single Source of Truth for SDF distance formulas
//!
//! Every distance formula the language exposes lives here twice: once as a
//! Rust function used by both CPU evaluators, and once in `sdf.glsl`, the
//! helper library injected at the top of every emitted shader. Keeping the two
//! next to each other is what lets the interpreters and the shader agree.
//!
//! # Conventions
//!
//! - Points and vectors are `glam::Vec3`, all math is `f32` to match GLSL `float`
//! - Rotation angles are in **degrees**
//! - Cylinders are aligned with the Y axis and measured by half height
//! - `min`/`max` follow `f32::min`/`f32::max`: a NaN operand yields the other
//!   operand
//!
//! # Example
//!
//! ```rust
//! use carve_math::{sd_sphere, op_union};
//! use glam::Vec3;
//!
//! let p = Vec3::new(1.5, 0.0, 0.0);
//! let d = op_union(sd_sphere(p, 1.0), sd_sphere(p - Vec3::X * 3.0, 1.0));
//! assert!((d - 0.5).abs() < 1e-6);
//! ```

// Mathematical formulas use standard single-letter notation
#![allow(clippy::many_single_char_names)]

use glam::{Vec2, Vec3};

/// Degrees to radians, matching the constant written into `sdf.glsl`
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// Sphere of radius `r` centered at the origin
#[inline]
pub fn sd_sphere(p: Vec3, r: f32) -> f32 {
    p.length() - r
}

/// Axis-aligned box with half extents `b`
#[inline]
pub fn sd_box(p: Vec3, b: Vec3) -> f32 {
    let q = p.abs() - b;
    q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0)
}

/// Capped cylinder along Y with radius `r` and half height `h`
#[inline]
pub fn sd_cylinder(p: Vec3, r: f32, h: f32) -> f32 {
    let d = Vec2::new(Vec2::new(p.x, p.z).length(), p.y).abs() - Vec2::new(r, h);
    d.x.max(d.y).min(0.0) + d.max(Vec2::ZERO).length()
}

#[inline]
pub fn op_union(a: f32, b: f32) -> f32 {
    a.min(b)
}

#[inline]
pub fn op_intersect(a: f32, b: f32) -> f32 {
    a.max(b)
}

/// Remove `b` from `a`
#[inline]
pub fn op_subtract(a: f32, b: f32) -> f32 {
    a.max(-b)
}

/// Map a world-space point into the frame of a solid rotated by `degrees`.
///
/// The point is rotated about X, then Y, then Z, each by the negated angle.
/// For a single axis this is exactly the inverse of rotating the solid.
pub fn op_rotate(p: Vec3, degrees: Vec3) -> Vec3 {
    let a = -degrees * DEG_TO_RAD;
    let (sx, cx) = a.x.sin_cos();
    let (sy, cy) = a.y.sin_cos();
    let (sz, cz) = a.z.sin_cos();

    // X
    let y1 = p.y * cx - p.z * sx;
    let z1 = p.y * sx + p.z * cx;
    // Y
    let x2 = p.x * cy + z1 * sy;
    let z2 = -p.x * sy + z1 * cy;
    // Z
    let x3 = x2 * cz - y1 * sz;
    let y3 = x2 * sz + y1 * cz;

    Vec3::new(x3, y3, z2)
}

/// Get the GLSL helper library
///
/// Contains a GLSL function for every formula in this crate that is not a
/// plain GLSL built-in. Emitters prepend it to the generated `sdf` function.
pub fn glsl_library() -> &'static str {
    include_str!("sdf.glsl")
}
