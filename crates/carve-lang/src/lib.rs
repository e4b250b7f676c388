//! Carve - a compiler for a small signed-distance-field geometry language
//!
//! Source text describes primitive solids combined by boolean and spatial
//! operators. It compiles to a distance evaluator and to GLSL computing the
//! same field:
//!
//! ```text
//! source ─ lexer ─ parser ─ checker ─┬─ AST interpreter / AST emitter
//!                                    └─ lower ─ IR interpreter / IR emitter
//! ```
//!
//! All four backends agree within floating-point tolerance. The builtin table
//! in [`builtins`] is the only place a primitive is defined.
//!
//! ## Example
//!
//! ```rust
//! let d = carve_lang::compile_and_evaluate(
//!     "union(sphere(1), translate(sphere(1), vec3(3, 0, 0)))",
//!     [1.5, 0.0, 0.0],
//! )?;
//! assert!((d - 0.5).abs() < 1e-5);
//!
//! let shader = carve_lang::compile_to_shader("scale(box(vec3(1, 2, 1)), 0.5)")?;
//! assert!(shader.contains("float sdf(vec3 p)"));
//! # Ok::<(), carve_lang::Error>(())
//! ```
//!
//! ## Language
//!
//! - Literals: numbers (`1`, `0.5`, `.5`, `2.`) and `vec3(x, y, z)`
//! - Arithmetic: `+ - * /` and unary `-` on scalars and vectors
//! - Calls: `sphere(r)`, `union(a, b, ...)`, `translate(g, v)`, ...
//! - Bare names (`pi`, `x_axis`) are zero-argument calls
//! - `#` starts a comment running to the end of the line

pub mod ast;
pub mod builtins;
pub mod checker;
pub mod compiler;
pub mod error;
pub mod eval;
pub mod glsl;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod types;
pub mod value;

use tracing::debug;

pub use checker::{Program, check};
pub use compiler::{Backend, Compiled, Compiler, UnknownBackend};
pub use error::{DiagnosticKind, Error, Result};
pub use eval::DistanceField;
pub use ir::{IrProgram, lower};
pub use types::Type;
pub use value::Value;

// Re-export for callers that build points
pub use glam::Vec3;

/// Run the front end: lex, parse and type check
pub fn check_source(source: &str) -> Result<Program> {
    let tokens = lexer::tokenize(source)?;
    debug!(tokens = tokens.len(), "lexed");
    let expr = parser::parse(tokens)?;
    debug!(nodes = expr.node_count(), "parsed");
    let program = check(expr)?;
    debug!("type checked");
    Ok(program)
}

/// Compile with the IR backend and evaluate the distance at `point`
pub fn compile_and_evaluate(source: &str, point: [f32; 3]) -> Result<f32> {
    Compiler::new(Backend::Ir).evaluate(source, point)
}

/// Compile with the IR backend to GLSL source
pub fn compile_to_shader(source: &str) -> Result<String> {
    Compiler::new(Backend::Ir).shader(source)
}
