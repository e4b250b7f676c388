//! Backend selection and the compile entry points

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::Program;
use crate::error::Result;
use crate::eval::{self, DistanceField};
use crate::glsl;
use crate::ir::{self, IrProgram};

/// Which pipeline half evaluates and emits a checked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Walk the checked tree directly
    Ast,
    /// Lower to the flat IR first
    #[default]
    Ir,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Ast => "ast",
            Backend::Ir => "ir",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown backend '{0}', expected 'ast' or 'ir'")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ast" => Ok(Backend::Ast),
            "ir" => Ok(Backend::Ir),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

/// A program compiled for one backend
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    Ast(Program),
    Ir(IrProgram),
}

impl Compiled {
    pub fn backend(&self) -> Backend {
        match self {
            Compiled::Ast(_) => Backend::Ast,
            Compiled::Ir(_) => Backend::Ir,
        }
    }

    /// GLSL source computing the same field
    pub fn shader(&self) -> String {
        let source = match self {
            Compiled::Ast(program) => glsl::ast::emit(program),
            Compiled::Ir(program) => glsl::ir::emit(program),
        };
        debug!(backend = %self.backend(), bytes = source.len(), "emitted glsl");
        source
    }
}

impl DistanceField for Compiled {
    fn distance(&self, p: Vec3) -> f32 {
        match self {
            Compiled::Ast(program) => eval::ast::evaluate(program, p).scalar(),
            Compiled::Ir(program) => eval::ir::execute(program, p).scalar(),
        }
    }
}

/// Runs the shared front end, then the chosen backend
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    backend: Backend,
}

impl Compiler {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Lex, parse, check and (for the IR backend) lower
    pub fn compile(&self, source: &str) -> Result<Compiled> {
        let program = crate::check_source(source)?;
        Ok(match self.backend {
            Backend::Ast => Compiled::Ast(program),
            Backend::Ir => {
                let lowered = ir::lower(&program);
                debug!(insts = lowered.len(), "lowered");
                Compiled::Ir(lowered)
            }
        })
    }

    /// Compile and evaluate the distance at one point
    pub fn evaluate(&self, source: &str, point: [f32; 3]) -> Result<f32> {
        Ok(self.compile(source)?.distance(Vec3::from_array(point)))
    }

    /// Compile to GLSL source
    pub fn shader(&self, source: &str) -> Result<String> {
        Ok(self.compile(source)?.shader())
    }
}
