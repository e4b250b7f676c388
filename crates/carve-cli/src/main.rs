//! Carve CLI - compile, evaluate and inspect SDF programs

mod diagnostic;
mod repl;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use carve_lang::{Backend, Compiled, Compiler, DistanceField, Vec3, builtins};
use clap::{ArgAction, Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::diagnostic::SourceError;

#[derive(Parser)]
#[command(name = "carve")]
#[command(about = "Compile SDF geometry programs to distances and GLSL", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline stages (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// A program given inline or read from a file
#[derive(Args)]
struct Input {
    /// Program source
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    source: Option<String>,

    /// Read the program from a file
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl Input {
    /// Source text and the name diagnostics refer to it by
    fn load(&self) -> Result<(String, String)> {
        match (&self.source, &self.file) {
            (Some(source), _) => Ok((source.clone(), "<input>".to_string())),
            (None, Some(path)) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read program file {}", path.display()))?;
                Ok((source, path.display().to_string()))
            }
            (None, None) => anyhow::bail!("No program given; pass source text or --file"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the distance at a point
    Eval {
        #[command(flatten)]
        input: Input,

        /// Point as x,y,z
        #[arg(
            short,
            long,
            default_value = "0,0,0",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        point: Vec3,

        /// Pipeline to use (ast or ir)
        #[arg(short, long, default_value_t = Backend::Ir)]
        backend: Backend,
    },

    /// Emit a GLSL shader
    Glsl {
        #[command(flatten)]
        input: Input,

        /// Pipeline to use (ast or ir)
        #[arg(short, long, default_value_t = Backend::Ir)]
        backend: Backend,

        /// Write the shader to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the lowered IR
    Ir {
        #[command(flatten)]
        input: Input,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Type check and print the canonical program
    Check {
        #[command(flatten)]
        input: Input,
    },

    /// Evaluate both pipelines on a grid and report the largest deviation
    Compare {
        #[command(flatten)]
        input: Input,

        /// Samples per axis
        #[arg(short, long, default_value = "16")]
        resolution: u32,

        /// Half size of the sampled cube
        #[arg(short, long, default_value = "2.0")]
        extent: f32,

        /// Largest accepted deviation
        #[arg(short, long, default_value = "1e-5")]
        tolerance: f32,
    },

    /// Interactive REPL
    Repl,

    /// List the builtin functions
    Builtins,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<SourceError>() {
                Some(diagnostic) => eprint!("{}", diagnostic.render()),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Eval {
            input,
            point,
            backend,
        } => {
            let compiled = compile(&input, backend)?;
            println!("{}", compiled.distance(point));
        }
        Commands::Glsl {
            input,
            backend,
            output,
        } => {
            let shader = compile(&input, backend)?.shader();
            match output {
                Some(path) => {
                    std::fs::write(&path, shader)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "wrote shader");
                }
                None => print!("{}", shader),
            }
        }
        Commands::Ir { input, json } => {
            let Compiled::Ir(program) = compile(&input, Backend::Ir)? else {
                anyhow::bail!("IR backend did not produce IR");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&program)?);
            } else {
                print!("{}", program);
            }
        }
        Commands::Check { input } => {
            let Compiled::Ast(program) = compile(&input, Backend::Ast)? else {
                anyhow::bail!("AST backend did not produce a checked program");
            };
            let root = program.root();
            println!("{} : {}", root, root.resolved_type());
        }
        Commands::Compare {
            input,
            resolution,
            extent,
            tolerance,
        } => return run_compare(&input, resolution, extent, tolerance),
        Commands::Repl => repl::run_repl()?,
        Commands::Builtins => print_builtins(),
    }
    Ok(ExitCode::SUCCESS)
}

/// Compile an input, attaching the source to any language error
fn compile(input: &Input, backend: Backend) -> Result<Compiled> {
    let (source, name) = input.load()?;
    Compiler::new(backend)
        .compile(&source)
        .map_err(|err| SourceError::new(&err, &name, &source).into())
}

fn run_compare(input: &Input, resolution: u32, extent: f32, tolerance: f32) -> Result<ExitCode> {
    let ast = compile(input, Backend::Ast)?;
    let ir = compile(input, Backend::Ir)?;

    let (n, total) = grid_size(resolution)?;
    let step = 2.0 * extent / (n - 1) as f32;
    let axis = |i: usize| -extent + i as f32 * step;

    let (worst, at) = (0..total)
        .into_par_iter()
        .map(|i| {
            let p = Vec3::new(axis(i % n), axis(i / n % n), axis(i / (n * n)));
            (deviation(ast.distance(p), ir.distance(p)), p)
        })
        .reduce(
            || (0.0, Vec3::ZERO),
            |a, b| if b.0 > a.0 { b } else { a },
        );

    println!(
        "{} points, max deviation {:e} at ({}, {}, {})",
        total, worst, at.x, at.y, at.z
    );
    if worst > tolerance {
        eprintln!("Backends disagree beyond tolerance {:e}", tolerance);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Samples per axis and in total for a `compare` grid
fn grid_size(resolution: u32) -> Result<(usize, usize)> {
    let n = usize::try_from(resolution.max(2)).context("Resolution does not fit in memory")?;
    let total = n
        .checked_mul(n)
        .and_then(|square| square.checked_mul(n))
        .with_context(|| format!("A grid of {} samples per axis is too large", resolution))?;
    Ok((n, total))
}

/// Absolute difference, treating matching non-finite values as equal
fn deviation(a: f32, b: f32) -> f32 {
    if a.is_nan() && b.is_nan() {
        0.0
    } else if a.is_nan() || b.is_nan() {
        f32::INFINITY
    } else if a.is_infinite() || b.is_infinite() {
        if a.to_bits() == b.to_bits() { 0.0 } else { f32::INFINITY }
    } else {
        (a - b).abs()
    }
}

fn print_builtins() {
    for builtin in builtins::all() {
        println!(
            "  {:<10} {:<40} {}",
            builtin.name,
            builtin.signature.to_string(),
            builtin.summary
        );
    }
}

/// Parse `x,y,z` into a point
pub(crate) fn parse_point(s: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{}'", s));
    };
    let coord = |c: &str| {
        c.parse::<f32>()
            .map_err(|e| format!("invalid coordinate '{}': {}", c, e))
    };
    Ok(Vec3::new(coord(x)?, coord(y)?, coord(z)?))
}
