//! Interactive REPL for Carve programs
//!
//! Each line is compiled and evaluated at the current point. Commands start
//! with `:` and inspect the last program that compiled.

use std::path::PathBuf;

use anyhow::Result;
use carve_lang::{Backend, Compiled, Compiler, DistanceField, Vec3, builtins};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, EditMode, Editor};

use crate::diagnostic;

/// REPL state
pub struct Repl {
    backend: Backend,
    point: Vec3,
    editor: Editor<(), DefaultHistory>,
    history_path: Option<PathBuf>,
    last_source: Option<String>,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let mut editor = Editor::with_config(config)?;

        // Try to load history from home directory
        let history_path = dirs_path();
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }

        Ok(Self {
            backend: Backend::default(),
            point: Vec3::ZERO,
            editor,
            history_path,
            last_source: None,
        })
    }

    /// Run the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("{}", WELCOME_MESSAGE);

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() { "carve> " } else { "  ...> " };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed.starts_with(':') && buffer.is_empty() {
                        match self.handle_command(trimmed) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                            CommandResult::Error(e) => {
                                eprintln!("Error: {}", e);
                                continue;
                            }
                        }
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    // Unclosed parentheses continue on the next line
                    if open_parens(&buffer) > 0 {
                        continue;
                    }

                    let input = std::mem::take(&mut buffer);
                    let input = input.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(input);
                    self.eval_and_print(input);
                }
                Err(ReadlineError::Interrupted) => {
                    if buffer.is_empty() {
                        println!("Use :quit or Ctrl+D to exit");
                    } else {
                        println!("^C - input cancelled");
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Eof) => {
                    println!("\nGoodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    fn compile(&self, source: &str, backend: Backend) -> Option<Compiled> {
        match Compiler::new(backend).compile(source) {
            Ok(compiled) => Some(compiled),
            Err(err) => {
                eprint!("{}", diagnostic::render(&err, "<repl>", source));
                None
            }
        }
    }

    /// Compile input and print its distance at the current point
    fn eval_and_print(&mut self, input: &str) {
        if let Some(compiled) = self.compile(input, self.backend) {
            println!("=> {}", compiled.distance(self.point));
            self.last_source = Some(input.to_string());
        }
    }

    /// Handle REPL commands
    fn handle_command(&mut self, cmd: &str) -> CommandResult {
        let (command, args) = match cmd.split_once(' ') {
            Some((command, args)) => (command, Some(args.trim())),
            None => (cmd, None),
        };

        match command {
            ":help" | ":h" | ":?" => {
                println!("{}", HELP_MESSAGE);
                CommandResult::Continue
            }
            ":quit" | ":q" | ":exit" => CommandResult::Exit,
            ":backend" | ":b" => match args {
                Some(name) => match name.parse::<Backend>() {
                    Ok(backend) => {
                        self.backend = backend;
                        println!("Backend: {}", backend);
                        self.reevaluate();
                        CommandResult::Continue
                    }
                    Err(e) => CommandResult::Error(e.to_string()),
                },
                None => {
                    println!("Backend: {}", self.backend);
                    CommandResult::Continue
                }
            },
            ":point" | ":p" => match args {
                Some(point) => match crate::parse_point(point) {
                    Ok(point) => {
                        self.point = point;
                        println!("Point: ({}, {}, {})", point.x, point.y, point.z);
                        self.reevaluate();
                        CommandResult::Continue
                    }
                    Err(e) => CommandResult::Error(e),
                },
                None => {
                    let p = self.point;
                    println!("Point: ({}, {}, {})", p.x, p.y, p.z);
                    CommandResult::Continue
                }
            },
            ":glsl" | ":g" => self.with_program(args, self.backend, |compiled| {
                print!("{}", compiled.shader());
            }),
            ":ir" => self.with_program(args, Backend::Ir, |compiled| {
                if let Compiled::Ir(program) = compiled {
                    print!("{}", program);
                }
            }),
            ":check" | ":c" => self.with_program(args, Backend::Ast, |compiled| {
                if let Compiled::Ast(program) = compiled {
                    println!("{} : {}", program.root(), program.root().resolved_type());
                }
            }),
            ":builtins" => {
                for builtin in builtins::all() {
                    println!("  {:<10} {}", builtin.name, builtin.signature);
                }
                CommandResult::Continue
            }
            ":examples" => {
                println!("{}", EXAMPLES);
                CommandResult::Continue
            }
            _ => CommandResult::Error(format!(
                "Unknown command: {}. Type :help for available commands.",
                command
            )),
        }
    }

    /// Run `f` on the program given as argument, or on the last one evaluated
    fn with_program(
        &self,
        args: Option<&str>,
        backend: Backend,
        f: impl FnOnce(&Compiled),
    ) -> CommandResult {
        let Some(source) = args.or(self.last_source.as_deref()) else {
            println!("No program yet. Enter one first, e.g. sphere(1)");
            return CommandResult::Continue;
        };
        if let Some(compiled) = self.compile(source, backend) {
            f(&compiled);
        }
        CommandResult::Continue
    }

    /// Show the last program's distance after the point or backend changed
    fn reevaluate(&self) {
        if let Some(source) = &self.last_source {
            if let Some(compiled) = self.compile(source, self.backend) {
                println!("=> {}", compiled.distance(self.point));
            }
        }
    }
}

/// Result of handling a command
enum CommandResult {
    Continue,
    Exit,
    Error(String),
}

/// Parentheses still open at the end of the input, ignoring comments
fn open_parens(input: &str) -> i32 {
    let mut depth = 0;
    for line in input.lines() {
        let code = line.split('#').next().unwrap_or_default();
        for c in code.chars() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }
    }
    depth
}

/// Get the history file path
fn dirs_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("carve").join("repl_history"))
}

const WELCOME_MESSAGE: &str = r#"
Carve interactive SDF REPL
Enter a program to evaluate it at the current point.
Type :help for commands, :examples for usage examples.
"#;

const HELP_MESSAGE: &str = r#"
Commands:
  :help, :h, :?        - Show this help message
  :quit, :q, :exit     - Exit the REPL
  :backend [ast|ir]    - Show or set the backend
  :point [x,y,z]       - Show or set the evaluation point
  :glsl [program]      - Print the shader for a program (default: last)
  :ir [program]        - Print the lowered IR
  :check [program]     - Print the canonical program and its type
  :builtins            - List builtin functions
  :examples            - Show usage examples

Tips:
  - Unclosed parentheses continue on the next line
  - # starts a comment
  - Use Ctrl+C to cancel current input, Ctrl+D to exit
"#;

const EXAMPLES: &str = r#"
Examples:

  sphere(1)
  box(vec3(1, 0.5, 0.25))
  cylinder(0.5, 2)

  union(sphere(1), translate(sphere(1), vec3(3, 0, 0)))
  subtract(box(vec3(1, 1, 1)), sphere(1.2))
  intersect(sphere(1), translate(sphere(1), x_axis))

  rotate(box(vec3(2, 0.5, 0.5)), vec3(0, 0, 45))
  scale(sphere(1), 2)
  offset(box(vec3(1, 1, 1)), 0.1)

  :point 1.5,0,0
  :glsl
"#;

/// Entry point for the REPL command
pub fn run_repl() -> Result<()> {
    let mut repl = Repl::new()?;
    repl.run()
}
