//! REPL (Read-Eval-Print Loop) for Kestrel
//!
//! The same loop also drives the token and parse debug modes.

use crate::config::RunConfig;
use crate::interp::{Interpreter, Object};
use crate::lexer::Lexer;
use crate::parser::Parser;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = ">> ";
const HISTORY_FILE: &str = ".kestrel_history";

/// What the loop does with each line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Evaluate in a persistent global environment
    Eval,
    /// Print each token
    Tokens,
    /// Print the canonical form of the parsed program
    Parse,
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    interpreter: Interpreter,
    mode: Mode,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new(mode: Mode, config: &RunConfig) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let interpreter = Interpreter::with_config(config);

        // Try to find history file in home directory
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            interpreter,
            mode,
            history_path,
        };

        // A missing history file is normal on first start
        if let Some(ref path) = repl.history_path
            && repl.editor.load_history(path).is_err()
        {
            tracing::debug!(path = %path.display(), "no REPL history loaded");
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Kestrel REPL ({} mode)", self.mode_name());
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    // Add to history
                    self.editor.add_history_entry(line)?;

                    // Handle commands
                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    for output in self.respond(line) {
                        println!("{output}");
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = self.history_path
            && let Err(err) = self.editor.save_history(path)
        {
            tracing::warn!(path = %path.display(), %err, "could not save REPL history");
        }

        Ok(())
    }

    fn mode_name(&self) -> &'static str {
        match self.mode {
            Mode::Eval => "eval",
            Mode::Tokens => "tokens",
            Mode::Parse => "parse",
        }
    }

    /// Handle REPL commands (starting with :). Returns true to quit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                self.print_help();
                false
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                false
            }
            ":env" => {
                for line in self.env_listing() {
                    println!("{line}");
                }
                false
            }
            ":reset" => {
                self.interpreter.reset();
                println!("Global bindings cleared.");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    /// Print help message
    fn print_help(&self) {
        println!("Kestrel REPL Commands:");
        println!("  :help, :h, :?   Show this help");
        println!("  :quit, :q       Exit the REPL");
        println!("  :clear          Clear the screen");
        println!("  :env            List global bindings");
        println!("  :reset          Drop all global bindings");
        println!();
        println!("You can enter:");
        println!("  - Bindings: let x = 5; x = x + 1");
        println!("  - Functions: let add = def(a, b) {{ a + b }}; add(1, 2)");
        println!("  - Containers: [1, 2], {{\"k\": 1}}, stack<>{{}}, maxheap<int>{{3, 1}}");
        println!();
        println!("Built-in functions:");
        println!("  print len size type find");
        println!("  push push_front push_back pop pop_front pop_back insert remove");
    }

    /// Global bindings as `name = value`, sorted by name
    fn env_listing(&self) -> Vec<String> {
        let env = self.interpreter.global_env().borrow();
        let mut names: Vec<_> = env.bindings().iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        names
            .into_iter()
            .map(|(name, value)| format!("{name} = {}", value.inspect()))
            .collect()
    }

    /// Lines to print in response to one input line
    fn respond(&mut self, line: &str) -> Vec<String> {
        match self.mode {
            Mode::Tokens => Lexer::new(line).map(|tok| tok.to_string()).collect(),
            Mode::Parse => {
                let mut parser = Parser::new(line);
                let program = parser.parse_program();
                if parser.has_errors() {
                    return parse_error_lines(&parser);
                }
                program.to_string().lines().map(str::to_string).collect()
            }
            Mode::Eval => self.eval_line(line),
        }
    }

    /// Parse errors abandon the line; the session and its bindings survive
    fn eval_line(&mut self, line: &str) -> Vec<String> {
        let mut parser = Parser::new(line);
        let program = parser.parse_program();
        if parser.has_errors() {
            return parse_error_lines(&parser);
        }

        match self.interpreter.run(&program) {
            Ok(Object::Null) => Vec::new(),
            Ok(value) => vec![value.inspect()],
            Err(err) => vec![Object::Error(err.message).inspect()],
        }
    }
}

fn parse_error_lines(parser: &Parser<'_>) -> Vec<String> {
    parser
        .errors()
        .iter()
        .map(|err| format!("parse error: {err}"))
        .collect()
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
