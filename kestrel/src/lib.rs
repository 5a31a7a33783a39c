//! Kestrel Interpreter Library
//!
//! A small dynamically typed scripting language: logos lexer, Pratt parser
//! and tree-walking evaluator with closures and built-in containers.

pub mod ast;
pub mod config;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;

pub use ast::Span;
pub use config::RunConfig;
pub use error::{KestrelError, ParseError, Result};
pub use interp::{Interpreter, Object};

/// Parse and evaluate `source` with an existing interpreter.
///
/// Nothing is evaluated when the source has parse errors.
pub fn eval_source(interp: &mut Interpreter, source: &str) -> Result<Object> {
    let program = parser::parse(source).map_err(KestrelError::Parse)?;
    Ok(interp.run(&program)?)
}

/// Lex, parse and evaluate `source` in a fresh interpreter
pub fn run_source(source: &str, config: &RunConfig) -> Result<Object> {
    let mut interp = Interpreter::with_config(config);
    eval_source(&mut interp, source)
}
