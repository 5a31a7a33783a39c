//! Kestrel CLI

use clap::{Parser, Subcommand};
use kestrel::error::report_parse_errors;
use kestrel::repl::{Mode, Repl};
use kestrel::{Interpreter, KestrelError, Object, RunConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kestrel", version, about = "Kestrel - a small scripting language")]
struct Cli {
    /// Log pipeline stages to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// Nested call depth that fails with a stack overflow error
    #[arg(long, global = true, default_value_t = kestrel::config::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Kestrel source file
    Run {
        /// Source file to run
        file: PathBuf,
    },
    /// Start an interactive session (the default)
    Repl,
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize; interactive when omitted
        file: Option<PathBuf>,
    },
    /// Parse and dump the program (debug)
    Parse {
        /// Source file to parse; interactive when omitted
        file: Option<PathBuf>,

        /// Dump the AST as JSON instead of canonical source
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = RunConfig::new().verbose(cli.verbose).max_depth(cli.max_depth);

    let result = match cli.command.unwrap_or(Command::Repl) {
        Command::Run { file } => run_file(&file, &config),
        Command::Repl => start_repl(Mode::Eval, &config),
        Command::Tokens { file: Some(file) } => tokenize_file(&file),
        Command::Tokens { file: None } => start_repl(Mode::Tokens, &config),
        Command::Parse {
            file: Some(file),
            json,
        } => parse_file(&file, json),
        Command::Parse { file: None, .. } => start_repl(Mode::Parse, &config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins unless `--verbose` is given; logs always go to stderr
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::default().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::WARN.into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

fn run_file(path: &Path, config: &RunConfig) -> CliResult {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let mut interp = Interpreter::with_config(config);
    match kestrel::eval_source(&mut interp, &source) {
        Ok(value) => {
            if config.print_result && !matches!(value, Object::Null) {
                println!("{}", value.inspect());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(KestrelError::Parse(errors)) => {
            report_parse_errors(&filename, &source, &errors)?;
            Ok(ExitCode::FAILURE)
        }
        Err(KestrelError::Runtime(err)) => {
            println!("{}", Object::Error(err.message).inspect());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_file(path: &Path, json: bool) -> CliResult {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    match kestrel::parser::parse(&source) {
        Ok(program) if json => println!("{}", serde_json::to_string_pretty(&program)?),
        Ok(program) => print!("{program}"),
        Err(errors) => {
            report_parse_errors(&filename, &source, &errors)?;
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn tokenize_file(path: &Path) -> CliResult {
    let source = std::fs::read_to_string(path)?;

    for tok in kestrel::lexer::tokenize(&source) {
        println!("{tok}");
    }

    Ok(ExitCode::SUCCESS)
}

fn start_repl(mode: Mode, config: &RunConfig) -> CliResult {
    let mut repl = Repl::new(mode, config)?;
    repl.run()?;
    Ok(ExitCode::SUCCESS)
}
