use std::{
    io::{stdin, stdout, Stdout, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;

use interpreter::{InterpretError, Interpreter};
use scanner::{ScanErrors, Token};

/// Runs Holo scripts, or starts a prompt when no script is given.
#[derive(clap::Parser)]
#[command(version, about)]
struct Args {
    file: Option<PathBuf>,
    /// Print every scanned token before parsing
    #[arg(long)]
    tokens: bool,
    /// Print the syntax tree of every statement before running it
    #[arg(long)]
    ast: bool,
}

fn run_file(path: &Path, args: &Args) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    log::debug!("Running {} ({} bytes)", path.display(), source.len());

    let mut interpreter = Interpreter::default();
    match run(&source, args, &mut interpreter) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{}", e);
            Ok(exit_code(&e))
        }
    }
}

fn run_prompt(args: &Args) -> anyhow::Result<ExitCode> {
    let mut interpreter = Interpreter::default();
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            println!();
            return Ok(ExitCode::SUCCESS);
        }
        if let Err(e) = run(&line, args, &mut interpreter) {
            eprintln!("{}", e);
        }
    }
}

fn run(source: &str, args: &Args, interpreter: &mut Interpreter<Stdout>) -> Result<(), InterpretError> {
    let (tokens, errors) = scanner::scan(source);
    if args.tokens {
        println!("{}", tokens.iter().map(describe).join("\n"));
    }
    if !errors.is_empty() {
        return Err(ScanErrors(errors).into());
    }

    let stmts = parser::Parser::new(&tokens).parse_all()?;
    if args.ast {
        for stmt in &stmts {
            println!("{}", stmt);
        }
    }

    interpreter.interpret(&stmts)?;
    Ok(())
}

fn describe(token: &Token) -> String {
    match token.literal() {
        Some(literal) => format!("{:?} {} {}", token.kind(), token.lexeme(), literal),
        None => format!("{:?} {}", token.kind(), token.lexeme()),
    }
}

// sysexits.h: EX_DATAERR for bad input, EX_SOFTWARE for failures while running
fn exit_code(error: &InterpretError) -> ExitCode {
    match error {
        InterpretError::Scan(_) | InterpretError::Parse(_) => ExitCode::from(65),
        InterpretError::Runtime(_) => ExitCode::from(70),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    match &args.file {
        Some(file) => run_file(file, &args),
        None => run_prompt(&args),
    }
}
