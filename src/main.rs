use std::fs;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lang::environment::Environment;
use lang::eval_source;
use lang::error::InterpreterError;

/// A tree-walking interpreter for a small, dynamically-typed scripting
/// language. Run with no arguments for an interactive prompt, or pass a
/// source file to run it once.
#[derive(ClapParser, Debug)]
#[command(version, about)]
struct Cli {
    /// Source file to run. Omit to start the interactive prompt instead.
    script: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.script {
        Some(path) => run_file(&path),
        None => {
            run_repl();
            ExitCode::SUCCESS
        }
    }
}

/// Reads, parses, and evaluates `path` once, printing the final value's
/// `Inspect` form. Exit code 2 if the file cannot be read, 1 if evaluation
/// fails, 0 on success (§6.2).
fn run_file(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("could not read {path}: {err}");
            return ExitCode::from(2);
        }
    };

    let env = Environment::new();
    match eval_source(&source, &env) {
        Ok(value) => {
            println!("{}", value.inspect());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

/// The interactive prompt: one shared environment across the whole session,
/// so a binding made on one line is visible on the next. A bad line prints
/// a diagnostic and the prompt simply continues (§6.2) — the REPL itself
/// never exits non-zero because of an evaluation error.
fn run_repl() {
    println!("lang interpreter — press Ctrl-D to exit");
    let env = Environment::new();
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("could not start line editor: {err}");
            return;
        }
    };

    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                match eval_source(&line, &env) {
                    Ok(value) => println!("{}", value.inspect()),
                    Err(InterpreterError::Parse(err)) => eprintln!("{err}"),
                    Err(InterpreterError::Eval(err)) => eprintln!("{err}"),
                    Err(InterpreterError::Io(err)) => eprintln!("{err}"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {err}");
                break;
            }
        }
    }
}
