// File: src/main.rs
//
// Main entry point for the Mini-PL toolchain.
// Parses a source file and reports its diagnostics, optionally printing the
// syntax tree or running the program. Without a file the REPL starts.

use clap::{Parser as ClapParser, ValueEnum};
use colored::Colorize;
use minipl::interpreter::Interpreter;
use minipl::parser::parse_source;
use minipl::repl::Repl;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(
    name = "minipl",
    about = "Mini-PL: parser and interpreter for a small teaching language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Path to the Mini-PL source file; starts the REPL when omitted
    file: Option<PathBuf>,

    /// Execute the program after parsing it
    #[arg(long)]
    run: bool,

    /// Print the syntax tree in the given format
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Do not print parse diagnostics
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Emit {
    /// Indented, one node per line
    Tree,
    /// Pretty-printed JSON
    Json,
}

fn main() {
    let cli = Cli::parse();

    let Some(file) = cli.file else {
        let result = Repl::new().and_then(|mut repl| repl.run());
        if let Err(err) = result {
            eprintln!("{} {}", "Error:".bright_red(), err);
            process::exit(1);
        }
        return;
    };

    let source = match fs::read_to_string(&file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{} Cannot read {}: {}", "Error:".bright_red(), file.display(), err);
            process::exit(1);
        }
    };
    let name = file.display().to_string();

    let output = parse_source(&source);

    if !cli.quiet {
        for diagnostic in &output.diagnostics {
            eprint!("{}", diagnostic.clone().in_source(Some(&name), &source));
        }
    }

    match cli.emit {
        Some(Emit::Tree) => print!("{}", output.program.display_tree()),
        Some(Emit::Json) => match serde_json::to_string_pretty(&output.program) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("{} Cannot serialize syntax tree: {}", "Error:".bright_red(), err);
                process::exit(1);
            }
        },
        None => {}
    }

    if cli.run {
        let mut interpreter = Interpreter::new();
        if let Err(err) = interpreter.run(&output.program) {
            eprint!("{}", err.in_source(Some(&name), &source));
            process::exit(1);
        }
    }
}
