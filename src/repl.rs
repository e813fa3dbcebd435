// File: src/repl.rs
//
// Interactive REPL (Read-Eval-Print Loop) for Mini-PL.
// Provides an interactive shell for executing Mini-PL statements with:
// - Multi-line input: statements run once they end with `;` and every
//   `do` has its `end`
// - Command history with up/down arrow navigation
// - Special commands (:help, :quit, :vars, :reset, :ast)
// - One binding store that persists across inputs for the whole session

use crate::ast::{Block, Statement};
use crate::interpreter::{Interpreter, Value};
use crate::lexer::{self, Keyword, TokenKind};
use crate::parser::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// REPL session that maintains interpreter state and handles user interaction
pub struct Repl {
    interpreter: Interpreter,
    editor: DefaultEditor,
    show_ast: bool,
}

impl Repl {
    /// Creates a new REPL session with a fresh interpreter
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Repl { interpreter: Interpreter::new(), editor, show_ast: false })
    }

    fn show_banner(&self) {
        println!(
            "{} {}",
            "Mini-PL".bright_cyan().bold(),
            format!("v{} - interactive shell", env!("CARGO_PKG_VERSION")).bright_cyan()
        );
        println!(
            "  Type {} for commands or {} to exit",
            ":help".bright_yellow(),
            ":quit".bright_yellow()
        );
        println!();
    }

    /// Starts the REPL loop
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.show_banner();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                "minipl> ".bright_green().to_string()
            } else {
                "   ...> ".bright_blue().to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    if buffer.is_empty() && line.trim().starts_with(':') {
                        if self.handle_command(line.trim()) {
                            continue;
                        } else {
                            break;
                        }
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if is_input_complete(&buffer) {
                        self.eval_input(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C (input discarded, :quit to exit)".bright_yellow());
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => {
                    eprintln!("{} {}", "Error:".bright_red(), err);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handles special REPL commands starting with ':'
    /// Returns true to continue REPL, false to quit
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":help" | ":h" => {
                self.show_help();
                true
            }
            ":quit" | ":q" | ":exit" => {
                println!("{}", "Goodbye!".bright_cyan());
                false
            }
            ":vars" | ":v" => {
                self.show_variables();
                true
            }
            ":reset" | ":r" => {
                self.interpreter.env.clear();
                println!("{}", "Environment reset".bright_green());
                true
            }
            ":ast" | ":a" => {
                self.show_ast = !self.show_ast;
                let state = if self.show_ast { "on" } else { "off" };
                println!("{} {}", "Syntax tree echo".bright_green(), state.bright_yellow());
                true
            }
            _ => {
                println!(
                    "{} Unknown command: {}. Type {} for available commands.",
                    "Error:".bright_red(),
                    cmd.bright_yellow(),
                    ":help".bright_yellow()
                );
                true
            }
        }
    }

    fn show_help(&self) {
        println!();
        println!("{}", "REPL Commands:".bright_cyan().bold());
        println!("  {}  Display this help message", ":help  :h".bright_yellow());
        println!("  {}  Exit the REPL", ":quit  :q".bright_yellow());
        println!("  {}  Show declared variables", ":vars  :v".bright_yellow());
        println!("  {}  Forget all variables", ":reset :r".bright_yellow());
        println!("  {}  Toggle printing the syntax tree", ":ast   :a".bright_yellow());
        println!();
        println!("{}", "Examples:".bright_cyan().bold());
        println!("  {}", "minipl> var x : int := 6 * 7;".dimmed());
        println!("  {}", "minipl> for i in 1..3 do".dimmed());
        println!("  {}", "   ...>     print i;".dimmed());
        println!("  {}", "   ...> end for;".dimmed());
        println!("  {}", "minipl> assert(x = 42);".dimmed());
        println!();
    }

    fn show_variables(&self) {
        let env = &self.interpreter.env;
        if env.is_empty() {
            println!("  {}", "(no variables declared)".dimmed());
            return;
        }
        for name in env.names() {
            if let Some(value) = env.get(&name) {
                println!(
                    "  {} : {} = {}",
                    name.bright_yellow(),
                    value.value_type().to_string().bright_blue(),
                    format_value(&value)
                );
            }
        }
    }

    /// Parses and executes one complete input against the session's store
    fn eval_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }

        let known = self.interpreter.env.declared_types();
        let output = Parser::with_known_types(lexer::Lexer::new(input), known).parse();

        for diagnostic in &output.diagnostics {
            eprint!("{}", diagnostic.clone().in_source(None, input));
        }
        if self.show_ast {
            print!("{}", output.program.display_tree().dimmed());
        }

        if let Err(err) = self.interpreter.run(&output.program) {
            eprint!("{}", err.in_source(None, input));
        }
        if prints(&output.program.block) {
            println!();
        }
    }
}

/// An input is complete when it ends a statement outside any open `for` body
fn is_input_complete(input: &str) -> bool {
    let tokens = lexer::tokenize(input);
    let Some(last) = tokens.last() else {
        return true;
    };
    let opened = tokens.iter().filter(|t| t.is_keyword(Keyword::Do)).count();
    let closed = tokens.iter().filter(|t| t.is_keyword(Keyword::End)).count();
    last.kind == TokenKind::Semicolon && opened <= closed
}

/// True if running the block may print, so the prompt needs a fresh line
fn prints(block: &Block) -> bool {
    block.statements.iter().any(|stmt| match stmt {
        Statement::Print(_) => true,
        Statement::ForLoop(for_loop) => prints(&for_loop.body),
        _ => false,
    })
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string().bright_white().to_string(),
        Value::Str(s) => format!("\"{}\"", s).bright_green().to_string(),
        Value::Bool(b) => b.to_string().bright_magenta().to_string(),
    }
}
