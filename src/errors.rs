// File: src/errors.rs
//
// Error handling and reporting for Mini-PL.
// Parse diagnostics and runtime failures share one structured error type
// carrying a source location, and render as colored, pretty-printed reports.

use crate::lexer::{Token, TokenKind};
use colored::Colorize;
use serde::Serialize;
use std::fmt;

/// Source location information for tracking where code appears in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column, file: None }
    }

    pub fn unknown() -> Self {
        Self { line: 0, column: 0, file: None }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Kinds of errors that can occur while parsing or evaluating Mini-PL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The scanner could not classify a piece of input
    LexicalError,
    /// An expected token or keyword was not found
    SyntaxError,
    /// A statement started with a keyword that cannot begin a statement
    UnrecognizedStatement,
    UndefinedVariable,
    DivisionByZero,
    /// An integer result that does not fit in 32 bits and cannot wrap
    Overflow,
    /// A value could not be converted to the type an operation needs
    TypeError,
    IoError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::LexicalError => write!(f, "Lexical Error"),
            ErrorKind::SyntaxError => write!(f, "Syntax Error"),
            ErrorKind::UnrecognizedStatement => write!(f, "Unrecognized Statement"),
            ErrorKind::UndefinedVariable => write!(f, "Undefined Variable"),
            ErrorKind::DivisionByZero => write!(f, "Division By Zero"),
            ErrorKind::Overflow => write!(f, "Arithmetic Overflow"),
            ErrorKind::TypeError => write!(f, "Type Error"),
            ErrorKind::IoError => write!(f, "I/O Error"),
        }
    }
}

/// A structured error with location information
#[derive(Debug, Clone)]
pub struct MiniPlError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    /// What the parser was looking for, for syntax errors
    pub expected: Option<String>,
    /// The offending token, for parse diagnostics
    pub found: Option<Token>,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
    pub note: Option<String>,
}

impl MiniPlError {
    pub fn new(kind: ErrorKind, message: String, location: SourceLocation) -> Self {
        Self {
            kind,
            message,
            location,
            expected: None,
            found: None,
            source_line: None,
            suggestion: None,
            help: None,
            note: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.note = Some(note);
        self
    }

    /// Attaches the file name and the offending source line, if it exists
    pub fn in_source(mut self, file: Option<&str>, source: &str) -> Self {
        if let Some(file) = file {
            self.location.file = Some(file.to_string());
        }
        if self.location.line > 0 {
            if let Some(line) = source.lines().nth(self.location.line - 1) {
                self.source_line = Some(line.to_string());
            }
        }
        self
    }

    /// Create a syntax error for a token that is not the one the grammar requires
    pub fn unexpected_token(expected: impl fmt::Display, found: &Token) -> Self {
        let expected = expected.to_string();
        let mut error = Self::new(
            ErrorKind::SyntaxError,
            format!("Expected {}, got {}", expected, describe(found)),
            found.location(),
        );
        error.expected = Some(expected);
        error.found = Some(found.clone());
        error
    }

    /// Create a diagnostic for input the scanner could not classify
    pub fn lexical_error(found: &Token) -> Self {
        let mut error = Self::new(
            ErrorKind::LexicalError,
            format!("Unrecognized input '{}'", found.lexeme),
            found.location(),
        );
        error.found = Some(found.clone());
        error
    }

    /// Create a diagnostic for a keyword that cannot begin a statement
    pub fn unrecognized_statement(found: &Token) -> Self {
        let mut error = Self::new(
            ErrorKind::UnrecognizedStatement,
            format!(
                "Expected keyword var, for, read, print or assert, got '{}'",
                found.lexeme
            ),
            found.location(),
        )
        .with_note("parsing of the enclosing block stops here".to_string());
        error.expected = Some("statement".to_string());
        error.found = Some(found.clone());
        error
    }

    /// Create an undefined variable error
    pub fn undefined_variable(name: &str, location: SourceLocation) -> Self {
        Self::new(
            ErrorKind::UndefinedVariable,
            format!("Variable '{}' is not declared", name),
            location,
        )
        .with_help(format!("declare it first with 'var {} : <type>;'", name))
    }

    pub fn division_by_zero(location: SourceLocation) -> Self {
        Self::new(ErrorKind::DivisionByZero, "Attempted to divide by zero".to_string(), location)
    }

    pub fn overflow(expression: String, location: SourceLocation) -> Self {
        Self::new(
            ErrorKind::Overflow,
            format!("Result of {} does not fit in a 32-bit integer", expression),
            location,
        )
    }

    pub fn type_error(message: String) -> Self {
        Self::new(ErrorKind::TypeError, message, SourceLocation::unknown())
    }

    pub fn io_error(message: String, location: SourceLocation) -> Self {
        Self::new(ErrorKind::IoError, message, location)
    }

    /// Fills in a location for errors raised where no position was known
    pub fn or_at(mut self, location: &SourceLocation) -> Self {
        if self.location.line == 0 {
            self.location = location.clone();
        }
        self
    }
}

fn describe(token: &Token) -> String {
    // Only tokens whose kind does not already spell out their text need the lexeme
    match token.kind {
        TokenKind::Identifier
        | TokenKind::IntLiteral
        | TokenKind::StringLiteral
        | TokenKind::BoolLiteral
        | TokenKind::Unknown => format!("{} '{}'", token.kind, token.lexeme),
        _ => token.kind.to_string(),
    }
}

impl fmt::Display for MiniPlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind_str = format!("{}", self.kind);
        writeln!(f, "{}: {}", kind_str.red().bold(), self.message.bold())?;

        let location_str = format!("  --> {}", self.location);
        writeln!(f, "{}", location_str.bright_blue())?;

        if let Some(ref source) = self.source_line {
            let line_num = self.location.line;
            let col_num = self.location.column;

            writeln!(f, "   {}", "|".bright_blue())?;
            writeln!(
                f,
                "{} {} {}",
                format!("{:3}", line_num).bright_blue(),
                "|".bright_blue(),
                source
            )?;
            writeln!(
                f,
                "   {} {}{}",
                "|".bright_blue(),
                " ".repeat(col_num.saturating_sub(1)),
                "^".red().bold()
            )?;
            writeln!(f, "   {}", "|".bright_blue())?;
        }

        if let Some(ref help) = self.help {
            writeln!(
                f,
                "   {} {}",
                "=".bright_yellow(),
                format!("help: {}", help).bright_yellow()
            )?;
        }

        if let Some(ref suggestion) = self.suggestion {
            writeln!(
                f,
                "   {} {}",
                "=".bright_green(),
                format!("Did you mean '{}'?", suggestion).bright_green()
            )?;
        }

        if let Some(ref note) = self.note {
            writeln!(f, "   {} {}", "=".bright_cyan(), format!("note: {}", note).bright_cyan())?;
        }

        Ok(())
    }
}

impl std::error::Error for MiniPlError {}

/// Computes the Levenshtein distance between two strings
/// Used for "Did you mean?" suggestions
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows are enough for the distance itself
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1).min(current[j] + 1).min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Find the closest match from a list of candidates using Levenshtein distance
/// Returns None if no good match is found (distance > 3)
pub fn find_closest_match<'a>(target: &str, candidates: &'a [String]) -> Option<&'a str> {
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(target, candidate);
        if distance <= 3 && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate.as_str());
        }
    }

    best_match
}
