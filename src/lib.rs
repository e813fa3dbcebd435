// File: src/lib.rs
//
// Library interface for the Mini-PL front end.
// Exposes modules for integration testing and external use.

pub mod ast;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
