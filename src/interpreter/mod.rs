// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for Mini-PL.
//
// Two layers live here:
// - `Evaluator` visits single nodes. It gives expressions and `assert` their
//   meaning and treats every other statement-level node as an inert
//   placeholder.
// - `Interpreter` executes whole programs on top of the evaluator:
//   declarations create bindings, assignments update them, `for` iterates
//   an inclusive integer range, `print` writes values and `read` parses
//   words from the input into the target's declared type.
//
// Both report failures as `MiniPlError`s that stop the current run.

mod environment;
mod evaluator;
mod value;

pub use environment::Environment;
pub use evaluator::{Evaluator, ASSERTION_FAILED, ASSERTION_SUCCEEDED, PLACEHOLDER};
pub use value::Value;

use crate::ast::{Block, ForLoop, Identifier, Program, Read, Statement};
use crate::errors::MiniPlError;
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::{Arc, Mutex, PoisonError};

pub type EvalResult<T> = Result<T, Box<MiniPlError>>;

/// Destination for program output: stdout, or a shared buffer in tests
#[derive(Clone, Default)]
pub(crate) struct Output(Option<Arc<Mutex<Vec<u8>>>>);

impl Output {
    pub(crate) fn buffer(buffer: Arc<Mutex<Vec<u8>>>) -> Self {
        Output(Some(buffer))
    }

    pub(crate) fn write(&self, text: &str) -> io::Result<()> {
        match &self.0 {
            Some(buffer) => {
                // A writer that panicked mid-append still leaves valid bytes behind
                let mut buffer = buffer.lock().unwrap_or_else(PoisonError::into_inner);
                buffer.write_all(text.as_bytes())
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()
            }
        }
    }

    pub(crate) fn write_line(&self, text: &str) -> io::Result<()> {
        self.write(&format!("{}\n", text))
    }
}

pub struct Interpreter {
    pub env: Environment,
    evaluator: Evaluator,
    output: Output,
    input: Box<dyn BufRead>,
    /// Words read from the input but not consumed by a `read` yet
    pending: VecDeque<String>,
}

impl Interpreter {
    /// Creates an interpreter with an empty binding store, reading stdin
    pub fn new() -> Self {
        Interpreter {
            env: Environment::new(),
            evaluator: Evaluator::new(),
            output: Output::default(),
            input: Box::new(BufReader::new(io::stdin())),
            pending: VecDeque::new(),
        }
    }

    /// Sets the output sink for print and assert (used for testing)
    pub fn set_output(&mut self, output: Arc<Mutex<Vec<u8>>>) {
        self.output = Output::buffer(output.clone());
        self.evaluator.set_output(output);
    }

    /// Sets the source that `read` statements consume
    pub fn set_input(&mut self, input: impl BufRead + 'static) {
        self.input = Box::new(input);
        self.pending.clear();
    }

    pub fn run(&mut self, program: &Program) -> EvalResult<()> {
        self.exec_block(&program.block)
    }

    pub fn exec_block(&mut self, block: &Block) -> EvalResult<()> {
        for stmt in &block.statements {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    pub fn exec_stmt(&mut self, stmt: &Statement) -> EvalResult<()> {
        match stmt {
            Statement::Declaration(decl) => {
                let value = match &decl.initializer {
                    Some(init) => self
                        .evaluator
                        .eval_expr(&init.value, &self.env)?
                        .coerce(decl.ty)
                        .map_err(|err| Box::new((*err).or_at(&decl.target.location)))?,
                    None => Value::default_for(decl.ty),
                };
                self.env.declare(decl.target.name.clone(), value);
            }
            Statement::Assignment(assign) => {
                let value = self.evaluator.eval_expr(&assign.value, &self.env)?;
                self.store(&assign.target, value)?;
            }
            Statement::ForLoop(for_loop) => self.exec_for(for_loop)?,
            Statement::Print(print) => {
                let value = self.evaluator.eval_expr(&print.value, &self.env)?;
                self.output.write(&value.to_string()).map_err(|err| {
                    Box::new(MiniPlError::io_error(err.to_string(), print.location.clone()))
                })?;
            }
            Statement::Read(read) => self.exec_read(read)?,
            Statement::Assert(assert) => {
                self.evaluator.eval_assert(assert, &self.env)?;
            }
        }
        Ok(())
    }

    /// Runs the body once per value of the inclusive range; bounds are evaluated once
    fn exec_for(&mut self, for_loop: &ForLoop) -> EvalResult<()> {
        let control = &for_loop.control;
        let location = &control.init.target.location;
        let bound = |value: Value| value.to_int().map_err(|err| Box::new((*err).or_at(location)));
        let start = bound(self.evaluator.eval_expr(&control.init.value, &self.env)?)?;
        let end = bound(self.evaluator.eval_expr(&control.condition.end, &self.env)?)?;

        self.store(&control.init.target, Value::Int(start))?;
        for i in start..=end {
            self.store(&control.condition.variable, Value::Int(i))?;
            self.exec_block(&for_loop.body)?;
        }
        Ok(())
    }

    fn exec_read(&mut self, read: &Read) -> EvalResult<()> {
        let word = self
            .next_word()
            .map_err(|err| {
                Box::new(MiniPlError::io_error(err.to_string(), read.target.location.clone()))
            })?
            .ok_or_else(|| {
                Box::new(MiniPlError::io_error(
                    "Unexpected end of input".to_string(),
                    read.target.location.clone(),
                ))
            })?;
        self.store(&read.target, Value::Str(word))
    }

    /// Updates a declared variable, converting the value to the variable's type
    fn store(&mut self, target: &Identifier, value: Value) -> EvalResult<()> {
        let ty = self.env.lookup(&target.name, &target.location)?.value_type();
        let value = value.coerce(ty).map_err(|err| Box::new((*err).or_at(&target.location)))?;
        self.env.assign(&target.name, value);
        Ok(())
    }

    fn next_word(&mut self) -> io::Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
