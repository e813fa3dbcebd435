// File: src/interpreter/evaluator.rs
//
// Node evaluator for Mini-PL.
// Walks the AST one node at a time, producing a single value per call.
//
// Only expressions and `assert` have runtime semantics here. Visiting any
// other statement-level node yields `PLACEHOLDER` without touching the
// binding store or the console; whole-program execution lives in
// `Interpreter`.

use super::environment::Environment;
use super::value::Value;
use super::{EvalResult, Output};
use crate::ast::{both_strings, Assert, BinaryOperator, Expr, Node, UnaryOperator};
use crate::errors::{MiniPlError, SourceLocation};
use std::sync::{Arc, Mutex};

/// Result of visiting a statement-level node
pub const PLACEHOLDER: Value = Value::Int(1);

pub const ASSERTION_SUCCEEDED: &str = "Assertion succeeded";
pub const ASSERTION_FAILED: &str = "Assertion failed";

#[derive(Default)]
pub struct Evaluator {
    output: Output,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::default()
    }

    /// Sets the output sink for assertion reports (used for testing)
    pub fn set_output(&mut self, output: Arc<Mutex<Vec<u8>>>) {
        self.output = Output::buffer(output);
    }

    /// Evaluates any node, reading variables from `store`
    pub fn evaluate<'a>(&self, node: impl Into<Node<'a>>, store: &Environment) -> EvalResult<Value> {
        match node.into() {
            // Statement-level nodes are not executed by the evaluator
            Node::Program(_)
            | Node::Block(_)
            | Node::Statement(_)
            | Node::Declaration(_)
            | Node::Assignment(_)
            | Node::ForLoop(_)
            | Node::ForControl(_)
            | Node::ForCondition(_)
            | Node::Print(_)
            | Node::Read(_) => Ok(PLACEHOLDER),
            Node::Assert(assert) => self.eval_assert(assert, store).map(Value::Bool),
            Node::Expr(expr) => self.eval_expr(expr, store),
        }
    }

    /// Checks an assertion and reports the outcome on the output sink
    pub fn eval_assert(&self, assert: &Assert, store: &Environment) -> EvalResult<bool> {
        let holds = self
            .eval_expr(&assert.condition, store)?
            .to_bool()
            .map_err(|err| Box::new((*err).or_at(&assert.location)))?;

        let report = if holds { ASSERTION_SUCCEEDED } else { ASSERTION_FAILED };
        self.output.write_line(report).map_err(|err| {
            Box::new(MiniPlError::io_error(err.to_string(), assert.location.clone()))
        })?;
        Ok(holds)
    }

    pub fn eval_expr(&self, expr: &Expr, store: &Environment) -> EvalResult<Value> {
        match expr {
            Expr::IntLiteral(n) => Ok(Value::Int(*n)),
            Expr::StringLiteral(s) => Ok(Value::Str(s.clone())),
            Expr::BoolLiteral(b) => Ok(Value::Bool(*b)),
            Expr::Identifier(id) => store.lookup(&id.name, &id.location),
            Expr::UnaryOp { op, operand, location } => match op {
                // Integer sentinel rather than a boolean
                UnaryOperator::Not => {
                    let truth = self
                        .eval_expr(operand, store)?
                        .to_bool()
                        .map_err(|err| Box::new((*err).or_at(location)))?;
                    Ok(Value::Int(if truth { 0 } else { 1 }))
                }
            },
            Expr::BinaryOp { op, left, right, location } => {
                let lhs = self.eval_expr(left, store)?;
                let rhs = self.eval_expr(right, store)?;
                let strings = both_strings(left, right);
                binary_op(*op, strings, lhs, rhs, location)
                    .map_err(|err| Box::new((*err).or_at(location)))
            }
        }
    }
}

/// Applies a binary operator to evaluated operands
///
/// `strings` is true when both operand expressions are statically tagged as
/// strings; it selects text semantics for `+`, `=` and `<`.
fn binary_op(
    op: BinaryOperator,
    strings: bool,
    lhs: Value,
    rhs: Value,
    location: &SourceLocation,
) -> EvalResult<Value> {
    let value = match op {
        BinaryOperator::Add if strings => Value::Str(format!("{}{}", lhs, rhs)),
        BinaryOperator::Add => Value::Int(lhs.to_int()?.wrapping_add(rhs.to_int()?)),
        BinaryOperator::Sub => Value::Int(lhs.to_int()?.wrapping_sub(rhs.to_int()?)),
        BinaryOperator::Mul => Value::Int(lhs.to_int()?.wrapping_mul(rhs.to_int()?)),
        BinaryOperator::Div => {
            let (a, b) = (lhs.to_int()?, rhs.to_int()?);
            if b == 0 {
                return Err(Box::new(MiniPlError::division_by_zero(location.clone())));
            }
            // i32::MIN / -1 is the only quotient that does not fit
            let quotient = a.checked_div(b).ok_or_else(|| {
                Box::new(MiniPlError::overflow(format!("{} / {}", a, b), location.clone()))
            })?;
            Value::Int(quotient)
        }
        BinaryOperator::Equal if strings => Value::Bool(lhs.to_string() == rhs.to_string()),
        BinaryOperator::Equal => Value::Bool(lhs.to_int()? == rhs.to_int()?),
        // Text comparison is by length, not lexicographic order
        BinaryOperator::Less if strings => {
            Value::Bool(lhs.to_string().chars().count() < rhs.to_string().chars().count())
        }
        BinaryOperator::Less => Value::Bool(lhs.to_int()? < rhs.to_int()?),
        BinaryOperator::And => Value::Bool(lhs.to_bool()? & rhs.to_bool()?),
    };
    Ok(value)
}
