// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for Mini-PL.
// Defines the structure of parsed Mini-PL programs.
//
// Every node owns its children exclusively and the arity of each variant is
// fixed by its type. Expressions (Expr) carry the static type tag used by the
// evaluator to pick between string and integer operator semantics.

use crate::errors::SourceLocation;
use serde::Serialize;
use std::fmt::{self, Write};

/// Declared type of a variable, also used as the static tag of expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    String,
    Bool,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::String => write!(f, "string"),
            ValueType::Bool => write!(f, "bool"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Not,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Equal,
    And,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Less => "<",
            BinaryOperator::Equal => "=",
            BinaryOperator::And => "&",
        }
    }
}

/// A variable reference
///
/// `ty` is the type recorded at the variable's declaration. It is `None`
/// when the parser has not seen a declaration for the name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub ty: Option<ValueType>,
    pub location: SourceLocation,
}

/// Represents an expression - something that evaluates to a value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    IntLiteral(i32),
    StringLiteral(String),
    BoolLiteral(bool),
    Identifier(Identifier),
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    /// Static type tag of this expression
    ///
    /// Literals fix their tag and identifiers inherit the declared one. `!`
    /// yields an integer sentinel, so it is tagged `Int`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Expr::IntLiteral(_) => Some(ValueType::Int),
            Expr::StringLiteral(_) => Some(ValueType::String),
            Expr::BoolLiteral(_) => Some(ValueType::Bool),
            Expr::Identifier(id) => id.ty,
            Expr::UnaryOp { .. } => Some(ValueType::Int),
            Expr::BinaryOp { op, left, right, .. } => match op {
                BinaryOperator::Add if both_strings(left, right) => Some(ValueType::String),
                BinaryOperator::Add
                | BinaryOperator::Sub
                | BinaryOperator::Mul
                | BinaryOperator::Div => Some(ValueType::Int),
                BinaryOperator::Less | BinaryOperator::Equal | BinaryOperator::And => {
                    Some(ValueType::Bool)
                }
            },
        }
    }
}

/// True when both operands are statically tagged as strings
pub fn both_strings(left: &Expr, right: &Expr) -> bool {
    matches!(
        (left.value_type(), right.value_type()),
        (Some(ValueType::String), Some(ValueType::String))
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub block: Block,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Declaration(Declaration),
    Assignment(Assignment),
    ForLoop(ForLoop),
    Print(Print),
    Read(Read),
    Assert(Assert),
}

/// `var x : T [:= e];` - the target identifier carries `ty` as well
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub target: Identifier,
    pub ty: ValueType,
    pub initializer: Option<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub target: Identifier,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForLoop {
    pub control: ForControl,
    pub body: Block,
}

/// Loop header: `v := start` plus the `v .. end` condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForControl {
    pub init: Assignment,
    pub condition: ForCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForCondition {
    pub variable: Identifier,
    pub end: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Print {
    pub value: Expr,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Read {
    pub target: Identifier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assert {
    pub condition: Expr,
    pub location: SourceLocation,
}

/// Borrowed view over every node variant, the unit of evaluator dispatch
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Block(&'a Block),
    Statement(&'a Statement),
    Declaration(&'a Declaration),
    Assignment(&'a Assignment),
    ForLoop(&'a ForLoop),
    ForControl(&'a ForControl),
    ForCondition(&'a ForCondition),
    Print(&'a Print),
    Read(&'a Read),
    Assert(&'a Assert),
    Expr(&'a Expr),
}

macro_rules! impl_node_from {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for Node<'a> {
                fn from(node: &'a $ty) -> Self {
                    Node::$variant(node)
                }
            }
        )+
    };
}

impl_node_from! {
    Program => Program,
    Block => Block,
    Statement => Statement,
    Declaration => Declaration,
    Assignment => Assignment,
    ForLoop => ForLoop,
    ForControl => ForControl,
    ForCondition => ForCondition,
    Print => Print,
    Read => Read,
    Assert => Assert,
    Expr => Expr,
}

impl Program {
    /// Renders the tree one node per line, children indented under parents
    pub fn display_tree(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = TreeWriter { out: &mut out, depth: 0 }.program(self);
        out
    }
}

struct TreeWriter<'w> {
    out: &'w mut String,
    depth: usize,
}

impl TreeWriter<'_> {
    fn line(&mut self, text: fmt::Arguments) -> fmt::Result {
        writeln!(self.out, "{}{}", "  ".repeat(self.depth), text)
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> fmt::Result) -> fmt::Result {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn program(&mut self, program: &Program) -> fmt::Result {
        self.line(format_args!("Program"))?;
        self.nested(|w| w.block(&program.block))
    }

    fn block(&mut self, block: &Block) -> fmt::Result {
        self.line(format_args!("Block"))?;
        self.nested(|w| block.statements.iter().try_for_each(|s| w.statement(s)))
    }

    fn statement(&mut self, statement: &Statement) -> fmt::Result {
        self.line(format_args!("Statement"))?;
        self.nested(|w| match statement {
            Statement::Declaration(decl) => {
                w.line(format_args!("Declaration {} : {}", decl.target.name, decl.ty))?;
                match &decl.initializer {
                    Some(init) => w.nested(|w| w.assignment(init)),
                    None => Ok(()),
                }
            }
            Statement::Assignment(assign) => w.assignment(assign),
            Statement::ForLoop(for_loop) => {
                w.line(format_args!("ForLoop"))?;
                w.nested(|w| {
                    w.line(format_args!("ForControl"))?;
                    w.nested(|w| {
                        w.assignment(&for_loop.control.init)?;
                        w.line(format_args!("ForCondition"))?;
                        w.nested(|w| {
                            w.identifier(&for_loop.control.condition.variable)?;
                            w.expr(&for_loop.control.condition.end)
                        })
                    })?;
                    w.block(&for_loop.body)
                })
            }
            Statement::Print(print) => {
                w.line(format_args!("Print"))?;
                w.nested(|w| w.expr(&print.value))
            }
            Statement::Read(read) => {
                w.line(format_args!("Read"))?;
                w.nested(|w| w.identifier(&read.target))
            }
            Statement::Assert(assert) => {
                w.line(format_args!("Assert"))?;
                w.nested(|w| w.expr(&assert.condition))
            }
        })
    }

    fn assignment(&mut self, assign: &Assignment) -> fmt::Result {
        self.line(format_args!("Assignment"))?;
        self.nested(|w| {
            w.identifier(&assign.target)?;
            w.expr(&assign.value)
        })
    }

    fn identifier(&mut self, id: &Identifier) -> fmt::Result {
        match id.ty {
            Some(ty) => self.line(format_args!("Identifier {} : {}", id.name, ty)),
            None => self.line(format_args!("Identifier {}", id.name)),
        }
    }

    fn expr(&mut self, expr: &Expr) -> fmt::Result {
        match expr {
            Expr::IntLiteral(n) => self.line(format_args!("Int {}", n)),
            Expr::StringLiteral(s) => self.line(format_args!("String {:?}", s)),
            Expr::BoolLiteral(b) => self.line(format_args!("Bool {}", b)),
            Expr::Identifier(id) => self.identifier(id),
            Expr::UnaryOp { op, operand, .. } => {
                self.line(format_args!("UnaryOp {}", op.symbol()))?;
                self.nested(|w| w.expr(operand))
            }
            Expr::BinaryOp { op, left, right, .. } => {
                self.line(format_args!("BinaryOp {}", op.symbol()))?;
                self.nested(|w| {
                    w.expr(left)?;
                    w.expr(right)
                })
            }
        }
    }
}
