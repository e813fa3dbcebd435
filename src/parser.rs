// File: src/parser.rs
//
// Recursive descent parser for Mini-PL.
// Transforms a stream of tokens into an Abstract Syntax Tree (AST).
//
// The grammar is parsed with one procedure per rule and a single token of
// lookahead. Expressions use a flattened two-level precedence scheme:
// `+` and `-` bind loosest, while `*`, `/`, `<`, `&` and `=` share one
// tighter level. Both levels are left-associative.
//
// Errors are handled in panic mode. A missing token produces a diagnostic,
// abandons the statement being parsed and skips input up to and including
// the next `;`. Parsing then resumes with the following statement, so every
// malformed statement costs exactly one diagnostic. A statement that starts
// with a keyword that cannot begin a statement stops the enclosing block.

use crate::ast::{
    Assert, Assignment, BinaryOperator, Block, Declaration, Expr, ForCondition, ForControl,
    ForLoop, Identifier, Print, Program, Read, Statement, UnaryOperator, ValueType,
};
use crate::errors::{ErrorKind, MiniPlError};
use crate::lexer::{Keyword, Lexer, Token, TokenKind, TokenStream};
use std::collections::HashMap;

type ParseResult<T> = Result<T, Box<MiniPlError>>;

/// The tree produced by a parse together with every diagnostic, in source order
#[derive(Debug)]
pub struct ParseOutput {
    pub program: Program,
    pub diagnostics: Vec<MiniPlError>,
}

impl ParseOutput {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parser pulls tokens from a stream on demand and keeps one token of lookahead
pub struct Parser<S: TokenStream> {
    tokens: S,
    current: Token,
    /// Declared type of every variable seen so far, stamped on later references
    declared: HashMap<String, ValueType>,
    diagnostics: Vec<MiniPlError>,
}

impl<S: TokenStream> Parser<S> {
    /// Creates a new parser reading from the given token stream
    pub fn new(tokens: S) -> Self {
        Self::with_known_types(tokens, HashMap::new())
    }

    /// Creates a parser that already knows the types of some variables
    pub fn with_known_types(tokens: S, declared: HashMap<String, ValueType>) -> Self {
        Parser { tokens, current: Token::eof(1, 1), declared, diagnostics: Vec::new() }
    }

    /// Parses the whole stream; always yields a program, even for malformed input
    pub fn parse(mut self) -> ParseOutput {
        self.advance();
        let block = self.parse_block(|_| false);
        ParseOutput { program: Program { block }, diagnostics: self.diagnostics }
    }

    /// Requests the next token, synthesizing end of input once the stream is dry
    fn advance(&mut self) {
        self.current = if self.tokens.has_next() {
            self.tokens.next_token()
        } else {
            Token::eof(self.current.line, self.current.column)
        };
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Skips input up to and including the next statement terminator
    fn synchronize(&mut self) {
        while !self.at(TokenKind::Semicolon) {
            if self.at(TokenKind::Eof) {
                return;
            }
            self.advance();
        }
        self.advance();
    }

    /// Steps over a token the scanner could not classify, as if it matched
    fn skip_unknown(&mut self) -> bool {
        if self.at(TokenKind::Unknown) {
            self.diagnostics.push(MiniPlError::lexical_error(&self.current));
            self.advance();
            return true;
        }
        false
    }

    /// Consumes the current token if it has the expected kind
    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            let token = self.current.clone();
            self.advance();
            return Ok(token);
        }
        if self.at(TokenKind::Unknown) {
            // The stand-in keeps the rest of the statement parseable
            let stand_in = Token { kind, ..self.current.clone() };
            self.skip_unknown();
            return Ok(stand_in);
        }
        Err(Box::new(MiniPlError::unexpected_token(kind, &self.current)))
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<()> {
        self.expect(TokenKind::Keyword(keyword)).map(|_| ())
    }

    fn expect_identifier(&mut self) -> ParseResult<Identifier> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(self.identifier(token))
    }

    /// Builds a reference carrying the declared type of its name
    fn identifier(&self, token: Token) -> Identifier {
        Identifier {
            ty: self.declared.get(&token.lexeme).copied(),
            location: token.location(),
            name: token.lexeme,
        }
    }

    /// Parses statements until `stop` matches the current token or input ends
    ///
    /// Malformed statements are reported and skipped. An unrecognized
    /// statement keyword ends the block early, leaving the keyword unconsumed.
    fn parse_block(&mut self, stop: impl Fn(&Token) -> bool) -> Block {
        let mut statements = Vec::new();
        while !self.at(TokenKind::Eof) && !stop(&self.current) {
            if self.skip_unknown() {
                continue;
            }
            match self.parse_stmt() {
                Ok(stmt) => statements.push(stmt),
                Err(err) if err.kind == ErrorKind::UnrecognizedStatement => {
                    self.diagnostics.push(*err);
                    break;
                }
                Err(err) => {
                    self.diagnostics.push(*err);
                    self.synchronize();
                }
            }
        }
        Block { statements }
    }

    fn parse_stmt(&mut self) -> ParseResult<Statement> {
        let statement = match self.current.kind {
            TokenKind::Keyword(Keyword::Var) => Statement::Declaration(self.parse_declaration()?),
            TokenKind::Keyword(Keyword::For) => Statement::ForLoop(self.parse_for()?),
            TokenKind::Keyword(Keyword::Print) => Statement::Print(self.parse_print()?),
            TokenKind::Keyword(Keyword::Read) => Statement::Read(self.parse_read()?),
            TokenKind::Keyword(Keyword::Assert) => Statement::Assert(self.parse_assert()?),
            TokenKind::Keyword(_) => {
                return Err(Box::new(MiniPlError::unrecognized_statement(&self.current)))
            }
            TokenKind::Identifier => {
                let assignment = self.parse_assignment()?;
                Statement::Assignment(assignment)
            }
            _ => return Err(Box::new(MiniPlError::unexpected_token("statement", &self.current))),
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(statement)
    }

    /// `var ID : type [:= expr]`
    fn parse_declaration(&mut self) -> ParseResult<Declaration> {
        self.expect_keyword(Keyword::Var)?;
        let token = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Colon)?;

        let ty = match self.current.kind {
            TokenKind::Keyword(Keyword::Int) => ValueType::Int,
            TokenKind::Keyword(Keyword::String) => ValueType::String,
            TokenKind::Keyword(Keyword::Bool) => ValueType::Bool,
            _ => {
                return Err(Box::new(MiniPlError::unexpected_token(
                    "type int, string or bool",
                    &self.current,
                )))
            }
        };
        self.advance();

        // Later references to the name see this type
        self.declared.insert(token.lexeme.clone(), ty);
        let target = Identifier { ty: Some(ty), location: token.location(), name: token.lexeme };

        let initializer = if self.at(TokenKind::Assign) {
            self.advance();
            Some(Assignment { target: target.clone(), value: self.parse_expr()? })
        } else {
            None
        };

        Ok(Declaration { target, ty, initializer })
    }

    /// `ID := expr`
    fn parse_assignment(&mut self) -> ParseResult<Assignment> {
        let target = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        Ok(Assignment { target, value })
    }

    /// `for ID in expr .. expr do stmt* end for`
    ///
    /// A malformed header is reported once, but the body is still consumed up
    /// to its `end` so that the statements after the loop are parsed normally.
    fn parse_for(&mut self) -> ParseResult<ForLoop> {
        self.expect_keyword(Keyword::For)?;
        let control = self.parse_for_header();
        if control.is_err() {
            self.skip_for_header();
        }

        let body = self.parse_block(|token| token.is_keyword(Keyword::End));
        let control = control?;

        self.expect_keyword(Keyword::End)?;
        self.expect_keyword(Keyword::For)?;
        Ok(ForLoop { control, body })
    }

    /// `ID in expr .. expr do`
    fn parse_for_header(&mut self) -> ParseResult<ForControl> {
        let variable = self.expect_identifier()?;
        self.expect_keyword(Keyword::In)?;
        let start = self.parse_expr()?;
        self.expect(TokenKind::Range)?;
        let end = self.parse_expr()?;
        self.expect_keyword(Keyword::Do)?;

        Ok(ForControl {
            init: Assignment { target: variable.clone(), value: start },
            condition: ForCondition { variable, end },
        })
    }

    /// Skips the rest of a broken loop header, through `do` or the first `;`
    ///
    /// Stops in front of `end` so the loop can still be closed.
    fn skip_for_header(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::Eof | TokenKind::Keyword(Keyword::End) => return,
                TokenKind::Keyword(Keyword::Do) | TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    /// `print expr`
    fn parse_print(&mut self) -> ParseResult<Print> {
        let location = self.current.location();
        self.expect_keyword(Keyword::Print)?;
        Ok(Print { value: self.parse_expr()?, location })
    }

    /// `read ID`
    fn parse_read(&mut self) -> ParseResult<Read> {
        self.expect_keyword(Keyword::Read)?;
        Ok(Read { target: self.expect_identifier()? })
    }

    /// `assert ( expr )`
    fn parse_assert(&mut self) -> ParseResult<Assert> {
        let location = self.current.location();
        self.expect_keyword(Keyword::Assert)?;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen)?;
        Ok(Assert { condition, location })
    }

    /// `term (("+" | "-") term)*`
    fn parse_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };
            let location = self.current.location();
            self.advance();
            let right = self.parse_term()?;
            left = Expr::BinaryOp { op, left: Box::new(left), right: Box::new(right), location };
        }

        Ok(left)
    }

    /// `factor (("*" | "/" | "<" | "&" | "=") factor)*`
    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOperator::Mul,
                TokenKind::Slash => BinaryOperator::Div,
                TokenKind::Less => BinaryOperator::Less,
                TokenKind::And => BinaryOperator::And,
                TokenKind::Equal => BinaryOperator::Equal,
                _ => break,
            };
            let location = self.current.location();
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::BinaryOp { op, left: Box::new(left), right: Box::new(right), location };
        }

        Ok(left)
    }

    /// Literals, variables, parenthesized expressions and `!` negation
    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let token = self.current.clone();
        let expr = match token.kind {
            TokenKind::IntLiteral => {
                let value = token.lexeme.parse::<i32>().map_err(|_| {
                    Box::new(MiniPlError::new(
                        ErrorKind::SyntaxError,
                        format!("Integer literal '{}' is out of range", token.lexeme),
                        token.location(),
                    ))
                })?;
                self.advance();
                Expr::IntLiteral(value)
            }
            TokenKind::StringLiteral => {
                self.advance();
                Expr::StringLiteral(token.lexeme)
            }
            TokenKind::BoolLiteral => {
                self.advance();
                Expr::BoolLiteral(token.lexeme == "true")
            }
            TokenKind::Identifier => {
                self.advance();
                Expr::Identifier(self.identifier(token))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen)?;
                inner
            }
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_factor()?;
                Expr::UnaryOp {
                    op: UnaryOperator::Not,
                    operand: Box::new(operand),
                    location: token.location(),
                }
            }
            _ => {
                return Err(Box::new(MiniPlError::unexpected_token(
                    "integer, string, bool, identifier or '('",
                    &token,
                )))
            }
        };
        Ok(expr)
    }
}

/// Parses a token stream into a program plus diagnostics
pub fn parse<S: TokenStream>(tokens: S) -> ParseOutput {
    Parser::new(tokens).parse()
}

/// Scans and parses source text in one step
pub fn parse_source(source: &str) -> ParseOutput {
    parse(Lexer::new(source))
}
