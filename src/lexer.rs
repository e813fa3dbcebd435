// File: src/lexer.rs
//
// Lexical analyzer (scanner) for Mini-PL.
// Converts source text into a lazily produced stream of tokens for parsing.
//
// Supports:
// - Keywords: var, for, end, in, do, read, print, int, string, bool, assert
// - Identifiers, integer literals and the boolean literals true/false
// - String literals with escape sequences
// - Operators: + - * / < = & ! := ..
// - Punctuation: ( ) : ;
// - Line comments starting with // and nestable /* block comments */

use crate::errors::SourceLocation;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Reserved words that the grammar treats structurally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Var,
    For,
    End,
    In,
    Do,
    Read,
    Print,
    Int,
    String,
    Bool,
    Assert,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "var" => Keyword::Var,
            "for" => Keyword::For,
            "end" => Keyword::End,
            "in" => Keyword::In,
            "do" => Keyword::Do,
            "read" => Keyword::Read,
            "print" => Keyword::Print,
            "int" => Keyword::Int,
            "string" => Keyword::String,
            "bool" => Keyword::Bool,
            "assert" => Keyword::Assert,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Var => "var",
            Keyword::For => "for",
            Keyword::End => "end",
            Keyword::In => "in",
            Keyword::Do => "do",
            Keyword::Read => "read",
            Keyword::Print => "print",
            Keyword::Int => "int",
            Keyword::String => "string",
            Keyword::Bool => "bool",
            Keyword::Assert => "assert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    /// Input the scanner could not classify
    Unknown,
    Identifier,
    IntLiteral,
    StringLiteral,
    BoolLiteral,
    Plus,
    Minus,
    Star,
    Slash,
    Less,
    Equal,
    And,
    Not,
    Semicolon,
    Colon,
    Assign,
    Range,
    LeftParen,
    RightParen,
    Keyword(Keyword),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Unknown => write!(f, "unknown token"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::IntLiteral => write!(f, "integer"),
            TokenKind::StringLiteral => write!(f, "string"),
            TokenKind::BoolLiteral => write!(f, "boolean"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Less => write!(f, "'<'"),
            TokenKind::Equal => write!(f, "'='"),
            TokenKind::And => write!(f, "'&'"),
            TokenKind::Not => write!(f, "'!'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Assign => write!(f, "':='"),
            TokenKind::Range => write!(f, "'..'"),
            TokenKind::LeftParen => write!(f, "'('"),
            TokenKind::RightParen => write!(f, "')'"),
            TokenKind::Keyword(k) => write!(f, "keyword '{}'", k.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token { kind, lexeme: lexeme.into(), line, column }
    }

    /// End-of-input marker, synthesized by the parser once the stream runs dry
    pub fn eof(line: usize, column: usize) -> Self {
        Token::new(TokenKind::Eof, "", line, column)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// A source of tokens consumed on demand by the parser.
///
/// Implementors never need to produce an end-of-input token: the parser
/// stops asking once `has_next` returns false.
pub trait TokenStream {
    fn has_next(&mut self) -> bool;
    fn next_token(&mut self) -> Token;
}

impl<I: Iterator<Item = Token>> TokenStream for Peekable<I> {
    fn has_next(&mut self) -> bool {
        self.peek().is_some()
    }

    fn next_token(&mut self) -> Token {
        match self.next() {
            Some(token) => token,
            None => Token::eof(0, 0),
        }
    }
}

/// Lazy scanner over Mini-PL source text
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { chars: source.chars().peekable(), line: 1, col: 1 }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn bump_if(&mut self, expected: char) -> bool {
        if self.chars.peek() == Some(&expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Peeks one character past the next one without consuming anything
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    /// Skips whitespace and comments so the next char starts a token
    fn skip_trivia(&mut self) {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => match self.peek_second() {
                    Some('/') => {
                        while let Some(ch) = self.bump() {
                            if ch == '\n' {
                                break;
                            }
                        }
                    }
                    Some('*') => self.skip_block_comment(),
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.bump();
        self.bump();
        let mut depth = 1;
        while depth > 0 {
            match self.bump() {
                Some('*') if self.bump_if('/') => depth -= 1,
                Some('/') if self.bump_if('*') => depth += 1,
                Some(_) => {}
                None => return,
            }
        }
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Token {
        self.bump(); // opening quote
        let mut s = String::new();
        loop {
            match self.bump() {
                Some('"') => return Token::new(TokenKind::StringLiteral, s, line, column),
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(esc) => s.push(esc),
                    None => break,
                },
                Some(ch) => s.push(ch),
                None => break,
            }
        }
        Token::new(TokenKind::Unknown, format!("\"{}", s), line, column)
    }

    fn scan_while(&mut self, first: char, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::from(first);
        while let Some(&ch) = self.chars.peek() {
            if !pred(ch) {
                break;
            }
            text.push(ch);
            self.bump();
        }
        text
    }

    fn scan_token(&mut self) -> Option<Token> {
        self.skip_trivia();
        let line = self.line;
        let column = self.col;
        let c = *self.chars.peek()?;

        if c == '"' {
            return Some(self.scan_string(line, column));
        }
        self.bump();

        let (kind, lexeme) = match c {
            '0'..='9' => {
                (TokenKind::IntLiteral, self.scan_while(c, |ch| ch.is_ascii_digit()))
            }
            'a'..='z' | 'A'..='Z' => {
                let word = self.scan_while(c, |ch| ch.is_ascii_alphanumeric() || ch == '_');
                let kind = match word.as_str() {
                    "true" | "false" => TokenKind::BoolLiteral,
                    _ => match Keyword::from_word(&word) {
                        Some(keyword) => TokenKind::Keyword(keyword),
                        None => TokenKind::Identifier,
                    },
                };
                (kind, word)
            }
            ':' if self.bump_if('=') => (TokenKind::Assign, ":=".to_string()),
            '.' if self.bump_if('.') => (TokenKind::Range, "..".to_string()),
            _ => {
                let kind = match c {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Star,
                    '/' => TokenKind::Slash,
                    '<' => TokenKind::Less,
                    '=' => TokenKind::Equal,
                    '&' => TokenKind::And,
                    '!' => TokenKind::Not,
                    ';' => TokenKind::Semicolon,
                    ':' => TokenKind::Colon,
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    _ => TokenKind::Unknown,
                };
                (kind, c.to_string())
            }
        };

        Some(Token::new(kind, lexeme, line, column))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.scan_token()
    }
}

impl TokenStream for Lexer<'_> {
    fn has_next(&mut self) -> bool {
        self.skip_trivia();
        self.chars.peek().is_some()
    }

    fn next_token(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        self.scan_token().unwrap_or_else(|| Token::eof(line, col))
    }
}

/// Tokenizes a whole source text eagerly
///
/// The returned vector does not end with an `Eof` token; the parser
/// synthesizes one when the stream is exhausted.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}
