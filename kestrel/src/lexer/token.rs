//! Token definitions

use crate::ast::Span;
use logos::Logos;
use serde::Serialize;
use std::fmt;

/// Kestrel token kind
///
/// Keywords are listed as exact tokens, so logos prefers them over the
/// identifier pattern when both match the same text.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[logos(skip r"[ \t\n\r]+")]
pub enum TokenKind {
    // Keywords
    #[token("let")]
    Let,
    #[token("def")]
    Function,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("return")]
    Return,
    #[token("while")]
    While,

    // Container literal openers
    #[token("hashset")]
    HashSet,
    #[token("stack")]
    Stack,
    #[token("queue")]
    Queue,
    #[token("deque")]
    Deque,
    #[token("maxheap")]
    MaxHeap,
    #[token("minheap")]
    MinHeap,

    // Literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+")]
    Int,
    /// No escape processing; an unterminated string runs to end of input.
    #[regex(r#""[^"]*"?"#)]
    Str,

    // Operators
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("!")]
    Bang,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    /// Any character no other rule accepts
    Illegal,
    /// End of input, returned forever once reached
    Eof,
}

impl TokenKind {
    /// Name used in parse error messages
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Let => "LET",
            TokenKind::Function => "FUNCTION",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
            TokenKind::While => "WHILE",
            TokenKind::HashSet => "HASHSET",
            TokenKind::Stack => "STACK",
            TokenKind::Queue => "QUEUE",
            TokenKind::Deque => "DEQUE",
            TokenKind::MaxHeap => "MAXHEAP",
            TokenKind::MinHeap => "MINHEAP",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Str => "STRING",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "END",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token with its literal text and source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            literal: literal.into(),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Debug listing format used by `kestrel tokens`
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type: {}, Literal: {}", self.kind, self.literal)
    }
}
