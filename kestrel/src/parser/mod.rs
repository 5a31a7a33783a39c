//! Pratt parser for Kestrel
//!
//! Expressions are parsed by precedence climbing over two dispatch tables:
//! prefix handlers keyed by the current token and infix handlers keyed by
//! the peeked token. Errors are collected rather than returned early, so a
//! single pass reports every problem it can find.


use crate::ast::{BlockStatement, Expression, HeapElement, InfixOp, PrefixOp, Program, Statement};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use std::collections::HashMap;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

type PrefixParseFn<'src> = fn(&mut Parser<'src>) -> Option<Expression>;
type InfixParseFn<'src> = fn(&mut Parser<'src>, Expression) -> Option<Expression>;

/// Binding power, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `==` `!=` `<=` `>=`
    Equals,
    /// `<` `>`
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Eq | TokenKind::NotEq | TokenKind::LtEq | TokenKind::GtEq => {
                Precedence::Equals
            }
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            TokenKind::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

/// Parser with one token of lookahead
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    cur: Token,
    peek: Token,
    errors: Vec<ParseError>,
    prefix_fns: HashMap<TokenKind, PrefixParseFn<'src>>,
    infix_fns: HashMap<TokenKind, InfixParseFn<'src>>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let cur = lexer.next_token();
        let peek = lexer.next_token();
        let mut parser = Parser {
            lexer,
            cur,
            peek,
            errors: Vec::new(),
            prefix_fns: HashMap::new(),
            infix_fns: HashMap::new(),
        };
        parser.register_handlers();
        parser
    }

    fn register_handlers(&mut self) {
        self.prefix_fns.insert(TokenKind::Ident, Self::parse_identifier);
        self.prefix_fns.insert(TokenKind::Int, Self::parse_integer_literal);
        self.prefix_fns.insert(TokenKind::Str, Self::parse_string_literal);
        self.prefix_fns.insert(TokenKind::True, Self::parse_boolean);
        self.prefix_fns.insert(TokenKind::False, Self::parse_boolean);
        self.prefix_fns.insert(TokenKind::Bang, Self::parse_prefix_expression);
        self.prefix_fns.insert(TokenKind::Minus, Self::parse_prefix_expression);
        self.prefix_fns.insert(TokenKind::LParen, Self::parse_grouped_expression);
        self.prefix_fns.insert(TokenKind::If, Self::parse_if_expression);
        self.prefix_fns.insert(TokenKind::While, Self::parse_while_expression);
        self.prefix_fns.insert(TokenKind::Function, Self::parse_function_literal);
        self.prefix_fns.insert(TokenKind::LBracket, Self::parse_array_literal);
        self.prefix_fns.insert(TokenKind::LBrace, Self::parse_hashmap_literal);
        self.prefix_fns.insert(TokenKind::HashSet, Self::parse_marked_container);
        self.prefix_fns.insert(TokenKind::Stack, Self::parse_marked_container);
        self.prefix_fns.insert(TokenKind::Queue, Self::parse_marked_container);
        self.prefix_fns.insert(TokenKind::Deque, Self::parse_marked_container);
        self.prefix_fns.insert(TokenKind::MaxHeap, Self::parse_heap_literal);
        self.prefix_fns.insert(TokenKind::MinHeap, Self::parse_heap_literal);

        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Asterisk,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Eq,
            TokenKind::NotEq,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::LtEq,
            TokenKind::GtEq,
        ] {
            self.infix_fns.insert(kind, Self::parse_infix_expression);
        }
        self.infix_fns.insert(TokenKind::LParen, Self::parse_call_expression);
        self.infix_fns.insert(TokenKind::LBracket, Self::parse_index_expression);
    }

    /// Errors recorded so far, in source order
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Parse the whole input. The program is partial when errors were recorded.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.cur_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }
        tracing::debug!(
            statements = program.statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        program
    }

    // ---- token plumbing ----

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur = std::mem::replace(&mut self.peek, next);
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    /// Advance if the peeked token is `kind`, otherwise record an error
    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_is(kind) {
            self.next_token();
            Some(())
        } else {
            self.peek_error(kind);
            None
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        let message = format!(
            "expected token to be {expected}, got {} instead",
            self.peek.kind
        );
        self.errors.push(ParseError::new(message, self.peek.span));
    }

    fn skip_semicolon(&mut self) {
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.kind)
    }

    fn cur_precedence(&self) -> Precedence {
        Precedence::of(self.cur.kind)
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Ident if self.peek_is(TokenKind::Assign) => self.parse_assign_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = self.cur.literal.clone();
        self.expect_peek(TokenKind::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Some(Statement::Let { name, value })
    }

    fn parse_assign_statement(&mut self) -> Option<Statement> {
        let name = self.cur.literal.clone();
        self.next_token();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Some(Statement::Assign { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
            return Some(Statement::Return(None));
        }
        if self.peek_is(TokenKind::RBrace) || self.peek_is(TokenKind::Eof) {
            return Some(Statement::Return(None));
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Some(Statement::Return(Some(value)))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Some(Statement::Expression(expr))
    }

    /// Parse `{ STMT* }` with the current token on `{`.
    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let mut block = BlockStatement::default();
        self.next_token();
        while !self.cur_is(TokenKind::RBrace) {
            if self.cur_is(TokenKind::Eof) {
                let message = format!(
                    "expected token to be {}, got {} instead",
                    TokenKind::RBrace,
                    TokenKind::Eof
                );
                self.errors.push(ParseError::new(message, self.cur.span));
                return None;
            }
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }
            self.next_token();
        }
        Some(block)
    }

    // ---- expressions ----

    /// Nested groupings recurse here, so the stack grows on demand
    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.parse_expression_inner(precedence)
        })
    }

    fn parse_expression_inner(&mut self, precedence: Precedence) -> Option<Expression> {
        let Some(prefix) = self.prefix_fns.get(&self.cur.kind).copied() else {
            let message = format!("no prefix parse function for {} found", self.cur.kind);
            self.errors.push(ParseError::new(message, self.cur.span));
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix) = self.infix_fns.get(&self.peek.kind).copied() else {
                return Some(left);
            };
            self.next_token();
            left = infix(self, left)?;
        }
        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(self.cur.literal.clone()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                let message = format!("could not parse {} as integer", self.cur.literal);
                self.errors.push(ParseError::new(message, self.cur.span));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::StringLiteral(self.cur.literal.clone()))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::BooleanLiteral(self.cur_is(TokenKind::True)))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let op = if self.cur_is(TokenKind::Bang) {
            PrefixOp::Not
        } else {
            PrefixOp::Neg
        };
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            op,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let op = match self.cur.kind {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Sub,
            TokenKind::Asterisk => InfixOp::Mul,
            TokenKind::Slash => InfixOp::Div,
            TokenKind::Percent => InfixOp::Mod,
            TokenKind::Eq => InfixOp::Eq,
            TokenKind::NotEq => InfixOp::NotEq,
            TokenKind::Lt => InfixOp::Lt,
            TokenKind::Gt => InfixOp::Gt,
            TokenKind::LtEq => InfixOp::LtEq,
            TokenKind::GtEq => InfixOp::GtEq,
            _ => return None,
        };
        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        Some(expr)
    }

    /// `(COND) { ... }` shared by `if` and `while`
    fn parse_condition_and_block(&mut self) -> Option<(Expression, BlockStatement)> {
        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::LBrace)?;
        let block = self.parse_block_statement()?;
        Some((condition, block))
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let (condition, consequence) = self.parse_condition_and_block()?;

        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            if self.peek_is(TokenKind::If) {
                self.next_token();
                let nested = self.parse_if_expression()?;
                Some(BlockStatement::new(vec![Statement::Expression(nested)]))
            } else {
                self.expect_peek(TokenKind::LBrace)?;
                Some(self.parse_block_statement()?)
            }
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_while_expression(&mut self) -> Option<Expression> {
        let (condition, body) = self.parse_condition_and_block()?;
        Some(Expression::While {
            condition: Box::new(condition),
            body,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement()?;
        Some(Expression::FunctionLiteral { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();
        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Some(parameters);
        }

        self.expect_peek(TokenKind::Ident)?;
        parameters.push(self.cur.literal.clone());
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            if self.peek_is(TokenKind::RParen) {
                break;
            }
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(self.cur.literal.clone());
        }
        self.expect_peek(TokenKind::RParen)?;
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RBracket)?;
        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    /// Comma-separated expressions up to `end`, current token on the opener.
    /// A trailing comma is accepted, as in hash-map literals.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            if self.peek_is(end) {
                break;
            }
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;
        Some(list)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Some(Expression::ArrayLiteral(elements))
    }

    fn parse_hashmap_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();
        while !self.peek_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_is(TokenKind::RBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }
        self.expect_peek(TokenKind::RBrace)?;
        Some(Expression::HashMapLiteral(pairs))
    }

    /// `hashset<>{...}`, `stack<>{...}`, `queue<>{...}` and `deque<>{...}`
    fn parse_marked_container(&mut self) -> Option<Expression> {
        let opener = self.cur.kind;
        self.expect_peek(TokenKind::Lt)?;
        self.expect_peek(TokenKind::Gt)?;
        self.expect_peek(TokenKind::LBrace)?;
        let elements = self.parse_expression_list(TokenKind::RBrace)?;
        match opener {
            TokenKind::HashSet => Some(Expression::HashSetLiteral(elements)),
            TokenKind::Stack => Some(Expression::StackLiteral(elements)),
            TokenKind::Queue => Some(Expression::QueueLiteral(elements)),
            TokenKind::Deque => Some(Expression::DequeLiteral(elements)),
            _ => None,
        }
    }

    /// `maxheap<int>{...}` and friends
    fn parse_heap_literal(&mut self) -> Option<Expression> {
        let is_max = self.cur_is(TokenKind::MaxHeap);
        self.expect_peek(TokenKind::Lt)?;
        self.expect_peek(TokenKind::Ident)?;
        let Some(element) = HeapElement::from_name(&self.cur.literal) else {
            let message = format!(
                "expected heap element type to be int or string, got {} instead",
                self.cur.literal
            );
            self.errors.push(ParseError::new(message, self.cur.span));
            return None;
        };
        self.expect_peek(TokenKind::Gt)?;
        self.expect_peek(TokenKind::LBrace)?;
        let elements = self.parse_expression_list(TokenKind::RBrace)?;
        Some(if is_max {
            Expression::MaxHeapLiteral { element, elements }
        } else {
            Expression::MinHeapLiteral { element, elements }
        })
    }
}

/// Parse a complete source string, returning every error on failure
pub fn parse(source: &str) -> Result<Program, Vec<ParseError>> {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    if parser.has_errors() {
        Err(parser.into_errors())
    } else {
        Ok(program)
    }
}
