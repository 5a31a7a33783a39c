//! Lexer implementation using logos
//!
//! [`Lexer`] hands out one [`Token`] per [`Lexer::next_token`] call. Lexing
//! never fails: characters no rule accepts become [`TokenKind::Illegal`]
//! tokens and scanning continues past them.

mod token;

pub use token::{Token, TokenKind};

use crate::ast::Span;
use logos::Logos;

/// On-demand scanner over an immutable source buffer
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            inner: TokenKind::lexer(source),
            finished: false,
        }
    }

    /// Return the next token and advance.
    ///
    /// Once the end of input (or a NUL character) is reached every further
    /// call returns an `Eof` token at the same offset.
    pub fn next_token(&mut self) -> Token {
        let source_len = self.inner.source().len();
        if self.finished {
            return Token::new(TokenKind::Eof, "", Span::at(source_len));
        }

        let Some(result) = self.inner.next() else {
            self.finished = true;
            return Token::new(TokenKind::Eof, "", Span::at(source_len));
        };

        let range = self.inner.span();
        let span = Span::new(range.start, range.end);
        let slice = self.inner.slice();

        match result {
            Ok(TokenKind::Str) => Token::new(TokenKind::Str, string_contents(slice), span),
            Ok(kind) => Token::new(kind, slice, span),
            Err(()) if slice.starts_with('\0') => {
                self.finished = true;
                Token::new(TokenKind::Eof, "", Span::at(span.start))
            }
            Err(()) => Token::new(TokenKind::Illegal, slice, span),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to, but not including, the end-of-input token
    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (!token.is(TokenKind::Eof)).then_some(token)
    }
}

/// Text between the quotes of a string token; the closing quote may be absent
fn string_contents(slice: &str) -> &str {
    let inner = slice.strip_prefix('"').unwrap_or(slice);
    inner.strip_suffix('"').unwrap_or(inner)
}

/// Tokenize a whole source string, excluding the trailing `Eof`
pub fn tokenize(source: &str) -> Vec<Token> {
    let tokens: Vec<Token> = Lexer::new(source).collect();
    tracing::debug!(count = tokens.len(), "lexed source");
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_keywords() {
        assert_eq!(
            kinds("let def true false if else return while"),
            vec![
                TokenKind::Let,
                TokenKind::Function,
                TokenKind::True,
                TokenKind::False,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Return,
                TokenKind::While,
            ]
        );
    }

    #[test]
    fn test_tokenize_container_keywords() {
        assert_eq!(
            kinds("hashset stack queue deque maxheap minheap"),
            vec![
                TokenKind::HashSet,
                TokenKind::Stack,
                TokenKind::Queue,
                TokenKind::Deque,
                TokenKind::MaxHeap,
                TokenKind::MinHeap,
            ]
        );
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds("= + - ! * / %"),
            vec![
                TokenKind::Assign,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Bang,
                TokenKind::Asterisk,
                TokenKind::Slash,
                TokenKind::Percent,
            ]
        );
    }

    #[test]
    fn test_two_character_operators_need_lookahead() {
        assert_eq!(
            kinds("== != <= >= < > = !"),
            vec![
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Assign,
                TokenKind::Bang,
            ]
        );
    }

    #[test]
    fn test_tokenize_delimiters() {
        assert_eq!(
            kinds("( ) { } [ ] , ; :"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn test_identifiers_accept_digits_after_start() {
        let tokens = tokenize("foo bar_baz x123 _tmp");
        let literals: Vec<_> = tokens.iter().map(|t| t.literal.as_str()).collect();
        assert!(tokens.iter().all(|t| t.is(TokenKind::Ident)));
        assert_eq!(literals, vec!["foo", "bar_baz", "x123", "_tmp"]);
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens = tokenize("letter define stacks");
        assert!(tokens.iter().all(|t| t.is(TokenKind::Ident)));
    }

    #[test]
    fn test_negative_integer_is_minus_then_int() {
        let tokens = tokenize("-42");
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].is(TokenKind::Minus));
        assert!(tokens[1].is(TokenKind::Int));
        assert_eq!(tokens[1].literal, "42");
    }

    #[test]
    fn test_string_literal_strips_quotes() {
        let tokens = tokenize(r#""foobar" "foo bar""#);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].literal, "foobar");
        assert_eq!(tokens[1].literal, "foo bar");
        assert!(tokens.iter().all(|t| t.is(TokenKind::Str)));
    }

    #[test]
    fn test_string_has_no_escape_processing() {
        let tokens = tokenize(r#""a\nb""#);
        assert_eq!(tokens[0].literal, r"a\nb");
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens = tokenize("\"never closed; let x = 1");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is(TokenKind::Str));
        assert_eq!(tokens[0].literal, "never closed; let x = 1");
    }

    #[test]
    fn test_illegal_character_advances() {
        let tokens = tokenize("1 @ 2 # 3");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Int,
                TokenKind::Illegal,
                TokenKind::Int,
                TokenKind::Illegal,
                TokenKind::Int,
            ]
        );
        assert_eq!(tokens[1].literal, "@");
    }

    #[test]
    fn test_end_of_input_is_idempotent() {
        let mut lexer = Lexer::new("x");
        assert!(lexer.next_token().is(TokenKind::Ident));
        for _ in 0..5 {
            let tok = lexer.next_token();
            assert!(tok.is(TokenKind::Eof));
            assert_eq!(tok.literal, "");
        }
    }

    #[test]
    fn test_nul_character_ends_input() {
        let mut lexer = Lexer::new("a\0b");
        assert!(lexer.next_token().is(TokenKind::Ident));
        assert!(lexer.next_token().is(TokenKind::Eof));
        assert!(lexer.next_token().is(TokenKind::Eof));
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("let five");
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[1].span, Span::new(4, 8));
    }

    #[test]
    fn test_whitespace_only_source() {
        assert!(tokenize("  \t\r\n\n  ").is_empty());
    }

    #[test]
    fn test_full_program_token_stream() {
        let source = "let add = def(x, y) { x + y; }; let r = add(5, 10);\n\
                      if (5 < 10) { return true; } else { return false; }\n\
                      10 == 10; 10 != 9; [1, 2]; {\"foo\": \"bar\"}";
        let expected = vec![
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "add"),
            (TokenKind::Assign, "="),
            (TokenKind::Function, "def"),
            (TokenKind::LParen, "("),
            (TokenKind::Ident, "x"),
            (TokenKind::Comma, ","),
            (TokenKind::Ident, "y"),
            (TokenKind::RParen, ")"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Ident, "x"),
            (TokenKind::Plus, "+"),
            (TokenKind::Ident, "y"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "r"),
            (TokenKind::Assign, "="),
            (TokenKind::Ident, "add"),
            (TokenKind::LParen, "("),
            (TokenKind::Int, "5"),
            (TokenKind::Comma, ","),
            (TokenKind::Int, "10"),
            (TokenKind::RParen, ")"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::If, "if"),
            (TokenKind::LParen, "("),
            (TokenKind::Int, "5"),
            (TokenKind::Lt, "<"),
            (TokenKind::Int, "10"),
            (TokenKind::RParen, ")"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::True, "true"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Else, "else"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Return, "return"),
            (TokenKind::False, "false"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Int, "10"),
            (TokenKind::Eq, "=="),
            (TokenKind::Int, "10"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Int, "10"),
            (TokenKind::NotEq, "!="),
            (TokenKind::Int, "9"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::LBracket, "["),
            (TokenKind::Int, "1"),
            (TokenKind::Comma, ","),
            (TokenKind::Int, "2"),
            (TokenKind::RBracket, "]"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Str, "foo"),
            (TokenKind::Colon, ":"),
            (TokenKind::Str, "bar"),
            (TokenKind::RBrace, "}"),
        ];

        let mut lexer = Lexer::new(source);
        for (i, (kind, literal)) in expected.into_iter().enumerate() {
            let tok = lexer.next_token();
            assert_eq!(tok.kind, kind, "token {i}");
            assert_eq!(tok.literal, literal, "token {i}");
        }
        assert!(lexer.next_token().is(TokenKind::Eof));
    }

    #[test]
    fn test_heap_literal_tokens() {
        assert_eq!(
            kinds("maxheap<int>{3, 1}"),
            vec![
                TokenKind::MaxHeap,
                TokenKind::Lt,
                TokenKind::Ident,
                TokenKind::Gt,
                TokenKind::LBrace,
                TokenKind::Int,
                TokenKind::Comma,
                TokenKind::Int,
                TokenKind::RBrace,
            ]
        );
    }
}
