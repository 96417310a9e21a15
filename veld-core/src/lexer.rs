//! Lexer for Veld source text.
//!
//! Tokens are produced on demand from a [`Reader`]. The lexer is a pure
//! function of reader state: it never looks back, and the only two-character
//! sequence it recognizes is `==`. Invalid bytes become `Invalid` tokens
//! carrying the location of the first offending byte; the parser is the one
//! that turns those into diagnostics.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::location::Location;
use crate::reader::Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Fn,
    Var,
    Val,
    If,
    Else,
    Elif,
}

impl Keyword {
    fn from_identifier(text: &str) -> Option<Keyword> {
        match text {
            "fn" => Some(Keyword::Fn),
            "var" => Some(Keyword::Var),
            "val" => Some(Keyword::Val),
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "elif" => Some(Keyword::Elif),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Fn => "fn",
            Keyword::Var => "var",
            Keyword::Val => "val",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Elif => "elif",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    LParen,
    RParen,
    LSquare,
    RSquare,
    LCurly,
    RCurly,
    Comma,
    Dash,
    Plus,
    Star,
    Slash,
    Equal,
    Compare,
    Colon,
    Semicolon,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::LParen => "(",
            Operator::RParen => ")",
            Operator::LSquare => "[",
            Operator::RSquare => "]",
            Operator::LCurly => "{",
            Operator::RCurly => "}",
            Operator::Comma => ",",
            Operator::Dash => "-",
            Operator::Plus => "+",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Equal => "=",
            Operator::Compare => "==",
            Operator::Colon => ":",
            Operator::Semicolon => ";",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token payloads.
///
/// `Str`, `Character` and `Float` are part of the token model but are never
/// produced by the current lexer; they are reserved for literals the
/// language does not lex yet.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Invalid,
    Eof,
    Keyword(Keyword),
    Identifier(String),
    Str(String),
    Operator(Operator),
    Character,
    Integer(i64),
    Float,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Location,
}

impl Token {
    pub fn new(kind: TokenKind, loc: Location) -> Token {
        Token { kind, loc }
    }

    pub fn invalid(&self) -> bool {
        matches!(self.kind, TokenKind::Invalid)
    }

    pub fn eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self.kind, TokenKind::Keyword(k) if k == kw)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier(_))
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.kind, TokenKind::Integer(_))
    }

    pub fn integer(&self) -> Option<i64> {
        match self.kind {
            TokenKind::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        matches!(self.kind, TokenKind::Operator(o) if o == op)
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            TokenKind::Operator(o) => Some(o),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    /// S-expression rendering consumed by the snapshot harness:
    /// `(KIND payload LINE:COL)`, with the payload omitted for kinds that
    /// carry none.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Invalid => write!(f, "(invalid {})", self.loc),
            TokenKind::Eof => write!(f, "(eof {})", self.loc),
            TokenKind::Keyword(kw) => write!(f, "(keyword {} {})", kw, self.loc),
            TokenKind::Identifier(name) => write!(f, "(id {} {})", name, self.loc),
            TokenKind::Str(text) => write!(f, "(str {} {})", text, self.loc),
            TokenKind::Operator(op) => write!(f, "(op {} {})", op, self.loc),
            TokenKind::Character => write!(f, "(char {})", self.loc),
            TokenKind::Integer(v) => write!(f, "(int {} {})", v, self.loc),
            TokenKind::Float => write!(f, "(float {})", self.loc),
        }
    }
}

/// Anything the parser can pull tokens from.
///
/// The compiler only ships [`Lexer`], but external collaborators (the
/// snapshot harness wraps the lexer to record every token it hands out)
/// provide their own implementations.
pub trait Lex {
    fn lex(&mut self) -> Token;
}

pub struct Lexer<'a> {
    reader: Reader<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(reader: Reader<'a>) -> Lexer<'a> {
        Lexer { reader }
    }

    pub fn from_source(source: &'a str) -> Lexer<'a> {
        Lexer::new(Reader::new(source))
    }

    /// Drain the whole input, ending with the `Eof` token.
    pub fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.lex();
            let done = token.eof();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn gather_identifier(&mut self) -> Token {
        let loc = self.reader.loc();
        let mut buf = String::new();

        while self.reader.good() {
            let c = self.reader.read();
            if c.is_ascii_alphanumeric() || c == b'_' {
                buf.push(c as char);
                self.reader.advance();
            } else if is_token_boundary(c) {
                break;
            } else {
                let bad = self.reader.loc();
                self.reader.advance();
                return Token::new(TokenKind::Invalid, bad);
            }
        }

        match Keyword::from_identifier(&buf) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), loc),
            None => Token::new(TokenKind::Identifier(buf), loc),
        }
    }

    fn gather_integer(&mut self) -> Token {
        let loc = self.reader.loc();
        let mut buf = String::new();

        while self.reader.good() {
            let c = self.reader.read();
            if c.is_ascii_digit() {
                buf.push(c as char);
                self.reader.advance();
            } else if is_token_boundary(c) {
                break;
            } else {
                let bad = self.reader.loc();
                self.reader.advance();
                return Token::new(TokenKind::Invalid, bad);
            }
        }

        match buf.parse::<i64>() {
            Ok(value) => Token::new(TokenKind::Integer(value), loc),
            // Out-of-range literal; the digits have already been consumed.
            Err(_) => Token::new(TokenKind::Invalid, loc),
        }
    }

    fn lex_operator(&mut self, loc: Location) -> Token {
        let c = self.reader.read();
        self.reader.advance();

        let op = match c {
            b'(' => Operator::LParen,
            b')' => Operator::RParen,
            b'[' => Operator::LSquare,
            b']' => Operator::RSquare,
            b'{' => Operator::LCurly,
            b'}' => Operator::RCurly,
            b',' => Operator::Comma,
            b'+' => Operator::Plus,
            b'-' => Operator::Dash,
            b'*' => Operator::Star,
            b'/' => Operator::Slash,
            b':' => Operator::Colon,
            b';' => Operator::Semicolon,
            b'=' => {
                if self.reader.good() && self.reader.read() == b'=' {
                    self.reader.advance();
                    Operator::Compare
                } else {
                    Operator::Equal
                }
            }
            _ => return Token::new(TokenKind::Invalid, loc),
        };

        Token::new(TokenKind::Operator(op), loc)
    }
}

impl Lex for Lexer<'_> {
    fn lex(&mut self) -> Token {
        loop {
            if !self.reader.good() && !self.reader.require_line() {
                return Token::new(TokenKind::Eof, self.reader.loc());
            }

            let loc = self.reader.loc();
            match self.reader.read() {
                b' ' | b'\t' | b'\r' => self.reader.advance(),
                b'A'..=b'Z' | b'a'..=b'z' | b'_' => return self.gather_identifier(),
                b'0'..=b'9' => return self.gather_integer(),
                b'+' | b'-' | b'*' | b'/' | b'(' | b')' | b'{' | b'}' | b'[' | b']' | b','
                | b':' | b';' | b'=' => return self.lex_operator(loc),
                _ => {
                    self.reader.advance();
                    return Token::new(TokenKind::Invalid, loc);
                }
            }
        }
    }
}

fn is_token_boundary(c: u8) -> bool {
    (b' '..0x7f).contains(&c) || c == b'\t' || c == b'\r'
}
