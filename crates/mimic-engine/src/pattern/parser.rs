//! Text syntax for call patterns.
//!
//! ```text
//! pattern := ident '(' args? ')'        method call
//!          | ident                      property read
//!          | ident '=' arg              property write
//!          | arg                        anything else (rejected by extraction)
//! arg     := null | true | false | number | "string"
//!          | '[' args? ']'
//!          | ident ('<' type (',' type)* '>')? '(' args? ')'
//!          | ident ('.' ident)*         enum member or variable
//! ```
//!
//! Member names resolve through a `MemberTable`; any other call inside an
//! argument becomes a `MatcherCall` and is judged by the extractor.

use super::expr::PatternExpr;
use super::table::MemberTable;
use crate::member::Accessor;
use crate::value::{TypeTag, Value};

/// Syntax or name-resolution failure, with the byte offset it occurred at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Comma,
    Eq,
    Dot,
    End,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{name}'"),
            Token::Int(i) => format!("number {i}"),
            Token::Float(x) => format!("number {x}"),
            Token::Str(s) => format!("string {s:?}"),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::End => "end of input".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                pos += 1;
                continue;
            }
            b'(' => tokens.push((Token::LParen, start)),
            b')' => tokens.push((Token::RParen, start)),
            b'[' => tokens.push((Token::LBracket, start)),
            b']' => tokens.push((Token::RBracket, start)),
            b'<' => tokens.push((Token::Lt, start)),
            b'>' => tokens.push((Token::Gt, start)),
            b',' => tokens.push((Token::Comma, start)),
            b'=' => tokens.push((Token::Eq, start)),
            b'.' => tokens.push((Token::Dot, start)),
            b'"' => {
                let (text, end) = lex_string(input, start)?;
                tokens.push((Token::Str(text), start));
                pos = end;
                continue;
            }
            b'-' | b'0'..=b'9' => {
                let (token, end) = lex_number(input, start)?;
                tokens.push((token, start));
                pos = end;
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let mut end = start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                {
                    end += 1;
                }
                tokens.push((Token::Ident(input[start..end].to_string()), start));
                pos = end;
                continue;
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(ParseError::new(start, format!("unexpected character '{ch}'")));
            }
        }
        pos += 1;
    }

    tokens.push((Token::End, input.len()));
    Ok(tokens)
}

fn lex_string(input: &str, start: usize) -> Result<(String, usize), ParseError> {
    let mut text = String::new();
    let mut chars = input[start + 1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((text, start + 1 + i + 1)),
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, other)) => text.push(other),
                None => break,
            },
            other => text.push(other),
        }
    }
    Err(ParseError::new(start, "unterminated string literal"))
}

fn lex_number(input: &str, start: usize) -> Result<(Token, usize), ParseError> {
    let bytes = input.as_bytes();
    let mut end = start;
    if bytes[end] == b'-' {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return Err(ParseError::new(start, "expected digits after '-'"));
    }

    let mut is_float = false;
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        is_float = true;
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'-' || bytes[exp] == b'+') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            is_float = true;
            end = exp;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
    }

    let text = &input[start..end];
    let token = if is_float {
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|e| ParseError::new(start, format!("invalid number '{text}': {e}")))?
    } else {
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|e| ParseError::new(start, format!("invalid number '{text}': {e}")))?
    };
    Ok((token, end))
}

/// Deepest nesting of argument lists and arrays a pattern may use.
const MAX_NESTING: usize = 64;

struct Parser<'a> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    /// Argument lists currently open
    depth: usize,
    table: &'a MemberTable,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].0
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].1
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if *self.peek() == expected {
            self.bump();
            Ok(())
        } else {
            Err(ParseError::new(
                self.offset(),
                format!(
                    "expected {}, found {}",
                    expected.describe(),
                    self.peek().describe()
                ),
            ))
        }
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        let offset = self.offset();
        match self.bump() {
            Token::Ident(name) => Ok(name),
            other => Err(ParseError::new(
                offset,
                format!("expected identifier, found {}", other.describe()),
            )),
        }
    }

    fn parse_root(&mut self) -> Result<PatternExpr, ParseError> {
        let expr = match (self.peek().clone(), self.peek_at(1).clone()) {
            (Token::Ident(name), Token::LParen) if !is_keyword(&name) => {
                let offset = self.offset();
                self.bump();
                self.bump();
                let args = self.parse_list(Token::RParen)?;
                let member = self
                    .table
                    .resolve_method(&name, args.len())
                    .map_err(|msg| ParseError::new(offset, msg))?
                    .clone();
                PatternExpr::Call { member, args }
            }
            (Token::Ident(name), Token::Eq) => {
                let offset = self.offset();
                self.bump();
                self.bump();
                let value = self.parse_arg()?;
                let member = self.property(&name, Accessor::Set, offset)?;
                PatternExpr::MemberAccess {
                    member,
                    value: Some(Box::new(value)),
                }
            }
            (Token::Ident(name), Token::End) if !is_keyword(&name) => {
                let offset = self.offset();
                self.bump();
                let member = self.property(&name, Accessor::Get, offset)?;
                PatternExpr::MemberAccess {
                    member,
                    value: None,
                }
            }
            _ => self.parse_arg()?,
        };
        self.expect(Token::End)?;
        Ok(expr)
    }

    fn property(
        &self,
        name: &str,
        accessor: Accessor,
        offset: usize,
    ) -> Result<crate::member::MemberKey, ParseError> {
        self.table
            .resolve_property(name, accessor)
            .cloned()
            .ok_or_else(|| ParseError::new(offset, format!("unknown property '{name}'")))
    }

    /// Comma-separated args up to `close`; the opening token is consumed.
    fn parse_list(&mut self, close: Token) -> Result<Vec<PatternExpr>, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(
                self.offset(),
                format!("pattern nests deeper than {MAX_NESTING} levels"),
            ));
        }
        self.depth += 1;
        let items = self.parse_items(close);
        self.depth -= 1;
        items
    }

    fn parse_items(&mut self, close: Token) -> Result<Vec<PatternExpr>, ParseError> {
        let mut items = Vec::new();
        if *self.peek() == close {
            self.bump();
            return Ok(items);
        }
        loop {
            items.push(self.parse_arg()?);
            if *self.peek() == Token::Comma {
                self.bump();
            } else {
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn parse_arg(&mut self) -> Result<PatternExpr, ParseError> {
        let offset = self.offset();
        match self.bump() {
            Token::Int(i) => Ok(PatternExpr::Literal(Value::Int(i))),
            Token::Float(x) => Ok(PatternExpr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(PatternExpr::Literal(Value::Str(s))),
            Token::LBracket => Ok(PatternExpr::Array(self.parse_list(Token::RBracket)?)),
            Token::Ident(name) => match name.as_str() {
                "null" => Ok(PatternExpr::Literal(Value::Null)),
                "true" => Ok(PatternExpr::Literal(Value::Bool(true))),
                "false" => Ok(PatternExpr::Literal(Value::Bool(false))),
                _ => self.parse_named(name),
            },
            other => Err(ParseError::new(
                offset,
                format!("expected an argument, found {}", other.describe()),
            )),
        }
    }

    fn parse_named(&mut self, name: String) -> Result<PatternExpr, ParseError> {
        match self.peek() {
            Token::Lt => {
                self.bump();
                let mut type_args = Vec::new();
                loop {
                    type_args.push(self.parse_type()?);
                    if *self.peek() == Token::Comma {
                        self.bump();
                    } else {
                        self.expect(Token::Gt)?;
                        break;
                    }
                }
                self.expect(Token::LParen)?;
                let args = self.parse_list(Token::RParen)?;
                Ok(PatternExpr::MatcherCall {
                    name,
                    type_args,
                    args,
                })
            }
            Token::LParen => {
                self.bump();
                let args = self.parse_list(Token::RParen)?;
                Ok(PatternExpr::MatcherCall {
                    name,
                    type_args: Vec::new(),
                    args,
                })
            }
            Token::Dot => {
                let mut path = vec![name];
                while *self.peek() == Token::Dot {
                    self.bump();
                    path.push(self.ident()?);
                }
                if let [ty, member] = path.as_slice() {
                    if let Some(value) = self.table.enum_constant(ty, member) {
                        return Ok(PatternExpr::Constant {
                            path: path.join("."),
                            value,
                        });
                    }
                }
                Ok(PatternExpr::Capture(path.join(".")))
            }
            _ => Ok(PatternExpr::Capture(name)),
        }
    }

    fn parse_type(&mut self) -> Result<TypeTag, ParseError> {
        let offset = self.offset();
        let mut name = self.ident()?;
        while *self.peek() == Token::Dot {
            self.bump();
            name.push('.');
            name.push_str(&self.ident()?);
        }
        self.table
            .resolve_type(&name)
            .map_err(|msg| ParseError::new(offset, msg))
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(name, "null" | "true" | "false")
}

/// Parse `text` into a call pattern, resolving names through `table`.
pub fn parse_pattern(text: &str, table: &MemberTable) -> Result<PatternExpr, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        table,
    };
    parser.parse_root()
}
