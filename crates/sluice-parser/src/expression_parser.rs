//! Expression parser
//!
//! Parses rule conditions and actions into Expression AST nodes.
//!
//! Supported syntax:
//! - Message fields: `$message.source`, `$message.http_status`
//! - Variables bound by `let`: `lvl`
//! - Literals: `42`, `3.14`, `"string"`, `'string'`, `true`, `false`, `null`
//! - Array literals: `["a", "b"]`
//! - Binary operators: `>`, `<`, `>=`, `<=`, `==`, `!=`, `+`, `-`, `*`, `/`, `%`, `&&`, `||`
//! - Keyword operators: `and`, `or`, `not`
//! - Unary operators: `!`, `-`
//! - Function calls: `has_field("source")`, `route_to_stream("errors")`
//! - Parentheses for grouping: `(a + b) * c`
//! - Statements: `let name = <expr>` or a bare expression

use crate::error::{ParseError, Result};
use sluice_core::ast::{Expression, Operator, Statement, UnaryOperator};
use sluice_core::Value;

const MESSAGE_PREFIX: &str = "$message";

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    MessageRef,
    Op(&'static str),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    offset: usize,
}

/// Expression parser
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parse an expression from a string
    pub fn parse(input: &str) -> Result<Expression> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(ParseError::InvalidExpression {
                offset: 0,
                message: "empty expression".to_string(),
            });
        }

        let mut cursor = Cursor::new(input, tokens);
        let expr = cursor.parse_or()?;
        cursor.expect_end()?;
        Ok(expr)
    }

    /// Parse a single action: `let name = <expr>` or an expression
    pub fn parse_statement(input: &str) -> Result<Statement> {
        let trimmed = input.trim_start();
        let lead = input.len() - trimmed.len();

        if let Some(rest) = trimmed.strip_prefix("let") {
            if rest.starts_with(char::is_whitespace) {
                let (name, value) = rest.split_once('=').ok_or_else(|| {
                    ParseError::InvalidExpression {
                        offset: lead,
                        message: "expected '=' in let statement".to_string(),
                    }
                })?;
                let name = name.trim();
                if !is_identifier(name) || is_keyword(name) {
                    return Err(ParseError::InvalidExpression {
                        offset: lead + 3,
                        message: format!("invalid variable name '{}'", name),
                    });
                }
                return Ok(Statement::assign(name, Self::parse(value)?));
            }
        }

        Ok(Statement::expression(Self::parse(input)?))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_keyword(s: &str) -> bool {
    matches!(s, "and" | "or" | "not" | "true" | "false" | "null" | "let")
}

fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let token = match c {
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            '[' => {
                i += 1;
                Token::LBracket
            }
            ']' => {
                i += 1;
                Token::RBracket
            }
            ',' => {
                i += 1;
                Token::Comma
            }
            '.' if !bytes.get(i + 1).map_or(false, u8::is_ascii_digit) => {
                i += 1;
                Token::Dot
            }
            '"' | '\'' => {
                let (s, next) = read_string(input, i)?;
                i = next;
                Token::Str(s)
            }
            '$' => {
                let end = scan_word(bytes, i + 1);
                if &input[i..end] != MESSAGE_PREFIX {
                    return Err(ParseError::InvalidExpression {
                        offset: start,
                        message: format!("unknown reference '{}'", &input[i..end]),
                    });
                }
                i = end;
                Token::MessageRef
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = i;
                while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
                    end += 1;
                }
                let text = &input[i..end];
                let n = text.parse::<f64>().map_err(|_| ParseError::InvalidExpression {
                    offset: start,
                    message: format!("invalid number '{}'", text),
                })?;
                i = end;
                Token::Number(n)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let end = scan_word(bytes, i);
                let word = &input[i..end];
                i = end;
                match word {
                    "and" => Token::Op("&&"),
                    "or" => Token::Op("||"),
                    "not" => Token::Op("!"),
                    _ => Token::Ident(word.to_string()),
                }
            }
            _ => {
                let op = ["==", "!=", ">=", "<=", "&&", "||", ">", "<", "+", "-", "*", "/", "%", "!"]
                    .into_iter()
                    .find(|op| input[i..].starts_with(op))
                    .ok_or_else(|| ParseError::InvalidExpression {
                        offset: start,
                        message: format!("unexpected character '{}'", c),
                    })?;
                i += op.len();
                Token::Op(op)
            }
        };

        tokens.push(Spanned {
            token,
            offset: start,
        });
    }

    Ok(tokens)
}

fn scan_word(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    i
}

/// Read a quoted string starting at `start`; returns the unescaped text and
/// the offset just past the closing quote.
fn read_string(input: &str, start: usize) -> Result<(String, usize)> {
    let mut chars = input[start..].char_indices();
    let quote = match chars.next() {
        Some((_, q)) => q,
        None => return Err(ParseError::UnexpectedEnd("string literal".to_string())),
    };

    let mut out = String::new();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, escaped)) => out.push(escaped),
                None => break,
            },
            c if c == quote => return Ok((out, start + idx + c.len_utf8())),
            c => out.push(c),
        }
    }

    Err(ParseError::UnexpectedEnd(format!(
        "unterminated string starting at offset {}",
        start
    )))
}

struct Cursor<'a> {
    input: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str, tokens: Vec<Spanned>) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.offset)
            .unwrap_or(self.input.len())
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        self.pos += 1;
        token
    }

    fn eat_op(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<()> {
        match self.peek() {
            Some(t) if t == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.error(format!("expected {}", what))),
            None => Err(ParseError::UnexpectedEnd(format!("expected {}", what))),
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error("unexpected trailing input".to_string())),
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError::InvalidExpression {
            offset: self.offset(),
            message,
        }
    }

    fn binary_level(
        &mut self,
        ops: &[&'static str],
        next: fn(&mut Self) -> Result<Expression>,
    ) -> Result<Expression> {
        let mut left = next(self)?;
        while let Some(op) = self.eat_op(ops) {
            let right = next(self)?;
            left = Expression::binary(left, to_operator(op), right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expression> {
        self.binary_level(&["||"], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        self.binary_level(&["&&"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        self.binary_level(&["==", "!="], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        self.binary_level(&[">", ">=", "<", "<="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        self.binary_level(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        self.binary_level(&["*", "/", "%"], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        if self.eat_op(&["!"]).is_some() {
            let operand = self.parse_unary()?;
            return Ok(Expression::unary(UnaryOperator::Not, operand));
        }
        if self.eat_op(&["-"]).is_some() {
            let operand = self.parse_unary()?;
            // -3 is a literal, not a negation node
            if let Expression::Literal(Value::Number(n)) = operand {
                return Ok(Expression::literal(-n));
            }
            return Ok(Expression::unary(UnaryOperator::Negate, operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let offset = self.offset();
        let token = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEnd("expected an operand".to_string()))?;

        match token {
            Token::Number(n) => Ok(Expression::literal(n)),
            Token::Str(s) => Ok(Expression::literal(s)),
            Token::LParen => {
                let inner = self.parse_or()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::LBracket => {
                let items = self.parse_list(Token::RBracket, "']'")?;
                Ok(Expression::Array(items))
            }
            Token::MessageRef => {
                self.expect(&Token::Dot, "'.' after $message")?;
                match self.advance() {
                    Some(Token::Ident(field)) => Ok(Expression::message_field(field)),
                    Some(_) => Err(ParseError::InvalidExpression {
                        offset: self.tokens[self.pos - 1].offset,
                        message: "expected a field name after $message.".to_string(),
                    }),
                    None => Err(ParseError::UnexpectedEnd(
                        "expected a field name after $message.".to_string(),
                    )),
                }
            }
            Token::Ident(word) => match word.as_str() {
                "true" => Ok(Expression::literal(true)),
                "false" => Ok(Expression::literal(false)),
                "null" => Ok(Expression::Literal(Value::Null)),
                _ if self.peek() == Some(&Token::LParen) => {
                    self.pos += 1;
                    let args = self.parse_list(Token::RParen, "')'")?;
                    Ok(Expression::function_call(word, args))
                }
                _ => Ok(Expression::variable(word)),
            },
            other => Err(ParseError::InvalidExpression {
                offset,
                message: format!("unexpected token {:?}", other),
            }),
        }
    }

    /// Comma-separated expressions up to and including `close`
    fn parse_list(&mut self, close: Token, what: &str) -> Result<Vec<Expression>> {
        let mut items = Vec::new();
        if self.peek() == Some(&close) {
            self.pos += 1;
            return Ok(items);
        }
        loop {
            items.push(self.parse_or()?);
            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                continue;
            }
            self.expect(&close, what)?;
            return Ok(items);
        }
    }
}

fn to_operator(op: &str) -> Operator {
    match op {
        "==" => Operator::Eq,
        "!=" => Operator::Ne,
        ">" => Operator::Gt,
        ">=" => Operator::Ge,
        "<" => Operator::Lt,
        "<=" => Operator::Le,
        "+" => Operator::Add,
        "-" => Operator::Sub,
        "*" => Operator::Mul,
        "/" => Operator::Div,
        "%" => Operator::Mod,
        "&&" => Operator::And,
        _ => Operator::Or,
    }
}
