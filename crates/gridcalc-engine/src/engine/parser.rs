//! Recursive-descent formula parser.
//!
//! Grammar, lowest precedence first (each level left-associative):
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := primary (('*' | '/') primary)*
//! primary    := number | call | range | ref | '(' expression ')'
//! call       := NAME '(' (ref | ref ':' ref) ')'
//! ```
//!
//! There is no separate tokenizer; the parser walks the bytes directly and
//! skips whitespace between tokens. Cell references are validated against
//! the grid bounds at parse time.

use thiserror::Error;

use super::ast::{BinaryOperator, Expr, Function};
use super::cell::FORMULA_PREFIX;
use super::cell_ref::{CellRef, GridSize};

/// A formula that could not be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the trimmed formula body where parsing stopped.
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> ParseError {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Parse formula text (including the leading `=`) into an expression tree.
pub fn parse_formula(text: &str, size: GridSize) -> ParseResult<Expr> {
    let Some(body) = text.strip_prefix(FORMULA_PREFIX) else {
        return Err(ParseError::new("Formula must start with =", 0));
    };

    let mut parser = Parser::new(body.trim(), size);
    let expr = parser.parse_expression()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error("Unexpected characters after expression"));
    }
    Ok(expr)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    size: GridSize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, size: GridSize) -> Self {
        Parser { input, pos: 0, size }
    }

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some(b @ (b'+' | b'-')) => BinaryOperator::from_byte(b),
                _ => None,
            };
            let Some(op) = op else { break };
            self.pos += 1;
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some(b @ (b'*' | b'/')) => BinaryOperator::from_byte(b),
                _ => None,
            };
            let Some(op) = op else { break };
            self.pos += 1;
            let right = self.parse_primary()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        self.skip_whitespace();
        match self.peek() {
            Some(b) if b.is_ascii_digit() => self.parse_number(),
            Some(b) if b.is_ascii_alphabetic() => {
                let token = self.parse_token();
                self.skip_whitespace();
                match self.peek() {
                    Some(b'(') => self.parse_call(token),
                    Some(b':') => {
                        self.pos += 1;
                        self.parse_range_end(token)
                    }
                    _ => self.cell_ref(token).map(Expr::CellRef),
                }
            }
            Some(b'(') => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                self.skip_whitespace();
                if self.peek() != Some(b')') {
                    return Err(self.error("Missing closing parenthesis"));
                }
                self.pos += 1;
                Ok(expr)
            }
            _ => Err(self.error("Unexpected character")),
        }
    }

    /// Digits with at most one decimal point.
    fn parse_number(&mut self) -> ParseResult<Expr> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.pos += 1;
            } else if b == b'.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        self.input[start..self.pos]
            .parse::<f64>()
            .map(Expr::Number)
            .map_err(|_| ParseError::new("Invalid number", start))
    }

    fn parse_call(&mut self, name: &str) -> ParseResult<Expr> {
        let Some(function) = Function::lookup(name) else {
            return Err(self.error(format!("Unknown function: {}", name)));
        };
        self.pos += 1; // '('
        self.skip_whitespace();

        let arg = self.parse_range_arg()?;

        self.skip_whitespace();
        if self.peek() != Some(b')') {
            return Err(self.error("Missing closing parenthesis in function"));
        }
        self.pos += 1;

        Ok(Expr::Call {
            function,
            args: vec![arg],
        })
    }

    /// A function argument: a single reference or `REF ':' REF`.
    fn parse_range_arg(&mut self) -> ParseResult<Expr> {
        let start = self.parse_token();
        self.skip_whitespace();
        if self.peek() == Some(b':') {
            self.pos += 1;
            return self.parse_range_end(start);
        }
        self.cell_ref(start).map(Expr::CellRef)
    }

    /// Finish a range whose start token and ':' are already consumed.
    fn parse_range_end(&mut self, start: &str) -> ParseResult<Expr> {
        self.skip_whitespace();
        let end = self.parse_token();
        match (CellRef::parse(start, self.size), CellRef::parse(end, self.size)) {
            (Some(start), Some(end)) => Ok(Expr::Range { start, end }),
            _ => Err(self.error("Invalid range")),
        }
    }

    fn cell_ref(&self, token: &str) -> ParseResult<CellRef> {
        CellRef::parse(token, self.size)
            .ok_or_else(|| self.error(format!("Invalid cell reference: {}", token)))
    }

    /// Consume a run of ASCII letters and digits.
    fn parse_token(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        &input[start..self.pos]
    }

    /// Skip Unicode whitespace, matching what `str::trim` strips from the ends.
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self
            .input
            .get(self.pos..)
            .and_then(|rest| rest.chars().next())
            .filter(|ch| ch.is_whitespace())
        {
            self.pos += ch.len_utf8();
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.pos)
    }
}
