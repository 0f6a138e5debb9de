//! Strict literal evaluator for dynamic attribute values.
//!
//! Parses numbers, booleans, null, quoted strings, lists, tuples, sets and
//! mappings into [`serde_json::Value`]. Nothing is ever executed: names other
//! than the boolean and null keywords are rejected, as are operators and
//! calls. Tuples and sets become arrays; mapping keys that are not strings
//! are stored under their literal text.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Why a string is not a literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a literal at offset {offset}: {message}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Parse `input` as a literal value.
///
/// Leading and trailing whitespace is ignored. The whole input must form a
/// single literal.
///
/// ```
/// use cotton::templating::parse_literal;
/// use serde_json::json;
///
/// assert_eq!(parse_literal("42").unwrap(), json!(42));
/// assert_eq!(parse_literal("[1, 'two', None]").unwrap(), json!([1, "two", null]));
/// assert!(parse_literal("open()").is_err());
/// ```
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut parser = LiteralParser {
        src: input,
        pos: 0,
    };
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
}

impl LiteralParser<'_> {
    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            None => Err(self.error("expected a value")),
            Some('\'' | '"') => self.string().map(Value::String),
            Some('[') => {
                self.bump();
                self.sequence(']').map(Value::Array)
            }
            Some('(') => self.tuple(),
            Some('{') => self.mapping_or_set(),
            Some(c) if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            name => {
                self.pos = start;
                Err(self.error(format!("names are not literals: '{name}'")))
            }
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };

        let radix = match self.rest().get(..2) {
            Some("0x" | "0X") => Some(16),
            Some("0o" | "0O") => Some(8),
            Some("0b" | "0B") => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            self.pos += 2;
            let digits = self.digits(|c| c.is_digit(radix));
            let parsed = i64::from_str_radix(&digits, radix)
                .map_err(|_| self.error("invalid integer literal"))?;
            return Ok(Value::from(if negative { -parsed } else { parsed }));
        }

        let mut text = String::new();
        if negative {
            text.push('-');
        }
        text.push_str(&self.digits(|c| c.is_ascii_digit()));
        let mut is_float = false;
        if self.eat('.') {
            is_float = true;
            text.push('.');
            text.push_str(&self.digits(|c| c.is_ascii_digit()));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.bump();
            text.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.bump();
                text.push(sign);
            }
            let exponent = self.digits(|c| c.is_ascii_digit());
            if exponent.is_empty() {
                return Err(self.error("missing exponent digits"));
            }
            text.push_str(&exponent);
        }

        if !text.chars().any(|c| c.is_ascii_digit()) {
            self.pos = start;
            return Err(self.error("expected a number"));
        }

        if is_float {
            let parsed: f64 = text.parse().map_err(|_| self.error("invalid float literal"))?;
            return Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| self.error("float literal is not finite"));
        }
        if let Ok(parsed) = text.parse::<i64>() {
            return Ok(Value::from(parsed));
        }
        text.parse::<u64>().map(Value::from).map_err(|_| self.error("integer literal out of range"))
    }

    /// Digits matching `accept`, allowing single `_` separators between them.
    fn digits(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if accept(c) {
                out.push(c);
                self.bump();
            } else if c == '_'
                && !out.is_empty()
                && self.rest()[1..].chars().next().is_some_and(&accept)
            {
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let quote = self.bump().ok_or_else(|| self.error("expected a string"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape"));
        };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' | '\'' | '"' => out.push(c),
            '\n' => {}
            'x' => out.push(self.hex_char(2)?),
            'u' => out.push(self.hex_char(4)?),
            other => {
                // Unknown escapes are kept verbatim.
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_char(&mut self, len: usize) -> Result<char, LiteralError> {
        let digits = self.rest().get(..len).ok_or_else(|| self.error("truncated escape"))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid hex escape"))?;
        let c = char::from_u32(code).ok_or_else(|| self.error("invalid character escape"))?;
        self.pos += len;
        Ok(c)
    }

    /// Comma separated values up to `close`; the opening bracket is consumed.
    fn sequence(&mut self, close: char) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            if !self.eat(',') {
                return Err(self.error(format!("expected ',' or '{close}'")));
            }
        }
    }

    fn tuple(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        self.skip_ws();
        if self.eat(')') {
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.value()?;
        self.skip_ws();
        if self.eat(')') {
            // A parenthesized value, not a tuple.
            return Ok(first);
        }
        if !self.eat(',') {
            return Err(self.error("expected ',' or ')'"));
        }
        let mut items = vec![first];
        items.extend(self.sequence(')')?);
        Ok(Value::Array(items))
    }

    fn mapping_or_set(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        self.skip_ws();
        if self.eat('}') {
            return Ok(Value::Object(Map::new()));
        }

        let first = self.value()?;
        self.skip_ws();
        if !self.eat(':') {
            let mut items = vec![first];
            if self.eat(',') {
                items.extend(self.sequence('}')?);
            } else if !self.eat('}') {
                return Err(self.error("expected ',', ':' or '}'"));
            }
            return Ok(Value::Array(items));
        }

        let mut map = Map::new();
        let mut key = first;
        loop {
            self.skip_ws();
            let value = self.value()?;
            map.insert(key_text(key), value);
            self.skip_ws();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            if !self.eat(',') {
                return Err(self.error("expected ',' or '}'"));
            }
            self.skip_ws();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            key = self.value()?;
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.error("expected ':'"));
            }
        }
    }
}

fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
