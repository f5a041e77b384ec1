//! Expression reader.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr     := inter ('|' inter)*
//! inter    := join ('&' join)*
//! join     := unary (':' unary)*
//! unary    := '!' unary | primary
//! primary  := 'null' | 'true' | 'false' | number | string
//!           | '[' (expr (',' expr)*)? ']'
//!           | '{' (entry (',' entry)*)? (',' '*')? '}' | '{' '*' '}'
//!           | '*' | 'U' | '∅' | '_' | identifier | '(' expr ')'
//! entry    := (string | identifier) ':' expr
//! ```
//!
//! Bare identifiers outside object keys are variables looked up through a
//! [`Scope`]. Nesting of `!`, parentheses, lists and objects is capped so
//! that hostile input fails with [`ReadError::TooDeep`] instead of
//! exhausting the stack.

use thiserror::Error;

use super::algebra::{self, Budget};
use super::{
    boolean, empty, empty_list, empty_object, float, int, list, null, object, open_object, string,
    uint, universe, wild, EngineError, Handle, DEFAULT_MAX_DEPTH, DEFAULT_NODE_LIMIT,
};

const KEYWORDS: &[&str] = &["null", "true", "false", "U", "_"];

/// Variable bindings visible to the reader.
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<Handle>;
}

/// Errors from reading an expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Malformed input. `pos` is the byte offset where reading stopped.
    #[error("syntax error at offset {pos}: {message}")]
    Syntax { pos: usize, message: String },

    #[error("unbound variable '{0}'")]
    UnboundVariable(String),

    /// More than `limit` levels of nesting.
    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Whether `name` can be bound as a variable: `[A-Za-z_][A-Za-z0-9_]*` and
/// not a keyword.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
}

/// Read an expression with the default node budget and nesting limit.
pub fn parse(expression: &str, scope: Option<&dyn Scope>) -> Result<Handle, ReadError> {
    parse_within(expression, scope, DEFAULT_NODE_LIMIT, DEFAULT_MAX_DEPTH)
}

/// Read an expression, failing if any operator result exceeds `node_limit`
/// nodes or the text nests more than `max_depth` levels.
pub fn parse_within(
    expression: &str,
    scope: Option<&dyn Scope>,
    node_limit: usize,
    max_depth: usize,
) -> Result<Handle, ReadError> {
    let mut reader = Reader {
        src: expression,
        pos: 0,
        scope,
        budget: Budget::new(node_limit),
        depth: 0,
        max_depth,
    };
    let value = reader.expr()?;
    reader.skip_ws();
    if reader.pos < reader.src.len() {
        return Err(reader.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    scope: Option<&'a dyn Scope>,
    budget: Budget,
    depth: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    fn error(&self, message: impl Into<String>) -> ReadError {
        ReadError::Syntax {
            pos: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consume `c` (after whitespace) if it is next.
    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), ReadError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    /// Run `read` one nesting level down.
    fn nested<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, ReadError>,
    ) -> Result<T, ReadError> {
        if self.depth >= self.max_depth {
            return Err(ReadError::TooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = read(self);
        self.depth -= 1;
        result
    }

    fn expr(&mut self) -> Result<Handle, ReadError> {
        let mut acc = self.intersection()?;
        while self.eat('|') {
            let rhs = self.intersection()?;
            acc = algebra::union(&acc, &rhs, &self.budget)?;
        }
        Ok(acc)
    }

    fn intersection(&mut self) -> Result<Handle, ReadError> {
        let mut acc = self.join()?;
        while self.eat('&') {
            let rhs = self.join()?;
            acc = algebra::intersect(&acc, &rhs, &self.budget)?;
        }
        Ok(acc)
    }

    fn join(&mut self) -> Result<Handle, ReadError> {
        let mut acc = self.unary()?;
        while self.eat(':') {
            let rhs = self.unary()?;
            acc = algebra::join(&acc, &rhs, &self.budget)?;
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<Handle, ReadError> {
        if self.eat('!') {
            let inner = self.nested(Self::unary)?;
            return Ok(algebra::complement(&inner));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Handle, ReadError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of expression")),
            Some('(') => {
                self.pos += 1;
                let inner = self.nested(Self::expr)?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('[') => {
                self.pos += 1;
                self.nested(Self::list)
            }
            Some('{') => {
                self.pos += 1;
                self.nested(Self::object)
            }
            Some('"') => Ok(string(&self.quoted()?)),
            Some('*') => {
                self.pos += 1;
                Ok(wild())
            }
            Some('∅') => {
                self.pos += '∅'.len_utf8();
                Ok(empty())
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let name = self.identifier();
                self.word(name)
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    fn word(&self, name: &str) -> Result<Handle, ReadError> {
        match name {
            "null" => Ok(null()),
            "true" => Ok(boolean(true)),
            "false" => Ok(boolean(false)),
            "U" => Ok(universe()),
            "_" => Ok(empty()),
            _ => self
                .scope
                .and_then(|scope| scope.lookup(name))
                .ok_or_else(|| ReadError::UnboundVariable(name.to_owned())),
        }
    }

    fn identifier(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn list(&mut self) -> Result<Handle, ReadError> {
        if self.eat(']') {
            return Ok(empty_list());
        }
        let mut items = Vec::new();
        loop {
            items.push(self.expr()?);
            if !self.eat(',') {
                break;
            }
        }
        self.expect(']')?;
        Ok(list(items))
    }

    fn object(&mut self) -> Result<Handle, ReadError> {
        if self.eat('}') {
            return Ok(empty_object());
        }
        let mut fields = Vec::new();
        let mut open = false;
        loop {
            if self.eat('*') {
                open = true;
                break;
            }
            self.skip_ws();
            let key = match self.peek() {
                Some('"') => self.quoted()?,
                Some(c) if c.is_ascii_alphabetic() || c == '_' => self.identifier().to_owned(),
                _ => return Err(self.error("expected object key")),
            };
            self.expect(':')?;
            fields.push((key, self.expr()?));
            if !self.eat(',') {
                break;
            }
        }
        self.expect('}')?;
        Ok(if open {
            open_object(fields)
        } else {
            object(fields)
        })
    }

    /// Read a double-quoted string literal with JSON escapes.
    fn quoted(&mut self) -> Result<String, ReadError> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut i = start + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    let literal = &self.src[start..=i];
                    let value = serde_json::from_str::<String>(literal)
                        .map_err(|e| self.error(format!("invalid string literal: {e}")))?;
                    self.pos = i + 1;
                    return Ok(value);
                }
                _ => i += 1,
            }
        }
        Err(self.error("unterminated string literal"))
    }

    fn number(&mut self) -> Result<Handle, ReadError> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut len = 0;
        let mut integral = true;
        if bytes.first() == Some(&b'-') {
            len += 1;
        }
        let digits_start = len;
        while len < bytes.len() && bytes[len].is_ascii_digit() {
            len += 1;
        }
        if len == digits_start {
            return Err(self.error("expected digits"));
        }
        if bytes.get(len) == Some(&b'.') {
            integral = false;
            len += 1;
            while len < bytes.len() && bytes[len].is_ascii_digit() {
                len += 1;
            }
        }
        if matches!(bytes.get(len), Some(b'e' | b'E')) {
            integral = false;
            len += 1;
            if matches!(bytes.get(len), Some(b'+' | b'-')) {
                len += 1;
            }
            while len < bytes.len() && bytes[len].is_ascii_digit() {
                len += 1;
            }
        }
        let text = &rest[..len];
        let value = if integral {
            if let Ok(i) = text.parse::<i64>() {
                int(i)
            } else if let Ok(u) = text.parse::<u64>() {
                uint(u)
            } else {
                self.parse_float(text)?
            }
        } else {
            self.parse_float(text)?
        };
        self.pos += len;
        Ok(value)
    }

    fn parse_float(&self, text: &str) -> Result<Handle, ReadError> {
        text.parse::<f64>()
            .map(float)
            .map_err(|e| self.error(format!("invalid number '{text}': {e}")))
    }
}
