//! Snapshot file decoding
//!
//! Snapshot files are never executed. They are parsed as a sequence of
//! assignment statements whose right-hand sides are literals: fenced
//! template text, quoted strings, numbers, booleans, `null`, arrays and
//! objects (with identifier keys, comments and trailing commas allowed).
//!
//! Decoding happens in two phases. Parsing rejects anything that is not
//! well-formed ([`SnapshotError::Parse`], always fatal). Evaluation then
//! resolves each statement; a statement that is well-formed but cannot be
//! resolved (an assignment to something other than `exports`, or a bare
//! identifier such as `undefined`) is an [`SnapshotError::Evaluation`].

use crate::errors::{Result, SnapshotError};
use crate::value::Snapshots;
use serde_json::{Map, Number, Value};

/// Decode a snapshot file, treating evaluation failures as an empty file
///
/// Syntax errors are returned. A well-formed file that fails to evaluate is
/// logged and yields an empty mapping, so one bad record does not block the
/// other snapshots of a run. Wrapping newlines of text values are removed.
///
/// # Errors
///
/// - `Parse`: the source is not a well-formed snapshot file
pub fn decode_file(source: &str) -> Result<Snapshots> {
    match parse_snapshots(source) {
        Ok(snapshots) => Ok(snapshots),
        Err(err @ SnapshotError::Evaluation { .. }) => {
            tracing::warn!(error = %err, "could not evaluate snapshot file, treating it as empty");
            Ok(Snapshots::new())
        }
        Err(err) => Err(err),
    }
}

/// Decode a snapshot file strictly
///
/// Like [`decode_file`] but evaluation failures are returned as errors.
///
/// # Errors
///
/// - `Parse`: the source is not a well-formed snapshot file
/// - `Evaluation`: a statement could not be resolved
pub fn parse_snapshots(source: &str) -> Result<Snapshots> {
    let statements = Parser::new(source).parse_file()?;
    let mut exports = Snapshots::new();
    for statement in statements {
        let key = statement.export_key()?;
        let value = statement.value.evaluate()?;
        exports.insert(key, value);
    }
    Ok(remove_extra_newlines(exports))
}

/// Strip the newline wrapping added around text values
///
/// A string longer than one character that starts and ends with `\n` loses
/// exactly one newline at each end. Other values are left unchanged.
pub fn remove_extra_newlines(snapshots: Snapshots) -> Snapshots {
    snapshots
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) if s.len() > 1 && s.starts_with('\n') && s.ends_with('\n') => {
                (key, Value::String(s[1..s.len() - 1].to_string()))
            }
            other => (key, other),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    /// Well-formed but not resolvable without running code
    Unresolved { line: usize, what: String },
}

impl Expr {
    fn evaluate(self) -> Result<Value> {
        Ok(match self {
            Expr::Null => Value::Null,
            Expr::Bool(b) => Value::Bool(b),
            Expr::Number(n) => Value::Number(n),
            Expr::Str(s) => Value::String(s),
            Expr::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Expr::evaluate)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Expr::Object(members) => {
                let mut map = Map::new();
                for (name, expr) in members {
                    map.insert(name, expr.evaluate()?);
                }
                Value::Object(map)
            }
            Expr::Unresolved { line, what } => {
                return Err(SnapshotError::Evaluation {
                    line,
                    message: format!("{} is not defined", what),
                })
            }
        })
    }
}

#[derive(Debug)]
struct Assignment {
    line: usize,
    root: String,
    path: Vec<String>,
    value: Expr,
}

impl Assignment {
    fn export_key(&self) -> Result<String> {
        if self.root == "exports" && self.path.len() == 1 {
            return Ok(self.path[0].clone());
        }
        let mut target = self.root.clone();
        for part in &self.path {
            target.push_str(&format!("[{:?}]", part));
        }
        Err(SnapshotError::Evaluation {
            line: self.line,
            message: format!(
                "cannot assign to {}, only exports[<name>] is available",
                target
            ),
        })
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn parse_file(mut self) -> Result<Vec<Assignment>> {
        let mut statements = Vec::new();
        self.skip_trivia()?;
        if self.peek() == Some('\u{feff}') {
            self.bump();
            self.skip_trivia()?;
        }
        while self.peek().is_some() {
            statements.push(self.parse_assignment()?);
            self.skip_trivia()?;
            while self.eat(';') {
                self.skip_trivia()?;
            }
        }
        Ok(statements)
    }

    fn parse_assignment(&mut self) -> Result<Assignment> {
        let line = self.line;
        let root = match self.peek() {
            Some(c) if is_ident_start(c) => self.parse_identifier(),
            Some(c) => return Err(self.error(format!("unexpected character {:?}", c))),
            None => return Err(self.error("unexpected end of input")),
        };

        let mut path = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat('.') {
                self.skip_trivia()?;
                match self.peek() {
                    Some(c) if is_ident_start(c) => path.push(self.parse_identifier()),
                    _ => return Err(self.error("expected property name after '.'")),
                }
            } else if self.eat('[') {
                self.skip_trivia()?;
                let name = match self.peek() {
                    Some(q @ ('\'' | '"')) => self.parse_quoted(q)?,
                    Some(c) if c.is_ascii_digit() => self.parse_number()?.to_string(),
                    _ => return Err(self.error("expected a string or number inside '[ ]'")),
                };
                self.skip_trivia()?;
                self.expect(']')?;
                path.push(name);
            } else {
                break;
            }
        }

        self.expect('=')?;
        if self.peek() == Some('=') {
            return Err(self.error("expected an assignment, found a comparison"));
        }
        self.skip_trivia()?;
        let value = self.parse_value()?;
        Ok(Assignment {
            line,
            root,
            path,
            value,
        })
    }

    fn parse_value(&mut self) -> Result<Expr> {
        match self.peek() {
            Some('`') => self.parse_template(),
            Some(q @ ('\'' | '"')) => Ok(Expr::Str(self.parse_quoted(q)?)),
            Some('[') => self.parse_array(),
            Some('{') => self.parse_object(),
            Some(c) if c == '-' || c.is_ascii_digit() => Ok(Expr::Number(self.parse_number()?)),
            Some(c) if is_ident_start(c) => {
                let line = self.line;
                let ident = self.parse_identifier();
                Ok(match ident.as_str() {
                    "null" => Expr::Null,
                    "true" => Expr::Bool(true),
                    "false" => Expr::Bool(false),
                    _ => Expr::Unresolved { line, what: ident },
                })
            }
            Some(c) => Err(self.error(format!("unexpected character {:?}", c))),
            None => Err(self.error("unexpected end of input, expected a value")),
        }
    }

    fn parse_array(&mut self) -> Result<Expr> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(']') {
                return Ok(Expr::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            if self.eat(']') {
                return Ok(Expr::Array(items));
            }
            self.expect(',')?;
        }
    }

    fn parse_object(&mut self) -> Result<Expr> {
        self.expect('{')?;
        let mut members = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat('}') {
                return Ok(Expr::Object(members));
            }
            let name = match self.peek() {
                Some(q @ ('\'' | '"')) => self.parse_quoted(q)?,
                Some(c) if is_ident_start(c) => self.parse_identifier(),
                Some(c) if c.is_ascii_digit() => self.parse_number()?.to_string(),
                _ => return Err(self.error("expected a property name")),
            };
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            members.push((name, self.parse_value()?));
            self.skip_trivia()?;
            if self.eat('}') {
                return Ok(Expr::Object(members));
            }
            self.expect(',')?;
        }
    }

    fn parse_number(&mut self) -> Result<Number> {
        let start = self.pos;
        self.eat('-');
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(self.error("expected digits"));
        }
        self.eat_digits();
        if self.peek() == Some('.') {
            self.bump();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("expected digits after decimal point"));
            }
            self.eat_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("expected exponent digits"));
            }
            self.eat_digits();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if !text.contains(['.', 'e', 'E']) {
            if let Ok(number) = serde_json::from_str::<Number>(&text) {
                return Ok(number);
            }
        }
        // floats must reload bit for bit
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| self.error(format!("invalid number literal {}", text)))
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn parse_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_continue(c) {
                break;
            }
            ident.push(c);
            self.bump();
        }
        ident
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error("unterminated string literal"))
                }
                Some('\\') => {
                    self.bump();
                    self.parse_escape(&mut out)?;
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.bump();
                }
            }
        }
    }

    fn parse_template(&mut self) -> Result<Expr> {
        let line = self.line;
        self.expect('`')?;
        let mut out = String::new();
        let mut substitution = false;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated template literal")),
                Some('`') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    self.parse_escape(&mut out)?;
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    substitution = true;
                    self.skip_substitution()?;
                }
                Some('\r') => {
                    self.bump();
                    self.eat('\n');
                    out.push('\n');
                }
                Some(c) => {
                    out.push(c);
                    self.bump();
                }
            }
        }
        if substitution {
            return Ok(Expr::Unresolved {
                line,
                what: "template substitution".to_string(),
            });
        }
        Ok(Expr::Str(out))
    }

    fn skip_substitution(&mut self) -> Result<()> {
        self.bump();
        self.bump();
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                None => return Err(self.error("unterminated template substitution")),
                Some('{') => depth += 1,
                Some('}') => depth -= 1,
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Decode one escape sequence; the backslash is already consumed
    fn parse_escape(&mut self, out: &mut String) -> Result<()> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape sequence"))?;
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.peek().is_some_and(|d| d.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.parse_hex(2)?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'u' => {
                let unit = self.parse_unicode_escape()?;
                out.push(self.combine_surrogates(unit)?);
            }
            // line continuation
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                self.eat('\n');
            }
            c if c.is_ascii_digit() => {
                return Err(self.error("octal escape sequences are not allowed"));
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn parse_unicode_escape(&mut self) -> Result<u32> {
        if self.eat('{') {
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let digits: String = self.chars[start..self.pos].iter().collect();
            self.expect('}')?;
            return u32::from_str_radix(&digits, 16)
                .ok()
                .filter(|code| *code <= 0x10FFFF)
                .ok_or_else(|| self.error("invalid unicode code point escape"));
        }
        self.parse_hex(4)
    }

    fn combine_surrogates(&mut self, unit: u32) -> Result<char> {
        if (0xD800..0xDC00).contains(&unit)
            && self.peek() == Some('\\')
            && self.peek_at(1) == Some('u')
        {
            let saved = (self.pos, self.line, self.column);
            self.bump();
            self.bump();
            let low = self.parse_unicode_escape()?;
            if (0xDC00..0xE000).contains(&low) {
                let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            (self.pos, self.line, self.column) = saved;
        }
        Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn parse_hex(&mut self, len: usize) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..len {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid hexadecimal escape sequence"))?;
            code = code * 16 + digit;
            self.bump();
        }
        Ok(code)
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            None => return Err(self.error("unterminated block comment")),
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            return Ok(());
        }
        match self.peek() {
            Some(found) => Err(self.error(format!("expected {:?}, found {:?}", expected, found))),
            None => Err(self.error(format!("expected {:?}, found end of input", expected))),
        }
    }

    fn error(&self, message: impl Into<String>) -> SnapshotError {
        SnapshotError::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
