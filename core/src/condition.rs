//! Boolean expressions of conditional output paths.
//!
//! The language is deliberately small: identifiers (input ids), integer
//! literals, the comparisons `== != < > <= >=`, the connectives `and` and
//! `or`, and parentheses. `and` binds tighter than `or`.
//!
//! ```
//! use boutiques_schema_core::ConditionExpression;
//!
//! let condition = ConditionExpression::parse("(level > 2 and verbose) or force").unwrap();
//! assert_eq!(condition.identifiers(), vec!["level", "verbose", "force"]);
//! assert!(ConditionExpression::parse("level >").is_err());
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationErrorKind;

/// Characters a condition may contain.
pub const CONDITION_PATTERN: &str = r"^[A-Za-z0-9_><=!)( ]*$";

static CONDITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CONDITION_PATTERN).expect("static regex must compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Identifier(String),
    Integer(i64),
}

/// Parsed condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Or(Vec<Condition>),
    And(Vec<Condition>),
    Compare(Operand, CompareOp, Operand),
    /// A bare operand, true when the input is set and truthy.
    Truthy(Operand),
}

impl Condition {
    fn collect_identifiers<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Or(terms) | Self::And(terms) => {
                for term in terms {
                    term.collect_identifiers(out);
                }
            }
            Self::Compare(left, _, right) => {
                out.extend(left.identifier());
                out.extend(right.identifier());
            }
            Self::Truthy(operand) => out.extend(operand.identifier()),
        }
    }
}

impl Operand {
    fn identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            Self::Integer(_) => None,
        }
    }
}

/// Source text of a condition together with its parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionExpression {
    source: String,
    condition: Condition,
}

impl ConditionExpression {
    /// Parses `source`, rejecting disallowed characters and malformed syntax.
    pub fn parse(source: &str) -> Result<Self, ValidationErrorKind> {
        let invalid = |reason: String| ValidationErrorKind::InvalidCondition {
            expression: source.to_string(),
            reason,
        };
        if !CONDITION_RE.is_match(source) {
            return Err(ValidationErrorKind::PatternMismatch {
                value: source.to_string(),
                pattern: CONDITION_PATTERN,
            });
        }
        let tokens = tokenize(source).map_err(invalid)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let condition = parser.or().map_err(invalid)?;
        if let Some(token) = parser.peek() {
            return Err(invalid(format!("unexpected {token}")));
        }
        Ok(Self {
            source: source.to_string(),
            condition,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Identifiers referenced by the expression, in source order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.condition.collect_identifiers(&mut out);
        out
    }
}

impl fmt::Display for ConditionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Integer(i64),
    Op(CompareOp),
    And,
    Or,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(word) => write!(f, "identifier {word:?}"),
            Self::Integer(n) => write!(f, "number {n}"),
            Self::Op(op) => write!(f, "operator {:?}", op.as_str()),
            Self::And => f.write_str("\"and\""),
            Self::Or => f.write_str("\"or\""),
            Self::Open => f.write_str("\"(\""),
            Self::Close => f.write_str("\")\""),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            ' ' => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '<' | '>' | '=' | '!' => {
                let followed_by_eq = chars.next_if(|&(_, next)| next == '=').is_some();
                let op = match (c, followed_by_eq) {
                    ('<', false) => CompareOp::Lt,
                    ('<', true) => CompareOp::Le,
                    ('>', false) => CompareOp::Gt,
                    ('>', true) => CompareOp::Ge,
                    ('=', true) => CompareOp::Eq,
                    ('!', true) => CompareOp::Ne,
                    _ => return Err(format!("incomplete operator {c:?} at offset {start}")),
                };
                tokens.push(Token::Op(op));
            }
            _ => {
                let mut end = start + c.len_utf8();
                while let Some((index, next)) =
                    chars.next_if(|&(_, next)| next.is_ascii_alphanumeric() || next == '_')
                {
                    end = index + next.len_utf8();
                }
                let word = &source[start..end];
                let token = match word {
                    "and" => Token::And,
                    "or" => Token::Or,
                    _ if word.bytes().all(|b| b.is_ascii_digit()) => Token::Integer(
                        word.parse()
                            .map_err(|_| format!("number {word} is out of range"))?,
                    ),
                    _ => Token::Word(word.to_string()),
                };
                tokens.push(token);
            }
        }
    }
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    Ok(tokens)
}

/// Deepest parenthesis nesting the parser accepts.
pub const MAX_CONDITION_NESTING: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Result<Condition, String> {
        let mut terms = vec![self.and()?];
        while self.eat(&Token::Or) {
            terms.push(self.and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Condition::Or(terms)
        })
    }

    fn and(&mut self) -> Result<Condition, String> {
        let mut terms = vec![self.primary()?];
        while self.eat(&Token::And) {
            terms.push(self.primary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Condition::And(terms)
        })
    }

    fn primary(&mut self) -> Result<Condition, String> {
        if self.eat(&Token::Open) {
            self.depth += 1;
            if self.depth > MAX_CONDITION_NESTING {
                return Err(format!(
                    "parentheses nest deeper than {MAX_CONDITION_NESTING} levels"
                ));
            }
            let inner = self.or()?;
            if !self.eat(&Token::Close) {
                return Err("unbalanced parentheses".to_string());
            }
            self.depth -= 1;
            return Ok(inner);
        }
        let left = self.operand()?;
        if let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            let right = self.operand()?;
            return Ok(Condition::Compare(left, op, right));
        }
        Ok(Condition::Truthy(left))
    }

    fn operand(&mut self) -> Result<Operand, String> {
        match self.next() {
            Some(Token::Word(name)) => Ok(Operand::Identifier(name)),
            Some(Token::Integer(n)) => Ok(Operand::Integer(n)),
            Some(token) => Err(format!("expected an identifier or a number, found {token}")),
            None => Err("expression ends early".to_string()),
        }
    }
}
