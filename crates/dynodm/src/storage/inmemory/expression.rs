//! Filter and update expression evaluation for the in-memory store.
//!
//! Supports the subset of the store's expression language the driver
//! emits: comparisons between attribute paths (plain or `#alias`) and
//! `:placeholder` values, joined with `AND`, `OR`, `NOT` and parentheses,
//! and `SET` update clauses.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use dynodm_core::codec::{Item, Number, WireValue};
use dynodm_core::criteria::ComparisonOperator;
use dynodm_core::store::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Comma,
    Operator(ComparisonOperator),
    Word(String),
    Alias(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Path(String),
    Alias(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Compare {
        left: Operand,
        operator: ComparisonOperator,
        right: Operand,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

/// One `path = :value` assignment of a `SET` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub path: Operand,
    pub value: String,
}

/// Name and value tables an expression is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    pub names: &'a BTreeMap<String, String>,
    pub values: &'a BTreeMap<String, WireValue>,
}

impl Bindings<'_> {
    pub fn attribute_name<'b>(&'b self, operand: &'b Operand) -> Result<&'b str> {
        match operand {
            Operand::Path(path) => Ok(path),
            Operand::Alias(alias) => self.names.get(alias).map(String::as_str).ok_or_else(|| {
                invalid(format!(
                    "An expression attribute name used in the document path is not defined: {alias}"
                ))
            }),
            Operand::Placeholder(token) => Err(invalid(format!(
                "Expected an attribute name, found value placeholder {token}"
            ))),
        }
    }

    pub fn value(&self, token: &str) -> Result<&WireValue> {
        self.values.get(token).ok_or_else(|| {
            invalid(format!(
                "An expression attribute value used in expression is not defined: {token}"
            ))
        })
    }

    fn resolve<'b>(
        &'b self,
        operand: &'b Operand,
        item: &'b Item,
    ) -> Result<Option<&'b WireValue>> {
        match operand {
            Operand::Placeholder(token) => self.value(token).map(Some),
            path => Ok(item.get(self.attribute_name(path)?)),
        }
    }
}

/// Parses a filter (condition) expression.
pub fn parse_condition(text: &str) -> Result<Condition> {
    let mut parser = Parser::new(tokenize(text)?);
    let condition = parser.or()?;
    parser.finish()?;
    Ok(condition)
}

/// Parses a `SET a = :x, #b = :y` update expression.
pub fn parse_update(text: &str) -> Result<Vec<Assignment>> {
    let mut parser = Parser::new(tokenize(text)?);

    match parser.next() {
        Some(Token::Word(word)) if word.eq_ignore_ascii_case("SET") => {}
        _ => return Err(invalid("Only SET update expressions are supported")),
    }

    let mut assignments = Vec::new();
    loop {
        let path = match parser.next() {
            Some(Token::Word(path)) => Operand::Path(path),
            Some(Token::Alias(alias)) => Operand::Alias(alias),
            other => return Err(unexpected(other)),
        };
        match parser.next() {
            Some(Token::Operator(ComparisonOperator::Eq)) => {}
            other => return Err(unexpected(other)),
        }
        let value = match parser.next() {
            Some(Token::Placeholder(token)) => token,
            other => return Err(unexpected(other)),
        };
        assignments.push(Assignment { path, value });

        match parser.next() {
            Some(Token::Comma) => continue,
            None => break,
            other => return Err(unexpected(other)),
        }
    }

    Ok(assignments)
}

/// Evaluates a condition against an item.
///
/// A comparison involving a missing attribute is false. Values of different
/// types are never equal and have no ordering.
pub fn evaluate(condition: &Condition, item: &Item, bindings: &Bindings<'_>) -> Result<bool> {
    match condition {
        Condition::Compare {
            left,
            operator,
            right,
        } => {
            let (Some(left), Some(right)) =
                (bindings.resolve(left, item)?, bindings.resolve(right, item)?)
            else {
                return Ok(false);
            };
            Ok(compare(left, *operator, right))
        }
        Condition::And(a, b) => Ok(evaluate(a, item, bindings)? && evaluate(b, item, bindings)?),
        Condition::Or(a, b) => Ok(evaluate(a, item, bindings)? || evaluate(b, item, bindings)?),
        Condition::Not(inner) => Ok(!evaluate(inner, item, bindings)?),
    }
}

fn compare(left: &WireValue, operator: ComparisonOperator, right: &WireValue) -> bool {
    let ordering = match (left, right) {
        (WireValue::Num(a), WireValue::Num(b)) => match (Number::parse(a), Number::parse(b)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
        (WireValue::Str(a), WireValue::Str(b)) => Some(a.cmp(b)),
        (WireValue::Binary(a), WireValue::Binary(b)) => Some(a.cmp(b)),
        (WireValue::Bool(a), WireValue::Bool(b)) if a == b => Some(Ordering::Equal),
        (WireValue::Null, WireValue::Null) => Some(Ordering::Equal),
        _ => None,
    };

    match operator {
        ComparisonOperator::Eq => ordering == Some(Ordering::Equal),
        ComparisonOperator::Neq => ordering != Some(Ordering::Equal),
        ComparisonOperator::Lt => ordered(left) && ordering == Some(Ordering::Less),
        ComparisonOperator::Lte => {
            ordered(left) && matches!(ordering, Some(Ordering::Less | Ordering::Equal))
        }
        ComparisonOperator::Gt => ordered(left) && ordering == Some(Ordering::Greater),
        ComparisonOperator::Gte => {
            ordered(left) && matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

// Only strings, numbers and binary have an order.
fn ordered(value: &WireValue) -> bool {
    matches!(
        value,
        WireValue::Str(_) | WireValue::Num(_) | WireValue::Binary(_)
    )
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '=' | '<' | '>' | '!' => {
                let mut op = String::from(c);
                chars.next();
                if let Some(&next) = chars.peek() {
                    if matches!(next, '=' | '>') && !(c == '>' && next == '>') {
                        op.push(next);
                        chars.next();
                    }
                }
                tokens.push(Token::Operator(op.parse().map_err(|_| {
                    invalid(format!("Invalid operator in expression: {op}"))
                })?));
            }
            ':' | '#' => {
                chars.next();
                let name = take_word(&mut chars);
                if name.is_empty() {
                    return Err(invalid(format!("Dangling '{c}' in expression")));
                }
                tokens.push(if c == ':' {
                    Token::Placeholder(format!(":{name}"))
                } else {
                    Token::Alias(format!("#{name}"))
                });
            }
            c if is_word_char(c) => tokens.push(Token::Word(take_word(&mut chars))),
            other => {
                return Err(invalid(format!(
                    "Invalid character in expression: {other}"
                )))
            }
        }
    }

    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn take_word(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut word = String::new();
    while let Some(&c) = chars.peek() {
        if !is_word_char(c) {
            break;
        }
        word.push(c);
        chars.next();
    }
    word
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn finish(&mut self) -> Result<()> {
        match self.next() {
            None => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    fn or(&mut self) -> Result<Condition> {
        let mut left = self.and()?;
        while self.peek_keyword("OR") {
            self.next();
            let right = self.and()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Condition> {
        let mut left = self.unary()?;
        while self.peek_keyword("AND") {
            self.next();
            let right = self.unary()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Condition> {
        if self.peek_keyword("NOT") {
            self.next();
            return Ok(Condition::Not(Box::new(self.unary()?)));
        }

        if self.peek() == Some(&Token::LParen) {
            self.next();
            let inner = self.or()?;
            return match self.next() {
                Some(Token::RParen) => Ok(inner),
                other => Err(unexpected(other)),
            };
        }

        let left = self.operand()?;
        let operator = match self.next() {
            Some(Token::Operator(op)) => op,
            other => return Err(unexpected(other)),
        };
        let right = self.operand()?;

        Ok(Condition::Compare {
            left,
            operator,
            right,
        })
    }

    fn operand(&mut self) -> Result<Operand> {
        match self.next() {
            Some(Token::Word(path)) => Ok(Operand::Path(path)),
            Some(Token::Alias(alias)) => Ok(Operand::Alias(alias)),
            Some(Token::Placeholder(token)) => Ok(Operand::Placeholder(token)),
            other => Err(unexpected(other)),
        }
    }
}

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::Validation(message.into())
}

fn unexpected(token: Option<Token>) -> StoreError {
    match token {
        Some(token) => invalid(format!("Syntax error in expression near {token:?}")),
        None => invalid("Syntax error in expression: unexpected end of input"),
    }
}
