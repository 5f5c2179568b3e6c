//! Formula tokenizer.
//!
//! Splits infix source text into parentheses, the four arithmetic operators,
//! variables and non-negative number literals. Whitespace only separates
//! tokens and is dropped. Any other character is a malformed token.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::formula::FormulaError;

/// Binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// `+` and `-`.
    pub fn is_additive(self) -> bool {
        matches!(self, Operator::Add | Operator::Sub)
    }
}

/// A single formula token. Numbers hold their parsed value; variables hold
/// their text (normalized once the formula has been validated).
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Op(Operator),
    Number(f64),
    Variable(String),
}

impl Token {
    /// Numbers and variables.
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Op(op) => write!(f, "{}", op.symbol()),
            Token::Number(n) => f.write_str(&format_number(*n)),
            Token::Variable(name) => f.write_str(name),
        }
    }
}

/// Shortest text that parses back to `n`. Very large and very small
/// magnitudes use exponent notation.
pub fn format_number(n: f64) -> String {
    let magnitude = n.abs();
    if magnitude != 0.0 && !(1e-6..1e15).contains(&magnitude) {
        format!("{:e}", n)
    } else {
        n.to_string()
    }
}

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:",
            r"(?<lparen>\()",
            r"|(?<rparen>\))",
            r"|(?<op>[+\-*/])",
            r"|(?<var>[A-Za-z_][A-Za-z0-9_]*)",
            r"|(?<num>(?:[0-9]+\.[0-9]*|[0-9]*\.[0-9]+|[0-9]+)(?:[eE][+-]?[0-9]+)?)",
            r"|(?<ws>\s+)",
            r")"
        ))
        .expect("formula token regex must compile")
    })
}

/// Split `source` into tokens, dropping whitespace.
pub fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    let re = token_re();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        let Some(caps) = re.captures(rest) else {
            let bad: String = rest.chars().take(1).collect();
            return Err(FormulaError::InvalidToken(bad));
        };
        let matched = caps.get(0).map_or("", |m| m.as_str());
        pos += matched.len();

        let token = if caps.name("lparen").is_some() {
            Token::LParen
        } else if caps.name("rparen").is_some() {
            Token::RParen
        } else if let Some(op) = caps.name("op") {
            Token::Op(match op.as_str() {
                "+" => Operator::Add,
                "-" => Operator::Sub,
                "*" => Operator::Mul,
                _ => Operator::Div,
            })
        } else if let Some(var) = caps.name("var") {
            Token::Variable(var.as_str().to_string())
        } else if let Some(num) = caps.name("num") {
            let value = num
                .as_str()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| FormulaError::InvalidNumber(num.as_str().to_string()))?;
            Token::Number(value)
        } else {
            continue;
        };
        tokens.push(token);
    }

    Ok(tokens)
}
