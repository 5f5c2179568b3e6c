//! Infix arithmetic formulas.
//!
//! A [`Formula`] is parsed and validated once, at construction. Construction
//! either yields a complete immutable formula or a [`FormulaError`]; nothing
//! partial is ever produced. Evaluation lives in [`super::eval`].
//!
//! Grammar, checked token by token:
//!
//! - at least one token
//! - the first token is a number, a variable or `(`
//! - the last token is a number, a variable or `)`
//! - `)` never outnumbers `(` at any point, and the totals match
//! - after `(` or an operator comes a number, a variable or `(`
//! - after a number, a variable or `)` comes an operator or `)`
//! - every variable, once normalized, is still a valid name and passes the validator

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

use super::name::is_valid_name;
use super::token::{Token, tokenize};

/// Why a formula could not be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("invalid token '{0}'")]
    InvalidToken(String),

    #[error("number '{0}' is out of range")]
    InvalidNumber(String),

    #[error("formula cannot begin with '{0}'")]
    InvalidFirstToken(String),

    #[error("formula cannot end with '{0}'")]
    InvalidLastToken(String),

    #[error("closing parenthesis has no matching opening parenthesis")]
    UnmatchedClosingParen,

    #[error("{0} opening parenthesis left unclosed")]
    UnclosedParen(usize),

    #[error("'{found}' cannot follow an operator or opening parenthesis")]
    ExpectedOperand { found: String },

    #[error("'{found}' cannot follow a number, variable or closing parenthesis")]
    ExpectedOperator { found: String },

    #[error("invalid variable '{0}'")]
    InvalidVariable(String),
}

/// A validated infix formula.
///
/// Two formulas are equal iff their canonical strings are equal. Number
/// tokens are canonicalized through their parsed value, so `2.0` and `2.000`
/// compare equal, and variables are stored in normalized form.
#[derive(Clone, Debug)]
pub struct Formula {
    tokens: Vec<Token>,
    variables: HashSet<String>,
    canonical: String,
}

impl Formula {
    /// Parse with an identity normalizer and a validator that accepts every
    /// syntactically valid variable.
    pub fn parse(source: &str) -> Result<Formula, FormulaError> {
        Self::new(source, |v| v.to_string(), |_| true)
    }

    /// Parse `source`, mapping each variable through `normalize` and rejecting
    /// any normalized variable that `is_valid` refuses.
    pub fn new<N, V>(source: &str, normalize: N, is_valid: V) -> Result<Formula, FormulaError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        let mut tokens: Vec<Token> = Vec::new();
        let mut variables = HashSet::new();
        let mut open = 0usize;

        for token in tokenize(source)? {
            if let Some(prev) = tokens.last() {
                check_follows(prev, &token)?;
            }

            let token = match token {
                Token::LParen => {
                    open += 1;
                    Token::LParen
                }
                Token::RParen => {
                    open = open
                        .checked_sub(1)
                        .ok_or(FormulaError::UnmatchedClosingParen)?;
                    Token::RParen
                }
                Token::Variable(raw) => {
                    let normalized = normalize(&raw);
                    if !is_valid_name(&normalized) || !is_valid(&normalized) {
                        return Err(FormulaError::InvalidVariable(normalized));
                    }
                    variables.insert(normalized.clone());
                    Token::Variable(normalized)
                }
                other => other,
            };
            tokens.push(token);
        }

        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return Err(FormulaError::Empty);
        };
        if matches!(first, Token::Op(_) | Token::RParen) {
            return Err(FormulaError::InvalidFirstToken(first.to_string()));
        }
        if matches!(last, Token::Op(_) | Token::LParen) {
            return Err(FormulaError::InvalidLastToken(last.to_string()));
        }
        if open > 0 {
            return Err(FormulaError::UnclosedParen(open));
        }

        let canonical = tokens.iter().map(Token::to_string).collect();
        Ok(Formula {
            tokens,
            variables,
            canonical,
        })
    }

    /// The canonical token sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Distinct normalized variable names referenced by the formula.
    pub fn variables(&self) -> &HashSet<String> {
        &self.variables
    }

    /// Whitespace-free rendering with numbers and variables in canonical form.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

fn check_follows(prev: &Token, next: &Token) -> Result<(), FormulaError> {
    match prev {
        Token::LParen | Token::Op(_) => {
            if matches!(next, Token::RParen | Token::Op(_)) {
                return Err(FormulaError::ExpectedOperand {
                    found: next.to_string(),
                });
            }
        }
        Token::RParen | Token::Number(_) | Token::Variable(_) => {
            if next.is_operand() || *next == Token::LParen {
                return Err(FormulaError::ExpectedOperator {
                    found: next.to_string(),
                });
            }
        }
    }
    Ok(())
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(f: &Formula) -> u64 {
        let mut h = DefaultHasher::new();
        f.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_canonical_strips_whitespace() {
        let f = Formula::parse(" x1 +  y2 * ( 3 ) ").unwrap();
        assert_eq!(f.canonical(), "x1+y2*(3)");
        assert_eq!(f.to_string(), "x1+y2*(3)");
    }

    #[test]
    fn test_normalizer_is_applied() {
        let upper = Formula::new("x1+y2", |v| v.to_uppercase(), |_| true).unwrap();
        let plain = Formula::parse("X1+Y2").unwrap();
        assert_eq!(upper.canonical(), plain.canonical());
        assert_eq!(upper, plain);
    }

    #[test]
    fn test_numeric_tokens_compare_by_value() {
        let a = Formula::parse("2.0 + x7").unwrap();
        let b = Formula::parse("2.000 + x7").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = Formula::parse("5E2").unwrap();
        let d = Formula::parse("500").unwrap();
        assert_eq!(c.canonical(), d.canonical());
    }

    #[test]
    fn test_inequality() {
        let a = Formula::parse("x+y").unwrap();
        let b = Formula::parse("y+x").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_variables_are_distinct_and_normalized() {
        let f = Formula::new("a + A + b*a", |v| v.to_uppercase(), |_| true).unwrap();
        let mut vars: Vec<_> = f.variables().iter().cloned().collect();
        vars.sort();
        assert_eq!(vars, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_no_variables() {
        let f = Formula::parse("1 + 2").unwrap();
        assert!(f.variables().is_empty());
    }

    #[test]
    fn test_empty_formula() {
        assert_eq!(Formula::parse(""), Err(FormulaError::Empty));
        assert_eq!(Formula::parse("   "), Err(FormulaError::Empty));
    }

    #[test]
    fn test_invalid_first_and_last_tokens() {
        assert!(matches!(
            Formula::parse("+1"),
            Err(FormulaError::InvalidFirstToken(_))
        ));
        assert!(matches!(
            Formula::parse(")1"),
            Err(FormulaError::InvalidFirstToken(_) | FormulaError::UnmatchedClosingParen)
        ));
        assert!(matches!(
            Formula::parse("1+"),
            Err(FormulaError::InvalidLastToken(_))
        ));
        assert!(matches!(
            Formula::parse("1*("),
            Err(FormulaError::InvalidLastToken(_))
        ));
    }

    #[test]
    fn test_paren_balance() {
        assert_eq!(
            Formula::parse("(1+2))"),
            Err(FormulaError::UnmatchedClosingParen)
        );
        assert_eq!(Formula::parse("((1+2)"), Err(FormulaError::UnclosedParen(1)));
        assert!(Formula::parse("((1)+(2))").is_ok());
    }

    #[test]
    fn test_following_rules() {
        assert!(matches!(
            Formula::parse("1 + + 2"),
            Err(FormulaError::ExpectedOperand { .. })
        ));
        assert!(matches!(
            Formula::parse("(-1)"),
            Err(FormulaError::ExpectedOperand { .. })
        ));
        assert!(matches!(
            Formula::parse("()"),
            Err(FormulaError::ExpectedOperand { .. })
        ));
        assert!(matches!(
            Formula::parse("2 x"),
            Err(FormulaError::ExpectedOperator { .. })
        ));
        assert!(matches!(
            Formula::parse("2(3)"),
            Err(FormulaError::ExpectedOperator { .. })
        ));
        assert!(matches!(
            Formula::parse("(1)(2)"),
            Err(FormulaError::ExpectedOperator { .. })
        ));
    }

    #[test]
    fn test_invalid_variable_after_normalization() {
        assert_eq!(
            Formula::new("x", |_| "1x".to_string(), |_| true),
            Err(FormulaError::InvalidVariable("1x".to_string()))
        );
        assert_eq!(
            Formula::new("x", |v| v.to_string(), |v| v != "x"),
            Err(FormulaError::InvalidVariable("x".to_string()))
        );
    }

    #[test]
    fn test_extreme_literals_stay_short() {
        let f = Formula::parse("1e300 * x + 0.0000001").unwrap();
        assert_eq!(f.canonical(), "1e300*x+1e-7");
        assert_eq!(Formula::parse(f.canonical()).unwrap(), f);
    }

    #[test]
    fn test_from_str() {
        let f: Formula = "a1 * 2".parse().unwrap();
        assert_eq!(f.canonical(), "a1*2");
        assert!("a1 *".parse::<Formula>().is_err());
    }
}
