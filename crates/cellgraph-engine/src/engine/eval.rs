//! Formula evaluation.
//!
//! A left-to-right scan over the canonical token sequence with one operand
//! stack and one operator stack. `*` and `/` are applied as soon as their
//! right operand is known; `+` and `-` wait until the next additive operator,
//! a closing parenthesis or the end of input.
//!
//! Evaluation never panics on well-formed formulas and never fails out of
//! band: division by zero and variables without a numeric value become an
//! [`EvalError`], which callers store as a cell value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::formula::Formula;
use super::token::{Operator, Token};

/// Why a well-formed formula could not produce a number.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("variable '{variable}' has no numeric value")]
    Lookup { variable: String },
}

impl EvalError {
    /// Human-readable reason.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Pending entries on the operator stack.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Pending {
    Op(Operator),
    LParen,
}

fn apply(op: Operator, left: f64, right: f64) -> Result<f64, EvalError> {
    match op {
        Operator::Add => Ok(left + right),
        Operator::Sub => Ok(left - right),
        Operator::Mul => Ok(left * right),
        Operator::Div if right == 0.0 => Err(EvalError::DivisionByZero),
        Operator::Div => Ok(left / right),
    }
}

struct Stacks {
    values: Vec<f64>,
    ops: Vec<Pending>,
}

impl Stacks {
    fn top_is(&self, pred: impl Fn(Operator) -> bool) -> bool {
        matches!(self.ops.last(), Some(Pending::Op(op)) if pred(*op))
    }

    fn pop_value(&mut self) -> f64 {
        self.values
            .pop()
            .expect("validated formula keeps the operand stack non-empty")
    }

    /// Pop one operator and two operands, push the result.
    fn reduce(&mut self) -> Result<(), EvalError> {
        let Some(Pending::Op(op)) = self.ops.pop() else {
            unreachable!("reduce is only called with an operator on top");
        };
        let right = self.pop_value();
        let left = self.pop_value();
        self.values.push(apply(op, left, right)?);
        Ok(())
    }

    /// Push an operand, combining it immediately with a pending `*` or `/`.
    fn push_operand(&mut self, value: f64) -> Result<(), EvalError> {
        if self.top_is(|op| !op.is_additive()) {
            self.values.push(value);
            self.reduce()
        } else {
            self.values.push(value);
            Ok(())
        }
    }
}

impl Formula {
    /// Evaluate the formula, resolving each variable through `lookup`.
    ///
    /// `lookup` returns `None` when the variable currently has no numeric
    /// value; evaluation then stops with [`EvalError::Lookup`].
    pub fn evaluate<L>(&self, mut lookup: L) -> Result<f64, EvalError>
    where
        L: FnMut(&str) -> Option<f64>,
    {
        let mut stacks = Stacks {
            values: Vec::new(),
            ops: Vec::new(),
        };

        for token in self.tokens() {
            match token {
                Token::Op(op) if op.is_additive() => {
                    if stacks.top_is(Operator::is_additive) {
                        stacks.reduce()?;
                    }
                    stacks.ops.push(Pending::Op(*op));
                }
                Token::Op(op) => stacks.ops.push(Pending::Op(*op)),
                Token::LParen => stacks.ops.push(Pending::LParen),
                Token::RParen => {
                    if stacks.top_is(Operator::is_additive) {
                        stacks.reduce()?;
                    }
                    if stacks.ops.last() == Some(&Pending::LParen) {
                        stacks.ops.pop();
                    }
                    if stacks.top_is(|op| !op.is_additive()) {
                        stacks.reduce()?;
                    }
                }
                Token::Number(n) => stacks.push_operand(*n)?,
                Token::Variable(name) => {
                    let value = lookup(name).ok_or_else(|| EvalError::Lookup {
                        variable: name.clone(),
                    })?;
                    stacks.push_operand(value)?;
                }
            }
        }

        if !stacks.ops.is_empty() {
            stacks.reduce()?;
        }
        Ok(stacks.pop_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> Result<f64, EvalError> {
        Formula::parse(src).unwrap().evaluate(|_| None)
    }

    fn eval_with(src: &str, vars: &[(&str, f64)]) -> Result<f64, EvalError> {
        Formula::parse(src)
            .unwrap()
            .evaluate(|name| vars.iter().find(|(n, _)| *n == name).map(|(_, v)| *v))
    }

    #[test]
    fn test_single_operand() {
        assert_eq!(eval("5"), Ok(5.0));
        assert_eq!(eval("(((7)))"), Ok(7.0));
        assert_eq!(eval_with("x", &[("x", 3.5)]), Ok(3.5));
    }

    #[test]
    fn test_basic_operators() {
        assert_eq!(eval("2+3"), Ok(5.0));
        assert_eq!(eval("7-10"), Ok(-3.0));
        assert_eq!(eval("4*2.5"), Ok(10.0));
        assert_eq!(eval("9/4"), Ok(2.25));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4"), Ok(14.0));
        assert_eq!(eval("2*3+4"), Ok(10.0));
        assert_eq!(eval("(2+3)*4"), Ok(20.0));
        assert_eq!(eval("2*(3+4)*5"), Ok(70.0));
        assert_eq!(eval("10/2/5"), Ok(1.0));
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(eval("10-4-3"), Ok(3.0));
        assert_eq!(eval("1-2+3"), Ok(2.0));
        assert_eq!(eval("8-2*3-1"), Ok(1.0));
    }

    #[test]
    fn test_nested_parentheses() {
        assert_eq!(eval("((1+2)*(3+4))/7"), Ok(3.0));
        assert_eq!(eval("2*(3*(4+1)-5)"), Ok(20.0));
        assert_eq!(eval("(1+(2-(3+4)))"), Ok(-4.0));
    }

    #[test]
    fn test_division_by_zero_is_a_value() {
        assert_eq!(eval("1/0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("5/(2-2)"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("1 + 3/0 + 2"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("0/5"), Ok(0.0));
    }

    #[test]
    fn test_lookup_failure() {
        assert_eq!(
            eval("1 + missing"),
            Err(EvalError::Lookup {
                variable: "missing".into()
            })
        );
    }

    #[test]
    fn test_lookup_stops_at_first_failure() {
        let mut seen = Vec::new();
        let result = Formula::parse("a + b + c").unwrap().evaluate(|name| {
            seen.push(name.to_string());
            if name == "b" { None } else { Some(1.0) }
        });
        assert!(result.is_err());
        assert_eq!(seen, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_variables() {
        let vars = [("a", 2.0), ("b", 5.0)];
        assert_eq!(eval_with("a*b - a", &vars), Ok(8.0));
        assert_eq!(eval_with("(a+b)/a", &vars), Ok(3.5));
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let f = Formula::parse("x*2").unwrap();
        assert_eq!(f.evaluate(|_| Some(1.0)), Ok(2.0));
        assert_eq!(f.evaluate(|_| Some(4.0)), Ok(8.0));
    }

    #[test]
    fn test_reason() {
        assert_eq!(EvalError::DivisionByZero.reason(), "division by zero");
    }
}
