//! Cell contents and values.
//!
//! - [`CellContents`] - what the user entered: nothing, a label, a number or a formula
//! - [`CellValue`] - what the cell currently shows: a label, a number or an evaluation error

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::eval::EvalError;
use super::formula::{Formula, FormulaError};
use super::token::format_number;

/// The contents of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContents {
    Empty,
    Text(String),
    Number(f64),
    Formula(Formula),
}

impl CellContents {
    /// Interpret raw user input.
    /// - `""` -> Empty
    /// - a finite number (surrounding whitespace allowed) -> Number
    /// - starts with '=' -> Formula parsed from the rest
    /// - anything else -> Text, verbatim
    pub fn from_input<N, V>(
        input: &str,
        normalize: N,
        is_valid: V,
    ) -> Result<CellContents, FormulaError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        if input.is_empty() {
            return Ok(CellContents::Empty);
        }
        if let Some(n) = parse_number(input) {
            return Ok(CellContents::Number(n));
        }
        if let Some(source) = input.strip_prefix('=') {
            return Formula::new(source, normalize, is_valid).map(CellContents::Formula);
        }
        Ok(CellContents::Text(input.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContents::Empty)
    }

    /// Names this contents reads from. Only formulas reference other cells.
    pub fn dependees(&self) -> HashSet<String> {
        match self {
            CellContents::Formula(f) => f.variables().clone(),
            _ => HashSet::new(),
        }
    }

    /// Text that reproduces these contents when fed back through [`CellContents::from_input`].
    pub fn to_input_string(&self) -> String {
        match self {
            CellContents::Empty => String::new(),
            CellContents::Text(s) => s.clone(),
            CellContents::Number(n) => format_number(*n),
            CellContents::Formula(f) => format!("={}", f),
        }
    }
}

impl fmt::Display for CellContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_input_string())
    }
}

/// Parse a finite number, ignoring surrounding whitespace.
pub fn parse_number(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// The computed value of a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Error(EvalError),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }
}

impl From<Result<f64, EvalError>> for CellValue {
    fn from(result: Result<f64, EvalError>) -> Self {
        match result {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Error(e) => write!(f, "#ERROR: {}", e),
        }
    }
}
