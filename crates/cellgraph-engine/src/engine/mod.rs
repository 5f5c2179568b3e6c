//! Recalculation engine primitives.
//!
//! - [`DependencyGraph`] - bidirectional "depends on" relation over names
//! - [`Formula`] - validated infix formula with canonical form
//! - [`Formula::evaluate`] - two-stack evaluation returning a number or an [`EvalError`]
//! - [`CellContents`], [`CellValue`] - what a cell holds and what it shows
//! - [`cells_to_recalculate`] - dependency-respecting order with cycle detection
//! - [`is_valid_name`] - base cell/variable name syntax

mod cell;
mod cycle;
mod eval;
mod formula;
mod graph;
mod name;
mod token;

pub use cell::{CellContents, CellValue, parse_number};
pub use cycle::{CycleError, cells_to_recalculate, recalculation_order};
pub use eval::EvalError;
pub use formula::{Formula, FormulaError};
pub use graph::DependencyGraph;
pub use name::{
    Normalizer, Validator, accept_all, grid_validator, identity_normalizer, is_valid_name,
};
pub use token::{Operator, Token, format_number};
