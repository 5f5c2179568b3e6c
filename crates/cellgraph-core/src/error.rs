//! Error types for Cellgraph core.

use thiserror::Error;

use cellgraph_engine::engine::{CycleError, FormulaError};

/// Errors returned by spreadsheet operations.
///
/// Formula evaluation problems are not errors: they are stored as
/// [`cellgraph_engine::engine::CellValue::Error`] values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpreadsheetError {
    #[error("Invalid cell name: {0:?}")]
    InvalidName(String),

    #[error("Invalid formula: {0}")]
    FormulaFormat(#[from] FormulaError),

    #[error("Circular dependency detected at {cell}")]
    Circular { cell: String },

    #[error("Spreadsheet read/write error: {0}")]
    ReadWrite(String),
}

impl From<CycleError> for SpreadsheetError {
    fn from(err: CycleError) -> Self {
        SpreadsheetError::Circular { cell: err.cell }
    }
}

impl From<std::io::Error> for SpreadsheetError {
    fn from(err: std::io::Error) -> Self {
        SpreadsheetError::ReadWrite(err.to_string())
    }
}

impl From<quick_xml::Error> for SpreadsheetError {
    fn from(err: quick_xml::Error) -> Self {
        SpreadsheetError::ReadWrite(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SpreadsheetError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        SpreadsheetError::ReadWrite(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpreadsheetError>;
