//! Spreadsheet state and logic (UI-agnostic).

mod io;
mod ops;
mod shared;
mod state;

pub use shared::SharedSpreadsheet;
pub use state::{Cell, DEFAULT_VERSION, Spreadsheet};
