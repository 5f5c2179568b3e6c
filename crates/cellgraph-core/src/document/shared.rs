use super::Spreadsheet;
use crate::error::Result;
use cellgraph_engine::engine::{CellContents, CellValue};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A spreadsheet shared between callers (e.g. one per connected client).
///
/// The cell map and the dependency graph sit behind a single lock, so every
/// edit, including its recalculation pass, is applied as one transaction.
/// Clones are cheap and refer to the same spreadsheet.
#[derive(Clone, Debug)]
pub struct SharedSpreadsheet {
    inner: Arc<Mutex<Spreadsheet>>,
}

impl SharedSpreadsheet {
    pub fn new(sheet: Spreadsheet) -> Self {
        SharedSpreadsheet {
            inner: Arc::new(Mutex::new(sheet)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Spreadsheet> {
        // Edits validate before they mutate; a poisoned sheet is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the spreadsheet.
    pub fn with<R>(&self, f: impl FnOnce(&mut Spreadsheet) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn set_contents(&self, name: &str, input: &str) -> Result<Vec<String>> {
        self.lock().set_contents(name, input)
    }

    pub fn get_contents(&self, name: &str) -> Result<CellContents> {
        self.lock().get_contents(name)
    }

    pub fn get_value(&self, name: &str) -> Result<CellValue> {
        self.lock().get_value(name)
    }

    pub fn names_of_nonempty_cells(&self) -> HashSet<String> {
        self.lock().names_of_nonempty_cells()
    }

    pub fn is_changed(&self) -> bool {
        self.lock().is_changed()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.lock().save(path)
    }
}

impl From<Spreadsheet> for SharedSpreadsheet {
    fn from(sheet: Spreadsheet) -> Self {
        Self::new(sheet)
    }
}
