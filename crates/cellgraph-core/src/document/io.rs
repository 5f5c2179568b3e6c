use super::Spreadsheet;
use crate::error::{Result, SpreadsheetError};
use crate::storage::{SavedCell, SavedSheet, parse_xml, read_version, write_xml};
use log::info;
use std::path::Path;

impl Spreadsheet {
    /// Snapshot of the non-empty cells in a persistable form, sorted by name.
    pub fn to_saved(&self) -> SavedSheet {
        let mut cells: Vec<SavedCell> = self
            .cells
            .iter()
            .map(|(name, cell)| SavedCell {
                name: name.clone(),
                contents: cell.contents.to_input_string(),
            })
            .collect();
        cells.sort_by(|a, b| a.name.cmp(&b.name));
        SavedSheet {
            version: self.version.clone(),
            cells,
        }
    }

    /// Write every non-empty cell to `path`. Clears the changed flag on success.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        write_xml(path, &self.to_saved())?;
        self.changed = false;
        info!("Saved {} cells to {}", self.cells.len(), path.display());
        Ok(())
    }

    /// Version tag stored in the document at `path`.
    pub fn saved_version(path: &Path) -> Result<String> {
        read_version(path)
    }

    /// Replace this sheet's cells with those saved at `path`.
    ///
    /// The document's version must equal this sheet's version, and every cell
    /// must be accepted by [`Spreadsheet::set_contents`]. On any failure the
    /// sheet is left as it was.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let saved = parse_xml(path)?;
        self.load_saved(saved)?;
        info!("Loaded {} cells from {}", self.cells.len(), path.display());
        Ok(())
    }

    /// Replace this sheet's cells with `saved`, all or nothing.
    pub fn load_saved(&mut self, saved: SavedSheet) -> Result<()> {
        if saved.version != self.version {
            return Err(SpreadsheetError::ReadWrite(format!(
                "version mismatch: document is {:?}, expected {:?}",
                saved.version, self.version
            )));
        }

        let mut loaded = Spreadsheet::with_rules(
            self.validator.clone(),
            self.normalizer.clone(),
            &self.version,
        );
        for cell in &saved.cells {
            loaded
                .set_contents(&cell.name, &cell.contents)
                .map_err(|e| {
                    SpreadsheetError::ReadWrite(format!("cell {}: {}", cell.name, e))
                })?;
        }

        self.cells = loaded.cells;
        self.graph = loaded.graph;
        self.changed = false;
        Ok(())
    }
}
