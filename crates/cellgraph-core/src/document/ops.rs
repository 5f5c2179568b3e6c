use super::{Cell, Spreadsheet};
use crate::error::{Result, SpreadsheetError};
use cellgraph_engine::engine::{CellContents, CellValue, cells_to_recalculate, is_valid_name};
use log::{debug, warn};
use std::collections::HashSet;

impl Spreadsheet {
    /// Normalize `name` and check it against the name syntax and the validator.
    pub(crate) fn checked_name(&self, name: &str) -> Result<String> {
        let normalized = (self.normalizer)(name);
        if is_valid_name(&normalized) && (self.validator)(&normalized) {
            Ok(normalized)
        } else {
            Err(SpreadsheetError::InvalidName(name.to_string()))
        }
    }

    /// Names of all non-empty cells.
    pub fn names_of_nonempty_cells(&self) -> HashSet<String> {
        self.cells.keys().cloned().collect()
    }

    /// Contents of the named cell; [`CellContents::Empty`] if it has none.
    pub fn get_contents(&self, name: &str) -> Result<CellContents> {
        let name = self.checked_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map_or(CellContents::Empty, |cell| cell.contents.clone()))
    }

    /// Value of the named cell; [`CellValue::Empty`] if it has no contents.
    pub fn get_value(&self, name: &str) -> Result<CellValue> {
        let name = self.checked_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map_or(CellValue::Empty, |cell| cell.value.clone()))
    }

    /// Cells whose formulas reference the named cell directly.
    pub fn direct_dependents(&self, name: &str) -> Result<HashSet<String>> {
        let name = self.checked_name(name)?;
        Ok(self.graph.dependents(&name))
    }

    /// Set the contents of a cell from user input.
    ///
    /// Input that parses as a number becomes a number, input starting with
    /// `=` becomes a formula, the empty string clears the cell, and anything
    /// else is stored as a label.
    ///
    /// Returns the cell followed by every cell depending on it, directly or
    /// indirectly, in an order where each cell comes after its dependees.
    /// Those cells have been recalculated in that order.
    ///
    /// An invalid name, a malformed formula or a formula that would create a
    /// circular dependency leaves the spreadsheet untouched.
    pub fn set_contents(&mut self, name: &str, input: &str) -> Result<Vec<String>> {
        let name = self.checked_name(name)?;
        let contents =
            CellContents::from_input(input, self.normalizer.as_ref(), self.validator.as_ref())?;
        self.replace_contents(name, contents)
    }

    fn replace_contents(&mut self, name: String, contents: CellContents) -> Result<Vec<String>> {
        let previous_dependees = self.graph.dependees(&name);
        self.graph.replace_dependees(&name, contents.dependees());

        let order = match cells_to_recalculate(&self.graph, &name) {
            Ok(order) => order,
            Err(err) => {
                self.graph.replace_dependees(&name, &previous_dependees);
                warn!("Rejected contents for {}: {}", name, err);
                return Err(err.into());
            }
        };

        if contents.is_empty() {
            self.cells.remove(&name);
        } else if let Some(cell) = self.cells.get_mut(&name) {
            cell.contents = contents;
        } else {
            self.cells.insert(
                name.clone(),
                Cell {
                    contents,
                    value: CellValue::Empty,
                },
            );
        }
        self.changed = true;

        self.recalculate(&order);
        debug!("Set {}; recalculated {:?}", name, order);
        Ok(order)
    }

    /// Recompute cell values in the given order.
    fn recalculate(&mut self, order: &[String]) {
        for name in order {
            let Some(cell) = self.cells.get(name) else {
                continue;
            };
            let value = self.compute_value(&cell.contents);
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
    }

    fn compute_value(&self, contents: &CellContents) -> CellValue {
        match contents {
            CellContents::Empty => CellValue::Empty,
            CellContents::Text(s) => CellValue::Text(s.clone()),
            CellContents::Number(n) => CellValue::Number(*n),
            CellContents::Formula(f) => f
                .evaluate(|variable| self.cells.get(variable)?.value.as_number())
                .into(),
        }
    }
}
