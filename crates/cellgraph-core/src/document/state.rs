use crate::error::Result;
use cellgraph_engine::engine::{
    CellContents, CellValue, DependencyGraph, Normalizer, Validator, accept_all,
    identity_normalizer,
};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Version tag used when none is given.
pub const DEFAULT_VERSION: &str = "default";

/// A non-empty cell: its contents and the value last computed from them.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub contents: CellContents,
    pub value: CellValue,
}

/// UI-agnostic spreadsheet state.
///
/// Every cell name is normalized, then checked against the base name syntax
/// and the injected validator before it touches any state. Only non-empty
/// cells are stored; an absent name is an empty cell.
pub struct Spreadsheet {
    /// Non-empty cells keyed by normalized name
    pub(crate) cells: HashMap<String, Cell>,
    /// Edge (s, t) exists iff the formula in t references s
    pub(crate) graph: DependencyGraph,
    pub(crate) validator: Validator,
    pub(crate) normalizer: Normalizer,
    pub(crate) version: String,
    /// Whether the sheet has been modified since it was created, loaded or saved
    pub(crate) changed: bool,
}

impl Spreadsheet {
    /// An empty spreadsheet accepting every syntactically valid name as-is,
    /// versioned [`DEFAULT_VERSION`].
    pub fn new() -> Self {
        Self::with_rules(accept_all(), identity_normalizer(), DEFAULT_VERSION)
    }

    /// An empty spreadsheet with the given name rules and version tag.
    pub fn with_rules(validator: Validator, normalizer: Normalizer, version: &str) -> Self {
        Spreadsheet {
            cells: HashMap::new(),
            graph: DependencyGraph::new(),
            validator,
            normalizer,
            version: version.to_string(),
            changed: false,
        }
    }

    /// Load a saved spreadsheet, requiring its version tag to equal `version`.
    pub fn open(
        path: &Path,
        validator: Validator,
        normalizer: Normalizer,
        version: &str,
    ) -> Result<Self> {
        let mut sheet = Self::with_rules(validator, normalizer, version);
        sheet.load_file(path)?;
        Ok(sheet)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// True after any successful edit, until the next successful save.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("cells", &self.cells)
            .field("graph", &self.graph)
            .field("version", &self.version)
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}
