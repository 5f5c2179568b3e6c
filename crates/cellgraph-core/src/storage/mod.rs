//! Storage module for reading and writing spreadsheet documents.
//!
//! Documents are XML: one `spreadsheet` root carrying a `version` attribute
//! and one `cell` element per non-empty cell, each holding a `name` and the
//! cell's `contents` as the user would type them.

mod parser;
mod writer;

pub use parser::{SavedCell, SavedSheet, parse_xml, parse_xml_content, read_version};
pub use writer::{write_xml, write_xml_content};
