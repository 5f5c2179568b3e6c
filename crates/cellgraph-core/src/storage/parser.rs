//! Parser for the XML spreadsheet format

use crate::error::{Result, SpreadsheetError};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;

/// One persisted cell: its name and contents as typed by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedCell {
    pub name: String,
    pub contents: String,
}

/// A persisted spreadsheet document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SavedSheet {
    pub version: String,
    pub cells: Vec<SavedCell>,
}

/// Parse a document from `path`.
pub fn parse_xml(path: &Path) -> Result<SavedSheet> {
    let content = fs::read_to_string(path)?;
    parse_xml_content(&content)
}

/// Read only the version tag of the document at `path`.
pub fn read_version(path: &Path) -> Result<String> {
    parse_xml(path).map(|sheet| sheet.version)
}

fn malformed(message: impl Into<String>) -> SpreadsheetError {
    SpreadsheetError::ReadWrite(message.into())
}

/// Element names are matched case-insensitively.
fn tag_of(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Name,
    Contents,
}

#[derive(Default)]
struct PartialCell {
    name: Option<String>,
    contents: Option<String>,
}

impl PartialCell {
    fn field_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Contents => &mut self.contents,
        }
    }

    fn finish(self) -> Result<SavedCell> {
        let name = self
            .name
            .ok_or_else(|| malformed("cell element is missing its name"))?;
        let contents = self
            .contents
            .ok_or_else(|| malformed(format!("cell {name} is missing its contents")))?;
        Ok(SavedCell {
            name: name.trim().to_string(),
            contents,
        })
    }
}

#[derive(Default)]
struct ParseState {
    version: Option<String>,
    in_root: bool,
    closed: bool,
    cell: Option<PartialCell>,
    field: Option<Field>,
    cells: Vec<SavedCell>,
}

impl ParseState {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let tag = tag_of(e);
        match tag.as_str() {
            "spreadsheet" => {
                if self.in_root || self.closed {
                    return Err(malformed("unexpected nested spreadsheet element"));
                }
                let mut version = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.local_name().as_ref().eq_ignore_ascii_case(b"version") {
                        version = Some(attr.unescape_value()?.into_owned());
                    }
                }
                let version =
                    version.ok_or_else(|| malformed("spreadsheet element has no version"))?;
                self.version = Some(version);
                self.in_root = true;
            }
            "cell" => {
                if !self.in_root || self.cell.is_some() {
                    return Err(malformed("cell element outside spreadsheet"));
                }
                self.cell = Some(PartialCell::default());
            }
            "name" | "contents" => {
                let field = if tag == "name" {
                    Field::Name
                } else {
                    Field::Contents
                };
                let Some(cell) = self.cell.as_mut() else {
                    return Err(malformed(format!("{tag} element outside cell")));
                };
                if self.field.is_some() || cell.field_mut(field).is_some() {
                    return Err(malformed(format!("duplicate {tag} element")));
                }
                *cell.field_mut(field) = Some(String::new());
                self.field = Some(field);
            }
            other => return Err(malformed(format!("unexpected element <{other}>"))),
        }
        Ok(())
    }

    fn close(&mut self, tag: &str) -> Result<()> {
        match tag {
            "spreadsheet" => {
                self.in_root = false;
                self.closed = true;
            }
            "cell" => {
                if let Some(cell) = self.cell.take() {
                    self.cells.push(cell.finish()?);
                }
            }
            _ => self.field = None,
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        match (self.field, self.cell.as_mut()) {
            (Some(field), Some(cell)) => {
                cell.field_mut(field).get_or_insert_with(String::new).push_str(text);
                Ok(())
            }
            _ if text.trim().is_empty() => Ok(()),
            _ => Err(malformed(format!("unexpected text {:?}", text.trim()))),
        }
    }
}

/// Parse a document from a string.
pub fn parse_xml_content(content: &str) -> Result<SavedSheet> {
    let mut reader = Reader::from_str(content);
    let mut state = ParseState::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => state.open(&e)?,
            Event::Empty(e) => {
                state.open(&e)?;
                state.close(&tag_of(&e))?;
            }
            Event::End(e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase();
                state.close(&tag)?;
            }
            Event::Text(e) => state.text(&e.unescape()?)?,
            Event::CData(e) => state.text(&String::from_utf8_lossy(&e.into_inner()))?,
            Event::Eof => break,
            _ => {}
        }
    }

    if !state.closed {
        return Err(malformed("document has no complete spreadsheet element"));
    }
    let version = state.version.unwrap_or_default();
    Ok(SavedSheet {
        version,
        cells: state.cells,
    })
}
