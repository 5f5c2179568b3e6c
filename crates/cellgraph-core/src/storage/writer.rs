//! Writer for the XML spreadsheet format

use crate::error::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::SavedSheet;

/// Write a document to `path`, replacing any existing file.
pub fn write_xml(path: &Path, sheet: &SavedSheet) -> Result<()> {
    let content = write_xml_content(sheet)?;
    fs::write(path, content)?;
    Ok(())
}

/// Render a document as an indented XML string. Cells are written in the
/// order given.
pub fn write_xml_content(sheet: &SavedSheet) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("spreadsheet");
    root.push_attribute(("version", sheet.version.as_str()));
    writer.write_event(Event::Start(root))?;

    for cell in &sheet.cells {
        writer.write_event(Event::Start(BytesStart::new("cell")))?;
        writer
            .create_element("name")
            .write_text_content(BytesText::new(&cell.name))?;
        writer
            .create_element("contents")
            .write_text_content(BytesText::new(&cell.contents))?;
        writer.write_event(Event::End(BytesEnd::new("cell")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("spreadsheet")))?;

    let bytes = writer.into_inner().into_inner();
    let mut content = String::from_utf8_lossy(&bytes).into_owned();
    content.push('\n');
    Ok(content)
}
