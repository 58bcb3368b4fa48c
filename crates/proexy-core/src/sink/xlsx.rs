//! Minimal OOXML workbook writer.
//!
//! One worksheet of inline-string cells with a bold header row. No
//! timestamps or document properties are written, so equal datasets give
//! byte-identical files.

use std::io::{Cursor, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::aggregate::Dataset;
use crate::error::ProexyError;
use crate::sink::RecordSink;

const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// Style 0 is the default cell, style 1 the bold header cell.
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Excel rejects longer sheet names.
const MAX_SHEET_NAME: usize = 31;

/// Writes datasets as single-sheet `.xlsx` workbooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxSink;

impl XlsxSink {
    pub fn new() -> Self {
        XlsxSink
    }

    /// Encode a dataset as workbook bytes.
    pub fn to_bytes(&self, dataset: &Dataset) -> Result<Vec<u8>, ProexyError> {
        let workbook = workbook_xml(&dataset.sheet_name)?;
        let sheet = sheet_xml(dataset)?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let parts: [(&str, &[u8]); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", ROOT_RELS.as_bytes()),
            ("xl/workbook.xml", &workbook),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
            ("xl/styles.xml", STYLES.as_bytes()),
            ("xl/worksheets/sheet1.xml", &sheet),
        ];
        for (name, content) in parts {
            zip.start_file(name, options).map_err(serialization)?;
            zip.write_all(content).map_err(serialization)?;
        }

        let cursor = zip.finish().map_err(serialization)?;
        Ok(cursor.into_inner())
    }
}

impl RecordSink for XlsxSink {
    fn write(&self, dataset: &Dataset, path: &Path) -> Result<(), ProexyError> {
        let bytes = self.to_bytes(dataset)?;
        std::fs::write(path, bytes)
            .map_err(|e| ProexyError::Serialization(format!("{}: {e}", path.display())))?;
        log::debug!(
            "wrote {} rows to sheet '{}' in {}",
            dataset.row_count(),
            dataset.sheet_name,
            path.display()
        );
        Ok(())
    }
}

fn serialization(e: impl std::fmt::Display) -> ProexyError {
    ProexyError::Serialization(e.to_string())
}

/// Spreadsheet column letters for a 0-based index: 0 is A, 26 is AA.
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Character width of the longest cell in each column, plus 2.
pub fn column_widths(dataset: &Dataset) -> Vec<usize> {
    let mut widths: Vec<usize> = dataset.headers.iter().map(|h| h.chars().count()).collect();
    for row in &dataset.rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }
    widths.into_iter().map(|w| w + 2).collect()
}

fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

fn workbook_xml(name: &str) -> Result<Vec<u8>, ProexyError> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(serialization)?;

    let mut root = BytesStart::new("workbook");
    root.push_attribute(("xmlns", SHEET_NS));
    root.push_attribute(("xmlns:r", REL_NS));
    w.write_event(Event::Start(root)).map_err(serialization)?;
    w.write_event(Event::Start(BytesStart::new("sheets")))
        .map_err(serialization)?;

    let display_name = sheet_name(name);
    let mut sheet = BytesStart::new("sheet");
    sheet.push_attribute(("name", display_name.as_str()));
    sheet.push_attribute(("sheetId", "1"));
    sheet.push_attribute(("r:id", "rId1"));
    w.write_event(Event::Empty(sheet)).map_err(serialization)?;

    w.write_event(Event::End(BytesEnd::new("sheets")))
        .map_err(serialization)?;
    w.write_event(Event::End(BytesEnd::new("workbook")))
        .map_err(serialization)?;
    Ok(w.into_inner())
}

fn sheet_xml(dataset: &Dataset) -> Result<Vec<u8>, ProexyError> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(serialization)?;

    let mut root = BytesStart::new("worksheet");
    root.push_attribute(("xmlns", SHEET_NS));
    w.write_event(Event::Start(root)).map_err(serialization)?;

    let widths = column_widths(dataset);
    if !widths.is_empty() {
        w.write_event(Event::Start(BytesStart::new("cols")))
            .map_err(serialization)?;
        for (i, width) in widths.iter().enumerate() {
            let index = (i + 1).to_string();
            let width = width.to_string();
            let mut col = BytesStart::new("col");
            col.push_attribute(("min", index.as_str()));
            col.push_attribute(("max", index.as_str()));
            col.push_attribute(("width", width.as_str()));
            col.push_attribute(("customWidth", "1"));
            w.write_event(Event::Empty(col)).map_err(serialization)?;
        }
        w.write_event(Event::End(BytesEnd::new("cols")))
            .map_err(serialization)?;
    }

    w.write_event(Event::Start(BytesStart::new("sheetData")))
        .map_err(serialization)?;
    write_row(&mut w, 1, &dataset.headers, Some("1"))?;
    for (i, row) in dataset.rows.iter().enumerate() {
        write_row(&mut w, i + 2, row, None)?;
    }
    w.write_event(Event::End(BytesEnd::new("sheetData")))
        .map_err(serialization)?;
    w.write_event(Event::End(BytesEnd::new("worksheet")))
        .map_err(serialization)?;
    Ok(w.into_inner())
}

fn write_row(
    w: &mut Writer<Vec<u8>>,
    number: usize,
    cells: &[String],
    style: Option<&str>,
) -> Result<(), ProexyError> {
    let number_attr = number.to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", number_attr.as_str()));
    w.write_event(Event::Start(row)).map_err(serialization)?;

    for (i, value) in cells.iter().enumerate() {
        // Empty cells are omitted; readers treat missing cells as blank.
        if value.is_empty() {
            continue;
        }
        let reference = format!("{}{number}", column_name(i));
        let mut cell = BytesStart::new("c");
        cell.push_attribute(("r", reference.as_str()));
        if let Some(style) = style {
            cell.push_attribute(("s", style));
        }
        cell.push_attribute(("t", "inlineStr"));
        w.write_event(Event::Start(cell)).map_err(serialization)?;
        w.write_event(Event::Start(BytesStart::new("is")))
            .map_err(serialization)?;
        let mut text = BytesStart::new("t");
        text.push_attribute(("xml:space", "preserve"));
        w.write_event(Event::Start(text)).map_err(serialization)?;
        w.write_event(Event::Text(BytesText::new(value)))
            .map_err(serialization)?;
        w.write_event(Event::End(BytesEnd::new("t")))
            .map_err(serialization)?;
        w.write_event(Event::End(BytesEnd::new("is")))
            .map_err(serialization)?;
        w.write_event(Event::End(BytesEnd::new("c")))
            .map_err(serialization)?;
    }

    w.write_event(Event::End(BytesEnd::new("row")))
        .map_err(serialization)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Family;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

    fn dataset() -> Dataset {
        let mut d = Dataset::new(Family::Oman, vec!["Sl. No".into(), "CLIENT TAG".into()]);
        d.rows.push(vec!["1".into(), "P-101 <A&B>".into()]);
        d.rows.push(vec!["2".into(), String::new()]);
        d
    }

    #[test]
    fn column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn widths_follow_longest_cell() {
        assert_eq!(column_widths(&dataset()), vec![8, 13]);
    }

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sheet_name("Oman"), "Oman");
        assert_eq!(sheet_name("a/b"), "a_b");
        assert_eq!(sheet_name(""), "Sheet1");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
    }

    #[test]
    fn workbook_reads_back() {
        let bytes = XlsxSink::new().to_bytes(&dataset()).unwrap();
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Oman Certificates".to_string()]);

        let range = workbook.worksheet_range("Oman Certificates").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Sl. No".into())));
        assert_eq!(
            range.get_value((1, 1)),
            Some(&Data::String("P-101 <A&B>".into()))
        );
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("2".into())));
        assert!(matches!(range.get_value((2, 1)), None | Some(Data::Empty)));
    }

    #[test]
    fn output_is_deterministic() {
        let sink = XlsxSink::new();
        assert_eq!(
            sink.to_bytes(&dataset()).unwrap(),
            sink.to_bytes(&dataset()).unwrap()
        );
    }

    #[test]
    fn header_cells_use_bold_style() {
        let sheet = String::from_utf8(sheet_xml(&dataset()).unwrap()).unwrap();
        assert!(sheet.contains(r#"<c r="A1" s="1" t="inlineStr">"#));
        assert!(sheet.contains(r#"<c r="A2" t="inlineStr">"#));
        assert!(sheet.contains("P-101 &lt;A&amp;B&gt;"));
    }
}
