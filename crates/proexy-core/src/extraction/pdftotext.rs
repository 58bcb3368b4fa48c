use crate::error::ProexyError;
use crate::extraction::{BBox, Document, PageContent, PdfExtractor, TextLine, Word};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Write;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox-layout`, which reports every word with its box
/// and groups words into blocks and lines the same way the page was laid
/// out.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn open(&self, pdf_bytes: &[u8]) -> Result<Document, ProexyError> {
        if pdf_bytes.is_empty() {
            return Err(ProexyError::DocumentOpen("file is empty".into()));
        }

        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| ProexyError::DocumentOpen(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| ProexyError::DocumentOpen(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-bbox-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProexyError::PdftotextNotFound
                } else {
                    ProexyError::DocumentOpen(format!("pdftotext -bbox-layout failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(ProexyError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let pages = parse_bbox_xml(&xml)?;
        if pages.is_empty() {
            return Err(ProexyError::DocumentOpen("document has no pages".into()));
        }

        Ok(Document { pages })
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Parse `pdftotext -bbox-layout` XHTML into pages of lines of words.
fn parse_bbox_xml(xml: &str) -> Result<Vec<PageContent>, ProexyError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;

    let mut pages = Vec::new();
    let mut page: Option<PageContent> = None;
    let mut line: Option<TextLine> = None;
    let mut word: Option<(BBox, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"page" => {
                    page = Some(PageContent {
                        page_number: pages.len() + 1,
                        width: attr_f32(&e, "width").unwrap_or(0.0),
                        height: attr_f32(&e, "height").unwrap_or(0.0),
                        lines: Vec::new(),
                    });
                }
                b"line" => line = Some(TextLine { words: Vec::new() }),
                b"word" => word = parse_bbox(&e).map(|bbox| (bbox, String::new())),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let Some((_, text)) = word.as_mut() {
                    let decoded = t.unescape().map_err(|e| {
                        ProexyError::DocumentOpen(format!("malformed pdftotext output: {e}"))
                    })?;
                    text.push_str(&decoded);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"word" => {
                    if let (Some((bbox, text)), Some(l)) = (word.take(), line.as_mut()) {
                        let text = text.trim();
                        if !text.is_empty() {
                            l.words.push(Word {
                                text: text.to_string(),
                                bbox,
                            });
                        }
                    }
                }
                b"line" => {
                    if let (Some(l), Some(p)) = (line.take(), page.as_mut()) {
                        if !l.words.is_empty() {
                            p.lines.push(l);
                        }
                    }
                }
                b"page" => {
                    if let Some(p) = page.take() {
                        pages.push(p);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ProexyError::DocumentOpen(format!(
                    "malformed pdftotext output at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(pages)
}

fn attr_f32(tag: &BytesStart<'_>, name: &str) -> Option<f32> {
    let attr = tag.try_get_attribute(name).ok()??;
    std::str::from_utf8(&attr.value).ok()?.trim().parse().ok()
}

fn parse_bbox(tag: &BytesStart<'_>) -> Option<BBox> {
    Some(BBox {
        x_min: attr_f32(tag, "xMin")?,
        y_min: attr_f32(tag, "yMin")?,
        x_max: attr_f32(tag, "xMax")?,
        y_max: attr_f32(tag, "yMax")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title></title>
<meta name="Producer" content="Test"/>
</head>
<body>
<doc>
  <page width="595.276000" height="841.890000">
    <flow>
      <block xMin="10.0" yMin="20.0" xMax="200.0" yMax="30.0">
        <line xMin="10.0" yMin="20.0" xMax="200.0" yMax="30.0">
          <word xMin="10.0" yMin="20.0" xMax="50.0" yMax="30.0">VISUAL</word>
          <word xMin="52.0" yMin="20.0" xMax="60.0" yMax="30.0">&amp;</word>
          <word xMin="62.0" yMin="20.0" xMax="100.0" yMax="30.0">CLOSE</word>
        </line>
        <line xMin="10.0" yMin="40.0" xMax="200.0" yMax="50.0">
          <word xMin="10.0" yMin="40.0" xMax="50.0" yMax="50.0">REPORT</word>
          <word xMin="52.0" yMin="40.0" xMax="70.0" yMax="50.0">FOR</word>
        </line>
      </block>
    </flow>
  </page>
  <page width="595.276000" height="841.890000">
  </page>
</doc>
</body>
</html>
"#;

    #[test]
    fn test_parse_bbox_xml_pages_and_lines() {
        let pages = parse_bbox_xml(SAMPLE).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 2);
        assert!((pages[0].height - 841.89).abs() < 0.01);
        assert_eq!(pages[0].lines.len(), 2);
        assert_eq!(pages[0].text(), "VISUAL & CLOSE\nREPORT FOR");
        assert!(pages[1].lines.is_empty());
    }

    #[test]
    fn test_parse_word_boxes() {
        let pages = parse_bbox_xml(SAMPLE).unwrap();
        let words: Vec<&Word> = pages[0].words().collect();
        assert_eq!(words[0].bbox, BBox::new(10.0, 20.0, 50.0, 30.0));
        assert_eq!(words[1].text, "&");
    }

    #[test]
    fn test_empty_bytes_rejected() {
        let err = PdftotextExtractor::new().open(&[]).unwrap_err();
        assert!(matches!(err, ProexyError::DocumentOpen(_)));
    }
}
