pub mod pdftotext;
pub mod ruling;
pub mod table;

use crate::error::ProexyError;
use serde::Serialize;

/// Axis-aligned box in page space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        BBox {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    pub fn x_center(&self) -> f32 {
        (self.x_min + self.x_max) / 2.0
    }

    pub fn y_center(&self) -> f32 {
        (self.y_min + self.y_max) / 2.0
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// A single word as reported by the text backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

/// One printed line: the words the backend grouped together, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub words: Vec<Word>,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A contiguous run of text with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSpan {
    pub text: String,
    pub bbox: BBox,
    pub y_center: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        TextSpan {
            text: text.into(),
            y_center: bbox.y_center(),
            bbox,
        }
    }
}

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<TextLine>,
}

impl PageContent {
    /// Plain page text, one printed line per text line.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.lines.iter().flat_map(|l| l.words.iter())
    }

    /// Group each line's words into text runs.
    ///
    /// A run ends where the gap to the next word is wider than
    /// `gap_ratio` times the word height, or right after leading words
    /// that `is_label` accepts.
    pub fn spans(&self, gap_ratio: f32, is_label: impl Fn(&str) -> bool) -> Vec<TextSpan> {
        self.lines
            .iter()
            .flat_map(|line| group_runs_with(&line.words, gap_ratio, &is_label))
            .collect()
    }
}

/// Split a left-to-right word sequence into runs at wide gaps.
pub fn group_runs(words: &[Word], gap_ratio: f32) -> Vec<TextSpan> {
    group_runs_with(words, gap_ratio, |_| false)
}

/// Like [`group_runs`], but a run that opens with a label is cut right
/// after it, so a label and its value stay apart even when only a normal
/// space separates them. `is_label` sees the joined text of a leading
/// group of words; the longest accepted group wins, and a run that is a
/// label as a whole is kept intact.
pub fn group_runs_with(
    words: &[Word],
    gap_ratio: f32,
    is_label: impl Fn(&str) -> bool,
) -> Vec<TextSpan> {
    let mut groups: Vec<Vec<&Word>> = Vec::new();
    let mut bbox: Option<BBox> = None;

    for word in words.iter().filter(|w| !w.text.trim().is_empty()) {
        let joins = bbox.is_some_and(|b| {
            let gap = word.bbox.x_min - b.x_max;
            gap <= gap_ratio * word.bbox.height().max(b.height())
        });
        match groups.last_mut() {
            Some(group) if joins => {
                group.push(word);
                bbox = bbox.map(|b| b.union(&word.bbox));
            }
            _ => {
                groups.push(vec![word]);
                bbox = Some(word.bbox);
            }
        }
    }

    groups
        .into_iter()
        .flat_map(|group| split_leading_label(group, &is_label))
        .map(|group| run_span(&group))
        .collect()
}

fn split_leading_label<'a>(
    mut group: Vec<&'a Word>,
    is_label: &impl Fn(&str) -> bool,
) -> Vec<Vec<&'a Word>> {
    if is_label(&join_words(&group)) {
        return vec![group];
    }
    match (1..group.len())
        .rev()
        .find(|&k| is_label(&join_words(&group[..k])))
    {
        Some(k) => {
            let tail = group.split_off(k);
            vec![group, tail]
        }
        None => vec![group],
    }
}

fn join_words(words: &[&Word]) -> String {
    words
        .iter()
        .map(|w| w.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

// Groups are never empty.
fn run_span(words: &[&Word]) -> TextSpan {
    let bbox = words[1..]
        .iter()
        .fold(words[0].bbox, |acc, w| acc.union(&w.bbox));
    TextSpan::new(join_words(words), bbox)
}

/// An opened PDF: every page's text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub pages: Vec<PageContent>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&PageContent> {
        self.pages.get(index)
    }

    pub fn last_page(&self) -> Option<&PageContent> {
        self.pages.last()
    }

    pub fn page_text(&self, index: usize) -> Option<String> {
        self.page(index).map(|p| p.text())
    }

    pub fn page_spans(
        &self,
        index: usize,
        gap_ratio: f32,
        is_label: impl Fn(&str) -> bool,
    ) -> Vec<TextSpan> {
        self.page(index)
            .map(|p| p.spans(gap_ratio, is_label))
            .unwrap_or_default()
    }
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Open PDF bytes and extract the positioned text of every page.
    ///
    /// Fails with `DocumentOpen` when the file is unreadable or has no pages.
    fn open(&self, pdf_bytes: &[u8]) -> Result<Document, ProexyError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
