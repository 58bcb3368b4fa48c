use crate::config::Config;
use crate::error::ProexyError;
use crate::extraction::ruling::{page_rulings, Orientation, Ruling};
use crate::extraction::{group_runs, PageContent, TextSpan, Word};
use serde::Serialize;

/// Rulings within this distance are treated as the same grid line.
const SNAP_TOLERANCE: f32 = 3.0;

/// How a table is located on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStrategy {
    /// Cells bounded by visible ruling lines (lattice).
    Grid,
    /// Cells inferred from text alignment and whitespace (stream).
    Positional,
}

impl std::fmt::Display for TableStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableStrategy::Grid => write!(f, "grid"),
            TableStrategy::Positional => write!(f, "positional"),
        }
    }
}

/// A detected table as a grid of cell strings, top row first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        RawTable { rows }
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trait for table detection backends.
pub trait TableDetector: Send + Sync {
    /// Find tables on `page` of the PDF in `pdf_bytes`, top to bottom.
    fn detect_tables(
        &self,
        pdf_bytes: &[u8],
        page: &PageContent,
        strategy: TableStrategy,
    ) -> Result<Vec<RawTable>, ProexyError>;
}

/// Table detection from the page's own geometry: rulings read with lopdf
/// for grid tables, word positions for positional tables.
pub struct LayoutTableDetector {
    pub line_scale: f32,
    pub gap_ratio: f32,
}

impl LayoutTableDetector {
    pub fn new(config: &Config) -> Self {
        LayoutTableDetector {
            line_scale: config.line_scale,
            gap_ratio: config.span_gap_ratio,
        }
    }
}

impl Default for LayoutTableDetector {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl TableDetector for LayoutTableDetector {
    fn detect_tables(
        &self,
        pdf_bytes: &[u8],
        page: &PageContent,
        strategy: TableStrategy,
    ) -> Result<Vec<RawTable>, ProexyError> {
        match strategy {
            TableStrategy::Grid => {
                let rulings = page_rulings(
                    pdf_bytes,
                    page.page_number,
                    page.width,
                    page.height,
                    self.line_scale,
                )?;
                log::debug!(
                    "page {}: {} rulings for grid detection",
                    page.page_number,
                    rulings.len()
                );
                Ok(grid_tables(&rulings, page))
            }
            TableStrategy::Positional => {
                Ok(positional_table(page, self.gap_ratio).into_iter().collect())
            }
        }
    }
}

/// Build one table per connected group of rulings that forms a grid.
pub fn grid_tables(rulings: &[Ruling], page: &PageContent) -> Vec<RawTable> {
    let words: Vec<&Word> = page.words().collect();
    let mut found: Vec<(f32, RawTable)> = Vec::new();

    for cluster in cluster_rulings(rulings) {
        let ys = snap_positions(
            cluster
                .iter()
                .filter(|r| r.orientation == Orientation::Horizontal)
                .map(|r| r.position),
        );
        let xs = snap_positions(
            cluster
                .iter()
                .filter(|r| r.orientation == Orientation::Vertical)
                .map(|r| r.position),
        );
        if ys.len() < 2 || xs.len() < 2 {
            continue;
        }

        let mut cells: Vec<Vec<Vec<&Word>>> = vec![vec![Vec::new(); xs.len() - 1]; ys.len() - 1];
        for &word in &words {
            let (Some(row), Some(col)) = (
                interval_index(&ys, word.bbox.y_center()),
                interval_index(&xs, word.bbox.x_center()),
            ) else {
                continue;
            };
            cells[row][col].push(word);
        }

        let rows: Vec<Vec<String>> = cells
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .collect();

        if !rows.is_empty() {
            found.push((ys[0], RawTable::new(rows)));
        }
    }

    found.sort_by(|a, b| a.0.total_cmp(&b.0));
    found.into_iter().map(|(_, t)| t).collect()
}

/// Infer a single table from text alignment.
///
/// The table body is the longest block of consecutive visual rows that
/// hold at least two text runs. Column edges come from the rows with the
/// most runs; every other row's runs are assigned to the nearest column.
pub fn positional_table(page: &PageContent, gap_ratio: f32) -> Option<RawTable> {
    let rows: Vec<Vec<TextSpan>> = visual_rows(page.words().collect())
        .iter()
        .map(|row| group_runs(row, gap_ratio))
        .collect();

    let mut best: Option<(usize, usize)> = None;
    let mut start = 0;
    while start < rows.len() {
        if rows[start].len() < 2 {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < rows.len() && rows[end].len() >= 2 {
            end += 1;
        }
        if best.map_or(true, |(s, e)| end - start > e - s) {
            best = Some((start, end));
        }
        start = end;
    }

    let (start, end) = best?;
    let body = &rows[start..end];
    if body.len() < 2 {
        return None;
    }

    let widest = body.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut intervals: Vec<(f32, f32)> = body
        .iter()
        .filter(|r| r.len() == widest)
        .flat_map(|r| r.iter().map(|s| (s.bbox.x_min, s.bbox.x_max)))
        .collect();
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut columns: Vec<(f32, f32)> = Vec::new();
    for (lo, hi) in intervals {
        match columns.last_mut() {
            Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
            _ => columns.push((lo, hi)),
        }
    }

    let table_rows = body
        .iter()
        .map(|row| {
            let mut cells = vec![String::new(); columns.len()];
            for span in row {
                let col = nearest_column(&columns, span.bbox.x_center());
                if !cells[col].is_empty() {
                    cells[col].push(' ');
                }
                cells[col].push_str(&span.text);
            }
            cells
        })
        .collect();

    Some(RawTable::new(table_rows))
}

/// Group words into visual rows by vertical centre, each sorted left to right.
fn visual_rows(mut words: Vec<&Word>) -> Vec<Vec<Word>> {
    words.sort_by(|a, b| a.bbox.y_center().total_cmp(&b.bbox.y_center()));

    let mut rows: Vec<(f32, Vec<Word>)> = Vec::new();
    for word in words {
        let tol = (word.bbox.height() / 2.0).max(2.0);
        match rows.last_mut() {
            Some((y, row)) if (word.bbox.y_center() - *y).abs() <= tol => {
                row.push(word.clone());
            }
            _ => rows.push((word.bbox.y_center(), vec![word.clone()])),
        }
    }

    rows.into_iter()
        .map(|(_, mut row)| {
            row.sort_by(|a, b| a.bbox.x_min.total_cmp(&b.bbox.x_min));
            row
        })
        .collect()
}

fn nearest_column(columns: &[(f32, f32)], x: f32) -> usize {
    let distance = |&(lo, hi): &(f32, f32)| {
        if x < lo {
            lo - x
        } else if x > hi {
            x - hi
        } else {
            0.0
        }
    };
    columns
        .iter()
        .enumerate()
        .min_by(|a, b| distance(a.1).total_cmp(&distance(b.1)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Union-find over touching rulings.
fn cluster_rulings(rulings: &[Ruling]) -> Vec<Vec<Ruling>> {
    let mut parent: Vec<usize> = (0..rulings.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..rulings.len() {
        for j in (i + 1)..rulings.len() {
            if rulings[i].touches(&rulings[j], SNAP_TOLERANCE) {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                if a != b {
                    parent[b] = a;
                }
            }
        }
    }

    let mut groups: Vec<(usize, Vec<Ruling>)> = Vec::new();
    for (i, ruling) in rulings.iter().enumerate() {
        let root = find(&mut parent, i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, group)) => group.push(*ruling),
            None => groups.push((root, vec![*ruling])),
        }
    }
    groups.into_iter().map(|(_, g)| g).collect()
}

/// Sorted distinct positions, merging those within `SNAP_TOLERANCE`.
fn snap_positions(positions: impl Iterator<Item = f32>) -> Vec<f32> {
    let mut sorted: Vec<f32> = positions.collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut snapped: Vec<f32> = Vec::new();
    for p in sorted {
        match snapped.last() {
            Some(&last) if p - last <= SNAP_TOLERANCE => {}
            _ => snapped.push(p),
        }
    }
    snapped
}

/// Index `i` such that `edges[i] <= v < edges[i + 1]`.
fn interval_index(edges: &[f32], v: f32) -> Option<usize> {
    edges.windows(2).position(|w| v >= w[0] && v < w[1])
}

fn cell_text(mut words: Vec<&Word>) -> String {
    words.sort_by(|a, b| {
        let line_a = (a.bbox.y_min / 2.0).round();
        let line_b = (b.bbox.y_min / 2.0).round();
        line_a
            .total_cmp(&line_b)
            .then(a.bbox.x_min.total_cmp(&b.bbox.x_min))
    });
    words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{BBox, TextLine};

    fn word(text: &str, x: f32, y: f32) -> Word {
        let width = 6.0 * text.len() as f32;
        Word {
            text: text.into(),
            bbox: BBox::new(x, y, x + width, y + 10.0),
        }
    }

    fn page(lines: Vec<Vec<Word>>) -> PageContent {
        PageContent {
            page_number: 1,
            width: 600.0,
            height: 800.0,
            lines: lines.into_iter().map(|words| TextLine { words }).collect(),
        }
    }

    fn h(y: f32, start: f32, end: f32) -> Ruling {
        Ruling {
            orientation: Orientation::Horizontal,
            position: y,
            start,
            end,
        }
    }

    fn v(x: f32, start: f32, end: f32) -> Ruling {
        Ruling {
            orientation: Orientation::Vertical,
            position: x,
            start,
            end,
        }
    }

    #[test]
    fn grid_assigns_words_to_cells() {
        // 2 rows x 3 columns between x = 0,100,200,300 and y = 100,120,140
        let rulings = vec![
            h(100.0, 0.0, 300.0),
            h(120.0, 0.0, 300.0),
            h(140.0, 0.0, 300.0),
            v(0.0, 100.0, 140.0),
            v(100.0, 100.0, 140.0),
            v(200.0, 100.0, 140.0),
            v(300.0, 100.0, 140.0),
        ];
        let p = page(vec![
            vec![word("S-No", 5.0, 105.0), word("Tag", 105.0, 105.0), word("Pass/Fail", 205.0, 105.0)],
            vec![word("1", 5.0, 125.0), word("EX-01", 105.0, 125.0), word("Pass", 205.0, 125.0)],
        ]);

        let tables = grid_tables(&rulings, &p);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].column_count(), 3);
        assert_eq!(tables[0].rows[0], vec!["S-No", "Tag", "Pass/Fail"]);
        assert_eq!(tables[0].rows[1], vec!["1", "EX-01", "Pass"]);
    }

    #[test]
    fn grid_needs_two_lines_each_way() {
        let rulings = vec![h(100.0, 0.0, 300.0), h(120.0, 0.0, 300.0)];
        let p = page(vec![vec![word("1", 5.0, 105.0)]]);
        assert!(grid_tables(&rulings, &p).is_empty());
    }

    #[test]
    fn separate_grids_are_separate_tables() {
        let rulings = vec![
            h(400.0, 0.0, 100.0),
            h(420.0, 0.0, 100.0),
            v(0.0, 400.0, 420.0),
            v(100.0, 400.0, 420.0),
            h(100.0, 0.0, 100.0),
            h(120.0, 0.0, 100.0),
            v(0.0, 100.0, 120.0),
            v(100.0, 100.0, 120.0),
        ];
        let p = page(vec![vec![word("top", 5.0, 105.0)], vec![word("bottom", 5.0, 405.0)]]);
        let tables = grid_tables(&rulings, &p);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows[0][0], "top");
        assert_eq!(tables[1].rows[0][0], "bottom");
    }

    #[test]
    fn positional_table_from_aligned_text() {
        let p = page(vec![
            vec![word("Inspection", 10.0, 50.0), word("report", 72.0, 50.0)],
            vec![word("No", 10.0, 100.0), word("Tag", 100.0, 100.0), word("Result", 200.0, 100.0)],
            vec![word("1", 10.0, 115.0), word("EX-01", 100.0, 115.0), word("Pass", 200.0, 115.0)],
            vec![word("2", 10.0, 130.0), word("EX-02", 100.0, 130.0), word("Fail", 200.0, 130.0)],
            vec![word("Signed", 10.0, 300.0)],
        ]);

        let table = positional_table(&p, 0.6).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1], vec!["1", "EX-01", "Pass"]);
        assert_eq!(table.rows[2], vec!["2", "EX-02", "Fail"]);
    }

    #[test]
    fn positional_needs_a_body() {
        let p = page(vec![vec![word("Just", 10.0, 50.0)], vec![word("text", 10.0, 70.0)]]);
        assert!(positional_table(&p, 0.6).is_none());
    }

    #[test]
    fn snap_merges_close_positions() {
        let snapped = snap_positions(vec![10.0, 10.5, 50.0, 12.0, 49.0].into_iter());
        assert_eq!(snapped, vec![10.0, 49.0]);
    }
}
