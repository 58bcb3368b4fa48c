//! Ruling-line recovery from page content streams.
//!
//! Grid table detection needs the visible lines a page draws, which the
//! text backend does not report. This module replays the path operators of
//! a page through `lopdf` and keeps the axis-aligned segments.

use crate::error::ProexyError;
use lopdf::content::{Content, Operation};
use lopdf::Object;

/// Segments closer than this to axis-aligned count as rulings.
const AXIS_TOLERANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned line in top-left page space.
///
/// `position` is the y of a horizontal ruling or the x of a vertical one;
/// `start..end` is its extent along the other axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruling {
    pub orientation: Orientation,
    pub position: f32,
    pub start: f32,
    pub end: f32,
}

impl Ruling {
    pub fn length(&self) -> f32 {
        self.end - self.start
    }

    /// Whether two rulings touch, allowing `tol` of slack.
    pub fn touches(&self, other: &Ruling, tol: f32) -> bool {
        match (self.orientation, other.orientation) {
            (Orientation::Horizontal, Orientation::Vertical)
            | (Orientation::Vertical, Orientation::Horizontal) => {
                other.position >= self.start - tol
                    && other.position <= self.end + tol
                    && self.position >= other.start - tol
                    && self.position <= other.end + tol
            }
            _ => {
                (self.position - other.position).abs() <= tol
                    && self.start <= other.end + tol
                    && other.start <= self.end + tol
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// `self` applied first, then `outer`.
    fn then(&self, outer: &Matrix) -> Matrix {
        Matrix {
            a: self.a * outer.a + self.b * outer.c,
            b: self.a * outer.b + self.b * outer.d,
            c: self.c * outer.a + self.d * outer.c,
            d: self.c * outer.b + self.d * outer.d,
            e: self.e * outer.a + self.f * outer.c + outer.e,
            f: self.e * outer.b + self.f * outer.d + outer.f,
        }
    }
}

/// Read the rulings drawn on one page (1-based) of a PDF.
///
/// Rulings shorter than the page dimension divided by `line_scale` are
/// dropped, which filters out underlines and glyph-sized strokes.
pub fn page_rulings(
    pdf_bytes: &[u8],
    page_number: usize,
    page_width: f32,
    page_height: f32,
    line_scale: f32,
) -> Result<Vec<Ruling>, ProexyError> {
    let doc = lopdf::Document::load_mem(pdf_bytes)
        .map_err(|e| ProexyError::DocumentOpen(format!("lopdf: {e}")))?;

    let page_id = doc
        .get_pages()
        .get(&(page_number as u32))
        .copied()
        .ok_or_else(|| ProexyError::DocumentOpen(format!("page {page_number} does not exist")))?;

    let data = doc
        .get_page_content(page_id)
        .map_err(|e| ProexyError::DocumentOpen(format!("page {page_number} content: {e}")))?;
    let content = Content::decode(&data)
        .map_err(|e| ProexyError::DocumentOpen(format!("page {page_number} content: {e}")))?;

    Ok(rulings_from_operations(
        &content.operations,
        page_width,
        page_height,
        line_scale,
    ))
}

/// Replay path construction and painting operators, collecting rulings.
pub fn rulings_from_operations(
    operations: &[Operation],
    page_width: f32,
    page_height: f32,
    line_scale: f32,
) -> Vec<Ruling> {
    let mut ctm = Matrix::IDENTITY;
    let mut stack: Vec<Matrix> = Vec::new();
    let mut path: Vec<((f32, f32), (f32, f32))> = Vec::new();
    let mut current = (0.0, 0.0);
    let mut subpath_start = (0.0, 0.0);
    let mut segments: Vec<((f32, f32), (f32, f32))> = Vec::new();

    for op in operations {
        let nums = numeric_operands(&op.operands);
        match (op.operator.as_str(), nums.as_slice()) {
            ("q", _) => stack.push(ctm),
            ("Q", _) => ctm = stack.pop().unwrap_or(Matrix::IDENTITY),
            ("cm", &[a, b, c, d, e, f]) => {
                ctm = Matrix { a, b, c, d, e, f }.then(&ctm);
            }
            ("m", &[x, y]) => {
                current = ctm.apply(x, y);
                subpath_start = current;
            }
            ("l", &[x, y]) => {
                let next = ctm.apply(x, y);
                path.push((current, next));
                current = next;
            }
            ("c", &[.., x, y]) | ("v", &[.., x, y]) | ("y", &[.., x, y]) => {
                current = ctm.apply(x, y);
            }
            ("re", &[x, y, w, h]) => {
                let corners = [
                    ctm.apply(x, y),
                    ctm.apply(x + w, y),
                    ctm.apply(x + w, y + h),
                    ctm.apply(x, y + h),
                ];
                for i in 0..4 {
                    path.push((corners[i], corners[(i + 1) % 4]));
                }
                current = corners[0];
                subpath_start = corners[0];
            }
            ("h", _) => {
                path.push((current, subpath_start));
                current = subpath_start;
            }
            ("S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*", _) => {
                if matches!(op.operator.as_str(), "s" | "b" | "b*") {
                    path.push((current, subpath_start));
                }
                segments.append(&mut path);
            }
            ("n", _) => path.clear(),
            _ => {}
        }
    }

    let min_horizontal = page_width / line_scale;
    let min_vertical = page_height / line_scale;

    segments
        .into_iter()
        .filter_map(|(p, q)| to_ruling(p, q, page_height))
        .filter(|r| match r.orientation {
            Orientation::Horizontal => r.length() >= min_horizontal,
            Orientation::Vertical => r.length() >= min_vertical,
        })
        .collect()
}

/// Convert a user-space segment to a top-left ruling if it is axis-aligned.
fn to_ruling(p: (f32, f32), q: (f32, f32), page_height: f32) -> Option<Ruling> {
    let (x1, y1) = (p.0, page_height - p.1);
    let (x2, y2) = (q.0, page_height - q.1);

    if (y1 - y2).abs() <= AXIS_TOLERANCE && (x1 - x2).abs() > AXIS_TOLERANCE {
        Some(Ruling {
            orientation: Orientation::Horizontal,
            position: (y1 + y2) / 2.0,
            start: x1.min(x2),
            end: x1.max(x2),
        })
    } else if (x1 - x2).abs() <= AXIS_TOLERANCE && (y1 - y2).abs() > AXIS_TOLERANCE {
        Some(Ruling {
            orientation: Orientation::Vertical,
            position: (x1 + x2) / 2.0,
            start: y1.min(y2),
            end: y1.max(y2),
        })
    } else {
        None
    }
}

fn numeric_operands(operands: &[Object]) -> Vec<f32> {
    operands
        .iter()
        .filter_map(|o| match o {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r as f32),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operator: &str, operands: &[i64]) -> Operation {
        Operation::new(
            operator,
            operands.iter().map(|&n| Object::Integer(n)).collect(),
        )
    }

    #[test]
    fn stroked_rectangle_yields_four_rulings() {
        let ops = vec![op("re", &[100, 500, 200, 100]), op("S", &[])];
        let rulings = rulings_from_operations(&ops, 600.0, 800.0, 40.0);
        assert_eq!(rulings.len(), 4);

        let horizontals: Vec<f32> = rulings
            .iter()
            .filter(|r| r.orientation == Orientation::Horizontal)
            .map(|r| r.position)
            .collect();
        // y flipped into top-left space: 800 - 500 and 800 - 600
        assert!(horizontals.contains(&300.0));
        assert!(horizontals.contains(&200.0));
    }

    #[test]
    fn unpainted_paths_are_discarded() {
        let ops = vec![op("re", &[0, 0, 600, 800]), op("W", &[]), op("n", &[])];
        assert!(rulings_from_operations(&ops, 600.0, 800.0, 40.0).is_empty());
    }

    #[test]
    fn short_strokes_are_ignored() {
        // 10pt is below 600 / 40 = 15pt
        let ops = vec![op("m", &[10, 10]), op("l", &[20, 10]), op("S", &[])];
        assert!(rulings_from_operations(&ops, 600.0, 800.0, 40.0).is_empty());
    }

    #[test]
    fn transform_is_applied() {
        let ops = vec![
            op("q", &[]),
            op("cm", &[1, 0, 0, 1, 50, 0]),
            op("m", &[0, 400]),
            op("l", &[100, 400]),
            op("S", &[]),
            op("Q", &[]),
        ];
        let rulings = rulings_from_operations(&ops, 600.0, 800.0, 40.0);
        assert_eq!(rulings.len(), 1);
        assert_eq!(rulings[0].start, 50.0);
        assert_eq!(rulings[0].end, 150.0);
        assert_eq!(rulings[0].position, 400.0);
    }

    #[test]
    fn crossing_rulings_touch() {
        let h = Ruling {
            orientation: Orientation::Horizontal,
            position: 100.0,
            start: 0.0,
            end: 200.0,
        };
        let v = Ruling {
            orientation: Orientation::Vertical,
            position: 50.0,
            start: 100.5,
            end: 300.0,
        };
        assert!(h.touches(&v, 2.0));
        assert!(v.touches(&h, 2.0));
    }
}
