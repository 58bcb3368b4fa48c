use crate::extraction::TextSpan;
use crate::oman::fields::{normalize_key, FieldDictionary};
use std::collections::BTreeMap;

/// Add synthetic spans for field labels the PDF generator split into
/// several text runs.
///
/// Spans are bucketed into rows by `floor(y_center / y_tolerance)` and
/// sorted left to right. From each start span, up to `window` following
/// spans of the same row are appended one at a time; the first
/// concatenation whose normalized key names a field becomes a merged span
/// covering the start and end fragments. The input spans are returned
/// unchanged ahead of the merged ones.
pub fn reconstruct_spans(
    spans: &[TextSpan],
    dict: &FieldDictionary,
    y_tolerance: f32,
    window: usize,
) -> Vec<TextSpan> {
    let mut rows: BTreeMap<i64, Vec<&TextSpan>> = BTreeMap::new();
    for span in spans {
        let row = (span.y_center / y_tolerance).floor() as i64;
        rows.entry(row).or_default().push(span);
    }

    let mut merged = Vec::new();
    for row in rows.values_mut() {
        row.sort_by(|a, b| a.bbox.x_min.total_cmp(&b.bbox.x_min));

        for start in 0..row.len() {
            let mut text = row[start].text.clone();
            let last = (start + window).min(row.len() - 1);
            for end in (start + 1)..=last {
                text.push_str(&row[end].text);
                let key = normalize_key(&text);
                if dict.contains(&key) {
                    log::debug!("rebuilt label '{}' from {} spans", text, end - start + 1);
                    merged.push(TextSpan {
                        text,
                        bbox: row[start].bbox.union(&row[end].bbox),
                        y_center: (row[start].y_center + row[end].y_center) / 2.0,
                    });
                    break;
                }
            }
        }
    }

    spans.iter().cloned().chain(merged).collect()
}
