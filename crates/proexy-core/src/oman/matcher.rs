use crate::extraction::TextSpan;
use crate::oman::fields::{normalize_key, FieldDictionary};

/// Values found for each dictionary field, plus the fields left empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    /// One value per dictionary field, in dictionary order.
    pub values: Vec<String>,
    pub missing: Vec<&'static str>,
}

impl FieldMatch {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Pair every label span with the nearest value span to its right on the
/// same visual row.
///
/// A value qualifies when its centre is within `y_tolerance` of the
/// label's centre and its left edge lies strictly right of the label's
/// right edge. The smallest gap wins, earlier spans winning ties. A chosen
/// value leaves the pool, so no span answers two labels. Every label span
/// is matched; when a label repeats, its last span decides the value, even
/// if that span found nothing.
pub fn match_fields(spans: &[TextSpan], dict: &FieldDictionary, y_tolerance: f32) -> FieldMatch {
    let mut labels: Vec<(usize, &TextSpan)> = Vec::new();
    let mut pool: Vec<&TextSpan> = Vec::new();
    for span in spans {
        match dict.lookup(&normalize_key(&span.text)) {
            Some(field) => labels.push((field, span)),
            None => pool.push(span),
        }
    }

    let mut values = vec![String::new(); dict.len()];
    for (field, label) in labels {
        let mut best: Option<(usize, f32)> = None;
        for (i, candidate) in pool.iter().enumerate() {
            if (candidate.y_center - label.y_center).abs() > y_tolerance
                || candidate.bbox.x_min <= label.bbox.x_max
            {
                continue;
            }
            let gap = candidate.bbox.x_min - label.bbox.x_max;
            if best.map_or(true, |(_, g)| gap < g) {
                best = Some((i, gap));
            }
        }

        values[field] = match best {
            Some((i, _)) => pool.remove(i).text.trim().to_string(),
            None => String::new(),
        };
    }

    let missing = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(i, _)| dict.name(i))
        .collect();

    FieldMatch { values, missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::BBox;

    fn span(text: &str, x_min: f32, x_max: f32, y: f32) -> TextSpan {
        TextSpan::new(text, BBox::new(x_min, y, x_max, y + 10.0))
    }

    fn field<'a>(m: &'a FieldMatch, dict: &FieldDictionary, name: &str) -> &'a str {
        let idx = dict.names().iter().position(|n| *n == name).unwrap();
        &m.values[idx]
    }

    #[test]
    fn nearest_value_to_the_right_wins() {
        let dict = FieldDictionary::oman();
        let spans = vec![
            span("SYSTEM", 0.0, 50.0, 100.0),
            span("Far away", 200.0, 260.0, 100.0),
            span("Fire & Gas", 60.0, 120.0, 100.0),
        ];
        let m = match_fields(&spans, &dict, 5.0);
        assert_eq!(field(&m, &dict, "SYSTEM"), "Fire & Gas");
    }

    #[test]
    fn values_left_or_off_row_are_ignored() {
        let dict = FieldDictionary::oman();
        let spans = vec![
            span("EPL", 100.0, 130.0, 100.0),
            span("left", 0.0, 90.0, 100.0),
            span("below", 140.0, 180.0, 120.0),
        ];
        let m = match_fields(&spans, &dict, 5.0);
        assert_eq!(field(&m, &dict, "EPL"), "");
        assert!(m.missing.contains(&"EPL"));
    }

    #[test]
    fn touching_value_is_not_to_the_right() {
        let dict = FieldDictionary::oman();
        let spans = vec![span("EPL", 0.0, 30.0, 100.0), span("Gb", 30.0, 45.0, 100.0)];
        let m = match_fields(&spans, &dict, 5.0);
        assert_eq!(field(&m, &dict, "EPL"), "");
    }

    #[test]
    fn consumed_value_is_not_reused() {
        let dict = FieldDictionary::oman();
        // Both labels end at x = 50 on the same row; "EPL" is seen first.
        let spans = vec![
            span("EPL", 20.0, 50.0, 100.0),
            span("IP RATING", 0.0, 50.0, 101.0),
            span("Gb", 60.0, 80.0, 100.0),
            span("IP66", 90.0, 120.0, 100.0),
        ];
        let m = match_fields(&spans, &dict, 5.0);
        assert_eq!(field(&m, &dict, "EPL"), "Gb");
        assert_eq!(field(&m, &dict, "IP RATING"), "IP66");
    }

    #[test]
    fn equal_gaps_pick_first_candidate() {
        let dict = FieldDictionary::oman();
        let spans = vec![
            span("EPL", 0.0, 50.0, 100.0),
            span("first", 60.0, 80.0, 100.0),
            span("second", 60.0, 90.0, 102.0),
        ];
        let m = match_fields(&spans, &dict, 5.0);
        assert_eq!(field(&m, &dict, "EPL"), "first");
    }

    #[test]
    fn repeated_label_keeps_last_value() {
        let dict = FieldDictionary::oman();
        let spans = vec![
            span("AREA", 0.0, 40.0, 100.0),
            span("Zone 1", 50.0, 90.0, 100.0),
            span("AREA", 0.0, 40.0, 300.0),
            span("Other", 50.0, 90.0, 300.0),
        ];
        let m = match_fields(&spans, &dict, 5.0);
        assert_eq!(field(&m, &dict, "AREA"), "Other");
    }

    #[test]
    fn repeated_label_without_value_clears_the_field() {
        let dict = FieldDictionary::oman();
        let spans = vec![
            span("AREA", 0.0, 40.0, 100.0),
            span("Zone 1", 50.0, 90.0, 100.0),
            span("AREA", 0.0, 40.0, 300.0),
        ];
        let m = match_fields(&spans, &dict, 5.0);
        assert_eq!(field(&m, &dict, "AREA"), "");
        assert!(m.missing.contains(&"AREA"));
    }

    #[test]
    fn repeated_label_consumes_its_value() {
        let dict = FieldDictionary::oman();
        // The second "EPL" takes "Gb", leaving "IP66" for "IP RATING".
        let spans = vec![
            span("EPL", 0.0, 30.0, 100.0),
            span("Ga", 40.0, 60.0, 100.0),
            span("EPL", 0.0, 30.0, 200.0),
            span("IP RATING", 0.0, 50.0, 201.0),
            span("Gb", 60.0, 80.0, 200.0),
            span("IP66", 90.0, 120.0, 200.0),
        ];
        let m = match_fields(&spans, &dict, 5.0);
        assert_eq!(field(&m, &dict, "EPL"), "Gb");
        assert_eq!(field(&m, &dict, "IP RATING"), "IP66");
    }

    #[test]
    fn complete_when_every_field_found() {
        let dict = FieldDictionary::new(&["CLIENT TAG", "EPL"]);
        let spans = vec![
            span("CLIENT TAG", 0.0, 60.0, 100.0),
            span("P-101", 80.0, 120.0, 100.0),
            span("EPL", 0.0, 20.0, 140.0),
            span("Gb", 80.0, 100.0, 140.0),
        ];
        let m = match_fields(&spans, &dict, 5.0);
        assert!(m.is_complete());
        assert_eq!(m.values, vec!["P-101", "Gb"]);
    }
}
