use crate::error::ProexyError;
use crate::extraction::table::RawTable;
use regex::Regex;
use std::sync::LazyLock;

/// Every one of these must appear in some cell of the header row.
pub const HEADER_TOKENS: [&str; 3] = ["S-No", "Equipment Tag", "Pass/Fail"];

static SERIAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// Whether an S-No. cell is a plain row number.
pub fn is_serial_number(cell: &str) -> bool {
    SERIAL_RE.is_match(cell)
}

/// Whether each header token is a case-insensitive substring of some cell.
pub fn has_header_tokens(cells: &[String]) -> bool {
    let lowered: Vec<String> = cells.iter().map(|c| c.to_lowercase()).collect();
    HEADER_TOKENS.iter().all(|token| {
        let token = token.to_lowercase();
        lowered.iter().any(|cell| cell.contains(&token))
    })
}

/// A table split into its header row and the data rows below it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderSplit {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HeaderSplit {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// Find the header row and drop it, with everything above it, from the data.
///
/// The first row holding every header token wins. When no single row does,
/// rows 0 and 1 are joined cell by cell, which recovers headers printed on
/// two stacked lines.
pub fn promote_header(table: &RawTable) -> Result<HeaderSplit, ProexyError> {
    let width = table.column_count();
    let padded = |row: &Vec<String>| {
        let mut row = row.clone();
        row.resize(width, String::new());
        row
    };

    if let Some(idx) = table.rows.iter().position(|r| has_header_tokens(r)) {
        return Ok(HeaderSplit {
            header: padded(&table.rows[idx]),
            rows: table.rows[idx + 1..].iter().map(padded).collect(),
        });
    }

    if table.rows.len() > 1 {
        let top = padded(&table.rows[0]);
        let second = padded(&table.rows[1]);
        let merged: Vec<String> = top
            .iter()
            .zip(second.iter())
            .map(|(a, b)| format!("{a} {b}"))
            .collect();
        if has_header_tokens(&merged) {
            log::debug!("header recovered by merging the first two rows");
            return Ok(HeaderSplit {
                header: merged,
                rows: table.rows[2..].iter().map(padded).collect(),
            });
        }
    }

    Err(ProexyError::HeaderNotDetected {
        tokens: HEADER_TOKENS.iter().map(|t| t.to_string()).collect(),
    })
}

/// Keep the first `columns` cells of every row, rejecting narrower tables.
pub fn fit_columns(split: HeaderSplit, columns: usize) -> Result<Vec<Vec<String>>, ProexyError> {
    if split.column_count() < columns {
        return Err(ProexyError::InsufficientColumns {
            found: split.column_count(),
            expected: columns,
        });
    }
    Ok(split
        .rows
        .into_iter()
        .map(|mut row| {
            row.truncate(columns);
            row.iter_mut().for_each(|c| *c = c.trim().to_string());
            row
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn serial_numbers_are_digits_only() {
        assert!(is_serial_number("1"));
        assert!(is_serial_number("042"));
        assert!(!is_serial_number("Total"));
        assert!(!is_serial_number(""));
        assert!(!is_serial_number("1."));
        assert!(!is_serial_number(" 1"));
    }

    #[test]
    fn single_row_header_is_promoted() {
        let t = table(&[
            &["Inspection summary", "", ""],
            &["S-No.", "Equipment Tag #", "PASS/FAIL"],
            &["1", "JB-1", "Pass"],
        ]);
        let split = promote_header(&t).unwrap();
        assert_eq!(split.header[1], "Equipment Tag #");
        assert_eq!(split.rows, vec![vec!["1", "JB-1", "Pass"]]);
    }

    #[test]
    fn stacked_header_is_merged() {
        let t = table(&[
            &["S-No", "Equipment", "Pass/Fail"],
            &["", "Tag", ""],
            &["1", "JB-1", "Pass"],
        ]);
        let split = promote_header(&t).unwrap();
        assert_eq!(split.header, vec!["S-No ", "Equipment Tag", "Pass/Fail "]);
        assert_eq!(split.rows.len(), 1);
    }

    #[test]
    fn missing_header_is_an_error() {
        let t = table(&[&["1", "JB-1", "Pass"], &["2", "JB-2", "Fail"]]);
        assert!(matches!(
            promote_header(&t),
            Err(ProexyError::HeaderNotDetected { .. })
        ));
    }

    #[test]
    fn ragged_rows_are_padded() {
        let t = table(&[&["S-No", "Equipment Tag", "Pass/Fail", "Notes"], &["1", "JB-1"]]);
        let split = promote_header(&t).unwrap();
        assert_eq!(split.rows[0], vec!["1", "JB-1", "", ""]);
    }

    #[test]
    fn narrow_table_is_rejected() {
        let split = HeaderSplit {
            header: vec!["a".into(); 17],
            rows: vec![],
        };
        assert!(matches!(
            fit_columns(split, 18),
            Err(ProexyError::InsufficientColumns {
                found: 17,
                expected: 18
            })
        ));
    }

    #[test]
    fn wide_table_is_truncated() {
        let split = HeaderSplit {
            header: vec!["h".into(); 20],
            rows: vec![vec![" 1 ".into(); 20]],
        };
        let rows = fit_columns(split, 18).unwrap();
        assert_eq!(rows[0].len(), 18);
        assert_eq!(rows[0][0], "1");
    }
}
