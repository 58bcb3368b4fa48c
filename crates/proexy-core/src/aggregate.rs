use crate::model::{CertificateRecord, ExtractedRow, Family};
use crate::oman::fields::oman_headers;
use crate::proserv::header::is_serial_number;
use crate::proserv::proserv_headers;

/// One family's final table, ready for a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(family: Family, headers: Vec<String>) -> Self {
        Dataset {
            sheet_name: family.sheet_name().to_string(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Concatenate Oman records in the order given.
///
/// Each row is the sequence number, the field values in dictionary order,
/// then the filename.
pub fn aggregate_oman(records: impl IntoIterator<Item = CertificateRecord>) -> Dataset {
    let mut dataset = Dataset::new(Family::Oman, oman_headers());
    for record in records {
        let mut row = Vec::with_capacity(record.values.len() + 2);
        row.push(record.sequence.to_string());
        row.extend(record.values);
        row.push(record.filename);
        dataset.rows.push(row);
    }
    dataset
}

/// Concatenate each document's Proserv rows in the order given.
///
/// The S-No. filter is applied again over the combined rows, so rows that
/// reach this point from any source are held to the same rule.
pub fn aggregate_proserv(per_document: impl IntoIterator<Item = Vec<ExtractedRow>>) -> Dataset {
    let mut dataset = Dataset::new(Family::Proserv, proserv_headers());
    dataset.rows = per_document
        .into_iter()
        .flatten()
        .filter(|row| is_serial_number(row.serial()))
        .map(|row| {
            let mut cells = row.values;
            cells.push(row.filename);
            cells.push(row.equipment_id);
            cells
        })
        .collect();
    dataset
}
