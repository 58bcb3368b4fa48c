//! Oman certificates: label/value pairs recovered from page-1 geometry.
//!
//! The certificate has no form fields or table structure, only positioned
//! text. Labels come from a fixed dictionary; each label takes the nearest
//! text to its right on the same printed line.

pub mod fields;
pub mod matcher;
pub mod spans;

use crate::config::Config;
use crate::extraction::Document;
use crate::model::CertificateRecord;
use fields::{normalize_key, FieldDictionary};
use matcher::match_fields;
use serde::Serialize;
use spans::reconstruct_spans;

/// Result of extracting one Oman certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OmanExtraction {
    /// The record to write. Blank except for sequence and filename when
    /// any field was missing.
    pub record: CertificateRecord,
    pub missing: Vec<&'static str>,
}

impl OmanExtraction {
    pub fn is_degraded(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Extract every dictionary field from page 1 of an opened certificate.
///
/// A partially filled record is never returned: if any field is missing,
/// the whole record is blanked so the document can be fixed by hand.
pub fn extract_certificate(
    doc: &Document,
    sequence: usize,
    filename: &str,
    dict: &FieldDictionary,
    config: &Config,
) -> OmanExtraction {
    let raw = doc.page_spans(0, config.span_gap_ratio, |text| {
        dict.contains(&normalize_key(text))
    });
    let spans = reconstruct_spans(&raw, dict, config.y_tolerance, config.merge_window);
    let matched = match_fields(&spans, dict, config.y_tolerance);

    let record = if matched.is_complete() {
        CertificateRecord {
            sequence,
            filename: filename.to_string(),
            values: matched.values,
        }
    } else {
        CertificateRecord::blank(sequence, filename, dict.len())
    };

    OmanExtraction {
        record,
        missing: matched.missing,
    }
}
