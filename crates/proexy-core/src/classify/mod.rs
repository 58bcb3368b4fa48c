pub mod outcome;

use crate::error::ProexyError;
use crate::extraction::PdfExtractor;
use crate::model::Classification;

pub use outcome::{DocumentOutcome, OutcomeKind, ProcessingStats};

/// Both must appear on page 1 of a Proserv certificate.
pub const PROSERV_MARKERS: [&str; 2] = ["ELECTRICAL EQUIPMENT", "HAZARDOUS AREAS"];

/// Both must appear on page 1 of an Oman certificate.
pub const OMAN_MARKERS: [&str; 2] = ["VISUAL & CLOSE INSPECTION", "REPORT FOR"];

/// Assign page-1 text to a certificate family.
///
/// Matching is on the uppercased text. Proserv is checked first, so a page
/// carrying both marker pairs is Proserv.
pub fn classify_text(page1_text: &str) -> Classification {
    let upper = page1_text.to_uppercase();
    let has_all = |markers: &[&str]| markers.iter().all(|m| upper.contains(m));

    if has_all(&PROSERV_MARKERS) {
        Classification::Proserv
    } else if has_all(&OMAN_MARKERS) {
        Classification::Oman
    } else {
        Classification::Unclassified
    }
}

/// Open a PDF and classify it by its first page.
pub fn classify_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
) -> Result<Classification, ProexyError> {
    let doc = extractor.open(pdf_bytes)?;
    let text = doc
        .page_text(0)
        .ok_or_else(|| ProexyError::DocumentOpen("document has no pages".into()))?;
    Ok(classify_text(&text))
}
