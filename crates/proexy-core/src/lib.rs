pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod extraction;
pub mod fsutil;
pub mod model;
pub mod oman;
pub mod pipeline;
pub mod proserv;
pub mod report;
pub mod sink;

pub use classify::classify_pdf;
pub use config::Config;
pub use error::ProexyError;
pub use pipeline::{process_folder, NoProgress, ProgressObserver};
pub use report::{RunReport, RunStatus};

use extraction::table::TableDetector;
use extraction::PdfExtractor;
use oman::fields::FieldDictionary;
use oman::OmanExtraction;
use proserv::ProservExtraction;

/// Extract one Oman certificate from PDF bytes.
///
/// `sequence` is the value written to the `Sl. No` column.
pub fn extract_oman_pdf(
    pdf_bytes: &[u8],
    sequence: usize,
    filename: &str,
    extractor: &dyn PdfExtractor,
    config: &Config,
) -> Result<OmanExtraction, ProexyError> {
    let doc = extractor.open(pdf_bytes)?;
    Ok(oman::extract_certificate(
        &doc,
        sequence,
        filename,
        &FieldDictionary::oman(),
        config,
    ))
}

/// Extract the inspection rows of one Proserv certificate from PDF bytes.
pub fn extract_proserv_pdf(
    pdf_bytes: &[u8],
    filename: &str,
    extractor: &dyn PdfExtractor,
    detector: &dyn TableDetector,
    config: &Config,
) -> Result<ProservExtraction, ProexyError> {
    let doc = extractor.open(pdf_bytes)?;
    proserv::extract_document(pdf_bytes, &doc, filename, detector, config)
}
