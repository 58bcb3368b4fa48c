use proexy_core::error::ProexyError;
use proexy_core::extraction::pdftotext::PdftotextExtractor;
use proexy_core::extraction::table::LayoutTableDetector;
use std::path::Path;

use crate::output;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn oman(
    input_file: &Path,
    config_file: Option<&Path>,
    output_format: &str,
) -> Result<(), ProexyError> {
    let config = super::load_config(config_file)?;
    let pdf_bytes = std::fs::read(input_file)?;
    let extractor = PdftotextExtractor::new();
    let extraction = proexy_core::extract_oman_pdf(
        &pdf_bytes,
        1,
        &file_name(input_file),
        &extractor,
        &config,
    )?;

    match output_format {
        "json" => output::json::print(&extraction)?,
        _ => output::table::print_oman(&extraction),
    }
    Ok(())
}

pub fn proserv(
    input_file: &Path,
    config_file: Option<&Path>,
    output_format: &str,
) -> Result<(), ProexyError> {
    let config = super::load_config(config_file)?;
    let pdf_bytes = std::fs::read(input_file)?;
    let extractor = PdftotextExtractor::new();
    let detector = LayoutTableDetector::new(&config);
    let extraction = proexy_core::extract_proserv_pdf(
        &pdf_bytes,
        &file_name(input_file),
        &extractor,
        &detector,
        &config,
    )?;

    match output_format {
        "json" => output::json::print(&extraction)?,
        _ => output::table::print_proserv(&extraction),
    }
    Ok(())
}
