use proexy_core::error::ProexyError;
use proexy_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

pub fn run(files: &[PathBuf]) -> Result<(), ProexyError> {
    let extractor = PdftotextExtractor::new();

    let width = files
        .iter()
        .map(|f| f.display().to_string().len())
        .max()
        .unwrap_or(0);

    for path in files {
        // A single unreadable file should not hide the others.
        let result = std::fs::read(path)
            .map_err(ProexyError::from)
            .and_then(|bytes| proexy_core::classify_pdf(&bytes, &extractor));
        match result {
            Ok(classification) => {
                println!("{:<width$}  {classification}", path.display().to_string());
            }
            Err(e @ ProexyError::PdftotextNotFound) => return Err(e),
            Err(e) => println!("{:<width$}  error: {e}", path.display().to_string()),
        }
    }
    Ok(())
}
