use proexy_core::classify::ProcessingStats;
use proexy_core::error::ProexyError;
use proexy_core::extraction::pdftotext::PdftotextExtractor;
use proexy_core::extraction::table::LayoutTableDetector;
use proexy_core::extraction::PdfExtractor;
use proexy_core::sink::XlsxSink;
use proexy_core::ProgressObserver;
use std::path::PathBuf;

use crate::output;

/// Prints one progress line per step to stderr.
struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&mut self, current: usize, total: usize, message: &str) -> bool {
        eprintln!("[{current}/{total}] {message}");
        true
    }

    fn on_stats(&mut self, stats: &ProcessingStats) {
        log::debug!(
            "stats: proserv={} oman={} unclassified={} errors={}",
            stats.proserv,
            stats.oman,
            stats.unclassified,
            stats.errors
        );
    }
}

/// Run the full pipeline. Returns whether the run did not fail.
pub fn run(
    folder: PathBuf,
    config_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    output_format: &str,
) -> Result<bool, ProexyError> {
    let mut config = super::load_config(config_file.as_deref())?;
    if output_dir.is_some() {
        config.output_dir = output_dir;
    }

    if !PdftotextExtractor::is_available() {
        return Err(ProexyError::PdftotextNotFound);
    }
    let extractor = PdftotextExtractor::new();
    let detector = LayoutTableDetector::new(&config);
    log::debug!("text backend: {}", extractor.backend_name());

    let report = proexy_core::process_folder(
        &folder,
        &config,
        &extractor,
        &detector,
        &XlsxSink::new(),
        &mut ConsoleProgress,
    )?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_run(&report),
    }

    Ok(!report.is_failed())
}
