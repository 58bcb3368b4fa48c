//! Folder-level orchestration: classify every PDF, copy it into its family
//! folder, then run each family's extractor over that folder and write one
//! workbook per family.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aggregate::{aggregate_oman, aggregate_proserv, Dataset};
use crate::classify::{classify_pdf, DocumentOutcome, ProcessingStats};
use crate::config::Config;
use crate::error::ProexyError;
use crate::extraction::table::TableDetector;
use crate::extraction::PdfExtractor;
use crate::fsutil::reset_dir;
use crate::model::{CertificateRecord, Family};
use crate::oman::extract_certificate;
use crate::oman::fields::FieldDictionary;
use crate::proserv::extract_document;
use crate::report::{DocumentIssue, FamilyReport, IssueKind, RunReport, RunStatus};
use crate::sink::RecordSink;

/// Receives progress from a run and may cancel it.
pub trait ProgressObserver {
    /// Called before each document is handled, with `current` counting
    /// from 1. Returning `false` cancels before that document, so it and
    /// every later one are skipped; nothing already written is rolled back.
    fn on_progress(&mut self, current: usize, total: usize, message: &str) -> bool;

    /// Called with updated counters after each classification and at the
    /// end of each family's extraction.
    fn on_stats(&mut self, stats: &ProcessingStats);
}

/// Observer that never cancels and ignores updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _current: usize, _total: usize, _message: &str) -> bool {
        true
    }

    fn on_stats(&mut self, _stats: &ProcessingStats) {}
}

/// `*.pdf` files directly inside `dir`, sorted by name.
///
/// The extension match is case-sensitive.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, ProexyError> {
    let setup = |e: std::io::Error| ProexyError::Setup {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };
    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(setup)? {
        let path = entry.map_err(setup)?.path();
        if path.is_file() && path.extension() == Some(OsStr::new("pdf")) {
            pdfs.push(path);
        }
    }
    pdfs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(pdfs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Shared state of one run.
struct Run<'a> {
    config: &'a Config,
    extractor: &'a dyn PdfExtractor,
    detector: &'a dyn TableDetector,
    sink: &'a dyn RecordSink,
    observer: &'a mut dyn ProgressObserver,
    stats: ProcessingStats,
    cancelled: bool,
}

/// Process every PDF in `input`.
///
/// Fails only when the input folder cannot be listed, holds no PDFs, or a
/// family folder cannot be reset. Per-document problems are collected in
/// the returned report, and a workbook that cannot be written marks the
/// run `Failed` without stopping the other family.
pub fn process_folder(
    input: &Path,
    config: &Config,
    extractor: &dyn PdfExtractor,
    detector: &dyn TableDetector,
    sink: &dyn RecordSink,
    observer: &mut dyn ProgressObserver,
) -> Result<RunReport, ProexyError> {
    if !input.is_dir() {
        return Err(ProexyError::Setup {
            path: input.to_path_buf(),
            reason: "input folder does not exist".into(),
        });
    }
    let pdfs = list_pdfs(input)?;
    if pdfs.is_empty() {
        return Err(ProexyError::Setup {
            path: input.to_path_buf(),
            reason: "no PDF files found".into(),
        });
    }

    let root = config.output_root(input);
    let proserv_dir = root.join(&config.proserv_dir);
    let oman_dir = root.join(&config.oman_dir);
    let backoff = Duration::from_millis(config.delete_backoff_ms);
    reset_dir(&proserv_dir, config.delete_retries, backoff)?;
    reset_dir(&oman_dir, config.delete_retries, backoff)?;

    log::info!("Found {} PDF files in {}", pdfs.len(), input.display());

    let mut run = Run {
        config,
        extractor,
        detector,
        sink,
        observer,
        stats: ProcessingStats::default(),
        cancelled: false,
    };

    let mut outcomes = Vec::with_capacity(pdfs.len());
    let mut unclassified = Vec::new();
    let mut issues = Vec::new();
    let total = pdfs.len();

    for (i, path) in pdfs.iter().enumerate() {
        let name = file_name(path);
        if !run
            .observer
            .on_progress(i + 1, total, &format!("Processing: {name}"))
        {
            log::warn!("Run cancelled after {i} of {total} documents");
            run.cancelled = true;
            break;
        }

        let outcome = run.classify_and_copy(path, &name, &proserv_dir, &oman_dir, &mut issues);
        if outcome.classification().is_some_and(|c| c.family().is_none()) {
            unclassified.push(name);
        }
        run.stats = run.stats.with_outcome(&outcome);
        run.observer.on_stats(&run.stats);
        outcomes.push(outcome);
    }

    let mut families = Vec::new();
    if !run.cancelled {
        families.push(run.extract_proserv(&proserv_dir, &root.join(&config.proserv_output)));
    }
    if !run.cancelled {
        families.push(run.extract_oman(&oman_dir, &root.join(&config.oman_output)));
    }

    if !unclassified.is_empty() {
        log::warn!("Unclassified files: {}", unclassified.join(", "));
    }
    let stats = run.stats;
    log::info!(
        "Processing complete: {} Proserv, {} Oman, {} unclassified, {} errors",
        stats.proserv,
        stats.oman,
        stats.unclassified,
        stats.errors
    );

    let status = run_status(run.cancelled, &families);
    Ok(RunReport {
        stats,
        outcomes,
        unclassified,
        issues,
        families,
        status,
    })
}

fn run_status(cancelled: bool, families: &[FamilyReport]) -> RunStatus {
    if cancelled {
        return RunStatus::Cancelled;
    }
    if let Some(failure) = families.iter().find_map(|f| {
        f.failure
            .as_ref()
            .map(|reason| format!("{}: {reason}", f.family))
    }) {
        return RunStatus::Failed { reason: failure };
    }
    if families.iter().all(|f| f.extracted == 0) {
        return RunStatus::Failed {
            reason: "no document was processed successfully".into(),
        };
    }
    RunStatus::Completed
}

impl Run<'_> {
    fn classify_and_copy(
        &self,
        path: &Path,
        name: &str,
        proserv_dir: &Path,
        oman_dir: &Path,
        issues: &mut Vec<DocumentIssue>,
    ) -> DocumentOutcome {
        let classified = std::fs::read(path)
            .map_err(ProexyError::from)
            .and_then(|bytes| classify_pdf(&bytes, self.extractor));

        let classification = match classified {
            Ok(c) => c,
            Err(e) => {
                log::error!("Error processing {name}: {e}");
                issues.push(DocumentIssue::from_error(name, None, &e));
                return DocumentOutcome::failed(name, e.to_string());
            }
        };

        let Some(family) = classification.family() else {
            log::warn!("Unclassified: {name}");
            return DocumentOutcome::classified(name, classification);
        };

        let target = match family {
            Family::Proserv => proserv_dir,
            Family::Oman => oman_dir,
        };
        if let Err(e) = std::fs::copy(path, target.join(name)) {
            log::error!("Could not copy {name} to {}: {e}", target.display());
            issues.push(DocumentIssue {
                filename: name.to_string(),
                family: Some(family),
                kind: IssueKind::Copy,
                reason: e.to_string(),
            });
            return DocumentOutcome::failed(name, format!("copy failed: {e}"));
        }

        log::info!("Classified {name} as {classification}");
        DocumentOutcome::classified(name, classification)
    }

    /// List a family folder, recording a listing failure on the report.
    fn family_documents(&self, dir: &Path, report: &mut FamilyReport) -> Vec<PathBuf> {
        match list_pdfs(dir) {
            Ok(pdfs) => pdfs,
            Err(e) => {
                log::error!("{} extraction could not list {}: {e}", report.family, dir.display());
                report.failure = Some(e.to_string());
                Vec::new()
            }
        }
    }

    fn progress(&mut self, family: Family, current: usize, total: usize, name: &str) -> bool {
        let keep_going = self.observer.on_progress(
            current,
            total,
            &format!("Extracting {family}: {name}"),
        );
        if !keep_going {
            log::warn!("{family} extraction cancelled at {name}");
            self.cancelled = true;
        }
        keep_going
    }

    fn extract_proserv(&mut self, dir: &Path, output: &Path) -> FamilyReport {
        let mut report = FamilyReport::new(Family::Proserv);
        let pdfs = self.family_documents(dir, &mut report);
        report.documents = pdfs.len();

        let mut per_document = Vec::new();
        for (i, path) in pdfs.iter().enumerate() {
            let name = file_name(path);
            if !self.progress(Family::Proserv, i + 1, pdfs.len(), &name) {
                break;
            }

            let extracted = std::fs::read(path)
                .map_err(ProexyError::from)
                .and_then(|bytes| {
                    let doc = self.extractor.open(&bytes)?;
                    extract_document(&bytes, &doc, &name, self.detector, self.config)
                });
            match extracted {
                Ok(extraction) => {
                    log::info!(
                        "{name}: {} rows ({} detection)",
                        extraction.rows.len(),
                        extraction.strategy
                    );
                    report.extracted += 1;
                    per_document.push(extraction.rows);
                }
                Err(e) => {
                    log::error!("Error processing Proserv file {name}: {e}");
                    report
                        .issues
                        .push(DocumentIssue::from_error(&name, Some(Family::Proserv), &e));
                }
            }
        }

        self.finish_family(aggregate_proserv(per_document), output, report)
    }

    fn extract_oman(&mut self, dir: &Path, output: &Path) -> FamilyReport {
        let mut report = FamilyReport::new(Family::Oman);
        let pdfs = self.family_documents(dir, &mut report);
        report.documents = pdfs.len();

        let dict = FieldDictionary::oman();
        let mut records = Vec::new();
        for (i, path) in pdfs.iter().enumerate() {
            let name = file_name(path);
            let sequence = i + 1;
            if !self.progress(Family::Oman, sequence, pdfs.len(), &name) {
                break;
            }

            let opened = std::fs::read(path)
                .map_err(ProexyError::from)
                .and_then(|bytes| self.extractor.open(&bytes));
            let doc = match opened {
                Ok(doc) => doc,
                Err(e) => {
                    log::error!("Error processing Oman file {name}: {e}");
                    report
                        .issues
                        .push(DocumentIssue::from_error(&name, Some(Family::Oman), &e));
                    records.push(CertificateRecord::blank(sequence, name, dict.len()));
                    continue;
                }
            };

            let extraction = extract_certificate(&doc, sequence, &name, &dict, self.config);
            if extraction.is_degraded() {
                log::warn!(
                    "Fields not found in {name}: {}",
                    extraction.missing.join(", ")
                );
                report.issues.push(DocumentIssue {
                    filename: name.clone(),
                    family: Some(Family::Oman),
                    kind: IssueKind::FieldsMissing,
                    reason: format!("missing fields: {}", extraction.missing.join(", ")),
                });
            } else {
                log::info!("{name}: all {} fields found", dict.len());
            }
            report.extracted += 1;
            records.push(extraction.record);
        }

        self.finish_family(aggregate_oman(records), output, report)
    }

    /// Fold the family's errors into the counters and write its workbook.
    fn finish_family(
        &mut self,
        dataset: Dataset,
        output: &Path,
        mut report: FamilyReport,
    ) -> FamilyReport {
        self.stats = self.stats.with_errors(report.error_count());
        self.observer.on_stats(&self.stats);

        report.rows = dataset.row_count();
        if dataset.is_empty() {
            log::info!("No {} rows to write", report.family);
            return report;
        }

        match self.sink.write(&dataset, output) {
            Ok(()) => {
                log::info!(
                    "{} data saved to {} ({} rows)",
                    report.family,
                    output.display(),
                    report.rows
                );
                report.output = Some(output.to_path_buf());
            }
            Err(e) => {
                log::error!("Could not write {} output: {e}", report.family);
                report.failure = Some(e.to_string());
            }
        }
        log::info!(
            "{}: {} of {} documents extracted, {} issues",
            report.family,
            report.extracted,
            report.documents,
            report.issues.len()
        );
        report
    }
}
