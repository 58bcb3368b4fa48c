use crate::classify::{DocumentOutcome, ProcessingStats};
use crate::error::ProexyError;
use crate::model::Family;
use serde::Serialize;
use std::path::PathBuf;

/// Why a document was skipped or degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DocumentOpen,
    TableNotFound,
    HeaderNotDetected,
    InsufficientColumns,
    /// Some labels had no value; the record was written blank.
    FieldsMissing,
    /// The document could not be copied into its family folder.
    Copy,
}

impl IssueKind {
    pub fn from_error(err: &ProexyError) -> Self {
        match err {
            ProexyError::TableNotFound { .. } => IssueKind::TableNotFound,
            ProexyError::HeaderNotDetected { .. } => IssueKind::HeaderNotDetected,
            ProexyError::InsufficientColumns { .. } => IssueKind::InsufficientColumns,
            _ => IssueKind::DocumentOpen,
        }
    }

    /// Whether the document counts as an error in the run statistics.
    pub fn is_error(&self) -> bool {
        !matches!(self, IssueKind::FieldsMissing)
    }
}

/// A per-document problem listed in the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentIssue {
    pub filename: String,
    /// `None` when the problem happened before classification.
    pub family: Option<Family>,
    pub kind: IssueKind,
    pub reason: String,
}

impl DocumentIssue {
    pub fn from_error(filename: &str, family: Option<Family>, err: &ProexyError) -> Self {
        DocumentIssue {
            filename: filename.to_string(),
            family,
            kind: IssueKind::from_error(err),
            reason: err.to_string(),
        }
    }
}

/// What one family's extraction produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyReport {
    pub family: Family,
    /// Documents found in the family folder.
    pub documents: usize,
    /// Documents that produced output, degraded ones included.
    pub extracted: usize,
    /// Rows written to the workbook.
    pub rows: usize,
    /// Workbook path, when one was written.
    pub output: Option<PathBuf>,
    pub issues: Vec<DocumentIssue>,
    /// Set when the family folder could not be listed or the workbook
    /// could not be written.
    pub failure: Option<String>,
}

impl FamilyReport {
    pub fn new(family: Family) -> Self {
        FamilyReport {
            family,
            documents: 0,
            extracted: 0,
            rows: 0,
            output: None,
            issues: Vec::new(),
            failure: None,
        }
    }

    /// Issues that count as errors.
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.kind.is_error()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// Stopped by the progress observer; work done so far is kept.
    Cancelled,
    Failed { reason: String },
}

/// Summary of one `process_folder` run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub stats: ProcessingStats,
    pub outcomes: Vec<DocumentOutcome>,
    /// Documents that matched neither family, in input order.
    pub unclassified: Vec<String>,
    /// Problems found while classifying and copying.
    pub issues: Vec<DocumentIssue>,
    pub families: Vec<FamilyReport>,
    pub status: RunStatus,
}

impl RunReport {
    /// Every issue of the run, classification first, then per family.
    pub fn all_issues(&self) -> impl Iterator<Item = &DocumentIssue> {
        self.issues
            .iter()
            .chain(self.families.iter().flat_map(|f| f.issues.iter()))
    }

    pub fn family(&self, family: Family) -> Option<&FamilyReport> {
        self.families.iter().find(|f| f.family == family)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RunStatus::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_kind_follows_error() {
        let err = ProexyError::InsufficientColumns {
            found: 12,
            expected: 18,
        };
        let issue = DocumentIssue::from_error("a.pdf", Some(Family::Proserv), &err);
        assert_eq!(issue.kind, IssueKind::InsufficientColumns);
        assert_eq!(issue.reason, "table has only 12 columns (expected 18)");

        let open = ProexyError::DocumentOpen("truncated".into());
        assert_eq!(IssueKind::from_error(&open), IssueKind::DocumentOpen);
    }

    #[test]
    fn missing_fields_are_not_errors() {
        let mut report = FamilyReport::new(Family::Oman);
        report.issues.push(DocumentIssue {
            filename: "a.pdf".into(),
            family: Some(Family::Oman),
            kind: IssueKind::FieldsMissing,
            reason: "missing: EPL".into(),
        });
        report.issues.push(DocumentIssue {
            filename: "b.pdf".into(),
            family: Some(Family::Oman),
            kind: IssueKind::DocumentOpen,
            reason: "corrupt".into(),
        });
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(RunStatus::Failed {
            reason: "disk full".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "disk full");
    }
}
