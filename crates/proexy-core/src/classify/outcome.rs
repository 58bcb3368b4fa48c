use crate::model::Classification;
use serde::{Deserialize, Serialize};

/// What happened to one input document during classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeKind {
    Classified { classification: Classification },
    /// The document could not be read; it belongs to no family.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub filename: String,
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

impl DocumentOutcome {
    pub fn classified(filename: impl Into<String>, classification: Classification) -> Self {
        DocumentOutcome {
            filename: filename.into(),
            kind: OutcomeKind::Classified { classification },
        }
    }

    pub fn failed(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        DocumentOutcome {
            filename: filename.into(),
            kind: OutcomeKind::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn classification(&self) -> Option<Classification> {
        match self.kind {
            OutcomeKind::Classified { classification } => Some(classification),
            OutcomeKind::Failed { .. } => None,
        }
    }
}

/// Counters for one processing run, folded from document outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub proserv: usize,
    pub oman: usize,
    pub unclassified: usize,
    pub errors: usize,
}

impl ProcessingStats {
    /// Counters after folding in one more classification outcome.
    pub fn with_outcome(self, outcome: &DocumentOutcome) -> Self {
        let mut next = self;
        match outcome.kind {
            OutcomeKind::Classified {
                classification: Classification::Proserv,
            } => next.proserv += 1,
            OutcomeKind::Classified {
                classification: Classification::Oman,
            } => next.oman += 1,
            OutcomeKind::Classified {
                classification: Classification::Unclassified,
            } => next.unclassified += 1,
            OutcomeKind::Failed { .. } => next.errors += 1,
        }
        next
    }

    /// Counters after `count` more per-document extraction errors.
    pub fn with_errors(self, count: usize) -> Self {
        ProcessingStats {
            errors: self.errors + count,
            ..self
        }
    }

    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a DocumentOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(ProcessingStats::default(), |stats, o| stats.with_outcome(o))
    }

    pub fn total(&self) -> usize {
        self.proserv + self.oman + self.unclassified
    }
}
