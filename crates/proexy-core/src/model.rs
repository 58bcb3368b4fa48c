use serde::{Deserialize, Serialize};
use std::fmt;

/// A certificate template family with its own schema and extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Proserv,
    Oman,
}

impl Family {
    /// Worksheet title for the family's workbook.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Family::Proserv => "Proserv Certificates",
            Family::Oman => "Oman Certificates",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Proserv => write!(f, "Proserv"),
            Family::Oman => write!(f, "Oman"),
        }
    }
}

/// Result of classifying one document by its page-1 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Proserv,
    Oman,
    Unclassified,
}

impl Classification {
    pub fn family(&self) -> Option<Family> {
        match self {
            Classification::Proserv => Some(Family::Proserv),
            Classification::Oman => Some(Family::Oman),
            Classification::Unclassified => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Proserv => write!(f, "Proserv"),
            Classification::Oman => write!(f, "Oman"),
            Classification::Unclassified => write!(f, "Unclassified"),
        }
    }
}

/// One Oman certificate: a value per dictionary field, in dictionary order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// 1-based position of the document in the sorted Oman listing.
    pub sequence: usize,
    pub filename: String,
    pub values: Vec<String>,
}

impl CertificateRecord {
    /// A record with every field empty, used when extraction cannot be trusted.
    pub fn blank(sequence: usize, filename: impl Into<String>, field_count: usize) -> Self {
        CertificateRecord {
            sequence,
            filename: filename.into(),
            values: vec![String::new(); field_count],
        }
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.is_empty())
    }
}

/// One data row of a Proserv inspection table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRow {
    /// Cells in canonical column order.
    pub values: Vec<String>,
    pub filename: String,
    pub equipment_id: String,
}

impl ExtractedRow {
    /// The S-No. cell.
    pub fn serial(&self) -> &str {
        self.values.first().map(|s| s.as_str()).unwrap_or("")
    }
}
