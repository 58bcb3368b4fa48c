pub mod xlsx;

use crate::aggregate::Dataset;
use crate::error::ProexyError;
use std::path::Path;

pub use xlsx::XlsxSink;

/// Writes a family's dataset to a tabular file.
pub trait RecordSink: Send + Sync {
    fn write(&self, dataset: &Dataset, path: &Path) -> Result<(), ProexyError>;
}
