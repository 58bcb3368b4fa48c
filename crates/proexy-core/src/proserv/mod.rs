//! Proserv certificates: the inspection table on the last page, plus an
//! equipment identifier from page 1.

pub mod equipment;
pub mod header;

use crate::config::Config;
use crate::error::ProexyError;
use crate::extraction::table::{RawTable, TableDetector, TableStrategy};
use crate::extraction::{Document, PageContent};
use crate::model::ExtractedRow;
use equipment::find_equipment_id;
use header::{fit_columns, is_serial_number, promote_header};
use serde::Serialize;

/// Canonical Proserv table columns, in output order.
pub const PROSERV_COLUMNS: [&str; 18] = [
    "S-No.",
    "Equipment Tag #",
    "Equipment Description",
    "Manufacturer",
    "Model",
    "Circuit ID",
    "Area of Classification",
    "IP",
    "Protection Method",
    "Gas Group",
    "T-Rating",
    "Serial Number",
    "Certifying Authority",
    "Certificate No.",
    "Grade of Inspection",
    "Inspection Date",
    "Expiry Date",
    "Pass/Fail",
];

pub const FILENAME_COLUMN: &str = "Filename";
pub const EQUIPMENT_ID_COLUMN: &str = "Equipment ID";

/// Strategies in the order they are tried.
pub const STRATEGY_ORDER: [TableStrategy; 2] = [TableStrategy::Grid, TableStrategy::Positional];

/// Output header for the Proserv workbook.
pub fn proserv_headers() -> Vec<String> {
    PROSERV_COLUMNS
        .iter()
        .chain([FILENAME_COLUMN, EQUIPMENT_ID_COLUMN].iter())
        .map(|s| s.to_string())
        .collect()
}

/// Rows and identifier extracted from one Proserv certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProservExtraction {
    pub rows: Vec<ExtractedRow>,
    /// Empty when the page-1 marker was not found.
    pub equipment_id: String,
    pub strategy: TableStrategy,
}

/// Extract the inspection table of one certificate.
///
/// The table is looked for on the last page, first with grid detection and
/// then with positional detection. The first table found is used; its header
/// is promoted, it is cut to the 18 canonical columns, and only rows whose
/// S-No. is a plain number are kept.
pub fn extract_document(
    pdf_bytes: &[u8],
    doc: &Document,
    filename: &str,
    detector: &dyn TableDetector,
    config: &Config,
) -> Result<ProservExtraction, ProexyError> {
    let equipment_id = doc
        .page_text(0)
        .and_then(|text| find_equipment_id(&text, config.equipment_id_offset))
        .unwrap_or_else(|| {
            log::debug!("{filename}: no equipment ID found");
            String::new()
        });

    let page = doc
        .last_page()
        .ok_or_else(|| ProexyError::DocumentOpen("document has no pages".into()))?;

    let (strategy, table) = locate_table(pdf_bytes, page, detector)?;
    let split = promote_header(&table)?;
    let rows = fit_columns(split, PROSERV_COLUMNS.len())?
        .into_iter()
        .filter(|cells| is_serial_number(&cells[0]))
        .map(|values| ExtractedRow {
            values,
            filename: filename.to_string(),
            equipment_id: equipment_id.clone(),
        })
        .collect();

    Ok(ProservExtraction {
        rows,
        equipment_id,
        strategy,
    })
}

/// First table found by the first strategy that finds any.
///
/// A strategy that errors is logged and treated as finding nothing.
fn locate_table(
    pdf_bytes: &[u8],
    page: &PageContent,
    detector: &dyn TableDetector,
) -> Result<(TableStrategy, RawTable), ProexyError> {
    for strategy in STRATEGY_ORDER {
        match detector.detect_tables(pdf_bytes, page, strategy) {
            Ok(tables) => {
                if let Some(table) = tables.into_iter().find(|t| !t.is_empty()) {
                    log::debug!(
                        "page {}: {} detection found a {}x{} table",
                        page.page_number,
                        strategy,
                        table.rows.len(),
                        table.column_count()
                    );
                    return Ok((strategy, table));
                }
                log::debug!("page {}: {} detection found no table", page.page_number, strategy);
            }
            Err(e) => log::debug!("page {}: {} detection failed: {}", page.page_number, strategy, e),
        }
    }
    Err(ProexyError::TableNotFound {
        page: page.page_number,
    })
}
