//! Category export rendering
//!
//! CSV is produced here. PDF reports are rendered by an external component
//! and are reported as unsupported.

use crate::models::Category;
use crate::services::error::CategoryServiceError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Columns written to every CSV export
pub const CSV_HEADER: [&str; 4] = ["Id", "Parent", "Name", "Order"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = CategoryServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(CategoryServiceError::field(
                "export_format",
                "The selected export format is invalid.",
            )),
        }
    }
}

/// A rendered export ready to be sent as an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// `categories-YYYY-MM-DD.<ext>`
pub fn export_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "categories-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// One row per category: id, parent id, name, order index
pub fn render_csv(categories: &[Category]) -> Result<Vec<u8>, CategoryServiceError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record(CSV_HEADER)
        .map_err(|e| CategoryServiceError::export(e.to_string()))?;

    for category in categories {
        wtr.write_record([
            &category.id.to_string(),
            &category.parent_id.to_string(),
            &category.name,
            &category.order_index.to_string(),
        ])
        .map_err(|e| CategoryServiceError::export(e.to_string()))?;
    }

    wtr.into_inner()
        .map_err(|e| CategoryServiceError::export(e.to_string()))
}
