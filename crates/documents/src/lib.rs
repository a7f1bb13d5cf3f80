//! `ironmonger-documents`: downloadable PDF artifacts.
//!
//! Both generators are pure: they take fully resolved data, never touch the
//! network, and return the file name plus the PDF bytes.

pub mod error;
pub mod format;
mod layout;
pub mod receipt;
pub mod stock_report;

use std::path::{Path, PathBuf};

pub use error::DocumentError;
pub use format::{format_currency, format_timestamp};
pub use receipt::{generate_receipt, CompanyInfo, ReceiptData, ReceiptLine};
pub use stock_report::{generate_stock_report, StockReport};

/// A generated file, ready to be saved or served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl GeneratedDocument {
    /// Write the file into `dir` under its own name.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf, DocumentError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .map_err(|e| DocumentError::Io(format!("{}: {e}", path.display())))?;
        Ok(path)
    }
}
