//! Quote export.
//!
//! # Responsibility
//! - Serialize stored quotes to the CSV layout used for spreadsheet review.

pub mod csv;

pub use self::csv::{export_file_name, write_quotes_csv, ExportError, CSV_HEADERS};
