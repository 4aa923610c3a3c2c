//! xlsxcsv - Convert spreadsheet workbooks to delimited text files
//!
//! This crate converts workbooks (XLSX / XLSM / XLSB / XLS / ODS) into CSV files,
//! one file per selected sheet, over a single file, a directory tree, or a
//! wildcard-matched file set.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use xlsxcsv::{resolve_targets, ConverterBuilder, NullSink};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a converter with default settings
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     // Resolve input files and their output directories
//!     let targets = resolve_targets(Path::new("book.xlsx"), Path::new("out"), &["xlsx".to_string()])?;
//!
//!     // Convert; per-file and per-sheet failures are reported, not returned
//!     let summary = converter.run(&targets, &NullSink);
//!     println!("{} CSV files written", summary.sheets_written());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust
//! use xlsxcsv::{ConverterBuilder, OverwritePolicy, SheetSelector};
//!
//! # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
//! let converter = ConverterBuilder::new()
//!     .with_sheet_selector(SheetSelector::All)      // book_Sheet1.csv, book_Sheet2.csv, ...
//!     .with_delimiter(';')
//!     .with_encoding_label("shift_jis")
//!     .include_header(false)                        // drop the first row
//!     .with_overwrite_policy(OverwritePolicy::NoForce)
//!     .with_workers(4)                              // convert 4 files at a time
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! # In-memory Workbooks
//!
//! ```rust
//! use xlsxcsv::{CellValue, ConverterBuilder, MemoryWorkbook, TextEncoding};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let converter = ConverterBuilder::new()
//!     .with_encoding(TextEncoding::Utf8 { bom: false })
//!     .build()?;
//!
//! let mut workbook = MemoryWorkbook::new().with_sheet(
//!     "Sheet1",
//!     vec![vec![CellValue::Text("x,y".to_string()), CellValue::Bool(true)]],
//! );
//! converter.convert_workbook(&mut workbook, "book", dir.path())?;
//!
//! let csv = std::fs::read_to_string(dir.path().join("book.csv"))?;
//! assert_eq!(csv, "\"x,y\",TRUE\n");
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
pub mod cli;
mod discover;
mod error;
mod formatter;
mod output;
mod parser;
mod report;
mod security;
mod types;

// 公開API
pub use api::{Action, Disposition, OverwritePolicy, SheetSelector, TextEncoding};
pub use builder::{Converter, ConverterBuilder};
pub use discover::resolve_targets;
pub use error::XlsxToCsvError;
pub use formatter::CellFormatter;
pub use output::{arbitrate, resolve_output_path, write_csv, CsvOptions, CsvSheetWriter};
pub use parser::{select_sheets, CalamineWorkbook, MemoryWorkbook, SheetRows, WorkbookSource};
pub use report::{
    CollectingSink, ConversionSink, FileOutcome, FileReport, FileStatus, FileSummary, NullSink,
    RunSummary, SheetOutcome, SheetReport, SheetStatus, SheetSummary,
};
pub use types::{CellValue, ConversionTarget, Row, SelectedSheet, SheetDescriptor, Temporal};
