//! Core library for the usager-sheets command line application.
//!
//! The crate carries the spreadsheet tooling around the case-management
//! application: exporting usager records to a styled workbook and turning a
//! mediation service spreadsheet into importable JSON. IO adapters live under
//! [`io`], the record representation inside [`model`], the export projection
//! in [`flatten`], the import mapping in [`import`], spreadsheet inspection in
//! [`analyze`], and the file-to-file orchestration under [`pipeline`].

pub mod analyze;
pub mod dates;
pub mod error;
pub mod flatten;
pub mod import;
pub mod io;
pub mod logging;
pub mod model;
pub mod pipeline;

pub use error::{Result, ToolError};
