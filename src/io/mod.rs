//! File adapters: JSON record input, spreadsheet reading and styled workbook
//! output.

pub mod excel_read;
pub mod excel_write;
pub mod records;
