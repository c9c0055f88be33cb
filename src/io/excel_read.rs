use std::fmt;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::dates::excel_serial_to_datetime;
use crate::error::{Result, ToolError};

/// Index (0-based) of the row holding the real column labels in the
/// mediation spreadsheets. The first row carries a title banner.
pub const DEFAULT_HEADER_ROW: usize = 1;

/// Which worksheet to read and where its header row sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSelection {
    /// Worksheet name; the first worksheet when `None`.
    pub sheet: Option<String>,
    pub header_row: usize,
}

impl Default for SheetSelection {
    fn default() -> Self {
        Self {
            sheet: None,
            header_row: DEFAULT_HEADER_ROW,
        }
    }
}

/// A typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

/// Coarse cell category, used when inferring column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CellKind {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
    Error,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellKind::Text => "text",
            CellKind::Integer => "integer",
            CellKind::Float => "float",
            CellKind::Boolean => "boolean",
            CellKind::DateTime => "datetime",
            CellKind::Error => "error",
        };
        f.write_str(name)
    }
}

impl CellValue {
    fn from_data(cell: &DataType) -> Self {
        match cell {
            DataType::Empty => CellValue::Empty,
            DataType::String(value) => CellValue::Text(value.clone()),
            DataType::Int(value) => CellValue::Int(*value),
            DataType::Float(value) => CellValue::Float(*value),
            DataType::Bool(value) => CellValue::Bool(*value),
            DataType::DateTime(serial) => excel_serial_to_datetime(*serial)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Float(*serial)),
            DataType::Error(error) => CellValue::Error(error.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn kind(&self) -> Option<CellKind> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(value) if value.trim().is_empty() => None,
            CellValue::Text(_) => Some(CellKind::Text),
            CellValue::Int(_) => Some(CellKind::Integer),
            CellValue::Float(_) => Some(CellKind::Float),
            CellValue::Bool(_) => Some(CellKind::Boolean),
            CellValue::DateTime(_) => Some(CellKind::DateTime),
            CellValue::Error(_) => Some(CellKind::Error),
        }
    }

    /// Cleaned text form: strings are trimmed, blanks and error cells become
    /// `None`, integral floats lose their decimal part and date-times are
    /// rendered as ISO-8601.
    pub fn clean(&self) -> Option<String> {
        match self {
            CellValue::Empty | CellValue::Error(_) => None,
            CellValue::Text(value) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            CellValue::Int(value) => Some(value.to_string()),
            CellValue::Float(value) => Some(format_float(*value)),
            CellValue::Bool(value) => Some(value.to_string()),
            CellValue::DateTime(value) => Some(value.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Error(value) => f.write_str(value),
            other => f.write_str(&other.clean().unwrap_or_default()),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Data rows of one worksheet together with the header labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRows {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetRows {
    pub fn rows(&self) -> impl Iterator<Item = SpreadsheetRow<'_>> {
        self.rows.iter().map(|cells| SpreadsheetRow {
            headers: &self.headers,
            cells,
        })
    }
}

/// One data row addressed by header label.
#[derive(Debug, Clone, Copy)]
pub struct SpreadsheetRow<'a> {
    headers: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> SpreadsheetRow<'a> {
    /// Looks a cell up by label. Labels match ignoring surrounding whitespace
    /// and case; the first matching column wins.
    pub fn get(&self, label: &str) -> Option<&'a CellValue> {
        let wanted = normalize_label(label);
        let index = self
            .headers
            .iter()
            .position(|header| normalize_label(header) == wanted)?;
        self.cells.get(index)
    }

    /// Cleaned text of the cell under `label`, see [`CellValue::clean`].
    pub fn text(&self, label: &str) -> Option<String> {
        self.get(label).and_then(CellValue::clean)
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Reads a worksheet whose column labels sit on `selection.header_row`.
/// Rows above the header are ignored.
pub fn read_sheet(path: &Path, selection: &SheetSelection) -> Result<SheetRows> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = match &selection.sheet {
        Some(name) => name.clone(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no sheets".into()))?,
    };
    let range = read_required_sheet(&mut workbook, &sheet_name)?;

    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    if first_row > selection.header_row {
        warn!(
            sheet = %sheet_name,
            header_row = selection.header_row,
            first_row,
            "header row is blank, using the first populated row as header"
        );
    }
    let mut rows = range.rows().skip(selection.header_row.saturating_sub(first_row));

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| CellValue::from_data(cell).to_string())
            .collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(CellValue::from_data).collect())
        .collect();

    debug!(sheet = %sheet_name, columns = headers.len(), rows = rows.len(), "sheet read");
    Ok(SheetRows {
        sheet_name,
        headers,
        rows,
    })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}
