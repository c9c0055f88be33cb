use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::analyze::{self, Analysis};
use crate::error::Result;
use crate::flatten::build_table;
use crate::import::{self, ImportSettings};
use crate::io::excel_read::{self, SheetSelection};
use crate::io::{excel_write, records};

/// Renders a JSON array of usager records into the styled export workbook.
/// Returns the number of exported records.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn export_users(input: &Path, output: &Path) -> Result<usize> {
    let records = records::load_records(input)?;
    info!(record_count = records.len(), "loaded usager records");
    let table = build_table(&records);
    debug!(columns = table.columns.len(), rows = table.rows.len(), "export table built");
    excel_write::write_workbook(output, &table)?;
    Ok(records.len())
}

/// Converts a mediation spreadsheet into a JSON array of usager records.
/// Returns the number of records written.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn import_mediation(input: &Path, output: &Path, settings: &ImportSettings) -> Result<usize> {
    let sheet = excel_read::read_sheet(input, &settings.selection)?;
    info!(sheet = %sheet.sheet_name, rows = sheet.rows.len(), "read mediation sheet");
    let users = import::normalize_rows(&sheet, settings);
    info!(
        record_count = users.len(),
        skipped = sheet.rows.len() - users.len(),
        "rows normalized"
    );
    let json_string = serde_json::to_string_pretty(&users)?;
    fs::write(output, json_string)?;
    Ok(users.len())
}

/// Inspects a spreadsheet without writing anything.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn analyze_workbook(input: &Path, selection: &SheetSelection) -> Result<Analysis> {
    let sheet = excel_read::read_sheet(input, selection)?;
    Ok(analyze::analyze(&sheet))
}
