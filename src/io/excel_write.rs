use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::error::Result;
use crate::flatten::{ColumnKind, SheetTable};

const FONT_NAME: &str = "Calibri";
const HEADER_FONT_SIZE: f64 = 12.0;
const DATA_FONT_SIZE: f64 = 11.0;
const HEADER_FILL: u32 = 0x4F81BD;
const BAND_FILL: u32 = 0xDDEBF7;
const HEADER_ROW_HEIGHT: f64 = 30.0;
const HEADER_WIDTH_FACTOR: f64 = 1.1;
const WIDTH_MARGIN: f64 = 3.0;

/// Writes the export table as a styled single-sheet workbook.
///
/// The workbook is serialised in memory first so a failure never leaves a
/// truncated file behind.
pub fn write_workbook(path: &Path, table: &SheetTable) -> Result<()> {
    let mut workbook = build_workbook(table)?;
    let buffer = workbook.save_to_buffer()?;
    fs::write(path, buffer)?;
    Ok(())
}

fn build_workbook(table: &SheetTable) -> Result<Workbook> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;

    worksheet.set_row_height(0, HEADER_ROW_HEIGHT)?;
    for (col_idx, header) in table.headers().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &styles.header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let banded = row_idx % 2 == 0;
        for (col_idx, (cell, column)) in row.iter().zip(&table.columns).enumerate() {
            let format = styles.data(column.kind, banded);
            let (row_num, col_num) = ((row_idx + 1) as u32, col_idx as u16);
            if cell.is_empty() {
                worksheet.write_blank(row_num, col_num, format)?;
            } else {
                worksheet.write_string_with_format(row_num, col_num, cell, format)?;
            }
        }
    }

    for (col_idx, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, width)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(workbook)
}

/// Computes column widths from the header and the observed content.
///
/// Headers count for 1.1 times their length since they use a larger bold
/// font. Cell lengths are capped per column kind and a fixed margin is added.
pub fn column_widths(table: &SheetTable) -> Vec<f64> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(col_idx, column)| {
            let header = column.title.chars().count() as f64 * HEADER_WIDTH_FACTOR;
            let content = table
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .filter(|cell| !cell.is_empty())
                .map(|cell| {
                    let length = cell.chars().count();
                    column.kind.width_cap().map_or(length, |cap| length.min(cap))
                })
                .max()
                .unwrap_or(0) as f64;
            header.max(content) + WIDTH_MARGIN
        })
        .collect()
}

struct Styles {
    header: Format,
    plain: Format,
    plain_banded: Format,
    wrapped: Format,
    wrapped_banded: Format,
}

impl Styles {
    fn new() -> Self {
        let header = Format::new()
            .set_font_name(FONT_NAME)
            .set_font_size(HEADER_FONT_SIZE)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);

        let plain = Format::new()
            .set_font_name(FONT_NAME)
            .set_font_size(DATA_FONT_SIZE)
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin);
        let wrapped = plain.clone().set_text_wrap();

        Self {
            plain_banded: plain.clone().set_background_color(Color::RGB(BAND_FILL)),
            wrapped_banded: wrapped.clone().set_background_color(Color::RGB(BAND_FILL)),
            header,
            plain,
            wrapped,
        }
    }

    fn data(&self, kind: ColumnKind, banded: bool) -> &Format {
        match (kind.wraps(), banded) {
            (true, true) => &self.wrapped_banded,
            (true, false) => &self.wrapped,
            (false, true) => &self.plain_banded,
            (false, false) => &self.plain,
        }
    }
}
