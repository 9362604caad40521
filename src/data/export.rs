use std::fmt;

use log::info;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook};

use super::model::{CellValue, Table};
use crate::error::Result;

/// Download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialized bytes of one table snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Serialize `table` in the requested format.
pub fn export(table: &Table, format: ExportFormat) -> Result<ExportPayload> {
    let bytes = match format {
        ExportFormat::Csv => to_csv_bytes(table)?,
        ExportFormat::Xlsx => to_xlsx_bytes(table)?,
    };
    info!(
        "Exported {} rows as {format} ({} bytes)",
        table.len(),
        bytes.len()
    );
    Ok(ExportPayload { format, bytes })
}

/// Comma-separated UTF-8 text with a header row.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    to_delimited_bytes(table, b',')
}

pub fn to_delimited_bytes(table: &Table, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Single-sheet workbook (`Sheet1`) with a header row.
///
/// The document creation time is pinned so that one table always yields
/// the same bytes.
pub fn to_xlsx_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let sheet = workbook.add_worksheet();
    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        let r = r as u32 + 1;
        for (c, value) in row.iter().enumerate() {
            let c = c as u16;
            match value {
                CellValue::Integer(i) => {
                    sheet.write_number(r, c, *i as f64)?;
                }
                CellValue::Float(v) => {
                    sheet.write_number(r, c, *v)?;
                }
                CellValue::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
                CellValue::Missing => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
