use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::{debug, info, warn};

use super::model::{normalize_headers, CellValue, Table};
use crate::error::{AnalysisError, Result};

/// Tokens read as a missing value in delimited text.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an uploaded table.
///
/// Tries semicolon-separated text first. On any structural error the stream
/// is rewound and parsed as a workbook (first sheet, first row as header).
pub fn load<R: Read + Seek>(reader: &mut R) -> Result<Table> {
    load_with_delimiter(reader, b';')
}

/// [`load`] with a custom delimiter for the text attempt.
pub fn load_with_delimiter<R: Read + Seek>(reader: &mut R, delimiter: u8) -> Result<Table> {
    let delimited_err = match parse_delimited(&mut *reader, delimiter) {
        Ok(table) => {
            info!(
                "Loaded {} rows x {} columns as delimited text",
                table.len(),
                table.columns().len()
            );
            return Ok(table);
        }
        Err(e) => e,
    };
    warn!("Delimited text parse failed ({delimited_err}), trying workbook");

    reader.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    match parse_workbook(bytes) {
        Ok(table) => {
            info!(
                "Loaded {} rows x {} columns from workbook",
                table.len(),
                table.columns().len()
            );
            Ok(table)
        }
        Err(workbook) => Err(AnalysisError::UnsupportedFormat {
            delimited: delimited_err.to_string(),
            workbook,
        }),
    }
}

/// Load from an in-memory upload.
pub fn load_bytes(bytes: &[u8]) -> Result<Table> {
    load(&mut Cursor::new(bytes))
}

/// Load from a file on disk.
pub fn load_path(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    load_bytes(&bytes)
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Parse delimited text with a header row. Short records are padded with
/// missing cells; a record longer than the header is a structural error.
/// The input must be valid UTF-8.
pub fn parse_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AnalysisError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "no header row",
        )));
    }

    let expected = headers.len();
    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > expected {
            return Err(AnalysisError::RaggedRecord {
                record: i as u64 + 1,
                found: record.len(),
                expected,
            });
        }
        rows.push(record.iter().map(infer_cell).collect());
    }

    Ok(Table::new(normalize_headers(headers), rows))
}

fn infer_cell(s: &str) -> CellValue {
    if NA_TOKENS.contains(&s) {
        return CellValue::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

/// Parse the first sheet of a workbook. Errors are flattened to a message
/// since they only ever end up inside `UnsupportedFormat`.
fn parse_workbook(bytes: Vec<u8>) -> std::result::Result<Table, String> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no sheets".to_string())?
        .map_err(|e| e.to_string())?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| "first sheet is empty".to_string())?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| match workbook_cell(cell) {
            CellValue::Missing => String::new(),
            other => other.to_string(),
        })
        .collect();

    let rows = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(Table::new(normalize_headers(headers), rows))
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::Int(i) => CellValue::Integer(*i),
        // Workbooks store every number as a float.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Integer(*f as i64),
        Data::Float(f) if f.is_nan() => CellValue::Missing,
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}
