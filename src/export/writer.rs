use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::WriteError;
use crate::types::{COLUMNS, Cell, MergedRecord};

/// Name of the single worksheet in `.xlsx` output.
pub const SHEET_NAME: &str = "Data";
/// Longest string Excel stores in one cell.
const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    /// `.csv` (case-insensitive) selects CSV; any other name gets a workbook.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Xlsx,
        }
    }
}

/// Write a header row plus one row per record. Returns the number of data
/// rows written.
///
/// An existing file is overwritten unless `no_clobber` is set.
pub fn write_records(
    path: &Path,
    records: &[MergedRecord],
    no_clobber: bool,
) -> Result<usize, WriteError> {
    let format = OutputFormat::from_path(path);
    if no_clobber && path.exists() {
        return Err(WriteError::Exists {
            path: path.to_path_buf(),
        });
    }

    match format {
        OutputFormat::Xlsx => write_xlsx(path, records).map_err(|source| WriteError::Xlsx {
            path: path.to_path_buf(),
            source,
        })?,
        OutputFormat::Csv => write_csv(path, records)?,
    }
    tracing::info!(path = %path.display(), rows = records.len(), "wrote spreadsheet");
    Ok(records.len())
}

fn write_xlsx(path: &Path, records: &[MergedRecord]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, column) in (0_u16..).zip(COLUMNS.iter()) {
        sheet.write_string_with_format(0, col, column.header(), &bold)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (row, record) in (1_u32..).zip(records) {
        for (col, cell) in (0_u16..).zip(record.cells()) {
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(row, col, truncate_chars(&text, MAX_CELL_CHARS))?;
                }
                Cell::Number(n) => {
                    sheet.write_number(row, col, n)?;
                }
                Cell::Bool(b) => {
                    sheet.write_boolean(row, col, b)?;
                }
                Cell::Blank => {}
            }
        }
    }

    workbook.save(path)
}

fn write_csv(path: &Path, records: &[MergedRecord]) -> Result<(), WriteError> {
    let csv_err = |source| WriteError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(COLUMNS.iter().map(|c| c.header()))
        .map_err(csv_err)?;
    for record in records {
        wtr.write_record(record.cells().iter().map(Cell::to_text))
            .map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
