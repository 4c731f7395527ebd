// src/xlsx.rs

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::parse::{CellValue, ColumnLabels, RawRow};

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            CellValue::Text(s.clone())
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}

/// Index of the first row that names both the term and the course-code columns.
fn find_header(grid: &[Vec<CellValue>], labels: &ColumnLabels) -> Option<usize> {
    grid.iter().position(|row| {
        let texts: Vec<String> = row.iter().map(CellValue::as_text).collect();
        texts.iter().any(|t| *t == labels.term) && texts.iter().any(|t| *t == labels.code)
    })
}

/// Turn a grid of cells into label → value rows.
/// Rows above the header and fully blank rows are dropped.
pub fn rows_from_grid(grid: &[Vec<CellValue>], labels: &ColumnLabels) -> Result<Vec<RawRow>> {
    let header_idx = find_header(grid, labels).ok_or_else(|| {
        anyhow!(
            "no header row containing `{}` and `{}`",
            labels.term,
            labels.code
        )
    })?;
    let header: Vec<String> = grid[header_idx].iter().map(CellValue::as_text).collect();
    debug!(row = header_idx, columns = header.len(), "found header row");

    for wanted in labels.all() {
        if !header.iter().any(|h| h == wanted) {
            warn!(column = wanted, "column missing from header; its cells read as empty");
        }
    }

    let mut rows = Vec::new();
    for cells in &grid[header_idx + 1..] {
        if cells.iter().all(|c| c.as_text().is_empty()) {
            continue;
        }
        let row: RawRow = header
            .iter()
            .zip(cells.iter())
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, cell)| (name.clone(), cell.clone()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Read one sheet (the first when `sheet` is `None`) of an xlsx/xls/ods export.
#[instrument(level = "info", skip(labels))]
pub fn read_rows(path: &Path, sheet: Option<&str>, labels: &ColumnLabels) -> Result<Vec<RawRow>> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening workbook {:?}", path))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("workbook {:?} contains no sheets", path))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet `{}`", sheet_name))?;
    let grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(to_cell).collect())
        .collect();

    let rows = rows_from_grid(&grid, labels)
        .with_context(|| format!("locating columns in sheet `{}`", sheet_name))?;
    info!(sheet = %sheet_name, rows = rows.len(), "read spreadsheet rows");
    Ok(rows)
}
