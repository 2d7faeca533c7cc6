use std::collections::HashSet;
use std::io::Cursor;

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, Xlsx};

use crate::dataset::{CellValue, RowRecord, format_number};
use crate::http_client::{CacheMode, Fetch};
use crate::platform::Platform;

const EMPTY_HEADER: &str = "__EMPTY";

#[derive(Debug, Clone, PartialEq)]
pub enum SheetOutcome {
    Loaded(Vec<RowRecord>),
    Failed(String),
}

/// Fetches and parses one platform's workbook. Never returns an error; failures
/// come back as `SheetOutcome::Failed` and leave the dataset empty.
pub fn load_sheet(fetcher: &dyn Fetch, platform: Platform) -> SheetOutcome {
    match fetch_sheet_rows(fetcher, platform) {
        Ok(rows) => {
            tracing::info!(platform = platform.slug(), rows = rows.len(), "sheet loaded");
            SheetOutcome::Loaded(rows)
        }
        Err(err) => {
            let message = format!("{err:#}");
            tracing::warn!(platform = platform.slug(), error = %message, "sheet load failed");
            SheetOutcome::Failed(message)
        }
    }
}

fn fetch_sheet_rows(fetcher: &dyn Fetch, platform: Platform) -> Result<Vec<RowRecord>> {
    let path = platform.sheet_path();
    let resp = fetcher
        .fetch(path, CacheMode::Default)
        .with_context(|| format!("request failed: {}", fetcher.describe(path)))?;
    if !resp.is_success() {
        return Err(anyhow!("http {} for {}", resp.status, fetcher.describe(path)));
    }
    parse_workbook(&resp.body).with_context(|| format!("invalid workbook: {path}"))
}

/// Converts the first worksheet into row-records keyed by the header row.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<RowRecord>> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes)).map_err(|err| anyhow!("failed to open xlsx: {err}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook has no sheets"))?
        .map_err(|err| anyhow!("failed to read first sheet: {err}"))?;

    let mut rows = range.rows();
    let Some(header_cells) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers = header_names(header_cells);

    let mut records = Vec::new();
    for cells in rows {
        let values: Vec<CellValue> = (0..headers.len())
            .map(|idx| cells.get(idx).map(cell_value).unwrap_or(CellValue::Blank))
            .collect();
        if values.iter().all(|v| *v == CellValue::Blank) {
            continue;
        }
        let mut record = RowRecord::with_capacity(headers.len());
        for (name, value) in headers.iter().zip(values) {
            record.insert(name.clone(), value);
        }
        records.push(record);
    }
    Ok(records)
}

/// Header text is kept as written. Blank headers become `__EMPTY`, repeats
/// get `_1`, `_2`, ... suffixes.
pub fn header_names(cells: &[Data]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(cells.len());
    let mut names = Vec::with_capacity(cells.len());
    for cell in cells {
        let raw = header_text(cell);
        let base = if raw.is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            raw
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }
    names
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        CellValue::Text(v) => v,
        CellValue::Number(v) => format_number(v),
        CellValue::Blank => String::new(),
    }
}

pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(v) => CellValue::text(v.as_str()),
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(v) => CellValue::Text(if *v { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(v) => CellValue::Number(v.as_f64()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => CellValue::text(v.as_str()),
        Data::Error(v) => CellValue::Text(v.to_string()),
        Data::Empty => CellValue::Blank,
    }
}
