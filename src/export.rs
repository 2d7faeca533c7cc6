use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dataset::{CellValue, RowRecord};
use crate::platform::{Platform, platform_label};

pub fn export_file_name(platform: Platform, at: DateTime<Local>) -> String {
    format!("sizing-{}-{}.xlsx", platform.slug(), at.format("%Y%m%d-%H%M%S"))
}

pub fn build_workbook(
    platform: Platform,
    columns: &[String],
    rows: &[&RowRecord],
) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(platform_label(platform))?;
        write_header(sheet, columns)?;
        write_rows(sheet, columns, rows)?;
    }
    Ok(workbook)
}

/// Writes the filtered view into `dir` and returns the file path.
pub fn export_view(
    dir: &Path,
    platform: Platform,
    columns: &[String],
    rows: &[&RowRecord],
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed creating export dir {}", dir.display()))?;
    let path = dir.join(export_file_name(platform, Local::now()));
    let mut workbook = build_workbook(platform, columns, rows)?;
    workbook
        .save(&path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "export written");
    Ok(path)
}

fn write_header(worksheet: &mut Worksheet, columns: &[String]) -> Result<()> {
    for (col_idx, name) in columns.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, name)
            .with_context(|| format!("write header ({col_idx})"))?;
    }
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, columns: &[String], rows: &[&RowRecord]) -> Result<()> {
    for (idx, row) in rows.iter().enumerate() {
        let row_idx = (idx + 1) as u32;
        for (col_idx, name) in columns.iter().enumerate() {
            let col_idx = col_idx as u16;
            match row.get(name) {
                Some(CellValue::Text(v)) => {
                    worksheet
                        .write_string(row_idx, col_idx, v)
                        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
                }
                Some(CellValue::Number(v)) => {
                    worksheet
                        .write_number(row_idx, col_idx, *v)
                        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
                }
                Some(CellValue::Blank) | None => {}
            }
        }
    }
    Ok(())
}
