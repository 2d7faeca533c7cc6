#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use rust_xlsxwriter::Workbook;
use sizing_terminal::dataset::{CellValue, RowRecord};
use sizing_terminal::http_client::{CacheMode, Fetch, FetchError, FetchResponse};

#[derive(Clone)]
pub enum Canned {
    Status(u16, Vec<u8>),
    NetworkError,
}

/// In-memory fetcher. Unknown paths answer 404.
#[derive(Default)]
pub struct StubFetcher {
    routes: HashMap<String, Canned>,
    pub calls: Mutex<Vec<(String, CacheMode)>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, canned: Canned) -> Self {
        self.routes.insert(path.to_string(), canned);
        self
    }

    pub fn ok(self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with(path, Canned::Status(200, body.into()))
    }

    pub fn status(self, path: &str, status: u16) -> Self {
        self.with(path, Canned::Status(status, Vec::new()))
    }

    pub fn cache_mode_for(&self, path: &str) -> Option<CacheMode> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, mode)| *mode)
    }
}

impl Fetch for StubFetcher {
    fn fetch(&self, path: &str, cache: CacheMode) -> Result<FetchResponse, FetchError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((path.to_string(), cache));
        match self.routes.get(path).cloned() {
            Some(Canned::Status(status, body)) => Ok(FetchResponse { status, body }),
            Some(Canned::NetworkError) => {
                Err(FetchError::Transport("connection refused".to_string()))
            }
            None => Ok(FetchResponse {
                status: 404,
                body: Vec::new(),
            }),
        }
    }

    fn describe(&self, path: &str) -> String {
        format!("stub://{path}")
    }
}

/// Header row followed by data rows; `CellValue::Blank` cells are left unwritten.
pub fn xlsx_bytes(header: &[&str], rows: &[Vec<CellValue>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (col, name) in header.iter().enumerate() {
            if !name.is_empty() {
                sheet
                    .write_string(0, col as u16, *name)
                    .expect("write header");
            }
        }
        for (row_idx, row) in rows.iter().enumerate() {
            let r = (row_idx + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                match value {
                    CellValue::Text(v) => {
                        sheet.write_string(r, col as u16, v).expect("write text");
                    }
                    CellValue::Number(v) => {
                        sheet.write_number(r, col as u16, *v).expect("write number");
                    }
                    CellValue::Blank => {}
                }
            }
        }
    }
    workbook.save_to_buffer().expect("workbook buffer")
}

pub fn row(fields: &[(&str, CellValue)]) -> RowRecord {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub fn text(v: &str) -> CellValue {
    CellValue::text(v)
}

pub fn num(v: f64) -> CellValue {
    CellValue::Number(v)
}

pub fn sizing_rows() -> Vec<RowRecord> {
    vec![
        row(&[
            ("Product", text("Backup")),
            ("Release", text("12.1")),
            ("Configuration", text("Small")),
            ("vCPU", num(4.0)),
        ]),
        row(&[
            ("Product", text("Backup")),
            ("Release", text("12.2")),
            ("Configuration", text("Large")),
            ("vCPU", num(16.0)),
        ]),
        row(&[
            ("Product", text("Replication")),
            ("Release", text("12.1")),
            ("Configuration", text("Small")),
            ("vCPU", num(2.0)),
        ]),
        row(&[
            ("Product", text("Replication")),
            ("Release", text("12.2")),
            ("Configuration", CellValue::Blank),
            ("vCPU", num(0.0)),
        ]),
        row(&[
            ("Product", CellValue::Blank),
            ("Release", num(0.0)),
            ("Configuration", text("Small")),
            ("vCPU", num(8.0)),
        ]),
    ]
}
