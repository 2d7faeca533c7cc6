mod common;

use common::{Canned, StubFetcher, num, sizing_rows, text, xlsx_bytes};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use sizing_terminal::dataset::{CellValue, display_columns};
use sizing_terminal::export::build_workbook;
use sizing_terminal::http_client::CacheMode;
use sizing_terminal::platform::Platform;
use sizing_terminal::sheet_fetch::{SheetOutcome, load_sheet, parse_workbook};
use sizing_terminal::state::{AppState, Delta, SheetStatus, apply_delta};

#[test]
fn first_sheet_becomes_row_records_keyed_by_header() {
    let bytes = xlsx_bytes(
        &["Product", "Release", "vCPU"],
        &[
            vec![text("Backup"), text("12.1"), num(4.0)],
            vec![text("Replication"), CellValue::Blank, num(2.0)],
        ],
    );
    let rows = parse_workbook(&bytes).expect("workbook should parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(display_columns(&rows), vec!["Product", "Release", "vCPU"]);
    assert_eq!(rows[0].get("vCPU"), Some(&num(4.0)));
    // Absent cells default to blank rather than disappearing.
    assert_eq!(rows[1].get("Release"), Some(&CellValue::Blank));
    assert_eq!(rows[1].len(), 3);
}

#[test]
fn header_row_names_blank_and_duplicate_columns() {
    let bytes = xlsx_bytes(
        &["Product", "", "Product"],
        &[vec![text("A"), text("B"), text("C")]],
    );
    let rows = parse_workbook(&bytes).expect("workbook should parse");
    assert_eq!(display_columns(&rows), vec!["Product", "__EMPTY", "Product_1"]);
    assert_eq!(rows[0].get("Product_1"), Some(&text("C")));
}

#[test]
fn blank_rows_are_skipped() {
    let bytes = xlsx_bytes(
        &["Product"],
        &[vec![text("A")], vec![CellValue::Blank], vec![text("B")]],
    );
    let rows = parse_workbook(&bytes).expect("workbook should parse");
    let products: Vec<_> = rows.iter().filter_map(|r| r.get("Product")).collect();
    assert_eq!(products, vec![&text("A"), &text("B")]);
}

#[test]
fn header_only_sheet_has_no_rows() {
    let bytes = xlsx_bytes(&["Product", "Release"], &[]);
    assert!(parse_workbook(&bytes).expect("workbook should parse").is_empty());
}

#[test]
fn server_error_leaves_dataset_empty() {
    let fetcher = StubFetcher::new().status("/Sizing-VMWare.xlsx", 500);
    let outcome = load_sheet(&fetcher, Platform::VMware);
    assert!(matches!(outcome, SheetOutcome::Failed(ref msg) if msg.contains("500")));

    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetSheet {
            platform: Platform::VMware,
            outcome,
        },
    );
    let slot = &state.datasets[Platform::VMware];
    assert!(slot.rows.is_empty());
    assert_eq!(slot.status, SheetStatus::Failed);
    assert_eq!(state.empty_table_message(), "No data");
}

#[test]
fn corrupt_body_and_network_errors_fail_softly() {
    let fetcher = StubFetcher::new()
        .ok("/Sizing-AWS.xlsx", b"PK\x03\x04 not really".to_vec())
        .with("/Sizing-Azure.xlsx", Canned::NetworkError);
    assert!(matches!(
        load_sheet(&fetcher, Platform::Aws),
        SheetOutcome::Failed(_)
    ));
    assert!(matches!(
        load_sheet(&fetcher, Platform::Azure),
        SheetOutcome::Failed(_)
    ));
}

#[test]
fn sheet_requests_use_default_cache_mode() {
    let bytes = xlsx_bytes(&["Product"], &[vec![text("A")]]);
    let fetcher = StubFetcher::new().ok("/Sizing-Proxmox.xlsx", bytes);
    let outcome = load_sheet(&fetcher, Platform::Proxmox);
    assert!(matches!(outcome, SheetOutcome::Loaded(ref rows) if rows.len() == 1));
    assert_eq!(
        fetcher.cache_mode_for("/Sizing-Proxmox.xlsx"),
        Some(CacheMode::Default)
    );
}

#[test]
fn exported_view_reads_back_with_numbers_intact() {
    let rows = sizing_rows();
    let columns = display_columns(&rows);
    let subset: Vec<_> = rows.iter().take(2).collect();
    let mut workbook =
        build_workbook(Platform::NutanixAhv, &columns, &subset).expect("workbook builds");
    let bytes = workbook.save_to_buffer().expect("workbook saves");

    let parsed = parse_workbook(&bytes).expect("export should parse");
    assert_eq!(display_columns(&parsed), columns);
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[1].get("vCPU"), Some(&num(16.0)));
    assert_eq!(parsed[1].get("Configuration"), Some(&text("Large")));
}

#[test]
fn date_cells_read_back_as_serial_numbers() {
    let format = Format::new().set_num_format("yyyy-mm-dd");
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Product").expect("write header");
        sheet.write_string(0, 1, "GA date").expect("write header");
        sheet.write_string(1, 0, "Backup").expect("write text");
        let ga = ExcelDateTime::from_ymd(2024, 1, 1).expect("valid date");
        sheet
            .write_datetime_with_format(1, 1, &ga, &format)
            .expect("write date");
        // A row holding only a date is still a data row.
        let eol = ExcelDateTime::from_ymd(2024, 1, 2).expect("valid date");
        sheet
            .write_datetime_with_format(2, 1, &eol, &format)
            .expect("write date");
    }
    let bytes = workbook.save_to_buffer().expect("workbook saves");

    let rows = parse_workbook(&bytes).expect("workbook should parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("GA date"), Some(&num(45292.0)));
    assert_eq!(rows[1].get("GA date"), Some(&num(45293.0)));
    assert_eq!(rows[1].get("Product"), Some(&CellValue::Blank));
}
