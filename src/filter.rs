use crate::dataset::{CellValue, RowRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Product,
    Release,
    Configuration,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 3] = [
        FilterColumn::Product,
        FilterColumn::Release,
        FilterColumn::Configuration,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            FilterColumn::Product => "Product",
            FilterColumn::Release => "Release",
            FilterColumn::Configuration => "Configuration",
        }
    }

    fn index(self) -> usize {
        match self {
            FilterColumn::Product => 0,
            FilterColumn::Release => 1,
            FilterColumn::Configuration => 2,
        }
    }
}

/// `None` is the unconstrained selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    selected: [Option<CellValue>; 3],
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: FilterColumn) -> Option<&CellValue> {
        self.selected[column.index()].as_ref()
    }

    pub fn set(&mut self, column: FilterColumn, value: CellValue) {
        self.selected[column.index()] = Some(value);
    }

    pub fn clear(&mut self, column: FilterColumn) {
        self.selected[column.index()] = None;
    }

    pub fn reset(&mut self) {
        self.selected = Default::default();
    }

    pub fn is_unconstrained(&self) -> bool {
        self.selected.iter().all(Option::is_none)
    }

    /// Steps through `[unconstrained, options...]` and wraps around. A stale
    /// selection that is no longer an option restarts at unconstrained.
    pub fn cycle(&mut self, column: FilterColumn, options: &[CellValue]) {
        let slot = &mut self.selected[column.index()];
        *slot = match slot.as_ref() {
            None => options.first().cloned(),
            Some(current) => options
                .iter()
                .position(|v| v == current)
                .and_then(|idx| options.get(idx + 1))
                .cloned(),
        };
    }

    pub fn matches(&self, row: &RowRecord) -> bool {
        FilterColumn::ALL.iter().all(|column| match self.get(*column) {
            None => true,
            Some(wanted) => row.get(column.column_name()) == Some(wanted),
        })
    }
}

/// Distinct truthy values of `column`, in order of first appearance.
pub fn unique_values(rows: &[RowRecord], column: &str) -> Vec<CellValue> {
    let mut out: Vec<CellValue> = Vec::new();
    for value in rows.iter().filter_map(|row| row.get(column)) {
        if value.is_falsy() || out.contains(value) {
            continue;
        }
        out.push(value.clone());
    }
    out
}

/// Always re-derived from the full dataset.
pub fn filter_rows<'a>(rows: &'a [RowRecord], filters: &FilterState) -> Vec<&'a RowRecord> {
    rows.iter().filter(|row| filters.matches(row)).collect()
}
