use std::collections::VecDeque;
use std::time::Instant;

use crate::dataset::{CellValue, RowRecord, display_columns};
use crate::filter::{FilterColumn, FilterState, filter_rows, unique_values};
use crate::notes_fetch::{NoteEntry, NoteStatus};
use crate::platform::{Platform, PlatformMap, platform_label};
use crate::sheet_fetch::SheetOutcome;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetStatus {
    Pending,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSlot {
    pub status: SheetStatus,
    pub rows: Vec<RowRecord>,
}

impl Default for DatasetSlot {
    fn default() -> Self {
        Self {
            status: SheetStatus::Pending,
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportState {
    pub last_path: Option<String>,
    pub last_error: Option<String>,
    pub finished_at: Option<Instant>,
}

impl ExportState {
    pub fn clear_if_done_for(&mut self, now: Instant, secs: u64) {
        if let Some(at) = self.finished_at
            && now.duration_since(at).as_secs() >= secs
        {
            *self = ExportState::default();
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub active: Platform,
    pub datasets: PlatformMap<DatasetSlot>,
    pub notes: PlatformMap<NoteEntry>,
    pub filters: FilterState,
    pub scroll: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export: ExportState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            active: Platform::VMware,
            datasets: PlatformMap::default(),
            notes: PlatformMap::default(),
            filters: FilterState::new(),
            scroll: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            export: ExportState::default(),
        }
    }

    /// Every tab change, including re-selecting the current tab, clears the filters.
    pub fn select_platform(&mut self, platform: Platform) {
        self.active = platform;
        self.filters.reset();
        self.scroll = 0;
    }

    pub fn next_platform(&mut self) {
        self.select_platform(self.active.next());
    }

    pub fn prev_platform(&mut self) {
        self.select_platform(self.active.prev());
    }

    pub fn active_dataset(&self) -> &DatasetSlot {
        &self.datasets[self.active]
    }

    pub fn active_note(&self) -> &NoteEntry {
        &self.notes[self.active]
    }

    pub fn active_columns(&self) -> Vec<String> {
        display_columns(&self.active_dataset().rows)
    }

    pub fn filter_options(&self, column: FilterColumn) -> Vec<CellValue> {
        unique_values(&self.active_dataset().rows, column.column_name())
    }

    pub fn filtered_rows(&self) -> Vec<&RowRecord> {
        filter_rows(&self.active_dataset().rows, &self.filters)
    }

    pub fn cycle_filter(&mut self, column: FilterColumn) {
        let options = self.filter_options(column);
        self.filters.cycle(column, &options);
        self.scroll = 0;
    }

    pub fn clear_filters(&mut self) {
        self.filters.reset();
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self, by: usize) {
        let total = self.filtered_rows().len();
        self.scroll = (self.scroll + by).min(total.saturating_sub(1));
    }

    pub fn scroll_up(&mut self, by: usize) {
        self.scroll = self.scroll.saturating_sub(by);
    }

    /// Message for an empty table, driven by the load status of the active tab.
    pub fn empty_table_message(&self) -> &'static str {
        match self.active_dataset().status {
            SheetStatus::Pending => "Loading...",
            SheetStatus::Loaded | SheetStatus::Failed => "No data",
        }
    }

    pub fn all_loaded(&self) -> bool {
        self.datasets
            .iter()
            .all(|(_, slot)| slot.status != SheetStatus::Pending)
            && self.notes.iter().all(|(_, note)| note.status.is_terminal())
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetSheet {
        platform: Platform,
        outcome: SheetOutcome,
    },
    NoteLoading(Platform),
    SetNote {
        platform: Platform,
        entry: NoteEntry,
    },
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetSheet { platform, outcome } => {
            let slot = &mut state.datasets[platform];
            if slot.status != SheetStatus::Pending {
                // One write per platform; later writes are stale.
                return;
            }
            match outcome {
                SheetOutcome::Loaded(rows) => {
                    let count = rows.len();
                    slot.rows = rows;
                    slot.status = SheetStatus::Loaded;
                    state.push_log(format!(
                        "[INFO] {} sizing loaded ({count} rows)",
                        platform_label(platform)
                    ));
                }
                SheetOutcome::Failed(err) => {
                    slot.rows.clear();
                    slot.status = SheetStatus::Failed;
                    state.push_log(format!(
                        "[WARN] {} sizing unavailable: {err}",
                        platform_label(platform)
                    ));
                }
            }
        }
        Delta::NoteLoading(platform) => {
            let note = &mut state.notes[platform];
            if note.status.can_advance_to(NoteStatus::Loading) {
                note.status = NoteStatus::Loading;
            }
        }
        Delta::SetNote { platform, entry } => {
            let note = &mut state.notes[platform];
            if !note.status.can_advance_to(entry.status) {
                return;
            }
            let status = entry.status;
            *note = entry;
            if matches!(status, NoteStatus::Fallback | NoteStatus::Error) {
                state.push_log(format!(
                    "[WARN] {} notes fell back to defaults",
                    platform_label(platform)
                ));
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
