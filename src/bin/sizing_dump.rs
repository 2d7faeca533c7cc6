use std::sync::mpsc;

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};

use sizing_terminal::config::{self, AppConfig};
use sizing_terminal::dataset::display_columns;
use sizing_terminal::filter::{FilterColumn, unique_values};
use sizing_terminal::loader::{CancelToken, run_loaders};
use sizing_terminal::logging;
use sizing_terminal::notes_fetch::note_status_label;
use sizing_terminal::platform::{Platform, platform_label};
use sizing_terminal::state::{AppState, SheetStatus, apply_delta};

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_stderr();
    let cfg = AppConfig::from_env();
    let fetcher = cfg.build_fetcher()?;

    let (tx, rx) = mpsc::channel();
    run_loaders(fetcher.as_ref(), &tx, &CancelToken::new());
    drop(tx);

    let mut state = AppState::new();
    for delta in rx {
        apply_delta(&mut state, delta);
    }

    let output = match parse_arg("--platform") {
        Some(slug) => {
            let platform =
                Platform::from_slug(&slug).ok_or_else(|| anyhow!("unknown platform: {slug}"))?;
            platform_rows(&mut state, platform)?
        }
        None => summary(&state, &cfg),
    };

    let text = serde_json::to_string_pretty(&output).context("serialize dump")?;
    println!("{text}");
    Ok(())
}

fn summary(state: &AppState, cfg: &AppConfig) -> Value {
    let platforms = Platform::ALL
        .iter()
        .map(|platform| {
            let slot = &state.datasets[*platform];
            let note = &state.notes[*platform];
            json!({
                "platform": platform_label(*platform),
                "slug": platform.slug(),
                "sheet_status": sheet_status_label(slot.status),
                "rows": slot.rows.len(),
                "columns": display_columns(&slot.rows),
                "note_status": note_status_label(note.status),
                "note": note.content,
            })
        })
        .collect::<Vec<_>>();
    json!({ "source": cfg.source.label(), "platforms": platforms })
}

fn platform_rows(state: &mut AppState, platform: Platform) -> Result<Value> {
    state.select_platform(platform);
    for (column, flag) in [
        (FilterColumn::Product, "--product"),
        (FilterColumn::Release, "--release"),
        (FilterColumn::Configuration, "--configuration"),
    ] {
        let Some(raw) = parse_arg(flag) else {
            continue;
        };
        let options = unique_values(&state.active_dataset().rows, column.column_name());
        let value = options
            .into_iter()
            .find(|v| v.to_string() == raw.trim())
            .ok_or_else(|| anyhow!("no {} value matches {raw:?}", column.column_name()))?;
        state.filters.set(column, value);
    }

    let rows = state.filtered_rows();
    Ok(json!({
        "platform": platform_label(platform),
        "columns": state.active_columns(),
        "total": state.active_dataset().rows.len(),
        "matched": rows.len(),
        "rows": rows,
    }))
}

fn sheet_status_label(status: SheetStatus) -> &'static str {
    match status {
        SheetStatus::Pending => "pending",
        SheetStatus::Loaded => "loaded",
        SheetStatus::Failed => "failed",
    }
}

fn parse_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
