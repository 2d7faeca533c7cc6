use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use rayon::prelude::*;

use crate::http_client::Fetch;
use crate::notes_fetch::load_note;
use crate::platform::{Platform, platform_label};
use crate::sheet_fetch::load_sheet;
use crate::state::Delta;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Cancels the loaders when dropped.
pub struct LoaderHandle {
    token: CancelToken,
    join: Option<JoinHandle<()>>,
}

impl LoaderHandle {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels and waits for in-flight requests to return.
    pub fn shutdown(mut self) {
        self.token.cancel();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for LoaderHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Sends a delta unless the loaders were cancelled. A closed receiver is ignored.
fn send(tx: &Sender<Delta>, token: &CancelToken, delta: Delta) {
    if token.is_cancelled() {
        return;
    }
    let _ = tx.send(delta);
}

pub fn spawn_loaders(
    fetcher: Arc<dyn Fetch>,
    tx: Sender<Delta>,
    parallelism: usize,
) -> LoaderHandle {
    let token = CancelToken::new();
    let worker_token = token.clone();
    let join = thread::spawn(move || {
        let pool = build_fetch_pool(parallelism);
        with_fetch_pool(&pool, || run_loaders(fetcher.as_ref(), &tx, &worker_token));
    });
    LoaderHandle {
        token,
        join: Some(join),
    }
}

/// Runs both pipelines to completion on the current rayon pool. Each platform
/// gets exactly one sheet delta and one note delta unless cancelled.
pub fn run_loaders(fetcher: &dyn Fetch, tx: &Sender<Delta>, token: &CancelToken) {
    send(
        tx,
        token,
        Delta::Log(format!("[INFO] Loading {} platforms", Platform::ALL.len())),
    );
    rayon::join(
        || load_all_sheets(fetcher, tx, token),
        || load_all_notes(fetcher, tx, token),
    );
    if !token.is_cancelled() {
        tracing::info!("initial load finished");
    }
}

fn load_all_sheets(fetcher: &dyn Fetch, tx: &Sender<Delta>, token: &CancelToken) {
    Platform::ALL.par_iter().for_each(|platform| {
        if token.is_cancelled() {
            return;
        }
        let outcome = load_sheet(fetcher, *platform);
        send(
            tx,
            token,
            Delta::SetSheet {
                platform: *platform,
                outcome,
            },
        );
    });
}

fn load_all_notes(fetcher: &dyn Fetch, tx: &Sender<Delta>, token: &CancelToken) {
    Platform::ALL.par_iter().for_each(|platform| {
        if token.is_cancelled() {
            return;
        }
        send(tx, token, Delta::NoteLoading(*platform));
        let entry = load_note(fetcher, *platform);
        tracing::debug!(
            platform = platform_label(*platform),
            status = ?entry.status,
            "note resolved"
        );
        send(
            tx,
            token,
            Delta::SetNote {
                platform: *platform,
                entry,
            },
        );
    });
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .ok()
}

fn with_fetch_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}
