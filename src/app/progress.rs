//! Progress UI (spinner) for sync runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use playlist_sync_core::SyncStats;

/// Spawns the progress UI (spinner) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    stats: Arc<SyncStats>,
    total: usize,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(stats, total, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_spinner_inner(
    stats: Arc<SyncStats>,
    total: usize,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        while !stop.load(Ordering::SeqCst) {
            spinner.set_message(progress_message(&stats, total));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        spinner.finish_and_clear();
    })
}

fn progress_message(stats: &SyncStats, total: usize) -> String {
    let done = stats.processed().min(total);
    let current = if done < total { done + 1 } else { done };
    format!(
        "[{current}/{total}] Syncing playlist... ({} new, {} skipped, {} failed)",
        stats.committed(),
        stats.skipped(),
        stats.failed()
    )
}
