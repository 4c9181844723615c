use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use playlist_sync_core::library::{build_cover_http_client, stale_temp_files};
use playlist_sync_core::{
    Credentials, DEFAULTS, RunSettings, SpotifyCatalog, SyncEngine, YtDlpBackend, enumerate,
    load_config, parse_playlist_id,
};
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::{progress, terminal};
use crate::cli::Args;

/// Runs one sync. Every error returned from here is a setup failure; item
/// failures are only counted.
pub(crate) async fn run_sync(args: Args) -> Result<ProcessExit> {
    let dotenv = dotenvy::dotenv();

    let loaded = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    let default_level =
        terminal::resolve_default_log_level(args.quiet, args.verbose, loaded.config.verbosity);
    terminal::init_tracing(default_level, terminal::is_no_color_requested(&args));

    debug!(?args, "CLI arguments parsed");
    match &dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env file"),
        Err(error) if error.not_found() => debug!("no .env file"),
        Err(error) => warn!(error = %error, "ignoring unreadable .env file"),
    }
    if loaded.loaded_from_file
        && let Some(path) = &loaded.path
    {
        info!(path = %path.display(), "Using config file");
    }

    let settings = RunSettings::resolve(&loaded.config, &args.overrides())
        .context("Invalid command-line settings")?;
    let playlist = parse_playlist_id(&args.playlist_url)?;
    let credentials = Credentials::from_env()?;

    prepare_destination(&args.dest_dir)?;

    let backend = YtDlpBackend::new(settings.backend.clone());
    let version = backend
        .version()
        .await
        .context("The audio backend (yt-dlp) is not usable")?;
    debug!(%version, "yt-dlp available");

    let catalog = SpotifyCatalog::new(credentials)?;
    catalog
        .authenticate()
        .await
        .context("Failed to authenticate with the catalog")?;

    info!(playlist = %playlist, "Fetching playlist");
    let tracks = enumerate(&catalog, &playlist, &DEFAULTS, settings.sync.page_delay)
        .await
        .with_context(|| format!("Failed to list playlist {playlist}"))?;
    let total = tracks.len();
    info!(tracks = total, "Playlist fetched");

    let covers = build_cover_http_client(settings.cover_timeout)
        .context("Failed to build cover-art HTTP client")?;
    let engine = SyncEngine::new(settings.sync, Arc::new(backend), covers)?;

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let (spinner, stop) = progress::spawn_progress_ui(use_spinner, engine.stats(), total);

    let result = engine.run(&args.dest_dir, tracks).await;

    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = spinner {
        let _ = handle.await;
    }
    let summary = result?;

    if !args.quiet {
        println!("Sync complete: {summary}");
    }
    if !summary.is_clean() {
        warn!(
            failed = summary.failed,
            "Some tracks failed; re-run the command to retry them"
        );
    }
    Ok(ProcessExit::Success)
}

fn prepare_destination(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create destination directory '{}'", dir.display()))?;
        info!(dir = %dir.display(), "Created destination directory");
    }

    match stale_temp_files(dir) {
        Ok(stale) if !stale.is_empty() => {
            for path in &stale {
                warn!(path = %path.display(), "Leftover temporary file from an interrupted run");
            }
        }
        Ok(_) => {}
        Err(error) => {
            return Err(error)
                .with_context(|| format!("Cannot read destination directory '{}'", dir.display()));
        }
    }
    Ok(())
}
