use playlist_sync_core::config::VerbositySetting;

use crate::cli::Args;

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_disable_color(
    no_color_flag: bool,
    no_color_env: bool,
    dumb_terminal: bool,
) -> bool {
    no_color_flag || no_color_env || dumb_terminal
}

pub(crate) fn is_no_color_requested(args: &Args) -> bool {
    should_disable_color(args.no_color, no_color_env_requested(), is_dumb_terminal())
}

pub(crate) fn should_use_spinner(
    stderr_is_terminal: bool,
    quiet: bool,
    dumb_terminal: bool,
) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

/// Log level used when `RUST_LOG` is unset.
///
/// Priority: `--quiet`, then `-v`/`-vv`, then the config file, then `info`.
pub(crate) fn resolve_default_log_level(
    quiet: bool,
    verbose: u8,
    configured: Option<VerbositySetting>,
) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => {}
        1 => return "debug",
        _ => return "trace",
    }
    match configured {
        Some(VerbositySetting::Quiet) => "error",
        Some(VerbositySetting::Verbose) => "debug",
        Some(VerbositySetting::Debug) => "trace",
        Some(VerbositySetting::Default) | None => "info",
    }
}

pub(crate) fn init_tracing(default_level: &str, no_color: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}
