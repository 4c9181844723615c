//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use playlist_sync_core::Overrides;

/// Mirror a playlist into a directory of tagged MP3 files.
///
/// Every track of the playlist is searched on the video site, converted to
/// MP3, tagged with catalog metadata and saved as "Artist - Title.mp3".
/// Tracks already present with matching tags are skipped, so re-running the
/// command only fetches what is missing.
///
/// Credentials are read from SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET
/// (a .env file in the working directory is loaded first).
#[derive(Parser, Debug)]
#[command(name = "playlist-sync")]
#[command(author, version, about)]
pub struct Args {
    /// Playlist link, spotify:playlist: URI, or bare playlist id
    pub playlist_url: String,

    /// Destination directory (created if missing)
    pub dest_dir: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,

    /// Config file (default: $XDG_CONFIG_HOME/playlist-sync/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Tracks processed in parallel (1-8, default 1)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub concurrency: Option<u8>,

    /// Pause after each acquisition attempt in milliseconds (default 1500)
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub item_delay_ms: Option<u64>,

    /// Pause after each playlist page request in milliseconds (default 700)
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub page_delay_ms: Option<u64>,

    /// yt-dlp executable (default: yt-dlp on PATH)
    #[arg(long = "yt-dlp", value_name = "PATH")]
    pub yt_dlp: Option<PathBuf>,

    /// Directory containing ffmpeg and ffprobe
    #[arg(long, value_name = "PATH")]
    pub ffmpeg_location: Option<PathBuf>,

    /// Cookie file passed to yt-dlp
    #[arg(long = "cookies", value_name = "PATH")]
    pub cookies: Option<PathBuf>,
}

impl Args {
    /// Command-line values that take precedence over the config file.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            concurrency: self.concurrency.map(usize::from),
            item_delay_ms: self.item_delay_ms,
            page_delay_ms: self.page_delay_ms,
            yt_dlp_path: self.yt_dlp.clone(),
            ffmpeg_location: self.ffmpeg_location.clone(),
            cookie_file: self.cookies.clone(),
        }
    }
}
