//! yt-dlp subprocess backend.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{AcquireError, AudioBackend, FetchRequest};

/// Knobs passed through to the yt-dlp command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub yt_dlp_path: PathBuf,
    /// Directory holding ffmpeg/ffprobe, when not on `PATH`.
    pub ffmpeg_location: Option<PathBuf>,
    /// Netscape-format cookie file for the video site.
    pub cookie_file: Option<PathBuf>,
    /// MP3 bitrate in kbit/s.
    pub audio_quality: u32,
    pub retries: u32,
    pub fragment_retries: u32,
    pub retry_sleep: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            yt_dlp_path: PathBuf::from("yt-dlp"),
            ffmpeg_location: None,
            cookie_file: None,
            audio_quality: 192,
            retries: 3,
            fragment_retries: 10,
            retry_sleep: Duration::from_secs(15),
        }
    }
}

/// Searches the video site for the track and extracts MP3 audio.
#[derive(Debug, Clone)]
pub struct YtDlpBackend {
    settings: BackendSettings,
}

impl YtDlpBackend {
    #[must_use]
    pub fn new(settings: BackendSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    /// Runs `yt-dlp --version` to confirm the executable is usable.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Backend`] when the executable cannot be
    /// launched or exits with failure.
    pub async fn version(&self) -> Result<String, AcquireError> {
        let program = &self.settings.yt_dlp_path;
        let output = Command::new(program)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AcquireError::launch("--version", program, &source))?;

        if !output.status.success() {
            return Err(AcquireError::exit(
                "--version",
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Full argument list for one fetch.
    #[must_use]
    pub fn command_args(&self, request: &FetchRequest) -> Vec<OsString> {
        let settings = &self.settings;
        let retry_sleep = settings.retry_sleep.as_secs().to_string();

        let mut args: Vec<OsString> = [
            "--format",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            "mp3",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push("--audio-quality".into());
        args.push(format!("{}K", settings.audio_quality).into());
        args.extend(
            ["--write-thumbnail", "--embed-thumbnail", "--no-progress"]
                .into_iter()
                .map(OsString::from),
        );
        args.push("--retries".into());
        args.push(settings.retries.to_string().into());
        args.push("--fragment-retries".into());
        args.push(settings.fragment_retries.to_string().into());
        args.push("--retry-sleep".into());
        args.push(retry_sleep.clone().into());
        args.push("--retry-sleep".into());
        args.push(format!("fragment:{retry_sleep}").into());

        if let Some(ffmpeg) = &settings.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into_os_string());
        }
        if let Some(cookies) = &settings.cookie_file {
            args.push("--cookies".into());
            args.push(cookies.clone().into_os_string());
        }

        // `%` starts an output-template field; the stem is literal text.
        let template = format!("{}.%(ext)s", request.temp_stem.replace('%', "%%"));
        args.push("--output".into());
        args.push(request.output_dir.join(template).into_os_string());
        args.push("--print".into());
        args.push("after_move:filepath".into());
        args.push("--no-simulate".into());
        args.push(format!("ytsearch1:{}", request.query).into());
        args
    }
}

#[async_trait]
impl AudioBackend for YtDlpBackend {
    #[instrument(skip(self, request), fields(query = %request.query))]
    async fn fetch(&self, request: &FetchRequest) -> Result<PathBuf, AcquireError> {
        let program = &self.settings.yt_dlp_path;
        debug!(program = %program.display(), "launching yt-dlp");

        let output = Command::new(program)
            .args(self.command_args(request))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AcquireError::launch(&request.query, program, &source))?;

        if !output.status.success() {
            return Err(AcquireError::exit(
                &request.query,
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let produced = stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map_or_else(|| request.expected_output(), PathBuf::from);
        debug!(path = %produced.display(), "yt-dlp finished");
        Ok(produced)
    }
}
