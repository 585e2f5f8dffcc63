//! yt-dlp wrapper for metadata extraction
//!
//! Every call spawns a fresh `yt-dlp --dump-single-json` process configured
//! from the request's [`ExtractionOptions`]; nothing is downloaded and no
//! state survives between calls.

use crate::extractor::models::ExtractionOptions;
use crate::extractor::traits::Extractor;
use crate::utils::error::ExtractionError;
use async_trait::async_trait;
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

/// yt-dlp exits with this status when a `DownloadError` was raised
const DOWNLOAD_ERROR_EXIT_CODE: i32 = 1;

/// Metadata extractor backed by the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    ytdlp_path: PathBuf,
    version: String,
}

impl YtDlpExtractor {
    /// Locate yt-dlp and probe its version
    ///
    /// Search order:
    /// 1. Next to the current executable (bundled deployments)
    /// 2. System PATH
    /// 3. Common installation paths (Homebrew, pip --user, ...)
    pub fn new() -> Result<Self, ExtractionError> {
        let ytdlp_path = match find_ytdlp() {
            Some(path) => path,
            None => {
                error!("yt-dlp not found anywhere!");
                return Err(ExtractionError::NotFound);
            }
        };

        Self::with_path(ytdlp_path)
    }

    /// Use an explicit yt-dlp executable
    pub fn with_path(ytdlp_path: impl Into<PathBuf>) -> Result<Self, ExtractionError> {
        let ytdlp_path = ytdlp_path.into();
        let version = probe_version(&ytdlp_path)?;
        info!("Using yt-dlp {} at {}", version, ytdlp_path.display());

        Ok(Self {
            ytdlp_path,
            version,
        })
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn id(&self) -> &'static str {
        "ytdlp"
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn extract_info(
        &self,
        query: &str,
        options: &ExtractionOptions,
    ) -> Result<Value, ExtractionError> {
        debug!(query, format = %options.format, "Extracting info with yt-dlp");

        let output = AsyncCommand::new(&self.ytdlp_path)
            .args(build_args(query, options))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(output.status.code(), &stderr));
        }

        let json_str = String::from_utf8(output.stdout)?;
        let document: Value = serde_json::from_str(&json_str)?;

        Ok(document)
    }
}

/// Command line for a single non-downloading extraction.
///
/// The query goes after `--` so it is never parsed as an option.
pub fn build_args(query: &str, options: &ExtractionOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--ignore-config".into(),
        "--dump-single-json".into(),
        "--no-warnings".into(),
        "--default-search".into(),
        options.default_search.clone().into(),
        "--format".into(),
        options.format.clone().into(),
        "--retries".into(),
        options.retries.to_string().into(),
        "--encoding".into(),
        options.encoding.clone().into(),
        "--socket-timeout".into(),
        options.socket_timeout_secs.to_string().into(),
    ];
    args.push("--".into());
    args.push(query.into());
    args
}

/// Map a failed yt-dlp run onto the extraction error taxonomy.
///
/// Exit status 1 with an `ERROR:` line means yt-dlp itself gave up on the
/// query; the last such line is reported verbatim.
pub fn classify_failure(exit_code: Option<i32>, stderr: &str) -> ExtractionError {
    let reported = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with("ERROR:"));

    match (exit_code, reported) {
        (Some(DOWNLOAD_ERROR_EXIT_CODE), Some(line)) => {
            warn!("yt-dlp could not resolve query: {}", line);
            ExtractionError::Download(line.to_string())
        }
        (code, _) => {
            let detail = stderr.trim();
            error!("yt-dlp failed (exit code {:?}): {}", code, detail);
            let status = code.map_or_else(|| "a signal".to_string(), |c| format!("status {}", c));
            if detail.is_empty() {
                ExtractionError::Failed(format!("yt-dlp terminated by {}", status))
            } else {
                ExtractionError::Failed(format!("yt-dlp terminated by {}: {}", status, detail))
            }
        }
    }
}

fn probe_version(ytdlp_path: &Path) -> Result<String, ExtractionError> {
    let output = Command::new(ytdlp_path)
        .arg("--version")
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Failed(format!(
            "yt-dlp --version failed: {}",
            stderr.trim()
        )));
    }

    let version = String::from_utf8(output.stdout)?.trim().to_string();
    if version.is_empty() {
        return Err(ExtractionError::Failed(
            "yt-dlp --version printed nothing".to_string(),
        ));
    }
    Ok(version)
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Bundled (next to the executable)
/// 2. System PATH
/// 3. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(bundled) = find_bundled_ytdlp() {
        info!("✓ Using bundled yt-dlp: {:?}", bundled);
        return Some(bundled);
    }

    if let Ok(system) = which::which("yt-dlp") {
        info!("✓ Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("✓ Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("✗ yt-dlp not found anywhere!");
    None
}

fn find_bundled_ytdlp() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;

    let candidate = exe_dir.join("yt-dlp");
    debug!("Checking bundled path: {:?}", candidate);
    if candidate.is_file() && is_executable(&candidate) {
        return Some(candidate);
    }

    None
}

fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // Homebrew (Intel) / manual installs
        "/usr/local/bin/yt-dlp",
        // System packages
        "/usr/bin/yt-dlp",
        // pip --user
        "~/.local/bin/yt-dlp",
    ];

    for path_str in common_paths {
        let expanded = match path_str.strip_prefix("~/") {
            Some(rest) => match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            },
            None => PathBuf::from(path_str),
        };

        if expanded.is_file() && is_executable(&expanded) {
            return Some(expanded);
        }
    }

    None
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.exists()
    }
}

// ============================================================
// Tests
// ============================================================
