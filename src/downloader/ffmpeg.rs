//! ffmpeg process that re-muxes remote streams into a single download

use crate::downloader::plan::DownloadPlan;
use crate::utils::error::ApiError;
use axum::body::Bytes;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::task::{Context, Poll};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

/// Stderr lines kept for the error message when ffmpeg fails
const STDERR_TAIL_LINES: usize = 5;

#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg_path: PathBuf,
}

impl Transcoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// ffmpeg from PATH, or the bare program name if it cannot be found yet
    pub fn locate() -> Self {
        match which::which("ffmpeg") {
            Ok(path) => {
                info!("✓ Using ffmpeg: {:?}", path);
                Self::new(path)
            }
            Err(e) => {
                warn!("ffmpeg not found in PATH ({}); downloads will fail", e);
                Self::new("ffmpeg")
            }
        }
    }

    /// Spawn ffmpeg for `plan` and wait for its first output chunk.
    ///
    /// If ffmpeg ends without writing anything, its exit status and the tail
    /// of its stderr become an `ApiError::Transcode`. Dropping the returned
    /// stream kills the process.
    pub async fn start(&self, plan: &DownloadPlan) -> Result<FfmpegStream, ApiError> {
        let args = plan.ffmpeg_args();
        debug!("FFmpeg args: {:?}", args);

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ApiError::Transcode(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ApiError::Transcode("stdout was not captured".to_string()))?;
        let stderr_tail = child.stderr.take().map(|stderr| tokio::spawn(drain_stderr(stderr)));

        let mut inner = ReaderStream::new(stdout);
        match inner.next().await {
            Some(Ok(first)) => Ok(FfmpegStream {
                first: Some(first),
                inner,
                _child: child,
            }),
            Some(Err(e)) => Err(ApiError::Transcode(e.to_string())),
            None => {
                let status = child
                    .wait()
                    .await
                    .map_err(|e| ApiError::Transcode(e.to_string()))?;
                let tail = match stderr_tail {
                    Some(handle) => handle.await.unwrap_or_default(),
                    None => Vec::new(),
                };
                Err(ApiError::Transcode(describe_empty_exit(status, &tail)))
            }
        }
    }
}

/// Logs ffmpeg's stderr and returns its last few lines.
async fn drain_stderr(stderr: ChildStderr) -> Vec<String> {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "ffmpeg", "{}", line);
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    tail.into_iter().collect()
}

fn describe_empty_exit(status: ExitStatus, stderr_tail: &[String]) -> String {
    let detail = stderr_tail
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if detail.is_empty() {
        format!("ffmpeg produced no output ({})", status)
    } else {
        format!("ffmpeg produced no output ({}): {}", status, detail)
    }
}

/// ffmpeg stdout, owning the process it reads from
pub struct FfmpegStream {
    first: Option<Bytes>,
    inner: ReaderStream<ChildStdout>,
    _child: Child,
}

impl Stream for FfmpegStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(first) = self.first.take() {
            return Poll::Ready(Some(Ok(first)));
        }
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
