//! Turning an info document into an ffmpeg invocation

use crate::utils::error::ApiError;
use serde_json::Value;

/// What to feed ffmpeg and how to label the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub inputs: Vec<String>,
    pub audio_only: bool,
    pub title: String,
}

impl DownloadPlan {
    /// Inspect an info document and decide whether it can be streamed.
    pub fn from_info(info: &Value) -> Result<Self, ApiError> {
        let object = info
            .as_object()
            .ok_or_else(|| rejected("Invalid response from info endpoint"))?;

        if object.contains_key("entries") {
            return Err(rejected("This endpoint does not support playlists"));
        }

        let acodec = object.get("acodec").and_then(Value::as_str);
        let vcodec = object.get("vcodec").and_then(Value::as_str);
        if acodec == Some("none") && vcodec != Some("none") {
            return Err(rejected("Only video, no audio is not supported"));
        }
        let audio_only = acodec != Some("none") && vcodec == Some("none");

        let requested: &[Value] = object
            .get("requested_formats")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let format_url = |index: usize| {
            requested
                .get(index)
                .and_then(|f| f.get("url"))
                .and_then(Value::as_str)
                .filter(|u| !u.is_empty())
        };

        let primary = object
            .get("url")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .or_else(|| format_url(0))
            .ok_or_else(|| rejected("No valid input URL found in info response"))?;

        let mut inputs = vec![primary.to_string()];
        if !audio_only && requested.len() > 1 {
            if let Some(second) = format_url(1) {
                inputs.push(second.to_string());
            }
        }

        let title = object
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or("download")
            .to_string();

        Ok(Self {
            inputs,
            audio_only,
            title,
        })
    }

    pub fn content_type(&self) -> &'static str {
        if self.audio_only {
            "audio/mpeg3"
        } else {
            "video/mp4"
        }
    }

    pub fn filename(&self) -> String {
        let ext = if self.audio_only { "mp3" } else { "mp4" };
        format!("{}.{}", self.title, ext)
    }

    /// ffmpeg arguments writing the container to stdout
    pub fn ffmpeg_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.clone());
        }

        let encoding: &[&str] = if self.audio_only {
            &["-acodec", "libmp3lame", "-f", "mp3"]
        } else {
            &[
                "-c:v",
                "libx264",
                "-acodec",
                "aac",
                "-movflags",
                "frag_keyframe+empty_moov",
                "-f",
                "mp4",
            ]
        };
        args.extend(encoding.iter().map(|s| s.to_string()));
        args.push("-".to_string());
        args
    }
}

/// `Content-Disposition` header value for an attachment named `filename`.
///
/// Names that are not plain printable ASCII get a `?`-substituted fallback
/// plus an RFC 5987 `filename*` parameter.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect();
    let quoted = fallback.replace('\\', "\\\\").replace('"', "\\\"");

    if fallback == filename {
        format!("attachment; filename=\"{}\"", quoted)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            quoted,
            urlencoding::encode(filename)
        )
    }
}

fn rejected(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}
