//! FFmpeg and FFprobe subprocesses.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use taleweaver_config::VideoConfig;
use taleweaver_error::{MediaError, MediaErrorKind, TaleweaverResult};
use tracing::{debug, instrument};

/// Characters of stderr kept in errors.
const STDERR_TAIL_CHARS: usize = 2000;

/// Duration and size reported by FFprobe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeInfo {
    /// Container duration in seconds
    pub duration_secs: f64,
    /// File size in bytes
    pub size_bytes: u64,
}

impl ProbeInfo {
    /// Size in mebibytes, for logging.
    pub fn size_mib(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Runs the configured FFmpeg and FFprobe executables.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegRunner {
    /// Runner for explicit executable names or paths.
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Runner for the executables named in `[video]`.
    pub fn from_config(config: &VideoConfig) -> Self {
        Self::new(&config.ffmpeg, &config.ffprobe)
    }

    /// Run FFmpeg with `args`, failing on a non-zero exit status.
    #[instrument(skip_all, fields(args = args.len()))]
    pub async fn run_ffmpeg(&self, args: &[String]) -> TaleweaverResult<()> {
        debug!(command = %format!("{} {}", self.ffmpeg, args.join(" ")), "Running ffmpeg");
        let output = tokio::process::Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                MediaError::new(MediaErrorKind::ToolUnavailable {
                    tool: self.ffmpeg.clone(),
                    message: e.to_string(),
                })
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::new(MediaErrorKind::FfmpegFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: stderr_tail(&stderr),
            })
            .into());
        }
        Ok(())
    }

    async fn run_ffprobe(&self, args: &[&str]) -> TaleweaverResult<String> {
        let output = tokio::process::Command::new(&self.ffprobe)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                MediaError::new(MediaErrorKind::ToolUnavailable {
                    tool: self.ffprobe.clone(),
                    message: e.to_string(),
                })
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::new(MediaErrorKind::ProbeFailed(format!(
                "exit status {}: {}",
                output.status,
                stderr_tail(&stderr)
            )))
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Duration of a media file in seconds.
    pub async fn probe_duration(&self, path: &Path) -> TaleweaverResult<f64> {
        let path = path.to_string_lossy();
        let stdout = self
            .run_ffprobe(&[
                "-i",
                &path,
                "-show_entries",
                "format=duration",
                "-v",
                "quiet",
                "-of",
                "csv=p=0",
            ])
            .await?;
        parse_duration_output(&stdout)
    }

    /// Duration and size of a media file.
    pub async fn probe_info(&self, path: &Path) -> TaleweaverResult<ProbeInfo> {
        let path = path.to_string_lossy();
        let stdout = self
            .run_ffprobe(&[
                "-i",
                &path,
                "-show_entries",
                "format=duration,size",
                "-v",
                "quiet",
                "-of",
                "json",
            ])
            .await?;
        parse_probe_output(&stdout)
    }
}

fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - STDERR_TAIL_CHARS).collect()
}

/// Parse `-of csv=p=0` duration output.
pub fn parse_duration_output(stdout: &str) -> TaleweaverResult<f64> {
    let value = stdout.trim();
    value
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            MediaError::new(MediaErrorKind::ProbeFailed(format!(
                "unexpected duration output {:?}",
                value
            )))
            .into()
        })
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

/// FFprobe reports numbers as strings.
#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    size: Option<String>,
}

/// Parse `-of json` output carrying `format.duration` and `format.size`.
pub fn parse_probe_output(json: &str) -> TaleweaverResult<ProbeInfo> {
    let parsed: ProbeOutput = serde_json::from_str(json).map_err(|e| {
        MediaError::new(MediaErrorKind::ProbeFailed(format!(
            "Failed to parse FFprobe output: {}",
            e
        )))
    })?;
    let duration_secs = parsed
        .format
        .duration
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);
    let size_bytes = parsed
        .format
        .size
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);
    Ok(ProbeInfo {
        duration_secs,
        size_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_output() {
        assert_eq!(parse_duration_output("12.480000\n").unwrap(), 12.48);
        assert!(parse_duration_output("N/A").is_err());
        assert!(parse_duration_output("").is_err());
        assert!(parse_duration_output("0").is_err());
    }

    #[test]
    fn test_parse_probe_output() {
        let json = r#"{"format": {"duration": "61.233000", "size": "5242880"}}"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.duration_secs, 61.233);
        assert_eq!(info.size_bytes, 5_242_880);
        assert_eq!(info.size_mib(), 5.0);

        let partial = parse_probe_output(r#"{"format": {}}"#).unwrap();
        assert_eq!(partial.size_bytes, 0);
        assert!(parse_probe_output("not json").is_err());
    }

    #[test]
    fn test_stderr_tail_keeps_end() {
        let long = format!("{}END", "x".repeat(5000));
        let tail = stderr_tail(&long);
        assert_eq!(tail.chars().count(), STDERR_TAIL_CHARS);
        assert!(tail.ends_with("END"));
    }

    #[tokio::test]
    async fn test_missing_tool_reported() {
        let runner = FfmpegRunner::new("taleweaver-no-such-ffmpeg", "taleweaver-no-such-ffprobe");
        let err = runner.run_ffmpeg(&["-version".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("Could not run taleweaver-no-such-ffmpeg"));
        assert!(runner.probe_duration(Path::new("a.wav")).await.is_err());
    }
}
