//! FFprobe adapter: subtitle/audio stream discovery for the translator
//! engine. Kept the teacher's CLI-wrapper-with-timeout shape;
//! dropped the general `VideoAnalyzer` abstraction since sublarr only
//! ever probes for subtitle/audio track metadata.

use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::infrastructure::translator::stream_select::FfprobeStreams;
use crate::shared::error::VideoAnalyzerError;

pub struct FFprobeAdapter {
    timeout: Duration,
}

impl FFprobeAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn execute_ffprobe(&self, args: &[&str]) -> Result<String, VideoAnalyzerError> {
        let output = timeout(self.timeout, Command::new("ffprobe").args(args).output())
            .await
            .map_err(|_| VideoAnalyzerError::Timeout("ffprobe execution timed out".into()))?;

        let output = output.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VideoAnalyzerError::FfprobeNotFound
            } else {
                VideoAnalyzerError::Io(e)
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(VideoAnalyzerError::ExecutionFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ))
        }
    }

    /// Runs `ffprobe -show_streams` and returns the parsed stream list,
    /// used by [`select_best_subtitle_stream`](crate::infrastructure::translator::stream_select::select_best_subtitle_stream).
    pub async fn probe_subtitle_streams(&self, file_path: &str) -> Result<FfprobeStreams, VideoAnalyzerError> {
        let json_str = self
            .execute_ffprobe(&["-v", "quiet", "-print_format", "json", "-show_streams", file_path])
            .await?;
        serde_json::from_str(&json_str).map_err(|e| VideoAnalyzerError::ParseError(e.to_string()))
    }

    /// Extracts the subtitle stream at `sub_index` (ffmpeg's `-map 0:s:N`
    /// addressing) from `file_path` into `output_path`, copying the
    /// codec rather than re-encoding.
    pub async fn extract_subtitle_stream(
        &self,
        file_path: &str,
        sub_index: usize,
        output_path: &str,
    ) -> Result<(), VideoAnalyzerError> {
        let map_arg = format!("0:s:{}", sub_index);
        let output = timeout(
            self.timeout,
            Command::new("ffmpeg")
                .args(["-y", "-i", file_path, "-map", &map_arg, "-c:s", "copy", output_path])
                .output(),
        )
        .await
        .map_err(|_| VideoAnalyzerError::Timeout("ffmpeg subtitle extraction timed out".into()))?
        .map_err(VideoAnalyzerError::Io)?;

        if output.status.success() {
            Ok(())
        } else {
            Err(VideoAnalyzerError::ExecutionFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ))
        }
    }

    /// Returns the number of audio streams, used to pick a default
    /// track index for whisper transcription when none is given.
    pub async fn audio_track_count(&self, file_path: &str) -> Result<usize, VideoAnalyzerError> {
        let json_str = self
            .execute_ffprobe(&["-v", "quiet", "-print_format", "json", "-show_streams", file_path])
            .await?;
        let json: serde_json::Value =
            serde_json::from_str(&json_str).map_err(|e| VideoAnalyzerError::ParseError(e.to_string()))?;
        let count = json
            .get("streams")
            .and_then(|s| s.as_array())
            .map(|arr| {
                arr.iter()
                    .filter(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("audio"))
                    .count()
            })
            .unwrap_or(0);
        Ok(count)
    }
}

impl Default for FFprobeAdapter {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_thirty_seconds() {
        let adapter = FFprobeAdapter::default();
        assert_eq!(adapter.timeout, Duration::from_secs(30));
    }
}
