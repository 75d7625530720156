//! Local text-to-speech program backend.

use async_trait::async_trait;
use std::process::Stdio;
use taleweaver_config::AudioConfig;
use taleweaver_core::{SpeechAudio, SpeechRequest};
use taleweaver_error::{MediaError, MediaErrorKind, TaleweaverResult};
use taleweaver_interface::SpeechSynthesizer;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Pipes each paragraph to a TTS program's stdin and reads raw s16le mono
/// PCM from its stdout, e.g. `piper --model voice.onnx --output-raw`.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
    sample_rate: u32,
}

impl CommandSpeech {
    /// Backend running `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>, sample_rate: u32) -> Self {
        Self {
            program: program.into(),
            args,
            sample_rate,
        }
    }

    /// Backend from the `[audio]` section.
    pub fn from_config(config: &AudioConfig) -> Self {
        Self::new(&config.command, config.command_args.clone(), config.sample_rate)
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSpeech {
    #[instrument(skip_all, fields(program = %self.program, chars = req.text.len()))]
    async fn synthesize(&self, req: &SpeechRequest) -> TaleweaverResult<SpeechAudio> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                MediaError::new(MediaErrorKind::ToolUnavailable {
                    tool: self.program.clone(),
                    message: e.to_string(),
                })
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(req.text.as_bytes())
                .await
                .map_err(|e| MediaError::io(&self.program, e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| MediaError::io(&self.program, e))?;
        if !output.status.success() {
            return Err(MediaError::new(MediaErrorKind::NoAudio(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
            .into());
        }
        if output.stdout.len() < 2 {
            return Err(MediaError::new(MediaErrorKind::NoAudio(format!(
                "{} wrote no audio",
                self.program
            )))
            .into());
        }

        debug!(bytes = output.stdout.len(), "Read synthesized PCM");
        Ok(SpeechAudio::from_le_bytes(self.sample_rate, &output.stdout))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
