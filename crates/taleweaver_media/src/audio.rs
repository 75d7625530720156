//! Story narration.

use crate::wav::{read_wav, write_wav};
use std::path::{Path, PathBuf};
use taleweaver_core::{AudioTrack, SpeechAudio, SpeechRequest, StoryText};
use taleweaver_error::{MediaError, MediaErrorKind, TaleweaverResult};
use taleweaver_interface::SpeechSynthesizer;
use tracing::{info, instrument, warn};

/// Directory for per-paragraph WAV files.
pub const AUDIO_DIR: &str = "audio";
/// Combined narration file name.
pub const STORY_AUDIO_FILE: &str = "story_audio.wav";

/// Path of the `index`-th (1-based) narration segment.
pub fn segment_path(work_dir: &Path, index: usize) -> PathBuf {
    work_dir
        .join(AUDIO_DIR)
        .join(format!("segment_{index:03}.wav"))
}

/// Narrates a story paragraph by paragraph.
pub struct Narrator<S: SpeechSynthesizer> {
    speech: S,
    voice: Option<String>,
    gap_secs: f64,
}

impl<S: SpeechSynthesizer> Narrator<S> {
    /// Narrator using `speech`, with `gap_secs` of silence between paragraphs.
    pub fn new(speech: S, voice: Option<String>, gap_secs: f64) -> Self {
        Self {
            speech,
            voice,
            gap_secs,
        }
    }

    /// Synthesize every paragraph and combine them into `story_audio.wav`.
    ///
    /// Paragraphs that fail to synthesize are skipped.
    ///
    /// # Errors
    ///
    /// Fails when the story is empty or no paragraph could be synthesized.
    #[instrument(skip_all, fields(paragraphs = story.len()))]
    pub async fn narrate(&self, story: &StoryText, work_dir: &Path) -> TaleweaverResult<AudioTrack> {
        if story.is_empty() {
            return Err(MediaError::new(MediaErrorKind::NoInput("story has no paragraphs".into())).into());
        }
        let audio_dir = work_dir.join(AUDIO_DIR);
        tokio::fs::create_dir_all(&audio_dir)
            .await
            .map_err(|e| MediaError::io(&audio_dir, e))?;

        let total = story.len();
        let mut segments = Vec::new();
        for (i, paragraph) in story.paragraphs().iter().enumerate() {
            let index = i + 1;
            info!(segment = index, total, "Synthesizing narration");
            let req = SpeechRequest {
                text: paragraph.clone(),
                voice: self.voice.clone(),
            };
            let audio = match self.speech.synthesize(&req).await {
                Ok(audio) if !audio.samples.is_empty() => audio,
                Ok(_) => {
                    warn!(segment = index, "Synthesizer returned no samples; skipping paragraph");
                    continue;
                }
                Err(e) => {
                    warn!(segment = index, error = %e, "Narration failed; skipping paragraph");
                    continue;
                }
            };
            let path = segment_path(work_dir, index);
            match write_wav(&path, &audio) {
                Ok(()) => segments.push(path),
                Err(e) => warn!(segment = index, error = %e, "Could not save narration segment"),
            }
        }

        if segments.is_empty() {
            return Err(MediaError::new(MediaErrorKind::NoAudio(format!(
                "all {} paragraphs failed",
                total
            )))
            .into());
        }

        let output = work_dir.join(STORY_AUDIO_FILE);
        let duration_secs = combine_segments(&segments, &output, self.gap_secs)?;
        info!(
            segments = segments.len(),
            duration_secs,
            path = %output.display(),
            "Combined narration"
        );
        Ok(AudioTrack::new(output, segments, duration_secs))
    }
}

/// Concatenate WAV segments with `gap_secs` of silence between consecutive
/// segments and write the result to `output`. Returns its duration.
///
/// Segments that cannot be read, or whose sample rate differs from the
/// first readable segment, are skipped.
pub fn combine_segments(segments: &[PathBuf], output: &Path, gap_secs: f64) -> TaleweaverResult<f64> {
    let mut parts: Vec<SpeechAudio> = Vec::new();
    for path in segments {
        match read_wav(path) {
            Ok(audio) => {
                if let Some(first) = parts.first() {
                    if first.sample_rate != audio.sample_rate {
                        warn!(
                            path = %path.display(),
                            expected = first.sample_rate,
                            found = audio.sample_rate,
                            "Sample rate mismatch; skipping segment"
                        );
                        continue;
                    }
                }
                parts.push(audio);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Could not read narration segment"),
        }
    }

    let Some(sample_rate) = parts.first().map(|p| p.sample_rate) else {
        return Err(MediaError::new(MediaErrorKind::NoAudio("no readable segments".into())).into());
    };
    let gap = (gap_secs.max(0.0) * f64::from(sample_rate)).round() as usize;

    let mut samples = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            samples.resize(samples.len() + gap, 0i16);
        }
        samples.extend_from_slice(&part.samples);
    }

    let combined = SpeechAudio {
        sample_rate,
        samples,
    };
    write_wav(output, &combined)?;
    Ok(combined.duration_secs())
}
