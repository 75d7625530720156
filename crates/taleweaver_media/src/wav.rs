//! 16-bit mono WAV files.

use std::path::Path;
use taleweaver_core::SpeechAudio;
use taleweaver_error::{MediaError, MediaErrorKind, TaleweaverResult};

fn wav_error(path: &Path, e: hound::Error) -> MediaError {
    MediaError::new(MediaErrorKind::Wav(format!("{}: {}", path.display(), e)))
}

/// WAV header for mono s16 audio.
pub fn mono_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write `audio` as a mono 16-bit WAV.
pub fn write_wav(path: &Path, audio: &SpeechAudio) -> TaleweaverResult<()> {
    let mut writer =
        hound::WavWriter::create(path, mono_spec(audio.sample_rate)).map_err(|e| wav_error(path, e))?;
    for sample in &audio.samples {
        writer.write_sample(*sample).map_err(|e| wav_error(path, e))?;
    }
    writer.finalize().map_err(|e| wav_error(path, e))?;
    Ok(())
}

/// Read a 16-bit WAV, keeping the first channel.
pub fn read_wav(path: &Path) -> TaleweaverResult<SpeechAudio> {
    let mut reader = hound::WavReader::open(path).map_err(|e| wav_error(path, e))?;
    let spec = reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(MediaError::new(MediaErrorKind::Wav(format!(
            "{}: expected 16-bit PCM, found {}-bit {:?}",
            path.display(),
            spec.bits_per_sample,
            spec.sample_format
        )))
        .into());
    }
    let channels = usize::from(spec.channels.max(1));
    let samples = reader
        .samples::<i16>()
        .step_by(channels)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| wav_error(path, e))?;
    Ok(SpeechAudio {
        sample_rate: spec.sample_rate,
        samples,
    })
}

/// Duration of a WAV file from its header.
pub fn wav_duration_secs(path: &Path) -> TaleweaverResult<f64> {
    let reader = hound::WavReader::open(path).map_err(|e| wav_error(path, e))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Ok(0.0);
    }
    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}
