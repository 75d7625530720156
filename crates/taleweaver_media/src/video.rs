//! Slideshow video assembly.
//!
//! Every image is shown for the same share of the narration, drifting
//! sideways with a fade in and out inside its own window, so the images
//! together span the whole track.

use crate::ffmpeg::FfmpegRunner;
use crate::wav::wav_duration_secs;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use taleweaver_config::VideoConfig;
use taleweaver_core::{AudioTrack, FilterPath, ImageSet, VideoArtifact};
use taleweaver_error::{MediaError, MediaErrorKind, TaleweaverResult};
use tracing::{debug, info, instrument, warn};

/// Directory for resized frames.
pub const RESIZED_DIR: &str = "resized_images";
/// Filter graph file name.
pub const FILTER_SCRIPT_FILE: &str = "filter_script.txt";
/// Output video file name.
pub const VIDEO_FILE: &str = "story_video.mp4";

/// Seconds each of `count` images is shown for a track of `audio_secs`.
pub fn per_image_secs(audio_secs: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    audio_secs / count as f64
}

/// How much larger than the frame each still is scaled before panning.
pub const PAN_OVERSCAN: f64 = 1.1;

/// `dim` enlarged by [`PAN_OVERSCAN`], rounded to an even size.
fn overscan(dim: u32) -> u32 {
    let scaled = (f64::from(dim) * PAN_OVERSCAN).round() as u32;
    scaled + scaled % 2
}

/// Crop offset expression sliding across the overscan in `per_image`
/// seconds; odd images travel right to left.
fn pan_x(index: usize, per_image: f64) -> String {
    if per_image <= 0.0 {
        "(iw-ow)/2".to_string()
    } else if index % 2 == 0 {
        format!("(iw-ow)*t/{per_image:.3}")
    } else {
        format!("(iw-ow)*(1-t/{per_image:.3})")
    }
}

/// Fade length that fits twice into a window of `per_image` seconds.
pub fn fade_secs(configured: f64, per_image: f64) -> f64 {
    configured.min(per_image / 4.0).max(0.0)
}

/// Filter graph panning and fading each of `count` images, joined into
/// `[outv]`.
///
/// # Examples
///
/// ```
/// use taleweaver_media::build_filter_script;
///
/// let script = build_filter_script(2, 4.0, 0.5, 1920, 1080, 30);
/// assert!(script.contains("[0:v]scale=1920:1080"));
/// assert!(script.contains("crop=1920:1080:x=(iw-ow)*t/4.000:y=(ih-oh)/2"));
/// assert!(script.contains("fade=t=out:st=3.500:d=0.500[v1];"));
/// assert!(script.ends_with("[v0][v1]concat=n=2:v=1:a=0[outv]"));
/// ```
pub fn build_filter_script(
    count: usize,
    per_image: f64,
    fade: f64,
    width: u32,
    height: u32,
    fps: u32,
) -> String {
    let fade = fade_secs(fade, per_image);
    let (pan_width, pan_height) = (overscan(width), overscan(height));
    let mut script = String::new();
    for i in 0..count {
        let _ = write!(
            script,
            "[{i}:v]scale={width}:{height}:force_original_aspect_ratio=decrease,\
             pad={width}:{height}:(ow-iw)/2:(oh-ih)/2,setsar=1,\
             scale={pan_width}:{pan_height},fps={fps},\
             trim=duration={per_image:.3},setpts=PTS-STARTPTS,\
             crop={width}:{height}:x={x}:y=(ih-oh)/2,\
             fade=t=in:st=0:d={fade:.3},fade=t=out:st={out:.3}:d={fade:.3}[v{i}];",
            out = per_image - fade,
            x = pan_x(i, per_image),
        );
    }
    for i in 0..count {
        let _ = write!(script, "[v{i}]");
    }
    let _ = write!(script, "concat=n={count}:v=1:a=0[outv]");
    script
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Primary FFmpeg arguments: looped stills through the filter script.
pub fn primary_args(
    images: &[PathBuf],
    audio: &Path,
    script: &Path,
    output: &Path,
    per_image: f64,
    config: &VideoConfig,
) -> Vec<String> {
    let mut args = vec!["-y".to_string()];
    for image in images {
        args.extend([
            "-loop".to_string(),
            "1".to_string(),
            "-t".to_string(),
            format!("{per_image:.3}"),
            "-i".to_string(),
            path_arg(image),
        ]);
    }
    args.extend(["-i".to_string(), path_arg(audio)]);
    args.extend(
        [
            "-filter_complex_script",
            &path_arg(script),
            "-map",
            "[outv]",
            "-map",
            &format!("{}:a", images.len()),
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-r",
            &config.fps.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-shortest",
            "-b:v",
            &config.video_bitrate,
            "-maxrate",
            &config.max_bitrate,
            "-bufsize",
            &config.buffer_size,
            &path_arg(output),
        ]
        .map(str::to_string),
    );
    args
}

/// Fallback FFmpeg arguments: one frame per image and a plain concat.
///
/// `-framerate` is an input option, so it precedes every image to give each
/// one `per_image` seconds.
pub fn fallback_args(images: &[PathBuf], audio: &Path, output: &Path, per_image: f64) -> Vec<String> {
    let rate = format!("1/{per_image:.3}");
    let mut args = vec!["-y".to_string()];
    for image in images {
        args.extend([
            "-framerate".to_string(),
            rate.clone(),
            "-i".to_string(),
            path_arg(image),
        ]);
    }
    args.extend(["-i".to_string(), path_arg(audio)]);
    args.extend(
        [
            "-filter_complex",
            &format!("concat=n={}:v=1:a=0[outv]", images.len()),
            "-map",
            "[outv]",
            "-map",
            &format!("{}:a", images.len()),
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-pix_fmt",
            "yuv420p",
            "-shortest",
            &path_arg(output),
        ]
        .map(str::to_string),
    );
    args
}

/// Resize one image to `width`×`height` and save it as JPEG.
pub fn resize_to_jpeg(
    input: &Path,
    output: &Path,
    width: u32,
    height: u32,
    quality: u8,
) -> TaleweaverResult<()> {
    let image = image::open(input)
        .map_err(|e| MediaError::new(MediaErrorKind::Image(format!("{}: {}", input.display(), e))))?;
    let resized = image.resize_exact(width, height, FilterType::Lanczos3).to_rgb8();
    let file = File::create(output).map_err(|e| MediaError::io(output, e))?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    encoder
        .encode_image(&resized)
        .map_err(|e| MediaError::new(MediaErrorKind::Image(format!("{}: {}", output.display(), e))))?;
    Ok(())
}

/// Builds the slideshow video.
pub struct VideoAssembler {
    runner: FfmpegRunner,
    config: VideoConfig,
}

impl VideoAssembler {
    /// Assembler using `runner` and the `[video]` settings.
    pub fn new(runner: FfmpegRunner, config: VideoConfig) -> Self {
        Self { runner, config }
    }

    /// Resize every image into `resized_images/`, keeping the original
    /// when an image cannot be resized.
    pub async fn resize_images(&self, images: &ImageSet, work_dir: &Path) -> TaleweaverResult<Vec<PathBuf>> {
        let dir = work_dir.join(RESIZED_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| MediaError::io(&dir, e))?;

        let total = images.len();
        let mut frames = Vec::with_capacity(total);
        for (i, image) in images.paths().iter().enumerate() {
            let output = dir.join(format!("resized_{:03}.jpg", i + 1));
            match resize_to_jpeg(
                image,
                &output,
                self.config.width,
                self.config.height,
                self.config.jpeg_quality,
            ) {
                Ok(()) => {
                    debug!(image = i + 1, total, "Resized image");
                    frames.push(output);
                }
                Err(e) => {
                    warn!(path = %image.display(), error = %e, "Resize failed; using original image");
                    frames.push(image.clone());
                }
            }
        }
        Ok(frames)
    }

    /// Narration length from FFprobe, or from the WAV header when FFprobe
    /// is unavailable.
    pub async fn narration_secs(&self, audio: &AudioTrack) -> TaleweaverResult<f64> {
        match self.runner.probe_duration(audio.path()).await {
            Ok(secs) => Ok(secs),
            Err(e) => {
                warn!(error = %e, "ffprobe failed; reading duration from the WAV header");
                let secs = wav_duration_secs(audio.path())?;
                if secs > 0.0 {
                    Ok(secs)
                } else {
                    Ok(*audio.duration_secs())
                }
            }
        }
    }

    /// Encode `story_video.mp4` from the images and narration.
    ///
    /// The fade filter graph is tried first; if FFmpeg rejects it, a plain
    /// concat is used.
    #[instrument(skip_all, fields(images = images.len()))]
    pub async fn assemble(
        &self,
        images: &ImageSet,
        audio: &AudioTrack,
        work_dir: &Path,
    ) -> TaleweaverResult<VideoArtifact> {
        if images.is_empty() {
            return Err(MediaError::new(MediaErrorKind::NoInput("no images for the video".into())).into());
        }

        let frames = self.resize_images(images, work_dir).await?;
        let audio_secs = self.narration_secs(audio).await?;
        let per_image = per_image_secs(audio_secs, frames.len());
        info!(audio_secs, per_image, "Computed slideshow timing");

        let script_path = work_dir.join(FILTER_SCRIPT_FILE);
        let script = build_filter_script(
            frames.len(),
            per_image,
            self.config.fade_secs,
            self.config.width,
            self.config.height,
            self.config.fps,
        );
        tokio::fs::write(&script_path, script)
            .await
            .map_err(|e| MediaError::io(&script_path, e))?;

        let output = work_dir.join(VIDEO_FILE);
        let args = primary_args(&frames, audio.path(), &script_path, &output, per_image, &self.config);
        let filter = match self.runner.run_ffmpeg(&args).await {
            Ok(()) => FilterPath::Primary,
            Err(e) => {
                warn!(error = %e, "Fade slideshow failed; trying plain concat");
                let args = fallback_args(&frames, audio.path(), &output, per_image);
                self.runner.run_ffmpeg(&args).await?;
                FilterPath::Fallback
            }
        };
        info!(path = %output.display(), %filter, "Created video");

        let mut video = VideoArtifact::new(output, filter);
        match self.runner.probe_info(video.path()).await {
            Ok(probe) => {
                info!(
                    duration_secs = probe.duration_secs,
                    size_mib = %format!("{:.2}", probe.size_mib()),
                    "Probed video"
                );
                video = video
                    .with_duration_secs(probe.duration_secs)
                    .with_size_bytes(probe.size_bytes);
            }
            Err(e) => warn!(error = %e, "Could not probe the video"),
        }
        Ok(video)
    }
}
