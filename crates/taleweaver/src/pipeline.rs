//! End-to-end orchestration of one story video.

use chrono::Local;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use taleweaver_config::{GenerationConfig, TaleweaverConfig};
use taleweaver_core::StoryRun;
use taleweaver_drive::DriveClient;
use taleweaver_error::{MediaError, StoryError, StoryErrorKind, TaleweaverResult};
use taleweaver_interface::{SpeechSynthesizer, Streaming};
use taleweaver_media::{FfmpegRunner, Narrator, ThumbnailGenerator, VideoAssembler};
use taleweaver_retry::RetryPolicy;
use taleweaver_story::{PromptGenerator, SeoGenerator, StoryGenerator};
use tracing::{info, instrument, warn};

/// Create a fresh run directory under `root`, named by local time plus a
/// short random suffix.
pub async fn create_work_dir(root: &Path) -> TaleweaverResult<PathBuf> {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let name = format!(
        "story_{}_{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        &suffix[..8]
    );
    let dir = root.join(name);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| MediaError::io(&dir, e))?;
    Ok(dir)
}

/// Repeat `attempt` until it yields a run with at least `min_segments`
/// story segments and images.
///
/// Every attempt starts from scratch. Failed and incomplete attempts are
/// logged; the pause is skipped after the last one.
pub async fn run_with_retries<F, Fut>(
    attempts: usize,
    delay: Duration,
    min_segments: usize,
    mut attempt: F,
) -> TaleweaverResult<StoryRun>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = TaleweaverResult<StoryRun>>,
{
    for number in 1..=attempts {
        info!(attempt = number, of = attempts, "Starting pipeline attempt");
        match attempt(number).await {
            Ok(run) if run.is_complete(min_segments) => {
                info!(
                    segments = *run.segments(),
                    images = run.images().len(),
                    "Story generation complete"
                );
                return Ok(run);
            }
            Ok(run) => {
                let incomplete = StoryError::new(StoryErrorKind::Incomplete {
                    segments: *run.segments(),
                    images: run.images().len(),
                    required: min_segments,
                });
                warn!(attempt = number, error = %incomplete, "Generated story insufficient");
            }
            Err(e) => warn!(attempt = number, error = %e, "Pipeline attempt failed"),
        }
        if number < attempts {
            info!(delay_secs = delay.as_secs_f64(), "Retrying story generation");
            tokio::time::sleep(delay).await;
        }
    }
    Err(StoryError::new(StoryErrorKind::Exhausted(attempts)).into())
}

/// Drivers for the three text stages, usually one client per model.
#[derive(Debug, Clone)]
pub struct StageDrivers<D> {
    /// Rewrites the user's request into a scene prompt
    pub prompt: D,
    /// Writes the illustrated story
    pub story: D,
    /// Writes title, description and tags
    pub seo: D,
}

/// Every stage needed to turn a request into a published video.
pub struct Pipeline<D: Streaming, S: SpeechSynthesizer> {
    prompt: PromptGenerator<D>,
    story: StoryGenerator<D>,
    seo: SeoGenerator<D>,
    narrator: Narrator<S>,
    video: VideoAssembler,
    thumbnail: ThumbnailGenerator,
    drive: Option<DriveClient>,
    generation: GenerationConfig,
    output_root: PathBuf,
    default_folder: String,
}

impl<D: Streaming, S: SpeechSynthesizer> Pipeline<D, S> {
    /// Assemble the stages from configuration.
    ///
    /// Uploads happen only when `drive` is given.
    pub fn new(
        config: &TaleweaverConfig,
        drivers: StageDrivers<D>,
        speech: S,
        drive: Option<DriveClient>,
    ) -> TaleweaverResult<Self> {
        let policy = RetryPolicy::from_config(&config.retry)?;
        let runner = FfmpegRunner::from_config(&config.video);
        Ok(Self {
            prompt: PromptGenerator::new(drivers.prompt, config.generation.clone(), policy.clone()),
            story: StoryGenerator::new(drivers.story, config.generation.clone(), policy),
            seo: SeoGenerator::new(drivers.seo, config.generation.clone()),
            narrator: Narrator::new(speech, Some(config.audio.voice.clone()), config.audio.gap_secs),
            video: VideoAssembler::new(runner.clone(), config.video.clone()),
            thumbnail: ThumbnailGenerator::new(runner, config.thumbnail.clone()),
            drive,
            generation: config.generation.clone(),
            output_root: config.output.root_dir(),
            default_folder: config.drive.default_folder.clone(),
        })
    }

    /// Scene prompt for `input`: rewritten by the prompt model when enabled,
    /// otherwise `input` itself.
    pub async fn scene_prompt(&self, input: &str) -> String {
        if self.generation.use_prompt_generator {
            self.prompt.generate_or_fallback(input).await
        } else {
            input.to_string()
        }
    }

    /// One pass through every stage.
    ///
    /// Story generation must succeed. When narration or video assembly
    /// fails, the run so far is returned; metadata, thumbnail and upload
    /// failures are logged and leave their fields empty.
    #[instrument(skip_all)]
    pub async fn generate_once(&self, input: &str) -> TaleweaverResult<StoryRun> {
        let work_dir = create_work_dir(&self.output_root).await?;
        info!(work_dir = %work_dir.display(), "Created work directory");

        let prompt = self.scene_prompt(input).await;
        let generated = self.story.generate(&prompt, &work_dir).await?;
        let story = generated.story().clone();
        let images = generated.images().clone();
        let mut run = StoryRun::new(work_dir.clone(), prompt.clone(), story, images)
            .with_segments(*generated.segments());

        let narrated = self.narrator.narrate(run.story(), &work_dir).await;
        let audio = match narrated {
            Ok(audio) => audio,
            Err(e) => {
                warn!(error = %e, "Narration failed, returning story and images only");
                return Ok(run);
            }
        };

        let assembled = self.video.assemble(run.images(), &audio, &work_dir).await;
        let video = match assembled {
            Ok(video) => video,
            Err(e) => {
                warn!(error = %e, "Video assembly failed, returning partial run");
                return Ok(run.with_audio(audio));
            }
        };
        run = run.with_audio(audio);

        let metadata = self
            .seo
            .generate(&run.story().as_text(), &prompt, run.images().first())
            .await;

        let thumbnail = match self.thumbnail.generate(run.images(), &metadata.title).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Thumbnail generation failed");
                None
            }
        };

        if let Some(drive) = &self.drive {
            match drive
                .upload_video_bundle(
                    video.path(),
                    Some(&metadata),
                    thumbnail.as_deref(),
                    &self.default_folder,
                )
                .await
            {
                Ok(receipt) => run = run.with_upload(receipt),
                Err(e) => warn!(error = %e, video = %video.path().display(), "Upload failed, video kept locally"),
            }
        }

        run = run.with_video(video).with_metadata(metadata);
        if let Some(path) = thumbnail {
            run = run.with_thumbnail(path);
        }
        Ok(run)
    }

    /// [`Self::generate_once`] repeated until the run is complete.
    pub async fn run(&self, input: &str) -> TaleweaverResult<StoryRun> {
        run_with_retries(
            self.generation.max_pipeline_attempts,
            Duration::from_secs(self.generation.pipeline_retry_delay_secs),
            self.generation.min_story_segments,
            |_| self.generate_once(input),
        )
        .await
    }
}
