//! Command handlers.

use crate::cli::GenerateArgs;
use crate::pipeline::{Pipeline, StageDrivers};
use crate::speech::SpeechEngine;
use anyhow::Context;
use std::fmt::Write;
use std::path::Path;
use taleweaver_config::{ApiKeys, TaleweaverConfig};
use taleweaver_core::StoryRun;
use taleweaver_drive::DriveClient;
use taleweaver_models::GeminiClient;
use taleweaver_story::{collect_story_segments, split_raw};
use tracing::{info, warn};

/// Drive client for publishing, or `None` when uploads are off or the
/// credentials cannot be loaded. A failed access check is logged and the
/// client is still returned.
pub async fn prepare_drive(config: &TaleweaverConfig) -> Option<DriveClient> {
    if !config.drive.enabled {
        info!("Drive upload disabled");
        return None;
    }
    let client = match DriveClient::from_config(&config.drive).await {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Continuing without Google Drive integration");
            return None;
        }
    };
    if config.drive.check_before_run {
        match client.check_access().await {
            Ok(_) => info!("Google Drive API test successful"),
            Err(e) => warn!(error = %e, "Google Drive API test failed, continuing"),
        }
    }
    Some(client)
}

/// Build the Gemini-backed pipeline and run it to completion.
pub async fn run_generate(mut config: TaleweaverConfig, args: &GenerateArgs) -> anyhow::Result<StoryRun> {
    args.apply(&mut config);
    config.validate()?;
    let prompt = args.prompt_or(&config).to_string();

    let key = ApiKeys::from_env().choose().context("No Gemini API key configured")?;
    let client = GeminiClient::new(key, &config.models.story_model, &config.models, &config.safety)?;
    let drivers = StageDrivers {
        prompt: client.with_model(&config.models.prompt_model),
        story: client.clone(),
        seo: client.with_model(&config.models.seo_model),
    };
    let speech = SpeechEngine::from_config(&config.audio, &client, &config.models.tts_model);
    let drive = prepare_drive(&config).await;

    let pipeline = Pipeline::new(&config, drivers, speech, drive)?;
    let run = pipeline.run(&prompt).await.context("Story generation failed")?;
    write_manifest(&run).await?;
    Ok(run)
}

/// Name of the run summary written into the work directory.
pub const MANIFEST_FILE: &str = "run.json";

/// Record every artifact of `run` as JSON in its work directory.
pub async fn write_manifest(run: &StoryRun) -> anyhow::Result<std::path::PathBuf> {
    let path = run.work_dir().join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(run)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Cannot write {}", path.display()))?;
    info!(path = %path.display(), "Wrote run manifest");
    Ok(path)
}

/// Human-readable summary of a finished run.
pub fn run_summary(run: &StoryRun) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Generated {} images", run.images().len());
    let _ = writeln!(out, "Story: {} segments in {}", run.story().len(), run.work_dir().display());
    if let Some(video) = run.video_path() {
        let _ = writeln!(out, "Video created: {}", video.display());
    }
    if let Some(link) = run.video_link() {
        let _ = writeln!(out, "Video link: {}", link);
    }
    out
}

/// Run the Drive access check.
pub async fn run_drive_check(config: &TaleweaverConfig) -> anyhow::Result<usize> {
    let client = DriveClient::from_config(&config.drive).await?;
    let files = client.check_access().await?;
    Ok(files)
}

/// Segments of a text file, numbered, with the strategy that matched.
pub async fn segment_report(path: &Path) -> anyhow::Result<String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;

    let (strategy, _) = split_raw(text.trim());
    let mut out = String::new();
    let _ = writeln!(out, "Strategy: {:?}", strategy);
    let segments = collect_story_segments(&text);
    for (i, segment) in segments.iter().enumerate() {
        let _ = writeln!(out, "--- Segment {} ---\n{}", i + 1, segment);
    }
    let _ = writeln!(out, "{} segments", segments.len());
    Ok(out)
}
