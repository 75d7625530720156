mod test_utils;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use taleweaver::{Pipeline, StoryRun, StoryText, create_work_dir, run_with_retries};
use taleweaver_core::{ImageSet, Output};
use taleweaver_error::{StoryError, StoryErrorKind, TaleweaverErrorKind};
use test_utils::{ScriptedDriver, SilentSpeech, drivers, six_scene_story, test_config};

fn run_with(segments: usize, images: usize) -> StoryRun {
    StoryRun::new(
        PathBuf::from("/tmp/run"),
        "prompt".into(),
        StoryText::new((0..segments).map(|i| format!("Paragraph {}", i)).collect()),
        ImageSet::from_paths(
            (1..=images)
                .map(|i| PathBuf::from(format!("image_{:02}.png", i)))
                .collect(),
        ),
    )
}

#[tokio::test]
async fn test_retries_stop_at_first_complete_run() {
    let calls = AtomicUsize::new(0);
    let run = run_with_retries(5, Duration::ZERO, 6, |n| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 3 {
                Ok(run_with(6, 2))
            } else {
                Ok(run_with(7, 6))
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(run.story().len(), 7);
}

#[tokio::test]
async fn test_retries_exhaust_on_errors_and_short_runs() {
    let calls = AtomicUsize::new(0);
    let err = run_with_retries(4, Duration::ZERO, 6, |n| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n % 2 == 0 {
                Err(StoryError::new(StoryErrorKind::EmptyText).into())
            } else {
                Ok(run_with(5, 5))
            }
        }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    match err.kind() {
        TaleweaverErrorKind::Story(e) => assert_eq!(e.kind, StoryErrorKind::Exhausted(4)),
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_work_dirs_are_unique() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let a = create_work_dir(root.path()).await?;
    let b = create_work_dir(root.path()).await?;

    assert_ne!(a, b);
    assert!(a.is_dir() && b.is_dir());
    assert_eq!(a.parent(), Some(root.path()));
    let name = a.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("story_"));
    Ok(())
}

#[tokio::test]
async fn test_narration_failure_returns_story_and_images() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let config = test_config(root.path());
    let prompt = ScriptedDriver::text("unused");
    let story = ScriptedDriver::new(six_scene_story());
    let seo = ScriptedDriver::text("{}");

    let pipeline = Pipeline::new(
        &config,
        drivers(&prompt, &story, &seo),
        SilentSpeech { fail: true },
        None,
    )?;
    let run = pipeline.generate_once("A goat on a farm").await?;

    assert_eq!(run.story().len(), 6);
    assert_eq!(run.images().len(), 6);
    assert!(run.is_complete(6));
    assert!(run.audio().is_none());
    assert!(run.video().is_none());
    assert!(run.metadata().is_none());
    assert!(run.work_dir().join("story.txt").is_file());
    assert!(run.work_dir().starts_with(root.path()));

    assert_eq!(prompt.call_count(), 0);
    assert_eq!(seo.call_count(), 0);
    assert_eq!(run.prompt(), "A goat on a farm");
    Ok(())
}

#[tokio::test]
async fn test_video_failure_keeps_narration() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let config = test_config(root.path());
    let prompt = ScriptedDriver::text("unused");
    let story = ScriptedDriver::new(six_scene_story());
    let seo = ScriptedDriver::text("{}");

    let pipeline = Pipeline::new(
        &config,
        drivers(&prompt, &story, &seo),
        SilentSpeech { fail: false },
        None,
    )?;
    let run = pipeline.generate_once("A goat on a farm").await?;

    let audio = run.audio().as_ref().expect("narration kept");
    assert!(audio.path().is_file());
    assert_eq!(audio.segments().len(), 6);
    assert!(run.video().is_none());
    assert!(run.video_path().is_none());
    assert!(run.video_link().is_none());
    Ok(())
}

#[tokio::test]
async fn test_prompt_generator_rewrites_request() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let mut config = test_config(root.path());
    config.generation.use_prompt_generator = true;
    let prompt = ScriptedDriver::text(
        "Generate a story about a brave duck named Dot going on an adventure in a pond in a highly detailed 3d cartoon animation style.",
    );
    let story = ScriptedDriver::new(six_scene_story());
    let seo = ScriptedDriver::text("{}");

    let pipeline = Pipeline::new(
        &config,
        drivers(&prompt, &story, &seo),
        SilentSpeech { fail: true },
        None,
    )?;
    let run = pipeline.generate_once("a duck").await?;

    assert_eq!(prompt.call_count(), 1);
    assert!(run.prompt().contains("brave duck named Dot"));
    assert!(run.prompt().contains("16:9"));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_run_gives_up_on_short_stories() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let mut config = test_config(root.path());
    config.generation.max_pipeline_attempts = 2;
    let prompt = ScriptedDriver::text("unused");
    let mut short = six_scene_story();
    short.truncate(4);
    let story = ScriptedDriver::new(short);
    let seo = ScriptedDriver::text("{}");

    let pipeline = Pipeline::new(
        &config,
        drivers(&prompt, &story, &seo),
        SilentSpeech { fail: true },
        None,
    )?;
    let result = pipeline.run("A goat").await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(root.path())?.count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_noise_only_story_is_not_complete() -> anyhow::Result<()> {
    let root = tempfile::tempdir()?;
    let mut config = test_config(root.path());
    config.generation.max_pipeline_attempts = 2;
    let prompt = ScriptedDriver::text("unused");
    let mut noise = Vec::new();
    for i in 0..6u8 {
        noise.push(Output::Text(format!(
            "Image generation: picture number {} of the barn scene here.\n\n",
            i
        )));
        noise.push(Output::Image {
            mime: "image/png".to_string(),
            data: vec![i; 8],
        });
    }
    let story = ScriptedDriver::new(noise);
    let seo = ScriptedDriver::text("{}");

    let pipeline = Pipeline::new(
        &config,
        drivers(&prompt, &story, &seo),
        SilentSpeech { fail: true },
        None,
    )?;

    let once = pipeline.generate_once("A goat").await?;
    assert_eq!(once.story().len(), 6);
    assert_eq!(*once.segments(), 0);
    assert!(!once.is_complete(6));

    let result = pipeline.run("A goat").await;
    assert!(result.is_err());
    assert_eq!(story.call_count(), 3);
    Ok(())
}
