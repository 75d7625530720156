use clap::Parser;
use std::path::PathBuf;
use taleweaver::commands::{run_summary, segment_report};
use taleweaver::telemetry::default_directive;
use taleweaver::{Cli, Commands, StoryRun, StoryText, TaleweaverConfig};
use taleweaver_core::ImageSet;

#[test]
fn test_generate_flags_override_config() {
    let cli = Cli::try_parse_from([
        "taleweaver",
        "--verbose",
        "generate",
        "--prompt",
        "A fox in a forest",
        "--no-prompt-generator",
        "--skip-upload",
        "--output-dir",
        "/tmp/stories",
        "--attempts",
        "2",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert!(!cli.json_logs);

    let Commands::Generate(args) = cli.command else {
        panic!("expected generate");
    };
    let mut config = TaleweaverConfig::bundled().unwrap();
    args.apply(&mut config);

    assert!(!config.generation.use_prompt_generator);
    assert!(!config.drive.enabled);
    assert_eq!(config.output.root_dir(), PathBuf::from("/tmp/stories"));
    assert_eq!(config.generation.max_pipeline_attempts, 2);
    assert_eq!(args.prompt_or(&config), "A fox in a forest");
}

#[test]
fn test_generate_defaults_keep_config() {
    let cli = Cli::try_parse_from(["taleweaver", "generate", "--json-logs"]).unwrap();
    assert!(cli.json_logs);
    let Commands::Generate(args) = cli.command else {
        panic!("expected generate");
    };
    let mut config = TaleweaverConfig::bundled().unwrap();
    let before = config.clone();
    args.apply(&mut config);

    assert_eq!(config, before);
    assert_eq!(args.prompt_or(&config), config.generation.default_prompt);
}

#[test]
fn test_global_config_flag_and_subcommands() {
    let cli = Cli::try_parse_from(["taleweaver", "drive-check", "--config", "custom.toml"]).unwrap();
    assert!(matches!(cli.command, Commands::DriveCheck));
    assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));

    let cli = Cli::try_parse_from(["taleweaver", "segment", "story.txt"]).unwrap();
    assert!(matches!(cli.command, Commands::Segment { file } if file == PathBuf::from("story.txt")));

    assert!(Cli::try_parse_from(["taleweaver", "generate", "--attempts", "many"]).is_err());
}

#[test]
fn test_log_directive() {
    assert_eq!(default_directive(true), "debug");
    assert_eq!(default_directive(false), "info");
}

#[tokio::test]
async fn test_segment_report() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("raw.txt");
    std::fs::write(
        &path,
        "Segment 1: Pip woke up early and stretched in the warm barn.\n\
         Segment 2: She found a shiny red ball rolling near the pond.\n\
         Segment 3: Together with Duck they played until the sun went down.\n",
    )?;

    let report = segment_report(&path).await?;
    assert!(report.starts_with("Strategy: SceneMarkers"));
    assert!(report.contains("--- Segment 3 ---"));
    assert!(report.trim_end().ends_with("3 segments"));

    assert!(segment_report(&dir.path().join("missing.txt")).await.is_err());
    Ok(())
}

#[test]
fn test_run_summary() {
    let run = StoryRun::new(
        PathBuf::from("/tmp/story_1"),
        "prompt".into(),
        StoryText::new(vec!["One".into(), "Two".into()]),
        ImageSet::from_paths(vec![PathBuf::from("image_01.png")]),
    );
    let summary = run_summary(&run);
    assert!(summary.contains("Generated 1 images"));
    assert!(summary.contains("2 segments"));
    assert!(!summary.contains("Video"));
}

#[tokio::test]
async fn test_manifest_lists_artifacts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let run = StoryRun::new(
        dir.path().to_path_buf(),
        "A goat".into(),
        StoryText::new(vec!["Pip woke up.".into()]),
        ImageSet::from_paths(vec![dir.path().join("image_01.png")]),
    );

    let path = taleweaver::commands::write_manifest(&run).await?;
    assert_eq!(path, dir.path().join(taleweaver::commands::MANIFEST_FILE));
    let restored: StoryRun = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(restored, run);
    Ok(())
}
