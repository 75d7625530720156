use std::io::Write;
use taleweaver_config::{ApiKeys, SpeechBackend, TaleweaverConfig};

#[test]
fn test_bundled_defaults() -> anyhow::Result<()> {
    let config = TaleweaverConfig::bundled()?;

    assert_eq!(config.models.story_model, "gemini-2.0-flash-exp-image-generation");
    assert_eq!(config.generation.min_story_segments, 6);
    assert_eq!(config.generation.max_pipeline_attempts, 5);
    assert_eq!(config.retry.max_failures, 1000);
    assert_eq!(config.retry.invalid_request_penalty, 10);
    assert_eq!(config.audio.sample_rate, 24000);
    assert_eq!(config.audio.backend, SpeechBackend::Gemini);
    assert_eq!((config.video.width, config.video.height), (1920, 1080));
    assert_eq!(config.safety.len(), 4);
    assert!(config.safety.iter().all(|s| s.threshold == "BLOCK_NONE"));
    assert!(config.drive.token_file_id().is_none());
    Ok(())
}

#[test]
fn test_overrides_keep_unspecified_defaults() -> anyhow::Result<()> {
    let config = TaleweaverConfig::from_toml_str(
        r#"
        [audio]
        backend = "command"
        gap_secs = 0.25

        [drive]
        token_file_id = "  abc123 "
        "#,
    )?;

    assert_eq!(config.audio.backend, SpeechBackend::Command);
    assert_eq!(config.audio.gap_secs, 0.25);
    assert_eq!(config.audio.sample_rate, 24000);
    assert_eq!(config.drive.token_file_id(), Some("abc123"));
    Ok(())
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(TaleweaverConfig::from_toml_str("[retry]\nmax_failures = 0\n").is_err());
    assert!(TaleweaverConfig::from_toml_str("[video]\njpeg_quality = 0\n").is_err());
    assert!(TaleweaverConfig::from_toml_str("[generation]\nmax_pipeline_attempts = 0\n").is_err());
}

#[test]
fn test_rejection_names_the_key() {
    let err = TaleweaverConfig::from_toml_str("[video]\njpeg_quality = 101\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("video.jpeg_quality must be within 1..=100"), "{message}");
}

#[test]
fn test_explicit_file_overrides_defaults() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "[generation]\nmin_story_segments = 4")?;

    let config = TaleweaverConfig::load(Some(file.path()))?;
    assert_eq!(config.generation.min_story_segments, 4);
    Ok(())
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(TaleweaverConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_api_keys_prefer_list_over_single() {
    let keys = ApiKeys::parse(Some("a,b".into()), Some("single".into()));
    assert_eq!(keys.len(), 2);

    let keys = ApiKeys::parse(Some(" , ".into()), Some("single".into()));
    assert_eq!(keys.len(), 1);
    assert_eq!(keys.choose().unwrap(), "single");
}

#[test]
fn test_no_api_key_is_an_error() {
    let keys = ApiKeys::parse(None, Some("   ".into()));
    assert!(keys.is_empty());
    assert!(keys.choose().is_err());
    assert_eq!(format!("{:?}", keys), "ApiKeys { count: 0 }");
}
