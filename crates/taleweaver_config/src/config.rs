//! Layered configuration loading.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (include_str! from taleweaver.toml)
//! 2. `~/.config/taleweaver/taleweaver.toml`
//! 3. `./taleweaver.toml`
//! 4. An explicit file passed on the command line
//! 5. `TALEWEAVER__SECTION__KEY` environment variables

use crate::{
    AudioConfig, DriveConfig, GenerationConfig, ModelsConfig, OutputConfig, RetryConfig,
    SafetySetting, ThumbnailConfig, VideoConfig,
};
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::path::Path;
use taleweaver_error::{ConfigError, TaleweaverError, TaleweaverResult};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../taleweaver.toml");

/// Top-level Taleweaver configuration.
///
/// # Example
///
/// ```no_run
/// use taleweaver_config::TaleweaverConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TaleweaverConfig::load(None)?;
/// println!("story model: {}", config.models.story_model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TaleweaverConfig {
    /// Model identifiers and endpoint
    pub models: ModelsConfig,
    /// Story generation parameters
    pub generation: GenerationConfig,
    /// Backoff for remote calls
    pub retry: RetryConfig,
    /// Provider safety thresholds
    #[serde(default)]
    pub safety: Vec<SafetySetting>,
    /// Narration
    pub audio: AudioConfig,
    /// Slideshow encoding
    pub video: VideoConfig,
    /// Thumbnail layout
    pub thumbnail: ThumbnailConfig,
    /// Drive publishing
    pub drive: DriveConfig,
    /// Run directory location
    pub output: OutputConfig,
}

impl TaleweaverConfig {
    /// Bundled defaults only.
    #[instrument]
    pub fn bundled() -> TaleweaverResult<Self> {
        Self::finish(Self::base())
    }

    /// Bundled defaults overridden by a TOML document.
    ///
    /// # Example
    ///
    /// ```
    /// use taleweaver_config::TaleweaverConfig;
    ///
    /// let config = TaleweaverConfig::from_toml_str("[retry]\nmax_failures = 3\n").unwrap();
    /// assert_eq!(config.retry.max_failures, 3);
    /// assert_eq!(config.generation.min_story_segments, 6);
    /// ```
    #[instrument(skip(overrides))]
    pub fn from_toml_str(overrides: &str) -> TaleweaverResult<Self> {
        Self::finish(Self::base().add_source(File::from_str(overrides, FileFormat::Toml)))
    }

    /// Load configuration with full precedence.
    ///
    /// User config files are optional and silently skipped if not found;
    /// `explicit` must exist when given.
    #[instrument(skip(explicit), fields(explicit = ?explicit.map(Path::display)))]
    pub fn load(explicit: Option<&Path>) -> TaleweaverResult<Self> {
        debug!("Loading configuration: env > explicit > current dir > home dir > bundled defaults");

        let mut builder = Self::base();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/taleweaver/taleweaver.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("taleweaver").required(false));

        if let Some(path) = explicit {
            debug!(path = %path.display(), "Adding explicit configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TALEWEAVER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder)
    }

    fn base() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> TaleweaverResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                TaleweaverError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                TaleweaverError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> TaleweaverResult<()> {
        let problem = if self.retry.max_failures == 0 {
            Some(("retry.max_failures", "must be at least 1"))
        } else if self.retry.max_delay_secs < 0.0 || self.retry.initial_delay_secs < 0.0 {
            Some(("retry", "delays must not be negative"))
        } else if self.generation.max_pipeline_attempts == 0 {
            Some(("generation.max_pipeline_attempts", "must be at least 1"))
        } else if self.video.width == 0 || self.video.height == 0 || self.video.fps == 0 {
            Some(("video", "dimensions and fps must be positive"))
        } else if self.audio.sample_rate == 0 {
            Some(("audio.sample_rate", "must be positive"))
        } else if self.video.jpeg_quality == 0 || self.video.jpeg_quality > 100 {
            Some(("video.jpeg_quality", "must be within 1..=100"))
        } else {
            None
        };
        match problem {
            Some((key, message)) => Err(ConfigError::for_key(key, message).into()),
            None => Ok(()),
        }
    }
}
