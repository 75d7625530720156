//! Command-line definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taleweaver_config::TaleweaverConfig;

/// Taleweaver - narrated children's story videos from a single prompt
#[derive(Parser, Debug)]
#[command(name = "taleweaver")]
#[command(about = "Generate narrated children's story videos and publish them to Google Drive", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a story video, retrying until the story is complete
    Generate(GenerateArgs),

    /// Verify Google Drive credentials and access
    DriveCheck,

    /// Split a text file into story segments and print them
    Segment {
        /// Text file holding raw model output
        file: PathBuf,
    },
}

/// Options for `generate`.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Story request; the configured default prompt when omitted
    #[arg(long)]
    pub prompt: Option<String>,

    /// Send the request to the story model as-is
    #[arg(long)]
    pub no_prompt_generator: bool,

    /// Keep the results local
    #[arg(long)]
    pub skip_upload: bool,

    /// Parent directory for run directories
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Whole-pipeline attempts
    #[arg(long)]
    pub attempts: Option<usize>,
}

impl GenerateArgs {
    /// Fold the command-line overrides into `config`.
    pub fn apply(&self, config: &mut TaleweaverConfig) {
        if self.no_prompt_generator {
            config.generation.use_prompt_generator = false;
        }
        if self.skip_upload {
            config.drive.enabled = false;
        }
        if let Some(dir) = &self.output_dir {
            config.output.root = dir.display().to_string();
        }
        if let Some(attempts) = self.attempts {
            config.generation.max_pipeline_attempts = attempts.max(1);
        }
    }

    /// The request to generate from.
    pub fn prompt_or<'a>(&'a self, config: &'a TaleweaverConfig) -> &'a str {
        self.prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(&config.generation.default_prompt)
    }
}
