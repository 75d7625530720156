//! Taleweaver CLI binary.

use clap::Parser;
use taleweaver::commands::{run_drive_check, run_generate, run_summary, segment_report};
use taleweaver::telemetry::init_telemetry;
use taleweaver::{Cli, Commands, TaleweaverConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_telemetry(cli.verbose, cli.json_logs)?;

    match cli.command {
        Commands::Generate(args) => {
            let config = TaleweaverConfig::load(cli.config.as_deref())?;
            let run = run_generate(config, &args).await?;
            print!("{}", run_summary(&run));
        }
        Commands::DriveCheck => {
            let config = TaleweaverConfig::load(cli.config.as_deref())?;
            let files = run_drive_check(&config).await?;
            println!("Google Drive API test successful ({} files visible)", files);
        }
        Commands::Segment { file } => {
            print!("{}", segment_report(&file).await?);
        }
    }

    Ok(())
}
