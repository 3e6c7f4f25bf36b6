mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cva_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = Config::load()?;

    match cli.command {
        cli::Commands::Detect { file, json } => commands::detect::handle(file, json, &config).await,
        cli::Commands::Text { file } => commands::text::handle(file),
        cli::Commands::Redact {
            file,
            output,
            extra,
            exclude,
            yes,
            force,
            keep_metadata,
            report_json,
        } => {
            commands::redact::handle(
                commands::redact::RedactRequest {
                    file,
                    output,
                    extra,
                    exclude,
                    yes,
                    force,
                    keep_metadata,
                    report_json,
                },
                &config,
            )
            .await
        }
        cli::Commands::Model(cmd) => commands::model::handle(cmd, &config).await,
        cli::Commands::Config => commands::config::handle(&config),
    }
}
