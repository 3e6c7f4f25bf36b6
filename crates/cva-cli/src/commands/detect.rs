use anyhow::Result;
use cva_config::Config;
use std::path::PathBuf;

pub async fn handle(file: PathBuf, json: bool, config: &Config) -> Result<()> {
    let (bytes, format) = super::read_document(&file)?;
    let anonymiser = super::anonymiser(config, super::redact_options(config)).await?;
    let inspection = anonymiser.inspect(&bytes, format)?;

    if json {
        let output = serde_json::json!({
            "file": file.display().to_string(),
            "format": inspection.format,
            "recognizer": anonymiser.recognizer_name(),
            "targets": inspection.targets,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if inspection.targets.is_empty() {
        println!("No names or institutions detected in {}", file.display());
        return Ok(());
    }

    println!("Detected {} items to redact:", inspection.targets.len());
    for target in &inspection.targets {
        println!("  {}", target);
    }

    Ok(())
}
