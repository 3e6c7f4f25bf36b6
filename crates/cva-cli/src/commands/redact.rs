use anyhow::{Context, Result, bail};
use cva_config::Config;
use cva_core::{DocumentFormat, RedactionTargets};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct RedactRequest {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub extra: Vec<String>,
    pub exclude: Vec<String>,
    pub yes: bool,
    pub force: bool,
    pub keep_metadata: bool,
    pub report_json: bool,
}

pub async fn handle(request: RedactRequest, config: &Config) -> Result<()> {
    let (bytes, format) = super::read_document(&request.file)?;

    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config.output.file_stem, format));
    check_output(&request.file, &output, request.force)?;

    let mut options = super::redact_options(config);
    if request.keep_metadata {
        options.scrub_metadata = false;
    }
    let anonymiser = super::anonymiser(config, options).await?;

    let inspection = anonymiser.inspect(&bytes, format)?;
    for literal in &request.exclude {
        if !inspection.targets.contains(literal.trim()) {
            warn!("Excluded item was not detected: {:?}", literal);
        }
    }
    let targets = review_targets(inspection.targets, &request.extra, &request.exclude);

    if targets.is_empty() {
        println!("Nothing to redact in {}", request.file.display());
    } else {
        println!("Redacting {} items:", targets.len());
        for target in &targets {
            println!("  {}", target);
        }
    }

    if !request.yes {
        print!("Write redacted copy to {}? [y/N] ", output.display());
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let outcome = anonymiser.redact(&bytes, format, &targets)?;
    std::fs::write(&output, &outcome.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Wrote {} ({} bytes, {}/{} units changed)",
        output.display(),
        outcome.bytes.len(),
        outcome.report.units_modified,
        outcome.report.units_total
    );

    if request.report_json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    let report = &outcome.report;
    println!(
        "✓ Redacted {} occurrences of {} items",
        report.total_occurrences(),
        targets.len()
    );
    for target in report.unmatched() {
        println!("  not found: {}", target);
    }
    if report.metadata_scrubbed {
        println!("✓ Removed author and title metadata");
    }
    println!("✓ Saved {}", output.display());

    Ok(())
}

fn default_output(file_stem: &str, format: DocumentFormat) -> PathBuf {
    PathBuf::from(format!("{}.{}", file_stem, format.extension()))
}

fn check_output(input: &Path, output: &Path, force: bool) -> Result<()> {
    if !output.exists() {
        return Ok(());
    }
    if std::fs::canonicalize(input)? == std::fs::canonicalize(output)? {
        bail!("Refusing to overwrite the input document {}", input.display());
    }
    if force {
        warn!("Overwriting {}", output.display());
        return Ok(());
    }
    bail!(
        "{} already exists (use --force to overwrite)",
        output.display()
    );
}

/// Detected targets with the user's exclusions removed and additions appended
fn review_targets(
    mut detected: RedactionTargets,
    extra: &[String],
    exclude: &[String],
) -> RedactionTargets {
    for literal in exclude {
        detected.remove(literal);
    }
    for literal in extra {
        detected.insert(literal);
    }
    detected
}
