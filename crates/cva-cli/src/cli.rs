use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cva")]
#[command(about = "Redact names and institutions from CVs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the names and institutions that would be redacted
    Detect {
        /// CV document (.pdf or .docx)
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the text extracted from a document
    Text {
        /// CV document (.pdf or .docx)
        file: PathBuf,
    },

    /// Write a redacted copy of a document
    Redact {
        /// CV document (.pdf or .docx)
        file: PathBuf,

        /// Output path (default: redacted_cv.<ext> in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Additional literal to redact (repeatable)
        #[arg(long)]
        extra: Vec<String>,

        /// Detected item to keep (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Overwrite the output file if it exists
        #[arg(long)]
        force: bool,

        /// Keep author and title metadata
        #[arg(long)]
        keep_metadata: bool,

        /// Print the redaction report as JSON
        #[arg(long)]
        report_json: bool,
    },

    /// Manage the recognizer model
    #[command(subcommand)]
    Model(ModelCommands),

    /// Show the configuration file path and effective settings
    Config,
}

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Show where the model is stored
    Path,

    /// Download (or restore the bundled) model, replacing the current file
    Fetch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redact() {
        let cli = Cli::try_parse_from([
            "cva", "redact", "cv.pdf", "-o", "out.pdf", "--extra", "ACME", "--extra", "Jo",
            "--exclude", "Python", "--yes",
        ])
        .unwrap();

        match cli.command {
            Commands::Redact {
                file,
                output,
                extra,
                exclude,
                yes,
                force,
                ..
            } => {
                assert_eq!(file, PathBuf::from("cv.pdf"));
                assert_eq!(output, Some(PathBuf::from("out.pdf")));
                assert_eq!(extra, vec!["ACME", "Jo"]);
                assert_eq!(exclude, vec!["Python"]);
                assert!(yes);
                assert!(!force);
            }
            _ => panic!("expected redact"),
        }
    }

    #[test]
    fn test_parse_model_fetch() {
        let cli = Cli::try_parse_from(["cva", "model", "fetch"]).unwrap();
        assert!(matches!(cli.command, Commands::Model(ModelCommands::Fetch)));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
