use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for cva
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ner: NerConfig,

    #[serde(default)]
    pub redaction: RedactionConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NerConfig {
    /// Recognizer model file (defaults to the platform data directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    /// Where to fetch the model from when the file is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default = "default_mask_char")]
    pub mask_char: char,

    /// RGB, each component in 0..=1
    #[serde(default = "default_fill_color")]
    pub fill_color: [f32; 3],

    #[serde(default = "default_true")]
    pub scrub_metadata: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            mask_char: default_mask_char(),
            fill_color: default_fill_color(),
            scrub_metadata: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_stem: default_file_stem(),
        }
    }
}

fn default_mask_char() -> char {
    '█'
}

fn default_fill_color() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn default_true() -> bool {
    true
}

fn default_file_stem() -> String {
    "redacted_cv".to_string()
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            Ok(config)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self
            .redaction
            .fill_color
            .iter()
            .any(|c| !(0.0..=1.0).contains(c))
        {
            bail!(
                "redaction.fill_color components must be between 0 and 1, got {:?}",
                self.redaction.fill_color
            );
        }
        if self.output.file_stem.trim().is_empty() {
            bail!("output.file_stem must not be empty");
        }
        if let Some(url) = &self.ner.model_url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            bail!("ner.model_url must start with http:// or https://: {}", url);
        }
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "cv-anonymiser", "cva") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from(".cva/config.toml")
        }
    }
}
