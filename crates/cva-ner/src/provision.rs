use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::model::BUNDLED_MODEL;
use crate::{NerError, NerModel, Result, RuleRecognizer};

static SHARED: OnceCell<Arc<RuleRecognizer>> = OnceCell::const_new();

/// Where the recognizer model lives and where to get it when it is missing
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
    url: Option<String>,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>, url: Option<String>) -> Self {
        Self {
            path: path.into(),
            url,
        }
    }

    /// Store at `path`, or at the platform data directory when unset
    pub fn from_parts(path: Option<PathBuf>, url: Option<String>) -> Self {
        Self::new(path.unwrap_or_else(Self::default_path), url)
    }

    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "cv-anonymiser", "cva") {
            dirs.data_dir().join("models").join("ner-model.json")
        } else {
            PathBuf::from(".cva/models/ner-model.json")
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Load the model, provisioning it first if the file is missing
    pub async fn load(&self) -> Result<NerModel> {
        if !self.path.exists() {
            self.provision().await?;
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let model = NerModel::from_json(&content)?;
        info!(
            "Loaded recognizer model v{} from {}",
            model.version,
            self.path.display()
        );
        Ok(model)
    }

    /// Write a fresh model to the store: fetched from the URL if one is
    /// configured, otherwise the bundled default
    pub async fn provision(&self) -> Result<()> {
        let body = match &self.url {
            Some(url) => {
                info!("Fetching recognizer model from {}", url);
                self.fetch(url).await.map_err(|e| self.unavailable(e))?
            }
            None => {
                debug!("No model URL configured, using bundled model");
                BUNDLED_MODEL.to_string()
            }
        };

        NerModel::from_json(&body).map_err(|e| self.unavailable(e))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.unavailable(e))?;
        }
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| self.unavailable(e))?;

        info!("Recognizer model written to {}", self.path.display());
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let client = reqwest::Client::builder()
            .user_agent("cva/0.1 (cv anonymiser)")
            .timeout(Duration::from_secs(30))
            .build()?;

        let response = client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> NerError {
        NerError::ModelUnavailable {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Process-wide recognizer, built from `store` on first use
pub async fn shared_recognizer(store: &ModelStore) -> Result<Arc<RuleRecognizer>> {
    SHARED
        .get_or_try_init(|| async {
            let model = store.load().await?;
            Ok::<_, NerError>(Arc::new(RuleRecognizer::new(&model)))
        })
        .await
        .cloned()
}
