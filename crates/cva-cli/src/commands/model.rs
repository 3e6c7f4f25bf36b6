use anyhow::Result;
use cva_config::Config;

use crate::cli::ModelCommands;

pub async fn handle(cmd: ModelCommands, config: &Config) -> Result<()> {
    let store = super::model_store(config);

    match cmd {
        ModelCommands::Path => {
            let state = if store.path().exists() {
                "present"
            } else {
                "not yet provisioned"
            };
            println!("{} ({})", store.path().display(), state);
            if let Some(url) = store.url() {
                println!("Source: {}", url);
            }
        }
        ModelCommands::Fetch => {
            store.provision().await?;
            let source = store.url().unwrap_or("bundled model");
            println!("✓ Model from {} saved to {}", source, store.path().display());
        }
    }

    Ok(())
}
