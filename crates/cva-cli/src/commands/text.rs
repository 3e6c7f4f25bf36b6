use anyhow::Result;
use cva_documents::DocumentRegistry;
use std::path::PathBuf;

pub fn handle(file: PathBuf) -> Result<()> {
    let (bytes, format) = super::read_document(&file)?;
    let text = DocumentRegistry::new().extract_text(&bytes, format)?;

    println!("{}", text);
    Ok(())
}
