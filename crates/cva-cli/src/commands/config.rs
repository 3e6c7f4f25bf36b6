use anyhow::Result;
use cva_config::Config;

pub fn handle(config: &Config) -> Result<()> {
    println!("# {}", Config::config_path().display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
