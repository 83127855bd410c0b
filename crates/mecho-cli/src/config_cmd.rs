use std::fs;

use anyhow::{Context, Result};
use clap::Subcommand;
use mecho_config::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Print where configuration and data live
    Path,

    /// Write a default config file
    Init {
        /// Write the global file instead of the project one
        #[arg(long)]
        global: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(command: ConfigCommands, config: &Config) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let text = toml::to_string_pretty(config).context("Failed to render config")?;
            print!("{}", text);
        }
        ConfigCommands::Path => {
            match Config::global_config_path() {
                Some(path) => println!("Global:  {}", path.display()),
                None => println!("Global:  (no home directory)"),
            }
            println!("Project: {}", Config::project_config_path().display());
            println!("Data:    {}", config.layout().data_dir.display());
        }
        ConfigCommands::Init { global, force } => {
            let path = if global {
                Config::global_config_path().context("No home directory for the global config")?
            } else {
                Config::project_config_path()
            };

            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, Config::default_toml())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
