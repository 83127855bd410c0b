//! # mecho CLI
//!
//! Command-line front end for the mecho meme store. Every catalog operation
//! goes through the same message handler a chat adapter would use, so replies
//! read the same here as in a group chat.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mecho_bot::{BotSettings, Command, HandleResult, InboundMessage, MemeBot, Reply};
use mecho_cas::ContentStore;
use mecho_catalog::Catalog;
use mecho_config::logging::{init_logging, Component, LogLevel};
use mecho_config::Config;
use mecho_fetch::HttpFetcher;

mod chat;
mod config_cmd;
mod source;

/// mecho - content-addressed meme store with aliases
#[derive(Parser)]
#[command(name = "mecho")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory (overrides config and MECHO_DATA_DIR)
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an image from a local file or an http(s) URL
    Add {
        #[arg(value_name = "PATH|URL")]
        source: String,
    },

    /// Bind an alias to a stored meme
    Name {
        /// ID or existing alias
        target: String,

        /// New alias; multiple words are joined with single spaces
        #[arg(required = true, num_args = 1..)]
        alias: Vec<String>,
    },

    /// Show one meme
    Show {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// List stored memes
    List {
        /// Show every entry instead of the configured limit
        #[arg(short, long)]
        all: bool,
    },

    /// Delete a meme and its aliases
    Del {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Rebuild the index from the blob directory
    Reload,

    /// Inspect or create configuration files
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommands,
    },

    /// Feed stdin lines through the chat message handler
    Chat {
        #[arg(long, default_value = "cli")]
        conversation: String,

        #[arg(long, default_value = "local")]
        user: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(match cli.verbose {
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        _ => LogLevel::Debug,
    });

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async_main(cli.command, config))
}

async fn async_main(command: Commands, config: Config) -> Result<()> {
    let mut settings = BotSettings::from_config(&config);

    let command = match command {
        Commands::Config { command } => return config_cmd::run(command, &config),
        Commands::Add { source } => {
            let image = source::parse(&source)?;
            let bot = build_bot(&config, settings)?;
            let msg = local_message().with_image(image);
            return emit(bot.handle_command(Command::Add, &msg).await);
        }
        Commands::Chat { conversation, user } => {
            let bot = build_bot(&config, settings)?;
            return chat::run(&bot, &conversation, &user).await;
        }
        Commands::Name { target, alias } => Command::Name {
            target,
            alias: alias.join(" "),
        },
        Commands::Show { query } => Command::Show {
            query: query.join(" "),
        },
        Commands::List { all } => {
            if all {
                settings.list_limit = usize::MAX;
            }
            Command::List
        }
        Commands::Del { query } => Command::Delete {
            query: query.join(" "),
        },
        Commands::Reload => Command::Reload,
    };

    let bot = build_bot(&config, settings)?;
    emit(bot.handle_command(command, &local_message()).await)
}

fn build_bot(config: &Config, settings: BotSettings) -> Result<MemeBot<HttpFetcher>> {
    let layout = config.layout();
    let store = ContentStore::new(&layout.blob_dir)
        .with_context(|| format!("Failed to open blob directory {}", layout.blob_dir.display()))?
        .with_default_extension(&config.storage.default_extension);
    let catalog = Catalog::open_with_store(&layout, store)
        .with_context(|| format!("Failed to open catalog in {}", layout.data_dir.display()))?;
    let fetcher = HttpFetcher::new(config.fetch.timeout()).context("Failed to build HTTP client")?;

    tracing::debug!(
        component = Component::CLI,
        data_dir = %layout.data_dir.display(),
        "catalog ready"
    );
    Ok(MemeBot::new(Arc::new(catalog), fetcher, settings))
}

fn local_message() -> InboundMessage {
    InboundMessage::text("cli", "local", "")
}

/// Print a one-shot result. Errors become a non-zero exit.
fn emit(result: HandleResult) -> Result<()> {
    match result {
        HandleResult::Handled(Reply::Text(text)) => println!("{}", text),
        HandleResult::Handled(Reply::Image(path)) => println!("{}", path.display()),
        HandleResult::HandledWithError(text) => anyhow::bail!(text),
        HandleResult::NotHandled => {}
    }
    Ok(())
}
