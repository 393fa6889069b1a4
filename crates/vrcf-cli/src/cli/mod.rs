//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use vrcf_core::config::Config;

mod commands;

#[derive(Parser)]
#[command(name = "vrcf")]
#[command(version)]
#[command(about = "VRChat friends list in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the VRChat API base URL
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and list your friends
    Friends,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = crate::logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    let base_url = match cli.base_url.as_deref() {
        Some(url) => url.to_string(),
        None => config.resolved_base_url()?,
    };

    // default to the friends flow
    match cli.command {
        None | Some(Commands::Friends) => commands::friends::run(&base_url).await,

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
