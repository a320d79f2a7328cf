// crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use playsync_config::ConfigManager;
use std::path::PathBuf;

mod commands;

fn build_cli() -> Command {
    Command::new("playsync")
        .version(env!("CARGO_PKG_VERSION"))
        .author("PlaySync Contributors")
        .about("Mirrors media folders into remote playlists")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the config file (default: config.toml next to the executable)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("run").about("Watch folders and sync changes (default)"))
        .subcommand(Command::new("init").about("Write a default config file"))
        .subcommand(
            Command::new("check").about("Validate the config and probe the remote endpoint"),
        )
}

fn init_logging(matches: &ArgMatches) {
    let default_filter = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    let manager = match matches.get_one::<PathBuf>("config") {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    manager.context("Failed to locate config file")
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_logging(&matches);

    let manager = config_manager(&matches)?;

    match matches.subcommand() {
        Some(("init", _)) => commands::init_config(&manager),
        Some(("check", _)) => commands::check(&manager).await,
        Some(("run", _)) | None => commands::run(&manager).await,
        Some((other, _)) => anyhow::bail!("Unknown command: {}", other),
    }
}
