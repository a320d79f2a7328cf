// crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use console::style;
use log::{info, warn};
use playsync_config::{Config, ConfigManager};
use playsync_network::{Client, ClientConfig, ConnectivityChecker};
use playsync_sync_engine::RemoteEndpoint;
use playsync_watcher::SyncSession;

/// Watch the configured folders until Ctrl+C
pub async fn run(manager: &ConfigManager) -> Result<()> {
    let config = manager
        .load_or_create()
        .context("Failed to load configuration")?;
    info!("Using config file {}", manager.config_path().display());

    for problem in config_problems(&config) {
        warn!("Config: {}", problem);
    }

    if let Err(e) = probe_endpoint(&config).await {
        warn!(
            "Remote API at {} is not reachable yet: {}",
            config.remote_endpoint, e
        );
    }

    let session = SyncSession::start(&config).context("Failed to start watching")?;
    let watched = session.roots().len();
    if watched == 0 {
        warn!("No watch folder exists yet, waiting for one to appear. Press Ctrl+C to stop.");
    } else {
        info!("Watching {} folder(s). Press Ctrl+C to stop.", watched);
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Shutting down");
    session.stop().await.context("Failed to stop watch session")?;
    Ok(())
}

/// Write a default config file if none exists
pub fn init_config(manager: &ConfigManager) -> Result<()> {
    let created = manager
        .initialize()
        .context("Failed to write default config")?;

    if created {
        println!(
            "{} Created default config at {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!(
            "Config already exists at {}",
            manager.config_path().display()
        );
    }
    Ok(())
}

/// Validate the config and probe the remote endpoint
pub async fn check(manager: &ConfigManager) -> Result<()> {
    let config = manager.load().context("Failed to load configuration")?;
    println!("Config file: {}", manager.config_path().display());

    let problems = config_problems(&config);
    if problems.is_empty() {
        println!("{} Configuration is valid", style("✓").green().bold());
    } else {
        for problem in &problems {
            println!("{} {}", style("✗").red().bold(), problem);
        }
    }

    for root in config.roots() {
        println!("  Watch root: {}", root.display());
    }
    println!("  Extensions: {}", config.supported_extensions.join(" "));

    match probe_endpoint(&config).await {
        Ok(latency) => println!(
            "{} Remote API reachable at {} ({} ms)",
            style("✓").green().bold(),
            config.remote_endpoint,
            latency.as_millis()
        ),
        Err(e) => println!(
            "{} Remote API not reachable at {}: {}",
            style("✗").red().bold(),
            config.remote_endpoint,
            e
        ),
    }

    if !problems.is_empty() {
        bail!("{} configuration problem(s) found", problems.len());
    }
    Ok(())
}

/// Validation errors plus warnings about missing roots
pub fn config_problems(config: &Config) -> Vec<String> {
    let mut problems: Vec<String> = match config.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
    };
    problems.extend(config.check_roots().iter().map(|e| e.to_string()));
    problems
}

/// Times a state read against the configured endpoint
pub async fn probe_endpoint(config: &Config) -> Result<std::time::Duration> {
    let client_config = ClientConfig::default()
        .with_timeout(config.remote.request_timeout())
        .with_user_agent(config.remote.user_agent.clone());
    let client = Client::with_config(client_config).context("Failed to create HTTP client")?;
    let checker = ConnectivityChecker::new(client);

    let url = RemoteEndpoint::new(config.remote_endpoint.as_str()).state_url();
    let latency = checker.probe(&url).await?;
    Ok(latency)
}
