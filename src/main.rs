//! # Vigil — change-monitoring daemon
//!
//! Polls configured sources on independent schedules, diffs each
//! observation against the last known-good one, and fires notifications
//! when something meaningfully changed.
//!
//! Usage:
//!   vigil                          # Defaults under ~/.vigil
//!   vigil --config vigil.toml      # Explicit config file
//!   vigil --jobs ./jobs            # Override the jobs directory

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vigil_channels::{EmailNotifier, StdoutNotifier, WebhookNotifier};
use vigil_core::config::VigilConfig;
use vigil_core::error::VigilError;
use vigil_scheduler::{Engine, JobDirectoryWatcher, Registry, StateStore};
use vigil_sources::{EpisodesFilter, FileQuery, HttpQuery, JsonItemsFilter, RegexItemsFilter};

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "👁 Vigil — watches sources for meaningful change"
)]
struct Cli {
    /// Config file (default: ~/.vigil/config.toml)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Jobs directory, overrides the config file
    #[arg(long)]
    jobs: Option<std::path::PathBuf>,

    /// State directory, overrides the config file
    #[arg(long)]
    states: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "vigil=debug,vigil_core=debug,vigil_scheduler=debug,vigil_sources=debug,vigil_channels=debug"
    } else {
        "vigil=info,vigil_core=info,vigil_scheduler=info,vigil_sources=info,vigil_channels=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => VigilConfig::load_from(path)?,
        None => VigilConfig::load()?,
    };
    if let Some(jobs) = cli.jobs {
        config.jobs_dir = jobs;
    }
    if let Some(states) = cli.states {
        config.state_dir = states;
    }
    std::fs::create_dir_all(&config.jobs_dir)?;

    tracing::info!("👁 Vigil starting");
    tracing::info!("   Jobs:   {}", config.jobs_dir.display());
    tracing::info!("   States: {}", config.state_dir.display());

    let registry = build_registry(&config);
    let store = Arc::new(StateStore::new(&config.state_dir));
    let engine = Arc::new(Engine::new(store));
    let watcher = JobDirectoryWatcher::new(
        engine,
        registry,
        &config.jobs_dir,
        Duration::from_secs(config.rescan_interval_secs),
    );
    tokio::spawn(watcher.run());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    Ok(())
}

/// Wire every built-in component kind into the registry. The email notifier
/// is only available when the config carries SMTP settings; jobs referencing
/// it without them fail to load with a clear message.
fn build_registry(config: &VigilConfig) -> Registry {
    let mut registry = Registry::with_built_in_differs();

    registry.register_query("http", |params| {
        let url = params.require_str("url")?;
        let timeout = params.get_u64("timeout_secs")?.map(Duration::from_secs);
        let user_agent = params.get_str("user_agent")?;
        Ok(Box::new(HttpQuery::new(url, timeout, user_agent)?))
    });
    registry.register_query("file", |params| {
        Ok(Box::new(FileQuery::new(params.require_str("path")?)))
    });

    registry.register_filter("json-items", |params| {
        Ok(Box::new(JsonItemsFilter::new(
            params.require_str("name_field")?,
            params.get_str("uri_field")?.map(String::from),
            params.get_str("link_field")?.map(String::from),
        )))
    });
    registry.register_filter("regex-items", |params| {
        Ok(Box::new(RegexItemsFilter::new(params.require_str("pattern")?)?))
    });
    registry.register_filter("episodes", |params| {
        Ok(Box::new(EpisodesFilter::new(params.require_str("key_pattern")?)?))
    });

    registry.register_notifier("stdout", |_| Ok(Box::new(StdoutNotifier)));
    registry.register_notifier("webhook", |params| {
        Ok(Box::new(WebhookNotifier::new(params.require_str("url")?)?))
    });
    let email = config.email.clone();
    registry.register_notifier("email", move |_| {
        let config = email.clone().ok_or_else(|| {
            VigilError::config("The email notifier needs an [email] section in the config file")
        })?;
        Ok(Box::new(EmailNotifier::new(config)?))
    });

    registry
}
