// Startup configuration: command-line flags, the `DBIS_API_URL` environment
// variable and the built-in default, resolved once before the menu starts.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Parser, Debug)]
#[command(name = "dbis-cli")]
#[command(about = "Interactive client for the DBIS identity-registry API", long_about = None)]
pub struct Args {
    /// API base URL (takes precedence over --url)
    #[arg(value_name = "BASE_URL")]
    pub base_url: Option<String>,

    /// API base URL
    #[arg(long = "url", env = "DBIS_API_URL")]
    pub url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub log_level: Level,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let base_url = args
            .base_url
            .or(args.url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let log_level = args
            .log_level
            .parse::<Level>()
            .with_context(|| format!("Invalid log level `{}`", args.log_level))?;
        Ok(Config { base_url, log_level })
    }
}

/// Install a stderr subscriber so logs never mix with the menu on stdout.
pub fn init_logging(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")?;
    Ok(())
}
