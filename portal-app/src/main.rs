//! Terminal front end of the university instrument sharing portal.

mod app;
mod config;
mod logging;
mod model;
mod pages;

use clap::Parser;
use config::PortalConfig;
use portal_nav::Application;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "portal", version, about = "高校大型仪器设备共享服务平台")]
struct Cli {
    /// Configuration file (default: ~/.config/equipment-portal/config.toml)
    #[arg(short, long, env = "PORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Path to open at startup, e.g. /equipment
    #[arg(short, long)]
    path: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = PortalConfig::load(cli.config.as_deref())?;
    logging::init(&config.log, cli.verbose)?;

    let initial_path = cli.path.unwrap_or_else(|| config.app.initial_path.clone());
    tracing::info!(%initial_path, "starting portal");

    Application::new()
        .initial_path(initial_path)
        .tick_rate(Duration::from_millis(config.ui.tick_rate_ms))
        .run(move |cx| app::build_router(&config, cx))
}
