mod api;
mod cli;
mod config;
mod forms;
mod page;
mod render;
mod resource;

use clap::Parser;
use is_terminal::IsTerminal;
use log::debug;

use cli::{AppContext, Cli, Reported};
use config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli).await {
        if e.downcast_ref::<Reported>().is_none() {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::resolve(cli.config_dir.clone(), cli.api_url.as_deref())?;
    if cli.no_color || !config.color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    debug!("Using API at {}", config.api_url);

    let ctx = AppContext::new(config)?;
    cli::run(cli, ctx).await
}
