//! Knowledge Lens - terminal dashboard for a knowledge base backend
//!
//! Fetches documents, links and search history, normalizes them for display,
//! and lets you filter, sort and search them from the command line.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use knowledge_lens::cli::commands::{self, AppContext};
use knowledge_lens::cli::{Cli, Commands, DashboardArgs};
use knowledge_lens::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "knowledge_lens=debug" } else { "knowledge_lens=info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .with(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(&config_path);
    if let Some(url) = &cli.url {
        config.backend.base_url = url.clone();
    }

    if let Some(Commands::Config(args)) = &cli.command {
        return commands::config(args, &config, &config_path);
    }

    let ctx = AppContext::new(config, cli.is_json())?;

    let outcome = match &cli.command {
        Some(Commands::Dashboard(args)) => commands::dashboard(&ctx, args).await,
        Some(Commands::Library(args)) => commands::library(&ctx, args).await,
        Some(Commands::Links(args)) => commands::links(&ctx, args).await,
        Some(Commands::Search(args)) => commands::search(&ctx, args).await,
        Some(Commands::Logs(args)) => commands::logs(&ctx, args).await,
        Some(Commands::Show(args)) => commands::show(&ctx, args).await,
        Some(Commands::Upload(args)) => commands::upload(&ctx, args).await,
        Some(Commands::AddLink(args)) => commands::add_link(&ctx, args).await,
        Some(Commands::Prefs(args)) => commands::prefs(&ctx, args),
        Some(Commands::Config(_)) => Ok(()),
        None => commands::dashboard(&ctx, &DashboardArgs::default()).await,
    };

    ctx.session.teardown();
    outcome
}
