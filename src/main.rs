mod alert;
mod config;
mod error;
mod fetcher;
mod keywords;
mod models;
mod notifier;
mod parser;
mod registry;
mod search;
mod store;
mod tracker;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use alert::AlertPolicy;
use config::{Args, Command, Config};
use fetcher::HttpFetcher;
use notifier::TelegramNotifier;
use registry::ProductRegistry;
use store::AlertLedger;
use tracker::Tracker;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from(&args);
    let command = args.command.unwrap_or(Command::Scan {
        policy: AlertPolicy::PriceChange,
    });

    let fetcher = HttpFetcher::new(config.timeout)?;
    let notifier = TelegramNotifier::new(
        fetcher.client().clone(),
        config.bot_token.clone(),
        config.chat_id.clone(),
    );
    if config.bot_token.is_none() || config.chat_id.is_none() {
        warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID unset; alerts will only be logged");
    }

    let mut ledger = AlertLedger::open(&config.alerts_path);
    let mut registry = ProductRegistry::open(&config.registry_path, config.default_target);
    info!(
        "Loaded {} tracked products and {} alert records",
        registry.products().len(),
        ledger.len()
    );
    let tracker = Tracker::new(&config, fetcher, notifier);

    match command {
        Command::Scan { policy } => {
            let keywords = keywords::load_keywords(&config.keywords_path).unwrap_or_else(|e| {
                warn!("{e}; nothing to search");
                Vec::new()
            });
            tracker.scan(&keywords, policy, &mut ledger, &mut registry);
        }
        Command::Poll { policy } => {
            tracker.poll(&registry, policy, &mut ledger);
        }
    }
    Ok(())
}
