use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use url::Url;

use crate::alert::{AlertPolicy, DeliveryPolicy};
use crate::search::LinkFilter;

#[derive(Parser, Debug)]
#[command(name = "price-tracker")]
#[command(about = "Scrapes product pages and sends Telegram alerts on price conditions", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Telegram chat receiving alerts
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub chat_id: Option<String>,

    /// Storefront searched and used to resolve result links
    #[arg(long, default_value = "https://www.amazon.in")]
    pub base_url: Url,

    /// Keyword scan fires only strictly below this price
    #[arg(long, default_value_t = 150_000.0)]
    pub threshold: f64,

    /// Keyword scan fires only at or above this rating
    #[arg(long, default_value_t = 4.0)]
    pub min_rating: f64,

    /// Target price given to newly registered products
    #[arg(long, default_value_t = 1500.0)]
    pub default_target: f64,

    /// Product links kept per keyword
    #[arg(long, default_value_t = 5)]
    pub max_results: usize,

    /// Pause between product fetches, in seconds
    #[arg(long, default_value_t = 2)]
    pub delay_secs: u64,

    /// HTTP timeout, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    #[arg(long, default_value = "keywords.txt")]
    pub keywords: PathBuf,

    #[arg(long, default_value = "products.json")]
    pub registry: PathBuf,

    #[arg(long, default_value = "alerted_prices.json")]
    pub alerts: PathBuf,

    /// Keep every search result anchor, not only product-detail pages
    #[arg(long)]
    pub any_link: bool,

    /// Whether an alert is remembered when Telegram delivery fails
    #[arg(long, value_enum, default_value = "always")]
    pub delivery: DeliveryPolicy,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum Command {
    /// Search each keyword and alert on deals (default)
    Scan {
        #[arg(long, value_enum, default_value = "price-change")]
        policy: AlertPolicy,
    },
    /// Check every registered product against its target price
    Poll {
        #[arg(long, value_enum, default_value = "at-or-below-target")]
        policy: AlertPolicy,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub base_url: Url,
    pub price_threshold: f64,
    pub min_rating: f64,
    pub default_target: f64,
    pub max_results: usize,
    pub request_delay: Duration,
    pub timeout: Duration,
    pub keywords_path: PathBuf,
    pub registry_path: PathBuf,
    pub alerts_path: PathBuf,
    pub link_filter: LinkFilter,
    pub delivery: DeliveryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            base_url: Url::parse("https://www.amazon.in").expect("default base url is valid"),
            price_threshold: 150_000.0,
            min_rating: 4.0,
            default_target: 1500.0,
            max_results: 5,
            request_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
            keywords_path: PathBuf::from("keywords.txt"),
            registry_path: PathBuf::from("products.json"),
            alerts_path: PathBuf::from("alerted_prices.json"),
            link_filter: LinkFilter::ProductPages,
            delivery: DeliveryPolicy::Always,
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            bot_token: args.bot_token.clone(),
            chat_id: args.chat_id.clone(),
            base_url: args.base_url.clone(),
            price_threshold: args.threshold,
            min_rating: args.min_rating,
            default_target: args.default_target,
            max_results: args.max_results,
            request_delay: Duration::from_secs(args.delay_secs),
            timeout: Duration::from_secs(args.timeout_secs),
            keywords_path: args.keywords.clone(),
            registry_path: args.registry.clone(),
            alerts_path: args.alerts.clone(),
            link_filter: if args.any_link {
                LinkFilter::Any
            } else {
                LinkFilter::ProductPages
            },
            delivery: args.delivery,
        }
    }
}
