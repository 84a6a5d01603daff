//! Sequential run loops: the keyword scan and the registry poll.

use std::thread;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::alert::{AlertPolicy, AlertRule, Decision, Suppressed};
use crate::config::Config;
use crate::fetcher::PageSource;
use crate::models::{AlertState, ProductSnapshot};
use crate::notifier::{Notify, deal_message, target_message};
use crate::parser::Extractor;
use crate::registry::ProductRegistry;
use crate::search::SearchCollector;
use crate::store::AlertLedger;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub checked: usize,
    pub fired: usize,
    pub delivered: usize,
    pub suppressed: usize,
    pub undecided: usize,
    pub failed_fetches: usize,
    pub registered: usize,
}

pub struct Tracker<'a, S: PageSource, N: Notify> {
    config: &'a Config,
    source: S,
    notifier: N,
    extractor: Extractor,
}

impl<'a, S: PageSource, N: Notify> Tracker<'a, S, N> {
    pub fn new(config: &'a Config, source: S, notifier: N) -> Self {
        Self {
            config,
            source,
            notifier,
            extractor: Extractor::new(),
        }
    }

    /// keyword -> search -> extract -> decide -> notify, then registers every
    /// product link seen during the pass.
    pub fn scan(
        &self,
        keywords: &[String],
        policy: AlertPolicy,
        ledger: &mut AlertLedger,
        registry: &mut ProductRegistry,
    ) -> RunSummary {
        let started: DateTime<Utc> = Utc::now();
        info!("Scan started at {}", started.to_rfc3339());

        let collector = SearchCollector::new(&self.source, &self.config.base_url, self.config.link_filter);
        let rule = AlertRule {
            limit: self.config.price_threshold,
            min_rating: self.config.min_rating,
        };
        let mut summary = RunSummary::default();
        let mut seen_links = Vec::new();

        for keyword in keywords {
            info!("Searching for: {keyword}");
            let links = match collector.collect(keyword, self.config.max_results) {
                Ok(links) => links,
                Err(e) => {
                    warn!("Search for {keyword:?} failed: {e}");
                    summary.failed_fetches += 1;
                    continue;
                }
            };
            if links.is_empty() {
                warn!("No product links found for {keyword:?}");
            }

            for link in &links {
                self.check(link, policy, &rule, ledger, &mut summary);
                self.pause();
            }
            seen_links.extend(links);
        }

        match registry.register(&seen_links) {
            Ok(added) => {
                summary.registered = added;
                info!("Registered {added} new products");
            }
            Err(e) => warn!("Could not update product registry: {e}"),
        }

        info!("Scan finished: {summary:?}");
        summary
    }

    /// Checks every registered product against its own target price.
    pub fn poll(&self, registry: &ProductRegistry, policy: AlertPolicy, ledger: &mut AlertLedger) -> RunSummary {
        info!("Poll started at {}", Utc::now().to_rfc3339());
        let mut summary = RunSummary::default();

        for product in registry.products() {
            let rule = AlertRule {
                limit: product.target_price,
                min_rating: self.config.min_rating,
            };
            self.check(&product.url, policy, &rule, ledger, &mut summary);
            self.pause();
        }

        info!("Poll finished: {summary:?}");
        summary
    }

    fn check(
        &self,
        url: &str,
        policy: AlertPolicy,
        rule: &AlertRule,
        ledger: &mut AlertLedger,
        summary: &mut RunSummary,
    ) {
        info!("Checking: {url}");
        summary.checked += 1;

        let snapshot = match self.source.fetch_html(url) {
            Ok(html) => self.extractor.extract(url, &html),
            Err(e) => {
                warn!("Fetch failed: {e}");
                summary.failed_fetches += 1;
                ProductSnapshot::empty(url)
            }
        };

        let state = if policy.uses_ledger() {
            ledger.state(url)
        } else {
            AlertState::NeverAlerted
        };

        match policy.decide(&snapshot, rule, state) {
            Decision::Fire { price } => {
                summary.fired += 1;
                let text = match policy {
                    AlertPolicy::PriceChange => deal_message(&snapshot),
                    AlertPolicy::AtOrBelowTarget => target_message(url, price),
                };
                let delivered = match self.notifier.send(&text) {
                    Ok(()) => {
                        info!("Alert sent for {url} at {price}");
                        summary.delivered += 1;
                        true
                    }
                    Err(e) => {
                        warn!("Alert for {url} not delivered: {e}");
                        false
                    }
                };
                if policy.uses_ledger() && self.config.delivery.should_record(delivered) {
                    if let Err(e) = ledger.record(url, price) {
                        warn!("Could not persist alert state: {e}");
                    }
                }
            }
            Decision::Suppress(reason) => {
                summary.suppressed += 1;
                match reason {
                    Suppressed::AlreadyAlerted { price } => info!("Already alerted at {price}"),
                    Suppressed::AboveLimit { price } => info!("No deal: {price} vs limit {}", rule.limit),
                    Suppressed::LowRating { rating } => info!("No deal: rating {rating}"),
                }
            }
            Decision::Undecided => {
                summary.undecided += 1;
                let missing: Vec<String> = snapshot.missing().iter().map(ToString::to_string).collect();
                warn!("Couldn't decide on {url}: missing {}", missing.join(", "));
            }
        }
    }

    fn pause(&self) {
        if !self.config.request_delay.is_zero() {
            thread::sleep(self.config.request_delay);
        }
    }
}
