//! Alert decisions: the price-change trigger and the at-or-below-target trigger.

use clap::ValueEnum;

use crate::models::{AlertState, ProductSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlertPolicy {
    PriceChange,
    AtOrBelowTarget,
}

/// Whether an alert is remembered when delivery fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeliveryPolicy {
    /// Record the alerted price whatever the delivery outcome.
    Always,
    /// Record only once the notification was accepted.
    OnSuccess,
}

impl DeliveryPolicy {
    pub fn should_record(self, delivered: bool) -> bool {
        match self {
            DeliveryPolicy::Always => true,
            DeliveryPolicy::OnSuccess => delivered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertRule {
    /// Threshold for `PriceChange`, target price for `AtOrBelowTarget`.
    pub limit: f64,
    pub min_rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Notify; the ledger should move to `AlertedAt(price)`.
    Fire { price: f64 },
    Suppress(Suppressed),
    /// A required field was missing, nothing can be said.
    Undecided,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Suppressed {
    AboveLimit { price: f64 },
    LowRating { rating: f64 },
    AlreadyAlerted { price: f64 },
}

impl AlertPolicy {
    /// Only `PriceChange` reads or writes the alert ledger.
    pub fn uses_ledger(self) -> bool {
        matches!(self, AlertPolicy::PriceChange)
    }

    pub fn decide(self, snapshot: &ProductSnapshot, rule: &AlertRule, state: AlertState) -> Decision {
        match self {
            AlertPolicy::PriceChange => price_change(snapshot, rule, state),
            AlertPolicy::AtOrBelowTarget => at_or_below_target(snapshot, rule),
        }
    }
}

fn price_change(snapshot: &ProductSnapshot, rule: &AlertRule, state: AlertState) -> Decision {
    let (Some(price), Some(rating)) = (snapshot.price, snapshot.rating) else {
        return Decision::Undecided;
    };
    if price >= rule.limit {
        return Decision::Suppress(Suppressed::AboveLimit { price });
    }
    if rating < rule.min_rating {
        return Decision::Suppress(Suppressed::LowRating { rating });
    }
    match state {
        AlertState::AlertedAt(last) if last == price => {
            Decision::Suppress(Suppressed::AlreadyAlerted { price })
        }
        _ => Decision::Fire { price },
    }
}

fn at_or_below_target(snapshot: &ProductSnapshot, rule: &AlertRule) -> Decision {
    match snapshot.price {
        None => Decision::Undecided,
        Some(price) if price <= rule.limit => Decision::Fire { price },
        Some(price) => Decision::Suppress(Suppressed::AboveLimit { price }),
    }
}
