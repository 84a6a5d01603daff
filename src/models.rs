use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields read off one fetch of one product page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductSnapshot {
    pub url: String,
    pub price: Option<f64>,
    pub list_price: Option<f64>,
    pub title: Option<String>,
    pub rating: Option<f64>,
}

impl ProductSnapshot {
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    /// Fields whose selector chain came up empty.
    pub fn missing(&self) -> Vec<Field> {
        let mut missing = Vec::new();
        if self.price.is_none() {
            missing.push(Field::Price);
        }
        if self.list_price.is_none() {
            missing.push(Field::ListPrice);
        }
        if self.title.is_none() {
            missing.push(Field::Title);
        }
        if self.rating.is_none() {
            missing.push(Field::Rating);
        }
        missing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Price,
    ListPrice,
    Title,
    Rating,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Price => "price",
            Field::ListPrice => "list price",
            Field::Title => "title",
            Field::Rating => "rating",
        };
        f.write_str(name)
    }
}

/// A registry entry, keyed by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedProduct {
    pub url: String,
    pub target_price: f64,
}

/// Dedup state of one URL in the alert ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertState {
    NeverAlerted,
    AlertedAt(f64),
}
