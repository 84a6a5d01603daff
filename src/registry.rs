use std::path::PathBuf;

use tracing::warn;

use crate::error::PersistenceError;
use crate::models::TrackedProduct;
use crate::store::{load_json, save_json};

/// Products polled against their own target price. Entries are only ever
/// appended; editing or removing them is left to whoever owns the file.
pub struct ProductRegistry {
    path: PathBuf,
    products: Vec<TrackedProduct>,
    default_target: f64,
    loaded: bool,
}

impl ProductRegistry {
    pub fn open(path: impl Into<PathBuf>, default_target: f64) -> Self {
        let path = path.into();
        let (products, loaded) = match load_json(&path) {
            Ok(products) => (products.unwrap_or_default(), true),
            Err(e) => {
                warn!("{e}; registry is read-only for this run");
                (Vec::new(), false)
            }
        };
        Self {
            path,
            products,
            default_target,
            loaded,
        }
    }

    pub fn products(&self) -> &[TrackedProduct] {
        &self.products
    }

    /// Appends URLs not already tracked, then saves. Returns how many were new.
    /// A file that failed to load is never written over.
    pub fn register<I, S>(&mut self, urls: I) -> Result<usize, PersistenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.loaded {
            return Err(PersistenceError::NotLoaded {
                path: self.path.clone(),
            });
        }
        let mut added = 0;
        for url in urls {
            let url = url.as_ref();
            if self.products.iter().any(|p| p.url == url) {
                continue;
            }
            self.products.push(TrackedProduct {
                url: url.to_string(),
                target_price: self.default_target,
            });
            added += 1;
        }
        save_json(&self.products, &self.path)?;
        Ok(added)
    }
}
